use futures::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Run `op` once per item with at most `limit` operations in flight.
///
/// Workers share one atomic index counter: each claims the next unclaimed
/// index, awaits its operation, then claims again. The returned vector has one
/// result per input, in input order, whatever the completion order.
///
/// There are no retries and no short-circuiting; an operation that can fail
/// should return its failure as a value (e.g. a `Result`). A `limit` of 0 is
/// treated as 1.
pub async fn map_with_concurrency<'a, T, R, F, Fut>(items: &'a [T], limit: usize, op: F) -> Vec<R>
where
    F: Fn(&'a T, usize) -> Fut,
    Fut: Future<Output = R>,
{
    if items.is_empty() {
        return Vec::new();
    }

    let worker_count = limit.max(1).min(items.len());
    trace!("Running {} operations on {} workers", items.len(), worker_count);

    let next_index = AtomicUsize::new(0);
    let next_index = &next_index;
    let op = &op;

    let workers = (0..worker_count).map(move |_| async move {
        let mut completed = Vec::new();
        loop {
            let index = next_index.fetch_add(1, Ordering::SeqCst);
            if index >= items.len() {
                break;
            }
            completed.push((index, op(&items[index], index).await));
        }
        completed
    });

    let mut results: Vec<(usize, R)> = join_all(workers).await.into_iter().flatten().collect();
    results.sort_unstable_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let items = vec![("a", 30u64), ("b", 10), ("c", 20)];
        let results = map_with_concurrency(&items, 2, |(name, delay), _| async move {
            sleep(Duration::from_millis(*delay)).await;
            name.to_uppercase()
        })
        .await;
        assert_eq!(results, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let items: Vec<u64> = (0..20).collect();

        let results = map_with_concurrency(&items, 3, |n, _| {
            let in_flight = &in_flight;
            let peak = &peak;
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(2 + n % 3)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                n * 2
            }
        })
        .await;

        assert_eq!(results, items.iter().map(|n| n * 2).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_others() {
        let items = vec![1, 2, 3, 4];
        let results: Vec<Result<i32, String>> = map_with_concurrency(&items, 2, |n, _| {
            let n = *n;
            async move {
                if n % 2 == 0 {
                    Err(format!("failed {n}"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(
            results,
            vec![Ok(1), Err("failed 2".to_string()), Ok(3), Err("failed 4".to_string())]
        );
    }

    #[tokio::test]
    async fn test_zero_limit_and_empty_input() {
        let empty: Vec<i32> = vec![];
        assert!(map_with_concurrency(&empty, 4, |n, _| async move { *n }).await.is_empty());

        let items = vec![5, 6];
        let results = map_with_concurrency(&items, 0, |n, index| {
            let n = *n;
            async move { (index, n) }
        })
        .await;
        assert_eq!(results, vec![(0, 5), (1, 6)]);
    }

    #[tokio::test]
    async fn test_each_index_claimed_once() {
        let calls = AtomicUsize::new(0);
        let items: Vec<usize> = (0..50).collect();
        let results = map_with_concurrency(&items, 8, |_, index| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { index }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 50);
        assert_eq!(results, items);
    }
}
