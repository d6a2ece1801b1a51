use super::fnv::fnv1a64;

const SIGNATURE_BITS: usize = 64;

/// 64-bit SimHash of a token sequence.
///
/// Each token's FNV-1a hash votes +1/-1 on every bit position; a bit is set in
/// the output when its vote total is strictly positive (ties resolve to 0).
/// Returns 0 for an empty sequence.
pub fn simhash64<S: AsRef<str>>(tokens: &[S]) -> u64 {
    if tokens.is_empty() {
        return 0;
    }

    let mut votes = [0i64; SIGNATURE_BITS];
    for token in tokens {
        let hash = fnv1a64(token.as_ref());
        for (bit, vote) in votes.iter_mut().enumerate() {
            if (hash >> bit) & 1 == 1 {
                *vote += 1;
            } else {
                *vote -= 1;
            }
        }
    }

    votes
        .iter()
        .enumerate()
        .filter(|(_, &vote)| vote > 0)
        .fold(0u64, |signature, (bit, _)| signature | (1u64 << bit))
}

/// Number of differing bits between two signatures (0..=64).
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tokens_give_zero() {
        let tokens: Vec<String> = vec![];
        assert_eq!(simhash64(&tokens), 0);
    }

    #[test]
    fn test_single_token_equals_its_hash() {
        // One token votes +1 exactly where its hash has a 1 bit.
        assert_eq!(simhash64(&["rust"]), fnv1a64("rust"));
    }

    #[test]
    fn test_deterministic() {
        let tokens = ["weather", "today", "city", "forecast"];
        assert_eq!(simhash64(&tokens), simhash64(&tokens));
    }

    #[test]
    fn test_order_independent() {
        assert_eq!(
            simhash64(&["alpha", "beta", "gamma"]),
            simhash64(&["gamma", "alpha", "beta"])
        );
    }

    #[test]
    fn test_repeated_token_keeps_its_hash() {
        let a = "x";
        let sig = simhash64(&[a, a]);
        assert_eq!(sig, fnv1a64(a));
    }

    #[test]
    fn test_hamming_distance_symmetric() {
        let a = simhash64(&["one", "two", "three"]);
        let b = simhash64(&["one", "two", "four"]);
        assert_eq!(hamming_distance(a, b), hamming_distance(b, a));
        assert_eq!(hamming_distance(a, a), 0);
        assert_eq!(hamming_distance(0, u64::MAX), 64);
    }
}
