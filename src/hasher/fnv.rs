const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over the UTF-16 code units of `token`.
///
/// Hashing code units rather than UTF-8 bytes keeps signatures identical to
/// the ones the browser side computes with `charCodeAt`, so fingerprints from
/// either side stay comparable.
pub fn fnv1a64(token: &str) -> u64 {
    token.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u64::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_offset_basis() {
        assert_eq!(fnv1a64(""), FNV_OFFSET_BASIS);
    }

    #[test]
    fn test_known_ascii_vectors() {
        // Reference values for FNV-1a 64; ASCII code units equal bytes.
        assert_eq!(fnv1a64("a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a64("foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn test_distinct_tokens_differ() {
        assert_ne!(fnv1a64("weather"), fnv1a64("whether"));
        assert_eq!(fnv1a64("天气"), fnv1a64("天气"));
    }
}
