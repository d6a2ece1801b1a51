pub mod fnv;
pub mod simhash;

pub use fnv::fnv1a64;
pub use simhash::{hamming_distance, simhash64};
