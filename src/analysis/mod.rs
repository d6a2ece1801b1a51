pub mod duplicates;
pub mod estimate;
pub mod fingerprint;
pub mod idle;
pub mod similarity;
pub mod union_find;
