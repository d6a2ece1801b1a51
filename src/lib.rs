pub mod analysis;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod hasher;
pub mod inspector;
pub mod model;
pub mod normalize;
pub mod progress;
pub mod request;
pub mod runner;
pub mod sampler;
pub mod snapshot;

pub use cache::ScanCache;
pub use config::AppConfig;
pub use engine::ScanEngine;
pub use error::Error;
pub use model::{
    Estimate, Fingerprint, Group, GroupKind, GroupSet, Item, ScanResult, ScanTimings, Summary,
};
pub use progress::{ProgressReporter, SilentReporter};
pub use request::{Request, Response};
