pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod index;
pub mod merge;
pub mod progress;
pub mod report;

pub use config::AppConfig;
pub use engine::{Analysis, MergeEngine};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
