pub mod etl;
pub mod fetcher;
pub mod manifest;
pub mod parser;
pub mod pipeline;
pub mod ranking;

pub use crate::domain::model::{LoadSummary, PackageName, PackageRecord, ScoredRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
