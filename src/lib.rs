#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use crate::core::{etl::EtlEngine, pipeline::AdvisorPipeline};
pub use domain::model::{LoadSummary, PackageName, PackageRecord, ScoredRecord};
pub use domain::rules::ExtractionRules;
pub use utils::error::{EtlError, Result};
