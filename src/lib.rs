pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use crate::core::{etl::EtlEngine, pipeline::CsvPipeline};
pub use domain::model::{Record, RecordSet, TransformReport, TransformResult};
pub use utils::error::{EtlError, Result};
