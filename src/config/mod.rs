#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub const SUPPORTED_SOURCE_FORMATS: &[&str] = &["csv", "json"];

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "people-etl")]
#[command(about = "A batch cleaning pipeline for person records")]
pub struct CliConfig {
    /// Path to the source dataset (.csv or .json)
    #[arg(long, default_value = "./data/people.csv")]
    pub source: String,

    /// Directory the cleaned dataset is written to
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source_path(&self) -> &str {
        &self.source
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("source", &self.source)?;
        validate_file_extension("source", &self.source, SUPPORTED_SOURCE_FORMATS)?;
        validate_path("output_path", &self.output_path)
    }
}
