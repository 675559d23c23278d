pub mod etl;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{Record, RecordSet, TransformReport, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
