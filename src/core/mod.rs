pub mod crossref;
pub mod etl;
pub mod pipeline;
pub mod similarity;
pub mod table;

pub use crate::domain::model::{ReferenceTable, WorkMetadata};
pub use crate::domain::ports::{ConfigProvider, MetadataProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
