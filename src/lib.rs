pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, CliConfig, RunConfig};
pub use core::{
    crossref::CrossrefClient,
    etl::EtlEngine,
    pipeline::{enrich_table, ReferenceMatchPipeline},
    similarity::token_set_ratio,
};
pub use domain::model::{ReferenceTable, WorkMetadata};
pub use domain::ports::{ConfigProvider, MetadataProvider};
pub use utils::error::{EtlError, Result};

/// Runs the whole pipeline against local files: read `input`, look up every
/// row's DOI, score, and write `output`.
pub async fn match_references(config: RunConfig) -> Result<String> {
    let provider = CrossrefClient::new(config.api_endpoint(), config.mailto())?;
    let pipeline = ReferenceMatchPipeline::new(LocalStorage::default(), provider, config);
    EtlEngine::new(pipeline).run().await
}
