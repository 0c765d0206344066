use crate::domain::model::{ReferenceTable, WorkMetadata};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn api_endpoint(&self) -> &str;
    fn mailto(&self) -> Option<&str>;
    fn delimiter(&self) -> u8;
}

/// Looks up bibliographic metadata for a DOI.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch(&self, doi: &str) -> Result<WorkMetadata>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ReferenceTable>;
    async fn transform(&self, data: ReferenceTable) -> Result<ReferenceTable>;
    async fn load(&self, result: ReferenceTable) -> Result<String>;
}
