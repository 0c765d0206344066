use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 依序執行 extract → transform → load，任何階段失敗即中止且不寫出檔案
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting reference matching...");

        // Extract
        let table = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} references ({} columns, index column '{}')",
            table.len(),
            table.headers.len(),
            table.index_header
        );

        // Transform
        let enriched = self.pipeline.transform(table).await?;
        tracing::info!("Matched {} references", enriched.len());

        // Load
        let output_path = self.pipeline.load(enriched).await?;
        tracing::info!(
            "Output saved to: {} ({:.2?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
