use crate::core::similarity::score_reference;
use crate::core::table::{read_table, write_table};
use crate::core::{ConfigProvider, MetadataProvider, Pipeline, ReferenceTable, Storage};
use crate::domain::model::{
    AUTHOR_SIMILARITY_COLUMN, DERIVED_COLUMNS, DOI_COLUMN, FIRST_AUTH_DOI_COLUMN,
    REF_TEXT_COLUMN, TITLE_DOI_COLUMN, TITLE_SIMILARITY_COLUMN,
};
use crate::utils::error::{EtlError, Result};

fn required_column(table: &ReferenceTable, column: &str) -> Result<usize> {
    table
        .column_position(column)
        .ok_or_else(|| EtlError::MissingColumnError {
            column: column.to_string(),
        })
}

/// Adds metadata and similarity columns to every row of `table`.
///
/// Rows are processed one at a time, in order, with one metadata lookup per
/// row. The first failing lookup aborts the whole table. An empty table only
/// gains the four derived columns; `doi` and `ref_text` are not required then.
pub async fn enrich_table<M>(mut table: ReferenceTable, provider: &M) -> Result<ReferenceTable>
where
    M: MetadataProvider + ?Sized,
{
    if table.is_empty() {
        tracing::info!("Input table has no rows, adding empty result columns");
        for column in DERIVED_COLUMNS {
            table.ensure_column(column);
        }
        return Ok(table);
    }

    let doi_pos = required_column(&table, DOI_COLUMN)?;
    let ref_text_pos = required_column(&table, REF_TEXT_COLUMN)?;

    let title_pos = table.ensure_column(TITLE_DOI_COLUMN);
    let author_pos = table.ensure_column(FIRST_AUTH_DOI_COLUMN);
    let author_sim_pos = table.ensure_column(AUTHOR_SIMILARITY_COLUMN);
    let title_sim_pos = table.ensure_column(TITLE_SIMILARITY_COLUMN);

    let total = table.len();
    for (i, (row_index, row)) in table.index.iter().zip(table.rows.iter_mut()).enumerate() {
        let doi = row[doi_pos].clone();
        if doi.trim().is_empty() {
            return Err(EtlError::MetadataError {
                doi,
                message: format!("empty DOI in row {}", row_index),
            });
        }
        tracing::debug!(row = %row_index, doi = %doi, "Fetching metadata ({}/{})", i + 1, total);

        let metadata = provider.fetch(&doi).await?;
        let scores = score_reference(&row[ref_text_pos], &metadata);

        tracing::debug!(
            row = %row_index,
            author_similarity = scores.author_similarity,
            title_similarity = scores.title_similarity,
            "Scored reference"
        );

        row[author_sim_pos] = scores.author_similarity.to_string();
        row[title_sim_pos] = scores.title_similarity.to_string();
        row[title_pos] = metadata.title;
        row[author_pos] = metadata.first_author;
    }

    Ok(table)
}

pub struct ReferenceMatchPipeline<S: Storage, M: MetadataProvider, C: ConfigProvider> {
    storage: S,
    provider: M,
    config: C,
}

impl<S: Storage, M: MetadataProvider, C: ConfigProvider> ReferenceMatchPipeline<S, M, C> {
    pub fn new(storage: S, provider: M, config: C) -> Self {
        Self {
            storage,
            provider,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, M: MetadataProvider, C: ConfigProvider> Pipeline
    for ReferenceMatchPipeline<S, M, C>
{
    async fn extract(&self) -> Result<ReferenceTable> {
        tracing::debug!("Reading references from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        read_table(&data, self.config.delimiter())
    }

    async fn transform(&self, data: ReferenceTable) -> Result<ReferenceTable> {
        enrich_table(data, &self.provider).await
    }

    async fn load(&self, result: ReferenceTable) -> Result<String> {
        let output_path = self.config.output_path().to_string();
        let data = write_table(&result, self.config.delimiter())?;

        tracing::debug!("Writing {} bytes to storage", data.len());
        self.storage.write_file(&output_path, &data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::WorkMetadata;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put_file(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    /// Canned metadata keyed by DOI; records every lookup.
    #[derive(Default)]
    struct MockProvider {
        records: HashMap<String, WorkMetadata>,
        calls: std::sync::Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn with(mut self, doi: &str, title: &str, author: &str) -> Self {
            self.records
                .insert(doi.to_string(), WorkMetadata::new(title, author));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl MetadataProvider for MockProvider {
        async fn fetch(&self, doi: &str) -> Result<WorkMetadata> {
            self.calls.lock().unwrap().push(doi.to_string());
            self.records
                .get(doi)
                .cloned()
                .ok_or_else(|| EtlError::ApiStatusError {
                    url: format!("mock://works/{}", doi),
                    status: 404,
                })
        }
    }

    struct MockConfig {
        delimiter: u8,
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "refs.csv"
        }

        fn output_path(&self) -> &str {
            "matched.csv"
        }

        fn api_endpoint(&self) -> &str {
            "mock://works"
        }

        fn mailto(&self) -> Option<&str> {
            None
        }

        fn delimiter(&self) -> u8 {
            self.delimiter
        }
    }

    fn table(csv: &str) -> ReferenceTable {
        read_table(csv.as_bytes(), b',').unwrap()
    }

    #[tokio::test]
    async fn test_enrich_single_row() {
        let provider = MockProvider::default().with("10.1000/example", "Title Here", "Smith");
        let input = table(",doi,ref_text\n0,10.1000/example,Smith J. Title Here\n");

        let result = enrich_table(input, &provider).await.unwrap();

        assert_eq!(
            result.headers,
            vec![
                "doi",
                "ref_text",
                "titleDoi",
                "firstAuthDoi",
                "author_similarity",
                "title_similarity"
            ]
        );
        assert_eq!(
            result.rows[0],
            vec![
                "10.1000/example",
                "Smith J. Title Here",
                "Title Here",
                "Smith",
                "100",
                "100"
            ]
        );
    }

    #[tokio::test]
    async fn test_enrich_keeps_row_order_and_calls_sequentially() {
        let provider = MockProvider::default()
            .with("10.1/b", "Beta paper", "Brown")
            .with("10.1/a", "Alpha paper", "Adams")
            .with("10.1/c", "", "");
        let input = table(
            ",doi,ref_text,year\n\
             5,10.1/b,Brown B. Beta paper,2001\n\
             2,10.1/a,Adams A. Alpha paper,1999\n\
             9,10.1/c,Nobody. Untitled,2010\n",
        );

        let result = enrich_table(input, &provider).await.unwrap();

        assert_eq!(provider.calls(), vec!["10.1/b", "10.1/a", "10.1/c"]);
        assert_eq!(result.index, vec!["5", "2", "9"]);
        assert_eq!(result.rows[0][3], "Beta paper");
        assert_eq!(result.rows[1][4], "Adams");
        assert_eq!(result.rows[2][2], "2010");
        assert_eq!(result.rows[2][3], "");
        assert_eq!(result.rows[2][4], "");
        assert_eq!(result.rows[2][5], "0");
        assert_eq!(result.rows[2][6], "0");
    }

    #[tokio::test]
    async fn test_enrich_empty_table_adds_columns_without_lookups() {
        let provider = MockProvider::default();
        let input = table(",title,notes\n");

        let result = enrich_table(input, &provider).await.unwrap();

        assert!(provider.calls().is_empty());
        assert!(result.is_empty());
        assert_eq!(
            result.headers,
            vec![
                "title",
                "notes",
                "titleDoi",
                "firstAuthDoi",
                "author_similarity",
                "title_similarity"
            ]
        );
    }

    #[tokio::test]
    async fn test_enrich_blank_doi_is_error_without_lookup() {
        let provider = MockProvider::default().with("10.1/a", "Alpha", "Adams");
        let input = table(",doi,ref_text\n0,10.1/a,Adams A. Alpha\n1,  ,Smith J. Title Here\n2,10.1/a,Again\n");

        let result = enrich_table(input, &provider).await;

        assert!(matches!(
            result,
            Err(EtlError::MetadataError { ref doi, .. }) if doi.trim().is_empty()
        ));
        assert_eq!(provider.calls(), vec!["10.1/a"]);
    }

    #[tokio::test]
    async fn test_enrich_missing_column_is_error() {
        let provider = MockProvider::default();
        let input = table(",doi,citation\n0,10.1/a,text\n");

        let result = enrich_table(input, &provider).await;
        assert!(matches!(
            result,
            Err(EtlError::MissingColumnError { column }) if column == "ref_text"
        ));
    }

    #[tokio::test]
    async fn test_enrich_overwrites_existing_derived_columns() {
        let provider = MockProvider::default().with("10.1/a", "Fresh title", "Fresh");
        let input = table(",doi,ref_text,titleDoi\n0,10.1/a,Fresh F. Fresh title,stale\n");

        let result = enrich_table(input, &provider).await.unwrap();

        assert_eq!(result.headers.len(), 6);
        assert_eq!(result.rows[0][2], "Fresh title");
    }

    #[tokio::test]
    async fn test_pipeline_fails_fast_without_output() {
        let storage = MockStorage::default();
        storage
            .put_file(
                "refs.csv",
                ",doi,ref_text\n0,10.1/a,Adams A. Alpha\n1,10.1/missing,Lost\n2,10.1/a,Again\n",
            )
            .await;
        let provider = MockProvider::default().with("10.1/a", "Alpha", "Adams");
        let pipeline =
            ReferenceMatchPipeline::new(storage.clone(), provider, MockConfig { delimiter: b',' });

        let table = pipeline.extract().await.unwrap();
        let result = pipeline.transform(table).await;

        assert!(matches!(
            result,
            Err(EtlError::ApiStatusError { status: 404, .. })
        ));
        assert_eq!(pipeline.provider.calls(), vec!["10.1/a", "10.1/missing"]);
        assert!(storage.get_file("matched.csv").await.is_none());
    }

    #[tokio::test]
    async fn test_pipeline_round_trip_with_tabs() {
        let storage = MockStorage::default();
        storage
            .put_file("refs.csv", "id\tdoi\tref_text\nr1\t10.1/a\tAdams A. Alpha\n")
            .await;
        let provider = MockProvider::default().with("10.1/a", "Alpha", "Adams");
        let pipeline =
            ReferenceMatchPipeline::new(storage.clone(), provider, MockConfig { delimiter: b'\t' });

        let table = pipeline.extract().await.unwrap();
        let table = pipeline.transform(table).await.unwrap();
        let path = pipeline.load(table).await.unwrap();

        assert_eq!(path, "matched.csv");
        assert_eq!(
            storage.get_file("matched.csv").await.unwrap(),
            "doi\tref_text\ttitleDoi\tfirstAuthDoi\tauthor_similarity\ttitle_similarity\n\
             10.1/a\tAdams A. Alpha\tAlpha\tAdams\t100\t100\n"
        );
    }
}
