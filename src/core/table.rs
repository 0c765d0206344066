use crate::domain::model::ReferenceTable;
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, Terminator, WriterBuilder};

/// 讀取帶索引欄的分隔檔；第一欄視為列索引
pub fn read_table(data: &[u8], delimiter: u8) -> Result<ReferenceTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(data);

    let header_record = reader.headers()?.clone();
    let mut header_iter = header_record.iter();
    let index_header = header_iter
        .next()
        .ok_or_else(|| EtlError::ProcessingError {
            message: "Input table has no header row".to_string(),
        })?
        .to_string();
    let headers: Vec<String> = header_iter.map(str::to_string).collect();

    let mut index = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut fields = record.iter();
        index.push(fields.next().unwrap_or_default().to_string());
        rows.push(fields.map(str::to_string).collect());
    }

    tracing::debug!(
        "Read table with {} columns and {} rows",
        headers.len(),
        rows.len()
    );

    Ok(ReferenceTable {
        index_header,
        headers,
        index,
        rows,
    })
}

/// 寫出資料表，不含索引欄
pub fn write_table(table: &ReferenceTable, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| EtlError::IoError(e.into_error()))
}
