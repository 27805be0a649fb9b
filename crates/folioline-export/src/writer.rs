//! Snapshot writers: pretty JSON, flat TSV, id-only TSV

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::flatten::{FlatRow, cell_text, lookup};

/// Tab-delimited writer with `\n` line endings
pub fn tsv_writer(path: &Path) -> Result<csv::Writer<File>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))
}

/// Write records as a 2-space indented JSON array. Non-ASCII text is
/// written as UTF-8, never escaped.
pub fn write_json(path: &Path, records: &[Value]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, records)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    out.flush()?;
    log::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Write flat rows under a header taken from the first row.
///
/// Cells are emitted by header name: extra names in later rows are
/// dropped, missing ones are empty. No rows means an empty file.
pub fn write_tsv(path: &Path, rows: &[FlatRow]) -> Result<()> {
    let header: Vec<String> = rows
        .first()
        .map(|row| row.names().map(String::from).collect())
        .unwrap_or_default();
    let mut writer = tsv_writer(path)?;
    if !header.is_empty() {
        writer.write_record(&header)?;
        for row in rows {
            writer.write_record(header.iter().map(|name| row.get(name).unwrap_or("")))?;
        }
    }
    writer
        .flush()
        .with_context(|| format!("Cannot write {}", path.display()))?;
    log::debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write a raw header + rows table
pub fn write_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(())
}

/// Write just the identifying fields, one row per record in input order.
pub fn write_ids(path: &Path, records: &[Value], id_columns: &[&str]) -> Result<()> {
    let mut writer = tsv_writer(path)?;
    writer.write_record(id_columns)?;
    for record in records {
        writer.write_record(
            id_columns
                .iter()
                .map(|column| cell_text(lookup(record, column))),
        )?;
    }
    writer
        .flush()
        .with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::flatten::flatten;
    use serde_json::json;

    #[test]
    fn ids_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.tsv");
        let records = vec![json!({"id": "a", "x": 1}), json!({"id": "b"})];

        write_ids(&path, &records, &["id"]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id\na\nb\n");
    }

    #[test]
    fn two_column_ids_with_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.tsv");
        let records = vec![
            json!({"id": "sp1", "discoveryDisplayName": "Main desk"}),
            json!({"id": "sp2"}),
        ];

        write_ids(&path, &records, Entity::ServicePoints.id_columns()).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id\tdiscoveryDisplayName\nsp1\tMain desk\nsp2\t\n"
        );
    }

    #[test]
    fn tsv_header_from_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let mut first = FlatRow::new();
        first.set("id", "1");
        first.set("name", "A");
        let mut second = FlatRow::new();
        second.set("name", "B");
        second.set("extra", "dropped");

        write_tsv(&path, &[first, second]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id\tname\n1\tA\n\tB\n"
        );
    }

    #[test]
    fn tsv_empty_snapshot_is_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tsv");
        write_tsv(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn tsv_quotes_embedded_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spu.tsv");
        let record = json!({"id": "r1", "userId": "u1", "servicePointsIds": ["a"]});
        let row = flatten(&record, Entity::ServicePointUsers.columns());

        write_tsv(&path, &[row]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert_eq!(data_line, "r1\tu1\t\"[\"\"a\"\"]\"\t");
    }

    #[test]
    fn json_keeps_unicode_and_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &[json!({"name": "Biblioteca Central Ñuñoa"})]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Biblioteca Central Ñuñoa"));
        assert!(text.contains("\n  {\n    \"name\""));
    }
}
