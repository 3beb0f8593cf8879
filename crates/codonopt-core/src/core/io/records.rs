use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_DNA_COLUMN: &str = "DNA sequence";
pub const DEFAULT_PROTEIN_COLUMN: &str = "Sequence";

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required column '{0}' not found in header")]
    MissingColumn(String),

    #[error("Row {row} has no value in column '{column}'")]
    MissingValue { row: usize, column: String },
}

/// One designed sequence together with the protein it is expected to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub dna: String,
    pub protein: String,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, dna: impl Into<String>, protein: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dna: dna.into(),
            protein: protein.into(),
        }
    }
}

/// Column names used to pull records out of a table. Without an id column the 0-based row
/// index becomes the record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub dna: String,
    pub protein: String,
    pub id: Option<String>,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            dna: DEFAULT_DNA_COLUMN.to_string(),
            protein: DEFAULT_PROTEIN_COLUMN.to_string(),
            id: None,
        }
    }
}

pub fn read_records_from_path(
    path: &Path,
    columns: &ColumnSpec,
) -> Result<Vec<SequenceRecord>, RecordError> {
    let file = std::fs::File::open(path)?;
    read_records(file, columns)
}

pub fn read_records<R: Read>(
    reader: R,
    columns: &ColumnSpec,
) -> Result<Vec<SequenceRecord>, RecordError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| RecordError::MissingColumn(name.to_string()))
    };

    let dna_idx = find(&columns.dna)?;
    let protein_idx = find(&columns.protein)?;
    let id_idx = columns.id.as_deref().map(find).transpose()?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = |idx: usize, column: &str| {
            record
                .get(idx)
                .map(|v| v.trim().to_string())
                .ok_or_else(|| RecordError::MissingValue {
                    row,
                    column: column.to_string(),
                })
        };
        let id = match (id_idx, columns.id.as_deref()) {
            (Some(idx), Some(column)) => field(idx, column)?,
            _ => row.to_string(),
        };
        records.push(SequenceRecord {
            id,
            dna: field(dna_idx, &columns.dna)?,
            protein: field(protein_idx, &columns.protein)?,
        });
    }
    Ok(records)
}

/// One protein to design, keyed like [`SequenceRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinRecord {
    pub id: String,
    pub protein: String,
}

pub fn read_proteins_from_path(
    path: &Path,
    protein_column: &str,
    id_column: Option<&str>,
) -> Result<Vec<ProteinRecord>, RecordError> {
    let file = std::fs::File::open(path)?;
    read_proteins(file, protein_column, id_column)
}

pub fn read_proteins<R: Read>(
    reader: R,
    protein_column: &str,
    id_column: Option<&str>,
) -> Result<Vec<ProteinRecord>, RecordError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| RecordError::MissingColumn(name.to_string()))
    };
    let protein_idx = find(protein_column)?;
    let id_idx = id_column.map(find).transpose()?;

    let mut proteins = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let protein = record
            .get(protein_idx)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| RecordError::MissingValue {
                row,
                column: protein_column.to_string(),
            })?;
        let id = match id_idx {
            Some(idx) => record.get(idx).map(|v| v.trim().to_string()).ok_or_else(|| {
                RecordError::MissingValue {
                    row,
                    column: id_column.unwrap_or_default().to_string(),
                }
            })?,
            None => row.to_string(),
        };
        proteins.push(ProteinRecord { id, protein });
    }
    Ok(proteins)
}

/// A row of a tabular report.
pub trait ReportRow {
    fn headers() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

/// Writes `rows` as CSV. The header is always written, so an empty report still names its
/// columns.
pub fn write_report<W: Write, T: ReportRow>(writer: W, rows: &[T]) -> Result<(), RecordError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(T::headers())?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(String, usize);

    impl ReportRow for Pair {
        fn headers() -> &'static [&'static str] {
            &["Name", "Count"]
        }
        fn fields(&self) -> Vec<String> {
            vec![self.0.clone(), self.1.to_string()]
        }
    }

    #[test]
    fn read_records_uses_default_columns_and_row_index_ids() {
        let csv = "Sequence,DNA sequence\nM*,ATGTAG\nMA,ATGGCG\n";
        let records = read_records(csv.as_bytes(), &ColumnSpec::default()).unwrap();
        assert_eq!(
            records,
            vec![
                SequenceRecord::new("0", "ATGTAG", "M*"),
                SequenceRecord::new("1", "ATGGCG", "MA"),
            ]
        );
    }

    #[test]
    fn read_records_supports_custom_columns() {
        let csv = "name,dna,protein\nfoo,ATG,M\n";
        let columns = ColumnSpec {
            dna: "dna".to_string(),
            protein: "protein".to_string(),
            id: Some("name".to_string()),
        };
        let records = read_records(csv.as_bytes(), &columns).unwrap();
        assert_eq!(records, vec![SequenceRecord::new("foo", "ATG", "M")]);
    }

    #[test]
    fn read_records_reports_missing_column() {
        let csv = "Sequence\nM\n";
        let result = read_records(csv.as_bytes(), &ColumnSpec::default());
        assert!(matches!(result, Err(RecordError::MissingColumn(c)) if c == "DNA sequence"));
    }

    #[test]
    fn read_records_from_path_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_records_from_path(&dir.path().join("nope.csv"), &ColumnSpec::default());
        assert!(matches!(result, Err(RecordError::Io(_))));
    }

    #[test]
    fn read_proteins_without_dna_column() {
        let csv = "name,Sequence\nfirst,MA*\nsecond,MG\n";
        let proteins = read_proteins(csv.as_bytes(), "Sequence", Some("name")).unwrap();
        assert_eq!(proteins.len(), 2);
        assert_eq!(proteins[1].id, "second");
        assert_eq!(proteins[0].protein, "MA*");

        let by_row = read_proteins(csv.as_bytes(), "Sequence", None).unwrap();
        assert_eq!(by_row[1].id, "1");
    }

    #[test]
    fn write_report_emits_header_even_when_empty() {
        let mut out = Vec::new();
        write_report::<_, Pair>(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Name,Count\n");
    }

    #[test]
    fn write_report_writes_rows() {
        let mut out = Vec::new();
        write_report(&mut out, &[Pair("a".to_string(), 2)]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Name,Count\na,2\n");
    }
}
