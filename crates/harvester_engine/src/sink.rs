use std::io::Write;
use std::path::PathBuf;

use harvest_logging::harvest_info;
use harvester_core::{Row, Table, COLUMNS};

use crate::persist::{AtomicFileWriter, PersistError};

/// Writes the final table as a CSV file, replacing any previous run's output.
#[derive(Debug, Clone)]
pub struct CsvSink {
    writer: AtomicFileWriter,
}

impl CsvSink {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
        }
    }

    pub fn persist(&self, table: &Table, filename: &str) -> Result<PathBuf, PersistError> {
        let path = self
            .writer
            .write_with(filename, |out| write_csv(table, out))?;
        harvest_info!("wrote {} row(s) to {}", table.len(), path.display());
        Ok(path)
    }
}

/// Header plus one line per row, in table order. Nulls are empty cells.
pub fn render_csv(table: &Table) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

fn write_csv(table: &Table, out: &mut dyn Write) -> Result<(), PersistError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(COLUMNS)?;
    for row in table.rows() {
        writer.write_record(row_cells(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn row_cells(row: &Row) -> [String; 4] {
    [
        row.title.clone(),
        format_score(row.critic_score),
        format_score(row.audience_score),
        row.availability_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    ]
}

/// Scores always carry a decimal point (`87.0`), matching the float columns
/// downstream tools expect.
fn format_score(score: Option<f64>) -> String {
    score.map(|s| format!("{s:?}")).unwrap_or_default()
}
