//! CSV serialization of an aggregate.
//!
//! Rows are built in full before anything touches the destination, then
//! written to a uniquely named temp file in the destination directory and
//! persisted over the target, so a failed export never leaves a partial file.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use enrollment_model::{
    AggregateResult, AggregateShape, AxisConfiguration, ExportError, ReportError,
};
use tempfile::NamedTempFile;
use tracing::info;

pub const GRANTS_LABEL: &str = "Grants:";
pub const PROTOCOLS_LABEL: &str = "Protocols:";
pub const COLUMN_TOTALS_LABEL: &str = "Totals by Gender and Ethnicity";
pub const GRAND_TOTAL_LABEL: &str = "<- Total enrollments";

/// Export rows, in file order.
///
/// Unlike the screen grid, every race gets a row here, hidden or not.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] when the aggregate was built for
/// different axes.
pub fn serialize(
    result: &AggregateResult,
    axes: &AxisConfiguration,
    selected_grants: &[String],
    selected_protocols: &[String],
) -> Result<Vec<Vec<String>>, ReportError> {
    if result.shape() != AggregateShape::of(axes) {
        return Err(ReportError::configuration(
            "aggregate",
            "aggregate was built for different axes",
        ));
    }
    let mut rows = Vec::with_capacity(axes.race.len() + 4);

    rows.push(labelled_row(GRANTS_LABEL, selected_grants));
    rows.push(labelled_row(PROTOCOLS_LABEL, selected_protocols));

    let mut header = vec![String::new()];
    for ethnicity in axes.ethnicity.labels() {
        for gender in axes.gender.labels() {
            header.push(format!("{ethnicity}/{gender}"));
        }
    }
    rows.push(header);

    for (race, label) in axes.race.labels().enumerate() {
        let mut row = vec![label.to_string()];
        row.extend(result.row(race).iter().map(ToString::to_string));
        row.push(result.row_total(race).unwrap_or_default().to_string());
        rows.push(row);
    }

    let mut trailer = vec![COLUMN_TOTALS_LABEL.to_string()];
    trailer.extend(result.column_totals().iter().map(ToString::to_string));
    trailer.push(result.grand_total().to_string());
    trailer.push(GRAND_TOTAL_LABEL.to_string());
    rows.push(trailer);

    Ok(rows)
}

/// Encode rows as comma-delimited CSV with minimal quoting and CRLF endings.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if the writer rejects a record.
pub fn encode_csv(rows: &[Vec<String>]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

/// Write rows to `path`, all or nothing.
///
/// # Errors
///
/// Returns [`ExportError`] if encoding fails or the destination cannot be
/// written. The temp file is removed on failure and an existing file at
/// `path` is left as it was.
pub fn write_csv(rows: &[Vec<String>], path: &Path) -> Result<(), ExportError> {
    let bytes = encode_csv(rows)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(io_error("create", path))?;
    temp.write_all(&bytes).map_err(io_error("write", temp.path()))?;
    temp.as_file().sync_all().map_err(io_error("sync", temp.path()))?;
    temp.persist(path)
        .map_err(|e| io_error("rename", path)(e.error))?;

    info!(path = %path.display(), rows = rows.len(), "exported report");
    Ok(())
}

/// `report_<start>_to_<end>.csv`
#[must_use]
pub fn default_export_file_name(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "report_{}_to_{}.csv",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

fn labelled_row(label: &str, values: &[String]) -> Vec<String> {
    let mut row = Vec::with_capacity(values.len() + 1);
    row.push(label.to_string());
    row.extend(values.iter().cloned());
    row
}

fn io_error<'a>(
    operation: &'static str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> ExportError + 'a {
    move |source| ExportError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_iso_dates() {
        let name = default_export_file_name(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 9).unwrap(),
        );
        assert_eq!(name, "report_2022-01-01_to_2022-03-09.csv");
    }

    #[test]
    fn encoding_quotes_only_when_needed() {
        let rows = vec![
            vec!["Grants:".to_string(), "R01, supplement".to_string()],
            vec!["".to_string(), "a/b".to_string(), "c".to_string()],
        ];
        let text = String::from_utf8(encode_csv(&rows).unwrap()).unwrap();
        assert_eq!(text, "Grants:,\"R01, supplement\"\r\n,a/b,c\r\n");
    }

    #[test]
    fn write_replaces_target_and_spares_neighbours() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let neighbour = dir.path().join("report.csv.tmp");
        std::fs::write(&path, "old").unwrap();
        std::fs::write(&neighbour, "keep me").unwrap();

        write_csv(&[vec!["a".to_string(), "b".to_string()]], &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\r\n");
        assert_eq!(std::fs::read_to_string(&neighbour).unwrap(), "keep me");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
