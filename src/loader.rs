use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{DashboardError, Result};
use crate::models::{RawRow, RawValue};

/// Disambiguates repeated header names as `name`, `name_1`, `name_2`, ...
fn dedupe_headers(headers: &csv::StringRecord) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .iter()
        .map(|header| {
            let header = header.trim().to_string();
            let count = seen.entry(header.clone()).or_insert(0);
            let name = if *count == 0 {
                header
            } else {
                format!("{header}_{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// Parses a tracker export. The first physical line is a metadata row and
/// is discarded before the header row is read.
pub fn parse_csv_rows(text: &str) -> Result<Vec<RawRow>> {
    let body = text.split_once('\n').map(|(_, rest)| rest).unwrap_or("");

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers = dedupe_headers(reader.headers()?);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(index, header)| {
                let value = record
                    .get(index)
                    .map(RawValue::from)
                    .unwrap_or(RawValue::Absent);
                (header.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Parses the JSON shape of a "fetch all records" response: an array of
/// objects with string, number or null values.
pub fn parse_json_rows(text: &str) -> Result<Vec<RawRow>> {
    Ok(serde_json::from_str(text)?)
}

pub async fn load_rows(path: &Path) -> Result<Vec<RawRow>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let rows = match extension.as_deref() {
        Some("csv") => parse_csv_rows(&text)?,
        Some("json") => parse_json_rows(&text)?,
        _ => {
            warn!(path = %path.display(), "unrecognised input extension");
            return Err(DashboardError::UnsupportedInput(path.to_path_buf()));
        }
    };

    info!(rows = rows.len(), path = %path.display(), "loaded raw rows");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "TA Tracker exported 2025-06-01,,,,\n\
Candidate Name , Status,Panelist name,Status of R1,Panelist name,Status of R2\n\
Asha Rao,Rejected,Anil,Not Cleared,Bina,\n\
\n\
Ravi Kumar,Joined\n\
\"Smith, Jr.\",In Process,,,,\n";

    #[test]
    fn skips_metadata_row_and_trims_headers() {
        let rows = parse_csv_rows(EXPORT).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("Candidate Name"), Some(&RawValue::from("Asha Rao")));
        assert_eq!(rows[0].get("Status"), Some(&RawValue::from("Rejected")));
        assert_eq!(rows[2].get("Candidate Name"), Some(&RawValue::from("Smith, Jr.")));
    }

    #[test]
    fn duplicate_headers_get_suffixes() {
        let rows = parse_csv_rows(EXPORT).unwrap();
        assert_eq!(rows[0].get("Panelist name"), Some(&RawValue::from("Anil")));
        assert_eq!(rows[0].get("Panelist name_1"), Some(&RawValue::from("Bina")));
    }

    #[test]
    fn short_rows_mark_missing_cells_absent() {
        let rows = parse_csv_rows(EXPORT).unwrap();
        assert_eq!(rows[1].get("Status of R1"), Some(&RawValue::Absent));
        assert_eq!(rows[1].get("Status"), Some(&RawValue::from("Joined")));
    }

    #[test]
    fn metadata_only_input_is_empty() {
        assert!(parse_csv_rows("just metadata").unwrap().is_empty());
        assert!(parse_csv_rows("").unwrap().is_empty());
    }

    #[test]
    fn json_rows_accept_numbers_and_nulls() {
        let rows = parse_json_rows(
            r#"[{"Candidate Name": "Asha", "TTH (30 days)": 42, "Screening Date": null}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].get("TTH (30 days)"), Some(&RawValue::Number(42.0)));
        assert_eq!(rows[0].get("Screening Date"), Some(&RawValue::Absent));
    }

    #[tokio::test]
    async fn load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("tracker.csv");
        std::fs::write(&csv_path, EXPORT).unwrap();
        assert_eq!(load_rows(&csv_path).await.unwrap().len(), 3);

        let other = dir.path().join("tracker.xlsx");
        std::fs::write(&other, "binary").unwrap();
        assert!(matches!(
            load_rows(&other).await,
            Err(DashboardError::UnsupportedInput(_))
        ));

        let missing = load_rows(&dir.path().join("missing.csv")).await;
        assert!(matches!(missing, Err(DashboardError::Io { .. })));
    }
}
