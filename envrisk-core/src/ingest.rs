//! Loading site records from tabular files
//!
//! Supported formats:
//! - CSV with a header row of column names
//! - JSON array of objects keyed by column name
//!
//! Unknown columns are ignored. Common spreadsheet "not available" markers
//! read as absent values. Anything present but not matching a column's type
//! rejects the whole input with the offending row and column.

use crate::record::{columns, SiteRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cell contents treated as "not measured"
const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "na", "nan", "NaN", "NAN", "null", "NULL", "None", "none", "#N/A", "-",
];

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported input format: {0} (expected .csv or .json)")]
    UnsupportedFormat(String),

    #[error("JSON input must be an array of site objects")]
    NotAnArray,

    #[error("row {row}, column '{column}': invalid value '{value}' ({reason})")]
    InvalidInput {
        row: usize,
        column: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") => Ok(InputFormat::Json),
            _ => Err(IngestError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load records from a file, choosing the parser by extension
pub fn load_records(path: &Path) -> Result<Vec<SiteRecord>, IngestError> {
    let format = InputFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = match format {
        InputFormat::Csv => parse_csv(&content)?,
        InputFormat::Json => parse_json(&content)?,
    };
    tracing::debug!(path = %path.display(), sites = records.len(), "loaded site records");
    Ok(records)
}

/// A single cell, independent of the source format
#[derive(Debug, Clone, Copy)]
enum Cell<'a> {
    Text(&'a str),
    Number(f64),
}

/// Typed access to one row's cells with row-numbered errors
struct RowReader<'a> {
    row: usize,
    cells: HashMap<&'a str, Cell<'a>>,
}

impl<'a> RowReader<'a> {
    fn cell(&self, column: &'static str) -> Option<Cell<'a>> {
        match self.cells.get(column) {
            Some(Cell::Text(text)) if is_missing(text) => None,
            other => other.copied(),
        }
    }

    fn invalid(&self, column: &'static str, value: String, reason: &'static str) -> IngestError {
        IngestError::InvalidInput {
            row: self.row,
            column,
            value,
            reason,
        }
    }

    fn text(&self, column: &'static str) -> Option<String> {
        match self.cell(column)? {
            Cell::Text(text) => Some(text.trim().to_string()),
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    fn float(&self, column: &'static str) -> Result<Option<f64>, IngestError> {
        let value = match self.cell(column) {
            None => return Ok(None),
            Some(Cell::Number(n)) => n,
            Some(Cell::Text(text)) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| self.invalid(column, text.to_string(), "expected a number"))?,
        };
        if !value.is_finite() {
            return Err(self.invalid(column, value.to_string(), "expected a finite number"));
        }
        Ok(Some(value))
    }

    /// Non-negative whole number; spreadsheets often store counts as `3.0`
    fn whole(&self, column: &'static str) -> Result<Option<f64>, IngestError> {
        match self.float(column)? {
            Some(v) if v < 0.0 => {
                Err(self.invalid(column, v.to_string(), "count must not be negative"))
            }
            Some(v) if v.fract() != 0.0 => {
                Err(self.invalid(column, v.to_string(), "count must be a whole number"))
            }
            other => Ok(other),
        }
    }

    fn count(&self, column: &'static str) -> Result<Option<u32>, IngestError> {
        match self.whole(column)? {
            Some(v) if v > f64::from(u32::MAX) => {
                Err(self.invalid(column, v.to_string(), "count is too large"))
            }
            other => Ok(other.map(|v| v as u32)),
        }
    }

    fn population(&self, column: &'static str) -> Result<Option<u64>, IngestError> {
        match self.whole(column)? {
            Some(v) if v > u64::MAX as f64 => {
                Err(self.invalid(column, v.to_string(), "population is too large"))
            }
            other => Ok(other.map(|v| v as u64)),
        }
    }

    fn into_record(self) -> Result<SiteRecord, IngestError> {
        let record = SiteRecord {
            name: self.text(columns::NAME),
            pm25: self.float(columns::PM25)?,
            pm10: self.float(columns::PM10)?,
            no2: self.float(columns::NO2)?,
            o3: self.float(columns::O3)?,
            air_quality_index: self.float(columns::AIR_QUALITY_INDEX)?,
            humidity: self.float(columns::HUMIDITY)?,
            weather_conditions: self.text(columns::WEATHER_CONDITIONS),
            nearby_water_points: self.count(columns::WATER_POINTS)?,
            soil_ph: self.float(columns::SOIL_PH)?,
            organic_carbon: self.float(columns::ORGANIC_CARBON)?,
            clay_pct: self.float(columns::CLAY)?,
            sand_pct: self.float(columns::SAND)?,
            nearby_dwellings: self.count(columns::DWELLINGS)?,
            nearby_industrial_zones: self.count(columns::INDUSTRIAL_ZONES)?,
            country_population: self.population(columns::POPULATION)?,
            water_access_pct: self.float(columns::WATER_ACCESS)?,
            forest_cover_pct: self.float(columns::FOREST_COVER)?,
        };
        record
            .validate()
            .map_err(|v| self.invalid(v.column, v.value, v.reason))?;
        Ok(record)
    }
}

fn is_missing(text: &str) -> bool {
    MISSING_MARKERS.contains(&text.trim())
}

/// Parse CSV content; rows are numbered from 1, excluding the header
pub fn parse_csv(content: &str) -> Result<Vec<SiteRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = result?;
        let cells = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column, Cell::Text(value)))
            .collect();
        records.push(
            RowReader {
                row: index + 1,
                cells,
            }
            .into_record()?,
        );
    }
    Ok(records)
}

/// Parse a JSON array of site objects; rows are numbered from 1
pub fn parse_json(content: &str) -> Result<Vec<SiteRecord>, IngestError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let rows = value.as_array().ok_or(IngestError::NotAnArray)?;

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let object = row.as_object().ok_or_else(|| IngestError::InvalidInput {
            row: row_number,
            column: "*",
            value: row.to_string(),
            reason: "expected an object",
        })?;

        let mut cells = HashMap::new();
        for (key, value) in object {
            let cell = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => Cell::Text(s.as_str()),
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(f) => Cell::Number(f),
                    None => continue,
                },
                other => {
                    if let Some(column) = known_column(key) {
                        return Err(IngestError::InvalidInput {
                            row: row_number,
                            column,
                            value: other.to_string(),
                            reason: "expected a number or string",
                        });
                    }
                    continue;
                }
            };
            cells.insert(key.as_str(), cell);
        }

        if let Some(Cell::Number(n)) = cells.get(columns::WEATHER_CONDITIONS) {
            return Err(IngestError::InvalidInput {
                row: row_number,
                column: columns::WEATHER_CONDITIONS,
                value: n.to_string(),
                reason: "expected text",
            });
        }

        records.push(
            RowReader {
                row: row_number,
                cells,
            }
            .into_record()?,
        );
    }
    Ok(records)
}

/// Map a key to its known column constant
fn known_column(key: &str) -> Option<&'static str> {
    const ALL: &[&str] = &[
        columns::NAME,
        columns::PM25,
        columns::PM10,
        columns::NO2,
        columns::O3,
        columns::AIR_QUALITY_INDEX,
        columns::HUMIDITY,
        columns::WEATHER_CONDITIONS,
        columns::WATER_POINTS,
        columns::SOIL_PH,
        columns::ORGANIC_CARBON,
        columns::CLAY,
        columns::SAND,
        columns::DWELLINGS,
        columns::INDUSTRIAL_ZONES,
        columns::POPULATION,
        columns::WATER_ACCESS,
        columns::FOREST_COVER,
    ];
    ALL.iter().copied().find(|c| *c == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_with_gaps() {
        let csv = "nom_site,pm25,humidite,ph_sol,habitations_proximite,latitude\n\
                   Berge,40,20,9.0,150,33.5\n\
                   Colline,,NA,6.5,,34.0\n";
        let records = parse_csv(csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Berge"));
        assert_eq!(records[0].pm25, Some(40.0));
        assert_eq!(records[0].nearby_dwellings, Some(150));
        assert_eq!(records[1].pm25, None);
        assert_eq!(records[1].humidity, None);
        assert_eq!(records[1].soil_ph, Some(6.5));
        assert_eq!(records[1].nearby_dwellings, None);
    }

    #[test]
    fn test_csv_counts_accept_whole_floats() {
        let csv = "points_eau_proximite,population_pays\n3.0,37000000\n";
        let records = parse_csv(csv).unwrap();
        assert_eq!(records[0].nearby_water_points, Some(3));
        assert_eq!(records[0].country_population, Some(37_000_000));
    }

    #[test]
    fn test_csv_rejects_non_numeric() {
        let csv = "nom_site,pm25\nA,12\nB,beaucoup\n";
        match parse_csv(csv) {
            Err(IngestError::InvalidInput {
                row, column, value, ..
            }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "pm25");
                assert_eq!(value, "beaucoup");
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_rejects_negative_and_fractional_counts() {
        assert!(matches!(
            parse_csv("habitations_proximite\n-3\n"),
            Err(IngestError::InvalidInput { .. })
        ));
        assert!(matches!(
            parse_csv("zones_industrielles_proximite\n2.5\n"),
            Err(IngestError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_csv_rejects_air_quality_index_out_of_range() {
        let err = parse_csv("indice_qualite_air\n7\n").unwrap_err();
        assert!(err.to_string().contains("indice_qualite_air"));
    }

    #[test]
    fn test_parse_json_rows() {
        let json = r#"[
            {"nom_site": "A", "pm25": 40, "humidite": "20", "conditions_meteo": "Pluie", "sable": null},
            {"nom_site": "B", "extra": {"nested": true}}
        ]"#;
        let records = parse_json(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pm25, Some(40.0));
        assert_eq!(records[0].humidity, Some(20.0));
        assert_eq!(records[0].weather_conditions.as_deref(), Some("Pluie"));
        assert_eq!(records[0].sand_pct, None);
        assert_eq!(records[1], SiteRecord {
            name: Some("B".to_string()),
            ..Default::default()
        });
    }

    #[test]
    fn test_json_rejects_wrong_shapes() {
        assert!(matches!(
            parse_json(r#"{"pm25": 3}"#),
            Err(IngestError::NotAnArray)
        ));
        assert!(matches!(
            parse_json(r#"[42]"#),
            Err(IngestError::InvalidInput { row: 1, .. })
        ));
        assert!(matches!(
            parse_json(r#"[{"pm25": true}]"#),
            Err(IngestError::InvalidInput { column: "pm25", .. })
        ));
        assert!(matches!(
            parse_json(r#"[{"conditions_meteo": 3}]"#),
            Err(IngestError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = InputFormat::from_path(Path::new("sites.xlsx")).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
        assert_eq!(
            InputFormat::from_path(Path::new("SITES.CSV")).unwrap(),
            InputFormat::Csv
        );
    }

    #[test]
    fn test_load_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        std::fs::write(&path, "nom_site,ph_sol\nA,5.0\n").unwrap();
        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].soil_ph, Some(5.0));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_records(Path::new("/nonexistent/sites.json")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
