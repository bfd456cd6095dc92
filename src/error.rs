use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub type StockResult<T> = Result<T, StockError>;

#[derive(Error, Debug)]
pub enum StockError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Could not open workbook: {0}")]
    Workbook(String),

    #[error("Could not find a 'Totals' sheet in the workbook to determine area order")]
    MissingTotalsSheet,

    #[error("Could not find header row ('Inventories', 'Totals') in sheet '{sheet}'")]
    MissingHeaderRow { sheet: String },

    #[error("No valid inventory items were found in the workbook. Check the file's content and structure")]
    NoValidItemsFound,

    #[error("No data to export for building '{building}' on {date}")]
    EmptyExportTarget { building: String, date: NaiveDate },

    #[error("Export error: {0}")]
    Export(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl StockError {
    /// True for errors caused by the content of an uploaded workbook rather
    /// than by the environment.
    pub fn is_workbook_content(&self) -> bool {
        matches!(
            self,
            StockError::Workbook(_)
                | StockError::MissingTotalsSheet
                | StockError::MissingHeaderRow { .. }
                | StockError::NoValidItemsFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_export_message_names_building_and_date() {
        let err = StockError::EmptyExportTarget {
            building: "Pavilion".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Pavilion"));
        assert!(msg.contains("2025-03-01"));
    }

    #[test]
    fn test_workbook_content_classification() {
        assert!(StockError::MissingTotalsSheet.is_workbook_content());
        assert!(StockError::NoValidItemsFound.is_workbook_content());
        assert!(StockError::MissingHeaderRow {
            sheet: "Totals".to_string()
        }
        .is_workbook_content());
        assert!(!StockError::NotFound("x".to_string()).is_workbook_content());
        assert!(!StockError::Validation("x".to_string()).is_workbook_content());
    }

    #[test]
    fn test_file_read_message_includes_path() {
        let err = StockError::FileRead {
            path: PathBuf::from("/tmp/missing.xlsx"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/tmp/missing.xlsx"));
    }
}
