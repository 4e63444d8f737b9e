use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::{DatasetSource, DatasetSplits};
use crate::error::{AppError, Result};
use crate::ml::models::{Label, Review};

/// One line of a JSON-lines dataset file
#[derive(Debug, Deserialize)]
struct ReviewRecord {
    text: String,
    label: i64,
}

/// Train and test JSON-lines files of `{"text": ..., "label": 0|1}`
#[derive(Debug, Clone)]
pub struct JsonlSource {
    name: String,
    train_file: PathBuf,
    test_file: PathBuf,
}

impl JsonlSource {
    pub fn new(
        name: impl Into<String>,
        train_file: impl Into<PathBuf>,
        test_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            train_file: train_file.into(),
            test_file: test_file.into(),
        }
    }

    /// Parse every non-blank line of one file
    pub fn read_file(path: &Path) -> Result<Vec<Review>> {
        let file = File::open(path).map_err(|e| {
            AppError::Dataset(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mut reviews = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                AppError::Dataset(format!("{}:{}: {}", path.display(), idx + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let record: ReviewRecord = serde_json::from_str(&line).map_err(|e| {
                AppError::Dataset(format!(
                    "{}:{}: invalid record: {}",
                    path.display(),
                    idx + 1,
                    e
                ))
            })?;
            let label = Label::try_from(record.label).map_err(|e| {
                AppError::Dataset(format!("{}:{}: {}", path.display(), idx + 1, e))
            })?;

            reviews.push(Review::new(record.text, label));
        }

        Ok(reviews)
    }
}

impl DatasetSource for JsonlSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<DatasetSplits> {
        let splits = DatasetSplits::new(
            Self::read_file(&self.train_file)?,
            Self::read_file(&self.test_file)?,
        );
        splits.validate()?;

        info!(
            train_file = %self.train_file.display(),
            test_file = %self.test_file.display(),
            train = splits.train.len(),
            test = splits.test.len(),
            "Loaded JSON-lines dataset"
        );

        Ok(splits)
    }
}
