use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{DatasetSource, DatasetSplits};
use crate::error::{AppError, Result};
use crate::ml::models::{Label, Review};

/// aclImdb directory tree: `<root>/{train,test}/{neg,pos}/*.txt`
#[derive(Debug, Clone)]
pub struct ImdbDirectorySource {
    name: String,
    root: PathBuf,
}

impl ImdbDirectorySource {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_split(&self, split: &str) -> Result<Vec<Review>> {
        let mut reviews = Vec::new();
        for (dir_name, label) in [("neg", Label::Negative), ("pos", Label::Positive)] {
            let dir = self.root.join(split).join(dir_name);
            for path in Self::review_files(&dir)? {
                let text = fs::read_to_string(&path).map_err(|e| {
                    AppError::Dataset(format!("Failed to read {}: {}", path.display(), e))
                })?;
                reviews.push(Review::new(text, label));
            }
        }
        Ok(reviews)
    }

    /// `.txt` files of one class directory, in sorted path order
    fn review_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| {
            AppError::Dataset(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| AppError::Dataset(format!("{}: {}", dir.display(), e)))?
                .path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "txt") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl DatasetSource for ImdbDirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<DatasetSplits> {
        let splits = DatasetSplits::new(self.load_split("train")?, self.load_split("test")?);
        splits.validate()?;

        info!(
            root = %self.root.display(),
            train = splits.train.len(),
            test = splits.test.len(),
            "Loaded IMDB directory dataset"
        );

        Ok(splits)
    }
}
