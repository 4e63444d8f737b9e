//! Batch training workflow.
//!
//! The orchestrator loads a dataset, normalizes it, fits the vectorizer on
//! the training split only, fits the classifier, evaluates both splits,
//! persists the artifacts and writes the JSON and text reports.

pub mod orchestrator;
pub mod report;

pub use orchestrator::{TrainingOrchestrator, TrainingOutcome, SAMPLE_REVIEWS};
pub use report::{TrainingReport, CLASSIFICATION_REPORT_FILE, RESULTS_FILE};
