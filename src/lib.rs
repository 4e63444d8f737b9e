//! Movie review sentiment classification.
//!
//! Trains a TF-IDF + logistic regression classifier over labeled reviews,
//! persists the fitted artifacts and serves predictions from an interactive
//! shell.

pub mod config;
pub mod dataset;
pub mod error;
pub mod ml;
pub mod observability;
pub mod shell;
pub mod training;

pub use config::Config;
pub use error::{AppError, Result};
