//! Common test utilities for the sentiment integration tests
//!
//! Small labeled corpora and helpers that write them to disk in the layouts
//! the dataset sources understand.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use review_sentiment::config::Config;
use review_sentiment::dataset::{DatasetSplits, InMemorySource};
use review_sentiment::ml::models::{Label, Review, VectorizerConfig};

pub const POSITIVE_TRAIN: &[&str] = &[
    "A great movie, I loved it!",
    "Wonderful acting and a brilliant plot.",
    "<br />Great fun, loved every minute.",
    "Brilliant direction, wonderful cast.",
    "An amazing and moving story. Great!",
    "Loved the soundtrack, brilliant film.",
];

pub const NEGATIVE_TRAIN: &[&str] = &[
    "Terrible movie, a waste of time.",
    "Boring and predictable plot.",
    "Awful acting. Terrible script!",
    "What a waste, boring from start to end.",
    "Predictable, dull and terrible.",
    "Awful film, boring characters.",
];

pub const POSITIVE_TEST: &[&str] = &[
    "Great cast, wonderful story",
    "Loved it, brilliant and amazing zanzibarian twist",
];

pub const NEGATIVE_TEST: &[&str] = &[
    "Boring waste of an evening",
    "Terrible and awful, quokkaesque dialogue",
];

fn labeled(texts: &[&str], label: Label) -> Vec<Review> {
    texts.iter().map(|t| Review::new(*t, label)).collect()
}

/// Balanced toy splits
pub fn toy_splits() -> DatasetSplits {
    let mut train = labeled(POSITIVE_TRAIN, Label::Positive);
    train.extend(labeled(NEGATIVE_TRAIN, Label::Negative));

    let mut test = labeled(POSITIVE_TEST, Label::Positive);
    test.extend(labeled(NEGATIVE_TEST, Label::Negative));

    DatasetSplits::new(train, test)
}

pub fn toy_source() -> InMemorySource {
    InMemorySource::new("toy reviews", toy_splits())
}

/// Vectorizer that keeps every term of a tiny corpus
pub fn loose_vectorizer() -> VectorizerConfig {
    VectorizerConfig {
        min_df: 1,
        max_df: 1.0,
        ..VectorizerConfig::default()
    }
}

/// Default configuration writing into `dir`
pub fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.models_dir = dir.join("models");
    config.paths.results_dir = dir.join("results");
    config.vectorizer = loose_vectorizer();
    config
}

/// Write splits in the aclImdb layout under `root`
pub fn write_imdb_tree(root: &Path, splits: &DatasetSplits) {
    for (split, reviews) in [("train", &splits.train), ("test", &splits.test)] {
        for (i, review) in reviews.iter().enumerate() {
            let class = match review.label {
                Label::Positive => "pos",
                Label::Negative => "neg",
            };
            let dir = root.join(split).join(class);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(format!("{}_7.txt", i)), &review.text).unwrap();
        }
    }
}

/// Write one split as JSON lines
pub fn write_jsonl(path: &Path, reviews: &[Review]) {
    let lines: Vec<String> = reviews
        .iter()
        .map(|r| {
            serde_json::json!({ "text": r.text, "label": r.label.as_index() }).to_string()
        })
        .collect();
    fs::write(path, lines.join("\n")).unwrap();
}
