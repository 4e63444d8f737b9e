use crate::error::{AppError, Result};
use crate::ml::models::{StopWords, VectorizerConfig};
use crate::ml::stop_words;
use ndarray::Array1;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use validator::Validate;

/// Tokens are runs of two or more word characters.
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Sparse feature vector: sorted `(index, weight)` pairs over a fixed dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build a vector; entries are sorted by index and must lie inside `dim`.
    pub fn new(dim: usize, mut entries: Vec<(usize, f64)>) -> Result<Self> {
        entries.sort_by_key(|(idx, _)| *idx);
        if let Some((idx, _)) = entries.iter().find(|(idx, _)| *idx >= dim) {
            return Err(AppError::Validation(format!(
                "feature index {} out of bounds for dimension {}",
                idx, dim
            )));
        }
        Ok(Self { dim, entries })
    }

    /// All-zero vector
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, v)| *v == 0.0)
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(idx, _)| *idx)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Dot product against dense weights of the same dimension
    pub fn dot(&self, weights: &Array1<f64>) -> f64 {
        self.entries
            .iter()
            .map(|&(idx, value)| value * weights[idx])
            .sum()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(idx, value) in &self.entries {
            dense[idx] = value;
        }
        dense
    }
}

/// Text to feature vector capability
pub trait FeatureExtractor: Send + Sync {
    /// Learn vocabulary and weights from training documents
    fn fit(&mut self, documents: &[String]) -> Result<()>;

    /// Map a document onto the frozen vocabulary
    fn transform(&self, document: &str) -> Result<SparseVector>;

    /// Fit and transform in one step
    fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    /// Dimension of produced vectors
    fn n_features(&self) -> usize;

    /// Check if fitted
    fn is_fitted(&self) -> bool;

    /// Hyperparameters the extractor fits with
    fn config(&self) -> &VectorizerConfig;
}

/// TF-IDF vectorizer over word unigrams and bigrams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Configuration
    config: VectorizerConfig,

    /// Vocabulary mapping (term -> index), indices follow term order
    vocabulary: BTreeMap<String, usize>,

    /// Inverse document frequency per index
    idf: Vec<f64>,

    /// Number of documents seen during fit
    n_documents: usize,

    /// Is fitted (vocabulary built)
    is_fitted: bool,
}

impl TfidfVectorizer {
    /// Create a new, unfitted vectorizer
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            is_fitted: false,
        }
    }

    /// Get vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Vocabulary terms in index order
    pub fn feature_names(&self) -> Vec<&str> {
        self.vocabulary.keys().map(|t| t.as_str()).collect()
    }

    /// IDF weight of a term, if it is in the vocabulary
    pub fn idf_of(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&idx| self.idf[idx])
    }

    /// Number of documents the vocabulary was learned from
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    fn is_stop_word(&self, token: &str) -> bool {
        match self.config.stop_words {
            StopWords::English => stop_words::is_english_stop_word(token),
            StopWords::None => false,
        }
    }

    /// Extract n-gram terms from a document
    fn extract_terms(&self, document: &str) -> Vec<String> {
        let lowered;
        let text = if self.config.lowercase {
            lowered = document.to_lowercase();
            lowered.as_str()
        } else {
            document
        };

        let words: Vec<&str> = TOKEN
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|w| !self.is_stop_word(w))
            .collect();

        let (min_n, max_n) = self.config.ngram_range;
        let mut terms = Vec::new();

        for n in min_n.max(1)..=max_n {
            if n > words.len() {
                break;
            }
            for window in words.windows(n) {
                terms.push(window.join(" "));
            }
        }

        terms
    }
}

impl FeatureExtractor for TfidfVectorizer {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.config.validate()?;

        if documents.is_empty() {
            return Err(AppError::Training(
                "Cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }

        let n_docs = documents.len();
        let max_doc_count = self.config.max_df * n_docs as f64;
        if max_doc_count < self.config.min_df as f64 {
            return Err(AppError::Training(
                "max_df corresponds to fewer documents than min_df".to_string(),
            ));
        }

        // Document frequency and total corpus count per term
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut term_count: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = self.extract_terms(doc);
            let mut seen: HashSet<&str> = HashSet::new();

            for term in &terms {
                *term_count.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        // Filter vocabulary by document frequency bounds
        let mut candidates: Vec<(String, usize, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.config.min_df && (*df as f64) <= max_doc_count)
            .map(|(term, df)| {
                let count = term_count.get(&term).copied().unwrap_or(0);
                (term, df, count)
            })
            .collect();

        // Keep the most frequent terms, ties broken alphabetically
        if let Some(limit) = self.config.max_features {
            if candidates.len() > limit {
                candidates.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
                candidates.truncate(limit);
            }
        }

        if candidates.is_empty() {
            return Err(AppError::Training(
                "After pruning, no terms remain. Try a lower min_df or a higher max_df."
                    .to_string(),
            ));
        }

        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(candidates.len());
        for (idx, (term, df, _)) in candidates.into_iter().enumerate() {
            // Smoothed IDF: ln((1 + n) / (1 + df)) + 1
            idf.push(((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, idx);
        }

        tracing::debug!(
            vocabulary = vocabulary.len(),
            documents = n_docs,
            "Fitted TF-IDF vocabulary"
        );

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_docs;
        self.is_fitted = true;

        Ok(())
    }

    fn transform(&self, document: &str) -> Result<SparseVector> {
        if !self.is_fitted {
            return Err(AppError::Internal(
                "TfidfVectorizer must be fitted before transform".to_string(),
            ));
        }

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.extract_terms(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for entry in &mut entries {
                entry.1 /= norm;
            }
        }

        SparseVector::new(self.idf.len(), entries)
    }

    fn n_features(&self) -> usize {
        self.idf.len()
    }

    fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose_config() -> VectorizerConfig {
        VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        }
    }

    fn corpus() -> Vec<String> {
        vec![
            "great movie loved it".to_string(),
            "terrible waste of time".to_string(),
            "great acting and a great plot".to_string(),
        ]
    }

    #[test]
    fn test_feature_extractor_creation() {
        let extractor = TfidfVectorizer::new(VectorizerConfig::default());

        assert!(!extractor.is_fitted());
        assert_eq!(extractor.vocab_size(), 0);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let extractor = TfidfVectorizer::new(VectorizerConfig::default());
        assert!(extractor.transform("anything").is_err());
    }

    #[test]
    fn test_ngram_extraction_skips_stop_words() {
        let extractor = TfidfVectorizer::new(loose_config());
        let terms = extractor.extract_terms("terrible waste of time");

        assert_eq!(
            terms,
            vec!["terrible", "waste", "time", "terrible waste", "waste time"]
        );
    }

    #[test]
    fn test_single_character_tokens_ignored() {
        let extractor = TfidfVectorizer::new(VectorizerConfig {
            stop_words: StopWords::None,
            ngram_range: (1, 1),
            ..loose_config()
        });
        assert_eq!(extractor.extract_terms("a b cd 9 42"), vec!["cd", "42"]);
    }

    #[test]
    fn test_vocabulary_sorted_and_indexed() {
        let mut extractor = TfidfVectorizer::new(loose_config());
        extractor.fit(&corpus()).unwrap();

        let names = extractor.feature_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(extractor.contains_term("great"));
        assert!(extractor.contains_term("waste time"));
        assert!(!extractor.contains_term("of"));
        assert_eq!(extractor.n_features(), names.len());
    }

    #[test]
    fn test_idf_smoothing() {
        let mut extractor = TfidfVectorizer::new(loose_config());
        extractor.fit(&corpus()).unwrap();

        // "great" appears in 2 of 3 documents
        let expected = (4.0_f64 / 3.0).ln() + 1.0;
        assert!((extractor.idf_of("great").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_document_frequency_bounds() {
        let docs: Vec<String> = vec![
            "common rare".to_string(),
            "common filler".to_string(),
            "common filler".to_string(),
        ];
        let mut extractor = TfidfVectorizer::new(VectorizerConfig {
            min_df: 2,
            max_df: 0.8,
            ngram_range: (1, 1),
            ..VectorizerConfig::default()
        });
        extractor.fit(&docs).unwrap();

        // "common" is in every document, "rare" in only one
        assert_eq!(extractor.feature_names(), vec!["filler"]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let docs: Vec<String> = vec![
            "alpha alpha alpha beta".to_string(),
            "alpha beta gamma".to_string(),
        ];
        let mut extractor = TfidfVectorizer::new(VectorizerConfig {
            max_features: Some(2),
            ngram_range: (1, 1),
            ..loose_config()
        });
        extractor.fit(&docs).unwrap();

        assert_eq!(extractor.feature_names(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_no_terms_remain() {
        let mut extractor = TfidfVectorizer::new(VectorizerConfig::default());
        let err = extractor.fit(&corpus()).unwrap_err();
        assert!(matches!(err, AppError::Training(_)));
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let mut extractor = TfidfVectorizer::new(loose_config());
        extractor.fit(&corpus()).unwrap();

        let vector = extractor.transform("great plot but terrible acting").unwrap();
        assert!((vector.norm() - 1.0).abs() < 1e-9);
        assert_eq!(vector.dim(), extractor.n_features());
    }

    #[test]
    fn test_out_of_vocabulary_is_zero() {
        let mut extractor = TfidfVectorizer::new(loose_config());
        extractor.fit(&corpus()).unwrap();

        let vector = extractor.transform("zebra xylophone quantum").unwrap();
        assert!(vector.is_zero());
        assert_eq!(vector.nnz(), 0);
        assert!(vector.to_dense().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fit_transform() {
        let mut extractor = TfidfVectorizer::new(loose_config());
        let features = extractor.fit_transform(&corpus()).unwrap();

        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| f.dim() == extractor.n_features()));
    }

    #[test]
    fn test_sparse_vector_bounds() {
        assert!(SparseVector::new(3, vec![(3, 1.0)]).is_err());

        let vector = SparseVector::new(4, vec![(2, 0.5), (0, 1.5)]).unwrap();
        assert_eq!(vector.entries(), &[(0, 1.5), (2, 0.5)]);
        assert_eq!(vector.get(2), 0.5);
        assert_eq!(vector.get(1), 0.0);
        assert_eq!(vector.to_dense(), vec![1.5, 0.0, 0.5, 0.0]);
        assert_eq!(vector.dot(&Array1::from(vec![2.0, 9.0, 4.0, 9.0])), 5.0);
    }
}
