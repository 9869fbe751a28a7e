use thiserror::Error;

/// Failures while turning a request payload into probabilities
#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("payload is not tabular: {0}")]
    NonTabular(String),

    #[error("record {index} is not a JSON object")]
    NonObjectRecord { index: usize },

    #[error("column '{column}' has {found} values, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("batch contains no records")]
    EmptyBatch,

    #[error("matrix has {found} features per row, model expects {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("model produced a non-finite probability for record {row}")]
    NonFiniteOutput { row: usize },
}

/// Problems with a model artifact detected at load time
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model declares no features")]
    NoFeatures,

    #[error("feature name at position {0} is empty")]
    EmptyFeatureName(usize),

    #[error("feature '{0}' is declared more than once")]
    DuplicateFeature(String),

    #[error("model needs at least two classes, found {0}")]
    TooFewClasses(usize),

    #[error("{estimator} estimator supports exactly {expected} classes, found {found}")]
    ClassCount {
        estimator: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{what} has length {found}, expected {expected}")]
    Dimension {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("parameter {0} is not finite")]
    NonFiniteParameter(String),

    #[error("tree {tree} is empty")]
    EmptyTree { tree: usize },

    #[error("tree {tree} node {node}: {reason}")]
    InvalidNode {
        tree: usize,
        node: usize,
        reason: String,
    },
}
