use crate::core::alignment::{align_batch, AlignedMatrix, FeatureSchema};
use crate::core::error::{ModelError, PredictionError};
use crate::models::{EstimatorKind, ProbabilityVector, RecordBatch};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// On-disk model artifact, as produced by the training pipeline's exporter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    #[serde(default = "default_classes")]
    pub classes: Vec<Value>,
    pub estimator: Estimator,
}

fn default_classes() -> Vec<Value> {
    vec![Value::from(0), Value::from(1)]
}

/// Estimator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Binary logistic regression
    Logistic { coefficients: Vec<f64>, intercept: f64 },
    /// Multinomial logistic regression, one coefficient row per class
    Softmax {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    /// Binary gradient-boosted trees with a logistic link
    TreeEnsemble {
        #[serde(default)]
        base_score: f64,
        trees: Vec<Tree>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// Flat tree node; evaluation starts at node 0
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Goes to `left` when `x[feature] < threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

impl Estimator {
    pub fn kind(&self) -> EstimatorKind {
        match self {
            Estimator::Logistic { .. } => EstimatorKind::Logistic,
            Estimator::Softmax { .. } => EstimatorKind::Softmax,
            Estimator::TreeEnsemble { .. } => EstimatorKind::TreeEnsemble,
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ModelError> {
        match self {
            Estimator::Logistic { coefficients, intercept } => {
                expect_classes("logistic", 2, n_classes)?;
                expect_len("coefficients", n_features, coefficients.len())?;
                expect_finite("intercept", std::iter::once(intercept))?;
                expect_finite("coefficients", coefficients)
            }
            Estimator::Softmax { coefficients, intercepts } => {
                expect_len("coefficients", n_classes, coefficients.len())?;
                expect_len("intercepts", n_classes, intercepts.len())?;
                for (class, row) in coefficients.iter().enumerate() {
                    expect_len(&format!("coefficients[{}]", class), n_features, row.len())?;
                    expect_finite("coefficients", row)?;
                }
                expect_finite("intercepts", intercepts)
            }
            Estimator::TreeEnsemble { base_score, trees } => {
                expect_classes("tree_ensemble", 2, n_classes)?;
                expect_finite("base_score", std::iter::once(base_score))?;
                for (index, tree) in trees.iter().enumerate() {
                    tree.validate(index, n_features)?;
                }
                Ok(())
            }
        }
    }

    fn predict_row(&self, row: &[f64]) -> ProbabilityVector {
        match self {
            Estimator::Logistic { coefficients, intercept } => {
                let p = sigmoid(dot(coefficients, row) + intercept);
                vec![1.0 - p, p]
            }
            Estimator::Softmax { coefficients, intercepts } => {
                let scores: Vec<f64> = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(weights, bias)| dot(weights, row) + bias)
                    .collect();
                softmax(&scores)
            }
            Estimator::TreeEnsemble { base_score, trees } => {
                let margin: f64 = base_score + trees.iter().map(|tree| tree.evaluate(row)).sum::<f64>();
                let p = sigmoid(margin);
                vec![1.0 - p, p]
            }
        }
    }
}

impl Tree {
    fn validate(&self, tree: usize, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::EmptyTree { tree });
        }

        let n_nodes = self.nodes.len();
        for (node, entry) in self.nodes.iter().enumerate() {
            let invalid = |reason: String| ModelError::InvalidNode { tree, node, reason };
            match entry {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        return Err(invalid(format!(
                            "feature index {} out of range ({} features)",
                            feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid("threshold is not finite".to_string()));
                    }
                    // Children must point forward so evaluation terminates
                    for child in [left, right] {
                        if *child <= node || *child >= n_nodes {
                            return Err(invalid(format!("child index {} is invalid", child)));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid("leaf value is not finite".to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let x = row.get(*feature).copied().unwrap_or(0.0);
                    index = if x < *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                // Unreachable for validated trees
                None => return 0.0,
            }
        }
    }
}

/// A validated model ready to serve predictions
#[derive(Debug, Clone)]
pub struct ScoringModel {
    schema: FeatureSchema,
    classes: Vec<Value>,
    estimator: Estimator,
}

impl ScoringModel {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        let schema = FeatureSchema::new(artifact.feature_names)?;
        if artifact.classes.len() < 2 {
            return Err(ModelError::TooFewClasses(artifact.classes.len()));
        }
        artifact.estimator.validate(schema.len(), artifact.classes.len())?;

        Ok(Self {
            schema,
            classes: artifact.classes,
            estimator: artifact.estimator,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn classes(&self) -> &[Value] {
        &self.classes
    }

    pub fn kind(&self) -> EstimatorKind {
        self.estimator.kind()
    }

    /// Align a batch against this model's schema and score it
    pub fn predict(&self, batch: &RecordBatch) -> Result<Vec<ProbabilityVector>, PredictionError> {
        let matrix = align_batch(&self.schema, batch);
        self.predict_proba(&matrix)
    }

    /// Score an already aligned matrix, one probability vector per row
    pub fn predict_proba(&self, matrix: &AlignedMatrix) -> Result<Vec<ProbabilityVector>, PredictionError> {
        if matrix.n_features() != self.schema.len() {
            return Err(PredictionError::ShapeMismatch {
                expected: self.schema.len(),
                found: matrix.n_features(),
            });
        }
        if matrix.n_rows() == 0 {
            return Err(PredictionError::EmptyBatch);
        }

        matrix
            .rows()
            .enumerate()
            .map(|(row_index, row)| {
                let probabilities = self.estimator.predict_row(row);
                if probabilities.iter().all(|p| p.is_finite()) {
                    Ok(probabilities)
                } else {
                    Err(PredictionError::NonFiniteOutput { row: row_index })
                }
            })
            .collect()
    }
}

fn expect_classes(estimator: &'static str, expected: usize, found: usize) -> Result<(), ModelError> {
    if expected == found {
        Ok(())
    } else {
        Err(ModelError::ClassCount { estimator, expected, found })
    }
}

fn expect_len(what: &str, expected: usize, found: usize) -> Result<(), ModelError> {
    if expected == found {
        Ok(())
    } else {
        Err(ModelError::Dimension {
            what: what.to_string(),
            expected,
            found,
        })
    }
}

fn expect_finite<'a>(what: &str, values: impl IntoIterator<Item = &'a f64>) -> Result<(), ModelError> {
    if values.into_iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::NonFiniteParameter(what.to_string()))
    }
}

#[inline]
fn dot(weights: &[f64], row: &[f64]) -> f64 {
    weights.iter().zip(row).map(|(w, x)| w * x).sum()
}

/// Numerically stable logistic function
#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
