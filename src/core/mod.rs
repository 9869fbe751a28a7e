// Scoring core exports
pub mod alignment;
pub mod error;
pub mod estimator;
pub mod handle;

pub use alignment::{align_batch, align_record, coerce_value, parse_batch, AlignedMatrix, FeatureSchema};
pub use error::{ModelError, PredictionError};
pub use estimator::{Estimator, ModelArtifact, ScoringModel, Tree, TreeNode};
pub use handle::{ActiveModel, ModelHandle};
