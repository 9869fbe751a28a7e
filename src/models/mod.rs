// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{EstimatorKind, ProbabilityVector, Record, RecordBatch};
pub use requests::NewModelRequest;
pub use responses::{ErrorResponse, HealthResponse, ModelChangedResponse, ModelInfoResponse};
