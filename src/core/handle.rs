use crate::core::estimator::ScoringModel;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// A model together with the id it was loaded under
#[derive(Debug)]
pub struct ActiveModel {
    pub id: String,
    pub model: ScoringModel,
    pub loaded_at: DateTime<Utc>,
}

impl ActiveModel {
    pub fn new(id: impl Into<String>, model: ScoringModel) -> Self {
        Self {
            id: id.into(),
            model,
            loaded_at: Utc::now(),
        }
    }
}

/// Process-wide, swappable model handle
///
/// Readers take an `Arc` snapshot and drop the lock before scoring, so a
/// request always sees one complete model (weights, schema and id together)
/// even if a swap lands while it is running.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    inner: Arc<RwLock<Arc<ActiveModel>>>,
}

impl ModelHandle {
    pub fn new(initial: ActiveModel) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Snapshot of the currently active model
    pub fn current(&self) -> Arc<ActiveModel> {
        // The guarded value is a single Arc, so a poisoned lock still holds a
        // complete snapshot
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the active model, returning the previous one
    pub fn replace(&self, next: ActiveModel) -> Arc<ActiveModel> {
        let next = Arc::new(next);
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::estimator::ModelArtifact;
    use serde_json::json;

    fn model(features: &[&str]) -> ScoringModel {
        let coefficients = vec![0.1; features.len()];
        let artifact: ModelArtifact = serde_json::from_value(json!({
            "feature_names": features,
            "estimator": {
                "kind": "logistic",
                "coefficients": coefficients,
                "intercept": 0.0
            }
        }))
        .unwrap();
        ScoringModel::from_artifact(artifact).unwrap()
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let handle = ModelHandle::new(ActiveModel::new("v1", model(&["a", "b"])));
        let before = handle.current();

        let previous = handle.replace(ActiveModel::new("v2", model(&["c"])));

        assert_eq!(previous.id, "v1");
        assert_eq!(before.id, "v1");
        assert_eq!(before.model.schema().len(), 2);

        let after = handle.current();
        assert_eq!(after.id, "v2");
        assert_eq!(after.model.schema().names(), &["c".to_string()]);
    }

    #[test]
    fn test_concurrent_readers_see_whole_models() {
        let handle = ModelHandle::new(ActiveModel::new("two", model(&["a", "b"])));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let snapshot = handle.current();
                        let expected = if snapshot.id == "two" { 2 } else { 3 };
                        assert_eq!(snapshot.model.schema().len(), expected);
                    }
                })
            })
            .collect();

        for i in 0..100 {
            if i % 2 == 0 {
                handle.replace(ActiveModel::new("three", model(&["x", "y", "z"])));
            } else {
                handle.replace(ActiveModel::new("two", model(&["a", "b"])));
            }
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
