//! Model bundle persistence and lifecycle.
//!
//! A bundle is the full persisted set of classifiers and vocabularies for
//! one service, written as a single self-contained artifact inside a
//! schema-versioned envelope. Absence of the artifact is the expected
//! "not yet trained" steady state, not an error. At runtime a bundle is
//! read-only and shared through a [`BundleSlot`], which supports wholesale
//! atomic replacement: readers see either the old or the new complete
//! bundle, never a partial one.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PaideiaError, Result};

/// Current persisted bundle format version. Bumped on any incompatible
/// change so stale artifacts are rejected instead of silently misread.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Versioned container around one service's persisted model state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleEnvelope<T> {
    /// Persisted format version.
    pub format_version: u32,
    /// Service identifier the payload belongs to.
    pub service: String,
    /// When the payload was trained.
    pub trained_at: DateTime<Utc>,
    /// The classifiers and vocabularies themselves.
    pub payload: T,
}

/// Persist a trained bundle as one artifact.
///
/// The artifact is written to a temporary sibling file and renamed into
/// place, so a concurrent loader never observes a partially written bundle.
pub fn save_bundle<T: Serialize>(path: &Path, service: &str, payload: &T) -> Result<()> {
    let envelope = BundleEnvelope {
        format_version: BUNDLE_FORMAT_VERSION,
        service: service.to_string(),
        trained_at: Utc::now(),
        payload,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(&envelope)?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;

    log::info!("saved {service} bundle to {}", path.display());
    Ok(())
}

/// Load a persisted bundle, if one exists.
///
/// Returns `Ok(None)` when the artifact is absent. A format version
/// mismatch or a payload for a different service is rejected.
pub fn load_bundle<T: DeserializeOwned>(path: &Path, service: &str) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("no {service} bundle at {}", path.display());
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let envelope: BundleEnvelope<T> = serde_json::from_str(&content)?;
    if envelope.format_version != BUNDLE_FORMAT_VERSION {
        return Err(PaideiaError::BundleVersion {
            found: envelope.format_version,
            expected: BUNDLE_FORMAT_VERSION,
        });
    }
    if envelope.service != service {
        return Err(PaideiaError::invalid_input(format!(
            "bundle at {} belongs to service '{}', expected '{}'",
            path.display(),
            envelope.service,
            service
        )));
    }

    log::info!(
        "loaded {service} bundle from {} (trained {})",
        path.display(),
        envelope.trained_at
    );
    Ok(Some(envelope.payload))
}

/// Shared slot holding the currently resident bundle.
///
/// Single-writer / multi-reader discipline: `get` hands out an `Arc` to the
/// complete current bundle without blocking predictions, and `replace` swaps
/// in a newly trained bundle wholesale.
pub struct BundleSlot<T> {
    inner: RwLock<Option<Arc<T>>>,
}

impl<T> BundleSlot<T> {
    /// Create an empty slot (the "not yet trained" state).
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// The currently resident bundle, if any.
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.read().clone()
    }

    /// Replace the resident bundle wholesale.
    pub fn replace(&self, bundle: T) {
        *self.inner.write() = Some(Arc::new(bundle));
    }

    /// Whether a bundle is resident.
    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }
}

impl<T> Default for BundleSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for BundleSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleSlot")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestPayload {
        weights: Vec<f64>,
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("bundle.json");
        let payload = TestPayload {
            weights: vec![0.25, 0.75],
        };

        save_bundle(&path, "test-service", &payload).unwrap();
        let restored: Option<TestPayload> = load_bundle(&path, "test-service").unwrap();
        assert_eq!(restored, Some(payload));
    }

    #[test]
    fn test_missing_bundle_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let restored: Option<TestPayload> = load_bundle(&path, "test-service").unwrap();
        assert!(restored.is_none());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        let stale = json!({
            "format_version": 99,
            "service": "test-service",
            "trained_at": Utc::now(),
            "payload": { "weights": [1.0] },
        });
        fs::write(&path, stale.to_string()).unwrap();

        let err = load_bundle::<TestPayload>(&path, "test-service").unwrap_err();
        assert!(matches!(
            err,
            PaideiaError::BundleVersion {
                found: 99,
                expected: BUNDLE_FORMAT_VERSION
            }
        ));
    }

    #[test]
    fn test_service_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        let payload = TestPayload {
            weights: vec![1.0],
        };
        save_bundle(&path, "other-service", &payload).unwrap();

        let err = load_bundle::<TestPayload>(&path, "test-service").unwrap_err();
        assert!(matches!(err, PaideiaError::InvalidInput(_)));
    }

    #[test]
    fn test_slot_swap_is_wholesale() {
        let slot: BundleSlot<TestPayload> = BundleSlot::new();
        assert!(!slot.is_loaded());
        assert!(slot.get().is_none());

        slot.replace(TestPayload {
            weights: vec![1.0],
        });
        let first = slot.get().unwrap();

        slot.replace(TestPayload {
            weights: vec![2.0],
        });
        let second = slot.get().unwrap();

        // The old handle still sees the complete old bundle.
        assert_eq!(first.weights, vec![1.0]);
        assert_eq!(second.weights, vec![2.0]);
    }
}
