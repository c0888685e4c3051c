//! Adaptive recommendation service.
//!
//! Recommends the next learning step from a student's recent performance:
//! next topic, next action, and a difficulty adjustment, each with a
//! confidence score plus rule-based reasoning. The pipeline is encode
//! (categorical codes + scalars) → multi-head classify → decode with
//! confidence → explain.
//!
//! The same semantic attribute can appear on both sides of the model:
//! "topic" and "difficulty" are input features here while "next_topic" and
//! "next_difficulty_adj" are prediction targets, so their vocabularies are
//! fitted and stored separately (the value domains may diverge).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bank::{ClassifierBank, TargetColumn};
use crate::bundle::{BundleSlot, load_bundle, save_bundle};
use crate::decision::{Decision, resolve};
use crate::error::{PaideiaError, Result};
use crate::explain::recommendation_reasoning;
use crate::forest::{FeatureVector, ForestConfig};
use crate::labels::LabelVocabulary;

/// Service identifier recorded in persisted bundles.
pub const ADAPTIVE_SERVICE: &str = "adaptive-recommendation";

/// Input feature attribute names.
pub const ATTR_TOPIC: &str = "topic";
pub const ATTR_DIFFICULTY: &str = "difficulty";

/// Predicted attribute names.
pub const ATTR_NEXT_TOPIC: &str = "next_topic";
pub const ATTR_NEXT_ACTION: &str = "next_action";
pub const ATTR_NEXT_DIFFICULTY_ADJ: &str = "next_difficulty_adj";

/// One labeled training row for the adaptive service. Unknown columns in
/// the source data are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionSample {
    /// Topic the student just worked on.
    pub topic: String,
    /// Difficulty level of that work.
    pub difficulty: String,
    /// Assessment score, 0-100.
    pub score: f64,
    /// Number of attempts taken.
    pub attempts: u32,
    /// Minutes spent.
    pub time_spent: f64,
    /// Ground-truth next topic.
    pub next_topic: String,
    /// Ground-truth next action.
    pub next_action: String,
    /// Ground-truth difficulty adjustment (Increase / Decrease / Same).
    pub next_difficulty_adj: String,
}

/// A student's current performance state, the input to a recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentState {
    /// Current topic.
    pub topic: String,
    /// Current difficulty level.
    pub difficulty: String,
    /// Latest assessment score, 0-100.
    pub score: f64,
    /// Attempts taken, at least 1.
    pub attempts: u32,
    /// Minutes spent, positive.
    pub time_spent: f64,
}

/// Structured recommendation for one student state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    /// Recommended next topic with confidence.
    pub next_topic: Decision,
    /// Recommended next action with confidence.
    pub action: Decision,
    /// Recommended difficulty adjustment with confidence.
    pub difficulty_adjustment: Decision,
    /// Rule-based observational reasoning.
    pub reasoning: String,
}

/// Trained state for the adaptive service: three heads over the encoded
/// student state, input vocabularies for the categorical features, and one
/// output vocabulary per head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveBundle {
    /// Vocabularies for the categorical input features (topic, difficulty).
    pub input_vocabularies: BTreeMap<String, LabelVocabulary>,
    /// Vocabularies for the predicted attributes.
    pub output_vocabularies: BTreeMap<String, LabelVocabulary>,
    /// The three fitted heads.
    pub bank: ClassifierBank,
}

/// Configuration for [`AdaptiveLearningModel`].
#[derive(Debug, Clone)]
pub struct AdaptiveModelConfig {
    /// Where the trained bundle is persisted.
    pub bundle_path: PathBuf,
    /// Forest hyperparameters shared by all heads.
    pub forest: ForestConfig,
}

impl Default for AdaptiveModelConfig {
    fn default() -> Self {
        Self {
            bundle_path: PathBuf::from("models/adaptive_bundle.json"),
            forest: ForestConfig::default(),
        }
    }
}

/// Adaptive learning model: trains, persists, restores, and serves the
/// next-step recommendation bank.
#[derive(Debug)]
pub struct AdaptiveLearningModel {
    config: AdaptiveModelConfig,
    slot: BundleSlot<AdaptiveBundle>,
}

impl AdaptiveLearningModel {
    /// Create a model with the given configuration. No bundle is resident
    /// until [`train`](Self::train) or [`load`](Self::load) succeeds.
    pub fn new(config: AdaptiveModelConfig) -> Self {
        Self {
            config,
            slot: BundleSlot::new(),
        }
    }

    /// Train all three heads from interaction samples, persist the bundle,
    /// and swap it in. All-or-nothing: on any failure the previous bundle
    /// (if any) stays resident and nothing is persisted.
    pub fn train(&self, samples: &[InteractionSample]) -> Result<()> {
        if samples.is_empty() {
            return Err(PaideiaError::schema("interaction dataset is empty"));
        }

        let input_vocabularies = BTreeMap::from([
            (
                ATTR_TOPIC.to_string(),
                LabelVocabulary::fit(ATTR_TOPIC, samples.iter().map(|s| s.topic.as_str())),
            ),
            (
                ATTR_DIFFICULTY.to_string(),
                LabelVocabulary::fit(
                    ATTR_DIFFICULTY,
                    samples.iter().map(|s| s.difficulty.as_str()),
                ),
            ),
        ]);

        let output_vocabularies = BTreeMap::from([
            (
                ATTR_NEXT_TOPIC.to_string(),
                LabelVocabulary::fit(
                    ATTR_NEXT_TOPIC,
                    samples.iter().map(|s| s.next_topic.as_str()),
                ),
            ),
            (
                ATTR_NEXT_ACTION.to_string(),
                LabelVocabulary::fit(
                    ATTR_NEXT_ACTION,
                    samples.iter().map(|s| s.next_action.as_str()),
                ),
            ),
            (
                ATTR_NEXT_DIFFICULTY_ADJ.to_string(),
                LabelVocabulary::fit(
                    ATTR_NEXT_DIFFICULTY_ADJ,
                    samples.iter().map(|s| s.next_difficulty_adj.as_str()),
                ),
            ),
        ]);

        log::info!("encoding {} interaction rows", samples.len());
        let x: Vec<FeatureVector> = samples
            .iter()
            .map(|s| {
                encode_state(
                    &input_vocabularies,
                    &StudentState {
                        topic: s.topic.clone(),
                        difficulty: s.difficulty.clone(),
                        score: s.score,
                        attempts: s.attempts,
                        time_spent: s.time_spent,
                    },
                )
            })
            .collect::<Result<_>>()?;

        let mut targets = BTreeMap::new();
        for (attribute, vocabulary) in &output_vocabularies {
            let codes = samples
                .iter()
                .map(|s| {
                    let value = match attribute.as_str() {
                        ATTR_NEXT_TOPIC => &s.next_topic,
                        ATTR_NEXT_ACTION => &s.next_action,
                        _ => &s.next_difficulty_adj,
                    };
                    vocabulary.encode(value)
                })
                .collect::<Result<Vec<usize>>>()?;
            targets.insert(
                attribute.clone(),
                TargetColumn {
                    codes,
                    n_classes: vocabulary.len(),
                },
            );
        }

        log::info!("training adaptive classifier bank on {} rows", x.len());
        let bank = ClassifierBank::fit(&self.config.forest, &x, &targets)?;

        let bundle = AdaptiveBundle {
            input_vocabularies,
            output_vocabularies,
            bank,
        };

        save_bundle(&self.config.bundle_path, ADAPTIVE_SERVICE, &bundle)?;
        self.slot.replace(bundle);
        Ok(())
    }

    /// Recommend the next learning step for one student state.
    ///
    /// # Errors
    ///
    /// - [`PaideiaError::InvalidInput`] on an out-of-range score, zero
    ///   attempts, or non-positive time spent
    /// - [`PaideiaError::ModelNotTrained`] when no bundle is resident
    /// - [`PaideiaError::UnknownCategory`] when the topic or difficulty is
    ///   outside the fitted input vocabulary (the error lists valid values)
    pub fn recommend(&self, state: &StudentState) -> Result<Recommendation> {
        validate_state(state)?;

        let bundle = self.slot.get().ok_or_else(|| {
            PaideiaError::not_trained(
                "adaptive model has no trained bundle; train or load one first",
            )
        })?;

        let features = encode_state(&bundle.input_vocabularies, state)?;
        let predictions = bundle.bank.predict(&features)?;

        let next_topic = Self::resolve_head(&bundle, &predictions, ATTR_NEXT_TOPIC)?;
        let action = Self::resolve_head(&bundle, &predictions, ATTR_NEXT_ACTION)?;
        let difficulty_adjustment =
            Self::resolve_head(&bundle, &predictions, ATTR_NEXT_DIFFICULTY_ADJ)?;

        Ok(Recommendation {
            next_topic,
            action,
            difficulty_adjustment,
            reasoning: recommendation_reasoning(state.score, state.attempts),
        })
    }

    fn resolve_head(
        bundle: &AdaptiveBundle,
        predictions: &BTreeMap<String, crate::bank::HeadPrediction>,
        attribute: &str,
    ) -> Result<Decision> {
        let head = predictions
            .get(attribute)
            .ok_or_else(|| PaideiaError::internal(format!("missing head '{attribute}'")))?;
        let vocabulary = bundle
            .output_vocabularies
            .get(attribute)
            .ok_or_else(|| PaideiaError::internal(format!("missing vocabulary '{attribute}'")))?;
        resolve(head, vocabulary)
    }

    /// Restore the persisted bundle, if present. Returns whether a bundle
    /// is now resident.
    pub fn load(&self) -> Result<bool> {
        match load_bundle::<AdaptiveBundle>(&self.config.bundle_path, ADAPTIVE_SERVICE)? {
            Some(bundle) => {
                self.slot.replace(bundle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether a trained bundle is resident and predictions are available.
    pub fn is_ready(&self) -> bool {
        self.slot.is_loaded()
    }
}

/// Encode a student state as `[topic_code, difficulty_code, score,
/// attempts, time_spent]` using the fitted input vocabularies.
pub fn encode_state(
    input_vocabularies: &BTreeMap<String, LabelVocabulary>,
    state: &StudentState,
) -> Result<FeatureVector> {
    let topic_vocab = input_vocabularies
        .get(ATTR_TOPIC)
        .ok_or_else(|| PaideiaError::internal("missing input vocabulary 'topic'"))?;
    let difficulty_vocab = input_vocabularies
        .get(ATTR_DIFFICULTY)
        .ok_or_else(|| PaideiaError::internal("missing input vocabulary 'difficulty'"))?;

    let topic_code = topic_vocab.encode(&state.topic)?;
    let difficulty_code = difficulty_vocab.encode(&state.difficulty)?;

    Ok(vec![
        topic_code as f64,
        difficulty_code as f64,
        state.score,
        state.attempts as f64,
        state.time_spent,
    ])
}

fn validate_state(state: &StudentState) -> Result<()> {
    if !(0.0..=100.0).contains(&state.score) {
        return Err(PaideiaError::invalid_input(format!(
            "score must be within 0-100, got {}",
            state.score
        )));
    }
    if state.attempts == 0 {
        return Err(PaideiaError::invalid_input("attempts must be at least 1"));
    }
    if state.time_spent <= 0.0 {
        return Err(PaideiaError::invalid_input(format!(
            "time_spent must be positive, got {}",
            state.time_spent
        )));
    }
    Ok(())
}

/// Load interaction samples from a JSON file (an array of objects with the
/// interaction columns; extra columns such as `student_id` are ignored).
pub fn load_interaction_samples(path: &Path) -> Result<Vec<InteractionSample>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|err| PaideiaError::schema(format!("interaction training data: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(topic: &str, difficulty: &str, score: f64, attempts: u32) -> StudentState {
        StudentState {
            topic: topic.to_string(),
            difficulty: difficulty.to_string(),
            score,
            attempts,
            time_spent: 15.0,
        }
    }

    fn tiny_samples() -> Vec<InteractionSample> {
        let mut samples = Vec::new();
        for i in 0..10 {
            let jitter = i as f64;
            samples.push(InteractionSample {
                topic: "CNN".to_string(),
                difficulty: "Beginner".to_string(),
                score: 30.0 + jitter,
                attempts: 3,
                time_spent: 20.0,
                next_topic: "CNN".to_string(),
                next_action: "Revision".to_string(),
                next_difficulty_adj: "Same".to_string(),
            });
            samples.push(InteractionSample {
                topic: "RNN".to_string(),
                difficulty: "Intermediate".to_string(),
                score: 90.0 - jitter,
                attempts: 1,
                time_spent: 10.0,
                next_topic: "Transformers".to_string(),
                next_action: "Continue".to_string(),
                next_difficulty_adj: "Increase".to_string(),
            });
        }
        samples
    }

    fn test_model(dir: &Path) -> AdaptiveLearningModel {
        AdaptiveLearningModel::new(AdaptiveModelConfig {
            bundle_path: dir.join("adaptive_bundle.json"),
            forest: ForestConfig {
                n_trees: 10,
                max_depth: 8,
                min_samples_split: 2,
                seed: 42,
            },
        })
    }

    #[test]
    fn test_train_and_recommend() {
        let dir = tempfile::tempdir().unwrap();
        let model = test_model(dir.path());
        model.train(&tiny_samples()).unwrap();
        assert!(model.is_ready());

        let rec = model.recommend(&state("RNN", "Intermediate", 88.0, 1)).unwrap();
        assert_eq!(rec.action.label, "Continue");
        assert_eq!(rec.difficulty_adjustment.label, "Increase");
        assert!(rec.action.confidence <= 100);
        assert!(rec.reasoning.contains("mastery"));
    }

    #[test]
    fn test_unknown_topic_lists_valid_values() {
        let dir = tempfile::tempdir().unwrap();
        let model = test_model(dir.path());
        model.train(&tiny_samples()).unwrap();

        let err = model
            .recommend(&state("Quantum", "Beginner", 50.0, 1))
            .unwrap_err();
        match err {
            PaideiaError::UnknownCategory {
                attribute, valid, ..
            } => {
                assert_eq!(attribute, "topic");
                assert!(valid.contains(&"CNN".to_string()));
                assert!(valid.contains(&"RNN".to_string()));
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_untrained_model_reports_not_trained() {
        let dir = tempfile::tempdir().unwrap();
        let model = test_model(dir.path());

        let err = model
            .recommend(&state("CNN", "Beginner", 50.0, 1))
            .unwrap_err();
        assert!(matches!(err, PaideiaError::ModelNotTrained(_)));
    }

    #[test]
    fn test_invalid_state_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let model = test_model(dir.path());

        let err = model
            .recommend(&state("CNN", "Beginner", 150.0, 1))
            .unwrap_err();
        assert!(matches!(err, PaideiaError::InvalidInput(_)));

        let err = model
            .recommend(&state("CNN", "Beginner", 50.0, 0))
            .unwrap_err();
        assert!(matches!(err, PaideiaError::InvalidInput(_)));

        let mut bad = state("CNN", "Beginner", 50.0, 1);
        bad.time_spent = 0.0;
        let err = model.recommend(&bad).unwrap_err();
        assert!(matches!(err, PaideiaError::InvalidInput(_)));
    }

    #[test]
    fn test_input_and_output_topic_vocabularies_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let model = test_model(dir.path());
        model.train(&tiny_samples()).unwrap();

        // "Transformers" appears only as a prediction target, so it must
        // be rejected as an input topic.
        let err = model
            .recommend(&state("Transformers", "Beginner", 50.0, 1))
            .unwrap_err();
        assert!(matches!(err, PaideiaError::UnknownCategory { .. }));
    }

    #[test]
    fn test_load_missing_bundle_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let model = test_model(dir.path());
        assert!(!model.load().unwrap());
    }

    #[test]
    fn test_load_samples_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"[{"student_id": "S001", "topic": "CNN", "difficulty": "Beginner", "score": 55.0,
                "attempts": 2, "time_spent": 12.0, "next_topic": "CNN",
                "next_action": "Continue", "next_difficulty_adj": "Same"}]"#,
        )
        .unwrap();

        let samples = load_interaction_samples(&path).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].next_action, "Continue");
    }

    #[test]
    fn test_load_samples_missing_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"[{"topic": "CNN", "difficulty": "Beginner"}]"#).unwrap();

        let err = load_interaction_samples(&path).unwrap_err();
        assert!(matches!(err, PaideiaError::Schema(_)));
    }
}
