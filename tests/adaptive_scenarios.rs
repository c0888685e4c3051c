//! End-to-end scenarios for the adaptive recommendation service.

use std::path::Path;

use paideia::adaptive::{
    AdaptiveLearningModel, AdaptiveModelConfig, InteractionSample, StudentState,
};
use paideia::error::PaideiaError;
use paideia::forest::ForestConfig;
use paideia::synth::generate_interaction_dataset;

const GRID_TOPICS: &[&str] = &["Optimization", "Neural Networks", "CNN", "RNN"];
const GRID_DIFFICULTIES: &[&str] = &["Beginner", "Intermediate", "Advanced"];

fn test_config(dir: &Path) -> AdaptiveModelConfig {
    AdaptiveModelConfig {
        bundle_path: dir.join("adaptive_bundle.json"),
        forest: ForestConfig {
            n_trees: 20,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        },
    }
}

/// A dense labeled grid whose labels follow the curriculum threshold
/// policy exactly: score above 80 raises difficulty, or advances the topic
/// when difficulty is already Advanced; score below 50 triggers revision.
fn policy_dataset() -> Vec<InteractionSample> {
    let mut samples = Vec::new();
    for (topic_idx, topic) in GRID_TOPICS.iter().enumerate() {
        for (difficulty_idx, difficulty) in GRID_DIFFICULTIES.iter().enumerate() {
            for score_step in 0..10 {
                let score = 5.0 + score_step as f64 * 10.0;
                for attempts in [1u32, 3] {
                    let mut next_topic = *topic;
                    let mut next_action = "Continue";
                    let mut difficulty_adj = "Same";

                    if score > 80.0 {
                        if difficulty_idx < GRID_DIFFICULTIES.len() - 1 {
                            difficulty_adj = "Increase";
                        } else {
                            next_action = "Next Topic";
                            next_topic = GRID_TOPICS[(topic_idx + 1) % GRID_TOPICS.len()];
                        }
                    } else if score < 50.0 {
                        next_action = "Revision";
                        if difficulty_idx > 0 {
                            difficulty_adj = "Decrease";
                        }
                    }

                    samples.push(InteractionSample {
                        topic: topic.to_string(),
                        difficulty: difficulty.to_string(),
                        score,
                        attempts,
                        time_spent: 10.0 + attempts as f64 * 5.0,
                        next_topic: next_topic.to_string(),
                        next_action: next_action.to_string(),
                        next_difficulty_adj: difficulty_adj.to_string(),
                    });
                }
            }
        }
    }
    samples
}

fn trained_model(dir: &Path) -> AdaptiveLearningModel {
    let model = AdaptiveLearningModel::new(test_config(dir));
    model.train(&policy_dataset()).unwrap();
    model
}

fn state(topic: &str, difficulty: &str, score: f64, attempts: u32, time_spent: f64) -> StudentState {
    StudentState {
        topic: topic.to_string(),
        difficulty: difficulty.to_string(),
        score,
        attempts,
        time_spent,
    }
}

#[test]
fn test_high_score_at_advanced_recommends_next_topic() {
    let dir = tempfile::tempdir().unwrap();
    let model = trained_model(dir.path());

    let rec = model
        .recommend(&state("CNN", "Advanced", 95.0, 1, 10.0))
        .unwrap();

    assert_eq!(rec.action.label, "Next Topic");
    assert!(
        rec.action.confidence >= 50,
        "expected confident Next Topic, got {}%",
        rec.action.confidence
    );
}

#[test]
fn test_low_score_with_repeated_attempts_explains_both() {
    let dir = tempfile::tempdir().unwrap();
    let model = trained_model(dir.path());

    let rec = model
        .recommend(&state("RNN", "Beginner", 40.0, 3, 25.0))
        .unwrap();

    assert!(!rec.reasoning.is_empty());
    assert!(rec.reasoning.contains("Score (40%) suggests need for reinforcement."));
    assert!(rec.reasoning.contains("Multiple attempts (3) with low score."));
    assert_eq!(rec.action.label, "Revision");
}

#[test]
fn test_unknown_topic_rejected_with_valid_options() {
    let dir = tempfile::tempdir().unwrap();
    let model = trained_model(dir.path());

    let err = model
        .recommend(&state("Underwater Basket Weaving", "Beginner", 70.0, 1, 10.0))
        .unwrap_err();

    match err {
        PaideiaError::UnknownCategory {
            attribute,
            value,
            valid,
        } => {
            assert_eq!(attribute, "topic");
            assert_eq!(value, "Underwater Basket Weaving");
            for topic in GRID_TOPICS {
                assert!(valid.contains(&topic.to_string()));
            }
        }
        other => panic!("expected UnknownCategory, got {other:?}"),
    }
}

#[test]
fn test_unknown_difficulty_rejected_with_valid_options() {
    let dir = tempfile::tempdir().unwrap();
    let model = trained_model(dir.path());

    let err = model
        .recommend(&state("CNN", "Impossible", 70.0, 1, 10.0))
        .unwrap_err();

    match err {
        PaideiaError::UnknownCategory { attribute, valid, .. } => {
            assert_eq!(attribute, "difficulty");
            assert_eq!(valid.len(), GRID_DIFFICULTIES.len());
        }
        other => panic!("expected UnknownCategory, got {other:?}"),
    }
}

#[test]
fn test_untrained_service_reports_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let model = AdaptiveLearningModel::new(test_config(dir.path()));

    let err = model
        .recommend(&state("CNN", "Beginner", 70.0, 1, 10.0))
        .unwrap_err();
    assert!(matches!(err, PaideiaError::ModelNotTrained(_)));
}

#[test]
fn test_repeated_recommendations_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let model = trained_model(dir.path());

    let probe = state("Optimization", "Intermediate", 62.0, 2, 18.0);
    assert_eq!(
        model.recommend(&probe).unwrap(),
        model.recommend(&probe).unwrap()
    );
}

#[test]
fn test_persistence_round_trip_reproduces_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let trained = trained_model(dir.path());

    let held_out = [
        state("CNN", "Advanced", 95.0, 1, 10.0),
        state("RNN", "Beginner", 35.0, 4, 40.0),
        state("Optimization", "Intermediate", 65.0, 2, 20.0),
    ];
    let expected: Vec<_> = held_out
        .iter()
        .map(|s| trained.recommend(s).unwrap())
        .collect();

    let restored = AdaptiveLearningModel::new(test_config(dir.path()));
    assert!(restored.load().unwrap());

    for (probe, expected) in held_out.iter().zip(&expected) {
        assert_eq!(restored.recommend(probe).unwrap(), *expected);
    }
}

#[test]
fn test_training_on_simulated_trajectories() {
    let dir = tempfile::tempdir().unwrap();
    let model = AdaptiveLearningModel::new(test_config(dir.path()));
    model
        .train(&generate_interaction_dataset(40, 20, 13))
        .unwrap();

    let rec = model
        .recommend(&state("Optimization", "Beginner", 30.0, 2, 15.0))
        .unwrap();
    assert!(rec.action.confidence <= 100);
    assert!(!rec.reasoning.is_empty());
}
