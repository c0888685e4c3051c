//! # Paideia
//!
//! Prediction core for an adaptive tutoring product.
//!
//! Paideia offers two related prediction services built on one shared
//! pipeline: encode the raw input into a fixed-length feature vector, run it
//! through a bank of independently trained multi-class classifiers, decode
//! each head's output back to a human-readable label with a confidence
//! score, and attach a rule-based explanation.
//!
//! ## Services
//!
//! - Query understanding: classify a free-text student query into intent,
//!   topic, and difficulty ([`query::QueryUnderstandingModel`])
//! - Adaptive recommendation: recommend the next learning action from a
//!   student's recent performance ([`adaptive::AdaptiveLearningModel`])
//!
//! ## Features
//!
//! - Deterministic inference: a fixed bundle and input always produce the
//!   same output
//! - Explicit, immutable-after-fit label vocabularies
//! - Schema-versioned single-artifact model persistence
//! - Wholesale atomic bundle replacement for lock-free concurrent readers

pub mod adaptive;
pub mod analysis;
pub mod bank;
pub mod bundle;
pub mod cli;
pub mod decision;
pub mod embedding;
pub mod error;
pub mod explain;
pub mod forest;
pub mod labels;
pub mod query;
pub mod synth;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
