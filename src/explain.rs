//! Rule-based explanation layer.
//!
//! Deterministic, stateless post-processing that turns raw inputs and
//! predicted labels into short human-readable justifications. Independent of
//! the statistical models: the thresholds here are fixed design constants,
//! not learned, and are never consulted by the inference path itself.

/// Score below which reinforcement is suggested.
pub const REINFORCEMENT_THRESHOLD: f64 = 50.0;
/// Score above which mastery is assumed.
pub const MASTERY_THRESHOLD: f64 = 80.0;
/// Attempt count beyond which repeated attempts are called out.
pub const STRUGGLE_ATTEMPTS: u32 = 2;
/// Score below which repeated attempts are considered a struggle signal.
pub const STRUGGLE_SCORE: f64 = 60.0;

/// Canned pedagogical instruction for a predicted query intent.
///
/// Falls back to a generic instruction for intents outside the fixed table.
pub fn suggestion_for_intent(intent: &str) -> &'static str {
    match intent {
        "Explanation" => "Define the concept clearly and provide a high-level overview.",
        "Example" => "Provide a code snippet or a real-world analogy.",
        "Doubt clarification" => {
            "Address the specific confusion and contrast with related concepts."
        }
        "Revision" => "Summarize key points and formulas.",
        _ => "Answer the query directly.",
    }
}

/// Observational reasoning for a recommendation, from threshold rules on
/// score and attempts.
///
/// Produces up to two sentences in fixed priority order (score rule first,
/// then the repeated-attempts rule), joined by a single space, with one
/// default sentence when no rule fires.
pub fn recommendation_reasoning(score: f64, attempts: u32) -> String {
    let mut clauses: Vec<String> = Vec::new();

    if score < REINFORCEMENT_THRESHOLD {
        clauses.push(format!("Score ({score:.0}%) suggests need for reinforcement."));
    } else if score > MASTERY_THRESHOLD {
        clauses.push(format!("High score ({score:.0}%) indicates mastery."));
    }

    if attempts > STRUGGLE_ATTEMPTS && score < STRUGGLE_SCORE {
        clauses.push(format!("Multiple attempts ({attempts}) with low score."));
    }

    if clauses.is_empty() {
        clauses.push("Standard progression based on curriculum.".to_string());
    }

    clauses.join(" ")
}
