//! Seeded synthetic dataset generators.
//!
//! Produce labeled training data for both services from template-based
//! query generation and simulated student trajectories. The interaction
//! simulator's ground-truth policy is the documented threshold rule set
//! (score above 80 raises difficulty or advances the topic at the top
//! level; score below 50 triggers revision), so trained classifiers imitate
//! a known, consistent policy. Generation is fully seeded and reproducible.

use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::adaptive::InteractionSample;
use crate::query::QuerySample;

/// Curriculum topics used by both generators.
pub const TOPICS: &[&str] = &[
    "Optimization",
    "Neural Networks",
    "Natural Language Processing",
    "Computer Vision",
    "Reinforcement Learning",
    "Backpropagation",
    "Gradient Descent",
    "Transformers",
    "CNN",
    "RNN",
];

/// Query intents.
pub const INTENTS: &[&str] = &["Explanation", "Example", "Doubt clarification", "Revision"];

/// Difficulty levels, ordered easiest first.
pub const DIFFICULTIES: &[&str] = &["Beginner", "Intermediate", "Advanced"];

const EXPLANATION_TEMPLATES: &[&str] = &[
    "What is {topic}?",
    "Explain different types of {topic}.",
    "I don't understand {topic}.",
    "Can you describe {topic}?",
    "Tell me about {topic}.",
    "Define {topic}.",
    "How does {topic} work?",
    "Meaning of {topic}?",
];

const EXAMPLE_TEMPLATES: &[&str] = &[
    "Give me an example of {topic}.",
    "Show me a use case for {topic}.",
    "Practical application of {topic}?",
    "Demonstrate {topic} with an example.",
    "Code example for {topic}.",
    "Real world example of {topic}.",
];

const DOUBT_TEMPLATES: &[&str] = &[
    "Why do we use {topic}?",
    "What is the difference between {topic} and other method?",
    "Is {topic} better than others?",
    "I am stuck on {topic}.",
    "Why does {topic} fail?",
    "Confusion about {topic}.",
    "Clarify {topic} for me.",
];

const REVISION_TEMPLATES: &[&str] = &[
    "Revise {topic} quickly.",
    "Summary of {topic}.",
    "Key points of {topic}.",
    "Recap {topic}.",
    "Review {topic}.",
    "Important concepts in {topic}.",
];

fn templates_for_intent(intent: &str) -> &'static [&'static str] {
    match intent {
        "Explanation" => EXPLANATION_TEMPLATES,
        "Example" => EXAMPLE_TEMPLATES,
        "Doubt clarification" => DOUBT_TEMPLATES,
        _ => REVISION_TEMPLATES,
    }
}

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> &'a str {
    values[rng.random_range(0..values.len())]
}

/// Render one query from a template, with a difficulty-flavored suffix.
fn render_query(rng: &mut StdRng, topic: &str, intent: &str, difficulty: &str) -> String {
    let template = pick(rng, templates_for_intent(intent));
    let mut query = template.replace("{topic}", topic);

    match difficulty {
        "Beginner" => query.push_str(" keep it simple."),
        "Advanced" => query.push_str(" in depth detail."),
        _ => {}
    }
    query
}

/// Generate a labeled query dataset of `count` rows.
pub fn generate_query_dataset(count: usize, seed: u64) -> Vec<QuerySample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(count);

    for _ in 0..count {
        let topic = pick(&mut rng, TOPICS);
        let intent = pick(&mut rng, INTENTS);
        let difficulty = pick(&mut rng, DIFFICULTIES);

        samples.push(QuerySample {
            query: render_query(&mut rng, topic, intent, difficulty),
            intent: intent.to_string(),
            topic: topic.to_string(),
            difficulty: difficulty.to_string(),
        });
    }
    samples
}

/// Generate interaction histories for `students` simulated students, each
/// `steps` interactions long.
pub fn generate_interaction_dataset(
    students: usize,
    steps: usize,
    seed: u64,
) -> Vec<InteractionSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(students * steps);

    for _ in 0..students {
        simulate_student(&mut rng, steps, &mut samples);
    }
    samples
}

/// Simulate one student's trajectory through the curriculum.
///
/// Proficiency rises over time; harder levels depress the observed score.
/// The next-step labels follow the threshold policy the classifiers are
/// expected to imitate.
fn simulate_student(rng: &mut StdRng, steps: usize, out: &mut Vec<InteractionSample>) {
    let mut topic_idx = 0usize;
    let mut difficulty_idx = 0usize;

    for step in 0..steps {
        let topic = TOPICS[topic_idx];
        let difficulty = DIFFICULTIES[difficulty_idx];

        let proficiency = (0.3 + 0.05 * step as f64).min(0.9);
        let difficulty_penalty = difficulty_idx as f64 * 0.2;
        let mean = (proficiency - difficulty_penalty) * 100.0;
        let noise = rng.random_range(-25.0..25.0) + rng.random_range(-25.0..25.0);
        let score = (mean + noise).round().clamp(0.0, 100.0);

        let attempts = rng.random_range(1..=4);
        let time_spent = rng.random_range(5..=60) as f64;

        let mut next_action = "Continue";
        let mut difficulty_adj = "Same";

        if score > 80.0 {
            if difficulty_idx < DIFFICULTIES.len() - 1 {
                difficulty_adj = "Increase";
                difficulty_idx += 1;
            } else {
                next_action = "Next Topic";
                topic_idx = (topic_idx + 1) % TOPICS.len();
                difficulty_idx = 0;
            }
        } else if score < 50.0 {
            next_action = "Revision";
            if difficulty_idx > 0 {
                difficulty_adj = "Decrease";
                difficulty_idx -= 1;
            }
        }

        out.push(InteractionSample {
            topic: topic.to_string(),
            difficulty: difficulty.to_string(),
            score,
            attempts,
            time_spent,
            next_topic: TOPICS[topic_idx].to_string(),
            next_action: next_action.to_string(),
            next_difficulty_adj: difficulty_adj.to_string(),
        });
    }
}
