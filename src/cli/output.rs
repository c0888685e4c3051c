//! Output rendering for CLI command results.

use serde::Serialize;

use crate::adaptive::Recommendation;
use crate::cli::args::OutputFormat;
use crate::query::QueryAnalysis;

/// Render any serializable value as JSON.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

/// Render a query analysis in the selected format.
pub fn print_analysis(
    analysis: &QueryAnalysis,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(analysis, pretty),
        OutputFormat::Human => {
            println!(
                "intent:     {} ({}%)",
                analysis.intent.label, analysis.intent.confidence
            );
            println!(
                "topic:      {} ({}%)",
                analysis.topic.label, analysis.topic.confidence
            );
            println!(
                "difficulty: {} ({}%)",
                analysis.difficulty.label, analysis.difficulty.confidence
            );
            println!("keywords:   {}", analysis.keywords.join(", "));
            println!("suggestion: {}", analysis.suggestion);
            Ok(())
        }
    }
}

/// Render a recommendation in the selected format.
pub fn print_recommendation(
    recommendation: &Recommendation,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(recommendation, pretty),
        OutputFormat::Human => {
            println!(
                "next topic:            {} ({}%)",
                recommendation.next_topic.label, recommendation.next_topic.confidence
            );
            println!(
                "action:                {} ({}%)",
                recommendation.action.label, recommendation.action.confidence
            );
            println!(
                "difficulty adjustment: {} ({}%)",
                recommendation.difficulty_adjustment.label,
                recommendation.difficulty_adjustment.confidence
            );
            println!("reasoning:             {}", recommendation.reasoning);
            Ok(())
        }
    }
}
