//! CLI command execution.

use anyhow::Context;

use crate::adaptive::{
    AdaptiveLearningModel, AdaptiveModelConfig, StudentState, load_interaction_samples,
};
use crate::cli::args::*;
use crate::cli::output::{print_analysis, print_json, print_recommendation};
use crate::forest::ForestConfig;
use crate::query::{QueryModelConfig, QueryUnderstandingModel, load_query_samples};
use crate::synth::{generate_interaction_dataset, generate_query_dataset};

/// Execute the parsed CLI command.
pub fn execute_command(args: PaideiaArgs) -> anyhow::Result<()> {
    match args.command.clone() {
        Command::GenerateData(cmd) => generate_data(&args, &cmd),
        Command::TrainQuery(cmd) => train_query(&cmd),
        Command::TrainAdaptive(cmd) => train_adaptive(&cmd),
        Command::Analyze(cmd) => analyze(&args, &cmd),
        Command::Recommend(cmd) => recommend(&args, &cmd),
    }
}

fn generate_data(args: &PaideiaArgs, cmd: &GenerateDataArgs) -> anyhow::Result<()> {
    let json = match cmd.kind {
        DataKind::Queries => {
            let samples = generate_query_dataset(cmd.count, cmd.seed);
            println!("generated {} query samples", samples.len());
            serde_json::to_string_pretty(&samples)?
        }
        DataKind::Interactions => {
            let samples = generate_interaction_dataset(cmd.students, cmd.steps, cmd.seed);
            println!("generated {} interaction samples", samples.len());
            serde_json::to_string_pretty(&samples)?
        }
    };

    if let Some(parent) = cmd.output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&cmd.output, json)
        .with_context(|| format!("writing dataset to {}", cmd.output.display()))?;
    if args.verbosity() >= 1 {
        println!("wrote {}", cmd.output.display());
    }
    Ok(())
}

fn train_query(cmd: &TrainQueryArgs) -> anyhow::Result<()> {
    let samples = load_query_samples(&cmd.data_file)
        .with_context(|| format!("loading {}", cmd.data_file.display()))?;

    let model = QueryUnderstandingModel::new(QueryModelConfig {
        bundle_path: cmd.bundle_path.clone(),
        forest: ForestConfig {
            n_trees: cmd.trees,
            seed: cmd.seed,
            ..ForestConfig::default()
        },
        embedder_dimension: cmd.dimension,
    })?;

    model.train(&samples)?;
    println!(
        "trained query model on {} samples, bundle at {}",
        samples.len(),
        cmd.bundle_path.display()
    );
    Ok(())
}

fn train_adaptive(cmd: &TrainAdaptiveArgs) -> anyhow::Result<()> {
    let samples = load_interaction_samples(&cmd.data_file)
        .with_context(|| format!("loading {}", cmd.data_file.display()))?;

    let model = AdaptiveLearningModel::new(AdaptiveModelConfig {
        bundle_path: cmd.bundle_path.clone(),
        forest: ForestConfig {
            n_trees: cmd.trees,
            seed: cmd.seed,
            ..ForestConfig::default()
        },
    });

    model.train(&samples)?;
    println!(
        "trained adaptive model on {} samples, bundle at {}",
        samples.len(),
        cmd.bundle_path.display()
    );
    Ok(())
}

fn analyze(args: &PaideiaArgs, cmd: &AnalyzeArgs) -> anyhow::Result<()> {
    let model = QueryUnderstandingModel::new(QueryModelConfig {
        bundle_path: cmd.bundle_path.clone(),
        embedder_dimension: cmd.dimension,
        ..QueryModelConfig::default()
    })?;

    if !model.load()? {
        anyhow::bail!(
            "no trained query bundle at {}; run `paideia train-query` first",
            cmd.bundle_path.display()
        );
    }

    match model.analyze(&cmd.query) {
        Ok(analysis) => print_analysis(&analysis, args.output_format, args.pretty),
        Err(err) if err.is_recoverable() => {
            print_json(&serde_json::json!({ "error": err.to_string() }), args.pretty)
        }
        Err(err) => Err(err.into()),
    }
}

fn recommend(args: &PaideiaArgs, cmd: &RecommendArgs) -> anyhow::Result<()> {
    let model = AdaptiveLearningModel::new(AdaptiveModelConfig {
        bundle_path: cmd.bundle_path.clone(),
        ..AdaptiveModelConfig::default()
    });

    if !model.load()? {
        anyhow::bail!(
            "no trained adaptive bundle at {}; run `paideia train-adaptive` first",
            cmd.bundle_path.display()
        );
    }

    let state = StudentState {
        topic: cmd.topic.clone(),
        difficulty: cmd.difficulty.clone(),
        score: cmd.score,
        attempts: cmd.attempts,
        time_spent: cmd.time_spent,
    };

    match model.recommend(&state) {
        Ok(recommendation) => {
            print_recommendation(&recommendation, args.output_format, args.pretty)
        }
        Err(err) if err.is_recoverable() => {
            print_json(&serde_json::json!({ "error": err.to_string() }), args.pretty)
        }
        Err(err) => Err(err.into()),
    }
}
