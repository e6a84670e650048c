//! adaptive-engine - Main CLI Entry Point

use adaptive_engine::{
    cli::{load_experiences, Args, Commands, ContextArgs, Verbosity},
    config::EngineConfig,
    events::{EventKind, LearningEvent},
    memory::types::Context as TaskContext,
    telemetry, AdaptiveEngine, Statistics,
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();

    let mut config = EngineConfig::load(args.config.clone())?;
    if let Some(level) = verbosity.log_level() {
        config.telemetry.log_level = level.to_string();
    }
    if args.json_logs {
        config.telemetry.json = true;
    }
    telemetry::init_logging(&config.telemetry)?;

    match &args.command {
        Commands::Replay { file } => {
            let engine = build_engine(&config, verbosity)?;
            let recorded = replay(&engine, file)?;
            print_statistics(recorded, &engine.statistics()?);
        }
        Commands::Recommend { context, actions } => {
            let engine = build_engine(&config, verbosity)?;
            let task_context = prepare(&engine, context)?;
            let choice = engine.get_best_action(&task_context, actions)?;

            println!("{} {}", "Recommended:".green().bold(), choice);
            if verbosity != Verbosity::Quiet {
                for value in engine.action_values(&task_context, actions)? {
                    println!(
                        "  {:<24} q={:.4}  visits={}",
                        value.action, value.q_value, value.visit_count
                    );
                }
            }
        }
        Commands::Predict { context, decision } => {
            let engine = build_engine(&config, verbosity)?;
            let task_context = prepare(&engine, context)?;
            let prediction = engine.predict_outcome(&task_context, decision)?;

            println!(
                "{} {:.1}%",
                "Predicted success:".green().bold(),
                prediction.predicted_outcome.success * 100.0
            );
            println!("Confidence: {:.1}%", prediction.confidence * 100.0);
            if !prediction.recommendations.is_empty() {
                println!("\nRecommendations:");
                for recommendation in &prediction.recommendations {
                    println!("  • {}", recommendation);
                }
            }
        }
        Commands::Export { from } => {
            let engine = build_engine(&config, verbosity)?;
            if let Some(file) = from {
                replay(&engine, file)?;
            }
            let export = engine.export_knowledge()?;
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
        Commands::Config => {
            show_config(&args, &config)?;
        }
    }

    Ok(())
}

fn build_engine(config: &EngineConfig, verbosity: Verbosity) -> Result<AdaptiveEngine> {
    let engine = AdaptiveEngine::new(config.learning.clone())?;

    if verbosity.show_events() {
        engine.on(EventKind::PatternDiscovered, |event| {
            if let LearningEvent::PatternDiscovered { description, .. } = event {
                eprintln!("{} {}", "Pattern discovered:".cyan().bold(), description);
            }
            Ok(())
        });
    }

    Ok(engine)
}

/// Learn from `--from` if given, then build the query context
fn prepare(engine: &AdaptiveEngine, args: &ContextArgs) -> Result<TaskContext> {
    if let Some(file) = &args.from {
        replay(engine, file)?;
    }

    let context = args
        .requirements
        .iter()
        .fold(TaskContext::new(args.task.clone(), args.complexity), |ctx, req| {
            ctx.with_requirement(req.clone())
        });
    context.validate()?;
    Ok(context)
}

fn replay(engine: &AdaptiveEngine, file: &Path) -> Result<usize> {
    let experiences = load_experiences(file)?;
    let total = experiences.len();

    for (index, experience) in experiences.into_iter().enumerate() {
        engine
            .record_experience(experience)
            .with_context(|| format!("Experience {} of {} rejected", index + 1, total))?;
    }

    info!(file = %file.display(), recorded = total, "Replay complete");
    Ok(total)
}

fn print_statistics(recorded: usize, stats: &Statistics) {
    println!("{} {} experiences", "Recorded".green().bold(), recorded);
    println!();
    println!("Statistics:");
    println!("  Total experiences:   {}", stats.total_experiences);
    println!("  Stored experiences:  {}", stats.stored_experiences);
    println!("  Evicted:             {}", stats.evicted_experiences);
    println!("  Patterns discovered: {}", stats.patterns_discovered);
    println!("  Knowledge nodes:     {}", stats.knowledge_nodes);
    println!("  Knowledge edges:     {}", stats.knowledge_edges);
    println!("  Q-table entries:     {}", stats.q_table_entries);
    println!("  Learning rate:       {}", stats.learning_rate);
    println!("  Exploration rate:    {}", stats.exploration_rate);
}

fn show_config(args: &Args, config: &EngineConfig) -> Result<()> {
    println!("{}", "adaptive-engine configuration".bold());
    println!();

    let source = match (&args.config, EngineConfig::default_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        _ => "built-in defaults".to_string(),
    };
    println!("Source: {}", source);
    println!("Verbosity: {:?}", args.verbosity());
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}
