// ABOUTME: crewline binary - lists built-in crews and runs a crew with inputs,
// ABOUTME: printing the final answer and a timestamp as each task completes.

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crewline::prelude::*;

use crate::cli::{Cli, Commands, RunArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewline=info,crewline_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::List => {
            list_presets();
            Ok(())
        }
        Commands::Run(args) => run(args).await,
    }
}

fn list_presets() {
    for preset in PRESETS {
        let inputs: Vec<_> = preset
            .inputs
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, v))
            .collect();
        println!("{:<10} {}", preset.name, preset.description);
        println!("{:<10} e.g. --input {}", "", inputs.join(" --input "));
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = CrewConfig::from_env().context("invalid configuration")?;
    if let Some(model) = args.model {
        config.default_model = model;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = Some(dir);
    }
    if let Some(secs) = args.timeout.filter(|s| *s > 0) {
        config.node_timeout = Some(Duration::from_secs(secs));
    }

    let today = chrono::Local::now().format("%d-%b-%Y").to_string();
    let (definition, mut inputs) = match (&args.preset, &args.file) {
        (_, Some(path)) => {
            let definition = crewline::pipeline::load_definition(path)
                .await
                .with_context(|| format!("failed to load crew file {}", path.display()))?;
            (definition, Inputs::new())
        }
        (Some(name), None) => {
            let preset = crewline::presets::find(name).with_context(|| {
                format!("unknown crew '{}'; run `crewline list` to see them", name)
            })?;
            (preset.definition(&today)?, preset.example_inputs())
        }
        (None, None) => anyhow::bail!("name a crew or pass --file"),
    };
    inputs.extend(args.inputs);

    let registry = Registry::new();
    register_builtin(&registry).await;
    let invoker = LlmInvoker::from_config(registry, &config);

    let hooks = Arc::new(HookRegistry::new());
    hooks
        .on_node_complete(|node, _| {
            eprintln!("{} task '{}' completed", chrono::Local::now(), node);
        })
        .await;

    let executor = Executor::from_config(Arc::new(invoker), &config).hooks(hooks);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; stopping after the current task");
            on_signal.cancel();
        }
    });

    let result = executor
        .execute_with_cancel(&definition, &inputs, &cancel)
        .await?;

    for failure in &result.sink_failures {
        tracing::warn!(error = %failure, "output file not written");
    }
    println!("{}", result.output);
    Ok(())
}
