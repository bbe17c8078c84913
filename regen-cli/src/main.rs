use clap::Parser;
use regen_core::generators::{create_generator, GeneratorConfig};
use regen_core::logging::BufferedEventLogger;
use regen_core::metrics::{InMemoryMetrics, Metrics};
use regen_core::pipeline::Pipeline;
use std::sync::Arc;

#[derive(Parser)]
#[command(about = "Generate code for a problem statement and validate it until it passes")]
pub struct Cli {
    /// Natural-language problem statement to solve.
    pub problem: String,

    /// Target language: html, css, javascript or solidity.
    #[arg(long, default_value = "javascript")]
    pub language: String,

    /// Path to a TOML config file.
    #[arg(long)]
    pub config: Option<String>,

    /// Override the attempt ceiling from the config.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Print pipeline events after the run.
    #[arg(long)]
    pub verbose: bool,
}

#[derive(serde::Deserialize, Default)]
struct GlobalConfig {
    runtime: Option<RuntimeConfig>,
    generator: Option<GeneratorConfig>,
}

#[derive(serde::Deserialize)]
struct RuntimeConfig {
    max_attempts: Option<u32>,
}

fn load_global_config(path: Option<&str>) -> anyhow::Result<GlobalConfig> {
    let Some(path) = path else {
        return Ok(GlobalConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config '{path}': {e}"))?;
    Ok(toml::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let gc = load_global_config(cli.config.as_deref())?;

    let logger = Arc::new(BufferedEventLogger::new(1024));
    let metrics = Arc::new(InMemoryMetrics::new());

    let mut pipeline = Pipeline::new()
        .with_logger(logger.clone())
        .with_metrics(metrics.clone());
    let max_attempts = cli
        .max_attempts
        .or_else(|| gc.runtime.as_ref().and_then(|r| r.max_attempts));
    if let Some(n) = max_attempts {
        pipeline.set_max_attempts(n)?;
    }

    let generator_config = gc.generator.unwrap_or(GeneratorConfig::Mock {
        id: "mock".to_string(),
    });
    let generator = create_generator(generator_config, logger.clone());

    let result = pipeline
        .run(&cli.problem, &cli.language, generator.as_ref())
        .await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if cli.verbose {
        let (_, events) = logger.events_since(0);
        for event in events {
            eprintln!("{} {:?} {}", event.ts.to_rfc3339(), event.level, event.message);
        }
    }

    let snap = metrics.snapshot();
    eprintln!(
        "metrics: runs_started={} attempts_started={} syntax_pass={} syntax_fail={} reflection_pass={} reflection_fail={}",
        snap.runs_started,
        snap.attempts_started,
        snap.syntax_pass,
        snap.syntax_fail,
        snap.reflection_pass,
        snap.reflection_fail
    );

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
