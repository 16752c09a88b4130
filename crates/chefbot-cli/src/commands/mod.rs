pub mod agent;
pub mod ask;
pub mod eval;
pub mod party;
pub mod plan;
pub mod restaurant;

use anyhow::Context as _;
use chefbot_core::observe::{FileSink, LogSink};
use chefbot_core::{Config, Tracer};
use chefbot_kitchen::ChefBot;
use chefbot_llm::OpenAiProvider;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Flags that override the configuration file and the environment.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Groq API key (defaults to the variable named by `llm.api_key_env`)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model for plain chat, planning and the evaluated task
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Model for the tool-calling agents
    #[arg(long, global = true)]
    tool_model: Option<String>,

    /// Model for the LLM judge
    #[arg(long, global = true)]
    judge_model: Option<String>,

    /// Group name used to prefix and tag every root span
    #[arg(short, long, global = true)]
    group: Option<String>,

    /// Do not write the plain-text run file
    #[arg(long, global = true)]
    no_trace_file: bool,
}

impl GlobalArgs {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(key) = &self.api_key {
            config.llm.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.llm.default_model = model.clone();
        }
        if let Some(model) = &self.tool_model {
            config.llm.tool_model = model.clone();
        }
        if let Some(model) = &self.judge_model {
            config.llm.judge_model = model.clone();
        }
        if let Some(group) = &self.group {
            config.observability.group = group.clone();
        }
        if self.no_trace_file {
            config.observability.file_sink = false;
        }
        config
    }
}

pub struct App {
    pub bot: ChefBot,
    pub config: Config,
    trace_file: Option<PathBuf>,
}

pub fn setup(config: Config) -> anyhow::Result<App> {
    let api_key = config.api_key()?;
    let provider = OpenAiProvider::with_base_url(api_key, &config.llm.base_url)
        .with_timeout(Duration::from_secs(config.llm.timeout_secs));

    let mut tracer = Tracer::new().with_sink(Arc::new(LogSink::new()));
    let mut trace_file = None;
    if config.observability.file_sink {
        let dir = config.trace_dir();
        let sink = FileSink::timestamped(&dir)
            .with_context(|| format!("Failed to create the run file in {}", dir.display()))?;
        trace_file = Some(sink.path().to_path_buf());
        tracer = tracer.with_sink(Arc::new(sink));
    }

    let bot = ChefBot::from_config(&config, Arc::new(provider)).with_tracer(tracer);
    debug!(
        base_url = %config.llm.base_url,
        models = ?bot.models(),
        group = bot.group(),
        "ChefBot ready"
    );
    Ok(App {
        bot,
        config,
        trace_file,
    })
}

impl App {
    pub fn finish(&self) {
        self.bot.tracer().flush();
        if let Some(path) = &self.trace_file {
            println!("\n{} {}", "Trace:".dimmed(), path.display());
        }
    }
}

pub fn banner(title: &str) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("{}", title.green().bold());
    println!("{}", rule);
}
