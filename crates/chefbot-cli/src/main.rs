use chefbot_core::config::LogLevel;
use chefbot_core::Config;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "chefbot")]
#[command(author, version, about = "ChefBot, the seasonal cooking assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: commands::GlobalArgs,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the seasonal chef a question (Part 1)
    Ask {
        /// The question; defaults to the lunch question
        question: Option<String>,
        /// Run once at this temperature instead of 0.1, 0.7 and 1.2
        #[arg(short, long)]
        temperature: Option<f32>,
    },
    /// Plan a weekly menu: plan, execute each step, synthesize (Part 2)
    Plan {
        /// Constraints for the week
        constraints: Option<String>,
    },
    /// Create the evaluation dataset and run an experiment (Part 3)
    Eval {
        /// Only create the dataset
        #[arg(long)]
        dataset_only: bool,
    },
    /// Answer the dinner question with the kitchen tools (Part 4)
    Agent {
        /// The question; defaults to the dinner question
        question: Option<String>,
        /// Go through the Agent API instead of the bare loop
        #[arg(long)]
        framework: bool,
    },
    /// Restaurant waiter scenarios (Part 5)
    Restaurant {
        #[command(subcommand)]
        scenario: Option<commands::restaurant::Scenario>,
    },
    /// Four agents plan a dinner party (Part 6)
    Party {
        /// The request; defaults to the eight-guest Saturday dinner
        request: Option<String>,
    },
}

fn init_tracing(verbose: u8, configured: LogLevel) {
    let level = match verbose {
        0 => configured.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = cli.global.apply(Config::load_default()?.merge_env());
    init_tracing(cli.verbose, config.general.log_level);

    let ctx = commands::setup(config)?;

    match cli.command {
        Commands::Ask {
            question,
            temperature,
        } => commands::ask::run(&ctx, question, temperature).await?,
        Commands::Plan { constraints } => commands::plan::run(&ctx, constraints).await?,
        Commands::Eval { dataset_only } => commands::eval::run(&ctx, dataset_only).await?,
        Commands::Agent {
            question,
            framework,
        } => commands::agent::run(&ctx, question, framework).await?,
        Commands::Restaurant { scenario } => commands::restaurant::run(&ctx, scenario).await?,
        Commands::Party { request } => commands::party::run(&ctx, request).await?,
    }

    ctx.finish();
    Ok(())
}
