use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use yap_scorer::{
    config::Settings,
    models::{Comparison, RewardEstimate, Side},
    proxy::{self, AppState},
    scoring::ScoreCalculator,
    upstream::{HttpUpstream, UpstreamConfig},
    utils::{format_fdv, format_money, format_price, format_qty},
};

mod tui_main;

#[derive(Parser)]
#[clap(name = "yap-scorer")]
#[clap(about = "Estimate mindshare leaderboard rewards", long_about = None)]
struct Cli {
    /// Settings file layered over the defaults
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate rewards for one or more handles on a project
    Score {
        /// Project slug or topic id (see `projects`)
        #[clap(short, long)]
        project: String,

        /// Handle to score, repeatable
        #[clap(short, long = "username", required = true)]
        usernames: Vec<String>,

        /// Simulated fully diluted valuation in USD
        #[clap(long)]
        fdv: Option<f64>,

        /// Print JSON instead of a summary
        #[clap(long)]
        json: bool,
    },

    /// Compare your estimate with a fren's
    Compare {
        #[clap(short, long)]
        project: String,

        #[clap(short, long)]
        username: String,

        #[clap(short, long)]
        fren: String,

        #[clap(long)]
        fdv: Option<f64>,

        #[clap(long)]
        json: bool,
    },

    /// Show follower and yap counts for a handle
    Overview {
        #[clap(short, long)]
        username: String,

        #[clap(long)]
        json: bool,
    },

    /// List configured projects
    Projects,

    /// Start the proxy server
    Serve {
        #[clap(long)]
        host: Option<String>,

        #[clap(short, long)]
        port: Option<u16>,
    },

    /// Launch interactive TUI
    Tui,
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::new().unwrap_or_else(|e| {
            eprintln!("Using default settings ({})", e);
            Settings::default()
        }),
    };
    settings.validate().map_err(|e| anyhow::anyhow!("Invalid settings: {}", e))?;
    Ok(settings)
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_ref())?;

    // The TUI owns the terminal, so it installs its own silent subscriber.
    if !matches!(cli.command, Commands::Tui) {
        init_logging(&settings);
    }

    let upstream = HttpUpstream::new(UpstreamConfig::from(&settings.upstream))?;
    let calculator = Arc::new(ScoreCalculator::new(Arc::new(upstream), settings.registry()));
    let default_fdv = settings.simulation.default_fdv;

    match cli.command {
        Commands::Score { project, usernames, fdv, json } => {
            let results = calculator
                .estimate_batch(&project, &usernames, fdv.unwrap_or(default_fdv))
                .await;

            let mut failures = 0;
            for (handle, result) in results {
                match result {
                    Ok(estimate) if json => println!("{}", serde_json::to_string_pretty(&estimate)?),
                    Ok(estimate) => print_estimate(&estimate),
                    Err(e) => {
                        failures += 1;
                        error!("Failed to load @{}: {}", handle, e);
                        println!("\n❌ @{}: failed to load ({})", handle, e);
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{} of {} estimates failed", failures, usernames.len());
            }
        }

        Commands::Compare { project, username, fren, fdv, json } => {
            let comparison = calculator
                .compare(&project, &username, &fren, fdv.unwrap_or(default_fdv))
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print_comparison(&comparison);
            }
        }

        Commands::Overview { username, json } => {
            let overview = calculator.overview(&username).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                println!("\n=== @{} ===", overview.handle);
                println!("Followers:       {}", format_qty(overview.status.follower_count as f64, 0));
                println!("Smart followers: {}", format_qty(overview.status.smart_follower_count as f64, 0));
                println!("Total yaps:      {}", format_qty(overview.yaps.yaps_all, 2));
                println!("Yaps (24h):      {}", format_qty(overview.yaps.yaps_l24h, 2));
            }
        }

        Commands::Projects => {
            println!("\n=== Projects ===");
            for project in calculator.registry().all() {
                println!(
                    "{:<12} {:<14} topic {:<13} pool {} ${} of {}",
                    project.slug,
                    project.name,
                    project.topic_id,
                    format_qty(project.reward_pool, 0),
                    project.ticker,
                    format_qty(project.total_supply, 0),
                );
            }
        }

        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| settings.proxy.host.clone());
            let port = port.unwrap_or(settings.proxy.port);
            info!("Starting proxy for {}", settings.upstream.base_url);

            let state = AppState::new(settings, calculator)?;
            proxy::start_server(state, &host, port).await?;
        }

        Commands::Tui => {
            tui_main::run_tui(&settings, calculator).await?;
        }
    }

    Ok(())
}

fn print_estimate(estimate: &RewardEstimate) {
    let score = &estimate.score;
    println!("\n=== {} rewards for @{} ===", estimate.project, estimate.handle);
    println!("Rows considered: {}", estimate.rows_considered);
    println!(
        "Weighted score:  {:.4} ({})",
        score.weighted_score,
        if score.used_mindshare { "mindshare" } else { "rank fallback" }
    );
    match score.best_rank {
        Some(rank) => println!("Best rank:       #{}", rank),
        None => println!("Best rank:       unranked"),
    }
    println!("Simulated FDV:   {}", format_fdv(estimate.valuation.fdv));
    println!("Tokens:          {} ${}", format_qty(score.tokens_awarded, 2), estimate.ticker);
    println!("Token price:     {}", format_price(estimate.valuation.token_price));
    println!("Reward worth:    {}", format_money(estimate.valuation.worth_usd));

    if score.eligible {
        println!("\n✅ Eligible: {}", estimate.tagline);
    } else {
        println!("\n❌ Not eligible");
    }
}

fn print_comparison(comparison: &Comparison) {
    for estimate in [&comparison.you, &comparison.fren] {
        println!(
            "@{:<20} {:>18} ${:<6} {:>16}",
            estimate.handle,
            format_qty(estimate.score.tokens_awarded, 2),
            estimate.ticker,
            format_money(estimate.valuation.worth_usd),
        );
    }

    let width = 40usize;
    let you_cells = (comparison.you_share * width as f64).round() as usize;
    println!(
        "[{}{}] {:.1}% / {:.1}%",
        "█".repeat(you_cells),
        "░".repeat(width - you_cells.min(width)),
        comparison.you_share * 100.0,
        (1.0 - comparison.you_share) * 100.0,
    );
    let marker = match comparison.leader {
        Side::You => "(you)",
        Side::Fren => "(fren)",
    };
    println!("Leader: @{} {}", comparison.leader_handle(), marker);
}
