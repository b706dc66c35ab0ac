use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use morph_core::{AppConfig, Size};

mod commands;

#[derive(Parser)]
#[command(name = "morph")]
#[command(author, version, about = "Decelerating size animations for terminal panels")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive panel demo (default)
    Demo,
    /// Run one animation headless and log every tick
    Simulate {
        /// Starting size, e.g. 100x100
        #[arg(long)]
        from: Size,
        /// Target size, e.g. 200x100
        #[arg(long)]
        to: Size,
        /// Convergence divisor; larger is slower
        #[arg(long)]
        speed: Option<f64>,
        /// Tick period in milliseconds
        #[arg(long)]
        interval: Option<u64>,
        /// Leave the width untouched
        #[arg(long)]
        ignore_width: bool,
        /// Leave the height untouched
        #[arg(long)]
        ignore_height: bool,
        /// Finish within a small tolerance, then snap
        #[arg(long)]
        lazy: bool,
    },
    /// Monitor network connectivity
    Watch {
        /// Check once and exit
        #[arg(long)]
        once: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    let command = cli.command.unwrap_or(Commands::Demo);
    init_logging(&config, matches!(command, Commands::Demo))?;

    match command {
        Commands::Demo => commands::demo::run(config).await,
        Commands::Simulate {
            from,
            to,
            speed,
            interval,
            ignore_width,
            ignore_height,
            lazy,
        } => {
            let mut options = config.animation;
            if let Some(speed) = speed {
                options.speed_divisor = speed;
            }
            if let Some(interval) = interval {
                options.interval_ms = interval;
            }
            options.ignore_width |= ignore_width;
            options.ignore_height |= ignore_height;
            options.lazy |= lazy;
            commands::simulate::run(from, to, options).await
        }
        Commands::Watch { once } => commands::watch::run(&config, once).await,
        Commands::Config => commands::config::run(&config),
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. The demo owns the terminal,
/// so its logs go to a file in the data directory instead of stderr.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}
