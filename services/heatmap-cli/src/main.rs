//! Heatmap CLI
//!
//! Renders weighted points as a density heatmap PNG, or replays a camera
//! motion to show the cached raster following the view until it is rebuilt.

mod animate;
mod config;
mod data;
mod render;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

/// Heatmap renderer
#[derive(Parser, Debug)]
#[command(name = "heatmap")]
#[command(about = "Render density heatmaps of weighted geographic points")]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty, env = "HEATMAP_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one heatmap frame to a PNG
    Render(render::RenderArgs),
    /// Pan, zoom or rotate the camera and write every composited frame
    Animate(animate::AnimateArgs),
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    let result = match &cli.command {
        Command::Render(args) => render::run(args),
        Command::Animate(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build();
            match runtime {
                Ok(runtime) => runtime.block_on(animate::run(args)).map(|summary| {
                    info!(frames = summary.frames, "Done");
                }),
                Err(e) => Err(anyhow::Error::new(e).context("Failed to create Tokio runtime")),
            }
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_animate() {
        let cli = Cli::try_parse_from([
            "heatmap",
            "animate",
            "--points",
            "p.json",
            "--pan-x",
            "-5",
            "--steps",
            "4",
            "--projection",
            "equirect",
        ])
        .unwrap();
        match cli.command {
            Command::Animate(args) => {
                assert_eq!(args.pan_x, -5.0);
                assert_eq!(args.steps, 4);
                assert_eq!(args.view.projection, config::ProjectionKind::Equirect);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
