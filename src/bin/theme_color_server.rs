use anyhow::Result;
use clap::Parser;
use image_theme_color::server::{DEFAULT_BIND_ADDR, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig, start_server};
use image_theme_color::{AlphaPolicy, SIGNIFICANCE_THRESHOLD, ThemeColorOptions};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Serve the image theme color page and upload endpoint.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "THEME_COLOR_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// A color must occur more than this many times to count
    #[arg(short, long, env = "THEME_COLOR_THRESHOLD", default_value_t = SIGNIFICANCE_THRESHOLD)]
    threshold: u32,

    /// Ignore fully transparent pixels
    #[arg(long, env = "THEME_COLOR_SKIP_TRANSPARENT")]
    skip_transparent: bool,

    /// Largest accepted upload in bytes
    #[arg(long, env = "THEME_COLOR_MAX_UPLOAD", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    /// Log as JSON lines instead of human-readable text
    #[arg(long)]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_filter(filter())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_filter(filter()).boxed()
    };
    tracing_subscriber::registry().with(layer).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let cfg = ServerConfig {
        bind_addr: args.bind,
        options: ThemeColorOptions {
            threshold: args.threshold,
            alpha: if args.skip_transparent {
                AlphaPolicy::SkipTransparent
            } else {
                AlphaPolicy::Include
            },
        },
        max_upload_bytes: args.max_upload_bytes,
    };

    let (_addr, server) = start_server(cfg).await?;

    tokio::select! {
        res = server => res??,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
