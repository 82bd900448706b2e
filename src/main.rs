use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gravity_sim_demo")]
#[command(about = "Interactive N-body gravity simulation")]
struct Cli {
    /// JSON system file to start from. Ctrl+S and Ctrl+O save to and load
    /// from it (default: system.json)
    system: Option<PathBuf>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    gravity_sim_demo::run(cli.system.as_deref());
}
