use clap::Parser;
use tesla_cli::cli::{Config, Runner, die};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(config.verbosity().log_level_filter())
        .init();

    if let Err(err) = Runner::new(config).run().await {
        die(1, &err.to_string());
    }
}
