//! `tijori` binary entry point.

use clap::Parser;
use tracing::debug;

use tijori_backoffice::config::AppConfig;
use tijori_backoffice::{init_tracing, run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    init_tracing(&config);
    debug!(?config, "Configuration loaded");

    if let Err(e) = run(cli, config).await {
        if json {
            match serde_json::to_string(&e) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("error: {}", e),
            }
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(e.kind.exit_code());
    }
}
