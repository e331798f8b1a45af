use clap::Parser;

use greenroom::{AuthSettings, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "greenroom")]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value_t = 3000)]
    port: u16,

    /// Path to the SQLite credential database
    #[arg(long, default_value = "data/greenroom.db")]
    database: String,

    /// Directory served under /assets
    #[arg(long, default_value = "assets")]
    assets: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _logger = greenroom::setup_logging();

    // Misconfiguration is the only fatal failure class; everything past
    // startup is recoverable at the request boundary.
    let settings = match AuthSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        database: cli.database,
        assets_dir: cli.assets,
    };

    if let Err(err) = greenroom::server::serve(config, settings).await {
        log::error!("🚨 Server exited with error: {err}");
        std::process::exit(1);
    }
}
