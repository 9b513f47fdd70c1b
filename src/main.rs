mod cli;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ap_core::Config;
use ap_engine::Transcoder;

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "audiopress=trace,ap_server=trace,ap_engine=trace,ap_core=debug,tower_http=debug"
    } else {
        "audiopress=info,ap_server=info,ap_engine=info,ap_core=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = Config::from_env();
            config.server.host = host;
            if let Some(port) = port {
                config.server.port = port;
            }
            if cli.verbose {
                config.verbose = true;
            }

            let artifact = ap_engine::artifact::resolve()
                .context("failed to provision audio engine")?;
            info!(path = %artifact.path.display(), "audio engine ready");

            let transcoder = Transcoder::new(&artifact.path).verbose(config.verbose);

            info!(
                host = %config.server.host,
                port = config.server.port,
                max_upload_size = config.limits.max_upload_size,
                "starting server"
            );

            let runtime = tokio::runtime::Runtime::new()?;
            runtime
                .block_on(ap_server::start(config, transcoder))
                .context("server error")?;
        }
        Commands::Version => {
            println!("audiopress {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
