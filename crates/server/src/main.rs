use clap::{Parser, ValueEnum};
use geocluster::{EngineBuilder, EngineConfig};
use geocluster_server::SourceSpec;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Transport {
    Http,
    Rpc,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, value_enum, default_value_t = Transport::Http)]
    transport: Transport,

    /// Engine configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listing source as tag=path.json; repeat for several sources
    #[arg(short, long = "source")]
    sources: Vec<SourceSpec>,
}

fn load_config(path: &Path) -> anyhow::Result<EngineConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config = if path.extension().is_some_and(|ext| ext == "json") {
        EngineConfig::from_json(&contents)?
    } else {
        EngineConfig::from_toml(&contents)?
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geocluster_server=info,geocluster=info,info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading engine configuration from {}", path.display());
            load_config(path)?
        }
        None => EngineConfig::default(),
    };

    let engine = EngineBuilder::new()
        .config(config)
        .sources(geocluster_server::load_sources(&args.sources)?)
        .build()?;
    let engine = Arc::new(engine);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl_c signal: {}", e);
            futures::future::pending::<()>().await;
        }
    };

    match args.transport {
        Transport::Rpc => {
            geocluster_server::run_server(listener, engine, shutdown).await?
        }
        #[cfg(feature = "http")]
        Transport::Http => {
            geocluster_server::transport::http::run_server(listener, engine, shutdown).await?
        }
        #[cfg(not(feature = "http"))]
        Transport::Http => anyhow::bail!("HTTP transport requires the `http` feature"),
    }

    Ok(())
}
