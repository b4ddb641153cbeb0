use distributed_cache::group::group::Group;
use distributed_cache::group::registry::GroupRegistry;
use distributed_cache::transport::handlers::{api_router, peer_router};
use distributed_cache::transport::pool::HttpPool;
use distributed_cache::transport::protocol::DEFAULT_BASE_PATH;

use anyhow::{Context, anyhow};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8001;
const DEFAULT_API_ADDR: &str = "127.0.0.1:9999";
const DEFAULT_CACHE_BYTES: usize = 2 << 10;
const DEFAULT_PEERS: [&str; 3] = [
    "http://127.0.0.1:8001",
    "http://127.0.0.1:8002",
    "http://127.0.0.1:8003",
];

/// Simulated latency of the demo database.
const SLOW_DB_DELAY: Duration = Duration::from_millis(100);

struct Config {
    port: u16,
    api: bool,
    api_addr: SocketAddr,
    peers: Vec<String>,
    cache_bytes: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = parse_config()?;
    let self_url = format!("http://127.0.0.1:{}", config.port);

    tracing::info!("Starting cache node {}", self_url);
    tracing::info!("Peers: {:?}", config.peers);

    // 1. Groups:
    let registry = GroupRegistry::new();
    let scores = create_scores_group(&registry, config.cache_bytes)?;

    // 2. Peers:
    let pool = Arc::new(HttpPool::new(&self_url));
    pool.set_peers(&config.peers);
    scores.register_peers(pool.clone())?;

    // 3. Front API:
    if config.api {
        let api_listener = tokio::net::TcpListener::bind(config.api_addr).await?;
        tracing::info!("API server listening on {}", config.api_addr);

        let app = api_router(scores.clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(api_listener, app).await {
                tracing::error!("API server stopped: {}", e);
            }
        });
    }

    // 4. Peer server:
    let peer_addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let app = peer_router(registry, DEFAULT_BASE_PATH);

    tracing::info!("Cache server listening on {}", peer_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(peer_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Registers the `scores` group, backed by a small in-memory table that answers slowly.
fn create_scores_group(registry: &GroupRegistry, cache_bytes: usize) -> anyhow::Result<Arc<Group>> {
    let db: Arc<HashMap<&'static str, &'static str>> =
        Arc::new(HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]));

    let group = registry.create_group("scores", cache_bytes, move |key: String| {
        let db = db.clone();
        async move {
            tracing::info!("[SlowDB] search key {}", key);
            tokio::time::sleep(SLOW_DB_DELAY).await;

            match db.get(key.as_str()) {
                Some(value) => Ok(value.as_bytes().to_vec()),
                None => Err(anyhow!("{} not exist", key)),
            }
        }
    })?;

    Ok(group)
}

fn parse_config() -> anyhow::Result<Config> {
    let mut config = Config {
        port: env_or("CACHE_PORT", DEFAULT_PORT)?,
        api: std::env::var("CACHE_API").map(|v| v == "1").unwrap_or(false),
        api_addr: env_or("CACHE_API_ADDR", DEFAULT_API_ADDR.parse()?)?,
        peers: std::env::var("CACHE_PEERS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        cache_bytes: env_or("CACHE_BYTES", DEFAULT_CACHE_BYTES)?,
    };

    let args: Vec<String> = std::env::args().collect();
    let mut cli_peers: Vec<String> = vec![];

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                config.port = flag_value(&args, i)?.parse()?;
                i += 2;
            }
            "--api" => {
                config.api = true;
                i += 1;
            }
            "--api-addr" => {
                config.api_addr = flag_value(&args, i)?.parse()?;
                i += 2;
            }
            "--peer" => {
                cli_peers.push(flag_value(&args, i)?.to_string());
                i += 2;
            }
            "--cache-bytes" => {
                config.cache_bytes = flag_value(&args, i)?.parse()?;
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: {} [--port <n>] [--api] [--api-addr <addr:port>] [--peer <url>]... [--cache-bytes <n>]",
                    args[0]
                );
                eprintln!("Example: {} --port 8003 --api", args[0]);
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    if !cli_peers.is_empty() {
        config.peers = cli_peers;
    }
    if config.peers.is_empty() {
        config.peers = DEFAULT_PEERS.iter().map(|p| p.to_string()).collect();
    }

    Ok(config)
}

fn flag_value(args: &[String], i: usize) -> anyhow::Result<&str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", args[i]))
}

fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid value for {}: {}", name, value)),
        Err(_) => Ok(default),
    }
}
