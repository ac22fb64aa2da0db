// Command-line front end for the Stellaris explorer data layer

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use serde_json::{json, Value};

use stellarx::{
    config::ConnectionArgs,
    search,
    types::{Block, ChartPoint, MiningInfo, TransactionView},
    util_text::{calculate_hash_rate, format_amount, format_time, format_time_ago},
    StellarisClient,
};

/// stellarx - Stellaris blockchain explorer queries
///
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "stellarx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Stellaris blockchain explorer queries", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Print the resolved configuration to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chain head snapshot
    MiningInfo,
    /// One page of blocks
    Blocks {
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// A single block
    Block {
        id: u64,
        /// Resolve every transaction in the block
        #[arg(long)]
        full: bool,
    },
    /// A single transaction
    Tx { hash: String },
    /// Balance, spendable outputs and recent transactions of an address
    Address {
        address: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Mempool contents
    Pending,
    /// Newest blocks, highest first
    Latest {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Newest coinbase transactions
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Blocks per hour over the last 24 hours
    Activity,
    /// Classify a search query
    Search { query: String },
    /// Check whether the node answers
    Probe,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = cli
        .connection
        .resolve()
        .context("Failed to load configuration")?;
    if cli.verbose {
        settings.print_summary();
    }

    let client = StellarisClient::with_transport(
        settings.profile.clone(),
        settings.client.clone(),
        std::sync::Arc::new(stellarx::ReqwestTransport),
    );

    let out = match cli.command {
        Command::MiningInfo => mining_json(&client.get_mining_info().await?),
        Command::Blocks { offset, limit } => {
            let blocks = client.get_blocks(offset, limit).await?;
            Value::Array(blocks.iter().map(block_json).collect())
        }
        Command::Block { id, full } => block_json(&client.get_block(id, full).await?),
        Command::Tx { hash } => tx_json(&client.get_transaction(&hash).await?),
        Command::Address { address, limit } => {
            let info = client.get_address_info(&address, limit).await?;
            let mut v = serde_json::to_value(&info)?;
            v["balance_display"] = json!(format_amount(&info.balance));
            v
        }
        Command::Pending => {
            let txs = client.get_pending_transactions().await?;
            Value::Array(txs.iter().map(tx_json).collect())
        }
        Command::Latest { limit } => {
            let blocks = client.latest_blocks(limit).await;
            Value::Array(blocks.iter().map(block_json).collect())
        }
        Command::Recent { limit } => {
            let txs = client.recent_transactions(limit).await;
            Value::Array(txs.iter().map(tx_json).collect())
        }
        Command::Activity => match client.network_activity_24h().await {
            Ok(points) => json!({ "placeholder": false, "points": points }),
            Err(e) => {
                log::warn!("network activity unavailable, drawing placeholder: {e}");
                json!({ "placeholder": true, "points": placeholder_activity() })
            }
        },
        Command::Search { query } => match search::classify(&query) {
            Some(target) => json!({ "target": format!("{target:?}"), "path": target.path() }),
            None => json!({ "target": null }),
        },
        Command::Probe => json!({
            "network": settings.profile.kind.to_string(),
            "url": settings.profile.url,
            "available": client.is_available().await,
        }),
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn block_json(block: &Block) -> Value {
    let mut v = serde_json::to_value(block).unwrap_or_default();
    v["reward_display"] = json!(format_amount(&block.reward));
    v["time_display"] = json!(format_time(block.timestamp));
    v["time_ago"] = json!(format_time_ago(Some(block.timestamp)));
    v
}

fn tx_json<T: TransactionView + serde::Serialize>(tx: &T) -> Value {
    let mut v = serde_json::to_value(tx).unwrap_or_default();
    let total: f64 = tx
        .outputs()
        .iter()
        .filter_map(|o| o.amount.to_f64())
        .sum();
    v["amount_display"] = json!(format_amount(total));
    v["time_ago"] = json!(format_time_ago(tx.time_mined()));
    v["resolvable"] = json!(tx.is_resolvable());
    v
}

fn mining_json(info: &MiningInfo) -> Value {
    json!({
        "difficulty": format_amount(info.difficulty),
        "hash_rate": calculate_hash_rate(info.difficulty),
        "last_block": block_json(&info.last_block),
        "pending_transactions": info.pending_transactions_hashes.len(),
        "merkle_root": info.merkle_root,
    })
}

/// Random but plausible series, used only when the node cannot be read.
fn placeholder_activity() -> Vec<ChartPoint> {
    let mut rng = rand::thread_rng();
    stellarx::explorer::bucket_by_hour(&[], chrono::Utc::now().timestamp(), &chrono::Local)
        .into_iter()
        .map(|mut p| {
            p.blocks = rng.gen_range(20..=60);
            p.transactions = p.blocks + rng.gen_range(0..=p.blocks * 4);
            p
        })
        .collect()
}
