//! stellarx - Stellaris blockchain explorer data access
//!
//! This library turns the raw, rate-limited Stellaris node HTTP API into the
//! domain queries an explorer front end needs: blocks, transactions,
//! addresses, mining status, and a handful of aggregates built from them.
//!
//! ## Architecture
//!
//! Leaves first:
//! - **Rate limiter** (`rate_limit`): minimum spacing between requests
//! - **Retrying transport** (`net`, `rpc_utils`): GET with 429/network backoff
//! - **Endpoint queries** (`client`): one typed call per node endpoint
//! - **Aggregations** (`explorer`): latest blocks, recent transactions,
//!   24h activity histogram
//! - **Formatting** (`util_text`): display strings for amounts, times, hash rate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stellarx::{NetworkKind, NetworkProfile, StellarisClient};
//!
//! let client = StellarisClient::new(NetworkProfile::builtin(NetworkKind::MainNet));
//! let blocks = client.latest_blocks(10).await;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod explorer;
pub mod net;
pub mod rate_limit;
pub mod rpc_utils;
pub mod search;
pub mod sequential;
pub mod types;
pub mod util_text;

// Re-export commonly used types
pub use client::StellarisClient;
pub use config::{ClientConfig, NetworkKind, NetworkProfile};
pub use error::ApiError;
pub use rpc_utils::{HttpReply, HttpTransport, ReqwestTransport, TransportError};
pub use types::{
    AddressInfo, Amount, Block, ChartPoint, MiningInfo, SyntheticTransaction, Transaction,
    TransactionView, TxOutput,
};
