//! Client context and the typed endpoint queries.
//!
//! A `StellarisClient` is bound to one network profile and owns its own
//! rate limiter, so clients for different networks never throttle each
//! other. Switching networks means building another client.

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::{ClientConfig, NetworkProfile};
use crate::error::Result;
use crate::net::get_with_backoff;
use crate::rate_limit::RateLimiter;
use crate::rpc_utils::{HttpTransport, ReqwestTransport};
use crate::sequential::{OnFailure, Sequential};
use crate::types::{AddressInfo, Block, BlockEnvelope, MiningInfo, Transaction, TxStub};

pub struct StellarisClient {
    profile: NetworkProfile,
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    limiter: RateLimiter,
}

impl StellarisClient {
    /// Client on the pooled `reqwest` transport with default tuning.
    pub fn new(profile: NetworkProfile) -> Self {
        Self::with_transport(profile, ClientConfig::default(), Arc::new(ReqwestTransport))
    }

    pub fn with_transport(
        profile: NetworkProfile,
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let limiter = RateLimiter::new(config.rate_limit_delay);
        Self {
            profile,
            config,
            transport,
            limiter,
        }
    }

    /// Same transport and tuning, another network, a fresh limiter.
    pub fn for_network(&self, profile: NetworkProfile) -> Self {
        Self::with_transport(profile, self.config.clone(), self.transport.clone())
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.profile.url
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        get_with_backoff(
            self.transport.as_ref(),
            &self.limiter,
            &self.config,
            self.base_url(),
            endpoint,
            params,
        )
        .await
    }

    pub async fn get_mining_info(&self) -> Result<MiningInfo> {
        self.get("/get_mining_info", &[]).await
    }

    /// One page of blocks. Keep `limit` under the node's ceiling
    /// (see [`crate::explorer::MAX_BLOCKS_PER_REQUEST`]); oversized pages
    /// come back as `ApiError::RequestTooLarge` and are not retried.
    pub async fn get_blocks(&self, offset: u64, limit: u32) -> Result<Vec<Block>> {
        let page: Vec<BlockEnvelope> = self
            .get(
                "/get_blocks",
                &[("offset", offset.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(page
            .into_iter()
            .map(|env| Block {
                transactions: Vec::new(),
                ..env.block
            })
            .collect())
    }

    /// Single block. With `full_transactions`, every referenced transaction is
    /// looked up one at a time; a lookup that fails is replaced by a stub
    /// built from the block response instead of failing the block.
    pub async fn get_block(&self, block_id: u64, full_transactions: bool) -> Result<Block> {
        let env: BlockEnvelope = self
            .get(
                "/get_block",
                &[
                    ("block", block_id.to_string()),
                    ("full_transactions", full_transactions.to_string()),
                ],
            )
            .await?;

        let refs = if full_transactions {
            env.referenced_transactions()
        } else {
            Vec::new()
        };
        let mut block = Block {
            transactions: Vec::new(),
            ..env.block
        };
        if refs.is_empty() {
            return Ok(block);
        }

        log::info!(
            "[stellarx][client] fetching {} transactions for block {}",
            refs.len(),
            block_id
        );
        let stub_block = block.clone();
        let substitute = move |stub: &TxStub| Transaction::from_stub(stub, &stub_block);
        block.transactions = Sequential::new("block-txs", self.config.rate_limit_delay)
            .run(refs, OnFailure::Substitute(&substitute), |stub| async move {
                self.get_transaction(&stub.hash).await
            })
            .await?;
        Ok(block)
    }

    pub async fn get_transaction(&self, tx_hash: &str) -> Result<Transaction> {
        self.get("/get_transaction", &[("tx_hash", tx_hash.to_string())])
            .await
    }

    pub async fn get_address_info(&self, address: &str, transactions_limit: u32) -> Result<AddressInfo> {
        self.get(
            "/get_address_info",
            &[
                ("address", address.to_string()),
                ("transactions_count_limit", transactions_limit.to_string()),
            ],
        )
        .await
    }

    pub async fn get_pending_transactions(&self) -> Result<Vec<Transaction>> {
        self.get("/get_pending_transactions", &[]).await
    }

    /// Reachability check: one GET of the mining-info endpoint with the probe
    /// timeout, no retries. Any 2xx counts as available.
    pub async fn is_available(&self) -> bool {
        self.limiter.wait_if_needed().await;
        let url = format!("{}/get_mining_info", self.base_url());
        match self.transport.get(&url, &[], self.config.probe_timeout).await {
            Ok(reply) if reply.is_success() => true,
            Ok(reply) => {
                log::warn!(
                    "[stellarx][client] network {} is not available: http {}",
                    self.profile.kind,
                    reply.status
                );
                false
            }
            Err(e) => {
                log::warn!(
                    "[stellarx][client] network {} is not available: {}",
                    self.profile.kind,
                    e
                );
                false
            }
        }
    }
}
