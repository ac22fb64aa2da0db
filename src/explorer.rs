//! Multi-request aggregations built on the endpoint queries.
//!
//! Each routine keeps its requests strictly sequential and degrades in its
//! own way: the list-shaped ones shrink (down to empty), the 24h histogram
//! either returns all 24 buckets or fails so the caller can draw a
//! placeholder instead.

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use std::collections::BTreeMap;

use crate::client::StellarisClient;
use crate::error::Result;
use crate::sequential::{OnFailure, Sequential};
use crate::types::{Block, ChartPoint, SyntheticTransaction};

/// Server-side ceiling on `/get_blocks` page size; larger pages get a 422.
pub const MAX_BLOCKS_PER_REQUEST: u32 = 500;
/// Upper bound on blocks scanned for recent transactions.
pub const RECENT_TX_MAX_BLOCKS: u32 = 20;
/// ~24h of blocks at a one-minute average interval.
pub const ACTIVITY_WINDOW_BLOCKS: u64 = 1440;
pub const ACTIVITY_CHUNK_SIZE: u32 = 200;
/// Per-block transaction estimate used by the histogram instead of
/// fetching every transaction.
pub const ESTIMATED_TXS_PER_BLOCK: u32 = 1;

const HOUR: i64 = 3600;
const DAY: i64 = 24 * HOUR;

impl StellarisClient {
    /// Newest `limit` blocks, highest id first. Never fails: when the chain
    /// head is unknown the oldest page is returned instead, and when that
    /// fails too the result is empty.
    pub async fn latest_blocks(&self, limit: u32) -> Vec<Block> {
        if limit == 0 {
            return Vec::new();
        }

        let offset = match self.get_mining_info().await {
            Ok(info) if info.last_block.id > 0 => {
                Some((info.last_block.id + 1).saturating_sub(u64::from(limit)))
            }
            Ok(_) => {
                log::warn!("[stellarx][explorer] invalid latest block id, fetching blocks from offset 0");
                None
            }
            Err(e) => {
                log::error!("[stellarx][explorer] error fetching latest blocks: {e}");
                None
            }
        };

        if let Some(offset) = offset {
            match self.get_blocks(offset, limit).await {
                Ok(blocks) => return newest_first(blocks, limit),
                Err(e) if offset == 0 => {
                    log::error!("[stellarx][explorer] block page at offset 0 failed: {e}");
                    return Vec::new();
                }
                Err(e) => {
                    log::error!("[stellarx][explorer] block page at offset {offset} failed: {e}");
                }
            }
        }

        match self.get_blocks(0, limit).await {
            Ok(blocks) => {
                log::warn!(
                    "[stellarx][explorer] serving {} blocks from offset 0 fallback",
                    blocks.len()
                );
                newest_first(blocks, limit)
            }
            Err(e) => {
                log::error!("[stellarx][explorer] fallback block fetch also failed: {e}");
                Vec::new()
            }
        }
    }

    /// Up to `limit` coinbase placeholders synthesized from the newest blocks,
    /// newest first. No per-transaction lookups are made.
    pub async fn recent_transactions(&self, limit: u32) -> Vec<SyntheticTransaction> {
        if limit == 0 {
            return Vec::new();
        }
        let blocks = self
            .latest_blocks(RECENT_TX_MAX_BLOCKS.min(limit.saturating_mul(2)))
            .await;
        if blocks.is_empty() {
            return Vec::new();
        }

        let mut txs = Sequential::new("recent-txs", self.config().rate_limit_delay)
            .stop_after(limit as usize)
            .run(blocks, OnFailure::Skip, |block| {
                std::future::ready(synthesize(&block))
            })
            .await
            .unwrap_or_default();

        txs.sort_by(|a, b| b.time_mined.cmp(&a.time_mined));
        txs.truncate(limit as usize);
        txs
    }

    /// Blocks and estimated transactions per hour over the last 24 hours,
    /// labelled in local time.
    pub async fn network_activity_24h(&self) -> Result<Vec<ChartPoint>> {
        self.network_activity_at(Local::now()).await
    }

    /// [`Self::network_activity_24h`] relative to an explicit `now`; hour
    /// labels use `now`'s time zone.
    ///
    /// Fails only when the chain head cannot be read. Missing chunks just
    /// leave their hours short; every one of the 24 buckets is always present.
    pub async fn network_activity_at<Tz: TimeZone>(&self, now: DateTime<Tz>) -> Result<Vec<ChartPoint>> {
        let info = self.get_mining_info().await?;
        let head = info.last_block.id;
        let now_ts = now.timestamp();
        let tz = now.timezone();

        let window = head.min(ACTIVITY_WINDOW_BLOCKS);
        let offset = (head + 1).saturating_sub(window);
        let chunk = u64::from(ACTIVITY_CHUNK_SIZE.min(MAX_BLOCKS_PER_REQUEST));
        let chunks: Vec<(u64, u32)> = (0..window)
            .step_by(chunk as usize)
            .map(|i| (offset + i, chunk.min(window - i) as u32))
            .collect();

        log::debug!(
            "[stellarx][explorer] fetching {} blocks from offset {} in {} chunks",
            window,
            offset,
            chunks.len()
        );
        let pages = Sequential::new("activity", self.config().rate_limit_delay)
            .run(chunks, OnFailure::Skip, |(chunk_offset, chunk_limit)| {
                self.get_blocks(chunk_offset, chunk_limit)
            })
            .await?;
        let blocks: Vec<Block> = pages.into_iter().flatten().collect();
        log::debug!("[stellarx][explorer] fetched {} blocks for network activity", blocks.len());

        Ok(bucket_by_hour(&blocks, now_ts, &tz))
    }
}

fn synthesize(block: &Block) -> std::result::Result<SyntheticTransaction, String> {
    if block.hash.is_empty() {
        return Err(format!("block {} carries no hash", block.id));
    }
    Ok(SyntheticTransaction::from_block(block))
}

fn newest_first(mut blocks: Vec<Block>, limit: u32) -> Vec<Block> {
    blocks.sort_by(|a, b| b.id.cmp(&a.id));
    blocks.dedup_by_key(|b| b.id);
    blocks.truncate(limit as usize);
    blocks
}

/// 24 hourly buckets ending with the one containing `now_ts`, oldest first.
/// Blocks older than 24h, or outside the seeded buckets, are not counted.
pub fn bucket_by_hour<Tz: TimeZone>(blocks: &[Block], now_ts: i64, tz: &Tz) -> Vec<ChartPoint> {
    let current_hour = now_ts.div_euclid(HOUR) * HOUR;
    let mut buckets: BTreeMap<i64, (u32, u32)> = (0..24)
        .map(|i| (current_hour - (23 - i) * HOUR, (0, 0)))
        .collect();

    let cutoff = now_ts - DAY;
    for block in blocks.iter().filter(|b| b.timestamp >= cutoff) {
        let key = block.timestamp.div_euclid(HOUR) * HOUR;
        if let Some((block_count, tx_count)) = buckets.get_mut(&key) {
            *block_count += 1;
            *tx_count += ESTIMATED_TXS_PER_BLOCK;
        }
    }

    buckets
        .into_iter()
        .map(|(bucket_start, (blocks, transactions))| {
            let hour = local_hour(bucket_start, tz);
            ChartPoint {
                time: format!("{hour:02}:00"),
                transactions,
                blocks,
                hour,
                bucket_start,
            }
        })
        .collect()
}

fn local_hour<Tz: TimeZone>(ts: i64, tz: &Tz) -> u32 {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|utc| utc.with_timezone(tz).hour())
        .unwrap_or(0)
}
