use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Coin amount as the node reports it.
///
/// The API is inconsistent here: some responses carry a JSON number, others
/// a decimal string. Both are normalized on decode into one canonical
/// decimal string (no exponent, no redundant zeros) so nothing downstream
/// ever compares raw representations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawAmount", into = "String")]
pub struct Amount(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawAmount> for Amount {
    fn from(raw: RawAmount) -> Self {
        match raw {
            RawAmount::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Amount(u.to_string())
                } else if let Some(i) = n.as_i64() {
                    Amount(i.to_string())
                } else {
                    Amount::from_f64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            RawAmount::Text(s) => Amount::from_decimal_str(&s),
        }
    }
}

impl From<Amount> for String {
    fn from(a: Amount) -> Self {
        a.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount("0".to_string())
    }
}

impl Amount {
    /// Normalize a decimal string. Text that is not a decimal number is kept
    /// verbatim (trimmed) and reports `None` from [`Amount::to_f64`].
    pub fn from_decimal_str(s: &str) -> Self {
        let trimmed = s.trim();
        Amount(normalize_decimal(trimmed).unwrap_or_else(|| trimmed.to_string()))
    }

    pub fn from_f64(v: f64) -> Self {
        if !v.is_finite() {
            return Amount("NaN".to_string());
        }
        // f64 Display never switches to exponent notation.
        Amount::from_decimal_str(&v.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        normalize_decimal(&self.0).is_some()
    }

    /// Numeric value for display or arithmetic; `None` when not a finite decimal.
    pub fn to_f64(&self) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical form: optional '-', integer part without leading zeros,
/// fraction without trailing zeros, no '.' when the fraction is empty.
fn normalize_decimal(s: &str) -> Option<String> {
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let int_trimmed = int_part.trim_start_matches('0');
    let frac_trimmed = frac_part.trim_end_matches('0');
    let int_out = if int_trimmed.is_empty() { "0" } else { int_trimmed };
    let is_zero = int_out == "0" && frac_trimmed.is_empty();

    let mut out = String::with_capacity(s.len());
    if negative && !is_zero {
        out.push('-');
    }
    out.push_str(int_out);
    if !frac_trimmed.is_empty() {
        out.push('.');
        out.push_str(frac_trimmed);
    }
    Some(out)
}

/// `{ ok, result }` envelope every endpoint answers with.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub amount: Amount,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default)]
    pub tx_hash: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub amount: Option<Amount>,
}

/// A transaction as the node knows it, resolvable through `/get_transaction`.
///
/// On decode, a record without inputs is taken to be coinbase even when the
/// node leaves the flag unset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTransaction")]
pub struct Transaction {
    pub is_coinbase: bool,
    pub hash: String,
    pub block_hash: Option<String>,
    pub time_mined: Option<i64>,
    pub outputs: Vec<TxOutput>,
    /// Empty for coinbase transactions.
    pub inputs: Vec<TxInput>,
}

#[derive(Deserialize)]
struct RawTransaction {
    #[serde(default)]
    is_coinbase: bool,
    hash: String,
    #[serde(default)]
    block_hash: Option<String>,
    #[serde(default)]
    time_mined: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    outputs: Vec<TxOutput>,
    #[serde(default, deserialize_with = "null_as_empty")]
    inputs: Vec<TxInput>,
}

impl From<RawTransaction> for Transaction {
    fn from(raw: RawTransaction) -> Self {
        Transaction {
            is_coinbase: raw.is_coinbase || raw.inputs.is_empty(),
            hash: raw.hash,
            block_hash: raw.block_hash,
            time_mined: raw.time_mined,
            outputs: raw.outputs,
            inputs: raw.inputs,
        }
    }
}

impl Transaction {
    /// Degraded record built from what a block response already embeds,
    /// used when the full lookup for `stub.hash` fails.
    pub fn from_stub(stub: &TxStub, block: &Block) -> Self {
        Transaction {
            is_coinbase: stub.is_coinbase,
            hash: stub.hash.clone(),
            block_hash: Some(block.hash.clone()),
            time_mined: Some(block.timestamp),
            outputs: Vec::new(),
            inputs: Vec::new(),
        }
    }
}

/// Coinbase-style placeholder synthesized from block fields.
///
/// Its hash is not a chain hash and must never be handed to the transaction
/// lookup endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SyntheticTransaction {
    pub hash: String,
    pub block_id: u64,
    pub block_hash: String,
    pub time_mined: i64,
    pub outputs: Vec<TxOutput>,
}

pub const SYNTHETIC_HASH_PREFIX: &str = "coinbase-";

impl SyntheticTransaction {
    pub fn from_block(block: &Block) -> Self {
        SyntheticTransaction {
            hash: format!("{SYNTHETIC_HASH_PREFIX}{}", block.hash),
            block_id: block.id,
            block_hash: block.hash.clone(),
            time_mined: block.timestamp,
            outputs: vec![TxOutput {
                address: block.address.clone(),
                amount: block.reward.clone(),
            }],
        }
    }
}

/// What presentation code needs from any transaction-shaped record.
pub trait TransactionView {
    fn hash(&self) -> &str;
    fn is_coinbase(&self) -> bool;
    fn block_hash(&self) -> Option<&str>;
    fn time_mined(&self) -> Option<i64>;
    fn outputs(&self) -> &[TxOutput];
    fn inputs(&self) -> &[TxInput];
    /// Whether `hash()` can be looked up on the node.
    fn is_resolvable(&self) -> bool;
}

impl TransactionView for Transaction {
    fn hash(&self) -> &str {
        &self.hash
    }
    fn is_coinbase(&self) -> bool {
        self.is_coinbase
    }
    fn block_hash(&self) -> Option<&str> {
        self.block_hash.as_deref()
    }
    fn time_mined(&self) -> Option<i64> {
        self.time_mined
    }
    fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }
    fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }
    fn is_resolvable(&self) -> bool {
        true
    }
}

impl TransactionView for SyntheticTransaction {
    fn hash(&self) -> &str {
        &self.hash
    }
    fn is_coinbase(&self) -> bool {
        true
    }
    fn block_hash(&self) -> Option<&str> {
        Some(&self.block_hash)
    }
    fn time_mined(&self) -> Option<i64> {
        Some(self.time_mined)
    }
    fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }
    fn inputs(&self) -> &[TxInput] {
        &[]
    }
    fn is_resolvable(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: u64,
    pub hash: String,
    #[serde(default)]
    pub content: String,
    pub address: String,
    #[serde(default)]
    pub random: u64,
    pub difficulty: f64,
    pub reward: Amount,
    /// Unix seconds.
    pub timestamp: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transactions: Vec<Transaction>,
}

/// Minimal transaction record embedded in a `/get_block` answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TxStub {
    pub hash: String,
    #[serde(default)]
    pub is_coinbase: bool,
}

/// Wrapper the block endpoints return around each block.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockEnvelope {
    pub block: Block,
    #[serde(default)]
    pub transactions: Option<Vec<String>>,
    #[serde(default)]
    pub full_transactions: Option<Vec<TxStub>>,
}

impl BlockEnvelope {
    /// Transactions referenced by the block, richest form first.
    pub fn referenced_transactions(&self) -> Vec<TxStub> {
        if let Some(full) = self.full_transactions.as_ref().filter(|v| !v.is_empty()) {
            return full.clone();
        }
        self.transactions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|hash| TxStub {
                hash: hash.clone(),
                is_coinbase: false,
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpendableOutput {
    pub amount: Amount,
    pub tx_hash: String,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputRef {
    pub tx_hash: String,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddressInfo {
    pub balance: Amount,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub spendable_outputs: Vec<SpendableOutput>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub pending_transactions: Option<Vec<Transaction>>,
    #[serde(default)]
    pub pending_spent_outputs: Option<Vec<OutputRef>>,
}

/// Chain-head snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MiningInfo {
    pub difficulty: f64,
    pub last_block: Block,
    /// Raw pending entries; the node does not fix their shape.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pending_transactions: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pending_transactions_hashes: Vec<String>,
    #[serde(default)]
    pub merkle_root: String,
}

/// One hour of the 24h activity histogram.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Local hour label, "HH:00".
    pub time: String,
    pub transactions: u32,
    pub blocks: u32,
    /// Local hour of day, 0-23.
    pub hour: u32,
    /// Unix seconds at the start of the bucket.
    pub bucket_start: i64,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
