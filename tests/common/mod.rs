//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stellarx::{ClientConfig, HttpReply, HttpTransport, NetworkProfile, StellarisClient, TransportError};
use tokio::time::Instant;

pub const BASE_URL: &str = "http://node.test";

#[derive(Debug, Clone)]
pub struct Request {
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub at: Instant,
}

impl Request {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn param_u64(&self, key: &str) -> u64 {
        self.param(key).and_then(|v| v.parse().ok()).unwrap_or(0)
    }
}

type Responder = dyn Fn(&Request) -> Result<HttpReply, TransportError> + Send + Sync;

pub struct ScriptedTransport {
    responder: Box<Responder>,
    log: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(&Request) -> Result<HttpReply, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            log: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.endpoint).collect()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        _timeout: Duration,
    ) -> Result<HttpReply, TransportError> {
        let endpoint = url.strip_prefix(BASE_URL).unwrap_or(url).to_string();
        let req = Request {
            endpoint,
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            at: Instant::now(),
        };
        self.log.lock().unwrap().push(req.clone());
        (self.responder)(&req)
    }
}

pub fn client(transport: Arc<ScriptedTransport>) -> StellarisClient {
    StellarisClient::with_transport(
        NetworkProfile::default().with_url(BASE_URL),
        ClientConfig::default(),
        transport,
    )
}

pub fn ok(result: Value) -> Result<HttpReply, TransportError> {
    Ok(HttpReply {
        status: 200,
        body: json!({ "ok": true, "result": result }).to_string(),
    })
}

pub fn status(code: u16) -> Result<HttpReply, TransportError> {
    Ok(HttpReply {
        status: code,
        body: String::new(),
    })
}

pub fn block_json(id: u64, timestamp: i64) -> Value {
    json!({
        "id": id,
        "hash": format!("{id:064x}"),
        "content": "",
        "address": format!("miner{id}"),
        "random": 7,
        "difficulty": 6.5,
        "reward": 6,
        "timestamp": timestamp
    })
}

pub fn mining_info_json(head: u64, head_ts: i64) -> Value {
    json!({
        "difficulty": 6.5,
        "last_block": block_json(head, head_ts),
        "pending_transactions": [],
        "pending_transactions_hashes": [],
        "merkle_root": "00"
    })
}

/// `/get_blocks` page for `offset..offset+limit`, capped at `head`, one
/// block per minute ending at `head_ts`.
pub fn blocks_page(req: &Request, head: u64, head_ts: i64) -> Value {
    let offset = req.param_u64("offset");
    let limit = req.param_u64("limit");
    let page: Vec<Value> = (offset..offset + limit)
        .filter(|id| *id <= head)
        .map(|id| {
            json!({
                "block": block_json(id, head_ts - (head - id) as i64 * 60),
                "transactions": [],
            })
        })
        .collect();
    Value::Array(page)
}
