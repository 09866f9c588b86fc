//! In-memory stand-in for the remote API.

use artscope_core::{ApiClient, FetchError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const BASE: &str = "https://api.harvardartmuseums.org";
pub const KEY: &str = "test-key";

#[derive(Default)]
pub struct FakeApi {
    responses: Mutex<HashMap<String, serde_json::Value>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, body: serde_json::Value) {
        self.responses.lock().unwrap().insert(url.to_string(), body);
    }

    /// Holds the response for `url` until the returned handle is notified.
    pub fn gate(&self, url: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(url.to_string(), Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait::async_trait]
impl ApiClient for FakeApi {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let gate = self.gates.lock().unwrap().get(url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status(404, format!("no fixture for {}", url)))
    }
}

pub fn page(titles: &[&str], next: Option<&str>, prev: Option<&str>) -> serde_json::Value {
    let records: Vec<serde_json::Value> = titles
        .iter()
        .map(|t| serde_json::json!({ "title": t, "primaryimageurl": format!("https://img/{}", t) }))
        .collect();
    serde_json::json!({
        "info": { "next": next, "prev": prev, "totalrecords": titles.len() },
        "records": records,
    })
}

pub fn reference_list(names: &[&str]) -> serde_json::Value {
    let records: Vec<serde_json::Value> = names
        .iter()
        .map(|n| serde_json::json!({ "name": n }))
        .collect();
    serde_json::json!({ "records": records })
}
