use async_trait::async_trait;
use base64::Engine;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

use scholia::attachments::IncomingFile;
use scholia::error::{Result, ScholiaError};
use scholia::gateway::ModelGateway;
use scholia::providers::{GenerationRequest, GenerationResponse, Provider};

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// An image whose payload is `tag`, so stubs can tell images apart
#[allow(dead_code)]
pub fn tagged_image(tag: &str) -> IncomingFile {
    IncomingFile::new(format!("{}.png", tag), "image/png", tag.as_bytes().to_vec())
}

#[allow(dead_code)]
pub fn gateway_for(provider: Arc<dyn Provider>) -> Arc<ModelGateway> {
    Arc::new(ModelGateway::with_provider(provider))
}

/// Key used to look up a scripted reply: the decoded payload of the first
/// inline part, or "text" for text-only requests
fn request_key(request: &GenerationRequest) -> String {
    request
        .inline_data
        .first()
        .and_then(|part| {
            base64::engine::general_purpose::STANDARD
                .decode(&part.data)
                .ok()
        })
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
        .unwrap_or_else(|| "text".to_string())
}

/// Provider answering from a script, with a per-key delay
#[allow(dead_code)]
pub struct ScriptedProvider {
    script: HashMap<String, (Duration, std::result::Result<String, String>)>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
    completed: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            script: HashMap::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(mut self, key: &str, delay_ms: u64, text: &str) -> Self {
        self.script.insert(
            key.to_string(),
            (Duration::from_millis(delay_ms), Ok(text.to_string())),
        );
        self
    }

    pub fn fail(mut self, key: &str, detail: &str) -> Self {
        self.script
            .insert(key.to_string(), (Duration::ZERO, Err(detail.to_string())));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Keys in the order their replies were produced
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let key = request_key(request);
        let (delay, reply) = self
            .script
            .get(&key)
            .cloned()
            .unwrap_or_else(|| (Duration::ZERO, Err(format!("no script for {}", key))));

        tokio::time::sleep(delay).await;
        self.completed.lock().unwrap().push(key);

        reply
            .map(GenerationResponse::new)
            .map_err(|detail| ScholiaError::Generation(detail).into())
    }
}

/// Provider that holds every call until released
#[allow(dead_code)]
pub struct BlockingProvider {
    reply: String,
    entered: Notify,
    release: Notify,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl BlockingProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Resolves once a call is in flight
    pub async fn wait_until_called(&self) {
        self.entered.notified().await;
    }

    /// Lets the in-flight call finish
    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for BlockingProvider {
    async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(GenerationResponse::new(self.reply.clone()))
    }
}
