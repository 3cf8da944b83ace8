// Content-addressed store for rendered diagram images, and the PlantUML
// server client that fills it

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Store key of a diagram: lowercase hex SHA-256 of its text
pub fn diagram_key(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Rendered images keyed by diagram text hash
pub trait DiagramStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagramStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::other("diagram store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::other("diagram store lock poisoned"))?;
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Directory of `<key>.png` files
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.png", key))
    }
}

impl DiagramStore for FsStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(path)?))
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), bytes)?;
        Ok(())
    }
}

/// A rendered diagram image
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDiagram {
    pub key: String,
    pub bytes: Vec<u8>,
    /// Served from the store without contacting a server
    pub cached: bool,
}

/// Renders diagram text to PNG through PlantUML servers
pub struct PlantUmlClient<S: DiagramStore> {
    client: Client,
    servers: Vec<String>,
    store: S,
}

impl<S: DiagramStore> PlantUmlClient<S> {
    /// Servers are tried in order until one succeeds
    pub fn new(servers: Vec<String>, timeout: Duration, store: S) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::render(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            servers,
            store,
        })
    }

    pub fn from_config(config: &RenderConfig, store: S) -> Result<Self> {
        Self::new(
            config.servers.clone(),
            Duration::from_secs(config.timeout_secs),
            store,
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Render the text, serving a stored image when one exists
    pub fn render(&self, text: &str) -> Result<RenderedDiagram> {
        let key = diagram_key(text);

        if let Some(bytes) = self.store.get(&key)? {
            debug!(key = %key, "diagram served from store");
            return Ok(RenderedDiagram {
                key,
                bytes,
                cached: true,
            });
        }

        if self.servers.is_empty() {
            return Err(Error::render("no PlantUML servers configured"));
        }

        let mut last_error = String::new();
        for server in &self.servers {
            match self.fetch(server, text) {
                Ok(bytes) => {
                    self.store.put(&key, &bytes)?;
                    info!(server = %server, key = %key, size = bytes.len(), "diagram rendered");
                    return Ok(RenderedDiagram {
                        key,
                        bytes,
                        cached: false,
                    });
                }
                Err(e) => {
                    warn!(server = %server, error = %e, "PlantUML server failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(Error::render(format!("all PlantUML servers failed: {}", last_error)))
    }

    fn fetch(&self, server: &str, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/png", server.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .body(text.to_string())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::render(e.to_string()))?;

        let bytes = response.bytes().map_err(|e| Error::render(e.to_string()))?;
        if bytes.is_empty() {
            return Err(Error::render(format!("{} returned an empty image", url)));
        }
        Ok(bytes.to_vec())
    }
}
