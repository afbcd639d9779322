use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::payload::ContentPayload;
use crate::style::StyleConfig;

// Storage backend
//------------------------------------------------------------------------------

/// Maximum number of presets kept, most recent first.
pub const PRESET_CAP: usize = 200;

/// Slot name for the serialized preset list, carried over from the original
/// storage key so existing blobs keep loading.
pub const STORAGE_KEY: &str = "qrkit_data_v3";

/// One persistent key-value slot. Read once at startup, overwritten wholesale
/// on every mutation; failures on either side are swallowed so the preset
/// list degrades to empty instead of raising.
pub trait StorageBackend {
    fn read(&self) -> Option<String>;

    fn write(&mut self, blob: &str);
}

/// File-backed slot: a single JSON file in the given directory.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(format!("{STORAGE_KEY}.json")) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn write(&mut self, blob: &str) {
        if let Err(e) = fs::write(&self.path, blob) {
            warn!("preset write to {:?} failed: {e}", self.path);
        }
    }
}

/// In-memory slot for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryBackend {
    slot: Option<String>,
}

impl MemoryBackend {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self { slot: Some(blob.into()) }
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> Option<String> {
        self.slot.clone()
    }

    fn write(&mut self, blob: &str) {
        self.slot = Some(blob.to_string());
    }
}

// Preset
//------------------------------------------------------------------------------

/// A named snapshot of payload + style. Serializes flat as
/// `{id, name, mode, payload, style}`, the record layout of the original
/// blob.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub payload: ContentPayload,
    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Deserialize)]
struct StoredBlob {
    #[serde(default)]
    presets: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct BlobOut<'a> {
    presets: &'a [Preset],
}

// Preset store
//------------------------------------------------------------------------------

/// Ordered preset list mirrored to one storage slot. Mutations rewrite the
/// whole blob; there are no partial updates and no transaction log.
pub struct PresetStore {
    presets: Vec<Preset>,
    backend: Box<dyn StorageBackend>,
}

impl PresetStore {
    /// Read the slot once and parse leniently: an unreadable or malformed
    /// blob yields an empty list, an individually malformed record is
    /// skipped, and records with merely missing fields get defaults.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let presets = match backend.read() {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<StoredBlob>(&raw) {
                Err(e) => {
                    warn!("preset blob unreadable, starting empty: {e}");
                    Vec::new()
                }
                Ok(blob) => blob
                    .presets
                    .into_iter()
                    .filter_map(|value| match serde_json::from_value::<Preset>(value) {
                        Ok(preset) => Some(preset),
                        Err(e) => {
                            warn!("skipping malformed preset record: {e}");
                            None
                        }
                    })
                    .collect(),
            },
        };
        Self { presets, backend }
    }

    pub fn in_memory() -> Self {
        Self::open(Box::<MemoryBackend>::default())
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Snapshot the current editor state. Silently does nothing when the
    /// payload encodes to an empty content string.
    pub fn save(&mut self, payload: &ContentPayload, style: &StyleConfig) -> Option<&Preset> {
        if payload.encode().is_empty() {
            debug!("not saving preset with empty content");
            return None;
        }
        let preset = Preset {
            id: Uuid::new_v4().to_string(),
            name: payload.display_name(),
            payload: payload.clone(),
            style: style.clone(),
        };
        self.presets.insert(0, preset);
        self.presets.truncate(PRESET_CAP);
        self.persist();
        self.presets.first()
    }

    /// Remove by id; an absent id is a no-op, not an error.
    pub fn remove(&mut self, id: &str) {
        let before = self.presets.len();
        self.presets.retain(|p| p.id != id);
        if self.presets.len() != before {
            self.persist();
        }
    }

    fn persist(&mut self) {
        match serde_json::to_string(&BlobOut { presets: &self.presets }) {
            Ok(blob) => self.backend.write(&blob),
            Err(e) => warn!("preset serialization failed: {e}"),
        }
    }
}
