use crate::model::AlertRecord;
use crate::prelude::{StoreError, StoreResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Key the accumulated alert list is stored under.
pub const ALERT_STORE_KEY: &str = "alertMarkers";

/// Persistence port for the accumulated alert list. The whole list is
/// written on every change; the in-memory copy stays authoritative.
pub trait AlertStore: Send + Sync {
    fn load(&self) -> StoreResult<Vec<AlertRecord>>;
    fn save(&self, records: &[AlertRecord]) -> StoreResult<()>;
    fn clear(&self) -> StoreResult<()>;
}

fn decode(raw: &str) -> StoreResult<Vec<AlertRecord>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Keeps the serialized list in memory. Used for ephemeral runs and tests.
#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    value: Mutex<Option<String>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(records: &[AlertRecord]) -> StoreResult<Self> {
        Ok(Self {
            value: Mutex::new(Some(serde_json::to_string(records)?)),
        })
    }

    /// Raw stored value, `None` when nothing has been written or it was cleared.
    pub fn raw(&self) -> Option<String> {
        self.value.lock().ok().and_then(|value| value.clone())
    }
}

impl AlertStore for MemoryAlertStore {
    fn load(&self) -> StoreResult<Vec<AlertRecord>> {
        let value = self.value.lock().map_err(|_| StoreError::Poisoned)?;
        match value.as_deref() {
            Some(raw) => decode(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, records: &[AlertRecord]) -> StoreResult<()> {
        let encoded = serde_json::to_string(records)?;
        let mut value = self.value.lock().map_err(|_| StoreError::Poisoned)?;
        *value = Some(encoded);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let mut value = self.value.lock().map_err(|_| StoreError::Poisoned)?;
        *value = None;
        Ok(())
    }
}

/// Stores the list as one JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileAlertStore {
    path: PathBuf,
}

impl FileAlertStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/alertMarkers.json`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", ALERT_STORE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl AlertStore for FileAlertStore {
    fn load(&self) -> StoreResult<Vec<AlertRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        decode(&raw)
    }

    fn save(&self, records: &[AlertRecord]) -> StoreResult<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;
        let mut temp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer(&mut temp, records)?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
