use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::{DictionaryFetcher, PreferenceStore};
use crate::config::DEFAULT_PREFERENCE_KEY;
use crate::dictionary::Strings;
use crate::error::LoadError;
use crate::locale::LocaleTag;

/// Reads dictionary payloads from disk. Relative origins resolve against
/// `root`; `file://` origins and absolute paths are used as they are.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, origin: &str) -> PathBuf {
        let origin = origin.strip_prefix("file://").unwrap_or(origin);
        let origin = origin.split(['?', '#']).next().unwrap_or(origin);
        let path = Path::new(origin);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl DictionaryFetcher for FsFetcher {
    async fn fetch(&self, origin: &str) -> Result<Strings, LoadError> {
        let path = self.resolve(origin);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), bytes = content.len(), "Read dictionary payload");
        parse_payload(&path, &content)
    }
}

/// Decodes a flat key -> text payload. `.toml` files are read as TOML,
/// everything else as JSON.
pub fn parse_payload(path: &Path, content: &str) -> Result<Strings, LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(toml::from_str(content)?),
        _ => Ok(serde_json::from_str(content)?),
    }
}

/// Stores the chosen locale in a small TOML key/value file.
///
/// Inside a tokio runtime the file is written on the blocking pool; `load`
/// sees the newest value right away and [`FileStore::flush`] waits for the
/// disk to catch up.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    key: String,
    latest: Arc<Mutex<Option<String>>>,
    writes: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            latest: Arc::default(),
            writes: Arc::default(),
        }
    }

    /// `<config dir>/vavilon/preferences.toml`, if the platform has a config
    /// directory.
    pub fn user_default() -> Option<Self> {
        let dir = dirs::config_dir()?.join("vavilon");
        Some(Self::new(dir.join("preferences.toml"), DEFAULT_PREFERENCE_KEY))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for every write started by `save`.
    pub async fn flush(&self) {
        let writes = match self.writes.lock() {
            Ok(mut writes) => std::mem::take(&mut *writes),
            Err(_) => return,
        };
        for write in writes {
            if let Err(e) = write.await {
                error!("Preference write for {} did not finish: {}", self.path.display(), e);
            }
        }
    }

    fn read_all(&self) -> HashMap<String, String> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        toml::from_str(&content)
            .inspect_err(|e| warn!("Ignoring unreadable preference file {}: {}", self.path.display(), e))
            .unwrap_or_default()
    }

    fn write_all(&self, values: &HashMap<String, String>) -> Result<(), LoadError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(values)
            .map_err(|e| LoadError::InvalidPayload(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Writes the newest saved value. The lock is held for the whole
    /// read-modify-write so concurrent writers cannot interleave.
    fn write_latest(&self) {
        let Ok(latest) = self.latest.lock() else {
            return;
        };
        let Some(locale) = latest.clone() else {
            return;
        };
        let mut values = self.read_all();
        values.insert(self.key.clone(), locale);
        match self.write_all(&values) {
            Ok(()) => debug!("Stored locale preference in {}", self.path.display()),
            Err(e) => error!("Failed to store locale preference in {}: {}", self.path.display(), e),
        }
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Option<String> {
        if let Some(latest) = self.latest.lock().ok().and_then(|v| v.clone()) {
            return Some(latest);
        }
        self.read_all().remove(&self.key).filter(|v| !v.is_empty())
    }

    fn save(&mut self, locale: &LocaleTag) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(locale.to_string());
        }
        match Handle::try_current() {
            Ok(runtime) => {
                let store = self.clone();
                let write = runtime.spawn_blocking(move || store.write_latest());
                if let Ok(mut writes) = self.writes.lock() {
                    writes.retain(|w| !w.is_finished());
                    writes.push(write);
                }
            }
            Err(_) => self.write_latest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fr.json"), r#"{"greeting": "Bonjour"}"#).unwrap();
        fs::write(dir.path().join("de.toml"), "greeting = \"Hallo\"\n").unwrap();

        let fetcher = FsFetcher::new(dir.path());
        let fr = fetcher.fetch("fr.json").await.unwrap();
        assert_eq!(fr.get("greeting").map(String::as_str), Some("Bonjour"));

        let absolute = format!("file://{}", dir.path().join("de.toml").display());
        let de = fetcher.fetch(&absolute).await.unwrap();
        assert_eq!(de.get("greeting").map(String::as_str), Some("Hallo"));
    }

    #[tokio::test]
    async fn test_fetch_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nested.json"), r#"{"a": {"b": "c"}}"#).unwrap();
        fs::write(dir.path().join("bad.toml"), "greeting = ").unwrap();

        let fetcher = FsFetcher::new(dir.path());
        assert!(matches!(fetcher.fetch("missing.json").await, Err(LoadError::NotFound(_))));
        assert!(matches!(fetcher.fetch("nested.json").await, Err(LoadError::Json(_))));
        assert!(matches!(fetcher.fetch("bad.toml").await, Err(LoadError::Toml(_))));
    }

    #[test]
    fn test_resolve_strips_query() {
        let fetcher = FsFetcher::new("/srv/site");
        assert_eq!(fetcher.resolve("dicts/en.json?v=3"), PathBuf::from("/srv/site/dicts/en.json"));
    }

    #[test]
    fn test_file_store_round_trip_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "theme = \"dark\"\n").unwrap();

        let mut store = FileStore::new(&path, "vavilon-locale");
        assert_eq!(store.load(), None);

        store.save(&LocaleTag::new("FR"));
        assert_eq!(store.load().as_deref(), Some("fr"));

        let values: HashMap<String, String> =
            toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(values.get("theme").map(String::as_str), Some("dark"));
    }

    #[tokio::test]
    async fn test_file_store_writes_off_the_runtime_and_flushes_latest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        let mut store = FileStore::new(&path, "vavilon-locale");

        store.save(&LocaleTag::new("de"));
        store.save(&LocaleTag::new("fr"));
        assert_eq!(store.load().as_deref(), Some("fr"));

        store.flush().await;
        let values: HashMap<String, String> =
            toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(values.get("vavilon-locale").map(String::as_str), Some("fr"));

        let reopened = FileStore::new(&path, "vavilon-locale");
        assert_eq!(reopened.load().as_deref(), Some("fr"));
    }
}
