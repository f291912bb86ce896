/// Persistent key-value storage with pluggable backends
use crate::error::{Error, Result};
use async_trait::async_trait;
use fs2::FileExt;
use keyring::Entry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// String-keyed, string-valued async storage
#[async_trait]
pub trait PreferenceStorage: Send + Sync {
    /// Read a value; `None` when the key is not present
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key
    async fn clear(&self) -> Result<()>;
}

/// In-memory storage implementation
///
/// Thread-safe and cheap to clone; clones share the same map.
/// Suitable for testing and simple use cases.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

#[async_trait]
impl PreferenceStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.values.write().clear();
        Ok(())
    }
}

/// File-based storage implementation using XDG conventions
///
/// All values live in a single `preferences.json` map. Every access takes an
/// advisory lock on `preferences.lock` so several processes can share the
/// directory: shared for reads, exclusive for read-modify-write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage instance for an application
    ///
    /// Respects `$XDG_DATA_HOME` first, then falls back to the platform data
    /// directory. Stores data in `<data_dir>/<app_name>/`.
    ///
    /// # Example
    ///
    /// ```
    /// use schalter::storage::FileStorage;
    ///
    /// let storage = FileStorage::new("my-app").unwrap();
    /// ```
    pub fn new(app_name: &str) -> Result<Self> {
        let base_dir = if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
            PathBuf::from(xdg_data)
        } else {
            dirs::data_dir()
                .ok_or_else(|| Error::Storage("Could not determine data directory".into()))?
        };

        Self::with_path(base_dir.join(app_name))
    }

    /// Create a file storage instance rooted at `path`
    pub fn with_path(path: PathBuf) -> Result<Self> {
        fs::create_dir_all(&path)?;
        Ok(Self { base_path: path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn preferences_path(&self) -> PathBuf {
        self.base_path.join("preferences.json")
    }

    fn open_lock(&self) -> Result<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.base_path.join("preferences.lock"))?;
        Ok(file)
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        let path = self.preferences_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(values)?;
        fs::write(self.preferences_path(), content)?;
        Ok(())
    }

    fn read_value(&self, key: &str) -> Result<Option<String>> {
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let result = self.load().map(|values| values.get(key).cloned());
        let _ = lock.unlock();
        result
    }

    fn update<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = self.load().and_then(|mut values| {
            change(&mut values);
            self.save(&values)
        });
        let _ = lock.unlock();
        result
    }

    /// Run file I/O off the async executor
    async fn blocking<R, F>(&self, work: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(FileStorage) -> Result<R> + Send + 'static,
    {
        let storage = self.clone();
        tokio::task::spawn_blocking(move || work(storage))
            .await
            .map_err(|e| Error::Storage(format!("Storage task failed: {}", e)))?
    }
}

#[async_trait]
impl PreferenceStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |storage| storage.read_value(&key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.blocking(move |storage| {
            storage.update(|values| {
                values.insert(key, value);
            })
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |storage| {
            storage.update(|values| {
                values.remove(&key);
            })
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.blocking(|storage| storage.update(|values| values.clear()))
            .await
    }
}

/// Secure storage using the OS credential manager
///
/// Values are stored through the platform keyring:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service API (libsecret)
///
/// The keyring cannot enumerate entries, so the keys written are tracked in a
/// file-backed index to support [`PreferenceStorage::clear`].
#[derive(Debug, Clone)]
pub struct SecureStorage {
    service: String,
    index: FileStorage,
}

impl SecureStorage {
    /// Create a secure storage instance
    ///
    /// # Example
    ///
    /// ```
    /// use schalter::storage::SecureStorage;
    ///
    /// let storage = SecureStorage::new("my-app").unwrap();
    /// ```
    pub fn new(app_name: &str) -> Result<Self> {
        let index = FileStorage::new(&format!("{}-secure-index", app_name))?;
        Ok(Self::with_index(app_name, index))
    }

    /// Create a secure storage instance with an explicit key index
    pub fn with_index(app_name: &str, index: FileStorage) -> Self {
        Self {
            service: format!("schalter-{}", app_name),
            index,
        }
    }

    fn entry(service: &str, key: &str) -> Result<Entry> {
        Entry::new(service, key)
            .map_err(|e| Error::Storage(format!("Failed to create keyring entry: {}", e)))
    }

    fn delete_entry(service: &str, key: &str) -> Result<()> {
        match Self::entry(service, key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to delete value from keyring: {}",
                e
            ))),
        }
    }

    async fn blocking<R, F>(&self, work: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(String) -> Result<R> + Send + 'static,
    {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || work(service))
            .await
            .map_err(|e| Error::Storage(format!("Keyring task failed: {}", e)))?
    }
}

#[async_trait]
impl PreferenceStorage for SecureStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |service| match Self::entry(&service, &key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read value from keyring: {}",
                e
            ))),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let (owned_key, value) = (key.to_string(), value.to_string());
        self.blocking(move |service| {
            Self::entry(&service, &owned_key)?
                .set_password(&value)
                .map_err(|e| Error::Storage(format!("Failed to save value to keyring: {}", e)))
        })
        .await?;
        self.index.set(key, &self.service).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let owned_key = key.to_string();
        self.blocking(move |service| Self::delete_entry(&service, &owned_key))
            .await?;
        self.index.remove(key).await
    }

    async fn clear(&self) -> Result<()> {
        let index = self.index.clone();
        let keys: Vec<String> = self
            .blocking(move |_| index.load().map(|values| values.into_keys().collect()))
            .await?;
        self.blocking(move |service| {
            keys.iter()
                .try_for_each(|key| Self::delete_entry(&service, key))
        })
        .await?;
        self.index.clear().await
    }
}
