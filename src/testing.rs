/// Recording fakes for the storage and identity provider capabilities
use crate::catalog::{AuthResult, ProviderKind, ProviderOptions};
use crate::error::{Error, Result};
use crate::provider::{AuthConnect, IdentityProvider, SetupConfig};
use crate::storage::{MemoryStorage, PreferenceStorage};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Get(String),
    Set(String, String),
    Remove(String),
    Clear,
}

/// Memory storage that records every call and yields on reads
#[derive(Debug, Clone, Default)]
pub struct RecordingStorage {
    values: MemoryStorage,
    calls: Arc<Mutex<Vec<StorageCall>>>,
    fail_reads: Arc<Mutex<bool>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value without recording the call
    pub async fn seed(&self, key: &str, value: &str) {
        self.values.set(key, value).await.unwrap();
    }

    pub async fn value(&self, key: &str) -> Option<String> {
        self.values.get(key).await.unwrap()
    }

    pub fn fail_reads(&self, fail: bool) {
        *self.fail_reads.lock() = fail;
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::Get(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn sets(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::Set(key, value) => Some((key, value)),
                _ => None,
            })
            .collect()
    }

    pub fn removes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StorageCall::Remove(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn touched(&self, key: &str) -> bool {
        self.calls().iter().any(|call| match call {
            StorageCall::Get(k) | StorageCall::Set(k, _) | StorageCall::Remove(k) => k == key,
            StorageCall::Clear => true,
        })
    }

    pub fn forget_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl PreferenceStorage for RecordingStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.calls.lock().push(StorageCall::Get(key.to_string()));
        tokio::task::yield_now().await;
        if *self.fail_reads.lock() {
            return Err(Error::Storage(format!("read of {} failed", key)));
        }
        self.values.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.calls
            .lock()
            .push(StorageCall::Set(key.to_string(), value.to_string()));
        self.values.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.calls.lock().push(StorageCall::Remove(key.to_string()));
        self.values.remove(key).await
    }

    async fn clear(&self) -> Result<()> {
        self.calls.lock().push(StorageCall::Clear);
        self.values.clear().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCall {
    Setup(SetupConfig),
    Login(ProviderKind, ProviderOptions),
    Logout(ProviderKind, AuthResult),
    Refresh(ProviderKind, AuthResult),
    AccessTokenAvailable(AuthResult),
    AccessTokenExpired(AuthResult),
    RefreshTokenAvailable(AuthResult),
}

/// Scripted responses returned by [`FakeAuthConnect`]
#[derive(Debug, Clone)]
pub struct Script {
    pub login_result: AuthResult,
    pub refresh_result: AuthResult,
    pub access_token_available: bool,
    pub access_token_expired: bool,
    pub refresh_token_available: bool,
    pub login_error: Option<String>,
    pub setup_error: Option<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            login_result: tokens("the"),
            refresh_result: tokens("new"),
            access_token_available: false,
            access_token_expired: false,
            refresh_token_available: false,
            login_error: None,
            setup_error: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeAuthConnect {
    calls: Mutex<Vec<AuthCall>>,
    script: Mutex<Script>,
}

impl FakeAuthConnect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script<F: FnOnce(&mut Script)>(&self, change: F) {
        change(&mut self.script.lock());
    }

    pub fn calls(&self) -> Vec<AuthCall> {
        self.calls.lock().clone()
    }

    pub fn setups(&self) -> Vec<SetupConfig> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AuthCall::Setup(config) => Some(config),
                _ => None,
            })
            .collect()
    }

    pub fn logins(&self) -> Vec<(ProviderKind, ProviderOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AuthCall::Login(kind, options) => Some((kind, options)),
                _ => None,
            })
            .collect()
    }

    pub fn logouts(&self) -> Vec<(ProviderKind, AuthResult)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AuthCall::Logout(kind, result) => Some((kind, result)),
                _ => None,
            })
            .collect()
    }

    pub fn refreshes(&self) -> Vec<(ProviderKind, AuthResult)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AuthCall::Refresh(kind, result) => Some((kind, result)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: AuthCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl AuthConnect for FakeAuthConnect {
    async fn setup(&self, config: &SetupConfig) -> Result<()> {
        self.record(AuthCall::Setup(config.clone()));
        match self.script.lock().setup_error.clone() {
            Some(message) => Err(Error::Capability(message)),
            None => Ok(()),
        }
    }

    async fn login(
        &self,
        provider: &dyn IdentityProvider,
        options: &ProviderOptions,
    ) -> Result<AuthResult> {
        self.record(AuthCall::Login(provider.kind(), options.clone()));
        let script = self.script.lock().clone();
        match script.login_error {
            Some(message) => Err(Error::Capability(message)),
            None => Ok(script.login_result),
        }
    }

    async fn logout(&self, provider: &dyn IdentityProvider, result: &AuthResult) -> Result<()> {
        self.record(AuthCall::Logout(provider.kind(), result.clone()));
        Ok(())
    }

    async fn refresh_session(
        &self,
        provider: &dyn IdentityProvider,
        result: &AuthResult,
    ) -> Result<AuthResult> {
        self.record(AuthCall::Refresh(provider.kind(), result.clone()));
        Ok(self.script.lock().refresh_result.clone())
    }

    async fn is_access_token_available(&self, result: &AuthResult) -> Result<bool> {
        self.record(AuthCall::AccessTokenAvailable(result.clone()));
        Ok(self.script.lock().access_token_available)
    }

    async fn is_access_token_expired(&self, result: &AuthResult) -> Result<bool> {
        self.record(AuthCall::AccessTokenExpired(result.clone()));
        Ok(self.script.lock().access_token_expired)
    }

    async fn is_refresh_token_available(&self, result: &AuthResult) -> Result<bool> {
        self.record(AuthCall::RefreshTokenAvailable(result.clone()));
        Ok(self.script.lock().refresh_token_available)
    }
}

/// `<prefix>-access-token`, `<prefix>-refresh-token`, `<prefix>-id-token`
pub fn tokens(prefix: &str) -> AuthResult {
    AuthResult {
        access_token: format!("{}-access-token", prefix),
        refresh_token: format!("{}-refresh-token", prefix),
        id_token: format!("{}-id-token", prefix),
    }
}
