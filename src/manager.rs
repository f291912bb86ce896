/// Session orchestration across switchable identity providers
///
/// [`SessionManager`] owns the in-memory view of the selected provider, its
/// options, the web flow and the current [`AuthResult`]. Config values are
/// loaded lazily from [`PreferenceStorage`] and the identity provider
/// capability is initialized once, on the first session operation.
use crate::catalog::{AuthResult, Flow, Provider, ProviderKind, ProviderOptions};
use crate::error::Result;
use crate::flight::{FlightState, SingleFlight};
use crate::platform::PlatformDetector;
use crate::presets::{self, ConfigSelection};
use crate::provider::{AuthConnect, IdentityProvider, SetupConfig};
use crate::registry::ProviderRegistry;
use crate::storage::PreferenceStorage;
use futures::future::FutureExt;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const AUTH_PROVIDER_KEY: &str = "auth-provider";
pub const AUTH_PROVIDER_OPTIONS_KEY: &str = "auth-provider-options";
pub const AUTH_FLOW_KEY: &str = "auth-flow";
pub const AUTH_RESULT_KEY: &str = "auth-result";

/// Initialization progress of a [`SessionManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
}

impl From<FlightState> for InitState {
    fn from(state: FlightState) -> Self {
        match state {
            FlightState::Idle => InitState::Uninitialized,
            FlightState::Running => InitState::Initializing,
            FlightState::Complete => InitState::Ready,
        }
    }
}

/// What the auth button does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Logout,
}

/// Snapshot of the current session for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub can_refresh: bool,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        if self.authenticated {
            "Logged In"
        } else {
            "Logged Out"
        }
    }

    pub fn next_action(&self) -> AuthAction {
        if self.authenticated {
            AuthAction::Logout
        } else {
            AuthAction::Login
        }
    }
}

/// A config slot: never read, or read (possibly finding nothing)
#[derive(Debug, Clone)]
enum Cached<T> {
    Unloaded,
    Loaded(Option<T>),
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Cached::Unloaded
    }
}

#[derive(Default)]
struct SessionCache {
    options: Cached<ProviderOptions>,
    flow: Cached<Flow>,
    provider: Cached<Provider>,
    result: Option<AuthResult>,
    /// Always built from `provider`; replaced together with it
    instance: Option<Arc<dyn IdentityProvider>>,
    /// Bumped by every reset; writes begun under an older value are dropped
    generation: u64,
}

impl SessionCache {
    fn options(&self) -> Option<ProviderOptions> {
        match &self.options {
            Cached::Loaded(options) => options.clone(),
            Cached::Unloaded => None,
        }
    }
}

/// Parse a stored JSON value; missing, blank and `null` all mean "absent"
fn parse_stored<T: DeserializeOwned>(value: Option<&str>) -> Result<Option<T>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Ok(serde_json::from_str::<Option<T>>(raw)?),
    }
}

struct Inner {
    storage: Arc<dyn PreferenceStorage>,
    auth: Arc<dyn AuthConnect>,
    platform: Arc<dyn PlatformDetector>,
    registry: ProviderRegistry,
    cache: Mutex<SessionCache>,
}

impl Inner {
    /// Cache-or-load one slot; the load is kept only if `generation` is current
    async fn cached<T>(
        &self,
        generation: u64,
        key: &str,
        slot: fn(&mut SessionCache) -> &mut Cached<T>,
    ) -> Result<Option<T>>
    where
        T: Clone + DeserializeOwned,
    {
        let current = slot(&mut self.cache.lock()).clone();
        if let Cached::Loaded(value) = current {
            return Ok(value);
        }

        let stored = self.storage.get(key).await?;
        let value: Option<T> = parse_stored(stored.as_deref())?;
        debug!(key, present = value.is_some(), "Loaded from storage");

        self.write_cache(generation, |cache| {
            *slot(cache) = Cached::Loaded(value.clone())
        });
        Ok(value)
    }

    fn generation(&self) -> u64 {
        self.cache.lock().generation
    }

    /// Apply `write` unless the cache was reset after `generation` was read
    fn write_cache<F>(&self, generation: u64, write: F)
    where
        F: FnOnce(&mut SessionCache),
    {
        let mut cache = self.cache.lock();
        if cache.generation == generation {
            write(&mut *cache);
        } else {
            debug!("Cache was reset, dropping stale write");
        }
    }

    async fn config(&self, generation: u64) -> Result<Option<ProviderOptions>> {
        self.cached(generation, AUTH_PROVIDER_OPTIONS_KEY, |cache| {
            &mut cache.options
        })
        .await
    }

    async fn flow(&self, generation: u64) -> Result<Option<Flow>> {
        self.cached(generation, AUTH_FLOW_KEY, |cache| &mut cache.flow)
            .await
    }

    async fn provider(&self, generation: u64) -> Result<Option<Provider>> {
        self.cached(generation, AUTH_PROVIDER_KEY, |cache| &mut cache.provider)
            .await
    }

    async fn initialize(&self) -> Result<()> {
        let generation = self.generation();
        if self.config(generation).await?.is_some() {
            self.rebuild_provider(generation).await?;
            self.setup(generation).await?;
            let stored = self.storage.get(AUTH_RESULT_KEY).await?;
            let result: Option<AuthResult> = parse_stored(stored.as_deref())?;
            debug!(session = result.is_some(), "Restored auth result");
            self.write_cache(generation, |cache| cache.result = result);
        } else {
            let selection = presets::default_selection(self.platform.platform());
            info!(provider = %selection.provider.key, "No stored configuration, applying defaults");
            self.set_config(
                generation,
                selection.provider,
                selection.options,
                selection.flow,
            )
            .await?;
        }
        Ok(())
    }

    /// Build the instance for the cached provider; Cognito when none is stored
    async fn rebuild_provider(&self, generation: u64) -> Result<Arc<dyn IdentityProvider>> {
        let kind = self
            .provider(generation)
            .await?
            .map(|provider| provider.key)
            .unwrap_or(ProviderKind::Cognito);
        let instance = self.registry.create(kind)?;
        self.write_cache(generation, |cache| cache.instance = Some(instance.clone()));
        Ok(instance)
    }

    async fn provider_instance(&self) -> Result<Arc<dyn IdentityProvider>> {
        let instance = self.cache.lock().instance.clone();
        match instance {
            Some(instance) => Ok(instance),
            None => self.rebuild_provider(self.generation()).await,
        }
    }

    async fn setup(&self, generation: u64) -> Result<()> {
        let flow = self.flow(generation).await?;
        let config = SetupConfig::new(self.platform.platform(), flow.map(|flow| flow.key));
        debug!(platform = ?config.platform, flow = ?config.web.auth_flow, "Setting up identity provider");
        self.auth.setup(&config).await
    }

    async fn set_config(
        &self,
        generation: u64,
        provider: Provider,
        options: ProviderOptions,
        flow: Option<Flow>,
    ) -> Result<()> {
        let provider_json = serde_json::to_string(&provider)?;
        let options_json = serde_json::to_string(&options)?;
        let flow_json = flow.as_ref().map(serde_json::to_string).transpose()?;
        let instance = self.registry.create(provider.key)?;

        let storage = &self.storage;
        let write_flow = async {
            match &flow_json {
                Some(value) => storage.set(AUTH_FLOW_KEY, value).await,
                None => storage.remove(AUTH_FLOW_KEY).await,
            }
        };
        tokio::try_join!(
            storage.set(AUTH_PROVIDER_KEY, &provider_json),
            storage.set(AUTH_PROVIDER_OPTIONS_KEY, &options_json),
            write_flow,
        )?;

        info!(
            provider = %provider.key,
            flow = flow.as_ref().map(|flow| flow.key.key()).unwrap_or("none"),
            "Configuration changed"
        );
        // Instance and provider change together, before setup can fail
        self.write_cache(generation, |cache| {
            cache.instance = Some(instance);
            cache.provider = Cached::Loaded(Some(provider));
            cache.options = Cached::Loaded(Some(options));
            // An omitted flow is re-read once so setup sees the removal
            cache.flow = match flow {
                Some(flow) => Cached::Loaded(Some(flow)),
                None => Cached::Unloaded,
            };
        });

        self.setup(generation).await
    }
}

/// Session manager for a single, switchable identity provider
///
/// Cheap to clone; clones share the same cache and initialization.
///
/// # Example
///
/// ```no_run
/// # async fn run(auth: std::sync::Arc<dyn schalter::provider::AuthConnect>) -> schalter::error::Result<()> {
/// use schalter::prelude::*;
/// use std::sync::Arc;
///
/// let manager = SessionManager::new(Arc::new(MemoryStorage::new()), auth, Platform::Web);
/// manager.login().await?;
/// if manager.is_authenticated().await? {
///     println!("token: {:?}", manager.access_token().await?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
    init: Arc<SingleFlight<()>>,
}

impl SessionManager {
    /// Create a session manager with the built-in provider registry
    pub fn new<P>(
        storage: Arc<dyn PreferenceStorage>,
        auth: Arc<dyn AuthConnect>,
        platform: P,
    ) -> Self
    where
        P: PlatformDetector + 'static,
    {
        Self::with_registry(storage, auth, platform, ProviderRegistry::new())
    }

    pub fn with_registry<P>(
        storage: Arc<dyn PreferenceStorage>,
        auth: Arc<dyn AuthConnect>,
        platform: P,
        registry: ProviderRegistry,
    ) -> Self
    where
        P: PlatformDetector + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                storage,
                auth,
                platform: Arc::new(platform),
                registry,
                cache: Mutex::new(SessionCache::default()),
            }),
            init: Arc::new(SingleFlight::new()),
        }
    }

    pub fn init_state(&self) -> InitState {
        self.init.state().into()
    }

    /// Drop every cached value and return to the uninitialized state
    pub fn reset(&self) {
        {
            let mut cache = self.inner.cache.lock();
            let generation = cache.generation.wrapping_add(1);
            *cache = SessionCache {
                generation,
                ..SessionCache::default()
            };
        }
        self.init.reset();
        debug!("Session cache reset");
    }

    async fn initialize(&self) -> Result<()> {
        let inner = self.inner.clone();
        let outcome = self
            .init
            .run(move || async move { inner.initialize().await }.boxed())
            .await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Session initialization failed");
        }
        outcome
    }

    /// Stored provider options, read from storage at most once
    pub async fn config(&self) -> Result<Option<ProviderOptions>> {
        self.inner.config(self.inner.generation()).await
    }

    pub async fn flow(&self) -> Result<Option<Flow>> {
        self.inner.flow(self.inner.generation()).await
    }

    pub async fn provider(&self) -> Result<Option<Provider>> {
        self.inner.provider(self.inner.generation()).await
    }

    /// Persist a new provider, options and flow, then re-run setup
    ///
    /// Without a flow any stored flow is removed. A live session is left alone.
    pub async fn set_config(
        &self,
        provider: Provider,
        options: ProviderOptions,
        flow: Option<Flow>,
    ) -> Result<()> {
        self.inner
            .set_config(self.inner.generation(), provider, options, flow)
            .await
    }

    /// Apply a preset or custom selection
    pub async fn apply(&self, selection: ConfigSelection) -> Result<()> {
        self.set_config(selection.provider, selection.options, selection.flow)
            .await
    }

    fn current_result(&self) -> Option<AuthResult> {
        self.inner.cache.lock().result.clone()
    }

    pub async fn can_refresh(&self) -> Result<bool> {
        self.initialize().await?;
        match self.current_result() {
            Some(result) => self.inner.auth.is_refresh_token_available(&result).await,
            None => Ok(false),
        }
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        self.initialize().await?;
        Ok(self.current_result().map(|result| result.access_token))
    }

    pub async fn is_access_token_expired(&self) -> Result<bool> {
        self.initialize().await?;
        match self.current_result() {
            Some(result) => self.inner.auth.is_access_token_expired(&result).await,
            None => Ok(false),
        }
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        self.initialize().await?;
        match self.current_result() {
            Some(result) => self.inner.auth.is_access_token_available(&result).await,
            None => Ok(false),
        }
    }

    /// Log in unless options are missing or a session already exists
    pub async fn login(&self) -> Result<()> {
        self.initialize().await?;

        let (options, has_session) = {
            let cache = self.inner.cache.lock();
            (cache.options(), cache.result.is_some())
        };
        let options = match options {
            Some(options) if !has_session => options,
            _ => {
                debug!(has_session, "Login skipped");
                return Ok(());
            }
        };

        let provider = self.inner.provider_instance().await?;
        let result = self.inner.auth.login(provider.as_ref(), &options).await?;
        self.inner.cache.lock().result = Some(result.clone());
        self.inner
            .storage
            .set(AUTH_RESULT_KEY, &serde_json::to_string(&result)?)
            .await?;

        info!(provider = %provider.kind(), "Logged in");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.initialize().await?;

        let Some(result) = self.current_result() else {
            debug!("Logout skipped, no session");
            return Ok(());
        };

        let provider = self.inner.provider_instance().await?;
        self.inner.auth.logout(provider.as_ref(), &result).await?;
        self.inner.cache.lock().result = None;
        self.inner.storage.remove(AUTH_RESULT_KEY).await?;

        info!(provider = %provider.kind(), "Logged out");
        Ok(())
    }

    /// Replace the session with a refreshed one
    pub async fn refresh(&self) -> Result<()> {
        self.initialize().await?;

        let Some(result) = self.current_result() else {
            debug!("Refresh skipped, no session");
            return Ok(());
        };

        let provider = self.inner.provider_instance().await?;
        let refreshed = self
            .inner
            .auth
            .refresh_session(provider.as_ref(), &result)
            .await?;
        self.inner.cache.lock().result = Some(refreshed.clone());
        self.inner
            .storage
            .set(AUTH_RESULT_KEY, &serde_json::to_string(&refreshed)?)
            .await?;

        info!(provider = %provider.kind(), "Session refreshed");
        Ok(())
    }

    pub async fn status(&self) -> Result<SessionStatus> {
        Ok(SessionStatus {
            authenticated: self.is_authenticated().await?,
            can_refresh: self.can_refresh().await?,
        })
    }

    /// Log in or out depending on the current status, then report the new one
    pub async fn toggle(&self) -> Result<SessionStatus> {
        match self.status().await?.next_action() {
            AuthAction::Login => self.login().await?,
            AuthAction::Logout => self.logout().await?,
        }
        self.status().await
    }

    pub async fn refresh_and_status(&self) -> Result<SessionStatus> {
        self.refresh().await?;
        self.status().await
    }

    /// Configuration must not be swapped during a live session
    pub async fn settings_locked(&self) -> Result<bool> {
        self.is_authenticated().await
    }
}
