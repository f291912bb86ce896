//! Schalter - Switchable OAuth 2.0 / OIDC provider sessions
//!
//! This library keeps track of which identity provider an application talks to,
//! how that provider is configured, and the session it handed out. The
//! protocol itself is delegated to an [`AuthConnect`](provider::AuthConnect)
//! implementation; Schalter decides when to call it and what to persist.
//!
//! # Features
//!
//! - Lazily loaded, cached provider configuration
//! - One-time, concurrency-safe initialization of the identity provider
//! - Pluggable storage backend (memory, file, OS keyring)
//! - Built-in presets for Azure AD B2C, AWS Cognito, Auth0 and Okta
//!
//! # Example
//!
//! ```no_run
//! use schalter::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(auth: Arc<dyn AuthConnect>) -> schalter::error::Result<()> {
//! let config = AppConfig::from_env("my-app")?;
//! let storage = Arc::new(config.open_file_storage()?);
//! let manager = SessionManager::new(storage, auth, config.platform);
//!
//! if !manager.settings_locked().await? {
//!     manager.apply(Preset::Okta.selection(config.platform)).await?;
//! }
//!
//! let status = manager.toggle().await?;
//! println!("{}", status.label());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod flight;
pub mod manager;
pub mod platform;
pub mod presets;
pub mod provider;
pub mod registry;
pub mod storage;

#[cfg(test)]
mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{AuthResult, Flow, FlowKind, Provider, ProviderKind, ProviderOptions};
    pub use crate::config::AppConfig;
    pub use crate::error::{Error, Result};
    pub use crate::manager::{AuthAction, InitState, SessionManager, SessionStatus};
    pub use crate::platform::{Platform, PlatformDetector};
    pub use crate::presets::{ConfigSelection, Preset};
    pub use crate::provider::{AuthConnect, IdentityProvider, SetupConfig};
    pub use crate::registry::ProviderRegistry;
    pub use crate::storage::{FileStorage, MemoryStorage, PreferenceStorage, SecureStorage};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::testing::FakeAuthConnect;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_full_session_flow() {
        let dir = std::env::temp_dir().join(format!("schalter_flow_{}", rand::random::<u32>()));
        let storage = Arc::new(FileStorage::with_path(dir.clone()).unwrap());
        let auth = Arc::new(FakeAuthConnect::new());
        auth.script(|s| s.access_token_available = true);

        let manager = SessionManager::new(storage.clone(), auth.clone(), Platform::Web);
        manager
            .apply(Preset::Azure.selection(Platform::Web))
            .await
            .unwrap();

        let status = manager.toggle().await.unwrap();
        assert!(status.authenticated);
        assert_eq!(auth.logins()[0].0, ProviderKind::Azure);

        // A second manager over the same directory picks the session back up
        let restored = SessionManager::new(storage, auth.clone(), Platform::Web);
        assert_eq!(
            restored.provider().await.unwrap().map(|p| p.key),
            Some(ProviderKind::Azure)
        );
        assert_eq!(
            restored.access_token().await.unwrap().as_deref(),
            Some("the-access-token")
        );
        assert_eq!(
            restored.flow().await.unwrap(),
            Some(Flow::new(FlowKind::Implicit))
        );

        restored.logout().await.unwrap();
        assert!(!restored.settings_locked().await.unwrap());

        std::fs::remove_dir_all(dir).ok();
    }
}
