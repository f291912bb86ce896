/// Example: Switching identity providers and walking a session
///
/// This example wires a [`SessionManager`] to file storage and a simulated
/// identity provider, then logs in, refreshes, switches provider and logs out.
/// Configuration and the session survive between runs in the data directory.
///
/// Run:
/// ```bash
/// SCHALTER_PLATFORM=web RUST_LOG=schalter=debug cargo run --example session_walkthrough
/// ```
use async_trait::async_trait;
use schalter::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Hands out numbered tokens instead of talking to a real provider
#[derive(Default)]
struct SimulatedConnect {
    issued: AtomicU32,
}

impl SimulatedConnect {
    fn issue(&self, provider: &dyn IdentityProvider) -> AuthResult {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let name = provider.kind().key();
        AuthResult {
            access_token: format!("{}-access-{}", name, n),
            refresh_token: format!("{}-refresh-{}", name, n),
            id_token: format!("{}-id-{}", name, n),
        }
    }
}

#[async_trait]
impl AuthConnect for SimulatedConnect {
    async fn setup(&self, config: &SetupConfig) -> Result<()> {
        println!("  setup: {}", serde_json::to_string(config)?);
        Ok(())
    }

    async fn login(
        &self,
        provider: &dyn IdentityProvider,
        options: &ProviderOptions,
    ) -> Result<AuthResult> {
        println!("  login with {} ({})", provider.name(), options.client_id);
        Ok(self.issue(provider))
    }

    async fn logout(&self, provider: &dyn IdentityProvider, _result: &AuthResult) -> Result<()> {
        println!("  logout from {}", provider.name());
        Ok(())
    }

    async fn refresh_session(
        &self,
        provider: &dyn IdentityProvider,
        _result: &AuthResult,
    ) -> Result<AuthResult> {
        Ok(self.issue(provider))
    }

    async fn is_access_token_available(&self, result: &AuthResult) -> Result<bool> {
        Ok(!result.access_token.is_empty())
    }

    async fn is_access_token_expired(&self, _result: &AuthResult) -> Result<bool> {
        Ok(false)
    }

    async fn is_refresh_token_available(&self, result: &AuthResult) -> Result<bool> {
        Ok(!result.refresh_token.is_empty())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Session Walkthrough ===\n");

    let config = AppConfig::from_env("schalter-walkthrough")?;
    let storage = Arc::new(config.open_file_storage()?);
    println!("Platform: {:?}", config.platform);
    println!("Storage: {}\n", storage.base_path().display());

    let manager = SessionManager::new(
        storage,
        Arc::new(SimulatedConnect::default()),
        config.platform,
    );

    println!("Stored provider: {:?}", manager.provider().await?.map(|p| p.label));

    let status = manager.status().await?;
    println!("Status: {}\n", status.label());

    if status.next_action() == AuthAction::Login {
        println!("Logging in...");
        let status = manager.toggle().await?;
        println!("Status: {}", status.label());
    }
    println!("Access token: {:?}\n", manager.access_token().await?);

    if manager.can_refresh().await? {
        println!("Refreshing...");
        manager.refresh().await?;
        println!("Access token: {:?}\n", manager.access_token().await?);
    }

    println!("Logging out...");
    manager.logout().await?;
    println!("Status: {}\n", manager.status().await?.label());

    if config.presets_enabled() {
        println!("Switching to Okta...");
        manager.apply(Preset::Okta.selection(config.platform)).await?;
        manager.login().await?;
        println!("Access token: {:?}", manager.access_token().await?);
        println!("(run again to resume this session)");
    } else {
        println!("Presets unavailable for scheme {}", config.url_scheme);
    }

    Ok(())
}
