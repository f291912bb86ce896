/// Identity provider capability consumed by the session manager
///
/// The protocol work (discovery, token exchange, PKCE or implicit mechanics)
/// lives behind [`AuthConnect`]. This crate only coordinates calls to it.
use crate::catalog::{AuthResult, FlowKind, ProviderKind, ProviderOptions};
use crate::error::Result;
use crate::platform::Platform;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A provider instance handed to the capability on every protocol call
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    fn kind(&self) -> ProviderKind;

    fn name(&self) -> &'static str {
        self.kind().label()
    }
}

macro_rules! identity_provider {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $name {
            pub fn new() -> Self {
                Self
            }
        }

        impl IdentityProvider for $name {
            fn kind(&self) -> ProviderKind {
                $kind
            }
        }
    };
}

identity_provider!(
    /// Auth0 tenant; requires an audience or the JWT payload comes back empty
    Auth0Provider => ProviderKind::Auth0
);
identity_provider!(
    /// Azure AD B2C user flow
    AzureProvider => ProviderKind::Azure
);
identity_provider!(
    /// AWS Cognito user pool
    CognitoProvider => ProviderKind::Cognito
);
identity_provider!(OktaProvider => ProviderKind::Okta);
identity_provider!(OneLoginProvider => ProviderKind::OneLogin);

/// Platform tag understood by the capability's setup call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupPlatform {
    Capacitor,
    Web,
}

impl From<Platform> for SetupPlatform {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Hybrid => SetupPlatform::Capacitor,
            Platform::Web => SetupPlatform::Web,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Error,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebView {
    Private,
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    Popup,
    Current,
}

/// Native-only settings; ignored on the web
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosSetup {
    pub web_view: WebView,
}

/// Web-only settings; ignored on native platforms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSetup {
    pub ui_mode: UiMode,
    pub auth_flow: FlowKind,
}

/// Process-wide configuration passed to [`AuthConnect::setup`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupConfig {
    pub platform: SetupPlatform,
    pub log_level: LogLevel,
    pub ios: IosSetup,
    pub web: WebSetup,
}

impl SetupConfig {
    /// Build the setup payload for a platform and (optional) selected flow
    ///
    /// Without a stored flow the web side falls back to the implicit flow.
    pub fn new(platform: Platform, flow: Option<FlowKind>) -> Self {
        Self {
            platform: platform.into(),
            log_level: LogLevel::Debug,
            ios: IosSetup {
                web_view: WebView::Private,
            },
            web: WebSetup {
                ui_mode: UiMode::Popup,
                auth_flow: flow.unwrap_or(FlowKind::Implicit),
            },
        }
    }
}

/// OAuth/OIDC protocol operations
#[async_trait]
pub trait AuthConnect: Send + Sync {
    /// One-time global setup; re-issued whenever configuration changes
    async fn setup(&self, config: &SetupConfig) -> Result<()>;

    async fn login(
        &self,
        provider: &dyn IdentityProvider,
        options: &ProviderOptions,
    ) -> Result<AuthResult>;

    async fn logout(&self, provider: &dyn IdentityProvider, result: &AuthResult) -> Result<()>;

    async fn refresh_session(
        &self,
        provider: &dyn IdentityProvider,
        result: &AuthResult,
    ) -> Result<AuthResult>;

    async fn is_access_token_available(&self, result: &AuthResult) -> Result<bool>;

    async fn is_access_token_expired(&self, result: &AuthResult) -> Result<bool>;

    async fn is_refresh_token_available(&self, result: &AuthResult) -> Result<bool>;
}
