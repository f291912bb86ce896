/// Ready-made provider configurations and platform redirect overrides
use crate::catalog::{Flow, FlowKind, Provider, ProviderKind, ProviderOptions};
use crate::platform::Platform;

/// URL scheme the built-in presets are registered with
pub const DEFAULT_URL_SCHEME: &str = "msauth";

/// Path every redirect and logout URI resolves to
const AUTH_ACTION_PATH: &str = "auth-action-complete";

/// Redirect and logout URIs applied on top of a preset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectOverrides {
    pub redirect_uri: String,
    pub logout_url: String,
}

impl ProviderOptions {
    /// Copy of these options with the redirect and logout URIs replaced
    pub fn with_overrides(&self, overrides: &RedirectOverrides) -> ProviderOptions {
        ProviderOptions {
            redirect_uri: overrides.redirect_uri.clone(),
            logout_url: overrides.logout_url.clone(),
            ..self.clone()
        }
    }
}

/// Redirects used when running in a browser (dev server on port 8100)
pub fn web_overrides() -> RedirectOverrides {
    let uri = format!("http://localhost:8100/{}", AUTH_ACTION_PATH);
    RedirectOverrides {
        redirect_uri: uri.clone(),
        logout_url: uri,
    }
}

/// Redirects used by a native shell registered for `scheme`
pub fn mobile_overrides(scheme: &str) -> RedirectOverrides {
    let uri = format!("{}://{}", scheme, AUTH_ACTION_PATH);
    RedirectOverrides {
        redirect_uri: uri.clone(),
        logout_url: uri,
    }
}

pub fn auth0_options() -> ProviderOptions {
    ProviderOptions {
        // Auth0 returns an empty JWT payload without an audience
        audience: "https://io.ionic.demo.ac".to_string(),
        client_id: "yLasZNUGkZ19DGEjTmAITBfGXzqbvd00".to_string(),
        discovery_url: "https://dev-2uspt-sz.us.auth0.com/.well-known/openid-configuration"
            .to_string(),
        redirect_uri: "msauth://auth-action-complete".to_string(),
        logout_url: "msauth://auth-action-complete".to_string(),
        scope: "openid email picture profile offline_access".to_string(),
    }
}

pub fn aws_options() -> ProviderOptions {
    ProviderOptions {
        client_id: "64p9c53l5thd5dikra675suvq9".to_string(),
        discovery_url: "https://cognito-idp.us-east-2.amazonaws.com/us-east-2_YU8VQe29z/.well-known/openid-configuration".to_string(),
        redirect_uri: "msauth://auth-action-complete".to_string(),
        logout_url: "msauth://auth-action-complete".to_string(),
        scope: "openid email profile".to_string(),
        audience: String::new(),
    }
}

pub fn azure_options() -> ProviderOptions {
    ProviderOptions {
        client_id: "a6dbcaa1-c691-4cad-8bbe-ec9543475ec2".to_string(),
        scope: "openid offline_access email profile https://imenuapss.onmicrosoft.com/a6dbcaa1-c691-4cad-8bbe-ec9543475ec2/user_impersonation".to_string(),
        discovery_url: "https://imenuapss.b2clogin.com/imenuapss.onmicrosoft.com/B2C_1_SignUpSignIn/v2.0/.well-known/openid-configuration".to_string(),
        redirect_uri: "http://localhost:8100/".to_string(),
        logout_url: "https://imenuapss.b2clogin.com/imenuapss.onmicrosoft.com/B2C_1_SignUpSignIn/oauth2/v2.0/logout".to_string(),
        audience: String::new(),
    }
}

pub fn okta_options() -> ProviderOptions {
    ProviderOptions {
        client_id: "0oaur4c907I5uMr4I0h7".to_string(),
        discovery_url: "https://dev-622807.oktapreview.com/.well-known/openid-configuration"
            .to_string(),
        redirect_uri: "msauth://auth-action-complete".to_string(),
        logout_url: "msauth://auth-action-complete".to_string(),
        scope: "openid email profile offline_access".to_string(),
        audience: String::new(),
    }
}

/// Everything `set_config` needs to switch provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSelection {
    pub provider: Provider,
    pub options: ProviderOptions,
    pub flow: Option<Flow>,
}

/// Built-in provider templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Azure,
    Aws,
    Auth0,
    Okta,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Azure, Preset::Aws, Preset::Auth0, Preset::Okta];

    pub fn provider_kind(&self) -> ProviderKind {
        match self {
            Preset::Azure => ProviderKind::Azure,
            Preset::Aws => ProviderKind::Cognito,
            Preset::Auth0 => ProviderKind::Auth0,
            Preset::Okta => ProviderKind::Okta,
        }
    }

    pub fn options(&self) -> ProviderOptions {
        match self {
            Preset::Azure => azure_options(),
            Preset::Aws => aws_options(),
            Preset::Auth0 => auth0_options(),
            Preset::Okta => okta_options(),
        }
    }

    /// Flow the preset's client registration expects on the web
    pub fn web_flow(&self) -> FlowKind {
        match self {
            Preset::Azure | Preset::Auth0 => FlowKind::Implicit,
            Preset::Aws | Preset::Okta => FlowKind::Pkce,
        }
    }

    /// Configuration for this preset on `platform`
    ///
    /// Native platforms use the preset untouched and carry no flow.
    pub fn selection(&self, platform: Platform) -> ConfigSelection {
        let provider = Provider::new(self.provider_kind());
        match platform {
            Platform::Hybrid => ConfigSelection {
                provider,
                options: self.options(),
                flow: None,
            },
            Platform::Web => ConfigSelection {
                provider,
                options: self.options().with_overrides(&web_overrides()),
                flow: Some(Flow::new(self.web_flow())),
            },
        }
    }

    /// Presets are registered against [`DEFAULT_URL_SCHEME`] only
    pub fn is_available(url_scheme: &str) -> bool {
        url_scheme == DEFAULT_URL_SCHEME
    }
}

/// Configuration used on a fresh install
pub fn default_selection(platform: Platform) -> ConfigSelection {
    Preset::Aws.selection(platform)
}

/// User-entered fields of a custom configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomFields {
    pub client_id: String,
    pub discovery_url: String,
    pub scope: String,
    pub audience: String,
}

/// Build a selection from user-entered fields
///
/// Redirects come from the platform; native platforms drop any flow.
pub fn custom_selection(
    provider: ProviderKind,
    fields: CustomFields,
    flow: Option<FlowKind>,
    platform: Platform,
    url_scheme: &str,
) -> ConfigSelection {
    let (overrides, flow) = match platform {
        Platform::Web => (web_overrides(), flow),
        Platform::Hybrid => (mobile_overrides(url_scheme), None),
    };

    ConfigSelection {
        provider: Provider::new(provider),
        options: ProviderOptions {
            client_id: fields.client_id,
            discovery_url: fields.discovery_url,
            redirect_uri: overrides.redirect_uri,
            logout_url: overrides.logout_url,
            scope: fields.scope,
            audience: fields.audience,
        },
        flow: flow.map(Flow::new),
    }
}
