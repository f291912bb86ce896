/// Supported providers, flows, and the values exchanged with them
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag selecting which identity provider implementation is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Auth0,
    Azure,
    Cognito,
    Okta,
    OneLogin,
}

impl ProviderKind {
    /// Every supported provider, in display order
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Auth0,
        ProviderKind::Azure,
        ProviderKind::Cognito,
        ProviderKind::Okta,
        ProviderKind::OneLogin,
    ];

    /// Stable key used in persisted values
    pub fn key(&self) -> &'static str {
        match self {
            ProviderKind::Auth0 => "auth0",
            ProviderKind::Azure => "azure",
            ProviderKind::Cognito => "cognito",
            ProviderKind::Okta => "okta",
            ProviderKind::OneLogin => "onelogin",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Auth0 => "Auth0",
            ProviderKind::Azure => "Azure B2C",
            ProviderKind::Cognito => "Cognito (AWS)",
            ProviderKind::Okta => "Okta",
            ProviderKind::OneLogin => "OneLogin",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Provider identity as persisted under `auth-provider`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub key: ProviderKind,
    #[serde(rename = "value")]
    pub label: String,
}

impl Provider {
    pub fn new(key: ProviderKind) -> Self {
        Self {
            key,
            label: key.label().to_string(),
        }
    }

    /// All supported providers
    pub fn all() -> Vec<Provider> {
        ProviderKind::ALL.into_iter().map(Provider::new).collect()
    }
}

/// Tag selecting the web authentication flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    #[serde(rename = "implicit")]
    Implicit,
    #[serde(rename = "PKCE")]
    Pkce,
}

impl FlowKind {
    pub const ALL: [FlowKind; 2] = [FlowKind::Implicit, FlowKind::Pkce];

    pub fn key(&self) -> &'static str {
        match self {
            FlowKind::Implicit => "implicit",
            FlowKind::Pkce => "PKCE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlowKind::Implicit => "Implicit",
            FlowKind::Pkce => "PKCE",
        }
    }
}

/// Flow selector as persisted under `auth-flow`
///
/// Only meaningful on the web; native platforms ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub key: FlowKind,
    #[serde(rename = "value")]
    pub label: String,
}

impl Flow {
    pub fn new(key: FlowKind) -> Self {
        Self {
            key,
            label: key.label().to_string(),
        }
    }

    pub fn all() -> Vec<Flow> {
        FlowKind::ALL.into_iter().map(Flow::new).collect()
    }
}

/// OIDC client registration for the selected provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOptions {
    pub client_id: String,
    pub discovery_url: String,
    pub redirect_uri: String,
    pub logout_url: String,
    pub scope: String,
    #[serde(default)]
    pub audience: String,
}

/// Tokens produced by login or refresh
///
/// A cached result means "currently authenticated" as far as the session
/// manager is concerned; token validity is left to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub id_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_serializes_with_key_and_value() {
        let provider = Provider::new(ProviderKind::Cognito);
        let json = serde_json::to_string(&provider).unwrap();
        assert_eq!(json, r#"{"key":"cognito","value":"Cognito (AWS)"}"#);

        let onelogin: Provider =
            serde_json::from_str(r#"{"key":"onelogin","value":"OneLogin"}"#).unwrap();
        assert_eq!(onelogin.key, ProviderKind::OneLogin);
    }

    #[test]
    fn test_flow_keys_match_persisted_format() {
        let json = serde_json::to_string(&Flow::new(FlowKind::Pkce)).unwrap();
        assert_eq!(json, r#"{"key":"PKCE","value":"PKCE"}"#);

        let flow: Flow = serde_json::from_str(r#"{"key":"implicit","value":"Implicit"}"#).unwrap();
        assert_eq!(flow.key, FlowKind::Implicit);
    }

    #[test]
    fn test_catalog_lists() {
        let providers = Provider::all();
        assert_eq!(providers.len(), 5);
        assert_eq!(providers[1].label, "Azure B2C");
        assert!(Flow::all().iter().any(|f| f.key == FlowKind::Pkce));
    }

    #[test]
    fn test_options_use_camel_case() {
        let options = ProviderOptions {
            client_id: "abc".to_string(),
            discovery_url: "https://id.example.com/.well-known/openid-configuration".to_string(),
            redirect_uri: "msauth://login".to_string(),
            logout_url: "msauth://login".to_string(),
            scope: "openid".to_string(),
            audience: String::new(),
        };
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["clientId"], "abc");
        assert_eq!(value["logoutUrl"], "msauth://login");
    }

    #[test]
    fn test_auth_result_round_trips_camel_case() {
        let result: AuthResult = serde_json::from_str(
            r#"{"accessToken":"a","refreshToken":"r","idToken":"i"}"#,
        )
        .unwrap();
        assert_eq!(result.access_token, "a");
        assert_eq!(result.id_token, "i");
    }
}
