/// Registry mapping provider tags to instance factories
use crate::catalog::ProviderKind;
use crate::error::{Error, Result};
use crate::provider::{
    Auth0Provider, AzureProvider, CognitoProvider, IdentityProvider, OktaProvider,
    OneLoginProvider,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a fresh provider instance
pub type ProviderFactory = Box<dyn Fn() -> Arc<dyn IdentityProvider> + Send + Sync>;

pub struct ProviderRegistry {
    factories: HashMap<ProviderKind, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create a registry with the built-in providers
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(ProviderKind::Auth0, || Arc::new(Auth0Provider::new()));
        registry.register(ProviderKind::Azure, || Arc::new(AzureProvider::new()));
        registry.register(ProviderKind::Cognito, || Arc::new(CognitoProvider::new()));
        registry.register(ProviderKind::Okta, || Arc::new(OktaProvider::new()));
        registry.register(ProviderKind::OneLogin, || Arc::new(OneLoginProvider::new()));

        registry
    }

    /// Create a registry with no providers
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) the factory for a provider tag
    pub fn register<F>(&mut self, kind: ProviderKind, factory: F)
    where
        F: Fn() -> Arc<dyn IdentityProvider> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
    }

    /// Build a new instance for the tag
    pub fn create(&self, kind: ProviderKind) -> Result<Arc<dyn IdentityProvider>> {
        self.factories
            .get(&kind)
            .map(|factory| factory())
            .ok_or(Error::UnknownProvider(kind))
    }

    pub fn has_provider(&self, kind: ProviderKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.factories.contains_key(kind))
            .collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
