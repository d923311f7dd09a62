//! Explicit table of provider adapters, built once at startup.

use super::github::GitHubProvider;
use super::{ProviderConfig, ProviderError, RemoteProvider};
use crate::user_config::ProviderCredentials;
use crate::workspace::Workspace;
use std::collections::BTreeMap;
use std::fmt;

/// Everything an adapter factory gets to build a provider for one workspace.
#[derive(Debug, Clone)]
pub struct ProviderSetup {
    pub workspace: Workspace,
    pub config: ProviderConfig,
    pub credentials: ProviderCredentials,
}

/// Builds a provider from its setup.
pub type ProviderFactory =
    Box<dyn Fn(&ProviderSetup) -> Result<Box<dyn RemoteProvider>, ProviderError> + Send + Sync>;

/// Maps configured provider names to adapter factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every adapter shipped in this crate.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(GitHubProvider::NAME, |setup| {
            Ok(Box::new(GitHubProvider::from_setup(setup)?) as Box<dyn RemoteProvider>)
        });
        registry
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&ProviderSetup) -> Result<Box<dyn RemoteProvider>, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the adapter named by `setup.config.name`; `None` if none is registered.
    #[must_use]
    pub fn build(
        &self,
        setup: &ProviderSetup,
    ) -> Option<Result<Box<dyn RemoteProvider>, ProviderError>> {
        self.factories
            .get(&setup.config.name)
            .map(|factory| factory(setup))
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::REPO_KEY;

    fn setup(name: &str) -> ProviderSetup {
        ProviderSetup {
            workspace: Workspace::at("/tmp/notes"),
            config: ProviderConfig::new(name).with_setting(REPO_KEY, "acme/notes"),
            credentials: ProviderCredentials::default(),
        }
    }

    #[test]
    fn test_builtin_registers_github() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.contains("github"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["github"]);
    }

    #[test]
    fn test_build_unknown_provider_is_none() {
        let registry = ProviderRegistry::builtin();
        assert!(registry.build(&setup("jira")).is_none());
    }

    #[test]
    fn test_build_github_from_repo_setting() {
        let registry = ProviderRegistry::builtin();
        let provider = registry.build(&setup("github")).unwrap().unwrap();
        assert_eq!(provider.provider_name(), "github");
    }

    #[test]
    fn test_factory_error_is_returned() {
        let mut registry = ProviderRegistry::new();
        registry.register("broken", |_| {
            Err(ProviderError::InvalidConfig("missing token".to_string()))
        });

        let result = registry.build(&setup("broken")).unwrap();

        assert!(matches!(result, Err(ProviderError::InvalidConfig(_))));
    }
}
