//! Runs the reconciler for every provider configured in a workspace.

use super::reconciler::{Reconciler, SyncError};
use super::report::Report;
use crate::note::{LocalNote, NoteStore};
use crate::provider::{ProviderConfig, ProviderError, ProviderRegistry, ProviderSetup, RemoteProvider};
use crate::user_config::UserConfig;
use crate::workspace::Workspace;
use std::path::Path;
use tracing::{info, warn};

/// Everything a sync run needs, passed in explicitly.
pub struct SyncOrchestrator<'a> {
    registry: &'a ProviderRegistry,
    store: &'a dyn NoteStore,
    workspace: &'a Workspace,
    user_config: &'a UserConfig,
}

impl<'a> SyncOrchestrator<'a> {
    #[must_use]
    pub fn new(
        registry: &'a ProviderRegistry,
        store: &'a dyn NoteStore,
        workspace: &'a Workspace,
        user_config: &'a UserConfig,
    ) -> Self {
        Self {
            registry,
            store,
            workspace,
            user_config,
        }
    }

    fn build(
        &self,
        config: &ProviderConfig,
    ) -> Option<Result<Box<dyn RemoteProvider>, ProviderError>> {
        let setup = ProviderSetup {
            workspace: self.workspace.clone(),
            config: config.clone(),
            credentials: self.user_config.credentials_for(&config.name),
        };
        self.registry.build(&setup)
    }

    /// Sync every provider in order. Providers without a registered adapter
    /// are skipped; a provider that cannot run at all yields a failed report
    /// and the remaining providers still run.
    pub async fn sync_all(&self, providers: &[ProviderConfig]) -> Vec<Report> {
        let mut reports = Vec::new();
        for config in providers {
            if let Some(report) = self.sync_provider(config).await {
                reports.push(report);
            }
        }
        reports
    }

    /// Sync one provider; `None` when no adapter is registered for it.
    pub async fn sync_provider(&self, config: &ProviderConfig) -> Option<Report> {
        let Some(built) = self.build(config) else {
            warn!(
                "No adapter registered for provider '{}'; skipping",
                config.name
            );
            return None;
        };
        let provider = match built {
            Ok(provider) => provider,
            Err(e) => {
                warn!("Could not set up provider '{}': {e}", config.name);
                return Some(Report::fatal(&config.name, e));
            }
        };
        info!("Syncing provider '{}'", config.name);
        let reconciler = Reconciler::new(provider.as_ref(), self.store, config);
        let report = match reconciler.run().await {
            Ok(report) => report,
            Err(e) => {
                warn!("Sync pass for '{}' failed: {e}", config.name);
                Report::fatal(&config.name, e)
            }
        };
        Some(report)
    }

    /// Publish an unlinked note through the provider named by `config`.
    pub async fn publish(
        &self,
        config: &ProviderConfig,
        path: &Path,
    ) -> Result<LocalNote, SyncError> {
        let provider = self
            .build(config)
            .ok_or_else(|| {
                ProviderError::InvalidConfig(format!(
                    "No adapter registered for provider '{}'",
                    config.name
                ))
            })??;
        Reconciler::new(provider.as_ref(), self.store, config)
            .publish(path)
            .await
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
