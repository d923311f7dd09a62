//! GitHub adapter built on octocrab.
//!
//! Issues come from the issues API with pull requests filtered out; pull
//! requests come from the pulls API so merged ones can be told apart from
//! closed ones. Conversation comments of both kinds use the issue-comments
//! API.

mod auth;
mod convert;

pub use auth::{resolve_credentials, run_token_command, AuthCredentials, TOKEN_ENV};

use super::{
    Comment, FetchedItems, ItemKind, ItemState, ProviderConfig, ProviderError, ProviderSetup,
    RemoteItem, RemoteProvider, BASE_URL_KEY, REPO_KEY,
};
use async_trait::async_trait;
use convert::{api_error, comment_from, issue_to_item, item_number, pull_to_item};
use octocrab::models::IssueState;
use octocrab::{params, Octocrab};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

const PAGE_SIZE: u8 = 100;

pub struct GitHubProvider {
    owner: String,
    repo: String,
    base_url: Option<String>,
    credentials: AuthCredentials,
    client: OnceCell<Octocrab>,
}

impl GitHubProvider {
    /// Registry name of this adapter.
    pub const NAME: &'static str = "github";

    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        credentials: AuthCredentials,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            base_url: None,
            credentials,
            client: OnceCell::new(),
        }
    }

    /// Point the client at a GitHub Enterprise API.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build from workspace settings: the `repo` setting, or the `origin`
    /// remote of the workspace when the setting is absent.
    pub fn from_setup(setup: &ProviderSetup) -> Result<Self, ProviderError> {
        let (owner, repo) = match setup.config.setting(REPO_KEY) {
            Some(source) => Self::parse_source_id(source)?,
            None => {
                let remote = setup.workspace.origin_repo().map_err(|e| {
                    ProviderError::InvalidConfig(format!(
                        "no '{REPO_KEY}' setting and no usable origin remote: {e}"
                    ))
                })?;
                (remote.owner, remote.repo)
            }
        };
        let provider = Self::new(owner, repo, resolve_credentials(&setup.credentials));
        Ok(match setup.config.setting(BASE_URL_KEY) {
            Some(base_url) => provider.with_base_url(base_url),
            None => provider,
        })
    }

    /// Parse "owner/repo" format
    fn parse_source_id(source_id: &str) -> Result<(String, String), ProviderError> {
        match source_id.split('/').collect::<Vec<_>>().as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
                Ok(((*owner).to_string(), (*repo).to_string()))
            }
            _ => Err(ProviderError::InvalidConfig(format!(
                "Invalid GitHub repo: expected 'owner/repo', got '{source_id}'"
            ))),
        }
    }

    async fn client(&self) -> Result<&Octocrab, ProviderError> {
        self.client.get_or_try_init(|| self.build_client()).await
    }

    async fn build_client(&self) -> Result<Octocrab, ProviderError> {
        let token = match &self.credentials {
            AuthCredentials::PersonalAccessToken { token } => Some(token.clone()),
            AuthCredentials::CliTool { command } => Some(run_token_command(command).await?),
            AuthCredentials::None => None,
        };

        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        if let Some(base_url) = &self.base_url {
            builder = builder
                .base_uri(base_url.as_str())
                .map_err(|e| ProviderError::InvalidConfig(e.to_string()))?;
        }
        builder
            .build()
            .map_err(|e| ProviderError::AuthenticationFailed(e.to_string()))
    }

    async fn fetch_comments(
        &self,
        client: &Octocrab,
        number: u64,
    ) -> Result<Vec<Comment>, ProviderError> {
        let page = client
            .issues(&self.owner, &self.repo)
            .list_comments(number)
            .per_page(PAGE_SIZE)
            .send()
            .await
            .map_err(api_error)?;
        let mut comments: Vec<Comment> = client
            .all_pages(page)
            .await
            .map_err(api_error)?
            .into_iter()
            .map(comment_from)
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    /// Comments for a listed item; a failure is recorded against that item only.
    async fn comments_or_record(
        &self,
        client: &Octocrab,
        number: u64,
        fetched: &mut FetchedItems,
    ) -> Option<Vec<Comment>> {
        match self.fetch_comments(client, number).await {
            Ok(comments) => Some(comments),
            Err(e) => {
                warn!(
                    "Could not load comments of {}/{}#{number}: {e}",
                    self.owner, self.repo
                );
                fetched.failed.insert(number.to_string(), e.to_string());
                None
            }
        }
    }

    async fn fetch_issues(
        &self,
        client: &Octocrab,
        fetched: &mut FetchedItems,
    ) -> Result<(), ProviderError> {
        let page = client
            .issues(&self.owner, &self.repo)
            .list()
            .state(params::State::All)
            .per_page(PAGE_SIZE)
            .send()
            .await
            .map_err(api_error)?;
        let issues = client.all_pages(page).await.map_err(api_error)?;

        for issue in issues.into_iter().filter(|i| i.pull_request.is_none()) {
            let comments = if issue.comments > 0 {
                self.comments_or_record(client, issue.number, fetched).await
            } else {
                Some(Vec::new())
            };
            if let Some(comments) = comments {
                fetched.items.push(issue_to_item(issue, comments));
            }
        }
        Ok(())
    }

    async fn fetch_pulls(
        &self,
        client: &Octocrab,
        fetched: &mut FetchedItems,
    ) -> Result<(), ProviderError> {
        let page = client
            .pulls(&self.owner, &self.repo)
            .list()
            .state(params::State::All)
            .per_page(PAGE_SIZE)
            .send()
            .await
            .map_err(api_error)?;
        let pulls = client.all_pages(page).await.map_err(api_error)?;

        for pull in pulls {
            if let Some(comments) = self.comments_or_record(client, pull.number, fetched).await {
                fetched.items.push(pull_to_item(pull, comments));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteProvider for GitHubProvider {
    fn provider_name(&self) -> &str {
        Self::NAME
    }

    async fn fetch(&self, config: &ProviderConfig) -> Result<FetchedItems, ProviderError> {
        let client = self.client().await?;
        let mut fetched = FetchedItems::default();
        if config.syncs(ItemKind::Issue) {
            self.fetch_issues(client, &mut fetched).await?;
        }
        if config.syncs(ItemKind::PullRequest) {
            self.fetch_pulls(client, &mut fetched).await?;
        }
        debug!(
            "Fetched {} items from {}/{} ({} incomplete)",
            fetched.items.len(),
            self.owner,
            self.repo,
            fetched.failed.len()
        );
        Ok(fetched)
    }

    async fn create_item(&self, item: &RemoteItem) -> Result<RemoteItem, ProviderError> {
        if item.kind == ItemKind::PullRequest {
            return Err(ProviderError::Unsupported(
                "pull requests are opened from a branch, not from a note".to_string(),
            ));
        }
        let client = self.client().await?;
        let handler = client.issues(&self.owner, &self.repo);
        let mut builder = handler.create(item.title.clone()).body(item.body.clone());
        if !item.labels.is_empty() {
            builder = builder.labels(item.labels.iter().cloned().collect::<Vec<_>>());
        }
        if !item.assignees.is_empty() {
            builder = builder.assignees(item.assignees.iter().cloned().collect::<Vec<_>>());
        }
        let created = builder.send().await.map_err(api_error)?;
        self.get_item(ItemKind::Issue, &created.number.to_string())
            .await
    }

    async fn update_item(&self, item: &RemoteItem) -> Result<RemoteItem, ProviderError> {
        let client = self.client().await?;
        let number = item_number(&item.id)?;
        match item.kind {
            ItemKind::Issue => {
                let state = match item.state {
                    ItemState::Open => IssueState::Open,
                    ItemState::Closed | ItemState::Merged => IssueState::Closed,
                };
                client
                    .issues(&self.owner, &self.repo)
                    .update(number)
                    .title(item.title.as_str())
                    .body(item.body.as_str())
                    .state(state)
                    .send()
                    .await
                    .map_err(api_error)?;
            }
            ItemKind::PullRequest => {
                let handler = client.pulls(&self.owner, &self.repo);
                let mut builder = handler
                    .update(number)
                    .title(item.title.clone())
                    .body(item.body.clone());
                match item.state {
                    ItemState::Open => builder = builder.state(params::pulls::State::Open),
                    ItemState::Closed => builder = builder.state(params::pulls::State::Closed),
                    // Merging is not an edit; leave the state alone
                    ItemState::Merged => {}
                }
                builder.send().await.map_err(api_error)?;
            }
        }
        self.get_item(item.kind, &item.id).await
    }

    async fn add_comment(
        &self,
        _kind: ItemKind,
        id: &str,
        body: &str,
    ) -> Result<(), ProviderError> {
        let client = self.client().await?;
        client
            .issues(&self.owner, &self.repo)
            .create_comment(item_number(id)?, body)
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn get_item(&self, kind: ItemKind, id: &str) -> Result<RemoteItem, ProviderError> {
        let client = self.client().await?;
        let number = item_number(id)?;
        match kind {
            ItemKind::Issue => {
                let issue = client
                    .issues(&self.owner, &self.repo)
                    .get(number)
                    .await
                    .map_err(api_error)?;
                let comments = self.fetch_comments(client, number).await?;
                Ok(issue_to_item(issue, comments))
            }
            ItemKind::PullRequest => {
                let pull = client
                    .pulls(&self.owner, &self.repo)
                    .get(number)
                    .await
                    .map_err(api_error)?;
                let comments = self.fetch_comments(client, number).await?;
                Ok(pull_to_item(pull, comments))
            }
        }
    }
}
