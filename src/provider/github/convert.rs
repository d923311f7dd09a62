//! Conversions from octocrab models to provider types.

use super::super::{Comment, ItemKind, ItemState, ProviderError, RemoteItem};
use octocrab::models::{self, IssueState};

pub(super) fn issue_state(state: &IssueState) -> ItemState {
    match state {
        IssueState::Closed => ItemState::Closed,
        _ => ItemState::Open,
    }
}

pub(super) fn comment_from(comment: models::issues::Comment) -> Comment {
    Comment {
        id: comment.id.0.to_string(),
        body: comment.body.unwrap_or_default(),
        author: comment.user.login,
        created_at: comment.created_at,
    }
}

pub(super) fn issue_to_item(issue: models::issues::Issue, comments: Vec<Comment>) -> RemoteItem {
    RemoteItem {
        id: issue.number.to_string(),
        kind: ItemKind::Issue,
        title: issue.title,
        body: issue.body.unwrap_or_default(),
        state: issue_state(&issue.state),
        url: issue.html_url.to_string(),
        labels: issue.labels.into_iter().map(|l| l.name).collect(),
        assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
        milestone: issue.milestone.map(|m| m.title),
        updated_at: issue.updated_at,
        comments,
    }
}

pub(super) fn pull_to_item(pull: models::pulls::PullRequest, comments: Vec<Comment>) -> RemoteItem {
    let state = if pull.merged_at.is_some() {
        ItemState::Merged
    } else {
        pull.state.as_ref().map_or(ItemState::Open, issue_state)
    };
    RemoteItem {
        id: pull.number.to_string(),
        kind: ItemKind::PullRequest,
        title: pull.title.unwrap_or_default(),
        body: pull.body.unwrap_or_default(),
        state,
        url: pull.html_url.map(|u| u.to_string()).unwrap_or_default(),
        labels: pull
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|l| l.name)
            .collect(),
        assignees: pull
            .assignees
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.login)
            .collect(),
        milestone: pull.milestone.map(|m| m.title),
        updated_at: pull.updated_at.or(pull.created_at).unwrap_or_default(),
        comments,
    }
}

/// Parse an item id into the number the API addresses it by.
pub(super) fn item_number(id: &str) -> Result<u64, ProviderError> {
    id.trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| ProviderError::InvalidConfig(format!("Invalid GitHub item number: {id}")))
}

/// Map an API error onto the provider error taxonomy.
pub(super) fn api_error(error: octocrab::Error) -> ProviderError {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            let message = source.message.clone();
            match source.status_code.as_u16() {
                401 => ProviderError::AuthenticationFailed(message),
                403 if message.to_lowercase().contains("rate limit") => {
                    ProviderError::RateLimitExceeded(message)
                }
                403 => ProviderError::PermissionDenied(message),
                404 => ProviderError::NotFound(message),
                429 => ProviderError::RateLimitExceeded(message),
                _ => ProviderError::Api(message),
            }
        }
        other => ProviderError::NetworkError(other.to_string()),
    }
}
