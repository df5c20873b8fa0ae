//! Follow edges of the calling user.
//!
//! The self-follow and duplicate checks here only produce friendlier errors;
//! the store enforces both invariants and its rejections map to the same
//! responses, so concurrent identical requests cannot create two edges.

use yatube_auth::{Caller, require_authenticated};
use yatube_core::{DomainError, Entity, FieldErrors, FollowId};

use crate::error::{BlogError, BlogResult};
use crate::model::{Follow, User};
use crate::pagination::{Listing, Window};
use crate::payload::FollowPayload;
use crate::store::{BlogStore, StoreError};

pub const SELF_FOLLOW: &str = "You cannot follow yourself.";
pub const ALREADY_FOLLOWING: &str = "You are already following this user.";

/// Split a raw `search` value into terms (whitespace and commas separate).
pub fn search_terms(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub async fn list(
    store: &dyn BlogStore,
    caller: &Caller,
    search: &[String],
    window: Option<Window>,
) -> BlogResult<Listing<Follow>> {
    let user = require_authenticated(caller)?;
    Ok(store.list_follows(user.id, search, window).await?)
}

pub async fn create(store: &dyn BlogStore, caller: &Caller, payload: FollowPayload) -> BlogResult<Follow> {
    let user = require_authenticated(caller)?;

    let mut errors = FieldErrors::new();
    let following = match payload.clean(&mut errors) {
        Some(username) => {
            let found = store.find_user_by_username(&username).await?;
            if found.is_none() {
                errors.add("following", format!("Object with username={username} does not exist."));
            }
            found
        }
        None => None,
    };
    errors.into_result()?;
    let following = following.ok_or(DomainError::not_found(User::RESOURCE))?;

    if following.id == user.id {
        return Err(DomainError::bad_request(SELF_FOLLOW).into());
    }
    if store.follow_exists(user.id, following.id).await? {
        return Err(DomainError::bad_request(ALREADY_FOLLOWING).into());
    }

    let follow = store
        .insert_follow(user.id, following.id)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => BlogError::from(DomainError::bad_request(ALREADY_FOLLOWING)),
            StoreError::Constraint(_) => BlogError::from(DomainError::bad_request(SELF_FOLLOW)),
            other => BlogError::from(other),
        })?;

    tracing::info!(follow_id = %follow.id, user = %user.id, following = %following.id, "follow created");
    Ok(follow)
}

/// An edge of the caller's; other users' edges are invisible (404).
pub async fn retrieve(store: &dyn BlogStore, caller: &Caller, id: FollowId) -> BlogResult<Follow> {
    let user = require_authenticated(caller)?;
    store
        .get_follow(user.id, id)
        .await?
        .ok_or_else(|| DomainError::not_found(Follow::RESOURCE).into())
}

/// Unfollow. Scoped like `retrieve`, so only the follower can remove an edge.
pub async fn destroy(store: &dyn BlogStore, caller: &Caller, id: FollowId) -> BlogResult<()> {
    let follow = retrieve(store, caller, id).await?;
    if !store.delete_follow(follow.id).await? {
        return Err(DomainError::not_found(Follow::RESOURCE).into());
    }
    tracing::info!(follow_id = %id, "follow deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_terms_split_on_whitespace_and_commas() {
        assert_eq!(search_terms(Some(" al, bo  c ")), vec!["al", "bo", "c"]);
        assert!(search_terms(Some("  ")).is_empty());
        assert!(search_terms(None).is_empty());
    }
}
