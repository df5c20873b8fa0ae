use chrono::Utc;

use yatube_auth::{Caller, ensure_author, require_authenticated};
use yatube_core::{DomainError, Entity, FieldErrors, PostId};

use crate::error::BlogResult;
use crate::model::{NewPost, Post};
use crate::pagination::{Listing, Window};
use crate::payload::{Mode, PostPayload};
use crate::store::BlogStore;

pub const EDIT_DENIED: &str = "You do not have permission to edit this post.";
pub const DELETE_DENIED: &str = "You do not have permission to perform this action.";

pub async fn list(store: &dyn BlogStore, window: Option<Window>) -> BlogResult<Listing<Post>> {
    Ok(store.list_posts(window).await?)
}

pub async fn retrieve(store: &dyn BlogStore, id: PostId) -> BlogResult<Post> {
    fetch(store, id).await
}

pub async fn create(store: &dyn BlogStore, caller: &Caller, payload: PostPayload) -> BlogResult<Post> {
    let user = require_authenticated(caller)?;

    let mut errors = FieldErrors::new();
    let changes = payload.clean(Mode::Full, &mut errors);
    super::check_group(store, changes.group, &mut errors).await?;
    errors.into_result()?;

    let post = store
        .insert_post(NewPost {
            text: changes.text.unwrap_or_default(),
            author: user.id,
            group: changes.group.flatten(),
            pub_date: Utc::now(),
        })
        .await?;

    tracing::info!(post_id = %post.id, author = %user.id, "post created");
    Ok(post)
}

/// PUT (`Mode::Full`) or PATCH (`Mode::Partial`).
pub async fn update(
    store: &dyn BlogStore,
    caller: &Caller,
    id: PostId,
    payload: PostPayload,
    mode: Mode,
) -> BlogResult<Post> {
    require_authenticated(caller)?;
    let mut post = fetch(store, id).await?;
    ensure_author(caller, post.author.id, EDIT_DENIED)?;

    let mut errors = FieldErrors::new();
    let changes = payload.clean(mode, &mut errors);
    super::check_group(store, changes.group, &mut errors).await?;
    errors.into_result()?;

    if let Some(text) = changes.text {
        post.text = text;
    }
    if let Some(group) = changes.group {
        post.group = group;
    }
    store.update_post(&post).await?;

    tracing::info!(post_id = %post.id, "post updated");
    Ok(post)
}

pub async fn destroy(store: &dyn BlogStore, caller: &Caller, id: PostId) -> BlogResult<()> {
    // Anonymous callers are rejected before the post is even looked up.
    require_authenticated(caller)?;
    let post = fetch(store, id).await?;
    ensure_author(caller, post.author.id, DELETE_DENIED)?;

    if !store.delete_post(id).await? {
        return Err(DomainError::not_found(Post::RESOURCE).into());
    }
    tracing::info!(post_id = %id, "post deleted");
    Ok(())
}

async fn fetch(store: &dyn BlogStore, id: PostId) -> BlogResult<Post> {
    store
        .get_post(id)
        .await?
        .ok_or_else(|| DomainError::not_found(Post::RESOURCE).into())
}
