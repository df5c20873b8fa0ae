use chrono::Utc;

use yatube_auth::{Caller, ensure_author, require_authenticated};
use yatube_core::{CommentId, DomainError, Entity, FieldErrors, PostId};

use crate::error::BlogResult;
use crate::model::{Comment, NewComment, Post};
use crate::pagination::{Listing, Window};
use crate::payload::{CommentPayload, Mode};
use crate::store::BlogStore;

pub const DELETE_DENIED: &str = "You do not have permission to delete this comment.";

/// Comments of `post` only. An unknown post simply has no comments.
pub async fn list(store: &dyn BlogStore, post: PostId, window: Option<Window>) -> BlogResult<Listing<Comment>> {
    Ok(store.list_comments(post, window).await?)
}

pub async fn retrieve(store: &dyn BlogStore, post: PostId, id: CommentId) -> BlogResult<Comment> {
    fetch(store, post, id).await
}

pub async fn create(
    store: &dyn BlogStore,
    caller: &Caller,
    post: PostId,
    payload: CommentPayload,
) -> BlogResult<Comment> {
    let user = require_authenticated(caller)?;
    let post = store
        .get_post(post)
        .await?
        .ok_or(DomainError::not_found(Post::RESOURCE))?;

    let mut errors = FieldErrors::new();
    let text = payload.clean(Mode::Full, &mut errors);
    errors.into_result()?;

    let comment = store
        .insert_comment(NewComment {
            text: text.unwrap_or_default(),
            author: user.id,
            post: post.id,
            created: Utc::now(),
        })
        .await?;

    tracing::info!(comment_id = %comment.id, post_id = %post.id, author = %user.id, "comment created");
    Ok(comment)
}

/// Plain update: any authenticated caller may edit a comment of the post.
pub async fn update(
    store: &dyn BlogStore,
    caller: &Caller,
    post: PostId,
    id: CommentId,
    payload: CommentPayload,
    mode: Mode,
) -> BlogResult<Comment> {
    require_authenticated(caller)?;
    let mut comment = fetch(store, post, id).await?;

    let mut errors = FieldErrors::new();
    let text = payload.clean(mode, &mut errors);
    errors.into_result()?;

    if let Some(text) = text {
        comment.text = text;
    }
    store.update_comment(&comment).await?;

    tracing::info!(comment_id = %comment.id, "comment updated");
    Ok(comment)
}

pub async fn destroy(store: &dyn BlogStore, caller: &Caller, post: PostId, id: CommentId) -> BlogResult<()> {
    require_authenticated(caller)?;
    let comment = fetch(store, post, id).await?;
    ensure_author(caller, comment.author.id, DELETE_DENIED)?;

    if !store.delete_comment(id).await? {
        return Err(DomainError::not_found(Comment::RESOURCE).into());
    }
    tracing::info!(comment_id = %id, "comment deleted");
    Ok(())
}

async fn fetch(store: &dyn BlogStore, post: PostId, id: CommentId) -> BlogResult<Comment> {
    store
        .get_comment(post, id)
        .await?
        .ok_or_else(|| DomainError::not_found(Comment::RESOURCE).into())
}
