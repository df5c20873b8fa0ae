//! JSON mapping of domain types.
//!
//! Related users are rendered by username; related posts and groups by id.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use yatube_blog::{Comment, Follow, Group, Post};

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn post_to_json(post: Post) -> Value {
    json!({
        "id": post.id,
        "text": post.text,
        "author": post.author.username,
        "group": post.group,
        "pub_date": timestamp(&post.pub_date),
    })
}

pub fn comment_to_json(comment: Comment) -> Value {
    json!({
        "id": comment.id,
        "text": comment.text,
        "author": comment.author.username,
        "post": comment.post,
        "created": timestamp(&comment.created),
    })
}

pub fn group_to_json(group: Group) -> Value {
    json!({
        "id": group.id,
        "title": group.title,
        "slug": group.slug,
        "description": group.description,
    })
}

pub fn follow_to_json(follow: Follow) -> Value {
    json!({
        "id": follow.id,
        "user": follow.user.username,
        "following": follow.following.username,
    })
}
