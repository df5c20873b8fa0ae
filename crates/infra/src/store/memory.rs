//! In-memory blog store for tests/dev.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use yatube_blog::model::{NewComment, NewGroup, NewPost};
use yatube_blog::store::{matches_search, released_username};
use yatube_blog::{BlogStore, Comment, Follow, Group, Listing, Post, StoreError, StoreResult, User, Window};
use yatube_core::{CommentId, Entity, FollowId, GroupId, PostId, UserId};

/// Rows of one entity type keyed by id, with a sequence for new ids.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    last_id: i64,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E> Table<E>
where
    E: Entity + Clone,
    E::Id: From<i64>,
{
    fn insert_with(&mut self, build: impl FnOnce(E::Id) -> E) -> E {
        self.last_id += 1;
        let row = build(E::Id::from(self.last_id));
        self.rows.insert(row.id(), row.clone());
        row
    }

    fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id)
    }

    /// Foreign-key check: the row must exist.
    fn require(&self, id: E::Id) -> StoreResult<&E> {
        self.get(id)
            .ok_or_else(|| StoreError::MissingReference(format!("{} {id}", E::RESOURCE)))
    }

    fn replace(&mut self, row: &E) -> bool {
        match self.rows.get_mut(&row.id()) {
            Some(existing) => {
                *existing = row.clone();
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: E::Id) -> bool {
        self.rows.remove(&id).is_some()
    }

    /// Rows in id order.
    fn scan(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    posts: Table<Post>,
    comments: Table<Comment>,
    groups: Table<Group>,
    follows: Table<Follow>,
}

impl State {
    fn user(&self, id: UserId) -> StoreResult<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::MissingReference(format!("user {id}")))
    }

    /// Refresh denormalized usernames from the users table.
    fn hydrate_post(&self, mut post: Post) -> Post {
        if let Some(u) = self.users.get(&post.author.id) {
            post.author = u.clone();
        }
        post
    }

    fn hydrate_comment(&self, mut comment: Comment) -> Comment {
        if let Some(u) = self.users.get(&comment.author.id) {
            comment.author = u.clone();
        }
        comment
    }

    fn hydrate_follow(&self, mut follow: Follow) -> Follow {
        if let Some(u) = self.users.get(&follow.user.id) {
            follow.user = u.clone();
        }
        if let Some(u) = self.users.get(&follow.following.id) {
            follow.following = u.clone();
        }
        follow
    }
}

/// Keeps the same relational guarantees as the Postgres schema: unique
/// usernames and group slugs, follow uniqueness, no self-follow, and comment
/// cascade on post deletion. Each write runs under one lock acquisition.
#[derive(Debug, Default)]
pub struct InMemoryBlogStore {
    inner: RwLock<State>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BlogStore for InMemoryBlogStore {
    async fn upsert_user(&self, user: &User) -> StoreResult<()> {
        let mut state = self.write()?;
        for stale in state
            .users
            .values_mut()
            .filter(|u| u.username == user.username && u.id != user.id)
        {
            tracing::info!(user_id = %stale.id, username = %user.username, "username reassigned");
            stale.username = released_username(stale.id);
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_posts(&self, window: Option<Window>) -> StoreResult<Listing<Post>> {
        let state = self.read()?;
        let all = state.posts.scan().cloned().map(|p| state.hydrate_post(p)).collect();
        Ok(Listing::from_all(all, window))
    }

    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        let state = self.read()?;
        Ok(state.posts.get(id).cloned().map(|p| state.hydrate_post(p)))
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let mut state = self.write()?;
        let author = state.user(post.author)?;
        if let Some(group) = post.group {
            state.groups.require(group)?;
        }
        Ok(state.posts.insert_with(|id| Post {
            id,
            text: post.text,
            author,
            group: post.group,
            pub_date: post.pub_date,
        }))
    }

    async fn update_post(&self, post: &Post) -> StoreResult<()> {
        let mut state = self.write()?;
        if let Some(group) = post.group {
            state.groups.require(group)?;
        }
        if !state.posts.replace(post) {
            return Err(StoreError::MissingReference(format!("{} {}", Post::RESOURCE, post.id)));
        }
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if !state.posts.remove(id) {
            return Ok(false);
        }
        state.comments.rows.retain(|_, c| c.post != id);
        Ok(true)
    }

    async fn list_comments(&self, post: PostId, window: Option<Window>) -> StoreResult<Listing<Comment>> {
        let state = self.read()?;
        let all = state
            .comments
            .scan()
            .filter(|c| c.post == post)
            .cloned()
            .map(|c| state.hydrate_comment(c))
            .collect();
        Ok(Listing::from_all(all, window))
    }

    async fn get_comment(&self, post: PostId, id: CommentId) -> StoreResult<Option<Comment>> {
        let state = self.read()?;
        Ok(state
            .comments
            .get(id)
            .filter(|c| c.post == post)
            .cloned()
            .map(|c| state.hydrate_comment(c)))
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut state = self.write()?;
        let author = state.user(comment.author)?;
        state.posts.require(comment.post)?;
        Ok(state.comments.insert_with(|id| Comment {
            id,
            text: comment.text,
            author,
            post: comment.post,
            created: comment.created,
        }))
    }

    async fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.comments.replace(comment) {
            return Err(StoreError::MissingReference(format!("{} {}", Comment::RESOURCE, comment.id)));
        }
        Ok(())
    }

    async fn delete_comment(&self, id: CommentId) -> StoreResult<bool> {
        Ok(self.write()?.comments.remove(id))
    }

    async fn list_groups(&self, window: Option<Window>) -> StoreResult<Listing<Group>> {
        let state = self.read()?;
        Ok(Listing::from_all(state.groups.scan().cloned().collect(), window))
    }

    async fn get_group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        Ok(self.read()?.groups.get(id).cloned())
    }

    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group> {
        let mut state = self.write()?;
        if state.groups.scan().any(|g| g.slug == group.slug) {
            return Err(StoreError::Conflict(format!("group slug {} is taken", group.slug)));
        }
        Ok(state.groups.insert_with(|id| Group {
            id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }))
    }

    async fn list_follows(
        &self,
        user: UserId,
        search: &[String],
        window: Option<Window>,
    ) -> StoreResult<Listing<Follow>> {
        let state = self.read()?;
        let all = state
            .follows
            .scan()
            .filter(|f| f.user.id == user)
            .cloned()
            .map(|f| state.hydrate_follow(f))
            .filter(|f| matches_search(&f.following.username, search))
            .collect();
        Ok(Listing::from_all(all, window))
    }

    async fn follow_exists(&self, user: UserId, following: UserId) -> StoreResult<bool> {
        let state = self.read()?;
        Ok(state
            .follows
            .scan()
            .any(|f| f.user.id == user && f.following.id == following))
    }

    async fn insert_follow(&self, user: UserId, following: UserId) -> StoreResult<Follow> {
        let mut state = self.write()?;
        if user == following {
            return Err(StoreError::Constraint("follows_no_self_follow".to_string()));
        }
        if state
            .follows
            .scan()
            .any(|f| f.user.id == user && f.following.id == following)
        {
            return Err(StoreError::Conflict("follows_user_following_key".to_string()));
        }
        let follower = state.user(user)?;
        let followed = state.user(following)?;
        Ok(state.follows.insert_with(|id| Follow {
            id,
            user: follower,
            following: followed,
        }))
    }

    async fn get_follow(&self, user: UserId, id: FollowId) -> StoreResult<Option<Follow>> {
        let state = self.read()?;
        Ok(state
            .follows
            .get(id)
            .filter(|f| f.user.id == user)
            .cloned()
            .map(|f| state.hydrate_follow(f)))
    }

    async fn delete_follow(&self, id: FollowId) -> StoreResult<bool> {
        Ok(self.write()?.follows.remove(id))
    }
}
