//! Postgres-backed blog store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate follow edge, taken username/slug |
//! | Database (check constraint violation) | `23514` | `Constraint` | Self-follow |
//! | Database (foreign key violation) | `23503` | `MissingReference` | Unknown author/post/group |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed / other | N/A | `Backend` | Connection failures, etc. |
//!
//! ## Thread Safety
//!
//! `PostgresBlogStore` is `Send + Sync`; `PgPool` handles connection sharing.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use yatube_blog::model::{NewComment, NewGroup, NewPost};
use yatube_blog::{BlogStore, Comment, Follow, Group, Listing, Post, StoreError, StoreResult, User, Window};
use yatube_core::{CommentId, FollowId, GroupId, PostId, UserId};

/// Schema applied by [`PostgresBlogStore::migrate`].
pub const SCHEMA: &str = include_str!("../../migrations/0001_blog_schema.sql");

const POST_SELECT: &str = r#"
    SELECT p.id, p.text, p.group_id, p.pub_date, u.id AS author_id, u.username AS author_username
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.text, c.post_id, c.created, u.id AS author_id, u.username AS author_username
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

const FOLLOW_SELECT: &str = r#"
    SELECT f.id,
           uu.id AS user_id, uu.username AS user_username,
           fu.id AS following_id, fu.username AS following_username
    FROM follows f
    JOIN users uu ON uu.id = f.user_id
    JOIN users fu ON fu.id = f.following_id
"#;

#[derive(Debug, Clone)]
pub struct PostgresBlogStore {
    pool: PgPool,
}

impl PostgresBlogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and constraints if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn count(&self, operation: &str, sql: &str, bind: Option<i64>) -> StoreResult<u64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let total = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        Ok(total.max(0) as u64)
    }
}

/// `(LIMIT, OFFSET)` binds; a NULL limit means "no limit" in Postgres.
fn window_binds(window: Option<Window>) -> (Option<i64>, i64) {
    match window {
        Some(w) => (Some(w.limit as i64), w.offset as i64),
        None => (None, 0),
    }
}

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: PostId::new(row.try_get("id")?),
        text: row.try_get("text")?,
        author: User::new(UserId::new(row.try_get("author_id")?), row.try_get::<String, _>("author_username")?),
        group: row.try_get::<Option<i64>, _>("group_id")?.map(GroupId::new),
        pub_date: row.try_get("pub_date")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: CommentId::new(row.try_get("id")?),
        text: row.try_get("text")?,
        author: User::new(UserId::new(row.try_get("author_id")?), row.try_get::<String, _>("author_username")?),
        post: PostId::new(row.try_get("post_id")?),
        created: row.try_get("created")?,
    })
}

fn group_from_row(row: &PgRow) -> Result<Group, sqlx::Error> {
    Ok(Group {
        id: GroupId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
    })
}

fn follow_from_row(row: &PgRow) -> Result<Follow, sqlx::Error> {
    Ok(Follow {
        id: FollowId::new(row.try_get("id")?),
        user: User::new(UserId::new(row.try_get("user_id")?), row.try_get::<String, _>("user_username")?),
        following: User::new(
            UserId::new(row.try_get("following_id")?),
            row.try_get::<String, _>("following_username")?,
        ),
    })
}

fn decode_all<T>(
    operation: &str,
    rows: Vec<PgRow>,
    decode: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<Vec<T>> {
    rows.iter()
        .map(|row| decode(row).map_err(|e| map_sqlx_error(operation, e)))
        .collect()
}

fn push_follow_filter(qb: &mut QueryBuilder<'_, Postgres>, user: UserId, search: &[String]) {
    qb.push(" WHERE f.user_id = ").push_bind(user.get());
    for term in search {
        qb.push(" AND strpos(lower(fu.username), lower(")
            .push_bind(term.clone())
            .push(")) > 0");
    }
}

#[async_trait]
impl BlogStore for PostgresBlogStore {
    #[instrument(skip(self), err)]
    async fn upsert_user(&self, user: &User) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("upsert_user", e))?;

        // Free the name first so the unique constraint holds throughout.
        let released = sqlx::query(
            r#"
            UPDATE users
            SET username = '#' || id::text
            WHERE username = $2 AND id <> $1
            "#,
        )
        .bind(user.id.get())
        .bind(&user.username)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_user", e))?;
        if released.rows_affected() > 0 {
            tracing::info!(username = %user.username, "username reassigned");
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            ON CONFLICT (id)
            DO UPDATE SET username = EXCLUDED.username
            WHERE users.username IS DISTINCT FROM EXCLUDED.username
            "#,
        )
        .bind(user.id.get())
        .bind(&user.username)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_user", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("upsert_user", e))?;
        Ok(())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_username", e))?;

        row.map(|r| -> Result<User, sqlx::Error> {
            Ok(User::new(UserId::new(r.try_get("id")?), r.try_get::<String, _>("username")?))
        })
        .transpose()
        .map_err(|e| map_sqlx_error("find_user_by_username", e))
    }

    async fn list_posts(&self, window: Option<Window>) -> StoreResult<Listing<Post>> {
        let total = self.count("count_posts", "SELECT COUNT(*) FROM posts", None).await?;
        let (limit, offset) = window_binds(window);
        let rows = sqlx::query(&format!("{POST_SELECT} ORDER BY p.id ASC LIMIT $1 OFFSET $2"))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_posts", e))?;
        Ok(Listing {
            total,
            items: decode_all("list_posts", rows, post_from_row)?,
        })
    }

    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        let row = sqlx::query(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_post", e))?;
        row.as_ref()
            .map(post_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_post", e))
    }

    #[instrument(skip(self, post), fields(author = %post.author), err)]
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let row = sqlx::query(
            r#"
            WITH p AS (
                INSERT INTO posts (text, author_id, group_id, pub_date)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, author_id, group_id, pub_date
            )
            SELECT p.id, p.text, p.group_id, p.pub_date, u.id AS author_id, u.username AS author_username
            FROM p
            JOIN users u ON u.id = p.author_id
            "#,
        )
        .bind(&post.text)
        .bind(post.author.get())
        .bind(post.group.map(|g| g.get()))
        .bind(post.pub_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_post", e))?;
        post_from_row(&row).map_err(|e| map_sqlx_error("insert_post", e))
    }

    #[instrument(skip(self, post), fields(post_id = %post.id), err)]
    async fn update_post(&self, post: &Post) -> StoreResult<()> {
        let result = sqlx::query("UPDATE posts SET text = $2, group_id = $3 WHERE id = $1")
            .bind(post.id.get())
            .bind(&post.text)
            .bind(post.group.map(|g| g.get()))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_post", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::MissingReference(format!("post {}", post.id)));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_post(&self, id: PostId) -> StoreResult<bool> {
        // Comments go with the post via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, post: PostId, window: Option<Window>) -> StoreResult<Listing<Comment>> {
        let total = self
            .count("count_comments", "SELECT COUNT(*) FROM comments WHERE post_id = $1", Some(post.get()))
            .await?;
        let (limit, offset) = window_binds(window);
        let rows = sqlx::query(&format!(
            "{COMMENT_SELECT} WHERE c.post_id = $1 ORDER BY c.id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(post.get())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_comments", e))?;
        Ok(Listing {
            total,
            items: decode_all("list_comments", rows, comment_from_row)?,
        })
    }

    async fn get_comment(&self, post: PostId, id: CommentId) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(&format!("{COMMENT_SELECT} WHERE c.id = $1 AND c.post_id = $2"))
            .bind(id.get())
            .bind(post.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_comment", e))?;
        row.as_ref()
            .map(comment_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_comment", e))
    }

    #[instrument(skip(self, comment), fields(post_id = %comment.post, author = %comment.author), err)]
    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let row = sqlx::query(
            r#"
            WITH c AS (
                INSERT INTO comments (text, author_id, post_id, created)
                VALUES ($1, $2, $3, $4)
                RETURNING id, text, author_id, post_id, created
            )
            SELECT c.id, c.text, c.post_id, c.created, u.id AS author_id, u.username AS author_username
            FROM c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(&comment.text)
        .bind(comment.author.get())
        .bind(comment.post.get())
        .bind(comment.created)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_comment", e))?;
        comment_from_row(&row).map_err(|e| map_sqlx_error("insert_comment", e))
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id), err)]
    async fn update_comment(&self, comment: &Comment) -> StoreResult<()> {
        let result = sqlx::query("UPDATE comments SET text = $2 WHERE id = $1")
            .bind(comment.id.get())
            .bind(&comment.text)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_comment", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::MissingReference(format!("comment {}", comment.id)));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_comment(&self, id: CommentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_comment", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_groups(&self, window: Option<Window>) -> StoreResult<Listing<Group>> {
        let total = self.count("count_groups", "SELECT COUNT(*) FROM groups", None).await?;
        let (limit, offset) = window_binds(window);
        let rows = sqlx::query(
            "SELECT id, title, slug, description FROM groups ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_groups", e))?;
        Ok(Listing {
            total,
            items: decode_all("list_groups", rows, group_from_row)?,
        })
    }

    async fn get_group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        let row = sqlx::query("SELECT id, title, slug, description FROM groups WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_group", e))?;
        row.as_ref()
            .map(group_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_group", e))
    }

    #[instrument(skip(self, group), fields(slug = %group.slug), err)]
    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group> {
        let row = sqlx::query(
            r#"
            INSERT INTO groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_group", e))?;
        group_from_row(&row).map_err(|e| map_sqlx_error("insert_group", e))
    }

    async fn list_follows(
        &self,
        user: UserId,
        search: &[String],
        window: Option<Window>,
    ) -> StoreResult<Listing<Follow>> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM follows f JOIN users fu ON fu.id = f.following_id",
        );
        push_follow_filter(&mut count, user, search);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_follows", e))?;

        let (limit, offset) = window_binds(window);
        let mut select = QueryBuilder::<Postgres>::new(FOLLOW_SELECT);
        push_follow_filter(&mut select, user, search);
        select
            .push(" ORDER BY f.id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_follows", e))?;

        Ok(Listing {
            total: total.max(0) as u64,
            items: decode_all("list_follows", rows, follow_from_row)?,
        })
    }

    async fn follow_exists(&self, user: UserId, following: UserId) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND following_id = $2)",
        )
        .bind(user.get())
        .bind(following.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("follow_exists", e))
    }

    #[instrument(skip(self), err)]
    async fn insert_follow(&self, user: UserId, following: UserId) -> StoreResult<Follow> {
        // Uniqueness and self-follow are rejected by the table constraints.
        let row = sqlx::query(
            r#"
            WITH f AS (
                INSERT INTO follows (user_id, following_id)
                VALUES ($1, $2)
                RETURNING id, user_id, following_id
            )
            SELECT f.id,
                   uu.id AS user_id, uu.username AS user_username,
                   fu.id AS following_id, fu.username AS following_username
            FROM f
            JOIN users uu ON uu.id = f.user_id
            JOIN users fu ON fu.id = f.following_id
            "#,
        )
        .bind(user.get())
        .bind(following.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_follow", e))?;
        follow_from_row(&row).map_err(|e| map_sqlx_error("insert_follow", e))
    }

    async fn get_follow(&self, user: UserId, id: FollowId) -> StoreResult<Option<Follow>> {
        let row = sqlx::query(&format!("{FOLLOW_SELECT} WHERE f.id = $1 AND f.user_id = $2"))
            .bind(id.get())
            .bind(user.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_follow", e))?;
        row.as_ref()
            .map(follow_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_follow", e))
    }

    #[instrument(skip(self), err)]
    async fn delete_follow(&self, id: FollowId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_follow", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23514") => StoreError::Constraint(msg),
                Some("23503") => StoreError::MissingReference(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {}", operation)),
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
