//! Integration tests for the resource handlers against the in-memory store.
//!
//! Verifies:
//! - Ownership checks on post/comment mutation
//! - Anonymous callers are rejected before ownership is considered
//! - Comments never leak across posts
//! - Follow invariants (self-follow, duplicates) and caller scoping

#[cfg(test)]
mod tests {
    use serde_json::json;

    use yatube_auth::{AuthenticatedUser, Caller};
    use yatube_blog::handlers::{comments, follows, groups, posts};
    use yatube_blog::model::NewGroup;
    use yatube_blog::payload::{CommentPayload, FollowPayload, Mode, PostPayload};
    use yatube_blog::{BlogError, BlogStore, User, Window};
    use yatube_core::{DomainError, FollowId, GroupId, PostId, UserId};

    use crate::store::InMemoryBlogStore;

    fn caller(id: i64, username: &str) -> Caller {
        Caller::Authenticated(AuthenticatedUser::new(UserId::new(id), username))
    }

    async fn setup() -> (InMemoryBlogStore, Caller, Caller) {
        let store = InMemoryBlogStore::new();
        store.upsert_user(&User::new(UserId::new(1), "alice")).await.unwrap();
        store.upsert_user(&User::new(UserId::new(2), "bob")).await.unwrap();
        (store, caller(1, "alice"), caller(2, "bob"))
    }

    fn post_payload(value: serde_json::Value) -> PostPayload {
        serde_json::from_value(value).unwrap()
    }

    fn comment_payload(text: &str) -> CommentPayload {
        serde_json::from_value(json!({ "text": text })).unwrap()
    }

    fn follow_payload(username: &str) -> FollowPayload {
        serde_json::from_value(json!({ "following": username })).unwrap()
    }

    fn domain(err: BlogError) -> DomainError {
        match err {
            BlogError::Domain(e) => e,
            other => panic!("expected a domain error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_author_cannot_update_or_delete_a_post() {
        let (store, alice, bob) = setup().await;
        let post = posts::create(&store, &alice, post_payload(json!({ "text": "mine" })))
            .await
            .unwrap();

        let err = posts::update(&store, &bob, post.id, post_payload(json!({ "text": "x" })), Mode::Partial)
            .await
            .unwrap_err();
        assert_eq!(domain(err), DomainError::Forbidden(posts::EDIT_DENIED.to_string()));

        let err = posts::update(&store, &bob, post.id, post_payload(json!({ "text": "x" })), Mode::Full)
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Forbidden(_)));

        let err = posts::destroy(&store, &bob, post.id).await.unwrap_err();
        assert_eq!(domain(err), DomainError::Forbidden(posts::DELETE_DENIED.to_string()));

        // Nothing changed.
        assert_eq!(posts::retrieve(&store, post.id).await.unwrap().text, "mine");
    }

    #[tokio::test]
    async fn anonymous_delete_is_unauthenticated_not_forbidden() {
        let (store, alice, _) = setup().await;
        let post = posts::create(&store, &alice, post_payload(json!({ "text": "mine" })))
            .await
            .unwrap();

        let err = posts::destroy(&store, &Caller::Anonymous, post.id).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Unauthenticated(_)));

        // Also for a post that does not exist.
        let err = posts::destroy(&store, &Caller::Anonymous, PostId::new(404)).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn author_can_patch_and_delete() {
        let (store, alice, _) = setup().await;
        let group = store
            .insert_group(NewGroup {
                title: "Cats".into(),
                slug: "cats".into(),
                description: "all about cats".into(),
            })
            .await
            .unwrap();
        let post = posts::create(&store, &alice, post_payload(json!({ "text": "v1" })))
            .await
            .unwrap();

        let updated = posts::update(
            &store,
            &alice,
            post.id,
            post_payload(json!({ "group": group.id })),
            Mode::Partial,
        )
        .await
        .unwrap();
        assert_eq!(updated.text, "v1");
        assert_eq!(updated.group, Some(group.id));

        posts::destroy(&store, &alice, post.id).await.unwrap();
        let err = posts::retrieve(&store, post.id).await.unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound("post"));
    }

    #[tokio::test]
    async fn post_validation_reports_fields() {
        let (store, alice, _) = setup().await;

        let err = posts::create(&store, &alice, post_payload(json!({ "group": 77 })))
            .await
            .unwrap_err();
        let DomainError::Validation(fields) = domain(err) else {
            panic!("expected validation error");
        };
        assert!(fields.get("text").is_some());
        assert_eq!(
            fields.get("group").unwrap(),
            ["Invalid pk \"77\" - object does not exist.".to_string()]
        );

        // PUT without text fails, PATCH without text is fine.
        let post = posts::create(&store, &alice, post_payload(json!({ "text": "ok" })))
            .await
            .unwrap();
        let err = posts::update(&store, &alice, post.id, post_payload(json!({})), Mode::Full)
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Validation(_)));
        posts::update(&store, &alice, post.id, post_payload(json!({})), Mode::Partial)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn anonymous_cannot_create_posts() {
        let (store, _, _) = setup().await;
        let err = posts::create(&store, &Caller::Anonymous, post_payload(json!({ "text": "hi" })))
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn comments_are_scoped_to_their_post() {
        let (store, alice, bob) = setup().await;
        let p1 = posts::create(&store, &alice, post_payload(json!({ "text": "one" }))).await.unwrap();
        let p2 = posts::create(&store, &alice, post_payload(json!({ "text": "two" }))).await.unwrap();

        let c1 = comments::create(&store, &bob, p1.id, comment_payload("on one")).await.unwrap();
        assert_eq!(c1.post, p1.id);
        assert_eq!(c1.author.username, "bob");

        let under_p2 = comments::list(&store, p2.id, None).await.unwrap();
        assert!(under_p2.items.is_empty());
        let err = comments::retrieve(&store, p2.id, c1.id).await.unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound("comment"));

        let under_p1 = comments::list(&store, p1.id, None).await.unwrap();
        assert_eq!(under_p1.items, vec![c1]);
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() {
        let (store, alice, _) = setup().await;
        let err = comments::create(&store, &alice, PostId::new(9), comment_payload("hi"))
            .await
            .unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound("post"));
    }

    #[tokio::test]
    async fn only_comment_author_can_delete() {
        let (store, alice, bob) = setup().await;
        let post = posts::create(&store, &alice, post_payload(json!({ "text": "p" }))).await.unwrap();
        let comment = comments::create(&store, &bob, post.id, comment_payload("c")).await.unwrap();

        let err = comments::destroy(&store, &alice, post.id, comment.id).await.unwrap_err();
        assert_eq!(domain(err), DomainError::Forbidden(comments::DELETE_DENIED.to_string()));

        comments::destroy(&store, &bob, post.id, comment.id).await.unwrap();
        assert!(comments::list(&store, post.id, None).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn comment_update_needs_identity_but_not_ownership() {
        let (store, alice, bob) = setup().await;
        let post = posts::create(&store, &alice, post_payload(json!({ "text": "p" }))).await.unwrap();
        let comment = comments::create(&store, &bob, post.id, comment_payload("c")).await.unwrap();

        let err = comments::update(&store, &Caller::Anonymous, post.id, comment.id, comment_payload("x"), Mode::Full)
            .await
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Unauthenticated(_)));

        let updated = comments::update(&store, &alice, post.id, comment.id, comment_payload("edited"), Mode::Partial)
            .await
            .unwrap();
        assert_eq!(updated.text, "edited");
        assert_eq!(updated.author.username, "bob");
    }

    #[tokio::test]
    async fn self_follow_is_rejected() {
        let (store, alice, _) = setup().await;
        let err = follows::create(&store, &alice, follow_payload("alice")).await.unwrap_err();
        assert_eq!(domain(err), DomainError::BadRequest(follows::SELF_FOLLOW.to_string()));
    }

    #[tokio::test]
    async fn duplicate_follow_is_rejected_without_a_second_row() {
        let (store, alice, _) = setup().await;
        let follow = follows::create(&store, &alice, follow_payload("bob")).await.unwrap();
        assert_eq!(follow.user.username, "alice");
        assert_eq!(follow.following.username, "bob");

        let err = follows::create(&store, &alice, follow_payload("bob")).await.unwrap_err();
        assert_eq!(domain(err), DomainError::BadRequest(follows::ALREADY_FOLLOWING.to_string()));

        let listing = follows::list(&store, &alice, &[], None).await.unwrap();
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn concurrent_identical_follows_create_one_edge() {
        let (store, alice, _) = setup().await;
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let alice = alice.clone();
            handles.push(tokio::spawn(async move {
                follows::create(store.as_ref(), &alice, follow_payload("bob")).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(
                    domain(err),
                    DomainError::BadRequest(follows::ALREADY_FOLLOWING.to_string())
                ),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(follows::list(store.as_ref(), &alice, &[], None).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn follow_of_unknown_user_is_a_field_error() {
        let (store, alice, _) = setup().await;
        let err = follows::create(&store, &alice, follow_payload("nobody")).await.unwrap_err();
        let DomainError::Validation(fields) = domain(err) else {
            panic!("expected validation error");
        };
        assert_eq!(
            fields.get("following").unwrap(),
            ["Object with username=nobody does not exist.".to_string()]
        );
    }

    #[tokio::test]
    async fn follow_target_is_matched_exactly() {
        let (store, alice, _) = setup().await;
        let err = follows::create(&store, &alice, follow_payload(" bob ")).await.unwrap_err();
        let DomainError::Validation(fields) = domain(err) else {
            panic!("expected validation error");
        };
        assert_eq!(
            fields.get("following").unwrap(),
            ["Object with username= bob  does not exist.".to_string()]
        );
        assert_eq!(follows::list(&store, &alice, &[], None).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn follow_list_is_scoped_and_searchable() {
        let (store, alice, bob) = setup().await;
        store.upsert_user(&User::new(UserId::new(3), "carol")).await.unwrap();
        store.upsert_user(&User::new(UserId::new(4), "caroline")).await.unwrap();

        follows::create(&store, &alice, follow_payload("bob")).await.unwrap();
        follows::create(&store, &alice, follow_payload("carol")).await.unwrap();
        follows::create(&store, &alice, follow_payload("caroline")).await.unwrap();
        follows::create(&store, &bob, follow_payload("alice")).await.unwrap();

        let all = follows::list(&store, &alice, &[], None).await.unwrap();
        assert_eq!(all.total, 3);
        assert!(all.items.iter().all(|f| f.user.username == "alice"));

        let terms = follows::search_terms(Some("CAROL"));
        let found = follows::list(&store, &alice, &terms, None).await.unwrap();
        let names: Vec<_> = found.items.iter().map(|f| f.following.username.as_str()).collect();
        assert_eq!(names, vec!["carol", "caroline"]);

        let page = follows::list(&store, &alice, &terms, Some(Window { offset: 1, limit: 1 }))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].following.username, "caroline");

        let err = follows::list(&store, &Caller::Anonymous, &[], None).await.unwrap_err();
        assert!(matches!(domain(err), DomainError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn unfollow_is_limited_to_own_edges() {
        let (store, alice, bob) = setup().await;
        let edge = follows::create(&store, &alice, follow_payload("bob")).await.unwrap();

        let err = follows::destroy(&store, &bob, edge.id).await.unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound("follow"));

        follows::destroy(&store, &alice, edge.id).await.unwrap();
        let err = follows::retrieve(&store, &alice, edge.id).await.unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound("follow"));
        let err = follows::destroy(&store, &alice, FollowId::new(999)).await.unwrap_err();
        assert_eq!(domain(err), DomainError::NotFound("follow"));
    }

    #[tokio::test]
    async fn groups_are_readable_by_anyone() {
        let (store, _, _) = setup().await;
        store
            .insert_group(NewGroup {
                title: "Dogs".into(),
                slug: "dogs".into(),
                description: String::new(),
            })
            .await
            .unwrap();

        let listing = groups::list(&store, None).await.unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(groups::retrieve(&store, GroupId::new(1)).await.unwrap().slug, "dogs");
        assert_eq!(
            domain(groups::retrieve(&store, GroupId::new(2)).await.unwrap_err()),
            DomainError::NotFound("group")
        );
    }
}
