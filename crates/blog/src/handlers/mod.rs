//! Resource handlers: authorization-gated CRUD per resource type.
//!
//! Every operation receives the caller explicitly and performs its checks in
//! a fixed order (identity, existence, ownership, payload) before touching
//! the store.

pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;

use yatube_core::{FieldErrors, GroupId};

use crate::store::{BlogStore, StoreResult};

/// Record a field error when a referenced group does not exist.
async fn check_group(
    store: &dyn BlogStore,
    group: Option<Option<GroupId>>,
    errors: &mut FieldErrors,
) -> StoreResult<()> {
    if let Some(Some(id)) = group {
        if store.get_group(id).await?.is_none() {
            errors.add("group", format!("Invalid pk \"{id}\" - object does not exist."));
        }
    }
    Ok(())
}
