//! Groups are read-only and open to every caller.

use yatube_core::{DomainError, Entity, GroupId};

use crate::error::BlogResult;
use crate::model::Group;
use crate::pagination::{Listing, Window};
use crate::store::BlogStore;

pub async fn list(store: &dyn BlogStore, window: Option<Window>) -> BlogResult<Listing<Group>> {
    Ok(store.list_groups(window).await?)
}

pub async fn retrieve(store: &dyn BlogStore, id: GroupId) -> BlogResult<Group> {
    store
        .get_group(id)
        .await?
        .ok_or_else(|| DomainError::not_found(Group::RESOURCE).into())
}
