//! Rows with a store-assigned identity.

/// A persisted record addressed by a typed id.
///
/// In-memory tables are keyed by `Entity::Id` and iterate in id order, which
/// is also the order every list endpoint returns.
pub trait Entity {
    /// Resource name used in "not found" errors and store diagnostics.
    const RESOURCE: &'static str;

    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> Self::Id;
}
