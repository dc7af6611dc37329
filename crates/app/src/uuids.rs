//! Typed Uuids

pub use restock::ids::TypedUuid;

/// Shopper identity supplied by the authentication context.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;
