//! Root of the SeaORM entity modules.
//! The store holds a single table, `USERS`, keyed by username.

pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::user::Entity as User;
}
