//! Data access for the `USERS` table.
//!
//! Every operation takes the connection it runs on as an explicit argument;
//! there is no process-global connection.

pub mod connection;
pub mod error;
pub mod users;

pub use error::{DaoError, Result};
pub use users::NewUser;
