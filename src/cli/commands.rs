pub mod initdb;
pub mod users;

pub use initdb::init_database;
