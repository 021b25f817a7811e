use sea_orm::entity::prelude::*;

/// Maximum length of a username, in characters.
pub const USERNAME_MAX_LEN: u32 = 256;
/// Maximum length of a stored password, in characters.
pub const PASSWORD_MAX_LEN: u32 = 100;

/// A user account row of the `USERS` table.
///
/// The username is the primary key. The password column holds the value
/// exactly as it was supplied: it is NOT hashed. Treat every row as
/// sensitive and never echo the password back to an operator.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "USERS")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(StringLen::N(256))")]
    pub username: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
