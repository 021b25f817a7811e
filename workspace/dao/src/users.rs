//! Create, read and count operations on the `USERS` table.

use model::entities::{prelude::User, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, trace, warn};
use validator::Validate;

use crate::error::{DaoError, Result};

/// Rows per `INSERT` in [`bulk_create`], two bound parameters each.
///
/// Keeps every statement far below the bind-variable limit of the drivers
/// (32766 on SQLite, 65535 on Postgres and MySQL).
pub const BULK_INSERT_CHUNK_SIZE: usize = 1000;

/// Credentials for a user that does not exist yet.
#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 256))]
    pub username: String,
    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn into_active_model(self) -> user::ActiveModel {
        user::ActiveModel {
            username: Set(self.username),
            password: Set(self.password),
        }
    }
}

impl<U: Into<String>, P: Into<String>> From<(U, P)> for NewUser {
    fn from((username, password): (U, P)) -> Self {
        Self::new(username, password)
    }
}

// Keeps passwords out of logs and `{:?}` output.
impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Insert a single user.
///
/// Fails with [`DaoError::AlreadyExists`] when the username is taken.
#[instrument(skip(db))]
pub async fn create<C: ConnectionTrait>(db: &C, new_user: NewUser) -> Result<user::Model> {
    trace!("Entering create function");
    new_user.validate()?;

    let username = new_user.username.clone();
    match new_user.into_active_model().insert(db).await {
        Ok(created) => {
            info!("User created successfully: {}", created.username);
            Ok(created)
        }
        Err(db_error) => match DaoError::from(db_error) {
            DaoError::AlreadyExists(_) => {
                warn!("Username '{}' already exists", username);
                Err(DaoError::AlreadyExists(username))
            }
            other => Err(other),
        },
    }
}

/// Insert many users in one transaction.
///
/// Rows are written in chunks of [`BULK_INSERT_CHUNK_SIZE`]. Either every
/// row is written or none is. The created rows are returned in input order;
/// an empty input writes nothing.
#[instrument(skip(db, new_users), fields(num_users = new_users.len()))]
pub async fn bulk_create<C>(db: &C, new_users: Vec<NewUser>) -> Result<Vec<user::Model>>
where
    C: ConnectionTrait + TransactionTrait,
{
    trace!("Entering bulk_create function");
    if new_users.is_empty() {
        debug!("Nothing to insert");
        return Ok(Vec::new());
    }

    for new_user in &new_users {
        new_user.validate()?;
    }

    let created: Vec<user::Model> = new_users
        .iter()
        .map(|u| user::Model {
            username: u.username.clone(),
            password: u.password.clone(),
        })
        .collect();

    let txn = db.begin().await?;
    let mut inserted: u64 = 0;
    for chunk in new_users.chunks(BULK_INSERT_CHUNK_SIZE) {
        let rows = User::insert_many(chunk.iter().cloned().map(NewUser::into_active_model))
            .exec_without_returning(&txn)
            .await;
        match rows {
            Ok(rows) => {
                debug!("Inserted chunk of {} users", rows);
                inserted += rows;
            }
            Err(db_error) => {
                warn!("Bulk insert failed after {} users, rolling back", inserted);
                txn.rollback().await?;
                return Err(db_error.into());
            }
        }
    }
    txn.commit().await?;

    info!("Inserted {} users", inserted);
    Ok(created)
}

/// Every row with all columns, ordered by username.
#[instrument(skip(db))]
pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<user::Model>> {
    let users = User::find()
        .order_by_asc(user::Column::Username)
        .all(db)
        .await?;
    debug!("Retrieved {} users from database", users.len());
    Ok(users)
}

/// The username of every row, without touching the password column.
#[instrument(skip(db))]
pub async fn find_users<C: ConnectionTrait>(db: &C) -> Result<Vec<String>> {
    let usernames: Vec<String> = User::find()
        .select_only()
        .column(user::Column::Username)
        .order_by_asc(user::Column::Username)
        .into_tuple()
        .all(db)
        .await?;
    debug!("Retrieved {} usernames from database", usernames.len());
    Ok(usernames)
}

/// Rows whose username and password both match exactly.
///
/// Since username is the primary key this holds at most one row. A wrong
/// password yields an empty result, not an error.
#[instrument(skip(db, password))]
pub async fn find_user<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<Vec<user::Model>> {
    let users = User::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::Password.eq(password))
        .all(db)
        .await?;
    if users.is_empty() {
        debug!("No user matched the given credentials");
    }
    Ok(users)
}

/// The first row in storage order, if any.
#[instrument(skip(db))]
pub async fn first_user<C: ConnectionTrait>(db: &C) -> Result<Vec<user::Model>> {
    let users = User::find().limit(1).all(db).await?;
    Ok(users)
}

/// Look a user up by username.
#[instrument(skip(db))]
pub async fn get_user<C: ConnectionTrait>(db: &C, username: &str) -> Result<user::Model> {
    match User::find_by_id(username.to_string()).one(db).await? {
        Some(found) => Ok(found),
        None => {
            warn!("User '{}' not found", username);
            Err(DaoError::NotFound(username.to_string()))
        }
    }
}

/// Number of rows in the table.
#[instrument(skip(db))]
pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64> {
    let total = User::find().count(db).await?;
    debug!("USERS holds {} rows", total);
    Ok(total)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::{init_test_tracing, setup_db};
    use sea_orm::DatabaseConnection;
    use std::collections::HashSet;

    async fn seeded(users: &[(&str, &str)]) -> DatabaseConnection {
        let db = setup_db().await;
        bulk_create(&db, users.iter().map(|&pair| NewUser::from(pair)).collect())
            .await
            .expect("Failed to seed users");
        db
    }

    #[tokio::test]
    async fn test_create_then_find_all() {
        let _guard = init_test_tracing();
        let db = setup_db().await;

        let created = create(&db, NewUser::new("alice", "secret")).await.unwrap();
        assert_eq!(created.username, "alice");
        assert_eq!(created.password, "secret");

        let all = find_all(&db).await.unwrap();
        assert_eq!(
            all,
            vec![user::Model {
                username: "alice".to_string(),
                password: "secret".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_username_fails() {
        let _guard = init_test_tracing();
        let db = setup_db().await;

        create(&db, ("alice", "secret").into()).await.unwrap();
        let err = create(&db, ("alice", "other").into()).await.unwrap_err();

        match err {
            DaoError::AlreadyExists(username) => assert_eq!(username, "alice"),
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        assert_eq!(count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_oversized_input() {
        let db = setup_db().await;

        let err = create(&db, NewUser::new("u".repeat(257), "pw")).await.unwrap_err();
        assert!(matches!(err, DaoError::Validation(_)), "got {err:?}");

        let err = create(&db, NewUser::new("bob", "p".repeat(101))).await.unwrap_err();
        assert!(matches!(err, DaoError::Validation(_)), "got {err:?}");

        let err = create(&db, NewUser::new("bob", "")).await.unwrap_err();
        assert!(matches!(err, DaoError::Validation(_)), "got {err:?}");

        assert_eq!(count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_accepts_limits() {
        let db = setup_db().await;

        // Limits are in characters, not bytes.
        let username = "é".repeat(256);
        let created = create(&db, NewUser::new(username.clone(), "p".repeat(100)))
            .await
            .unwrap();
        assert_eq!(created.username, username);
    }

    #[tokio::test]
    async fn test_bulk_create_then_find_users() {
        let _guard = init_test_tracing();
        let db = setup_db().await;

        let created = bulk_create(&db, vec![("a", "1").into(), ("b", "2").into()])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].username, "a");
        assert_eq!(created[1].password, "2");

        let usernames: HashSet<String> = find_users(&db).await.unwrap().into_iter().collect();
        assert_eq!(usernames, HashSet::from(["a".to_string(), "b".to_string()]));
    }

    #[tokio::test]
    async fn test_bulk_create_empty_is_noop() {
        let db = setup_db().await;

        assert!(bulk_create(&db, Vec::new()).await.unwrap().is_empty());
        assert_eq!(count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bulk_create_duplicate_inserts_nothing() {
        let db = setup_db().await;

        let err = bulk_create(&db, vec![("a", "1").into(), ("a", "2").into()])
            .await
            .unwrap_err();
        assert!(matches!(err, DaoError::AlreadyExists(_)), "got {err:?}");
        assert_eq!(count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bulk_create_large_batch() {
        let db = setup_db().await;

        let new_users: Vec<NewUser> = (0..20_000)
            .map(|i| NewUser::new(format!("u{i}"), "p"))
            .collect();
        let created = bulk_create(&db, new_users).await.unwrap();

        assert_eq!(created.len(), 20_000);
        assert_eq!(created[19_999].username, "u19999");
        assert_eq!(count(&db).await.unwrap(), 20_000);
    }

    #[tokio::test]
    async fn test_bulk_create_duplicate_in_later_chunk_inserts_nothing() {
        let db = setup_db().await;

        let mut new_users: Vec<NewUser> = (0..BULK_INSERT_CHUNK_SIZE + 10)
            .map(|i| NewUser::new(format!("u{i}"), "p"))
            .collect();
        new_users.push(NewUser::new("u0", "again"));

        let err = bulk_create(&db, new_users).await.unwrap_err();
        assert!(matches!(err, DaoError::AlreadyExists(_)), "got {err:?}");
        assert_eq!(count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bulk_create_invalid_row_inserts_nothing() {
        let db = setup_db().await;

        let err = bulk_create(&db, vec![("a", "1").into(), ("", "2").into()])
            .await
            .unwrap_err();
        assert!(matches!(err, DaoError::Validation(_)), "got {err:?}");
        assert_eq!(count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_user_matches_both_fields() {
        let db = seeded(&[("alice", "secret"), ("bob", "secret")]).await;

        let found = find_user(&db, "alice", "secret").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "alice");

        assert!(find_user(&db, "alice", "wrong").await.unwrap().is_empty());
        assert!(find_user(&db, "nobody", "secret").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_user() {
        let db = setup_db().await;
        assert!(first_user(&db).await.unwrap().is_empty());

        bulk_create(&db, vec![("x", "1").into(), ("y", "2").into()])
            .await
            .unwrap();
        let first = first_user(&db).await.unwrap();
        assert_eq!(first.len(), 1);
        assert!(["x", "y"].contains(&first[0].username.as_str()));
    }

    #[tokio::test]
    async fn test_get_user() {
        let db = seeded(&[("alice", "secret")]).await;

        assert_eq!(get_user(&db, "alice").await.unwrap().password, "secret");

        match get_user(&db, "mallory").await.unwrap_err() {
            DaoError::NotFound(username) => assert_eq!(username, "mallory"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_count() {
        let db = setup_db().await;
        assert_eq!(count(&db).await.unwrap(), 0);

        let db = seeded(&[("a", "1"), ("b", "2"), ("c", "3")]).await;
        assert_eq!(count(&db).await.unwrap(), 3);
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", NewUser::new("alice", "secret"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("secret"));
    }
}
