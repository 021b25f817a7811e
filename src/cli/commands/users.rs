use anyhow::{Context, Result};
use dao::NewUser;
use model::entities::user;
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, trace};

/// What the CLI prints for a user row. Stored passwords are never echoed.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub username: String,
}

impl From<user::Model> for UserView {
    fn from(model: user::Model) -> Self {
        Self {
            username: model.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountView {
    pub count: u64,
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn views(users: Vec<user::Model>) -> Vec<UserView> {
    users.into_iter().map(UserView::from).collect()
}

/// Parse a JSON array of `{ "username": .., "password": .. }` objects.
pub fn read_users_file(path: &Path) -> Result<Vec<NewUser>> {
    trace!("Reading users from {}", path.display());
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let users: Vec<NewUser> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse users from {}", path.display()))?;
    debug!("Read {} users from {}", users.len(), path.display());
    Ok(users)
}

pub async fn create<C: ConnectionTrait, W: Write>(
    db: &C,
    username: String,
    password: String,
    out: &mut W,
) -> Result<()> {
    let created = dao::users::create(db, NewUser::new(username, password)).await?;
    print_json(out, &UserView::from(created))
}

pub async fn bulk_create<C, W>(db: &C, file: &Path, out: &mut W) -> Result<()>
where
    C: ConnectionTrait + TransactionTrait,
    W: Write,
{
    let new_users = read_users_file(file)?;
    let created = dao::users::bulk_create(db, new_users).await?;
    info!("Created {} users from {}", created.len(), file.display());
    print_json(out, &views(created))
}

pub async fn list<C: ConnectionTrait, W: Write>(db: &C, out: &mut W) -> Result<()> {
    let users = dao::users::find_all(db).await?;
    print_json(out, &views(users))
}

pub async fn usernames<C: ConnectionTrait, W: Write>(db: &C, out: &mut W) -> Result<()> {
    let usernames = dao::users::find_users(db).await?;
    print_json(out, &usernames)
}

pub async fn find<C: ConnectionTrait, W: Write>(
    db: &C,
    username: &str,
    password: &str,
    out: &mut W,
) -> Result<()> {
    let users = dao::users::find_user(db, username, password).await?;
    print_json(out, &views(users))
}

pub async fn first<C: ConnectionTrait, W: Write>(db: &C, out: &mut W) -> Result<()> {
    let users = dao::users::first_user(db).await?;
    print_json(out, &views(users))
}

pub async fn get<C: ConnectionTrait, W: Write>(db: &C, username: &str, out: &mut W) -> Result<()> {
    let found = dao::users::get_user(db, username).await?;
    print_json(out, &UserView::from(found))
}

pub async fn count<C: ConnectionTrait, W: Write>(db: &C, out: &mut W) -> Result<()> {
    let count = dao::users::count(db).await?;
    print_json(out, &CountView { count })
}
