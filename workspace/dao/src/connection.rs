//! Opening, syncing and closing the database connection.
//!
//! The connection is opened once at start-up, handed to every data-access
//! call by reference, and closed explicitly at shutdown.

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::{DaoError, Result};

/// Open a connection and verify it answers.
///
/// In-memory SQLite databases are private to the pool connection that
/// created them, so their pool is capped at a single connection.
#[instrument(skip(options), fields(url = %redact_url(options.get_url())))]
pub async fn connect(mut options: ConnectOptions) -> Result<DatabaseConnection> {
    trace!("Entering connect function");

    if options.get_url().contains(":memory:") {
        debug!("In-memory SQLite database, limiting pool to one connection");
        options.max_connections(1).min_connections(1);
    }

    let db = match Database::connect(options).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(DaoError::Connection(e.to_string()));
        }
    };

    if let Err(e) = db.ping().await {
        error!("Database did not answer ping: {}", e);
        return Err(DaoError::Connection(e.to_string()));
    }
    debug!("Database connection established");

    Ok(db)
}

/// Create the `USERS` table when it does not exist yet.
///
/// Existing tables are left untouched; nothing is ever dropped here.
#[instrument(skip(db))]
pub async fn sync(db: &DatabaseConnection) -> Result<()> {
    info!("Running database migrations");
    match Migrator::up(db, None).await {
        Ok(_) => {
            info!("Database migrations completed successfully");
            warn!("Passwords in the USERS table are stored in plaintext");
            Ok(())
        }
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            Err(e.into())
        }
    }
}

/// Connect and sync in one step, the usual start-up sequence.
pub async fn open(options: ConnectOptions) -> Result<DatabaseConnection> {
    let db = connect(options).await?;
    sync(&db).await?;
    Ok(db)
}

/// Close the connection, releasing every pooled connection.
#[instrument(skip(db))]
pub async fn close(db: DatabaseConnection) -> Result<()> {
    debug!("Closing database connection");
    db.close().await?;
    info!("Database connection closed");
    Ok(())
}

/// Hide the password component of a connection URL for logging.
pub fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:****@{host}"),
        None => url.to_string(),
    }
}
