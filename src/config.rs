use anyhow::Result;
use config::{Config, Environment};
use sea_orm::ConnectOptions;
use serde::Deserialize;

/// Prefix of the environment variables holding the database settings.
pub const ENV_PREFIX: &str = "USERSTORE";

/// Relational engine the store talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    #[serde(alias = "postgresql")]
    Postgres,
    Mysql,
}

impl Dialect {
    fn default_port(self) -> Option<u16> {
        match self {
            Dialect::Sqlite => None,
            Dialect::Postgres => Some(5432),
            Dialect::Mysql => Some(3306),
        }
    }
}

/// Database connection settings read from the process environment.
///
/// A full `DATABASE_URL` wins over the individual parts.
#[derive(Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub url: Option<String>,
    pub dialect: Dialect,
    /// Database name, or the file path for SQLite.
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: Option<u16>,
    pub max_connections: u32,
    /// Log every SQL statement the driver runs.
    pub sql_logging: bool,
}

impl DatabaseSettings {
    /// Load settings from `USERSTORE_*` variables and `DATABASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_source(
            Environment::with_prefix(ENV_PREFIX),
            std::env::var("DATABASE_URL").ok(),
        )
    }

    /// Load settings from the given environment source.
    pub fn from_source(environment: Environment, database_url: Option<String>) -> Result<Self> {
        let mut settings: DatabaseSettings = Config::builder()
            .set_default("dialect", "sqlite")?
            .set_default("database", "userstore.db")?
            .set_default("host", "localhost")?
            .set_default("max_connections", 5)?
            .set_default("sql_logging", false)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        if database_url.is_some() {
            settings.url = database_url;
        }

        Ok(settings)
    }

    /// The URL handed to the driver.
    ///
    /// Credentials are inserted verbatim; use `DATABASE_URL` when they
    /// contain characters reserved in URLs.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        match self.dialect {
            Dialect::Sqlite if self.database == ":memory:" => "sqlite::memory:".to_string(),
            Dialect::Sqlite => format!("sqlite://{}?mode=rwc", self.database),
            Dialect::Postgres | Dialect::Mysql => {
                let scheme = if self.dialect == Dialect::Postgres { "postgres" } else { "mysql" };
                let credentials = match (&self.username, &self.password) {
                    (Some(user), Some(password)) => format!("{user}:{password}@"),
                    (Some(user), None) => format!("{user}@"),
                    _ => String::new(),
                };
                let port = self
                    .port
                    .or(self.dialect.default_port())
                    .map(|port| format!(":{port}"))
                    .unwrap_or_default();
                format!("{scheme}://{credentials}{}{port}/{}", self.host, self.database)
            }
        }
    }

    /// Connection options for [`dao::connection::connect`].
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.connection_url());
        options
            .max_connections(self.max_connections)
            .sqlx_logging(self.sql_logging);
        options
    }
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &self.url.as_deref().map(dao::connection::redact_url))
            .field("dialect", &self.dialect)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .field("sql_logging", &self.sql_logging)
            .finish()
    }
}
