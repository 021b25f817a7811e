use anyhow::Result;
use tracing::{debug, info, trace};

use crate::config::DatabaseSettings;

pub async fn init_database(settings: &DatabaseSettings) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");
    debug!("Database settings: {:?}", settings);

    let db = dao::connection::connect(settings.connect_options()).await?;
    dao::connection::sync(&db).await?;
    dao::connection::close(db).await?;

    info!("Database initialization completed successfully!");
    Ok(())
}
