//! tzdetect - infer each station's time-zone convention
//!
//! Runs once per invocation:
//! - loads transmitting stations from PostgreSQL
//! - searches recent hourly temperatures in MongoDB
//! - upserts one verdict per station

use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use tzd_batch::BatchRunner;
use tzd_config::AppConfig;
use tzd_db::{validate_station_prefix, DbClient, DbConnectionBuilder};
use tzd_docstore::{DocStoreClient, MongoUriBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    tzd_obs::init("tzdetect");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let started = Instant::now();
    let now = Local::now().naive_local();
    info!(%now, "Starting time-zone detection");

    let db = connect_db(&config)
        .await
        .context("Failed to connect to PostgreSQL")?;
    info!("Connected to PostgreSQL");

    let docs = match connect_docstore(&config).await {
        Ok(docs) => docs,
        Err(e) => {
            db.close().await;
            return Err(e.context("Failed to connect to MongoDB"));
        }
    };
    info!("Connected to MongoDB");

    let result = BatchRunner::new(&db, &docs, &db, &config.search.sensor_key)
        .run(now)
        .await;

    docs.close().await;
    db.close().await;

    let summary = result?;
    info!(
        resolved = summary.resolved,
        total = summary.total,
        failed_writes = summary.failed_writes,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Finished"
    );
    Ok(())
}

async fn connect_db(config: &AppConfig) -> Result<DbClient> {
    validate_station_prefix(&config.search.station_prefix)?;
    let client = match config.database_url() {
        Some(url) => DbClient::new(&url).await?,
        None => {
            let pg = &config.postgres;
            let mut builder = DbConnectionBuilder::new(&pg.database)
                .host(&pg.host)
                .port(pg.port)
                .username(&pg.username);
            if let Some(password) = &pg.password {
                builder = builder.password(password);
            }
            DbClient::with_options(builder.build()).await?
        }
    };
    if let Err(e) = client.ping().await {
        client.close().await;
        return Err(anyhow::Error::from(e).context("Database ping failed"));
    }
    Ok(client.with_station_prefix(&config.search.station_prefix)?)
}

async fn connect_docstore(config: &AppConfig) -> Result<DocStoreClient> {
    let mongo = &config.mongo;
    let uri = match config.mongo_url() {
        Some(url) => url,
        None => {
            let mut builder = MongoUriBuilder::new(&mongo.database)
                .host(&mongo.host)
                .port(mongo.port);
            if let Some(username) = &mongo.username {
                builder = builder.username(username);
            }
            if let Some(password) = &mongo.password {
                builder = builder.password(password);
            }
            builder.build()?
        }
    };
    let client = DocStoreClient::with_collection(&uri, &mongo.database, &mongo.collection).await?;
    if let Err(e) = client.ping().await {
        client.close().await;
        return Err(anyhow::Error::from(e).context("MongoDB ping failed"));
    }
    Ok(client)
}
