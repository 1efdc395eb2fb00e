//! MongoDB client for the hourly observation collection

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection};
use tracing::{debug, instrument};
use tzd_core::{ObservationQuery, ObservationSource, RawRecord, StoreResult};

use crate::document::{into_records, to_bson, HourlyDocument};
use crate::{DocStoreResult, HOURLY_COLLECTION};

/// Client bound to one database and collection
#[derive(Clone)]
pub struct DocStoreClient {
    client: Client,
    collection: Collection<HourlyDocument>,
}

impl DocStoreClient {
    /// Connect using a `mongodb://` URI; the database comes from `database`
    pub async fn new(uri: &str, database: &str) -> DocStoreResult<Self> {
        Self::with_collection(uri, database, HOURLY_COLLECTION).await
    }

    pub async fn with_collection(
        uri: &str,
        database: &str,
        collection: &str,
    ) -> DocStoreResult<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some("tzdetect".to_string());
        let client = Client::with_options(options)?;
        let collection = client.database(database).collection(collection);

        Ok(Self { client, collection })
    }

    /// Test the connection
    pub async fn ping(&self) -> DocStoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    /// Hourly documents for one station inside `[query.start, query.end]`
    #[instrument(skip(self))]
    pub async fn find_hourly(&self, query: &ObservationQuery) -> DocStoreResult<Vec<RawRecord>> {
        let filter = doc! {
            "puntoObservacion": query.station_id.as_str(),
            "fechaTomaDato": {
                "$gte": to_bson(query.start),
                "$lte": to_bson(query.end),
            },
        };
        let options = FindOptions::builder()
            .projection(projection(&query.sensor_key))
            .sort(doc! { "fechaTomaDato": 1 })
            .limit(query.limit)
            .build();

        let documents: Vec<HourlyDocument> =
            self.collection.find(filter, options).await?.try_collect().await?;
        debug!(
            "Retrieved {} documents for {} between {} and {}",
            documents.len(),
            query.station_id,
            query.start,
            query.end
        );

        Ok(into_records(documents))
    }

    /// Shut the client down, waiting for pooled connections to close
    pub async fn close(self) {
        self.client.shutdown().await;
    }
}

fn projection(sensor_key: &str) -> Document {
    let mut projection = doc! {
        "_id": 0,
        "puntoObservacion": 1,
        "fechaTomaDato": 1,
    };
    projection.insert(format!("data.{}.valor", sensor_key), 1);
    projection
}

#[async_trait::async_trait]
impl ObservationSource for DocStoreClient {
    async fn fetch(&self, query: &ObservationQuery) -> StoreResult<Vec<RawRecord>> {
        Ok(self.find_hourly(query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_keeps_only_sensor_values() {
        let projection = projection("293161h");
        assert_eq!(projection.get_i32("_id").unwrap(), 0);
        assert_eq!(projection.get_i32("data.293161h.valor").unwrap(), 1);
        assert_eq!(projection.len(), 4);
    }
}
