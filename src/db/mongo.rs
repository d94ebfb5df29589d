use log::{info, warn};
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

pub const USERS: &str = "Users";
pub const ROUTES: &str = "Routes";
pub const VEHICLES: &str = "Vehicles";
pub const PRICING: &str = "Pricing";
pub const BOOKINGS: &str = "Bookings";
pub const REVIEWS: &str = "Reviews";
pub const CONTENT: &str = "ContentSections";
pub const BLOG: &str = "BlogPosts";
pub const GALLERY: &str = "Gallery";
pub const SETTINGS: &str = "Settings";
pub const AUDIT_LOGS: &str = "AuditLogs";

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, mongodb::error::Error> {
    let client = build_client(uri).await?;

    // Test the connection to make sure it works
    match client
        .database("admin")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => info!("Connected to MongoDB and verified with ping command"),
        Err(e) => {
            warn!("Connected to MongoDB but ping test failed: {}", e);
            warn!("The API may still work, but some functionality might be impaired");
        }
    }

    Ok(client)
}

/// Builds a client without touching the server. The driver connects lazily on first use.
pub async fn build_client(uri: &str) -> Result<Arc<Client>, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);
    client_options.app_name = Some("umrah-transport-api".to_string());

    // Set the server API if using MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    Ok(Arc::new(Client::with_options(client_options)?))
}

pub fn collection<T>(client: &Client, config: &AppConfig, name: &str) -> Collection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    client.database(&config.database).collection(name)
}

pub fn parse_object_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id.trim()).map_err(|_| AppError::invalid_id(id))
}

pub async fn ensure_indexes(client: &Client, config: &AppConfig) -> Result<(), mongodb::error::Error> {
    let unique = [
        (USERS, "email"),
        (ROUTES, "slug"),
        (BLOG, "slug"),
        (CONTENT, "key"),
        (BOOKINGS, "reference"),
    ];

    for (name, field) in unique {
        let index = IndexModel::builder()
            .keys(doc! { field: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection::<Document>(client, config, name)
            .create_index(index)
            .await?;
    }

    let booking_lookup = IndexModel::builder()
        .keys(doc! { "status": 1, "pickup_at": 1 })
        .build();
    collection::<Document>(client, config, BOOKINGS)
        .create_index(booking_lookup)
        .await?;

    info!("MongoDB indexes ensured on database {}", config.database);
    Ok(())
}
