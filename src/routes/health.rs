use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use crate::config::AppConfig;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: String) -> Self {
        ServiceStatus {
            status: "ok".to_string(),
            details: Some(details),
        }
    }

    fn error(details: String) -> Self {
        ServiceStatus {
            status: "error".to_string(),
            details: Some(details),
        }
    }
}

pub async fn liveness() -> impl Responder {
    "OK"
}

pub async fn health_check(
    client: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let mut services = HashMap::new();
    services.insert("mongodb".to_string(), check_mongodb(&client, &config).await);
    services.insert("gallery_storage".to_string(), check_gallery_storage(&config));

    let status = if services.values().all(|s| s.status == "ok") {
        "ok"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthStatus {
        status: status.to_string(),
        services,
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_mongodb(client: &Client, config: &AppConfig) -> ServiceStatus {
    match client
        .database(&config.database)
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => ServiceStatus::ok("Connected successfully to MongoDB".to_string()),
        Err(e) => {
            error!("MongoDB health check failed: {}", e);
            ServiceStatus::error(format!("Failed to connect: {}", e))
        }
    }
}

fn check_gallery_storage(config: &AppConfig) -> ServiceStatus {
    match &config.gallery_bucket {
        Some(bucket) => ServiceStatus::ok(format!("Gallery bucket '{}' configured", bucket)),
        None => ServiceStatus::error("Missing bucket configuration: GALLERY_BUCKET".to_string()),
    }
}
