use chrono::Utc;
use log::warn;
use mongodb::Client;

use crate::{
    config::AppConfig,
    db::mongo::{self, AUDIT_LOGS},
    middleware::auth::Claims,
    models::audit::{AuditAction, AuditLog},
};

/// Appends an audit entry. A failed write is logged and swallowed so it never fails the request.
pub async fn record(
    client: &Client,
    config: &AppConfig,
    actor: &Claims,
    action: AuditAction,
    entity: &str,
    entity_id: Option<String>,
    summary: impl Into<String>,
) {
    let entry = AuditLog {
        id: None,
        actor_id: Some(actor.user_id.clone()),
        actor_email: actor.sub.clone(),
        action,
        entity: entity.to_string(),
        entity_id,
        summary: summary.into(),
        created_at: Utc::now(),
    };

    if let Err(err) = mongo::collection::<AuditLog>(client, config, AUDIT_LOGS)
        .insert_one(&entry)
        .await
    {
        warn!(
            "Failed to write audit log for {} {:?} by {}: {}",
            entry.entity, entry.action, entry.actor_email, err
        );
    }
}
