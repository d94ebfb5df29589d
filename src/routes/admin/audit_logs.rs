use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    Client,
};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, AUDIT_LOGS},
    error::AppResult,
    models::{
        audit::{AuditLog, AuditQuery},
        paging, Page,
    },
};

pub fn audit_filter(query: &AuditQuery) -> Document {
    let mut filter = doc! {};
    if let Some(entity) = query.entity.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        filter.insert("entity", entity);
    }
    if let Some(actor) = query.actor.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        filter.insert("actor_email", actor.to_lowercase());
    }
    filter
}

/*
    GET /api/admin/audit-logs?entity=..&actor=..&page=..&limit=..
*/
pub async fn list_logs(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<AuditQuery>,
) -> AppResult<HttpResponse> {
    let (page, limit, skip) = paging(params.page, params.limit);
    let filter = audit_filter(&params);

    let collection = mongo::collection::<AuditLog>(&data, &config, AUDIT_LOGS);
    let total = collection.count_documents(filter.clone()).await?;
    let items: Vec<AuditLog> = collection
        .find(filter)
        .sort(doc! { "_id": -1 })
        .skip(skip)
        .limit(limit as i64)
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(Page {
        items,
        page,
        limit,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_ignored() {
        let query = AuditQuery {
            entity: Some(" ".to_string()),
            actor: None,
            page: None,
            limit: None,
        };
        assert!(audit_filter(&query).is_empty());
    }

    #[test]
    fn actor_matches_lowercased_email() {
        let query = AuditQuery {
            entity: Some("booking".to_string()),
            actor: Some("Ops@Example.com".to_string()),
            page: None,
            limit: None,
        };
        let filter = audit_filter(&query);
        assert_eq!(filter.get_str("entity").unwrap(), "booking");
        assert_eq!(filter.get_str("actor_email").unwrap(), "ops@example.com");
    }
}
