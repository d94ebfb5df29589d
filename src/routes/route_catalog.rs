use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Client,
};
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::mongo::{self, ROUTES},
    error::{AppError, AppResult},
    models::route::Route,
};

#[derive(serde::Deserialize)]
pub struct RouteQuery {
    search: Option<String>,
    limit: Option<u16>,
}

pub fn search_filter(search: Option<&str>) -> Document {
    match search.map(str::trim) {
        Some(text) if !text.is_empty() => {
            let pattern = format!("^{}", regex::escape(text));
            doc! {
                "$or": [
                    { "origin": { "$regex": &pattern, "$options": "i" } },
                    { "destination": { "$regex": &pattern, "$options": "i" } },
                    { "name": { "$regex": &pattern, "$options": "i" } },
                ]
            }
        }
        _ => doc! {},
    }
}

/*
    GET /api/routes
*/
pub async fn list_routes(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    params: web::Query<RouteQuery>,
) -> AppResult<HttpResponse> {
    let mut filter = search_filter(params.search.as_deref());
    filter.insert("active", true);

    let collection = mongo::collection::<Route>(&data, &config, ROUTES);
    let mut find = collection
        .find(filter)
        .sort(doc! { "sort_order": 1, "name": 1 });
    if let Some(limit) = params.limit {
        find = find.limit(limit.into());
    }

    let routes: Vec<Route> = find.await?.try_collect().await?;
    Ok(HttpResponse::Ok().json(routes))
}

/*
    GET /api/routes/{id_or_slug}
*/
pub async fn get_route(
    data: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let key = path.into_inner();
    let filter = match ObjectId::parse_str(&key) {
        Ok(id) => doc! { "_id": id, "active": true },
        Err(_) => doc! { "slug": &key, "active": true },
    };

    let route = mongo::collection::<Route>(&data, &config, ROUTES)
        .find_one(filter)
        .await?
        .ok_or_else(|| AppError::not_found("Route"))?;

    Ok(HttpResponse::Ok().json(route))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_matches_everything() {
        assert!(search_filter(None).is_empty());
        assert!(search_filter(Some("   ")).is_empty());
    }

    #[test]
    fn search_is_escaped_prefix_match() {
        let filter = search_filter(Some("Makkah (Haram)"));
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 3);
        let origin = clauses[0].as_document().unwrap().get_document("origin").unwrap();
        assert_eq!(origin.get_str("$regex").unwrap(), r"^Makkah \(Haram\)");
        assert_eq!(origin.get_str("$options").unwrap(), "i");
    }
}
