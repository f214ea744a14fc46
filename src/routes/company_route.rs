use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

use crate::{
    configuration::Settings,
    services::{company_details, search_companies},
};

#[derive(Deserialize)]
pub struct CompanySearchQuery {
    name: String,
}

#[get("/search")]
pub async fn search(
    settings: web::Data<Settings>,
    query: web::Query<CompanySearchQuery>,
) -> HttpResponse {
    let records = search_companies(&settings.scraper, &query.name).await;
    HttpResponse::Ok().json(records)
}

#[derive(Deserialize)]
pub struct CompanyDetailQuery {
    url: String,
}

#[get("/detail")]
pub async fn detail(
    settings: web::Data<Settings>,
    query: web::Query<CompanyDetailQuery>,
) -> HttpResponse {
    match company_details(&settings.scraper, &query.url).await {
        Some(record) => HttpResponse::Ok().json(record),
        None => HttpResponse::Ok().json(serde_json::json!({})),
    }
}
