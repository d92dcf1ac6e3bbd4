use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;

use crate::dto::storefront::CatalogQuery;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, storefront as storefront_service};

#[derive(Deserialize)]
struct ApiV1ProductsQueryParams {
    search: Option<String>,
    category: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

#[get("/v1/products")]
pub async fn api_v1_products(
    params: web::Query<ApiV1ProductsQueryParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let params = params.into_inner();
    let query = CatalogQuery {
        search: params.search,
        category: params.category,
        page: params.page,
    };

    match storefront_service::api_products(repo.get_ref(), query, params.per_page) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "category not found"
        })),
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
