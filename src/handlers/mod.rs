pub mod context;
pub mod orders;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use utoipa::OpenApi;

use crate::errors::{AppError, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        orders::get_order_by_number,
        orders::update_status,
        orders::replace_items,
        orders::delete_order,
    ),
    components(schemas(
        orders::SubmitOrderRequest,
        orders::LineItemRequest,
        orders::CustomerRequest,
        orders::ReplaceItemsRequest,
        orders::StatusRequest,
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::SubmitOrderResponse,
        orders::OrderEnvelope,
        orders::StatusChangeResponse,
        orders::DeleteOrderResponse,
        orders::ListOrdersResponse,
        ErrorResponse,
    )),
    tags((name = "orders", description = "Order submission and lifecycle"))
)]
pub struct ApiDoc;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("invalid request body: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("invalid query string: {}", err)).into()
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Routes and extractor settings shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .route("/health", web::get().to(health))
        .service(
            web::scope("/orders")
                .route("", web::post().to(orders::create_order))
                .route("", web::get().to(orders::list_orders))
                .route(
                    "/by-number/{order_number}",
                    web::get().to(orders::get_order_by_number),
                )
                .route("/{id}", web::get().to(orders::get_order))
                .route("/{id}", web::delete().to(orders::delete_order))
                .route("/{id}/status", web::post().to(orders::update_status))
                .route("/{id}/items", web::put().to(orders::replace_items)),
        );
}
