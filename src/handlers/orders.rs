use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::DynOrderService;
use crate::domain::errors::DomainError;
use crate::domain::order::{CustomerInfo, LineItem, Order, OrderItem, SubmitOrder};
use crate::domain::pricing;
use crate::domain::status::OrderStatus;
use crate::errors::{AppError, ErrorResponse};

use super::context::StaffContext;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct LineItemRequest {
    /// Menu item id
    pub id: i64,
    pub name: String,
    /// Unit price as a JSON number or a decimal string, e.g. 450 or "9.99"
    #[schema(value_type = String, example = "450.00")]
    pub price: Value,
    pub quantity: i32,
    #[serde(default)]
    pub size_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CustomerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitOrderRequest {
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub customer: Option<CustomerRequest>,
    /// dine_in, takeaway or delivery
    pub order_type: String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub table_number: Option<Value>,
    /// cash, card or mobile
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceItemsRequest {
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub staff_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub order_type: String,
    pub table_number: Option<String>,
    pub subtotal: String,
    pub tax_rate: String,
    pub tax_amount: String,
    pub discount_amount: String,
    pub total_amount: String,
    pub payment_method: String,
    pub payment_status: String,
    pub status: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitOrderResponse {
    pub success: bool,
    pub order: OrderResponse,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderEnvelope {
    pub success: bool,
    pub order: OrderResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    pub success: bool,
    pub order_number: String,
    pub old_status: String,
    pub new_status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteOrderResponse {
    pub success: bool,
    pub order_number: String,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Only orders in this lifecycle status.
    #[serde(default)]
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub success: bool,
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Conversions ──────────────────────────────────────────────────────────────

fn decimal_from_json(value: &Value, field: &str) -> Result<BigDecimal, DomainError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(DomainError::validation(format!(
                "{} must be a number, got {}",
                field, other
            )))
        }
    };
    BigDecimal::from_str(&text)
        .map_err(|e| DomainError::validation(format!("{} '{}' is not a decimal: {}", field, text, e)))
}

fn label_from_json(value: Option<Value>) -> Result<Option<String>, DomainError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(DomainError::validation(format!(
            "table_number must be a string or number, got {}",
            other
        ))),
    }
}

fn discount_from_json(value: Option<Value>) -> Result<BigDecimal, DomainError> {
    match value {
        None | Some(Value::Null) => Ok(BigDecimal::zero()),
        Some(v) => decimal_from_json(&v, "discount_amount"),
    }
}

fn line_items(items: Vec<LineItemRequest>) -> Result<Vec<LineItem>, DomainError> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            Ok(LineItem {
                unit_price: decimal_from_json(&item.price, &format!("items[{}].price", idx))?,
                product_id: item.id,
                name: item.name,
                quantity: item.quantity,
                size_name: item.size_name,
                notes: item.notes,
            })
        })
        .collect()
}

impl SubmitOrderRequest {
    pub fn into_command(self, staff_id: Uuid) -> Result<SubmitOrder, DomainError> {
        Ok(SubmitOrder {
            items: line_items(self.items)?,
            customer: self.customer.map(|c| CustomerInfo {
                name: c.name,
                contact: c.contact,
                email: c.email,
            }),
            order_type: self.order_type.parse()?,
            table_label: label_from_json(self.table_number)?,
            payment_method: self.payment_method.parse()?,
            notes: self.notes.unwrap_or_default(),
            staff_id,
            discount_amount: discount_from_json(self.discount_amount)?,
        })
    }
}

/// Cents for money; unit prices keep sub-cent digits only when they have them.
fn price_string(price: &BigDecimal) -> String {
    let cents = price.with_scale(2);
    if cents == *price {
        cents.to_string()
    } else {
        price.with_scale(pricing::PRICE_SCALE).to_string()
    }
}

fn money_string(amount: &BigDecimal) -> String {
    pricing::round_money(amount).to_string()
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            id: item.id,
            product_id: item.product_id,
            name: item.name,
            quantity: item.quantity,
            unit_price: price_string(&item.unit_price),
            line_total: money_string(&item.line_total),
            notes: item.notes,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            order_number: o.order_number,
            staff_id: o.staff_id,
            customer_id: o.customer_id,
            order_type: o.order_type.to_string(),
            table_number: o.table_label,
            subtotal: money_string(&o.subtotal),
            tax_rate: o.tax_rate.with_scale(4).to_string(),
            tax_amount: money_string(&o.tax_amount),
            discount_amount: money_string(&o.discount_amount),
            total_amount: money_string(&o.total_amount),
            payment_method: o.payment_method.to_string(),
            payment_status: o.payment_status.to_string(),
            status: o.status.to_string(),
            notes: o.notes,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Prices the cart, allocates the day's next order number and writes the
/// order with its items in one transaction. A failed submission leaves
/// nothing behind, so the same payload can be resubmitted safely.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = SubmitOrderRequest,
    params(
        ("X-Staff-Id" = Uuid, Header, description = "Authenticated staff member"),
    ),
    responses(
        (status = 200, description = "Order submitted", body = SubmitOrderResponse),
        (status = 500, description = "Order was not saved; message says why", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<DynOrderService>,
    staff: Result<StaffContext, AppError>,
    body: Result<web::Json<SubmitOrderRequest>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    submit(service, staff, body)
        .await
        .map_err(AppError::into_submission_failure)
}

async fn submit(
    service: web::Data<DynOrderService>,
    staff: Result<StaffContext, AppError>,
    body: Result<web::Json<SubmitOrderRequest>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    let staff = staff?;
    let body = body.map_err(|e| AppError::BadRequest(e.to_string()))?;
    let cmd = body.into_inner().into_command(staff.staff_id)?;

    let order = web::block(move || service.submit_order(cmd)).await??;

    Ok(HttpResponse::Ok().json(SubmitOrderResponse {
        success: true,
        order_id: order.id,
        order: order.into(),
    }))
}

/// GET /orders/{id}
///
/// Returns the order together with its items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderEnvelope),
        (status = 404, description = "Order not found", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<DynOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id)).await??;

    Ok(HttpResponse::Ok().json(OrderEnvelope {
        success: true,
        order: order.into(),
    }))
}

/// GET /orders/by-number/{order_number}
#[utoipa::path(
    get,
    path = "/orders/by-number/{order_number}",
    params(
        ("order_number" = String, Path, description = "e.g. ORD202405170007"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderEnvelope),
        (status = 404, description = "Order not found", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn get_order_by_number(
    service: web::Data<DynOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();

    let order = web::block(move || service.get_order_by_number(&order_number)).await??;

    Ok(HttpResponse::Ok().json(OrderEnvelope {
        success: true,
        order: order.into(),
    }))
}

/// GET /orders
///
/// Returns a paginated list of orders (without their items), newest first.
/// Use `page` (1-based) and `limit` to control pagination.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("status" = Option<String>, Query, description = "Lifecycle status filter"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<DynOrderService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(OrderStatus::from_str)
        .transpose()?;
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || service.list_orders(page, limit, status)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        success: true,
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// POST /orders/{id}/status
///
/// Moves the order along `pending → preparing → ready → completed`, or to
/// `cancelled` from any open state.
#[utoipa::path(
    post,
    path = "/orders/{id}/status",
    request_body = StatusRequest,
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-Staff-Id" = Uuid, Header, description = "Authenticated staff member"),
    ),
    responses(
        (status = 200, description = "Status changed", body = StatusChangeResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn update_status(
    service: web::Data<DynOrderService>,
    staff: StaffContext,
    path: web::Path<Uuid>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let next: OrderStatus = body.status.parse()?;
    log::debug!("Staff {} requests {} -> {}", staff.staff_id, order_id, next);

    let change = web::block(move || service.change_status(order_id, next)).await??;

    Ok(HttpResponse::Ok().json(StatusChangeResponse {
        success: true,
        order_number: change.order_number,
        old_status: change.from.to_string(),
        new_status: change.to.to_string(),
    }))
}

/// PUT /orders/{id}/items
///
/// Admin edit: replaces every item of an open order and recomputes its
/// totals with the tax rate captured when it was created.
#[utoipa::path(
    put,
    path = "/orders/{id}/items",
    request_body = ReplaceItemsRequest,
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-Staff-Id" = Uuid, Header, description = "Authenticated staff member"),
        ("X-Staff-Role" = String, Header, description = "Must be admin"),
    ),
    responses(
        (status = 200, description = "Items replaced", body = OrderEnvelope),
        (status = 400, description = "Invalid items or closed order", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn replace_items(
    service: web::Data<DynOrderService>,
    staff: StaffContext,
    path: web::Path<Uuid>,
    body: web::Json<ReplaceItemsRequest>,
) -> Result<HttpResponse, AppError> {
    staff.require_admin()?;
    let order_id = path.into_inner();
    let body = body.into_inner();
    let items = line_items(body.items)?;
    let discount = discount_from_json(body.discount_amount)?;

    let order = web::block(move || service.replace_items(order_id, items, discount)).await??;

    Ok(HttpResponse::Ok().json(OrderEnvelope {
        success: true,
        order: order.into(),
    }))
}

/// DELETE /orders/{id}
///
/// Removes the order and its items in one transaction.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("X-Staff-Id" = Uuid, Header, description = "Authenticated staff member"),
        ("X-Staff-Role" = String, Header, description = "Must be admin"),
    ),
    responses(
        (status = 200, description = "Order deleted", body = DeleteOrderResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<DynOrderService>,
    staff: StaffContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    staff.require_admin()?;
    let order_id = path.into_inner();

    let order_number = web::block(move || service.delete_order(order_id)).await??;
    log::debug!("Order {} deleted by {}", order_number, staff.staff_id);

    Ok(HttpResponse::Ok().json(DeleteOrderResponse {
        success: true,
        order_number,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
    use serde_json::json;

    use super::*;
    use crate::application::in_memory::InMemoryOrderRepository;
    use crate::application::order_service::{OrderService, OrderSettings};
    use crate::domain::ports::OrderRepository;
    use crate::handlers::configure;
    use crate::handlers::context::{STAFF_ID_HEADER, STAFF_ROLE_HEADER};

    fn service(repo: Arc<InMemoryOrderRepository>) -> web::Data<DynOrderService> {
        let repo: Arc<dyn OrderRepository> = repo;
        web::Data::new(OrderService::new(repo, OrderSettings::default()))
    }

    fn cart() -> Value {
        json!({
            "items": [
                { "id": 1, "name": "Chicken Karahi", "price": 450, "quantity": 2, "size_name": "Full" },
                { "id": 2, "name": "Naan", "price": "150.00", "quantity": 1, "notes": "well done" }
            ],
            "customer": { "name": "Sana", "contact": "0300-7654321", "email": "" },
            "order_type": "dine-in",
            "table_number": 7,
            "payment_method": "cash",
            "notes": "birthday"
        })
    }

    macro_rules! app {
        ($data:expr) => {
            actix_test::init_service(App::new().app_data($data.clone()).configure(configure)).await
        };
    }

    fn staff() -> (&'static str, String) {
        (STAFF_ID_HEADER, Uuid::new_v4().to_string())
    }

    #[test]
    fn decimals_accept_numbers_and_strings() {
        assert_eq!(
            decimal_from_json(&json!(4.5), "price").unwrap(),
            BigDecimal::from_str("4.5").unwrap()
        );
        assert_eq!(
            decimal_from_json(&json!(" 9.99 "), "price").unwrap(),
            BigDecimal::from_str("9.99").unwrap()
        );
        assert!(decimal_from_json(&json!(true), "price").is_err());
        assert!(decimal_from_json(&json!("ten"), "price").is_err());
    }

    #[test]
    fn unit_prices_render_with_cents_unless_finer() {
        assert_eq!(price_string(&BigDecimal::from_str("450.0000").unwrap()), "450.00");
        assert_eq!(price_string(&BigDecimal::from_str("0.335").unwrap()), "0.3350");
    }

    #[actix_web::test]
    async fn submit_returns_the_hydrated_order() {
        let repo = Arc::new(InMemoryOrderRepository::default());
        let data = service(repo.clone());
        let app = app!(data);

        let req = actix_test::TestRequest::post()
            .uri("/orders")
            .insert_header(staff())
            .set_json(cart())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["order_id"], body["order"]["id"]);
        let order = &body["order"];
        assert_eq!(order["subtotal"], "1050.00");
        assert_eq!(order["tax_amount"], "157.50");
        assert_eq!(order["discount_amount"], "0.00");
        assert_eq!(order["total_amount"], "1207.50");
        assert_eq!(order["tax_rate"], "0.1500");
        assert_eq!(order["order_type"], "dine_in");
        assert_eq!(order["table_number"], "7");
        assert_eq!(order["status"], "pending");
        assert_eq!(order["payment_status"], "paid");
        assert_eq!(order["items"][0]["name"], "Chicken Karahi (Full)");
        assert_eq!(order["items"][0]["line_total"], "900.00");
        assert_eq!(order["items"][1]["notes"], "well done");
        assert!(order["order_number"].as_str().unwrap().starts_with("ORD"));
        assert_eq!(repo.order_count(), 1);
    }

    #[actix_web::test]
    async fn empty_cart_is_rejected_without_writing() {
        let repo = Arc::new(InMemoryOrderRepository::default());
        let data = service(repo.clone());
        let app = app!(data);
        let mut payload = cart();
        payload["items"] = json!([]);

        let req = actix_test::TestRequest::post()
            .uri("/orders")
            .insert_header(staff())
            .set_json(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "order must contain at least one item");
        assert_eq!(repo.create_calls(), 0);
    }

    #[actix_web::test]
    async fn unknown_payment_method_fails_the_submission() {
        let data = service(Arc::new(InMemoryOrderRepository::default()));
        let app = app!(data);
        let mut payload = cart();
        payload["payment_method"] = json!("voucher");

        let req = actix_test::TestRequest::post()
            .uri("/orders")
            .insert_header(staff())
            .set_json(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().contains("voucher"));
    }

    #[actix_web::test]
    async fn malformed_body_uses_the_error_envelope() {
        let data = service(Arc::new(InMemoryOrderRepository::default()));
        let app = app!(data);

        let req = actix_test::TestRequest::post()
            .uri("/orders")
            .insert_header(staff())
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"items\": 3}")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn submit_without_staff_identity_is_refused() {
        let repo = Arc::new(InMemoryOrderRepository::default());
        let data = service(repo.clone());
        let app = app!(data);

        let req = actix_test::TestRequest::post().uri("/orders").set_json(cart()).to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["message"], "X-Staff-Id header is required");
        assert_eq!(repo.create_calls(), 0);
    }

    #[actix_web::test]
    async fn oversized_table_label_never_reaches_the_store() {
        let repo = Arc::new(InMemoryOrderRepository::default());
        let data = service(repo.clone());
        let app = app!(data);
        let mut payload = cart();
        payload["table_number"] = json!("Patio corner table by the window 12");

        let req = actix_test::TestRequest::post()
            .uri("/orders")
            .insert_header(staff())
            .set_json(payload)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().starts_with("table number is 35 characters"));
        assert_eq!(repo.create_calls(), 0);
    }

    #[actix_web::test]
    async fn store_failure_is_a_500_with_a_generic_message() {
        let repo = Arc::new(InMemoryOrderRepository::default());
        repo.fail_next_create_with_persistence();
        let data = service(repo.clone());
        let app = app!(data);

        let req = actix_test::TestRequest::post()
            .uri("/orders")
            .insert_header(staff())
            .set_json(cart())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(!body["message"].as_str().unwrap().contains("connection reset"));
        assert_eq!(repo.order_count(), 0);
    }

    #[actix_web::test]
    async fn status_endpoint_reports_old_and_new_status() {
        let data = service(Arc::new(InMemoryOrderRepository::default()));
        let app = app!(data);
        let order = data
            .submit_order(
                serde_json::from_value::<SubmitOrderRequest>(cart())
                    .unwrap()
                    .into_command(Uuid::new_v4())
                    .unwrap(),
            )
            .unwrap();

        let req = actix_test::TestRequest::post()
            .uri(&format!("/orders/{}/status", order.id))
            .insert_header(staff())
            .set_json(json!({ "status": "preparing" }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["old_status"], "pending");
        assert_eq!(body["new_status"], "preparing");
        assert_eq!(body["order_number"], order.order_number.as_str());

        let req = actix_test::TestRequest::post()
            .uri(&format!("/orders/{}/status", order.id))
            .insert_header(staff())
            .set_json(json!({ "status": "pending" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn delete_is_restricted_to_admins() {
        let data = service(Arc::new(InMemoryOrderRepository::default()));
        let app = app!(data);
        let order = data
            .submit_order(
                serde_json::from_value::<SubmitOrderRequest>(cart())
                    .unwrap()
                    .into_command(Uuid::new_v4())
                    .unwrap(),
            )
            .unwrap();

        let req = actix_test::TestRequest::delete()
            .uri(&format!("/orders/{}", order.id))
            .insert_header(staff())
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = actix_test::TestRequest::delete()
            .uri(&format!("/orders/{}", order.id))
            .insert_header(staff())
            .insert_header((STAFF_ROLE_HEADER, "admin"))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["order_number"], order.order_number.as_str());

        let req = actix_test::TestRequest::get()
            .uri(&format!("/orders/{}", order.id))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn replace_items_recomputes_totals() {
        let data = service(Arc::new(InMemoryOrderRepository::default()));
        let app = app!(data);
        let order = data
            .submit_order(
                serde_json::from_value::<SubmitOrderRequest>(cart())
                    .unwrap()
                    .into_command(Uuid::new_v4())
                    .unwrap(),
            )
            .unwrap();

        let req = actix_test::TestRequest::put()
            .uri(&format!("/orders/{}/items", order.id))
            .insert_header(staff())
            .insert_header((STAFF_ROLE_HEADER, "admin"))
            .set_json(json!({
                "items": [{ "id": 3, "name": "Lassi", "price": "120", "quantity": 3 }],
                "discount_amount": 10
            }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["order"]["subtotal"], "360.00");
        assert_eq!(body["order"]["tax_amount"], "54.00");
        assert_eq!(body["order"]["discount_amount"], "10.00");
        assert_eq!(body["order"]["total_amount"], "404.00");
        assert_eq!(body["order"]["items"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn orders_can_be_fetched_and_listed() {
        let data = service(Arc::new(InMemoryOrderRepository::default()));
        let app = app!(data);
        let mut numbers = vec![];
        for _ in 0..3 {
            let req = actix_test::TestRequest::post()
                .uri("/orders")
                .insert_header(staff())
                .set_json(cart())
                .to_request();
            let body: Value = actix_test::call_and_read_body_json(&app, req).await;
            numbers.push(body["order"]["order_number"].as_str().unwrap().to_string());
        }

        let req = actix_test::TestRequest::get()
            .uri(&format!("/orders/by-number/{}", numbers[1]))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["order"]["order_number"], numbers[1].as_str());

        let req = actix_test::TestRequest::get()
            .uri("/orders?page=1&limit=2&status=pending")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 3);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["items"][0]["order_number"], numbers[2].as_str());

        let req = actix_test::TestRequest::get().uri("/orders?status=served").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
