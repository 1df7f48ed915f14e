use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::PgConnection;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{LineItem, ListQuery, ListResult, NewOrder, Order, StatusChange};
use crate::domain::ports::OrderRepository;
use crate::domain::pricing;
use crate::domain::status::OrderStatus;
use crate::schema::{order_items, orders};

use super::customer_resolver::resolve_customer;
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};
use super::order_number::allocate;

const ORDER_NUMBER_CONSTRAINT: &str = "orders_order_number_key";
const STATUS_UPDATE_ATTEMPTS: usize = 3;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if info.constraint_name() == Some(ORDER_NUMBER_CONSTRAINT) =>
            {
                DomainError::DuplicateOrderNumber(
                    info.details().unwrap_or(info.message()).to_string(),
                )
            }
            DieselError::NotFound => DomainError::NotFound,
            other => DomainError::Persistence(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn item_rows(order_id: Uuid, items: &[LineItem]) -> Vec<NewOrderItemRow> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| NewOrderItemRow {
            id: Uuid::new_v4(),
            order_id,
            position: position as i32,
            product_id: item.product_id,
            name: item.display_name(),
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            line_total: item.line_total(),
            notes: item
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
        .collect()
}

fn load_items(conn: &mut PgConnection, order_id: Uuid) -> Result<Vec<OrderItemRow>, DomainError> {
    Ok(order_items::table
        .filter(order_items::order_id.eq(order_id))
        .order(order_items::position.asc())
        .select(OrderItemRow::as_select())
        .load(conn)?)
}

fn hydrate(conn: &mut PgConnection, row: Option<OrderRow>) -> Result<Option<Order>, DomainError> {
    let Some(row) = row else {
        return Ok(None);
    };
    let items = load_items(conn, row.id)?;
    row.into_order(items).map(Some)
}

/// Multi-statement reads see one snapshot, so a header never pairs with
/// items from a later edit.
fn read_snapshot<T, F>(conn: &mut PgConnection, f: F) -> Result<T, DomainError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, DomainError>,
{
    conn.build_transaction().read_only().repeatable_read().run(f)
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, new_order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Customer context (may insert a customer row)
            let customer_id = resolve_customer(conn, new_order.customer.as_ref())?;

            // 2. Order number, locked until commit
            let order_number = allocate(conn, new_order.order_date)?;

            // 3. Header
            let order_id = Uuid::new_v4();
            let totals = &new_order.totals;
            let header: OrderRow = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    order_number: order_number.to_string(),
                    staff_id: new_order.staff_id,
                    customer_id,
                    order_type: new_order.order_type.as_str().to_string(),
                    table_label: new_order.table_label.clone(),
                    subtotal: totals.subtotal.clone(),
                    tax_rate: new_order.tax_rate.clone(),
                    tax_amount: totals.tax_amount.clone(),
                    discount_amount: totals.discount_amount.clone(),
                    total_amount: totals.total_amount.clone(),
                    payment_method: new_order.payment_method.as_str().to_string(),
                    payment_status: new_order.payment_status.as_str().to_string(),
                    status: OrderStatus::Pending.as_str().to_string(),
                    notes: new_order.notes.clone(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 4. Item snapshots
            let items: Vec<OrderItemRow> = diesel::insert_into(order_items::table)
                .values(&item_rows(order_id, &new_order.items))
                .returning(OrderItemRow::as_returning())
                .get_results(conn)?;

            header.into_order(items)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        read_snapshot(&mut conn, |conn| {
            let order = orders::table
                .filter(orders::id.eq(id))
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?;

            hydrate(conn, order)
        })
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        read_snapshot(&mut conn, |conn| {
            let order = orders::table
                .filter(orders::order_number.eq(order_number))
                .select(OrderRow::as_select())
                .first(conn)
                .optional()?;

            hydrate(conn, order)
        })
    }

    fn list(&self, query: &ListQuery) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = (query.page - 1) * query.limit;
        read_snapshot(&mut conn, |conn| {
            let mut count = orders::table.count().into_boxed();
            let mut rows = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::order_number.desc()))
                .limit(query.limit)
                .offset(offset)
                .into_boxed();
            if let Some(status) = query.status {
                count = count.filter(orders::status.eq(status.as_str()));
                rows = rows.filter(orders::status.eq(status.as_str()));
            }

            let total: i64 = count.get_result(conn)?;
            let items = rows
                .load::<OrderRow>(conn)?
                .into_iter()
                .map(|row| row.into_order(vec![]))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ListResult { items, total })
        })
    }

    /// Compare-and-set on the status column; no explicit transaction.
    fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<StatusChange, DomainError> {
        let mut conn = self.pool.get()?;

        for _ in 0..STATUS_UPDATE_ATTEMPTS {
            let current: String = orders::table
                .find(id)
                .select(orders::status)
                .first(&mut conn)
                .optional()?
                .ok_or(DomainError::NotFound)?;
            let from: OrderStatus = current
                .parse()
                .map_err(|_| DomainError::Persistence(format!("order {} has status '{}'", id, current)))?;
            let to = from.transition(next)?;

            let updated: Option<(String, chrono::DateTime<Utc>)> = diesel::update(
                orders::table
                    .filter(orders::id.eq(id))
                    .filter(orders::status.eq(from.as_str())),
            )
            .set((
                orders::status.eq(to.as_str()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning((orders::order_number, orders::updated_at))
            .get_result(&mut conn)
            .optional()?;

            if let Some((order_number, updated_at)) = updated {
                return Ok(StatusChange {
                    order_id: id,
                    order_number,
                    from,
                    to,
                    updated_at,
                });
            }
            log::debug!("Order {} changed status concurrently, re-reading", id);
        }

        Err(DomainError::Persistence(format!(
            "order {} kept changing status, giving up",
            id
        )))
    }

    fn replace_items(
        &self,
        id: Uuid,
        items: Vec<LineItem>,
        discount: BigDecimal,
    ) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row: OrderRow = orders::table
                .find(id)
                .select(OrderRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound)?;

            let status: OrderStatus = row
                .status
                .parse()
                .map_err(|_| DomainError::Persistence(format!("order {} has status '{}'", id, row.status)))?;
            if status.is_terminal() {
                return Err(DomainError::validation(format!(
                    "order {} is {} and can no longer be edited",
                    row.order_number, status
                )));
            }

            // Reprice with the rate frozen at creation, never the live setting.
            let totals = pricing::calculate_with_discount(&items, &row.tax_rate, &discount)?;

            diesel::delete(order_items::table.filter(order_items::order_id.eq(id))).execute(conn)?;
            let new_items: Vec<OrderItemRow> = diesel::insert_into(order_items::table)
                .values(&item_rows(id, &items))
                .returning(OrderItemRow::as_returning())
                .get_results(conn)?;

            let header: OrderRow = diesel::update(orders::table.find(id))
                .set((
                    orders::subtotal.eq(totals.subtotal),
                    orders::tax_amount.eq(totals.tax_amount),
                    orders::discount_amount.eq(totals.discount_amount),
                    orders::total_amount.eq(totals.total_amount),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            header.into_order(new_items)
        })
    }

    fn delete(&self, id: Uuid) -> Result<String, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order_number: String = orders::table
                .find(id)
                .select(orders::order_number)
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound)?;

            // Items first, then the header.
            diesel::delete(order_items::table.filter(order_items::order_id.eq(id))).execute(conn)?;
            diesel::delete(orders::table.find(id)).execute(conn)?;

            Ok(order_number)
        })
    }
}
