use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    self, LineItem, ListQuery, ListResult, NewOrder, Order, StatusChange, SubmitOrder,
};
use crate::domain::ports::OrderRepository;
use crate::domain::pricing;
use crate::domain::status::OrderStatus;

const MAX_PAGE_SIZE: i64 = 100;

/// Knobs fixed at startup. The tax rate is copied onto every new order, so
/// changing it never touches historical totals.
#[derive(Debug, Clone)]
pub struct OrderSettings {
    pub tax_rate: BigDecimal,
    pub submit_attempts: u32,
    pub store_offset: FixedOffset,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            tax_rate: BigDecimal::new(15.into(), 2),
            submit_attempts: 3,
            store_offset: Utc.fix(),
        }
    }
}

/// The service as wired into the HTTP layer.
pub type DynOrderService = OrderService<Arc<dyn OrderRepository>>;

pub struct OrderService<R> {
    repo: R,
    settings: OrderSettings,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R, settings: OrderSettings) -> Self {
        Self { repo, settings }
    }

    pub fn settings(&self) -> &OrderSettings {
        &self.settings
    }

    /// Store-local calendar date used to scope order numbers.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.settings.store_offset).date_naive()
    }

    pub fn submit_order(&self, cmd: SubmitOrder) -> Result<Order, DomainError> {
        let customer = cmd.customer.filter(|c| !c.is_empty());
        if let Some(customer) = &customer {
            customer.validate()?;
        }
        let table_label = cmd
            .table_label
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(label) = &table_label {
            order::check_length("table number", label, order::TABLE_LABEL_MAX)?;
        }
        let totals = pricing::calculate_with_discount(
            &cmd.items,
            &self.settings.tax_rate,
            &cmd.discount_amount,
        )?;

        let new_order = NewOrder {
            order_date: self.today(),
            staff_id: cmd.staff_id,
            customer,
            order_type: cmd.order_type,
            table_label,
            payment_method: cmd.payment_method,
            payment_status: cmd.payment_method.status_at_submission(),
            notes: cmd.notes.trim().to_string(),
            tax_rate: self.settings.tax_rate.clone(),
            totals,
            items: cmd.items,
        };

        let attempts = self.settings.submit_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.repo.create(new_order.clone()) {
                Ok(order) => {
                    log::info!(
                        "Order {} submitted by {}: {} item(s), total {}",
                        order.order_number,
                        order.staff_id,
                        order.items.len(),
                        order.total_amount
                    );
                    return Ok(order);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    log::warn!(
                        "Order number collision on attempt {}/{}: {}; re-allocating",
                        attempt,
                        attempts,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    log::error!("Order submission failed after {} attempt(s): {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    pub fn get_order_by_number(&self, order_number: &str) -> Result<Order, DomainError> {
        self.repo
            .find_by_number(order_number.trim())?
            .ok_or(DomainError::NotFound)
    }

    pub fn list_orders(
        &self,
        page: i64,
        limit: i64,
        status: Option<OrderStatus>,
    ) -> Result<ListResult, DomainError> {
        self.repo.list(&ListQuery {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            status,
        })
    }

    pub fn change_status(&self, id: Uuid, next: OrderStatus) -> Result<StatusChange, DomainError> {
        let change = self.repo.update_status(id, next)?;
        log::info!(
            "Order {} moved from {} to {}",
            change.order_number,
            change.from,
            change.to
        );
        Ok(change)
    }

    /// Admin edit path: replace every item and recompute the totals.
    pub fn replace_items(
        &self,
        id: Uuid,
        items: Vec<LineItem>,
        discount: BigDecimal,
    ) -> Result<Order, DomainError> {
        pricing::validate_items(&items)?;
        let order = self.repo.replace_items(id, items, discount)?;
        log::info!(
            "Order {} items replaced: {} item(s), total {}",
            order.order_number,
            order.items.len(),
            order.total_amount
        );
        Ok(order)
    }

    pub fn delete_order(&self, id: Uuid) -> Result<String, DomainError> {
        let order_number = self.repo.delete(id)?;
        log::info!("Order {} deleted", order_number);
        Ok(order_number)
    }
}
