use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{LineItem, ListQuery, ListResult, NewOrder, Order, StatusChange};
use super::status::OrderStatus;

pub trait OrderRepository: Send + Sync + 'static {
    /// Resolve the customer, allocate a number and write the header and items
    /// as one unit. Nothing survives a failure.
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError>;
    fn list(&self, query: &ListQuery) -> Result<ListResult, DomainError>;
    fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<StatusChange, DomainError>;
    /// Swap every item of an open order and reprice it with its frozen tax rate.
    fn replace_items(
        &self,
        id: Uuid,
        items: Vec<LineItem>,
        discount: BigDecimal,
    ) -> Result<Order, DomainError>;
    /// Returns the order number of the removed order.
    fn delete(&self, id: Uuid) -> Result<String, DomainError>;
}

impl<R: OrderRepository + ?Sized> OrderRepository for Arc<R> {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        (**self).create(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        (**self).find_by_id(id)
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError> {
        (**self).find_by_number(order_number)
    }

    fn list(&self, query: &ListQuery) -> Result<ListResult, DomainError> {
        (**self).list(query)
    }

    fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<StatusChange, DomainError> {
        (**self).update_status(id, next)
    }

    fn replace_items(
        &self,
        id: Uuid,
        items: Vec<LineItem>,
        discount: BigDecimal,
    ) -> Result<Order, DomainError> {
        (**self).replace_items(id, items, discount)
    }

    fn delete(&self, id: Uuid) -> Result<String, DomainError> {
        (**self).delete(id)
    }
}
