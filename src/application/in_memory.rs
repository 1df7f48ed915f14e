//! Test double for [`OrderRepository`] that keeps everything in a `Vec`.

use std::collections::HashMap;
use std::sync::Mutex;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    LineItem, ListQuery, ListResult, NewOrder, Order, OrderItem, StatusChange,
};
use crate::domain::order_number::OrderNumber;
use crate::domain::ports::OrderRepository;
use crate::domain::pricing;
use crate::domain::status::OrderStatus;

enum Injected {
    Duplicate,
    Persistence,
}

#[derive(Default)]
struct State {
    orders: Vec<Order>,
    sequences: HashMap<NaiveDate, i32>,
    failures: Vec<Injected>,
    create_calls: usize,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    state: Mutex<State>,
}

impl InMemoryOrderRepository {
    pub fn fail_next_creates_with_duplicate(&self, n: usize) {
        let mut state = self.state.lock().unwrap();
        state.failures.extend((0..n).map(|_| Injected::Duplicate));
    }

    pub fn fail_next_create_with_persistence(&self) {
        self.state.lock().unwrap().failures.push(Injected::Persistence);
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }
}

fn to_items(items: &[LineItem]) -> Vec<OrderItem> {
    items
        .iter()
        .map(|i| OrderItem {
            id: Uuid::new_v4(),
            product_id: i.product_id,
            name: i.display_name(),
            quantity: i.quantity,
            unit_price: i.unit_price.clone(),
            line_total: i.line_total(),
            notes: i.notes.clone(),
        })
        .collect()
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, new_order: NewOrder) -> Result<Order, DomainError> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;

        let next = state.sequences.get(&new_order.order_date).copied().unwrap_or(0) + 1;
        let number = OrderNumber::new(new_order.order_date, next)?.to_string();
        if !state.failures.is_empty() {
            return Err(match state.failures.remove(0) {
                Injected::Duplicate => DomainError::DuplicateOrderNumber(number),
                Injected::Persistence => DomainError::Persistence("connection reset".to_string()),
            });
        }
        state.sequences.insert(new_order.order_date, next);

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            order_number: number,
            staff_id: new_order.staff_id,
            customer_id: new_order.customer.as_ref().map(|_| Uuid::new_v4()),
            order_type: new_order.order_type,
            table_label: new_order.table_label,
            subtotal: new_order.totals.subtotal,
            tax_rate: new_order.tax_rate,
            tax_amount: new_order.totals.tax_amount,
            discount_amount: new_order.totals.discount_amount,
            total_amount: new_order.totals.total_amount,
            payment_method: new_order.payment_method,
            payment_status: new_order.payment_status,
            status: OrderStatus::Pending,
            notes: new_order.notes,
            created_at: now,
            updated_at: now,
            items: to_items(&new_order.items),
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    fn list(&self, query: &ListQuery) -> Result<ListResult, DomainError> {
        let state = self.state.lock().unwrap();
        let matching: Vec<&Order> = state
            .orders
            .iter()
            .rev()
            .filter(|o| query.status.map_or(true, |s| o.status == s))
            .collect();
        Ok(ListResult {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(((query.page - 1) * query.limit) as usize)
                .take(query.limit as usize)
                .map(|o| Order {
                    items: vec![],
                    ..o.clone()
                })
                .collect(),
        })
    }

    fn update_status(&self, id: Uuid, next: OrderStatus) -> Result<StatusChange, DomainError> {
        let mut state = self.state.lock().unwrap();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;
        let from = order.status;
        order.status = from.transition(next)?;
        order.updated_at = Utc::now();
        Ok(StatusChange {
            order_id: id,
            order_number: order.order_number.clone(),
            from,
            to: next,
            updated_at: order.updated_at,
        })
    }

    fn replace_items(
        &self,
        id: Uuid,
        items: Vec<LineItem>,
        discount: BigDecimal,
    ) -> Result<Order, DomainError> {
        let mut state = self.state.lock().unwrap();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;
        if order.status.is_terminal() {
            return Err(DomainError::validation("order is closed"));
        }
        let totals = pricing::calculate_with_discount(&items, &order.tax_rate, &discount)?;
        order.items = to_items(&items);
        order.subtotal = totals.subtotal;
        order.tax_amount = totals.tax_amount;
        order.discount_amount = totals.discount_amount;
        order.total_amount = totals.total_amount;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    fn delete(&self, id: Uuid) -> Result<String, DomainError> {
        let mut state = self.state.lock().unwrap();
        let idx = state
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or(DomainError::NotFound)?;
        Ok(state.orders.remove(idx).order_number)
    }
}
