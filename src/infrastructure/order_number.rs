//! Per-day order number allocation.
//!
//! The counter row for the date is bumped with an upsert, which takes a row
//! lock held until the surrounding transaction ends. Concurrent submissions for
//! the same day therefore queue on that row, and a rolled-back submission gives
//! its number back.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::PgConnection;

use crate::domain::errors::DomainError;
use crate::domain::order_number::{OrderNumber, MAX_SEQUENCE};
use crate::schema::{order_sequences, orders};

/// Must run inside the transaction that inserts the order.
pub fn allocate(conn: &mut PgConnection, date: NaiveDate) -> Result<OrderNumber, DomainError> {
    let mut next: i32 = diesel::insert_into(order_sequences::table)
        .values((
            order_sequences::sequence_date.eq(date),
            order_sequences::last_value.eq(1),
        ))
        .on_conflict(order_sequences::sequence_date)
        .do_update()
        .set(order_sequences::last_value.eq(order_sequences::last_value + 1))
        .returning(order_sequences::last_value)
        .get_result(conn)?;

    // Orders written without the counter (imports, restored dumps) would
    // otherwise collide on every retry; skip past them while holding the lock.
    if let Some(highest) = highest_issued(conn, date)? {
        if highest >= next {
            next = highest + 1;
            diesel::update(order_sequences::table.find(date))
                .set(order_sequences::last_value.eq(next))
                .execute(conn)?;
        }
    }

    if next > MAX_SEQUENCE {
        return Err(DomainError::Persistence(format!(
            "order numbers for {} are exhausted",
            date
        )));
    }
    OrderNumber::new(date, next)
}

fn highest_issued(conn: &mut PgConnection, date: NaiveDate) -> Result<Option<i32>, DomainError> {
    let prefix = OrderNumber::date_prefix(date);
    let latest: Option<String> = orders::table
        .filter(orders::order_number.like(format!("{}%", prefix)))
        .select(orders::order_number)
        .order(orders::order_number.desc())
        .first(conn)
        .optional()?;

    Ok(latest
        .as_deref()
        .and_then(|n| OrderNumber::parse(n).ok())
        .map(|n| n.sequence()))
}
