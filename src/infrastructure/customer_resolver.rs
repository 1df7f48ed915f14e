use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::CustomerInfo;
use crate::schema::customers;

use super::models::{CustomerRow, NewCustomerRow};

/// Find-or-create a customer by `(name, contact)`.
///
/// Customers are a weak association: when several rows match, the most
/// recently created one wins. A customer known only by email is matched on
/// that email among rows with no name or contact. Returns `None` for walk-ins.
pub fn resolve_customer(
    conn: &mut PgConnection,
    info: Option<&CustomerInfo>,
) -> Result<Option<Uuid>, DomainError> {
    let Some(info) = info.filter(|i| !i.is_empty()) else {
        return Ok(None);
    };
    let email_only = info.name().is_empty() && info.contact().is_empty();

    let mut lookup = customers::table
        .filter(customers::name.eq(info.name()))
        .filter(customers::contact.eq(info.contact()))
        .order((customers::created_at.desc(), customers::id.desc()))
        .select(CustomerRow::as_select())
        .into_boxed();
    if email_only {
        lookup = lookup.filter(customers::email.eq(info.email()));
    }
    let existing: Option<CustomerRow> = lookup.first(conn).optional()?;

    if let Some(customer) = existing {
        if !email_only && !info.email().is_empty() && info.email() != customer.email {
            diesel::update(customers::table.find(customer.id))
                .set((
                    customers::email.eq(info.email()),
                    customers::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
        }
        return Ok(Some(customer.id));
    }

    let id = Uuid::new_v4();
    diesel::insert_into(customers::table)
        .values(&NewCustomerRow {
            id,
            name: info.name().to_string(),
            contact: info.contact().to_string(),
            email: info.email().to_string(),
        })
        .execute(conn)?;
    log::debug!("Created customer {} for '{}'", id, info.name());

    Ok(Some(id))
}
