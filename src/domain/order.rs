use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::pricing::{self, Totals};
use super::status::OrderStatus;

/// Stored text limits, in characters.
pub const ITEM_NAME_MAX: usize = 255;
pub const CUSTOMER_NAME_MAX: usize = 255;
pub const CUSTOMER_CONTACT_MAX: usize = 64;
pub const CUSTOMER_EMAIL_MAX: usize = 255;
pub const TABLE_LABEL_MAX: usize = 32;

/// Reject text that would not fit its column.
pub fn check_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(format!(
            "{} is {} characters long, at most {} allowed",
            field, len, max
        )));
    }
    Ok(())
}

/// A product entry as presented by the ordering client (the cart).
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: i64,
    pub name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub size_name: Option<String>,
    pub notes: Option<String>,
}

impl LineItem {
    /// Name frozen onto the order item, including the size variant if any.
    pub fn display_name(&self) -> String {
        match self.size_name.as_deref().map(str::trim) {
            Some(size) if !size.is_empty() => format!("{} ({})", self.name.trim(), size),
            _ => self.name.trim().to_string(),
        }
    }

    pub fn line_total(&self) -> BigDecimal {
        pricing::line_total(&self.unit_price, self.quantity)
    }
}

/// Loosely provided contact details used to attach a customer to an order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

impl CustomerInfo {
    pub fn name(&self) -> &str {
        trimmed(&self.name)
    }

    pub fn contact(&self) -> &str {
        trimmed(&self.contact)
    }

    pub fn email(&self) -> &str {
        trimmed(&self.email)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        check_length("customer name", self.name(), CUSTOMER_NAME_MAX)?;
        check_length("customer contact", self.contact(), CUSTOMER_CONTACT_MAX)?;
        check_length("customer email", self.email(), CUSTOMER_EMAIL_MAX)
    }

    /// A walk-in: nothing usable was provided.
    pub fn is_empty(&self) -> bool {
        self.name().is_empty() && self.contact().is_empty() && self.email().is_empty()
    }
}

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    other => Err(DomainError::validation(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum!(OrderType {
    DineIn => "dine_in" | "dine-in" | "dinein",
    Takeaway => "takeaway" | "take-away" | "take_away",
    Delivery => "delivery",
});

string_enum!(PaymentMethod {
    Cash => "cash",
    Card => "card",
    Mobile => "mobile",
});

string_enum!(PaymentStatus {
    Pending => "pending",
    Paid => "paid",
});

impl PaymentMethod {
    /// Counter payments are settled at submission, whatever the method.
    pub fn status_at_submission(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Cash | PaymentMethod::Card | PaymentMethod::Mobile => PaymentStatus::Paid,
        }
    }
}

/// Everything the caller supplies to submit an order.
#[derive(Debug, Clone)]
pub struct SubmitOrder {
    pub items: Vec<LineItem>,
    pub customer: Option<CustomerInfo>,
    pub order_type: OrderType,
    pub table_label: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: String,
    pub staff_id: Uuid,
    pub discount_amount: BigDecimal,
}

/// A priced, validated order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_date: NaiveDate,
    pub staff_id: Uuid,
    pub customer: Option<CustomerInfo>,
    pub order_type: OrderType,
    pub table_label: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: String,
    pub tax_rate: BigDecimal,
    pub totals: Totals,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub staff_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub order_type: OrderType,
    pub table_label: Option<String>,
    pub subtotal: BigDecimal,
    pub tax_rate: BigDecimal,
    pub tax_amount: BigDecimal,
    pub discount_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub order_id: Uuid,
    pub order_number: String,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Order>,
    pub total: i64,
}
