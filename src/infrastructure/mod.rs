pub mod customer_resolver;
pub mod models;
pub mod order_number;
pub mod order_repo;
