pub mod order_service;

#[cfg(test)]
pub(crate) mod in_memory;
