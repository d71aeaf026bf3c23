//! Endpoint handlers, one module per resource.

pub mod consultation;
pub mod export;
pub mod health;
pub mod page;
pub mod sessions;
