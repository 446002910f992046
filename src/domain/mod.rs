//! Domain layer: banking records, event shapes, delivery policies and the
//! port traits implemented by the infrastructure adapters.

pub mod account;
pub mod envelope;
pub mod event;
pub mod money;
pub mod payload;
pub mod ports;
pub mod subscriber;
pub mod transaction;
