//! Application layer containing the relay's orchestration logic.
//!
//! `TransactionPipeline` is the entry point for processing one inbound
//! notification. It fans out through the `DeliveryDispatcher`, which runs one
//! `tokio` task per subscriber and joins them all before returning.
//! `IntakeService` authenticates webhook calls and queues them, and `export`
//! holds the offline transaction export.

pub mod dispatcher;
pub mod export;
pub mod intake;
pub mod pipeline;
