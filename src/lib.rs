//! Credit-gated asynchronous image-processing pipeline.
//!
//! Users spend pre-funded credits to submit an image for transformation and
//! receive the result later. The crate covers the durable user ledger, the
//! Redis task queue, the producer that debits a credit before enqueuing
//! (refunding it when the push fails), and the worker loop that runs the
//! transform and compensates the ledger when work cannot be completed.
//!
//! The chat transport, the report scheduler, and admin-list management are
//! external collaborators behind the traits in [`services`].

pub mod config;
pub mod errors;
pub mod handlers;
pub mod messages;
pub mod models;
pub mod services;
pub mod worker;
