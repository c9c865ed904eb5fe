//! Core types and the role-scoped access layer for the Tridharma record
//! store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::RecordStore`]; the HTTP layer drives
//! [`access::AccessLayer`] with an already-verified [`identity::Identity`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod activity;
pub mod error;
pub mod faculty;
pub mod identity;
pub mod policy;
pub mod store;
pub mod user;

pub use error::{Error, Result};
