//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `tridharma-store-sqlite`). The
//! access layer and the HTTP surface depend on this abstraction, not on any
//! concrete backend. Implementations hold one long-lived handle; every method
//! is a single round-trip with no caching and no multi-statement
//! transactions.

use std::future::Future;

use crate::{
  activity::{ActivityRecord, NewActivity},
  faculty::{FacultyRecord, NewFaculty},
  policy::Scope,
  user::{NewUser, User},
};

/// Abstraction over a Tridharma store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. Fails if the email is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Faculty ───────────────────────────────────────────────────────────

  fn insert_faculty(
    &self,
    input: NewFaculty,
  ) -> impl Future<Output = Result<FacultyRecord, Self::Error>> + Send + '_;

  /// Faculty rows within `scope`, in insertion order.
  fn list_faculty<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Vec<FacultyRecord>, Self::Error>> + Send + 'a;

  // ── Activities ────────────────────────────────────────────────────────

  /// Insert an activity and return it with its store-assigned id. The
  /// payload is serialised on write.
  fn insert_activity(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<ActivityRecord, Self::Error>> + Send + '_;

  /// Activity rows within `scope`, most recent (highest id) first, with the
  /// payload deserialised.
  fn list_activities<'a>(
    &'a self,
    scope: &'a Scope,
  ) -> impl Future<Output = Result<Vec<ActivityRecord>, Self::Error>> + Send + 'a;
}
