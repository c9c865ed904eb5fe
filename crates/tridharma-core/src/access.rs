//! The role-scoped access layer.
//!
//! Given an authenticated [`Identity`], decides which faculty and activity
//! rows it may read, refuses operations its role may not perform, and stamps
//! ownership on every activity it writes. Store failures are surfaced as
//! [`Error::Store`] without retries.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
  Error, Result,
  activity::{ActivityRecord, DEFAULT_IMPORT_TYPE, ExportRow, NewActivity, text_field},
  faculty::{FacultyRecord, NewFaculty},
  identity::Identity,
  policy::{Action, Resource, Scope, can_access, scope_for},
  store::RecordStore,
};

/// Outcome of [`AccessLayer::bulk_import_activities`].
///
/// Rows are attempted independently; `imported` always equals the number of
/// rows actually persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  pub imported: usize,
  pub failed:   Vec<RowFailure>,
}

/// A row that could not be stored. `row` is 1-based over the data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
  pub row:   usize,
  pub error: String,
}

pub struct AccessLayer<S> {
  store: Arc<S>,
}

impl<S> Clone for AccessLayer<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

fn authorize(identity: &Identity, action: Action) -> Result<()> {
  if can_access(identity.role, action) {
    Ok(())
  } else {
    tracing::debug!(user_id = identity.id, role = %identity.role, ?action, "access denied");
    Err(Error::Forbidden)
  }
}

impl<S: RecordStore> AccessLayer<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// The underlying store, for operations outside the scoped resources
  /// (credential lookups).
  pub fn store(&self) -> &S { &self.store }

  // ── Faculty ───────────────────────────────────────────────────────────────

  pub async fn list_faculty(&self, identity: &Identity) -> Result<Vec<FacultyRecord>> {
    authorize(identity, Action::ListFaculty)?;
    let scope = scope_for(identity, Resource::Faculty);
    if scope == Scope::Nothing {
      return Ok(Vec::new());
    }
    self.store.list_faculty(&scope).await.map_err(Error::store)
  }

  /// Create a faculty record and return its id. Admin roles only.
  pub async fn create_faculty(&self, identity: &Identity, input: NewFaculty) -> Result<i64> {
    authorize(identity, Action::CreateFaculty)?;
    if let Some(field) = input.missing_field() {
      return Err(Error::Validation(format!("missing field `{field}`")));
    }
    let record = self.store.insert_faculty(input).await.map_err(Error::store)?;
    tracing::info!(faculty_id = record.id, prodi = %record.department, by = identity.id, "faculty created");
    Ok(record.id)
  }

  // ── Activities ────────────────────────────────────────────────────────────

  pub async fn list_activities(&self, identity: &Identity) -> Result<Vec<ActivityRecord>> {
    authorize(identity, Action::ListActivities)?;
    let scope = scope_for(identity, Resource::Activity);
    if scope == Scope::Nothing {
      return Ok(Vec::new());
    }
    self.store.list_activities(&scope).await.map_err(Error::store)
  }

  /// Create one activity from a raw request body.
  ///
  /// The whole body becomes the payload. `type` is required; `prodi` is taken
  /// as given, so a body without one stores no department. Owner fields come
  /// from `identity` even if the body carries its own.
  pub async fn create_activity(
    &self,
    identity: &Identity,
    body: Value,
    attachment_path: Option<String>,
  ) -> Result<ActivityRecord> {
    authorize(identity, Action::CreateActivity)?;

    let Value::Object(fields) = body else {
      return Err(Error::Validation("activity body must be an object".into()));
    };
    let kind = text_field(&fields, "type")
      .ok_or_else(|| Error::Validation("missing field `type`".into()))?;
    let department = text_field(&fields, "prodi");

    let input = NewActivity::stamped(
      identity,
      kind,
      department,
      Value::Object(fields),
      attachment_path,
    );
    let record = self.store.insert_activity(input).await.map_err(Error::store)?;
    tracing::info!(
      activity_id = record.id,
      kind = %record.kind,
      owner_id = record.owner_id,
      attachment = record.attachment_path.is_some(),
      "activity created"
    );
    Ok(record)
  }

  /// Insert one activity per externally parsed row, sequentially.
  ///
  /// A row without `type` becomes a "penelitian" activity and a row without
  /// `prodi` takes the caller's department. A failed insert is recorded in the
  /// report and the remaining rows are still attempted.
  pub async fn bulk_import_activities(
    &self,
    identity: &Identity,
    rows: Vec<Map<String, Value>>,
  ) -> Result<ImportReport> {
    authorize(identity, Action::ImportActivities)?;

    let mut report = ImportReport::default();
    for (index, row) in rows.into_iter().enumerate() {
      let kind = text_field(&row, "type").unwrap_or_else(|| DEFAULT_IMPORT_TYPE.to_owned());
      let department = text_field(&row, "prodi").or_else(|| identity.department.clone());
      let input = NewActivity::stamped(identity, kind, department, Value::Object(row), None);

      match self.store.insert_activity(input).await {
        Ok(_) => report.imported += 1,
        Err(e) => {
          tracing::warn!(row = index + 1, error = %e, "activity import row failed");
          report.failed.push(RowFailure { row: index + 1, error: e.to_string() });
        }
      }
    }

    tracing::info!(
      imported = report.imported,
      failed = report.failed.len(),
      by = identity.id,
      "activity import finished"
    );
    Ok(report)
  }

  /// The caller's visible activities, flattened for tabular export.
  pub async fn export_activities(&self, identity: &Identity) -> Result<Vec<ExportRow>> {
    authorize(identity, Action::ExportActivities)?;
    let scope = scope_for(identity, Resource::Activity);
    if scope == Scope::Nothing {
      return Ok(Vec::new());
    }
    self
      .store
      .list_activities(&scope)
      .await
      .map_err(Error::store)?
      .iter()
      .map(ActivityRecord::to_export_row)
      .collect()
  }
}
