//! The authorisation policy: one decision table for "may this role do this
//! at all" and one for "which rows may it see".
//!
//! Every entry point goes through [`can_access`] and [`scope_for`]; no
//! handler compares role strings itself.

use crate::identity::{Identity, Role};

/// Operations offered by the access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  ListFaculty,
  CreateFaculty,
  ListActivities,
  CreateActivity,
  ImportActivities,
  ExportActivities,
}

/// Tables whose rows are scoped per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
  Faculty,
  Activity,
}

/// The row set an identity may read from a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
  All,
  /// Rows whose `prodi` equals the value.
  Department(String),
  /// Faculty rows whose `nidn` equals the value.
  Identifier(String),
  /// Activity rows whose `user_name` equals the value.
  OwnerName(String),
  /// The identity lacks the key its role is scoped by; nothing is visible.
  Nothing,
}

/// Whether `role` may perform `action`.
///
/// Only faculty creation is gated by role. Reads and activity writes are open
/// to every authenticated role and narrowed by [`scope_for`] instead.
///
/// Department admins may create faculty and activities for any department;
/// creation is not department-scoped.
pub fn can_access(role: Role, action: Action) -> bool {
  use Action::*;

  match (role, action) {
    (Role::AdminPusat | Role::AdminProdi, CreateFaculty) => true,
    (Role::Member, CreateFaculty) => false,
    (
      _,
      ListFaculty | ListActivities | CreateActivity | ImportActivities | ExportActivities,
    ) => true,
  }
}

/// The rows of `resource` visible to `identity`.
pub fn scope_for(identity: &Identity, resource: Resource) -> Scope {
  match (identity.role, resource) {
    (Role::AdminPusat, _) => Scope::All,
    (Role::AdminProdi, _) => {
      identity.department.clone().map_or(Scope::Nothing, Scope::Department)
    }
    (Role::Member, Resource::Faculty) => {
      identity.identifier.clone().map_or(Scope::Nothing, Scope::Identifier)
    }
    (Role::Member, Resource::Activity) => Scope::OwnerName(identity.name.clone()),
  }
}
