// ── Resource stores ──
//
// One `ResourceStore` per mirrored entity kind. The store owns its
// mirror and its availability tracker; nothing else writes either.

mod attendance;
mod mirror;
mod resource;

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::decode::{Payload, Schema};
use crate::model::{
    Attendance, AttendanceCreate, AttendanceUpdate, Department, DepartmentCreate, DepartmentUpdate,
    Describe, Employee, EmployeeCreate, EmployeeUpdate, EntityKind, EntityRecord, Identified,
    Normalize,
};

pub use mirror::EntityMirror;
pub use resource::{MutationOutcome, ResourceStore};

/// A record kind with a remote collection and a client-side mirror.
pub trait Resource:
    Schema + Identified + Describe + Normalize + Into<EntityRecord> + Clone + Send + Sync + 'static
{
    const KIND: EntityKind;
    type Create: Payload + Send + Sync;
    type Update: Payload + Send + Sync;
}

/// Kinds that support bulk import/export.
pub trait Transferable: Resource {}

impl Resource for Employee {
    const KIND: EntityKind = EntityKind::Employee;
    type Create = EmployeeCreate;
    type Update = EmployeeUpdate;
}

impl Resource for Department {
    const KIND: EntityKind = EntityKind::Department;
    type Create = DepartmentCreate;
    type Update = DepartmentUpdate;
}

impl Resource for Attendance {
    const KIND: EntityKind = EntityKind::Attendance;
    type Create = AttendanceCreate;
    type Update = AttendanceUpdate;
}

impl Transferable for Employee {}
impl Transferable for Department {}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
