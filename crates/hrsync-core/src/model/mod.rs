// ── Domain model ──
//
// Wire shapes of the HR service records, their outbound payloads, and
// the per-record normalization applied before anything enters a mirror.

pub mod attendance;
pub mod auth;
pub mod common;
pub mod department;
pub mod employee;
pub mod leave_request;

pub use attendance::{Attendance, AttendanceCreate, AttendanceUpdate};
pub use auth::{AuthMode, AuthUser};
pub use common::{
    Capability, DateValue, Describe, EntityKind, EntityRecord, Identified, MutationKind, Normalize,
};
pub use department::{Department, DepartmentCreate, DepartmentUpdate};
pub use employee::{Employee, EmployeeCreate, EmployeeUpdate, Gender};
pub use leave_request::{EmployeeReference, LeaveRequest, LeaveStatus, LeaveType};
