//! Resource synchronization and availability tracking for the HR console.
//!
//! This crate sits between `hrsync-api` and any front end (the `hrsync`
//! CLI, or a UI) and owns the client-side view of the HR service:
//!
//! - **[`Console`]**: Constructed state container wiring everything
//!   together. [`login()`](Console::login) arms the core with a parallel
//!   initial load, [`logout()`](Console::logout) tears it down,
//!   [`reconnect_all()`](Console::reconnect_all) re-probes and refreshes
//!   every capability at once.
//!
//! - **[`ResourceStore<R>`]**: One per mirrored kind (employees,
//!   departments, attendances). Owns an [`EntityMirror`] and an
//!   [`AvailabilityTracker`]; every mutation is followed by a full reload.
//!
//! - **Validation layer** ([`decode`]): Strict schema decoding of inbound
//!   payloads and outbound payload checks, raising [`DecodeFailure`].
//!
//! - **[`NotificationEvent`]**: The closed set of user-visible messages,
//!   delivered to a single [`NotificationSink`].
//!
//! - **[`FileTransferTracker`]**: Spreadsheet import/export with
//!   in-flight flags and a shared availability tracker.

pub mod availability;
pub mod client;
pub mod config;
pub mod console;
pub mod decode;
pub mod error;
pub mod model;
pub mod notify;
pub mod reconnect;
pub mod session;
pub mod store;
pub mod stream;
pub mod transfer;

// ── Primary re-exports ──────────────────────────────────────────────
pub use availability::{Availability, AvailabilityTracker, Transition};
pub use client::ClientHandle;
pub use config::ConsoleConfig;
pub use console::{BaseUrlChange, Console};
pub use decode::{DecodeFailure, FieldIssue};
pub use error::CoreError;
pub use notify::{
    BroadcastSink, MemorySink, Notification, NotificationEvent, NotificationHandle,
    NotificationSink, TracingSink, TransferDirection,
};
pub use session::{Session, SessionController};
pub use store::{EntityMirror, MutationOutcome, Resource, ResourceStore, Transferable};
pub use stream::MirrorStream;
pub use transfer::FileTransferTracker;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Attendance, AttendanceCreate, AttendanceUpdate, AuthMode, AuthUser, Capability, DateValue,
    Department, DepartmentCreate, DepartmentUpdate, Employee, EmployeeCreate, EmployeeUpdate,
    EntityKind, EntityRecord, Gender, LeaveRequest, LeaveStatus, LeaveType, MutationKind,
};
