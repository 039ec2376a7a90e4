//! Background task orchestration for the form engine
//!
//! Wraps form initialization and whole-form validation in two-phase tasks:
//! UI-observable pre/post phases stay on the caller's (primary) context while
//! the task body runs on the blocking pool. The owning screen is reached only
//! through a liveness-checked [`OwnerRef`], so a screen torn down mid-task
//! turns the remaining deliveries into logged no-ops.

pub mod host;
pub mod orchestrator;
pub mod task;

pub use host::{ExternalActionKind, ExternalActionRequest, FormHost, RequestId};
pub use orchestrator::{FormOwner, OwnerRef, TaskOrchestrator};
pub use task::{TaskId, TaskStatus};
