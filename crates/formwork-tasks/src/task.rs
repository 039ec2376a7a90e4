//! Task identity and lifecycle states

use std::fmt;

/// Unique identifier for one task run, used in logs.
///
/// # Examples
///
/// ```
/// use formwork_tasks::TaskId;
///
/// let a = TaskId::new();
/// let b = TaskId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TaskId(pub uuid::Uuid);

impl TaskId {
	/// Creates a new unique task id.
	pub fn new() -> Self {
		Self(uuid::Uuid::new_v4())
	}
}

impl Default for TaskId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for TaskId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Lifecycle of one task run: `Pending -> Running -> Completed | Cancelled`.
///
/// The orchestrator's entry points only ever return the terminal states;
/// `Pending` and `Running` mark the phase transitions in the progress logs.
/// A run is `Cancelled` when a precondition refuses it (form not ready), when
/// the owning screen is gone at a delivery point, or when a newer run
/// supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
	Pending,
	Running,
	Completed,
	Cancelled,
}

impl fmt::Display for TaskStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Self::Pending => "pending",
			Self::Running => "running",
			Self::Completed => "completed",
			Self::Cancelled => "cancelled",
		};
		f.write_str(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_display_covers_every_state() {
		let rendered: Vec<_> = [
			TaskStatus::Pending,
			TaskStatus::Running,
			TaskStatus::Completed,
			TaskStatus::Cancelled,
		]
		.iter()
		.map(ToString::to_string)
		.collect();
		assert_eq!(rendered, ["pending", "running", "completed", "cancelled"]);
	}
}
