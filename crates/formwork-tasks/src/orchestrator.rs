//! Lifecycle-safe background execution of form initialization and validation
//!
//! Tasks follow a two-phase model: UI-observable pre and post phases run on
//! the caller's (primary) context, the body runs on the blocking pool. The
//! owning screen is only ever reached through [`OwnerRef`], a liveness-checked
//! handle; a torn-down owner turns every remaining delivery into a logged
//! no-op instead of an error.

use crate::host::{ExternalActionKind, ExternalActionRequest, FormHost, RequestId};
use crate::task::{TaskId, TaskStatus};
use formwork_forms::FormController;
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Everything the host screen owns for one live form.
///
/// Holds the [`FormController`] behind a mutex, the host callbacks, the
/// readiness flag the validation task is gated on, and the table of pending
/// external-action hand-offs. The host keeps the `Arc<FormOwner>` for as long
/// as the screen lives; dropping it is how the screen announces teardown to
/// in-flight tasks.
pub struct FormOwner {
	host: Box<dyn FormHost>,
	form: Mutex<FormController>,
	ready: AtomicBool,
	validation_epoch: AtomicU64,
	next_request: AtomicU64,
	pending_actions: Mutex<HashMap<RequestId, String>>,
}

impl FormOwner {
	/// Pairs a host screen with its form controller.
	pub fn new(host: Box<dyn FormHost>, form: FormController) -> Arc<Self> {
		Arc::new(Self {
			host,
			form: Mutex::new(form),
			ready: AtomicBool::new(false),
			validation_epoch: AtomicU64::new(0),
			next_request: AtomicU64::new(0),
			pending_actions: Mutex::new(HashMap::new()),
		})
	}

	/// The host-screen callbacks.
	pub fn host(&self) -> &dyn FormHost {
		self.host.as_ref()
	}

	/// Locks and returns the form controller.
	pub fn form(&self) -> MutexGuard<'_, FormController> {
		self.form.lock()
	}

	/// Whether initialization has finished constructing all sections/fields.
	pub fn is_form_ready(&self) -> bool {
		self.ready.load(Ordering::Acquire)
	}

	/// Marks the form ready for validation and rendering.
	pub fn mark_form_ready(&self) {
		self.ready.store(true, Ordering::Release);
	}

	/// Starts an external-action hand-off for a field.
	///
	/// Allocates a request id, remembers which field the result belongs to,
	/// and asks the host to launch the outside activity. Fails when the
	/// named field does not exist.
	pub fn request_external(&self, field: &str, kind: ExternalActionKind) -> Option<RequestId> {
		if self.form.lock().field(field).is_none() {
			warn!(field, "external action requested for unknown field");
			return None;
		}
		let id = RequestId(self.next_request.fetch_add(1, Ordering::Relaxed));
		self.pending_actions.lock().insert(id, field.to_string());
		let request = ExternalActionRequest { id, field: field.to_string(), kind };
		self.host.launch_external_action(&request);
		Some(id)
	}

	/// Delivers the asynchronous result of an external action.
	///
	/// Writes the value through to the matching field (dirtying it) and
	/// returns true; an unknown or already-consumed request id is a logged
	/// no-op returning false.
	pub fn deliver_external_result(&self, id: RequestId, value: Value) -> bool {
		let Some(field) = self.pending_actions.lock().remove(&id) else {
			debug!(%id, "result for unknown or consumed request dropped");
			return false;
		};
		match self.form.lock().set_field_value(&field, value) {
			Ok(()) => true,
			Err(err) => {
				warn!(%id, field, error = %err, "external result could not be applied");
				false
			}
		}
	}
}

impl std::fmt::Debug for FormOwner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FormOwner")
			.field("ready", &self.is_form_ready())
			.finish_non_exhaustive()
	}
}

/// Non-owning, liveness-checked handle to a [`FormOwner`].
///
/// Every task delivery upgrades the handle first and silently no-ops when
/// the owner has been torn down.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FormController, ModelBinding, PropertyMap, Schema};
/// use formwork_tasks::{FormOwner, OwnerRef};
///
/// struct Headless;
/// impl formwork_tasks::FormHost for Headless {
///     fn show_progress(&self, _: bool) {}
///     fn build_form(&self, _: &mut FormController) {}
///     fn display_form(&self) {}
///     fn validation_complete(&self, _: bool) {}
/// }
///
/// let form = FormController::new(
///     ModelBinding::new(Box::new(PropertyMap::new())),
///     Schema::new(),
/// );
/// let owner = FormOwner::new(Box::new(Headless), form);
/// let handle = OwnerRef::new(&owner);
/// assert!(handle.is_alive());
/// drop(owner);
/// assert!(!handle.is_alive());
/// ```
#[derive(Clone)]
pub struct OwnerRef(Weak<FormOwner>);

impl OwnerRef {
	/// Creates a handle without taking ownership.
	pub fn new(owner: &Arc<FormOwner>) -> Self {
		Self(Arc::downgrade(owner))
	}

	/// Whether the owner is still alive.
	pub fn is_alive(&self) -> bool {
		self.0.strong_count() > 0
	}

	/// Upgrades to the owner for the duration of one delivery.
	pub fn upgrade(&self) -> Option<Arc<FormOwner>> {
		self.0.upgrade()
	}
}

impl std::fmt::Debug for OwnerRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OwnerRef").field("alive", &self.is_alive()).finish()
	}
}

/// Runs form initialization and validation off the primary context.
///
/// Call the `run_*` entry points from the primary (UI) context: their pre and
/// post phases execute inline there, and only the task body moves to the
/// blocking pool. The orchestrator never keeps the owner alive; it holds an
/// [`OwnerRef`] and re-checks liveness at every phase boundary.
pub struct TaskOrchestrator {
	owner: OwnerRef,
}

impl TaskOrchestrator {
	/// Creates an orchestrator bound to one owner.
	pub fn new(owner: &Arc<FormOwner>) -> Self {
		Self { owner: OwnerRef::new(owner) }
	}

	/// Initialization task: builds the form off-thread, then marks it ready
	/// and triggers the initial render.
	///
	/// Pre: show progress. Body: `FormHost::build_form` on the blocking
	/// pool. Post: hide progress, mark ready, `display_form`.
	pub async fn run_display_task(&self) -> TaskStatus {
		let task = TaskId::new();
		debug!(%task, status = %TaskStatus::Pending, "display task");

		// Pre phase, primary context.
		let Some(owner) = self.owner.upgrade() else {
			debug!(%task, "owner gone before display task started");
			return TaskStatus::Cancelled;
		};
		owner.host.show_progress(true);
		drop(owner);

		debug!(%task, status = %TaskStatus::Running, "display task");
		let handle = self.owner.clone();
		let body = tokio::task::spawn_blocking(move || {
			if let Some(owner) = handle.upgrade() {
				let mut form = owner.form.lock();
				owner.host.build_form(&mut form);
			} else {
				debug!("owner gone during form build");
			}
		});
		if let Err(err) = body.await {
			warn!(%task, error = %err, "display task body failed");
			return TaskStatus::Cancelled;
		}

		// Post phase, primary context again.
		let Some(owner) = self.owner.upgrade() else {
			debug!(%task, "owner gone before display task delivery");
			return TaskStatus::Cancelled;
		};
		owner.host.show_progress(false);
		owner.mark_form_ready();
		owner.host.display_form();
		debug!(%task, status = %TaskStatus::Completed, "display task");
		TaskStatus::Completed
	}

	/// Validation task: validates the whole form off-thread and delivers the
	/// outcome.
	///
	/// Pre: refuse (`Cancelled`) while the form is not ready, otherwise show
	/// progress and reset validation state. Body: `validate_input` on the
	/// blocking pool. Post: forward errors to the error display, deliver
	/// `validation_complete(valid)`, hide progress.
	///
	/// Concurrent runs supersede each other: the latest-started run wins and
	/// earlier unfinished runs deliver nothing.
	pub async fn run_validation_task(&self) -> TaskStatus {
		let task = TaskId::new();
		debug!(%task, status = %TaskStatus::Pending, "validation task");

		// Pre phase, primary context.
		let Some(owner) = self.owner.upgrade() else {
			debug!(%task, "owner gone before validation started");
			return TaskStatus::Cancelled;
		};
		if !owner.is_form_ready() {
			debug!(%task, "form not ready; validation cancelled");
			return TaskStatus::Cancelled;
		}
		let epoch = owner.validation_epoch.fetch_add(1, Ordering::SeqCst) + 1;
		owner.host.show_progress(true);
		owner.form.lock().reset_validation_errors();
		drop(owner);

		debug!(%task, status = %TaskStatus::Running, "validation task");
		let handle = self.owner.clone();
		let body = tokio::task::spawn_blocking(move || {
			handle.upgrade().map(|owner| owner.form.lock().validate_input())
		});
		let errors = match body.await {
			Ok(Some(errors)) => errors,
			Ok(None) => {
				debug!(%task, "owner gone during validation body");
				return TaskStatus::Cancelled;
			}
			Err(err) => {
				warn!(%task, error = %err, "validation task body failed");
				return TaskStatus::Cancelled;
			}
		};

		// Post phase, primary context again.
		let Some(owner) = self.owner.upgrade() else {
			debug!(%task, "owner gone before validation delivery; progress left as-is");
			return TaskStatus::Cancelled;
		};
		if owner.validation_epoch.load(Ordering::SeqCst) != epoch {
			debug!(%task, "validation superseded by a newer run");
			return TaskStatus::Cancelled;
		}
		// The displayed errors are the body's own result; re-validating here
		// could disagree with `valid` if an edit landed in the meantime.
		let valid = errors.is_empty();
		owner.form.lock().display_errors(&errors);
		owner.host.validation_complete(valid);
		owner.host.show_progress(false);
		debug!(%task, valid, status = %TaskStatus::Completed, "validation task");
		TaskStatus::Completed
	}
}
