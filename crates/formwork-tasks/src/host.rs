//! Host-screen collaborator surface
//!
//! The engine never touches a widget toolkit directly. Everything a host
//! screen must provide is the [`FormHost`] trait; everything the engine
//! hands back crosses that trait, gated by the owner liveness check in
//! [`crate::orchestrator`].

use formwork_forms::FormController;
use std::fmt;

/// Identifier correlating an external-action hand-off with its async result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "request#{}", self.0)
	}
}

/// The kind of outside activity a field hands off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalActionKind {
	/// Pick an existing image from the host's gallery equivalent.
	PickImage,
	/// Pick an arbitrary file.
	PickFile,
	/// Capture a new image with a camera equivalent.
	Capture,
}

/// A pending hand-off to an outside activity, keyed by [`RequestId`].
///
/// The host launches the action however its platform does and later calls
/// [`FormOwner::deliver_external_result`](crate::FormOwner::deliver_external_result)
/// with the same id.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExternalActionRequest {
	pub id: RequestId,
	/// The field whose value the result will populate.
	pub field: String,
	pub kind: ExternalActionKind,
}

/// Callbacks the owning screen provides to the orchestrator.
///
/// All of these are UI-observable and are only ever invoked on the primary
/// context (the caller of the orchestrator's `async` entry points), never
/// from a background task body. Implementations therefore do not need their
/// own synchronization for UI state, only `Send + Sync` interior access.
pub trait FormHost: Send + Sync {
	/// Shows or hides the progress indicator.
	fn show_progress(&self, visible: bool);

	/// Builds the form's sections and fields. Runs off the primary context
	/// during the initialization task; must only touch the passed controller.
	fn build_form(&self, form: &mut FormController);

	/// Triggers the initial render once the form is ready.
	fn display_form(&self);

	/// Delivers the boolean outcome of a validation pass.
	fn validation_complete(&self, valid: bool);

	/// Launches an outside activity for a field hand-off. Hosts without
	/// external pickers can ignore this.
	fn launch_external_action(&self, request: &ExternalActionRequest) {
		let _ = request;
	}
}
