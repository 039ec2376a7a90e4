//! Orchestrator integration tests
//!
//! Full lifecycle coverage: initialization, readiness gating, validation
//! delivery through the error display, owner teardown mid-flight, and
//! superseding cancellation between concurrent validation runs.

use formwork_forms::{
	CollectedErrors, Constraint, ErrorDisplay, FieldController, FieldType, FormController,
	ModelBinding, PropertyMap, Schema, SectionController, ValidationError,
};
use formwork_tasks::{FormHost, FormOwner, TaskOrchestrator, TaskStatus};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone, Default)]
struct TestHost {
	progress: Arc<Mutex<Vec<bool>>>,
	displayed: Arc<AtomicBool>,
	outcomes: Arc<Mutex<Vec<bool>>>,
}

impl FormHost for TestHost {
	fn show_progress(&self, visible: bool) {
		self.progress.lock().push(visible);
	}

	fn build_form(&self, form: &mut FormController) {
		form.add_section(
			SectionController::new(Some("Record"))
				.with_field(FieldController::text("first_name").with_label("First Name").required())
				.with_field(FieldController::text("last_name").with_label("Last Name").required())
				.with_field(FieldController::text("age").with_label("Age")),
		)
		.unwrap();
	}

	fn display_form(&self) {
		self.displayed.store(true, Ordering::SeqCst);
	}

	fn validation_complete(&self, valid: bool) {
		self.outcomes.lock().push(valid);
	}
}

#[derive(Clone, Default)]
struct SharedDisplay(Arc<CollectedErrors>);

impl ErrorDisplay for SharedDisplay {
	fn reset_errors(&self) {
		self.0.reset_errors();
	}

	fn show_errors(&self, errors: &[ValidationError]) {
		self.0.show_errors(errors);
	}
}

fn record_model() -> PropertyMap {
	PropertyMap::new()
		.with_property("first_name", FieldType::Text, json!(""))
		.with_property("last_name", FieldType::Text, json!("Smith"))
		.with_property("age", FieldType::Integer, json!(null))
}

fn record_form(schema: Schema) -> FormController {
	FormController::new(ModelBinding::new(Box::new(record_model())), schema)
}

#[tokio::test]
async fn test_full_lifecycle_init_edit_validate() {
	let host = TestHost::default();
	let display = SharedDisplay::default();
	let mut form = record_form(Schema::new());
	form.set_error_display(Box::new(display.clone()));

	let owner = FormOwner::new(Box::new(host.clone()), form);
	let orchestrator = TaskOrchestrator::new(&owner);

	assert_eq!(orchestrator.run_display_task().await, TaskStatus::Completed);
	assert!(host.displayed.load(Ordering::SeqCst));
	assert_eq!(*host.progress.lock(), [true, false]);

	// First pass: first_name is required and empty.
	assert_eq!(orchestrator.run_validation_task().await, TaskStatus::Completed);
	assert_eq!(*host.outcomes.lock(), [false]);
	let shown = display.0.current();
	assert_eq!(shown.len(), 1);
	assert_eq!(shown[0].field_name(), "first_name");

	// The user fills the field in; the next pass succeeds.
	owner.form().commit_input("first_name", "Jane").unwrap();
	assert_eq!(orchestrator.run_validation_task().await, TaskStatus::Completed);
	assert_eq!(*host.outcomes.lock(), [false, true]);
	assert!(display.0.current().is_empty());
}

#[tokio::test]
async fn test_validation_before_init_is_a_silent_no_op() {
	let host = TestHost::default();
	let owner = FormOwner::new(Box::new(host.clone()), record_form(Schema::new()));
	let orchestrator = TaskOrchestrator::new(&owner);

	assert_eq!(orchestrator.run_validation_task().await, TaskStatus::Cancelled);
	assert!(host.progress.lock().is_empty());
	assert!(host.outcomes.lock().is_empty());
	assert!(!owner.is_form_ready());
}

#[tokio::test]
async fn test_owner_dropped_before_delivery_skips_callbacks() {
	let host = TestHost::default();
	let owner = FormOwner::new(Box::new(host.clone()), record_form(Schema::new()));
	let orchestrator = TaskOrchestrator::new(&owner);
	drop(owner);

	assert_eq!(orchestrator.run_display_task().await, TaskStatus::Cancelled);
	assert!(host.progress.lock().is_empty());
	assert!(!host.displayed.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_newer_validation_run_supersedes_older() {
	// The first run's body stalls inside a custom constraint; the second run
	// starts and finishes while the first is stalled, so the first delivers
	// nothing.
	let stall_once = Arc::new(AtomicBool::new(true));
	let checks = Arc::new(AtomicUsize::new(0));

	let mut schema = Schema::new();
	{
		let stall_once = stall_once.clone();
		let checks = checks.clone();
		schema.add_constraint(
			"last_name",
			Constraint::custom(move |_| {
				checks.fetch_add(1, Ordering::SeqCst);
				if stall_once.swap(false, Ordering::SeqCst) {
					std::thread::sleep(Duration::from_millis(200));
				}
				Ok(())
			}),
		);
	}

	let host = TestHost::default();
	let owner = FormOwner::new(Box::new(host.clone()), record_form(schema));
	let orchestrator = TaskOrchestrator::new(&owner);
	orchestrator.run_display_task().await;
	owner.form().commit_input("first_name", "Jane").unwrap();

	let slow = {
		let orchestrator = TaskOrchestrator::new(&owner);
		tokio::spawn(async move { orchestrator.run_validation_task().await })
	};
	// Let the slow run reach its body before starting the fast one.
	tokio::time::sleep(Duration::from_millis(50)).await;
	let fast = orchestrator.run_validation_task().await;

	assert_eq!(fast, TaskStatus::Completed);
	assert_eq!(slow.await.unwrap(), TaskStatus::Cancelled);
	// Exactly one outcome delivered: the superseding run's.
	assert_eq!(*host.outcomes.lock(), [true]);
	assert_eq!(checks.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_repeated_validation_reuses_then_recomputes() {
	let host = TestHost::default();
	let owner = FormOwner::new(Box::new(host.clone()), record_form(Schema::new()));
	let orchestrator = TaskOrchestrator::new(&owner);
	orchestrator.run_display_task().await;

	orchestrator.run_validation_task().await;
	orchestrator.run_validation_task().await;

	// Each pass resets state first, so both deliver the same invalid result.
	assert_eq!(*host.outcomes.lock(), [false, false]);
}
