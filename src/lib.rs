//! # Formwork
//!
//! A validated data-entry form engine. Formwork binds an arbitrary backing
//! model to a dynamically assembled set of input fields, validates field
//! values against declarative constraints, and orchestrates initialization
//! and validation off the primary rendering thread so a host UI never blocks.
//!
//! The engine is renderer-agnostic: it produces a serializable [`ViewTree`]
//! describing sections and fields, and talks to the host screen only through
//! the [`FormHost`] collaborator trait behind a liveness-checked handle.
//!
//! ## Crates
//!
//! - `formwork-forms` — model binding, declarative constraints, the
//!   validation engine, and the field/section/form controller hierarchy
//! - `formwork-tasks` — background task orchestration with lifecycle-safe
//!   pre/body/post delivery
//!
//! ## Quick start
//!
//! ```
//! use formwork::{
//!     Constraint, FieldController, FormController, ModelBinding, PropertyMap,
//!     Schema, SectionController, FieldType,
//! };
//! use serde_json::json;
//!
//! let model = PropertyMap::new()
//!     .with_property("first_name", FieldType::Text, json!(""))
//!     .with_property("age", FieldType::Integer, json!(null));
//!
//! let mut schema = Schema::new();
//! schema.add_constraint("age", Constraint::min_value(0.0));
//!
//! let mut form = FormController::new(ModelBinding::new(Box::new(model)), schema);
//! let mut section = SectionController::new(Some("Personal"));
//! section.add_field(FieldController::text("first_name").with_label("First Name").required());
//! section.add_field(FieldController::text("age").with_label("Age"));
//! form.add_section(section).unwrap();
//!
//! let errors = form.validate_input();
//! assert_eq!(errors.len(), 1); // first_name is required and empty
//! ```

pub use formwork_forms::{
	BackingModel, BindingError, BindingResult, CoercionError, CollectedErrors, Constraint,
	DefaultMessages, ErrorDisplay, ErrorKind, FieldController, FieldType, FormController,
	FormError, FormResult, MessageRenderer, ModelBinding, PropertyMap, Schema, SectionController,
	ValidationError, ViewId, ViewIdAllocator, ViewNode, ViewSection, ViewTree, Widget,
	validate_field,
};
pub use formwork_tasks::{
	ExternalActionKind, ExternalActionRequest, FormHost, FormOwner, OwnerRef, RequestId, TaskId,
	TaskOrchestrator, TaskStatus,
};
