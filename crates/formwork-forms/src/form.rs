//! The form controller: top-level aggregate over sections, binding, and schema

use crate::binding::ModelBinding;
use crate::constraints::Schema;
use crate::field::FieldController;
use crate::section::SectionController;
use crate::validation::{DefaultMessages, ErrorDisplay, MessageRenderer, ValidationError};
use crate::view::{ViewIdAllocator, ViewSection, ViewTree};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Structural errors raised while assembling or addressing a form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
	/// A field name is already bound elsewhere in the form. Uniqueness must
	/// hold across all sections because the model binding is keyed by name
	/// alone.
	#[error("Duplicate field '{0}' in form")]
	DuplicateField(String),
	/// No field controller with this name exists anywhere in the form.
	#[error("No field '{0}' in form")]
	UnknownField(String),
	/// The addressed section index is out of range.
	#[error("No section at index {0}")]
	UnknownSection(usize),
}

/// Result alias for form-assembly operations.
pub type FormResult<T> = Result<T, FormError>;

/// The top-level form aggregate.
///
/// Owns the [`ModelBinding`], the constraint [`Schema`], and an ordered list
/// of [`SectionController`]s. One instance exists per logical form and
/// survives recreation of the host's views.
///
/// # Examples
///
/// ```
/// use formwork_forms::{
///     FieldController, FieldType, FormController, ModelBinding, PropertyMap, Schema,
///     SectionController,
/// };
/// use serde_json::json;
///
/// let model = PropertyMap::new()
///     .with_property("first_name", FieldType::Text, json!(""))
///     .with_property("last_name", FieldType::Text, json!("Smith"));
/// let mut form = FormController::new(ModelBinding::new(Box::new(model)), Schema::new());
///
/// let section = SectionController::new(None)
///     .with_field(FieldController::text("first_name").required())
///     .with_field(FieldController::text("last_name").required());
/// form.add_section(section).unwrap();
///
/// let errors = form.validate_input();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].field_name(), "first_name");
/// ```
pub struct FormController {
	binding: ModelBinding,
	schema: Schema,
	sections: Vec<SectionController>,
	allocator: Arc<ViewIdAllocator>,
	error_display: Option<Box<dyn ErrorDisplay>>,
	messages: Box<dyn MessageRenderer>,
}

impl FormController {
	/// Creates a form over a binding and schema, using the process-wide
	/// view-id allocator.
	pub fn new(binding: ModelBinding, schema: Schema) -> Self {
		Self {
			binding,
			schema,
			sections: Vec::new(),
			allocator: ViewIdAllocator::global().clone(),
			error_display: None,
			messages: Box::new(DefaultMessages),
		}
	}

	/// Injects a specific view-id allocator (shared across cooperating forms).
	pub fn with_allocator(mut self, allocator: Arc<ViewIdAllocator>) -> Self {
		self.allocator = allocator;
		self
	}

	/// Sets the collaborator that presents validation errors.
	pub fn set_error_display(&mut self, display: Box<dyn ErrorDisplay>) {
		self.error_display = Some(display);
	}

	/// Sets the message formatter used when rendering errors for display.
	pub fn set_message_renderer(&mut self, messages: Box<dyn MessageRenderer>) {
		self.messages = messages;
	}

	/// Appends a section, enforcing field-name uniqueness across the whole
	/// form.
	pub fn add_section(&mut self, section: SectionController) -> FormResult<()> {
		for (i, field) in section.fields().iter().enumerate() {
			let duplicate_within = section.fields()[..i].iter().any(|f| f.name() == field.name());
			if duplicate_within || self.field(field.name()).is_some() {
				return Err(FormError::DuplicateField(field.name().to_string()));
			}
		}
		self.sections.push(section);
		Ok(())
	}

	/// Appends a field to an existing section, with the same uniqueness check.
	pub fn add_field(&mut self, section_index: usize, field: FieldController) -> FormResult<()> {
		if self.field(field.name()).is_some() {
			return Err(FormError::DuplicateField(field.name().to_string()));
		}
		match self.sections.get_mut(section_index) {
			Some(section) => {
				section.add_field(field);
				Ok(())
			}
			None => Err(FormError::UnknownSection(section_index)),
		}
	}

	/// The sections in display order.
	pub fn sections(&self) -> &[SectionController] {
		&self.sections
	}

	/// Mutable access to the sections, preserving order.
	pub fn sections_mut(&mut self) -> &mut [SectionController] {
		&mut self.sections
	}

	/// Read access to the model binding.
	pub fn binding(&self) -> &ModelBinding {
		&self.binding
	}

	/// The constraint schema this form validates against.
	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	/// Finds a field controller anywhere in the form.
	pub fn field(&self, name: &str) -> Option<&FieldController> {
		self.sections.iter().find_map(|s| s.field(name))
	}

	/// Finds a field controller anywhere in the form, mutably.
	pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldController> {
		self.sections.iter_mut().find_map(|s| s.field_mut(name))
	}

	/// Total number of fields across all sections.
	pub fn field_count(&self) -> usize {
		self.sections.iter().map(|s| s.fields().len()).sum()
	}

	/// Commits raw user input to a named field (coerced write-through).
	pub fn commit_input(&mut self, name: &str, raw: &str) -> FormResult<()> {
		let binding = &mut self.binding;
		let field = self
			.sections
			.iter_mut()
			.find_map(|s| s.field_mut(name))
			.ok_or_else(|| FormError::UnknownField(name.to_string()))?;
		field.commit_input(binding, raw);
		Ok(())
	}

	/// Programmatically sets a field's value (write-through, field dirtied).
	pub fn set_field_value(&mut self, name: &str, value: Value) -> FormResult<()> {
		let binding = &mut self.binding;
		let field = self
			.sections
			.iter_mut()
			.find_map(|s| s.field_mut(name))
			.ok_or_else(|| FormError::UnknownField(name.to_string()))?;
		field.commit_value(binding, value);
		Ok(())
	}

	/// Validates every field, section order then field order, and returns the
	/// full aggregated error list. Does not short-circuit on the first
	/// invalid field.
	pub fn validate_input(&mut self) -> Vec<ValidationError> {
		let binding = &self.binding;
		let schema = &self.schema;
		let mut errors = Vec::new();
		for section in &mut self.sections {
			for field in section.fields_mut() {
				errors.extend_from_slice(field.validate(binding, schema));
			}
		}
		errors
	}

	/// Whether the whole form currently validates without errors.
	pub fn is_valid_input(&mut self) -> bool {
		self.validate_input().is_empty()
	}

	/// Forces every field back to needing validation and resets the error
	/// display, without discarding any values. Run this before a fresh
	/// validation pass so stale error state never leaks across runs.
	pub fn reset_validation_errors(&mut self) {
		for section in &mut self.sections {
			for field in section.fields_mut() {
				field.set_needs_validation();
			}
		}
		if let Some(display) = &self.error_display {
			display.reset_errors();
		}
	}

	/// Forwards an already-computed error list to the error display, verbatim.
	///
	/// No validation runs here: callers that captured the result of an earlier
	/// [`validate_input`](Self::validate_input) pass use this to present
	/// exactly that result, even if field values changed since.
	pub fn display_errors(&self, errors: &[ValidationError]) {
		match &self.error_display {
			Some(display) => display.show_errors(errors),
			None => debug!(count = errors.len(), "no error display attached"),
		}
	}

	/// Validates and forwards the current aggregated errors to the error
	/// display.
	///
	/// Fields that are still `Clean` contribute their cache; `Dirty` fields
	/// are re-validated first.
	pub fn show_validation_errors(&mut self) {
		let errors = self.validate_input();
		self.display_errors(&errors);
	}

	/// Rebuilds the presentation tree from the current controller set.
	///
	/// Safe to call repeatedly: only presentation state is rebuilt; field
	/// values and validation caches are untouched, and each live controller
	/// appears exactly once with its stable view id.
	pub fn recreate_views(&mut self) -> ViewTree {
		let binding = &self.binding;
		let allocator = &self.allocator;
		let messages = self.messages.as_ref();
		let sections = self
			.sections
			.iter_mut()
			.map(|section| ViewSection {
				title: section.title().map(str::to_string),
				fields: section
					.fields_mut()
					.iter_mut()
					.map(|field| field.create_view(binding, allocator, messages))
					.collect(),
			})
			.collect();
		ViewTree { sections }
	}
}

impl std::fmt::Debug for FormController {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FormController")
			.field("sections", &self.sections.len())
			.field("fields", &self.field_count())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::binding::{FieldType, PropertyMap};
	use crate::constraints::Constraint;
	use crate::validation::CollectedErrors;
	use serde_json::json;
	use std::sync::Arc;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn name_form() -> FormController {
		let model = PropertyMap::new()
			.with_property("first_name", FieldType::Text, json!(""))
			.with_property("last_name", FieldType::Text, json!("Smith"));
		let mut form = FormController::new(ModelBinding::new(Box::new(model)), Schema::new());
		let section = SectionController::new(None)
			.with_field(FieldController::text("first_name").with_label("First Name").required())
			.with_field(FieldController::text("last_name").with_label("Last Name").required());
		form.add_section(section).unwrap();
		form
	}

	#[test]
	fn test_aggregated_validation_reports_only_missing_required() {
		let mut form = name_form();
		let errors = form.validate_input();
		assert_eq!(errors.len(), 1);
		assert_eq!(errors[0].field_name(), "first_name");
		assert!(!form.is_valid_input());

		form.commit_input("first_name", "Jane").unwrap();
		assert!(form.is_valid_input());
	}

	#[test]
	fn test_duplicate_names_rejected_across_sections() {
		let model = PropertyMap::new().with_property("email", FieldType::Text, json!(null));
		let mut form = FormController::new(ModelBinding::new(Box::new(model)), Schema::new());

		form.add_section(SectionController::new(Some("A")).with_field(FieldController::text("email")))
			.unwrap();
		let err = form
			.add_section(SectionController::new(Some("B")).with_field(FieldController::text("email")))
			.unwrap_err();
		assert_eq!(err, FormError::DuplicateField("email".to_string()));
	}

	#[test]
	fn test_duplicate_names_rejected_within_one_section() {
		let model = PropertyMap::new().with_property("x", FieldType::Text, json!(null));
		let mut form = FormController::new(ModelBinding::new(Box::new(model)), Schema::new());
		let section = SectionController::new(None)
			.with_field(FieldController::text("x"))
			.with_field(FieldController::text("x"));
		assert!(form.add_section(section).is_err());
	}

	#[test]
	fn test_reset_forces_every_field_to_revalidate_once() {
		let checks = Arc::new(AtomicUsize::new(0));
		let counter = checks.clone();

		let model = PropertyMap::new()
			.with_property("a", FieldType::Text, json!("ok"))
			.with_property("b", FieldType::Text, json!("ok"));
		let mut schema = Schema::new();
		for name in ["a", "b"] {
			let counter = counter.clone();
			schema.add_constraint(
				name,
				Constraint::custom(move |_| {
					counter.fetch_add(1, Ordering::SeqCst);
					Ok(())
				}),
			);
		}

		let mut form = FormController::new(ModelBinding::new(Box::new(model)), schema);
		form.add_section(
			SectionController::new(None)
				.with_field(FieldController::text("a"))
				.with_field(FieldController::text("b")),
		)
		.unwrap();

		form.validate_input();
		assert_eq!(checks.load(Ordering::SeqCst), 2);

		// Clean fields are served from cache.
		form.validate_input();
		assert_eq!(checks.load(Ordering::SeqCst), 2);

		// Reset re-runs every field's check exactly once each.
		form.reset_validation_errors();
		form.validate_input();
		assert_eq!(checks.load(Ordering::SeqCst), 4);
	}

	#[test]
	fn test_reset_keeps_values() {
		let mut form = name_form();
		form.commit_input("first_name", "Jane").unwrap();
		form.reset_validation_errors();
		assert_eq!(form.binding().value("first_name").unwrap(), json!("Jane"));
	}

	#[test]
	fn test_show_validation_errors_forwards_to_display() {
		let mut form = name_form();
		let display = Arc::new(CollectedErrors::new());
		struct Shared(Arc<CollectedErrors>);
		impl ErrorDisplay for Shared {
			fn reset_errors(&self) {
				self.0.reset_errors();
			}
			fn show_errors(&self, errors: &[ValidationError]) {
				self.0.show_errors(errors);
			}
		}
		form.set_error_display(Box::new(Shared(display.clone())));

		form.reset_validation_errors();
		form.show_validation_errors();
		let shown = display.current();
		assert_eq!(shown.len(), 1);
		assert_eq!(shown[0].field_name(), "first_name");

		form.reset_validation_errors();
		assert!(display.current().is_empty());
	}

	#[test]
	fn test_display_errors_forwards_captured_list_without_revalidating() {
		let checks = Arc::new(AtomicUsize::new(0));
		let counter = checks.clone();

		let model = PropertyMap::new().with_property("name", FieldType::Text, json!("ok"));
		let schema = Schema::new().with_constraint(
			"name",
			Constraint::custom(move |_| {
				counter.fetch_add(1, Ordering::SeqCst);
				Err("rejected".to_string())
			}),
		);
		let mut form = FormController::new(ModelBinding::new(Box::new(model)), schema);
		form.add_section(SectionController::new(None).with_field(FieldController::text("name")))
			.unwrap();

		let display = Arc::new(CollectedErrors::new());
		struct Shared(Arc<CollectedErrors>);
		impl ErrorDisplay for Shared {
			fn reset_errors(&self) {
				self.0.reset_errors();
			}
			fn show_errors(&self, errors: &[ValidationError]) {
				self.0.show_errors(errors);
			}
		}
		form.set_error_display(Box::new(Shared(display.clone())));

		let captured = form.validate_input();
		assert_eq!(checks.load(Ordering::SeqCst), 1);

		// An edit after the pass must not change what gets presented.
		form.set_field_value("name", json!(null)).unwrap();
		form.display_errors(&captured);

		assert_eq!(display.current(), captured);
		assert_eq!(checks.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_recreate_views_is_repeat_safe() {
		let mut form = name_form();
		let first = form.recreate_views();
		let second = form.recreate_views();
		assert_eq!(first, second);
		assert_eq!(first.field_count(), 2);
	}

	#[test]
	fn test_recreate_views_reflects_dynamic_fields_exactly_once() {
		let model = PropertyMap::new()
			.with_property("a", FieldType::Text, json!(null))
			.with_property("b", FieldType::Text, json!(null));
		let mut form = FormController::new(ModelBinding::new(Box::new(model)), Schema::new());
		form.add_section(SectionController::new(None).with_field(FieldController::text("a")))
			.unwrap();

		assert_eq!(form.recreate_views().field_count(), 1);

		form.add_field(0, FieldController::text("b")).unwrap();
		let tree = form.recreate_views();
		assert_eq!(tree.field_count(), 2);
		assert!(tree.field("a").is_some());
		assert!(tree.field("b").is_some());

		form.sections_mut()[0].remove_field("a");
		let tree = form.recreate_views();
		assert_eq!(tree.field_count(), 1);
		assert!(tree.field("a").is_none());
	}

	#[test]
	fn test_recreate_views_preserves_validation_cache() {
		let mut form = name_form();
		form.validate_input();
		let tree = form.recreate_views();
		assert_eq!(
			tree.field("first_name").unwrap().error.as_deref(),
			Some("First Name is required")
		);
		assert_eq!(tree.field("last_name").unwrap().error, None);
		assert!(!form.field("first_name").unwrap().needs_validation());
	}

	#[test]
	fn test_set_field_value_dirties_field() {
		let mut form = name_form();
		form.validate_input();
		form.set_field_value("last_name", json!(null)).unwrap();
		assert!(form.field("last_name").unwrap().needs_validation());
		let errors = form.validate_input();
		assert!(errors.iter().any(|e| e.field_name() == "last_name"));
	}

	#[test]
	fn test_unknown_field_addressing_fails() {
		let mut form = name_form();
		assert!(form.commit_input("missing", "x").is_err());
		assert!(form.set_field_value("missing", json!(1)).is_err());
	}
}
