//! The validation engine and its error records
//!
//! [`validate_field`] evaluates one field's declared constraints against its
//! current backing value and returns structured [`ValidationError`] records.
//! It is pure with respect to engine state: result caching belongs to the
//! field controller, not to the engine.

use crate::binding::ModelBinding;
use crate::constraints::Schema;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::warn;

/// What went wrong with one field's value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
	/// The field is required and its value is absent.
	Required,
	/// A declared constraint failed; carries the violation message.
	Constraint { message: String },
}

/// An immutable validation failure record.
///
/// Message rendering is deferred to display time through a
/// [`MessageRenderer`], so validation results stay localization-agnostic.
///
/// # Examples
///
/// ```
/// use formwork_forms::{DefaultMessages, ErrorKind, ValidationError};
///
/// let error = ValidationError::required("email", Some("Email"));
/// assert_eq!(error.field_name(), "email");
/// assert_eq!(error.message(&DefaultMessages), "Email is required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationError {
	field_name: String,
	field_label: Option<String>,
	kind: ErrorKind,
}

impl ValidationError {
	/// A missing-required-value error.
	pub fn required(field_name: impl Into<String>, field_label: Option<&str>) -> Self {
		Self {
			field_name: field_name.into(),
			field_label: field_label.map(str::to_string),
			kind: ErrorKind::Required,
		}
	}

	/// A declared-constraint violation.
	pub fn constraint(
		field_name: impl Into<String>,
		field_label: Option<&str>,
		message: impl Into<String>,
	) -> Self {
		Self {
			field_name: field_name.into(),
			field_label: field_label.map(str::to_string),
			kind: ErrorKind::Constraint { message: message.into() },
		}
	}

	/// The unique field name this error belongs to.
	pub fn field_name(&self) -> &str {
		&self.field_name
	}

	/// The field's display label, when one was declared.
	pub fn field_label(&self) -> Option<&str> {
		self.field_label.as_deref()
	}

	/// The failure kind.
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Renders the human-readable message through the given formatter.
	///
	/// Falls back to the field name when no label was declared.
	pub fn message(&self, messages: &dyn MessageRenderer) -> String {
		let label = self.field_label.as_deref().unwrap_or(&self.field_name);
		match &self.kind {
			ErrorKind::Required => messages.required(label),
			ErrorKind::Constraint { message } => messages.constraint(label, message),
		}
	}
}

/// Pluggable error-message formatter.
///
/// Hosts that localize supply their own implementation; [`DefaultMessages`]
/// renders plain English.
pub trait MessageRenderer: Send + Sync {
	/// Message for a missing required value.
	fn required(&self, label: &str) -> String;

	/// Message for a constraint violation with its detail text.
	fn constraint(&self, label: &str, detail: &str) -> String;
}

/// Plain-English message rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageRenderer for DefaultMessages {
	fn required(&self, label: &str) -> String {
		format!("{label} is required")
	}

	fn constraint(&self, label: &str, detail: &str) -> String {
		format!("{label} {detail}")
	}
}

/// A value is absent when it is JSON `null` or an empty string.
pub(crate) fn is_absent(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		_ => false,
	}
}

/// Validates one field's current backing value.
///
/// Resolution failures on the binding are logged and treated as an absent
/// value, keeping validation total. The algorithm:
///
/// 1. absent value + required field -> exactly one `Required` error, and no
///    constraint checks run against the absent value;
/// 2. present value -> every violated declared constraint, in declaration
///    order (no short-circuit);
/// 3. absent value + optional field -> no errors.
///
/// # Examples
///
/// ```
/// use formwork_forms::{
///     Constraint, FieldType, ModelBinding, PropertyMap, Schema, validate_field,
/// };
/// use serde_json::json;
///
/// let model = PropertyMap::new().with_property("age", FieldType::Integer, json!(200));
/// let binding = ModelBinding::new(Box::new(model));
/// let schema = Schema::new().with_constraint("age", Constraint::max_value(150.0));
///
/// let errors = validate_field(&binding, &schema, "age", Some("Age"), false);
/// assert_eq!(errors.len(), 1);
/// ```
pub fn validate_field(
	binding: &ModelBinding,
	schema: &Schema,
	name: &str,
	label: Option<&str>,
	required: bool,
) -> Vec<ValidationError> {
	let value = match binding.value(name) {
		Ok(value) => value,
		Err(err) => {
			warn!(field = name, error = %err, "failed to read field value; treating as absent");
			Value::Null
		}
	};

	if is_absent(&value) {
		if required {
			return vec![ValidationError::required(name, label)];
		}
		return Vec::new();
	}

	schema
		.constraints_for(name)
		.iter()
		.filter_map(|constraint| constraint.check(&value))
		.map(|message| ValidationError::constraint(name, label, message))
		.collect()
}

/// Collaborator that presents validation errors to the user.
///
/// The engine calls this after a validation pass; how errors are rendered
/// (inline per-field, aggregated dialog) is entirely up to the host.
pub trait ErrorDisplay: Send {
	/// Clears any currently displayed errors.
	fn reset_errors(&self);

	/// Presents the aggregated errors of a validation pass.
	fn show_errors(&self, errors: &[ValidationError]);
}

/// Reference [`ErrorDisplay`] that accumulates errors in memory.
///
/// Useful for headless hosts and tests.
///
/// # Examples
///
/// ```
/// use formwork_forms::{CollectedErrors, ErrorDisplay, ValidationError};
///
/// let display = CollectedErrors::new();
/// display.show_errors(&[ValidationError::required("name", None)]);
/// assert_eq!(display.current().len(), 1);
/// display.reset_errors();
/// assert!(display.current().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct CollectedErrors {
	errors: Mutex<Vec<ValidationError>>,
}

impl CollectedErrors {
	/// Creates an empty collector.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a snapshot of the errors currently displayed.
	pub fn current(&self) -> Vec<ValidationError> {
		self.errors.lock().clone()
	}
}

impl ErrorDisplay for CollectedErrors {
	fn reset_errors(&self) {
		self.errors.lock().clear();
	}

	fn show_errors(&self, errors: &[ValidationError]) {
		let mut current = self.errors.lock();
		current.clear();
		current.extend_from_slice(errors);
	}
}
