//! Field controllers: one durable controller per input element
//!
//! A controller holds the field's identity, requiredness, widget selection,
//! and validation cache. Its rendered view is disposable presentation that
//! may be recreated any number of times without recreating the controller.

use crate::binding::{BindingError, FieldType, ModelBinding};
use crate::constraints::Schema;
use crate::validation::{MessageRenderer, ValidationError, validate_field};
use crate::view::{ViewId, ViewIdAllocator, ViewNode};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

/// Input-element selection, a closed set of variants chosen by tag.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
	/// Free-form text entry.
	Text {
		/// Hint shown while the input is empty.
		placeholder: Option<String>,
		multi_line: bool,
		/// Hide the entered text (passwords).
		secure: bool,
	},
	/// Calendar date entry, ISO `YYYY-MM-DD`.
	DatePicker,
	/// Single choice from a fixed option list.
	Select { options: Vec<String> },
	/// Boolean toggle.
	Checkbox,
	/// Image chosen through an external picker hand-off.
	ImagePicker,
}

impl Widget {
	/// A plain single-line text widget.
	pub fn text() -> Self {
		Self::Text { placeholder: None, multi_line: false, secure: false }
	}
}

/// Raw input that could not be converted to the backing type.
///
/// Treated as "no value" by [`FieldController::commit_input`], never
/// propagated to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot interpret '{raw}' as {ty:?}")]
pub struct CoercionError {
	raw: String,
	ty: FieldType,
}

/// Converts raw text input into a backing value of the given type.
///
/// Empty input coerces to `null` for every non-text type. Text fields keep
/// the raw string, including the empty string.
pub(crate) fn coerce_input(raw: &str, ty: FieldType) -> Result<Value, CoercionError> {
	let trimmed = raw.trim();
	let fail = || CoercionError { raw: raw.to_string(), ty };
	match ty {
		FieldType::Text => Ok(Value::String(raw.to_string())),
		_ if trimmed.is_empty() => Ok(Value::Null),
		FieldType::Integer => trimmed
			.parse::<i64>()
			.map(|n| Value::Number(n.into()))
			.map_err(|_| fail()),
		FieldType::Float => trimmed
			.parse::<f64>()
			.ok()
			.and_then(serde_json::Number::from_f64)
			.map(Value::Number)
			.ok_or_else(fail),
		FieldType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
			"true" | "1" => Ok(Value::Bool(true)),
			"false" | "0" => Ok(Value::Bool(false)),
			_ => Err(fail()),
		},
		FieldType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
			.map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
			.map_err(|_| fail()),
	}
}

/// The durable state of one form field.
///
/// State machine: `Dirty` (needs validation, cache stale) ⇄ `Clean` (cache
/// valid). Controllers start `Dirty`; [`validate`](Self::validate) is the
/// only transition to `Clean`, and every value mutation transitions back.
///
/// # Examples
///
/// ```
/// use formwork_forms::FieldController;
///
/// let field = FieldController::text("email").with_label("Email").required();
/// assert_eq!(field.name(), "email");
/// assert!(field.is_required());
/// assert!(field.needs_validation());
/// ```
#[derive(Debug, Clone)]
pub struct FieldController {
	name: String,
	label: Option<String>,
	required: bool,
	widget: Widget,
	needs_validation: bool,
	cached_errors: Vec<ValidationError>,
	view_id: Option<ViewId>,
}

impl FieldController {
	/// Creates a controller with an explicit widget.
	pub fn new(name: impl Into<String>, widget: Widget) -> Self {
		Self {
			name: name.into(),
			label: None,
			required: false,
			widget,
			needs_validation: true,
			cached_errors: Vec::new(),
			view_id: None,
		}
	}

	/// A free-form text field.
	pub fn text(name: impl Into<String>) -> Self {
		Self::new(name, Widget::text())
	}

	/// A date-picker field (ISO `YYYY-MM-DD`).
	pub fn date(name: impl Into<String>) -> Self {
		Self::new(name, Widget::DatePicker)
	}

	/// A single-choice field over a fixed option list.
	pub fn select(name: impl Into<String>, options: Vec<String>) -> Self {
		Self::new(name, Widget::Select { options })
	}

	/// A boolean checkbox field.
	pub fn checkbox(name: impl Into<String>) -> Self {
		Self::new(name, Widget::Checkbox)
	}

	/// An image field, populated through an external picker hand-off.
	pub fn image(name: impl Into<String>) -> Self {
		Self::new(name, Widget::ImagePicker)
	}

	/// Sets the display label. Absence suppresses label rendering only.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Marks the field as required to have a value.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Sets the placeholder hint. No effect on non-text widgets.
	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		if let Widget::Text { placeholder: p, .. } = &mut self.widget {
			*p = Some(placeholder.into());
		}
		self
	}

	/// Enables multi-line input. No effect on non-text widgets.
	pub fn multi_line(mut self) -> Self {
		if let Widget::Text { multi_line, .. } = &mut self.widget {
			*multi_line = true;
		}
		self
	}

	/// Hides entered text from the user. No effect on non-text widgets.
	pub fn secure(mut self) -> Self {
		if let Widget::Text { secure, .. } = &mut self.widget {
			*secure = true;
		}
		self
	}

	/// The field's unique name within its owning form.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The display label, when one was declared.
	pub fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	/// Whether this field must have a value to validate.
	pub fn is_required(&self) -> bool {
		self.required
	}

	/// The widget selection tag.
	pub fn widget(&self) -> &Widget {
		&self.widget
	}

	/// Whether the validation cache is stale.
	pub fn needs_validation(&self) -> bool {
		self.needs_validation
	}

	/// The errors from the last validation pass.
	///
	/// Only trustworthy while [`needs_validation`](Self::needs_validation)
	/// is false.
	pub fn cached_errors(&self) -> &[ValidationError] {
		&self.cached_errors
	}

	/// Marks the field as needing validation. Called by every value mutation.
	pub fn set_needs_validation(&mut self) {
		self.needs_validation = true;
	}

	/// Validates the field, reusing the cache when nothing changed.
	///
	/// Idempotent while `Clean`: calling twice without an intervening value
	/// change returns the identical error list without re-computation.
	pub fn validate(&mut self, binding: &ModelBinding, schema: &Schema) -> &[ValidationError] {
		if self.needs_validation {
			self.cached_errors =
				validate_field(binding, schema, &self.name, self.label.as_deref(), self.required);
			self.needs_validation = false;
		}
		&self.cached_errors
	}

	/// Whether the field currently validates without errors.
	pub fn is_valid(&mut self, binding: &ModelBinding, schema: &Schema) -> bool {
		self.validate(binding, schema).is_empty()
	}

	/// Commits raw text input, coercing it to the backing type.
	///
	/// The write goes through the binding immediately, so an interruption
	/// mid-session never loses a committed value. Input that cannot be
	/// coerced resolves to "no value" rather than an error; either way the
	/// field transitions to `Dirty`.
	pub fn commit_input(&mut self, binding: &mut ModelBinding, raw: &str) {
		let ty = match binding.field_type(&self.name) {
			Ok(ty) => ty,
			Err(err) => {
				warn!(field = %self.name, error = %err, "cannot resolve backing type; input dropped");
				self.set_needs_validation();
				return;
			}
		};
		let value = match coerce_input(raw, ty) {
			Ok(value) => value,
			Err(err) => {
				// May simply mean the user is mid-entry ("-", "1."), so no error surfaces.
				debug!(field = %self.name, %err, "input not coercible; committing no value");
				Value::Null
			}
		};
		self.commit_value(binding, value);
	}

	/// Commits an already-typed value, writing through immediately.
	pub fn commit_value(&mut self, binding: &mut ModelBinding, value: Value) {
		if let Err(err) = binding.set_value(&self.name, value) {
			match &err {
				BindingError::UnknownField(_) => {
					warn!(field = %self.name, error = %err, "write to unresolvable field ignored")
				}
				BindingError::Access { .. } => {
					warn!(field = %self.name, error = %err, "write failed; value dropped")
				}
			}
		}
		self.set_needs_validation();
	}

	/// Renders the current backing value for display.
	///
	/// Absent values render as the empty string; binding failures are logged
	/// and render the same way.
	pub fn display_value(&self, binding: &ModelBinding) -> String {
		match binding.value(&self.name) {
			Ok(Value::Null) => String::new(),
			Ok(Value::String(s)) => s,
			Ok(Value::Number(n)) => n.to_string(),
			Ok(Value::Bool(b)) => b.to_string(),
			Ok(other) => other.to_string(),
			Err(err) => {
				warn!(field = %self.name, error = %err, "failed to read display value");
				String::new()
			}
		}
	}

	/// The field's stable presentation identifier, allocated on first use
	/// and reused across every view recreation.
	pub fn view_id(&mut self, allocator: &ViewIdAllocator) -> ViewId {
		*self.view_id.get_or_insert_with(|| allocator.next_id())
	}

	/// Builds the disposable presentation node for this controller.
	pub fn create_view(
		&mut self,
		binding: &ModelBinding,
		allocator: &ViewIdAllocator,
		messages: &dyn MessageRenderer,
	) -> ViewNode {
		let error = if self.needs_validation {
			None
		} else {
			self.cached_errors.first().map(|e| e.message(messages))
		};
		ViewNode {
			id: self.view_id(allocator),
			name: self.name.clone(),
			label: self.label.clone(),
			widget: self.widget.clone(),
			value: self.display_value(binding),
			error,
		}
	}
}
