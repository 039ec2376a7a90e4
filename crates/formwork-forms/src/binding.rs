//! Model binding: name-keyed access to an application-supplied backing object
//!
//! The engine never sees the concrete shape of the model it edits. It resolves
//! field names to typed values through the [`BackingModel`] capability trait,
//! which an application implements once per model type (by hand, through code
//! generation, or with the ready-made [`PropertyMap`]).

use serde_json::Value;

/// Result alias for backing-model access.
pub type BindingResult<T> = Result<T, BindingError>;

/// Errors raised while resolving a field name against the backing object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
	/// The field name does not exist on the backing object. This is a
	/// programming error, not user input: it fails loudly instead of
	/// resolving to a silent null.
	#[error("Unknown field '{0}' on backing model")]
	UnknownField(String),
	/// The field exists but could not be read or written.
	#[error("Cannot access field '{name}': {reason}")]
	Access { name: String, reason: String },
}

/// Type descriptor for a backing property.
///
/// Field controllers use this to coerce raw text input into the correct
/// backing representation, which keeps the engine agnostic of the model
/// shape the application supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
	Text,
	Integer,
	Float,
	Boolean,
	Date,
}

/// Capability interface over an application-supplied backing object.
///
/// This is the reflective-equivalent seam: `get`/`set`/`field_type` keyed by
/// a unique field name. Implementations must treat unresolvable names as
/// [`BindingError::UnknownField`], never as a silent missing value.
///
/// # Examples
///
/// ```
/// use formwork_forms::{BackingModel, FieldType, PropertyMap};
/// use serde_json::json;
///
/// let mut model = PropertyMap::new().with_property("name", FieldType::Text, json!("Ada"));
/// assert_eq!(model.get("name").unwrap(), json!("Ada"));
/// model.set("name", json!("Grace")).unwrap();
/// assert_eq!(model.field_type("name").unwrap(), FieldType::Text);
/// assert!(model.get("missing").is_err());
/// ```
pub trait BackingModel: Send {
	/// Returns the current value of the named property.
	fn get(&self, name: &str) -> BindingResult<Value>;

	/// Writes a new value through to the named property.
	fn set(&mut self, name: &str, value: Value) -> BindingResult<()>;

	/// Returns the type descriptor for the named property.
	fn field_type(&self, name: &str) -> BindingResult<FieldType>;
}

/// Explicit property-map implementation of [`BackingModel`].
///
/// Stores declared properties as `name -> (type, value)`. Useful for
/// prototyping, tests, and hosts that assemble models dynamically; typed
/// applications implement [`BackingModel`] directly on their own structs.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
	properties: Vec<(String, FieldType, Value)>,
}

impl PropertyMap {
	/// Creates an empty property map.
	pub fn new() -> Self {
		Self { properties: Vec::new() }
	}

	/// Declares a property with its type and initial value.
	///
	/// Re-declaring an existing name replaces its type and value.
	///
	/// # Examples
	///
	/// ```
	/// use formwork_forms::{BackingModel, FieldType, PropertyMap};
	/// use serde_json::json;
	///
	/// let model = PropertyMap::new()
	///     .with_property("age", FieldType::Integer, json!(30));
	/// assert_eq!(model.get("age").unwrap(), json!(30));
	/// ```
	pub fn with_property(mut self, name: impl Into<String>, ty: FieldType, value: Value) -> Self {
		let name = name.into();
		match self.properties.iter_mut().find(|(n, _, _)| *n == name) {
			Some(slot) => {
				slot.1 = ty;
				slot.2 = value;
			}
			None => self.properties.push((name, ty, value)),
		}
		self
	}

	/// Returns the declared property names, in declaration order.
	pub fn property_names(&self) -> impl Iterator<Item = &str> {
		self.properties.iter().map(|(n, _, _)| n.as_str())
	}
}

impl BackingModel for PropertyMap {
	fn get(&self, name: &str) -> BindingResult<Value> {
		self.properties
			.iter()
			.find(|(n, _, _)| n == name)
			.map(|(_, _, v)| v.clone())
			.ok_or_else(|| BindingError::UnknownField(name.to_string()))
	}

	fn set(&mut self, name: &str, value: Value) -> BindingResult<()> {
		let slot = self
			.properties
			.iter_mut()
			.find(|(n, _, _)| n == name)
			.ok_or_else(|| BindingError::UnknownField(name.to_string()))?;
		slot.2 = value;
		Ok(())
	}

	fn field_type(&self, name: &str) -> BindingResult<FieldType> {
		self.properties
			.iter()
			.find(|(n, _, _)| n == name)
			.map(|(_, t, _)| *t)
			.ok_or_else(|| BindingError::UnknownField(name.to_string()))
	}
}

/// The form's accessor over its backing object.
///
/// One `ModelBinding` is created per form instance and lives exactly as long
/// as the [`FormController`](crate::FormController) that owns it; it is never
/// rebound to a different backing object.
pub struct ModelBinding {
	model: Box<dyn BackingModel>,
}

impl ModelBinding {
	/// Wraps a backing object for the lifetime of one form.
	///
	/// # Examples
	///
	/// ```
	/// use formwork_forms::{FieldType, ModelBinding, PropertyMap};
	/// use serde_json::json;
	///
	/// let model = PropertyMap::new().with_property("title", FieldType::Text, json!("hello"));
	/// let binding = ModelBinding::new(Box::new(model));
	/// assert_eq!(binding.value("title").unwrap(), json!("hello"));
	/// ```
	pub fn new(model: Box<dyn BackingModel>) -> Self {
		Self { model }
	}

	/// Returns the current value of the named field.
	pub fn value(&self, name: &str) -> BindingResult<Value> {
		self.model.get(name)
	}

	/// Writes a value through to the backing object immediately.
	pub fn set_value(&mut self, name: &str, value: Value) -> BindingResult<()> {
		self.model.set(name, value)
	}

	/// Returns the type descriptor used to coerce raw input for this field.
	pub fn field_type(&self, name: &str) -> BindingResult<FieldType> {
		self.model.field_type(name)
	}
}

impl std::fmt::Debug for ModelBinding {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModelBinding").finish_non_exhaustive()
	}
}
