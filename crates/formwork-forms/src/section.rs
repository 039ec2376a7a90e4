//! Section controllers: ordered, optionally titled groups of fields

use crate::field::FieldController;

/// An ordered, named group of field controllers.
///
/// Insertion order is display order and is semantically meaningful; the
/// section never reorders fields implicitly.
///
/// # Examples
///
/// ```
/// use formwork_forms::{FieldController, SectionController};
///
/// let mut section = SectionController::new(Some("Contact"));
/// section.add_field(FieldController::text("email"));
/// section.add_field(FieldController::text("phone"));
///
/// let names: Vec<_> = section.fields().iter().map(|f| f.name()).collect();
/// assert_eq!(names, ["email", "phone"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SectionController {
	title: Option<String>,
	fields: Vec<FieldController>,
}

impl SectionController {
	/// Creates a section; `None` renders its fields without a header.
	pub fn new(title: Option<&str>) -> Self {
		Self { title: title.map(str::to_string), fields: Vec::new() }
	}

	/// The section heading, when one was declared.
	pub fn title(&self) -> Option<&str> {
		self.title.as_deref()
	}

	/// Appends a field at the end of the section.
	pub fn add_field(&mut self, field: FieldController) {
		self.fields.push(field);
	}

	/// Builder form of [`add_field`](Self::add_field).
	pub fn with_field(mut self, field: FieldController) -> Self {
		self.add_field(field);
		self
	}

	/// The fields in display order.
	pub fn fields(&self) -> &[FieldController] {
		&self.fields
	}

	/// Mutable access to the fields, preserving order.
	pub fn fields_mut(&mut self) -> &mut [FieldController] {
		&mut self.fields
	}

	/// Finds a field by name.
	pub fn field(&self, name: &str) -> Option<&FieldController> {
		self.fields.iter().find(|f| f.name() == name)
	}

	/// Finds a field by name, mutably.
	pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldController> {
		self.fields.iter_mut().find(|f| f.name() == name)
	}

	/// Removes a field by name, returning it when present.
	pub fn remove_field(&mut self, name: &str) -> Option<FieldController> {
		let pos = self.fields.iter().position(|f| f.name() == name)?;
		Some(self.fields.remove(pos))
	}
}
