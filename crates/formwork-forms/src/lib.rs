//! Model binding and validated form controllers
//!
//! This crate is the synchronous core of the form engine:
//! - [`binding`] — name-keyed typed access to an application-supplied
//!   backing object, with no static knowledge of its shape
//! - [`constraints`] — declarative per-field rules attached externally to
//!   the backing schema
//! - [`validation`] — the pure per-field validation pipeline and its
//!   structured, localization-deferred error records
//! - [`field`] / [`section`] / [`form`] — the controller hierarchy with
//!   dirty-tracking validation caches and write-through value commits
//! - [`view`] — explicit presentation-id allocation and the serializable
//!   view tree a host renders
//!
//! Everything here runs on the caller's thread; background orchestration
//! lives in `formwork-tasks`.

pub mod binding;
pub mod constraints;
pub mod field;
pub mod form;
pub mod section;
pub mod validation;
pub mod view;

pub use binding::{BackingModel, BindingError, BindingResult, FieldType, ModelBinding, PropertyMap};
pub use constraints::{Constraint, Schema};
pub use field::{CoercionError, FieldController, Widget};
pub use form::{FormController, FormError, FormResult};
pub use section::SectionController;
pub use validation::{
	CollectedErrors, DefaultMessages, ErrorDisplay, ErrorKind, MessageRenderer, ValidationError,
	validate_field,
};
pub use view::{ViewId, ViewIdAllocator, ViewNode, ViewSection, ViewTree};
