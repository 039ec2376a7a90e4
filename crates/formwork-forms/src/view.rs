//! Presentation identifiers and the renderer-agnostic view tree
//!
//! The engine does not render anything. [`FormController::recreate_views`]
//! (see [`crate::form`]) produces a [`ViewTree`] — plain serializable data a
//! host can turn into whatever widget toolkit it uses. Presentation
//! identifiers come from an explicit [`ViewIdAllocator`] so they stay unique
//! process-wide across all concurrently live forms.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Identifier of one presentation node, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ViewId(u64);

impl ViewId {
	/// The raw identifier value.
	pub fn value(&self) -> u64 {
		self.0
	}
}

impl std::fmt::Display for ViewId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "view#{}", self.0)
	}
}

/// Monotonic allocator for [`ViewId`]s.
///
/// An explicit, injectable service rather than ambient static state: forms
/// receive an `Arc<ViewIdAllocator>` and the default [`global`](Self::global)
/// instance spans the process, so identifiers never collide across live
/// forms.
///
/// # Examples
///
/// ```
/// use formwork_forms::ViewIdAllocator;
///
/// let alloc = ViewIdAllocator::global();
/// let a = alloc.next_id();
/// let b = alloc.next_id();
/// assert_ne!(a, b);
/// assert!(b > a);
/// ```
#[derive(Debug, Default)]
pub struct ViewIdAllocator {
	next: AtomicU64,
}

impl ViewIdAllocator {
	/// Creates an independent allocator starting at zero.
	///
	/// Distinct allocators issue overlapping ids; share one allocator across
	/// every form whose views can coexist.
	pub fn new() -> Self {
		Self { next: AtomicU64::new(0) }
	}

	/// The process-wide allocator.
	pub fn global() -> &'static Arc<Self> {
		static GLOBAL: OnceLock<Arc<ViewIdAllocator>> = OnceLock::new();
		GLOBAL.get_or_init(|| Arc::new(ViewIdAllocator::new()))
	}

	/// Issues the next identifier. Never returns the same id twice.
	pub fn next_id(&self) -> ViewId {
		ViewId(self.next.fetch_add(1, Ordering::Relaxed))
	}
}

/// One rendered form element: a field with its current display state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ViewNode {
	/// Stable presentation identifier, reused across view recreation.
	pub id: ViewId,
	/// The bound field name.
	pub name: String,
	/// Label text; `None` suppresses label rendering, not the field.
	pub label: Option<String>,
	/// Widget selection tag.
	pub widget: crate::field::Widget,
	/// The backing value rendered for display.
	pub value: String,
	/// Rendered message of the first cached error, when validation has run.
	pub error: Option<String>,
}

/// One section of the rendered form.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ViewSection {
	/// Section heading; `None` renders the fields without a header.
	pub title: Option<String>,
	/// Field nodes in display order.
	pub fields: Vec<ViewNode>,
}

/// The whole form's presentation state, rebuilt by `recreate_views`.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct ViewTree {
	/// Sections in display order.
	pub sections: Vec<ViewSection>,
}

impl ViewTree {
	/// Total number of field nodes across all sections.
	pub fn field_count(&self) -> usize {
		self.sections.iter().map(|s| s.fields.len()).sum()
	}

	/// Finds a field node by bound field name.
	pub fn field(&self, name: &str) -> Option<&ViewNode> {
		self.sections
			.iter()
			.flat_map(|s| s.fields.iter())
			.find(|n| n.name == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn test_allocator_is_monotonic() {
		let alloc = ViewIdAllocator::new();
		let ids: Vec<_> = (0..100).map(|_| alloc.next_id()).collect();
		assert!(ids.windows(2).all(|w| w[0] < w[1]));
	}

	#[test]
	fn test_global_allocator_distinct_across_threads() {
		let handles: Vec<_> = (0..4)
			.map(|_| {
				std::thread::spawn(|| {
					(0..1000)
						.map(|_| ViewIdAllocator::global().next_id())
						.collect::<Vec<_>>()
				})
			})
			.collect();

		let mut seen = HashSet::new();
		for handle in handles {
			for id in handle.join().unwrap() {
				assert!(seen.insert(id), "duplicate id {id}");
			}
		}
	}
}
