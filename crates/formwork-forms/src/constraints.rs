//! Declarative constraints attached to backing-model properties
//!
//! Constraints are declared against field names in a [`Schema`] supplied by
//! the application, not hard-coded per field type. The validation engine
//! checks every constraint registered for a field, in declaration order.

use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// A single declarative rule against one field's value.
///
/// Each variant carries an optional custom message; `check` returns the
/// violation message when the rule fails, or `None` when it holds.
///
/// # Examples
///
/// ```
/// use formwork_forms::Constraint;
/// use serde_json::json;
///
/// let rule = Constraint::max_length(5);
/// assert!(rule.check(&json!("short")).is_none());
/// assert!(rule.check(&json!("too long for this")).is_some());
/// ```
#[derive(Clone)]
pub enum Constraint {
	/// String value must contain at least `min` characters.
	MinLength { min: usize, message: Option<String> },
	/// String value must contain at most `max` characters.
	MaxLength { max: usize, message: Option<String> },
	/// Numeric value must be at least `min`.
	MinValue { min: f64, message: Option<String> },
	/// Numeric value must be at most `max`.
	MaxValue { max: f64, message: Option<String> },
	/// String value must match the pattern.
	Pattern { regex: Regex, message: Option<String> },
	/// Application-supplied predicate; the `Err` payload is the message.
	Custom { check: Predicate },
}

impl Constraint {
	/// Minimum string length rule.
	pub fn min_length(min: usize) -> Self {
		Self::MinLength { min, message: None }
	}

	/// Maximum string length rule.
	pub fn max_length(max: usize) -> Self {
		Self::MaxLength { max, message: None }
	}

	/// Minimum numeric value rule.
	pub fn min_value(min: f64) -> Self {
		Self::MinValue { min, message: None }
	}

	/// Maximum numeric value rule.
	pub fn max_value(max: f64) -> Self {
		Self::MaxValue { max, message: None }
	}

	/// Pattern rule from a pre-compiled regex.
	pub fn pattern(regex: Regex) -> Self {
		Self::Pattern { regex, message: None }
	}

	/// Custom predicate rule. The closure returns `Err(message)` on violation.
	///
	/// # Examples
	///
	/// ```
	/// use formwork_forms::Constraint;
	/// use serde_json::json;
	///
	/// let even = Constraint::custom(|value| {
	///     match value.as_i64() {
	///         Some(n) if n % 2 == 0 => Ok(()),
	///         _ => Err("must be an even number".to_string()),
	///     }
	/// });
	/// assert!(even.check(&json!(4)).is_none());
	/// assert_eq!(even.check(&json!(3)).as_deref(), Some("must be an even number"));
	/// ```
	pub fn custom<F>(check: F) -> Self
	where
		F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
	{
		Self::Custom { check: Arc::new(check) }
	}

	/// Replaces the default violation message.
	///
	/// Has no effect on [`Constraint::Custom`], whose predicate already
	/// produces the message.
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		match &mut self {
			Self::MinLength { message: m, .. }
			| Self::MaxLength { message: m, .. }
			| Self::MinValue { message: m, .. }
			| Self::MaxValue { message: m, .. }
			| Self::Pattern { message: m, .. } => *m = Some(message.into()),
			Self::Custom { .. } => {}
		}
		self
	}

	/// Checks the rule against a present value.
	///
	/// Returns the violation message on failure, `None` on success. Values
	/// of the wrong shape for the rule (e.g. a number under a length rule)
	/// count as violations: the message names the expected shape.
	pub fn check(&self, value: &Value) -> Option<String> {
		match self {
			Self::MinLength { min, message } => match value.as_str() {
				Some(s) if s.chars().count() >= *min => None,
				Some(_) => Some(override_or(message, format!("must be at least {min} characters"))),
				None => Some(override_or(message, "must be text".to_string())),
			},
			Self::MaxLength { max, message } => match value.as_str() {
				Some(s) if s.chars().count() <= *max => None,
				Some(_) => Some(override_or(message, format!("must be at most {max} characters"))),
				None => Some(override_or(message, "must be text".to_string())),
			},
			Self::MinValue { min, message } => match value.as_f64() {
				Some(n) if n >= *min => None,
				Some(_) => Some(override_or(message, format!("must be at least {min}"))),
				None => Some(override_or(message, "must be a number".to_string())),
			},
			Self::MaxValue { max, message } => match value.as_f64() {
				Some(n) if n <= *max => None,
				Some(_) => Some(override_or(message, format!("must be at most {max}"))),
				None => Some(override_or(message, "must be a number".to_string())),
			},
			Self::Pattern { regex, message } => match value.as_str() {
				Some(s) if regex.is_match(s) => None,
				Some(_) => {
					Some(override_or(message, format!("must match the pattern '{}'", regex.as_str())))
				}
				None => Some(override_or(message, "must be text".to_string())),
			},
			Self::Custom { check } => check(value).err(),
		}
	}
}

fn override_or(message: &Option<String>, fallback: String) -> String {
	message.clone().unwrap_or(fallback)
}

impl std::fmt::Debug for Constraint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::MinLength { min, .. } => f.debug_struct("MinLength").field("min", min).finish(),
			Self::MaxLength { max, .. } => f.debug_struct("MaxLength").field("max", max).finish(),
			Self::MinValue { min, .. } => f.debug_struct("MinValue").field("min", min).finish(),
			Self::MaxValue { max, .. } => f.debug_struct("MaxValue").field("max", max).finish(),
			Self::Pattern { regex, .. } => {
				f.debug_struct("Pattern").field("regex", &regex.as_str()).finish()
			}
			Self::Custom { .. } => f.debug_struct("Custom").finish_non_exhaustive(),
		}
	}
}

/// Per-field constraint registry, attached externally to the backing schema.
///
/// Declaration order per field is preserved and is the order violations are
/// reported in.
///
/// # Examples
///
/// ```
/// use formwork_forms::{Constraint, Schema};
///
/// let mut schema = Schema::new();
/// schema.add_constraint("username", Constraint::min_length(3));
/// schema.add_constraint("username", Constraint::max_length(20));
/// assert_eq!(schema.constraints_for("username").len(), 2);
/// assert!(schema.constraints_for("other").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
	rules: Vec<(String, Vec<Constraint>)>,
}

impl Schema {
	/// Creates an empty schema.
	pub fn new() -> Self {
		Self { rules: Vec::new() }
	}

	/// Appends a constraint to the named field's rule list.
	pub fn add_constraint(&mut self, field: impl Into<String>, constraint: Constraint) {
		let field = field.into();
		match self.rules.iter_mut().find(|(name, _)| *name == field) {
			Some((_, list)) => list.push(constraint),
			None => self.rules.push((field, vec![constraint])),
		}
	}

	/// Builder form of [`add_constraint`](Self::add_constraint).
	pub fn with_constraint(mut self, field: impl Into<String>, constraint: Constraint) -> Self {
		self.add_constraint(field, constraint);
		self
	}

	/// Returns the constraints registered for a field, in declaration order.
	pub fn constraints_for(&self, field: &str) -> &[Constraint] {
		self.rules
			.iter()
			.find(|(name, _)| name == field)
			.map(|(_, list)| list.as_slice())
			.unwrap_or(&[])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_length_bounds() {
		let min = Constraint::min_length(3);
		assert!(min.check(&json!("abc")).is_none());
		assert!(min.check(&json!("ab")).is_some());

		let max = Constraint::max_length(3);
		assert!(max.check(&json!("abc")).is_none());
		assert!(max.check(&json!("abcd")).is_some());
	}

	#[test]
	fn test_numeric_bounds() {
		let min = Constraint::min_value(0.0);
		assert!(min.check(&json!(0)).is_none());
		assert!(min.check(&json!(-1)).is_some());

		let max = Constraint::max_value(150.0);
		assert!(max.check(&json!(150)).is_none());
		assert!(max.check(&json!(151)).is_some());
	}

	#[test]
	fn test_pattern() {
		let rule = Constraint::pattern(Regex::new("^[A-Z]{3}$").unwrap());
		assert!(rule.check(&json!("ABC")).is_none());
		assert!(rule.check(&json!("abc")).is_some());
	}

	#[test]
	fn test_wrong_value_shape_is_a_violation() {
		let rule = Constraint::min_length(1);
		assert_eq!(rule.check(&json!(42)).as_deref(), Some("must be text"));

		let rule = Constraint::min_value(0.0);
		assert_eq!(rule.check(&json!("abc")).as_deref(), Some("must be a number"));
	}

	#[test]
	fn test_message_override() {
		let rule = Constraint::min_length(8).with_message("Password too short");
		assert_eq!(rule.check(&json!("abc")).as_deref(), Some("Password too short"));
	}

	#[test]
	fn test_schema_preserves_declaration_order() {
		let schema = Schema::new()
			.with_constraint("name", Constraint::min_length(2))
			.with_constraint("name", Constraint::max_length(10))
			.with_constraint("name", Constraint::pattern(Regex::new("^[a-z]+$").unwrap()));

		let rules = schema.constraints_for("name");
		assert_eq!(rules.len(), 3);
		assert!(matches!(rules[0], Constraint::MinLength { .. }));
		assert!(matches!(rules[1], Constraint::MaxLength { .. }));
		assert!(matches!(rules[2], Constraint::Pattern { .. }));
	}
}
