//! Placeholder substitution for portable build plans.
//!
//! A build plan generated by cargo is full of absolute paths that only make
//! sense on the machine that produced it. Patching replaces those paths with
//! placeholder tokens, and running replaces the tokens with the paths of the
//! current host.
//!
//! # Placeholder Tokens
//!
//! - `{{PROJECT_ROOT}}` - the directory the plan was generated in
//! - `{{CARGO_HOME}}` - cargo's home directory
//! - `{{RUSTC}}` - the compiler (resolved at run time, never persisted)
//!
//! # Example
//!
//! ```
//! use not_quite_cargo_lib::placeholder::Substitutions;
//!
//! let subs = Substitutions::new().with("{{PROJECT_ROOT}}", "/work/app");
//! assert_eq!(subs.apply_str("{{PROJECT_ROOT}}/src/main.rs"), "/work/app/src/main.rs");
//!
//! let back = subs.inverted();
//! assert_eq!(back.apply_str("/work/app/src/main.rs"), "{{PROJECT_ROOT}}/src/main.rs");
//! ```

use std::cmp::Reverse;

use serde_json::{Map, Value};

/// A table of text replacements, applied to every string of a document.
///
/// Replacements are applied one after another, longest needle first, so a
/// path nested inside another (a cargo home inside the project root) is
/// matched before its parent. Ties are broken by the needle text, which keeps
/// the output reproducible regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
  entries: Vec<(String, String)>,
}

impl Substitutions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a replacement of `from` by `to`, returning the table.
  pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
    self.insert(from, to);
    self
  }

  /// Add a replacement of `from` by `to`.
  ///
  /// Inserting the same needle twice keeps only the latest replacement.
  pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
    let from = from.into();
    let to = to.into();
    match self.entries.iter_mut().find(|(f, _)| *f == from) {
      Some(entry) => entry.1 = to,
      None => self.entries.push((from, to)),
    }
    self.entries.sort_by(|(a, _), (b, _)| (Reverse(a.len()), a).cmp(&(Reverse(b.len()), b)));
  }

  /// Remove the replacement for `from`, returning its value.
  pub fn remove(&mut self, from: &str) -> Option<String> {
    let pos = self.entries.iter().position(|(f, _)| f == from)?;
    Some(self.entries.remove(pos).1)
  }

  /// The table for the opposite direction.
  pub fn inverted(&self) -> Self {
    let mut inverted = Self::new();
    for (from, to) in &self.entries {
      inverted.insert(to.clone(), from.clone());
    }
    inverted
  }

  /// Replace every occurrence of every needle in a single string.
  pub fn apply_str(&self, input: &str) -> String {
    let mut result = input.to_string();
    for (from, to) in &self.entries {
      // An empty needle would match between every character
      if from.is_empty() {
        continue;
      }
      if result.contains(from.as_str()) {
        result = result.replace(from.as_str(), to);
      }
    }
    result
  }

  /// Substitute through a whole document tree.
  ///
  /// Strings are rewritten, objects have both keys and values rewritten,
  /// arrays are rewritten element by element, and every other value is
  /// returned as is.
  pub fn apply(&self, value: Value) -> Value {
    match value {
      Value::String(s) => Value::String(self.apply_str(&s)),
      Value::Array(items) => Value::Array(items.into_iter().map(|item| self.apply(item)).collect()),
      Value::Object(map) => Value::Object(
        map
          .into_iter()
          .map(|(key, value)| (self.apply_str(&key), self.apply(value)))
          .collect::<Map<String, Value>>(),
      ),
      other => other,
    }
  }
}

/// Find the first of `tokens` still present anywhere in a document.
pub fn find_token<'a>(value: &Value, tokens: &[&'a str]) -> Option<&'a str> {
  match value {
    Value::String(s) => tokens.iter().copied().find(|t| s.contains(t)),
    Value::Array(items) => items.iter().find_map(|item| find_token(item, tokens)),
    Value::Object(map) => map
      .iter()
      .find_map(|(key, value)| tokens.iter().copied().find(|t| key.contains(t)).or_else(|| find_token(value, tokens))),
    _ => None,
  }
}
