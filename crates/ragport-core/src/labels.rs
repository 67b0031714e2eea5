//! Normalization of free-text entity types into graph labels.
//!
//! Extraction output types are arbitrary model text (`"ORGANIZATION"`,
//! `disease site`, `bio-marker`), so labels are derived with a pure function
//! that tolerates stray quotes, punctuation and casing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remove every embedded `"` character.
///
/// Extracted names and types sometimes keep the quotes the model wrapped
/// them in; entity names are stored and matched in stripped form.
pub fn strip_quotes(text: &str) -> String {
    text.replace('"', "")
}

/// Convert arbitrary text to `UpperCamelCase`.
///
/// Words are maximal runs of alphanumeric characters. Each word is lowercased
/// and its first character uppercased.
pub fn upper_camel_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(|c: char| !c.is_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

/// The type sublabel attached to an entity node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeLabel {
    /// The entity had no usable type and carries no extra label.
    Untyped,
    Typed(String),
}

impl TypeLabel {
    /// Derive the label for an entity's declared type.
    pub fn derive(entity_type: Option<&str>) -> Self {
        let label = entity_type
            .map(|t| upper_camel_case(&strip_quotes(t)))
            .unwrap_or_default();
        if label.is_empty() {
            TypeLabel::Untyped
        } else {
            TypeLabel::Typed(label)
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypeLabel::Untyped => None,
            TypeLabel::Typed(label) => Some(label),
        }
    }

    /// Labels as stored on the entity node (empty or a single element).
    pub fn to_labels(&self) -> Vec<String> {
        self.as_str().map(str::to_string).into_iter().collect()
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}
