//! Annotation data model.
//!
//! An [`Annotation`] is a typed span over a token sequence. Annotations built
//! from server rows span their own `value` text: the start index is always 0
//! and the size is the number of tokens in the value.

mod tokenizer;

pub use tokenizer::tokenize;

use indexmap::IndexMap;

/// Column holding the annotated text.
pub const VALUE_KEY: &str = "value";

/// Columns that describe the span itself and never become attributes.
pub const RESERVED_KEYS: [&str; 4] = [VALUE_KEY, "start index", "size", "end index"];

/// Returns `true` if `key` names one of the [`RESERVED_KEYS`].
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A typed, attributed span over a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    annotation_type: String,
    value: String,
    tokens: Vec<String>,
    attributes: IndexMap<String, String>,
}

impl Annotation {
    /// Creates an annotation of `annotation_type` spanning the tokens of `value`.
    #[must_use]
    pub fn new(annotation_type: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            annotation_type: annotation_type.into(),
            tokens: tokenize(&value),
            value,
            attributes: IndexMap::new(),
        }
    }

    /// Builds an annotation from one response row.
    ///
    /// Returns `None` when the row has no non-empty `value` column. Every
    /// other non-reserved column becomes an attribute, in column order.
    pub fn from_row<'k, 'v, I>(annotation_type: &str, row: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'k str, &'v str)>,
    {
        let mut value = None;
        let mut attributes = IndexMap::new();
        for (key, field) in row {
            if key == VALUE_KEY {
                value = Some(field);
            } else if !is_reserved_key(key) {
                attributes.insert(key.to_string(), field.to_string());
            }
        }

        let value = value.filter(|v| !v.is_empty())?;
        let mut annotation = Self::new(annotation_type, value);
        annotation.attributes = attributes;
        Some(annotation)
    }

    /// The annotation type.
    #[must_use]
    pub fn annotation_type(&self) -> &str {
        &self.annotation_type
    }

    /// The annotated text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Tokens derived from [`Self::value`].
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Index of the first spanned token.
    #[must_use]
    pub const fn start_index(&self) -> usize {
        0
    }

    /// Number of spanned tokens.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// Index one past the last spanned token.
    #[must_use]
    pub fn end_index(&self) -> usize {
        self.start_index() + self.size()
    }

    /// Looks up an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes, in insertion order.
    #[must_use]
    pub const fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Sets an attribute, returning the previous value if any.
    ///
    /// Reserved names are ignored.
    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        let name = name.into();
        if is_reserved_key(&name) {
            return None;
        }
        self.attributes.insert(name, value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_covers_value_tokens() {
        let annotation = Annotation::new("taxonomicName", "Apis mellifera L.");
        assert_eq!(annotation.annotation_type(), "taxonomicName");
        assert_eq!(annotation.start_index(), 0);
        assert_eq!(annotation.size(), 4);
        assert_eq!(annotation.end_index(), 4);
    }

    #[test]
    fn from_row_drops_reserved_columns() {
        let row = [
            ("value", "Apis mellifera"),
            ("start index", "12"),
            ("size", "2"),
            ("end index", "14"),
            ("rank", "species"),
            ("sourceDocId", "D42"),
        ];
        let annotation = Annotation::from_row("taxonomicName", row).unwrap();
        assert_eq!(annotation.value(), "Apis mellifera");
        let keys: Vec<&str> = annotation.attributes().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["rank", "sourceDocId"]);
        assert_eq!(annotation.attribute("rank"), Some("species"));
    }

    #[test]
    fn from_row_without_value_is_none() {
        assert!(Annotation::from_row("t", [("rank", "genus")]).is_none());
        assert!(Annotation::from_row("t", [("value", ""), ("rank", "genus")]).is_none());
    }

    #[test]
    fn set_attribute_ignores_reserved_names() {
        let mut annotation = Annotation::new("t", "x");
        assert_eq!(annotation.set_attribute("size", "9"), None);
        assert!(annotation.attributes().is_empty());
        assert_eq!(annotation.set_attribute("page", "3"), None);
        assert_eq!(annotation.set_attribute("page", "4"), Some("3".to_string()));
    }
}
