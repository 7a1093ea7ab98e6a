//! Document identifiers and reference fields.
//!
//! Documents on the document-store side are JSON mappings carrying a
//! mandatory unique identifier under [`ID_FIELD`]. A field referring to
//! another document holds a [`Ref`]: either the raw identifier or the
//! already-resolved document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The mandatory unique identifier field of every document.
pub const ID_FIELD: &str = "_id";

/// Stringifies an identifier value for use as a lookup key.
///
/// Strings pass through unchanged, numbers go through their display form,
/// anything else through its JSON text.
pub fn ref_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A reference field: either a raw identifier or a resolved document.
///
/// Both projections are total: an identifier projects to the minimal
/// document `{"_id": id}`, and a document projects to its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref {
    /// A raw identifier pointing at another document.
    Id(String),
    /// An already-resolved document. Expected to carry [`ID_FIELD`].
    Doc(Map<String, Value>),
}

impl Ref {
    /// The identifier, whichever form the reference is in.
    pub fn as_id(&self) -> String {
        match self {
            Ref::Id(id) => id.clone(),
            Ref::Doc(doc) => ref_key(doc.get(ID_FIELD).unwrap_or(&Value::Null)),
        }
    }

    /// The document, whichever form the reference is in. An unresolved
    /// reference becomes the minimal document holding only its identifier.
    pub fn into_doc(self) -> Map<String, Value> {
        match self {
            Ref::Id(id) => {
                let mut doc = Map::new();
                doc.insert(ID_FIELD.to_string(), Value::String(id));
                doc
            }
            Ref::Doc(doc) => doc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ref_key_stringifies_identifiers() {
        assert_eq!(ref_key(&json!("u1")), "u1");
        assert_eq!(ref_key(&json!(42)), "42");
        assert_eq!(ref_key(&json!({ "k": 1 })), r#"{"k":1}"#);
    }

    #[test]
    fn ref_projections_are_total() {
        let raw = Ref::Id("u1".to_string());
        assert_eq!(raw.as_id(), "u1");
        assert_eq!(Value::Object(raw.into_doc()), json!({ "_id": "u1" }));

        let Value::Object(doc) = json!({ "_id": "u2", "name": "Bea" }) else {
            unreachable!()
        };
        let resolved = Ref::Doc(doc.clone());
        assert_eq!(resolved.as_id(), "u2");
        assert_eq!(resolved.into_doc(), doc);
    }

    #[test]
    fn ref_deserializes_untagged() {
        let raw: Ref = serde_json::from_value(json!("u1")).unwrap();
        assert_eq!(raw, Ref::Id("u1".to_string()));

        let resolved: Ref = serde_json::from_value(json!({ "_id": "u1" })).unwrap();
        assert_eq!(resolved.as_id(), "u1");
    }
}
