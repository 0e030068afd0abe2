//! Record types shipped with the server.
//!
//! `persons` collections hold [`Person`] records. Every other configured
//! collection holds [`Document`]s: open JSON objects with an optional string id.

use crate::record::{DataClass, FieldKind, FieldSpec, Record};
use crate::service::MemoryService;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource name served by [`PersonService`].
pub const PERSONS: &str = "persons";

static PERSON_CLASS: DataClass = DataClass {
    name: "Person",
    fields: &[
        FieldSpec::optional("id", FieldKind::String),
        FieldSpec::required("firstName", FieldKind::String),
        FieldSpec::required("lastName", FieldKind::String),
        FieldSpec::optional("nickName", FieldKind::String),
    ],
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
}

impl Person {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            nick_name: None,
        }
    }
}

impl Record for Person {
    fn data_class() -> &'static DataClass {
        &PERSON_CLASS
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn with_id(self, id: String) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }
}

static DOCUMENT_CLASS: DataClass = DataClass {
    name: "Document",
    fields: &[FieldSpec::optional("id", FieldKind::String)],
};

/// Schemaless JSON object record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl Record for Document {
    fn data_class() -> &'static DataClass {
        &DOCUMENT_CLASS
    }

    fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    fn with_id(mut self, id: String) -> Self {
        self.fields.insert("id".to_string(), Value::String(id));
        self
    }
}

pub type PersonService = MemoryService<Person>;
pub type DocumentService = MemoryService<Document>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_wire_format() {
        let person = Person::new("Ada", "Lovelace").with_id("1".into());
        let value = serde_json::to_value(&person).unwrap();
        assert_eq!(
            value,
            json!({"id": "1", "firstName": "Ada", "lastName": "Lovelace"})
        );

        let decoded: Person =
            serde_json::from_value(json!({"firstName": "A", "lastName": "B", "nickName": "C"}))
                .unwrap();
        assert_eq!(decoded.id, None);
        assert_eq!(decoded.nick_name.as_deref(), Some("C"));
    }

    #[test]
    fn test_explicit_id_ignores_empty() {
        let mut person = Person::new("A", "B");
        person.id = Some(String::new());
        assert_eq!(person.explicit_id(), None);
        assert_eq!(person.with_id("x".into()).explicit_id(), Some("x"));
    }

    #[test]
    fn test_document_id() {
        let doc: Document = serde_json::from_value(json!({"title": "t"})).unwrap();
        assert_eq!(doc.id(), None);
        let doc = doc.with_id("abc".into());
        assert_eq!(doc.id(), Some("abc"));
        assert_eq!(doc.get("title"), Some(&json!("t")));
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"title": "t", "id": "abc"})
        );
    }
}
