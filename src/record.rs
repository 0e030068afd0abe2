use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON type a declared field must hold when present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    /// Any JSON value
    Any,
}

impl FieldKind {
    fn accepts(self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match self {
            FieldKind::String => matches!(value, Value::String(_)),
            FieldKind::Number => matches!(value, Value::Number(_)),
            FieldKind::Boolean => matches!(value, Value::Bool(_)),
            FieldKind::Any => true,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Number => "a number",
            FieldKind::Boolean => "a boolean",
            FieldKind::Any => "any value",
        }
    }
}

/// One declared field of a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name (as it appears in JSON)
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    /// Whether `value` is acceptable for this field (`null` counts as absent).
    #[must_use]
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        value.is_null() || self.kind.accepts(value)
    }

    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.kind.describe()
    }
}

/// Structural type descriptor used to decode request bodies
///
/// Fields not listed here are passed through to serde untouched; the
/// descriptor only guards the fields it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataClass {
    /// Type name used in error messages and logs
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl DataClass {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }
}

/// A value stored in a resource collection
///
/// Records are immutable values; "changing" one means storing a new value
/// under the same id. The `id` field is the only field the server itself
/// interprets.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Descriptor of this record type.
    fn data_class() -> &'static DataClass;

    /// The record's own id, if it carries one.
    fn id(&self) -> Option<&str>;

    /// Same record with `id` assigned.
    #[must_use]
    fn with_id(self, id: String) -> Self;

    /// The record's id unless it is absent or empty.
    fn explicit_id(&self) -> Option<&str> {
        self.id().filter(|id| !id.is_empty())
    }
}
