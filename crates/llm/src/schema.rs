//! Canonical output schemas and their vendor dialects.
//!
//! Callers describe the JSON they expect once, as a [`Schema`]. Each vendor
//! has its own structured-output dialect; [`translate`] renders the canonical
//! description into one of them.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value, json};

/// Property name of the synthetic root used by dialects that only accept an
/// object at the top level.
pub const RESULT_KEY: &str = "result";

/// A recursive description of an expected JSON shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    String,
    Number,
    Object(ObjectSchema),
    Array(Box<Schema>),
}

/// The properties of an object node.
///
/// `required` is always a subset of the declared properties. When it is not
/// set, every property counts as required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    properties: IndexMap<String, Schema>,
    required: Option<IndexSet<String>>,
}

impl ObjectSchema {
    /// Declared properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Property names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// The effective required set, in declaration order.
    pub fn required_keys(&self) -> Vec<&str> {
        match &self.required {
            Some(required) => self
                .keys()
                .filter(|k| required.contains(*k))
                .collect(),
            None => self.keys().collect(),
        }
    }
}

impl Schema {
    pub fn string() -> Self {
        Self::String
    }

    pub fn number() -> Self {
        Self::Number
    }

    pub fn array(items: Schema) -> Self {
        Self::Array(Box::new(items))
    }

    /// An object node with the given properties, all of them required.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self::Object(ObjectSchema {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            required: None,
        })
    }

    /// Restrict the required set of an object node.
    ///
    /// Names that are not declared properties are dropped, so the subset
    /// invariant holds. Calling this on a non-object node has no effect.
    pub fn required<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut object = match self {
            Self::Object(object) => object,
            other => {
                tracing::warn!("required() applied to a non-object schema node");
                return other;
            }
        };
        let mut required = IndexSet::new();
        for name in names {
            let name = name.into();
            if object.properties.contains_key(&name) {
                required.insert(name);
            } else {
                tracing::warn!(property = %name, "required property is not declared; ignoring");
            }
        }
        object.required = Some(required);
        Self::Object(object)
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// A vendor's structured-output schema dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Strict JSON Schema: every property required, no additional properties,
    /// and an object at the root.
    OpenAiStrict,
    /// OpenAPI-style subset with upper-case type names.
    Gemini,
    /// Plain JSON Schema, used when the schema is only shown to the model in
    /// the prompt.
    JsonSchema,
}

impl Dialect {
    /// Whether the dialect rejects anything but an object at the root.
    pub fn requires_object_root(self) -> bool {
        matches!(self, Self::OpenAiStrict)
    }

    fn type_name(self, name: &'static str) -> Value {
        match self {
            Self::Gemini => Value::String(name.to_ascii_uppercase()),
            Self::OpenAiStrict | Self::JsonSchema => Value::String(name.to_string()),
        }
    }
}

/// Render a canonical schema in a vendor dialect.
///
/// Strict dialects cannot express an optional field, so every declared
/// property becomes required there. Callers must accept empty-string or zero
/// placeholders in place of absent values.
pub fn translate(schema: &Schema, dialect: Dialect) -> Value {
    match schema {
        Schema::String => json!({ "type": dialect.type_name("string") }),
        Schema::Number => json!({ "type": dialect.type_name("number") }),
        Schema::Array(items) => json!({
            "type": dialect.type_name("array"),
            "items": translate(items, dialect),
        }),
        Schema::Object(object) => translate_object(object, dialect),
    }
}

fn translate_object(object: &ObjectSchema, dialect: Dialect) -> Value {
    let properties: Map<String, Value> = object
        .properties()
        .map(|(name, node)| (name.to_string(), translate(node, dialect)))
        .collect();

    let mut out = Map::new();
    out.insert("type".into(), dialect.type_name("object"));
    out.insert("properties".into(), Value::Object(properties));

    match dialect {
        Dialect::OpenAiStrict => {
            out.insert("required".into(), json!(object.keys().collect::<Vec<_>>()));
            out.insert("additionalProperties".into(), Value::Bool(false));
        }
        Dialect::Gemini => {
            out.insert("required".into(), json!(object.required_keys()));
            out.insert(
                "propertyOrdering".into(),
                json!(object.keys().collect::<Vec<_>>()),
            );
        }
        Dialect::JsonSchema => {
            out.insert("required".into(), json!(object.required_keys()));
        }
    }

    Value::Object(out)
}

/// Nest a translated schema under the synthetic [`RESULT_KEY`] property of a
/// strict object root.
pub fn wrap_result(translated: Value) -> Value {
    json!({
        "type": "object",
        "properties": { RESULT_KEY: translated },
        "required": [RESULT_KEY],
        "additionalProperties": false,
    })
}

/// Undo [`wrap_result`] on a parsed reply.
///
/// Replies without the synthetic property are returned unchanged.
pub fn unwrap_result(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key(RESULT_KEY) => {
            map.remove(RESULT_KEY).unwrap_or(Value::Null)
        }
        other => other,
    }
}
