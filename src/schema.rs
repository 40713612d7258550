//! Response schemas derived from Rust types.
//!
//! Output types derive [`schemars::JsonSchema`]; field doc comments become the
//! `description`s the model sees. The generated schema is trimmed to the
//! OpenAPI subset Gemini accepts: nested types inlined, no `$schema`,
//! `title` or definition tables, and `nullable: true` for `Option` fields.
//!
//! An `Option` field is optional by default. For a key the model must always
//! send, even as `null`, pair [`required_nullable`] with
//! [`nullable_string`]:
//!
//! ```
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Reply {
//!     #[serde(deserialize_with = "llm_workflows::schema::required_nullable")]
//!     #[schemars(schema_with = "llm_workflows::schema::nullable_string")]
//!     link: Option<String>,
//! }
//!
//! let schema = llm_workflows::schema::response_schema::<Reply>().unwrap();
//! assert_eq!(schema.schema["required"], serde_json::json!(["link"]));
//! assert!(serde_json::from_str::<Reply>("{}").is_err());
//! assert!(serde_json::from_str::<Reply>(r#"{"link": null}"#).is_ok());
//! ```

use crate::backend::ResponseSchema;
use crate::error::Result;
use schemars::gen::{SchemaGenerator, SchemaSettings};
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Keys that describe the schema document rather than the data shape.
const META_KEYS: [&str; 5] = ["$schema", "title", "definitions", "$defs", "components"];

/// Build the response schema for `T`.
pub fn response_schema<T: JsonSchema>() -> Result<ResponseSchema> {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let mut schema = serde_json::to_value(&root)?;
    sanitize(&mut schema);
    Ok(ResponseSchema {
        name: T::schema_name(),
        schema,
    })
}

/// Deserialize an `Option` whose key must be present; `null` maps to `None`.
///
/// With `deserialize_with` and no `default`, serde reports a missing key as
/// an error instead of filling in `None`.
pub fn required_nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Schema for a string that must be present but may be `null`.
///
/// Used through `schema_with`, which also keeps the field in `required`.
pub fn nullable_string(gen: &mut SchemaGenerator) -> Schema {
    let mut schema = gen.subschema_for::<String>().into_object();
    schema.extensions.insert("nullable".into(), Value::Bool(true));
    Schema::Object(schema)
}

/// Strip metadata keys and collapse single-entry `allOf` wrappers, recursively.
///
/// Only schema objects are touched; keys of a `properties` map are field
/// names and are never removed.
fn sanitize(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };

    if let Some(all_of) = map.remove("allOf") {
        match all_of {
            Value::Array(mut items) if items.len() == 1 => {
                if let Value::Object(inner) = items.remove(0) {
                    for (k, v) in inner {
                        map.entry(k).or_insert(v);
                    }
                }
            }
            other => {
                map.insert("allOf".into(), other);
            }
        }
    }

    for key in META_KEYS {
        map.remove(key);
    }

    if let Some(Value::Object(props)) = map.get_mut("properties") {
        for prop in props.values_mut() {
            sanitize(prop);
        }
    }
    for key in ["items", "additionalProperties"] {
        if let Some(sub) = map.get_mut(key) {
            sanitize(sub);
        }
    }
    for key in ["anyOf", "oneOf", "allOf"] {
        if let Some(Value::Array(subs)) = map.get_mut(key) {
            subs.iter_mut().for_each(sanitize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Article {
        /// Headline of the article
        title: String,
        /// Optional link
        url: Option<String>,
        tags: Vec<Tag>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Tag {
        /// Tag label
        label: String,
    }

    #[allow(dead_code)]
    #[derive(Debug, Deserialize, JsonSchema)]
    struct Receipt {
        /// Receipt number
        number: String,
        /// Link to the receipt, null when none was issued
        #[serde(deserialize_with = "required_nullable")]
        #[schemars(schema_with = "nullable_string")]
        link: Option<String>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    #[serde(rename_all = "snake_case")]
    enum Mood {
        Happy,
        Sad,
    }

    #[test]
    fn test_schema_keeps_field_named_title() {
        let schema = response_schema::<Article>().unwrap();
        assert_eq!(schema.name, "Article");

        let body = &schema.schema;
        assert!(body.get("$schema").is_none());
        assert!(body.get("title").is_none());
        assert_eq!(body["type"], "object");
        assert_eq!(body["properties"]["title"]["type"], "string");
        assert_eq!(
            body["properties"]["title"]["description"],
            "Headline of the article"
        );
    }

    #[test]
    fn test_schema_option_is_nullable() {
        let schema = response_schema::<Article>().unwrap();
        let url = &schema.schema["properties"]["url"];
        assert_eq!(url["type"], "string");
        assert_eq!(url["nullable"], true);
        let required = schema.schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("title")));
        assert!(!required.contains(&json!("url")));
    }

    #[test]
    fn test_required_nullable_schema() {
        let schema = response_schema::<Receipt>().unwrap();
        let link = &schema.schema["properties"]["link"];
        assert_eq!(link["type"], "string");
        assert_eq!(link["nullable"], true);
        assert_eq!(link["description"], "Link to the receipt, null when none was issued");
        let required = schema.schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("number")));
        assert!(required.contains(&json!("link")));
    }

    #[test]
    fn test_required_nullable_rejects_missing_key() {
        let err = serde_json::from_value::<Receipt>(json!({"number": "R-1"})).unwrap_err();
        assert!(err.to_string().contains("missing field `link`"));

        let receipt: Receipt = serde_json::from_value(json!({"number": "R-1", "link": null})).unwrap();
        assert!(receipt.link.is_none());

        let receipt: Receipt =
            serde_json::from_value(json!({"number": "R-1", "link": "https://r/1"})).unwrap();
        assert_eq!(receipt.link.as_deref(), Some("https://r/1"));
    }

    #[test]
    fn test_schema_inlines_nested_types() {
        let schema = response_schema::<Article>().unwrap();
        let items = &schema.schema["properties"]["tags"]["items"];
        assert!(items.get("$ref").is_none());
        assert_eq!(items["properties"]["label"]["type"], "string");
        assert!(schema.schema.get("definitions").is_none());
    }

    #[test]
    fn test_schema_enum_values() {
        let schema = response_schema::<Mood>().unwrap();
        assert_eq!(schema.schema["type"], "string");
        assert_eq!(schema.schema["enum"], json!(["happy", "sad"]));
    }

    #[test]
    fn test_sanitize_collapses_all_of() {
        let mut value = json!({
            "description": "outer",
            "allOf": [{"type": "string", "title": "Inner", "description": "inner"}]
        });
        sanitize(&mut value);
        assert_eq!(value, json!({"type": "string", "description": "outer"}));
    }
}
