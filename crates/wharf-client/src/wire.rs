//! Wire-name translation.
//!
//! The daemon's JSON convention capitalizes the first letter of every field
//! name (`{"Id": "..."}`, `{"StatusCode": 0}`), the inverse of the
//! camelCase names our types use. Rather than annotating every field, the
//! translation is a [`NamingConvention`] applied uniformly to each object
//! key of a JSON value tree at the serialization boundary: encode
//! uppercases, decode lowercases, with no per-field exceptions.
//!
//! Keys that do not start with an ASCII letter of the expected case pass
//! through untouched; this keeps data-bearing map keys such as port specs
//! (`"80/tcp"`) and paths (`"/data"`) intact, matching the convention's
//! field-names-only scope.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Strategy for translating field names between in-memory and wire form.
pub trait NamingConvention: Send + Sync {
    /// In-memory field name to wire name.
    fn to_wire(&self, name: &str) -> String;

    /// Wire name back to the in-memory field name. Must invert
    /// [`NamingConvention::to_wire`].
    fn from_wire(&self, name: &str) -> String;
}

/// The daemon's convention: first letter uppercased on the wire.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLetterUppercase;

impl NamingConvention for FirstLetterUppercase {
    fn to_wire(&self, name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_lowercase() => {
                let mut wire = String::with_capacity(name.len());
                wire.push(first.to_ascii_uppercase());
                wire.push_str(chars.as_str());
                wire
            }
            _ => name.to_string(),
        }
    }

    fn from_wire(&self, name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_uppercase() => {
                let mut local = String::with_capacity(name.len());
                local.push(first.to_ascii_lowercase());
                local.push_str(chars.as_str());
                local
            }
            _ => name.to_string(),
        }
    }
}

fn map_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (rename(&key), map_keys(value, rename)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| map_keys(item, rename)).collect())
        }
        other => other,
    }
}

/// Serializes a value into its wire JSON representation.
///
/// # Errors
///
/// Returns the underlying serialization error.
pub fn to_wire_value<T: Serialize>(
    value: &T,
    convention: &dyn NamingConvention,
) -> serde_json::Result<Value> {
    Ok(map_keys(serde_json::to_value(value)?, &|name| {
        convention.to_wire(name)
    }))
}

/// Serializes a value into wire JSON bytes.
///
/// # Errors
///
/// Returns the underlying serialization error.
pub fn encode<T: Serialize>(
    value: &T,
    convention: &dyn NamingConvention,
) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&to_wire_value(value, convention)?)
}

/// Decodes a wire JSON value into a typed message.
///
/// # Errors
///
/// Returns the underlying deserialization error.
pub fn from_wire_value<T: DeserializeOwned>(
    value: Value,
    convention: &dyn NamingConvention,
) -> serde_json::Result<T> {
    serde_json::from_value(map_keys(value, &|name| convention.from_wire(name)))
}

/// Decodes wire JSON bytes into a typed message.
///
/// # Errors
///
/// Returns the underlying deserialization error.
pub fn decode<T: DeserializeOwned>(
    bytes: &[u8],
    convention: &dyn NamingConvention,
) -> serde_json::Result<T> {
    from_wire_value(serde_json::from_slice(bytes)?, convention)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn first_letter_translation_is_its_own_inverse() {
        let convention = FirstLetterUppercase;
        assert_eq!(convention.to_wire("containerId"), "ContainerId");
        assert_eq!(convention.from_wire("ContainerId"), "containerId");
        assert_eq!(
            convention.from_wire(&convention.to_wire("containerId")),
            "containerId"
        );
    }

    #[test]
    fn data_keys_pass_through() {
        let convention = FirstLetterUppercase;
        assert_eq!(convention.to_wire("80/tcp"), "80/tcp");
        assert_eq!(convention.to_wire("/data"), "/data");
        assert_eq!(convention.from_wire("80/tcp"), "80/tcp");
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        id: String,
        exit_code: i64,
        repo_tags: Vec<String>,
    }

    #[test]
    fn encode_produces_wire_names() {
        let sample = Sample {
            id: "abc".to_string(),
            exit_code: 0,
            repo_tags: vec!["latest".to_string()],
        };
        let wire = to_wire_value(&sample, &FirstLetterUppercase).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({"Id": "abc", "ExitCode": 0, "RepoTags": ["latest"]})
        );
    }

    #[test]
    fn decode_inverts_encode() {
        let sample = Sample {
            id: "abc".to_string(),
            exit_code: 137,
            repo_tags: vec![],
        };
        let bytes = encode(&sample, &FirstLetterUppercase).unwrap();
        let back: Sample = decode(&bytes, &FirstLetterUppercase).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn nested_objects_are_translated_recursively() {
        let wire = serde_json::json!({
            "State": {"Running": true, "ExitCode": 0},
            "Config": {"ExposedPorts": {"80/tcp": {}}}
        });
        let local = map_keys(wire, &|name| FirstLetterUppercase.from_wire(name));
        assert_eq!(
            local,
            serde_json::json!({
                "state": {"running": true, "exitCode": 0},
                "config": {"exposedPorts": {"80/tcp": {}}}
            })
        );
    }
}
