//! Field bags and the folds that turn ordered pair lists into mappings
//!
//! A [`FieldBag`] holds the caller-resolved values for one input item. The
//! list-shaped fields (`profile`, `attributes`, `variables`) are accepted
//! either as a bare list or wrapped in an object keyed by the singular
//! collection name (`{"attribute": [...]}`), which is how form-driven hosts
//! submit repeated entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DispatchError;

/// Caller-supplied field values for a single request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldBag(Map<String, Value>);

/// One `{key, value}` entry of a pair list
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: String,
    pub value: Value,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl FieldBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A required, non-blank string field
    pub fn required_str(&self, name: &str) -> Result<&str, DispatchError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Err(DispatchError::invalid_field(name, "required")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Err(DispatchError::invalid_field(name, "must not be empty"))
            }
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(DispatchError::invalid_field(
                name,
                format!("expected a string, got {}", type_name(other)),
            )),
        }
    }

    /// An optional list of strings; absent or null yields an empty list
    pub fn string_list(&self, name: &str) -> Result<Vec<String>, DispatchError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(DispatchError::invalid_field(
                        name,
                        format!(
                            "entry {index} must be a string, got {}",
                            type_name(other)
                        ),
                    )),
                })
                .collect(),
            Some(other) => Err(DispatchError::invalid_field(
                name,
                format!("expected a list of strings, got {}", type_name(other)),
            )),
        }
    }

    /// Ordered pair entries of a list-shaped field
    ///
    /// `wrapper` is the key used when the list arrives wrapped in an object,
    /// `key_field` names the entry member used as the mapping key (`key` or
    /// `name`). Null entries come back as `None` so callers can decide whether
    /// to skip them or reject them.
    pub fn pair_entries(
        &self,
        name: &str,
        wrapper: &str,
        key_field: &str,
    ) -> Result<Vec<Option<Pair>>, DispatchError> {
        let entries = match self.0.get(name) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(Value::Object(map)) => match map.get(wrapper) {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) if map.is_empty() || map.contains_key(wrapper) => {
                    return Ok(Vec::new())
                }
                _ => {
                    return Err(DispatchError::invalid_field(
                        name,
                        format!("expected a list or an object holding a '{wrapper}' list"),
                    ))
                }
            },
            Some(other) => {
                return Err(DispatchError::invalid_field(
                    name,
                    format!("expected a list, got {}", type_name(other)),
                ))
            }
        };

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_pair(name, index, entry, key_field))
            .collect()
    }

    /// Extra event properties supplied as `{<name>: {<name>: value}}` wrappers
    ///
    /// Every wrapper is returned, including names that clash with the base
    /// event attributes (`metric`, `profile`, `properties`). Null wrappers are
    /// skipped.
    pub fn extra_properties(&self, name: &str) -> Result<Vec<(String, Value)>, DispatchError> {
        let map = match self.0.get(name) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(DispatchError::invalid_field(
                    name,
                    format!("expected an object, got {}", type_name(other)),
                ))
            }
        };

        let mut extras = Vec::with_capacity(map.len());
        for (key, wrapper) in map {
            let wrapper = match wrapper {
                Value::Null => continue,
                Value::Object(wrapper) => wrapper,
                other => {
                    return Err(DispatchError::invalid_field(
                        format!("{name}.{key}"),
                        format!("expected a wrapper object, got {}", type_name(other)),
                    ))
                }
            };

            let inner = wrapper.get(key).ok_or_else(|| {
                DispatchError::invalid_field(
                    format!("{name}.{key}"),
                    format!("wrapper is missing '{key}'"),
                )
            })?;

            extras.push((key.clone(), inner.clone()));
        }

        Ok(extras)
    }
}

impl From<Map<String, Value>> for FieldBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for FieldBag {
    type Error = DispatchError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(DispatchError::invalid_field(
                "fields",
                format!("expected an object, got {}", type_name(&other)),
            )),
        }
    }
}

fn parse_pair(
    field: &str,
    index: usize,
    entry: &Value,
    key_field: &str,
) -> Result<Option<Pair>, DispatchError> {
    let map = match entry {
        Value::Null => return Ok(None),
        Value::Object(map) => map,
        other => {
            return Err(DispatchError::invalid_field(
                field,
                format!("entry {index} must be an object, got {}", type_name(other)),
            ))
        }
    };

    let key = match map.get(key_field) {
        Some(Value::String(key)) => key.clone(),
        _ => {
            return Err(DispatchError::invalid_field(
                field,
                format!("entry {index} is missing a string '{key_field}'"),
            ))
        }
    };

    let value = map.get("value").cloned().ok_or_else(|| {
        DispatchError::invalid_field(field, format!("entry {index} is missing 'value'"))
    })?;

    Ok(Some(Pair { key, value }))
}

/// Fold ordered pairs into a mapping, later keys overwrite earlier ones
pub fn fold_pairs<I>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Pair>,
{
    pairs.into_iter().fold(Map::new(), |mut acc, pair| {
        acc.insert(pair.key, pair.value);
        acc
    })
}

/// Fold pairs, skipping absent entries
pub fn fold_present_pairs<I>(pairs: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Option<Pair>>,
{
    fold_pairs(pairs.into_iter().flatten())
}

/// Fold pairs where every entry is required to be present
pub fn fold_required_pairs<I>(field: &str, pairs: I) -> Result<Map<String, Value>, DispatchError>
where
    I: IntoIterator<Item = Option<Pair>>,
{
    let pairs = pairs
        .into_iter()
        .enumerate()
        .map(|(index, pair)| {
            pair.ok_or_else(|| {
                DispatchError::invalid_field(field, format!("entry {index} must not be null"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(fold_pairs(pairs))
}

/// Parse a `key=value` command line argument, splitting on the first `=`
pub fn parse_key_value(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", input))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Empty key in '{}'", input));
    }

    Ok((key.to_string(), value.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
