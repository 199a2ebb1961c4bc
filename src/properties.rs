//! Heatmap property definitions with defaults from heatmap_properties.json
//!
//! This module parses heatmap_properties.json (embedded at compile time) to extract
//! property definitions and their default values. Defaults are defined in ONE place
//! and user overrides (config file, `--set key=value`) are layered on top.

use crate::error::{HeatmapError, Result};
use std::collections::HashMap;
use std::path::Path;

/// heatmap_properties.json embedded at compile time
const PROPERTIES_JSON: &str = include_str!("../heatmap_properties.json");

/// Property definition from heatmap_properties.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    pub description: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Enumerated,
    Double,
    Integer,
    Boolean,
}

impl PropertyKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "StringProperty" => Some(Self::String),
            "EnumeratedProperty" => Some(Self::Enumerated),
            "DoubleProperty" => Some(Self::Double),
            "IntegerProperty" => Some(Self::Integer),
            "BooleanProperty" => Some(Self::Boolean),
            _ => None,
        }
    }
}

/// Registry of all heatmap properties with their defaults
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a property definition document
    pub fn from_json(json: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| HeatmapError::Config(format!("invalid property JSON: {}", e)))?;

        let properties_array = json["properties"]
            .as_array()
            .ok_or_else(|| HeatmapError::Config("missing 'properties' array".to_string()))?;

        let mut properties = HashMap::new();

        for prop in properties_array {
            let name = prop["name"]
                .as_str()
                .ok_or_else(|| HeatmapError::Config("property missing 'name'".to_string()))?
                .to_string();

            let kind_str = prop["kind"].as_str().unwrap_or("");
            let kind = PropertyKind::parse(kind_str).ok_or_else(|| {
                HeatmapError::Config(format!(
                    "unknown kind '{}' for property '{}'",
                    kind_str, name
                ))
            })?;

            let default_value = prop["defaultValue"].as_str().unwrap_or("").to_string();
            let description = prop["description"].as_str().unwrap_or("").to_string();

            let valid_values = if kind == PropertyKind::Enumerated {
                prop["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
            } else {
                None
            };

            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    default_value,
                    description,
                    valid_values,
                },
            );
        }

        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All properties, sorted by name
    pub fn definitions(&self) -> Vec<&PropertyDef> {
        let mut defs: Vec<&PropertyDef> = self.properties.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

/// Global registry instance (initialized lazily)
static REGISTRY: std::sync::OnceLock<PropertyRegistry> = std::sync::OnceLock::new();

/// Get the global property registry
///
/// The definitions are embedded at compile time, so a parse failure is a build defect.
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(PROPERTIES_JSON)
            .expect("heatmap_properties.json is embedded and must be valid")
    })
}

/// Typed property reader
///
/// User-set values take precedence; anything unset or invalid falls back to the
/// default from heatmap_properties.json.
#[derive(Debug, Clone, Default)]
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    /// Reader with no user values (all defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from explicit name/value pairs
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut reader = Self::new();
        for (name, value) in values {
            reader.set(name, value);
        }
        reader
    }

    /// Load user values from a JSON object file: `{ "palette": "RdBu", "figure.dpi": 150 }`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
            .map_err(|e| HeatmapError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse user values from a JSON object; scalar values are stringified
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| HeatmapError::Config(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| HeatmapError::Config("expected a JSON object".to_string()))?;

        let mut reader = Self::new();
        for (name, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => String::new(),
                other => {
                    return Err(HeatmapError::Config(format!(
                        "property '{}' must be a scalar, got {}",
                        name, other
                    )))
                }
            };
            reader.set(name.clone(), text);
        }
        Ok(reader)
    }

    /// Parse a `name=value` assignment
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            HeatmapError::Config(format!(
                "expected 'name=value', got '{}'",
                assignment
            ))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(HeatmapError::Config(format!(
                "missing property name in '{}'",
                assignment
            )));
        }
        Ok((name.to_string(), value.trim().to_string()))
    }

    /// Set a user value; empty values mean "not set"
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if registry().get_property(&name).is_none() {
            log::warn!("Unknown property '{}' (value '{}') is ignored", name, value);
        }
        if value.is_empty() {
            self.user_values.remove(&name);
        } else {
            log::debug!("PropertyReader: '{}' = '{}'", name, value);
            self.user_values.insert(name, value);
        }
    }

    /// Layer another reader's values over this one
    pub fn merge(&mut self, other: PropertyReader) {
        self.user_values.extend(other.user_values);
    }

    /// Get string property (user value or default)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get optional string property (None if empty)
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        let value = self.get_string(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Get enumerated property with validation
    ///
    /// Returns the user-set value (lowercased) if valid, otherwise the default.
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.to_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            log::warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_lowercase()
    }

    /// Get f64 property; unparseable or non-finite values fall back to the default
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = Self::default_as::<f64>(name).unwrap_or(0.0);
        match self.user_values.get(name) {
            None => default,
            Some(value) => match value.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    log::warn!(
                        "Invalid numeric value '{}' for property '{}'. Using default: {}",
                        value,
                        name,
                        default
                    );
                    default
                }
            },
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        if (min..=max).contains(&value) {
            return value;
        }
        let default = Self::default_as::<f64>(name).unwrap_or(min);
        log::warn!(
            "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
            value,
            name,
            min,
            max,
            default
        );
        default
    }

    /// Get u32 property with range validation
    pub fn get_u32_in_range(&self, name: &str, min: u32, max: u32) -> u32 {
        let default = Self::default_as::<u32>(name).unwrap_or(min);
        let Some(value) = self.user_values.get(name) else {
            return default;
        };
        match value.parse::<u32>() {
            Ok(v) if (min..=max).contains(&v) => v,
            _ => {
                log::warn!(
                    "Invalid integer value '{}' for property '{}' (valid: {}..={}). Using default: {}",
                    value,
                    name,
                    min,
                    max,
                    default
                );
                default
            }
        }
    }

    /// Get boolean property (handles "true"/"false" strings)
    pub fn get_bool(&self, name: &str) -> bool {
        let default = registry().get_default(name) == Some("true");
        match self.user_values.get(name).map(|v| v.to_lowercase()).as_deref() {
            None => default,
            Some("true") | Some("yes") | Some("1") => true,
            Some("false") | Some("no") | Some("0") => false,
            Some(other) => {
                log::warn!(
                    "Invalid boolean value '{}' for property '{}'. Using default: {}",
                    other,
                    name,
                    default
                );
                default
            }
        }
    }

    fn default_as<T: std::str::FromStr>(name: &str) -> Option<T> {
        registry().get_default(name).and_then(|s| s.parse().ok())
    }
}
