//! Module declarations
//!
//! A declaration is the unresolved description of one dynamic module:
//! what to fetch, which bundle may contain it, where it is exposed and
//! where it goes within its category.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::module::traits::ModuleError;

/// Placement of a module within its category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// After every module already in the category
    #[default]
    Append,
    /// Before every module already in the category
    Prepend,
    /// At an absolute slot of the category
    Index(usize),
}

impl Position {
    /// Parse a position keyword
    ///
    /// `before` is accepted as an alias of `prepend`.
    pub fn from_keyword(keyword: &str) -> Result<Self, ModuleError> {
        match keyword {
            "append" => Ok(Position::Append),
            "prepend" | "before" => Ok(Position::Prepend),
            other => Err(ModuleError::InvalidDeclaration(format!(
                "Unknown position '{}' (expected append, prepend, before or an index)",
                other
            ))),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Append => write!(f, "append"),
            Position::Prepend => write!(f, "prepend"),
            Position::Index(i) => write!(f, "{}", i),
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Position::Index(i) => serializer.serialize_u64(*i as u64),
            Position::Append => serializer.serialize_str("append"),
            Position::Prepend => serializer.serialize_str("prepend"),
        }
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Index(u64),
            Keyword(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Index(i) => usize::try_from(i)
                .map(Position::Index)
                .map_err(|_| de::Error::custom(format!("position {} out of range", i))),
            Raw::Keyword(k) => Position::from_keyword(&k).map_err(de::Error::custom),
        }
    }
}

/// Dynamic module declaration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    /// Fetchable reference of the module (e.g. a module path)
    #[serde(rename = "module", default)]
    pub identifier: String,
    /// Bundle that may contain the module
    #[serde(rename = "bundle", default, skip_serializing_if = "Option::is_none")]
    pub bundle_identifier: Option<String>,
    /// Category the resolved module is exposed under
    #[serde(default)]
    pub category: String,
    /// Human-readable label, used in error messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Placement within the category
    #[serde(default)]
    pub position: Position,
}

impl ModuleDeclaration {
    /// Create a declaration appended to `category`
    pub fn new(identifier: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    /// Set the bundle
    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle_identifier = Some(bundle.into());
        self
    }

    /// Set the label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the position
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Check structural validity
    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.identifier.trim().is_empty() {
            return Err(ModuleError::InvalidDeclaration(
                "A module identifier must be defined".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            let label = self.name.as_deref().unwrap_or(&self.identifier);
            return Err(ModuleError::InvalidDeclaration(format!(
                "The module '{}' must belong to a category",
                label
            )));
        }
        if let Some(bundle) = &self.bundle_identifier {
            if bundle.trim().is_empty() {
                return Err(ModuleError::InvalidDeclaration(format!(
                    "The bundle of module '{}' cannot be empty",
                    self.identifier
                )));
            }
        }
        Ok(())
    }
}
