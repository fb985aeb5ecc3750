use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GrabError;

/// A non-empty path-safe value substituted into the archive template
/// (experiment, run, institution, model, estimate, version).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(String);

impl Label {
    pub fn parse(field: &'static str, value: &str) -> Result<Self, GrabError> {
        let is_valid = !value.is_empty()
            && !value
                .chars()
                .any(|ch| ch == '/' || ch.is_whitespace() || ch.is_control());
        if !is_valid {
            return Err(GrabError::InvalidLabel {
                field,
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableName(String);

impl VariableName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VariableName {
    type Err = GrabError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'));
        if !is_valid {
            return Err(GrabError::InvalidVariable(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Ordered, duplicate-free set of variables to pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableList(Vec<VariableName>);

impl VariableList {
    pub fn new(names: Vec<VariableName>) -> Result<Self, GrabError> {
        if names.is_empty() {
            return Err(GrabError::EmptyVariableList);
        }
        for (idx, name) in names.iter().enumerate() {
            if names[..idx].contains(name) {
                return Err(GrabError::DuplicateVariable(name.to_string()));
            }
        }
        Ok(Self(names))
    }

    pub fn from_strings<S: AsRef<str>>(values: &[S]) -> Result<Self, GrabError> {
        let names = values
            .iter()
            .map(|value| value.as_ref().parse())
            .collect::<Result<Vec<VariableName>, GrabError>>()?;
        Self::new(names)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for VariableList {
    fn default() -> Self {
        Self(
            default_variables()
                .into_iter()
                .map(|name| VariableName(name.to_string()))
                .collect(),
        )
    }
}

impl FromStr for VariableList {
    type Err = GrabError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts = value.split(',').collect::<Vec<_>>();
        Self::from_strings(&parts)
    }
}

pub fn default_variables() -> Vec<&'static str> {
    vec!["hus", "ua", "va"]
}
