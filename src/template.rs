use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::{Label, VariableList, VariableName};
use crate::error::GrabError;

/// Layout of the C20C+ archive on NERSC HPSS.
pub const DEFAULT_PATH_TEMPLATE: &str = "/nersc/s/stoned/C20C/{institution}/{model}/{experiment}/{estimate}/{version}/3hr/atmos/{variable}/{run}/{variable}_A3hr_{model}_{experiment}_{estimate}_{version}_{run}.tar";

pub const DEFAULT_ESTIMATE: &str = "est1";
pub const DEFAULT_VERSION: &str = "v2-0";

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("token pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateField {
    Institution,
    Model,
    Experiment,
    Run,
    Variable,
    Estimate,
    Version,
}

impl TemplateField {
    /// Fields every template has to reference.
    pub const REQUIRED: [TemplateField; 5] = [
        TemplateField::Institution,
        TemplateField::Model,
        TemplateField::Experiment,
        TemplateField::Run,
        TemplateField::Variable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TemplateField::Institution => "institution",
            TemplateField::Model => "model",
            TemplateField::Experiment => "experiment",
            TemplateField::Run => "run",
            TemplateField::Variable => "variable",
            TemplateField::Estimate => "estimate",
            TemplateField::Version => "version",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "institution" => Some(TemplateField::Institution),
            "model" => Some(TemplateField::Model),
            "experiment" => Some(TemplateField::Experiment),
            "run" => Some(TemplateField::Run),
            "variable" => Some(TemplateField::Variable),
            "estimate" => Some(TemplateField::Estimate),
            "version" => Some(TemplateField::Version),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(TemplateField),
}

/// A parsed archive path template.
///
/// `{name}` is a placeholder, `{{` and `}}` are literal braces. Parsing fails on
/// stray braces, unknown names, or when one of [`TemplateField::REQUIRED`] is
/// never referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(source: &str) -> Result<Self, GrabError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut cursor = 0;

        for caps in TOKEN.captures_iter(source) {
            let Some(token) = caps.get(0) else {
                continue;
            };
            literal.push_str(&source[cursor..token.start()]);
            cursor = token.end();

            match token.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                "{" | "}" => {
                    return Err(GrabError::TemplateSyntax(format!(
                        "unmatched `{}` at byte {}",
                        token.as_str(),
                        token.start()
                    )));
                }
                _ => {
                    let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
                    if name.is_empty() {
                        return Err(GrabError::TemplateSyntax(format!(
                            "empty placeholder at byte {}",
                            token.start()
                        )));
                    }
                    let field = TemplateField::from_name(name)
                        .ok_or_else(|| GrabError::UnknownPlaceholder(name.to_string()))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
            }
        }
        literal.push_str(&source[cursor..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let template = Self {
            source: source.to_string(),
            segments,
        };
        if let Some(missing) = TemplateField::REQUIRED
            .iter()
            .find(|field| !template.references(**field))
        {
            return Err(GrabError::MissingPlaceholder(missing.name().to_string()));
        }
        Ok(template)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn references(&self, field: TemplateField) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Field(f) if *f == field))
    }

    pub fn resolve(&self, values: &TemplateValues, variable: &VariableName) -> String {
        let mut out = String::with_capacity(self.source.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(values.value(*field, variable)),
            }
        }
        out
    }

    /// One resolved path per variable, in list order.
    pub fn resolve_all(
        &self,
        values: &TemplateValues,
        variables: &VariableList,
    ) -> Vec<ResolvedPath> {
        variables
            .iter()
            .map(|variable| ResolvedPath {
                variable: variable.clone(),
                path: self.resolve(values, variable),
            })
            .collect()
    }
}

impl FromStr for PathTemplate {
    type Err = GrabError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[derive(Debug, Clone)]
pub struct TemplateValues {
    pub institution: Label,
    pub model: Label,
    pub experiment: Label,
    pub run: Label,
    pub estimate: Label,
    pub version: Label,
}

impl TemplateValues {
    fn value<'a>(&'a self, field: TemplateField, variable: &'a VariableName) -> &'a str {
        match field {
            TemplateField::Institution => self.institution.as_str(),
            TemplateField::Model => self.model.as_str(),
            TemplateField::Experiment => self.experiment.as_str(),
            TemplateField::Run => self.run.as_str(),
            TemplateField::Variable => variable.as_str(),
            TemplateField::Estimate => self.estimate.as_str(),
            TemplateField::Version => self.version.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPath {
    pub variable: VariableName,
    pub path: String,
}
