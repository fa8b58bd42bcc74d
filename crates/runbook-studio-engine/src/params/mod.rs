//! # Parameter Extraction
//!
//! Reads the input parameters a runbook declares. The script is parsed with a
//! [`ScriptGrammar`], the entry point is located (the first top-level
//! `function`/`workflow`/`filter` with a body, or a top-level `{ ... }`
//! block) and each parameter of its `param(...)` block becomes a
//! [`ParameterDescriptor`].
//!
//! A script without an entry point is a structural failure. Anything wrong
//! with an individual parameter is logged and that parameter skipped, so a
//! half-written `param` block still yields the parameters that make sense.

use runbook_studio_syntax::ast::{Parameter, Script};
use runbook_studio_syntax::{Parse, SyntaxError};
use serde::Serialize;
use thiserror::Error;

/// One runbook input parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    /// Name for forms: sigil stripped, first letter upper-cased.
    pub display_name: String,
    /// Variable name without the `$` sigil, as passed to the runbook.
    pub raw_name: String,
    /// Type of the last attribute, without the array rank: `[string[]]`
    /// gives `string` here (not `string[]`) and sets `is_array`.
    pub type_name: String,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error(
        "Your runbook is broken and it's possible that the runbook won't run. Please fix any errors."
    )]
    NoFunctionBody,
}

/// Why a single parameter was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("parameter `{name}` has no type constraint or attribute")]
    NoAttributes { name: String },
    #[error("parameter has no variable name")]
    MissingName,
    #[error("last attribute of parameter `{name}` has no type name")]
    MissingTypeName { name: String },
}

/// The parser used to read scripts.
pub trait ScriptGrammar: Send + Sync {
    fn parse(&self, text: &str) -> Parse;
}

/// PowerShell runbooks, workflows included.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerShellGrammar;

impl ScriptGrammar for PowerShellGrammar {
    fn parse(&self, text: &str) -> Parse {
        runbook_studio_syntax::parse(text)
    }
}

/// Everything an extraction found, including what it had to skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub parameters: Vec<ParameterDescriptor>,
    pub skipped: Vec<ParameterError>,
    pub syntax_errors: Vec<SyntaxError>,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterExtractor<G = PowerShellGrammar> {
    grammar: G,
}

impl ParameterExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: ScriptGrammar> ParameterExtractor<G> {
    pub fn with_grammar(grammar: G) -> Self {
        Self { grammar }
    }

    pub fn extract(&self, text: &str) -> Result<Vec<ParameterDescriptor>, ExtractError> {
        self.report(text).map(|report| report.parameters)
    }

    pub fn report(&self, text: &str) -> Result<ExtractionReport, ExtractError> {
        let parse = self.grammar.parse(text);
        let entry = Script::new(parse.syntax())
            .and_then(|script| script.entry_point())
            .ok_or(ExtractError::NoFunctionBody)?;

        let mut parameters = Vec::new();
        let mut skipped = Vec::new();
        for parameter in entry.parameters() {
            match describe(&parameter) {
                Ok(descriptor) => parameters.push(descriptor),
                Err(error) => {
                    log::warn!("Skipping runbook parameter: {error}");
                    skipped.push(error);
                }
            }
        }

        Ok(ExtractionReport {
            parameters,
            skipped,
            syntax_errors: parse.errors().to_vec(),
        })
    }
}

/// Extract parameters with the PowerShell grammar.
pub fn extract_parameters(text: &str) -> Result<Vec<ParameterDescriptor>, ExtractError> {
    ParameterExtractor::new().extract(text)
}

fn describe(parameter: &Parameter) -> Result<ParameterDescriptor, ParameterError> {
    let raw_name = parameter.name().ok_or(ParameterError::MissingName)?;

    // The last attribute decides, whatever its kind
    let attribute = parameter
        .attributes()
        .last()
        .ok_or_else(|| ParameterError::NoAttributes {
            name: raw_name.clone(),
        })?;
    let type_name = attribute
        .type_name()
        .map(|name| name.text())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParameterError::MissingTypeName {
            name: raw_name.clone(),
        })?;

    Ok(ParameterDescriptor {
        display_name: nice_name(&raw_name),
        raw_name,
        type_name,
        is_array: attribute.is_array(),
    })
}

/// `$count` → `Count`. Empty input gives an empty name.
pub fn nice_name(name: &str) -> String {
    let name = name.replace('$', "");
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
