//! Build parameters and their command-line rendering.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::value::Value;

/// A single build parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildParameter {
    /// Header search path: `-I<path>`.
    Include { path: String },
    /// Preprocessor definition: `-D<NAME>='<value>'` or `-D<NAME>`.
    Define { name: String, value: Option<Value> },
    /// Linker symbol: `-Wl,--defsym,<NAME>=<value>` or `-Wl,--defsym,<NAME>`.
    LinkerSymbol { name: String, value: Option<Value> },
}

impl BuildParameter {
    /// Name of the definition or symbol (`None` for include paths).
    pub fn name(&self) -> Option<&str> {
        match self {
            BuildParameter::Include { .. } => None,
            BuildParameter::Define { name, .. } | BuildParameter::LinkerSymbol { name, .. } => {
                Some(name)
            }
        }
    }

    /// Value of the definition or symbol, if it carries one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            BuildParameter::Include { .. } => None,
            BuildParameter::Define { value, .. } | BuildParameter::LinkerSymbol { value, .. } => {
                value.as_ref()
            }
        }
    }
}

impl fmt::Display for BuildParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildParameter::Include { path } => write!(f, "-I{path}"),
            BuildParameter::Define { name, value: None } => write!(f, "-D{name}"),
            BuildParameter::Define {
                name,
                value: Some(value),
            } => write!(f, "-D{name}='{value}'"),
            BuildParameter::LinkerSymbol { name, value: None } => {
                write!(f, "-Wl,--defsym,{name}")
            }
            BuildParameter::LinkerSymbol {
                name,
                value: Some(value),
            } => write!(f, "-Wl,--defsym,{name}={value}"),
        }
    }
}

/// Ordered build parameters produced by one compilation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildParameterSet {
    params: Vec<BuildParameter>,
}

impl BuildParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    pub fn push(&mut self, param: BuildParameter) {
        self.params.push(param);
    }

    /// Append a header search path.
    pub fn include(&mut self, path: impl Into<String>) {
        self.push(BuildParameter::Include { path: path.into() });
    }

    /// Append a value-bearing definition.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.push(BuildParameter::Define {
            name: name.into(),
            value: Some(value.into()),
        });
    }

    /// Append a flag-only definition.
    pub fn flag(&mut self, name: impl Into<String>) {
        self.push(BuildParameter::Define {
            name: name.into(),
            value: None,
        });
    }

    /// Append a value-bearing linker symbol.
    pub fn defsym(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.push(BuildParameter::LinkerSymbol {
            name: name.into(),
            value: Some(value.into()),
        });
    }

    /// Append the same value as both a definition and a linker symbol, so
    /// firmware code and the link script agree on it.
    pub fn define_and_defsym(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        self.define(name, value.clone());
        self.defsym(name, value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildParameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Find a definition by name.
    pub fn definition(&self, name: &str) -> Option<&BuildParameter> {
        self.params
            .iter()
            .find(|p| matches!(p, BuildParameter::Define { .. }) && p.name() == Some(name))
    }

    /// Find a linker symbol by name.
    pub fn linker_symbol(&self, name: &str) -> Option<&BuildParameter> {
        self.params
            .iter()
            .find(|p| matches!(p, BuildParameter::LinkerSymbol { .. }) && p.name() == Some(name))
    }

    /// Rendered value of a definition, e.g. `"{0, 3, 5}"`.
    pub fn define_value(&self, name: &str) -> Option<String> {
        self.definition(name)
            .and_then(BuildParameter::value)
            .map(ToString::to_string)
    }

    /// Render every parameter as a compiler/linker flag, in order.
    pub fn to_flags(&self) -> Vec<String> {
        self.params.iter().map(ToString::to_string).collect()
    }

    /// SHA-256 of the rendered flags, as lowercase hex.
    ///
    /// Identical inputs always produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for flag in self.to_flags() {
            hasher.update(flag.as_bytes());
            hasher.update(b"\n");
        }
        let digest: [u8; 32] = hasher.finalize().into();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl<'a> IntoIterator for &'a BuildParameterSet {
    type Item = &'a BuildParameter;
    type IntoIter = std::slice::Iter<'a, BuildParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
