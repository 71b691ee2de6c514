//! Refactoring framework
//!
//! Refactorings mutate the tree in place and report whether anything
//! changed; `Ok(false)` means "no matching occurrence", which is not a
//! failure. Request strings are validated before any tree is touched.
//! The engine never writes files — the driver re-emits through the printer
//! and decides between write and dry-run.

pub mod rename;
pub mod signature;

pub use rename::{RenameFunction, RenameType, RenameVariable};
pub use signature::AddParameter;

use crate::ast::File;
use thiserror::Error;

/// Errors produced while building or applying refactorings
#[derive(Debug, Error)]
pub enum RefactorError {
    #[error("invalid refactoring spec `{spec}`, expected `{expected}`")]
    InvalidSpec { spec: String, expected: String },

    #[error("`{name}` is not a valid identifier")]
    InvalidName { name: String },
}

/// A tree-mutating refactoring operation
pub trait Refactoring {
    /// Human-readable description, used in driver output
    fn describe(&self) -> String;

    /// Apply to one file. `Ok(true)` iff the tree was modified.
    fn apply(&self, file: &mut File) -> Result<bool, RefactorError>;
}

/// An ordered set of refactorings, built once by the driver and treated as
/// read-only during a run
#[derive(Default)]
pub struct Refactorings {
    ops: Vec<Box<dyn Refactoring>>,
}

impl Refactorings {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn register(&mut self, op: Box<dyn Refactoring>) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[Box<dyn Refactoring>] {
        &self.ops
    }

    /// Apply every operation to one file, in registration order.
    /// `Ok(true)` iff any operation changed the tree.
    pub fn apply_all(&self, file: &mut File) -> Result<bool, RefactorError> {
        let mut changed = false;
        for op in &self.ops {
            if op.apply(file)? {
                changed = true;
            }
        }
        Ok(changed)
    }
}

/// Check that a proposed name is a valid Tarn identifier
pub fn validate_name(name: &str) -> Result<(), RefactorError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_start || !valid_rest || name == "_" {
        return Err(RefactorError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Split an `old:new` rename spec, rejecting anything but exactly two
/// non-empty parts
pub fn parse_rename_spec(spec: &str) -> Result<(String, String), RefactorError> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(RefactorError::InvalidSpec {
            spec: spec.to_string(),
            expected: "old:new".to_string(),
        });
    }
    validate_name(parts[1])?;
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Split a `function:name:type` add-parameter spec
pub fn parse_add_param_spec(spec: &str) -> Result<(String, String, String), RefactorError> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(RefactorError::InvalidSpec {
            spec: spec.to_string(),
            expected: "function:name:type".to_string(),
        });
    }
    validate_name(parts[1])?;
    Ok((
        parts[0].to_string(),
        parts[1].to_string(),
        parts[2].to_string(),
    ))
}
