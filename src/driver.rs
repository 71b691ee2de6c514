//! Per-file orchestration for the CLI
//!
//! File discovery, lint/refactor/generate pipelines, and the write/dry-run
//! decision live here. Engines never touch the filesystem themselves: this
//! module parses, hands trees to them, and re-emits through the printer.

use crate::common::SourceFile;
use crate::generate::{self, GenOptions, Generated};
use crate::lint::{Issue, Linter};
use crate::parser::{self, ParserError};
use crate::printer::{self, CanonicalFormatter};
use crate::refactor::{RefactorError, Refactorings};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tarn source file extension
pub const SOURCE_EXTENSION: &str = "tn";

/// Per-file driver failure
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        /// Source text, kept so the CLI can render a labeled diagnostic
        content: String,
        source: ParserError,
    },

    #[error(transparent)]
    Refactor(#[from] RefactorError),
}

/// Collect `.tn` files under `dir`, sorted for deterministic processing.
/// Subdirectories are entered only when `recursive` is set; `_test.tn`
/// files are skipped when `skip_tests` is set.
pub fn discover_files(
    dir: &Path,
    recursive: bool,
    skip_tests: bool,
) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(dir, recursive, skip_tests, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(
    dir: &Path,
    recursive: bool,
    skip_tests: bool,
    files: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect_files(&path, recursive, skip_tests, files)?;
            }
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(&format!(".{}", SOURCE_EXTENSION)) {
            continue;
        }
        if skip_tests && name.ends_with(&format!("_test.{}", SOURCE_EXTENSION)) {
            continue;
        }
        files.push(path);
    }
    Ok(())
}

fn read_source(path: &Path) -> Result<SourceFile, DriverError> {
    let content = fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SourceFile::new(path.to_string_lossy(), content))
}

/// Parse and lint one file
pub fn lint_file(path: &Path, linter: &Linter) -> Result<Vec<Issue>, DriverError> {
    let src = read_source(path)?;
    let file = parser::parse_source(&src.content).map_err(|source| DriverError::Parse {
        path: path.to_path_buf(),
        content: src.content.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "linting");
    Ok(linter.run_all(&file, &src))
}

/// Result of applying refactorings to one file
#[derive(Debug)]
pub struct RefactorOutcome {
    pub changed: bool,
    /// Re-emitted source, present iff anything changed
    pub output: Option<String>,
    pub written: bool,
}

/// Parse one file, apply every refactoring, and re-emit if anything
/// changed. The file is only persisted in write mode; otherwise the caller
/// gets the preview text.
pub fn refactor_file(
    path: &Path,
    ops: &Refactorings,
    write: bool,
) -> Result<RefactorOutcome, DriverError> {
    let src = read_source(path)?;
    let mut file = parser::parse_source(&src.content).map_err(|source| DriverError::Parse {
        path: path.to_path_buf(),
        content: src.content.clone(),
        source,
    })?;

    let changed = ops.apply_all(&mut file)?;
    if !changed {
        return Ok(RefactorOutcome {
            changed: false,
            output: None,
            written: false,
        });
    }

    let output = printer::print(&file);
    let written = if write {
        fs::write(path, &output).map_err(|source| DriverError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "wrote refactored source");
        true
    } else {
        false
    };

    Ok(RefactorOutcome {
        changed: true,
        output: Some(output),
        written,
    })
}

/// Parse one file, extract shapes, and generate code for them
pub fn generate_file(
    input: &Path,
    module_override: Option<&str>,
    options: &GenOptions,
) -> Result<Generated, DriverError> {
    let src = read_source(input)?;
    let file = parser::parse_source(&src.content).map_err(|source| DriverError::Parse {
        path: input.to_path_buf(),
        content: src.content.clone(),
        source,
    })?;

    let (shapes, module) = generate::extract_shapes(&file);
    let module = module_override.unwrap_or(&module);
    tracing::debug!(
        path = %input.display(),
        shapes = shapes.len(),
        "generating code"
    );
    Ok(generate::generate(
        &shapes,
        module,
        options,
        &CanonicalFormatter,
    ))
}
