//! Tarn toolkit CLI
//!
//! Main entry point for the `tarn` command.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tarn::driver::{self, DriverError};
use tarn::generate::GenOptions;
use tarn::lint::Linter;
use tarn::refactor::{
    self, AddParameter, Refactorings, RenameFunction, RenameType, RenameVariable,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tarn")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analysis, refactoring, and code generation for Tarn source")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint Tarn source files
    Lint {
        /// Directory to lint
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Recursively lint subdirectories
        #[arg(long)]
        recursive: bool,

        /// Output issues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a function and its call sites (spec: old:new)
    RenameFunction(RefactorArgs),

    /// Rename a type and its usages (spec: old:new)
    RenameType(RefactorArgs),

    /// Rename a variable and its uses (spec: old:new)
    RenameVariable(RefactorArgs),

    /// Append a parameter to a function (spec: function:name:type)
    AddParameter(RefactorArgs),

    /// Generate boilerplate from struct declarations
    Generate {
        /// Input file containing struct definitions
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file for generated code (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Module name for generated code (defaults to the input module)
        #[arg(long)]
        module: Option<String>,

        /// Generate constructor/accessor/string/clone methods
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        methods: bool,

        /// Generate JSON marshal/unmarshal wrappers
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        json: bool,

        /// Generate SQL schema and CRUD functions
        #[arg(long)]
        sql: bool,
    },
}

#[derive(Args)]
struct RefactorArgs {
    /// Refactoring spec
    spec: String,

    /// Directory to process
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Process subdirectories recursively
    #[arg(long)]
    recursive: bool,

    /// Write changes back to files (dry-run otherwise)
    #[arg(long)]
    write: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            report_error(err);
            ExitCode::FAILURE
        }
    }
}

/// Parse failures render as labeled miette reports; everything else as a
/// plain message
fn report_error(err: DriverError) {
    match err {
        DriverError::Parse {
            path,
            content,
            source,
        } => {
            let report = miette::Report::new(source).with_source_code(miette::NamedSource::new(
                path.to_string_lossy(),
                content,
            ));
            eprintln!("{:?}", report);
        }
        other => eprintln!("error: {}", other),
    }
}

fn run(command: Commands) -> Result<ExitCode, DriverError> {
    match command {
        Commands::Lint {
            dir,
            recursive,
            json,
        } => run_lint(&dir, recursive, json),
        Commands::RenameFunction(args) => {
            let (old_name, new_name) = refactor::parse_rename_spec(&args.spec)?;
            run_refactor(args, Box::new(RenameFunction { old_name, new_name }))
        }
        Commands::RenameType(args) => {
            let (old_name, new_name) = refactor::parse_rename_spec(&args.spec)?;
            run_refactor(args, Box::new(RenameType { old_name, new_name }))
        }
        Commands::RenameVariable(args) => {
            let (old_name, new_name) = refactor::parse_rename_spec(&args.spec)?;
            run_refactor(args, Box::new(RenameVariable { old_name, new_name }))
        }
        Commands::AddParameter(args) => {
            let (function_name, param_name, param_type) =
                refactor::parse_add_param_spec(&args.spec)?;
            run_refactor(
                args,
                Box::new(AddParameter {
                    function_name,
                    param_name,
                    param_type,
                }),
            )
        }
        Commands::Generate {
            input,
            output,
            module,
            methods,
            json,
            sql,
        } => run_generate(&input, output.as_deref(), module.as_deref(), methods, json, sql),
    }
}

fn run_lint(dir: &PathBuf, recursive: bool, json: bool) -> Result<ExitCode, DriverError> {
    let files = driver::discover_files(dir, recursive, true).map_err(|source| {
        DriverError::Read {
            path: dir.clone(),
            source,
        }
    })?;
    let linter = Linter::with_default_rules();

    let mut all_issues = Vec::new();
    let mut file_count = 0usize;
    for path in &files {
        match driver::lint_file(path, &linter) {
            Ok(issues) => {
                file_count += 1;
                all_issues.extend(issues);
            }
            Err(err) => {
                // A file that fails to parse is skipped; the rest of the
                // run proceeds
                report_error(err);
            }
        }
    }

    // Presentation order only; the engine reports in discovery order
    all_issues.sort_by(|a, b| {
        (&a.position.file, a.position.line, a.position.column).cmp(&(
            &b.position.file,
            b.position.line,
            b.position.column,
        ))
    });

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&all_issues).unwrap_or_else(|_| "[]".to_string())
        );
    } else {
        for issue in &all_issues {
            println!("{}", issue);
        }
        println!(
            "\nLinted {} files, found {} issues",
            file_count,
            all_issues.len()
        );
    }

    if all_issues.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_refactor(
    args: RefactorArgs,
    op: Box<dyn refactor::Refactoring>,
) -> Result<ExitCode, DriverError> {
    let description = op.describe();
    let mut ops = Refactorings::new();
    ops.register(op);

    let files = driver::discover_files(&args.dir, args.recursive, false).map_err(|source| {
        DriverError::Read {
            path: args.dir.clone(),
            source,
        }
    })?;

    let mut failures = 0usize;
    for path in &files {
        match driver::refactor_file(path, &ops, args.write) {
            Ok(outcome) if outcome.changed => {
                println!("Applied '{}' to {}", description, path.display());
                if outcome.written {
                    println!("Wrote changes to {}", path.display());
                } else {
                    println!("Changes not written (use --write to save changes)");
                }
            }
            Ok(_) => {
                println!("No changes made to {}", path.display());
            }
            Err(err) => {
                report_error(err);
                failures += 1;
            }
        }
    }

    if failures == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn run_generate(
    input: &std::path::Path,
    output: Option<&std::path::Path>,
    module: Option<&str>,
    methods: bool,
    json: bool,
    sql: bool,
) -> Result<ExitCode, DriverError> {
    let options = GenOptions { methods, json, sql };
    let generated = driver::generate_file(input, module, &options)?;

    for err in &generated.errors {
        eprintln!("warning: {}", err);
    }
    if let Some(err) = &generated.format_error {
        eprintln!("warning: {} (returning unformatted output)", err);
    }

    match output {
        Some(path) => {
            std::fs::write(path, &generated.code).map_err(|source| DriverError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            println!("Generated code written to {}", path.display());
        }
        None => println!("{}", generated.code),
    }

    Ok(ExitCode::SUCCESS)
}
