use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Once;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use value_schema_core::{SchemaDefinition, SchemaPackage, ValidationOptions};
use value_schema_db::{SchemaDatabase, ValidatorConfig, read_definition, seal_package};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFINITION_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

static TRACING_INIT: Once = Once::new();

/// Output format for values and descriptions.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "value-schema")]
#[command(about = "Validate JSON/YAML documents against named schema definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a document against a named schema and print the coerced value.
    Validate(ValidateArgs),
    /// Print the description of a named schema.
    Describe(DescribeArgs),
    /// Compile definition files and report problems.
    Check(CheckArgs),
    /// Bundle definition files into a hashed SchemaPackage file.
    Bundle(BundleArgs),
}

#[derive(Debug, Args)]
struct SchemaSourceArgs {
    /// Directory of definition files or a bundle JSON file.
    #[arg(long)]
    schemas: Option<PathBuf>,
    /// Validator configuration YAML (sources and options).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    source: SchemaSourceArgs,
    /// Name of the schema to validate against.
    #[arg(long)]
    name: String,
    /// Document to validate (`-` reads stdin).
    #[arg(long)]
    input: PathBuf,
    /// Report every failure instead of stopping at the first.
    #[arg(long)]
    all_errors: bool,
    /// Output format for the coerced value.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    #[command(flatten)]
    source: SchemaSourceArgs,
    /// Name of the schema to describe.
    #[arg(long)]
    name: String,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Definition files and/or directories containing definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct BundleArgs {
    /// Definition files and/or directories containing definition files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output JSON bundle path.
    #[arg(long)]
    output: PathBuf,
    /// Optional bundle name metadata.
    #[arg(long)]
    name: Option<String>,
    /// Optional bundle description metadata.
    #[arg(long)]
    description: Option<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Describe(args) => run_describe(args),
        Command::Check(args) => run_check(args),
        Command::Bundle(args) => run_bundle(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let (db, mut options) = open_database(&args.source)?;
    if args.all_errors {
        options.abort_early = false;
    }

    let document = read_document(&args.input)?;
    let value = db
        .validate(&args.name, &document, &options)
        .map_err(|err| err.to_string())?;

    println!("{}", render(&value, args.format)?);
    Ok(())
}

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let (db, _) = open_database(&args.source)?;
    let schema = db
        .get(&args.name)
        .ok_or_else(|| format!("Unknown schema '{}'", args.name))?;

    println!("{}", render(&schema.describe(), args.format)?);
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let paths = collect_definition_paths(&args.inputs)?;
    let definitions = load_definitions(&paths)?;
    println!(
        "Checked {} definition file(s): {} schema(s) compiled.",
        paths.len(),
        definitions.len()
    );
    Ok(())
}

fn run_bundle(args: BundleArgs) -> Result<(), String> {
    let paths = collect_definition_paths(&args.inputs)?;
    let definitions = load_definitions(&paths)?;

    let mut package = SchemaPackage::new(PACKAGE_VERSION, Utc::now().to_rfc3339());
    package.name = args.name;
    package.description = args.description;
    package.definitions = definitions;
    seal_package(&mut package).map_err(|err| format!("Failed to hash schema bundle: {err}"))?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    let raw = serde_json::to_string_pretty(&package)
        .map_err(|err| format!("Failed to serialize schema bundle: {err}"))?;
    fs::write(&args.output, raw)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Bundled {} schema(s) into '{}'.",
        package.definition_count(),
        args.output.display()
    );

    Ok(())
}

fn open_database(source: &SchemaSourceArgs) -> Result<(SchemaDatabase, ValidationOptions), String> {
    let config = match &source.config {
        Some(path) => Some(
            ValidatorConfig::load(path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        ),
        None => None,
    };
    let options = config
        .as_ref()
        .map(|config| config.options.clone())
        .unwrap_or_default();

    let db = match (&source.schemas, &config) {
        (Some(path), _) if path.is_dir() => SchemaDatabase::from_dir(path),
        (Some(path), _) => SchemaDatabase::from_bundle(path),
        (None, Some(config)) => config.database_builder().build(),
        (None, None) => return Err("Specify --schemas or --config".to_string()),
    }
    .map_err(|err| format!("Failed to load schemas: {err}"))?;

    debug!(schemas = db.len(), source = ?db.source(), "schema database opened");
    Ok((db, options))
}

fn read_document(input: &Path) -> Result<Value, String> {
    let (raw, extension) = if input == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        (raw, None)
    } else {
        let raw = fs::read_to_string(input)
            .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?;
        (raw, input.extension().and_then(OsStr::to_str))
    };

    match extension {
        Some("yaml" | "yml") => serde_yaml::from_str(&raw)
            .map_err(|err| format!("Failed to parse YAML document: {err}")),
        Some(_) => serde_json::from_str(&raw)
            .map_err(|err| format!("Failed to parse JSON document: {err}")),
        None => serde_json::from_str(&raw)
            .or_else(|_| serde_yaml::from_str(&raw))
            .map_err(|err| format!("Failed to parse document: {err}")),
    }
}

fn render(value: &impl Serialize, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| format!("Failed to serialize output: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(value)
            .map(|raw| raw.trim_end().to_string())
            .map_err(|err| format!("Failed to serialize output: {err}")),
    }
}

fn collect_definition_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input)
                .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?;
            for entry in entries {
                let path = entry
                    .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?
                    .path();
                if path.is_file() && has_definition_extension(&path) {
                    paths.insert(path);
                }
            }
            continue;
        }

        if input.is_file() {
            if !has_definition_extension(input) {
                return Err(format!(
                    "Definition file '{}' must end in .json, .yaml or .yml",
                    input.display()
                ));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(format!("Definition path '{}' does not exist", input.display()));
    }

    if paths.is_empty() {
        return Err("No definition files found".to_string());
    }
    Ok(paths.into_iter().collect())
}

fn has_definition_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| DEFINITION_EXTENSIONS.contains(&ext))
}

fn load_definitions(paths: &[PathBuf]) -> Result<Vec<SchemaDefinition>, String> {
    let mut names = HashSet::new();
    let mut definitions = Vec::with_capacity(paths.len());

    for path in paths {
        let definition = read_definition(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
        definition
            .compile()
            .map_err(|err| format!("Invalid schema in '{}': {err}", path.display()))?;
        if !names.insert(definition.name.clone()) {
            return Err(format!(
                "Duplicate schema name '{}' in '{}'",
                definition.name,
                path.display()
            ));
        }
        definitions.push(definition);
    }

    Ok(definitions)
}
