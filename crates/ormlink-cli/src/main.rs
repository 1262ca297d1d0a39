//! ormlink command-line tool.
//!
//! Builds the metamodel of a JSON persistence-unit descriptor against a
//! database adapter profile and reports the resulting mappings, tables and
//! generators.

mod formatter;

use clap::{Parser, ValueEnum};
use formatter::{create_formatter, OutputFormat, Section};
use ormlink_core::{AdapterProfile, Error, UnitDescriptor};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Database adapter profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AdapterArg {
    /// PostgreSQL: sequences, identity and table generators.
    #[default]
    Postgres,
    /// MySQL: no sequences; sequence requests fall back to table generators.
    Mysql,
    /// H2: every strategy natively.
    H2,
}

impl From<AdapterArg> for AdapterProfile {
    fn from(arg: AdapterArg) -> Self {
        match arg {
            AdapterArg::Postgres => AdapterProfile::Postgres,
            AdapterArg::Mysql => AdapterProfile::MySql,
            AdapterArg::H2 => AdapterProfile::H2,
        }
    }
}

/// ormlink metamodel inspector
#[derive(Parser, Debug)]
#[command(name = "ormlink")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Persistence-unit descriptor (JSON)
    pub descriptor: PathBuf,

    /// Database adapter profile
    #[arg(short, long, value_enum, default_value_t = AdapterArg::Postgres)]
    pub adapter: AdapterArg,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Section to print
    #[arg(short, long, value_enum, default_value_t = Section::All)]
    pub section: Section,

    /// Write the physical schema snapshot to this file
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Log parse and link decisions
    #[arg(short, long)]
    pub verbose: bool,
}

fn init_tracing(verbose: bool) {
    let directive = if verbose { "ormlink=debug" } else { "ormlink=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<String, Error> {
    let descriptor = UnitDescriptor::from_path(&args.descriptor)?;
    let adapter = AdapterProfile::from(args.adapter);
    let metamodel = descriptor.build(&adapter)?;

    info!(
        unit = descriptor.name.as_deref().unwrap_or("<unnamed>"),
        adapter = metamodel.adapter_name(),
        entities = metamodel.entities().count(),
        "Built metamodel"
    );

    if let Some(path) = &args.snapshot {
        let bytes = metamodel.schema().to_bytes()?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "Wrote schema snapshot");
    }

    Ok(create_formatter(args.format).format(&metamodel, args.section))
}

fn describe(error: &Error) -> String {
    match error {
        Error::Mapping(mapping) => format!("[{}] {}", mapping.kind(), mapping),
        other => other.to_string(),
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(report) => println!("{}", report),
        Err(e) => {
            eprintln!("{}", create_formatter(args.format).format_error(&describe(&e)));
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ormlink_core::PhysicalSchema;
    use std::io::Write;

    fn descriptor_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    const UNIT: &str = r#"{
        "name": "billing",
        "types": [
            { "name": "Invoice", "kind": "entity", "attributes": [
                { "name": "id", "type": "Long", "annotations": [
                    { "annotation": "id" },
                    { "annotation": "generated_value", "strategy": "sequence" }
                ]}
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from(["ormlink", "unit.json", "-a", "mysql", "-f", "json"]);
        assert_eq!(args.descriptor, PathBuf::from("unit.json"));
        assert_eq!(args.adapter, AdapterArg::Mysql);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.section, Section::All);
        assert!(!args.verbose);
    }

    #[test]
    fn test_adapter_profiles() {
        assert_eq!(AdapterProfile::from(AdapterArg::Mysql), AdapterProfile::MySql);
        assert_eq!(AdapterProfile::from(AdapterArg::H2), AdapterProfile::H2);
    }

    #[test]
    fn test_run_with_snapshot() {
        let file = descriptor_file(UNIT);
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("schema.bin");

        let args = Args {
            descriptor: file.path().to_path_buf(),
            adapter: AdapterArg::Mysql,
            format: OutputFormat::Json,
            section: Section::Generators,
            snapshot: Some(snapshot.clone()),
            verbose: false,
        };
        let report = run(&args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();

        // MySQL serves the sequence request from the default table generator.
        assert_eq!(value["generators"]["tables"][0]["name"], "ORMLINK_ID_TABLE");

        let schema = PhysicalSchema::from_bytes(&std::fs::read(snapshot).unwrap()).unwrap();
        assert_eq!(schema.table_generators.len(), 1);
        assert_eq!(schema.tables[0].name, "Invoice");
    }

    #[test]
    fn test_describe_mapping_error() {
        let file = descriptor_file(
            r#"{ "types": [
                { "name": "Invoice", "kind": "entity", "attributes": [
                    { "name": "code", "type": "String", "annotations": [
                        { "annotation": "column", "length": -1 }
                    ]}
                ]}
            ]}"#,
        );
        let args = Args::parse_from(["ormlink", file.path().to_str().unwrap()]);

        let err = run(&args).unwrap_err();
        assert!(describe(&err).starts_with("[structural mapping error]"));
    }
}
