mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use dom_gen::{generate, GeneratorOptions};
use dom_schema::{
    FileImportResolver, Import, ImportError, ImportResolver, LoadOptions, SchemaSource,
    SchemaTypeLoader, StaticImportResolver,
};

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn fetch(url: &str) -> Result<String, reqwest::Error> {
    info!("fetching {url}");
    reqwest::blocking::get(url)?.error_for_status()?.text()
}

/// Fetches `http(s)` imports.
struct HttpImportResolver;

impl ImportResolver for HttpImportResolver {
    fn resolve_import(&self, import: &Import) -> Result<SchemaSource, ImportError> {
        let location = import
            .resolved_location()
            .filter(|location| is_url(location))
            .ok_or(ImportError::UnsupportedImport)?;
        let text = fetch(&location).map_err(|e| ImportError::UnspecifiedLoad(Box::new(e)))?;
        Ok(SchemaSource::new(location, text))
    }
}

fn read_input(input: &str) -> Result<SchemaSource, Box<dyn std::error::Error>> {
    if is_url(input) {
        Ok(SchemaSource::new(input, fetch(input)?))
    } else {
        Ok(SchemaSource::from_file(input)?)
    }
}

fn run(cli: cli::Cli) -> Result<(), Box<dyn std::error::Error>> {
    let import_resolvers: [Box<dyn ImportResolver>; 3] = [
        Box::new(StaticImportResolver::with_xml_schema()),
        Box::new(FileImportResolver),
        Box::new(HttpImportResolver),
    ];
    let source = read_input(&cli.input)?;
    let options = LoadOptions {
        allow_dtd: cli.allow_dtd,
    };
    let loader = SchemaTypeLoader::load_with_options(source, &import_resolvers, options)?;

    let options = GeneratorOptions {
        schema_namespace: cli.namespace,
        registry_name: cli.name,
        annotated_only: cli.annotated_only,
        enums: cli.enums,
        source_name: Some(cli.input),
    };
    let rst = generate(&loader, &options)?;
    match cli.output {
        Some(path) => std::fs::write(path, rst)?,
        None => print!("{rst}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = cli::Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
