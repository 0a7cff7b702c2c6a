use std::env;
use std::fs;
use std::path::PathBuf;

use dom_gen::{generate, GeneratorOptions};
use dom_schema::{ImportResolver, SchemaSource, SchemaTypeLoader, StaticImportResolver};

const SCHEMA: &str = "schemas/collada.xsd";

fn main() {
    println!("cargo:rerun-if-changed={SCHEMA}");

    let source = SchemaSource::from_file(SCHEMA).unwrap_or_else(|e| panic!("{SCHEMA}: {e}"));
    let import_resolvers: [Box<dyn ImportResolver>; 1] =
        [Box::new(StaticImportResolver::with_xml_schema())];
    let loader = SchemaTypeLoader::load(source, &import_resolvers)
        .unwrap_or_else(|e| panic!("failed to load {SCHEMA}: {e}"));

    let options = GeneratorOptions {
        registry_name: "ColladaSchema".to_string(),
        enums: true,
        source_name: Some("collada.xsd".to_string()),
        ..Default::default()
    };
    let code = generate(&loader, &options)
        .unwrap_or_else(|e| panic!("failed to generate the registry of {SCHEMA}: {e}"));

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("collada_schema.rs"), code)
        .unwrap_or_else(|e| panic!("failed to write collada_schema.rs: {e}"));
}
