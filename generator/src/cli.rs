use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(value_parser, help = "The source file or URL")]
    pub input: String,

    #[clap(short, long, help = "Write the generated code to this file instead of stdout")]
    pub output: Option<PathBuf>,

    #[clap(long, help = "Namespace of the schema to generate, defaults to the input's")]
    pub namespace: Option<String>,

    #[clap(long, default_value = "Schema", help = "Name of the generated registry struct")]
    pub name: String,

    #[clap(
        long,
        help = "Only generate types annotated with <sce.domgen include=\"true\"/>"
    )]
    pub annotated_only: bool,

    #[clap(long, help = "Generate an enum for every string enumeration type")]
    pub enums: bool,

    #[clap(long, help = "Allow a XML Document Type Definition (DTD) to occur")]
    pub allow_dtd: bool,
}
