use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use idlc::compile;
use idlc::emit::cpp::{generate as generate_cpp, CppDialect};
use idlc::emit::rust_target::generate as generate_rust;
use idlc::emit::wireshark::generate as generate_wireshark;

/// Compile one or more IDL schema files into generated target-language code.
#[derive(Clone, Debug, Parser)]
struct Args {
    /// input schema files to compile, concatenated in order
    inputs: Vec<PathBuf>,
    /// output file to write the generated code to
    #[arg(short, long)]
    output: PathBuf,
    /// print per-phase notices (files read, declarations registered,
    /// chosen pointer widths, output bytes written)
    #[arg(short, long)]
    verbose: bool,
    /// pretty-print the resolved model to stderr before emission
    #[arg(long)]
    dump_model: bool,
    #[command(subcommand)]
    target: Target,
}

#[derive(Clone, Debug, Subcommand)]
enum Target {
    /// Emit a C++ header
    Cpp {
        #[arg(long, value_enum, default_value = "stdc++")]
        lib: CppLib,
        /// also emit a `.proto`-style field-number comment block
        #[arg(long)]
        protobuf: bool,
    },
    /// Emit a Rust module
    Rust,
    /// Emit a Wireshark Lua dissector script
    Wireshark,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CppLib {
    #[value(name = "stdc++")]
    StdCxx,
    Frigg,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.inputs.is_empty() {
        return Err(anyhow!("at least one input file is required"));
    }

    let mut source = String::new();
    for input in &args.inputs {
        if args.verbose {
            eprintln!("reading {}", input.display());
        }
        let text = fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        source.push_str(&text);
        source.push('\n');
    }

    let unit = compile(&source).map_err(|diagnostic| {
        let filename = args.inputs[0].display().to_string();
        anyhow!("{}", diagnostic.render(&filename, &source))
    })?;

    if args.verbose {
        eprintln!(
            "registered {} message(s), {} struct(s), {} enum(s), {} group(s)",
            unit.messages.len(),
            unit.structs.len(),
            unit.enums.len(),
            unit.groups.len()
        );
        for message in unit.all_messages() {
            if let Some(head) = &message.head {
                eprintln!(
                    "  {}: head pointer width {} byte(s)",
                    message.name,
                    head.pointer_width.bytes()
                );
            }
        }
    }

    if args.dump_model {
        eprintln!("{unit:#?}");
    }

    let generated = match &args.target {
        Target::Cpp { lib, protobuf } => {
            let dialect = match lib {
                CppLib::StdCxx => CppDialect::StdCxx,
                CppLib::Frigg => CppDialect::Frigg,
            };
            generate_cpp(&unit, dialect, *protobuf)
        }
        Target::Rust => generate_rust(&unit),
        Target::Wireshark => generate_wireshark(&unit),
    };

    fs::write(&args.output, &generated)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    if args.verbose {
        eprintln!("wrote {} byte(s) to {}", generated.len(), args.output.display());
    }

    Ok(())
}
