//! Command line summary of a Mili family
//!
//! Prints everything the `.mili` sidecar describes: meshes, material sets,
//! variable paths and states. No domain database is opened.
//!
//! # Usage
//!
//! ```text
//! Usage: miliinfo <file.mili> [options]
//! ```
//!
//! ### > How to list the states
//!
//! ```bash
//! # Print the cycle and time of every state
//! miliinfo /path/to/d3samp6.mili --states
//! ```
//!
//! ### > How to find variable paths
//!
//! The paths printed are exactly those accepted by `mili2vtk --variables`.
//!
//! ```bash
//! # Only the variables, including component expressions
//! miliinfo /path/to/d3samp6.mili --variables
//! ```

// crate modules
use mili::format::MiliFileFormat;
use mili::library::SnapshotLibrary;
use mili::metadata::DatabaseMetaData;
use mili::utils::*;

// external crates
use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use log::*;

#[doc(hidden)]
fn main() -> Result<()> {
    // set up the command line interface and match arguments
    let cli: Cli = Cli::parse();

    // set up logging (+2 to make Info the default)
    let verbosity = cli.verbose as usize + 2;
    logging_init(verbosity, cli.quiet);

    info!("Reading {}", &cli.file);
    let mut format = MiliFileFormat::open(&cli.file, SnapshotLibrary::new())?;
    let md = format.populate_database_metadata();

    match cli.variables {
        true => print_variables(&md),
        false => print_summary(&format, &md),
    }

    if cli.states {
        print_states(&md);
    }

    Ok(())
}

/// Summary of the meshes, variables and states of a Mili family
///
/// Examples
/// --------
///
///  Typical use:
///     $ miliinfo d3samp6.mili
///
///  List variable paths and expressions:
///     $ miliinfo d3samp6.mili --variables
///
///  Include the time of every state:
///     $ miliinfo d3samp6.mili --states
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    term_width(70),
    override_usage("miliinfo <file.mili> [options]")
)]
struct Cli {
    // * Positional
    /// Path to input .mili file
    #[arg(name = "file.mili")]
    file: String,

    // * Optional
    /// Only list variable paths and expressions
    #[arg(long)]
    variables: bool,

    /// List the cycle and time of every state
    #[arg(long)]
    states: bool,

    // * Flags
    /// Verbose logging (-v, -vv)
    ///
    /// If specified, the default log level of INFO is increased to DEBUG (-v)
    /// or TRACE (-vv). Errors and Warnings are always logged unless in quiet
    /// (-q) mode.
    #[arg(short, long)]
    #[arg(action = clap::ArgAction::Count)]
    verbose: u8,

    /// Supress all log output (overrules --verbose)
    #[arg(short, long)]
    quiet: bool,
}

#[doc(hidden)]
fn banner() -> String {
    let mut s = f!("{:-<1$}\n", "", 70);
    s += &f!("{:^70}\n", "Mili :: MiliInfo");
    s += &f!("{:-<1$}", "", 70);
    s
}

#[doc(hidden)]
fn logging_init(verbosity: usize, quiet: bool) {
    stderrlog::new()
        .modules(vec![module_path!(), "mili::readers", "mili::format"])
        .quiet(quiet)
        .verbosity(verbosity)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

#[doc(hidden)]
fn print_summary(format: &MiliFileFormat, md: &DatabaseMetaData) {
    println!("Family: {}", format.family_root());
    println!("Location: {}", format.family_path().display());
    println!(
        "Domains: {}, meshes: {}, dimensions: {}",
        format.n_domains(),
        format.n_meshes(),
        format.dims()
    );

    if let (Some(first), Some(last)) = (md.times.first(), md.times.last()) {
        println!("Times: {} to {}", first.sci(5, 2), last.sci(5, 2));
    }

    println!("{md}");
}

#[doc(hidden)]
fn print_variables(md: &DatabaseMetaData) {
    for var in &md.variables {
        println!("{}", var.path);
    }
    for expression in &md.expressions {
        println!("{} = {}", expression.name, expression.definition);
    }
}

#[doc(hidden)]
fn print_states(md: &DatabaseMetaData) {
    println!("\n{:>8}  {:>12}", "cycle", "time");
    let rows = md
        .cycles
        .iter()
        .zip(&md.times)
        .map(|(cycle, time)| f!("{cycle:>8}  {:>12}", time.sci(5, 2)))
        .join("\n");
    println!("{rows}");
}
