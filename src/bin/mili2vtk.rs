//! Command line conversion of Mili families to vtk formats
//!
//! Converts one mesh of every domain of a family to visual toolkit formats at
//! any recorded state, with a choice of variables to attach.
//!
//! # Usage
//!
//! ```text
//! Usage: mili2vtk <file.mili> [options]
//! ```
//!
//! Help is printed with the `-h` flag, and `--help` will show examples, default
//! values, examples, and any important behaviour.
//!
//! Domain databases are read from bincode snapshots (`<family>.msnap`) next
//! to the `.mili` sidecar.
//!
//! ## Mesh options
//!
//! ### > How to choose a state
//!
//! States are numbered from 1, and the first state is used by default.
//!
//! ```bash
//! # Node positions and variables of the 12th state
//! mili2vtk /path/to/d3samp6.mili --state 12
//! ```
//!
//! ### > How to include variables
//!
//! Any variable path listed by `miliinfo` may be attached. Node centred
//! variables become point data and zone centred variables cell data.
//!
//! ```bash
//! # Attach the shared stress and the brick element set strain
//! mili2vtk /path/to/d3samp6.mili --variables Primal/Shared/sx Primal/brick/eps
//! ```
//!
//! ### > How to see destroyed elements
//!
//! Sanded meshes flag destroyed elements as ghost zones by default. The
//! `--sand` flag converts the un-ghosted variant instead.
//!
//! ```bash
//! mili2vtk /path/to/d3samp6.mili --sand
//! ```
//!
//! ## VTK options
//!
//! ### > How to choose a Vtk format
//!
//! XML and legacy formats are supported, with both ascii and binary variants.
//!
//! ```bash
//! # Output as a binary vtk with legacy formatting
//! mili2vtk /path/to/d3samp6.mili --format legacy-binary
//! ```
//!
//! *Note - [VisIt](https://visit-dav.github.io/visit-website/index.html) only
//! reads big-endian, so that is the default byte order.*

// crate modules
use mili::format::MiliFileFormat;
use mili::library::SnapshotLibrary;
use mili::utils::*;
use mili::vtk::{write_vtk, MiliToVtk, MiliToVtkBuilder, VtkFormat};

// external crates
use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use kdam::{BarBuilder, BarExt};
use log::*;
use vtkio::model::ByteOrder;

#[doc(hidden)]
fn main() -> Result<()> {
    // set up the command line interface and match arguments
    let cli: Cli = Cli::parse();

    // set up logging (+2 to make Info the default)
    let verbosity = cli.verbose as usize + 2;
    logging_init(verbosity, cli.quiet);

    // Load the family metadata
    info!("Reading {}", &cli.file);
    let mut format = MiliFileFormat::open(&cli.file, SnapshotLibrary::new())?;

    if cli.state == 0 || cli.state > format.n_timesteps().max(1) {
        bail!(
            "State {} requested, family has {} state(s)",
            cli.state,
            format.n_timesteps()
        );
    }

    let mesh_name = get_mesh_name(&format, &cli);
    let convertor = converter_init(&cli);
    let prefix = cli
        .output
        .clone()
        .unwrap_or_else(|| format.family_root().to_string());

    // Convert every domain
    info!("Converting {mesh_name} at state {}", cli.state);
    let mut progress_bar = BarBuilder::default()
        .total(format.n_domains())
        .unit(" domains")
        .disable(cli.quiet || cli.verbose > 1)
        .build()
        .map_err(|e| anyhow::anyhow!(e))?;

    for dom in 0..format.n_domains() {
        let vtk = convertor.convert(&mut format, cli.state - 1, dom, &mesh_name)?;
        let path = get_output_path(&prefix, dom, format.n_domains(), &cli);
        write_vtk(vtk, &path, cli.format)?;
        progress_bar.update(1)?;
    }

    if !(cli.quiet || cli.verbose > 1) {
        eprintln!()
    };

    info!("Written {} file(s)", format.n_domains());
    Ok(())
}

#[allow(rustdoc::invalid_rust_codeblocks)]
/// Conversion of Mili families to visual toolkit formats
///
/// Examples
/// --------
///
///  Typical use:
///     $ mili2vtk d3samp6.mili -o my_output
///
///  Attach variables at the last of 20 states:
///     $ mili2vtk d3samp6.mili --state 20   \
///               --variables Primal/Shared/sx Primal/node/nodvel
///
///  Convert the un-ghosted sand mesh with materials:
///     $ mili2vtk d3samp6.mili --sand --materials
///
///  Output legacy in ascii format:
///     $ mili2vtk d3samp6.mili --format legacy-ascii
///
/// Notes
/// -----
///
/// Domain databases are read from <family>.msnap snapshots in the
/// same directory as the .mili file.
///
/// Values a variable does not define are written as NaN.
#[doc(hidden)]
#[derive(Parser)]
#[command(
    verbatim_doc_comment,
    arg_required_else_help(true),
    before_help(banner()),
    after_help("Typical use: mili2vtk d3samp6.mili -o my_output \n\nNOTE: --help shows more detail and examples"),
    term_width(70),
    hide_possible_values(true),
    override_usage("mili2vtk <file.mili> [options]")
)]
struct Cli {
    // * Positional
    /// Path to input .mili file
    #[arg(name = "file.mili")]
    file: String,

    // * Optional
    /// State number, starting from 1
    #[arg(help_heading("Mesh options"))]
    #[arg(short, long)]
    #[arg(default_value_t = 1)]
    #[arg(value_name = "n")]
    state: usize,

    /// Mesh number, starting from 1
    #[arg(help_heading("Mesh options"))]
    #[arg(short, long)]
    #[arg(default_value_t = 1)]
    #[arg(value_name = "n")]
    mesh: usize,

    /// Use the un-ghosted sand mesh
    ///
    /// Only meaningful for families that record destroyed elements. The
    /// default mesh flags them as ghost zones instead.
    #[arg(help_heading("Mesh options"))]
    #[arg(long)]
    sand: bool,

    /// Variable path(s) to include
    ///
    /// Paths as listed by miliinfo, e.g. Primal/Shared/sx. Symmetric tensors
    /// are written with all nine components.
    #[arg(help_heading("Mesh options"))]
    #[arg(long)]
    #[arg(value_parser, num_args = 1.., value_delimiter = ' ')]
    #[clap(required = false)]
    #[arg(value_name = "list")]
    variables: Vec<String>,

    /// Include the material number of every cell
    #[arg(help_heading("Mesh options"))]
    #[arg(long)]
    materials: bool,

    /// Name of output file (excl. extension)
    ///
    /// Defaults to the family name, and will automatically append the domain
    /// number for multi-domain families and the correct extension.
    #[arg(help_heading("Vtk options"))]
    #[arg(short, long)]
    #[arg(value_name = "path")]
    output: Option<String>,

    /// VTK output format
    ///
    /// Available visual toolkit file formats:
    ///     > xml (default)
    ///     > legacy-ascii
    ///     > legacy-binary
    #[arg(help_heading("Vtk options"))]
    #[arg(short, long, value_enum)]
    #[arg(hide_default_value(true))]
    #[arg(default_value_t = VtkFormat::Xml)]
    #[arg(verbatim_doc_comment)]
    #[arg(value_name = "format")]
    format: VtkFormat,

    /// Byte ordering
    ///
    /// Visit only reads big endian, most sytems are little endian.
    /// Defaults to big endian for convenience over performance.
    ///     > big-endian (default)
    ///     > little-endian
    #[arg(help_heading("Vtk options"))]
    #[arg(long, value_enum)]
    #[arg(hide_default_value(true))]
    #[arg(default_value_t = CliByteOrder::BigEndian)]
    #[arg(verbatim_doc_comment)]
    #[arg(value_name = "endian")]
    endian: CliByteOrder,

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

// Wrapper for byte order used by vtkio
#[doc(hidden)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CliByteOrder {
    BigEndian,
    LittleEndian,
}

#[doc(hidden)]
fn banner() -> String {
    let mut s = f!("{:-<1$}\n", "", 70);
    s += &f!("{:^70}\n", "Mili :: MiliToVtk");
    s += &f!("{:-<1$}", "", 70);
    s
}

#[doc(hidden)]
fn logging_init(verbosity: usize, quiet: bool) {
    stderrlog::new()
        .modules(vec![
            module_path!(),
            "mili::readers",
            "mili::format",
            "mili::vtk",
        ])
        .quiet(quiet)
        .verbosity(verbosity)
        .show_level(false)
        .color(stderrlog::ColorChoice::Never)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

#[doc(hidden)]
fn get_mesh_name(format: &MiliFileFormat, cli: &Cli) -> String {
    let mesh = cli.mesh.clamp(1, format.n_meshes().max(1));
    if mesh != cli.mesh {
        warn!("Mesh {} does not exist, using mesh {mesh}", cli.mesh);
    }

    match cli.sand {
        true => f!("sand_mesh{mesh}"),
        false => f!("mesh{mesh}"),
    }
}

#[doc(hidden)]
fn converter_init(cli: &Cli) -> MiliToVtk {
    let mut builder = MiliToVtkBuilder::new()
        .variables(cli.variables.clone())
        .include_materials(cli.materials);

    builder = builder.byte_order(match cli.endian {
        CliByteOrder::LittleEndian => ByteOrder::LittleEndian,
        CliByteOrder::BigEndian => ByteOrder::BigEndian,
    });

    builder.build()
}

#[doc(hidden)]
fn get_output_path(prefix: &str, dom: usize, n_domains: usize, cli: &Cli) -> String {
    let extension = cli.format.extension();
    let path = match n_domains {
        1 => f!("{prefix}.{extension}"),
        _ => f!("{prefix}_{dom}.{extension}"),
    };

    debug!("Set output path to {path}");
    path
}
