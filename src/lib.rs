//! # The Mili crate
//!
//! A reader for Mili finite element databases described by `.mili` JSON
//! sidecars
//!
//! ## Installation
//!
//! Direct install from github:
//!
//! ```shell
//! cargo install --git https://github.com/repositony/mili.git
//! ```
//!
//! ## Overview
//!
//! The crate contains a couple of command line tools for quickly inspecting and
//! converting Mili families.
//!
//! | Command line | Description                                          |
//! | ------------ | ---------------------------------------------------- |
//! | `mili2vtk`   | Convert any mesh of a family to various VTK formats  |
//! | `miliinfo`   | Summarise the meshes, variables and states of a family |
//!
//! All tools are fully documented with detailed `--help` messages, including
//! examples for common use cases.
//!
//! ### Supported element types
//!
//! | Mili superclass | Output cell                                       |
//! | --------------- | ------------------------------------------------- |
//! | Truss           | Line                                              |
//! | Beam            | Line, the orientation node is dropped             |
//! | Tri, Quad       | Triangle, Quad                                    |
//! | Tet, Pyramid    | Tetra, Pyramid                                    |
//! | Wedge           | Wedge                                             |
//! | Hex             | Hexahedron, collapsed to Tetra or Vertex if degenerate |
//! | Particle        | Vertex                                            |
//!
//! ## Advanced use
//!
//! The reader never touches the Mili files directly. Every database call goes
//! through the [MiliLibrary](crate::library::MiliLibrary) trait, so any
//! implementation of the library can be plugged in. In-memory families and
//! bincode snapshots are provided.
//!
//! ```ignore
//! use mili::format::MiliFileFormat;
//! use mili::library::SnapshotLibrary;
//!
//! // metadata is read immediately, domains are opened on first use
//! let mut format = MiliFileFormat::open("./data/d3samp6.mili", SnapshotLibrary::new())?;
//!
//! // now do whatever you want with it:
//! //  - get the mesh of a domain at any state,
//! //  - read scalars, vectors, tensors and element sets,
//! //  - look up the simulation labels of elements,
//! //  - turn it into a vtk,
//! //  - etc...
//! let mesh = format.get_mesh(0, 0, "mesh1")?;
//! let stress = format.get_vector_var(0, 0, "Primal/brick/stress")?;
//! ```
//!
//! As an overview:
//! - The [format] module is the query interface over a family.
//! - The [metadata] module holds everything known about classes, variables
//! and materials.
//! - The [mesh] module contains the meshes and arrays returned by queries.
//! - The [library] module defines the seam to the Mili library.
//! - The [vtk] module allows for writing meshes to VTK formats for plotting.
//!
//! In the background, `serde_json` reads the sidecar, `nom` picks apart
//! variable paths, `clap` is used for command line interface, and `vtkio`
//! allows conversions to various plot formats.
//!
//! Values that a variable does not define are NaN in every returned array, so
//! that they render as "no data" rather than zero.

// Public facing modules
pub mod error;
pub mod format;
pub mod library;
pub mod mesh;
pub mod metadata;
pub mod utils;
pub mod vtk;

// note that docs are hidden to prevent confusing the current simple API
pub mod readers;

// Re-exports of useful data structures
#[doc(inline)]
pub use crate::error::{MiliError, Result};

#[doc(inline)]
pub use crate::format::MiliFileFormat;

#[doc(inline)]
pub use crate::readers::read_mili_info;
