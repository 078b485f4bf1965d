//! Output data structures for meshes and variables
//!
//! # Overview
//!
//! Every query answered by the [MiliFileFormat](crate::format::MiliFileFormat)
//! returns one of the types here:
//!
//! | Query                | Result                                |
//! | -------------------- | ------------------------------------- |
//! | `get_mesh`           | [UnstructuredMesh]                    |
//! | `get_var`            | [VarArray::Float] or [VarArray::Labels] |
//! | `get_vector_var`     | [FloatArray]                          |
//! | `get_auxiliary_data` | [Material]                            |
//!
//! The cell type enum is reused from `vtkio` so that a mesh converts straight
//! into a VTK unstructured grid (see the [vtk](crate::vtk) module).
//!
//! Values never covered by a variable are NaN, which consumers treat as "no
//! data" rather than zero.

// Split into subfiles for development, but anything important is re-exported
mod arrays;
mod grid;
mod material;

#[doc(inline)]
pub use crate::mesh::arrays::{ElementLabelArray, FloatArray, VarArray};

#[doc(inline)]
pub use crate::mesh::grid::{ArrayData, Cell, DataArray, UnstructuredMesh};

#[doc(inline)]
pub use crate::mesh::material::Material;

#[doc(inline)]
pub use vtkio::model::CellType;

/// Ghost flag encoding shared with VisIt's `avtGhostData`
pub mod ghost {
    /// Point array flagging nodes outside the problem
    pub const GHOST_NODES: &str = "avtGhostNodes";
    /// Cell array flagging zones outside the problem
    pub const GHOST_ZONES: &str = "avtGhostZones";
    /// Bit set on nodes not touched by any live zone
    pub const NODE_NOT_APPLICABLE_TO_PROBLEM: u8 = 1 << 1;
    /// Bit set on zones whose element has been destroyed
    pub const ZONE_NOT_APPLICABLE_TO_PROBLEM: u8 = 1 << 5;
}
