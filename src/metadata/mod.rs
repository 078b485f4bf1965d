//! Metadata model built from the `.mili` sidecar
//!
//! # Overview
//!
//! Everything the reader knows about a family before any database is opened
//! lives here. The JSON loader fills one [MeshMetaData] per mesh with its
//! classes, variables and materials, and the mesh reader later completes the
//! per-domain parts (element counts, connectivity offsets, labels and the
//! subrecord tables).
//!
//! The [DatabaseMetaData] is the consumer-facing summary of every mesh,
//! variable and expression a family exposes, as produced by
//! [MiliFileFormat::populate_database_metadata](crate::format::MiliFileFormat::populate_database_metadata).

// Split into subfiles for development, but anything important is re-exported
mod class;
mod database;
mod material;
mod mesh;
mod shared;
mod subrecord;
mod variable;

#[doc(inline)]
pub use crate::metadata::class::{ClassLabels, MiliClassMetaData};

#[doc(inline)]
pub use crate::metadata::database::{
    DatabaseMetaData, ExpressionMetaData, MaterialSetMetaData, MeshEntry, VariableEntry,
};

#[doc(inline)]
pub use crate::metadata::material::MiliMaterialMetaData;

#[doc(inline)]
pub use crate::metadata::mesh::{
    MeshMetaData, VariableLayout, VariableTarget, SAND_MESH_PREFIX, SHARED_CLASS,
};

#[doc(inline)]
pub use crate::metadata::shared::SharedVariableInfo;

#[doc(inline)]
pub use crate::metadata::subrecord::{SubrecordEntry, SubrecordTable};

#[doc(inline)]
pub use crate::metadata::variable::{
    AggregateType, Centering, ElementSetGroup, MiliVariableMetaData, VariableShape,
};
