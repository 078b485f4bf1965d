//! Interface to the Mili database library
//!
//! # Overview
//!
//! The reader never touches Mili files directly. Every query it makes goes
//! through the [MiliLibrary] and [MiliDatabase] traits, one method per library
//! call:
//!
//! | Library call          | Trait method                           |
//! | --------------------- | -------------------------------------- |
//! | `mc_open`             | [MiliLibrary::open]                    |
//! | `mc_close`            | [MiliDatabase::close]                  |
//! | `mc_query_family`     | `state_record_formats`, `class_count`  |
//! | `mc_get_class_info`   | [MiliDatabase::class_info]             |
//! | `mc_load_conns`       | [MiliDatabase::load_conns]             |
//! | `mc_load_nodes`       | [MiliDatabase::load_nodes]             |
//! | `mc_load_node_labels` | [MiliDatabase::load_node_labels]       |
//! | `mc_load_conn_labels` | [MiliDatabase::load_conn_labels]       |
//! | `mc_get_subrec_def`   | `subrecord_count`, `subrecord`         |
//! | `mc_read_results`     | [MiliDatabase::read_results]           |
//!
//! Two implementations are provided. The [MemoryLibrary] holds families
//! entirely in memory, and the [SnapshotLibrary] loads the same structures
//! from bincode snapshot files next to the `.mili` sidecar.
//!
//! Numeric and superclass tags keep the values used by the Mili library so
//! that they can be read straight out of the JSON metadata.

// split into subfiles, anything important is re-exported
mod memory;
mod snapshot;

// standard library
use std::path::Path;

// internal modules
use crate::error::{LibResult, LibraryError};

// external crates
use serde::{Deserialize, Serialize};

#[doc(inline)]
pub use crate::library::memory::{CallCounters, MemoryDatabase, MemoryLibrary};

#[doc(inline)]
pub use crate::library::snapshot::{SnapshotLibrary, SNAPSHOT_EXTENSION};

/// Entry point to a Mili library implementation
pub trait MiliLibrary {
    /// Open the family `name` found in the directory `path`
    fn open(&self, path: &Path, name: &str) -> LibResult<Box<dyn MiliDatabase>>;
}

/// An open Mili family database
///
/// State numbers follow the library convention and start from 1.
pub trait MiliDatabase {
    /// Release the handle, called exactly once by the reader
    fn close(&mut self) -> LibResult<()>;

    /// Number of state record formats in the family
    fn state_record_formats(&self) -> LibResult<usize>;

    /// Number of classes of a superclass defined on a mesh
    fn class_count(&self, mesh: usize, superclass: Superclass) -> LibResult<usize>;

    /// Names and element count of the `index`th class of a superclass
    fn class_info(&self, mesh: usize, superclass: Superclass, index: usize) -> LibResult<ClassInfo>;

    /// Connectivity, material and part ids for every element of a class
    fn load_conns(&self, mesh: usize, class: &str) -> LibResult<Connectivity>;

    /// Initial node coordinates, packed by the spatial dimension of the mesh
    fn load_nodes(&self, mesh: usize, class: &str) -> LibResult<Vec<f32>>;

    /// Labels for the nodes of a node class
    fn load_node_labels(&self, mesh: usize, class: &str) -> LibResult<LabelInfo>;

    /// Labels for the elements of a cell class
    fn load_conn_labels(&self, mesh: usize, class: &str) -> LibResult<LabelInfo>;

    /// Number of subrecords in the state record format
    fn subrecord_count(&self) -> LibResult<usize>;

    /// Definition of the subrecord with id `index`
    fn subrecord(&self, index: usize) -> LibResult<Subrecord>;

    /// Read one state variable across every object of a subrecord
    fn read_results(&self, state: usize, subrecord: usize, svar: &str) -> LibResult<ResultBuffer>;
}

/// Numeric type tags for state variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumType {
    String = 1,
    Float = 2,
    Float4 = 3,
    Float8 = 4,
    Int = 5,
    Int4 = 6,
    Int8 = 7,
}

impl TryFrom<i64> for NumType {
    type Error = LibraryError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::String),
            2 => Ok(Self::Float),
            3 => Ok(Self::Float4),
            4 => Ok(Self::Float8),
            5 => Ok(Self::Int),
            6 => Ok(Self::Int4),
            7 => Ok(Self::Int8),
            _ => Err(LibraryError::new(format!("Unknown numeric type {value}"))),
        }
    }
}

/// Superclass tags for mesh object classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Superclass {
    Unit = 0,
    Node = 1,
    Truss = 2,
    Beam = 3,
    Tri = 4,
    Quad = 5,
    Tet = 6,
    Pyramid = 7,
    Wedge = 8,
    Hex = 9,
    Mat = 10,
    Mesh = 11,
    Surface = 12,
    Particle = 13,
}

impl Superclass {
    /// Superclasses that describe cells, in mesh traversal order
    pub const CELL_TYPES: [Superclass; 9] = [
        Superclass::Truss,
        Superclass::Beam,
        Superclass::Tri,
        Superclass::Quad,
        Superclass::Tet,
        Superclass::Pyramid,
        Superclass::Wedge,
        Superclass::Hex,
        Superclass::Particle,
    ];

    /// Superclass for a raw tag value
    pub fn from_id(id: i64) -> Option<Self> {
        let superclass = match id {
            0 => Self::Unit,
            1 => Self::Node,
            2 => Self::Truss,
            3 => Self::Beam,
            4 => Self::Tri,
            5 => Self::Quad,
            6 => Self::Tet,
            7 => Self::Pyramid,
            8 => Self::Wedge,
            9 => Self::Hex,
            10 => Self::Mat,
            11 => Self::Mesh,
            12 => Self::Surface,
            13 => Self::Particle,
            _ => return None,
        };
        Some(superclass)
    }

    /// Number of connectivity entries stored per element
    ///
    /// ```rust
    /// # use mili::library::Superclass;
    /// assert_eq!(Superclass::Beam.conn_count(), Some(3));
    /// assert_eq!(Superclass::Mat.conn_count(), None);
    /// ```
    pub fn conn_count(&self) -> Option<usize> {
        match self {
            Self::Truss => Some(2),
            Self::Beam => Some(3),
            Self::Tri => Some(3),
            Self::Quad => Some(4),
            Self::Tet => Some(4),
            Self::Pyramid => Some(5),
            Self::Wedge => Some(6),
            Self::Hex => Some(8),
            Self::Particle => Some(1),
            _ => None,
        }
    }

    /// True for any superclass whose elements are mesh cells
    pub fn is_cell(&self) -> bool {
        self.conn_count().is_some()
    }
}

/// Result of a class info query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub short_name: String,
    pub long_name: String,
    pub count: usize,
}

/// Element connectivity of a cell class
///
/// Node indices are 0-based, material ids are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connectivity {
    pub conns: Vec<i32>,
    pub mats: Vec<i32>,
    pub parts: Vec<i32>,
}

/// Simulation-native labels of the objects in a class
///
/// `labels` holds one label per object and `blocks` the inclusive ranges of
/// contiguous labels, in object order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelInfo {
    pub labels: Vec<i32>,
    pub blocks: Vec<(i32, i32)>,
}

impl LabelInfo {
    /// Labels `1..=count` as a single block
    ///
    /// ```rust
    /// # use mili::library::LabelInfo;
    /// let info = LabelInfo::sequential(3);
    /// assert_eq!(info.labels, vec![1, 2, 3]);
    /// assert_eq!(info.blocks, vec![(1, 3)]);
    /// ```
    pub fn sequential(count: usize) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self {
            labels: (1..=count as i32).collect(),
            blocks: vec![(1, count as i32)],
        }
    }
}

/// Definition of a subrecord in the state record format
///
/// `blocks` are inclusive, 1-based object ranges within the owning class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subrecord {
    pub name: String,
    pub class_name: String,
    pub qty_objects: usize,
    pub blocks: Vec<(usize, usize)>,
    pub svar_names: Vec<String>,
}

/// Raw values returned by a results read, tagged by numeric kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultBuffer {
    F32(Vec<f32>),
    F64(Vec<f64>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    Bytes(Vec<u8>),
}

impl ResultBuffer {
    /// Number of values held
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::Bytes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the buffer holds the kind of values a numeric type declares
    pub fn matches(&self, num_type: NumType) -> bool {
        matches!(
            (self, num_type),
            (Self::F32(_), NumType::Float | NumType::Float4)
                | (Self::F64(_), NumType::Float8)
                | (Self::I32(_), NumType::Int | NumType::Int4)
                | (Self::I64(_), NumType::Int8)
                | (Self::Bytes(_), NumType::String)
        )
    }

    /// Cast every value into `dest`, returning the number of values written
    ///
    /// String data is cast character by character using the ordinal value.
    ///
    /// ```rust
    /// # use mili::library::ResultBuffer;
    /// let mut dest = [0.0; 2];
    /// ResultBuffer::Bytes(b"AB".to_vec()).copy_into(&mut dest);
    /// assert_eq!(dest, [65.0, 66.0]);
    /// ```
    pub fn copy_into(&self, dest: &mut [f32]) -> usize {
        let n = self.len().min(dest.len());
        match self {
            Self::F32(v) => dest[..n].copy_from_slice(&v[..n]),
            Self::F64(v) => cast(&v[..n], &mut dest[..n], |x| x as f32),
            Self::I32(v) => cast(&v[..n], &mut dest[..n], |x| x as f32),
            Self::I64(v) => cast(&v[..n], &mut dest[..n], |x| x as f32),
            Self::Bytes(v) => cast(&v[..n], &mut dest[..n], |x| x as f32),
        }
        n
    }
}

fn cast<T: Copy>(src: &[T], dest: &mut [f32], f: impl Fn(T) -> f32) {
    for (d, s) in dest.iter_mut().zip(src) {
        *d = f(*s);
    }
}
