//! Query interface over a Mili family
//!
//! # Overview
//!
//! A [MiliFileFormat] is built from the `.mili` sidecar of a family. The
//! metadata is loaded straight away, while the domain databases are only
//! opened and read on first use.
//!
//! ```ignore
//! use mili::format::MiliFileFormat;
//! use mili::library::SnapshotLibrary;
//!
//! let mut format = MiliFileFormat::open("d3samp6.mili", SnapshotLibrary::new())?;
//!
//! // mesh of domain 0 at the first state, with ghosting if sanded
//! let mesh = format.get_mesh(0, 0, "mesh1")?;
//!
//! // a zone centred variable, NaN wherever it is not defined
//! let sx = format.get_var(0, 0, "Primal/Shared/sx")?;
//! ```
//!
//! Queries follow the usual multi-timestep, multi-domain contract:
//!
//! | Method                       | Returns                                   |
//! | ---------------------------- | ----------------------------------------- |
//! | `get_mesh`                   | [UnstructuredMesh] for a domain and state |
//! | `get_var`                    | Scalar values or label pseudo-variables   |
//! | `get_vector_var`             | Vectors and tensors, expanded to 9 if symmetric |
//! | `get_auxiliary_data`         | Material assignment of every cell         |
//! | `populate_database_metadata` | Summary of everything the family exposes  |

// Split into subfiles for development, but anything important is re-exported
mod domain;
mod labels;
mod mesh_reader;
mod variables;

// internal modules
use crate::error::{MiliError, Result};
use crate::library::{MiliDatabase, MiliLibrary};
use crate::mesh::{Material, UnstructuredMesh};
use crate::metadata::{
    Centering, DatabaseMetaData, ExpressionMetaData, MaterialSetMetaData, MeshEntry,
    MeshMetaData, MiliVariableMetaData, VariableEntry, VariableShape, SAND_MESH_PREFIX,
};
use crate::readers::{parsers, MiliJsonReader};
use crate::utils::f;

// standard library
use std::path::{Path, PathBuf};

// external crates
use log::{debug, info, warn};

#[doc(inline)]
pub use crate::format::variables::expand_symmetric_tensor;

#[doc(inline)]
pub use crate::format::labels::{ORIGINAL_NODE_LABELS, ORIGINAL_ZONE_LABELS};

/// Auxiliary data type for material assignments
pub const AUXILIARY_DATA_MATERIAL: &str = "AUXILIARY_DATA_MATERIAL";

/// Position of each symmetric tensor component once expanded to 9 values
const SYMMETRIC_EXPANDED_IDX: [usize; 6] = [0, 4, 8, 1, 5, 6];

/// A Mili family opened through a [MiliLibrary]
///
/// Owns the metadata of every mesh, one database handle per domain and the
/// meshes and materials read so far. Handles are closed when the format is
/// dropped.
pub struct MiliFileFormat {
    library: Box<dyn MiliLibrary>,
    family_root: String,
    family_path: PathBuf,
    n_domains: usize,
    n_meshes: usize,
    dims: usize,
    n_timesteps: usize,
    cycles: Vec<i32>,
    times: Vec<f64>,
    meshes: Vec<MeshMetaData>,
    /// Open database handle of every domain
    dbs: Vec<Option<Box<dyn MiliDatabase>>>,
    /// Baseline mesh of every (domain, mesh)
    datasets: Vec<Vec<Option<UnstructuredMesh>>>,
    /// Material assignment of every (domain, mesh)
    materials: Vec<Vec<Option<Material>>>,
    mesh_read: Vec<bool>,
}

/// Construction and simple accessors
impl MiliFileFormat {
    /// Load the sidecar at `path`, family databases are opened lazily
    pub fn open<P: AsRef<Path>>(path: P, library: impl MiliLibrary + 'static) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading {}", path.display());
        let mili = MiliJsonReader::new().parse(path)?;

        let n_domains = mili.n_domains;
        let n_meshes = mili.n_meshes;

        Ok(Self {
            library: Box::new(library),
            family_root: mili.family_root,
            family_path: mili.family_path,
            n_domains,
            n_meshes,
            dims: mili.dims,
            n_timesteps: mili.n_timesteps,
            cycles: mili.cycles,
            times: mili.times,
            meshes: mili.meshes,
            dbs: (0..n_domains).map(|_| None).collect(),
            datasets: vec![vec![None; n_meshes]; n_domains],
            materials: vec![vec![None; n_meshes]; n_domains],
            mesh_read: vec![false; n_domains],
        })
    }

    pub fn family_root(&self) -> &str {
        &self.family_root
    }

    pub fn family_path(&self) -> &Path {
        &self.family_path
    }

    pub fn n_domains(&self) -> usize {
        self.n_domains
    }

    pub fn n_meshes(&self) -> usize {
        self.n_meshes
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Cycle of every state
    pub fn cycles(&self) -> &[i32] {
        &self.cycles
    }

    /// Simulation time of every state
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn n_timesteps(&self) -> usize {
        self.n_timesteps
    }

    /// Metadata of mesh `mesh_id`
    pub fn mesh_metadata(&self, mesh_id: usize) -> Option<&MeshMetaData> {
        self.meshes.get(mesh_id)
    }

    /// True once the mesh of a domain has been read
    pub fn is_mesh_read(&self, dom: usize) -> bool {
        self.mesh_read.get(dom).copied().unwrap_or(false)
    }

    /// True while the database of a domain is open
    pub fn is_db_open(&self, dom: usize) -> bool {
        self.dbs.get(dom).is_some_and(|db| db.is_some())
    }

    fn check_domain(&self, dom: usize) -> Result<()> {
        match dom < self.n_domains {
            true => Ok(()),
            false => Err(MiliError::ImproperUse(f!(
                "domain {dom} requested, family has {}",
                self.n_domains
            ))),
        }
    }

    /// Mesh index referenced by a mesh name or variable path
    fn mesh_id_from_path(&self, path: &str) -> Result<usize> {
        let mesh_id = match self.n_meshes {
            1 => 0,
            _ => parsers::mesh_id(path).unwrap_or(0),
        };

        match mesh_id < self.n_meshes {
            true => Ok(mesh_id),
            false => Err(MiliError::invalid_variable(path, "no such mesh")),
        }
    }
}

/// Consumer-facing queries
impl MiliFileFormat {
    /// Material assignment of the cells of a domain
    ///
    /// `var_name` is the material set name published in the metadata, e.g.
    /// `materials1`. Any type other than [AUXILIARY_DATA_MATERIAL] has no data.
    pub fn get_auxiliary_data(
        &mut self,
        var_name: &str,
        _timestep: usize,
        dom: usize,
        aux_type: &str,
    ) -> Result<Option<Material>> {
        if aux_type != AUXILIARY_DATA_MATERIAL {
            debug!("No auxiliary data of type {aux_type}");
            return Ok(None);
        }

        let mesh_id = self
            .meshes
            .iter()
            .position(|md| md.material_set_name() == var_name)
            .ok_or_else(|| MiliError::invalid_variable(var_name, "not a material set"))?;

        self.read_mesh(dom)?;
        let material = self.materials[dom][mesh_id]
            .clone()
            .ok_or_else(|| MiliError::invalid_variable(var_name, "no material data"))?;
        Ok(Some(material))
    }

    /// Summary of every mesh, material set, variable and expression
    ///
    /// Shared variables are published once under the `Shared` class. Sanded
    /// meshes are published twice, the default mesh ghosted and a
    /// `sand_mesh` variant without ghosting.
    pub fn populate_database_metadata(&mut self) -> DatabaseMetaData {
        let mut md = DatabaseMetaData::new();

        for mesh in self.meshes.iter_mut() {
            mesh.reset_shared_flags();
            Self::add_mesh_to_metadata(mesh, &mut md);
        }

        md.cycles = self.cycles.clone();
        md.times = self.times.clone();
        md
    }

    fn add_mesh_to_metadata(mesh: &mut MeshMetaData, md: &mut DatabaseMetaData) {
        let mesh_name = mesh.mesh_name();
        let is_sanded = mesh.contains_sand();

        md.meshes.push(MeshEntry {
            name: mesh_name.clone(),
            mesh_id: mesh.mesh_id(),
            n_domains: mesh.n_domains(),
            dims: mesh.dims(),
            is_ghosted: is_sanded,
        });
        if is_sanded {
            md.meshes.push(MeshEntry {
                name: mesh.sand_mesh_name(),
                mesh_id: mesh.mesh_id(),
                n_domains: mesh.n_domains(),
                dims: mesh.dims(),
                is_ghosted: false,
            });
        }

        if !mesh.materials().is_empty() {
            md.material_sets.push(MaterialSetMetaData {
                name: mesh.material_set_name(),
                mesh_name: mesh_name.clone(),
                names: mesh.materials().iter().map(|m| m.name.clone()).collect(),
                colours: mesh.materials().iter().map(|m| m.colour.clone()).collect(),
            });
        }

        let first = md.variables.len();
        for index in 0..mesh.variables().len() {
            Self::add_variable_to_metadata(mesh, index, md);
        }

        for (label, centering) in [
            (ORIGINAL_ZONE_LABELS, Centering::Zone),
            (ORIGINAL_NODE_LABELS, Centering::Node),
        ] {
            md.variables.push(VariableEntry {
                path: mesh.label_path(label),
                mesh_name: mesh_name.clone(),
                centering,
                shape: None,
                n_components: 1,
            });
        }

        // every variable is also available on the un-ghosted mesh
        if is_sanded {
            let sand_name = mesh.sand_mesh_name();
            let sand_entries: Vec<VariableEntry> = md.variables[first..]
                .iter()
                .filter(|v| !v.is_label())
                .map(|v| VariableEntry {
                    path: f!("{SAND_MESH_PREFIX}{}", v.path),
                    mesh_name: sand_name.clone(),
                    ..v.clone()
                })
                .collect();
            md.variables.extend(sand_entries);
        }
    }

    fn add_variable_to_metadata(mesh: &mut MeshMetaData, index: usize, md: &mut DatabaseMetaData) {
        let var = mesh.variable(index).clone();
        let mesh_name = mesh.mesh_name();

        let mut publish = |path: String, shape: VariableShape, vector_size: usize| {
            md.variables.push(VariableEntry {
                path,
                mesh_name: mesh_name.clone(),
                centering: var.centering,
                shape: Some(shape),
                n_components: shape.output_components(vector_size),
            });
        };

        if var.is_element_set() {
            if var.centering == Centering::Node {
                warn!("Node centred element set {} is not supported", var.short_name);
                return;
            }
            for group in var.groups() {
                match group.is_shared {
                    true => {
                        if let Some(path) = Self::claim_shared(mesh, &group.name) {
                            publish(path, group.shape, group.vector_size);
                        }
                    }
                    false => publish(
                        mesh.variable_path(&var.class_name, &group.name),
                        group.shape,
                        group.vector_size,
                    ),
                }
            }
            return;
        }

        let path = match var.is_shared {
            true => match Self::claim_shared(mesh, &var.short_name) {
                Some(path) => path,
                None => return,
            },
            false => mesh.variable_path(&var.class_name, &var.short_name),
        };

        publish(path.clone(), var.shape, var.vector_size);
        md.expressions.extend(Self::component_expressions(&path, &var));
    }

    /// Path of a shared variable the first time it is seen in a pass
    fn claim_shared(mesh: &mut MeshMetaData, name: &str) -> Option<String> {
        let path = mesh.shared_path(name);
        match mesh.shared_info_mut(name) {
            Some(info) if !info.is_added => {
                info.is_added = true;
                Some(path)
            }
            Some(_) => None,
            None => {
                warn!("No shared variable info for {name}");
                None
            }
        }
    }

    /// One expression per named component of a vector or tensor
    fn component_expressions(path: &str, var: &MiliVariableMetaData) -> Vec<ExpressionMetaData> {
        if var.vector_size < 2 || var.components.len() != var.vector_size {
            return Vec::new();
        }

        var.components
            .iter()
            .enumerate()
            .filter_map(|(i, component)| {
                let index = match var.shape {
                    VariableShape::SymmetricTensor => *SYMMETRIC_EXPANDED_IDX.get(i)?,
                    _ => i,
                };
                Some(ExpressionMetaData {
                    name: f!("{path}/{component}"),
                    definition: f!("<{path}>[{index}]"),
                })
            })
            .collect()
    }
}

impl Drop for MiliFileFormat {
    fn drop(&mut self) {
        for (dom, db) in self.dbs.iter_mut().enumerate() {
            if let Some(mut db) = db.take() {
                match db.close() {
                    Ok(_) => debug!("Closed domain {dom}"),
                    Err(e) => warn!("Failed to close domain {dom}: {e}"),
                }
            }
        }
    }
}
