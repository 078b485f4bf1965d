//! Consumer-facing summary of what a family exposes

// standard library
use std::fmt;

// internal modules
use crate::metadata::{Centering, VariableShape};

/// A mesh as seen by consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshEntry {
    /// Name used to query the mesh, e.g. `mesh1` or `sand_mesh1`
    pub name: String,
    /// Index of the underlying Mili mesh
    pub mesh_id: usize,
    pub n_domains: usize,
    pub dims: usize,
    /// True when queries of this mesh attach ghost arrays
    pub is_ghosted: bool,
}

/// A variable as seen by consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEntry {
    pub path: String,
    pub mesh_name: String,
    pub centering: Centering,
    /// `None` for label pseudo-variables
    pub shape: Option<VariableShape>,
    /// Components per value in the arrays returned for this variable
    pub n_components: usize,
}

impl VariableEntry {
    pub fn is_label(&self) -> bool {
        self.shape.is_none()
    }
}

/// Material names and colours of one mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSetMetaData {
    pub name: String,
    pub mesh_name: String,
    pub names: Vec<String>,
    pub colours: Vec<String>,
}

/// A derived quantity, defined in terms of other variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionMetaData {
    pub name: String,
    pub definition: String,
}

/// Everything a family exposes to consumers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseMetaData {
    pub meshes: Vec<MeshEntry>,
    pub variables: Vec<VariableEntry>,
    pub material_sets: Vec<MaterialSetMetaData>,
    pub expressions: Vec<ExpressionMetaData>,
    pub cycles: Vec<i32>,
    pub times: Vec<f64>,
}

impl DatabaseMetaData {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshEntry> {
        self.meshes.iter().find(|m| m.name == name)
    }

    pub fn variable(&self, path: &str) -> Option<&VariableEntry> {
        self.variables.iter().find(|v| v.path == path)
    }

    pub fn expression(&self, name: &str) -> Option<&ExpressionMetaData> {
        self.expressions.iter().find(|e| e.name == name)
    }

    /// Number of published variables with the given path
    pub fn count_variable(&self, path: &str) -> usize {
        self.variables.iter().filter(|v| v.path == path).count()
    }

    /// All variables of one shape category
    pub fn variables_with_shape(&self, shape: VariableShape) -> impl Iterator<Item = &VariableEntry> {
        self.variables
            .iter()
            .filter(move |v| v.shape == Some(shape))
    }
}

impl fmt::Display for DatabaseMetaData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Meshes: {}", self.meshes.len())?;
        for mesh in &self.meshes {
            writeln!(
                f,
                " - {} ({} domains, {}D{})",
                mesh.name,
                mesh.n_domains,
                mesh.dims,
                if mesh.is_ghosted { ", ghosted" } else { "" }
            )?;
        }

        writeln!(f, "Material sets: {}", self.material_sets.len())?;
        for set in &self.material_sets {
            writeln!(f, " - {} on {}: {}", set.name, set.mesh_name, set.names.join(", "))?;
        }

        writeln!(f, "Variables: {}", self.variables.len())?;
        for var in &self.variables {
            let kind = match var.shape {
                Some(shape) => format!("{shape:?}"),
                None => "Label".to_string(),
            };
            writeln!(f, " - {} [{kind}, {:?}]", var.path, var.centering)?;
        }

        writeln!(f, "Expressions: {}", self.expressions.len())?;
        write!(f, "States: {}", self.cycles.len())
    }
}
