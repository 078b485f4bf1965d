//! Registry of classes, variables and materials for one mesh

// standard library
use std::collections::BTreeMap;

// internal modules
use crate::metadata::{
    Centering, MiliClassMetaData, MiliMaterialMetaData, MiliVariableMetaData, SharedVariableInfo,
    SubrecordTable, VariableShape,
};
use crate::utils::f;

// external crates
use log::trace;

/// Prefix of variable paths that address the un-ghosted sand mesh
pub const SAND_MESH_PREFIX: &str = "sand_mesh/";

/// Class segment of every shared variable path
pub const SHARED_CLASS: &str = "Shared";

/// What a variable path refers to once resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableTarget {
    /// A plain variable, by index
    Plain(usize),
    /// One group of an element set
    Group { index: usize, group: usize },
    /// Every sharer of a short name
    Shared(String),
}

/// Layout of the values produced for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    pub centering: Centering,
    pub vector_size: usize,
    pub shape: VariableShape,
}

/// Metadata for one mesh of a Mili database
#[derive(Debug, Clone)]
pub struct MeshMetaData {
    mesh_id: usize,
    n_meshes: usize,
    n_domains: usize,
    dims: usize,
    classes: Vec<MiliClassMetaData>,
    variables: Vec<MiliVariableMetaData>,
    materials: Vec<MiliMaterialMetaData>,
    shared: BTreeMap<String, SharedVariableInfo>,
    n_nodes: Vec<usize>,
    n_cells: Vec<usize>,
    subrecords: Vec<Option<SubrecordTable>>,
}

/// Construction
impl MeshMetaData {
    pub fn new(mesh_id: usize, n_meshes: usize, n_domains: usize, dims: usize) -> Self {
        Self {
            mesh_id,
            n_meshes,
            n_domains,
            dims,
            classes: Vec::new(),
            variables: Vec::new(),
            materials: Vec::new(),
            shared: BTreeMap::new(),
            n_nodes: vec![0; n_domains],
            n_cells: vec![0; n_domains],
            subrecords: vec![None; n_domains],
        }
    }

    pub fn add_class(&mut self, class: MiliClassMetaData) {
        self.classes.push(class);
    }

    /// Register a variable and any shared names it takes part in
    pub fn add_variable(&mut self, variable: MiliVariableMetaData) -> usize {
        let index = self.variables.len();

        if variable.is_element_set() {
            for group in variable.groups().iter().filter(|g| g.is_shared) {
                self.shared
                    .entry(group.name.clone())
                    .or_insert_with(|| SharedVariableInfo::new(&group.name))
                    .push(index, true);
            }
        } else if variable.is_shared {
            self.shared
                .entry(variable.short_name.clone())
                .or_insert_with(|| SharedVariableInfo::new(&variable.short_name))
                .push(index, false);
        }

        trace!(
            "Mesh {} variable {index}: {}/{}",
            self.mesh_id,
            variable.class_name,
            variable.short_name
        );
        self.variables.push(variable);
        index
    }

    pub fn set_materials(&mut self, materials: Vec<MiliMaterialMetaData>) {
        self.materials = materials;
    }
}

/// Accessors
impl MeshMetaData {
    pub fn mesh_id(&self) -> usize {
        self.mesh_id
    }

    pub fn n_domains(&self) -> usize {
        self.n_domains
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Consumer-facing mesh name, `mesh1` for the first mesh
    pub fn mesh_name(&self) -> String {
        f!("mesh{}", self.mesh_id + 1)
    }

    /// Name of the un-ghosted variant of a sanded mesh
    pub fn sand_mesh_name(&self) -> String {
        f!("sand_mesh{}", self.mesh_id + 1)
    }

    /// Name of the material set of this mesh
    pub fn material_set_name(&self) -> String {
        f!("materials{}", self.mesh_id + 1)
    }

    pub fn classes(&self) -> &[MiliClassMetaData] {
        &self.classes
    }

    pub fn class(&self, short_name: &str) -> Option<&MiliClassMetaData> {
        self.classes.iter().find(|c| c.short_name() == short_name)
    }

    pub fn class_mut(&mut self, short_name: &str) -> Option<&mut MiliClassMetaData> {
        self.classes.iter_mut().find(|c| c.short_name() == short_name)
    }

    /// The node class, if the sidecar declares one
    pub fn node_class(&self) -> Option<&MiliClassMetaData> {
        self.classes.iter().find(|c| c.is_node())
    }

    pub fn variables(&self) -> &[MiliVariableMetaData] {
        &self.variables
    }

    pub fn variable(&self, index: usize) -> &MiliVariableMetaData {
        &self.variables[index]
    }

    pub fn variable_mut(&mut self, index: usize) -> &mut MiliVariableMetaData {
        &mut self.variables[index]
    }

    /// Index of the variable `short_name` declared on `class_name`
    pub fn variable_index(&self, class_name: &str, short_name: &str) -> Option<usize> {
        self.variables
            .iter()
            .position(|v| v.class_name == class_name && v.short_name == short_name)
    }

    pub fn materials(&self) -> &[MiliMaterialMetaData] {
        &self.materials
    }

    pub fn shared_info(&self, short_name: &str) -> Option<&SharedVariableInfo> {
        self.shared.get(short_name)
    }

    pub fn shared_info_mut(&mut self, short_name: &str) -> Option<&mut SharedVariableInfo> {
        self.shared.get_mut(short_name)
    }

    /// Forget which shared variables were published by a previous pass
    pub fn reset_shared_flags(&mut self) {
        self.shared.values_mut().for_each(|info| info.is_added = false);
    }

    /// True when any variable flags destroyed elements
    pub fn contains_sand(&self) -> bool {
        self.variables.iter().any(|v| v.is_sand)
    }

    pub fn num_nodes(&self, dom: usize) -> usize {
        self.n_nodes.get(dom).copied().unwrap_or(0)
    }

    pub fn set_num_nodes(&mut self, dom: usize, count: usize) {
        if let Some(n) = self.n_nodes.get_mut(dom) {
            *n = count;
        }
    }

    pub fn num_cells(&self, dom: usize) -> usize {
        self.n_cells.get(dom).copied().unwrap_or(0)
    }

    pub fn set_num_cells(&mut self, dom: usize, count: usize) {
        if let Some(n) = self.n_cells.get_mut(dom) {
            *n = count;
        }
    }

    /// Values per element of a centering in a domain
    pub fn num_elements(&self, dom: usize, centering: Centering) -> usize {
        match centering {
            Centering::Node => self.num_nodes(dom),
            Centering::Zone => self.num_cells(dom),
        }
    }

    pub fn subrecord_table(&self, dom: usize) -> Option<&SubrecordTable> {
        self.subrecords.get(dom).and_then(|t| t.as_ref())
    }

    pub fn set_subrecord_table(&mut self, dom: usize, table: SubrecordTable) {
        if let Some(t) = self.subrecords.get_mut(dom) {
            *t = Some(table);
        }
    }
}

/// Variable paths
impl MeshMetaData {
    /// Leading path segment shared by every variable of this mesh
    pub fn path_prefix(&self) -> String {
        match self.n_meshes {
            1 => "Primal".to_string(),
            _ => f!("Primal ({})", self.mesh_name()),
        }
    }

    /// Path of a plain variable or element set group
    pub fn variable_path(&self, class_name: &str, name: &str) -> String {
        f!("{}/{class_name}/{name}", self.path_prefix())
    }

    /// Path of a shared variable
    pub fn shared_path(&self, name: &str) -> String {
        self.variable_path(SHARED_CLASS, name)
    }

    /// Path of a label pseudo-variable
    pub fn label_path(&self, label: &str) -> String {
        match self.n_meshes {
            1 => label.to_string(),
            _ => f!("{}/{label}", self.mesh_name()),
        }
    }

    /// Find what a variable path refers to
    ///
    /// Accepts plain, element set group and shared paths, optionally prefixed
    /// for the sand mesh.
    pub fn resolve(&self, path: &str) -> Option<VariableTarget> {
        let path = path.strip_prefix(SAND_MESH_PREFIX).unwrap_or(path);
        let mut segments = path.splitn(3, '/');
        let prefix = segments.next()?;
        let class_name = segments.next()?;
        let name = segments.next()?;

        if prefix != self.path_prefix() {
            return None;
        }

        if class_name == SHARED_CLASS {
            return self
                .shared
                .contains_key(name)
                .then(|| VariableTarget::Shared(name.to_string()));
        }

        self.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.class_name == class_name)
            .find_map(|(index, v)| match v.is_element_set() {
                false if v.short_name == name => Some(VariableTarget::Plain(index)),
                true => v
                    .group_index(name)
                    .map(|group| VariableTarget::Group { index, group }),
                _ => None,
            })
    }

    /// Value layout produced when reading a target
    pub fn layout(&self, target: &VariableTarget) -> Option<VariableLayout> {
        match target {
            VariableTarget::Plain(index) => {
                let v = self.variables.get(*index)?;
                Some(VariableLayout {
                    centering: v.centering,
                    vector_size: v.vector_size,
                    shape: v.shape,
                })
            }
            VariableTarget::Group { index, group } => {
                let v = self.variables.get(*index)?;
                let g = v.groups().get(*group)?;
                Some(VariableLayout {
                    centering: v.centering,
                    vector_size: g.vector_size,
                    shape: g.shape,
                })
            }
            VariableTarget::Shared(name) => {
                let first = *self.shared.get(name)?.variable_indices.first()?;
                let v = self.variables.get(first)?;
                match v.group_index(name) {
                    Some(group) => self.layout(&VariableTarget::Group {
                        index: first,
                        group,
                    }),
                    None => self.layout(&VariableTarget::Plain(first)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Superclass;
    use crate::metadata::{AggregateType, ElementSetGroup};

    fn mesh_metadata(n_meshes: usize) -> MeshMetaData {
        let mut md = MeshMetaData::new(n_meshes - 1, n_meshes, 1, 3);
        md.add_class(MiliClassMetaData::new("brick", "Bricks", Superclass::Hex, 2, 1));
        md.add_class(MiliClassMetaData::new("shell", "Shells", Superclass::Quad, 2, 1));

        let mut sx = MiliVariableMetaData::new("sx", "brick", 1);
        sx.is_shared = true;
        md.add_variable(sx.clone());
        sx.class_name = "shell".to_string();
        md.add_variable(sx);

        let mut es = MiliVariableMetaData::new("es_1a", "shell", 1);
        es.vector_size = 3;
        es.groups = Some(vec![ElementSetGroup {
            name: "eps".to_string(),
            vector_size: 3,
            agg_type: AggregateType::Vector,
            shape: VariableShape::Vector,
            component_idxs: vec![0, 1, 2],
            is_shared: false,
        }]);
        md.add_variable(es);
        md
    }

    #[test]
    fn shared_variables_collect_every_class() {
        let md = mesh_metadata(1);
        let info = md.shared_info("sx").unwrap();
        assert_eq!(info.variable_indices, vec![0, 1]);
        assert!(!info.is_all_element_sets);
    }

    #[test]
    fn paths_resolve_to_targets() {
        let md = mesh_metadata(1);
        assert_eq!(md.resolve("Primal/brick/sx"), Some(VariableTarget::Plain(0)));
        assert_eq!(
            md.resolve("Primal/Shared/sx"),
            Some(VariableTarget::Shared("sx".to_string()))
        );
        assert_eq!(
            md.resolve("sand_mesh/Primal/shell/eps"),
            Some(VariableTarget::Group { index: 2, group: 0 })
        );
        assert_eq!(md.resolve("Primal/shell/es_1a"), None);
        assert_eq!(md.resolve("Primal/Shared/eps"), None);
        assert_eq!(md.resolve("Primal/brick"), None);
    }

    #[test]
    fn multi_mesh_paths_carry_the_mesh_name() {
        let md = mesh_metadata(2);
        assert_eq!(md.path_prefix(), "Primal (mesh2)");
        assert_eq!(md.label_path("OriginalZoneLabels"), "mesh2/OriginalZoneLabels");
        assert_eq!(md.resolve("Primal/brick/sx"), None);
        assert_eq!(
            md.resolve("Primal (mesh2)/brick/sx"),
            Some(VariableTarget::Plain(0))
        );
    }

    #[test]
    fn shared_layout_follows_first_sharer() {
        let md = mesh_metadata(1);
        let layout = md
            .layout(&VariableTarget::Shared("sx".to_string()))
            .unwrap();
        assert_eq!(layout.vector_size, 1);
        assert_eq!(layout.centering, Centering::Zone);
    }
}
