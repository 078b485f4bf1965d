//! Metadata for Mili state variables and element sets

// internal modules
use crate::library::NumType;

/// Where the values of a variable live on the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Centering {
    Node,
    Zone,
}

impl Centering {
    /// Parse the `Center` field of the sidecar, case insensitive
    ///
    /// ```rust
    /// # use mili::metadata::Centering;
    /// assert_eq!(Centering::parse("NODE"), Some(Centering::Node));
    /// assert_eq!(Centering::parse("cell"), Some(Centering::Zone));
    /// assert_eq!(Centering::parse("edge"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "node" | "nodal" | "point" => Some(Self::Node),
            "zone" | "cell" | "element" | "elem" => Some(Self::Zone),
            _ => None,
        }
    }
}

/// Mili aggregate type of a state variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateType {
    Scalar,
    Vector,
    Array,
    VecArray,
}

impl AggregateType {
    pub fn from_id(id: usize) -> Self {
        match id {
            1 => Self::Vector,
            2 => Self::Array,
            3 => Self::VecArray,
            _ => Self::Scalar,
        }
    }
}

/// Shape category of a variable as presented to consumers
///
/// Resolved once from the raw vector size and mesh dimension when metadata is
/// loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableShape {
    Scalar,
    Vector,
    SymmetricTensor,
    Tensor,
    Array,
}

impl VariableShape {
    /// ```rust
    /// # use mili::metadata::VariableShape;
    /// assert_eq!(VariableShape::classify(1, 3), VariableShape::Scalar);
    /// assert_eq!(VariableShape::classify(2, 2), VariableShape::Vector);
    /// assert_eq!(VariableShape::classify(6, 3), VariableShape::SymmetricTensor);
    /// assert_eq!(VariableShape::classify(4, 2), VariableShape::Tensor);
    /// assert_eq!(VariableShape::classify(7, 3), VariableShape::Array);
    /// ```
    pub fn classify(vector_size: usize, dims: usize) -> Self {
        match (vector_size, dims) {
            (1, _) => Self::Scalar,
            (2 | 3, _) => Self::Vector,
            (6, _) => Self::SymmetricTensor,
            (9, _) | (4, 2) => Self::Tensor,
            _ => Self::Array,
        }
    }

    /// Components per value once a vector read has been assembled
    pub fn output_components(&self, vector_size: usize) -> usize {
        match self {
            Self::SymmetricTensor => 9,
            _ => vector_size,
        }
    }
}

/// A named group of components within an element set
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSetGroup {
    pub name: String,
    pub vector_size: usize,
    pub agg_type: AggregateType,
    pub shape: VariableShape,
    /// Indices into the element set's components, fixed at load time
    pub component_idxs: Vec<usize>,
    pub is_shared: bool,
}

/// A state variable as declared on one class
#[derive(Debug, Clone)]
pub struct MiliVariableMetaData {
    pub short_name: String,
    pub long_name: String,
    pub class_name: String,
    pub centering: Centering,
    pub num_type: NumType,
    pub agg_type: AggregateType,
    pub vector_size: usize,
    /// Integration points per component, 1 unless this is an element set
    pub component_dims: usize,
    pub components: Vec<String>,
    pub shape: VariableShape,
    pub is_material: bool,
    pub is_global: bool,
    pub is_shared: bool,
    pub is_sand: bool,
    /// Present only for element sets
    pub groups: Option<Vec<ElementSetGroup>>,
    subrecords: Vec<Vec<usize>>,
}

impl MiliVariableMetaData {
    pub fn new(short_name: &str, class_name: &str, n_domains: usize) -> Self {
        Self {
            short_name: short_name.to_string(),
            long_name: short_name.to_string(),
            class_name: class_name.to_string(),
            centering: Centering::Zone,
            num_type: NumType::Float,
            agg_type: AggregateType::Scalar,
            vector_size: 1,
            component_dims: 1,
            components: Vec::new(),
            shape: VariableShape::Scalar,
            is_material: false,
            is_global: false,
            is_shared: false,
            is_sand: short_name == "sand",
            groups: None,
            subrecords: vec![Vec::new(); n_domains],
        }
    }

    pub fn is_element_set(&self) -> bool {
        self.groups.is_some()
    }

    pub fn groups(&self) -> &[ElementSetGroup] {
        self.groups.as_deref().unwrap_or_default()
    }

    /// Position of a named group within an element set
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.groups().iter().position(|g| g.name == name)
    }

    /// Values stored per element for one read
    pub fn read_size(&self) -> usize {
        self.vector_size * self.component_dims.max(1)
    }

    /// Record that a subrecord carries this variable in a domain
    pub fn add_subrecord(&mut self, dom: usize, id: usize) {
        if let Some(ids) = self.subrecords.get_mut(dom) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    pub fn subrecord_ids(&self, dom: usize) -> &[usize] {
        self.subrecords.get(dom).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subrecords_are_tracked_per_domain_without_duplicates() {
        let mut var = MiliVariableMetaData::new("sx", "brick", 2);
        var.add_subrecord(1, 4);
        var.add_subrecord(1, 4);
        var.add_subrecord(1, 6);
        var.add_subrecord(3, 1);

        assert!(var.subrecord_ids(0).is_empty());
        assert_eq!(var.subrecord_ids(1), &[4, 6]);
        assert!(var.subrecord_ids(3).is_empty());
    }

    #[test]
    fn sand_is_detected_by_name() {
        assert!(MiliVariableMetaData::new("sand", "brick", 1).is_sand);
        assert!(!MiliVariableMetaData::new("sandy", "brick", 1).is_sand);
    }

    #[test]
    fn element_set_read_size_covers_integration_points() {
        let mut var = MiliVariableMetaData::new("es_1a", "shell", 1);
        var.vector_size = 3;
        var.component_dims = 5;
        assert_eq!(var.read_size(), 15);
        assert!(!var.is_element_set());
        assert_eq!(var.group_index("eps"), None);
    }
}
