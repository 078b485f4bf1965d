//! Bookkeeping for variables declared on more than one class

/// Every variable entry sharing one short name
///
/// Element set groups take part under their group name, so a group and a
/// plain variable of the same name share one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedVariableInfo {
    pub short_name: String,
    /// Indices into the mesh variable list, in declaration order
    pub variable_indices: Vec<usize>,
    /// Set once the variable has been published by a metadata pass
    pub is_added: bool,
    /// True when every sharer is an element set
    pub is_all_element_sets: bool,
}

impl SharedVariableInfo {
    pub fn new(short_name: &str) -> Self {
        Self {
            short_name: short_name.to_string(),
            variable_indices: Vec::new(),
            is_added: false,
            is_all_element_sets: true,
        }
    }

    /// Register another sharer
    pub fn push(&mut self, index: usize, is_element_set: bool) {
        if !self.variable_indices.contains(&index) {
            self.variable_indices.push(index);
            self.is_all_element_sets &= is_element_set;
        }
    }
}
