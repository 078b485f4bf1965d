//! Metadata for a class of mesh objects

// internal modules
use crate::library::{LabelInfo, Superclass};
use crate::utils::f;

/// A named group of mesh objects, e.g. the node class or a group of bricks
///
/// Element counts, connectivity offsets and labels are filled in per domain
/// while the mesh of that domain is read.
#[derive(Debug, Clone)]
pub struct MiliClassMetaData {
    short_name: String,
    long_name: String,
    superclass: Superclass,
    /// Element count declared by the sidecar, across all domains
    declared_count: usize,
    n_elements: Vec<usize>,
    conn_offsets: Vec<usize>,
    labels: Vec<Option<ClassLabels>>,
}

impl MiliClassMetaData {
    pub fn new(
        short_name: &str,
        long_name: &str,
        superclass: Superclass,
        declared_count: usize,
        n_domains: usize,
    ) -> Self {
        Self {
            short_name: short_name.to_string(),
            long_name: long_name.to_string(),
            superclass,
            declared_count,
            n_elements: vec![0; n_domains],
            conn_offsets: vec![0; n_domains],
            labels: vec![None; n_domains],
        }
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn superclass(&self) -> Superclass {
        self.superclass
    }

    pub fn declared_count(&self) -> usize {
        self.declared_count
    }

    /// Variables of the `mat` class hold one value per material
    pub fn is_material(&self) -> bool {
        self.short_name == "mat"
    }

    /// Variables of the `glob` class hold a single value for the whole mesh
    pub fn is_global(&self) -> bool {
        self.short_name == "glob"
    }

    pub fn is_node(&self) -> bool {
        self.superclass == Superclass::Node
    }

    pub fn is_cell(&self) -> bool {
        self.superclass.is_cell()
    }

    pub fn num_elements(&self, dom: usize) -> usize {
        self.n_elements.get(dom).copied().unwrap_or(0)
    }

    pub fn set_num_elements(&mut self, dom: usize, count: usize) {
        if let Some(n) = self.n_elements.get_mut(dom) {
            *n = count;
        }
    }

    /// Index of the first element of this class within the whole-mesh cells
    pub fn connectivity_offset(&self, dom: usize) -> usize {
        self.conn_offsets.get(dom).copied().unwrap_or(0)
    }

    pub fn set_connectivity_offset(&mut self, dom: usize, offset: usize) {
        if let Some(o) = self.conn_offsets.get_mut(dom) {
            *o = offset;
        }
    }

    /// Store the labels loaded for a domain
    pub fn populate_labels(&mut self, dom: usize, info: LabelInfo) {
        if let Some(labels) = self.labels.get_mut(dom) {
            *labels = Some(ClassLabels::new(info));
        }
    }

    pub fn labels(&self, dom: usize) -> Option<&ClassLabels> {
        self.labels.get(dom).and_then(|l| l.as_ref())
    }

    /// Display text for a label of this class
    ///
    /// Zone labels carry the class name since labels repeat between classes.
    pub fn label_text(&self, label: i32) -> String {
        match self.is_node() {
            true => f!("{label}"),
            false => f!("{} {label}", self.short_name),
        }
    }
}

/// Labels of a class in one domain, with a reverse index
///
/// Every block is an inclusive range of contiguous labels. `block_starts`
/// holds the element index of the first label of each block, which is enough
/// to map any label back to its element without a full table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabels {
    pub labels: Vec<i32>,
    pub blocks: Vec<(i32, i32)>,
    pub block_starts: Vec<usize>,
}

impl ClassLabels {
    pub fn new(info: LabelInfo) -> Self {
        let mut next = 0;
        let block_starts = info
            .blocks
            .iter()
            .map(|(lo, hi)| {
                let start = next;
                next += (hi - lo + 1).max(0) as usize;
                start
            })
            .collect();

        Self {
            labels: info.labels,
            blocks: info.blocks,
            block_starts,
        }
    }

    /// Element index (within the class) carrying `label`
    ///
    /// ```rust
    /// # use mili::library::LabelInfo;
    /// # use mili::metadata::ClassLabels;
    /// let labels = ClassLabels::new(LabelInfo {
    ///     labels: vec![10, 11, 12, 40, 41],
    ///     blocks: vec![(10, 12), (40, 41)],
    /// });
    /// assert_eq!(labels.element_id(41), Some(4));
    /// assert_eq!(labels.element_id(13), None);
    /// ```
    pub fn element_id(&self, label: i32) -> Option<usize> {
        self.blocks
            .iter()
            .zip(&self.block_starts)
            .find(|((lo, hi), _)| (*lo..=*hi).contains(&label))
            .map(|((lo, _), start)| start + (label - lo) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_domain_values_are_independent() {
        let mut class = MiliClassMetaData::new("brick", "Bricks", Superclass::Hex, 10, 2);
        class.set_num_elements(1, 4);
        class.set_connectivity_offset(1, 7);
        class.set_num_elements(5, 99);

        assert_eq!(class.num_elements(0), 0);
        assert_eq!(class.num_elements(1), 4);
        assert_eq!(class.connectivity_offset(1), 7);
        assert_eq!(class.num_elements(5), 0);
    }

    #[test]
    fn label_text_depends_on_superclass() {
        let node = MiliClassMetaData::new("node", "Nodes", Superclass::Node, 1, 1);
        let brick = MiliClassMetaData::new("brick", "Bricks", Superclass::Hex, 1, 1);
        assert_eq!(node.label_text(12), "12");
        assert_eq!(brick.label_text(12), "brick 12");
    }

    #[test]
    fn reverse_index_follows_block_order() {
        let labels = ClassLabels::new(LabelInfo {
            labels: vec![5, 6, 100],
            blocks: vec![(5, 6), (100, 100)],
        });
        assert_eq!(labels.block_starts, vec![0, 2]);
        assert_eq!(labels.element_id(5), Some(0));
        assert_eq!(labels.element_id(100), Some(2));
    }
}
