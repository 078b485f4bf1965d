// internal modules
use crate::error::{MiliError, Result};
use crate::format::MiliFileFormat;
use crate::library::LabelInfo;
use crate::mesh::ElementLabelArray;
use crate::metadata::{ClassLabels, MiliClassMetaData};

// external crates
use log::trace;

/// Label pseudo-variable holding the simulation label of every zone
pub const ORIGINAL_ZONE_LABELS: &str = "OriginalZoneLabels";

/// Label pseudo-variable holding the simulation label of every node
pub const ORIGINAL_NODE_LABELS: &str = "OriginalNodeLabels";

/// Label arrays
impl MiliFileFormat {
    /// Text labels of every zone (or node) of a mesh in a domain
    ///
    /// Rows are as wide as the longest label plus a NUL terminator. The labels
    /// of every class are registered on the array so that a label can be
    /// turned back into an element index.
    pub fn generate_label_array(
        &mut self,
        dom: usize,
        mesh_id: usize,
        zones: bool,
    ) -> Result<ElementLabelArray> {
        self.read_mesh(dom)?;
        let md = self
            .meshes
            .get(mesh_id)
            .ok_or_else(|| MiliError::invalid_variable(mesh_id.to_string(), "no such mesh"))?;

        let (name, n_tuples) = match zones {
            true => (ORIGINAL_ZONE_LABELS, md.num_cells(dom)),
            false => (ORIGINAL_NODE_LABELS, md.num_nodes(dom)),
        };

        let mut classes: Vec<&MiliClassMetaData> = md
            .classes()
            .iter()
            .filter(|c| match zones {
                true => c.is_cell(),
                false => c.is_node(),
            })
            .filter(|c| c.num_elements(dom) > 0)
            .collect();
        classes.sort_by_key(|c| c.connectivity_offset(dom));

        // (class, first row, labels) for every class, numbered from 1 if absent
        let rows: Vec<(&MiliClassMetaData, usize, ClassLabels)> = classes
            .into_iter()
            .map(|c| {
                let labels = c
                    .labels(dom)
                    .cloned()
                    .unwrap_or_else(|| ClassLabels::new(LabelInfo::sequential(c.num_elements(dom))));
                let offset = match zones {
                    true => c.connectivity_offset(dom),
                    false => 0,
                };
                (c, offset, labels)
            })
            .collect();

        let width = rows
            .iter()
            .flat_map(|(c, _, labels)| labels.labels.iter().map(|l| c.label_text(*l).len()))
            .max()
            .unwrap_or(0)
            + 1;

        let mut array = ElementLabelArray::new(name, n_tuples, width);
        for (class, offset, labels) in rows {
            for (i, label) in labels.labels.iter().enumerate() {
                array.set_label(offset + i, &class.label_text(*label));
            }
            trace!("{} labels of {} from row {offset}", labels.labels.len(), class.short_name());
            array.add_class_labels(class.short_name(), offset, labels);
        }

        Ok(array)
    }
}
