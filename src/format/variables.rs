// internal modules
use crate::error::{MiliError, Result};
use crate::format::labels::{ORIGINAL_NODE_LABELS, ORIGINAL_ZONE_LABELS};
use crate::format::MiliFileFormat;
use crate::library::MiliDatabase;
use crate::mesh::{FloatArray, Material, VarArray};
use crate::metadata::{Centering, MeshMetaData, MiliVariableMetaData, VariableTarget};
use crate::utils::f;

// external crates
use log::{trace, warn};

/// Source component of each value of an expanded symmetric tensor
///
/// Symmetric tensors are stored as `XX, YY, ZZ, XY, YZ, ZX`.
const SYMMETRIC_TENSOR_MAP: [usize; 9] = [0, 3, 5, 3, 1, 4, 5, 4, 2];

/// Variable queries
impl MiliFileFormat {
    /// Values of a variable for a domain at a timestep
    ///
    /// The label pseudo-variables `OriginalZoneLabels` and
    /// `OriginalNodeLabels` return the simulation labels of every element.
    /// Anything else resolves through the metadata to a plain, shared or
    /// element set variable and returns one tuple per node or cell, with NaN
    /// wherever the variable has no data.
    pub fn get_var(&mut self, timestep: usize, dom: usize, path: &str) -> Result<VarArray> {
        let mesh_id = self.mesh_id_from_path(path)?;

        match path.rsplit('/').next() {
            Some(ORIGINAL_ZONE_LABELS) => {
                return Ok(VarArray::Labels(self.generate_label_array(dom, mesh_id, true)?))
            }
            Some(ORIGINAL_NODE_LABELS) => {
                return Ok(VarArray::Labels(self.generate_label_array(dom, mesh_id, false)?))
            }
            _ => (),
        }

        Ok(VarArray::Float(self.read_variable(timestep, dom, mesh_id, path)?))
    }

    /// Vector or tensor values of a variable for a domain at a timestep
    ///
    /// Symmetric tensors are expanded to all nine components.
    pub fn get_vector_var(&mut self, timestep: usize, dom: usize, path: &str) -> Result<FloatArray> {
        let mesh_id = self.mesh_id_from_path(path)?;
        let mut array = self.read_variable(timestep, dom, mesh_id, path)?;

        if array.num_components == 6 {
            trace!("Expanding symmetric tensor {path}");
            array.values = expand_symmetric_tensor(&array.values);
            array.num_components = 9;
        }
        Ok(array)
    }

    /// Whether a variable path holds node or zone values
    pub fn variable_centering(&self, path: &str) -> Option<Centering> {
        let mesh_id = self.mesh_id_from_path(path).ok()?;
        let md = &self.meshes[mesh_id];
        md.layout(&md.resolve(path)?).map(|layout| layout.centering)
    }

    fn read_variable(
        &mut self,
        timestep: usize,
        dom: usize,
        mesh_id: usize,
        path: &str,
    ) -> Result<FloatArray> {
        self.read_mesh(dom)?;

        let md = &self.meshes[mesh_id];
        let target = md
            .resolve(path)
            .ok_or_else(|| MiliError::invalid_variable(path, "no such variable"))?;
        let layout = md
            .layout(&target)
            .ok_or_else(|| MiliError::invalid_variable(path, "no variable metadata"))?;

        let n_tuples = md.num_elements(dom, layout.centering);
        let mut array = FloatArray::nan(path, n_tuples, layout.vector_size);
        trace!("{path} -> {target:?}, {n_tuples} x {}", layout.vector_size);

        let reader = VariableReader::new(
            self.db(dom)?,
            md,
            dom,
            timestep,
            self.materials[dom][mesh_id].as_ref(),
        );
        reader.read(&target, &mut array.values)?;
        Ok(array)
    }
}

/// Expand `XX, YY, ZZ, XY, YZ, ZX` tuples into full 3x3 tensors
///
/// ```rust
/// # use mili::format::expand_symmetric_tensor;
/// let full = expand_symmetric_tensor(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// assert_eq!(full, vec![1.0, 4.0, 6.0, 4.0, 2.0, 5.0, 6.0, 5.0, 3.0]);
/// ```
pub fn expand_symmetric_tensor(values: &[f32]) -> Vec<f32> {
    values
        .chunks_exact(6)
        .flat_map(|tuple| SYMMETRIC_TENSOR_MAP.map(|i| tuple[i]))
        .collect()
}

/// Reads variables of one mesh of a domain at one state
pub(crate) struct VariableReader<'a> {
    db: &'a dyn MiliDatabase,
    md: &'a MeshMetaData,
    dom: usize,
    /// 1-based state number
    state: usize,
    material: Option<&'a Material>,
}

impl<'a> VariableReader<'a> {
    pub fn new(
        db: &'a dyn MiliDatabase,
        md: &'a MeshMetaData,
        dom: usize,
        timestep: usize,
        material: Option<&'a Material>,
    ) -> Self {
        Self {
            db,
            md,
            dom,
            state: timestep + 1,
            material,
        }
    }

    pub fn metadata(&self) -> &'a MeshMetaData {
        self.md
    }

    /// Read a resolved target into `out`, which is prefilled by the caller
    pub fn read(&self, target: &VariableTarget, out: &mut [f32]) -> Result<()> {
        match target {
            VariableTarget::Plain(index) => self.read_plain(*index, out),
            VariableTarget::Group { index, group } => self.read_element_set(*index, *group, out),
            VariableTarget::Shared(name) => self.read_shared(name, out),
        }
    }

    /// Merge every class sharing `name` into one array
    fn read_shared(&self, name: &str, out: &mut [f32]) -> Result<()> {
        let Some(info) = self.md.shared_info(name) else {
            warn!("No shared variable info for {name}, nothing read");
            return Ok(());
        };

        for index in &info.variable_indices {
            let var = self.md.variable(*index);
            match var.group_index(name) {
                Some(group) if var.is_element_set() => self.read_element_set(*index, group, out)?,
                _ => self.read_plain(*index, out)?,
            }
        }
        Ok(())
    }

    /// Read a variable of a single class
    pub fn read_plain(&self, index: usize, out: &mut [f32]) -> Result<()> {
        let var = self.md.variable(index);
        let ids = var.subrecord_ids(self.dom);
        let vs = var.vector_size;

        if var.centering == Centering::Node {
            return match ids {
                [] => {
                    warn!("{} has no subrecord in domain {}", var.short_name, self.dom);
                    Ok(())
                }
                [id] => self.read_to_buffer(var, *id, out, 0, vs),
                _ => Err(MiliError::invalid_variable(
                    &var.short_name,
                    "node centred variable spans several subrecords",
                )),
            };
        }

        if var.is_material {
            return self.read_material(var, out);
        }

        if var.is_global {
            let mut value = vec![f32::NAN; vs];
            for id in ids {
                self.read_to_buffer(var, *id, &mut value, 0, vs)?;
            }
            if value.iter().any(|v| v.is_nan()) {
                return Ok(());
            }
            for tuple in out.chunks_exact_mut(vs) {
                tuple.copy_from_slice(&value);
            }
            return Ok(());
        }

        let offset = self.class_offset(var);
        for id in ids {
            self.read_to_buffer(var, *id, out, offset, vs)?;
        }
        Ok(())
    }

    /// Scatter per-material values to the cells of each material
    fn read_material(&self, var: &MiliVariableMetaData, out: &mut [f32]) -> Result<()> {
        let Some(material) = self.material else {
            warn!("No material assignment for {}", var.short_name);
            return Ok(());
        };

        let vs = var.vector_size;
        let n_materials = self
            .md
            .class(&var.class_name)
            .map(|c| c.declared_count())
            .unwrap_or(0)
            .max(material.n_materials());
        let mut values = vec![f32::NAN; n_materials * vs];
        for id in var.subrecord_ids(self.dom) {
            self.read_to_buffer(var, *id, &mut values, 0, vs)?;
        }

        for (cell, mat) in material.mat_list.iter().enumerate() {
            let Ok(mat) = usize::try_from(*mat) else {
                continue;
            };
            let Some(value) = values.get(mat * vs..(mat + 1) * vs) else {
                continue;
            };
            if value.iter().any(|v| v.is_nan()) {
                continue;
            }
            if let Some(dest) = out.get_mut(cell * vs..(cell + 1) * vs) {
                dest.copy_from_slice(value);
            }
        }
        Ok(())
    }

    /// Read one integration point of an element set group
    ///
    /// Only the middle integration point is extracted. A cell is written only
    /// if every component of the group has data.
    fn read_element_set(&self, index: usize, group: usize, out: &mut [f32]) -> Result<()> {
        let var = self.md.variable(index);
        if var.centering == Centering::Node {
            warn!("Node centred element set {} is not supported", var.short_name);
            return Ok(());
        }

        let group = var
            .groups()
            .get(group)
            .ok_or_else(|| MiliError::invalid_variable(&var.short_name, "no such group"))?;

        let stride = var.read_size();
        let n_cells = self.md.num_cells(self.dom);
        let offset = self.class_offset(var);
        let mut scratch = vec![f32::NAN; n_cells * stride];
        for id in var.subrecord_ids(self.dom) {
            self.read_to_buffer(var, *id, &mut scratch, offset, stride)?;
        }

        let ip = var.component_dims / 2;
        let gvs = group.vector_size;
        for (cell, data) in scratch.chunks_exact(stride).enumerate() {
            let values: Vec<f32> = group
                .component_idxs
                .iter()
                .map(|comp| {
                    data.get(ip * var.vector_size + comp)
                        .copied()
                        .unwrap_or(f32::NAN)
                })
                .collect();

            if values.iter().any(|v| v.is_nan()) {
                continue;
            }
            if let Some(dest) = out.get_mut(cell * gvs..(cell + 1) * gvs) {
                dest.iter_mut().zip(&values).for_each(|(d, v)| *d = *v);
            }
        }
        Ok(())
    }

    /// Copy one subrecord of a variable into `dest`
    ///
    /// Object `n` of the subrecord class lands at tuple `n - 1 + offset`.
    /// Subrecords made of several blocks are read into scratch space first and
    /// scattered block by block.
    fn read_to_buffer(
        &self,
        var: &MiliVariableMetaData,
        id: usize,
        dest: &mut [f32],
        offset: usize,
        stride: usize,
    ) -> Result<()> {
        let entry = self
            .md
            .subrecord_table(self.dom)
            .and_then(|table| table.get(id))
            .ok_or_else(|| MiliError::invalid_variable(&var.short_name, f!("unknown subrecord {id}")))?;

        let blocks = match entry.blocks.is_empty() {
            true => vec![(1, entry.qty_objects)],
            false => entry.blocks.clone(),
        };

        let out_of_range = || {
            MiliError::invalid_variable(
                &var.short_name,
                f!("subrecord {id} does not fit the output array"),
            )
        };

        if let [(lo, hi)] = blocks.as_slice() {
            let start = (lo.saturating_sub(1) + offset) * stride;
            let end = start + (hi + 1).saturating_sub(*lo) * stride;
            let slice = dest.get_mut(start..end).ok_or_else(out_of_range)?;
            return self.read_results(var, id, slice);
        }

        let mut scratch = vec![f32::NAN; entry.block_length() * stride];
        self.read_results(var, id, &mut scratch)?;

        let mut tuples = scratch.chunks_exact(stride);
        for (lo, hi) in blocks {
            for object in lo..=hi {
                let start = (object.saturating_sub(1) + offset) * stride;
                let slot = dest.get_mut(start..start + stride).ok_or_else(out_of_range)?;
                if let Some(tuple) = tuples.next() {
                    slot.copy_from_slice(tuple);
                }
            }
        }
        Ok(())
    }

    /// Read raw results and cast them into `dest`
    fn read_results(&self, var: &MiliVariableMetaData, id: usize, dest: &mut [f32]) -> Result<()> {
        let buffer = self
            .db
            .read_results(self.state, id, &var.short_name)
            .map_err(|e| MiliError::invalid_variable(&var.short_name, e.to_string()))?;

        if !buffer.matches(var.num_type) {
            return Err(MiliError::invalid_variable(
                &var.short_name,
                f!("results do not match numeric type {:?}", var.num_type),
            ));
        }
        if buffer.len() < dest.len() {
            return Err(MiliError::invalid_variable(
                &var.short_name,
                f!("{} values read, {} expected", buffer.len(), dest.len()),
            ));
        }

        buffer.copy_into(dest);
        Ok(())
    }

    /// First cell of the class a variable is declared on
    fn class_offset(&self, var: &MiliVariableMetaData) -> usize {
        self.md
            .class(&var.class_name)
            .map(|c| c.connectivity_offset(self.dom))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tuple_is_expanded() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
        let full = expand_symmetric_tensor(&values);
        assert_eq!(full.len(), 18);
        assert_eq!(&full[9..], &[10.0, 40.0, 60.0, 40.0, 20.0, 50.0, 60.0, 50.0, 30.0]);
    }
}
