// internal modules
use crate::error::{MiliError, Result};
use crate::format::variables::VariableReader;
use crate::format::MiliFileFormat;
use crate::library::{LabelInfo, MiliDatabase, Superclass};
use crate::mesh::ghost::*;
use crate::mesh::{ArrayData, Cell, CellType, DataArray, Material, UnstructuredMesh};
use crate::metadata::{Centering, MeshMetaData, SubrecordTable, VariableTarget};
use crate::utils::f;

// external crates
use log::{debug, trace, warn};

/// Node centred vector holding the current node positions
const NODE_POSITIONS: &str = "nodpos";

/// A cell class found while walking the superclasses of a mesh
struct CellClass {
    superclass: Superclass,
    short_name: String,
    count: usize,
}

/// Mesh reading
impl MiliFileFormat {
    /// Read the meshes of a domain, doing nothing if already read
    pub fn read_mesh(&mut self, dom: usize) -> Result<()> {
        self.check_domain(dom)?;
        if self.mesh_read[dom] {
            return Ok(());
        }

        self.open_db(dom)?;
        let db = self
            .dbs
            .get(dom)
            .and_then(|db| db.as_deref())
            .ok_or_else(|| MiliError::ImproperUse(f!("domain {dom} has not been opened")))?;

        for (mesh_id, md) in self.meshes.iter_mut().enumerate() {
            debug!("Reading mesh {} of domain {dom}", mesh_id + 1);
            let (mesh, material) = read_domain_mesh(db, md, dom, self.dims)?;
            populate_subrecord_info(db, md, dom)?;
            self.datasets[dom][mesh_id] = Some(mesh);
            self.materials[dom][mesh_id] = Some(material);
        }

        self.mesh_read[dom] = true;
        Ok(())
    }

    /// Mesh of a domain at a timestep
    ///
    /// `mesh_name` is `meshN` or, for sanded meshes, `sand_meshN`. Node
    /// positions are updated for the timestep when the family records them.
    /// The default mesh of a sanded family carries ghost arrays flagging the
    /// destroyed elements, the `sand_mesh` variant never does.
    pub fn get_mesh(
        &mut self,
        timestep: usize,
        dom: usize,
        mesh_name: &str,
    ) -> Result<UnstructuredMesh> {
        let mesh_id = self.mesh_id_from_path(mesh_name)?;
        let is_sand_variant = mesh_name.starts_with("sand_mesh");
        self.read_mesh(dom)?;

        let mut mesh = self.datasets[dom][mesh_id]
            .clone()
            .ok_or_else(|| MiliError::invalid_variable(mesh_name, "mesh was not read"))?;

        let reader = VariableReader::new(
            self.db(dom)?,
            &self.meshes[mesh_id],
            dom,
            timestep,
            self.materials[dom][mesh_id].as_ref(),
        );

        update_node_positions(&reader, &mut mesh, self.dims)?;

        if reader.metadata().contains_sand() && !is_sand_variant {
            debug!("Ghosting sand of {mesh_name}, state {}", timestep + 1);
            apply_sand_ghosting(&reader, &mut mesh)?;
        }

        Ok(mesh)
    }
}

/// Read the baseline mesh and material assignment of one mesh of a domain
fn read_domain_mesh(
    db: &dyn MiliDatabase,
    md: &mut MeshMetaData,
    dom: usize,
    dims: usize,
) -> Result<(UnstructuredMesh, Material)> {
    let mesh_id = md.mesh_id();
    let mesh_name = md.mesh_name();

    // nodes
    let node_info = db
        .class_info(mesh_id, Superclass::Node, 0)
        .map_err(|e| MiliError::invalid_variable(&mesh_name, f!("no node class: {e}")))?;
    let n_nodes = node_info.count;
    md.set_num_nodes(dom, n_nodes);
    trace!("{n_nodes} nodes in class {}", node_info.short_name);

    let node_labels = db
        .load_node_labels(mesh_id, &node_info.short_name)
        .unwrap_or_else(|e| {
            warn!("Node labels of {} unavailable ({e}), numbering from 1", node_info.short_name);
            LabelInfo::sequential(n_nodes)
        });
    if let Some(class) = md.class_mut(&node_info.short_name) {
        class.set_num_elements(dom, n_nodes);
        class.populate_labels(dom, node_labels);
    }

    // cell classes with cumulative offsets
    let mut cell_classes = Vec::new();
    let mut offset = 0;
    for superclass in Superclass::CELL_TYPES {
        let n_classes = db
            .class_count(mesh_id, superclass)
            .map_err(|e| MiliError::invalid_variable(&mesh_name, e.to_string()))?;

        for index in 0..n_classes {
            let info = db
                .class_info(mesh_id, superclass, index)
                .map_err(|e| MiliError::invalid_variable(&mesh_name, e.to_string()))?;

            match md.class_mut(&info.short_name) {
                Some(class) => {
                    class.set_num_elements(dom, info.count);
                    class.set_connectivity_offset(dom, offset);
                }
                None => warn!("Class {} is not described by the sidecar", info.short_name),
            }

            trace!("{superclass:?} class {} at offset {offset}", info.short_name);
            offset += info.count;
            cell_classes.push(CellClass {
                superclass,
                short_name: info.short_name,
                count: info.count,
            });
        }
    }
    md.set_num_cells(dom, offset);

    // connectivity and materials
    let mut mesh = UnstructuredMesh::new();
    mesh.cells.reserve(offset);
    let mut mat_list = Vec::with_capacity(offset);

    for class in &cell_classes {
        let conn = db
            .load_conns(mesh_id, &class.short_name)
            .map_err(|e| MiliError::invalid_variable(&class.short_name, e.to_string()))?;
        let width = class.superclass.conn_count().unwrap_or(1);

        if conn.conns.len() < class.count * width {
            return Err(MiliError::invalid_variable(
                &class.short_name,
                f!("{} connectivity entries for {} elements", conn.conns.len(), class.count),
            ));
        }

        for (i, nodes) in conn.conns.chunks(width).take(class.count).enumerate() {
            mesh.cells.push(cell_from_conns(class.superclass, nodes, n_nodes)?);
            mat_list.push(conn.mats.get(i).map(|m| m - 1).unwrap_or(-1));
        }
    }

    // zone labels
    for class in &cell_classes {
        let labels = db
            .load_conn_labels(mesh_id, &class.short_name)
            .unwrap_or_else(|e| {
                warn!("Labels of {} unavailable ({e}), numbering from 1", class.short_name);
                LabelInfo::sequential(class.count)
            });
        if let Some(c) = md.class_mut(&class.short_name) {
            c.populate_labels(dom, labels);
        }
    }

    // initial node positions
    let positions = db
        .load_nodes(mesh_id, &node_info.short_name)
        .map_err(|e| MiliError::invalid_variable(&node_info.short_name, e.to_string()))?;
    mesh.points = node_positions_3d(positions, n_nodes, dims)?;

    let names = md.materials().iter().map(|m| m.name.clone()).collect();
    debug!(
        "Domain {dom}, {mesh_name}: {n_nodes} nodes, {} cells in {} classes",
        mesh.n_cells(),
        cell_classes.len()
    );

    Ok((mesh, Material::new(names, mat_list)))
}

/// Output cell for the connectivity of one element
///
/// Degenerate hexes are collapsed: all nodes equal gives a single point, and
/// pairwise collapsed top nodes give a tetrahedron. Beams drop the point that
/// only defines their orientation.
pub(crate) fn cell_from_conns(superclass: Superclass, conns: &[i32], n_nodes: usize) -> Result<Cell> {
    let nodes = conns
        .iter()
        .map(|&n| match usize::try_from(n) {
            Ok(n) if n < n_nodes => Ok(n),
            _ => Err(MiliError::invalid_variable(
                f!("{superclass:?}"),
                f!("node index {n} out of range"),
            )),
        })
        .collect::<Result<Vec<usize>>>()?;

    let cell = match superclass {
        Superclass::Hex if nodes.iter().all(|n| *n == nodes[0]) => {
            Cell::new(CellType::Vertex, vec![nodes[0]])
        }
        Superclass::Hex if nodes[2] == nodes[3] && nodes[4..].iter().all(|n| *n == nodes[4]) => {
            Cell::new(CellType::Tetra, vec![nodes[0], nodes[1], nodes[2], nodes[4]])
        }
        Superclass::Hex => Cell::new(CellType::Hexahedron, nodes),
        Superclass::Truss => Cell::new(CellType::Line, nodes),
        Superclass::Beam => Cell::new(CellType::Line, nodes[..2].to_vec()),
        Superclass::Tri => Cell::new(CellType::Triangle, nodes),
        Superclass::Quad => Cell::new(CellType::Quad, nodes),
        Superclass::Tet => Cell::new(CellType::Tetra, nodes),
        Superclass::Pyramid => Cell::new(CellType::Pyramid, nodes),
        Superclass::Wedge => Cell::new(CellType::Wedge, nodes),
        Superclass::Particle => Cell::new(CellType::Vertex, nodes),
        other => {
            return Err(MiliError::invalid_variable(
                f!("{other:?}"),
                "not a cell superclass",
            ))
        }
    };
    Ok(cell)
}

/// Pack node coordinates as 3D points
///
/// Two dimensional coordinates are spread in place from the back so that no
/// value is overwritten before it is moved.
pub(crate) fn node_positions_3d(mut positions: Vec<f32>, n_nodes: usize, dims: usize) -> Result<Vec<f32>> {
    if positions.len() < n_nodes * dims || !(2..=3).contains(&dims) {
        return Err(MiliError::ImproperUse(f!(
            "{} coordinates for {n_nodes} nodes in {dims}D",
            positions.len()
        )));
    }

    if dims == 2 {
        positions.resize(n_nodes * 3, 0.0);
        for i in (0..n_nodes).rev() {
            positions[3 * i + 2] = 0.0;
            positions[3 * i + 1] = positions[2 * i + 1];
            positions[3 * i] = positions[2 * i];
        }
    }

    positions.truncate(n_nodes * 3);
    Ok(positions)
}

/// Build the subrecord table of a domain and attach subrecords to variables
fn populate_subrecord_info(db: &dyn MiliDatabase, md: &mut MeshMetaData, dom: usize) -> Result<()> {
    let n_subrecords = db
        .subrecord_count()
        .map_err(|e| MiliError::ImproperUse(f!("could not query subrecords: {e}")))?;

    let mut table = SubrecordTable::default();
    for id in 0..n_subrecords {
        let subrecord = db
            .subrecord(id)
            .map_err(|e| MiliError::ImproperUse(f!("could not read subrecord {id}: {e}")))?;

        for svar in &subrecord.svar_names {
            match md.variable_index(&subrecord.class_name, svar) {
                Some(index) => md.variable_mut(index).add_subrecord(dom, id),
                None => trace!("{svar} of subrecord {} has no metadata", subrecord.name),
            }
        }

        table.insert(id, (&subrecord).into());
    }

    trace!("Domain {dom}: {} subrecords", table.len());
    md.set_subrecord_table(dom, table);
    Ok(())
}

/// Overwrite the baseline node positions with those of the timestep
fn update_node_positions(reader: &VariableReader, mesh: &mut UnstructuredMesh, dims: usize) -> Result<()> {
    let md = reader.metadata();
    let Some(node_class) = md.node_class() else {
        return Ok(());
    };
    let Some(index) = md.variable_index(node_class.short_name(), NODE_POSITIONS) else {
        return Ok(());
    };

    let var = md.variable(index);
    if var.centering != Centering::Node || var.vector_size != dims {
        debug!("{NODE_POSITIONS} is not a {dims}D nodal vector, keeping initial positions");
        return Ok(());
    }

    let n_nodes = mesh.n_points();
    let mut values = vec![f32::NAN; n_nodes * dims];
    reader.read(&VariableTarget::Plain(index), &mut values)?;

    for (point, new) in mesh.points.chunks_mut(3).zip(values.chunks(dims)) {
        for (p, v) in point.iter_mut().zip(new) {
            if !v.is_nan() {
                *p = *v;
            }
        }
    }
    Ok(())
}

/// Attach ghost arrays for the zones destroyed at the reader's state
///
/// Every zone centred sand variable overwrites the status of the zones it
/// covers, so the last one declared wins.
fn apply_sand_ghosting(reader: &VariableReader, mesh: &mut UnstructuredMesh) -> Result<()> {
    let md = reader.metadata();
    let mut status = vec![1.0_f32; mesh.n_cells()];

    for (index, var) in md.variables().iter().enumerate() {
        if var.is_sand && var.centering == Centering::Zone && !var.is_element_set() {
            reader.read_plain(index, &mut status)?;
        }
    }

    let zones: Vec<u8> = status
        .iter()
        .map(|s| match *s <= 0.5 {
            true => ZONE_NOT_APPLICABLE_TO_PROBLEM,
            false => 0,
        })
        .collect();

    let mut nodes = vec![NODE_NOT_APPLICABLE_TO_PROBLEM; mesh.n_points()];
    for (cell, flag) in mesh.cells.iter().zip(&zones) {
        if *flag == 0 {
            for n in &cell.nodes {
                nodes[*n] &= !NODE_NOT_APPLICABLE_TO_PROBLEM;
            }
        }
    }

    debug!(
        "{} of {} zones ghosted",
        zones.iter().filter(|z| **z != 0).count(),
        zones.len()
    );

    mesh.set_point_array(DataArray {
        name: GHOST_NODES.to_string(),
        num_components: 1,
        data: ArrayData::UnsignedChar(nodes),
    });
    mesh.set_cell_array(DataArray {
        name: GHOST_ZONES.to_string(),
        num_components: 1,
        data: ArrayData::UnsignedChar(zones),
    });
    Ok(())
}
