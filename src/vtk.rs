//! Conversion of Mili meshes and variables to VTK formats
//!
//! # Overview
//!
//! A [MiliToVtk] converter pulls one mesh of one domain at one timestep out of
//! a [MiliFileFormat], attaches the requested variables and returns a `vtkio`
//! [Vtk] object ready to be written with [write_vtk].
//!
//! ```ignore
//! let converter = MiliToVtkBuilder::new()
//!     .variables(vec!["Primal/Shared/sx".to_string()])
//!     .include_materials(true)
//!     .build();
//!
//! let vtk = converter.convert(&mut format, 0, 0, "mesh1")?;
//! write_vtk(vtk, "d3samp6_0.vtu", VtkFormat::Xml)?;
//! ```
//!
//! Ghost arrays attached to sanded meshes are written as `avtGhostNodes` and
//! `avtGhostZones` so that VisIt recognises them.

// internal modules
use crate::format::{MiliFileFormat, AUXILIARY_DATA_MATERIAL};
use crate::mesh::{ArrayData, DataArray as MeshArray, FloatArray, UnstructuredMesh};
use crate::metadata::Centering;
use crate::readers::parsers;
use crate::utils::f;

// standard library
use std::path::Path;

// external crates
use anyhow::{anyhow, Result};
use clap::ValueEnum;
use log::{debug, trace, warn};
use vtkio::model::*;

/// Supported VTK output formats
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum VtkFormat {
    /// XML unstructured grid (`.vtu`)
    Xml,
    /// Legacy ascii (`.vtk`)
    LegacyAscii,
    /// Legacy binary (`.vtk`)
    LegacyBinary,
}

impl VtkFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xml => "vtu",
            _ => "vtk",
        }
    }
}

/// Builder for the [MiliToVtk] converter
#[derive(Debug, Clone)]
pub struct MiliToVtkBuilder {
    variables: Vec<String>,
    include_materials: bool,
    byte_order: ByteOrder,
}

impl Default for MiliToVtkBuilder {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            include_materials: false,
            byte_order: ByteOrder::BigEndian,
        }
    }
}

impl MiliToVtkBuilder {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Variable paths to attach as point or cell data
    pub fn variables(mut self, variables: Vec<String>) -> Self {
        self.variables = variables;
        self
    }

    /// Attach the material number of every cell
    pub fn include_materials(mut self, include: bool) -> Self {
        self.include_materials = include;
        self
    }

    /// Byte ordering of binary output
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn build(self) -> MiliToVtk {
        MiliToVtk {
            variables: self.variables,
            include_materials: self.include_materials,
            byte_order: self.byte_order,
        }
    }
}

/// Converts Mili meshes to `vtkio` unstructured grids
#[derive(Debug, Clone)]
pub struct MiliToVtk {
    variables: Vec<String>,
    include_materials: bool,
    byte_order: ByteOrder,
}

impl MiliToVtk {
    /// Build the VTK object for one mesh of a domain at a timestep
    pub fn convert(
        &self,
        format: &mut MiliFileFormat,
        timestep: usize,
        dom: usize,
        mesh_name: &str,
    ) -> Result<Vtk> {
        let mesh = format.get_mesh(timestep, dom, mesh_name)?;
        let mut piece = Self::grid_piece(&mesh);

        for path in &self.variables {
            let Some(centering) = format.variable_centering(path) else {
                warn!("Skipping \"{path}\", not a numeric variable");
                continue;
            };

            let array = format.get_vector_var(timestep, dom, path)?;
            trace!("Attaching {path} ({centering:?})");
            match centering {
                Centering::Node => piece.data.point.push(Self::float_attribute(&array)),
                Centering::Zone => piece.data.cell.push(Self::float_attribute(&array)),
            }
        }

        if self.include_materials {
            let mesh_id = parsers::mesh_id(mesh_name).unwrap_or(0);
            let set_name = f!("materials{}", mesh_id + 1);
            match format.get_auxiliary_data(&set_name, timestep, dom, AUXILIARY_DATA_MATERIAL)? {
                Some(material) => piece.data.cell.push(Attribute::DataArray(DataArray {
                    name: "material".to_string(),
                    elem: ElementType::Scalars {
                        num_comp: 1,
                        lookup_table: None,
                    },
                    data: IOBuffer::I32(material.mat_list.iter().map(|m| m + 1).collect()),
                })),
                None => debug!("No materials for {mesh_name}"),
            }
        }

        Ok(Vtk {
            version: Version::new_legacy(1, 0),
            title: f!("{} {mesh_name} domain {dom} state {}", format.family_root(), timestep + 1),
            byte_order: self.byte_order,
            data: DataSet::UnstructuredGrid {
                meta: None,
                pieces: vec![Piece::Inline(Box::new(piece))],
            },
            file_path: None,
        })
    }

    /// Points, cells and any arrays already carried by the mesh
    fn grid_piece(mesh: &UnstructuredMesh) -> UnstructuredGridPiece {
        let mut connectivity = Vec::new();
        let mut offsets = Vec::with_capacity(mesh.n_cells());
        for cell in &mesh.cells {
            connectivity.extend(cell.nodes.iter().map(|n| *n as u64));
            offsets.push(connectivity.len() as u64);
        }

        let mut data = Attributes::new();
        data.point.extend(mesh.point_data.iter().map(Self::mesh_attribute));
        data.cell.extend(mesh.cell_data.iter().map(Self::mesh_attribute));

        UnstructuredGridPiece {
            points: IOBuffer::F32(mesh.points.clone()),
            cells: Cells {
                cell_verts: VertexNumbers::XML {
                    connectivity,
                    offsets,
                },
                types: mesh.cells.iter().map(|c| c.kind).collect(),
            },
            data,
        }
    }

    fn mesh_attribute(array: &MeshArray) -> Attribute {
        let data = match &array.data {
            ArrayData::Float(v) => IOBuffer::F32(v.clone()),
            ArrayData::UnsignedChar(v) => IOBuffer::U8(v.clone()),
        };
        Attribute::DataArray(DataArray {
            name: array.name.clone(),
            elem: element_type(array.num_components),
            data,
        })
    }

    fn float_attribute(array: &FloatArray) -> Attribute {
        Attribute::DataArray(DataArray {
            name: array.name.clone(),
            elem: element_type(array.num_components),
            data: IOBuffer::F32(array.values.clone()),
        })
    }
}

/// Element type matching a number of components
fn element_type(num_components: usize) -> ElementType {
    match num_components {
        1 => ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        3 => ElementType::Vectors,
        9 => ElementType::Tensors,
        n => ElementType::Generic(n as u32),
    }
}

/// Write a VTK object to `path` in the chosen format
///
/// Legacy binary output follows the byte order set on the VTK object.
pub fn write_vtk<P: AsRef<Path>>(vtk: Vtk, path: P, format: VtkFormat) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing {} as {format:?}", path.display());

    match format {
        VtkFormat::Xml => vtk.export(path),
        VtkFormat::LegacyAscii => vtk.export_ascii(path),
        VtkFormat::LegacyBinary => match vtk.byte_order {
            ByteOrder::LittleEndian => vtk.export_le(path),
            ByteOrder::BigEndian => vtk.export_be(path),
        },
    }
    .map_err(|e| anyhow!("Could not write {}: {e:?}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Cell, CellType};

    #[test]
    fn cells_become_xml_connectivity() {
        let mut mesh = UnstructuredMesh::new();
        mesh.points = vec![0.0; 12];
        mesh.cells = vec![
            Cell::new(CellType::Triangle, vec![0, 1, 2]),
            Cell::new(CellType::Vertex, vec![3]),
        ];
        mesh.set_cell_array(MeshArray {
            name: "avtGhostZones".to_string(),
            num_components: 1,
            data: ArrayData::UnsignedChar(vec![0, 32]),
        });

        let piece = MiliToVtk::grid_piece(&mesh);
        match piece.cells.cell_verts {
            VertexNumbers::XML {
                connectivity,
                offsets,
            } => {
                assert_eq!(connectivity, vec![0, 1, 2, 3]);
                assert_eq!(offsets, vec![3, 4]);
            }
            _ => panic!("expected XML vertex numbers"),
        }
        assert_eq!(piece.cells.types, vec![CellType::Triangle, CellType::Vertex]);
        assert_eq!(piece.data.cell.len(), 1);
    }

    #[test]
    fn extensions_follow_the_format() {
        assert_eq!(VtkFormat::Xml.extension(), "vtu");
        assert_eq!(VtkFormat::LegacyBinary.extension(), "vtk");
    }
}
