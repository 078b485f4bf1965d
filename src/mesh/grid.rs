// internal modules
use crate::mesh::CellType;

/// One cell of an unstructured mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub kind: CellType,
    /// 0-based node indices
    pub nodes: Vec<usize>,
}

impl Cell {
    pub fn new(kind: CellType, nodes: Vec<usize>) -> Self {
        Self { kind, nodes }
    }
}

/// Values of an auxiliary array
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float(Vec<f32>),
    UnsignedChar(Vec<u8>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::UnsignedChar(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named array attached to the points or cells of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    pub name: String,
    pub num_components: usize,
    pub data: ArrayData,
}

/// Unstructured grid with 3D points
///
/// Points are packed as `[x0, y0, z0, x1, y1, z1, ...]`. Two dimensional
/// meshes are stored with a zero z coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnstructuredMesh {
    pub points: Vec<f32>,
    pub cells: Vec<Cell>,
    pub point_data: Vec<DataArray>,
    pub cell_data: Vec<DataArray>,
}

impl UnstructuredMesh {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    pub fn n_points(&self) -> usize {
        self.points.len() / 3
    }

    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Coordinates of point `index`
    pub fn point(&self, index: usize) -> Option<[f32; 3]> {
        let p = self.points.get(3 * index..3 * index + 3)?;
        Some([p[0], p[1], p[2]])
    }

    /// Attach a point array, replacing any array of the same name
    pub fn set_point_array(&mut self, array: DataArray) {
        self.point_data.retain(|a| a.name != array.name);
        self.point_data.push(array);
    }

    /// Attach a cell array, replacing any array of the same name
    pub fn set_cell_array(&mut self, array: DataArray) {
        self.cell_data.retain(|a| a.name != array.name);
        self.cell_data.push(array);
    }

    pub fn point_array(&self, name: &str) -> Option<&DataArray> {
        self.point_data.iter().find(|a| a.name == name)
    }

    pub fn cell_array(&self, name: &str) -> Option<&DataArray> {
        self.cell_data.iter().find(|a| a.name == name)
    }

    /// Unsigned char values of a cell array, e.g. the ghost zones
    pub fn cell_flags(&self, name: &str) -> Option<&[u8]> {
        match &self.cell_array(name)?.data {
            ArrayData::UnsignedChar(v) => Some(v),
            _ => None,
        }
    }

    /// Unsigned char values of a point array, e.g. the ghost nodes
    pub fn point_flags(&self, name: &str) -> Option<&[u8]> {
        match &self.point_array(name)?.data {
            ArrayData::UnsignedChar(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_replace_by_name() {
        let mut mesh = UnstructuredMesh::new();
        mesh.points = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        mesh.set_cell_array(DataArray {
            name: "flags".to_string(),
            num_components: 1,
            data: ArrayData::UnsignedChar(vec![1]),
        });
        mesh.set_cell_array(DataArray {
            name: "flags".to_string(),
            num_components: 1,
            data: ArrayData::UnsignedChar(vec![7]),
        });

        assert_eq!(mesh.n_points(), 2);
        assert_eq!(mesh.point(1), Some([1.0, 2.0, 3.0]));
        assert_eq!(mesh.point(2), None);
        assert_eq!(mesh.cell_data.len(), 1);
        assert_eq!(mesh.cell_flags("flags"), Some(&[7u8][..]));
        assert_eq!(mesh.point_flags("flags"), None);
    }
}
