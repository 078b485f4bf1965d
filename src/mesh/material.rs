/// Material assignment of every cell in one domain of a mesh
///
/// Material numbers in `mat_list` are 0-based indices into `names`. Mili does
/// not write mixed-material cells, so every cell is clean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Material {
    pub names: Vec<String>,
    pub mat_list: Vec<i32>,
}

impl Material {
    pub fn new(names: Vec<String>, mat_list: Vec<i32>) -> Self {
        Self { names, mat_list }
    }

    pub fn n_materials(&self) -> usize {
        self.names.len()
    }

    pub fn n_cells(&self) -> usize {
        self.mat_list.len()
    }

    /// Cells assigned to material `mat` (0-based)
    pub fn cells_of(&self, mat: usize) -> impl Iterator<Item = usize> + '_ {
        self.mat_list
            .iter()
            .enumerate()
            .filter(move |(_, m)| **m >= 0 && **m as usize == mat)
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_grouped_by_material() {
        let material = Material::new(
            vec!["steel".to_string(), "air".to_string()],
            vec![0, 1, 1, -1],
        );
        assert_eq!(material.cells_of(1).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(material.cells_of(0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(material.n_cells(), 4);
    }
}
