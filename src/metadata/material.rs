//! Material names and colours declared by the sidecar

/// One material of a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiliMaterialMetaData {
    pub name: String,
    /// Colour as a `#rrggbb` string
    pub colour: String,
}

impl MiliMaterialMetaData {
    pub fn new(name: impl Into<String>, colour: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colour: colour.into(),
        }
    }
}
