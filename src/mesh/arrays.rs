// internal modules
use crate::metadata::ClassLabels;

/// Float values of a variable, `num_components` per tuple
#[derive(Debug, Clone, PartialEq)]
pub struct FloatArray {
    pub name: String,
    pub num_components: usize,
    pub values: Vec<f32>,
}

impl FloatArray {
    /// An array of `n_tuples` tuples where every value is NaN
    pub fn nan(name: &str, n_tuples: usize, num_components: usize) -> Self {
        Self {
            name: name.to_string(),
            num_components,
            values: vec![f32::NAN; n_tuples * num_components],
        }
    }

    pub fn n_tuples(&self) -> usize {
        match self.num_components {
            0 => 0,
            n => self.values.len() / n,
        }
    }

    /// Values of tuple `index`
    pub fn tuple(&self, index: usize) -> &[f32] {
        let n = self.num_components;
        &self.values[index * n..(index + 1) * n]
    }
}

/// Per-class reverse lookup registered on a label array
#[derive(Debug, Clone, PartialEq, Eq)]
struct LabelRange {
    class_name: String,
    /// Index of the first element of the class within the array
    offset: usize,
    labels: ClassLabels,
}

/// Fixed-width text labels, one row per element
///
/// Every row is `width` bytes long and padded with NUL. The classes the rows
/// came from are registered so that a label can be mapped back to its element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLabelArray {
    pub name: String,
    width: usize,
    data: Vec<u8>,
    ranges: Vec<LabelRange>,
}

impl ElementLabelArray {
    /// An array of `n_tuples` empty rows `width` bytes wide
    pub fn new(name: &str, n_tuples: usize, width: usize) -> Self {
        Self {
            name: name.to_string(),
            width,
            data: vec![0; n_tuples * width],
            ranges: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn n_tuples(&self) -> usize {
        match self.width {
            0 => 0,
            w => self.data.len() / w,
        }
    }

    /// Raw NUL-padded rows
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Write the text of row `index`, truncated to leave a terminating NUL
    pub fn set_label(&mut self, index: usize, text: &str) {
        if index >= self.n_tuples() {
            return;
        }
        let row = &mut self.data[index * self.width..(index + 1) * self.width];
        row.fill(0);
        let n = text.len().min(self.width.saturating_sub(1));
        row[..n].copy_from_slice(&text.as_bytes()[..n]);
    }

    /// Text of row `index` without padding
    pub fn label(&self, index: usize) -> Option<String> {
        if index >= self.n_tuples() {
            return None;
        }
        let row = &self.data[index * self.width..(index + 1) * self.width];
        let end = row.iter().position(|b| *b == 0).unwrap_or(row.len());
        Some(String::from_utf8_lossy(&row[..end]).to_string())
    }

    /// Register the labels of a class whose first element sits at `offset`
    pub fn add_class_labels(&mut self, class_name: &str, offset: usize, labels: ClassLabels) {
        self.ranges.push(LabelRange {
            class_name: class_name.to_string(),
            offset,
            labels,
        });
    }

    /// Names of the registered classes, in registration order
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.ranges.iter().map(|r| r.class_name.as_str())
    }

    /// Element index for a simulation label of a class
    pub fn element_id_for_label(&self, class_name: &str, label: i32) -> Option<usize> {
        let range = self.ranges.iter().find(|r| r.class_name == class_name)?;
        range.labels.element_id(label).map(|id| id + range.offset)
    }
}

/// Result of a scalar variable query
#[derive(Debug, Clone, PartialEq)]
pub enum VarArray {
    Float(FloatArray),
    Labels(ElementLabelArray),
}

impl VarArray {
    pub fn as_float(&self) -> Option<&FloatArray> {
        match self {
            Self::Float(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_labels(&self) -> Option<&ElementLabelArray> {
        match self {
            Self::Labels(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_float(self) -> Option<FloatArray> {
        match self {
            Self::Float(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::LabelInfo;

    #[test]
    fn rows_are_nul_padded_to_fixed_width() {
        let mut labels = ElementLabelArray::new("OriginalZoneLabels", 2, 6);
        labels.set_label(0, "hex 7");
        labels.set_label(1, "a long label");

        assert_eq!(labels.n_tuples(), 2);
        assert_eq!(&labels.as_bytes()[..6], b"hex 7\0");
        assert_eq!(labels.label(1).unwrap(), "a lon");
        assert_eq!(labels.label(2), None);
    }

    #[test]
    fn labels_map_back_to_elements_per_class() {
        let mut labels = ElementLabelArray::new("OriginalZoneLabels", 5, 4);
        let info = LabelInfo {
            labels: vec![20, 21, 22],
            blocks: vec![(20, 22)],
        };
        labels.add_class_labels("shell", 0, ClassLabels::new(LabelInfo::sequential(2)));
        labels.add_class_labels("brick", 2, ClassLabels::new(info));

        assert_eq!(labels.element_id_for_label("brick", 21), Some(3));
        assert_eq!(labels.element_id_for_label("shell", 2), Some(1));
        assert_eq!(labels.element_id_for_label("shell", 21), None);
        assert_eq!(labels.element_id_for_label("beam", 1), None);
    }

    #[test]
    fn nan_arrays_have_the_requested_shape() {
        let array = FloatArray::nan("stress", 4, 9);
        assert_eq!(array.n_tuples(), 4);
        assert_eq!(array.tuple(3).len(), 9);
        assert!(array.values.iter().all(|v| v.is_nan()));
    }
}
