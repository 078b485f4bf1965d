// internal modules
use crate::error::{MiliError, Result};
use crate::library::{NumType, Superclass};
use crate::metadata::{
    AggregateType, Centering, ElementSetGroup, MeshMetaData, MiliClassMetaData,
    MiliMaterialMetaData, MiliVariableMetaData, VariableShape,
};
use crate::readers::parsers;
use crate::utils::*;

// standard library
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// external crates
use log::{debug, trace, warn};
use serde_json::{Map, Value};

/// Occurrences of every variable name across all classes
type CountMap = HashMap<String, usize>;

/// Largest domain, mesh, material or state count accepted from a sidecar
pub const MAX_DECLARED_COUNT: usize = 1 << 20;

/// Everything read from a `.mili` sidecar
#[derive(Debug, Clone)]
pub struct MiliInfo {
    pub n_domains: usize,
    pub n_meshes: usize,
    pub dims: usize,
    /// One metadata registry per mesh
    pub meshes: Vec<MeshMetaData>,
    /// Cycle of each state, i.e. its position in the list of times
    pub cycles: Vec<i32>,
    pub times: Vec<f64>,
    pub n_timesteps: usize,
    /// File name of the sidecar without the `.mili` extension
    pub family_root: String,
    /// Directory holding the family
    pub family_path: PathBuf,
}

/// Reader for the JSON sidecar describing a Mili family
///
/// The reader works in two passes over the classes. The first counts how many
/// times every variable name is declared so that the second, which builds the
/// class and variable metadata, knows which of them are shared.
///
/// Example:
/// ```ignore
///     let reader = MiliJsonReader::new();
///     let info = reader.parse(Path::new("d3samp6.mili"))?;
/// ```
#[derive(Debug, Default)]
pub struct MiliJsonReader;

/// High level methods
impl MiliJsonReader {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Load the sidecar at `path` into the metadata model
    pub fn parse(&self, path: &Path) -> Result<MiliInfo> {
        let content = std::fs::read_to_string(path)?;

        // the legacy non-JSON format is rejected outright
        if !content.trim_start().starts_with('{') {
            return Err(MiliError::NonCompliantFile {
                path: path.display().to_string(),
                reason: "expected a JSON document".to_string(),
            });
        }

        let root: Value = serde_json::from_str(&content)?;
        let (family_root, family_path) = Self::family_location(path);
        debug!("Family root \"{family_root}\" in {}", family_path.display());

        let n_domains = bounded_count(&root, "Domains")?
            .ok_or_else(|| MiliError::ImproperUse("\"Domains\" is missing".to_string()))?;
        let dims = count_field(&root, "Dimensions")
            .ok_or_else(|| MiliError::ImproperUse("\"Dimensions\" is missing".to_string()))?;
        let n_meshes = bounded_count(&root, "Number_of_Meshes")?.unwrap_or(1);
        debug!("{n_domains} domain(s), {n_meshes} mesh(es), {dims}D");

        let materials = Self::extract_materials(&root)?;
        let (cycles, times, n_timesteps) = Self::extract_states(&root)?;

        let counts = Self::count_class_variables(&root);
        let (classes, variables) = Self::extract_classes(&root, &counts, n_domains, dims)?;

        // every mesh of a family is described by the same classes
        let meshes = (0..n_meshes)
            .map(|mesh_id| {
                let mut md = MeshMetaData::new(mesh_id, n_meshes, n_domains, dims);
                classes.iter().cloned().for_each(|c| md.add_class(c));
                variables.iter().cloned().for_each(|v| {
                    md.add_variable(v);
                });
                md.set_materials(materials.clone());
                md
            })
            .collect();

        Ok(MiliInfo {
            n_domains,
            n_meshes,
            dims,
            meshes,
            cycles,
            times,
            n_timesteps,
            family_root,
            family_path,
        })
    }

    /// Family root name and directory from the sidecar path
    fn family_location(path: &Path) -> (String, PathBuf) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let root = name.strip_suffix(".mili").unwrap_or(&name).to_string();

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        (root, dir)
    }
}

/// Materials and states
impl MiliJsonReader {
    /// Material names and colours, padded to the declared count
    fn extract_materials(root: &Value) -> Result<Vec<MiliMaterialMetaData>> {
        let Some(block) = root.get("Materials").and_then(Value::as_object) else {
            debug!("No materials defined");
            return Ok(Vec::new());
        };

        let count = bounded_count(&root["Materials"], "count")?.unwrap_or(0);
        let mut entries = block
            .iter()
            .filter(|(key, _)| key.as_str() != "count")
            .map(|(_, value)| value);

        let materials = (0..count)
            .map(|i| {
                let entry = entries.next();
                let name = entry
                    .and_then(|e| e.get("name"))
                    .and_then(Value::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| f!("mat{}", i + 1));

                let colour = match entry.and_then(|e| e.get("COLOR")).and_then(rgb_triplet) {
                    Some(rgb) => rgb_to_hex(rgb),
                    None => random_hex_colour(),
                };

                trace!("Material {}: {name} {colour}", i + 1);
                MiliMaterialMetaData::new(name, colour)
            })
            .collect();
        Ok(materials)
    }

    /// Cycles, times and the number of states
    fn extract_states(root: &Value) -> Result<(Vec<i32>, Vec<f64>, usize)> {
        let Some(states) = root.get("States") else {
            debug!("No states defined");
            return Ok((Vec::new(), Vec::new(), 0));
        };

        let times: Vec<f64> = states
            .get("times")
            .and_then(Value::as_array)
            .map(|t| t.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default();

        let n_timesteps = bounded_count(states, "count")?.unwrap_or(times.len());
        let cycles = (0..times.len() as i32).collect();
        debug!("{n_timesteps} state(s)");

        Ok((cycles, times, n_timesteps))
    }
}

/// Classes and variables
impl MiliJsonReader {
    /// First pass, count the declarations of every variable name
    ///
    /// Element sets count each of their real names rather than their own.
    fn count_class_variables(root: &Value) -> CountMap {
        let mut counts = CountMap::new();
        let variables = root.get("Variables");

        for (_, class) in object_entries(root, "Classes") {
            for name in variable_names(class) {
                let entry = variables.and_then(|v| v.get(name));
                match entry.and_then(real_names) {
                    Some(real) if parsers::is_element_set_name(name) => {
                        for r in real {
                            *counts.entry(r.to_string()).or_default() += 1;
                        }
                    }
                    _ => *counts.entry(name.to_string()).or_default() += 1,
                }
            }
        }

        trace!("Variable declaration counts: {counts:?}");
        counts
    }

    /// Second pass, build the class and variable metadata
    fn extract_classes(
        root: &Value,
        counts: &CountMap,
        n_domains: usize,
        dims: usize,
    ) -> Result<(Vec<MiliClassMetaData>, Vec<MiliVariableMetaData>)> {
        let mut classes = Vec::new();
        let mut variables = Vec::new();
        let empty = Value::Object(Map::new());
        let all_variables = root.get("Variables").unwrap_or(&empty);

        for (short_name, entry) in object_entries(root, "Classes") {
            let superclass = entry
                .get("SuperClass")
                .and_then(Value::as_f64)
                .and_then(|id| Superclass::from_id(id as i64))
                .ok_or_else(|| {
                    MiliError::UnexpectedValue(f!("class \"{short_name}\" has no valid SuperClass"))
                })?;

            let long_name = entry
                .get("LongName")
                .and_then(Value::as_str)
                .unwrap_or(short_name);
            let count = count_field(entry, "count").unwrap_or(0);

            let class = MiliClassMetaData::new(short_name, long_name, superclass, count, n_domains);
            debug!("Class {short_name} ({superclass:?}), {count} elements");

            for name in variable_names(entry) {
                let Some(var_entry) = all_variables.get(name) else {
                    warn!("Variable \"{name}\" of class {short_name} is not defined, skipping");
                    continue;
                };

                let variable = Self::extract_variable(
                    name,
                    var_entry,
                    all_variables,
                    &class,
                    counts,
                    n_domains,
                    dims,
                );
                variables.push(variable);
            }

            classes.push(class);
        }

        Ok((classes, variables))
    }

    /// Build the metadata of one variable declared on `class`
    fn extract_variable(
        name: &str,
        entry: &Value,
        all_variables: &Value,
        class: &MiliClassMetaData,
        counts: &CountMap,
        n_domains: usize,
        dims: usize,
    ) -> MiliVariableMetaData {
        let mut var = MiliVariableMetaData::new(name, class.short_name(), n_domains);

        if let Some(long_name) = entry.get("LongName").and_then(Value::as_str) {
            var.long_name = long_name.to_string();
        }

        var.centering = entry
            .get("Center")
            .and_then(Value::as_str)
            .and_then(Centering::parse)
            .unwrap_or(match class.is_node() {
                true => Centering::Node,
                false => Centering::Zone,
            });

        if let Some(id) = entry.get("num_type").and_then(Value::as_f64) {
            match NumType::try_from(id as i64) {
                Ok(num_type) => var.num_type = num_type,
                Err(e) => warn!("{name}: {e}, assuming float"),
            }
        }

        if let Some(vtk_type) = entry.get("VTK_TYPE") {
            trace!("{name}: VTK_TYPE {vtk_type}");
        }

        var.agg_type = AggregateType::from_id(count_field(entry, "agg_type").unwrap_or(0));
        var.vector_size = count_field(entry, "vector_size").unwrap_or(1).max(1);
        var.components = string_list(entry, "vector_components");
        var.is_material = class.is_material();
        var.is_global = class.is_global();
        var.shape = VariableShape::classify(var.vector_size, dims);

        match real_names(entry) {
            Some(real) if parsers::is_element_set_name(name) => {
                var.component_dims = element_set_dims(entry);
                var.groups = Some(Self::extract_groups(
                    &real,
                    &var.components,
                    all_variables,
                    counts,
                    dims,
                ));
                if var.groups().is_empty() {
                    warn!("Element set {name} has no usable groups");
                }
                trace!(
                    "Element set {name}: {} components x {} integration points",
                    var.vector_size,
                    var.component_dims
                );
            }
            _ => {
                var.is_shared = counts.get(name).copied().unwrap_or(0) > 1;
            }
        }

        trace!(
            "Variable {}/{name}: {:?} {:?} x{}{}",
            class.short_name(),
            var.centering,
            var.num_type,
            var.vector_size,
            if var.is_shared { " (shared)" } else { "" }
        );
        var
    }

    /// Groups of an element set
    ///
    /// A group is placed by looking its component names up in the element
    /// set's own `vector_components`. A group whose names are not all listed
    /// there takes the next consecutive slots in declaration order.
    fn extract_groups(
        real_names: &[&str],
        es_components: &[String],
        all_variables: &Value,
        counts: &CountMap,
        dims: usize,
    ) -> Vec<ElementSetGroup> {
        let mut offset = 0;
        let mut claimed = vec![false; es_components.len()];
        real_names
            .iter()
            .map(|real| {
                let entry = all_variables.get(*real);
                let vector_size = entry
                    .and_then(|e| count_field(e, "vector_size"))
                    .unwrap_or(1)
                    .max(1);
                let agg_type = entry
                    .and_then(|e| count_field(e, "agg_type"))
                    .map(AggregateType::from_id)
                    .unwrap_or(AggregateType::Scalar);

                let names = match entry.map(|e| string_list(e, "vector_components")) {
                    Some(list) if list.len() == vector_size => list,
                    _ if vector_size == 1 => vec![real.to_string()],
                    _ => Vec::new(),
                };
                let component_idxs = named_slots(&names, es_components, &mut claimed)
                    .unwrap_or_else(|| (offset..offset + vector_size).collect());
                trace!("Group {real} at components {component_idxs:?}");

                let group = ElementSetGroup {
                    name: real.to_string(),
                    vector_size,
                    agg_type,
                    shape: VariableShape::classify(vector_size, dims),
                    component_idxs,
                    is_shared: counts.get(*real).copied().unwrap_or(0) > 1,
                };
                offset += vector_size;
                group
            })
            .collect()
    }
}

/// A count that may be written in scientific notation, truncated
fn count_field(value: &Value, key: &str) -> Option<usize> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .map(|v| v.max(0.0) as usize)
}

/// First unclaimed position of every name, or `None` if one is not found
fn named_slots(names: &[String], components: &[String], claimed: &mut [bool]) -> Option<Vec<usize>> {
    if names.is_empty() {
        return None;
    }

    let mut taken = claimed.to_vec();
    let slots = names
        .iter()
        .map(|name| {
            let slot = components
                .iter()
                .enumerate()
                .position(|(i, c)| c == name && !taken[i])?;
            taken[slot] = true;
            Some(slot)
        })
        .collect::<Option<Vec<usize>>>()?;

    claimed.copy_from_slice(&taken);
    Some(slots)
}

/// A count that must stay below [MAX_DECLARED_COUNT]
fn bounded_count(value: &Value, key: &str) -> Result<Option<usize>> {
    match count_field(value, key) {
        Some(n) if n > MAX_DECLARED_COUNT => Err(MiliError::ImproperUse(f!(
            "\"{key}\" declares {n}, more than {MAX_DECLARED_COUNT}"
        ))),
        n => Ok(n),
    }
}

/// Integration points of an element set, a number or the last of a list
fn element_set_dims(entry: &Value) -> usize {
    let dims = match entry.get("dims") {
        Some(Value::Array(list)) => list.last().and_then(Value::as_f64),
        Some(value) => value.as_f64(),
        None => None,
    };
    dims.map(|d| d.max(1.0) as usize).unwrap_or(1)
}

/// Key/value pairs of an object field, in file order
fn object_entries<'a>(root: &'a Value, key: &str) -> impl Iterator<Item = (&'a str, &'a Value)> {
    root.get(key)
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
}

/// Names listed in the `variables` array of a class
fn variable_names(class: &Value) -> impl Iterator<Item = &str> {
    class
        .get("variables")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

fn real_names(entry: &Value) -> Option<Vec<&str>> {
    entry
        .get("real_names")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
}

fn string_list(entry: &Value, key: &str) -> Vec<String> {
    entry
        .get(key)
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn rgb_triplet(value: &Value) -> Option<[f64; 3]> {
    let list = value.as_array()?;
    match list.as_slice() {
        [r, g, b, ..] => Some([r.as_f64()?, g.as_f64()?, b.as_f64()?]),
        _ => None,
    }
}
