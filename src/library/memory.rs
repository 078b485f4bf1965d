//! In-memory Mili families
//!
//! Families are assembled with the builder-style methods on [MemoryDatabase]
//! and registered with a [MemoryLibrary] under the name the reader will try to
//! open. The same structures serialise to snapshot files, see
//! [SnapshotLibrary](crate::library::SnapshotLibrary).

// standard library
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// internal modules
use crate::error::{LibResult, LibraryError};
use crate::library::{
    ClassInfo, Connectivity, LabelInfo, MiliDatabase, MiliLibrary, ResultBuffer, Subrecord,
    Superclass,
};
use crate::utils::f;

// external crates
use log::trace;
use serde::{Deserialize, Serialize};

/// Counts of library calls, shared by a library and every handle it opens
#[derive(Debug, Clone, Default)]
pub struct CallCounters {
    inner: Arc<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    opens: AtomicUsize,
    closes: AtomicUsize,
    conn_loads: AtomicUsize,
    reads: AtomicUsize,
}

impl CallCounters {
    /// Successful opens
    pub fn opens(&self) -> usize {
        self.inner.opens.load(Ordering::Relaxed)
    }

    /// Handles closed
    pub fn closes(&self) -> usize {
        self.inner.closes.load(Ordering::Relaxed)
    }

    /// Connectivity loads
    pub fn conn_loads(&self) -> usize {
        self.inner.conn_loads.load(Ordering::Relaxed)
    }

    /// Results reads
    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::Relaxed)
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A library whose families live in memory
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    families: HashMap<String, MemoryDatabase>,
    counters: CallCounters,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register a family under the exact name the reader will open
    pub fn insert(&mut self, name: impl Into<String>, database: MemoryDatabase) {
        self.families.insert(name.into(), database);
    }

    /// Shared call counters, still readable once the library is handed off
    pub fn counters(&self) -> CallCounters {
        self.counters.clone()
    }
}

impl MiliLibrary for MemoryLibrary {
    fn open(&self, _path: &Path, name: &str) -> LibResult<Box<dyn MiliDatabase>> {
        let mut database = self
            .families
            .get(name)
            .cloned()
            .ok_or_else(|| LibraryError::new(f!("No family named {name}")))?;

        trace!("Opened in-memory family {name}");
        CallCounters::bump(&self.counters.inner.opens);
        database.counters = self.counters.clone();
        Ok(Box::new(database))
    }
}

/// One class of objects on a mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryClass {
    pub superclass: Superclass,
    pub info: ClassInfo,
    pub connectivity: Option<Connectivity>,
    pub nodes: Option<Vec<f32>>,
    pub labels: Option<LabelInfo>,
}

/// Results stored for one state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryState {
    /// Keyed by subrecord id, then by state variable name
    pub results: BTreeMap<usize, BTreeMap<String, ResultBuffer>>,
}

/// A complete Mili family held in memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDatabase {
    pub srec_formats: usize,
    pub meshes: Vec<Vec<MemoryClass>>,
    pub subrecords: Vec<Subrecord>,
    pub states: Vec<MemoryState>,
    #[serde(skip)]
    counters: CallCounters,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self {
            srec_formats: 1,
            meshes: Vec::new(),
            subrecords: Vec::new(),
            states: Vec::new(),
            counters: CallCounters::default(),
        }
    }
}

/// Building up a family
impl MemoryDatabase {
    pub fn new() -> Self {
        Default::default()
    }

    /// Define the node class of a mesh with packed coordinates
    pub fn add_nodes(
        &mut self,
        mesh: usize,
        short_name: &str,
        dims: usize,
        positions: Vec<f32>,
    ) -> &mut Self {
        let count = positions.len() / dims.max(1);
        let mut class = Self::class(Superclass::Node, short_name, count);
        class.nodes = Some(positions);
        self.mesh_mut(mesh).push(class);
        self
    }

    /// Define a cell class from flat connectivity and 1-based material ids
    pub fn add_cells(
        &mut self,
        mesh: usize,
        superclass: Superclass,
        short_name: &str,
        conns: Vec<i32>,
        mats: Vec<i32>,
    ) -> &mut Self {
        let width = superclass.conn_count().unwrap_or(1);
        let count = conns.len() / width;
        let mut class = Self::class(superclass, short_name, count);
        class.connectivity = Some(Connectivity {
            conns,
            mats,
            parts: vec![1; count],
        });
        self.mesh_mut(mesh).push(class);
        self
    }

    /// Define a class without geometry, e.g. materials or globals
    pub fn add_class(
        &mut self,
        mesh: usize,
        superclass: Superclass,
        short_name: &str,
        count: usize,
    ) -> &mut Self {
        let class = Self::class(superclass, short_name, count);
        self.mesh_mut(mesh).push(class);
        self
    }

    /// Attach labels to an existing class
    pub fn set_labels(&mut self, mesh: usize, short_name: &str, labels: LabelInfo) -> &mut Self {
        if let Some(class) = self
            .mesh_mut(mesh)
            .iter_mut()
            .find(|c| c.info.short_name == short_name)
        {
            class.labels = Some(labels);
        }
        self
    }

    /// Append a subrecord definition and return its id
    pub fn add_subrecord(
        &mut self,
        name: &str,
        class_name: &str,
        blocks: Vec<(usize, usize)>,
        svar_names: &[&str],
    ) -> usize {
        let qty_objects = blocks.iter().map(|(lo, hi)| hi + 1 - lo).sum();
        self.subrecords.push(Subrecord {
            name: name.to_string(),
            class_name: class_name.to_string(),
            qty_objects,
            blocks,
            svar_names: svar_names.iter().map(|s| s.to_string()).collect(),
        });
        self.subrecords.len() - 1
    }

    /// Store the values of a state variable for a subrecord at a 1-based state
    pub fn set_result(
        &mut self,
        state: usize,
        subrecord: usize,
        svar: &str,
        values: ResultBuffer,
    ) -> &mut Self {
        if self.states.len() < state {
            self.states.resize_with(state, MemoryState::default);
        }
        self.states[state - 1]
            .results
            .entry(subrecord)
            .or_default()
            .insert(svar.to_string(), values);
        self
    }

    fn class(superclass: Superclass, short_name: &str, count: usize) -> MemoryClass {
        MemoryClass {
            superclass,
            info: ClassInfo {
                short_name: short_name.to_string(),
                long_name: short_name.to_string(),
                count,
            },
            connectivity: None,
            nodes: None,
            labels: None,
        }
    }

    fn mesh_mut(&mut self, mesh: usize) -> &mut Vec<MemoryClass> {
        if self.meshes.len() <= mesh {
            self.meshes.resize_with(mesh + 1, Vec::new);
        }
        &mut self.meshes[mesh]
    }
}

/// Lookups used by the trait implementation
impl MemoryDatabase {
    fn find(&self, mesh: usize, short_name: &str) -> LibResult<&MemoryClass> {
        self.meshes
            .get(mesh)
            .and_then(|classes| classes.iter().find(|c| c.info.short_name == short_name))
            .ok_or_else(|| LibraryError::new(f!("No class {short_name} on mesh {mesh}")))
    }

    fn of_superclass(&self, mesh: usize, superclass: Superclass) -> Vec<&MemoryClass> {
        self.meshes
            .get(mesh)
            .map(|classes| {
                classes
                    .iter()
                    .filter(|c| c.superclass == superclass)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl MiliDatabase for MemoryDatabase {
    fn close(&mut self) -> LibResult<()> {
        CallCounters::bump(&self.counters.inner.closes);
        Ok(())
    }

    fn state_record_formats(&self) -> LibResult<usize> {
        Ok(self.srec_formats)
    }

    fn class_count(&self, mesh: usize, superclass: Superclass) -> LibResult<usize> {
        Ok(self.of_superclass(mesh, superclass).len())
    }

    fn class_info(&self, mesh: usize, superclass: Superclass, index: usize) -> LibResult<ClassInfo> {
        self.of_superclass(mesh, superclass)
            .get(index)
            .map(|c| c.info.clone())
            .ok_or_else(|| {
                LibraryError::new(f!("No {superclass:?} class {index} on mesh {mesh}"))
            })
    }

    fn load_conns(&self, mesh: usize, class: &str) -> LibResult<Connectivity> {
        CallCounters::bump(&self.counters.inner.conn_loads);
        self.find(mesh, class)?
            .connectivity
            .clone()
            .ok_or_else(|| LibraryError::new(f!("Class {class} has no connectivity")))
    }

    fn load_nodes(&self, mesh: usize, class: &str) -> LibResult<Vec<f32>> {
        self.find(mesh, class)?
            .nodes
            .clone()
            .ok_or_else(|| LibraryError::new(f!("Class {class} has no node positions")))
    }

    fn load_node_labels(&self, mesh: usize, class: &str) -> LibResult<LabelInfo> {
        self.find(mesh, class)?
            .labels
            .clone()
            .ok_or_else(|| LibraryError::new(f!("Class {class} has no labels")))
    }

    fn load_conn_labels(&self, mesh: usize, class: &str) -> LibResult<LabelInfo> {
        self.load_node_labels(mesh, class)
    }

    fn subrecord_count(&self) -> LibResult<usize> {
        Ok(self.subrecords.len())
    }

    fn subrecord(&self, index: usize) -> LibResult<Subrecord> {
        self.subrecords
            .get(index)
            .cloned()
            .ok_or_else(|| LibraryError::new(f!("No subrecord {index}")))
    }

    fn read_results(&self, state: usize, subrecord: usize, svar: &str) -> LibResult<ResultBuffer> {
        CallCounters::bump(&self.counters.inner.reads);
        state
            .checked_sub(1)
            .and_then(|s| self.states.get(s))
            .and_then(|s| s.results.get(&subrecord))
            .and_then(|r| r.get(svar))
            .cloned()
            .ok_or_else(|| {
                LibraryError::new(f!("No {svar} in subrecord {subrecord} at state {state}"))
            })
    }
}
