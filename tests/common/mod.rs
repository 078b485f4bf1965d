//! Shared fixture, a small single domain family with one of everything
//!
//! Cells, in mesh order:
//!
//! | cell | class | element | material |
//! | ---- | ----- | ------- | -------- |
//! | 0    | beam  | 1       | 3        |
//! | 1    | shell | 7       | 1        |
//! | 2    | shell | 20      | 2        |
//! | 3    | brick | 101     | 1        |
//! | 4    | brick | 102 (all nodes equal) | 2 |
//! | 5    | brick | 103 (collapsed top)   | 3 |
#![allow(dead_code)]

use mili::library::{LabelInfo, MemoryDatabase, MemoryLibrary, ResultBuffer, Superclass};
use mili::MiliFileFormat;

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ROOT: &str = "d3samp";
pub const N_NODES: usize = 10;
pub const N_CELLS: usize = 6;

/// Subrecord ids, in the order they are added
pub const NODE_SR: usize = 0;
pub const BRICK_SR: usize = 1;
pub const SHELL_SR: usize = 2;
pub const MAT_SR: usize = 3;
pub const GLOB_SR: usize = 4;

/// Element set layout of the shell class
pub const ES_COMPONENTS: usize = 4;
pub const ES_POINTS: usize = 3;

/// A fresh directory, removed when the guard is dropped
pub fn scratch_dir(tag: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(&format!("mili_{tag}_"))
        .tempdir()
        .unwrap()
}

pub fn sidecar(n_domains: usize) -> Value {
    json!({
        "Domains": n_domains,
        "Dimensions": 3,
        "Materials": {
            "count": 3,
            "1": {"name": "steel", "COLOR": [1.0, 0.0, 0.0]},
            "2": {"name": "foam"}
        },
        "States": {"count": 2, "times": [0.0, 5.0e-4]},
        "Variables": {
            "nodpos": {"Center": "node", "vector_size": 3, "agg_type": 1,
                       "vector_components": ["ux", "uy", "uz"]},
            "sx": {"LongName": "Stress x", "Center": "zone", "num_type": 2},
            "sand": {"Center": "zone", "num_type": 2},
            "stress": {"vector_size": 6, "agg_type": 1,
                       "vector_components": ["xx", "yy", "zz", "xy", "yz", "zx"]},
            "es_1a": {"vector_size": 4, "dims": [1, 3], "real_names": ["eps", "sig"]},
            "eps": {"vector_size": 1},
            "sig": {"vector_size": 3, "agg_type": 1},
            "matke": {"num_type": 2},
            "ke": {"num_type": 4}
        },
        "Classes": {
            "node": {"SuperClass": 1, "count": 10, "variables": ["nodpos"]},
            "beam": {"SuperClass": 3, "count": 1, "variables": []},
            "shell": {"SuperClass": 5, "count": 2, "variables": ["sx", "sand", "es_1a"]},
            "brick": {"SuperClass": 9, "count": 3, "variables": ["sx", "sand", "stress"]},
            "mat": {"SuperClass": 10, "count": 3, "variables": ["matke"]},
            "glob": {"SuperClass": 11, "count": 1, "variables": ["ke"]}
        }
    })
}

pub fn write_sidecar(dir: &Path, root: &Value) -> PathBuf {
    let path = dir.join(format!("{ROOT}.mili"));
    std::fs::write(&path, root.to_string()).unwrap();
    path
}

/// Initial node positions, node `i` sits at `(i, 2i, 3i)`
pub fn initial_positions() -> Vec<f32> {
    (0..N_NODES)
        .flat_map(|i| [i as f32, 2.0 * i as f32, 3.0 * i as f32])
        .collect()
}

/// Element set value of a shell element (1-based) at an integration point
pub fn es_value(element: usize, ip: usize, component: usize) -> f32 {
    (100 * element + 10 * ip + component) as f32
}

/// The fixture family, with the shell subrecord split into one block per element
pub fn database(split_shell: bool) -> MemoryDatabase {
    let mut db = MemoryDatabase::new();
    db.add_nodes(0, "node", 3, initial_positions())
        .add_cells(0, Superclass::Beam, "beam", vec![0, 1, 9], vec![3])
        .add_cells(
            0,
            Superclass::Quad,
            "shell",
            vec![0, 1, 2, 3, 4, 5, 6, 7],
            vec![1, 2],
        )
        .add_cells(
            0,
            Superclass::Hex,
            "brick",
            vec![
                0, 1, 2, 3, 4, 5, 6, 7, // regular
                5, 5, 5, 5, 5, 5, 5, 5, // point
                0, 1, 2, 2, 4, 4, 4, 4, // tetrahedron
            ],
            vec![1, 2, 3],
        )
        .add_class(0, Superclass::Mat, "mat", 3)
        .add_class(0, Superclass::Mesh, "glob", 1)
        .set_labels(
            0,
            "shell",
            LabelInfo {
                labels: vec![7, 20],
                blocks: vec![(7, 7), (20, 20)],
            },
        )
        .set_labels(
            0,
            "brick",
            LabelInfo {
                labels: vec![101, 102, 103],
                blocks: vec![(101, 103)],
            },
        );

    let shell_blocks = match split_shell {
        true => vec![(1, 1), (2, 2)],
        false => vec![(1, 2)],
    };

    db.add_subrecord("node_sr", "node", vec![(1, 10)], &["nodpos"]);
    db.add_subrecord("brick_sr", "brick", vec![(1, 3)], &["sx", "sand", "stress"]);
    db.add_subrecord("shell_sr", "shell", shell_blocks, &["sx", "sand", "es_1a"]);
    db.add_subrecord("mat_sr", "mat", vec![(1, 2)], &["matke"]);
    db.add_subrecord("glob_sr", "glob", vec![(1, 1)], &["ke"]);

    let es: Vec<f32> = (1..=2)
        .flat_map(|element| {
            (0..ES_POINTS).flat_map(move |ip| {
                (0..ES_COMPONENTS).map(move |comp| es_value(element, ip, comp))
            })
        })
        .collect();

    let stress: Vec<f32> = (0..3)
        .flat_map(|brick| (1..=6).map(move |c| (10 * brick + c) as f32))
        .collect();

    for state in 1..=2 {
        let shift = (state - 1) as f32;
        let moved = initial_positions()
            .chunks(3)
            .flat_map(|p| [p[0] + shift, p[1], p[2]])
            .collect();

        // destroyed at the second state: shell 7 and brick 102
        let (shell_sand, brick_sand) = match state {
            1 => (vec![1.0, 1.0], vec![1.0, 1.0, 1.0]),
            _ => (vec![0.5, 1.0], vec![1.0, 0.0, 1.0]),
        };

        db.set_result(state, NODE_SR, "nodpos", ResultBuffer::F32(moved))
            .set_result(state, BRICK_SR, "sx", ResultBuffer::F32(vec![1.0, 2.0, 3.0]))
            .set_result(state, BRICK_SR, "sand", ResultBuffer::F32(brick_sand))
            .set_result(state, BRICK_SR, "stress", ResultBuffer::F32(stress.clone()))
            .set_result(state, SHELL_SR, "sx", ResultBuffer::F32(vec![10.0, 20.0]))
            .set_result(state, SHELL_SR, "sand", ResultBuffer::F32(shell_sand))
            .set_result(state, SHELL_SR, "es_1a", ResultBuffer::F32(es.clone()))
            .set_result(state, MAT_SR, "matke", ResultBuffer::F32(vec![100.0, 200.0]))
            .set_result(state, GLOB_SR, "ke", ResultBuffer::F64(vec![42.0]));
    }

    db
}

/// Two mesh variant of the fixture
///
/// The second mesh shares the node class and has no beam, so its shells start
/// at cell 0 and its bricks at cell 2. Materials of its cells are 2, 1, 3, 2, 1.
pub fn two_mesh_sidecar() -> Value {
    let mut root = sidecar(1);
    root["Number_of_Meshes"] = json!(2);
    root
}

pub fn two_mesh_database() -> MemoryDatabase {
    let mut db = database(true);
    db.add_nodes(1, "node", 3, initial_positions())
        .add_cells(1, Superclass::Quad, "shell", (0..8).collect(), vec![2, 1])
        .add_cells(
            1,
            Superclass::Hex,
            "brick",
            vec![
                0, 1, 2, 3, 4, 5, 6, 7, //
                5, 5, 5, 5, 5, 5, 5, 5, //
                0, 1, 2, 2, 4, 4, 4, 4, //
            ],
            vec![3, 2, 1],
        )
        .add_class(1, Superclass::Mat, "mat", 3)
        .add_class(1, Superclass::Mesh, "glob", 1);
    db
}

/// A planar family of one unit quad, moved by 5 in x and y at the second state
pub fn planar_sidecar() -> Value {
    json!({
        "Domains": 1,
        "Dimensions": 2,
        "States": {"count": 2, "times": [0.0, 1.0]},
        "Variables": {
            "nodpos": {"Center": "node", "vector_size": 2, "agg_type": 1,
                       "vector_components": ["ux", "uy"]}
        },
        "Classes": {
            "node": {"SuperClass": 1, "count": 4, "variables": ["nodpos"]},
            "shell": {"SuperClass": 5, "count": 1, "variables": []}
        }
    })
}

pub fn planar_database() -> MemoryDatabase {
    let initial = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    let moved = initial.iter().map(|v| v + 5.0).collect();

    let mut db = MemoryDatabase::new();
    db.add_nodes(0, "node", 2, initial.clone())
        .add_cells(0, Superclass::Quad, "shell", vec![0, 1, 2, 3], vec![1]);
    let sr = db.add_subrecord("node_sr", "node", vec![(1, 4)], &["nodpos"]);
    db.set_result(1, sr, "nodpos", ResultBuffer::F32(initial))
        .set_result(2, sr, "nodpos", ResultBuffer::F32(moved));
    db
}

/// Sidecar written to a fresh directory and the fixture family in memory
///
/// The directory is removed once the returned guard goes out of scope.
pub fn open_fixture(tag: &str) -> (MiliFileFormat, mili::library::CallCounters, TempDir) {
    open_with(tag, database(true))
}

pub fn open_with(
    tag: &str,
    db: MemoryDatabase,
) -> (MiliFileFormat, mili::library::CallCounters, TempDir) {
    open_sidecar(tag, &sidecar(1), db)
}

/// Like [open_with] for any sidecar, the family stored under [ROOT]
pub fn open_sidecar(
    tag: &str,
    root: &Value,
    db: MemoryDatabase,
) -> (MiliFileFormat, mili::library::CallCounters, TempDir) {
    let dir = scratch_dir(tag);
    let path = write_sidecar(dir.path(), root);

    let mut library = MemoryLibrary::new();
    library.insert(ROOT, db);
    let counters = library.counters();

    let format = MiliFileFormat::open(&path, library).unwrap();
    (format, counters, dir)
}

/// True when every value of a tuple is NaN
pub fn is_absent(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_nan())
}
