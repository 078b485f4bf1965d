mod common;

use common::*;
use mili::library::{MemoryLibrary, Superclass};
use mili::mesh::ghost::*;
use mili::mesh::CellType;
use mili::{MiliError, MiliFileFormat};

#[test]
fn degenerate_cells_collapse_in_mesh_order() {
    let (mut format, _, _dir) = open_fixture("cells");
    let mesh = format.get_mesh(0, 0, "mesh1").unwrap();

    let kinds: Vec<CellType> = mesh.cells.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CellType::Line,
            CellType::Quad,
            CellType::Quad,
            CellType::Hexahedron,
            CellType::Vertex,
            CellType::Tetra,
        ]
    );
    assert_eq!(mesh.cells[0].nodes, vec![0, 1]);
    assert_eq!(mesh.cells[4].nodes, vec![5]);
    assert_eq!(mesh.cells[5].nodes, vec![0, 1, 2, 4]);
    assert_eq!(mesh.n_points(), N_NODES);
}

#[test]
fn node_positions_follow_the_state() {
    let (mut format, _, _dir) = open_fixture("positions");

    let first = format.get_mesh(0, 0, "mesh1").unwrap();
    assert_eq!(first.point(3), Some([3.0, 6.0, 9.0]));

    let second = format.get_mesh(1, 0, "mesh1").unwrap();
    assert_eq!(second.point(3), Some([4.0, 6.0, 9.0]));

    // the baseline mesh is never modified
    let again = format.get_mesh(0, 0, "mesh1").unwrap();
    assert_eq!(again.point(3), Some([3.0, 6.0, 9.0]));
}

#[test]
fn sand_ghosts_zones_at_or_below_half() {
    let (mut format, _, _dir) = open_fixture("ghosts");
    let mesh = format.get_mesh(1, 0, "mesh1").unwrap();

    let z = ZONE_NOT_APPLICABLE_TO_PROBLEM;
    assert_eq!(mesh.cell_flags(GHOST_ZONES), Some(&[0, z, 0, 0, z, 0][..]));

    // nodes 8 and 9 belong to no live zone, the beam orientation node included
    let n = NODE_NOT_APPLICABLE_TO_PROBLEM;
    assert_eq!(
        mesh.point_flags(GHOST_NODES),
        Some(&[0, 0, 0, 0, 0, 0, 0, 0, n, n][..])
    );
}

#[test]
fn nothing_is_ghosted_while_every_zone_lives() {
    let (mut format, _, _dir) = open_fixture("alive");
    let mesh = format.get_mesh(0, 0, "mesh1").unwrap();
    assert_eq!(mesh.cell_flags(GHOST_ZONES), Some(&[0; N_CELLS][..]));
}

#[test]
fn sand_mesh_variant_never_carries_ghosts() {
    let (mut format, _, _dir) = open_fixture("sandmesh");
    let mesh = format.get_mesh(1, 0, "sand_mesh1").unwrap();

    assert!(mesh.cell_array(GHOST_ZONES).is_none());
    assert!(mesh.point_array(GHOST_NODES).is_none());
    assert_eq!(mesh.n_cells(), N_CELLS);
}

#[test]
fn families_without_sand_are_not_ghosted() {
    let dir = scratch_dir("nosand");
    let mut root = sidecar(1);
    for class in ["shell", "brick"] {
        let vars = root["Classes"][class]["variables"].as_array_mut().unwrap();
        vars.retain(|v| v != "sand");
    }
    let path = write_sidecar(dir.path(), &root);

    let mut library = MemoryLibrary::new();
    library.insert(ROOT, database(true));
    let mut format = MiliFileFormat::open(&path, library).unwrap();

    let mesh = format.get_mesh(1, 0, "mesh1").unwrap();
    assert!(mesh.cell_array(GHOST_ZONES).is_none());
}

#[test]
fn opening_and_reading_twice_calls_the_library_once() {
    let (mut format, counters, _dir) = open_fixture("idempotent");

    format.open_db(0).unwrap();
    format.open_db(0).unwrap();
    assert_eq!(counters.opens(), 1);
    assert!(format.is_db_open(0));

    format.read_mesh(0).unwrap();
    let loads = counters.conn_loads();
    assert_eq!(loads, 3);
    format.read_mesh(0).unwrap();
    format.get_mesh(0, 0, "mesh1").unwrap();
    assert_eq!(counters.conn_loads(), loads);
    assert_eq!(counters.opens(), 1);
    assert!(format.is_mesh_read(0));
}

#[test]
fn every_open_handle_is_closed_once_on_drop() {
    let (mut format, counters, _dir) = open_fixture("drop");
    format.read_mesh(0).unwrap();
    drop(format);
    assert_eq!(counters.closes(), 1);

    let (format, counters, _dir) = open_fixture("drop_unopened");
    drop(format);
    assert_eq!(counters.closes(), 0);
}

#[test]
fn domain_files_are_probed_by_suffix_width() {
    let dir = scratch_dir("suffixes");
    let path = write_sidecar(dir.path(), &sidecar(2));

    let mut library = MemoryLibrary::new();
    library.insert("d3samp0000", database(true));
    library.insert("d3samp0001", database(true));
    let counters = library.counters();

    let mut format = MiliFileFormat::open(&path, library).unwrap();
    format.open_db(1).unwrap();
    assert_eq!(counters.opens(), 1);
    assert!(!format.is_db_open(0));
    assert!(format.is_db_open(1));

    let mesh = format.get_mesh(0, 0, "mesh1").unwrap();
    assert_eq!(mesh.n_cells(), N_CELLS);
}

#[test]
fn missing_domain_files_name_the_last_candidate() {
    let dir = scratch_dir("missing");
    let path = write_sidecar(dir.path(), &sidecar(2));

    let mut library = MemoryLibrary::new();
    library.insert("d3samp000", database(true));
    let mut format = MiliFileFormat::open(&path, library).unwrap();

    format.open_db(0).unwrap();
    match format.open_db(1) {
        Err(MiliError::InvalidFiles(name)) => assert_eq!(name, "d3samp000001"),
        other => panic!("expected InvalidFiles, got {other:?}"),
    }
}

#[test]
fn multiple_state_record_formats_are_refused() {
    let mut db = database(true);
    db.srec_formats = 2;
    let (mut format, counters, _dir) = open_with("srec", db);

    let result = format.open_db(0);
    assert!(matches!(result, Err(MiliError::ImproperUse(_))));
    assert!(!format.is_db_open(0));
    assert_eq!(counters.closes(), 1);
}

#[test]
fn out_of_range_domains_are_improper_use() {
    let (mut format, _, _dir) = open_fixture("domain");
    assert!(matches!(format.open_db(1), Err(MiliError::ImproperUse(_))));
    assert!(matches!(
        format.get_mesh(0, 4, "mesh1"),
        Err(MiliError::ImproperUse(_))
    ));
}

#[test]
fn connectivity_outside_the_node_class_is_an_error() {
    let mut db = database(true);
    db.add_cells(0, Superclass::Tri, "skin", vec![0, 1, 10], vec![1]);
    let (mut format, _, _dir) = open_with("badconn", db);

    assert!(matches!(
        format.read_mesh(0),
        Err(MiliError::InvalidVariable { .. })
    ));
    assert!(!format.is_mesh_read(0));
}

#[test]
fn zone_labels_carry_their_class() {
    let (mut format, _, _dir) = open_fixture("zonelabels");
    let array = format.get_var(0, 0, "OriginalZoneLabels").unwrap();
    let labels = array.as_labels().unwrap();

    assert_eq!(labels.n_tuples(), N_CELLS);
    assert_eq!(labels.width(), "brick 101".len() + 1);

    let text: Vec<String> = (0..N_CELLS).map(|i| labels.label(i).unwrap()).collect();
    assert_eq!(
        text,
        vec!["beam 1", "shell 7", "shell 20", "brick 101", "brick 102", "brick 103"]
    );

    assert_eq!(labels.element_id_for_label("brick", 103), Some(5));
    assert_eq!(labels.element_id_for_label("shell", 20), Some(2));
    assert_eq!(labels.element_id_for_label("shell", 8), None);
    assert_eq!(
        labels.class_names().collect::<Vec<_>>(),
        vec!["beam", "shell", "brick"]
    );
}

#[test]
fn missing_node_labels_are_numbered_from_one() {
    let (mut format, _, _dir) = open_fixture("nodelabels");
    let array = format.get_var(0, 0, "OriginalNodeLabels").unwrap();
    let labels = array.as_labels().unwrap();

    assert_eq!(labels.n_tuples(), N_NODES);
    assert_eq!(labels.width(), 3);
    assert_eq!(labels.label(0).unwrap(), "1");
    assert_eq!(labels.label(9).unwrap(), "10");
    assert_eq!(&labels.as_bytes()[..3], b"1\0\0");
}

#[test]
fn second_meshes_are_read_with_their_own_cells() {
    let (mut format, _, _dir) = open_sidecar("twomesh", &two_mesh_sidecar(), two_mesh_database());

    let first = format.get_mesh(1, 0, "mesh1").unwrap();
    assert_eq!(first.n_cells(), N_CELLS);

    let second = format.get_mesh(1, 0, "mesh2").unwrap();
    assert_eq!(second.n_cells(), 5);
    assert_eq!(second.cells[0].kind, CellType::Quad);
    assert_eq!(second.point(3), Some([4.0, 6.0, 9.0]));

    // shell 7 and brick 102 are destroyed at the second state
    let z = ZONE_NOT_APPLICABLE_TO_PROBLEM;
    assert_eq!(second.cell_flags(GHOST_ZONES), Some(&[z, 0, 0, z, 0][..]));
}

#[test]
fn planar_nodes_are_lifted_and_moved_per_state() {
    let (mut format, _, _dir) = open_sidecar("planar", &planar_sidecar(), planar_database());

    let first = format.get_mesh(0, 0, "mesh1").unwrap();
    assert_eq!(
        first.points,
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]
    );

    let second = format.get_mesh(1, 0, "mesh1").unwrap();
    assert_eq!(
        second.points,
        vec![5.0, 5.0, 0.0, 6.0, 5.0, 0.0, 6.0, 6.0, 0.0, 5.0, 6.0, 0.0]
    );
    assert_eq!(second.n_cells(), 1);
}
