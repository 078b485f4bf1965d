mod common;

use common::*;
use mili::metadata::{Centering, VariableShape};
use mili::MiliError;

use serde_json::json;

#[test]
fn shared_variables_are_published_once() {
    let (mut format, _, _dir) = open_fixture("published");
    let md = format.populate_database_metadata();

    assert_eq!(md.count_variable("Primal/Shared/sx"), 1);
    assert_eq!(md.count_variable("Primal/Shared/sand"), 1);
    assert_eq!(md.count_variable("Primal/brick/sx"), 0);
    assert_eq!(md.count_variable("Primal/shell/sx"), 0);

    // a second pass starts from scratch
    let again = format.populate_database_metadata();
    assert_eq!(again, md);
}

#[test]
fn every_variable_kind_gets_a_path() {
    let (mut format, _, _dir) = open_fixture("paths");
    let md = format.populate_database_metadata();

    let published: Vec<&str> = md
        .variables
        .iter()
        .filter(|v| v.mesh_name == "mesh1")
        .map(|v| v.path.as_str())
        .collect();
    assert_eq!(
        published,
        vec![
            "Primal/node/nodpos",
            "Primal/Shared/sx",
            "Primal/Shared/sand",
            "Primal/shell/eps",
            "Primal/shell/sig",
            "Primal/brick/stress",
            "Primal/mat/matke",
            "Primal/glob/ke",
            "OriginalZoneLabels",
            "OriginalNodeLabels",
        ]
    );

    let stress = md.variable("Primal/brick/stress").unwrap();
    assert_eq!(stress.shape, Some(VariableShape::SymmetricTensor));
    assert_eq!(stress.n_components, 9);

    let sig = md.variable("Primal/shell/sig").unwrap();
    assert_eq!(sig.shape, Some(VariableShape::Vector));
    assert_eq!(sig.centering, Centering::Zone);

    let labels = md.variable("OriginalNodeLabels").unwrap();
    assert!(labels.is_label());
    assert_eq!(labels.centering, Centering::Node);
}

#[test]
fn sanded_meshes_are_published_twice() {
    let (mut format, _, _dir) = open_fixture("sanded");
    let md = format.populate_database_metadata();

    assert_eq!(md.meshes.len(), 2);
    assert!(md.mesh("mesh1").unwrap().is_ghosted);
    assert!(!md.mesh("sand_mesh1").unwrap().is_ghosted);

    let sand_sx = md.variable("sand_mesh/Primal/Shared/sx").unwrap();
    assert_eq!(sand_sx.mesh_name, "sand_mesh1");
    assert!(md.variable("sand_mesh/OriginalZoneLabels").is_none());
    assert_eq!(
        md.variables.iter().filter(|v| v.mesh_name == "sand_mesh1").count(),
        8
    );
}

#[test]
fn vector_components_become_expressions() {
    let (mut format, _, _dir) = open_fixture("expressions");
    let md = format.populate_database_metadata();

    let uz = md.expression("Primal/node/nodpos/uz").unwrap();
    assert_eq!(uz.definition, "<Primal/node/nodpos>[2]");

    // symmetric components index into the expanded tensor
    let xy = md.expression("Primal/brick/stress/xy").unwrap();
    assert_eq!(xy.definition, "<Primal/brick/stress>[1]");
    let zx = md.expression("Primal/brick/stress/zx").unwrap();
    assert_eq!(zx.definition, "<Primal/brick/stress>[6]");

    assert_eq!(md.expressions.len(), 9);
}

#[test]
fn materials_and_states_are_summarised() {
    let (mut format, _, _dir) = open_fixture("summary");
    let md = format.populate_database_metadata();

    let set = &md.material_sets[0];
    assert_eq!(set.name, "materials1");
    assert_eq!(set.names, vec!["steel", "foam", "mat3"]);
    assert_eq!(set.colours[0], "#ff0000");
    assert_eq!(set.colours[2].len(), 7);

    assert_eq!(md.cycles, vec![0, 1]);
    assert_eq!(md.times, vec![0.0, 5.0e-4]);
    assert_eq!(format.n_timesteps(), 2);
}

#[test]
fn metadata_needs_no_open_database() {
    let (mut format, counters, _dir) = open_fixture("lazy");
    format.populate_database_metadata();
    assert_eq!(counters.opens(), 0);
    assert!(!format.is_db_open(0));
}

#[test]
fn multiple_meshes_prefix_their_paths() {
    let dir = scratch_dir("multimesh");
    let mut root = sidecar(1);
    root["Number_of_Meshes"] = json!(2);
    let path = write_sidecar(dir.path(), &root);

    let mut format =
        mili::MiliFileFormat::open(&path, mili::library::MemoryLibrary::new()).unwrap();
    let md = format.populate_database_metadata();

    assert_eq!(md.count_variable("Primal (mesh1)/Shared/sx"), 1);
    assert_eq!(md.count_variable("Primal (mesh2)/Shared/sx"), 1);
    assert!(md.variable("mesh2/OriginalZoneLabels").is_some());
    assert!(md.mesh("sand_mesh2").is_some());
}

#[test]
fn legacy_sidecars_are_not_compliant() {
    let dir = scratch_dir("legacy");
    let path = dir.path().join("old.mili");
    std::fs::write(&path, "MILI\x00\x01 binary").unwrap();

    let result = mili::MiliFileFormat::open(&path, mili::library::MemoryLibrary::new());
    assert!(matches!(result, Err(MiliError::NonCompliantFile { .. })));
}
