use rastercam_camtools::{load_json, save_json, save_paths, save_svg, CamToolError, SvgOptions};
use rastercam_core::{Path, Point3};
use tempfile::tempdir;

fn sample_paths() -> Vec<Path> {
    vec![
        Path::closed(vec![
            Point3::xy(1.0, 1.0),
            Point3::xy(4.0, 1.0),
            Point3::xy(4.0, 3.0),
        ]),
        Path::open(vec![Point3::new(0.0, 0.0, 1.5), Point3::new(2.0, 5.0, 0.25)]),
    ]
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("paths.json");
    let paths = sample_paths();

    save_json(&file, &paths).unwrap();
    let loaded = load_json(&file).unwrap();
    assert_eq!(loaded, paths);
}

#[test]
fn test_svg_file_has_one_element_per_path() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("paths.svg");

    save_svg(&file, &sample_paths(), &SvgOptions { border: 0.1, stroke: 0.2 }).unwrap();
    let svg = std::fs::read_to_string(&file).unwrap();

    assert!(svg.starts_with("<?xml"));
    assert_eq!(svg.matches("<path").count(), 2);
    assert_eq!(svg.matches(" Z").count(), 1);
    assert!(svg.contains("stroke-width:0.2"));
}

#[test]
fn test_load_missing_json() {
    let dir = tempdir().unwrap();
    assert!(load_json(dir.path().join("absent.json")).is_err());
}

#[test]
fn test_save_paths_picks_format() {
    let dir = tempdir().unwrap();
    let paths = sample_paths();

    save_paths(dir.path().join("out.json"), &paths, &SvgOptions::default()).unwrap();
    assert_eq!(load_json(dir.path().join("out.json")).unwrap(), paths);

    save_paths(dir.path().join("out.svg"), &paths, &SvgOptions::default()).unwrap();
    assert!(dir.path().join("out.svg").exists());

    let err = save_paths(dir.path().join("out.nc"), &paths, &SvgOptions::default()).unwrap_err();
    assert!(matches!(err, CamToolError::InvalidParameters(_)));
}
