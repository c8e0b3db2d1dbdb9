use thermo_config::{ModelKind, load_toml, validate_horizons};

#[test]
fn rejects_zero_min_run() {
    let toml = r#"
[dedup]
min_run = 0
tol = 1e-9
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject min_run=0");
    assert!(format!("{err}").to_lowercase().contains("min_run must be >= 1"));
}

#[test]
fn rejects_inverted_physical_range() {
    let toml = r#"
[preprocess]
min_temp = 60.0
max_temp = -20.0
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject inverted range");
    assert!(format!("{err}").contains("min_temp must be < preprocess.max_temp"));
}

#[test]
fn rejects_out_of_range_test_fraction() {
    let cfg = load_toml("[split]\ntest_fraction = 1.0\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject test_fraction=1");
    assert!(format!("{err}").contains("test_fraction must be in (0.0, 1.0)"));
}

#[test]
fn rejects_unsorted_horizons() {
    let cfg = load_toml("[forecast]\nhorizons = [30, 15]\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject unsorted horizons");
    assert!(format!("{err}").contains("strictly increasing"));
    assert!(validate_horizons(&[]).is_err());
    assert!(validate_horizons(&[0, 15]).is_err());
}

#[test]
fn rejects_unknown_rotation() {
    let cfg = load_toml("[logging]\nrotation = \"weekly\"\n").expect("parse TOML");
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[data]
path = "data/readings.csv"
filter_hours = 0

[dedup]
min_run = 4
tol = 0.001

[preprocess]
min_temp = -10.0
max_temp = 50.0
flat_delta = 0.05
flat_cap = 2
min_rows = 20

[split]
test_fraction = 0.25
seed = 7

[model]
kind = "decision_tree"
max_depth = 6
min_samples_split = 4
min_samples_leaf = 2
seed = 1

[forecast]
horizons = [10, 20, 30]

[logging]
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.model.kind, ModelKind::DecisionTree);
    assert_eq!(cfg.forecast.horizons, vec![10, 20, 30]);
    assert_eq!(cfg.data.filter_hours, 0);
}

#[test]
fn unknown_model_kind_fails_to_parse() {
    assert!(load_toml("[model]\nkind = \"svm\"\n").is_err());
}

#[test]
fn sample_config_is_valid() {
    let cfg = load_toml(include_str!("../../etc/thermocast.toml")).expect("parse sample");
    cfg.validate().expect("sample config should pass");
    assert_eq!(cfg.forecast.horizons, vec![15, 30, 45, 60]);
    assert_eq!(cfg.model.kind, ModelKind::RandomForest);
}
