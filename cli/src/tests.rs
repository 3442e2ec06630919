use super::*;
use std::fs;
use tempfile::tempdir;

fn parse(args: &[&str]) -> Cli {
    let mut full = vec!["varmatrix"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).expect("parse cli")
}

#[test]
fn no_arguments_runs_everything() {
    let cli = parse(&[]);
    assert!(cli.groups.is_empty());
    assert!(!cli.dry_run);
    assert!(!cli.list);
    assert!(!cli.strict);
}

#[test]
fn groups_accept_commas_and_repeats() {
    let cli = parse(&["-g", "LBM,MLBM", "--group", "extra"]);
    assert_eq!(cli.groups, ["LBM", "MLBM", "extra"]);
}

#[test]
fn json_and_ndjson_conflict() {
    let parsed = Cli::try_parse_from(["varmatrix", "--json", "--ndjson"]);
    assert!(parsed.is_err());
}

#[test]
fn list_and_dry_run_conflict() {
    let parsed = Cli::try_parse_from(["varmatrix", "--list", "--dry-run"]);
    assert!(parsed.is_err());
}

#[test]
fn falls_back_to_reference_matrix() {
    let tmp = tempdir().expect("tempdir");
    let config = resolve_config(None, tmp.path()).expect("resolve");

    assert_eq!(config.groups.len(), 2);
    assert_eq!(config.groups[0].config_dir, tmp.path().join("LBM/src"));
    assert_eq!(config.groups[1].build_dir, tmp.path().join("MLBM/src"));
}

#[test]
fn prefers_local_config_file() {
    let tmp = tempdir().expect("tempdir");
    fs::write(
        tmp.path().join(DEFAULT_CONFIG_FILE),
        "model_tag = \"D2Q9\"\n[[group]]\nname = \"only\"\nconfig_dir = \"v\"\nbuild_dir = \"b\"\n",
    )
    .expect("write config");

    let config = resolve_config(None, tmp.path()).expect("resolve");
    assert_eq!(config.model_tag, "D2Q9");
    assert_eq!(config.groups.len(), 1);
    assert_eq!(config.groups[0].build_dir, tmp.path().join("b"));
}

#[test]
fn explicit_config_must_exist() {
    let tmp = tempdir().expect("tempdir");
    let err = resolve_config(Some(Path::new("missing.toml")), tmp.path()).expect_err("missing");
    assert!(format!("{err:#}").contains("missing.toml"));
}

#[test]
fn list_prints_padded_labels() {
    let plans = vec![
        GroupPlan {
            group: "LBM".to_string(),
            variants: vec![0, 12],
        },
        GroupPlan {
            group: "MLBM".to_string(),
            variants: vec![],
        },
    ];
    let mut buf = Vec::new();
    write_plans(&plans, &VariantNaming::default(), false, &mut buf).expect("write");

    let text = String::from_utf8(buf).expect("utf8");
    assert_eq!(text, "LBM: 000 012\nMLBM: (no variants)\n");
}

#[test]
fn dry_run_reports_without_building() {
    let tmp = tempdir().expect("tempdir");
    let vars = tmp.path().join("LBM/src");
    fs::create_dir_all(&vars).expect("mkdir");
    fs::create_dir_all(tmp.path().join("MLBM")).expect("mkdir");
    fs::write(vars.join("var_001.h"), b"cfg").expect("write");

    let cli = parse(&["--dry-run", "--ndjson"]);
    let mut buf = Vec::new();
    let code = execute(&cli, tmp.path(), &mut buf).expect("execute");

    assert_eq!(code, 0);
    let text = String::from_utf8(buf).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(lines[0]).expect("json");
    assert_eq!(value["group"], "LBM");
    assert_eq!(value["label"], "001");
    assert_eq!(value["outcome"]["status"], "skipped");
    assert!(!tmp.path().join("LBM/src/CUDA/var.h").exists());
}
