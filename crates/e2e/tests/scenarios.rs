//! Runs the bundled scenarios as ordinary tests

use std::path::PathBuf;

use formgate_e2e::{RunnerConfig, ScenarioRunner, TestSpec};

fn specs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("specs")
}

fn runner() -> ScenarioRunner {
    ScenarioRunner::with_config(RunnerConfig {
        config_path: None,
        specs_dir: specs_dir(),
        output_dir: PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("scenario-results"),
    })
    .unwrap()
}

#[test]
fn test_bundled_scenarios_pass() {
    let results = runner().run_all().unwrap();
    assert!(results.total >= 15, "only {} scenarios found", results.total);

    let failures: Vec<String> = results
        .results
        .iter()
        .filter(|r| !r.success)
        .map(|r| format!("{}: {}", r.name, r.error.as_deref().unwrap_or("?")))
        .collect();
    assert!(failures.is_empty(), "failing scenarios:\n{}", failures.join("\n"));
}

#[test]
fn test_scenario_names_are_unique() {
    let specs = TestSpec::load_all(&specs_dir()).unwrap();
    let mut names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    let before = names.len();
    names.dedup();
    assert_eq!(names.len(), before);
}

#[test]
fn test_every_scenario_targets_a_builtin_form() {
    let runner = runner();
    let forms: Vec<&str> = runner.layouts().names().collect();
    for spec in TestSpec::load_all(&specs_dir()).unwrap() {
        assert!(
            forms.contains(&spec.form.as_str()),
            "{} targets unknown form {}",
            spec.name,
            spec.form
        );
    }
}

#[test]
fn test_location_tag_selects_form_3_only() {
    let results = runner().run_tagged("location").unwrap();
    assert!(results.total > 0);
    assert_eq!(results.failed, 0);
    assert!(results.results.iter().all(|r| r.form == "registration_form_3"));
}
