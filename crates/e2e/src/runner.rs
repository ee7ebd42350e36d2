//! Test runner that plays YAML scenarios against the registration forms

use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use formgate_common::{FormConfig, Layouts};

use crate::error::{E2eError, E2eResult};
use crate::session::{FormSession, StepResult};
use crate::spec::TestSpec;

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub form: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

/// Result of running all tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_single(result: TestResult) -> Self {
        let passed = usize::from(result.success);
        Self {
            total: 1,
            passed,
            failed: 1 - passed,
            duration_ms: result.duration_ms,
            results: vec![result],
        }
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Form data file; built-in data when `None` or missing
    pub config_path: Option<PathBuf>,
    pub specs_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            specs_dir: PathBuf::from("specs"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Scenario runner
pub struct ScenarioRunner {
    layouts: Layouts,
    specs_dir: PathBuf,
    output_dir: PathBuf,
}

impl ScenarioRunner {
    /// Create a runner over the built-in forms and default data
    pub fn new() -> E2eResult<Self> {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> E2eResult<Self> {
        let form_config = match &config.config_path {
            Some(path) => FormConfig::load(path)?,
            None => FormConfig::default(),
        };
        Ok(Self {
            layouts: Layouts::builtin(&form_config)?,
            specs_dir: config.specs_dir,
            output_dir: config.output_dir,
        })
    }

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    /// Run all tests in the specs directory
    pub fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.specs_dir)?;
        Ok(self.run_specs(&specs))
    }

    /// Run tests matching a tag
    pub fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.specs_dir)?;
        let filtered: Vec<TestSpec> = TestSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
        Ok(self.run_specs(&filtered))
    }

    /// Run a specific test by name
    pub fn run_test(&self, name: &str) -> E2eResult<TestResult> {
        let specs = TestSpec::load_all(&self.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Test not found: {}", name)))?;

        self.run_spec(&spec)
    }

    /// Run a list of test specs
    pub fn run_specs(&self, specs: &[TestSpec]) -> TestSuiteResult {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} test(s)...", specs.len());

        for spec in specs {
            match self.run_spec(spec) {
                Ok(result) => {
                    if result.success {
                        passed += 1;
                        info!("✓ {} ({} ms)", result.name, result.duration_ms);
                    } else {
                        failed += 1;
                        error!(
                            "✗ {} - {}",
                            result.name,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", spec.name, e);
                    results.push(TestResult {
                        name: spec.name.clone(),
                        form: spec.form.clone(),
                        success: false,
                        duration_ms: 0,
                        steps: vec![],
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        TestSuiteResult {
            total: specs.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run a single test spec on a fresh form
    pub fn run_spec(&self, spec: &TestSpec) -> E2eResult<TestResult> {
        let start = Instant::now();
        debug!("Running test: {} on {}", spec.name, spec.form);

        let layout = self.layouts.get(&spec.form)?;
        let mut session = FormSession::new(layout);

        let mut step_results = Vec::new();
        let mut test_error: Option<String> = None;

        for step in &spec.steps {
            let result = session.execute_step(step);

            if !result.success {
                test_error = result
                    .error
                    .as_ref()
                    .map(|e| format!("{}: {}", result.step_name, e));
                step_results.push(result);
                break; // Stop on first failure
            }

            step_results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let success = test_error.is_none();

        Ok(TestResult {
            name: spec.name.clone(),
            form: spec.form.clone(),
            success,
            duration_ms,
            steps: step_results,
            error: test_error,
        })
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
