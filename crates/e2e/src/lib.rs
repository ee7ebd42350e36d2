//! Formgate E2E Test Framework
//!
//! Plays declarative YAML scenarios against the registration forms without a
//! browser:
//! - Parses scenario specs (`fill`, `click`, `select`, `check`, `assert`, ...)
//! - Resolves CSS-like selectors against a form layout
//! - Drives a [`formgate_common::Form`] and checks its derived status
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── run_all() / run_tagged(tag) / run_test(name)         │
//! │    ├── run_spec(spec: TestSpec) -> TestResult               │
//! │    └── write_results(results) -> test-results.json         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FormSession                                                │
//! │    ├── Selector::parse(s).resolve(layout) -> Element        │
//! │    └── execute_step(step) -> StepResult                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestSpec (YAML)                                            │
//! │    ├── name, description, tags, form                        │
//! │    └── steps: [Step]                                        │
//! │          ├── fill { selector, value }                       │
//! │          ├── select { selector, value | index }             │
//! │          ├── check / uncheck { selector, value? }           │
//! │          ├── blur, click { selector }, submit               │
//! │          └── assert { selector, visible?, enabled?, ... }   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod args;
pub mod error;
pub mod runner;
pub mod selector;
pub mod session;
pub mod spec;

pub use args::strip_libtest_args;
pub use error::{E2eError, E2eResult};
pub use runner::{RunnerConfig, ScenarioRunner, TestResult, TestSuiteResult};
pub use session::{FormSession, StepResult};
pub use spec::{TestSpec, TestStep};
