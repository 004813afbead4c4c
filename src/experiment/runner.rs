// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 cellrun contributors

//! Experiment runner
//!
//! Creates the cell directory, then runs generate → run → validate one
//! after another. The first step that fails ends the run; later steps are
//! never started.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{CellId, CellLayout, Invocation, Step};
use crate::config::ExperimentConfig;
use crate::errors::CellrunError;
use crate::executors::{Executor, ProcessExecutor};
use crate::utils;

/// Runner options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only show what would be done
    pub dry_run: bool,
}

/// Where a run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Generating,
    Running,
    Validating,
    Succeeded,
    Failed {
        step: Step,
        exit_code: Option<i32>,
    },
}

impl RunState {
    /// State while `step` is executing
    fn active(step: Step) -> Self {
        match step {
            Step::Generate => RunState::Generating,
            Step::Run => RunState::Running,
            Step::Validate => RunState::Validating,
        }
    }

    /// Whether the run has ended, one way or the other
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed { .. })
    }
}

/// Outcome of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub command: String,
    pub exit_code: Option<i32>,
    pub success: bool,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Why the collaborator could not be started, if it could not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report of a whole cell run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub cell: CellId,
    pub directory: PathBuf,
    pub input_json: PathBuf,
    pub output_json: PathBuf,
    #[serde(flatten)]
    pub state: RunState,
    pub steps: Vec<StepOutcome>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

impl RunReport {
    fn new(cell: &CellId, layout: &CellLayout) -> Self {
        Self {
            cell: cell.clone(),
            directory: layout.dir.clone(),
            input_json: layout.input_json.clone(),
            output_json: layout.output_json.clone(),
            state: RunState::NotStarted,
            steps: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// The error describing a failed run, if it failed
    pub fn error(&self) -> Option<CellrunError> {
        match self.state {
            RunState::Failed { step, exit_code } => {
                Some(CellrunError::step_failed(step, exit_code))
            }
            _ => None,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<(), CellrunError> {
        let content = serde_json::to_string_pretty(self)?;

        std::fs::write(path, content).map_err(|e| CellrunError::ReportWrite {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}

/// Runs a cell through generate, run and validate
pub struct ExperimentRunner {
    config: ExperimentConfig,
    working_dir: PathBuf,
    executor: Box<dyn Executor>,
}

impl ExperimentRunner {
    /// Create a runner that spawns real child processes
    pub fn new(config: ExperimentConfig, working_dir: PathBuf) -> Self {
        Self {
            config,
            working_dir,
            executor: Box::new(ProcessExecutor::new()),
        }
    }

    /// Replace the executor
    pub fn with_executor(mut self, executor: Box<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Derive the layout and the three invocations for a cell
    pub fn plan(&self, cell: &CellId) -> (CellLayout, Vec<Invocation>) {
        let layout = CellLayout::from_config(&self.config, cell);
        let invocations = Step::ALL
            .iter()
            .map(|step| step.invocation(&self.config, cell, &layout))
            .collect();

        (layout, invocations)
    }

    /// Run a cell
    ///
    /// Returns `Err` only when the cell directory could not be created. A
    /// collaborator exiting non-zero, or one that cannot be started, ends
    /// the run in [`RunState::Failed`].
    pub async fn run(&self, cell: &CellId, options: &RunOptions) -> Result<RunReport, CellrunError> {
        let start = Instant::now();
        let (layout, invocations) = self.plan(cell);
        let mut report = RunReport::new(cell, &layout);

        utils::print_header(&format!("Cell {}", cell));
        utils::print_field("dir", &layout.dir.display().to_string());

        if options.dry_run {
            self.print_plan(&invocations);
            return Ok(report);
        }

        eprintln!();

        layout.ensure_dir(&self.working_dir)?;
        debug!("cell directory ready: {}", layout.dir.display());

        for invocation in &invocations {
            let step = invocation.step;
            report.state = RunState::active(step);
            debug!("state: {:?}", report.state);

            utils::print_step_start(step.description(), &invocation.command_line());

            let result = match self
                .executor
                .execute(invocation, &self.working_dir, &self.config.env)
                .await
            {
                Ok(result) => result,
                Err(err) => {
                    // Could not start: fails the step the way a shell would
                    let exit_code = i32::from(err.exit_code());
                    utils::print_step_failure(&step.to_string(), Some(exit_code));
                    warn!("step '{}' could not be started: {}", step, err);

                    report.steps.push(StepOutcome {
                        step,
                        command: invocation.command_line(),
                        exit_code: Some(exit_code),
                        success: false,
                        duration: Duration::ZERO,
                        error: Some(err.to_string()),
                    });
                    report.state = RunState::Failed {
                        step,
                        exit_code: Some(exit_code),
                    };

                    eprintln!("{:?}", miette::Report::new(err));
                    break;
                }
            };

            report.steps.push(StepOutcome {
                step,
                command: invocation.command_line(),
                exit_code: result.exit_code,
                success: result.success,
                duration: result.duration,
                error: None,
            });

            if !result.success {
                utils::print_step_failure(&step.to_string(), result.exit_code);
                warn!(
                    "step '{}' failed with {:?}, skipping remaining steps",
                    step, result.exit_code
                );
                report.state = RunState::Failed {
                    step,
                    exit_code: result.exit_code,
                };
                break;
            }

            utils::print_step_success(&step.to_string(), result.duration);
            info!("step '{}' finished in {:.2}s", step, result.duration.as_secs_f64());
            self.check_artifact(step, &layout);
        }

        if !report.state.is_terminal() {
            report.state = RunState::Succeeded;
        }
        report.duration = start.elapsed();

        let secs = report.duration.as_secs_f64();
        match report.state {
            RunState::Succeeded => {
                utils::print_summary(true, &format!("Cell {} validated in {:.2}s", cell, secs))
            }
            _ => utils::print_summary(false, &format!("Cell {} failed after {:.2}s", cell, secs)),
        }

        Ok(report)
    }

    /// Log when a step succeeded without leaving its artifact behind
    ///
    /// Never changes the outcome of the run.
    fn check_artifact(&self, step: Step, layout: &CellLayout) {
        let expected = match step {
            Step::Generate => &layout.input_json,
            Step::Run => &layout.output_json,
            Step::Validate => return,
        };

        if !self.working_dir.join(expected).exists() {
            warn!(
                "step '{}' succeeded but {} does not exist",
                step,
                expected.display()
            );
        }
    }

    fn print_plan(&self, invocations: &[Invocation]) {
        eprintln!();
        eprintln!("Execution plan (dry run, nothing is created or executed):");
        eprintln!();

        let mut missing = 0;
        for (i, invocation) in invocations.iter().enumerate() {
            let available = self.executor.check_available(invocation);
            if !available {
                missing += 1;
            }
            utils::print_planned(
                i + 1,
                invocation.step.description(),
                &invocation.command_line(),
                available,
            );
        }

        if missing > 0 {
            eprintln!();
            utils::print_warning(&format!(
                "{} program{} not found on PATH",
                missing,
                if missing == 1 { "" } else { "s" }
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GENERIC_FAILURE;
    use crate::executors::ExecutionResult;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Records invocations and answers with scripted exit codes
    #[derive(Clone, Default)]
    struct RecordingExecutor {
        calls: Arc<Mutex<Vec<Invocation>>>,
        exit_codes: HashMap<Step, Option<i32>>,
        unstartable: Option<Step>,
    }

    impl RecordingExecutor {
        fn failing(step: Step, exit_code: Option<i32>) -> Self {
            Self {
                exit_codes: HashMap::from([(step, exit_code)]),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        fn steps(&self) -> Vec<Step> {
            self.calls().iter().map(|c| c.step).collect()
        }
    }

    #[async_trait]
    impl Executor for RecordingExecutor {
        async fn execute(
            &self,
            invocation: &Invocation,
            _working_dir: &Path,
            _env: &HashMap<String, String>,
        ) -> Result<ExecutionResult, CellrunError> {
            self.calls.lock().unwrap().push(invocation.clone());

            if self.unstartable == Some(invocation.step) {
                return Err(CellrunError::tool_not_found(invocation.step, &invocation.program));
            }

            match self.exit_codes.get(&invocation.step) {
                Some(code) => Ok(ExecutionResult::failure(*code, Duration::from_millis(5))),
                None => Ok(ExecutionResult::success(Duration::from_millis(5))),
            }
        }

        fn check_available(&self, _invocation: &Invocation) -> bool {
            true
        }
    }

    fn runner(temp: &TempDir, executor: &RecordingExecutor) -> ExperimentRunner {
        ExperimentRunner::new(ExperimentConfig::default(), temp.path().to_path_buf())
            .with_executor(Box::new(executor.clone()))
    }

    fn exit_code(report: &RunReport) -> u8 {
        report.error().map_or(0, |err| err.exit_code())
    }

    fn cell(id: &str) -> CellId {
        CellId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_all_steps_succeed() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::default();

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(report.state, RunState::Succeeded);
        assert_eq!(exit_code(&report), 0);
        assert_eq!(executor.steps(), Step::ALL.to_vec());
        assert_eq!(report.steps.len(), 3);
        assert!(temp.path().join("test_data/specimen_42").is_dir());
    }

    #[tokio::test]
    async fn test_existing_directory_is_fine() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("test_data/specimen_42")).unwrap();
        let executor = RecordingExecutor::default();

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(report.state, RunState::Succeeded);
    }

    #[tokio::test]
    async fn test_generator_failure_stops_everything() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::failing(Step::Generate, Some(4));

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(executor.steps(), vec![Step::Generate]);
        assert_eq!(
            report.state,
            RunState::Failed {
                step: Step::Generate,
                exit_code: Some(4)
            }
        );
        assert_eq!(exit_code(&report), 4);
    }

    #[tokio::test]
    async fn test_runner_failure_skips_validation() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::failing(Step::Run, Some(2));

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(executor.steps(), vec![Step::Generate, Step::Run]);
        assert!(report.state.is_terminal());
        assert_ne!(report.state, RunState::Succeeded);
        assert_eq!(exit_code(&report), 2);
    }

    #[tokio::test]
    async fn test_validator_verdict_is_final() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::failing(Step::Validate, Some(1));

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(executor.steps(), Step::ALL.to_vec());
        assert_eq!(exit_code(&report), 1);
    }

    #[tokio::test]
    async fn test_signal_death_is_generic_failure() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::failing(Step::Run, None);

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(exit_code(&report), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_unstartable_collaborator_fails_its_step() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor {
            unstartable: Some(Step::Run),
            ..Default::default()
        };

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(executor.steps(), vec![Step::Generate, Step::Run]);
        assert_eq!(
            report.state,
            RunState::Failed {
                step: Step::Run,
                exit_code: Some(127)
            }
        );
        assert_eq!(exit_code(&report), 127);

        let failed = &report.steps[1];
        assert!(!failed.success);
        assert!(failed.error.as_deref().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_runner_gets_debug_and_cell_paths() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::default();
        runner(&temp, &executor)
            .run(&cell("595570553"), &RunOptions::default())
            .await
            .unwrap();

        let calls = executor.calls();
        let dir = "./test_data/specimen_595570553";
        let input = OsString::from(format!("{}/pipeline_input.json", dir));
        let output = OsString::from(format!("{}/pipeline_output.json", dir));

        assert_eq!(calls[0].step_args(), &[OsString::from("595570553")]);
        assert_eq!(
            calls[1].step_args(),
            &[
                OsString::from("--input_json"),
                input.clone(),
                OsString::from("--output_json"),
                output.clone(),
                OsString::from("--log_level"),
                OsString::from("DEBUG"),
            ]
        );
        assert_eq!(calls[2].step_args(), &[input, output]);
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::default();

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions { dry_run: true })
            .await
            .unwrap();

        assert!(executor.calls().is_empty());
        assert_eq!(report.state, RunState::NotStarted);
        assert!(!temp.path().join("test_data").exists());
    }

    #[tokio::test]
    async fn test_directory_failure_runs_nothing() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("test_data"), "not a directory").unwrap();
        let executor = RecordingExecutor::default();

        let err = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CellrunError::CreateDir { .. }));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_report_json() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::failing(Step::Run, Some(3));

        let report = runner(&temp, &executor)
            .run(&cell("42"), &RunOptions::default())
            .await
            .unwrap();

        let path = temp.path().join("report.json");
        report.write_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["cell"], "42");
        assert_eq!(json["state"], "failed");
        assert_eq!(json["step"], "run");
        assert_eq!(json["exit_code"], 3);
        assert_eq!(json["steps"].as_array().unwrap().len(), 2);
        assert_eq!(json["steps"][0]["success"], true);
        assert_eq!(json["steps"][1]["duration_ms"], 5);
    }
}
