//! The pipeline executor (spec.md §4.6): sequential step execution with
//! output capture, stdin piping, tee, and per-step on-fail policies.
//!
//! Process spawning is abstracted behind [`ProcessSpawner`] (the
//! "executor-to-OS contract" of spec.md §6) so tests can substitute a stub
//! that never touches the real OS. [`SystemSpawner`] is the default,
//! `std::process`-backed implementation, grounded in the teacher's
//! `ShellCommand::execute_streaming` thread-per-stream drain (see
//! `examples/Rubentxu-pipeliner/src/executor/shell.rs`).

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::error::ExecError;
use crate::raw::{Capture, FailAction, ParamDecl, ParamDefs, Stream};
use crate::runtime::{Pipeline, PipelineStep, Runnable};
use crate::template;

/// One process to run, fully resolved (every `{{ inputs.* }}` / `{{
/// steps.*.* }}` reference already substituted).
#[derive(Debug, Clone)]
pub struct ProcessSpec<'a> {
    /// `argv[0]` is the program, the rest are arguments.
    pub argv: &'a [String],
    /// Working directory override; `None` or an empty string inherits the
    /// parent's (spec.md §4.6 step 3: "empty = inherit").
    pub cwd: Option<&'a str>,
    /// Environment overlay on top of the parent process's environment.
    pub env: &'a HashMap<String, String>,
    /// Text to feed on stdin, if the step declared a `stdin` reference.
    pub stdin: Option<&'a str>,
    /// What to buffer from this process's output.
    pub capture: Capture,
    /// Whether a captured stream is also mirrored to the terminal.
    pub tee: bool,
}

/// The outcome of running one [`ProcessSpec`] to completion.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Process exit code (−1 if terminated by a signal).
    pub exit_code: i32,
    /// Captured stdout text, present only if `capture` included stdout.
    pub stdout: Option<String>,
    /// Captured stderr text, present only if `capture` included stderr.
    pub stderr: Option<String>,
}

/// The executor-to-OS contract (spec.md §6): spawn a process, wire its
/// streams, run it to completion. Implementations need not support
/// cancelling an in-flight process — the executor's cancellation check runs
/// between steps (spec.md §5).
pub trait ProcessSpawner: Send + Sync {
    /// Runs one process to completion per `spec`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from spawning (not from a non-zero exit, which
    /// is reported via [`StepOutcome::exit_code`]).
    fn spawn(&self, spec: &ProcessSpec<'_>) -> std::io::Result<StepOutcome>;
}

/// The default [`ProcessSpawner`], backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, spec: &ProcessSpec<'_>) -> std::io::Result<StepOutcome> {
        let mut cmd = Command::new(&spec.argv[0]);
        cmd.args(&spec.argv[1..]);
        if let Some(cwd) = spec.cwd.filter(|c| !c.is_empty()) {
            cmd.current_dir(cwd);
        }
        cmd.envs(spec.env);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let mut child = cmd.spawn()?;

        // Feed stdin on its own thread, concurrently with draining stdout/
        // stderr below. Writing it inline here would block the parent on a
        // full pipe while the child blocks writing to its (not yet drained)
        // stdout — a classic pipe deadlock once the piped text exceeds the
        // OS pipe buffer.
        let stdin_thread = spec.stdin.map(|text| {
            let mut stdin = child.stdin.take().expect("stdin piped when stdin text is set");
            let text = text.to_string();
            std::thread::spawn(move || {
                let _ = stdin.write_all(text.as_bytes());
            })
        });

        let stdout_pipe = child.stdout.take().expect("stdout piped");
        let stderr_pipe = child.stderr.take().expect("stderr piped");
        let capture_stdout = spec.capture.captures(Stream::Stdout);
        let capture_stderr = spec.capture.captures(Stream::Stderr);

        let stdout_thread = drain(stdout_pipe, capture_stdout, spec.tee, false);
        let stderr_thread = drain(stderr_pipe, capture_stderr, spec.tee, true);

        let status = child.wait()?;
        if let Some(t) = stdin_thread {
            let _ = t.join();
        }
        let stdout_buf = stdout_thread.join().unwrap_or_default();
        let stderr_buf = stderr_thread.join().unwrap_or_default();

        Ok(StepOutcome {
            exit_code: status.code().unwrap_or(-1),
            stdout: capture_stdout.then_some(trim_trailing_newline(stdout_buf)),
            stderr: capture_stderr.then_some(trim_trailing_newline(stderr_buf)),
        })
    }
}

/// Drains one stream on its own thread, line by line: buffering it if
/// `capture` is set, and mirroring each line to the terminal whenever the
/// stream is not captured at all, or is captured with `tee`.
fn drain(
    stream: impl std::io::Read + Send + 'static,
    capture: bool,
    tee: bool,
    to_stderr: bool,
) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        let reader = BufReader::new(stream);
        let print_live = !capture || tee;
        for line in reader.lines().map_while(Result::ok) {
            if print_live {
                if to_stderr {
                    eprintln!("{line}");
                } else {
                    println!("{line}");
                }
            }
            if capture {
                buf.push_str(&line);
                buf.push('\n');
            }
        }
        buf
    })
}

fn trim_trailing_newline(mut s: String) -> String {
    while matches!(s.chars().last(), Some('\n' | '\r')) {
        s.pop();
    }
    s
}

/// A single step's result within a completed [`PipelineRun`].
#[derive(Debug, Clone)]
pub struct StepRun {
    /// The step's declared id, if any.
    pub id: Option<String>,
    /// Total attempts made (more than one only for a `retry` step).
    pub attempts: usize,
    /// The last attempt's exit code.
    pub exit_code: i32,
    /// Whether this step's output was captured.
    pub captured: bool,
    /// Wall-clock time spent on this step, across every attempt.
    pub duration: Duration,
}

/// Summary of one completed (or partially completed, on cancellation)
/// pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// A fresh identifier for this run, for correlating log lines.
    pub run_id: String,
    /// Per-step results, in execution order.
    pub steps: Vec<StepRun>,
}

/// Resolves a declared parameter set against caller-supplied values,
/// applying defaults and reporting a missing required value. Shared between
/// a [`Pipeline`]'s and a [`Runnable`]'s `inputs` (spec.md §4.6 point 0:
/// "inputs are gathered from caller-supplied key=value arguments plus
/// defaults ... required-but-unset inputs fail before any step runs").
///
/// # Errors
///
/// Returns [`ExecError::MissingInput`] for the first required input with no
/// caller-supplied value.
pub fn resolve_inputs(
    declared: &ParamDefs,
    caller: &HashMap<String, String>,
) -> Result<HashMap<String, String>, ExecError> {
    let mut resolved = HashMap::new();
    for (name, decl) in declared {
        match caller.get(name) {
            Some(value) => {
                resolved.insert(name.clone(), value.clone());
            }
            None => match decl {
                ParamDecl::Default(value) => {
                    resolved.insert(name.clone(), value.clone().into_string());
                }
                ParamDecl::Required(_) => {
                    return Err(ExecError::MissingInput { name: name.clone() });
                }
            },
        }
    }
    Ok(resolved)
}

/// Runs [`Pipeline`]s and bare [`Runnable`]s against a [`ProcessSpawner`].
pub struct Executor<S: ProcessSpawner = SystemSpawner> {
    spawner: S,
}

impl Executor<SystemSpawner> {
    /// Creates an executor backed by real OS processes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spawner: SystemSpawner,
        }
    }
}

impl Default for Executor<SystemSpawner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ProcessSpawner> Executor<S> {
    /// Creates an executor backed by a custom spawner (for tests, or a host
    /// that wants container- or remote-backed execution).
    #[must_use]
    pub fn with_spawner(spawner: S) -> Self {
        Self { spawner }
    }

    /// Runs a single [`Runnable`], substituting `{{ inputs.* }}` into its
    /// argv/cwd/env and streaming stdio straight through (a bare Runnable
    /// has no capture/tee concept — spec.md §3's Runnable carries only
    /// `argv`, `cwd`, `env`, `inputs`).
    ///
    /// `argv` should be the runnable's own argv with the entrypoint's
    /// trailing positional args already appended (see
    /// [`crate::runtime::resolve_entrypoint`]).
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::MissingInput`] if a required input was not
    /// supplied, or [`ExecError::Spawn`]/[`ExecError::NonZeroExit`] if the
    /// process itself failed.
    pub fn run_command(
        &self,
        runnable: &Runnable,
        argv: &[String],
        caller_inputs: &HashMap<String, String>,
    ) -> Result<i32, ExecError> {
        let inputs = resolve_inputs(&runnable.inputs, caller_inputs)?;
        let captures = HashMap::new();
        let resolved_argv: Vec<String> = argv
            .iter()
            .map(|t| template::resolve_execution_refs(t, &inputs, &captures))
            .collect();
        let cwd = runnable
            .cwd
            .as_deref()
            .map(|c| template::resolve_execution_refs(c, &inputs, &captures));
        let env: HashMap<String, String> = runnable
            .env
            .iter()
            .map(|(k, v)| (k.clone(), template::resolve_execution_refs(v, &inputs, &captures)))
            .collect();

        let spec = ProcessSpec {
            argv: &resolved_argv,
            cwd: cwd.as_deref(),
            env: &env,
            stdin: None,
            capture: Capture::None,
            tee: false,
        };
        let step_id = runnable.name.clone();
        let outcome = self
            .spawner
            .spawn(&spec)
            .map_err(|source| ExecError::Spawn {
                step_id: step_id.clone(),
                source,
            })?;
        if outcome.exit_code != 0 {
            return Err(ExecError::NonZeroExit {
                step_id,
                code: outcome.exit_code,
            });
        }
        Ok(outcome.exit_code)
    }

    /// Runs a [`Pipeline`] to completion, honouring capture, stdin piping,
    /// tee, and each step's on-fail policy (spec.md §4.6).
    ///
    /// `cancel` is checked before every step; once set, the run stops
    /// immediately with [`ExecError::Cancelled`] and no further steps run.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::MissingInput`] if a required input was not
    /// supplied, [`ExecError::Cancelled`] if `cancel` was observed set, or
    /// [`ExecError::StepFailed`] for the first step whose on-fail policy
    /// did not absorb its failure.
    pub fn run_pipeline(
        &self,
        pipeline: &Pipeline,
        caller_inputs: &HashMap<String, String>,
        cancel: &AtomicBool,
    ) -> Result<PipelineRun, ExecError> {
        let inputs = resolve_inputs(&pipeline.inputs, caller_inputs)?;
        let run_id = Uuid::new_v4().to_string();
        let mut captures: HashMap<String, String> = HashMap::new();
        let mut runs = Vec::with_capacity(pipeline.steps.len());

        for step in &pipeline.steps {
            let step_label = step.id.clone().unwrap_or_else(|| "<anonymous>".to_string());
            if cancel.load(Ordering::SeqCst) {
                return Err(ExecError::Cancelled { step_id: step_label });
            }

            let started = Instant::now();
            let (attempts, outcome) =
                self.run_step_with_retry(&run_id, step, &step_label, &inputs, &captures, cancel)?;
            let duration = started.elapsed();

            if let Some(id) = &step.id {
                if let Some(stdout) = &outcome.stdout {
                    captures.insert(format!("{id}.{}", Stream::Stdout), stdout.clone());
                }
                if let Some(stderr) = &outcome.stderr {
                    captures.insert(format!("{id}.{}", Stream::Stderr), stderr.clone());
                }
            }

            runs.push(StepRun {
                id: step.id.clone(),
                attempts,
                exit_code: outcome.exit_code,
                captured: step.capture.is_captured(),
                duration,
            });
        }

        Ok(PipelineRun { run_id, steps: runs })
    }

    /// Runs one step, retrying per its on-fail policy. Returns the total
    /// attempt count and the last outcome (the one that decided the
    /// step's fate: either the first success or the final failed attempt).
    fn run_step_with_retry(
        &self,
        run_id: &str,
        step: &PipelineStep,
        step_label: &str,
        inputs: &HashMap<String, String>,
        captures: &HashMap<String, String>,
        cancel: &AtomicBool,
    ) -> Result<(usize, StepOutcome), ExecError> {
        let action = step.on_fail.resolve().unwrap_or(FailAction::Fail);
        let max_attempts = if action == FailAction::Retry {
            step.on_fail.attempts.unwrap_or(1).max(1)
        } else {
            1
        };
        let delay = step
            .on_fail
            .delay
            .as_deref()
            .and_then(|d| crate::duration::parse(d).ok());

        let mut last_spawn_error = None;
        let mut last_outcome: Option<StepOutcome> = None;
        let mut attempt = 0;

        while attempt < max_attempts {
            attempt += 1;
            if attempt > 1 && cancel.load(Ordering::SeqCst) {
                return Err(ExecError::Cancelled {
                    step_id: step_label.to_string(),
                });
            }

            tracing::info!(run_id, step = step_label, attempt, "executing step");
            match self.run_step_once(step, inputs, captures) {
                Ok(outcome) if outcome.exit_code == 0 => {
                    return Ok((attempt, outcome));
                }
                Ok(outcome) => {
                    last_outcome = Some(outcome);
                    last_spawn_error = None;
                }
                Err(e) => {
                    last_spawn_error = Some(e);
                    last_outcome = None;
                }
            }

            if attempt < max_attempts {
                if let Some(d) = delay {
                    std::thread::sleep(d);
                }
            }
        }

        if let Some(e) = last_spawn_error {
            let source = ExecError::Spawn {
                step_id: step_label.to_string(),
                source: e,
            };
            return self.settle_failure(step_label, action, attempt, source, None);
        }

        let outcome = last_outcome.expect("at least one attempt ran");
        let code = outcome.exit_code;
        let source = ExecError::NonZeroExit {
            step_id: step_label.to_string(),
            code,
        };
        self.settle_failure(step_label, action, attempt, source, Some(outcome))
    }

    fn run_step_once(
        &self,
        step: &PipelineStep,
        inputs: &HashMap<String, String>,
        captures: &HashMap<String, String>,
    ) -> std::io::Result<StepOutcome> {
        let argv: Vec<String> = step
            .argv
            .iter()
            .map(|t| template::resolve_execution_refs(t, inputs, captures))
            .collect();
        let cwd = step
            .cwd
            .as_deref()
            .map(|c| template::resolve_execution_refs(c, inputs, captures));
        let env: HashMap<String, String> = step
            .env
            .iter()
            .map(|(k, v)| (k.clone(), template::resolve_execution_refs(v, inputs, captures)))
            .collect();
        let stdin_text = step
            .stdin
            .as_ref()
            .and_then(|r| captures.get(&format!("{}.{}", r.step_id, r.stream)))
            .cloned();

        let spec = ProcessSpec {
            argv: &argv,
            cwd: cwd.as_deref(),
            env: &env,
            stdin: stdin_text.as_deref(),
            capture: step.capture,
            tee: step.tee,
        };
        self.spawner.spawn(&spec)
    }

    /// Applies the resolved on-fail action to a step's terminal failure.
    fn settle_failure(
        &self,
        step_label: &str,
        action: FailAction,
        attempts: usize,
        source: ExecError,
        fallback_outcome: Option<StepOutcome>,
    ) -> Result<(usize, StepOutcome), ExecError> {
        match action {
            // spec.md §8: "A continue step's failure is discarded; later
            // steps still run and see no capture for that step" — strip any
            // buffered output a failed-but-continued step produced so
            // `run_pipeline` never writes it into the capture store.
            FailAction::Continue => {
                let mut outcome = fallback_outcome.unwrap_or(StepOutcome {
                    exit_code: -1,
                    stdout: None,
                    stderr: None,
                });
                outcome.stdout = None;
                outcome.stderr = None;
                Ok((attempts, outcome))
            }
            FailAction::Fail | FailAction::Retry => Err(ExecError::StepFailed {
                step_id: step_label.to_string(),
                attempts,
                source: Box::new(source),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::OnFail;
    use std::sync::Mutex;

    struct StubSpawner {
        responses: Mutex<Vec<Result<StepOutcome, std::io::Error>>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl StubSpawner {
        fn new(responses: Vec<Result<StepOutcome, std::io::Error>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ProcessSpawner for StubSpawner {
        fn spawn(&self, spec: &ProcessSpec<'_>) -> std::io::Result<StepOutcome> {
            self.calls.lock().unwrap().push(spec.argv.to_vec());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                panic!("stub spawner ran out of canned responses");
            }
            responses.remove(0)
        }
    }

    fn ok(exit_code: i32, stdout: Option<&str>) -> Result<StepOutcome, std::io::Error> {
        Ok(StepOutcome {
            exit_code,
            stdout: stdout.map(str::to_string),
            stderr: None,
        })
    }

    fn step(argv: &[&str], id: Option<&str>, capture: Capture) -> PipelineStep {
        PipelineStep {
            id: id.map(str::to_string),
            argv: argv.iter().map(|s| s.to_string()).collect(),
            cwd: None,
            env: HashMap::new(),
            capture,
            tee: false,
            stdin: None,
            on_fail: OnFail::default(),
        }
    }

    #[test]
    fn successful_pipeline_records_one_attempt_per_step() {
        let spawner = StubSpawner::new(vec![ok(0, Some("a.txt\n")), ok(0, None)]);
        let executor = Executor::with_spawner(spawner);
        let pipeline = Pipeline {
            name: "p".to_string(),
            steps: vec![
                step(&["ls"], Some("list"), Capture::Stdout),
                step(&["echo", "done"], None, Capture::None),
            ],
            inputs: ParamDefs::new(),
        };
        let run = executor
            .run_pipeline(&pipeline, &HashMap::new(), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(run.steps.len(), 2);
        assert_eq!(run.steps[0].attempts, 1);
        assert_eq!(run.steps[1].attempts, 1);
    }

    #[test]
    fn step_reference_is_substituted_from_capture_store() {
        let spawner = StubSpawner::new(vec![ok(0, Some("a.txt\nb.txt\n")), ok(0, None)]);
        let executor = Executor::with_spawner(spawner);
        let mut second = step(&["echo", "{{ steps.list.stdout }}"], None, Capture::None);
        second.argv = vec!["echo".to_string(), "{{ steps.list.stdout }}".to_string()];
        let pipeline = Pipeline {
            name: "p".to_string(),
            steps: vec![step(&["ls"], Some("list"), Capture::Stdout), second],
            inputs: ParamDefs::new(),
        };
        let run = executor
            .run_pipeline(&pipeline, &HashMap::new(), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(run.steps.len(), 2);
    }

    #[test]
    fn retry_succeeds_after_two_failed_attempts() {
        let spawner = StubSpawner::new(vec![ok(1, None), ok(1, None), ok(0, None)]);
        let executor = Executor::with_spawner(spawner);
        let mut s = step(&["cmd"], Some("s"), Capture::None);
        s.on_fail = OnFail {
            action: "retry".to_string(),
            attempts: Some(3),
            delay: None,
        };
        let pipeline = Pipeline {
            name: "p".to_string(),
            steps: vec![s],
            inputs: ParamDefs::new(),
        };
        let run = executor
            .run_pipeline(&pipeline, &HashMap::new(), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(run.steps[0].attempts, 3);
    }

    #[test]
    fn retry_exhausted_reports_step_failed_with_attempt_count() {
        let spawner = StubSpawner::new(vec![ok(1, None), ok(1, None)]);
        let executor = Executor::with_spawner(spawner);
        let mut s = step(&["cmd"], Some("s"), Capture::None);
        s.on_fail = OnFail {
            action: "retry".to_string(),
            attempts: Some(2),
            delay: None,
        };
        let pipeline = Pipeline {
            name: "p".to_string(),
            steps: vec![s],
            inputs: ParamDefs::new(),
        };
        let err = executor
            .run_pipeline(&pipeline, &HashMap::new(), &AtomicBool::new(false))
            .unwrap_err();
        match err {
            ExecError::StepFailed { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("expected StepFailed, got {other:?}"),
        }
    }

    #[test]
    fn continue_absorbs_failure_and_runs_later_steps() {
        let spawner = StubSpawner::new(vec![ok(1, None), ok(0, None)]);
        let executor = Executor::with_spawner(spawner);
        let mut first = step(&["cmd"], Some("first"), Capture::None);
        first.on_fail = OnFail {
            action: "continue".to_string(),
            attempts: None,
            delay: None,
        };
        let second = step(&["echo", "ok"], None, Capture::None);
        let pipeline = Pipeline {
            name: "p".to_string(),
            steps: vec![first, second],
            inputs: ParamDefs::new(),
        };
        let run = executor
            .run_pipeline(&pipeline, &HashMap::new(), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(run.steps.len(), 2);
        assert_eq!(run.steps[0].exit_code, 1);
    }

    #[test]
    fn continue_step_with_capture_leaves_no_trace_in_capture_store() {
        // spec.md §8: a `continue` step's failure is discarded and later
        // steps see no capture for it, even if the step declared `capture`
        // and the spawner happened to return buffered output alongside the
        // non-zero exit.
        let spawner = StubSpawner::new(vec![ok(1, Some("partial output\n")), ok(0, None)]);
        let executor = Executor::with_spawner(spawner);
        let mut first = step(&["cmd"], Some("first"), Capture::Stdout);
        first.on_fail = OnFail {
            action: "continue".to_string(),
            attempts: None,
            delay: None,
        };
        let second = step(&["echo", "{{ steps.first.stdout }}"], None, Capture::None);
        let pipeline = Pipeline {
            name: "p".to_string(),
            steps: vec![first, second],
            inputs: ParamDefs::new(),
        };
        let run = executor
            .run_pipeline(&pipeline, &HashMap::new(), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(run.steps.len(), 2);
        assert_eq!(run.steps[0].exit_code, 1);
        // The spawner's second call received the literal reference back,
        // unresolved, because "first"'s capture was never stored.
        let calls = executor.spawner.calls.lock().unwrap();
        assert_eq!(calls[1], vec!["echo", "{{ steps.first.stdout }}"]);
    }

    #[test]
    fn cancellation_before_first_step_stops_the_pipeline() {
        let spawner = StubSpawner::new(vec![]);
        let executor = Executor::with_spawner(spawner);
        let pipeline = Pipeline {
            name: "p".to_string(),
            steps: vec![step(&["cmd"], Some("s"), Capture::None)],
            inputs: ParamDefs::new(),
        };
        let err = executor
            .run_pipeline(&pipeline, &HashMap::new(), &AtomicBool::new(true))
            .unwrap_err();
        assert!(matches!(err, ExecError::Cancelled { .. }));
        assert_eq!(executor.spawner.call_count(), 0);
    }

    #[test]
    fn missing_required_input_fails_before_any_step_runs() {
        let spawner = StubSpawner::new(vec![]);
        let executor = Executor::with_spawner(spawner);
        let mut inputs = ParamDefs::new();
        inputs.insert(
            "env".to_string(),
            ParamDecl::Required(crate::raw::RequiredMarker),
        );
        let pipeline = Pipeline {
            name: "p".to_string(),
            steps: vec![step(&["cmd"], None, Capture::None)],
            inputs,
        };
        let err = executor
            .run_pipeline(&pipeline, &HashMap::new(), &AtomicBool::new(false))
            .unwrap_err();
        assert!(matches!(err, ExecError::MissingInput { .. }));
    }
}
