use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use runwarden_core::{CleanupError, ResourceCleaner};
use runwarden_model::GcTask;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, trace};

use crate::error::{ExecError, ExecResult};
use crate::util::{cmd_program, kill_graceful};

/// Program run once per GC attempt.
///
/// `{namespace}`, `{run}` and `{workflow}` in `args` are replaced by the
/// task's values. The same values are exported as `RUNWARDEN_NAMESPACE`,
/// `RUNWARDEN_RUN_ID` and `RUNWARDEN_WORKFLOW_ID`.
#[derive(Clone, Debug)]
pub struct CommandConfig {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// The attempt fails once this elapses.
    pub timeout: Duration,
    /// Time between SIGTERM and SIGKILL on timeout.
    pub kill_grace: Duration,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            timeout: Duration::from_secs(300),
            kill_grace: Duration::from_secs(5),
        }
    }
}

impl CommandConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn expand_args(&self, task: &GcTask) -> Vec<String> {
        self.args
            .iter()
            .map(|a| {
                a.replace("{namespace}", &task.namespace)
                    .replace("{run}", task.run_id.as_str())
                    .replace("{workflow}", task.workflow_id.as_str())
            })
            .collect()
    }
}

/// [`ResourceCleaner`] that runs a [`CommandConfig`].
///
/// Exit code 0 is success; anything else, a spawn failure or a timeout is a
/// failed attempt.
pub struct CommandCleaner {
    name: &'static str,
    cfg: CommandConfig,
}

impl CommandCleaner {
    pub fn new(cfg: CommandConfig) -> ExecResult<Self> {
        if cfg.program.trim().is_empty() {
            return Err(ExecError::MissingProgram);
        }
        Ok(Self { name: "command", cfg })
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn config(&self) -> &CommandConfig {
        &self.cfg
    }

    async fn run(&self, task: &GcTask) -> ExecResult<()> {
        let args = self.cfg.expand_args(task);
        trace!(target: "runwarden.exec.proc", program = %self.cfg.program, ?args, "spawn");

        let mut cmd = cmd_program(&self.cfg.program, &args);
        if let Some(cwd) = &self.cfg.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &self.cfg.env {
            cmd.env(k, v);
        }
        cmd.env("RUNWARDEN_NAMESPACE", &task.namespace)
            .env("RUNWARDEN_RUN_ID", task.run_id.as_str())
            .env("RUNWARDEN_WORKFLOW_ID", task.workflow_id.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn(e.to_string()))?;

        let stdout = child.stdout.take().map(|out| {
            let run = task.run_id.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(out).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "runwarden.exec.proc.out", run = %run, %line);
                }
            })
        });
        let stderr = child.stderr.take().map(|err| {
            tokio::spawn(async move {
                let mut last = None;
                let mut lines = BufReader::new(err).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if !line.trim().is_empty() {
                        last = Some(line);
                    }
                }
                last
            })
        });

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                if let Some(h) = stdout {
                    let _ = h.await;
                }
                let stderr_tail = match stderr {
                    Some(h) => h.await.ok().flatten(),
                    None => None,
                };

                if status.success() {
                    debug!(target: "runwarden.exec.proc", run = %task.run_id, "exit success");
                    return Ok(());
                }
                match status.code() {
                    Some(code) => Err(ExecError::NonZeroExit { code, stderr: stderr_tail }),
                    None => Err(ExecError::KilledBySignal),
                }
            }
            _ = tokio::time::sleep(self.cfg.timeout) => {
                debug!(target: "runwarden.exec.proc", run = %task.run_id, "timeout; killing child");
                let _ = kill_graceful(&mut child, self.cfg.kill_grace).await;
                Err(ExecError::Timeout(self.cfg.timeout))
            }
        }
    }
}

#[async_trait]
impl ResourceCleaner for CommandCleaner {
    async fn cleanup(&self, task: &GcTask) -> Result<(), CleanupError> {
        self.run(task).await.map_err(CleanupError::from)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
