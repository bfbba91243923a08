use crate::RuntimeError;
use std::io::Write;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Script executor collaborator for pre/post-install hooks.
///
/// Scripts are caller-defined actions run as opaque subprocesses with
/// combined stdout+stderr captured; a non-zero exit is definitive failure
/// and carries the captured output.
pub trait ScriptExecutor: Send + Sync {
    /// Run `script`, returning its combined output on success.
    ///
    /// `label` names the hook (e.g. `demo-1.0-2-preinstall`) and is used
    /// for the temporary script file.
    fn run(&self, script: &str, label: &str) -> Result<Vec<u8>, RuntimeError>;
}

/// Executes hook scripts through `/bin/bash`.
#[derive(Debug, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptExecutor for ShellExecutor {
    fn run(&self, script: &str, label: &str) -> Result<Vec<u8>, RuntimeError> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{label}-"))
            .suffix(".sh")
            .tempfile()?;
        file.write_all(script.as_bytes())?;
        file.as_file().sync_all()?;

        debug!("running hook script {label}");
        let output = Command::new("/bin/bash").arg(file.path()).output()?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        if output.status.success() {
            Ok(combined)
        } else {
            Err(RuntimeError::ScriptFailed {
                status: output.status.to_string(),
                output: String::from_utf8_lossy(&combined).into_owned(),
            })
        }
    }
}

/// Records every script it is asked to run; optionally fails all of them.
/// Clones share the same history, so a test can keep a probe handle while
/// the pipeline owns the boxed executor.
#[derive(Clone, Default)]
pub struct MockExecutor {
    ran: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn ran(&self) -> Vec<String> {
        self.ran.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl ScriptExecutor for MockExecutor {
    fn run(&self, script: &str, _label: &str) -> Result<Vec<u8>, RuntimeError> {
        let mut ran = self
            .ran
            .lock()
            .map_err(|e| RuntimeError::ExecFailed(format!("mutex poisoned: {e}")))?;
        ran.push(script.to_owned());
        if self.fail {
            return Err(RuntimeError::ScriptFailed {
                status: "exit status: 1".to_owned(),
                output: "injected script failure".to_owned(),
            });
        }
        Ok(b"mock-script-ok\n".to_vec())
    }
}
