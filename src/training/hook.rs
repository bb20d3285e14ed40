use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Phase tag attached to every recorded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookMode {
    Train,
    Eval,
    Predict,
}

impl HookMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookMode::Train => "train",
            HookMode::Eval => "eval",
            HookMode::Predict => "predict",
        }
    }
}

/// Optional scalar-recording hook, probed once at startup. When no output
/// directory is configured, or the recording file cannot be created, the
/// hook is disabled and the run continues without instrumentation. The hook
/// is passed explicitly through the training and evaluation functions so no
/// call site depends on hidden shared state.
pub struct DebugHook {
    out: Option<BufWriter<File>>,
    mode: HookMode,
    step: u64,
}

impl DebugHook {
    pub fn disabled() -> Self {
        Self {
            out: None,
            mode: HookMode::Train,
            step: 0,
        }
    }

    /// Capability detection: enable recording only if `dir` is given and
    /// writable. Failure to set up is logged, never fatal.
    pub fn probe(dir: Option<&Path>) -> Self {
        let dir = match dir {
            Some(dir) => dir,
            None => {
                log::info!("no instrumentation directory configured, tensor recording disabled");
                return Self::disabled();
            }
        };

        match Self::open(dir) {
            Ok(hook) => {
                log::info!("recording tensor scalars to {}", dir.display());
                hook
            }
            Err(e) => {
                log::warn!(
                    "instrumentation unavailable ({e}), continuing without tensor recording"
                );
                Self::disabled()
            }
        }
    }

    fn open(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let file = File::create(dir.join("tensors.jsonl"))?;
        Ok(Self {
            out: Some(BufWriter::new(file)),
            mode: HookMode::Train,
            step: 0,
        })
    }

    pub fn is_active(&self) -> bool {
        self.out.is_some()
    }

    pub fn mode(&self) -> HookMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: HookMode) {
        self.mode = mode;
    }

    /// Append one named scalar under the current mode. A write failure
    /// disables the hook for the rest of the run.
    pub fn record_scalar(&mut self, name: &str, value: f32) {
        let Some(writer) = self.out.as_mut() else {
            return;
        };

        self.step += 1;
        let line = serde_json::json!({
            "step": self.step,
            "mode": self.mode.as_str(),
            "name": name,
            "value": value,
        });

        if let Err(e) = writeln!(writer, "{line}") {
            log::warn!("tensor recording failed ({e}), disabling hook");
            self.out = None;
        }
    }
}

impl Drop for DebugHook {
    fn drop(&mut self) {
        if let Some(writer) = self.out.as_mut() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_directory_disables_hook() {
        let mut hook = DebugHook::probe(None);
        assert!(!hook.is_active());
        // Recording on a disabled hook is a no-op, not a crash.
        hook.record_scalar("loss", 1.0);
    }

    #[test]
    fn records_mode_tagged_lines() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut hook = DebugHook::probe(Some(dir.path()));
            assert!(hook.is_active());

            hook.set_mode(HookMode::Train);
            hook.record_scalar("loss", 0.5);
            hook.set_mode(HookMode::Predict);
            hook.record_scalar("loss", 0.25);
        }

        let content = fs::read_to_string(dir.path().join("tensors.jsonl")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["mode"], "train");
        assert_eq!(first["name"], "loss");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["mode"], "predict");
    }
}
