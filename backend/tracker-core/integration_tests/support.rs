// Shell stand-ins for the Python tracker. Unix only; they run under /bin/sh.

#![cfg(unix)]

use tracker_core::config::TrackerConfig;

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

pub const SHELL: &str = "/bin/sh";

/// Writes `body` to a uniquely named script so concurrent tests never match
/// each other's command lines.
pub fn write_script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join(format!("tracker_{}.sh", Uuid::new_v4().simple()));
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    path
}

pub fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Config that runs `script` with `/bin/sh` and a short grace period.
pub fn shell_config(script: &Path) -> TrackerConfig {
    TrackerConfig {
        script_path: script.to_path_buf(),
        interpreter: SHELL.to_string(),
        startup_grace_ms: 200,
        stop_timeout_secs: 5,
        ..TrackerConfig::default()
    }
}
