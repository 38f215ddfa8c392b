//! Handing files to the user's default viewer.
//!
//! The orchestrator only knows the [`Viewer`] trait, so tests can record what
//! would have been opened instead of launching real programs.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Opens an image, a directory of images, or an archive.
///
/// Implementations return as soon as the viewer has been launched, not when
/// the user closes it.
pub trait Viewer: Send + Sync {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Launches the platform's default handler (`xdg-open`, `open`, `start`).
///
/// These launchers hand the file to the real viewer and exit straight away, so
/// `open` waits for the launcher and reports a non-zero exit as a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl SystemViewer {
    fn command(path: &Path) -> Result<Command> {
        let cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            // the empty argument is the window title expected by `start`
            cmd.args(["/c", "start", ""]).arg(path);
            cmd
        } else if cfg!(target_os = "macos") {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        } else if cfg!(unix) {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        } else {
            return Err(Error::viewer(format!(
                "unsupported operating system: {}",
                std::env::consts::OS
            )));
        };
        Ok(cmd)
    }
}

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) -> Result<()> {
        launch(Self::command(path)?, path)
    }
}

fn launch(mut cmd: Command, path: &Path) -> Result<()> {
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| Error::viewer(format!("failed to launch viewer: {}", e)))?;

    if !status.success() {
        return Err(Error::viewer(format!(
            "viewer could not open {} ({})",
            path.display(),
            status
        )));
    }

    debug!(path = %path.display(), "viewer launched");
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[test]
    fn test_launcher_exit_code_is_reported() {
        // xdg-open exits 3 when no handler is registered
        let result = launch(shell("echo 'no method available' >&2; exit 3"), Path::new("x.cbz"));
        match result {
            Err(Error::Viewer(msg)) => assert!(msg.contains("x.cbz")),
            other => panic!("expected viewer error, got {:?}", other),
        }
    }

    #[test]
    fn test_successful_launch() {
        assert!(launch(shell("exit 0"), Path::new("x.cbz")).is_ok());
    }

    #[test]
    fn test_missing_launcher_is_viewer_error() {
        let cmd = Command::new("/nonexistent/mangaka-viewer");
        assert!(matches!(
            launch(cmd, Path::new("x.cbz")),
            Err(Error::Viewer(_))
        ));
    }
}
