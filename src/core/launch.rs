use crate::core::error::{GitLauncherError, Result};
use std::path::Path;
use std::process::Command;

/// Run `command` through the shell inside `dir`, sharing this terminal, and
/// block until it exits. A non-zero exit is a launch failure.
pub fn run(command: &str, dir: &Path) -> Result<()> {
    log::debug!("Launching `{command}` in {}", dir.display());

    let status = shell(command).current_dir(dir).status()?;
    if !status.success() {
        return Err(GitLauncherError::launch(command, status.code()));
    }
    Ok(())
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(not(unix))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
