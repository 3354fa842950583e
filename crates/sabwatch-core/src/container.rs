//! Restarting the container that hosts the download service.

use std::process::Command;

/// Restarts a named container.
///
/// Fire-and-forget: callers do not learn whether the restart completed.
pub trait ContainerController {
    fn restart(&self, container_name: &str);
}

impl<T: ContainerController + ?Sized> ContainerController for &T {
    fn restart(&self, container_name: &str) {
        (**self).restart(container_name)
    }
}

/// Shells out to a container runtime CLI (`docker restart <name>`).
#[derive(Debug, Clone)]
pub struct CommandController {
    runtime: String,
}

impl CommandController {
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }

    /// The command line that `restart` would run.
    pub fn command_line(&self, container_name: &str) -> String {
        format!("{} restart {}", self.runtime, container_name)
    }
}

impl Default for CommandController {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerController for CommandController {
    fn restart(&self, container_name: &str) {
        let result = Command::new(&self.runtime)
            .arg("restart")
            .arg(container_name)
            .output();
        match result {
            Ok(out) if out.status.success() => {
                tracing::debug!("`{}` finished", self.command_line(container_name));
            }
            Ok(out) => {
                tracing::warn!(
                    "`{}` exited with {}: {}",
                    self.command_line(container_name),
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                );
            }
            Err(e) => {
                tracing::warn!("could not run `{}`: {e}", self.command_line(container_name));
            }
        }
    }
}
