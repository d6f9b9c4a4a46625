//! Detached process launching.

use std::process::{Command, Stdio};

use tracing::{debug, info};

/// Shell script that backgrounds its first argument. The intermediate shell
/// exits at once, so the command is reparented to init and never becomes a
/// zombie of the manager.
const DETACH_SCRIPT: &str = r#"/bin/sh -c "$1" &"#;

/// Build the command that starts `command` detached.
pub fn detached(command: &str) -> Command {
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c")
        .arg(DETACH_SCRIPT)
        .arg("fawm")
        .arg(command)
        .stdin(Stdio::null());
    cmd
}

/// Start `command` and forget about it. Only the intermediate shell is
/// waited for; whether the command itself runs is not observed.
pub fn launch(command: &str) {
    info!("launching {:?}", command);
    match detached(command).status() {
        Ok(status) if !status.success() => debug!("launcher shell exited with {}", status),
        Ok(_) => {}
        Err(e) => debug!("cannot start /bin/sh for {:?}: {}", command, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_passes_command_as_argument() {
        let cmd = detached("xterm -e 'top'");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "/bin/sh");
        assert_eq!(args, vec!["-c", DETACH_SCRIPT, "fawm", "xterm -e 'top'"]);
    }

    #[test]
    fn test_launch_returns_without_waiting_for_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        launch(&format!("sleep 1; touch '{}'", marker.display()));
        assert!(!marker.exists());
        for _ in 0..150 {
            if marker.exists() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        panic!("detached command never ran");
    }
}
