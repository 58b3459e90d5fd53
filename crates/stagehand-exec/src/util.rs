use std::time::Duration;

use tokio::process::{Child, Command};

/// How long a child gets between SIGTERM and SIGKILL.
const KILL_GRACE: Duration = Duration::from_secs(5);

cfg_if::cfg_if! {
    if #[cfg(target_family = "windows")] {
        /// Platform shell invocation for `script`.
        pub fn shell_command(script: &str) -> Command {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(script);
            cmd
        }
    } else {
        /// Platform shell invocation for `script`.
        ///
        /// The shell leads its own process group so [`kill_graceful`] reaches
        /// everything the script started, not only `sh`.
        pub fn shell_command(script: &str) -> Command {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(script).process_group(0);
            cmd
        }
    }
}

/// Send `signal` to the process group led by `pid`.
#[cfg(target_family = "unix")]
fn signal_group(pid: libc::pid_t, signal: libc::c_int) {
    // SAFETY: kill(2) with a negated pid targets the group this child leads; no memory is touched.
    unsafe {
        libc::kill(-pid, signal);
    }
}

#[cfg(target_family = "unix")]
pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    let Some(pid) = child.id().and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return child.kill().await;
    };

    signal_group(pid, libc::SIGTERM);
    if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_ok() {
        // The leader is gone; stragglers that ignored SIGTERM still get killed.
        signal_group(pid, libc::SIGKILL);
        return Ok(());
    }
    signal_group(pid, libc::SIGKILL);
    child.kill().await
}

#[cfg(target_family = "windows")]
pub async fn kill_graceful(child: &mut Child) -> std::io::Result<()> {
    let _ = KILL_GRACE;
    child.kill().await
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use std::{path::Path, process::Stdio, time::Instant};

    /// Gone, or a zombie waiting to be reaped by init.
    fn is_dead(pid: &str) -> bool {
        match std::fs::read_to_string(Path::new("/proc").join(pid).join("stat")) {
            Err(_) => true,
            Ok(stat) => stat
                .rsplit_once(')')
                .is_some_and(|(_, rest)| rest.trim_start().starts_with('Z')),
        }
    }

    #[tokio::test]
    async fn kill_reaches_background_children() {
        let pid_file = std::env::temp_dir().join(format!("stagehand-pgrp-{}", std::process::id()));
        let script = format!("sleep 30 & echo $! > '{}'; wait", pid_file.display());

        let mut child = shell_command(&script)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap();

        let started = Instant::now();
        let grandchild = loop {
            if let Ok(pid) = std::fs::read_to_string(&pid_file)
                && !pid.trim().is_empty()
            {
                break pid.trim().to_string();
            }
            assert!(started.elapsed() < Duration::from_secs(5), "pid file never written");
            tokio::time::sleep(Duration::from_millis(20)).await;
        };

        kill_graceful(&mut child).await.unwrap();

        let started = Instant::now();
        while !is_dead(&grandchild) {
            assert!(started.elapsed() < Duration::from_secs(5), "sleep {grandchild} survived");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let _ = std::fs::remove_file(&pid_file);
    }
}
