use crate::core::mpv::{MpvError, Result};
use log::{debug, info};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// The default executable name of mpv.
pub const DEFAULT_MPV_EXECUTABLE: &str = "mpv";
/// The default arguments passed to mpv, next to the ipc server and window id.
pub const DEFAULT_MPV_ARGS: [&str; 4] = [
    "--idle=yes",
    "--no-osc",
    "--no-border",
    "--profile=gpu-hq",
];

/// Get the default ipc server path for this process.
#[cfg(unix)]
pub fn default_ipc_path() -> String {
    format!("/tmp/mpvsocket_{}", std::process::id())
}

/// Get the default ipc server path for this process.
#[cfg(windows)]
pub fn default_ipc_path() -> String {
    format!(r"\\.\pipe\mpvsocket_{}", std::process::id())
}

/// A running mpv instance which exposes its JSON IPC server.
/// The instance is killed when dropped.
#[derive(Debug)]
pub struct MpvProcess {
    child: Child,
    ipc_path: String,
}

impl MpvProcess {
    /// Spawn a new mpv instance.
    ///
    /// # Arguments
    ///
    /// * `executable` - The mpv executable to launch.
    /// * `ipc_path` - The socket or pipe path on which mpv should expose its ipc server.
    /// * `args` - The additional arguments for mpv.
    /// * `wid` - The optional window id in which mpv should render.
    pub fn spawn<S: AsRef<str>>(
        executable: &str,
        ipc_path: &str,
        args: &[S],
        wid: Option<u64>,
    ) -> Result<Self> {
        let args = Self::launch_args(ipc_path, args, wid);
        debug!("Launching mpv {} with {:?}", executable, args);
        let child = Command::new(executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MpvError::Process(format!("{}, {}", executable, e)))?;

        info!(
            "Mpv has been started (pid {:?}) with ipc server {}",
            child.id(),
            ipc_path
        );
        Ok(Self {
            child,
            ipc_path: ipc_path.to_string(),
        })
    }

    /// Get the ipc server path of this instance.
    pub fn ipc_path(&self) -> &str {
        self.ipc_path.as_str()
    }

    /// Kill the mpv instance.
    pub async fn kill(&mut self) -> Result<()> {
        debug!("Killing mpv instance {:?}", self.child.id());
        Ok(self.child.kill().await?)
    }

    fn launch_args<S: AsRef<str>>(ipc_path: &str, args: &[S], wid: Option<u64>) -> Vec<String> {
        let mut launch_args = vec![format!("--input-ipc-server={}", ipc_path)];
        if let Some(wid) = wid {
            launch_args.push(format!("--wid={}", wid));
        }
        launch_args.extend(args.iter().map(|e| e.as_ref().to_string()));
        launch_args
    }
}
