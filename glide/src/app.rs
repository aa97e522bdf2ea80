use crate::errors::{GlideError, Result};
use clap::Parser;
use derive_more::Display;
use fx_callback::Callback;
use glide_core::core::commands::CommandIssuer;
use glide_core::core::config::GlideProperties;
use glide_core::core::events::EventProjector;
use glide_core::core::media::default_library_root;
use glide_core::core::mpv::{default_ipc_path, MpvConnection, MpvProcess, MpvTransport};
use glide_core::core::state::{PlayerStateEvent, PlayerStateStore};
use glide_logging::LogOutput;
use log::{debug, info, warn, LevelFilter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::WaitForCancellationFuture;

/// The options of the glide application.
#[derive(Debug, Clone, Display, Parser)]
#[command(name = "glide", version, about = "Play local videos through mpv")]
#[display("file: {:?}, config: {:?}, ipc_path: {:?}", file, config, ipc_path)]
pub struct GlideArgs {
    /// The video file to play on startup.
    pub file: Option<String>,
    /// The glide YAML config file, defaults to `glide.yml` within the working directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// The root log level of the application.
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
    /// Disable the default `log4rs` logger of glide.
    #[arg(long, default_value_t = false)]
    pub disable_logger: bool,
    /// Also write the logging to this file, rolled over once it grows too large.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// A `log4rs` YAML config file which replaces the default logger configuration.
    #[arg(long, conflicts_with = "log_file")]
    pub log_config: Option<PathBuf>,
    /// The mpv executable to launch.
    #[arg(long)]
    pub mpv: Option<String>,
    /// The socket or pipe path of the mpv ipc server.
    #[arg(long)]
    pub ipc_path: Option<String>,
    /// The window id in which mpv should render the video.
    #[arg(long)]
    pub wid: Option<u64>,
    /// Print the discovered videos of the library and exit.
    #[arg(long, default_value_t = false)]
    pub list: bool,
    /// The library directory to discover videos in.
    #[arg(long)]
    pub library: Option<PathBuf>,
}

impl GlideArgs {
    /// Get the destination of the application logging.
    pub fn log_output(&self) -> LogOutput {
        match (&self.log_config, &self.log_file) {
            (Some(path), _) => LogOutput::ConfigFile(path.clone()),
            (None, Some(path)) => LogOutput::File(path.clone()),
            (None, None) => LogOutput::Console,
        }
    }

    /// Load the application properties and apply the overrides of the arguments.
    pub fn properties(&self) -> Result<GlideProperties> {
        let mut properties = match &self.config {
            Some(path) => GlideProperties::from_path(path)?,
            None => GlideProperties::new_auto(),
        };

        if let Some(executable) = &self.mpv {
            properties.mpv.executable = executable.clone();
        }
        if let Some(ipc_path) = &self.ipc_path {
            properties.mpv.ipc_path = Some(ipc_path.clone());
        }
        if let Some(library) = &self.library {
            properties.library.root = Some(library.clone());
        }

        debug!("Using properties {}", properties);
        Ok(properties)
    }

    /// Get the library root directory to discover videos in.
    pub fn library_root(properties: &GlideProperties) -> Result<PathBuf> {
        properties
            .library
            .root
            .clone()
            .or_else(default_library_root)
            .ok_or(GlideError::LibraryUnavailable)
    }
}

/// A running glide instance, which keeps the player state of an mpv instance in sync.
#[derive(Debug)]
pub struct Glide {
    process: MpvProcess,
    connection: MpvConnection,
    projector: EventProjector,
    issuer: CommandIssuer,
}

impl Glide {
    /// Launch mpv and start synchronizing its player state.
    pub async fn new(properties: &GlideProperties, wid: Option<u64>) -> Result<Self> {
        let mpv = &properties.mpv;
        let ipc_path = mpv.ipc_path.clone().unwrap_or_else(default_ipc_path);
        let process = MpvProcess::spawn(
            mpv.executable.as_str(),
            ipc_path.as_str(),
            mpv.args.as_slice(),
            wid,
        )?;
        let connection = MpvConnection::connect_with_retry(
            ipc_path.as_str(),
            mpv.connect_timeout(),
            mpv.command_timeout(),
        )
        .await?;

        let store = PlayerStateStore::new();
        Self::log_state_changes(&store);
        let projector = EventProjector::new(store);
        projector.start(connection.subscribe())?;
        connection
            .observe_properties(mpv.observed_properties.as_slice())
            .await?;

        let issuer = CommandIssuer::new(Arc::new(MpvTransport::new(connection.clone())));
        info!("Glide is synchronizing with mpv on {}", process.ipc_path());
        Ok(Self {
            process,
            connection,
            projector,
            issuer,
        })
    }

    pub fn store(&self) -> &PlayerStateStore {
        self.projector.store()
    }

    pub fn issuer(&self) -> &CommandIssuer {
        &self.issuer
    }

    /// Get a future which resolves when the mpv connection has been closed.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.connection.closed()
    }

    /// Stop synchronizing the player state and terminate mpv.
    pub async fn shutdown(mut self) {
        debug!("Shutting down glide");
        self.projector.stop();
        self.connection.close();
        if let Err(e) = self.process.kill().await {
            warn!("Failed to terminate mpv, {}", e);
        }
        info!("Glide has been stopped");
    }

    fn log_state_changes(store: &PlayerStateStore) {
        let mut receiver = store.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => match &*event {
                        PlayerStateEvent::Changed(state) => {
                            info!("Player state changed to {}", state)
                        }
                        PlayerStateEvent::Reset(state) => {
                            info!("Player state has been reset to {}", state)
                        }
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Skipped logging {} player state changes", skipped)
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}
