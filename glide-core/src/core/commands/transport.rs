use crate::core::commands::{CommandArgs, Result};
use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// The outbound boundary towards the media engine.
///
/// A transport delivers a named command with its named arguments and resolves once the engine
/// acknowledged or rejected it. Calling it repeatedly with the same command must be safe.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CommandTransport: Debug + Send + Sync {
    /// Invoke the given command on the engine.
    ///
    /// # Arguments
    ///
    /// * `command` - The name of the command to execute.
    /// * `args` - The named arguments of the command.
    async fn invoke(&self, command: &str, args: CommandArgs) -> Result<()>;
}
