pub use connection::*;
pub use errors::*;
pub use process::*;
pub use protocol::*;
pub use transport::*;

mod connection;
mod errors;
mod process;
mod protocol;
mod transport;

/// The properties observed by default on a new mpv connection.
pub const OBSERVED_PROPERTIES: [&str; 7] = [
    "playlist",
    "filename",
    "pause",
    "eof-reached",
    "time-pos",
    "duration",
    "volume",
];
