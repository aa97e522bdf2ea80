pub use command::*;
pub use errors::*;
pub use issuer::*;
pub use transport::*;

mod command;
mod errors;
mod issuer;
mod transport;
