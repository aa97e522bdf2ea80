pub use errors::*;
pub use event::*;
pub use projector::*;

mod errors;
mod event;
mod projector;
