pub use discovery::*;

mod discovery;
