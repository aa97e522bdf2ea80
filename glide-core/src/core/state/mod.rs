pub use player_state::*;
pub use store::*;

mod player_state;
mod store;
