pub mod constants;
pub mod input;
pub mod session;
pub mod state;
pub mod systems;
