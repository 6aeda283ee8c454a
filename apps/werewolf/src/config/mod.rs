pub mod game;
pub mod store;

pub use game::GameConfig;
