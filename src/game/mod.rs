//! Game state modules

pub mod player;
pub mod score;
pub mod session;

pub use player::Player;
pub use session::{ScoreboardSnapshot, Session, SessionMaxima};
