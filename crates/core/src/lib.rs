pub mod achievements;
pub mod error;
pub mod leaderboard;
pub mod model;
pub mod results;
pub mod session;
pub mod time;
pub mod timer;

pub use error::Error;
pub use time::Clock;
