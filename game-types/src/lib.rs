pub mod errors;
pub mod game;
pub mod messages;
pub mod scores;
pub mod user;

/// Opaque identity issued by the remote authority. Compared by equality only.
pub type PlayerId = String;
pub type RoomId = u64;
pub type Category = String;

// Re-export all types
pub use errors::*;
pub use game::*;
pub use messages::*;
pub use scores::*;
pub use user::*;
