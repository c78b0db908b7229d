pub mod config;
pub mod handlers;
pub mod poller;
pub mod remote;
pub mod reveal;
pub mod session;
pub mod watchers;

pub use config::Config;
pub use poller::{PollHandle, PollKind, PollSnapshot, PollStatus, Poller};
pub use remote::{HttpMatchAuthority, MatchAuthority};
pub use reveal::{LetterRevealSequencer, RevealTiming};
pub use session::MatchSession;
