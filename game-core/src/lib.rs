pub mod fallback_store;
pub mod match_events;
pub mod match_view;
pub mod ordering;
pub mod reconciler;
pub mod reveal;
pub mod scoring;
pub mod transition;

// Re-export main components
pub use fallback_store::*;
pub use match_events::*;
pub use match_view::*;
pub use ordering::*;
pub use reconciler::*;
pub use reveal::*;
pub use scoring::*;
pub use transition::*;
