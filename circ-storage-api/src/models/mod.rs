pub mod loan;
pub mod metadata;
pub mod patron_action_session;

// Re-export models for easier access
pub use loan::*;
pub use metadata::*;
pub use patron_action_session::*;
