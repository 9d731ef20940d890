mod db;
pub mod loan;
pub mod patron_action_session;
pub mod testing;

pub use db::*;
