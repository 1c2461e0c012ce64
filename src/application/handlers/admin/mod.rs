//! Administrative command handlers.

mod delete_session;
mod flag_session;

pub use delete_session::{DeleteSessionCommand, DeleteSessionHandler};
pub use flag_session::{ClearFlagCommand, ClearFlagHandler, FlagSessionCommand, FlagSessionHandler};
