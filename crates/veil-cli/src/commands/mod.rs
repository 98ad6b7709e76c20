//! Command handlers, one module per command family.

mod batch;
mod init;
mod notes;
mod report;
mod session;
mod status;

pub use batch::{handle_change_password, handle_lock, handle_recover, handle_unlock};
pub use init::handle_init;
pub use notes::{handle_cat, handle_write};
pub use session::handle_session;
pub use status::handle_status;
