//! Launch, monitor and terminate the external face-tracking script.
//!
//! - [`spawn`] starts the script with `--server <address> --function <id>`
//! - [`watch`] waits for a launched script to exit
//! - [`process`] terminates processes by PID and finds orphaned script processes
//! - [`output`] keeps the most recent lines the script printed

pub mod output;
pub mod process;
pub mod spawn;
pub mod watch;

pub use output::{OutputLine, OutputLog, OutputStream};
pub use spawn::{LaunchedTracker, launch};
pub use watch::wait_for_exit;
