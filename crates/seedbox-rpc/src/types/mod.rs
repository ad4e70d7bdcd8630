//! Records exchanged with the daemon.
//!
//! Every record derives `Default` and uses `#[serde(default)]` so partial
//! responses (a `torrent-get` with a reduced field list, an older daemon
//! missing newer keys) still decode.

mod group;
mod session;
mod system;
mod torrent;

pub use group::*;
pub use session::*;
pub use system::*;
pub use torrent::*;
