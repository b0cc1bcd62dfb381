// # dyndns-server
//
// HTTP front end of the DynDNS bridge.
//
// ## Request Flow
//
// 1. `/health` answers directly
// 2. Every other path passes the basic-auth gate
// 3. The handler extracts hostname and client IP, builds an `UpdateIntent`
//    and calls `DnsProvider::update_record` under the request timeout
// 4. The outcome is rendered as a DynDNS status line (`good`, `notfqdn`, `911`)
//
// Provider errors never reach the wire in detail; they are logged and
// collapsed into `911`.

pub mod auth;
pub mod handler;
pub mod protocol;
pub mod router;
pub mod server;
pub mod state;

pub use auth::BasicAuth;
pub use protocol::{RequestForm, ResponseStatus, UpdateIntent, UpdateParams};
pub use router::build_router;
pub use server::{DEFAULT_SHUTDOWN_TIMEOUT, run_http_server, serve};
pub use state::{AppState, DEFAULT_REQUEST_TIMEOUT};
