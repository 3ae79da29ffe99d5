// restconf-api: Async RESTCONF transport client (whole-document PUT/GET/DELETE)

pub mod auth;
pub mod client;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod transport;

pub use auth::Credentials;
pub use client::{RestconfClient, YANG_DATA_JSON};
pub use context::RequestContext;
pub use endpoint::{DEFAULT_PORT, DEFAULT_SCHEME, Endpoint};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};

pub use tokio_util::sync::CancellationToken;
