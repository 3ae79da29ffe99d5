// restconf-core: Config-block lifecycle and drift detection on top of restconf-api.

pub mod block;
pub mod canonical;
pub mod config;
pub mod error;
pub mod reconciler;

// ── Primary re-exports ──────────────────────────────────────────────
pub use block::{BlockState, ConfigBlock};
pub use canonical::{CanonicalForm, canonicalize, documents_equal};
pub use config::{DeviceConnection, TlsVerification};
pub use error::{CoreError, Outcome, TransportCause};
pub use reconciler::{Reconciler, Refresh};

// Transport types callers need to drive the reconciler.
pub use restconf_api::{CancellationToken, Endpoint, RequestContext};
