// RESTCONF document client
//
// One network round trip per call. Every call carries Basic auth, runs under
// the caller's `RequestContext`, and maps the response status onto the small
// outcome taxonomy in `Error`. No caching, no retries: failures go straight
// back to the caller.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::auth::Credentials;
use crate::context::RequestContext;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Media type for RESTCONF JSON documents.
pub const YANG_DATA_JSON: &str = "application/yang-data+json";

/// Async client for whole-document RESTCONF operations on one device.
///
/// Cheap to clone: clones share the underlying connection pool, and the
/// client holds no per-path state, so concurrent calls against different
/// paths are safe.
#[derive(Debug, Clone)]
pub struct RestconfClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    credentials: Credentials,
}

impl RestconfClient {
    /// Build a client bound to `endpoint`, with TLS and timeouts taken from
    /// `transport`.
    pub fn new(
        endpoint: Endpoint,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            endpoint,
            credentials,
        })
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Store a new document at `path`. Expects `204 No Content`.
    pub async fn create(&self, ctx: &RequestContext, path: &str, content: &str) -> Result<(), Error> {
        self.put(ctx, path, content).await
    }

    /// Fetch the document at `path`. Expects `200 OK`; `404` is reported as
    /// [`Error::NotFound`].
    pub async fn read(&self, ctx: &RequestContext, path: &str) -> Result<String, Error> {
        let url = self.endpoint.resource_url(path)?;
        debug!("GET {url}");

        let request = self
            .credentials
            .apply(self.http.get(url))
            .header(ACCEPT, YANG_DATA_JSON);

        ctx.run(async move {
            let resp = request.send().await?;
            match resp.status() {
                StatusCode::OK => Ok(resp.text().await?),
                StatusCode::NOT_FOUND => Err(Error::NotFound {
                    path: path.to_owned(),
                }),
                other => Err(unexpected("GET", path, other)),
            }
        })
        .await
    }

    /// Replace the document at `path`. Same wire call as [`create`](Self::create):
    /// the two differ only in the reconciler's preconditions.
    pub async fn update(&self, ctx: &RequestContext, path: &str, content: &str) -> Result<(), Error> {
        self.put(ctx, path, content).await
    }

    /// Remove the document at `path`. Expects `204 No Content`.
    pub async fn delete(&self, ctx: &RequestContext, path: &str) -> Result<(), Error> {
        let url = self.endpoint.resource_url(path)?;
        debug!("DELETE {url}");

        let request = self.credentials.apply(self.http.delete(url));

        ctx.run(async move {
            let resp = request.send().await?;
            expect_no_content("DELETE", path, resp.status())
        })
        .await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn put(&self, ctx: &RequestContext, path: &str, content: &str) -> Result<(), Error> {
        let url = self.endpoint.resource_url(path)?;
        debug!("PUT {url} ({} bytes)", content.len());

        let request = self
            .credentials
            .apply(self.http.put(url))
            .header(CONTENT_TYPE, YANG_DATA_JSON)
            .body(content.to_owned());

        ctx.run(async move {
            let resp = request.send().await?;
            expect_no_content("PUT", path, resp.status())
        })
        .await
    }
}

fn expect_no_content(method: &'static str, path: &str, status: StatusCode) -> Result<(), Error> {
    if status == StatusCode::NO_CONTENT {
        Ok(())
    } else {
        Err(unexpected(method, path, status))
    }
}

fn unexpected(method: &'static str, path: &str, status: StatusCode) -> Error {
    debug!("{method} '{path}' returned {status}");
    Error::UnexpectedStatus {
        method,
        path: path.to_owned(),
        status: status.as_u16(),
    }
}
