//! Config-block lifecycle state machine.
//!
//! Maps desired-state operations onto device calls:
//!
//! | Operation | Transition        | Device calls                  |
//! |-----------|-------------------|-------------------------------|
//! | create    | Absent → Present  | GET (must be absent), PUT, GET |
//! | read      | Present → Present | GET                           |
//! | update    | Present → Present | PUT, GET                      |
//! | delete    | Present → Absent  | DELETE                        |
//! | import    | id → Present      | GET                           |
//!
//! Every transition is all-or-nothing on the local block: work happens on a
//! staged copy that replaces the caller's block only once all device calls
//! have succeeded. The reconciler never retries.

use restconf_api::{RequestContext, RestconfClient};
use tracing::{debug, info, warn};

use crate::block::ConfigBlock;
use crate::canonical::canonicalize;
use crate::config::DeviceConnection;
use crate::error::CoreError;

/// Result of refreshing a block from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// Device and tracked content are canonically equal; nothing changed.
    InSync,
    /// The device held a different document; tracked content now mirrors it.
    Drifted { previous: String },
}

impl Refresh {
    pub fn drifted(&self) -> bool {
        matches!(self, Self::Drifted { .. })
    }
}

/// Drives [`ConfigBlock`] transitions against one device.
///
/// Holds no per-block state. Callers must serialize operations on the same
/// block; operations on different blocks may run concurrently.
#[derive(Debug, Clone)]
pub struct Reconciler {
    client: RestconfClient,
}

impl Reconciler {
    pub fn new(client: RestconfClient) -> Self {
        Self { client }
    }

    /// Build the transport client for `connection` and wrap it.
    pub fn connect(connection: &DeviceConnection) -> Result<Self, CoreError> {
        Ok(Self::new(connection.connect()?))
    }

    /// The underlying transport client, for raw reads.
    pub fn client(&self) -> &RestconfClient {
        &self.client
    }

    /// Absent → Present.
    ///
    /// Refuses to adopt a document that already exists on the device: a
    /// non-empty read fails with [`CoreError::Conflict`] so the operator
    /// imports it explicitly instead of overwriting it.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        block: &mut ConfigBlock,
    ) -> Result<Refresh, CoreError> {
        block.require_absent("create")?;
        canonicalize(block.content())?;
        let path = block.path().to_owned();

        match self.client.read(ctx, &path).await {
            Ok(existing) if !existing.trim().is_empty() => {
                return Err(CoreError::Conflict { path });
            }
            Ok(_) => debug!(%path, "device returned an empty document, treating as absent"),
            Err(e) if e.is_not_found() => debug!(%path, "no existing document"),
            Err(e) => return Err(e.into()),
        }

        self.client.create(ctx, &path, block.content()).await?;

        let mut staged = block.clone();
        staged.assign_id();
        let refresh = self.refresh(ctx, &mut staged).await?;
        *block = staged;

        info!(%path, "config block created");
        Ok(refresh)
    }

    /// Present → Present. Accepts the device's document when it differs
    /// canonically from the tracked one.
    ///
    /// A `404` is surfaced as [`CoreError::NotFound`]; the block stays
    /// Present so the caller decides what vanishing means.
    pub async fn read(
        &self,
        ctx: &RequestContext,
        block: &mut ConfigBlock,
    ) -> Result<Refresh, CoreError> {
        self.refresh(ctx, block).await
    }

    /// Present → Present. Full replace with `desired`, then re-read so the
    /// tracked content reflects what the device actually stored.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        block: &mut ConfigBlock,
        desired: String,
    ) -> Result<Refresh, CoreError> {
        let id = block.require_present("update")?.to_owned();
        canonicalize(&desired)?;

        self.client.update(ctx, &id, &desired).await?;

        let mut staged = block.clone();
        staged.set_content(desired);
        let refresh = self.refresh(ctx, &mut staged).await?;
        *block = staged;

        info!(path = %id, "config block updated");
        Ok(refresh)
    }

    /// Present → Absent. On failure the block is left untouched.
    pub async fn delete(&self, ctx: &RequestContext, block: &mut ConfigBlock) -> Result<(), CoreError> {
        let id = block.require_present("delete")?.to_owned();

        self.client.delete(ctx, &id).await?;
        block.clear();

        info!(path = %id, "config block deleted");
        Ok(())
    }

    /// External identifier → Present, without any create call.
    pub async fn import(&self, ctx: &RequestContext, id: &str) -> Result<ConfigBlock, CoreError> {
        let mut block = ConfigBlock::adopt(id);

        match self.refresh(ctx, &mut block).await {
            Ok(_) => {
                info!(path = %id, "config block imported");
                Ok(block)
            }
            Err(CoreError::NotFound { path }) => Err(CoreError::NothingToImport { path }),
            Err(e) => Err(e),
        }
    }

    async fn refresh(
        &self,
        ctx: &RequestContext,
        block: &mut ConfigBlock,
    ) -> Result<Refresh, CoreError> {
        let id = block.require_present("read")?.to_owned();

        let remote = self.client.read(ctx, &id).await?;
        let observed = canonicalize(&remote)?;
        let tracked = canonicalize(block.content())?;

        if observed == tracked {
            debug!(path = %id, "device document matches tracked content");
            return Ok(Refresh::InSync);
        }

        let previous = block.content().to_owned();
        if previous.is_empty() {
            debug!(path = %id, "populated content from device");
        } else {
            warn!(path = %id, "drift detected, accepting device document");
        }
        block.set_content(observed.into_string());
        Ok(Refresh::Drifted { previous })
    }
}
