use serde::de::DeserializeOwned;
use serde::Serialize;
use strand_protocol::{endpoints, RemoteClient, Request};
use strand_types::Slice;
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};
use crate::types::ExportQuery;

/// Export and import of slices against one remote store.
///
/// Both operations address the store root regardless of the branch a
/// handle is on.
#[derive(Clone, Debug)]
pub struct SliceTransfer {
    client: RemoteClient,
}

impl SliceTransfer {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    pub async fn export<H>(&self, query: &ExportQuery<H>) -> SyncResult<Slice<H>>
    where
        H: Serialize + DeserializeOwned,
    {
        let request = Request::post()
            .segment(endpoints::EXPORT)
            .query(endpoints::FULL, query.full)
            .query_opt(endpoints::DEPTH, query.depth)
            .json_body(query)
            .map_err(SyncError::Export)?;
        let slice: Slice<H> = self.client.send(request).await.map_err(SyncError::Export)?;
        debug!(
            contents = slice.contents.len(),
            nodes = slice.nodes.len(),
            commits = slice.commits.len(),
            "slice exported"
        );
        Ok(slice)
    }

    pub async fn import<H: Serialize>(&self, slice: &Slice<H>) -> SyncResult<()> {
        let request = Request::post()
            .segment(endpoints::IMPORT)
            .json_body(slice)
            .map_err(SyncError::Import)?;
        self.client.send_unit(request).await.map_err(SyncError::Import)?;
        debug!(objects = slice.len(), "slice imported");
        Ok(())
    }
}

/// Export `query` from `source` and import it into `target`. Returns the
/// number of objects sent.
pub async fn transfer<H>(
    source: &SliceTransfer,
    target: &SliceTransfer,
    query: &ExportQuery<H>,
) -> SyncResult<usize>
where
    H: Serialize + DeserializeOwned,
{
    let slice = source.export(query).await?;
    if slice.is_empty() {
        debug!("nothing to transfer");
        return Ok(0);
    }
    target.import(&slice).await?;
    info!(objects = slice.len(), "slice transferred");
    Ok(slice.len())
}
