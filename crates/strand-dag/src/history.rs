use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strand_protocol::{endpoints, RemoteClient, Request};
use strand_refs::BranchState;
use strand_types::{StoreHash, StoreTag};
use tracing::debug;

use crate::error::DagResult;
use crate::graph::HistoryGraph;

/// Bounds of a history request.
///
/// `min` commits and their ancestors are left out; `max` commits are the
/// newest included. `None` leaves the choice to the remote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery<H> {
    #[serde(skip)]
    pub depth: Option<u32>,
    pub min: Option<Vec<H>>,
    pub max: Option<Vec<H>>,
}

impl<H> HistoryQuery<H> {
    pub fn new() -> Self {
        Self {
            depth: None,
            min: None,
            max: None,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_min(mut self, min: Vec<H>) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: Vec<H>) -> Self {
        self.max = Some(max);
        self
    }
}

impl<H> Default for HistoryQuery<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire form of the remote's history answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReply<H> {
    #[serde(default = "Vec::new")]
    pub vertices: Vec<H>,
    #[serde(default = "Vec::new")]
    pub edges: Vec<(H, H)>,
}

impl<H: Ord + Clone + std::hash::Hash> HistoryReply<H> {
    pub fn into_graph(self) -> HistoryGraph<H> {
        HistoryGraph::from_parts(self.vertices, self.edges)
    }
}

/// Fetches bounded commit history for a handle's branch.
pub struct HistoryClient<H, T> {
    client: RemoteClient,
    state: Arc<BranchState<H, T>>,
}

impl<H: StoreHash, T: StoreTag> HistoryClient<H, T> {
    pub fn new(client: RemoteClient, state: Arc<BranchState<H, T>>) -> Self {
        Self { client, state }
    }

    pub async fn history(&self, query: &HistoryQuery<H>) -> DagResult<HistoryGraph<H>> {
        let request = Request::post()
            .at(&self.state.path()?)
            .segment(endpoints::HISTORY)
            .query_opt(endpoints::DEPTH, query.depth)
            .json_body(query)?;
        let reply: HistoryReply<H> = self.client.send(request).await?;
        debug!(
            vertices = reply.vertices.len(),
            edges = reply.edges.len(),
            "history received"
        );
        Ok(reply.into_graph())
    }
}
