use std::sync::Arc;

use async_trait::async_trait;
use fanout_core::{Task, TaskError};
use fanout_model::TaskId;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::FetchError;

/// Opaque blocking collaborator that fetches a resource body by id.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, id: u64) -> Result<String, FetchError>;
}

pub type FetchRef = Arc<dyn Fetch>;

/// Task that fetches one resource; the task id doubles as the resource id.
pub struct FetchTask {
    id: TaskId,
    fetcher: FetchRef,
}

impl FetchTask {
    pub fn new(id: impl Into<TaskId>, fetcher: FetchRef) -> Self {
        Self {
            id: id.into(),
            fetcher,
        }
    }
}

#[async_trait]
impl Task for FetchTask {
    fn id(&self) -> TaskId {
        self.id
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        let id = self.id.get();

        let res = tokio::select! {
            res = self.fetcher.fetch(id) => res,
            _ = ctx.cancelled() => return Err(TaskError::Canceled),
        };

        match res {
            Ok(body) => {
                info!(target: "fanout.exec.fetch", id, bytes = body.len(), "fetched resource");
                Ok(())
            }
            Err(e) => {
                error!(target: "fanout.exec.fetch", id, error = %e, "error fetching resource");
                Err(TaskError::fail(e.to_string()))
            }
        }
    }
}
