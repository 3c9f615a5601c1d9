//! Background fetch owned by a splash session.
//!
//! The download runs in a spawned tokio task; its result comes back over a
//! oneshot channel and is only applied when the owning loop calls
//! [`BackgroundFetch::poll`]. Cancelling aborts the task and drops the
//! receiver, so a result produced afterwards has nowhere to go.

use std::sync::Arc;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::oneshot;

use splash_fetch::{AssetFetcher, ErrorCode, FetchError};
use splash_types::{FetchStatus, FetchedAsset, NotSuccessful};

type FetchResult = Result<FetchedAsset, FetchError>;

/// Terminal result handed to the owning loop exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Completed(FetchedAsset),
    NotSuccessful(NotSuccessful),
}

#[derive(Debug)]
pub struct BackgroundFetch {
    url: String,
    status: FetchStatus,
    abort_handle: AbortHandle,
    rx: Option<oneshot::Receiver<FetchResult>>,
    failure: Option<NotSuccessful>,
}

impl BackgroundFetch {
    /// Spawn the download. Requires a tokio runtime.
    pub fn start(fetcher: Arc<dyn AssetFetcher>, url: impl Into<String>) -> Self {
        let url = url.into();
        let (tx, rx) = oneshot::channel();
        let (abort_handle, abort_registration) = AbortHandle::new_pair();

        let task_url = url.clone();
        let task = async move {
            let result = fetcher.fetch(&task_url).await;
            let _ = tx.send(result);
        };
        tokio::spawn(async move {
            let _ = Abortable::new(task, abort_registration).await;
        });

        tracing::debug!(url = %url, "Asset download started");

        Self {
            url,
            status: FetchStatus::Running,
            abort_handle,
            rx: Some(rx),
            failure: None,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Why the fetch ended without a payload, once it has.
    #[must_use]
    pub fn failure(&self) -> Option<&NotSuccessful> {
        self.failure.as_ref()
    }

    /// Apply a finished download, if one is waiting.
    ///
    /// Returns the outcome the first time the fetch reaches a terminal
    /// status through completion or failure; `None` otherwise.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        if self.status.is_terminal() {
            return None;
        }
        let rx = self.rx.as_mut()?;

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(FetchError::new(
                ErrorCode::Internal,
                "fetch task ended without a result",
            )),
        };
        self.rx = None;

        match result {
            Ok(asset) => {
                self.status = FetchStatus::Completed;
                tracing::info!(
                    url = %asset.url,
                    format = %asset.format,
                    bytes = asset.len(),
                    "Asset downloaded"
                );
                Some(FetchOutcome::Completed(asset))
            }
            Err(err) => {
                tracing::warn!(
                    url = %self.url,
                    code = %err.code,
                    retryable = err.retryable,
                    "Asset download not successful: {err}"
                );
                let failure = NotSuccessful::Failed {
                    reason: err.to_string(),
                };
                self.finish_unsuccessful(failure.clone());
                Some(FetchOutcome::NotSuccessful(failure))
            }
        }
    }

    /// Request cancellation.
    ///
    /// Returns `false` without doing anything when the fetch is already
    /// terminal. The underlying request may keep running briefly; its result
    /// is discarded.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.abort_handle.abort();
        self.rx = None;
        tracing::info!(url = %self.url, "Asset download not successful: cancelled");
        self.finish_unsuccessful(NotSuccessful::Cancelled);
        true
    }

    fn finish_unsuccessful(&mut self, failure: NotSuccessful) {
        self.status = FetchStatus::Cancelled;
        self.failure = Some(failure);
    }
}

impl Drop for BackgroundFetch {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}
