use crate::types::AppResult;
use tokio::sync::{mpsc, oneshot};

/// Wakes the restoration loop outside its timer, e.g. right after login or
/// when the UI regains focus.
#[derive(Clone)]
pub struct RestoreBus {
    tx: mpsc::UnboundedSender<RestoreRequest>,
}

pub struct RestoreRequest {
    pub(crate) respond_to: Option<oneshot::Sender<AppResult<()>>>,
}

impl RestoreBus {
    pub(crate) fn new(tx: mpsc::UnboundedSender<RestoreRequest>) -> Self {
        Self { tx }
    }

    /// Fire-and-forget wakeup.
    pub fn trigger(&self) {
        let _ = self.tx.send(RestoreRequest { respond_to: None });
    }

    /// Runs one restoration pass and waits for its outcome.
    pub async fn restore_now(&self) -> AppResult<()> {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(RestoreRequest {
                respond_to: Some(tx),
            })
            .is_err()
        {
            return AppResult::err("unknown", "Restore loop is not available.");
        }
        rx.await
            .unwrap_or_else(|_| AppResult::err("unknown", "Restore loop failed."))
    }
}
