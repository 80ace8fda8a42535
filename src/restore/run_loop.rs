use super::bus::RestoreRequest;
use super::compute_next_delay_for_latest;
use super::fetch::restore_once;
use crate::context::AppContext;
use tokio::sync::mpsc;

/// Periodic session re-validation with on-demand wakeups. The loop sleeps a
/// jittered interval while the session is live, pauses entirely once it is
/// signed out, and always serves bus requests.
pub fn spawn_restore_loop(
    ctx: AppContext,
    mut rx: mpsc::UnboundedReceiver<RestoreRequest>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut next_delay_ms: Option<u64> = Some(0);

        loop {
            if let Some(delay_ms) = next_delay_ms {
                tokio::select! {
                    req = rx.recv() => {
                        let Some(req) = req else { break; };
                        let result = restore_once(&ctx).await;
                        let latest = ctx.latest_session().await;
                        next_delay_ms = compute_next_delay_for_latest(
                            ctx.restore_interval_seconds(),
                            latest.as_ref(),
                        );
                        if let Some(tx) = req.respond_to {
                            let _ = tx.send(result);
                        }
                    }
                    _ = tokio::time::sleep(std::time::Duration::from_millis(delay_ms)) => {
                        let _ = restore_once(&ctx).await;
                        let latest = ctx.latest_session().await;
                        next_delay_ms = compute_next_delay_for_latest(
                            ctx.restore_interval_seconds(),
                            latest.as_ref(),
                        );
                    }
                }
            } else {
                let Some(req) = rx.recv().await else { break; };
                let result = restore_once(&ctx).await;
                let latest = ctx.latest_session().await;
                next_delay_ms = compute_next_delay_for_latest(
                    ctx.restore_interval_seconds(),
                    latest.as_ref(),
                );
                if let Some(tx) = req.respond_to {
                    let _ = tx.send(result);
                }
            }
        }
    })
}
