// Utils - Cancel
// Cancellation utilities

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Create a new cancellation token
pub fn cancel_token() -> CancellationToken {
    CancellationToken::new()
}

/// Cancel `token` on the first Ctrl-C. The listener task ends once the token
/// is cancelled by anyone.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => interrupt(&token),
                Err(e) => warn!("Failed to listen for Ctrl-C: {e}"),
            },
        }
    })
}

/// Cancel `token` in response to a user interrupt. In-flight requests are
/// dropped, not awaited.
fn interrupt(token: &CancellationToken) {
    info!("Interrupt received, abandoning in-flight hands");
    token.cancel();
}
