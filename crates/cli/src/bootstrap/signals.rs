use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

pub const INTERRUPTED_EXIT_CODE: u8 = 130;

/// First Ctrl+C cancels `cancel` so the run can wind down and still write
/// its reports. A second one exits immediately.
pub fn install_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for Ctrl+C");
            return;
        }
        warn!("Interrupt received, cancelling pending lookups (press Ctrl+C again to exit now)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Second interrupt, exiting");
            std::process::exit(i32::from(INTERRUPTED_EXIT_CODE));
        }
    });
}
