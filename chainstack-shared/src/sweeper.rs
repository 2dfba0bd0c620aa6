/// Background purge of expired access tokens
///
/// [`TokenSweeper::start`] spawns a task that calls
/// [`TokenManager::purge_expired`] once immediately and then on every interval
/// tick. A failed run is logged and the schedule continues. The task runs until
/// [`SweeperHandle::stop`] is called.
///
/// # Example
///
/// ```no_run
/// use chainstack_shared::auth::TokenManager;
/// use chainstack_shared::sweeper::TokenSweeper;
/// use std::time::Duration;
///
/// # async fn example(tokens: TokenManager) {
/// let handle = TokenSweeper::new(tokens, Duration::from_secs(3600)).start();
///
/// // ... serve requests ...
///
/// handle.stop().await;
/// # }
/// ```

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::TokenManager;

/// Default purge cadence
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Scheduled purge of expired tokens
pub struct TokenSweeper {
    tokens: TokenManager,
    interval: Duration,
}

/// Running sweeper
pub struct SweeperHandle {
    shutdown_token: CancellationToken,
    task: JoinHandle<()>,
}

impl TokenSweeper {
    pub fn new(tokens: TokenManager, interval: Duration) -> Self {
        Self { tokens, interval }
    }

    /// Spawns the purge loop on the current runtime
    pub fn start(self) -> SweeperHandle {
        let shutdown_token = CancellationToken::new();
        let cancel = shutdown_token.clone();

        info!(interval_secs = self.interval.as_secs(), "Token sweeper starting");

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                match self.tokens.purge_expired().await {
                    Ok(removed) if removed > 0 => info!(removed, "Purged expired access tokens"),
                    Ok(_) => debug!("No expired access tokens to purge"),
                    Err(e) => error!(error = %e, "Failed to purge expired access tokens"),
                }
            }

            info!("Token sweeper stopped");
        });

        SweeperHandle {
            shutdown_token,
            task,
        }
    }
}

impl SweeperHandle {
    /// Stops the sweeper and waits for the loop to exit
    pub async fn stop(self) {
        self.shutdown_token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Token sweeper task did not exit cleanly");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
