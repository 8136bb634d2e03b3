//! Merging the anonymous cart into the server cart.

use tracing::{debug, error, info, warn};

use crate::{error::ClientError, repository::CartRepository, session::Session, view::CartView};

/// Result of a merge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The server cart after the merge.
    Merged(CartView),

    /// The session was anonymous or had already merged.
    Skipped,
}

/// Runs the one-shot merge guarded by the session's [`MergeState`](crate::session::MergeState).
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeCoordinator;

impl MergeCoordinator {
    /// Send every local line to the server in one batch, clear local storage and return the
    /// re-fetched server cart. An empty local cart only fetches.
    ///
    /// On failure the local cart is untouched and the session returns to `NotMerged`.
    ///
    /// # Errors
    ///
    /// Returns the error from whichever repository call failed.
    pub async fn merge_local_cart_into_remote(
        &self,
        session: &mut Session,
        local: &dyn CartRepository,
        remote: &dyn CartRepository,
    ) -> Result<MergeOutcome, ClientError> {
        if !session.begin_merge() {
            debug!(merge_state = ?session.merge_state(), "skipping cart merge");

            return Ok(MergeOutcome::Skipped);
        }

        match Self::run(local, remote).await {
            Ok(view) => {
                session.complete_merge();

                Ok(MergeOutcome::Merged(view))
            }
            Err(merge_error) => {
                session.abort_merge();

                warn!(error = %merge_error, "cart merge failed, keeping the local cart");

                Err(merge_error)
            }
        }
    }

    async fn run(
        local: &dyn CartRepository,
        remote: &dyn CartRepository,
    ) -> Result<CartView, ClientError> {
        let anonymous = local.fetch().await?;

        if anonymous.is_empty() {
            return remote.fetch().await;
        }

        let line_count = anonymous.lines.len();

        match remote.merge(anonymous.lines).await {
            Ok(_) => {}
            Err(merge_error) if merge_error.was_applied() => {
                warn!(error = %merge_error, "merged cart could not be reloaded");
            }
            Err(merge_error) => return Err(merge_error),
        }

        // The server holds these lines now, so a failed clear is logged rather than returned.
        if let Err(clear_error) = local.clear().await {
            error!(error = %clear_error, "failed to clear the local cart after merging");
        }

        info!(line_count, "merged anonymous cart");

        remote.fetch().await
    }
}
