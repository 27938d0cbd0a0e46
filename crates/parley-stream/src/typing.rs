// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background typing indicator for long-running turns.

use std::sync::Arc;
use std::time::Duration;

use parley_core::ChatTransport;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Starts a background task that sends a typing action every 5 seconds
/// until the `cancel` token is triggered. Best-effort: a failed typing
/// action is logged and the loop continues.
pub fn start_typing_indicator(
    transport: Arc<dyn ChatTransport>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("typing indicator cancelled");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(5)) => {
                    if let Err(e) = transport.typing().await {
                        warn!(error = %e, "failed to send typing indicator");
                    }
                }
            }
        }
    })
}
