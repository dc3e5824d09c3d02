use alloy_primitives::U256;
use eyre::{Result, eyre};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;

/// Pending transaction from a newPendingTransactions subscription (full bodies)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTx {
    #[serde(rename = "hash")]
    pub hash: String,
    #[serde(rename = "from", default)]
    pub from: Option<String>,
    #[serde(rename = "to", default)]
    pub to: Option<String>,
    #[serde(rename = "value", default)]
    pub value: Option<String>,
}

impl PendingTx {
    /// Parse transfer value from hex string; a missing value field reads as zero
    pub fn value_wei(&self) -> Result<U256> {
        match &self.value {
            Some(value) => {
                let value_str = value.trim_start_matches("0x");
                U256::from_str_radix(value_str, 16)
                    .map_err(|e| eyre!("Invalid transaction value format: {}", e))
            }
            None => Ok(U256::ZERO),
        }
    }
}

/// WebSocket manager watching the mempool for whale-sized transfers
pub struct WebSocketManager {
    rpc_url: String,
    whale_threshold: U256,
    connection_timeout: Duration,
    max_reconnect_attempts: u32,
    reconnect_delay: Duration,
}

impl WebSocketManager {
    pub fn new(
        rpc_url: String,
        whale_threshold: U256,
        connection_timeout: Duration,
        max_reconnect_attempts: u32,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            rpc_url,
            whale_threshold,
            connection_timeout,
            max_reconnect_attempts,
            reconnect_delay,
        }
    }

    /// Start subscribing to pending transactions at or above the whale threshold
    /// Returns a receiver for matching transactions and a shutdown sender
    pub async fn subscribe_whale_transfers(&self) -> Result<(mpsc::Receiver<PendingTx>, mpsc::Sender<()>)> {
        let (tx_tx, tx_rx) = mpsc::channel(100);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let rpc_url = self.rpc_url.clone();
        let whale_threshold = self.whale_threshold;
        let connection_timeout = self.connection_timeout;
        let max_reconnect_attempts = self.max_reconnect_attempts;
        let reconnect_delay = self.reconnect_delay;

        // Spawn WebSocket management task
        tokio::spawn(async move {
            let mut reconnect_count = 0;

            loop {
                match Self::connect_and_subscribe(
                    &rpc_url,
                    whale_threshold,
                    connection_timeout,
                    &tx_tx,
                    &mut shutdown_rx,
                ).await {
                    Ok(()) => {
                        info!("WebSocket subscription ended normally");
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket connection error: {}", e);
                        reconnect_count += 1;

                        if reconnect_count >= max_reconnect_attempts {
                            error!("Max reconnection attempts reached, giving up");
                            break;
                        }

                        warn!("Attempting reconnection #{} in {:?}", reconnect_count, reconnect_delay);
                        sleep(reconnect_delay).await;
                    }
                }
            }
        });

        Ok((tx_rx, shutdown_tx))
    }

    /// Connect to WebSocket and handle subscription
    async fn connect_and_subscribe(
        rpc_url: &str,
        whale_threshold: U256,
        connection_timeout: Duration,
        tx_tx: &mpsc::Sender<PendingTx>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<()> {
        // Parse and connect to WebSocket URL
        let url = Url::parse(rpc_url)?;
        info!("Connecting to WebSocket: {}", url);

        let (ws_stream, _) = timeout(connection_timeout, connect_async(url.as_str())).await
            .map_err(|_| eyre!("WebSocket connection timeout"))?
            .map_err(|e| eyre!("WebSocket connection failed: {}", e))?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        // Subscribe to pending transactions with full bodies
        let subscribe_request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_subscribe",
            "params": ["newPendingTransactions", true]
        });

        ws_sender.send(Message::Text(subscribe_request.to_string().into())).await?;
        info!("Sent newPendingTransactions subscription request");

        // Wait for subscription confirmation
        let subscription_id = match ws_receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                let response: Value = serde_json::from_str(text.as_str())?;
                if let Some(result) = response.get("result") {
                    info!("Subscription confirmed with ID: {}", result);
                    result.as_str()
                        .ok_or_else(|| eyre!("Invalid subscription ID format"))?
                        .to_string()
                } else if let Some(error) = response.get("error") {
                    return Err(eyre!("Subscription error: {}", error));
                } else {
                    return Err(eyre!("Unexpected subscription response: {}", text));
                }
            }
            Some(Ok(msg)) => {
                return Err(eyre!("Unexpected message type during subscription: {:?}", msg));
            }
            Some(Err(e)) => {
                return Err(eyre!("WebSocket error during subscription: {}", e));
            }
            None => {
                return Err(eyre!("WebSocket closed during subscription"));
            }
        };

        info!("Successfully subscribed to newPendingTransactions with ID: {}", subscription_id);

        // Main event loop
        loop {
            tokio::select! {
                // Handle incoming WebSocket messages
                ws_msg = ws_receiver.next() => {
                    match ws_msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = Self::handle_message(text.as_str(), whale_threshold, tx_tx).await {
                                warn!("Failed to handle WebSocket message: {}", e);
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("WebSocket closed by server");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            // Respond to ping with pong
                            if let Err(e) = ws_sender.send(Message::Pong(data)).await {
                                error!("Failed to send pong: {}", e);
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore other message types
                        }
                        Some(Err(e)) => {
                            error!("WebSocket error: {}", e);
                            break;
                        }
                        None => {
                            info!("WebSocket stream ended");
                            break;
                        }
                    }
                }

                // Handle shutdown signal
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle incoming WebSocket message
    async fn handle_message(text: &str, whale_threshold: U256, tx_tx: &mpsc::Sender<PendingTx>) -> Result<()> {
        let message: Value = serde_json::from_str(text)?;

        // Check if this is a subscription notification
        if let Some(params) = message.get("params") {
            if let Some(result) = params.get("result") {
                // Parse pending transaction body
                let pending_tx: PendingTx = serde_json::from_value(result.clone())?;

                let value = pending_tx.value_wei()?;
                if value < whale_threshold {
                    return Ok(());
                }

                debug!("Whale transfer {} with value {}", pending_tx.hash, value);

                // Send to channel (non-blocking)
                if let Err(e) = tx_tx.try_send(pending_tx) {
                    match e {
                        mpsc::error::TrySendError::Full(_) => {
                            warn!("Pending transaction channel is full, dropping transaction");
                        }
                        mpsc::error::TrySendError::Closed(_) => {
                            return Err(eyre!("Pending transaction channel is closed"));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
