/// Data Synchronization Layer
///
/// Chain-facing plumbing for the strike pipeline:
///
/// - WebSocket-based mempool subscription (whale-sized pending transfers)
/// - Read-only pool reserve queries over JSON-RPC
/// - Runtime configuration with environment overrides

pub mod config;
pub mod reserves;
pub mod websocket;

// Re-export main components for easy usage
pub use config::WatchConfig;
pub use reserves::{MockReserveSource, OracleError, ReserveSource, RpcReserveSource};
pub use websocket::{PendingTx, WebSocketManager};
