// Three-Layer Architecture
pub mod data_sync;   // Data Layer: chain subscription, reserve oracle
pub mod logic;      // Logic Layer: loan sizing policy
pub mod execution;  // Execution Layer: strike encoding and simulation

// Common utilities and types
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{
    MockReserveSource, OracleError, PendingTx, ReserveSource, RpcReserveSource, WatchConfig,
    WebSocketManager,
};
pub use execution::{StrikeConfig, StrikeExecutor, StrikeOutcome};
pub use logic::{GuardConfig, LoanSizingGuard, ReservePair, ReserveSide};
pub use utils::{LoadConfigError, load_from_file, load_from_file_sync};
