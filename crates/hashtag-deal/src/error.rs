use thiserror::Error;

/// Deal contract error types
#[derive(Error, Debug, Clone)]
pub enum DealError {
    /// Caller lacks the required role for the action
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Item is not in the state the requested transition needs
    #[error("Item {item_id} is {status}: {action} not allowed")]
    InvalidState {
        item_id: u64,
        status: String,
        action: String,
    },

    /// Referenced item id does not exist
    #[error("Item not found: {0}")]
    NotFound(u64),

    /// Deposit amount does not match the expected formula result
    #[error("Amount mismatch: expected {expected}, got {actual}")]
    AmountMismatch { expected: String, actual: String },

    /// Arbitration fraction outside `[0, 2 * item_value]`
    #[error("Seeker fraction out of range: {fraction} exceeds {max}")]
    RangeError { fraction: String, max: String },

    /// Value computation would overflow the numeric domain
    #[error("Arithmetic overflow in value computation")]
    ArithmeticOverflow,

    /// Deposit payload could not be decoded
    #[error("Invalid deposit payload: {0}")]
    InvalidPayload(String),

    /// Value ledger operation failed
    #[error("Ledger error: {0}")]
    Ledger(String),
}

/// Result type for deal contract operations
pub type Result<T> = std::result::Result<T, DealError>;
