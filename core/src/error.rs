// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VitrineError {
    /// The only stock error a customer ever sees. `available` is the stock read
    /// inside the transaction that refused the decrement.
    #[error("Not enough stock for {product_name}. Only {available} left.")]
    InsufficientStock {
        product_id: String,
        product_name: String,
        available: u32,
    },

    #[error("{product_name} is sold out.")]
    OutOfStock { product_id: String, product_name: String },

    #[error("The cart is empty.")]
    EmptyCart,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Not signed in.")]
    Unauthenticated,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Incorrect password. Please try again.")]
    IncorrectPassword,

    #[error("An account already exists for {0}.")]
    EmailInUse(String),

    #[error("This account is not an admin. Use client sign-in or contact support.")]
    NotAdmin,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backend refused a commit because a document read by the transaction
    /// changed underneath it. Retried by the reservation loop before surfacing.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Image host error: {0}")]
    ImageHost(String),

    #[error("Backend error. Source: {source}")]
    Backend {
        #[source]
        source: AnyhowError,
    },
}

impl VitrineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        VitrineError::NotFound { entity, id: id.into() }
    }

    /// Whether the reservation loop should run the transaction again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VitrineError::Conflict(_))
    }
}

impl From<AnyhowError> for VitrineError {
    fn from(err: AnyhowError) -> Self {
        VitrineError::Backend { source: err }
    }
}

pub type VitrineResult<T, E = VitrineError> = std::result::Result<T, E>;
