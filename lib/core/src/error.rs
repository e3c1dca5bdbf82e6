use thiserror::Error;
use unipoi_schema::ExpectedSchemaError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dataset prefix collision: '{first}' and '{second}' both shorten to '{prefix}'")]
    PrefixCollision {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("Dataset listed more than once: {0}")]
    DuplicateDataset(String),

    #[error("Unknown query layer: {0}")]
    UnknownQueryLayer(String),

    #[error("Invalid expected schema: {0}")]
    InvalidExpectedSchema(#[from] ExpectedSchemaError),

    #[error("Source table not found: {0}")]
    TableNotFound(String),

    #[error("Duplicate poi_id: {0}")]
    DuplicatePoiId(String),

    #[error("Invalid row in '{table}': {reason}")]
    InvalidRow { table: String, reason: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
