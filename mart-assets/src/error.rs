use mart_blob::BlobError;
use thiserror::Error;

use crate::AssetSlot;

/// Result type for asset operations
pub type AssetResult<T> = Result<T, AssetError>;

/// Everything a replacement call can fail with
#[derive(Error, Debug)]
pub enum AssetError {
    /// Rejected before anything was uploaded
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The inbound frame sequence was malformed or the transport broke
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("File {filename:?} is too large: {size} > {limit} bytes")]
    SizeLimitExceeded { filename: String, size: u64, limit: u64 },

    /// Reading or writing the owner record failed
    #[error("Persistence failed: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("Blob store failed: {0}")]
    Blob(#[from] BlobError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("file extension not supported: {extension:?} ({filename})")]
    UnsupportedExtension { filename: String, extension: String },

    #[error("slot {slot} takes {expected} file(s), got {actual}")]
    FileCount {
        slot: AssetSlot,
        expected: &'static str,
        actual: usize,
    },

    #[error("owner record has no {slot} slot")]
    UnsupportedSlot { slot: AssetSlot },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("first frame must carry the owner id")]
    MissingOwner,

    #[error("owner id sent more than once")]
    DuplicateOwner,

    #[error("chunk received before any filename")]
    ChunkWithoutFile,

    #[error("incomplete frame sequence")]
    Incomplete,

    #[error("cannot receive frame: {0}")]
    Receive(String),
}

/// Errors returned by an [`EntityRepository`](crate::EntityRepository)
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("owner {owner_id} not found")]
    NotFound { owner_id: u64 },

    #[error("conflicting update for owner {owner_id}: {message}")]
    Conflict { owner_id: u64, message: String },

    #[error("repository backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(error))
    }
}

/// Transport-facing error classes with their HTTP status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,   // 400
    NotFound,     // 404
    Conflict,     // 409
    GeneralError, // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::GeneralError => 500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::GeneralError => "GeneralError",
        }
    }
}

impl AssetError {
    /// How the calling service layer should report this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssetError::Validation(_)
            | AssetError::Transfer(_)
            | AssetError::SizeLimitExceeded { .. } => ErrorKind::BadRequest,
            AssetError::Persistence(RepositoryError::NotFound { .. }) => ErrorKind::NotFound,
            AssetError::Persistence(RepositoryError::Conflict { .. }) => ErrorKind::Conflict,
            AssetError::Persistence(RepositoryError::Backend(_)) | AssetError::Blob(_) => {
                ErrorKind::GeneralError
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let validation = AssetError::from(ValidationError::UnsupportedExtension {
            filename: "a.gif".into(),
            extension: ".gif".into(),
        });
        assert_eq!(validation.status_code(), 400);
        assert_eq!(AssetError::from(TransferError::Incomplete).kind(), ErrorKind::BadRequest);

        let too_big = AssetError::SizeLimitExceeded {
            filename: "a.png".into(),
            size: 9,
            limit: 8,
        };
        assert_eq!(too_big.kind().name(), "BadRequest");
    }

    #[test]
    fn repository_errors_keep_their_class() {
        let missing = AssetError::from(RepositoryError::NotFound { owner_id: 3 });
        assert_eq!(missing.status_code(), 404);

        let conflict = AssetError::from(RepositoryError::Conflict {
            owner_id: 3,
            message: "stale row".into(),
        });
        assert_eq!(conflict.status_code(), 409);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "pool closed");
        assert_eq!(AssetError::from(RepositoryError::backend(io)).status_code(), 500);
    }

    #[test]
    fn blob_errors_are_server_errors() {
        let err = AssetError::from(BlobError::bucket_missing("assets"));
        assert_eq!(err.kind(), ErrorKind::GeneralError);
    }

    #[test]
    fn transfer_message_matches_protocol_wording() {
        assert_eq!(
            AssetError::from(TransferError::Incomplete).to_string(),
            "Transfer failed: incomplete frame sequence"
        );
    }
}
