/// Errors from hashing and object-id handling.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("'{character}' at offset {position} is not a hex digit")]
    InvalidHex { position: usize, character: char },

    #[error("hex string of {actual} digits where {expected} were expected")]
    InvalidHexLength { expected: usize, actual: usize },

    #[error("digest of {actual} bytes where {expected} were expected")]
    InvalidHashLength { expected: usize, actual: usize },

    #[error("SHA-1 collision detected")]
    Sha1Collision,
}
