use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("requested resource was not found")]
    NotFound,

    #[error("resource already exists and cannot be overwritten")]
    AlreadyExists,

    #[error("version not found")]
    VersionNotFound,

    #[error("resource disabled")]
    Disabled,

    #[error("not authorized")]
    NotAuthorized,

    #[error("username cannot be empty")]
    UsernameEmpty,

    #[error("password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("user does not exist")]
    UserDoesNotExist,

    #[error("password does not match")]
    PasswordMismatch,

    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    TokenExpired,

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid artifact id: {0}")]
    InvalidArtifactId(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

pub type Result<T> = std::result::Result<T, Error>;
