mod registry;

pub use registry::{
    DEFAULT_AUTH_PATH, DEFAULT_BINSTORE_PATH, DEFAULT_HOST, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_METASTORE_PATH, DEFAULT_PORT, DEFAULT_TOKEN_TTL_SECS, ENV_PREFIX, MIN_TOKEN_TTL_SECS,
    RegistryConfig,
};
