use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("failed to create data directory at {path}"))]
    CreateDataDir {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to read '{key}' from {path}"))]
    Read {
        key: &'static str,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to write '{key}' to {path}"))]
    Write {
        key: &'static str,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize '{key}': {source}"))]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("stored '{key}' is not a valid collection: {source}"))]
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("'{key}' could not be read at startup; leaving the stored copy untouched"))]
    Unreadable { key: &'static str },
    #[snafu(display("storage quota exceeded writing '{key}' ({needed} of {quota} bytes)"))]
    QuotaExceeded {
        key: &'static str,
        needed: usize,
        quota: usize,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
