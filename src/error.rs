//! Error types for sentinel-ndvi

use std::io;

/// Result type for sentinel-ndvi operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while answering an NDVI query
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Geometry is not a well-formed GeoJSON Polygon
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Timestamp is not an ISO-8601 date or date-time
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// No imagery matched, even after widening the search window
    #[error("No data available for the specified area around {0}")]
    NoDataAvailable(String),

    /// Catalog request or response failure
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Items were found but pixels could not be loaded
    #[error("Load error: {0}")]
    Load(String),

    /// Statistics did not collapse to a single value
    #[error("Unexpected result size for NDVI calculations: {0} values")]
    AmbiguousReduction(usize),

    /// Every pixel was missing or undefined
    #[error("No valid NDVI pixels inside the polygon")]
    NoValidPixels,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid TIFF format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid TIFF magic number
    #[error("Invalid TIFF magic number: {0}")]
    InvalidMagic(u16),

    /// Missing required tag
    #[error("Missing required tag: {} ({0})", crate::formats::tiff::tags::tag_name(*.0))]
    MissingTag(u16),

    /// Unsupported feature
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Out of bounds access
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// Projection error
    #[error("Projection error: {0}")]
    Projection(String),
}

/// Transport-level failure category of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// User-correctable input problem
    InvalidInput,
    /// Catalog or imagery could not satisfy a valid request
    UpstreamDataError,
    /// Statistics could not be computed
    ComputationError,
}

impl FailureKind {
    /// Stable identifier used in error responses
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::UpstreamDataError => "upstream_data_error",
            FailureKind::ComputationError => "computation_error",
        }
    }
}

impl Error {
    /// Classifies this error for the request handler
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::InvalidGeometry(_) | Error::InvalidTimestamp(_) => FailureKind::InvalidInput,
            Error::AmbiguousReduction(_) | Error::NoValidPixels => FailureKind::ComputationError,
            _ => FailureKind::UpstreamDataError,
        }
    }

    /// Wraps decoder and transport errors raised while loading pixels
    pub fn into_load(self) -> Self {
        match self {
            Error::Load(_) => self,
            other => Error::Load(other.to_string()),
        }
    }
}
