//! Typed failures raised while fetching and decoding assets.
//!
//! Loaders surface these through `anyhow::Result`, so callers that only care
//! about success can keep using `?`, while callers that need to branch on the
//! failure kind can `downcast_ref::<LoadError>()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// A required asset could not be reached.
    #[error("could not fetch asset `{path}`: {source}")]
    Fetch {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode image `{path}`: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("could not read scene asset `{path}`: {source}")]
    Gltf {
        path: String,
        #[source]
        source: gltf::Error,
    },

    #[error("scene asset `{path}` references buffer {index}, which holds no data")]
    MissingBuffer { path: String, index: usize },

    #[error("buffer {index} in `{path}` holds {actual} bytes, {expected} declared")]
    TruncatedBuffer {
        path: String,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("malformed data URI in `{path}`: {reason}")]
    DataUri { path: String, reason: String },
}

impl LoadError {
    /// Path of the asset that failed.
    pub fn path(&self) -> &str {
        match self {
            LoadError::Fetch { path, .. }
            | LoadError::Image { path, .. }
            | LoadError::Gltf { path, .. }
            | LoadError::MissingBuffer { path, .. }
            | LoadError::TruncatedBuffer { path, .. }
            | LoadError::DataUri { path, .. } => path,
        }
    }
}
