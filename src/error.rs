//! Recoverable error conditions.
//!
//! Only failures that originate outside the core (graphics context, uploads,
//! display queries, export I/O) are represented here. Broken internal
//! invariants such as a double free or an atlas area mismatch panic instead.

use std::path::PathBuf;

/// Errors surfaced by the render backend seam and the debug exporters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("upload of {target} failed: {reason}")]
    Upload { target: String, reason: String },

    #[error("display mode query failed: {0}")]
    DisplayMode(String),

    #[error("cannot export an atlas with {0} components per pixel")]
    UnsupportedFormat(usize),

    #[error("atlas export to {path} failed")]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::Upload { target: "position buffer".into(), reason: "lost".into() };
        assert_eq!(err.to_string(), "upload of position buffer failed: lost");
        assert_eq!(
            Error::UnsupportedFormat(3).to_string(),
            "cannot export an atlas with 3 components per pixel"
        );
    }
}
