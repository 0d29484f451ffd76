#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Printable reports for the MLS locator.
//!
//! A [`Report`] is built from store data by one of the builders in
//! [`model`], then rendered either as a plain-text preview ([`render_text`])
//! or as a PDF written atomically to disk ([`generate`]).

use std::path::PathBuf;

pub mod model;
pub mod pdf;
pub mod text;

pub use model::{Report, ReportContext, ReportKind, active_points, district_summary, point_detail};
pub use pdf::{generate, render_pdf, write_atomic};
pub use text::render_text;

/// Errors that can occur while producing a report file.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The configured font family could not be loaded.
    #[error("Failed to load font family '{family}' from {}: {source}", dir.display())]
    FontsUnavailable {
        dir: PathBuf,
        family: String,
        #[source]
        source: genpdf::error::Error,
    },

    /// PDF layout or rendering failed.
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] genpdf::error::Error),

    /// Writing the output file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
