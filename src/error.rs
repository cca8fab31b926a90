use std::fmt;

use crate::objects::Reference;

/// Most call sites attach a [`FontError`] via `.context(...)`; `anyhow::Error`
/// lets the context chain carry both the structured variant and the
/// surrounding "cannot load font (12 0 R)" breadcrumbs without every
/// intermediate function needing its own error enum.
pub type PdfResult<T> = anyhow::Result<T>;

/// Structured error kinds a font load can fail or warn with.
///
/// Most of these are non-fatal in the sense that a real PDF consumer would
/// warn and fall back to a substitute rather than abort the document; the
/// loader surfaces them that way (see `font::dispatch::load_font`), but
/// keeping them as a real enum rather than ad hoc strings lets callers match
/// on `.downcast_ref::<FontError>()` when they care which failure mode fired.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("missing required key {key}")]
    MissingRequiredKey { key: &'static str },

    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: String,
    },

    #[error("array had length {found}, expected {expected}")]
    ArrayOfInvalidLength { expected: usize, found: usize },

    #[error("unrecognized variant {found:?} for {ty}")]
    UnrecognizedVariant { ty: &'static str, found: String },

    #[error("font {reference} has no usable font program and no system substitute was found")]
    NoFontProgram { reference: Reference },

    #[error("font program for {reference} could not be parsed: {reason}")]
    MalformedFontProgram { reference: Reference, reason: String },

    #[error("cid font {reference} declares an unsupported CIDSystemInfo ({registry}-{ordering})")]
    UnknownCidCollection {
        reference: Reference,
        registry: String,
        ordering: String,
    },

    #[error("CMap stream for {reference} could not be parsed: {reason}")]
    MalformedCMap { reference: Reference, reason: String },

    #[error("no glyph outline source is available for Type 3 font {reference}")]
    Type3HasNoFaceEngine { reference: Reference },

    #[error("font {reference} emulates a CID font with a substitute TrueType face but that face has no unicode cmap to map CIDs through")]
    NoUnicodeCmapForSubstituteCidFont { reference: Reference },
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.object_number, self.generation)
    }
}
