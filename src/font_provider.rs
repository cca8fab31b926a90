//! Injectable source of font bytes for the three non-embedded program
//! sources a descriptor can draw from (§4.3): the 14 standard fonts, a
//! stylistic substitute picked by (mono, serif, bold, italic), and a CJK
//! substitute picked by character collection.
//!
//! The teacher (`connorskees-pdf`) hardcodes these as `std::fs::read` calls
//! against a `pdf_fonts/*.pfb` directory baked into `font/mod.rs`
//! (`BASE_14_FONTS`). That is fine for a renderer that ships its own font
//! directory next to the binary, but a font *loader* library embedded in
//! other programs shouldn't hardcode a filesystem layout -- so the lookup is
//! a trait here, with `FilesystemFontProvider` as the direct generalization
//! of the teacher's behavior (same relative paths, configurable base dir).

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use once_cell::sync::Lazy;

use crate::PdfResult;

/// ROS (Registry-Ordering-Supplement) families with a bundled CJK
/// substitute, keyed the way `pdf_find_substitute_cjk_font`'s `PDF_ROS_*`
/// constants are (§4.3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CjkOrdering {
    GB,
    CNS,
    Japan,
    Korea,
}

impl CjkOrdering {
    pub fn from_ros(registry: &str, ordering: &str) -> Option<Self> {
        if registry != "Adobe" {
            return None;
        }

        Some(match ordering {
            "GB1" => Self::GB,
            "CNS1" => Self::CNS,
            "Japan1" => Self::Japan,
            "Korea1" => Self::Korea,
            _ => return None,
        })
    }
}

/// The stylistic axes a Latin substitute is chosen along (§4.3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstituteStyle {
    pub mono: bool,
    pub serif: bool,
    pub bold: bool,
    pub italic: bool,
}

pub trait FontProvider {
    fn find_builtin_font(&self, canonical_name: &str) -> PdfResult<Option<Vec<u8>>>;

    fn find_substitute_font(&self, style: SubstituteStyle) -> PdfResult<Vec<u8>>;

    fn find_substitute_cjk_font(&self, ros: CjkOrdering, serif: bool) -> PdfResult<Vec<u8>>;
}

/// Relative paths of the 14 standard fonts, bundled the way the teacher's
/// `BASE_14_FONTS` table names them (URW clones of the Adobe 14, same `.pfb`
/// naming scheme ghostscript has used for decades).
static BASE_14_PATHS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from_iter([
        ("Courier", "pdf_fonts/n022003l.pfb"),
        ("Courier-Bold", "pdf_fonts/n022004l.pfb"),
        ("Courier-Oblique", "pdf_fonts/n022023l.pfb"),
        ("Courier-BoldOblique", "pdf_fonts/n022024l.pfb"),
        ("Helvetica", "pdf_fonts/n019003l.pfb"),
        ("Helvetica-Bold", "pdf_fonts/n019004l.pfb"),
        ("Helvetica-Oblique", "pdf_fonts/n019023l.pfb"),
        ("Helvetica-BoldOblique", "pdf_fonts/n019024l.pfb"),
        ("Times-Roman", "pdf_fonts/p052003l.pfb"),
        ("Times-Bold", "pdf_fonts/p052004l.pfb"),
        ("Times-Italic", "pdf_fonts/p052023l.pfb"),
        ("Times-BoldItalic", "pdf_fonts/p052024l.pfb"),
        ("Symbol", "pdf_fonts/s050000l.pfb"),
        ("ZapfDingbats", "pdf_fonts/d050000l.pfb"),
    ])
});

fn substitute_path(style: SubstituteStyle) -> &'static str {
    match (style.mono, style.serif, style.bold, style.italic) {
        (true, _, false, false) => "pdf_fonts/n022003l.pfb",
        (true, _, true, false) => "pdf_fonts/n022004l.pfb",
        (true, _, false, true) => "pdf_fonts/n022023l.pfb",
        (true, _, true, true) => "pdf_fonts/n022024l.pfb",
        (false, true, false, false) => "pdf_fonts/p052003l.pfb",
        (false, true, true, false) => "pdf_fonts/p052004l.pfb",
        (false, true, false, true) => "pdf_fonts/p052023l.pfb",
        (false, true, true, true) => "pdf_fonts/p052024l.pfb",
        (false, false, false, false) => "pdf_fonts/n019003l.pfb",
        (false, false, true, false) => "pdf_fonts/n019004l.pfb",
        (false, false, false, true) => "pdf_fonts/n019023l.pfb",
        (false, false, true, true) => "pdf_fonts/n019024l.pfb",
    }
}

/// mupdf bundles one droid-derived pan-CJK fallback face and uses it for
/// every ROS/serif combination (`pdf_load_substitute_cjk_font`'s `noto`
/// table collapses the same way for builds without the per-script Noto
/// faces). `serif` is accepted for interface parity with the real engine
/// but unused here since there's only the one bundled face.
fn cjk_path(_ros: CjkOrdering, _serif: bool) -> &'static str {
    "pdf_fonts/droidsansfallback.ttf"
}

/// The direct generalization of the teacher's `std::fs::read("pdf_fonts/...")`
/// calls: same relative paths, but rooted at a configurable directory
/// instead of the process's current directory.
#[derive(Debug, Clone)]
pub struct FilesystemFontProvider {
    base_dir: PathBuf,
}

impl FilesystemFontProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn read(&self, relative: &str) -> PdfResult<Vec<u8>> {
        let path: &Path = relative.as_ref();
        std::fs::read(self.base_dir.join(path))
            .with_context(|| format!("could not read bundled font {relative:?}"))
    }
}

impl FontProvider for FilesystemFontProvider {
    fn find_builtin_font(&self, canonical_name: &str) -> PdfResult<Option<Vec<u8>>> {
        match BASE_14_PATHS.get(canonical_name) {
            Some(path) => Ok(Some(self.read(path)?)),
            None => Ok(None),
        }
    }

    fn find_substitute_font(&self, style: SubstituteStyle) -> PdfResult<Vec<u8>> {
        self.read(substitute_path(style))
    }

    fn find_substitute_cjk_font(&self, ros: CjkOrdering, serif: bool) -> PdfResult<Vec<u8>> {
        self.read(cjk_path(ros, serif))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_path_picks_mono_over_serif() {
        assert_eq!(
            substitute_path(SubstituteStyle {
                mono: true,
                serif: true,
                bold: false,
                italic: false
            }),
            "pdf_fonts/n022003l.pfb"
        );
    }

    #[test]
    fn cjk_ordering_requires_adobe_registry() {
        assert_eq!(CjkOrdering::from_ros("Foo", "GB1"), None);
        assert_eq!(CjkOrdering::from_ros("Adobe", "GB1"), Some(CjkOrdering::GB));
    }
}
