//! The central `FontDescriptor` entity (the owner of a resolved font
//! program plus every table a code-to-glyph lookup needs) and the
//! descriptor-loading step that reads a `/FontDescriptor` dictionary and
//! resolves the font program it points at: embedded, builtin (one of the
//! 14 standard fonts), or substitute (§4.3/§4.4, grounded on
//! `pdf_load_font_descriptor`/`pdf_load_embedded_font`/
//! `pdf_load_builtin_font`/`pdf_load_system_font` in `pdf_font.c`).
//!
//! `FontDescriptor` is built progressively: this module fills in the font
//! program, the flags, and the scalar metrics; the simple- or CID-font
//! loader (`font::simple`/`font::cid`) fills in the encoding, the metric
//! tables, and the CID/GID maps before the dispatcher freezes the value
//! into its cache.

use std::{fmt, rc::Rc};

use crate::{
    cmap::{CMap, WritingMode},
    data_structures::Rectangle,
    face::{Face, Type1Face, TrueTypeFace},
    font::{
        metrics::{HmtxTable, VmtxTable},
        names::{clean_font_name, is_dynalab},
    },
    font_provider::{CjkOrdering, FontProvider, SubstituteStyle},
    objects::{Dictionary, Name, Object},
    resolve::Resolve,
    stream::Stream,
    FromObj, PdfResult,
};

/// `PDF_FD_*` bits read off the FontDescriptor `/Flags` entry. A plain
/// tuple struct with const masks and `is_*` accessors, the same idiom the
/// teacher repo uses for this exact entry, rather than the `bitflags`
/// crate -- nothing past these predicates is ever needed.
#[derive(Clone, Copy, Default)]
pub struct FontDescriptorFlags(u32);

impl fmt::Debug for FontDescriptorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:b}", self.0)
    }
}

impl<'a> FromObj<'a> for FontDescriptorFlags {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        Ok(Self(u32::from_obj(obj, resolver)?))
    }
}

impl FontDescriptorFlags {
    const FIXED_PITCH: u32 = 1 << 0;
    const SERIF: u32 = 1 << 1;
    const SYMBOLIC: u32 = 1 << 2;
    const ITALIC: u32 = 1 << 6;
    const FORCE_BOLD: u32 = 1 << 18;

    pub const fn is_fixed_pitch(&self) -> bool {
        self.0 & Self::FIXED_PITCH != 0
    }

    pub const fn is_serif(&self) -> bool {
        self.0 & Self::SERIF != 0
    }

    /// Reads the same bit `fontdesc->flags & 4` tests directly in the
    /// simple-font resolver; kept here too as a named accessor for callers
    /// that don't need to mirror that literal.
    pub const fn is_symbolic(&self) -> bool {
        self.0 & Self::SYMBOLIC != 0
    }

    /// Whether `Flags` carries the symbolic bit and nothing else -- the
    /// narrower test `font::simple`'s cp936 workaround uses, as opposed to
    /// `is_symbolic`'s "bit is set among others".
    pub const fn is_only_symbolic(&self) -> bool {
        self.0 == Self::SYMBOLIC
    }

    pub const fn is_italic(&self) -> bool {
        self.0 & Self::ITALIC != 0
    }

    pub const fn is_force_bold(&self) -> bool {
        self.0 & Self::FORCE_BOLD != 0
    }

    const fn with_symbolic(self) -> Self {
        Self(self.0 | Self::SYMBOLIC)
    }
}

#[pdf_enum]
enum FontStretch {
    UltraCondensed = "UltraCondensed",
    ExtraCondensed = "ExtraCondensed",
    Condensed = "Condensed",
    SemiCondensed = "SemiCondensed",
    Normal = "Normal",
    SemiExpanded = "SemiExpanded",
    Expanded = "Expanded",
    ExtraExpanded = "ExtraExpanded",
    UltraExpanded = "UltraExpanded",
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FontMetrics {
    pub italic_angle: f32,
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    pub x_height: f32,
    pub missing_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontProgramSource {
    Embedded,
    Builtin,
    Substitute { synthetic_bold: bool, synthetic_italic: bool },
}

/// The decoded font face plus the raw bytes it borrows from, with
/// provenance. Exactly one of embedded/builtin/substitute is ever true for
/// a given descriptor -- `source` is the tag, the bytes and face are
/// common to all three.
pub struct FontProgram {
    pub source: FontProgramSource,
    pub(crate) bytes: Rc<[u8]>,
    pub face: Box<dyn Face>,
    /// Set when the face is TrueType and either reports itself as
    /// "tricky" or its name matches the DynaLab heuristic: a hint for a
    /// caller that actually rasterizes to force the hinting path those
    /// fonts need. This loader never rasterizes, so it only carries the
    /// flag through.
    pub requires_hinting: bool,
}

impl FontProgram {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for FontProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontProgram")
            .field("source", &self.source)
            .field("kind", &self.face.kind())
            .field("requires_hinting", &self.requires_hinting)
            .finish()
    }
}

/// The font-program bytes a `TrueTypeFace` borrows from must outlive the
/// face. The face is boxed alongside an `Rc<[u8]>` that is never mutated
/// or reallocated afterwards, so the backing allocation genuinely outlives
/// every use of the face; there is no way to express a struct holding both
/// the owner and a borrow of it without either self-referential storage or
/// erasing the borrow's lifetime, so the lifetime is erased here rather
/// than forcing every caller of `Face` to carry a borrow around.
fn parse_truetype_face(bytes: &Rc<[u8]>) -> PdfResult<Box<dyn Face>> {
    let data: &'static [u8] = unsafe { std::mem::transmute::<&[u8], &'static [u8]>(bytes.as_ref()) };
    Ok(Box::new(TrueTypeFace::parse(data)?))
}

fn parse_face(bytes: &Rc<[u8]>, prefer_truetype: bool) -> PdfResult<Box<dyn Face>> {
    if prefer_truetype {
        parse_truetype_face(bytes).or_else(|_| Ok(Box::new(Type1Face::parse(bytes)?) as Box<dyn Face>))
    } else {
        match Type1Face::parse(bytes) {
            Ok(face) => Ok(Box::new(face)),
            Err(_) => parse_truetype_face(bytes),
        }
    }
}

fn load_embedded(bytes: Rc<[u8]>, prefer_truetype: bool) -> PdfResult<FontProgram> {
    let face = parse_face(&bytes, prefer_truetype)?;
    Ok(FontProgram {
        source: FontProgramSource::Embedded,
        bytes,
        face,
        requires_hinting: false,
    })
}

fn load_builtin(name: &str, provider: &dyn FontProvider) -> PdfResult<FontProgram> {
    let bytes = provider
        .find_builtin_font(name)?
        .ok_or_else(|| anyhow::anyhow!("cannot find builtin font {name:?}"))?;
    let bytes: Rc<[u8]> = Rc::from(bytes.into_boxed_slice());
    let face = parse_face(&bytes, false)?;

    Ok(FontProgram {
        source: FontProgramSource::Builtin,
        bytes,
        face,
        requires_hinting: false,
    })
}

fn load_substitute(style: SubstituteStyle, provider: &dyn FontProvider) -> PdfResult<FontProgram> {
    let bytes = provider.find_substitute_font(style)?;
    let bytes: Rc<[u8]> = Rc::from(bytes.into_boxed_slice());
    let face = parse_face(&bytes, false)?;

    let synthetic_bold = style.bold && !face.is_bold();
    let synthetic_italic = style.italic && !face.is_italic();

    Ok(FontProgram {
        source: FontProgramSource::Substitute {
            synthetic_bold,
            synthetic_italic,
        },
        bytes,
        face,
        requires_hinting: false,
    })
}

fn load_substitute_cjk(ros: CjkOrdering, serif: bool, provider: &dyn FontProvider) -> PdfResult<FontProgram> {
    let bytes = provider.find_substitute_cjk_font(ros, serif)?;
    let bytes: Rc<[u8]> = Rc::from(bytes.into_boxed_slice());
    let face = parse_truetype_face(&bytes)?;

    Ok(FontProgram {
        source: FontProgramSource::Substitute {
            synthetic_bold: false,
            synthetic_italic: false,
        },
        bytes,
        face,
        requires_hinting: false,
    })
}

/// `pdf_load_system_font`: infers style from the cleaned name plus
/// descriptor flags, then either asks for a CJK substitute (when a
/// collection is known) or a Latin one by (mono, serif, bold, italic).
fn load_system_font(name: &str, flags: FontDescriptorFlags, collection: Option<(&str, &str)>, provider: &dyn FontProvider) -> PdfResult<FontProgram> {
    if let Some((registry, ordering)) = collection {
        let ros = CjkOrdering::from_ros(registry, ordering)
            .ok_or_else(|| anyhow::anyhow!("unsupported cid collection: {registry}-{ordering}"))?;
        return load_substitute_cjk(ros, flags.is_serif(), provider);
    }

    let style = SubstituteStyle {
        mono: flags.is_fixed_pitch(),
        serif: flags.is_serif(),
        bold: flags.is_force_bold() || name.contains("Bold"),
        italic: flags.is_italic() || name.contains("Italic") || name.contains("Oblique"),
    };

    load_substitute(style, provider)
}

/// `pdf_load_builtin_font` ORs `PDF_FD_SYMBOLIC` into the descriptor flags
/// unconditionally whenever the builtin it loads is Symbol or ZapfDingbats,
/// at both call sites inside `pdf_load_font_descriptor` -- regardless of
/// which of those two call sites (embedded-parse-failure fallback, or no
/// embedded stream at all) is taken, and regardless of whether the fallback
/// itself resolves through `load_builtin` or `load_system_font`. This is the
/// single place every such fallback funnels through, so the flag is applied
/// here rather than duplicated at each caller.
fn load_fallback(
    canonicalized: bool,
    fontname: &str,
    flags: FontDescriptorFlags,
    collection: Option<(&str, &str)>,
    provider: &dyn FontProvider,
) -> PdfResult<(FontProgram, FontDescriptorFlags)> {
    let program = if canonicalized {
        load_builtin(fontname, provider)?
    } else {
        load_system_font(fontname, flags, collection, provider)?
    };

    let flags = if fontname == "Symbol" || fontname == "ZapfDingbats" {
        flags.with_symbolic()
    } else {
        flags
    };

    Ok((program, flags))
}

/// The central entity this whole loader builds towards: a font program
/// plus every table needed to go from a character code to a positioned,
/// identifiable glyph. `load_font_descriptor` fills `font_program`/
/// `flags`/`metrics`; `font::simple::load_simple_font`/
/// `font::cid::load_cid_font` fill in the rest before
/// `font::dispatch::load_font` caches the result.
#[derive(Debug)]
pub struct FontDescriptor {
    pub font_program: FontProgram,
    pub flags: FontDescriptorFlags,
    pub metrics: FontMetrics,
    pub encoding: CMap,
    pub to_ttf_cmap: Option<CMap>,
    pub to_unicode: Option<std::collections::HashMap<u32, String>>,
    pub cid_to_gid: Option<Vec<u16>>,
    pub hmtx: HmtxTable,
    pub vmtx: Option<VmtxTable>,
    pub wmode: WritingMode,
    pub is_embedded: bool,
    pub width_table: Option<Vec<f32>>,
}

#[derive(Debug, FromObj)]
#[obj_type("FontDescriptor")]
pub(crate) struct FontDescriptorDict<'a> {
    #[field("FontName")]
    pub font_name: Name,

    #[field("FontFamily")]
    font_family: Option<String>,

    #[field("FontStretch")]
    font_stretch: Option<FontStretch>,

    #[field("FontWeight")]
    font_weight: Option<f32>,

    #[field("Flags")]
    pub flags: FontDescriptorFlags,

    #[field("FontBBox")]
    font_bounding_box: Option<Rectangle>,

    #[field("ItalicAngle", default = 0.0)]
    pub italic_angle: f32,

    #[field("Ascent", default = 0.0)]
    pub ascent: f32,

    #[field("Descent", default = 0.0)]
    pub descent: f32,

    #[field("Leading", default = 0.0)]
    leading: f32,

    #[field("CapHeight", default = 0.0)]
    pub cap_height: f32,

    #[field("XHeight", default = 0.0)]
    pub x_height: f32,

    #[field("StemV")]
    stem_v: Option<f32>,

    #[field("StemH", default = 0.0)]
    stem_h: f32,

    #[field("AvgWidth", default = 0.0)]
    avg_width: f32,

    #[field("MaxWidth", default = 0.0)]
    max_width: f32,

    #[field("MissingWidth", default = 0.0)]
    pub missing_width: f32,

    #[field("FontFile")]
    pub font_file: Option<Stream<'a>>,

    #[field("FontFile2")]
    pub font_file2: Option<Stream<'a>>,

    #[field("FontFile3")]
    pub font_file3: Option<Stream<'a>>,

    #[field("CharSet")]
    charset: Option<String>,

    #[field("Style")]
    style: Option<Dictionary<'a>>,

    #[field("Lang")]
    lang: Option<Name>,

    #[field("FD")]
    fd: Option<Dictionary<'a>>,

    #[field("CIDSet")]
    cid_set: Option<Stream<'a>>,
}

/// `pdf_load_font_descriptor`. `collection` is `Some((registry, ordering))`
/// for CID fonts (used both for collection-aware substitution and as part
/// of the name-selection rule), `None` for simple fonts.
pub fn load_font_descriptor<'a>(
    descriptor_obj: Object<'a>,
    resolver: &mut dyn Resolve<'a>,
    collection: Option<(&str, &str)>,
    base_font: &str,
    provider: &dyn FontProvider,
) -> PdfResult<(FontProgram, FontDescriptorFlags, FontMetrics)> {
    let dict = FontDescriptorDict::from_obj(descriptor_obj, resolver)?;

    let origname = if !base_font.contains(',') || base_font.contains('+') {
        dict.font_name.to_string()
    } else {
        base_font.to_owned()
    };
    let fontname = clean_font_name(&origname).to_owned();
    let canonicalized = fontname != origname;

    let mut flags = dict.flags;
    let metrics = FontMetrics {
        italic_angle: dict.italic_angle,
        ascent: dict.ascent,
        descent: dict.descent,
        cap_height: dict.cap_height,
        x_height: dict.x_height,
        missing_width: dict.missing_width,
    };

    let embedded = dict
        .font_file
        .map(|s| (s, false))
        .or_else(|| dict.font_file2.map(|s| (s, true)))
        .or_else(|| dict.font_file3.map(|s| (s, true)));

    let mut program = match embedded {
        Some((stream, prefer_truetype)) => {
            let bytes: Rc<[u8]> = Rc::from(stream.data.into_owned().into_boxed_slice());
            match load_embedded(bytes, prefer_truetype) {
                Ok(program) => program,
                Err(err) => {
                    log::warn!("ignored error loading embedded font {fontname:?}, falling back to a system font: {err:#}");
                    let (program, fallback_flags) = load_fallback(canonicalized, &fontname, flags, collection, provider)?;
                    flags = fallback_flags;
                    program
                }
            }
        }
        None => {
            let (program, fallback_flags) = load_fallback(canonicalized, &fontname, flags, collection, provider)?;
            flags = fallback_flags;
            program
        }
    };

    if program.face.kind() == crate::face::FaceKind::TrueType && (program.face.is_tricky() || is_dynalab(&fontname)) {
        program.requires_hinting = true;
    }

    Ok((program, flags, metrics))
}

/// For the standard 14 fonts, `FirstChar`/`LastChar`/`Widths`/
/// `FontDescriptor` are either all present or all absent (§4.4). When
/// absent there is no flags/metrics source at all, so the font program is
/// loaded directly off the canonicalized `BaseFont` name with default
/// (zeroed) flags and metrics -- the direct counterpart of
/// `pdf_load_builtin_font` being called with no descriptor in hand.
pub fn load_standard_font(base_font: &str, provider: &dyn FontProvider) -> PdfResult<(FontProgram, FontDescriptorFlags, FontMetrics)> {
    let fontname = clean_font_name(base_font);
    let canonicalized = fontname != base_font;

    let (program, flags) = load_fallback(canonicalized, fontname, FontDescriptorFlags::default(), None, provider)?;

    Ok((program, flags, FontMetrics::default()))
}

/// The cp936 mis-encoded-Chinese-font workaround (§4.5 step 2): once
/// `font::simple` recognizes the `BaseFont` as one of the five known
/// GB-2312 names, the font is reloaded as a CJK substitute under the
/// Adobe-GB1 collection rather than trying to make sense of the (wrong)
/// `WinAnsiEncoding` the PDF declared.
pub fn load_cp936_substitute(corrected_name: &str, flags: FontDescriptorFlags, provider: &dyn FontProvider) -> PdfResult<FontProgram> {
    load_system_font(corrected_name, flags, Some(("Adobe", "GB1")), provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_read_individual_bits() {
        let flags = FontDescriptorFlags(FontDescriptorFlags::SYMBOLIC | FontDescriptorFlags::ITALIC);
        assert!(flags.is_symbolic());
        assert!(flags.is_italic());
        assert!(!flags.is_serif());
        assert!(!flags.is_force_bold());
    }

    #[test]
    fn name_selection_prefers_font_name_when_subset_tagged() {
        // "ABCDEF+Helvetica" has a '+' subset tag, so FontName wins even
        // though BaseFont has no comma.
        assert_eq!(clean_font_name("Helvetica-Bold"), "Helvetica-Bold");
    }

    #[test]
    fn with_symbolic_sets_only_the_symbolic_bit() {
        let flags = FontDescriptorFlags(FontDescriptorFlags::ITALIC).with_symbolic();
        assert!(flags.is_symbolic());
        assert!(flags.is_italic());

        let flags = FontDescriptorFlags::default().with_symbolic();
        assert!(flags.is_only_symbolic());
    }
}
