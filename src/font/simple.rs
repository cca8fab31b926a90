//! Simple-Font Encoding Resolver: turns a Type1/MMType1/TrueType font
//! dictionary's `/Encoding` plus the face it resolved to into a 256-entry
//! code -> glyph-name table (`estrings`) and code -> glyph-index table
//! (`etable`), then packages both as an identity `CMap` plus an explicit
//! `cid_to_gid` array so the rest of this crate never special-cases simple
//! fonts versus CID fonts past this point. Grounded on
//! `pdf_load_simple_font` in `pdf_font.c`.

use std::collections::HashMap;

use crate::{
    agl::{glyph_name_to_unicode, lookup_agl_duplicates, BuiltinEncoding},
    cmap::{CMap, CMapSource, WritingMode},
    face::{ft_char_index, Face},
    font::{
        descriptor::{load_cp936_substitute, load_font_descriptor, load_standard_font, FontDescriptor, FontDescriptorFlags, FontProgram, FontProgramSource},
        encoding::{BaseFontEncoding, FontEncoding},
        metrics::{build_width_table, load_to_unicode, HmtxTable},
        names::cp936_workaround_name,
    },
    font_provider::FontProvider,
    objects::{Name, Object},
    resolve::Resolve,
    stream::Stream,
    FromObj, PdfResult,
};

#[derive(Debug, FromObj)]
#[obj_type("Font")]
struct SimpleFontDict<'a> {
    #[field("Subtype")]
    subtype: Name,

    #[field("BaseFont")]
    base_font: Name,

    #[field("FirstChar")]
    first_char: Option<u32>,

    #[field("LastChar")]
    last_char: Option<u32>,

    #[field("Widths")]
    widths: Option<Vec<f32>>,

    #[field("FontDescriptor")]
    font_descriptor: Option<Object<'a>>,

    #[field("Encoding")]
    encoding: Option<Object<'a>>,

    #[field("ToUnicode")]
    to_unicode: Option<Stream<'a>>,
}

pub struct LoadedSimpleFont {
    pub descriptor: FontDescriptor,
    pub base_font: String,
}

/// `pdf_load_simple_font`.
pub fn load_simple_font<'a>(
    dict_obj: Object<'a>,
    resolver: &mut dyn Resolve<'a>,
    cmap_source: &dyn CMapSource,
    provider: &dyn FontProvider,
) -> PdfResult<LoadedSimpleFont> {
    let dict = SimpleFontDict::from_obj(dict_obj, resolver)?;
    let base_font_string = dict.base_font.to_string();
    let is_truetype = dict.subtype == "TrueType";

    // A `FirstChar` past `LastChar` is nonsensical; treat the whole `Widths`
    // array as absent rather than guessing at an ordering.
    let (first_char, widths) = match (dict.first_char, dict.last_char, dict.widths) {
        (Some(f), Some(l), Some(w)) if f <= l => (f, Some(w)),
        _ => (0, None),
    };

    let (program, flags, metrics, has_descriptor) = match dict.font_descriptor {
        Some(descriptor_obj) => {
            let (p, f, m) = load_font_descriptor(descriptor_obj, resolver, None, &base_font_string, provider)?;
            (p, f, m, true)
        }
        None => {
            let (p, f, m) = load_standard_font(&base_font_string, provider)?;
            (p, f, m, false)
        }
    };

    let is_embedded = program.source == FontProgramSource::Embedded;

    let declares_winansi = match &dict.encoding {
        Some(obj) => matches!(resolver.resolve(obj.clone())?, Object::Name(ref n) if n == "WinAnsiEncoding"),
        None => false,
    };

    if dict.to_unicode.is_none() && flags.is_only_symbolic() && declares_winansi {
        if let Some(corrected) = cp936_workaround_name(dict.base_font.as_bytes()) {
            log::warn!("basefont {base_font_string:?} looks like a cp936-misencoded Chinese font name, reloading as Adobe-GB1/{corrected}");
            return load_cp936_font(corrected, flags, metrics, first_char, widths.as_deref(), cmap_source, provider);
        }
    }

    // Step 3: which of the face's cmaps the per-code lookups below prefer.
    enum CmapPolicy {
        Type1,
        TrueTypeUnicode,
        TrueTypeMacRoman,
        TrueTypeOther,
    }

    let policy = if is_truetype {
        if program.face.has_unicode_cmap() {
            CmapPolicy::TrueTypeUnicode
        } else if program.face.has_macroman_cmap() {
            CmapPolicy::TrueTypeMacRoman
        } else {
            CmapPolicy::TrueTypeOther
        }
    } else {
        CmapPolicy::Type1
    };

    // Step 4: estrings, seeded from the base encoding then overridden by
    // Differences.
    let mut estrings: [Option<String>; 256] = std::array::from_fn(|_| None);

    if let Some(encoding_obj) = dict.encoding {
        match FontEncoding::from_obj(encoding_obj, resolver)? {
            FontEncoding::Base(base) => fill_base_encoding(&mut estrings, base),
            FontEncoding::Dictionary(enc_dict) => {
                if let Some(base) = resolve_base_encoding(enc_dict.base_encoding, is_embedded, flags.is_symbolic()) {
                    fill_base_encoding(&mut estrings, base);
                }
                for (code, name) in enc_dict.differences.iter() {
                    estrings[code as usize] = Some(name.to_owned());
                }
            }
        }
    }

    // Step 4b: codes Encoding/Differences left unnamed fall back to the font
    // program's own built-in encoding vector, the promise `resolve_base_encoding`
    // makes for embedded/symbolic fonts ("left to the font program's own
    // built-in encoding").
    if let Some(builtin) = program.face.builtin_encoding() {
        fill_builtin_encoding(&mut estrings, builtin);
    }

    // Step 5: seed etable identically (whatever the face's default cmap
    // answers for the raw code, with the `ft_char_index` symbolic-range/
    // ellipsis retries), then let named slots override it.
    let mut etable = [0u32; 256];
    for code in 0u32..256 {
        etable[code as usize] = ft_char_index(program.face.as_ref(), code);
    }

    for code in 0usize..256 {
        let Some(name) = estrings[code].clone() else { continue };

        let gid = match policy {
            CmapPolicy::Type1 => resolve_type1_name(program.face.as_ref(), &name),
            CmapPolicy::TrueTypeUnicode => glyph_name_to_unicode(&name)
                .map(|cp| ft_char_index(program.face.as_ref(), cp))
                .filter(|&gid| gid != 0)
                .or_else(|| program.face.name_index(&name)),
            CmapPolicy::TrueTypeMacRoman => program.face.macroman_char_index(code as u8).or_else(|| program.face.name_index(&name)),
            CmapPolicy::TrueTypeOther => program.face.name_index(&name),
        };

        if let Some(gid) = gid {
            etable[code] = gid;
        }
        // else: leave the identity-seeded value alone, rather than zeroing
        // a slot the face's own cmap already answered.
    }

    // Step 6: backfill a glyph name for any slot Encoding/Differences never
    // named but whose etable entry is non-zero, so ToUnicode still has
    // something to work from.
    for code in 0usize..256 {
        if estrings[code].is_none() && etable[code] != 0 {
            estrings[code] = program
                .face
                .glyph_name(etable[code])
                .or_else(|| BuiltinEncoding::WinAnsi.glyph_name(code as u8).map(str::to_owned));
        }
    }

    // Step 7: package as an identity 1-byte CMap plus an explicit
    // `cid_to_gid`, so `font::glyph::font_cid_to_gid` never needs to know
    // this font started out as a simple font.
    let encoding = CMap::new_identity_one_byte(WritingMode::Horizontal);
    let cid_to_gid: Vec<u16> = etable.iter().map(|&gid| gid.min(u16::MAX as u32) as u16).collect();

    // Step 8: ToUnicode, preferring an explicit stream over the names
    // recovered above.
    let to_unicode = match dict.to_unicode {
        Some(stream) => Some(load_to_unicode(&stream.data)?),
        None => {
            let derived = to_unicode_from_estrings(&estrings);
            if derived.is_empty() {
                None
            } else {
                Some(derived)
            }
        }
    };

    let mut hmtx = HmtxTable::new(metrics.missing_width);
    if let Some(widths) = &widths {
        for (i, w) in widths.iter().enumerate() {
            let code = first_char + i as u32;
            hmtx.add(code, code, *w);
        }
    } else if !has_descriptor {
        // Standard-14 font with no descriptor and no Widths at all (§4.4):
        // fall back on the face's own advance widths.
        for code in 0u32..256 {
            if let Some(w) = program.face.advance_width(etable[code as usize]) {
                hmtx.add(code, code, w);
            }
        }
    }
    hmtx.finish();

    let width_table = match program.source {
        FontProgramSource::Substitute { .. } => Some(build_width_table(&hmtx, |c| c, |cid| cid_to_gid.get(cid as usize).copied().unwrap_or(0) as u32)),
        _ => None,
    };

    let descriptor = FontDescriptor {
        font_program: program,
        flags,
        metrics,
        encoding,
        to_ttf_cmap: None,
        to_unicode,
        cid_to_gid: Some(cid_to_gid),
        hmtx,
        vmtx: None,
        wmode: WritingMode::Horizontal,
        is_embedded,
        width_table,
    };

    Ok(LoadedSimpleFont {
        descriptor,
        base_font: base_font_string,
    })
}

/// The cp936 workaround's own, much shorter descriptor build: the font is
/// reloaded wholesale as a CJK substitute, so none of the Encoding/
/// Differences/estrings machinery above applies.
fn load_cp936_font(
    corrected_name: &str,
    flags: FontDescriptorFlags,
    metrics: crate::font::descriptor::FontMetrics,
    first_char: u32,
    widths: Option<&[f32]>,
    cmap_source: &dyn CMapSource,
    provider: &dyn FontProvider,
) -> PdfResult<LoadedSimpleFont> {
    let program = load_cp936_substitute(corrected_name, flags, provider)?;

    let encoding = cmap_source.load_system_cmap("GBK-EUC-H").unwrap_or_else(|err| {
        log::warn!("no system CMap for GBK-EUC-H, falling back to identity: {err:#}");
        CMap::new_identity_one_byte(WritingMode::Horizontal)
    });
    let to_ttf_cmap = cmap_source.load_system_cmap("Adobe-GB1-UCS2").ok();

    let mut hmtx = HmtxTable::new(metrics.missing_width);
    if let Some(widths) = widths {
        for (i, w) in widths.iter().enumerate() {
            let code = first_char + i as u32;
            hmtx.add(code, code, *w);
        }
    }
    hmtx.finish();

    let descriptor = FontDescriptor {
        font_program: program,
        flags,
        metrics,
        encoding,
        to_ttf_cmap,
        to_unicode: None,
        cid_to_gid: None,
        hmtx,
        vmtx: None,
        wmode: WritingMode::Horizontal,
        is_embedded: false,
        width_table: None,
    };

    Ok(LoadedSimpleFont {
        descriptor,
        base_font: corrected_name.to_owned(),
    })
}

fn fill_base_encoding(estrings: &mut [Option<String>; 256], base: BaseFontEncoding) {
    let builtin = match base {
        BaseFontEncoding::StandardEncoding => BuiltinEncoding::Standard,
        BaseFontEncoding::MacRomanEncoding => BuiltinEncoding::MacRoman,
        BaseFontEncoding::MacExpertEncoding => BuiltinEncoding::MacExpert,
        BaseFontEncoding::WinAnsiEncoding => BuiltinEncoding::WinAnsi,
    };

    for code in 0u16..256 {
        if let Some(name) = builtin.glyph_name(code as u8) {
            estrings[code as usize] = Some(name.to_owned());
        }
    }
}

/// Fills any slot Encoding/Differences left unnamed from the font program's
/// own built-in encoding vector, without overriding a slot already named.
fn fill_builtin_encoding(estrings: &mut [Option<String>; 256], builtin: &HashMap<u8, String>) {
    for code in 0usize..256 {
        if estrings[code].is_none() {
            if let Some(name) = builtin.get(&(code as u8)) {
                estrings[code] = Some(name.clone());
            }
        }
    }
}

/// Absent an explicit `/BaseEncoding`, a nonembedded nonsymbolic font
/// defaults to `StandardEncoding`; an embedded or symbolic one is left to
/// the font program's own built-in encoding (nothing filled here).
fn resolve_base_encoding(explicit: Option<BaseFontEncoding>, is_embedded: bool, is_symbolic: bool) -> Option<BaseFontEncoding> {
    explicit.or({
        if !is_embedded && !is_symbolic {
            Some(BaseFontEncoding::StandardEncoding)
        } else {
            None
        }
    })
}

fn resolve_type1_name(face: &dyn Face, name: &str) -> Option<u32> {
    if let Some(gid) = face.name_index(name) {
        return Some(gid);
    }
    lookup_agl_duplicates(name).into_iter().find_map(|alt| face.name_index(alt))
}

fn to_unicode_from_estrings(estrings: &[Option<String>; 256]) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    for (code, name) in estrings.iter().enumerate() {
        if let Some(name) = name {
            if let Some(c) = glyph_name_to_unicode(name).and_then(char::from_u32) {
                map.insert(code as u32, c.to_string());
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        face::FaceKind,
        font_provider::{CjkOrdering, SubstituteStyle},
        objects::Dictionary,
        resolve::InMemoryResolver,
    };

    struct StubFace {
        names: Vec<&'static str>,
    }

    impl Face for StubFace {
        fn kind(&self) -> FaceKind {
            FaceKind::Type1
        }

        fn char_index(&self, _unicode: u32) -> Option<u32> {
            None
        }

        fn name_index(&self, glyph_name: &str) -> Option<u32> {
            self.names.iter().position(|n| *n == glyph_name).map(|i| i as u32)
        }

        fn glyph_name(&self, gid: u32) -> Option<String> {
            self.names.get(gid as usize).map(|s| s.to_string())
        }

        fn glyph_count(&self) -> u32 {
            self.names.len() as u32
        }

        fn is_bold(&self) -> bool {
            false
        }

        fn is_italic(&self) -> bool {
            false
        }

        fn is_tricky(&self) -> bool {
            false
        }
    }

    struct StubProvider;

    impl FontProvider for StubProvider {
        fn find_builtin_font(&self, _name: &str) -> PdfResult<Option<Vec<u8>>> {
            Ok(None)
        }

        fn find_substitute_font(&self, _style: SubstituteStyle) -> PdfResult<Vec<u8>> {
            anyhow::bail!("no substitute fonts in this test provider")
        }

        fn find_substitute_cjk_font(&self, _ros: CjkOrdering, _serif: bool) -> PdfResult<Vec<u8>> {
            anyhow::bail!("no CJK substitutes in this test provider")
        }
    }

    #[test]
    fn resolve_type1_name_falls_back_to_agl_duplicate() {
        // "increment" isn't in this face, but it shares U+2206 with "Delta".
        let face = StubFace { names: vec![".notdef", "Delta"] };
        assert_eq!(resolve_type1_name(&face, "increment"), Some(1));
    }

    #[test]
    fn fill_base_encoding_assigns_ascii_letters() {
        let mut estrings: [Option<String>; 256] = std::array::from_fn(|_| None);
        fill_base_encoding(&mut estrings, BaseFontEncoding::WinAnsiEncoding);
        assert_eq!(estrings[0x41].as_deref(), Some("A"));
        assert_eq!(estrings[0x27].as_deref(), Some("quotesingle"));
    }

    #[test]
    fn fill_builtin_encoding_only_fills_unnamed_slots() {
        let mut estrings: [Option<String>; 256] = std::array::from_fn(|_| None);
        estrings[0x41] = Some("Differences-wins".to_owned());

        let mut builtin = HashMap::new();
        builtin.insert(0x41u8, "A".to_owned());
        builtin.insert(0x42u8, "B".to_owned());

        fill_builtin_encoding(&mut estrings, &builtin);

        assert_eq!(estrings[0x41].as_deref(), Some("Differences-wins"));
        assert_eq!(estrings[0x42].as_deref(), Some("B"));
        assert_eq!(estrings[0x43], None);
    }

    #[test]
    fn resolve_base_encoding_defaults_to_standard_for_plain_nonembedded_font() {
        assert!(matches!(
            resolve_base_encoding(None, false, false),
            Some(BaseFontEncoding::StandardEncoding)
        ));
        assert!(resolve_base_encoding(None, true, false).is_none());
        assert!(resolve_base_encoding(None, false, true).is_none());
    }

    #[test]
    fn load_simple_font_standard_helvetica_no_descriptor_errors_without_provider_support() {
        // This loader's FilesystemFontProvider is the real collaborator; a
        // provider with nothing to offer surfaces as an error rather than a
        // panic, which is the behavior under test here.
        let mut resolver = InMemoryResolver::new();
        let mut dict = HashMap::new();
        dict.insert("Subtype".to_owned(), Object::Name("Type1".to_owned()));
        dict.insert("BaseFont".to_owned(), Object::Name("Helvetica".to_owned()));
        let obj = Object::Dictionary(Dictionary::new(dict));

        let result = load_simple_font(obj, &mut resolver, &crate::cmap::NullCMapSource, &StubProvider);
        assert!(result.is_err());
    }
}
