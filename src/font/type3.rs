//! Type 3 procedural font support (dispatched for `Subtype: /Type3`, and as
//! the `CharProcs`-present fallback when `Subtype` is missing or
//! unrecognized, §4.1). Content-stream evaluation of `CharProcs` is an
//! external collaborator (§1 non-goals); this loader extracts just the
//! fields such an evaluator needs -- the glyph-space `FontMatrix`, the
//! code -> CharProcs-name table built the same way a simple font's
//! `estrings` is, and the `Widths` array (already expressed in glyph space,
//! not the 1000-unit em every other font type uses).

use std::collections::HashSet;

use crate::{
    data_structures::Matrix,
    face::{Face, FaceKind},
    font::{
        descriptor::{FontDescriptor, FontDescriptorFlags, FontMetrics, FontProgram, FontProgramSource},
        encoding::FontEncoding,
        metrics::HmtxTable,
    },
    objects::{Dictionary, Object},
    resolve::Resolve,
    FromObj, PdfResult,
};

/// Stands in for the glyph outlines Type 3 draws from its own `CharProcs`
/// content streams instead of an embedded font program. Every query answers
/// "no match", which degrades `font_cid_to_gid` to the identity mapping the
/// same way an absent face would (§4.8) -- a caller that actually evaluates
/// `CharProcs` looks glyphs up by name (`LoadedType3Font::char_proc_names`),
/// never through this face.
#[derive(Debug)]
pub struct NullFace;

impl Face for NullFace {
    fn kind(&self) -> FaceKind {
        FaceKind::Unknown
    }

    fn char_index(&self, _unicode: u32) -> Option<u32> {
        None
    }

    fn name_index(&self, _glyph_name: &str) -> Option<u32> {
        None
    }

    fn glyph_name(&self, _gid: u32) -> Option<String> {
        None
    }

    fn glyph_count(&self) -> u32 {
        0
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

#[derive(Debug, FromObj)]
#[obj_type("Font")]
struct Type3FontDict<'a> {
    #[field("FontMatrix", default = Matrix::identity())]
    font_matrix: Matrix,

    #[field("CharProcs")]
    char_procs: Option<Dictionary<'a>>,

    #[field("Encoding")]
    encoding: Option<Object<'a>>,

    #[field("FirstChar")]
    first_char: Option<u32>,

    #[field("LastChar")]
    last_char: Option<u32>,

    #[field("Widths")]
    widths: Option<Vec<f32>>,

    #[field("FontDescriptor")]
    font_descriptor: Option<Object<'a>>,

    other: Dictionary<'a>,
}

pub struct LoadedType3Font {
    pub descriptor: FontDescriptor,
    pub font_matrix: Matrix,
    /// `char_proc_names[code]` is the `CharProcs` key a rasterizer should
    /// invoke for that code, when `Encoding`/`Differences` named a glyph
    /// that `CharProcs` actually defines.
    pub char_proc_names: Vec<Option<String>>,
}

/// Builds everything a `CharProcs` evaluator needs short of running the
/// content streams themselves.
pub fn load_type3_font<'a>(dict_obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<LoadedType3Font> {
    let dict = Type3FontDict::from_obj(dict_obj, resolver)?;

    let char_proc_keys: HashSet<String> = dict
        .char_procs
        .map(|procs| procs.entries().map(|(name, _)| name).collect())
        .unwrap_or_default();

    let mut estrings: [Option<String>; 256] = std::array::from_fn(|_| None);
    if let Some(encoding_obj) = dict.encoding {
        if let FontEncoding::Dictionary(enc_dict) = FontEncoding::from_obj(encoding_obj, resolver)? {
            for (code, name) in enc_dict.differences.iter() {
                estrings[code as usize] = Some(name.to_owned());
            }
        }
    }

    let char_proc_names: Vec<Option<String>> = estrings
        .iter()
        .map(|name| name.clone().filter(|n| char_proc_keys.contains(n)))
        .collect();

    let (first_char, widths) = match (dict.first_char, dict.last_char, dict.widths) {
        (Some(f), Some(l), Some(w)) if f <= l => (f, Some(w)),
        _ => (0, None),
    };

    let mut hmtx = HmtxTable::new(0.0);
    if let Some(widths) = widths {
        for (i, w) in widths.into_iter().enumerate() {
            let code = first_char + i as u32;
            hmtx.add(code, code, w);
        }
    }
    hmtx.finish();

    let descriptor = FontDescriptor {
        font_program: FontProgram {
            source: FontProgramSource::Builtin,
            bytes: std::rc::Rc::from(Vec::new().into_boxed_slice()),
            face: Box::new(NullFace),
            requires_hinting: false,
        },
        flags: FontDescriptorFlags::default(),
        metrics: FontMetrics::default(),
        encoding: crate::cmap::CMap::new_identity_one_byte(crate::cmap::WritingMode::Horizontal),
        to_ttf_cmap: None,
        to_unicode: None,
        cid_to_gid: None,
        hmtx,
        vmtx: None,
        wmode: crate::cmap::WritingMode::Horizontal,
        is_embedded: false,
        width_table: None,
    };

    Ok(LoadedType3Font {
        descriptor,
        font_matrix: dict.font_matrix,
        char_proc_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{objects::Dictionary, resolve::InMemoryResolver};
    use std::collections::HashMap;

    #[test]
    fn widths_are_read_in_glyph_space_not_divided_by_1000() {
        let mut resolver = InMemoryResolver::new();
        let mut dict = HashMap::new();
        dict.insert("FirstChar".to_owned(), Object::Integer(65));
        dict.insert("LastChar".to_owned(), Object::Integer(66));
        dict.insert("Widths".to_owned(), Object::Array(vec![Object::Real(0.6), Object::Real(0.7)]));
        let obj = Object::Dictionary(Dictionary::new(dict));

        let loaded = load_type3_font(obj, &mut resolver).unwrap();
        assert_eq!(loaded.descriptor.hmtx.width(65), 0.6);
        assert_eq!(loaded.descriptor.hmtx.width(66), 0.7);
        assert_eq!(loaded.font_matrix, Matrix::identity());
    }

    #[test]
    fn char_proc_names_only_keep_names_charprocs_actually_defines() {
        let mut resolver = InMemoryResolver::new();
        let mut char_procs = HashMap::new();
        char_procs.insert("g1".to_owned(), Object::Null);
        let mut enc_dict = HashMap::new();
        enc_dict.insert(
            "Differences".to_owned(),
            Object::Array(vec![Object::Integer(65), Object::Name("g1".to_owned()), Object::Name("g2".to_owned())]),
        );

        let mut dict = HashMap::new();
        dict.insert("CharProcs".to_owned(), Object::Dictionary(Dictionary::new(char_procs)));
        dict.insert("Encoding".to_owned(), Object::Dictionary(Dictionary::new(enc_dict)));
        let obj = Object::Dictionary(Dictionary::new(dict));

        let loaded = load_type3_font(obj, &mut resolver).unwrap();
        assert_eq!(loaded.char_proc_names[65].as_deref(), Some("g1"));
        assert_eq!(loaded.char_proc_names[66], None);
    }
}
