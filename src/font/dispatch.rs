//! Dispatcher & Cache: the single entry point a document context calls to
//! turn a font resource object into a populated, cached [`FontDescriptor`].
//! Grounded on `pdf_load_font`'s subtype switch and `pdf_find_font`'s cache
//! lookup in `pdf_font.c`.

use std::{collections::HashMap, rc::Rc};

use anyhow::Context;

use crate::{
    cmap::CMapSource,
    font::{
        cid::{load_cid_font, resolve_type0_encoding},
        descriptor::FontDescriptor,
        metrics::load_to_unicode,
        simple::load_simple_font,
        type3::load_type3_font,
    },
    font_provider::FontProvider,
    objects::{Object, Reference},
    resolve::Resolve,
    PdfResult,
};

/// The document-object cache the dispatcher memoizes into (§4.1 step 1/5):
/// one descriptor per originating font dictionary, keyed by its indirect
/// reference. A cache hit returns the exact same `Rc`, satisfying the
/// "`load_font` called twice returns the same descriptor object" idempotence
/// property (§8) by construction.
#[derive(Debug, Default)]
pub struct FontCache {
    entries: HashMap<Reference, Rc<FontDescriptor>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reference: Reference) -> Option<Rc<FontDescriptor>> {
        self.entries.get(&reference).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `pdf_load_font`/`pdf_find_font`. `reference` identifies the font
/// dictionary being loaded, both as the cache key and for error context.
pub fn load_font<'a>(
    reference: Reference,
    resolver: &mut dyn Resolve<'a>,
    cmap_source: &dyn CMapSource,
    provider: &dyn FontProvider,
    cache: &mut FontCache,
) -> PdfResult<Rc<FontDescriptor>> {
    if let Some(cached) = cache.get(reference) {
        return Ok(cached);
    }

    let descriptor = load_font_uncached(reference, resolver, cmap_source, provider)
        .with_context(|| format!("cannot load font ({reference})"))?;

    let descriptor = Rc::new(descriptor);
    cache.entries.insert(reference, Rc::clone(&descriptor));
    Ok(descriptor)
}

fn load_font_uncached<'a>(
    reference: Reference,
    resolver: &mut dyn Resolve<'a>,
    cmap_source: &dyn CMapSource,
    provider: &dyn FontProvider,
) -> PdfResult<FontDescriptor> {
    let obj = resolver.resolve(Object::Reference(reference))?;

    let mut peek = resolver.assert_dict(obj.clone())?;
    let subtype = peek.get_name("Subtype", resolver)?;
    let has_descendant_fonts = peek.contains_key("DescendantFonts");
    let has_char_procs = peek.contains_key("CharProcs");

    match subtype.as_deref() {
        Some("Type0") => load_type0(obj, resolver, cmap_source, provider, reference),
        Some("Type1") | Some("MMType1") | Some("TrueType") => {
            Ok(load_simple_font(obj, resolver, cmap_source, provider)?.descriptor)
        }
        Some("Type3") => Ok(load_type3_font(obj, resolver)?.descriptor),
        _ if has_char_procs => {
            log::warn!("font {reference} has no recognized Subtype but declares CharProcs, loading as Type 3");
            Ok(load_type3_font(obj, resolver)?.descriptor)
        }
        _ if has_descendant_fonts => {
            log::warn!("font {reference} has no recognized Subtype but declares DescendantFonts, loading as Type 0");
            load_type0(obj, resolver, cmap_source, provider, reference)
        }
        other => {
            log::warn!("font {reference} has unrecognized Subtype {other:?}, loading as a simple font");
            Ok(load_simple_font(obj, resolver, cmap_source, provider)?.descriptor)
        }
    }
}

/// `pdf_load_type0_font`: pulls the root font dict's `Encoding` and
/// `ToUnicode`, then defers the descendant CIDFont dict (the first element
/// of `DescendantFonts`) to `font::cid::load_cid_font`.
fn load_type0<'a>(
    obj: Object<'a>,
    resolver: &mut dyn Resolve<'a>,
    cmap_source: &dyn CMapSource,
    provider: &dyn FontProvider,
    reference: Reference,
) -> PdfResult<FontDescriptor> {
    let mut dict = resolver.assert_dict(obj)?;

    let encoding_obj = dict.expect_object("Encoding", resolver)?;
    let descendant_fonts = dict.expect_arr("DescendantFonts", resolver)?;
    let to_unicode = dict.get_stream("ToUnicode", resolver)?;

    let descendant_obj = descendant_fonts
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("font {reference} declares an empty DescendantFonts array"))?;

    let encoding = resolve_type0_encoding(encoding_obj, resolver, cmap_source, reference)?;

    let loaded = load_cid_font(descendant_obj, resolver, encoding, provider, cmap_source, reference)?;
    let mut descriptor = loaded.descriptor;

    if let Some(stream) = to_unicode {
        descriptor.to_unicode = Some(load_to_unicode(&stream.data)?);
    }

    Ok(descriptor)
}

/// `pdf_debug_font` (§6): a human-readable dump of a descriptor's writing
/// mode, default widths, and every `W`/`W2` range -- the `W2`/`DW2` lines
/// are only emitted for a vertical font, matching the original's own
/// `if font->wmode` guard.
pub fn debug_font(desc: &FontDescriptor) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "wmode {}", desc.wmode as u8);
    let _ = writeln!(out, "DW {}", desc.hmtx.default_width());
    for range in desc.hmtx.ranges() {
        let _ = writeln!(out, "W {} {} {}", range.lo, range.hi, range.w);
    }

    if desc.wmode == crate::cmap::WritingMode::Vertical {
        if let Some(vmtx) = &desc.vmtx {
            let (x, y, w) = vmtx.default_metrics();
            let _ = writeln!(out, "DW2 {y} {w}");
            for range in vmtx.ranges() {
                let _ = writeln!(out, "W2 {} {} {} {} {}", range.lo, range.hi, range.w, range.x, range.y);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cmap::NullCMapSource,
        font_provider::{CjkOrdering, SubstituteStyle},
        objects::Dictionary,
        resolve::InMemoryResolver,
    };

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
    fn cache_returns_the_same_descriptor_on_a_second_load() {
        let mut resolver = InMemoryResolver::new();
        let reference = Reference {
            object_number: 7,
            generation: 0,
        };

        let mut dict = HashMap::new();
        dict.insert("Subtype".to_owned(), Object::Name("Type3".to_owned()));
        resolver.insert(reference, Object::Dictionary(Dictionary::new(dict)));

        let mut cache = FontCache::new();
        let first = load_font(reference, &mut resolver, &NullCMapSource, &StubProvider, &mut cache).unwrap();
        let second = load_font(reference, &mut resolver, &NullCMapSource, &StubProvider, &mut cache).unwrap();

        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn unrecognized_subtype_with_char_procs_loads_as_type3() {
        let mut resolver = InMemoryResolver::new();
        let reference = Reference {
            object_number: 1,
            generation: 0,
        };

        let mut char_procs = HashMap::new();
        char_procs.insert("g1".to_owned(), Object::Null);
        let mut dict = HashMap::new();
        dict.insert("CharProcs".to_owned(), Object::Dictionary(Dictionary::new(char_procs)));
        resolver.insert(reference, Object::Dictionary(Dictionary::new(dict)));

        let mut cache = FontCache::new();
        let descriptor = load_font(reference, &mut resolver, &NullCMapSource, &StubProvider, &mut cache).unwrap();
        assert!(!descriptor.is_embedded);
    }

    #[test]
    fn empty_descendant_fonts_array_is_fatal() {
        let mut resolver = InMemoryResolver::new();
        let reference = Reference {
            object_number: 2,
            generation: 0,
        };

        let mut dict = HashMap::new();
        dict.insert("Subtype".to_owned(), Object::Name("Type0".to_owned()));
        dict.insert("Encoding".to_owned(), Object::Name("Identity-H".to_owned()));
        dict.insert("DescendantFonts".to_owned(), Object::Array(Vec::new()));
        resolver.insert(reference, Object::Dictionary(Dictionary::new(dict)));

        let mut cache = FontCache::new();
        let result = load_font(reference, &mut resolver, &NullCMapSource, &StubProvider, &mut cache);
        assert!(result.is_err());
    }
}
