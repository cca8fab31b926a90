//! Type 0 / Identity-H composite font with an embedded `CIDFontType0`
//! descendant, exercising the full `DescendantFonts` + `W` array pipeline
//! through the public `load_font` entry point.

mod common;

use std::rc::Rc;

use pdf_font_loader::cmap::{NullCMapSource, WritingMode};
use pdf_font_loader::font_cid_to_gid;
use pdf_font_loader::objects::Object;
use pdf_font_loader::resolve::InMemoryResolver;
use pdf_font_loader::{load_font, FontCache};

fn cid_system_info() -> Object<'static> {
    common::dict(vec![
        ("Registry", Object::String("Adobe".to_owned())),
        ("Ordering", Object::String("Identity".to_owned())),
        ("Supplement", Object::Integer(0)),
    ])
}

fn descendant_font_descriptor(font_bytes: Vec<u8>) -> Object<'static> {
    common::dict(vec![
        ("FontName", Object::Name("TestCID".to_owned())),
        ("Flags", Object::Integer(4)),
        ("FontFile", common::embedded_stream(font_bytes)),
    ])
}

#[test]
fn identity_h_cid_font_resolves_widths_and_identity_glyph_ids() {
    let mut resolver = InMemoryResolver::new();
    let reference = common::reference(1);

    let descendant = common::dict(vec![
        ("Subtype", Object::Name("CIDFontType0".to_owned())),
        ("BaseFont", Object::Name("TestCID".to_owned())),
        ("CIDSystemInfo", cid_system_info()),
        ("FontDescriptor", descendant_font_descriptor(common::build_type1_font(&[(".notdef", 0)]))),
        (
            "W",
            Object::Array(vec![
                Object::Integer(1),
                Object::Array(vec![Object::Integer(600)]),
                Object::Integer(10),
                Object::Integer(12),
                Object::Real(700.0),
            ]),
        ),
    ]);

    resolver.insert(
        reference,
        common::dict(vec![
            ("Subtype", Object::Name("Type0".to_owned())),
            ("Encoding", Object::Name("Identity-H".to_owned())),
            ("DescendantFonts", Object::Array(vec![descendant])),
        ]),
    );

    let provider = common::FixedFontProvider {
        bytes: common::build_type1_font(&[(".notdef", 0)]),
    };

    let mut cache = FontCache::new();
    let desc = load_font(reference, &mut resolver, &NullCMapSource, &provider, &mut cache).unwrap();

    assert!(desc.is_embedded);
    assert_eq!(desc.wmode, WritingMode::Horizontal);
    assert_eq!(desc.hmtx.default_width(), 1000.0);
    assert_eq!(desc.hmtx.width(1), 600.0);
    assert_eq!(desc.hmtx.width(10), 700.0);
    assert_eq!(desc.hmtx.width(11), 700.0);
    assert_eq!(desc.hmtx.width(5), 1000.0);

    // CIDFontType0 with an (implied) Identity CIDToGIDMap never builds an
    // explicit cid_to_gid table, so lookups degrade to the identity mapping.
    assert_eq!(font_cid_to_gid(&desc, 42), 42);

    let second = load_font(reference, &mut resolver, &NullCMapSource, &provider, &mut cache).unwrap();
    assert!(Rc::ptr_eq(&desc, &second));
}

#[test]
fn truetype_substitute_with_no_unicode_cmap_is_a_hard_error() {
    // The fixture font provider only ever hands back a Type 1 program, which
    // never reports a unicode cmap; a CIDFontType2 descendant with an
    // (implied) Identity CIDToGIDMap and a substitute face in that state has
    // no way to map CIDs to glyph ids and must fail to load rather than
    // silently emulating with the wrong glyph ids.
    let mut resolver = InMemoryResolver::new();
    let reference = common::reference(3);

    let descriptor = common::dict(vec![
        ("FontName", Object::Name("MyCustomCidFont".to_owned())),
        ("Flags", Object::Integer(4)),
    ]);

    let descendant = common::dict(vec![
        ("Subtype", Object::Name("CIDFontType2".to_owned())),
        ("BaseFont", Object::Name("MyCustomCidFont".to_owned())),
        ("CIDSystemInfo", cid_system_info()),
        ("FontDescriptor", descriptor),
    ]);

    resolver.insert(
        reference,
        common::dict(vec![
            ("Subtype", Object::Name("Type0".to_owned())),
            ("Encoding", Object::Name("Identity-H".to_owned())),
            ("DescendantFonts", Object::Array(vec![descendant])),
        ]),
    );

    let provider = common::FixedFontProvider {
        bytes: common::build_type1_font(&[(".notdef", 0)]),
    };

    let mut cache = FontCache::new();
    let result = load_font(reference, &mut resolver, &NullCMapSource, &provider, &mut cache);
    assert!(result.is_err());
}

#[test]
fn empty_descendant_fonts_array_is_a_hard_error() {
    let mut resolver = InMemoryResolver::new();
    let reference = common::reference(2);

    resolver.insert(
        reference,
        common::dict(vec![
            ("Subtype", Object::Name("Type0".to_owned())),
            ("Encoding", Object::Name("Identity-H".to_owned())),
            ("DescendantFonts", Object::Array(Vec::new())),
        ]),
    );

    let provider = common::FixedFontProvider { bytes: Vec::new() };
    let mut cache = FontCache::new();
    let result = load_font(reference, &mut resolver, &NullCMapSource, &provider, &mut cache);
    assert!(result.is_err());
}
