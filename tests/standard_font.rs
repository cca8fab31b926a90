//! A standard-14 font referenced with no `FontDescriptor` at all: widths and
//! glyph ids come entirely from whatever the provider's substitute program
//! says, through the full `Object::Reference -> load_font` path.

mod common;

use std::rc::Rc;

use pdf_font_loader::cmap::NullCMapSource;
use pdf_font_loader::font_cid_to_gid;
use pdf_font_loader::objects::Object;
use pdf_font_loader::resolve::InMemoryResolver;
use pdf_font_loader::{load_font, FontCache};

#[test]
fn helvetica_with_no_descriptor_falls_back_to_the_substitute_programs_widths() {
    let mut resolver = InMemoryResolver::new();
    let reference = common::reference(1);

    let provider = common::FixedFontProvider {
        bytes: common::build_type1_font(&[(".notdef", 0), ("A", 600), ("space", 200)]),
    };

    resolver.insert(
        reference,
        common::dict(vec![
            ("Subtype", Object::Name("Type1".to_owned())),
            ("BaseFont", Object::Name("Helvetica".to_owned())),
            ("Encoding", Object::Name("WinAnsiEncoding".to_owned())),
        ]),
    );

    let mut cache = FontCache::new();
    let desc = load_font(reference, &mut resolver, &NullCMapSource, &provider, &mut cache).unwrap();

    // Helvetica is already a canonical standard-14 name, so the loader never
    // calls `find_builtin_font` for it -- it goes through the substitute
    // path instead, and is therefore not "embedded".
    assert!(!desc.is_embedded);

    assert_eq!(desc.hmtx.width(0x41), 600.0); // 'A'
    assert_eq!(desc.hmtx.width(0x20), 200.0); // space
    assert_eq!(desc.hmtx.width(0x42), 0.0); // 'B', absent from the fixture face, falls back to .notdef's width

    assert_eq!(font_cid_to_gid(&desc, 0x41), 1);
    assert_eq!(font_cid_to_gid(&desc, 0x20), 2);

    // A second load of the same reference returns the identical Rc.
    let desc2 = load_font(reference, &mut resolver, &NullCMapSource, &provider, &mut cache).unwrap();
    assert!(Rc::ptr_eq(&desc, &desc2));
}

#[test]
fn symbol_font_with_unparseable_embedded_program_still_gets_the_symbolic_flag() {
    let mut resolver = InMemoryResolver::new();
    let reference = common::reference(3);

    let provider = common::FixedFontProvider {
        bytes: common::build_type1_font(&[(".notdef", 0)]),
    };

    let descriptor = common::dict(vec![
        ("FontName", Object::Name("Symbol".to_owned())),
        ("Flags", Object::Integer(0)),
        ("FontFile", common::embedded_stream(Vec::new())),
    ]);

    resolver.insert(
        reference,
        common::dict(vec![
            ("Subtype", Object::Name("Type1".to_owned())),
            ("BaseFont", Object::Name("Symbol".to_owned())),
            ("FontDescriptor", descriptor),
        ]),
    );

    let mut cache = FontCache::new();
    let desc = load_font(reference, &mut resolver, &NullCMapSource, &provider, &mut cache).unwrap();

    // The empty FontFile stream fails to parse as either Type 1 or
    // TrueType, so the loader falls back to a substitute program -- but
    // Flags declared 0, the symbolic bit must still come from the builtin
    // Symbol/ZapfDingbats name check, not from the descriptor alone.
    assert!(desc.flags.is_symbolic());
}

#[test]
fn first_char_past_last_char_is_treated_as_no_widths_array() {
    let mut resolver = InMemoryResolver::new();
    let reference = common::reference(2);

    let provider = common::FixedFontProvider {
        bytes: common::build_type1_font(&[(".notdef", 0), ("A", 600)]),
    };

    resolver.insert(
        reference,
        common::dict(vec![
            ("Subtype", Object::Name("Type1".to_owned())),
            ("BaseFont", Object::Name("Helvetica".to_owned())),
            ("FirstChar", Object::Integer(10)),
            ("LastChar", Object::Integer(5)),
            ("Widths", Object::Array(vec![Object::Real(999.0)])),
        ]),
    );

    let mut cache = FontCache::new();
    let desc = load_font(reference, &mut resolver, &NullCMapSource, &provider, &mut cache).unwrap();

    // The nonsensical Widths array is ignored entirely, so code 10 falls
    // back to the substitute face's own advance width rather than 999.
    assert_eq!(desc.hmtx.width(10), 0.0);
}
