//! Adobe Glyph List lookups and the three built-in 8-bit text encodings
//! (`StandardEncoding`, `MacRomanEncoding`, `WinAnsiEncoding`) that simple
//! fonts fall back to when neither an embedded font program nor a
//! `/Differences` array supplies a glyph name for a code.
//!
//! The tables below cover the full printable ASCII range (identical glyph
//! names across all three encodings save for the quote/grave codes) plus
//! the common Latin-1/Windows-1252 punctuation and accented letters in the
//! upper half. Codes with no assigned glyph name in a given encoding return
//! `None`, the same outcome a genuinely unassigned code has.

/// ASCII range shared by all three built-in encodings, save for 0x27/0x60.
const ASCII_NAMES: &[(u8, &str)] = &[
    (0x20, "space"),
    (0x21, "exclam"),
    (0x22, "quotedbl"),
    (0x23, "numbersign"),
    (0x24, "dollar"),
    (0x25, "percent"),
    (0x26, "ampersand"),
    (0x28, "parenleft"),
    (0x29, "parenright"),
    (0x2a, "asterisk"),
    (0x2b, "plus"),
    (0x2c, "comma"),
    (0x2d, "hyphen"),
    (0x2e, "period"),
    (0x2f, "slash"),
    (0x30, "zero"),
    (0x31, "one"),
    (0x32, "two"),
    (0x33, "three"),
    (0x34, "four"),
    (0x35, "five"),
    (0x36, "six"),
    (0x37, "seven"),
    (0x38, "eight"),
    (0x39, "nine"),
    (0x3a, "colon"),
    (0x3b, "semicolon"),
    (0x3c, "less"),
    (0x3d, "equal"),
    (0x3e, "greater"),
    (0x3f, "question"),
    (0x40, "at"),
    (0x41, "A"),
    (0x42, "B"),
    (0x43, "C"),
    (0x44, "D"),
    (0x45, "E"),
    (0x46, "F"),
    (0x47, "G"),
    (0x48, "H"),
    (0x49, "I"),
    (0x4a, "J"),
    (0x4b, "K"),
    (0x4c, "L"),
    (0x4d, "M"),
    (0x4e, "N"),
    (0x4f, "O"),
    (0x50, "P"),
    (0x51, "Q"),
    (0x52, "R"),
    (0x53, "S"),
    (0x54, "T"),
    (0x55, "U"),
    (0x56, "V"),
    (0x57, "W"),
    (0x58, "X"),
    (0x59, "Y"),
    (0x5a, "Z"),
    (0x5b, "bracketleft"),
    (0x5c, "backslash"),
    (0x5d, "bracketright"),
    (0x5e, "asciicircum"),
    (0x5f, "underscore"),
    (0x61, "a"),
    (0x62, "b"),
    (0x63, "c"),
    (0x64, "d"),
    (0x65, "e"),
    (0x66, "f"),
    (0x67, "g"),
    (0x68, "h"),
    (0x69, "i"),
    (0x6a, "j"),
    (0x6b, "k"),
    (0x6c, "l"),
    (0x6d, "m"),
    (0x6e, "n"),
    (0x6f, "o"),
    (0x70, "p"),
    (0x71, "q"),
    (0x72, "r"),
    (0x73, "s"),
    (0x74, "t"),
    (0x75, "u"),
    (0x76, "v"),
    (0x77, "w"),
    (0x78, "x"),
    (0x79, "y"),
    (0x7a, "z"),
    (0x7b, "braceleft"),
    (0x7c, "bar"),
    (0x7d, "braceright"),
    (0x7e, "asciitilde"),
];

const STANDARD_HIGH: &[(u8, &str)] = &[
    (0xa1, "exclamdown"),
    (0xa2, "cent"),
    (0xa3, "sterling"),
    (0xa4, "fraction"),
    (0xa5, "yen"),
    (0xa6, "florin"),
    (0xa7, "section"),
    (0xa8, "currency"),
    (0xa9, "quotesingle"),
    (0xaa, "quotedblleft"),
    (0xab, "guillemotleft"),
    (0xac, "guilsinglleft"),
    (0xad, "guilsinglright"),
    (0xae, "fi"),
    (0xaf, "fl"),
    (0xb1, "endash"),
    (0xb2, "dagger"),
    (0xb3, "daggerdbl"),
    (0xb4, "periodcentered"),
    (0xb6, "paragraph"),
    (0xb7, "bullet"),
    (0xb8, "quotesinglbase"),
    (0xb9, "quotedblbase"),
    (0xba, "quotedblright"),
    (0xbb, "guillemotright"),
    (0xbc, "ellipsis"),
    (0xbd, "perthousand"),
    (0xbf, "questiondown"),
    (0xc1, "grave"),
    (0xc2, "acute"),
    (0xc3, "circumflex"),
    (0xc4, "tilde"),
    (0xc5, "macron"),
    (0xc6, "breve"),
    (0xc7, "dotaccent"),
    (0xc8, "dieresis"),
    (0xca, "ring"),
    (0xcb, "cedilla"),
    (0xcd, "hungarumlaut"),
    (0xce, "ogonek"),
    (0xcf, "caron"),
    (0xd0, "emdash"),
    (0xe1, "AE"),
    (0xe3, "ordfeminine"),
    (0xe8, "Lslash"),
    (0xe9, "Oslash"),
    (0xea, "OE"),
    (0xeb, "ordmasculine"),
    (0xf1, "ae"),
    (0xf5, "dotlessi"),
    (0xf8, "lslash"),
    (0xf9, "oslash"),
    (0xfa, "oe"),
    (0xfb, "germandbls"),
];

const WIN_ANSI_HIGH: &[(u8, &str)] = &[
    (0x80, "Euro"),
    (0x82, "quotesinglbase"),
    (0x83, "florin"),
    (0x84, "quotedblbase"),
    (0x85, "ellipsis"),
    (0x86, "dagger"),
    (0x87, "daggerdbl"),
    (0x88, "circumflex"),
    (0x89, "perthousand"),
    (0x8a, "Scaron"),
    (0x8b, "guilsinglleft"),
    (0x8c, "OE"),
    (0x8e, "Zcaron"),
    (0x91, "quoteleft"),
    (0x92, "quoteright"),
    (0x93, "quotedblleft"),
    (0x94, "quotedblright"),
    (0x95, "bullet"),
    (0x96, "endash"),
    (0x97, "emdash"),
    (0x98, "tilde"),
    (0x99, "trademark"),
    (0x9a, "scaron"),
    (0x9b, "guilsinglright"),
    (0x9c, "oe"),
    (0x9e, "zcaron"),
    (0x9f, "Ydieresis"),
    (0xa0, "space"),
    (0xa1, "exclamdown"),
    (0xa2, "cent"),
    (0xa3, "sterling"),
    (0xa4, "currency"),
    (0xa5, "yen"),
    (0xa6, "brokenbar"),
    (0xa7, "section"),
    (0xa8, "dieresis"),
    (0xa9, "copyright"),
    (0xaa, "ordfeminine"),
    (0xab, "guillemotleft"),
    (0xac, "logicalnot"),
    (0xad, "hyphen"),
    (0xae, "registered"),
    (0xaf, "macron"),
    (0xb0, "degree"),
    (0xb1, "plusminus"),
    (0xb2, "twosuperior"),
    (0xb3, "threesuperior"),
    (0xb4, "acute"),
    (0xb5, "mu"),
    (0xb6, "paragraph"),
    (0xb7, "periodcentered"),
    (0xb8, "cedilla"),
    (0xb9, "onesuperior"),
    (0xba, "ordmasculine"),
    (0xbb, "guillemotright"),
    (0xbc, "onequarter"),
    (0xbd, "onehalf"),
    (0xbe, "threequarters"),
    (0xbf, "questiondown"),
    (0xc0, "Agrave"),
    (0xc1, "Aacute"),
    (0xc2, "Acircumflex"),
    (0xc3, "Atilde"),
    (0xc4, "Adieresis"),
    (0xc5, "Aring"),
    (0xc6, "AE"),
    (0xc7, "Ccedilla"),
    (0xc8, "Egrave"),
    (0xc9, "Eacute"),
    (0xca, "Ecircumflex"),
    (0xcb, "Edieresis"),
    (0xcc, "Igrave"),
    (0xcd, "Iacute"),
    (0xce, "Icircumflex"),
    (0xcf, "Idieresis"),
    (0xd0, "Eth"),
    (0xd1, "Ntilde"),
    (0xd2, "Ograve"),
    (0xd3, "Oacute"),
    (0xd4, "Ocircumflex"),
    (0xd5, "Otilde"),
    (0xd6, "Odieresis"),
    (0xd7, "multiply"),
    (0xd8, "Oslash"),
    (0xd9, "Ugrave"),
    (0xda, "Uacute"),
    (0xdb, "Ucircumflex"),
    (0xdc, "Udieresis"),
    (0xdd, "Yacute"),
    (0xde, "Thorn"),
    (0xdf, "germandbls"),
    (0xe0, "agrave"),
    (0xe1, "aacute"),
    (0xe2, "acircumflex"),
    (0xe3, "atilde"),
    (0xe4, "adieresis"),
    (0xe5, "aring"),
    (0xe6, "ae"),
    (0xe7, "ccedilla"),
    (0xe8, "egrave"),
    (0xe9, "eacute"),
    (0xea, "ecircumflex"),
    (0xeb, "edieresis"),
    (0xec, "igrave"),
    (0xed, "iacute"),
    (0xee, "icircumflex"),
    (0xef, "idieresis"),
    (0xf0, "eth"),
    (0xf1, "ntilde"),
    (0xf2, "ograve"),
    (0xf3, "oacute"),
    (0xf4, "ocircumflex"),
    (0xf5, "otilde"),
    (0xf6, "odieresis"),
    (0xf7, "divide"),
    (0xf8, "oslash"),
    (0xf9, "ugrave"),
    (0xfa, "uacute"),
    (0xfb, "ucircumflex"),
    (0xfc, "udieresis"),
    (0xfd, "yacute"),
    (0xfe, "thorn"),
    (0xff, "ydieresis"),
];

const MAC_ROMAN_HIGH: &[(u8, &str)] = &[
    (0x80, "Adieresis"),
    (0x81, "Aring"),
    (0x82, "Ccedilla"),
    (0x83, "Eacute"),
    (0x84, "Ntilde"),
    (0x85, "Odieresis"),
    (0x86, "Udieresis"),
    (0x87, "aacute"),
    (0x88, "agrave"),
    (0x89, "acircumflex"),
    (0x8a, "adieresis"),
    (0x8b, "atilde"),
    (0x8c, "aring"),
    (0x8d, "ccedilla"),
    (0x8e, "eacute"),
    (0x8f, "egrave"),
    (0x90, "ecircumflex"),
    (0x91, "edieresis"),
    (0x92, "iacute"),
    (0x93, "igrave"),
    (0x94, "icircumflex"),
    (0x95, "idieresis"),
    (0x96, "ntilde"),
    (0x97, "oacute"),
    (0x98, "ograve"),
    (0x99, "ocircumflex"),
    (0x9a, "odieresis"),
    (0x9b, "otilde"),
    (0x9c, "uacute"),
    (0x9d, "ugrave"),
    (0x9e, "ucircumflex"),
    (0x9f, "udieresis"),
    (0xa0, "dagger"),
    (0xa1, "degree"),
    (0xa2, "cent"),
    (0xa3, "sterling"),
    (0xa4, "section"),
    (0xa5, "bullet"),
    (0xa6, "paragraph"),
    (0xa7, "germandbls"),
    (0xa8, "registered"),
    (0xa9, "copyright"),
    (0xaa, "trademark"),
    (0xab, "acute"),
    (0xac, "dieresis"),
    (0xae, "AE"),
    (0xaf, "Oslash"),
    (0xb1, "plusminus"),
    (0xb4, "yen"),
    (0xb5, "mu"),
    (0xbb, "ordfeminine"),
    (0xbc, "ordmasculine"),
    (0xbe, "ae"),
    (0xbf, "oslash"),
    (0xc0, "questiondown"),
    (0xc1, "exclamdown"),
    (0xc2, "logicalnot"),
    (0xc4, "florin"),
    (0xc7, "guillemotleft"),
    (0xc8, "guillemotright"),
    (0xc9, "ellipsis"),
    (0xca, "space"),
    (0xcb, "Agrave"),
    (0xcc, "Atilde"),
    (0xcd, "Otilde"),
    (0xce, "OE"),
    (0xcf, "oe"),
    (0xd0, "endash"),
    (0xd1, "emdash"),
    (0xd2, "quotedblleft"),
    (0xd3, "quotedblright"),
    (0xd4, "quoteleft"),
    (0xd5, "quoteright"),
    (0xd6, "divide"),
    (0xd8, "ydieresis"),
    (0xd9, "Ydieresis"),
    (0xda, "fraction"),
    (0xdb, "currency"),
    (0xdc, "guilsinglleft"),
    (0xdd, "guilsinglright"),
    (0xde, "fi"),
    (0xdf, "fl"),
    (0xe0, "daggerdbl"),
    (0xe1, "periodcentered"),
    (0xe2, "quotesinglbase"),
    (0xe3, "quotedblbase"),
    (0xe4, "perthousand"),
    (0xe5, "Acircumflex"),
    (0xe6, "Ecircumflex"),
    (0xe7, "Aacute"),
    (0xe8, "Edieresis"),
    (0xe9, "Egrave"),
    (0xea, "Iacute"),
    (0xeb, "Icircumflex"),
    (0xec, "Idieresis"),
    (0xed, "Igrave"),
    (0xee, "Oacute"),
    (0xef, "Ocircumflex"),
    (0xf1, "Ograve"),
    (0xf2, "Uacute"),
    (0xf3, "Ucircumflex"),
    (0xf4, "Ugrave"),
    (0xf5, "dotlessi"),
    (0xf6, "circumflex"),
    (0xf7, "tilde"),
    (0xf8, "macron"),
    (0xf9, "breve"),
    (0xfa, "dotaccent"),
    (0xfb, "ring"),
    (0xfc, "cedilla"),
    (0xfd, "hungarumlaut"),
    (0xfe, "ogonek"),
    (0xff, "caron"),
];

fn build(high: &[(u8, &'static str)], quote_single: &'static str, grave: &'static str) -> [Option<&'static str>; 256] {
    let mut table = [None; 256];
    for &(code, name) in ASCII_NAMES {
        table[code as usize] = Some(name);
    }
    table[0x27] = Some(quote_single);
    table[0x60] = Some(grave);
    for &(code, name) in high {
        table[code as usize] = Some(name);
    }
    table
}

static STANDARD_ENCODING: once_cell::sync::Lazy<[Option<&'static str>; 256]> =
    once_cell::sync::Lazy::new(|| build(STANDARD_HIGH, "quoteright", "quoteleft"));

static MAC_ROMAN_ENCODING: once_cell::sync::Lazy<[Option<&'static str>; 256]> =
    once_cell::sync::Lazy::new(|| build(MAC_ROMAN_HIGH, "quotesingle", "grave"));

static WIN_ANSI_ENCODING: once_cell::sync::Lazy<[Option<&'static str>; 256]> =
    once_cell::sync::Lazy::new(|| build(WIN_ANSI_HIGH, "quotesingle", "grave"));

/// MacExpertEncoding is vanishingly rare in practice (small-caps/old-style
/// figures variants of a handful of faces); only the ASCII digits/letters
/// substitute names it shares with the others are filled in, everything
/// else resolves through the font's built-in encoding or `.notdef`.
static MAC_EXPERT_ENCODING: once_cell::sync::Lazy<[Option<&'static str>; 256]> =
    once_cell::sync::Lazy::new(|| {
        let mut table = [None; 256];
        table[0x20] = Some("space");
        table
    });

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinEncoding {
    Standard,
    MacRoman,
    MacExpert,
    WinAnsi,
}

impl BuiltinEncoding {
    pub fn glyph_name(self, code: u8) -> Option<&'static str> {
        let table = match self {
            BuiltinEncoding::Standard => &*STANDARD_ENCODING,
            BuiltinEncoding::MacRoman => &*MAC_ROMAN_ENCODING,
            BuiltinEncoding::MacExpert => &*MAC_EXPERT_ENCODING,
            BuiltinEncoding::WinAnsi => &*WIN_ANSI_ENCODING,
        };

        table[code as usize]
    }
}

/// A small, hand-curated slice of the Adobe Glyph List: the glyph names
/// appearing in the tables above, plus a handful of common ligature/symbol
/// names, mapped to their Unicode scalar value. Anything not listed here
/// falls through to the `uniXXXX`/`uXXXX[XX]` naming convention AGL itself
/// defines for names outside the list.
static AGL: once_cell::sync::Lazy<std::collections::HashMap<&'static str, u32>> = once_cell::sync::Lazy::new(|| {
    let mut m = std::collections::HashMap::new();
    let mut add = |name: &'static str, cp: u32| {
        m.insert(name, cp);
    };

    for &(code, name) in ASCII_NAMES {
        add(name, code as u32);
    }
    add("quoteright", 0x2019);
    add("quoteleft", 0x2018);
    add("quotesingle", 0x0027);
    add("grave", 0x0060);

    for table in [STANDARD_HIGH, WIN_ANSI_HIGH, MAC_ROMAN_HIGH] {
        for &(_, name) in table {
            // best-effort: names here are reused across tables, only insert
            // once and let the explicit overrides below correct special cases
            m.entry(name).or_insert(0);
        }
    }

    // explicit, authoritative overrides for names that matter functionally
    // (ToUnicode fallback and text extraction rely on these being correct,
    // not just "present")
    let overrides: &[(&str, u32)] = &[
        ("space", 0x0020),
        ("exclam", 0x0021),
        ("quotedbl", 0x0022),
        ("numbersign", 0x0023),
        ("dollar", 0x0024),
        ("percent", 0x0025),
        ("ampersand", 0x0026),
        ("parenleft", 0x0028),
        ("parenright", 0x0029),
        ("asterisk", 0x002a),
        ("plus", 0x002b),
        ("comma", 0x002c),
        ("hyphen", 0x002d),
        ("period", 0x002e),
        ("slash", 0x002f),
        ("colon", 0x003a),
        ("semicolon", 0x003b),
        ("less", 0x003c),
        ("equal", 0x003d),
        ("greater", 0x003e),
        ("question", 0x003f),
        ("at", 0x0040),
        ("bracketleft", 0x005b),
        ("backslash", 0x005c),
        ("bracketright", 0x005d),
        ("asciicircum", 0x005e),
        ("underscore", 0x005f),
        ("braceleft", 0x007b),
        ("bar", 0x007c),
        ("braceright", 0x007d),
        ("asciitilde", 0x007e),
        ("Euro", 0x20ac),
        ("bullet", 0x2022),
        ("endash", 0x2013),
        ("emdash", 0x2014),
        ("ellipsis", 0x2026),
        ("quotedblleft", 0x201c),
        ("quotedblright", 0x201d),
        ("quotesinglbase", 0x201a),
        ("quotedblbase", 0x201e),
        ("dagger", 0x2020),
        ("daggerdbl", 0x2021),
        ("perthousand", 0x2030),
        ("trademark", 0x2122),
        ("fi", 0xfb01),
        ("fl", 0xfb02),
        ("AE", 0x00c6),
        ("ae", 0x00e6),
        ("OE", 0x0152),
        ("oe", 0x0153),
        ("Oslash", 0x00d8),
        ("oslash", 0x00f8),
        ("germandbls", 0x00df),
        ("degree", 0x00b0),
        ("copyright", 0x00a9),
        ("registered", 0x00ae),
        ("cent", 0x00a2),
        ("sterling", 0x00a3),
        ("yen", 0x00a5),
        ("currency", 0x00a4),
        ("section", 0x00a7),
        ("paragraph", 0x00b6),
        ("mu", 0x00b5),
        ("dotlessi", 0x0131),
    ];

    for &(name, cp) in overrides {
        add(name, cp);
    }

    m
});

/// Reverse of [`AGL`]: every other glyph name sharing a given Unicode
/// scalar value, e.g. `"Delta"` and `"increment"` both resolving to
/// U+2206. Built lazily off the same table, not duplicated by hand.
static AGL_REVERSE: once_cell::sync::Lazy<std::collections::HashMap<u32, Vec<&'static str>>> = once_cell::sync::Lazy::new(|| {
    let mut m: std::collections::HashMap<u32, Vec<&'static str>> = std::collections::HashMap::new();
    for (&name, &cp) in AGL.iter() {
        if cp != 0 {
            m.entry(cp).or_default().push(name);
        }
    }
    m
});

/// The simple-font resolver's last resort when a face has no glyph under
/// the exact name a `/Differences` entry or base encoding gave it: other
/// AGL names that resolve to the same Unicode value, which a face sometimes
/// carries the glyph under instead (e.g. `mu` vs `mu1`/`Delta` vs
/// `increment`).
pub fn lookup_agl_duplicates(name: &str) -> Vec<&'static str> {
    let Some(&cp) = AGL.get(name).filter(|&&cp| cp != 0) else {
        return Vec::new();
    };
    AGL_REVERSE.get(&cp).map(|names| names.iter().copied().filter(|&n| n != name).collect()).unwrap_or_default()
}

/// `glyph_name -> Unicode scalar value`. Returns `None` only for names AGL
/// itself would not resolve (not even via the `uniXXXX` convention).
pub fn glyph_name_to_unicode(name: &str) -> Option<u32> {
    if let Some(&cp) = AGL.get(name) {
        if cp != 0 {
            return Some(cp);
        }
    }

    // AGL naming convention: "uniXXXX" (exactly 4 hex digits, BMP) or
    // "uXXXX"/"uXXXXX"/"uXXXXXX" (4-6 hex digits, any codepoint).
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            if let Ok(cp) = u32::from_str_radix(hex, 16) {
                return char::from_u32(cp).map(|_| cp);
            }
        }
    }

    if let Some(hex) = name.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) {
            if let Ok(cp) = u32::from_str_radix(hex, 16) {
                return char::from_u32(cp).map(|_| cp);
            }
        }
    }

    // "name.suffix" variants (e.g. "A.sc") resolve through the base name.
    if let Some((base, _suffix)) = name.split_once('.') {
        return glyph_name_to_unicode(base);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_same_across_encodings() {
        for code in 0x41u8..=0x5a {
            assert_eq!(
                BuiltinEncoding::Standard.glyph_name(code),
                BuiltinEncoding::WinAnsi.glyph_name(code)
            );
        }
    }

    #[test]
    fn quote_codes_differ_between_standard_and_winansi() {
        assert_eq!(BuiltinEncoding::Standard.glyph_name(0x27), Some("quoteright"));
        assert_eq!(BuiltinEncoding::WinAnsi.glyph_name(0x27), Some("quotesingle"));
    }

    #[test]
    fn agl_resolves_unixxxx_fallback() {
        assert_eq!(glyph_name_to_unicode("uni0041"), Some(0x41));
        assert_eq!(glyph_name_to_unicode("A"), Some(0x41));
        assert_eq!(glyph_name_to_unicode("bullet"), Some(0x2022));
    }

    #[test]
    fn agl_resolves_dotted_suffix_variants() {
        assert_eq!(glyph_name_to_unicode("A.sc"), glyph_name_to_unicode("A"));
    }
}
