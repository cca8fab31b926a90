//! Font-name normalization: the alias table for the 14 standard fonts, the
//! lenient (space-insensitive) string comparison it's built on, DynaLab
//! hinting detection, and the cp936 mis-encoded-Chinese-font workaround
//! table. All four are ported directly from `pdf_font.c`'s
//! `base_font_names`/`clean_font_name`/`strcmp_ignore_space`/`is_dynalab`
//! and the inline `cp936fonts` table in `pdf_load_simple_font`.

/// `base_font_names`: each row is a standard-14 canonical name followed by
/// every alias a real-world `BaseFont`/`FontName` is seen carrying for it.
const BASE_FONT_NAMES: &[&[&str]] = &[
    &["Courier", "CourierNew", "CourierNewPSMT"],
    &[
        "Courier-Bold",
        "CourierNew,Bold",
        "Courier,Bold",
        "CourierNewPS-BoldMT",
        "CourierNew-Bold",
    ],
    &[
        "Courier-Oblique",
        "CourierNew,Italic",
        "Courier,Italic",
        "CourierNewPS-ItalicMT",
        "CourierNew-Italic",
    ],
    &[
        "Courier-BoldOblique",
        "CourierNew,BoldItalic",
        "Courier,BoldItalic",
        "CourierNewPS-BoldItalicMT",
        "CourierNew-BoldItalic",
    ],
    &["Helvetica", "ArialMT", "Arial"],
    &[
        "Helvetica-Bold",
        "Arial-BoldMT",
        "Arial,Bold",
        "Arial-Bold",
        "Helvetica,Bold",
    ],
    &[
        "Helvetica-Oblique",
        "Arial-ItalicMT",
        "Arial,Italic",
        "Arial-Italic",
        "Helvetica,Italic",
        "Helvetica-Italic",
    ],
    &[
        "Helvetica-BoldOblique",
        "Arial-BoldItalicMT",
        "Arial,BoldItalic",
        "Arial-BoldItalic",
        "Helvetica,BoldItalic",
        "Helvetica-BoldItalic",
    ],
    &[
        "Times-Roman",
        "TimesNewRomanPSMT",
        "TimesNewRoman",
        "TimesNewRomanPS",
    ],
    &[
        "Times-Bold",
        "TimesNewRomanPS-BoldMT",
        "TimesNewRoman,Bold",
        "TimesNewRomanPS-Bold",
        "TimesNewRoman-Bold",
    ],
    &[
        "Times-Italic",
        "TimesNewRomanPS-ItalicMT",
        "TimesNewRoman,Italic",
        "TimesNewRomanPS-Italic",
        "TimesNewRoman-Italic",
    ],
    &[
        "Times-BoldItalic",
        "TimesNewRomanPS-BoldItalicMT",
        "TimesNewRoman,BoldItalic",
        "TimesNewRomanPS-BoldItalic",
        "TimesNewRoman-BoldItalic",
    ],
    &["Symbol"],
    &["ZapfDingbats"],
];

/// Compares two names ignoring all spaces, the way `strcmp_ignore_space`
/// does -- `"Times New Roman"` and `"TimesNewRoman"` compare equal.
fn eq_ignore_space(a: &str, b: &str) -> bool {
    a.chars().filter(|c| *c != ' ').eq(b.chars().filter(|c| *c != ' '))
}

/// Maps any known alias to its standard-14 canonical name; returns the
/// input unchanged if it isn't recognized.
pub fn clean_font_name(name: &str) -> &str {
    for family in BASE_FONT_NAMES {
        if family.iter().any(|alias| eq_ignore_space(alias, name)) {
            return family[0];
        }
    }
    name
}

/// DynaLab ships a handful of CJK TrueType fonts whose hinting bytecode is
/// load-bearing for legibility; this loader doesn't rasterize, so it's
/// surfaced only as a hint for a caller that does.
pub fn is_dynalab(name: &str) -> bool {
    name.contains("HuaTian")
        || name.contains("MingLi")
        || name.starts_with("DF")
        || name.contains("+DF")
        || name.starts_with("DLC")
        || name.contains("+DLC")
}

/// `cp936fonts`: documents produced by at least one popular Chinese PDF
/// generator declare `WinAnsiEncoding` (and no `ToUnicode`) for a font whose
/// `BaseFont` is actually one of these GB-2312 names misencoded as Latin-1
/// bytes. `pdf_load_simple_font` special-cases exactly these five names.
pub fn cp936_workaround_name(base_font_bytes: &[u8]) -> Option<&'static str> {
    const TABLE: &[(&[u8], &str)] = &[
        (b"\xCB\xCE\xCC\xE5", "SimSun,Regular"),
        (b"\xBA\xDA\xCC\xE5", "SimHei,Regular"),
        (b"\xBF\xAC\xCC\xE5_GB2312", "SimKai,Regular"),
        (b"\xB7\xC2\xCB\xCE_GB2312", "SimFang,Regular"),
        (b"\xC1\xA5\xCA\xE9", "SimLi,Regular"),
    ];

    TABLE.iter().find(|(bytes, _)| *bytes == base_font_bytes).map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_font_name_resolves_known_alias() {
        assert_eq!(clean_font_name("ArialMT"), "Helvetica");
        assert_eq!(clean_font_name("TimesNewRoman,BoldItalic"), "Times-BoldItalic");
    }

    #[test]
    fn clean_font_name_ignores_spaces() {
        assert_eq!(clean_font_name("Courier New"), "Courier");
    }

    #[test]
    fn clean_font_name_passes_through_unknown() {
        assert_eq!(clean_font_name("SomeEmbeddedFontXYZ"), "SomeEmbeddedFontXYZ");
    }

    #[test]
    fn dynalab_prefix_and_substring_forms() {
        assert!(is_dynalab("DFKaiShu"));
        assert!(is_dynalab("Foo+DLCHei"));
        assert!(!is_dynalab("Helvetica"));
    }

    #[test]
    fn cp936_table_matches_simsun_bytes() {
        assert_eq!(cp936_workaround_name(b"\xCB\xCE\xCC\xE5"), Some("SimSun,Regular"));
        assert_eq!(cp936_workaround_name(b"not a match"), None);
    }
}
