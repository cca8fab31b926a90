//! Glyph Resolver: the single entry point a rasterizer calls to turn a
//! CID into a glyph index inside the resolved font program. Grounded on
//! `ft_cid_to_gid`/`pdf_font_cid_to_gid` in `pdf_font.c`.

use crate::{face::ft_char_index, font::descriptor::FontDescriptor};

/// `pdf_font_cid_to_gid` (§4.8):
///
/// - a `to_ttf_cmap` takes priority when present (substitute-CJK path:
///   CID -> Unicode via the CMap, then Unicode -> glyph index via the
///   face's own cmap);
/// - otherwise an explicit `cid_to_gid` array is consulted, out-of-range
///   lookups returning 0 rather than panicking (an empty/short
///   `CIDToGIDMap` stream degenerates to "every CID maps to glyph 0",
///   which is the documented boundary behavior, not a bug);
/// - otherwise identity (`cid == gid`), which also covers simple fonts
///   whose 256-entry `etable` was copied into `cid_to_gid` directly by
///   `font::simple`.
///
/// Never fails: an unresolvable glyph degrades to index 0 (`.notdef`)
/// rather than propagating an error, matching `ft_char_index`'s own
/// best-effort contract.
pub fn font_cid_to_gid(desc: &FontDescriptor, cid: u32) -> u32 {
    if let Some(to_ttf_cmap) = &desc.to_ttf_cmap {
        let unicode = to_ttf_cmap.lookup(cid);
        return ft_char_index(desc.font_program.face.as_ref(), unicode);
    }

    if let Some(cid_to_gid) = &desc.cid_to_gid {
        return cid_to_gid.get(cid as usize).copied().unwrap_or(0) as u32;
    }

    cid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cmap::{CMap, WritingMode},
        face::{Face, FaceKind},
        font::descriptor::{FontDescriptorFlags, FontMetrics, FontProgram, FontProgramSource},
        font::metrics::HmtxTable,
    };

    struct StubFace {
        char_index: Option<u32>,
    }

    impl Face for StubFace {
        fn kind(&self) -> FaceKind {
            FaceKind::TrueType
        }

        fn char_index(&self, _unicode: u32) -> Option<u32> {
            self.char_index
        }

        fn name_index(&self, _glyph_name: &str) -> Option<u32> {
            None
        }

        fn glyph_count(&self) -> u32 {
            10
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

    fn descriptor_with(cid_to_gid: Option<Vec<u16>>, to_ttf_cmap: Option<CMap>, face_char_index: Option<u32>) -> FontDescriptor {
        FontDescriptor {
            font_program: FontProgram {
                source: FontProgramSource::Embedded,
                bytes: std::rc::Rc::from(Vec::new().into_boxed_slice()),
                face: Box::new(StubFace {
                    char_index: face_char_index,
                }),
                requires_hinting: false,
            },
            flags: FontDescriptorFlags::default(),
            metrics: FontMetrics::default(),
            encoding: CMap::new_identity(WritingMode::Horizontal),
            to_ttf_cmap,
            to_unicode: None,
            cid_to_gid,
            hmtx: HmtxTable::new(0.0),
            vmtx: None,
            wmode: WritingMode::Horizontal,
            is_embedded: true,
            width_table: None,
        }
    }

    #[test]
    fn identity_when_nothing_else_set() {
        let desc = descriptor_with(None, None, None);
        assert_eq!(font_cid_to_gid(&desc, 42), 42);
    }

    #[test]
    fn explicit_table_is_bounds_checked() {
        let desc = descriptor_with(Some(vec![5, 10, 15]), None, None);
        assert_eq!(font_cid_to_gid(&desc, 1), 10);
        assert_eq!(font_cid_to_gid(&desc, 99), 0);
    }

    #[test]
    fn to_ttf_cmap_takes_priority_over_identity_table() {
        // Identity cmap passes the CID through as "unicode"; the stub face
        // then answers a fixed glyph index regardless of what it's asked for.
        let cmap = CMap::new_identity(WritingMode::Horizontal);
        let desc = descriptor_with(Some(vec![1, 2, 3]), Some(cmap), Some(77));
        assert_eq!(font_cid_to_gid(&desc, 7), 77);
    }

    #[test]
    fn empty_cid_to_gid_table_is_all_zero() {
        let desc = descriptor_with(Some(Vec::new()), None, None);
        assert_eq!(font_cid_to_gid(&desc, 0), 0);
        assert_eq!(font_cid_to_gid(&desc, 500), 0);
    }
}
