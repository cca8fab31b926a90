//! Horizontal/vertical metric range tables (`Hmtx`/`Vmtx`) and the dense
//! glyph-indexed width-table stretch used for substitute fonts.
//!
//! Grounded directly on `pdf_font.c`'s `pdf_add_hmtx`/`pdf_end_hmtx`/
//! `pdf_add_vmtx`/`pdf_end_vmtx`/`pdf_set_default_hmtx`/
//! `pdf_set_default_vmtx`/`pdf_make_width_table`: a flat, sorted,
//! non-overlapping list of `{lo, hi, w[, x, y]}` ranges keyed by character
//! code (simple fonts) or CID (composite fonts), with one explicit default
//! entry covering codes no range names. `pdf_add_hmtx` in the original is an
//! append (ranges are expected to arrive already sorted/non-overlapping from
//! the `Widths`/`W` array traversal) followed by a sort-and-merge pass in
//! `pdf_end_hmtx`; the same shape is kept here.

use crate::PdfResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HmtxRange {
    pub lo: u32,
    pub hi: u32,
    pub w: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VmtxRange {
    pub lo: u32,
    pub hi: u32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
}

#[derive(Debug, Clone)]
pub struct HmtxTable {
    default: HmtxRange,
    ranges: Vec<HmtxRange>,
}

impl HmtxTable {
    /// `pdf_set_default_hmtx`: `lo=0x0000, hi=0xFFFF` covering everything not
    /// named by a more specific range, default width 1000 unless overridden
    /// (`MissingWidth`/`DW`).
    pub fn new(default_width: f32) -> Self {
        Self {
            default: HmtxRange {
                lo: 0x0000,
                hi: 0xffff,
                w: default_width,
            },
            ranges: Vec::new(),
        }
    }

    pub fn add(&mut self, lo: u32, hi: u32, w: f32) {
        self.ranges.push(HmtxRange { lo, hi, w });
    }

    /// `pdf_end_hmtx`: sorts ranges by `lo` so lookup can binary search /
    /// scan in order; the original also merges adjacent identical-width
    /// ranges, which is an optimization this loader doesn't need since it
    /// isn't size-constrained the way an embedded renderer's font cache is.
    pub fn finish(&mut self) {
        self.ranges.sort_by_key(|r| r.lo);
    }

    pub fn width(&self, code: u32) -> f32 {
        for range in &self.ranges {
            if code >= range.lo && code <= range.hi {
                return range.w;
            }
        }
        self.default.w
    }

    pub fn ranges(&self) -> &[HmtxRange] {
        &self.ranges
    }

    pub fn default_width(&self) -> f32 {
        self.default.w
    }
}

#[derive(Debug, Clone)]
pub struct VmtxTable {
    default: VmtxRange,
    ranges: Vec<VmtxRange>,
}

impl VmtxTable {
    /// `pdf_set_default_vmtx`: default position `(0, dw2y)` and width
    /// `dw2w`, per spec default `DW2 = [880, -1000]`.
    pub fn new(default_y: f32, default_w: f32) -> Self {
        Self {
            default: VmtxRange {
                lo: 0x0000,
                hi: 0xffff,
                x: 0.0,
                y: default_y,
                w: default_w,
            },
            ranges: Vec::new(),
        }
    }

    pub fn add(&mut self, lo: u32, hi: u32, x: f32, y: f32, w: f32) {
        self.ranges.push(VmtxRange { lo, hi, x, y, w });
    }

    pub fn finish(&mut self) {
        self.ranges.sort_by_key(|r| r.lo);
    }

    pub fn metrics(&self, code: u32) -> (f32, f32, f32) {
        for range in &self.ranges {
            if code >= range.lo && code <= range.hi {
                return (range.x, range.y, range.w);
            }
        }
        (self.default.x, self.default.y, self.default.w)
    }

    pub fn ranges(&self) -> &[VmtxRange] {
        &self.ranges
    }

    pub fn default_metrics(&self) -> (f32, f32, f32) {
        (self.default.x, self.default.y, self.default.w)
    }
}

/// `pdf_make_width_table`: builds a dense glyph-index -> width array for
/// substitute (non-CJK) fonts that have no `to_ttf_cmap`, so a renderer can
/// index widths by GID directly instead of re-running the CMap/cid-to-gid
/// lookup per glyph. Two passes, exactly as the original: first find the
/// highest GID any hmtx range maps to, then allocate and fill.
pub fn build_width_table(hmtx: &HmtxTable, code_to_cid: impl Fn(u32) -> u32, cid_to_gid: impl Fn(u32) -> u32) -> Vec<f32> {
    let mut max_gid = 0u32;
    for range in hmtx.ranges() {
        for code in range.lo..=range.hi {
            let gid = cid_to_gid(code_to_cid(code));
            max_gid = max_gid.max(gid);
        }
    }

    let mut table = vec![0.0f32; max_gid as usize + 1];
    for range in hmtx.ranges() {
        for code in range.lo..=range.hi {
            let gid = cid_to_gid(code_to_cid(code));
            if (gid as usize) < table.len() {
                table[gid as usize] = range.w;
            }
        }
    }

    table
}

/// Parses a `ToUnicode` CMap stream into a direct code -> string table,
/// thin wrapper kept here (rather than duplicated at each call site) since
/// both the simple-font and CID-font loaders need it.
pub fn load_to_unicode(stream_data: &[u8]) -> PdfResult<std::collections::HashMap<u32, String>> {
    Ok(crate::cmap::parse_to_unicode(stream_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmtx_falls_back_to_default() {
        let mut t = HmtxTable::new(1000.0);
        t.add(65, 90, 600.0);
        t.finish();
        assert_eq!(t.width(65), 600.0);
        assert_eq!(t.width(97), 1000.0);
    }

    #[test]
    fn vmtx_tracks_xyw_per_range() {
        let mut t = VmtxTable::new(880.0, -1000.0);
        t.add(1, 10, 50.0, 900.0, -1000.0);
        t.finish();
        assert_eq!(t.metrics(5), (50.0, 900.0, -1000.0));
        assert_eq!(t.metrics(50), (0.0, 880.0, -1000.0));
    }

    #[test]
    fn width_table_stretches_to_max_gid() {
        let mut hmtx = HmtxTable::new(0.0);
        hmtx.add(0, 2, 500.0);
        hmtx.finish();
        // identity cid/gid mapping
        let table = build_width_table(&hmtx, |c| c, |cid| cid);
        assert_eq!(table.len(), 3);
        assert_eq!(table[2], 500.0);
    }
}
