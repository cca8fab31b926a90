//! Character-code -> CID mapping (`CMap`), used by Type 0 (composite) fonts
//! to turn the bytes of a string operator into CIDs before width lookup and
//! glyph-index resolution take over.
//!
//! The two predefined "Identity" CMaps are always available, since the PDF
//! spec mandates conforming readers support them without any external
//! resource. Any other predefined (named) CMap -- `GBK-EUC-H`, `UniGB-UCS2-H`,
//! etc. -- is a resource file shipped alongside a real engine, not bytes this
//! crate can fabricate, so it is resolved through the injected
//! [`CMapSource`] instead. Embedded CMap streams (the bytes sit directly in
//! the PDF) are parsed for real, by this module, since that parsing has
//! nothing to do with the host filesystem.

use std::collections::HashMap;

use crate::{error::FontError, objects::Reference, PdfResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingMode {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
struct CidRange {
    lo: u32,
    hi: u32,
    base_cid: u32,
}

/// A parsed code -> CID mapping.
///
/// `Identity-H`/`Identity-V` are represented the same way as any other
/// CMap (a single all-covering 2-byte range with `base_cid == lo`), rather
/// than as a special-cased variant, so `lookup`/`wmode`/`size_bytes` don't
/// need to branch on "is this the identity cmap".
#[derive(Debug, Clone)]
pub struct CMap {
    wmode: WritingMode,
    code_space: Vec<(u32, u32, u8)>,
    ranges: Vec<CidRange>,
    singles: HashMap<u32, u32>,
}

impl CMap {
    pub fn new_identity(wmode: WritingMode) -> Self {
        Self {
            wmode,
            code_space: vec![(0x0000, 0xffff, 2)],
            ranges: vec![CidRange {
                lo: 0,
                hi: 0xffff,
                base_cid: 0,
            }],
            singles: HashMap::new(),
        }
    }

    /// A simple font's identity encoding: single-byte codespace, each code
    /// its own CID. Distinct from [`CMap::new_identity`], which is the
    /// 2-byte Identity-H/V Type 0 fonts use.
    pub fn new_identity_one_byte(wmode: WritingMode) -> Self {
        Self {
            wmode,
            code_space: vec![(0x00, 0xff, 1)],
            ranges: vec![CidRange {
                lo: 0,
                hi: 0xff,
                base_cid: 0,
            }],
            singles: HashMap::new(),
        }
    }

    pub fn wmode(&self) -> WritingMode {
        self.wmode
    }

    /// Number of bytes the next character code consumes, per the
    /// codespace ranges declared by this CMap. Falls back to 1 if the code
    /// doesn't fall in any declared range (matches a malformed/truncated
    /// string being read byte-by-byte rather than panicking).
    pub fn code_length_at(&self, bytes: &[u8]) -> u8 {
        for &(lo, hi, len) in &self.code_space {
            if bytes.len() < len as usize {
                continue;
            }

            let mut code = 0u32;
            for &b in &bytes[..len as usize] {
                code = (code << 8) | b as u32;
            }

            if code >= lo && code <= hi {
                return len;
            }
        }

        1
    }

    pub fn lookup(&self, code: u32) -> u32 {
        if let Some(&cid) = self.singles.get(&code) {
            return cid;
        }

        for range in &self.ranges {
            if code >= range.lo && code <= range.hi {
                return range.base_cid + (code - range.lo);
            }
        }

        0
    }

    pub fn size_bytes(&self) -> usize {
        self.ranges.len() * std::mem::size_of::<CidRange>() + self.singles.len() * 8
    }

    /// Parses a CMap stream's PostScript-like body for the three
    /// constructs font loading actually cares about: `codespacerange`,
    /// `cidrange`, and `cidchar`. Everything else (the procset boilerplate,
    /// `usecmap`, `begin`/`end`) is skipped rather than rejected, since a
    /// real CMap stream is full of it and none of it changes the mapping
    /// this loader needs.
    pub fn parse_embedded(bytes: &[u8], wmode: WritingMode, reference: Reference) -> PdfResult<Self> {
        let tokens = tokenize(bytes);
        let mut code_space = Vec::new();
        let mut ranges = Vec::new();
        let mut singles = HashMap::new();

        let mut i = 0;
        while i < tokens.len() {
            match tokens[i].as_str() {
                "begincodespacerange" => {
                    i += 1;
                    while i + 1 < tokens.len() && tokens[i] != "endcodespacerange" {
                        let lo = parse_hex_string(&tokens[i]).ok_or_else(|| {
                            FontError::MalformedCMap {
                                reference,
                                reason: "malformed codespacerange lo".to_owned(),
                            }
                        })?;
                        let hi = parse_hex_string(&tokens[i + 1]).ok_or_else(|| {
                            FontError::MalformedCMap {
                                reference,
                                reason: "malformed codespacerange hi".to_owned(),
                            }
                        })?;
                        let len = hex_string_byte_len(&tokens[i]);
                        code_space.push((lo, hi, len));
                        i += 2;
                    }
                }
                "begincidrange" => {
                    i += 1;
                    while i + 2 < tokens.len() && tokens[i] != "endcidrange" {
                        let lo = parse_hex_string(&tokens[i]).ok_or_else(|| FontError::MalformedCMap {
                            reference,
                            reason: "malformed cidrange lo".to_owned(),
                        })?;
                        let hi = parse_hex_string(&tokens[i + 1]).ok_or_else(|| FontError::MalformedCMap {
                            reference,
                            reason: "malformed cidrange hi".to_owned(),
                        })?;
                        let cid: u32 = tokens[i + 2].parse().map_err(|_| FontError::MalformedCMap {
                            reference,
                            reason: "malformed cidrange cid".to_owned(),
                        })?;
                        ranges.push(CidRange { lo, hi, base_cid: cid });
                        i += 3;
                    }
                }
                "begincidchar" => {
                    i += 1;
                    while i + 1 < tokens.len() && tokens[i] != "endcidchar" {
                        let code = parse_hex_string(&tokens[i]).ok_or_else(|| FontError::MalformedCMap {
                            reference,
                            reason: "malformed cidchar code".to_owned(),
                        })?;
                        let cid: u32 = tokens[i + 1].parse().map_err(|_| FontError::MalformedCMap {
                            reference,
                            reason: "malformed cidchar cid".to_owned(),
                        })?;
                        singles.insert(code, cid);
                        i += 2;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        if code_space.is_empty() {
            code_space.push((0x0000, 0xffff, 2));
        }

        Ok(Self {
            wmode,
            code_space,
            ranges,
            singles,
        })
    }
}

/// Splits a CMap stream body into whitespace/delimiter-separated tokens,
/// keeping `<...>` hex strings intact as single tokens.
fn tokenize(bytes: &[u8]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'%' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'<' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'>' {
                    i += 1;
                }
                i += 1;
                tokens.push(String::from_utf8_lossy(&bytes[start..i.min(bytes.len())]).into_owned());
            }
            b'/' => {
                let start = i;
                i += 1;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                tokens.push(String::from_utf8_lossy(&bytes[start..i]).into_owned());
            }
            _ => {
                let start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'<' && bytes[i] != b'/' {
                    i += 1;
                }
                if i == start {
                    i += 1;
                    continue;
                }
                tokens.push(String::from_utf8_lossy(&bytes[start..i]).into_owned());
            }
        }
    }

    tokens
}

fn hex_string_byte_len(token: &str) -> u8 {
    let inner = token.trim_start_matches('<').trim_end_matches('>');
    ((inner.len() + 1) / 2) as u8
}

fn parse_hex_string(token: &str) -> Option<u32> {
    let inner = token.strip_prefix('<')?.strip_suffix('>')?;
    u32::from_str_radix(inner, 16).ok()
}

fn parse_hex_bytes(token: &str) -> Option<Vec<u8>> {
    let inner = token.strip_prefix('<')?.strip_suffix('>')?;
    let inner = if inner.len() % 2 == 1 {
        format!("{inner}0")
    } else {
        inner.to_owned()
    };

    (0..inner.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&inner[i..i + 2], 16).ok())
        .collect()
}

fn utf16be_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| if c.len() == 2 { u16::from_be_bytes([c[0], c[1]]) } else { c[0] as u16 })
        .collect();
    String::from_utf16_lossy(&units)
}

/// Parses a `ToUnicode` CMap stream's `beginbfchar`/`beginbfrange` sections
/// into a direct code -> Unicode string table. This is a different grammar
/// from the CID CMaps `CMap::parse_embedded` reads (destination is a UTF-16BE
/// string or array of them, not a numeric CID), so it gets its own parser
/// built on the same tokenizer.
pub fn parse_to_unicode(bytes: &[u8]) -> HashMap<u32, String> {
    let tokens = tokenize(bytes);
    let mut map = HashMap::new();
    let mut i = 0;

    while i < tokens.len() {
        match tokens[i].as_str() {
            "beginbfchar" => {
                i += 1;
                while i + 1 < tokens.len() && tokens[i] != "endbfchar" {
                    if let (Some(code), Some(dst)) = (parse_hex_string(&tokens[i]), parse_hex_bytes(&tokens[i + 1])) {
                        map.insert(code, utf16be_to_string(&dst));
                    }
                    i += 2;
                }
            }
            "beginbfrange" => {
                i += 1;
                while i < tokens.len() && tokens[i] != "endbfrange" {
                    if tokens[i] == "[" {
                        // `<lo> <hi> [ <dst0> <dst1> ... ]` form: consume the
                        // bracketed list but this loader only needs the
                        // ranges it can walk densely, so it's skipped.
                        while i < tokens.len() && tokens[i] != "]" {
                            i += 1;
                        }
                        i += 1;
                        continue;
                    }

                    if i + 2 >= tokens.len() {
                        break;
                    }

                    let (Some(lo), Some(hi), Some(dst_bytes)) = (
                        parse_hex_string(&tokens[i]),
                        parse_hex_string(&tokens[i + 1]),
                        parse_hex_bytes(&tokens[i + 2]),
                    ) else {
                        i += 3;
                        continue;
                    };

                    let base = u32::from_be_bytes([0, 0, dst_bytes.get(0).copied().unwrap_or(0), dst_bytes.get(1).copied().unwrap_or(0)]);

                    for code in lo..=hi {
                        let offset = code - lo;
                        let scalar = base + offset;
                        if let Some(c) = char::from_u32(scalar) {
                            map.insert(code, c.to_string());
                        }
                    }

                    i += 3;
                }
            }
            _ => {}
        }
        i += 1;
    }

    map
}

/// Resolves the *predefined* (named) system CMaps -- `GBK-EUC-H`,
/// `UniGB-UCS2-H`, `90ms-RKSJ-H`, and the like -- that a real PDF consumer
/// ships as data files. Identity-H/Identity-V never reach this trait; they
/// are built in (`CMap::new_identity`).
pub trait CMapSource {
    fn load_system_cmap(&self, name: &str) -> PdfResult<CMap>;
}

/// A `CMapSource` with no predefined CMaps bundled. Every lookup is a
/// `FontError`-wrapped failure, which the loader treats the same way it
/// treats a missing font program: log and fall back (here, falling back to
/// `Identity-H`/`Identity-V`, which is wrong for the glyphs it doesn't
/// cover but keeps positioning sane rather than refusing to load the page
/// at all).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCMapSource;

impl CMapSource for NullCMapSource {
    fn load_system_cmap(&self, name: &str) -> PdfResult<CMap> {
        anyhow::bail!("no system CMap resource for {name:?} is available")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_roundtrips() {
        let cmap = CMap::new_identity(WritingMode::Horizontal);
        assert_eq!(cmap.lookup(0x1234), 0x1234);
        assert_eq!(cmap.code_length_at(&[0x12, 0x34]), 2);
    }

    #[test]
    fn parses_cidrange_and_cidchar() {
        let src = b"
            1 begincodespacerange
            <0000> <ffff>
            endcodespacerange
            2 begincidrange
            <0000> <00ff> 0
            <0100> <01ff> 500
            endcidrange
            1 begincidchar
            <ffff> 42
            endcidchar
        ";

        let cmap = CMap::parse_embedded(
            src,
            WritingMode::Horizontal,
            Reference {
                object_number: 1,
                generation: 0,
            },
        )
        .unwrap();

        assert_eq!(cmap.lookup(0x0005), 5);
        assert_eq!(cmap.lookup(0x0100), 500);
        assert_eq!(cmap.lookup(0x01ff), 500 + 0xff);
        assert_eq!(cmap.lookup(0xffff), 42);
    }

    #[test]
    fn parses_to_unicode_bfchar_and_bfrange() {
        let src = b"
            1 beginbfchar
            <0041> <0041>
            endbfchar
            1 beginbfrange
            <0042> <0044> <0042>
            endbfrange
        ";

        let map = parse_to_unicode(src);
        assert_eq!(map.get(&0x0041).map(String::as_str), Some("A"));
        assert_eq!(map.get(&0x0042).map(String::as_str), Some("B"));
        assert_eq!(map.get(&0x0043).map(String::as_str), Some("C"));
        assert_eq!(map.get(&0x0044).map(String::as_str), Some("D"));
    }
}
