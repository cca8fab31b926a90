//! Shared fixtures for the end-to-end tests: a from-scratch Type 1 font
//! program builder (mirroring the crate's own eexec cipher so embedded/
//! substitute/builtin font bytes are genuinely parseable by `Type1Face`)
//! plus small `FontProvider` test doubles.

use std::collections::HashMap;

use pdf_font_loader::font_provider::{CjkOrdering, FontProvider, SubstituteStyle};
use pdf_font_loader::objects::{Dictionary, Object, Reference};
use pdf_font_loader::stream::Stream;
use pdf_font_loader::PdfResult;

const EEXEC_C1: u16 = 52845;
const EEXEC_C2: u16 = 22719;

/// The Type 1 eexec cipher is its own inverse: both directions derive the
/// next key state from the ciphertext byte, so running the same update rule
/// with the plaintext's corresponding ciphertext byte encrypts exactly as
/// `Type1Face`'s own decryptor decrypts.
fn type1_encrypt(plain: &[u8], seed: u16) -> Vec<u8> {
    let mut r = seed;
    let mut out = Vec::with_capacity(plain.len());
    for &p in plain {
        let c = p ^ (r >> 8) as u8;
        out.push(c);
        r = (c as u16).wrapping_add(r).wrapping_mul(EEXEC_C1).wrapping_add(EEXEC_C2);
    }
    out
}

fn encode_number(v: i32) -> Vec<u8> {
    if (-107..=107).contains(&v) {
        vec![(v + 139) as u8]
    } else if (108..=1131).contains(&v) {
        let w = v - 108;
        vec![(247 + (w >> 8)) as u8, (w & 0xff) as u8]
    } else if (-1131..=-108).contains(&v) {
        let w = -v - 108;
        vec![(251 + (w >> 8)) as u8, (w & 0xff) as u8]
    } else {
        let mut out = vec![255u8];
        out.extend_from_slice(&v.to_be_bytes());
        out
    }
}

/// A single `hsbw`-only charstring (`sbx wx hsbw endchar`) encrypted with
/// the per-charstring seed. The 4-byte garbage prefix is varied until the
/// resulting ciphertext contains no `/` byte, so the plaintext-dictionary
/// scanner that looks for `/name ... RD <bytes> ND` entries never mistakes a
/// stray ciphertext byte for the start of the next glyph name.
fn charstring_cipher(width: i32) -> Vec<u8> {
    let mut plain = encode_number(0);
    plain.extend(encode_number(width));
    plain.push(13); // hsbw
    plain.push(14); // endchar

    for g0 in 0u8..=255 {
        for g1 in 0u8..=255 {
            let mut inner = vec![g0, g1, 0, 0];
            inner.extend_from_slice(&plain);
            let cipher = type1_encrypt(&inner, 4330);
            if !cipher.contains(&b'/') {
                return cipher;
            }
        }
    }

    unreachable!("every 4-byte garbage prefix produced a charstring containing a literal '/'");
}

/// Builds a minimal but genuinely parseable Type 1 font program: a cleartext
/// header naming the font, followed by an eexec-encrypted private dict
/// holding one `hsbw`-only charstring per `(glyph name, advance width)` pair.
/// `.notdef` is not added automatically -- callers that rely on glyph 0
/// existing should list it first, matching how a real Type 1 `CharStrings`
/// dict is always ordered.
pub fn build_type1_font(glyphs: &[(&str, i32)]) -> Vec<u8> {
    let cleartext = b"%!FontType1-1.0\n/FontName /TestFont def\n/Encoding StandardEncoding def\ncurrentfile eexec\n";

    let mut private_plain: Vec<u8> = vec![0, 0, 0, 0];
    private_plain.extend_from_slice(b"dup /Private 9 dict dup begin\n/CharStrings ");
    private_plain.extend_from_slice(glyphs.len().to_string().as_bytes());
    private_plain.extend_from_slice(b" dict dup begin\n");

    for (name, width) in glyphs {
        let cipher = charstring_cipher(*width);
        private_plain.extend_from_slice(format!("/{name} {} RD ", cipher.len()).as_bytes());
        private_plain.extend_from_slice(&cipher);
        private_plain.extend_from_slice(b" ND\n");
    }

    private_plain.extend_from_slice(b"end\nend\n");

    let private_cipher = type1_encrypt(&private_plain, 55665);

    let mut data = cleartext.to_vec();
    data.extend_from_slice(&private_cipher);
    data
}

pub fn reference(object_number: usize) -> Reference {
    Reference {
        object_number,
        generation: 0,
    }
}

pub fn dict(entries: Vec<(&str, Object<'static>)>) -> Object<'static> {
    let mut map = HashMap::new();
    for (k, v) in entries {
        map.insert(k.to_owned(), v);
    }
    Object::Dictionary(Dictionary::new(map))
}

pub fn embedded_stream(bytes: Vec<u8>) -> Object<'static> {
    Object::Stream(Stream::new(Dictionary::new(HashMap::new()), bytes))
}

/// Always hands back the same font bytes for every builtin/substitute
/// lookup; CJK substitutes are out of scope for this fixture (no real
/// TrueType bytes to fabricate by hand) and always fail.
pub struct FixedFontProvider {
    pub bytes: Vec<u8>,
}

impl FontProvider for FixedFontProvider {
    fn find_builtin_font(&self, _canonical_name: &str) -> PdfResult<Option<Vec<u8>>> {
        Ok(Some(self.bytes.clone()))
    }

    fn find_substitute_font(&self, _style: SubstituteStyle) -> PdfResult<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn find_substitute_cjk_font(&self, _ros: CjkOrdering, _serif: bool) -> PdfResult<Vec<u8>> {
        anyhow::bail!("fixture carries no CJK substitute")
    }
}
