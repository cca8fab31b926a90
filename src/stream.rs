use crate::objects::Dictionary;

/// A stream object with its bytes already filter-decoded.
///
/// Applying `/Filter` (Flate, LZW, ASCII85, ...) is the byte-level object
/// parser's job (an external collaborator, see the crate root docs); by the
/// time a `Stream` reaches this crate its `data` is plain font-program or
/// CMap bytes, ready for `ttf_parser::Face::parse` or the embedded CMap
/// tokenizer.
#[derive(Debug, Clone)]
pub struct Stream<'a> {
    pub dict: Dictionary<'a>,
    pub data: std::borrow::Cow<'a, [u8]>,
}

impl<'a> Stream<'a> {
    pub fn new(dict: Dictionary<'a>, data: impl Into<std::borrow::Cow<'a, [u8]>>) -> Self {
        Self {
            dict,
            data: data.into(),
        }
    }
}
