#![allow(
    dead_code,
    // sometimes we want to model the pdf names better
    clippy::enum_variant_names,
    clippy::large_enum_variant,
    clippy::unit_arg,
    clippy::manual_range_contains,
    clippy::too_many_arguments
)]

#[macro_use]
extern crate pdf_macro;

pub mod agl;
pub mod cmap;
mod data_structures;
pub mod error;
pub mod face;
pub mod font;
pub mod font_provider;
pub mod objects;
pub mod resolve;
pub mod stream;

pub(crate) use crate::{
    objects::{Dictionary, FromObj, Object},
    resolve::Resolve,
};

pub use crate::{
    error::{FontError, PdfResult},
    font::{
        dispatch::{debug_font, load_font, FontCache},
        descriptor::FontDescriptor,
        glyph::font_cid_to_gid,
        metrics::{build_width_table, HmtxTable, VmtxTable},
    },
    objects::{Name, Reference},
};

/// A `FontDescriptor` is reference-counted and shared through [`FontCache`];
/// `keep_font`/`drop_font` exist for embedders that track lifetime via
/// explicit retain/release rather than Rust's own `Drop`, mirroring the
/// `pdf_keep_font`/`pdf_drop_font` pair this module is grounded on. Because
/// `FontDescriptor` is plain `Rc`-backed, both are no-ops beyond cloning and
/// dropping the handle -- they exist for API-shape parity with callers
/// migrating off a C-style retain count, not because this crate needs them.
pub fn keep_font(desc: &std::rc::Rc<FontDescriptor>) -> std::rc::Rc<FontDescriptor> {
    std::rc::Rc::clone(desc)
}

pub fn drop_font(desc: std::rc::Rc<FontDescriptor>) {
    drop(desc)
}

/// Assert that the dictionary has no keys left unconsumed.
///
/// Every `#[derive(FromObj)]` struct without an `other` field calls this
/// once it has pulled out all of its named fields, so a key the schema
/// doesn't know about fails loudly in development instead of silently
/// vanishing.
#[track_caller]
pub(crate) fn assert_empty(dict: Dictionary) {
    if !dict.is_empty() {
        todo!("dict not empty: {:#?}", dict);
    }
}
