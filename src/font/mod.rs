pub mod cid;
pub mod descriptor;
pub mod dispatch;
pub mod encoding;
pub mod glyph;
pub mod metrics;
pub mod names;
pub mod simple;
pub mod type3;
