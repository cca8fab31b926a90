//! Simple-font `/Encoding`: either the name of one of the four predefined
//! 8-bit encodings, or a dictionary naming a base encoding plus a
//! `/Differences` array of per-code overrides. Grounded on the `Encoding`
//! handling inside `pdf_load_simple_font`.

use std::collections::HashMap;

use crate::{
    error::FontError,
    objects::{Dictionary, Object},
    resolve::Resolve,
    PdfResult,
};

#[derive(Debug)]
pub enum FontEncoding {
    Base(BaseFontEncoding),
    Dictionary(FontEncodingDict),
}

impl FontEncoding {
    pub fn from_obj<'a>(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        Ok(match resolver.resolve(obj)? {
            Object::Name(name) => Self::Base(BaseFontEncoding::from_str(&name)?),
            Object::Dictionary(dict) => Self::Dictionary(FontEncodingDict::from_dict(dict, resolver)?),
            found => {
                return Err(FontError::UnexpectedType {
                    expected: "name or dictionary",
                    found: found.type_name().to_owned(),
                }
                .into());
            }
        })
    }
}

#[pdf_enum]
pub enum BaseFontEncoding {
    /// The encoding historically built into Type 1 fonts distributed with
    /// PostScript interpreters predating Windows and Mac OS encodings.
    StandardEncoding = "StandardEncoding",

    /// Mac OS standard encoding for Latin text in Western writing systems.
    MacRomanEncoding = "MacRomanEncoding",

    /// An encoding for use with expert fonts (fonts containing the expert
    /// character set). No standard-14 font uses this encoding.
    MacExpertEncoding = "MacExpertEncoding",

    /// Windows Code Page 1252, the standard Windows encoding for Latin text.
    WinAnsiEncoding = "WinAnsiEncoding",
}

#[derive(Debug)]
pub struct FontEncodingDict {
    /// Absent means "describe differences from an implicit base encoding":
    /// the font program's own built-in encoding if embedded, otherwise
    /// `StandardEncoding` for a nonsymbolic font or the font's built-in
    /// encoding for a symbolic one.
    pub base_encoding: Option<BaseFontEncoding>,

    pub differences: FontDifferences,
}

impl FontEncodingDict {
    const TYPE: &'static str = "Encoding";

    pub fn from_dict<'a>(mut dict: Dictionary<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        dict.expect_type(Self::TYPE, resolver, false)?;

        let base_encoding = dict
            .get_name("BaseEncoding", resolver)?
            .as_deref()
            .map(BaseFontEncoding::from_str)
            .transpose()?;

        let differences = match dict.get_arr("Differences", resolver)? {
            Some(arr) => FontDifferences::from_arr(arr, resolver)?,
            None => FontDifferences::default(),
        };

        Ok(Self {
            base_encoding,
            differences,
        })
    }
}

/// A `/Differences` array: `[code name name ... code name ...]`. Each
/// integer starts a new run of character codes (incrementing by one per
/// following name) until the next integer.
#[derive(Debug, Default)]
pub struct FontDifferences(HashMap<u32, String>);

impl FontDifferences {
    pub fn from_arr<'a>(arr: Vec<Object<'a>>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        let mut map = HashMap::new();
        let mut code_point: Option<u32> = None;

        for obj in arr {
            match resolver.resolve(obj)? {
                Object::Integer(i) => {
                    // §4.5 step 4 / §8 boundary test: an out-of-range slot is
                    // clamped to [0, 255], not rejected -- a producer that
                    // writes `-1` or `512` still gets a usable encoding.
                    code_point = Some(i.clamp(0, 255) as u32);
                }
                Object::Name(name) => {
                    let code = code_point.ok_or_else(|| FontError::MissingRequiredKey {
                        key: "Differences array must start with a code point",
                    })?;
                    map.insert(code, name);
                    code_point = Some((code + 1).min(255));
                }
                found => {
                    return Err(FontError::UnexpectedType {
                        expected: "name or integer",
                        found: found.type_name().to_owned(),
                    }
                    .into());
                }
            }
        }

        Ok(Self(map))
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.0.get(&code).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(&code, name)| (code, name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::InMemoryResolver;

    #[test]
    fn differences_assigns_consecutive_codes_per_run() {
        let mut resolver = InMemoryResolver::new();
        let arr = vec![
            Object::Integer(65),
            Object::Name("A".to_owned()),
            Object::Name("B".to_owned()),
            Object::Integer(100),
            Object::Name("d".to_owned()),
        ];

        let diffs = FontDifferences::from_arr(arr, &mut resolver).unwrap();
        assert_eq!(diffs.get(65), Some("A"));
        assert_eq!(diffs.get(66), Some("B"));
        assert_eq!(diffs.get(100), Some("d"));
        assert_eq!(diffs.get(67), None);
    }

    #[test]
    fn differences_clamps_codes_outside_byte_range() {
        let mut resolver = InMemoryResolver::new();
        let arr = vec![Object::Integer(300), Object::Name("weird".to_owned())];
        let diffs = FontDifferences::from_arr(arr, &mut resolver).unwrap();
        assert_eq!(diffs.get(300), None);
        assert_eq!(diffs.get(255), Some("weird"));
    }

    #[test]
    fn differences_clamps_negative_codes_to_zero() {
        let mut resolver = InMemoryResolver::new();
        let arr = vec![Object::Integer(-5), Object::Name("weird".to_owned())];
        let diffs = FontDifferences::from_arr(arr, &mut resolver).unwrap();
        assert_eq!(diffs.get(0), Some("weird"));
    }
}
