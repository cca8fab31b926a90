use std::collections::HashMap;

use crate::{error::FontError, resolve::Resolve, stream::Stream, PdfResult};

/// A reference to a non-existing object is considered a `null`.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Reference {
    pub object_number: usize,
    pub generation: usize,
}

/// A PDF name object (`/Foo`), kept distinct from [`String`] (a PDF text or
/// byte string) so that `dict.expect::<Name>(...)` and
/// `dict.expect::<String>(...)` can't be swapped by accident -- `BaseFont`
/// is a name, `Registry`/`Ordering` are strings, and the two are not
/// interchangeable even though both ultimately hold UTF-8 text here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(pub String);

impl std::ops::Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<'a> PartialEq<&'a str> for Name {
    fn eq(&self, other: &&'a str) -> bool {
        self.0 == *other
    }
}

use std::fmt;

#[derive(Debug, Clone)]
pub enum Object<'a> {
    Null,
    True,
    False,
    Integer(i32),
    Real(f32),
    String(String),
    Name(String),
    Array(Vec<Self>),
    Stream(Stream<'a>),
    Dictionary(Dictionary<'a>),
    Reference(Reference),
}

impl<'a> Object<'a> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::True | Object::False => "boolean",
            Object::Integer(..) => "integer",
            Object::Real(..) => "real",
            Object::String(..) => "string",
            Object::Name(..) => "name",
            Object::Array(..) => "array",
            Object::Stream(..) => "stream",
            Object::Dictionary(..) => "dictionary",
            Object::Reference(..) => "reference",
        }
    }
}

/// A dictionary with its keys still unconsumed.
///
/// Every `get`/`expect` call removes the key: by the time a `FromObj` impl
/// finishes reading every field it expects, the dictionary should be empty,
/// and `crate::assert_empty` is run at the end of the generated
/// `#[derive(FromObj)]` body specifically to catch keys nobody read (a typo
/// in a `#[field(...)]` key, or a field the loader forgot to model).
#[derive(Debug, Clone, Default)]
pub struct Dictionary<'a> {
    dict: HashMap<String, Object<'a>>,
}

impl<'a> Dictionary<'a> {
    pub fn new(dict: HashMap<String, Object<'a>>) -> Self {
        Self { dict }
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    pub fn entries(self) -> impl Iterator<Item = (String, Object<'a>)> {
        self.dict.into_iter()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.dict.contains_key(key)
    }

    pub fn get_object(&mut self, key: &str) -> Option<Object<'a>> {
        self.dict.remove(key)
    }

    pub fn expect_object(&mut self, key: &'static str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Object<'a>> {
        let obj = self
            .dict
            .remove(key)
            .ok_or(FontError::MissingRequiredKey { key })?;
        resolver.resolve(obj)
    }

    pub fn get<T: FromObj<'a>>(&mut self, key: &'static str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Option<T>> {
        match self.dict.remove(key) {
            None | Some(Object::Null) => Ok(None),
            Some(obj) => Ok(Some(T::from_obj(obj, resolver)?)),
        }
    }

    pub fn expect<T: FromObj<'a>>(&mut self, key: &'static str, resolver: &mut dyn Resolve<'a>) -> PdfResult<T> {
        let obj = self
            .dict
            .remove(key)
            .ok_or(FontError::MissingRequiredKey { key })?;
        T::from_obj(obj, resolver)
    }

    pub fn get_name(&mut self, key: &str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Option<String>> {
        self.dict.remove(key).map(|obj| resolver.assert_name(obj)).transpose()
    }

    pub fn expect_name(&mut self, key: &'static str, resolver: &mut dyn Resolve<'a>) -> PdfResult<String> {
        self.dict
            .remove(key)
            .map(|obj| resolver.assert_name(obj))
            .ok_or(FontError::MissingRequiredKey { key })?
    }

    pub fn get_dict(&mut self, key: &str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Option<Dictionary<'a>>> {
        self.dict.remove(key).map(|obj| resolver.assert_dict(obj)).transpose()
    }

    pub fn expect_dict(&mut self, key: &'static str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Dictionary<'a>> {
        self.dict
            .remove(key)
            .map(|obj| resolver.assert_dict(obj))
            .ok_or(FontError::MissingRequiredKey { key })?
    }

    pub fn get_arr(&mut self, key: &str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Option<Vec<Object<'a>>>> {
        self.dict.remove(key).map(|obj| resolver.assert_arr(obj)).transpose()
    }

    pub fn expect_arr(&mut self, key: &'static str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Vec<Object<'a>>> {
        self.dict
            .remove(key)
            .map(|obj| resolver.assert_arr(obj))
            .ok_or(FontError::MissingRequiredKey { key })?
    }

    pub fn get_stream(&mut self, key: &str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Option<Stream<'a>>> {
        self.dict.remove(key).map(|obj| resolver.assert_stream(obj)).transpose()
    }

    pub fn expect_stream(&mut self, key: &'static str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Stream<'a>> {
        self.dict
            .remove(key)
            .map(|obj| resolver.assert_stream(obj))
            .ok_or(FontError::MissingRequiredKey { key })?
    }

    pub fn get_integer(&mut self, key: &str, resolver: &mut dyn Resolve<'a>) -> PdfResult<Option<i32>> {
        self.dict.remove(key).map(|obj| resolver.assert_integer(obj)).transpose()
    }

    pub fn expect_integer(&mut self, key: &'static str, resolver: &mut dyn Resolve<'a>) -> PdfResult<i32> {
        self.dict
            .remove(key)
            .map(|obj| resolver.assert_integer(obj))
            .ok_or(FontError::MissingRequiredKey { key })?
    }

    /// Checks (and removes, when `remove` is true) a required `/Type` key
    /// against `ty`, the way `#[obj_type("...")]` does for derived structs
    /// and the way hand-written `from_dict` impls do for dictionaries with
    /// no natural Rust-struct-per-subtype split (e.g. `Encoding`).
    pub fn expect_type(&mut self, ty: &'static str, resolver: &mut dyn Resolve<'a>, remove: bool) -> PdfResult<()> {
        let found = if remove {
            self.get_name("Type", resolver)?
        } else {
            match self.dict.get("Type").cloned() {
                Some(obj) => Some(resolver.assert_name(obj)?),
                None => None,
            }
        };

        match found {
            Some(found) if found == ty => Ok(()),
            Some(found) => Err(FontError::UnexpectedType {
                expected: ty,
                found,
            }
            .into()),
            // `/Type` is optional on most PDF dictionaries; its absence is not an error.
            None => Ok(()),
        }
    }
}

/// Implemented for every Rust type that can be produced from a (possibly
/// reference-wrapped) PDF object -- primitives resolve themselves against
/// `resolver`, and `#[derive(FromObj)]` generates one of these per
/// dictionary-backed struct.
pub trait FromObj<'a>: Sized {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self>;
}

impl<'a> FromObj<'a> for i32 {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.assert_integer(obj)
    }
}

impl<'a> FromObj<'a> for u32 {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.assert_unsigned_integer(obj)
    }
}

impl<'a> FromObj<'a> for f32 {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.assert_number(obj)
    }
}

impl<'a> FromObj<'a> for bool {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.assert_bool(obj)
    }
}

impl<'a> FromObj<'a> for String {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.assert_string(obj)
    }
}

impl<'a> FromObj<'a> for Name {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.assert_name(obj).map(Name)
    }
}

impl<'a> FromObj<'a> for Dictionary<'a> {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.assert_dict(obj)
    }
}

/// For fields typed as a raw `Object` (no further narrowing) -- just follows
/// the reference chain, the same as `Dictionary::expect_object`/`get_object`.
impl<'a> FromObj<'a> for Object<'a> {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.resolve(obj)
    }
}

impl<'a> FromObj<'a> for Stream<'a> {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver.assert_stream(obj)
    }
}

/// `DW2`-shaped `[number number]` pairs: a fixed-length array read the same
/// way `Vec<T>` is, just rejecting anything but exactly two elements instead
/// of collecting an arbitrary count.
impl<'a> FromObj<'a> for [f32; 2] {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        let arr = resolver.assert_arr(obj)?;
        if arr.len() != 2 {
            return Err(FontError::ArrayOfInvalidLength {
                expected: 2,
                found: arr.len(),
            }
            .into());
        }

        let mut iter = arr.into_iter();
        let a = resolver.assert_number(iter.next().unwrap())?;
        let b = resolver.assert_number(iter.next().unwrap())?;
        Ok([a, b])
    }
}

impl<'a, T: FromObj<'a>> FromObj<'a> for Vec<T> {
    fn from_obj(obj: Object<'a>, resolver: &mut dyn Resolve<'a>) -> PdfResult<Self> {
        resolver
            .assert_arr(obj)?
            .into_iter()
            .map(|obj| T::from_obj(obj, resolver))
            .collect()
    }
}

pub fn assert_reference(obj: Object) -> PdfResult<Reference> {
    match obj {
        Object::Reference(r) => Ok(r),
        obj => Err(FontError::UnexpectedType {
            expected: "reference",
            found: obj.type_name().to_owned(),
        }
        .into()),
    }
}
