use crate::{
    error::FontError,
    objects::{Dictionary, Object, Reference},
    stream::Stream,
    PdfResult,
};

/// The seam between this crate and the byte-level PDF object parser.
///
/// Loading a font never touches file bytes, an xref table, or a lexer
/// directly -- it only ever asks a `Resolve` to follow a reference or
/// coerce an already-parsed [`Object`] to the type it expects. A real
/// document context implements this against its own parser; tests and
/// examples implement it against an in-memory object graph
/// (`resolve::InMemoryResolver`).
pub trait Resolve<'a> {
    /// Look up the object an indirect reference points to. A reference to a
    /// non-existent object resolves to `Object::Null`, matching PDF's own
    /// "missing indirect object is null" rule.
    fn lex_object_from_reference(&mut self, reference: Reference) -> PdfResult<Object<'a>>;

    fn reference_exists(&mut self, reference: Reference) -> PdfResult<bool>;

    /// Follow a `Reference` chain (there is at most one level of
    /// indirection in a conforming file, but nothing stops us from
    /// following more) down to a direct object.
    fn resolve(&mut self, obj: Object<'a>) -> PdfResult<Object<'a>> {
        match obj {
            Object::Reference(r) => {
                let obj = self.lex_object_from_reference(r)?;
                self.resolve(obj)
            }
            obj => Ok(obj),
        }
    }

    fn assert_integer(&mut self, obj: Object<'a>) -> PdfResult<i32> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(i),
            obj => Err(FontError::UnexpectedType {
                expected: "integer",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }

    fn assert_unsigned_integer(&mut self, obj: Object<'a>) -> PdfResult<u32> {
        let i = self.assert_integer(obj)?;

        u32::try_from(i).map_err(|_| {
            FontError::UnexpectedType {
                expected: "unsigned integer",
                found: i.to_string(),
            }
            .into()
        })
    }

    fn assert_number(&mut self, obj: Object<'a>) -> PdfResult<f32> {
        match self.resolve(obj)? {
            Object::Integer(i) => Ok(i as f32),
            Object::Real(r) => Ok(r),
            obj => Err(FontError::UnexpectedType {
                expected: "number",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }

    fn assert_bool(&mut self, obj: Object<'a>) -> PdfResult<bool> {
        match self.resolve(obj)? {
            Object::True => Ok(true),
            Object::False => Ok(false),
            obj => Err(FontError::UnexpectedType {
                expected: "boolean",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }

    fn assert_string(&mut self, obj: Object<'a>) -> PdfResult<String> {
        match self.resolve(obj)? {
            Object::String(s) => Ok(s),
            obj => Err(FontError::UnexpectedType {
                expected: "string",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }

    fn assert_name(&mut self, obj: Object<'a>) -> PdfResult<String> {
        match self.resolve(obj)? {
            Object::Name(n) => Ok(n),
            obj => Err(FontError::UnexpectedType {
                expected: "name",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }

    fn assert_arr(&mut self, obj: Object<'a>) -> PdfResult<Vec<Object<'a>>> {
        match self.resolve(obj)? {
            Object::Array(arr) => Ok(arr),
            obj => Err(FontError::UnexpectedType {
                expected: "array",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }

    fn assert_dict(&mut self, obj: Object<'a>) -> PdfResult<Dictionary<'a>> {
        match self.resolve(obj)? {
            Object::Dictionary(dict) => Ok(dict),
            Object::Stream(stream) => Ok(stream.dict),
            obj => Err(FontError::UnexpectedType {
                expected: "dictionary",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }

    fn assert_stream(&mut self, obj: Object<'a>) -> PdfResult<Stream<'a>> {
        match self.resolve(obj)? {
            Object::Stream(stream) => Ok(stream),
            obj => Err(FontError::UnexpectedType {
                expected: "stream",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }

    fn assert_dict_or_null(&mut self, obj: Object<'a>) -> PdfResult<Option<Dictionary<'a>>> {
        match self.resolve(obj)? {
            Object::Null => Ok(None),
            Object::Dictionary(dict) => Ok(Some(dict)),
            obj => Err(FontError::UnexpectedType {
                expected: "dictionary or null",
                found: obj.type_name().to_owned(),
            }
            .into()),
        }
    }
}

/// A `Resolve` backed by a plain in-memory object graph, with no file
/// bytes, xref table, or filters involved. Used by tests and by embedders
/// who have already parsed a PDF with some other crate and just want to
/// hand this crate the font dictionaries.
#[derive(Debug, Default)]
pub struct InMemoryResolver<'a> {
    pub objects: std::collections::HashMap<Reference, Object<'a>>,
}

impl<'a> InMemoryResolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: Reference, obj: Object<'a>) -> &mut Self {
        self.objects.insert(reference, obj);
        self
    }
}

impl<'a> Resolve<'a> for InMemoryResolver<'a> {
    fn lex_object_from_reference(&mut self, reference: Reference) -> PdfResult<Object<'a>> {
        Ok(self.objects.get(&reference).cloned().unwrap_or(Object::Null))
    }

    fn reference_exists(&mut self, reference: Reference) -> PdfResult<bool> {
        Ok(self.objects.contains_key(&reference))
    }
}
