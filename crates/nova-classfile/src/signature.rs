//! Generic method signatures (JVMS 4.7.9.1).
//!
//! Only the method form is parsed: class and field signatures carry nothing the compat checker
//! consumes. Throws clauses are parsed for validation and then dropped.

use crate::cursor::Cursor;
use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Internal name with nested classes joined by `$`, e.g. `java/util/Map$Entry`.
    pub internal_name: String,
    /// Type arguments of the innermost class segment.
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    Any,
    Exact(TypeSignature),
    Extends(TypeSignature),
    Super(TypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<TypeSignature>,
    pub interface_bounds: Vec<TypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub return_type: Option<TypeSignature>,
}

const IDENT_STOPS: &[u8] = b".;[/<>:";

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = Parser {
        cursor: Cursor::new(sig),
        input: sig,
    };

    let type_parameters = if p.cursor.peek() == Some(b'<') {
        p.type_parameters()?
    } else {
        Vec::new()
    };

    p.expect(b'(')?;
    let mut parameters = Vec::new();
    while !p.cursor.eat(b')') {
        parameters.push(p.java_type()?);
    }

    let return_type = if p.cursor.eat(b'V') {
        None
    } else {
        Some(p.java_type()?)
    };

    while p.cursor.eat(b'^') {
        p.reference_type()?;
    }
    if !p.cursor.is_at_end() {
        return Err(p.invalid());
    }

    Ok(MethodSignature {
        type_parameters,
        parameters,
        return_type,
    })
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    input: &'a str,
}

impl Parser<'_> {
    fn invalid(&self) -> Error {
        Error::InvalidSignature(self.input.to_string())
    }

    fn expect(&mut self, b: u8) -> Result<()> {
        if self.cursor.eat(b) {
            Ok(())
        } else if self.cursor.is_at_end() {
            Err(Error::UnexpectedEof)
        } else {
            Err(self.invalid())
        }
    }

    fn identifier(&mut self) -> Result<String> {
        let ident = self.cursor.take_until(IDENT_STOPS);
        if ident.is_empty() {
            if self.cursor.is_at_end() {
                return Err(Error::UnexpectedEof);
            }
            return Err(self.invalid());
        }
        Ok(ident.to_string())
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        self.expect(b'<')?;
        let mut out = Vec::new();
        while !self.cursor.eat(b'>') {
            let name = self.identifier()?;
            self.expect(b':')?;
            // The class bound may be empty (`T::Ljava/lang/Comparable;`).
            let class_bound = match self.cursor.peek() {
                Some(b':') | None => None,
                Some(_) => Some(self.reference_type()?),
            };
            let mut interface_bounds = Vec::new();
            while self.cursor.eat(b':') {
                interface_bounds.push(self.reference_type()?);
            }
            out.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
        }
        if out.is_empty() {
            return Err(self.invalid());
        }
        Ok(out)
    }

    fn java_type(&mut self) -> Result<TypeSignature> {
        match self.cursor.peek() {
            Some(tag) => match BaseType::from_tag(tag) {
                Some(base) => {
                    self.cursor.bump();
                    Ok(TypeSignature::Base(base))
                }
                None => self.reference_type(),
            },
            None => Err(Error::UnexpectedEof),
        }
    }

    fn reference_type(&mut self) -> Result<TypeSignature> {
        match self.cursor.bump() {
            Some(b'L') => self.class_type().map(TypeSignature::Class),
            Some(b'T') => {
                let name = self.identifier()?;
                self.expect(b';')?;
                Ok(TypeSignature::TypeVariable(name))
            }
            Some(b'[') => Ok(TypeSignature::Array(Box::new(self.java_type()?))),
            Some(_) => Err(self.invalid()),
            None => Err(Error::UnexpectedEof),
        }
    }

    /// After the leading `L`: `pkg/Outer<..>.Inner<..>;`
    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        let mut internal_name = String::new();
        loop {
            internal_name.push_str(&self.identifier()?);
            if self.cursor.eat(b'/') {
                internal_name.push('/');
                continue;
            }
            break;
        }

        let mut type_arguments = self.type_arguments()?;
        while self.cursor.eat(b'.') {
            internal_name.push('$');
            internal_name.push_str(&self.identifier()?);
            type_arguments = self.type_arguments()?;
        }
        self.expect(b';')?;

        Ok(ClassTypeSignature {
            internal_name,
            type_arguments,
        })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        if !self.cursor.eat(b'<') {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        while !self.cursor.eat(b'>') {
            let arg = match self.cursor.peek() {
                Some(b'*') => {
                    self.cursor.bump();
                    TypeArgument::Any
                }
                Some(b'+') => {
                    self.cursor.bump();
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some(b'-') => {
                    self.cursor.bump();
                    TypeArgument::Super(self.reference_type()?)
                }
                Some(_) => TypeArgument::Exact(self.reference_type()?),
                None => return Err(Error::UnexpectedEof),
            };
            out.push(arg);
        }
        if out.is_empty() {
            return Err(self.invalid());
        }
        Ok(out)
    }
}
