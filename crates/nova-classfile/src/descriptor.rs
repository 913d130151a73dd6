use crate::cursor::Cursor;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name, e.g. `java/lang/String`.
    Object(String),
    Array(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType> {
    let mut cursor = Cursor::new(desc);
    let ty = field_type(&mut cursor, desc)?;
    if !cursor.is_at_end() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor> {
    let invalid = || Error::InvalidDescriptor(desc.to_string());
    let mut cursor = Cursor::new(desc);
    if !cursor.eat(b'(') {
        return Err(invalid());
    }

    let mut params = Vec::new();
    loop {
        match cursor.peek() {
            Some(b')') => {
                cursor.bump();
                break;
            }
            Some(_) => params.push(field_type(&mut cursor, desc)?),
            None => return Err(invalid()),
        }
    }

    let return_type = if cursor.eat(b'V') {
        ReturnType::Void
    } else {
        ReturnType::Type(field_type(&mut cursor, desc)?)
    };
    if !cursor.is_at_end() {
        return Err(invalid());
    }

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

fn field_type(cursor: &mut Cursor<'_>, desc: &str) -> Result<FieldType> {
    let invalid = || Error::InvalidDescriptor(desc.to_string());
    let tag = cursor.bump().ok_or_else(invalid)?;
    if let Some(base) = BaseType::from_tag(tag) {
        return Ok(FieldType::Base(base));
    }
    match tag {
        b'L' => {
            let name = cursor.take_until(b";");
            if name.is_empty() || !cursor.eat(b';') {
                return Err(invalid());
            }
            Ok(FieldType::Object(name.to_string()))
        }
        b'[' => Ok(FieldType::Array(Box::new(field_type(cursor, desc)?))),
        _ => Err(invalid()),
    }
}
