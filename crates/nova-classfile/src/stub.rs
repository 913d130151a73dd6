use crate::annotation::Annotation;
use crate::descriptor::{parse_method_descriptor, MethodDescriptor};
use crate::error::Result;
use crate::signature::{parse_method_signature, MethodSignature};

/// JVM access flags the compat checker looks at (JVMS 4.1, 4.6).
pub mod access {
    pub const ACC_PUBLIC: u16 = 0x0001;
    pub const ACC_PRIVATE: u16 = 0x0002;
    pub const ACC_STATIC: u16 = 0x0008;
    pub const ACC_FINAL: u16 = 0x0010;
    pub const ACC_BRIDGE: u16 = 0x0040;
    pub const ACC_VARARGS: u16 = 0x0080;
    pub const ACC_INTERFACE: u16 = 0x0200;
    pub const ACC_ABSTRACT: u16 = 0x0400;
    pub const ACC_SYNTHETIC: u16 = 0x1000;
}

/// Member-level view of a class file, as produced by a host's class reader.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassStub {
    /// Internal name, e.g. `compatible/Compatible`.
    pub internal_name: String,
    pub access_flags: u16,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub methods: Vec<MethodStub>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodStub {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    /// Generic `Signature` attribute, when the method mentions type variables.
    pub signature: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl ClassStub {
    pub fn is_interface(&self) -> bool {
        self.access_flags & access::ACC_INTERFACE != 0
    }
}

impl MethodStub {
    pub fn is_static(&self) -> bool {
        self.access_flags & access::ACC_STATIC != 0
    }

    pub fn is_varargs(&self) -> bool {
        self.access_flags & access::ACC_VARARGS != 0
    }

    /// Compiler-generated bridge/synthetic methods never act as shim counterparts.
    pub fn is_synthetic(&self) -> bool {
        self.access_flags & (access::ACC_BRIDGE | access::ACC_SYNTHETIC) != 0
    }

    /// `<init>` / `<clinit>`.
    pub fn is_initializer(&self) -> bool {
        self.name.starts_with('<')
    }

    pub fn parsed_descriptor(&self) -> Result<MethodDescriptor> {
        parse_method_descriptor(&self.descriptor)
    }

    pub fn parsed_signature(&self) -> Result<Option<MethodSignature>> {
        self.signature
            .as_deref()
            .map(parse_method_signature)
            .transpose()
    }
}
