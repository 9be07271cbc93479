//! Parser for JVM generic signatures (JVMS 4.7.9.1).

use crate::error::{Result, SignatureError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
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
    fn from_descriptor(b: u8) -> Option<Self> {
        Some(match b {
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

    /// The Java keyword, which is also the binary name of the primitive class.
    pub fn keyword(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Reference(ReferenceTypeSignature),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceTypeSignature {
    Class(ClassTypeSignature),
    TypeVar(String),
    Array(Box<TypeSignature>),
}

/// A class type. Inner-class suffixes are folded into the binary name
/// (`Outer<TT;>.Inner<TU;>` becomes `Outer$Inner` with arguments `<U>`); arguments of outer
/// segments are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Dotted binary name, e.g. `java.util.Map$Entry`.
    pub binary_name: String,
    pub args: Vec<TypeArgument>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    Exact(ReferenceTypeSignature),
    /// `+`
    Extends(ReferenceTypeSignature),
    /// `-`
    Super(ReferenceTypeSignature),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub class_bound: Option<ReferenceTypeSignature>,
    pub interface_bounds: Vec<ReferenceTypeSignature>,
}

impl TypeParameter {
    pub fn bounds(&self) -> impl Iterator<Item = &ReferenceTypeSignature> {
        self.class_bound.iter().chain(self.interface_bounds.iter())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_params: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_params: Vec<TypeParameter>,
    pub params: Vec<TypeSignature>,
    /// `None` for `V`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<ReferenceTypeSignature>,
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut p = Parser::new(sig);
    let type_params = p.type_params()?;
    let super_class = p.class_type()?;
    let mut interfaces = Vec::new();
    while !p.is_eof() {
        interfaces.push(p.class_type()?);
    }
    Ok(ClassSignature {
        type_params,
        super_class,
        interfaces,
    })
}

pub fn parse_field_signature(sig: &str) -> Result<ReferenceTypeSignature> {
    let mut p = Parser::new(sig);
    let ty = p.reference_type()?;
    p.expect_eof()?;
    Ok(ty)
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = Parser::new(sig);
    let type_params = p.type_params()?;
    p.expect(b'(')?;
    let mut params = Vec::new();
    while !p.eat(b')') {
        params.push(p.java_type()?);
    }
    let return_type = if p.eat(b'V') {
        None
    } else {
        Some(p.java_type()?)
    };
    let mut throws = Vec::new();
    while p.eat(b'^') {
        throws.push(p.reference_type()?);
    }
    p.expect_eof()?;
    Ok(MethodSignature {
        type_params,
        params,
        return_type,
        throws,
    })
}

/// JVMS 4.3.2 limits array types to 255 dimensions.
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Bound on array dimensions plus type argument lists open along one path, so nested input
/// can't exhaust the stack of the parser or of the code walking its output.
const MAX_NESTING: usize = 512;

struct Parser<'a> {
    sig: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(sig: &'a str) -> Self {
        Self {
            sig,
            bytes: sig.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8) -> Result<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error("unexpected character"))
        }
    }

    fn expect_eof(&self) -> Result<()> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    fn enter(&mut self, levels: usize) -> Result<()> {
        self.depth += levels;
        if self.depth > MAX_NESTING {
            return Err(self.error("type nesting too deep"));
        }
        Ok(())
    }

    fn error(&self, reason: &'static str) -> SignatureError {
        SignatureError::Invalid {
            signature: self.sig.to_string(),
            offset: self.pos,
            reason,
        }
    }

    /// An identifier runs until one of the signature delimiters.
    fn identifier(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'.' | b';' | b'[' | b'/' | b'<' | b'>' | b':') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        Ok(&self.sig[start..self.pos])
    }

    fn type_params(&mut self) -> Result<Vec<TypeParameter>> {
        let mut out = Vec::new();
        if !self.eat(b'<') {
            return Ok(out);
        }
        while !self.eat(b'>') {
            let name = self.identifier()?.to_string();
            self.expect(b':')?;
            // The class bound may be empty (`T::Ljava/lang/Comparable;`).
            let class_bound = match self.peek() {
                Some(b':') | Some(b'>') => None,
                _ => Some(self.reference_type()?),
            };
            let mut interface_bounds = Vec::new();
            while self.eat(b':') {
                interface_bounds.push(self.reference_type()?);
            }
            out.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
        }
        if out.is_empty() {
            return Err(self.error("empty type parameter list"));
        }
        Ok(out)
    }

    fn java_type(&mut self) -> Result<TypeSignature> {
        if let Some(base) = self.peek().and_then(BaseType::from_descriptor) {
            self.pos += 1;
            return Ok(TypeSignature::Base(base));
        }
        Ok(TypeSignature::Reference(self.reference_type()?))
    }

    fn reference_type(&mut self) -> Result<ReferenceTypeSignature> {
        match self.peek() {
            Some(b'L') => Ok(ReferenceTypeSignature::Class(self.class_type()?)),
            Some(b'T') => {
                self.pos += 1;
                let name = self.identifier()?.to_string();
                self.expect(b';')?;
                Ok(ReferenceTypeSignature::TypeVar(name))
            }
            Some(b'[') => {
                let mut dims = 0;
                while self.eat(b'[') {
                    dims += 1;
                    if dims > MAX_ARRAY_DIMENSIONS {
                        return Err(self.error("too many array dimensions"));
                    }
                }
                self.enter(dims)?;
                let mut ty = ReferenceTypeSignature::Array(Box::new(self.java_type()?));
                for _ in 1..dims {
                    ty = ReferenceTypeSignature::Array(Box::new(TypeSignature::Reference(ty)));
                }
                self.depth -= dims;
                Ok(ty)
            }
            _ => Err(self.error("expected reference type")),
        }
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.expect(b'L')?;
        let mut binary_name = String::new();
        loop {
            binary_name.push_str(self.identifier()?);
            if !self.eat(b'/') {
                break;
            }
            binary_name.push('.');
        }

        let mut args = self.type_args()?;
        while self.eat(b'.') {
            binary_name.push('$');
            binary_name.push_str(self.identifier()?);
            args = self.type_args()?;
        }
        self.expect(b';')?;
        Ok(ClassTypeSignature { binary_name, args })
    }

    fn type_args(&mut self) -> Result<Vec<TypeArgument>> {
        let mut out = Vec::new();
        if !self.eat(b'<') {
            return Ok(out);
        }
        self.enter(1)?;
        while !self.eat(b'>') {
            let arg = match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    TypeArgument::Any
                }
                Some(b'+') => {
                    self.pos += 1;
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some(b'-') => {
                    self.pos += 1;
                    TypeArgument::Super(self.reference_type()?)
                }
                _ => TypeArgument::Exact(self.reference_type()?),
            };
            out.push(arg);
        }
        if out.is_empty() {
            return Err(self.error("empty type argument list"));
        }
        self.depth -= 1;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn class(name: &str, args: Vec<TypeArgument>) -> ClassTypeSignature {
        ClassTypeSignature {
            binary_name: name.to_string(),
            args,
        }
    }

    #[test]
    fn class_signature_with_bounds() {
        let sig = parse_class_signature(
            "<K::Ljava/lang/Comparable<TK;>;V:Ljava/lang/Number;>Ljava/lang/Object;Ljava/util/Map<TK;TV;>;",
        )
        .unwrap();

        assert_eq!(sig.type_params.len(), 2);
        assert_eq!(sig.type_params[0].name, "K");
        assert_eq!(sig.type_params[0].class_bound, None);
        assert_eq!(
            sig.type_params[0].interface_bounds,
            vec![ReferenceTypeSignature::Class(class(
                "java.lang.Comparable",
                vec![TypeArgument::Exact(ReferenceTypeSignature::TypeVar("K".into()))]
            ))]
        );
        assert_eq!(
            sig.type_params[1].bounds().collect::<Vec<_>>(),
            vec![&ReferenceTypeSignature::Class(class("java.lang.Number", vec![]))]
        );
        assert_eq!(sig.super_class, class("java.lang.Object", vec![]));
        assert_eq!(sig.interfaces.len(), 1);
        assert_eq!(sig.interfaces[0].binary_name, "java.util.Map");
    }

    #[test]
    fn wildcards_arrays_and_inner_classes() {
        let sig = parse_field_signature(
            "Lcom/example/Outer<TT;>.Inner<*+[Ljava/lang/String;-TU;>;",
        )
        .unwrap();
        assert_eq!(
            sig,
            ReferenceTypeSignature::Class(class(
                "com.example.Outer$Inner",
                vec![
                    TypeArgument::Any,
                    TypeArgument::Extends(ReferenceTypeSignature::Array(Box::new(
                        TypeSignature::Reference(ReferenceTypeSignature::Class(class(
                            "java.lang.String",
                            vec![]
                        )))
                    ))),
                    TypeArgument::Super(ReferenceTypeSignature::TypeVar("U".into())),
                ]
            ))
        );
    }

    #[test]
    fn method_signature() {
        let sig =
            parse_method_signature("<M:Ljava/lang/Object;>(TT;[ILjava/util/List<TM;>;)V^TX;")
                .unwrap();
        assert_eq!(sig.type_params[0].name, "M");
        assert_eq!(
            sig.params,
            vec![
                TypeSignature::Reference(ReferenceTypeSignature::TypeVar("T".into())),
                TypeSignature::Reference(ReferenceTypeSignature::Array(Box::new(
                    TypeSignature::Base(BaseType::Int)
                ))),
                TypeSignature::Reference(ReferenceTypeSignature::Class(class(
                    "java.util.List",
                    vec![TypeArgument::Exact(ReferenceTypeSignature::TypeVar("M".into()))]
                ))),
            ]
        );
        assert_eq!(sig.return_type, None);
        assert_eq!(sig.throws, vec![ReferenceTypeSignature::TypeVar("X".into())]);
    }

    #[test]
    fn malformed_signatures_report_offset() {
        let err = parse_field_signature("Ljava/util/List<>;").unwrap_err();
        assert_eq!(
            err,
            SignatureError::Invalid {
                signature: "Ljava/util/List<>;".to_string(),
                offset: 17,
                reason: "empty type argument list",
            }
        );

        assert!(parse_field_signature("I").is_err());
        assert!(parse_field_signature("Ljava/lang/String;X").is_err());
        assert!(parse_method_signature("(TT;").is_err());
        assert!(parse_class_signature("<>Ljava/lang/Object;").is_err());
    }

    #[test]
    fn array_dimensions_are_capped() {
        let sig = format!("{}I", "[".repeat(255));
        let mut ty = parse_field_signature(&sig).unwrap();
        let mut dims = 0;
        while let ReferenceTypeSignature::Array(elem) = ty {
            dims += 1;
            match *elem {
                TypeSignature::Reference(inner) => ty = inner,
                TypeSignature::Base(base) => {
                    assert_eq!(base, BaseType::Int);
                    break;
                }
            }
        }
        assert_eq!(dims, 255);

        let sig = format!("{}I", "[".repeat(60_000));
        assert_eq!(
            parse_field_signature(&sig).unwrap_err(),
            SignatureError::Invalid {
                signature: sig.clone(),
                offset: 256,
                reason: "too many array dimensions",
            }
        );
    }

    #[test]
    fn deeply_nested_type_arguments_are_rejected() {
        let nested = |levels: usize| {
            format!(
                "{}Ljava/lang/String;{}",
                "Ljava/util/List<".repeat(levels),
                ">;".repeat(levels)
            )
        };

        assert!(parse_field_signature(&nested(100)).is_ok());

        let err = parse_field_signature(&nested(20_000)).unwrap_err();
        assert!(
            matches!(err, SignatureError::Invalid { reason: "type nesting too deep", .. }),
            "{err:?}"
        );

        // Array dimensions count towards the same limit.
        let arrays = format!("{}I", "[".repeat(255));
        let mixed = format!(
            "{}{arrays}{}",
            "Ljava/util/List<".repeat(300),
            ">;".repeat(300)
        );
        let err = parse_field_signature(&mixed).unwrap_err();
        assert!(
            matches!(err, SignatureError::Invalid { reason: "type nesting too deep", .. }),
            "{err:?}"
        );
    }
}
