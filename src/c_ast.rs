//! Typed C AST context.
//!
//! This is the input side of the translator: an arena-style store of the
//! types, expressions, statements and declarations of one translation unit,
//! as produced by a semantic C front-end. Nodes reference each other through
//! id newtypes; the ids double as the canonical identity of a declaration.
//!
//! The whole context round-trips through serde so a front-end running out of
//! process can hand its AST to the driver as a JSON dump.

pub mod build;
pub mod nodes;
pub mod types;

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use target_lexicon::{Architecture, Triple};
use thin_vec::ThinVec;

pub use nodes::*;
pub use types::*;

/// Opaque reference to a C type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CTypeId(NonZeroU32);

/// Opaque reference to a C expression.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CExprId(NonZeroU32);

/// Opaque reference to a C statement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CStmtId(NonZeroU32);

/// Opaque reference to a C declaration.
///
/// Decl ids are canonical: redeclarations share one id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CDeclId(NonZeroU32);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            #[inline]
            pub fn new(n: u32) -> Option<Self> {
                NonZeroU32::new(n).map($name)
            }

            #[inline]
            pub fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }

            #[inline]
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.get())
            }
        }
    };
}

impl_id!(CTypeId);
impl_id!(CExprId);
impl_id!(CStmtId);
impl_id!(CDeclId);

/// A location in the original C source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLoc {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A raw preprocessor macro definition record.
///
/// `source` is the definition text starting right after `#define `, i.e. the
/// macro name immediately followed by the rest of the line. The macro
/// tokenizer decides whether the macro is function-like by checking that a
/// `(` is adjacent to the name with no whitespace in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroRecord {
    pub name: String,
    pub source: String,
    pub loc: Option<SourceLoc>,
}

/// One translation unit as delivered by the front-end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CAst {
    pub types: Vec<CType>,
    pub exprs: Vec<CExpr>,
    pub stmts: Vec<CStmt>,
    pub decls: Vec<CDecl>,
    /// Top-level declarations in front-end visit order.
    pub top_decls: Vec<CDeclId>,
    /// Macro definition records in definition order.
    pub macros: Vec<MacroRecord>,
    /// Target triple text, e.g. `x86_64-unknown-linux-gnu`.
    pub target: String,
}

impl CAst {
    pub fn type_kind(&self, id: CTypeId) -> &CTypeKind {
        &self.types[id.index()].kind
    }

    pub fn expr(&self, id: CExprId) -> &CExpr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: CStmtId) -> &CStmt {
        &self.stmts[id.index()]
    }

    pub fn decl(&self, id: CDeclId) -> &CDecl {
        &self.decls[id.index()]
    }

    pub fn decl_name(&self, id: CDeclId) -> Option<&str> {
        self.decl(id).kind.name()
    }

    /// The qualified type the front-end computed for an expression.
    ///
    /// Every expression class except `BadExpr` carries one.
    pub fn expr_type(&self, id: CExprId) -> Option<CQualTypeId> {
        self.expr(id).kind.qual_type()
    }

    /// Parsed form of `target`; host triple when the field is empty or bad.
    pub fn triple(&self) -> Triple {
        Triple::from_str(&self.target).unwrap_or_else(|_| Triple::host())
    }

    /// Whether plain `char` is signed on the target.
    ///
    /// ARM, AArch64, PowerPC and s390x default to unsigned char.
    pub fn char_is_signed(&self) -> bool {
        !matches!(
            self.triple().architecture,
            Architecture::Arm(_)
                | Architecture::Aarch64(_)
                | Architecture::Powerpc
                | Architecture::Powerpc64
                | Architecture::Powerpc64le
                | Architecture::S390x
        )
    }

    /// Strip sugar until a structural type is reached.
    ///
    /// Unwraps `Elaborated`, `Paren`, `Decayed`, `Attributed`,
    /// `MacroQualified` and `Typedef` chains.
    pub fn resolve_type(&self, id: CTypeId) -> CTypeId {
        let mut cur = id;
        loop {
            cur = match *self.type_kind(cur) {
                CTypeKind::Elaborated(inner)
                | CTypeKind::Paren(inner)
                | CTypeKind::Decayed(inner)
                | CTypeKind::Attributed(inner)
                | CTypeKind::MacroQualified(inner) => inner,
                CTypeKind::Typedef(decl) => match &self.decl(decl).kind {
                    CDeclKind::Typedef { typ, .. } => typ.ctype,
                    _ => return cur,
                },
                _ => return cur,
            };
        }
    }

    pub fn resolved_kind(&self, id: CTypeId) -> &CTypeKind {
        self.type_kind(self.resolve_type(id))
    }

    pub fn is_integer(&self, id: CTypeId) -> bool {
        self.resolved_kind(id).is_integer()
    }

    pub fn is_signed_integer(&self, id: CTypeId) -> bool {
        match self.resolved_kind(id) {
            CTypeKind::Char => self.char_is_signed(),
            k => k.is_signed_integer(),
        }
    }

    pub fn is_unsigned_integer(&self, id: CTypeId) -> bool {
        self.is_integer(id) && !self.is_signed_integer(id) && !self.is_bool(id)
    }

    pub fn is_bool(&self, id: CTypeId) -> bool {
        matches!(self.resolved_kind(id), CTypeKind::Bool)
    }

    pub fn is_float(&self, id: CTypeId) -> bool {
        self.resolved_kind(id).is_float()
    }

    pub fn is_pointer(&self, id: CTypeId) -> bool {
        matches!(self.resolved_kind(id), CTypeKind::Pointer(_))
    }

    pub fn is_enum(&self, id: CTypeId) -> bool {
        matches!(self.resolved_kind(id), CTypeKind::Enum(_))
    }

    pub fn pointee(&self, id: CTypeId) -> Option<CQualTypeId> {
        match *self.resolved_kind(id) {
            CTypeKind::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    /// If `id` is a pointer to a function prototype, the function type id.
    pub fn function_pointee(&self, id: CTypeId) -> Option<CTypeId> {
        let pointee = self.pointee(id)?;
        let resolved = self.resolve_type(pointee.ctype);
        match self.type_kind(resolved) {
            CTypeKind::Function { .. } => Some(resolved),
            _ => None,
        }
    }

    /// The enum decl behind a type, following sugar.
    pub fn enum_decl(&self, id: CTypeId) -> Option<CDeclId> {
        match *self.resolved_kind(id) {
            CTypeKind::Enum(decl) => Some(decl),
            _ => None,
        }
    }

    /// The record decl behind a type, following sugar.
    pub fn record_decl(&self, id: CTypeId) -> Option<CDeclId> {
        match *self.resolved_kind(id) {
            CTypeKind::Struct(decl) | CTypeKind::Union(decl) => Some(decl),
            _ => None,
        }
    }

    /// C integer conversion rank ladder:
    /// bool < char < wchar < short < int < long < long long < int128.
    pub fn int_rank(&self, id: CTypeId) -> Option<u8> {
        use CTypeKind::*;
        Some(match self.resolved_kind(id) {
            Bool => 0,
            Char | SChar | UChar => 1,
            WChar => 2,
            Short | UShort => 3,
            Int | UInt => 4,
            Long | ULong => 5,
            LongLong | ULongLong => 6,
            Int128 | UInt128 => 7,
            Enum(_) => 4,
            _ => return None,
        })
    }

    /// Collect the statement ids of a compound statement.
    pub fn compound_stmts(&self, id: CStmtId) -> ThinVec<CStmtId> {
        match &self.stmt(id).kind {
            CStmtKind::Compound(items) => items.clone(),
            _ => std::iter::once(id).collect(),
        }
    }
}
