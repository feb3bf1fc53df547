//! C type representation.
//!
//! Canonical semantic types, id-linked. Sugar kinds (`Elaborated`, `Paren`,
//! `Decayed`, `Attributed`, `MacroQualified`, `Typedef`) are kept so the
//! translator can see through exactly the chains the front-end saw.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::c_ast::{CDeclId, CExprId, CTypeId};

bitflags! {
    /// C type qualifiers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
    pub struct Qualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

/// A qualified reference to a C type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CQualTypeId {
    pub ctype: CTypeId,
    #[serde(default)]
    pub quals: Qualifiers,
}

impl CQualTypeId {
    pub fn new(ctype: CTypeId) -> Self {
        Self {
            ctype,
            quals: Qualifiers::empty(),
        }
    }

    pub fn with_quals(ctype: CTypeId, quals: Qualifiers) -> Self {
        Self { ctype, quals }
    }

    pub fn is_const(&self) -> bool {
        self.quals.contains(Qualifiers::CONST)
    }

    pub fn is_volatile(&self) -> bool {
        self.quals.contains(Qualifiers::VOLATILE)
    }
}

/// A C type node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CType {
    pub kind: CTypeKind,
}

impl CType {
    pub fn new(kind: CTypeKind) -> Self {
        CType { kind }
    }
}

/// The kind of a C type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CTypeKind {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int128,
    UInt128,
    WChar,
    Half,
    Float,
    Double,
    LongDouble,
    Float128,

    Pointer(CQualTypeId),
    ConstantArray(CTypeId, u64),
    IncompleteArray(CTypeId),
    VariableArray(CTypeId, Option<CExprId>),

    Function {
        ret: CQualTypeId,
        params: ThinVec<CQualTypeId>,
        is_variadic: bool,
        is_noreturn: bool,
    },

    Typedef(CDeclId),
    Struct(CDeclId),
    Union(CDeclId),
    Enum(CDeclId),

    Elaborated(CTypeId),
    Paren(CTypeId),
    Decayed(CTypeId),
    Attributed(CTypeId),
    MacroQualified(CTypeId),

    Vector(CQualTypeId, u64),
    Atomic(CTypeId),
    BuiltinFn,
}

impl CTypeKind {
    pub fn is_integer(&self) -> bool {
        use CTypeKind::*;
        matches!(
            self,
            Bool | Char
                | SChar
                | UChar
                | Short
                | UShort
                | Int
                | UInt
                | Long
                | ULong
                | LongLong
                | ULongLong
                | Int128
                | UInt128
                | WChar
        )
    }

    /// Signedness without target knowledge; plain `char` answers false here
    /// and is special-cased by the context query.
    pub fn is_signed_integer(&self) -> bool {
        use CTypeKind::*;
        matches!(
            self,
            SChar | Short | Int | Long | LongLong | Int128 | WChar
        )
    }

    pub fn is_float(&self) -> bool {
        use CTypeKind::*;
        matches!(self, Half | Float | Double | LongDouble | Float128)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, CTypeKind::Function { .. })
    }

    pub fn is_array(&self) -> bool {
        use CTypeKind::*;
        matches!(
            self,
            ConstantArray(..) | IncompleteArray(..) | VariableArray(..)
        )
    }
}
