//! C declaration, statement and expression nodes.

use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::c_ast::{CDeclId, CExprId, CQualTypeId, CStmtId, CTypeId, SourceLoc};

/// A declaration node with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CDecl {
    pub kind: CDeclKind,
    pub loc: Option<SourceLoc>,
}

/// A statement node with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CStmt {
    pub kind: CStmtKind,
    pub loc: Option<SourceLoc>,
}

/// An expression node with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CExpr {
    pub kind: CExprKind,
    pub loc: Option<SourceLoc>,
}

/// C storage class specifiers relevant to translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StorageClass {
    #[default]
    None,
    Static,
    Extern,
    Register,
}

/// The kind of a C declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CDeclKind {
    Function {
        name: String,
        typ: CTypeId,
        parameters: ThinVec<CDeclId>,
        body: Option<CStmtId>,
        storage: StorageClass,
        is_inline: bool,
        is_defn: bool,
    },
    Variable {
        name: String,
        typ: CQualTypeId,
        initializer: Option<CExprId>,
        storage: StorageClass,
        is_defn: bool,
    },
    Typedef {
        name: String,
        typ: CQualTypeId,
    },
    Record {
        name: Option<String>,
        /// `None` for a forward declaration without a definition.
        fields: Option<ThinVec<CDeclId>>,
        is_union: bool,
    },
    Field {
        name: Option<String>,
        typ: CQualTypeId,
        bitfield_width: Option<u32>,
        alignment: Option<u64>,
    },
    Enum {
        name: Option<String>,
        enumerators: ThinVec<CDeclId>,
        integral_type: Option<CQualTypeId>,
    },
    EnumConstant {
        name: String,
        value: i64,
        /// Whether the source spelled out `= value`.
        is_explicit: bool,
    },
}

impl CDeclKind {
    pub fn name(&self) -> Option<&str> {
        use CDeclKind::*;
        match self {
            Function { name, .. }
            | Variable { name, .. }
            | Typedef { name, .. }
            | EnumConstant { name, .. } => Some(name),
            Record { name, .. } | Enum { name, .. } => name.as_deref(),
            Field { name, .. } => name.as_deref(),
        }
    }
}

/// The kind of a C statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CStmtKind {
    Compound(ThinVec<CStmtId>),
    Expr(CExprId),
    Empty,
    If {
        cond: CExprId,
        then_stmt: CStmtId,
        else_stmt: Option<CStmtId>,
    },
    While {
        cond: CExprId,
        body: CStmtId,
    },
    DoWhile {
        body: CStmtId,
        cond: CExprId,
    },
    For {
        init: Option<CStmtId>,
        cond: Option<CExprId>,
        inc: Option<CExprId>,
        body: CStmtId,
    },
    Switch {
        cond: CExprId,
        body: CStmtId,
    },
    Case(CExprId, CStmtId),
    Default(CStmtId),
    Break,
    Continue,
    Return(Option<CExprId>),
    Decls(ThinVec<CDeclId>),
    Label(String, CStmtId),
    Goto(String),
}

/// The base an integer literal was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntBase {
    Dec,
    Hex,
    Oct,
}

/// A C literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CLiteral {
    Integer(u64, IntBase),
    Character(u32),
    /// Value plus the original spelling, kept so rendering stays faithful.
    Floating(f64, String),
    /// Literal bytes (or code units, little pieces of u16/u32 packed per
    /// unit) and the unit byte width: 1, 2 or 4.
    String(Vec<u8>, u8),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    AddressOf,
    Deref,
    Plus,
    Negate,
    Complement,
    Not,
    PreIncrement,
    PostIncrement,
    PreDecrement,
    PostDecrement,
}

/// `sizeof` / `_Alignof`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnTypeOp {
    SizeOf,
    AlignOf,
}

/// Binary operators, compound assignments included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Multiply,
    Divide,
    Modulus,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    EqualEqual,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,

    AssignAdd,
    AssignSubtract,
    AssignMultiply,
    AssignDivide,
    AssignModulus,
    AssignBitXor,
    AssignShiftLeft,
    AssignShiftRight,
    AssignBitOr,
    AssignBitAnd,

    Assign,
    Comma,
}

impl BinOp {
    /// `AssignAdd -> Add` and friends; `None` for plain operators.
    pub fn underlying_assignment(&self) -> Option<BinOp> {
        use BinOp::*;
        Some(match *self {
            AssignAdd => Add,
            AssignSubtract => Subtract,
            AssignMultiply => Multiply,
            AssignDivide => Divide,
            AssignModulus => Modulus,
            AssignBitXor => BitXor,
            AssignShiftLeft => ShiftLeft,
            AssignShiftRight => ShiftRight,
            AssignBitOr => BitOr,
            AssignBitAnd => BitAnd,
            _ => return None,
        })
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, BinOp::Assign) || self.underlying_assignment().is_some()
    }

    pub fn is_comparison(&self) -> bool {
        use BinOp::*;
        matches!(
            self,
            Less | Greater | LessEqual | GreaterEqual | EqualEqual | NotEqual
        )
    }
}

/// Cast kinds as classified by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastKind {
    BitCast,
    LValueToRValue,
    NoOp,
    ConstCast,
    ToUnion,
    ArrayToPointerDecay,
    FunctionToPointerDecay,
    NullToPointer,
    IntegralToPointer,
    PointerToIntegral,
    ToVoid,
    IntegralCast,
    IntegralToBoolean,
    IntegralToFloating,
    FloatingToIntegral,
    FloatingToBoolean,
    BooleanToSignedIntegral,
    PointerToBoolean,
    FloatingCast,
}

/// `.` vs `->` member access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Arrow,
    Dot,
}

/// The kind of a C expression.
///
/// Every kind except `BadExpr` carries the qualified type the front-end
/// computed for it; translation of many constructs depends on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CExprKind {
    Literal(CQualTypeId, CLiteral),
    Unary(CQualTypeId, UnOp, CExprId),
    UnaryType(CQualTypeId, UnTypeOp, Option<CExprId>, CQualTypeId),
    Binary(CQualTypeId, BinOp, CExprId, CExprId),
    ImplicitCast(CQualTypeId, CExprId, CastKind),
    ExplicitCast(CQualTypeId, CExprId, CastKind),
    DeclRef(CQualTypeId, CDeclId),
    Call(CQualTypeId, CExprId, ThinVec<CExprId>),
    Member(CQualTypeId, CExprId, CDeclId, MemberKind),
    ArraySubscript(CQualTypeId, CExprId, CExprId),
    Conditional(CQualTypeId, CExprId, CExprId, CExprId),
    /// GNU `a ?: b`.
    BinaryConditional(CQualTypeId, CExprId, CExprId),
    /// Initializers plus the union field the front-end selected, if any.
    InitList(CQualTypeId, ThinVec<CExprId>, Option<CDeclId>),
    ImplicitValueInit(CQualTypeId),
    Paren(CQualTypeId, CExprId),
    CompoundLiteral(CQualTypeId, CExprId),
    Predefined(CQualTypeId, String),
    /// GNU statement expression, common form.
    Statements(CQualTypeId, CStmtId),
    BadExpr,
}

impl CExprKind {
    pub fn qual_type(&self) -> Option<CQualTypeId> {
        use CExprKind::*;
        match *self {
            Literal(ty, _)
            | Unary(ty, _, _)
            | UnaryType(ty, _, _, _)
            | Binary(ty, _, _, _)
            | ImplicitCast(ty, _, _)
            | ExplicitCast(ty, _, _)
            | DeclRef(ty, _)
            | Call(ty, _, _)
            | Member(ty, _, _, _)
            | ArraySubscript(ty, _, _)
            | Conditional(ty, _, _, _)
            | BinaryConditional(ty, _, _)
            | InitList(ty, _, _)
            | ImplicitValueInit(ty)
            | Paren(ty, _)
            | CompoundLiteral(ty, _)
            | Predefined(ty, _)
            | Statements(ty, _) => Some(ty),
            BadExpr => None,
        }
    }
}
