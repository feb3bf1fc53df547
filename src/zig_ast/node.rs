//! Zig AST nodes and constructor helpers.

use thin_vec::ThinVec;

/// Binary operators emitted into Zig source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZigBinOp {
    Add,
    AddWrap,
    Sub,
    SubWrap,
    Mul,
    MulWrap,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    BitXor,
    BitOr,
    BoolAnd,
    BoolOr,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Assign,
    AssignAdd,
    AssignAddWrap,
    AssignSub,
    AssignSubWrap,
    AssignMul,
    AssignMulWrap,
    AssignDiv,
    AssignRem,
    AssignShl,
    AssignShr,
    AssignBitAnd,
    AssignBitXor,
    AssignBitOr,
    /// `++` array concatenation.
    ArrayCat,
    /// `**` array repetition.
    ArrayMul,
}

impl ZigBinOp {
    pub fn token(self) -> &'static str {
        use ZigBinOp::*;
        match self {
            Add => "+",
            AddWrap => "+%",
            Sub => "-",
            SubWrap => "-%",
            Mul => "*",
            MulWrap => "*%",
            Div => "/",
            Rem => "%",
            Shl => "<<",
            Shr => ">>",
            BitAnd => "&",
            BitXor => "^",
            BitOr => "|",
            BoolAnd => "and",
            BoolOr => "or",
            Eq => "==",
            NotEq => "!=",
            Less => "<",
            LessEq => "<=",
            Greater => ">",
            GreaterEq => ">=",
            Assign => "=",
            AssignAdd => "+=",
            AssignAddWrap => "+%=",
            AssignSub => "-=",
            AssignSubWrap => "-%=",
            AssignMul => "*=",
            AssignMulWrap => "*%=",
            AssignDiv => "/=",
            AssignRem => "%=",
            AssignShl => "<<=",
            AssignShr => ">>=",
            AssignBitAnd => "&=",
            AssignBitXor => "^=",
            AssignBitOr => "|=",
            ArrayCat => "++",
            ArrayMul => "**",
        }
    }

    pub fn is_assignment(self) -> bool {
        use ZigBinOp::*;
        matches!(
            self,
            Assign
                | AssignAdd
                | AssignAddWrap
                | AssignSub
                | AssignSubWrap
                | AssignMul
                | AssignMulWrap
                | AssignDiv
                | AssignRem
                | AssignShl
                | AssignShr
                | AssignBitAnd
                | AssignBitXor
                | AssignBitOr
        )
    }
}

/// Container kinds for record/enum/opaque emission.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerKind {
    Struct,
    Union,
    /// Tagged enum with an explicit integer tag type.
    Enum(Box<ZigNode>),
    Opaque,
}

/// A container field. Enum variants leave `ty` empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ZigField {
    pub name: String,
    pub ty: Option<ZigNode>,
    pub align: Option<u64>,
}

/// A `fn` parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ZigParam {
    pub name: Option<String>,
    pub ty: ZigNode,
    pub is_noalias: bool,
}

/// A variable or constant declaration, top-level or local.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZigVarDecl {
    pub is_pub: bool,
    pub is_const: bool,
    pub is_extern: bool,
    pub is_export: bool,
    pub is_threadlocal: bool,
    pub name: String,
    pub ty: Option<Box<ZigNode>>,
    pub init: Option<Box<ZigNode>>,
}

/// A function declaration or definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ZigFnDecl {
    pub is_pub: bool,
    pub is_extern: bool,
    pub is_export: bool,
    pub is_inline: bool,
    pub name: String,
    pub params: ThinVec<ZigParam>,
    pub is_var_args: bool,
    pub return_ty: Box<ZigNode>,
    /// `callconv(.C)` on non-extern, non-export definitions.
    pub explicit_callconv: bool,
    pub body: Option<Box<ZigNode>>,
}

/// One prong of a switch; empty `items` renders as `else`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchProng {
    pub items: ThinVec<ZigNode>,
    pub body: ZigNode,
}

/// A Zig AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum ZigNode {
    Identifier(String),
    IntLiteral(String),
    FloatLiteral(String),
    CharLiteral(u32),
    StringLiteral(Vec<u8>),
    BoolLiteral(bool),
    Null,
    Undefined,

    Bin {
        op: ZigBinOp,
        lhs: Box<ZigNode>,
        rhs: Box<ZigNode>,
    },
    Not(Box<ZigNode>),
    Negate(Box<ZigNode>),
    NegateWrap(Box<ZigNode>),
    BitNot(Box<ZigNode>),
    AddressOf(Box<ZigNode>),
    /// `x.*`
    Deref(Box<ZigNode>),
    /// `x.?`
    Unwrap(Box<ZigNode>),
    Paren(Box<ZigNode>),
    Field {
        lhs: Box<ZigNode>,
        name: String,
    },
    Index {
        lhs: Box<ZigNode>,
        index: Box<ZigNode>,
    },
    Call {
        callee: Box<ZigNode>,
        args: ThinVec<ZigNode>,
    },
    /// `@name(args)`; `name` carries no `@`.
    Builtin {
        name: &'static str,
        args: ThinVec<ZigNode>,
    },

    // Type expressions.
    OptionalType(Box<ZigNode>),
    /// `[*c]T`
    CPointer {
        is_const: bool,
        is_volatile: bool,
        child: Box<ZigNode>,
    },
    /// `*T` / `?*T` is built by wrapping in `OptionalType`.
    SinglePointer {
        is_const: bool,
        is_volatile: bool,
        child: Box<ZigNode>,
    },
    /// `[len]T`; no length renders `[_]T`.
    ArrayType {
        len: Option<Box<ZigNode>>,
        elem: Box<ZigNode>,
    },
    /// `fn (params) callconv(.C) ret`
    FnProtoType {
        params: ThinVec<ZigNode>,
        is_var_args: bool,
        ret: Box<ZigNode>,
    },
    ContainerDecl {
        kind: ContainerKind,
        is_extern: bool,
        fields: ThinVec<ZigField>,
    },

    // Aggregate literals.
    /// `ty{ items }` where `ty` is an `ArrayType`.
    ArrayLit {
        ty: Box<ZigNode>,
        items: ThinVec<ZigNode>,
    },
    /// `ty{ .name = value, ... }`
    StructLit {
        ty: Box<ZigNode>,
        fields: ThinVec<(String, ZigNode)>,
    },

    // Statements and control flow.
    Block {
        label: Option<String>,
        stmts: ThinVec<ZigNode>,
    },
    If {
        cond: Box<ZigNode>,
        then_body: Box<ZigNode>,
        else_body: Option<Box<ZigNode>>,
    },
    While {
        cond: Box<ZigNode>,
        cont: Option<Box<ZigNode>>,
        body: Box<ZigNode>,
    },
    Switch {
        cond: Box<ZigNode>,
        prongs: ThinVec<SwitchProng>,
    },
    Break {
        label: Option<String>,
        value: Option<Box<ZigNode>>,
    },
    Continue,
    Return(Option<Box<ZigNode>>),
    /// `_ = expr;`
    Discard(Box<ZigNode>),

    VarDecl(ZigVarDecl),
    FnDecl(ZigFnDecl),
    Usingnamespace(Box<ZigNode>),
    /// Rendered as a `//` line.
    WarningComment(String),
}

impl ZigNode {
    pub fn ident(name: impl Into<String>) -> ZigNode {
        ZigNode::Identifier(name.into())
    }

    pub fn int(text: impl Into<String>) -> ZigNode {
        ZigNode::IntLiteral(text.into())
    }

    pub fn bin(op: ZigBinOp, lhs: ZigNode, rhs: ZigNode) -> ZigNode {
        ZigNode::Bin {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn builtin(name: &'static str, args: impl IntoIterator<Item = ZigNode>) -> ZigNode {
        ZigNode::Builtin {
            name,
            args: args.into_iter().collect(),
        }
    }

    pub fn call(callee: ZigNode, args: impl IntoIterator<Item = ZigNode>) -> ZigNode {
        ZigNode::Call {
            callee: Box::new(callee),
            args: args.into_iter().collect(),
        }
    }

    pub fn field(lhs: ZigNode, name: impl Into<String>) -> ZigNode {
        ZigNode::Field {
            lhs: Box::new(lhs),
            name: name.into(),
        }
    }

    pub fn paren(inner: ZigNode) -> ZigNode {
        ZigNode::Paren(Box::new(inner))
    }

    pub fn block(stmts: impl IntoIterator<Item = ZigNode>) -> ZigNode {
        ZigNode::Block {
            label: None,
            stmts: stmts.into_iter().collect(),
        }
    }

    pub fn labeled_block(
        label: impl Into<String>,
        stmts: impl IntoIterator<Item = ZigNode>,
    ) -> ZigNode {
        ZigNode::Block {
            label: Some(label.into()),
            stmts: stmts.into_iter().collect(),
        }
    }

    pub fn break_to(label: impl Into<String>, value: Option<ZigNode>) -> ZigNode {
        ZigNode::Break {
            label: Some(label.into()),
            value: value.map(Box::new),
        }
    }

    /// `@import("std")` dotted down to `field`.
    pub fn std_path(path: &[&str]) -> ZigNode {
        let mut node = ZigNode::builtin("import", [ZigNode::StringLiteral(b"std".to_vec())]);
        for part in path {
            node = ZigNode::field(node, *part);
        }
        node
    }

    /// `@import("std").mem.zeroes(ty)` — the zero value of a type.
    pub fn zeroes(ty: ZigNode) -> ZigNode {
        ZigNode::call(ZigNode::std_path(&["mem", "zeroes"]), [ty])
    }

    /// `@import("std").math.Log2Int(ty)` — the shift-amount type of an
    /// integer type.
    pub fn log2_int_type(ty: ZigNode) -> ZigNode {
        ZigNode::call(ZigNode::std_path(&["math", "Log2Int"]), [ty])
    }

    /// Whether the node's Zig type is already `bool`.
    pub fn is_bool_result(&self) -> bool {
        use ZigBinOp::*;
        match self {
            ZigNode::BoolLiteral(_) | ZigNode::Not(_) => true,
            ZigNode::Paren(inner) => inner.is_bool_result(),
            ZigNode::Bin { op, .. } => matches!(
                op,
                BoolAnd | BoolOr | Eq | NotEq | Less | LessEq | Greater | GreaterEq
            ),
            _ => false,
        }
    }
}
