//! C type -> Zig type expression translation.
//!
//! Records and enums referenced before their own visit are force-translated
//! on the spot; their emissions land on the root list immediately, which
//! keeps the output topologically ordered. Demotion to opaque is tracked per
//! canonical decl and consulted by pointer translation.

use crate::c_ast::{CQualTypeId, CTypeId, CTypeKind, SourceLoc};
use crate::error::TranslationError;
use crate::translator::{Context, ScopeId};
use crate::zig_ast::ZigNode;

/// Recognised `<stdint.h>`-style typedef names that short-circuit to a Zig
/// primitive without translating the underlying type.
pub fn builtin_typedef_target(name: &str) -> Option<&'static str> {
    Some(match name {
        "int8_t" => "i8",
        "uint8_t" => "u8",
        "int16_t" => "i16",
        "uint16_t" => "u16",
        "int32_t" => "i32",
        "uint32_t" => "u32",
        "int64_t" => "i64",
        "uint64_t" => "u64",
        "intptr_t" => "isize",
        "uintptr_t" => "usize",
        "size_t" => "usize",
        "ssize_t" => "isize",
        "ptrdiff_t" => "isize",
        _ => return None,
    })
}

impl Context<'_> {
    /// Fixed builtin mapping; `None` for non-scalar kinds.
    pub fn builtin_type_name(&self, kind: &CTypeKind) -> Option<&'static str> {
        use CTypeKind::*;
        Some(match kind {
            Void => "c_void",
            Bool => "bool",
            Char => {
                if self.ast.char_is_signed() {
                    "i8"
                } else {
                    "u8"
                }
            }
            SChar => "i8",
            UChar => "u8",
            Short => "c_short",
            UShort => "c_ushort",
            Int => "c_int",
            UInt => "c_uint",
            Long => "c_long",
            ULong => "c_ulong",
            LongLong => "c_longlong",
            ULongLong => "c_ulonglong",
            Int128 => "i128",
            UInt128 => "u128",
            WChar => "c_int",
            Half => "f16",
            Float => "f32",
            Double => "f64",
            LongDouble => "c_longdouble",
            Float128 => "f128",
            _ => return None,
        })
    }

    /// The Zig integer type of `kind` with an explicit signedness, used by
    /// the cast ladder for sign-flip intermediates.
    pub fn int_type_name_with_sign(&self, kind: &CTypeKind, signed: bool) -> Option<&'static str> {
        use CTypeKind::*;
        Some(match kind {
            Bool | Char | SChar | UChar => {
                if signed {
                    "i8"
                } else {
                    "u8"
                }
            }
            Short | UShort => {
                if signed {
                    "c_short"
                } else {
                    "c_ushort"
                }
            }
            Int | UInt | WChar => {
                if signed {
                    "c_int"
                } else {
                    "c_uint"
                }
            }
            Long | ULong => {
                if signed {
                    "c_long"
                } else {
                    "c_ulong"
                }
            }
            LongLong | ULongLong => {
                if signed {
                    "c_longlong"
                } else {
                    "c_ulonglong"
                }
            }
            Int128 | UInt128 => {
                if signed {
                    "i128"
                } else {
                    "u128"
                }
            }
            _ => return None,
        })
    }

    /// Whether the type refers (through typedef/elaborated/attributed
    /// chains) to a record or enum that was demoted to opaque.
    pub fn was_demoted_to_opaque(&self, id: CTypeId) -> bool {
        match *self.ast.resolved_kind(id) {
            CTypeKind::Struct(decl) | CTypeKind::Union(decl) | CTypeKind::Enum(decl) => {
                self.opaque_decls.contains(&decl)
            }
            _ => false,
        }
    }

    /// Opaque-like pointees take a single-pointer and skip the align-cast.
    pub fn pointee_is_opaque_like(&self, id: CTypeId) -> bool {
        match *self.ast.resolved_kind(id) {
            CTypeKind::Void => true,
            CTypeKind::Struct(decl) | CTypeKind::Union(decl) => {
                self.opaque_decls.contains(&decl) || {
                    // Forward declaration without definition anywhere.
                    matches!(
                        &self.ast.decl(decl).kind,
                        crate::c_ast::CDeclKind::Record { fields: None, .. }
                    )
                }
            }
            CTypeKind::Enum(decl) => self.opaque_decls.contains(&decl),
            _ => false,
        }
    }

    pub fn trans_qual_type(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        loc: Option<&SourceLoc>,
    ) -> Result<ZigNode, TranslationError> {
        self.trans_type(scope, qt.ctype, loc)
    }

    pub fn trans_type(
        &mut self,
        scope: ScopeId,
        id: CTypeId,
        loc: Option<&SourceLoc>,
    ) -> Result<ZigNode, TranslationError> {
        let kind = self.ast.type_kind(id).clone();
        if let Some(name) = self.builtin_type_name(&kind) {
            return Ok(ZigNode::ident(name));
        }
        match kind {
            CTypeKind::Pointer(pointee) => self.trans_pointer(scope, pointee, loc),
            CTypeKind::ConstantArray(elem, len) => Ok(ZigNode::ArrayType {
                len: Some(Box::new(ZigNode::int(len.to_string()))),
                elem: Box::new(self.trans_type(scope, elem, loc)?),
            }),
            CTypeKind::IncompleteArray(elem) => Ok(ZigNode::CPointer {
                is_const: false,
                is_volatile: false,
                child: Box::new(self.trans_type(scope, elem, loc)?),
            }),
            CTypeKind::VariableArray(..) => Err(TranslationError::unsupported_type(
                "variable length array",
                loc.cloned(),
            )),
            CTypeKind::Function { .. } => self.trans_fn_proto_type(scope, id, loc),
            CTypeKind::Typedef(decl) => {
                let name = self.decl_zig_name(decl)?;
                Ok(ZigNode::ident(name))
            }
            CTypeKind::Struct(decl) | CTypeKind::Union(decl) | CTypeKind::Enum(decl) => {
                let name = self.decl_zig_name(decl)?;
                Ok(ZigNode::ident(name))
            }
            CTypeKind::Elaborated(inner)
            | CTypeKind::Paren(inner)
            | CTypeKind::Decayed(inner)
            | CTypeKind::Attributed(inner)
            | CTypeKind::MacroQualified(inner) => self.trans_type(scope, inner, loc),
            CTypeKind::Vector(..) => Err(TranslationError::unsupported_type(
                "vector type",
                loc.cloned(),
            )),
            CTypeKind::Atomic(_) => Err(TranslationError::unsupported_type(
                "atomic type",
                loc.cloned(),
            )),
            CTypeKind::BuiltinFn => Err(TranslationError::unsupported_type(
                "builtin function type",
                loc.cloned(),
            )),
            other => Err(TranslationError::unsupported_type(
                format!("unrecognised type kind {:?}", other),
                loc.cloned(),
            )),
        }
    }

    fn trans_pointer(
        &mut self,
        scope: ScopeId,
        pointee: CQualTypeId,
        loc: Option<&SourceLoc>,
    ) -> Result<ZigNode, TranslationError> {
        // Function pointers become optional prototypes.
        if matches!(self.ast.resolved_kind(pointee.ctype), CTypeKind::Function { .. }) {
            let fn_ty = self.ast.resolve_type(pointee.ctype);
            let proto = self.trans_fn_proto_type(scope, fn_ty, loc)?;
            return Ok(ZigNode::OptionalType(Box::new(proto)));
        }
        if matches!(self.ast.resolved_kind(pointee.ctype), CTypeKind::Void) {
            // Zero-sized pointee cannot be a many-item pointer.
            return Ok(ZigNode::OptionalType(Box::new(ZigNode::SinglePointer {
                is_const: pointee.is_const(),
                is_volatile: pointee.is_volatile(),
                child: Box::new(ZigNode::ident("c_void")),
            })));
        }
        let child = Box::new(self.trans_type(scope, pointee.ctype, loc)?);
        if self.pointee_is_opaque_like(pointee.ctype) {
            Ok(ZigNode::SinglePointer {
                is_const: pointee.is_const(),
                is_volatile: pointee.is_volatile(),
                child,
            })
        } else {
            Ok(ZigNode::CPointer {
                is_const: pointee.is_const(),
                is_volatile: pointee.is_volatile(),
                child,
            })
        }
    }

    /// `fn (params) callconv(.C) ret` for a C function type.
    pub fn trans_fn_proto_type(
        &mut self,
        scope: ScopeId,
        fn_ty: CTypeId,
        loc: Option<&SourceLoc>,
    ) -> Result<ZigNode, TranslationError> {
        let CTypeKind::Function {
            ret,
            params,
            is_variadic,
            is_noreturn,
        } = self.ast.type_kind(fn_ty).clone()
        else {
            return Err(TranslationError::unsupported_type(
                "expected function prototype",
                loc.cloned(),
            ));
        };
        let mut zig_params = thin_vec::ThinVec::new();
        for param in &params {
            zig_params.push(self.trans_qual_type(scope, *param, loc)?);
        }
        let ret_node = self.trans_return_type(scope, ret, is_noreturn, loc)?;
        Ok(ZigNode::FnProtoType {
            params: zig_params,
            is_var_args: is_variadic,
            ret: Box::new(ret_node),
        })
    }

    /// Return types spell `void`/`noreturn`, not `c_void`.
    pub fn trans_return_type(
        &mut self,
        scope: ScopeId,
        ret: CQualTypeId,
        is_noreturn: bool,
        loc: Option<&SourceLoc>,
    ) -> Result<ZigNode, TranslationError> {
        if is_noreturn {
            return Ok(ZigNode::ident("noreturn"));
        }
        if matches!(self.ast.resolved_kind(ret.ctype), CTypeKind::Void) {
            return Ok(ZigNode::ident("void"));
        }
        self.trans_qual_type(scope, ret, loc)
    }
}
