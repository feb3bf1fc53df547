//! Bit-exact C cast chains.
//!
//! Given source and destination qualified types plus the already-lowered
//! operand, emits the Zig cast chain that reproduces the C conversion:
//! pointer reinterpretation through `@ptrCast`/`@alignCast` (or the
//! `@intToPtr`/`@ptrToInt` detour when qualifiers are dropped), rank-driven
//! integer narrowing/widening with a `@bitCast` for the final signedness,
//! float and boolean conversions, and enum entry/exit.

use crate::c_ast::{CQualTypeId, CTypeKind, SourceLoc};
use crate::error::TranslationError;
use crate::translator::{Context, ScopeId};
use crate::zig_ast::{ZigBinOp, ZigNode};

impl Context<'_> {
    /// Translate a C cast of `expr` from `src` to `dst`.
    pub fn trans_cast(
        &mut self,
        scope: ScopeId,
        dst: CQualTypeId,
        src: CQualTypeId,
        expr: ZigNode,
        loc: Option<&SourceLoc>,
    ) -> Result<ZigNode, TranslationError> {
        let ast = self.ast;
        let dst_kind = ast.resolved_kind(dst.ctype).clone();
        let src_kind = ast.resolved_kind(src.ctype).clone();

        if dst_kind == src_kind && dst.quals == src.quals {
            return Ok(expr);
        }

        // 1. Pointer to pointer.
        if let (CTypeKind::Pointer(dst_pointee), CTypeKind::Pointer(src_pointee)) =
            (&dst_kind, &src_kind)
        {
            return self.trans_ptr_cast(scope, dst, *dst_pointee, *src_pointee, expr, loc);
        }

        // 3. Integer <-> pointer.
        if matches!(dst_kind, CTypeKind::Pointer(_)) && ast.is_integer(src.ctype) {
            let dst_ty = self.trans_qual_type(scope, dst, loc)?;
            return Ok(ZigNode::builtin("intToPtr", [dst_ty, expr]));
        }
        if matches!(src_kind, CTypeKind::Pointer(_)) && ast.is_integer(dst.ctype) {
            let dst_ty = self.trans_qual_type(scope, dst, loc)?;
            let as_int = ZigNode::builtin("ptrToInt", [expr]);
            return Ok(ZigNode::builtin("intCast", [dst_ty, as_int]));
        }

        // 5. Bool to integer.
        if matches!(src_kind, CTypeKind::Bool) && ast.is_integer(dst.ctype) {
            let dst_ty = self.trans_qual_type(scope, dst, loc)?;
            let as_int = ZigNode::builtin("boolToInt", [expr]);
            return Ok(ZigNode::builtin("as", [dst_ty, as_int]));
        }

        // 2. Integer to integer, enums included.
        let src_is_intish = ast.is_integer(src.ctype) || matches!(src_kind, CTypeKind::Enum(_));
        let dst_is_intish = ast.is_integer(dst.ctype) || matches!(dst_kind, CTypeKind::Enum(_));
        if src_is_intish && dst_is_intish {
            return self.trans_int_cast(scope, dst, src, expr, loc);
        }

        // 4. Floats.
        if ast.is_float(dst.ctype) && ast.is_float(src.ctype) {
            let dst_ty = self.trans_qual_type(scope, dst, loc)?;
            return Ok(ZigNode::builtin("floatCast", [dst_ty, expr]));
        }
        if ast.is_float(dst.ctype) && src_is_intish {
            let dst_ty = self.trans_qual_type(scope, dst, loc)?;
            let operand = self.enum_to_int(&src_kind, expr);
            return Ok(ZigNode::builtin("intToFloat", [dst_ty, operand]));
        }
        if dst_is_intish && ast.is_float(src.ctype) {
            let dst_ty = self.trans_qual_type(scope, dst, loc)?;
            return Ok(ZigNode::builtin("floatToInt", [dst_ty, expr]));
        }

        // Bool destinations route through boolean conversion at the caller;
        // anything else gets the default coercion.
        let dst_ty = self.trans_qual_type(scope, dst, loc)?;
        Ok(ZigNode::builtin("as", [dst_ty, expr]))
    }

    /// Step 1 of the ladder: pointer reinterpretation.
    fn trans_ptr_cast(
        &mut self,
        scope: ScopeId,
        dst: CQualTypeId,
        dst_pointee: CQualTypeId,
        src_pointee: CQualTypeId,
        expr: ZigNode,
        loc: Option<&SourceLoc>,
    ) -> Result<ZigNode, TranslationError> {
        let dst_ty = self.trans_qual_type(scope, dst, loc)?;

        let drops_const = src_pointee.is_const() && !dst_pointee.is_const();
        let drops_volatile = src_pointee.is_volatile() && !dst_pointee.is_volatile();
        if drops_const || drops_volatile {
            let as_int = ZigNode::builtin("ptrToInt", [expr]);
            return Ok(ZigNode::builtin("intToPtr", [dst_ty, as_int]));
        }

        if self.pointee_is_opaque_like(dst_pointee.ctype) {
            return Ok(ZigNode::builtin("ptrCast", [dst_ty, expr]));
        }
        let child_ty = self.trans_type(scope, dst_pointee.ctype, loc)?;
        let aligned = ZigNode::builtin(
            "alignCast",
            [ZigNode::builtin("alignOf", [child_ty]), expr],
        );
        Ok(ZigNode::builtin("ptrCast", [dst_ty, aligned]))
    }

    /// Step 2: integers (and enums) by rank then signedness.
    fn trans_int_cast(
        &mut self,
        scope: ScopeId,
        dst: CQualTypeId,
        src: CQualTypeId,
        expr: ZigNode,
        loc: Option<&SourceLoc>,
    ) -> Result<ZigNode, TranslationError> {
        let ast = self.ast;
        let dst_kind = ast.resolved_kind(dst.ctype).clone();
        let src_kind = ast.resolved_kind(src.ctype).clone();

        let mut operand = self.enum_to_int(&src_kind, expr);

        // Entering an enum: convert the integer side first, then wrap.
        if let CTypeKind::Enum(decl) = &dst_kind {
            if self.tagged_enums.contains(decl) {
                let dst_ty = self.trans_qual_type(scope, dst, loc)?;
                return Ok(ZigNode::builtin("intToEnum", [dst_ty, operand]));
            }
            // Untagged enums are already plain c_int.
            let dst_ty = self.trans_qual_type(scope, dst, loc)?;
            return Ok(ZigNode::builtin("as", [dst_ty, operand]));
        }

        let dst_ty = self.trans_qual_type(scope, dst, loc)?;
        let src_rank = ast.int_rank(src.ctype).unwrap_or(4);
        let dst_rank = ast.int_rank(dst.ctype).unwrap_or(4);
        let src_signed = ast.is_signed_integer(src.ctype) || matches!(src_kind, CTypeKind::Enum(_));
        let dst_signed = ast.is_signed_integer(dst.ctype);

        if dst_rank < src_rank {
            // Narrowing; truncate in the source signedness, then flip.
            if dst_signed == src_signed {
                return Ok(ZigNode::builtin("truncate", [dst_ty, operand]));
            }
            let mid = self
                .int_type_name_with_sign(&dst_kind, src_signed)
                .unwrap_or("c_int");
            operand = ZigNode::builtin("truncate", [ZigNode::ident(mid), operand]);
            return Ok(ZigNode::builtin("bitCast", [dst_ty, operand]));
        }
        if dst_rank > src_rank {
            // Widening keeps the source signedness, then flips.
            if dst_signed == src_signed {
                return Ok(ZigNode::builtin("as", [dst_ty, operand]));
            }
            let mid = self
                .int_type_name_with_sign(&dst_kind, src_signed)
                .unwrap_or("c_int");
            operand = ZigNode::builtin("as", [ZigNode::ident(mid), operand]);
            return Ok(ZigNode::builtin("bitCast", [dst_ty, operand]));
        }
        if dst_signed != src_signed {
            return Ok(ZigNode::builtin("bitCast", [dst_ty, operand]));
        }
        Ok(ZigNode::builtin("as", [dst_ty, operand]))
    }

    /// `@enumToInt` on values leaving a tagged enum.
    fn enum_to_int(&self, src_kind: &CTypeKind, expr: ZigNode) -> ZigNode {
        match src_kind {
            CTypeKind::Enum(decl) if self.tagged_enums.contains(decl) => {
                ZigNode::builtin("enumToInt", [expr])
            }
            _ => expr,
        }
    }

    /// Integer/pointer/float to bool, for condition positions.
    pub fn bool_from_value(&mut self, value: ZigNode, is_pointer: bool) -> ZigNode {
        if value.is_bool_result() {
            return value;
        }
        if is_pointer {
            ZigNode::bin(ZigBinOp::NotEq, value, ZigNode::Null)
        } else {
            ZigNode::bin(ZigBinOp::NotEq, value, ZigNode::int("0"))
        }
    }

    /// `@boolToInt` when a boolean-typed node lands in integer context.
    pub fn int_from_bool(&mut self, value: ZigNode) -> ZigNode {
        if value.is_bool_result() {
            ZigNode::builtin("boolToInt", [value])
        } else {
            value
        }
    }
}
