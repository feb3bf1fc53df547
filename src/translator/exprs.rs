//! Expression lowering.
//!
//! One recursive dispatch over every C expression class. Callers pass the
//! active scope and whether the result is consumed; value-producing side
//! effects (assignment, increment) switch shape on that flag. Literal
//! translation takes a coercion hint that suppresses the `@as` wrapper when
//! the surrounding assignment or initializer already pins the type.

use log::debug;
use thin_vec::ThinVec;

use crate::c_ast::{
    BinOp, CExprId, CExprKind, CLiteral, CQualTypeId, CTypeKind, CastKind, IntBase, MemberKind,
    SourceLoc, UnOp, UnTypeOp,
};
use crate::error::TranslationError;
use crate::translator::{Context, ResultUsed, ScopeId};
use crate::zig_ast::{ZigBinOp, ZigNode, ZigVarDecl};

type TransResult = Result<ZigNode, TranslationError>;

impl Context<'_> {
    pub fn trans_expr(&mut self, scope: ScopeId, expr: CExprId, used: ResultUsed) -> TransResult {
        self.trans_expr_inner(scope, expr, used, false)
    }

    /// Like [`Self::trans_expr`], but the destination type is already pinned
    /// by the surrounding context, so literals skip their `@as` wrapper.
    pub fn trans_expr_coercing(&mut self, scope: ScopeId, expr: CExprId) -> TransResult {
        self.trans_expr_inner(scope, expr, ResultUsed::Used, true)
    }

    fn trans_expr_inner(
        &mut self,
        scope: ScopeId,
        expr: CExprId,
        used: ResultUsed,
        coerce: bool,
    ) -> TransResult {
        let node = self.ast.expr(expr).clone();
        let loc = node.loc.as_ref();
        match node.kind {
            CExprKind::Literal(qt, ref lit) => self.trans_literal(scope, qt, lit, coerce, loc),
            CExprKind::Unary(qt, op, sub) => self.trans_unary(scope, qt, op, sub, used, loc),
            CExprKind::UnaryType(_, op, _, arg_qt) => {
                let ty = self.trans_qual_type(scope, arg_qt, loc)?;
                Ok(match op {
                    UnTypeOp::SizeOf => ZigNode::builtin("sizeOf", [ty]),
                    UnTypeOp::AlignOf => ZigNode::builtin("alignOf", [ty]),
                })
            }
            CExprKind::Binary(qt, op, lhs, rhs) => {
                self.trans_binary(scope, qt, op, lhs, rhs, used, loc)
            }
            CExprKind::ImplicitCast(qt, sub, kind) | CExprKind::ExplicitCast(qt, sub, kind) => {
                self.trans_cast_expr(scope, qt, sub, kind, used, coerce, loc)
            }
            CExprKind::DeclRef(_, decl) => self.trans_decl_ref(scope, decl),
            CExprKind::Call(qt, callee, ref args) => {
                self.trans_call(scope, qt, callee, args, loc)
            }
            CExprKind::Member(_, base, field, kind) => {
                self.trans_member(scope, base, field, kind, loc)
            }
            CExprKind::ArraySubscript(_, lhs, rhs) => self.trans_subscript(scope, lhs, rhs, loc),
            CExprKind::Conditional(qt, cond, then_expr, else_expr) => {
                self.trans_conditional(scope, qt, cond, then_expr, else_expr, used, loc)
            }
            CExprKind::BinaryConditional(qt, lhs, rhs) => {
                self.trans_binary_conditional(scope, qt, lhs, rhs, loc)
            }
            CExprKind::InitList(qt, ref items, union_field) => {
                self.trans_init_list(scope, qt, items, union_field, loc)
            }
            CExprKind::ImplicitValueInit(qt) => {
                let ty = self.trans_qual_type(scope, qt, loc)?;
                Ok(ZigNode::zeroes(ty))
            }
            CExprKind::Paren(_, sub) => {
                let inner = self.trans_expr_inner(scope, sub, used, coerce)?;
                Ok(ZigNode::paren(inner))
            }
            CExprKind::CompoundLiteral(_, init) => self.trans_expr_inner(scope, init, used, coerce),
            CExprKind::Predefined(_, ref name) => {
                Ok(ZigNode::StringLiteral(name.clone().into_bytes()))
            }
            CExprKind::Statements(_, stmt) => self.trans_stmt_expr(scope, stmt, used),
            CExprKind::BadExpr => Err(TranslationError::unsupported(
                "unparsed expression",
                loc.cloned(),
            )),
        }
    }

    /// Condition positions: convert to `bool` the C way.
    pub fn trans_bool_expr(&mut self, scope: ScopeId, expr: CExprId) -> TransResult {
        // The front-end wraps conditions in a to-boolean cast; unwrap it so
        // `x != 0` is emitted once, not twice.
        let kind = self.ast.expr(expr).kind.clone();
        if let CExprKind::ImplicitCast(_, sub, cast) | CExprKind::ExplicitCast(_, sub, cast) = kind
            && matches!(
                cast,
                CastKind::IntegralToBoolean
                    | CastKind::FloatingToBoolean
                    | CastKind::PointerToBoolean
            )
        {
            return self.trans_bool_expr(scope, sub);
        }

        let qt = self.ast.expr_type(expr);
        let value = self.trans_expr(scope, expr, ResultUsed::Used)?;
        if value.is_bool_result() {
            return Ok(value);
        }
        let is_pointer = qt.is_some_and(|qt| self.ast.is_pointer(qt.ctype));
        let is_bool = qt.is_some_and(|qt| self.ast.is_bool(qt.ctype));
        if is_bool {
            return Ok(value);
        }
        Ok(self.bool_from_value(value, is_pointer))
    }

    /// Lower a condition inside its own condition scope, wrapping the result
    /// in a block if a comma operator materialized one.
    pub fn trans_condition(&mut self, scope: ScopeId, expr: CExprId) -> TransResult {
        let cond_scope = self.scopes.push_condition(scope);
        let cond = self.trans_bool_expr(cond_scope, expr)?;
        self.wrap_materialized_condition(cond_scope, cond)
    }

    pub(crate) fn wrap_materialized_condition(
        &mut self,
        cond_scope: ScopeId,
        cond: ZigNode,
    ) -> TransResult {
        let block = match &self.scopes.get(cond_scope).kind {
            crate::translator::ScopeKind::Condition { block } => *block,
            _ => return Ok(cond),
        };
        let Some(block_id) = block else {
            return Ok(cond);
        };
        let mut stmts = std::mem::take(&mut self.scopes.block_mut(block_id).stmts);
        if stmts.is_empty() {
            return Ok(cond);
        }
        let label = self.fresh_name("blk");
        stmts.push(ZigNode::break_to(label.clone(), Some(cond)));
        Ok(ZigNode::labeled_block(label, stmts))
    }

    fn trans_literal(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        lit: &CLiteral,
        coerce: bool,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        match lit {
            CLiteral::Integer(value, base) => {
                let text = match base {
                    IntBase::Dec => value.to_string(),
                    IntBase::Hex => format!("0x{:x}", value),
                    IntBase::Oct => format!("0o{:o}", value),
                };
                let node = ZigNode::int(text);
                if coerce {
                    return Ok(node);
                }
                let ty = self.trans_qual_type(scope, qt, loc)?;
                Ok(ZigNode::builtin("as", [ty, node]))
            }
            CLiteral::Character(c) => {
                let node = ZigNode::CharLiteral(*c);
                if coerce {
                    return Ok(node);
                }
                let ty = self.trans_qual_type(scope, qt, loc)?;
                Ok(ZigNode::builtin("as", [ty, node]))
            }
            CLiteral::Floating(value, text) => {
                let text = if text.is_empty() {
                    format!("{:?}", value)
                } else {
                    let (body, _suffix) = super::literals::strip_float_suffix(text);
                    super::literals::normalize_float_text(body)
                };
                let node = ZigNode::FloatLiteral(text);
                if coerce {
                    return Ok(node);
                }
                let ty = self.trans_qual_type(scope, qt, loc)?;
                Ok(ZigNode::builtin("as", [ty, node]))
            }
            CLiteral::String(bytes, 1) => Ok(ZigNode::StringLiteral(bytes.clone())),
            CLiteral::String(bytes, width) => self.hoist_wide_string(bytes, *width),
        }
    }

    /// Wide string literals become a hoisted top-level const array of code
    /// units, NUL terminator included.
    fn hoist_wide_string(&mut self, bytes: &[u8], width: u8) -> TransResult {
        let elem = if width == 2 { "u16" } else { "u32" };
        let mut items: ThinVec<ZigNode> = bytes
            .chunks(width as usize)
            .map(|chunk| {
                let mut unit: u32 = 0;
                for (i, &b) in chunk.iter().enumerate() {
                    unit |= (b as u32) << (8 * i);
                }
                ZigNode::int(unit.to_string())
            })
            .collect();
        items.push(ZigNode::int("0"));
        let name = self.fresh_name("wide_string");
        let len = items.len();
        let lit = ZigNode::ArrayLit {
            ty: Box::new(ZigNode::ArrayType {
                len: Some(Box::new(ZigNode::int(len.to_string()))),
                elem: Box::new(ZigNode::ident(elem)),
            }),
            items,
        };
        self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
            is_const: true,
            name: name.clone(),
            init: Some(Box::new(lit)),
            ..ZigVarDecl::default()
        }));
        self.scopes.bind_root(name.clone());
        Ok(ZigNode::ident(name))
    }

    fn trans_unary(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        op: UnOp,
        sub: CExprId,
        used: ResultUsed,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        match op {
            UnOp::AddressOf => {
                let sub_qt = self.ast.expr_type(sub);
                let inner = self.trans_expr(scope, sub, ResultUsed::Used)?;
                // Function designators already decay to the function itself.
                if sub_qt.is_some_and(|qt| self.ast.resolved_kind(qt.ctype).is_function()) {
                    return Ok(inner);
                }
                Ok(ZigNode::AddressOf(Box::new(inner)))
            }
            UnOp::Deref => {
                let sub_qt = self.ast.expr_type(sub);
                let inner = self.trans_expr(scope, sub, ResultUsed::Used)?;
                // `*f` on a function pointer is the function pointer.
                if sub_qt.is_some_and(|qt| self.ast.function_pointee(qt.ctype).is_some())
                    && self.ast.resolved_kind(qt.ctype).is_function()
                {
                    return Ok(inner);
                }
                Ok(ZigNode::Deref(Box::new(inner)))
            }
            UnOp::Plus => self.trans_expr(scope, sub, used),
            UnOp::Negate => {
                let inner = self.trans_expr(scope, sub, ResultUsed::Used)?;
                let inner = self.int_from_bool(inner);
                if self.ast.is_unsigned_integer(qt.ctype) {
                    Ok(ZigNode::NegateWrap(Box::new(inner)))
                } else {
                    Ok(ZigNode::Negate(Box::new(inner)))
                }
            }
            UnOp::Complement => {
                let inner = self.trans_expr(scope, sub, ResultUsed::Used)?;
                let inner = self.int_from_bool(inner);
                Ok(ZigNode::BitNot(Box::new(inner)))
            }
            UnOp::Not => {
                let inner = self.trans_bool_expr(scope, sub)?;
                Ok(ZigNode::Not(Box::new(inner)))
            }
            UnOp::PreIncrement => self.trans_inc_dec(scope, qt, sub, used, true, loc),
            UnOp::PostIncrement => self.trans_inc_dec(scope, qt, sub, used, false, loc),
            UnOp::PreDecrement => self.trans_dec(scope, qt, sub, used, true, loc),
            UnOp::PostDecrement => self.trans_dec(scope, qt, sub, used, false, loc),
        }
    }

    fn inc_dec_op(&self, qt: CQualTypeId, increment: bool) -> ZigBinOp {
        let wrapping = self.ast.is_unsigned_integer(qt.ctype);
        match (increment, wrapping) {
            (true, false) => ZigBinOp::AssignAdd,
            (true, true) => ZigBinOp::AssignAddWrap,
            (false, false) => ZigBinOp::AssignSub,
            (false, true) => ZigBinOp::AssignSubWrap,
        }
    }

    fn trans_inc_dec(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        sub: CExprId,
        used: ResultUsed,
        prefix: bool,
        _loc: Option<&SourceLoc>,
    ) -> TransResult {
        let op = self.inc_dec_op(qt, true);
        self.lower_inc_dec(scope, op, sub, used, prefix)
    }

    fn trans_dec(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        sub: CExprId,
        used: ResultUsed,
        prefix: bool,
        _loc: Option<&SourceLoc>,
    ) -> TransResult {
        let op = self.inc_dec_op(qt, false);
        self.lower_inc_dec(scope, op, sub, used, prefix)
    }

    /// `++x`/`x++` and the `--` twins.
    ///
    /// Unused forms are a direct compound assignment; used forms bind a
    /// reference so the operand is evaluated exactly once.
    fn lower_inc_dec(
        &mut self,
        scope: ScopeId,
        op: ZigBinOp,
        sub: CExprId,
        used: ResultUsed,
        prefix: bool,
    ) -> TransResult {
        if used == ResultUsed::Unused {
            let lvalue = self.trans_expr(scope, sub, ResultUsed::Used)?;
            return Ok(ZigNode::bin(op, lvalue, ZigNode::int("1")));
        }

        let block = self.scopes.push_block(scope);
        let label = self.fresh_name("blk");
        let ref_name = self.make_local_name(block, "ref");
        let lvalue = self.trans_expr(block, sub, ResultUsed::Used)?;

        let mut stmts: Vec<ZigNode> = vec![ZigNode::VarDecl(ZigVarDecl {
            is_const: true,
            name: ref_name.clone(),
            init: Some(Box::new(ZigNode::AddressOf(Box::new(lvalue)))),
            ..ZigVarDecl::default()
        })];
        let deref = ZigNode::Deref(Box::new(ZigNode::ident(ref_name.clone())));
        if prefix {
            stmts.push(ZigNode::bin(op, deref.clone(), ZigNode::int("1")));
            stmts.push(ZigNode::break_to(label.clone(), Some(deref)));
        } else {
            let tmp = self.make_local_name(block, "tmp");
            stmts.push(ZigNode::VarDecl(ZigVarDecl {
                is_const: true,
                name: tmp.clone(),
                init: Some(Box::new(deref.clone())),
                ..ZigVarDecl::default()
            }));
            stmts.push(ZigNode::bin(op, deref, ZigNode::int("1")));
            stmts.push(ZigNode::break_to(label.clone(), Some(ZigNode::ident(tmp))));
        }
        Ok(ZigNode::labeled_block(label, stmts))
    }

    fn trans_binary(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        op: BinOp,
        lhs: CExprId,
        rhs: CExprId,
        used: ResultUsed,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        match op {
            BinOp::Assign => self.trans_assign(scope, qt, lhs, rhs, used),
            BinOp::Comma => self.trans_comma(scope, lhs, rhs, used),
            BinOp::And | BinOp::Or => {
                let zig_op = if matches!(op, BinOp::And) {
                    ZigBinOp::BoolAnd
                } else {
                    ZigBinOp::BoolOr
                };
                let l = self.trans_bool_expr(scope, lhs)?;
                let r = self.trans_bool_expr(scope, rhs)?;
                Ok(ZigNode::bin(zig_op, l, r))
            }
            _ if op.is_comparison() => {
                let l = self.trans_expr(scope, lhs, ResultUsed::Used)?;
                let r = self.trans_expr(scope, rhs, ResultUsed::Used)?;
                let zig_op = match op {
                    BinOp::Less => ZigBinOp::Less,
                    BinOp::Greater => ZigBinOp::Greater,
                    BinOp::LessEqual => ZigBinOp::LessEq,
                    BinOp::GreaterEqual => ZigBinOp::GreaterEq,
                    BinOp::EqualEqual => ZigBinOp::Eq,
                    _ => ZigBinOp::NotEq,
                };
                Ok(ZigNode::bin(zig_op, l, r))
            }
            _ if op.underlying_assignment().is_some() => {
                self.trans_compound_assign(scope, qt, op, lhs, rhs, used, loc)
            }
            _ => self.trans_arith(scope, qt, op, lhs, rhs, loc),
        }
    }

    /// `a = b`: a labeled value block when used, a plain assignment when not.
    fn trans_assign(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        lhs: CExprId,
        rhs: CExprId,
        used: ResultUsed,
    ) -> TransResult {
        if used == ResultUsed::Unused {
            let target = self.trans_expr(scope, lhs, ResultUsed::Used)?;
            let mut value = self.trans_expr_coercing(scope, rhs)?;
            if !self.ast.is_bool(qt.ctype) {
                value = self.int_from_bool(value);
            }
            return Ok(ZigNode::bin(ZigBinOp::Assign, target, value));
        }

        let block = self.scopes.push_block(scope);
        let label = self.fresh_name("blk");
        let tmp = self.make_local_name(block, "tmp");
        let mut value = self.trans_expr_coercing(block, rhs)?;
        if !self.ast.is_bool(qt.ctype) {
            value = self.int_from_bool(value);
        }
        let target = self.trans_expr(block, lhs, ResultUsed::Used)?;
        let stmts = vec![
            ZigNode::VarDecl(ZigVarDecl {
                is_const: true,
                name: tmp.clone(),
                init: Some(Box::new(value)),
                ..ZigVarDecl::default()
            }),
            ZigNode::bin(ZigBinOp::Assign, target, ZigNode::ident(tmp.clone())),
            ZigNode::break_to(label.clone(), Some(ZigNode::ident(tmp))),
        ];
        Ok(ZigNode::labeled_block(label, stmts))
    }

    /// `a, b`: LHS as a discarded statement, RHS as the value.
    fn trans_comma(
        &mut self,
        scope: ScopeId,
        lhs: CExprId,
        rhs: CExprId,
        used: ResultUsed,
    ) -> TransResult {
        let block = self.scopes.push_block(scope);
        let label = self.fresh_name("blk");
        let lhs_node = self.trans_expr(block, lhs, ResultUsed::Unused)?;
        let lhs_stmt = self.stmt_from_expr(lhs_node, self.expr_is_void(lhs));
        let rhs_node = self.trans_expr(block, rhs, used)?;
        let mut stmts = std::mem::take(&mut self.scopes.block_mut(block).stmts);
        stmts.push(lhs_stmt);
        stmts.push(ZigNode::break_to(label.clone(), Some(rhs_node)));
        Ok(ZigNode::labeled_block(label, stmts))
    }

    pub(crate) fn expr_is_void(&self, expr: CExprId) -> bool {
        self.ast
            .expr_type(expr)
            .is_none_or(|qt| matches!(self.ast.resolved_kind(qt.ctype), CTypeKind::Void))
    }

    /// Wrap an expression for statement position; Zig refuses silently
    /// ignored values.
    pub fn stmt_from_expr(&self, node: ZigNode, is_void: bool) -> ZigNode {
        match &node {
            ZigNode::Bin { op, .. } if op.is_assignment() => node,
            ZigNode::Block { .. }
            | ZigNode::If { .. }
            | ZigNode::While { .. }
            | ZigNode::Switch { .. }
            | ZigNode::Break { .. }
            | ZigNode::Continue
            | ZigNode::Return(_)
            | ZigNode::Discard(_)
            | ZigNode::VarDecl(_)
            | ZigNode::WarningComment(_) => node,
            ZigNode::Call { .. } | ZigNode::Builtin { .. } if is_void => node,
            _ => ZigNode::Discard(Box::new(node)),
        }
    }

    /// `a op= b`, with the same used/unused split as plain assignment.
    fn trans_compound_assign(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        op: BinOp,
        lhs: CExprId,
        rhs: CExprId,
        used: ResultUsed,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        let underlying = op.underlying_assignment().expect("compound assign");
        let unsigned = self.ast.is_unsigned_integer(qt.ctype);
        let is_ptr = self.ast.is_pointer(qt.ctype);

        // Signed division and remainder have no compound operator form.
        let needs_expansion = !is_ptr
            && !unsigned
            && !self.ast.is_float(qt.ctype)
            && matches!(underlying, BinOp::Divide | BinOp::Modulus);

        if used == ResultUsed::Unused && !needs_expansion {
            let target = self.trans_expr(scope, lhs, ResultUsed::Used)?;
            let mut value = self.trans_expr_coercing(scope, rhs)?;
            value = self.int_from_bool(value);
            if matches!(underlying, BinOp::ShiftLeft | BinOp::ShiftRight) {
                value = self.shift_amount(scope, qt, value, loc)?;
            } else if is_ptr {
                value = self.usize_index(scope, rhs, value)?;
            }
            let zig_op = self.compound_op(underlying, unsigned, is_ptr);
            return Ok(ZigNode::bin(zig_op, target, value));
        }

        // Reference block: evaluate the target once, update through it.
        let block = self.scopes.push_block(scope);
        let label = self.fresh_name("blk");
        let ref_name = self.make_local_name(block, "ref");
        let lvalue = self.trans_expr(block, lhs, ResultUsed::Used)?;
        let mut stmts: Vec<ZigNode> = vec![ZigNode::VarDecl(ZigVarDecl {
            is_const: true,
            name: ref_name.clone(),
            init: Some(Box::new(ZigNode::AddressOf(Box::new(lvalue)))),
            ..ZigVarDecl::default()
        })];
        let deref = ZigNode::Deref(Box::new(ZigNode::ident(ref_name.clone())));
        let mut value = self.trans_expr_coercing(block, rhs)?;
        value = self.int_from_bool(value);

        if needs_expansion {
            let call = match underlying {
                BinOp::Divide => ZigNode::builtin("divTrunc", [deref.clone(), value]),
                _ => ZigNode::builtin("rem", [deref.clone(), value]),
            };
            stmts.push(ZigNode::bin(ZigBinOp::Assign, deref.clone(), call));
        } else {
            if matches!(underlying, BinOp::ShiftLeft | BinOp::ShiftRight) {
                value = self.shift_amount(scope, qt, value, loc)?;
            } else if is_ptr {
                value = self.usize_index(scope, rhs, value)?;
            }
            let zig_op = self.compound_op(underlying, unsigned, is_ptr);
            stmts.push(ZigNode::bin(zig_op, deref.clone(), value));
        }

        if used == ResultUsed::Used {
            stmts.push(ZigNode::break_to(label.clone(), Some(deref)));
            Ok(ZigNode::labeled_block(label, stmts))
        } else {
            Ok(ZigNode::block(stmts))
        }
    }

    fn compound_op(&self, underlying: BinOp, unsigned: bool, is_ptr: bool) -> ZigBinOp {
        match underlying {
            BinOp::Add if unsigned => ZigBinOp::AssignAddWrap,
            BinOp::Add => ZigBinOp::AssignAdd,
            BinOp::Subtract if unsigned => ZigBinOp::AssignSubWrap,
            BinOp::Subtract => ZigBinOp::AssignSub,
            BinOp::Multiply if unsigned && !is_ptr => ZigBinOp::AssignMulWrap,
            BinOp::Multiply => ZigBinOp::AssignMul,
            BinOp::Divide => ZigBinOp::AssignDiv,
            BinOp::Modulus => ZigBinOp::AssignRem,
            BinOp::ShiftLeft => ZigBinOp::AssignShl,
            BinOp::ShiftRight => ZigBinOp::AssignShr,
            BinOp::BitAnd => ZigBinOp::AssignBitAnd,
            BinOp::BitXor => ZigBinOp::AssignBitXor,
            _ => ZigBinOp::AssignBitOr,
        }
    }

    /// Zig shift amounts take the log2 type of the shifted operand.
    fn shift_amount(
        &mut self,
        scope: ScopeId,
        lhs_qt: CQualTypeId,
        rhs: ZigNode,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        let lhs_ty = self.trans_qual_type(scope, lhs_qt, loc)?;
        Ok(ZigNode::builtin(
            "intCast",
            [ZigNode::log2_int_type(lhs_ty), rhs],
        ))
    }

    fn trans_arith(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        op: BinOp,
        lhs: CExprId,
        rhs: CExprId,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        let lhs_qt = self.ast.expr_type(lhs);
        let rhs_qt = self.ast.expr_type(rhs);
        let lhs_is_ptr = lhs_qt.is_some_and(|t| self.ast.is_pointer(t.ctype));
        let rhs_is_ptr = rhs_qt.is_some_and(|t| self.ast.is_pointer(t.ctype));

        // Pointer difference.
        if lhs_is_ptr && rhs_is_ptr && matches!(op, BinOp::Subtract) {
            let l = self.trans_expr(scope, lhs, ResultUsed::Used)?;
            let r = self.trans_expr(scope, rhs, ResultUsed::Used)?;
            let pointee = lhs_qt
                .and_then(|t| self.ast.pointee(t.ctype))
                .ok_or_else(|| {
                    TranslationError::unsupported("pointer difference without pointee", loc.cloned())
                })?;
            let elem_ty = self.trans_type(scope, pointee.ctype, loc)?;
            let delta = ZigNode::bin(
                ZigBinOp::SubWrap,
                ZigNode::builtin("ptrToInt", [l]),
                ZigNode::builtin("ptrToInt", [r]),
            );
            let signed = ZigNode::builtin("bitCast", [ZigNode::ident("isize"), delta]);
            return Ok(ZigNode::builtin(
                "divExact",
                [signed, ZigNode::builtin("sizeOf", [elem_ty])],
            ));
        }

        // Pointer +- integer, either operand order.
        if (lhs_is_ptr || rhs_is_ptr) && matches!(op, BinOp::Add | BinOp::Subtract) {
            let (ptr, idx) = if lhs_is_ptr { (lhs, rhs) } else { (rhs, lhs) };
            let ptr_node = self.trans_expr(scope, ptr, ResultUsed::Used)?;
            let idx_node = self.trans_expr(scope, idx, ResultUsed::Used)?;
            let idx_node = self.usize_index(scope, idx, idx_node)?;
            let zig_op = if matches!(op, BinOp::Add) {
                ZigBinOp::Add
            } else {
                ZigBinOp::Sub
            };
            return Ok(ZigNode::bin(zig_op, ptr_node, idx_node));
        }

        let l = self.trans_expr(scope, lhs, ResultUsed::Used)?;
        let l = self.int_from_bool(l);
        let mut r = self.trans_expr(scope, rhs, ResultUsed::Used)?;
        r = self.int_from_bool(r);

        let unsigned = self.ast.is_unsigned_integer(qt.ctype);
        let float = self.ast.is_float(qt.ctype);
        let signed_int = !unsigned && !float;

        let node = match op {
            BinOp::Add if unsigned => ZigNode::bin(ZigBinOp::AddWrap, l, r),
            BinOp::Add => ZigNode::bin(ZigBinOp::Add, l, r),
            BinOp::Subtract if unsigned => ZigNode::bin(ZigBinOp::SubWrap, l, r),
            BinOp::Subtract => ZigNode::bin(ZigBinOp::Sub, l, r),
            BinOp::Multiply if unsigned => ZigNode::bin(ZigBinOp::MulWrap, l, r),
            BinOp::Multiply => ZigNode::bin(ZigBinOp::Mul, l, r),
            BinOp::Divide if signed_int => ZigNode::builtin("divTrunc", [l, r]),
            BinOp::Divide => ZigNode::bin(ZigBinOp::Div, l, r),
            BinOp::Modulus if signed_int => ZigNode::builtin("rem", [l, r]),
            BinOp::Modulus => ZigNode::bin(ZigBinOp::Rem, l, r),
            BinOp::ShiftLeft => {
                let amount = self.shift_amount(scope, qt, r, loc)?;
                ZigNode::bin(ZigBinOp::Shl, l, amount)
            }
            BinOp::ShiftRight => {
                let amount = self.shift_amount(scope, qt, r, loc)?;
                ZigNode::bin(ZigBinOp::Shr, l, amount)
            }
            BinOp::BitAnd => ZigNode::bin(ZigBinOp::BitAnd, l, r),
            BinOp::BitXor => ZigNode::bin(ZigBinOp::BitXor, l, r),
            BinOp::BitOr => ZigNode::bin(ZigBinOp::BitOr, l, r),
            other => {
                return Err(TranslationError::unsupported(
                    format!("binary operator {:?}", other),
                    loc.cloned(),
                ));
            }
        };
        Ok(node)
    }

    /// Array/pointer indices must be `usize`; signed or 64-bit C indices get
    /// an explicit cast, literals pass through.
    fn usize_index(&mut self, _scope: ScopeId, idx: CExprId, node: ZigNode) -> TransResult {
        if matches!(node, ZigNode::IntLiteral(_)) {
            return Ok(node);
        }
        let Some(qt) = self.ast.expr_type(idx) else {
            return Ok(node);
        };
        let signed = self.ast.is_signed_integer(qt.ctype);
        let wide = self.ast.int_rank(qt.ctype).unwrap_or(0) >= 6;
        if signed || wide {
            Ok(ZigNode::builtin(
                "intCast",
                [ZigNode::ident("usize"), node],
            ))
        } else {
            Ok(node)
        }
    }

    fn trans_cast_expr(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        sub: CExprId,
        kind: CastKind,
        used: ResultUsed,
        coerce: bool,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        match kind {
            CastKind::LValueToRValue | CastKind::NoOp | CastKind::ConstCast => {
                self.trans_expr_inner(scope, sub, used, coerce)
            }
            CastKind::FunctionToPointerDecay => self.trans_expr_inner(scope, sub, used, coerce),
            CastKind::ArrayToPointerDecay => {
                let inner = self.trans_expr(scope, sub, ResultUsed::Used)?;
                if matches!(inner, ZigNode::StringLiteral(_)) {
                    Ok(inner)
                } else {
                    Ok(ZigNode::AddressOf(Box::new(inner)))
                }
            }
            CastKind::NullToPointer => Ok(ZigNode::Null),
            CastKind::IntegralToBoolean
            | CastKind::FloatingToBoolean
            | CastKind::PointerToBoolean => self.trans_bool_expr(scope, sub),
            CastKind::ToVoid => self.trans_expr(scope, sub, ResultUsed::Unused),
            CastKind::ToUnion => Err(TranslationError::unsupported(
                "cast to union",
                loc.cloned(),
            )),
            CastKind::BitCast
            | CastKind::IntegralCast
            | CastKind::IntegralToPointer
            | CastKind::PointerToIntegral
            | CastKind::IntegralToFloating
            | CastKind::FloatingToIntegral
            | CastKind::FloatingCast
            | CastKind::BooleanToSignedIntegral => {
                let src = self.ast.expr_type(sub).ok_or_else(|| {
                    TranslationError::unsupported("cast of untyped expression", loc.cloned())
                })?;
                let inner = self.trans_expr_inner(scope, sub, ResultUsed::Used, true)?;
                self.trans_cast(scope, qt, src, inner, loc)
            }
        }
    }

    fn trans_decl_ref(&mut self, scope: ScopeId, decl: crate::c_ast::CDeclId) -> TransResult {
        if let Some(name) = self.decl_table.get(&decl) {
            return Ok(ZigNode::ident(name.clone()));
        }
        // Referenced before visited: force-translate top-level decls and
        // enum constants now; emissions land on the root list immediately.
        if self.is_top_decl(decl) || self.enum_parent(decl).is_some() {
            let name = self.decl_zig_name(decl)?;
            return Ok(ZigNode::ident(name));
        }
        let c_name = self
            .ast
            .decl_name(decl)
            .unwrap_or_default()
            .to_string();
        debug!("decl ref to unregistered {}; using scope alias", c_name);
        Ok(ZigNode::ident(self.scopes.get_alias(scope, &c_name)))
    }

    fn trans_call(
        &mut self,
        scope: ScopeId,
        _qt: CQualTypeId,
        callee: CExprId,
        args: &[CExprId],
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        let callee_qt = self.ast.expr_type(callee);
        let mut callee_node = self.trans_expr(scope, callee, ResultUsed::Used)?;

        // A function pointer that is not a direct function reference gets
        // unwrapped before the call.
        let is_direct = self.is_direct_function_ref(callee);
        let fn_ty = callee_qt.and_then(|qt| {
            let resolved = self.ast.resolve_type(qt.ctype);
            if self.ast.type_kind(resolved).is_function() {
                Some(resolved)
            } else {
                self.ast.function_pointee(qt.ctype)
            }
        });
        if !is_direct && callee_qt.is_some_and(|qt| self.ast.function_pointee(qt.ctype).is_some())
        {
            callee_node = ZigNode::Unwrap(Box::new(callee_node));
        }

        let param_types: Vec<Option<CQualTypeId>> = match fn_ty.map(|t| self.ast.type_kind(t)) {
            Some(CTypeKind::Function { params, .. }) => {
                let mut v: Vec<Option<CQualTypeId>> =
                    params.iter().copied().map(Some).collect();
                v.resize(args.len().max(v.len()), None);
                v
            }
            _ => vec![None; args.len()],
        };

        let mut arg_nodes = ThinVec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(param_types.iter()) {
            let mut node = self.trans_expr(scope, *arg, ResultUsed::Used)?;
            let param_is_bool =
                param.is_some_and(|p| self.ast.is_bool(p.ctype));
            if !param_is_bool {
                node = self.int_from_bool(node);
            }
            arg_nodes.push(node);
        }
        let _ = loc;
        Ok(ZigNode::Call {
            callee: Box::new(callee_node),
            args: arg_nodes,
        })
    }

    /// Whether the callee is a plain reference to a function declaration,
    /// looking through parens and decay casts.
    fn is_direct_function_ref(&self, expr: CExprId) -> bool {
        let mut cur = expr;
        loop {
            match &self.ast.expr(cur).kind {
                CExprKind::Paren(_, sub) => cur = *sub,
                CExprKind::ImplicitCast(_, sub, kind) | CExprKind::ExplicitCast(_, sub, kind)
                    if matches!(
                        kind,
                        CastKind::FunctionToPointerDecay
                            | CastKind::LValueToRValue
                            | CastKind::NoOp
                    ) =>
                {
                    cur = *sub;
                }
                CExprKind::DeclRef(_, decl) => {
                    return matches!(
                        self.ast.decl(*decl).kind,
                        crate::c_ast::CDeclKind::Function { .. }
                    );
                }
                _ => return false,
            }
        }
    }

    fn trans_member(
        &mut self,
        scope: ScopeId,
        base: CExprId,
        field: crate::c_ast::CDeclId,
        kind: MemberKind,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        // Make sure the record (and with it the field names) is translated.
        if !self.decl_table.contains_key(&field)
            && let Some(base_qt) = self.ast.expr_type(base)
        {
            let record_ty = match kind {
                MemberKind::Arrow => self
                    .ast
                    .pointee(base_qt.ctype)
                    .map(|p| p.ctype)
                    .unwrap_or(base_qt.ctype),
                MemberKind::Dot => base_qt.ctype,
            };
            if let Some(record) = self.ast.record_decl(record_ty) {
                let _ = self.decl_zig_name(record)?;
            }
        }
        let field_name = match self.decl_table.get(&field) {
            Some(name) => name.clone(),
            None => self
                .ast
                .decl_name(field)
                .ok_or_else(|| {
                    TranslationError::unsupported("member access to unnamed field", loc.cloned())
                })?
                .to_string(),
        };
        let base_node = self.trans_expr(scope, base, ResultUsed::Used)?;
        let target = match kind {
            MemberKind::Arrow => ZigNode::Deref(Box::new(base_node)),
            MemberKind::Dot => base_node,
        };
        Ok(ZigNode::field(target, field_name))
    }

    fn trans_subscript(
        &mut self,
        scope: ScopeId,
        lhs: CExprId,
        rhs: CExprId,
        _loc: Option<&SourceLoc>,
    ) -> TransResult {
        // C permits `idx[arr]`; normalize to `arr[idx]`.
        let lhs_is_int = self
            .ast
            .expr_type(lhs)
            .is_some_and(|qt| self.ast.is_integer(qt.ctype));
        let (base, idx) = if lhs_is_int { (rhs, lhs) } else { (lhs, rhs) };
        let base_node = self.trans_expr(scope, base, ResultUsed::Used)?;
        let idx_node = self.trans_expr(scope, idx, ResultUsed::Used)?;
        let idx_node = self.usize_index(scope, idx, idx_node)?;
        Ok(ZigNode::Index {
            lhs: Box::new(base_node),
            index: Box::new(idx_node),
        })
    }

    fn trans_conditional(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        cond: CExprId,
        then_expr: CExprId,
        else_expr: CExprId,
        used: ResultUsed,
        _loc: Option<&SourceLoc>,
    ) -> TransResult {
        let cond_node = self.trans_condition(scope, cond)?;
        if used == ResultUsed::Unused {
            let then_node = self.trans_expr(scope, then_expr, ResultUsed::Unused)?;
            let then_stmt = self.stmt_from_expr(then_node, self.expr_is_void(then_expr));
            let else_node = self.trans_expr(scope, else_expr, ResultUsed::Unused)?;
            let else_stmt = self.stmt_from_expr(else_node, self.expr_is_void(else_expr));
            return Ok(ZigNode::If {
                cond: Box::new(cond_node),
                then_body: Box::new(ZigNode::block([then_stmt])),
                else_body: Some(Box::new(ZigNode::block([else_stmt]))),
            });
        }
        let int_dest = self.ast.is_integer(qt.ctype) && !self.ast.is_bool(qt.ctype);
        let mut then_node = self.trans_expr(scope, then_expr, ResultUsed::Used)?;
        let mut else_node = self.trans_expr(scope, else_expr, ResultUsed::Used)?;
        if int_dest {
            then_node = self.int_from_bool(then_node);
            else_node = self.int_from_bool(else_node);
        }
        Ok(ZigNode::paren(ZigNode::If {
            cond: Box::new(cond_node),
            then_body: Box::new(then_node),
            else_body: Some(Box::new(else_node)),
        }))
    }

    /// GNU `x ?: y` with single evaluation of `x`.
    fn trans_binary_conditional(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        lhs: CExprId,
        rhs: CExprId,
        _loc: Option<&SourceLoc>,
    ) -> TransResult {
        let block = self.scopes.push_block(scope);
        let label = self.fresh_name("blk");
        let tmp = self.make_local_name(block, "tmp");
        let lhs_node = self.trans_expr(block, lhs, ResultUsed::Used)?;
        let rhs_node = self.trans_expr(block, rhs, ResultUsed::Used)?;
        let lhs_is_ptr = self
            .ast
            .expr_type(lhs)
            .is_some_and(|t| self.ast.is_pointer(t.ctype));
        let _ = qt;
        let cond = self.bool_from_value(ZigNode::ident(tmp.clone()), lhs_is_ptr);
        let stmts = vec![
            ZigNode::VarDecl(ZigVarDecl {
                is_const: true,
                name: tmp.clone(),
                init: Some(Box::new(lhs_node)),
                ..ZigVarDecl::default()
            }),
            ZigNode::break_to(
                label.clone(),
                Some(ZigNode::If {
                    cond: Box::new(cond),
                    then_body: Box::new(ZigNode::ident(tmp)),
                    else_body: Some(Box::new(rhs_node)),
                }),
            ),
        ];
        Ok(ZigNode::labeled_block(label, stmts))
    }

    fn trans_init_list(
        &mut self,
        scope: ScopeId,
        qt: CQualTypeId,
        items: &[CExprId],
        union_field: Option<crate::c_ast::CDeclId>,
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        match self.ast.resolved_kind(qt.ctype).clone() {
            CTypeKind::ConstantArray(elem, len) => {
                self.trans_array_init(scope, elem, len, items, loc)
            }
            CTypeKind::Struct(record) => {
                if self.opaque_decls.contains(&record) {
                    return Err(TranslationError::unsupported(
                        "initializer for opaque record",
                        loc.cloned(),
                    ));
                }
                let record_name = self.decl_zig_name(record)?;
                let field_ids = match &self.ast.decl(record).kind {
                    crate::c_ast::CDeclKind::Record {
                        fields: Some(fields),
                        ..
                    } => fields.clone(),
                    _ => {
                        return Err(TranslationError::unsupported(
                            "initializer for undefined record",
                            loc.cloned(),
                        ));
                    }
                };
                let mut fields = ThinVec::with_capacity(field_ids.len());
                for (i, field_id) in field_ids.iter().enumerate() {
                    let name = self
                        .decl_table
                        .get(field_id)
                        .cloned()
                        .or_else(|| self.ast.decl_name(*field_id).map(str::to_string))
                        .ok_or_else(|| {
                            TranslationError::unsupported("unnamed field init", loc.cloned())
                        })?;
                    let value = match items.get(i) {
                        Some(item) => {
                            let node = self.trans_expr_coercing(scope, *item)?;
                            self.int_from_bool(node)
                        }
                        None => {
                            let field_qt = match &self.ast.decl(*field_id).kind {
                                crate::c_ast::CDeclKind::Field { typ, .. } => *typ,
                                _ => continue,
                            };
                            let ty = self.trans_qual_type(scope, field_qt, loc)?;
                            ZigNode::zeroes(ty)
                        }
                    };
                    fields.push((name, value));
                }
                Ok(ZigNode::StructLit {
                    ty: Box::new(ZigNode::ident(record_name)),
                    fields,
                })
            }
            CTypeKind::Union(record) => {
                let record_name = self.decl_zig_name(record)?;
                let field = union_field.ok_or_else(|| {
                    TranslationError::unsupported("union initializer without field", loc.cloned())
                })?;
                let name = self
                    .decl_table
                    .get(&field)
                    .cloned()
                    .or_else(|| self.ast.decl_name(field).map(str::to_string))
                    .ok_or_else(|| {
                        TranslationError::unsupported("unnamed union field init", loc.cloned())
                    })?;
                let value = match items.first() {
                    Some(item) => self.trans_expr_coercing(scope, *item)?,
                    None => {
                        return Err(TranslationError::unsupported(
                            "empty union initializer",
                            loc.cloned(),
                        ));
                    }
                };
                let mut fields = ThinVec::new();
                fields.push((name, value));
                Ok(ZigNode::StructLit {
                    ty: Box::new(ZigNode::ident(record_name)),
                    fields,
                })
            }
            _ => match items.first() {
                Some(item) => self.trans_expr_coercing(scope, *item),
                None => {
                    let ty = self.trans_qual_type(scope, qt, loc)?;
                    Ok(ZigNode::zeroes(ty))
                }
            },
        }
    }

    fn trans_array_init(
        &mut self,
        scope: ScopeId,
        elem: crate::c_ast::CTypeId,
        len: u64,
        items: &[CExprId],
        loc: Option<&SourceLoc>,
    ) -> TransResult {
        let elem_ty = self.trans_type(scope, elem, loc)?;

        // A string literal initializer fills the array with its bytes,
        // zero-padded or truncated to the declared length.
        if let [item] = items
            && let CExprKind::Literal(_, CLiteral::String(bytes, 1)) = &self.ast.expr(*item).kind
        {
            let bytes = bytes.clone();
            return Ok(self.array_from_string(elem_ty, len, &bytes));
        }

        let mut nodes = ThinVec::with_capacity(items.len());
        for item in items {
            let node = self.trans_expr_coercing(scope, *item)?;
            nodes.push(self.int_from_bool(node));
        }

        if nodes.is_empty() {
            return Ok(ZigNode::ArrayLit {
                ty: Box::new(ZigNode::ArrayType {
                    len: None,
                    elem: Box::new(elem_ty),
                }),
                items: nodes,
            });
        }
        if nodes.len() as u64 == len {
            return Ok(ZigNode::ArrayLit {
                ty: Box::new(ZigNode::ArrayType {
                    len: Some(Box::new(ZigNode::int(len.to_string()))),
                    elem: Box::new(elem_ty),
                }),
                items: nodes,
            });
        }

        // Short list: `init ++ [_]T{filler} ** leftover`.
        let leftover = len - nodes.len() as u64;
        let head = ZigNode::ArrayLit {
            ty: Box::new(ZigNode::ArrayType {
                len: None,
                elem: Box::new(elem_ty.clone()),
            }),
            items: nodes,
        };
        let filler = ZigNode::ArrayLit {
            ty: Box::new(ZigNode::ArrayType {
                len: None,
                elem: Box::new(elem_ty.clone()),
            }),
            items: std::iter::once(ZigNode::zeroes(elem_ty)).collect(),
        };
        let tail = ZigNode::bin(
            ZigBinOp::ArrayMul,
            filler,
            ZigNode::int(leftover.to_string()),
        );
        Ok(ZigNode::bin(ZigBinOp::ArrayCat, head, tail))
    }
}
