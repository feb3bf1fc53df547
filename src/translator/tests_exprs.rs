use thin_vec::ThinVec;

use crate::c_ast::build::AstBuilder;
use crate::c_ast::*;
use crate::translator::translate;

fn zig(b: AstBuilder) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let ast = b.finish();
    translate(&ast).render()
}

fn param(b: &mut AstBuilder, name: &str, qt: CQualTypeId) -> CDeclId {
    b.decl(CDeclKind::Variable {
        name: name.into(),
        typ: qt,
        initializer: None,
        storage: StorageClass::None,
        is_defn: false,
    })
}

fn add_fn(
    b: &mut AstBuilder,
    name: &str,
    ret: CQualTypeId,
    params: &[(CDeclId, CQualTypeId)],
    stmts: &[CStmtId],
) {
    let body = b.stmt(CStmtKind::Compound(stmts.iter().copied().collect()));
    let fn_ty = b.ty(CTypeKind::Function {
        ret,
        params: params.iter().map(|p| p.1).collect(),
        is_variadic: false,
        is_noreturn: false,
    });
    b.top_decl(CDeclKind::Function {
        name: name.into(),
        typ: fn_ty,
        parameters: params.iter().map(|p| p.0).collect(),
        body: Some(body),
        storage: StorageClass::None,
        is_inline: false,
        is_defn: true,
    });
}

#[test]
fn signed_modulus_and_division() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let a = param(&mut b, "a", int_qt);
    let bb = param(&mut b, "b", int_qt);
    let ra = b.decl_ref(int_qt, a);
    let rb = b.decl_ref(int_qt, bb);
    let rem = b.expr(CExprKind::Binary(int_qt, BinOp::Modulus, ra, rb));
    let ret = b.stmt(CStmtKind::Return(Some(rem)));
    add_fn(&mut b, "r", int_qt, &[(a, int_qt), (bb, int_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("return @rem(a, b);"));

    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let a = param(&mut b, "a", int_qt);
    let bb = param(&mut b, "b", int_qt);
    let ra = b.decl_ref(int_qt, a);
    let rb = b.decl_ref(int_qt, bb);
    let div = b.expr(CExprKind::Binary(int_qt, BinOp::Divide, ra, rb));
    let ret = b.stmt(CStmtKind::Return(Some(div)));
    add_fn(&mut b, "d", int_qt, &[(a, int_qt), (bb, int_qt)], &[ret]);
    assert!(zig(b).contains("return @divTrunc(a, b);"));
}

#[test]
fn post_increment_used_binds_a_reference() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let ptr_qt = b.qt(CTypeKind::Pointer(int_qt));
    let p = param(&mut b, "p", ptr_qt);
    let rp = b.decl_ref(ptr_qt, p);
    let deref = b.expr(CExprKind::Unary(int_qt, UnOp::Deref, rp));
    let paren = b.expr(CExprKind::Paren(int_qt, deref));
    let inc = b.expr(CExprKind::Unary(int_qt, UnOp::PostIncrement, paren));
    let ret = b.stmt(CStmtKind::Return(Some(inc)));
    add_fn(&mut b, "g", int_qt, &[(p, ptr_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("const ref = &(p.*);"));
    assert!(out.contains("const tmp = ref.*;"));
    assert!(out.contains("ref.* += 1;"));
    assert!(out.contains("break :blk_1 tmp;"));
}

#[test]
fn unused_increment_is_a_plain_compound_assign() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let uint_qt = b.qt(CTypeKind::UInt);
    let a = param(&mut b, "a", int_qt);
    let u = param(&mut b, "u", uint_qt);
    let ra = b.decl_ref(int_qt, a);
    let ru = b.decl_ref(uint_qt, u);
    let inc = b.expr(CExprKind::Unary(int_qt, UnOp::PreIncrement, ra));
    let winc = b.expr(CExprKind::Unary(uint_qt, UnOp::PostIncrement, ru));
    let s1 = b.stmt(CStmtKind::Expr(inc));
    let s2 = b.stmt(CStmtKind::Expr(winc));
    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "bump", void_qt, &[(a, int_qt), (u, uint_qt)], &[s1, s2]);
    let out = zig(b);
    assert!(out.contains("a += 1;"));
    // Unsigned overflow is defined in C.
    assert!(out.contains("u +%= 1;"));
}

#[test]
fn unsigned_arithmetic_uses_wrapping_operators() {
    let mut b = AstBuilder::new();
    let uint_qt = b.qt(CTypeKind::UInt);
    let a = param(&mut b, "a", uint_qt);
    let bb = param(&mut b, "b", uint_qt);
    let ra = b.decl_ref(uint_qt, a);
    let rb = b.decl_ref(uint_qt, bb);
    let sum = b.expr(CExprKind::Binary(uint_qt, BinOp::Add, ra, rb));
    let ra2 = b.decl_ref(uint_qt, a);
    let prod = b.expr(CExprKind::Binary(uint_qt, BinOp::Multiply, sum, ra2));
    let ret = b.stmt(CStmtKind::Return(Some(prod)));
    add_fn(&mut b, "f", uint_qt, &[(a, uint_qt), (bb, uint_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("(a +% b) *% a"));
}

#[test]
fn shift_amount_gets_log2_cast() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let a = param(&mut b, "a", int_qt);
    let bb = param(&mut b, "b", int_qt);
    let ra = b.decl_ref(int_qt, a);
    let rb = b.decl_ref(int_qt, bb);
    let shl = b.expr(CExprKind::Binary(int_qt, BinOp::ShiftLeft, ra, rb));
    let ret = b.stmt(CStmtKind::Return(Some(shl)));
    add_fn(&mut b, "f", int_qt, &[(a, int_qt), (bb, int_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("a << @intCast(@import(\"std\").math.Log2Int(c_int), b)"));
}

#[test]
fn assignment_used_breaks_out_the_stored_value() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let a = param(&mut b, "a", int_qt);
    let bb = param(&mut b, "b", int_qt);
    let ra = b.decl_ref(int_qt, a);
    let rb = b.decl_ref(int_qt, bb);
    let assign = b.expr(CExprKind::Binary(int_qt, BinOp::Assign, ra, rb));
    let ret = b.stmt(CStmtKind::Return(Some(assign)));
    add_fn(&mut b, "f", int_qt, &[(a, int_qt), (bb, int_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("const tmp = b;"));
    assert!(out.contains("a = tmp;"));
    assert!(out.contains("break :blk_1 tmp;"));
}

#[test]
fn logical_ops_convert_both_sides_to_bool() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let ptr_qt = b.qt(CTypeKind::Pointer(int_qt));
    let a = param(&mut b, "a", int_qt);
    let p = param(&mut b, "p", ptr_qt);
    let ra = b.decl_ref(int_qt, a);
    let rp = b.decl_ref(ptr_qt, p);
    let and = b.expr(CExprKind::Binary(int_qt, BinOp::And, ra, rp));
    let cond = b.expr(CExprKind::ImplicitCast(
        int_qt,
        and,
        CastKind::IntegralToBoolean,
    ));
    let one = b.int_lit(1);
    let ret_one = b.stmt(CStmtKind::Return(Some(one)));
    let if_stmt = b.stmt(CStmtKind::If {
        cond,
        then_stmt: ret_one,
        else_stmt: None,
    });
    add_fn(&mut b, "f", int_qt, &[(a, int_qt), (p, ptr_qt)], &[if_stmt]);
    let out = zig(b);
    assert!(out.contains("if ((a != 0) and (p != null))"));
}

#[test]
fn ternary_and_gnu_binary_conditional() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let a = param(&mut b, "a", int_qt);
    let bb = param(&mut b, "b", int_qt);
    let ra = b.decl_ref(int_qt, a);
    let rb = b.decl_ref(int_qt, bb);
    let ra2 = b.decl_ref(int_qt, a);
    let cond = b.expr(CExprKind::Conditional(int_qt, ra, ra2, rb));
    let ret = b.stmt(CStmtKind::Return(Some(cond)));
    add_fn(&mut b, "pick", int_qt, &[(a, int_qt), (bb, int_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("return (if (a != 0) a else b);"));

    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let a = param(&mut b, "a", int_qt);
    let bb = param(&mut b, "b", int_qt);
    let ra = b.decl_ref(int_qt, a);
    let rb = b.decl_ref(int_qt, bb);
    let elvis = b.expr(CExprKind::BinaryConditional(int_qt, ra, rb));
    let ret = b.stmt(CStmtKind::Return(Some(elvis)));
    add_fn(&mut b, "pick", int_qt, &[(a, int_qt), (bb, int_qt)], &[ret]);
    let out = zig(b);
    // Single evaluation of the tested operand.
    assert!(out.contains("const tmp = a;"));
    assert!(out.contains("break :blk_1 if (tmp != 0) tmp else b;"));
}

#[test]
fn comma_operator_becomes_a_value_block() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let a = param(&mut b, "a", int_qt);
    let bb = param(&mut b, "b", int_qt);
    let ra = b.decl_ref(int_qt, a);
    let rb = b.decl_ref(int_qt, bb);
    let comma = b.expr(CExprKind::Binary(int_qt, BinOp::Comma, ra, rb));
    let ret = b.stmt(CStmtKind::Return(Some(comma)));
    add_fn(&mut b, "f", int_qt, &[(a, int_qt), (bb, int_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("_ = a;"));
    assert!(out.contains("break :blk_1 b;"));
}

#[test]
fn function_pointer_calls_unwrap_the_optional() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let fn_ty = b.ty(CTypeKind::Function {
        ret: int_qt,
        params: [int_qt].into_iter().collect(),
        is_variadic: false,
        is_noreturn: false,
    });
    let fp_qt = b.qt(CTypeKind::Pointer(CQualTypeId::new(fn_ty)));
    let cb = param(&mut b, "cb", fp_qt);
    let x = param(&mut b, "x", int_qt);
    let rcb = b.decl_ref(fp_qt, cb);
    let rx = b.decl_ref(int_qt, x);
    let call = b.expr(CExprKind::Call(int_qt, rcb, [rx].into_iter().collect()));
    let ret = b.stmt(CStmtKind::Return(Some(call)));
    add_fn(&mut b, "invoke", int_qt, &[(cb, fp_qt), (x, int_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("return cb.?(x);"));
}

#[test]
fn direct_calls_do_not_unwrap() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let callee_ty = b.ty(CTypeKind::Function {
        ret: int_qt,
        params: ThinVec::new(),
        is_variadic: false,
        is_noreturn: false,
    });
    let callee = b.top_decl(CDeclKind::Function {
        name: "helper".into(),
        typ: callee_ty,
        parameters: ThinVec::new(),
        body: None,
        storage: StorageClass::Extern,
        is_inline: false,
        is_defn: false,
    });
    let fn_qt = CQualTypeId::new(callee_ty);
    let rhelper = b.decl_ref(fn_qt, callee);
    let call = b.expr(CExprKind::Call(int_qt, rhelper, ThinVec::new()));
    let ret = b.stmt(CStmtKind::Return(Some(call)));
    add_fn(&mut b, "f", int_qt, &[], &[ret]);
    let out = zig(b);
    assert!(out.contains("return helper();"));
}

#[test]
fn member_access_through_pointer_derefs() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let field = b.decl(CDeclKind::Field {
        name: Some("m".into()),
        typ: int_qt,
        bitfield_width: None,
        alignment: None,
    });
    let record = b.top_decl(CDeclKind::Record {
        name: Some("S".into()),
        fields: Some([field].into_iter().collect()),
        is_union: false,
    });
    let rec_ty = b.ty(CTypeKind::Struct(record));
    let ptr_qt = b.qt(CTypeKind::Pointer(CQualTypeId::new(rec_ty)));
    let p = param(&mut b, "p", ptr_qt);
    let rp = b.decl_ref(ptr_qt, p);
    let member = b.expr(CExprKind::Member(int_qt, rp, field, MemberKind::Arrow));
    let ret = b.stmt(CStmtKind::Return(Some(member)));
    add_fn(&mut b, "f", int_qt, &[(p, ptr_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("return p.*.m;"));
}

#[test]
fn signed_subscript_casts_to_usize() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let int_ty = b.ty(CTypeKind::Int);
    let arr_qt = b.qt(CTypeKind::ConstantArray(int_ty, 8));
    let xs = param(&mut b, "xs", arr_qt);
    let i = param(&mut b, "i", int_qt);
    let rxs = b.decl_ref(arr_qt, xs);
    let ri = b.decl_ref(int_qt, i);
    let idx = b.expr(CExprKind::ArraySubscript(int_qt, rxs, ri));
    let ret = b.stmt(CStmtKind::Return(Some(idx)));
    add_fn(&mut b, "f", int_qt, &[(xs, arr_qt), (i, int_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("return xs[@intCast(usize, i)];"));
}

#[test]
fn sizeof_uses_the_queried_type() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let ulong_qt = b.qt(CTypeKind::ULong);
    let size = b.expr(CExprKind::UnaryType(
        ulong_qt,
        UnTypeOp::SizeOf,
        None,
        int_qt,
    ));
    let ret = b.stmt(CStmtKind::Return(Some(size)));
    add_fn(&mut b, "f", ulong_qt, &[], &[ret]);
    let out = zig(b);
    assert!(out.contains("return @sizeOf(c_int);"));
}

#[test]
fn int_cast_ladder_truncates_widens_and_flips_sign() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let short_qt = b.qt(CTypeKind::Short);
    let uint_qt = b.qt(CTypeKind::UInt);
    let long_qt = b.qt(CTypeKind::Long);

    let x = param(&mut b, "x", int_qt);

    // Narrowing, same signedness.
    let rx = b.decl_ref(int_qt, x);
    let narrowed = b.expr(CExprKind::ExplicitCast(short_qt, rx, CastKind::IntegralCast));
    let s1 = b.stmt(CStmtKind::Expr(narrowed));
    // Same rank, flipped signedness.
    let rx2 = b.decl_ref(int_qt, x);
    let flipped = b.expr(CExprKind::ExplicitCast(uint_qt, rx2, CastKind::IntegralCast));
    let s2 = b.stmt(CStmtKind::Expr(flipped));
    // Widening, same signedness.
    let rx3 = b.decl_ref(int_qt, x);
    let widened = b.expr(CExprKind::ExplicitCast(long_qt, rx3, CastKind::IntegralCast));
    let s3 = b.stmt(CStmtKind::Expr(widened));

    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "f", void_qt, &[(x, int_qt)], &[s1, s2, s3]);
    let out = zig(b);
    assert!(out.contains("@truncate(c_short, x)"));
    assert!(out.contains("@bitCast(c_uint, x)"));
    assert!(out.contains("@as(c_long, x)"));
}

#[test]
fn pointer_cast_aligns_unless_qualifiers_drop() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let char_ty = b.ty(CTypeKind::Char);
    let char_ptr = b.qt(CTypeKind::Pointer(CQualTypeId::new(char_ty)));
    let int_ptr = b.qt(CTypeKind::Pointer(int_qt));
    let p = param(&mut b, "p", char_ptr);
    let rp = b.decl_ref(char_ptr, p);
    let cast = b.expr(CExprKind::ExplicitCast(int_ptr, rp, CastKind::BitCast));
    let s = b.stmt(CStmtKind::Expr(cast));
    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "f", void_qt, &[(p, char_ptr)], &[s]);
    let out = zig(b);
    assert!(out.contains("@ptrCast([*c]c_int, @alignCast(@alignOf(c_int), p))"));

    // Dropping const detours through the integer domain.
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let const_int = b.const_qt(CTypeKind::Int);
    let const_ptr = b.qt(CTypeKind::Pointer(const_int));
    let mut_ptr = b.qt(CTypeKind::Pointer(int_qt));
    let p = param(&mut b, "p", const_ptr);
    let rp = b.decl_ref(const_ptr, p);
    let cast = b.expr(CExprKind::ExplicitCast(mut_ptr, rp, CastKind::BitCast));
    let s = b.stmt(CStmtKind::Expr(cast));
    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "g", void_qt, &[(p, const_ptr)], &[s]);
    let out = zig(b);
    assert!(out.contains("@intToPtr([*c]c_int, @ptrToInt(p))"));
}

#[test]
fn statement_expression_yields_its_last_expression() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let a = param(&mut b, "a", int_qt);
    let ra = b.decl_ref(int_qt, a);
    let one = b.int_lit(1);
    let sum = b.expr(CExprKind::Binary(int_qt, BinOp::Add, ra, one));
    let s_last = b.stmt(CStmtKind::Expr(sum));
    let compound = b.stmt(CStmtKind::Compound([s_last].into_iter().collect()));
    let stmt_expr = b.expr(CExprKind::Statements(int_qt, compound));
    let ret = b.stmt(CStmtKind::Return(Some(stmt_expr)));
    add_fn(&mut b, "f", int_qt, &[(a, int_qt)], &[ret]);
    let out = zig(b);
    assert!(out.contains("break :blk_1 a + 1;"));
}
