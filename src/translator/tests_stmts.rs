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
fn do_while_rewrites_to_infinite_loop_with_break() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let i = param(&mut b, "i", int_qt);
    let ri = b.decl_ref(int_qt, i);
    let inc = b.expr(CExprKind::Unary(int_qt, UnOp::PreIncrement, ri));
    let body_stmt = b.stmt(CStmtKind::Expr(inc));
    let body = b.stmt(CStmtKind::Compound([body_stmt].into_iter().collect()));
    let ri2 = b.decl_ref(int_qt, i);
    let ten = b.int_lit(10);
    let cond = b.expr(CExprKind::Binary(int_qt, BinOp::Less, ri2, ten));
    let dw = b.stmt(CStmtKind::DoWhile { body, cond });
    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "f", void_qt, &[(i, int_qt)], &[dw]);
    let out = zig(b);
    assert!(out.contains("while (true) {"));
    assert!(out.contains("i += 1;"));
    assert!(out.contains("if (!(i < @as(c_int, 10))) break;"));
}

#[test]
fn for_loop_lowers_to_while_with_continue_expression() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let i = param(&mut b, "i", int_qt);
    let ri = b.decl_ref(int_qt, i);
    let zero = b.int_lit(0);
    let init_assign = b.expr(CExprKind::Binary(int_qt, BinOp::Assign, ri, zero));
    let init = b.stmt(CStmtKind::Expr(init_assign));
    let ri2 = b.decl_ref(int_qt, i);
    let three = b.int_lit(3);
    let cond = b.expr(CExprKind::Binary(int_qt, BinOp::Less, ri2, three));
    let ri3 = b.decl_ref(int_qt, i);
    let inc = b.expr(CExprKind::Unary(int_qt, UnOp::PostIncrement, ri3));
    let body = b.stmt(CStmtKind::Empty);
    let for_stmt = b.stmt(CStmtKind::For {
        init: Some(init),
        cond: Some(cond),
        inc: Some(inc),
        body,
    });
    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "f", void_qt, &[(i, int_qt)], &[for_stmt]);
    let out = zig(b);
    assert!(out.contains("i = 0;"));
    assert!(out.contains("while (i < @as(c_int, 3)) : (i += 1)"));
}

#[test]
fn for_without_condition_runs_forever() {
    let mut b = AstBuilder::new();
    let brk = b.stmt(CStmtKind::Break);
    let body = b.stmt(CStmtKind::Compound([brk].into_iter().collect()));
    let for_stmt = b.stmt(CStmtKind::For {
        init: None,
        cond: None,
        inc: None,
        body,
    });
    let void_qt = b.qt(CTypeKind::Void);
    b.ty(CTypeKind::Int);
    add_fn(&mut b, "f", void_qt, &[], &[for_stmt]);
    let out = zig(b);
    assert!(out.contains("while (true) {"));
    assert!(out.contains("break;"));
}

#[test]
fn switch_lowers_to_dispatch_with_fallthrough_segments() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let x = param(&mut b, "x", int_qt);

    let one_ret = b.int_lit(1);
    let ret1 = b.stmt(CStmtKind::Return(Some(one_ret)));
    let one_case = b.int_lit(1);
    let case1 = b.stmt(CStmtKind::Case(one_case, ret1));

    let zero_ret = b.int_lit(0);
    let ret0 = b.stmt(CStmtKind::Return(Some(zero_ret)));
    let default = b.stmt(CStmtKind::Default(ret0));

    let body = b.stmt(CStmtKind::Compound([case1, default].into_iter().collect()));
    let rx = b.decl_ref(int_qt, x);
    let switch = b.stmt(CStmtKind::Switch { cond: rx, body });
    add_fn(&mut b, "f", int_qt, &[(x, int_qt)], &[switch]);
    let out = zig(b);
    assert!(out.contains("switch (x) {"));
    assert!(out.contains("@as(c_int, 1) => break :case_1,"));
    assert!(out.contains("else => break :default_2,"));
    // Segment bodies follow their dispatch blocks, preserving fallthrough.
    assert!(out.contains("return 1;"));
    assert!(out.contains("return 0;"));
    let case_block = out.find("case_1: {").unwrap();
    let ret_one = out.find("return 1;").unwrap();
    assert!(case_block < ret_one);
}

#[test]
fn break_in_switch_targets_the_switch_label() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let x = param(&mut b, "x", int_qt);

    let brk = b.stmt(CStmtKind::Break);
    let one_case = b.int_lit(1);
    let case1 = b.stmt(CStmtKind::Case(one_case, brk));
    let body = b.stmt(CStmtKind::Compound([case1].into_iter().collect()));
    let rx = b.decl_ref(int_qt, x);
    let switch = b.stmt(CStmtKind::Switch { cond: rx, body });
    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "f", void_qt, &[(x, int_qt)], &[switch]);
    let out = zig(b);
    // The lazily synthesized switch label is both declared and targeted.
    assert!(out.contains("sw_2: {"));
    assert!(out.contains("break :sw_2;"));
}

#[test]
fn break_and_continue_inside_loops_stay_plain() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let x = param(&mut b, "x", int_qt);
    let rx = b.decl_ref(int_qt, x);
    let cont = b.stmt(CStmtKind::Continue);
    let body = b.stmt(CStmtKind::Compound([cont].into_iter().collect()));
    let while_stmt = b.stmt(CStmtKind::While { cond: rx, body });
    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "f", void_qt, &[(x, int_qt)], &[while_stmt]);
    let out = zig(b);
    assert!(out.contains("while (x != 0) {"));
    assert!(out.contains("continue;"));
}

#[test]
fn goto_fails_the_whole_function() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let goto = b.stmt(CStmtKind::Goto("out".into()));
    add_fn(&mut b, "f", int_qt, &[], &[goto]);
    let out = zig(b);
    assert!(out.contains("pub const f = @compileError("));
    assert!(out.contains("goto 'out'"));
}

#[test]
fn local_declarations_bind_and_shadow() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let zero = b.int_lit(0);
    let outer = b.decl(CDeclKind::Variable {
        name: "v".into(),
        typ: int_qt,
        initializer: Some(zero),
        storage: StorageClass::None,
        is_defn: true,
    });
    let outer_stmt = b.stmt(CStmtKind::Decls([outer].into_iter().collect()));
    let one = b.int_lit(1);
    let inner = b.decl(CDeclKind::Variable {
        name: "v".into(),
        typ: int_qt,
        initializer: Some(one),
        storage: StorageClass::None,
        is_defn: true,
    });
    let inner_stmt = b.stmt(CStmtKind::Decls([inner].into_iter().collect()));
    let inner_ref = b.decl_ref(int_qt, inner);
    let ret_inner = b.stmt(CStmtKind::Return(Some(inner_ref)));
    let nested = b.stmt(CStmtKind::Compound(
        [inner_stmt, ret_inner].into_iter().collect(),
    ));
    add_fn(&mut b, "f", int_qt, &[], &[outer_stmt, nested]);
    let out = zig(b);
    assert!(out.contains("var v: c_int = 0;"));
    assert!(out.contains("var v_1: c_int = 1;"));
    assert!(out.contains("return v_1;"));
}

#[test]
fn ignored_call_results_are_discarded() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let callee_ty = b.ty(CTypeKind::Function {
        ret: int_qt,
        params: ThinVec::new(),
        is_variadic: false,
        is_noreturn: false,
    });
    let callee = b.top_decl(CDeclKind::Function {
        name: "produce".into(),
        typ: callee_ty,
        parameters: ThinVec::new(),
        body: None,
        storage: StorageClass::Extern,
        is_inline: false,
        is_defn: false,
    });
    let fn_qt = CQualTypeId::new(callee_ty);
    let rcallee = b.decl_ref(fn_qt, callee);
    let call = b.expr(CExprKind::Call(int_qt, rcallee, ThinVec::new()));
    let s = b.stmt(CStmtKind::Expr(call));
    let void_qt = b.qt(CTypeKind::Void);
    add_fn(&mut b, "f", void_qt, &[], &[s]);
    let out = zig(b);
    assert!(out.contains("_ = produce();"));
}
