use thin_vec::ThinVec;

use crate::c_ast::build::AstBuilder;
use crate::c_ast::*;
use crate::translator::translate;

fn zig(b: AstBuilder) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let ast = b.finish();
    translate(&ast).render()
}

/// Add `name(params) { stmts }` returning `ret` to the unit.
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

fn param(b: &mut AstBuilder, name: &str, qt: CQualTypeId) -> CDeclId {
    b.decl(CDeclKind::Variable {
        name: name.into(),
        typ: qt,
        initializer: None,
        storage: StorageClass::None,
        is_defn: false,
    })
}

#[test]
fn identity_typedef() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    b.top_decl(CDeclKind::Typedef {
        name: "my_int".into(),
        typ: int_qt,
    });
    assert!(zig(b).contains("pub const my_int = c_int;"));
}

#[test]
fn empty_unit_emits_only_the_preamble() {
    let out = zig(AstBuilder::new());
    assert_eq!(out, "pub usingnamespace @import(\"builtins\");\n");
}

#[test]
fn bitfield_record_demotes_to_opaque() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let f_a = b.decl(CDeclKind::Field {
        name: Some("a".into()),
        typ: int_qt,
        bitfield_width: Some(3),
        alignment: None,
    });
    let f_b = b.decl(CDeclKind::Field {
        name: Some("b".into()),
        typ: int_qt,
        bitfield_width: None,
        alignment: None,
    });
    b.top_decl(CDeclKind::Record {
        name: Some("S".into()),
        fields: Some([f_a, f_b].into_iter().collect()),
        is_union: false,
    });
    let out = zig(b);
    assert!(out.contains("demoted to opaque"));
    assert!(out.contains("pub const struct_S = opaque {};"));
    // The bare tag name flushes as an alias at the end.
    assert!(out.contains("pub const S = struct_S;"));
}

#[test]
fn flexible_array_member_demotes_to_opaque() {
    let mut b = AstBuilder::new();
    let int_ty = b.ty(CTypeKind::Int);
    let open = b.qt(CTypeKind::IncompleteArray(int_ty));
    let field = b.decl(CDeclKind::Field {
        name: Some("data".into()),
        typ: open,
        bitfield_width: None,
        alignment: None,
    });
    b.top_decl(CDeclKind::Record {
        name: Some("blob".into()),
        fields: Some([field].into_iter().collect()),
        is_union: false,
    });
    let out = zig(b);
    assert!(out.contains("flexible array member"));
    assert!(out.contains("pub const struct_blob = opaque {};"));
}

#[test]
fn record_with_fields_and_anonymous_member() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let float_qt = b.qt(CTypeKind::Float);
    let f_x = b.decl(CDeclKind::Field {
        name: Some("x".into()),
        typ: int_qt,
        bitfield_width: None,
        alignment: None,
    });
    let f_anon = b.decl(CDeclKind::Field {
        name: None,
        typ: float_qt,
        bitfield_width: None,
        alignment: Some(8),
    });
    b.top_decl(CDeclKind::Record {
        name: Some("P".into()),
        fields: Some([f_x, f_anon].into_iter().collect()),
        is_union: false,
    });
    let out = zig(b);
    assert!(out.contains("pub const struct_P = extern struct {"));
    assert!(out.contains("x: c_int,"));
    assert!(out.contains("unnamed_1: f32 align(8),"));
}

#[test]
fn union_emits_extern_union() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let f = b.decl(CDeclKind::Field {
        name: Some("i".into()),
        typ: int_qt,
        bitfield_width: None,
        alignment: None,
    });
    b.top_decl(CDeclKind::Record {
        name: Some("U".into()),
        fields: Some([f].into_iter().collect()),
        is_union: true,
    });
    let out = zig(b);
    assert!(out.contains("pub const union_U = extern union {"));
    assert!(out.contains("i: c_int,"));
}

#[test]
fn implicit_enum_is_tag_only_with_aliases() {
    let mut b = AstBuilder::new();
    let red = b.decl(CDeclKind::EnumConstant {
        name: "RED".into(),
        value: 0,
        is_explicit: false,
    });
    let green = b.decl(CDeclKind::EnumConstant {
        name: "GREEN".into(),
        value: 1,
        is_explicit: false,
    });
    b.ty(CTypeKind::Int);
    b.top_decl(CDeclKind::Enum {
        name: Some("color".into()),
        enumerators: [red, green].into_iter().collect(),
        integral_type: None,
    });
    let out = zig(b);
    assert!(out.contains("pub const enum_color = enum(c_int) {"));
    assert!(out.contains("    RED,"));
    assert!(out.contains("    GREEN,"));
    // Enumerators are globally visible in C.
    assert!(out.contains("pub const RED = enum_color.RED;"));
    assert!(out.contains("pub const GREEN = enum_color.GREEN;"));
}

#[test]
fn explicit_enum_becomes_typed_constants() {
    let mut b = AstBuilder::new();
    let a = b.decl(CDeclKind::EnumConstant {
        name: "A".into(),
        value: 5,
        is_explicit: true,
    });
    let b_const = b.decl(CDeclKind::EnumConstant {
        name: "B".into(),
        value: 6,
        is_explicit: false,
    });
    b.ty(CTypeKind::Int);
    b.top_decl(CDeclKind::Enum {
        name: Some("E".into()),
        enumerators: [a, b_const].into_iter().collect(),
        integral_type: None,
    });
    let out = zig(b);
    assert!(out.contains("pub const A: c_int = 5;"));
    assert!(out.contains("pub const B: c_int = 6;"));
    assert!(out.contains("pub const enum_E = c_int;"));
    assert!(!out.contains("enum(c_int)"));
}

#[test]
fn extern_and_initialized_globals() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    b.top_decl(CDeclKind::Variable {
        name: "outside".into(),
        typ: int_qt,
        initializer: None,
        storage: StorageClass::Extern,
        is_defn: false,
    });
    let five = b.int_lit(5);
    b.top_decl(CDeclKind::Variable {
        name: "counter".into(),
        typ: int_qt,
        initializer: Some(five),
        storage: StorageClass::None,
        is_defn: true,
    });
    b.top_decl(CDeclKind::Variable {
        name: "zeroed".into(),
        typ: int_qt,
        initializer: None,
        storage: StorageClass::Static,
        is_defn: true,
    });
    let out = zig(b);
    assert!(out.contains("pub extern var outside: c_int;"));
    assert!(out.contains("pub export var counter: c_int = 5;"));
    assert!(out.contains("pub var zeroed: c_int = @import(\"std\").mem.zeroes(c_int);"));
}

#[test]
fn incomplete_array_length_from_initializer() {
    let mut b = AstBuilder::new();
    let char_ty = b.ty(CTypeKind::Char);
    let char_qt = CQualTypeId::new(char_ty);
    let buf_ty = b.qt(CTypeKind::IncompleteArray(char_ty));
    let lit = b.expr(CExprKind::Literal(
        char_qt,
        CLiteral::String(b"hi".to_vec(), 1),
    ));
    b.top_decl(CDeclKind::Variable {
        name: "buf".into(),
        typ: buf_ty,
        initializer: Some(lit),
        storage: StorageClass::None,
        is_defn: true,
    });

    let int_qt = b.int();
    let one = b.int_lit(1);
    let two = b.int_lit(2);
    let int_ty = b.ty(CTypeKind::Int);
    let arr_ty = b.qt(CTypeKind::IncompleteArray(int_ty));
    let items: ThinVec<CExprId> = [one, two].into_iter().collect();
    let arr_of_2 = b.ty(CTypeKind::ConstantArray(int_ty, 2));
    let init = b.expr(CExprKind::InitList(
        CQualTypeId::new(arr_of_2),
        items,
        None,
    ));
    let _ = int_qt;
    b.top_decl(CDeclKind::Variable {
        name: "nums".into(),
        typ: arr_ty,
        initializer: Some(init),
        storage: StorageClass::None,
        is_defn: true,
    });

    let out = zig(b);
    assert!(out.contains("pub export var buf: [3]i8 = [3]i8{'h', 'i', 0};"));
    assert!(out.contains("pub export var nums: [2]c_int = [2]c_int{1, 2};"));
}

#[test]
fn short_init_list_pads_with_zero_filler() {
    let mut b = AstBuilder::new();
    let int_ty = b.ty(CTypeKind::Int);
    let one = b.int_lit(1);
    let arr3 = b.qt(CTypeKind::ConstantArray(int_ty, 3));
    let init = b.expr(CExprKind::InitList(arr3, [one].into_iter().collect(), None));
    b.top_decl(CDeclKind::Variable {
        name: "xs".into(),
        typ: arr3,
        initializer: Some(init),
        storage: StorageClass::None,
        is_defn: true,
    });
    let out = zig(b);
    assert!(out.contains(
        "[_]c_int{1} ++ ([_]c_int{@import(\"std\").mem.zeroes(c_int)} ** 2)"
    ));
}

#[test]
fn variadic_definition_demotes_to_extern() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let body = b.stmt(CStmtKind::Compound(ThinVec::new()));
    let fn_ty = b.ty(CTypeKind::Function {
        ret: int_qt,
        params: [int_qt].into_iter().collect(),
        is_variadic: true,
        is_noreturn: false,
    });
    let p = param(&mut b, "first", int_qt);
    b.top_decl(CDeclKind::Function {
        name: "vf".into(),
        typ: fn_ty,
        parameters: [p].into_iter().collect(),
        body: Some(body),
        storage: StorageClass::None,
        is_inline: false,
        is_defn: true,
    });
    let out = zig(b);
    assert!(out.contains("demoted to extern"));
    assert!(out.contains("pub extern fn vf(first: c_int, ...) c_int;"));
}

#[test]
fn missing_return_synthesizes_zero_value() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    add_fn(&mut b, "f", int_qt, &[], &[]);
    let out = zig(b);
    assert!(out.contains("return @import(\"std\").mem.zeroes(c_int);"));
}

#[test]
fn static_function_keeps_c_callconv_without_export() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let zero = b.int_lit(0);
    let ret = b.stmt(CStmtKind::Return(Some(zero)));
    let body = b.stmt(CStmtKind::Compound([ret].into_iter().collect()));
    let fn_ty = b.ty(CTypeKind::Function {
        ret: int_qt,
        params: ThinVec::new(),
        is_variadic: false,
        is_noreturn: false,
    });
    b.top_decl(CDeclKind::Function {
        name: "helper".into(),
        typ: fn_ty,
        parameters: ThinVec::new(),
        body: Some(body),
        storage: StorageClass::Static,
        is_inline: false,
        is_defn: true,
    });
    let out = zig(b);
    assert!(out.contains("fn helper() callconv(.C) c_int {"));
    assert!(!out.contains("export fn helper"));
}

#[test]
fn static_local_hoists_to_top_level() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let zero = b.int_lit(0);
    let local = b.decl(CDeclKind::Variable {
        name: "counter".into(),
        typ: int_qt,
        initializer: Some(zero),
        storage: StorageClass::Static,
        is_defn: true,
    });
    let decl_stmt = b.stmt(CStmtKind::Decls([local].into_iter().collect()));
    let use_ref = b.decl_ref(int_qt, local);
    let ret = b.stmt(CStmtKind::Return(Some(use_ref)));
    add_fn(&mut b, "next", int_qt, &[], &[decl_stmt, ret]);
    let out = zig(b);
    assert!(out.contains("var counter: c_int = 0;"));
    assert!(out.contains("return counter;"));
}

#[test]
fn reserved_word_decl_names_are_mangled() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    b.top_decl(CDeclKind::Variable {
        name: "export".into(),
        typ: int_qt,
        initializer: None,
        storage: StorageClass::Extern,
        is_defn: false,
    });
    let out = zig(b);
    assert!(out.contains("pub extern var export_1: c_int;"));
}
