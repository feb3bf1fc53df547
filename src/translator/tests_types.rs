use crate::c_ast::build::AstBuilder;
use crate::c_ast::*;
use crate::translator::translate;

fn zig(b: AstBuilder) -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    let ast = b.finish();
    translate(&ast).render()
}

fn typedef_of(b: &mut AstBuilder, name: &str, typ: CQualTypeId) {
    b.top_decl(CDeclKind::Typedef {
        name: name.into(),
        typ,
    });
}

#[test]
fn builtin_scalar_table() {
    let mut b = AstBuilder::new();
    let cases = [
        ("t_bool", CTypeKind::Bool, "bool"),
        ("t_char", CTypeKind::Char, "i8"),
        ("t_uchar", CTypeKind::UChar, "u8"),
        ("t_short", CTypeKind::Short, "c_short"),
        ("t_uint", CTypeKind::UInt, "c_uint"),
        ("t_ll", CTypeKind::LongLong, "c_longlong"),
        ("t_i128", CTypeKind::Int128, "i128"),
        ("t_f", CTypeKind::Float, "f32"),
        ("t_ld", CTypeKind::LongDouble, "c_longdouble"),
        ("t_f128", CTypeKind::Float128, "f128"),
    ];
    for (name, kind, _) in &cases {
        let qt = b.qt(kind.clone());
        typedef_of(&mut b, name, qt);
    }
    let out = zig(b);
    for (name, _, zig_name) in &cases {
        assert!(
            out.contains(&format!("pub const {} = {};", name, zig_name)),
            "missing mapping for {}: {}",
            name,
            out
        );
    }
}

#[test]
fn unsigned_char_on_arm_targets() {
    let mut b = AstBuilder::with_target("aarch64-unknown-linux-gnu");
    let qt = b.qt(CTypeKind::Char);
    typedef_of(&mut b, "t_char", qt);
    assert!(zig(b).contains("pub const t_char = u8;"));
}

#[test]
fn pointer_forms() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();

    let ip = b.qt(CTypeKind::Pointer(int_qt));
    typedef_of(&mut b, "ip", ip);

    let const_char = b.const_qt(CTypeKind::Char);
    let cp = b.qt(CTypeKind::Pointer(const_char));
    typedef_of(&mut b, "cp", cp);

    let void_qt = b.qt(CTypeKind::Void);
    let vp = b.qt(CTypeKind::Pointer(void_qt));
    typedef_of(&mut b, "vp", vp);

    let fn_ty = b.ty(CTypeKind::Function {
        ret: int_qt,
        params: [int_qt].into_iter().collect(),
        is_variadic: false,
        is_noreturn: false,
    });
    let fp = b.qt(CTypeKind::Pointer(CQualTypeId::new(fn_ty)));
    typedef_of(&mut b, "fp", fp);

    let out = zig(b);
    assert!(out.contains("pub const ip = [*c]c_int;"));
    assert!(out.contains("pub const cp = [*c]const i8;"));
    assert!(out.contains("pub const vp = ?*c_void;"));
    assert!(out.contains("pub const fp = ?fn (c_int) callconv(.C) c_int;"));
}

#[test]
fn array_forms() {
    let mut b = AstBuilder::new();
    let int_ty = b.ty(CTypeKind::Int);
    let a4 = b.qt(CTypeKind::ConstantArray(int_ty, 4));
    typedef_of(&mut b, "a4", a4);
    let open = b.qt(CTypeKind::IncompleteArray(int_ty));
    typedef_of(&mut b, "open", open);
    let out = zig(b);
    assert!(out.contains("pub const a4 = [4]c_int;"));
    assert!(out.contains("pub const open = [*c]c_int;"));
}

#[test]
fn builtin_typedef_fast_path_skips_emission() {
    let mut b = AstBuilder::new();
    let uint_qt = b.qt(CTypeKind::UInt);
    let u32_decl = b.top_decl(CDeclKind::Typedef {
        name: "uint32_t".into(),
        typ: uint_qt,
    });
    let u32_ty = b.ty(CTypeKind::Typedef(u32_decl));
    typedef_of(&mut b, "my_u32", CQualTypeId::new(u32_ty));
    let out = zig(b);
    assert!(!out.contains("pub const uint32_t"));
    assert!(out.contains("pub const my_u32 = u32;"));
}

#[test]
fn pointer_to_forward_record_is_single_pointer() {
    let mut b = AstBuilder::new();
    let record = b.top_decl(CDeclKind::Record {
        name: Some("node".into()),
        fields: None,
        is_union: false,
    });
    let rec_ty = b.ty(CTypeKind::Struct(record));
    let sp = b.qt(CTypeKind::Pointer(CQualTypeId::new(rec_ty)));
    typedef_of(&mut b, "node_ptr", sp);
    let out = zig(b);
    assert!(out.contains("pub const struct_node = opaque {};"));
    assert!(out.contains("pub const node_ptr = *struct_node;"));
}

#[test]
fn demotion_propagates_through_typedef_chains() {
    let mut b = AstBuilder::new();
    let int_qt = b.int();
    let field = b.decl(CDeclKind::Field {
        name: Some("a".into()),
        typ: int_qt,
        bitfield_width: Some(3),
        alignment: None,
    });
    let record = b.top_decl(CDeclKind::Record {
        name: Some("flags".into()),
        fields: Some([field].into_iter().collect()),
        is_union: false,
    });
    let rec_ty = b.ty(CTypeKind::Struct(record));
    let alias = b.top_decl(CDeclKind::Typedef {
        name: "flags_t".into(),
        typ: CQualTypeId::new(rec_ty),
    });
    let alias_ty = b.ty(CTypeKind::Typedef(alias));
    // Pointer through the typedef still sees the demoted record.
    let p = b.qt(CTypeKind::Pointer(CQualTypeId::new(alias_ty)));
    typedef_of(&mut b, "flags_ptr", p);
    let out = zig(b);
    assert!(out.contains("demoted to opaque"));
    assert!(out.contains("pub const flags_t = struct_flags;"));
    // Still a single pointer: the demotion is visible through the typedef.
    assert!(out.contains("pub const flags_ptr = *flags_t;"));
}

#[test]
fn unsupported_type_becomes_compile_error_stub() {
    let mut b = AstBuilder::new();
    let int_ty = b.ty(CTypeKind::Int);
    let vla = b.qt(CTypeKind::VariableArray(int_ty, None));
    typedef_of(&mut b, "vla_t", vla);
    let out = zig(b);
    assert!(out.contains("pub const vla_t = @compileError(\"unsupported type"));
    assert!(out.contains("warning: unable to translate vla_t"));
}
