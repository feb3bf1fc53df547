use thin_vec::thin_vec;

use crate::zig_ast::node::*;
use crate::zig_ast::render_unit;

#[test]
fn renders_var_decl_flavors() {
    let nodes = vec![
        ZigNode::VarDecl(ZigVarDecl {
            is_pub: true,
            is_const: true,
            name: "my_int".into(),
            init: Some(Box::new(ZigNode::ident("c_int"))),
            ..ZigVarDecl::default()
        }),
        ZigNode::VarDecl(ZigVarDecl {
            is_pub: true,
            is_extern: true,
            name: "errno_value".into(),
            ty: Some(Box::new(ZigNode::ident("c_int"))),
            ..ZigVarDecl::default()
        }),
    ];
    let out = render_unit(&nodes);
    assert!(out.contains("pub const my_int = c_int;"));
    assert!(out.contains("pub extern var errno_value: c_int;"));
}

#[test]
fn renders_fn_decls() {
    let decl = ZigNode::FnDecl(ZigFnDecl {
        is_pub: true,
        is_extern: false,
        is_export: true,
        is_inline: false,
        name: "add".into(),
        params: thin_vec![
            ZigParam {
                name: Some("a".into()),
                ty: ZigNode::ident("c_int"),
                is_noalias: false,
            },
            ZigParam {
                name: Some("b".into()),
                ty: ZigNode::ident("c_int"),
                is_noalias: false,
            },
        ],
        is_var_args: false,
        return_ty: Box::new(ZigNode::ident("c_int")),
        explicit_callconv: false,
        body: Some(Box::new(ZigNode::block([ZigNode::Return(Some(Box::new(
            ZigNode::bin(ZigBinOp::Add, ZigNode::ident("a"), ZigNode::ident("b")),
        )))]))),
    });
    let out = render_unit(&[decl]);
    assert!(out.contains("pub export fn add(a: c_int, b: c_int) c_int {"));
    assert!(out.contains("    return a + b;"));
}

#[test]
fn nested_operands_always_parenthesized() {
    let inner = ZigNode::bin(ZigBinOp::Mul, ZigNode::ident("b"), ZigNode::ident("c"));
    let outer = ZigNode::bin(ZigBinOp::Add, ZigNode::ident("a"), inner);
    let out = render_unit(&[ZigNode::Discard(Box::new(outer))]);
    assert_eq!(out, "_ = a + (b * c);\n");
}

#[test]
fn string_and_char_escapes() {
    let out = render_unit(&[ZigNode::Discard(Box::new(ZigNode::StringLiteral(
        b"a\x07\"\n\\z".to_vec(),
    )))]);
    assert_eq!(out, "_ = \"a\\x07\\\"\\n\\\\z\";\n");

    let out = render_unit(&[ZigNode::Discard(Box::new(ZigNode::CharLiteral(0x0b)))]);
    assert_eq!(out, "_ = '\\x0b';\n");
}

#[test]
fn labeled_block_and_break() {
    let block = ZigNode::labeled_block(
        "blk_1",
        [
            ZigNode::VarDecl(ZigVarDecl {
                is_const: true,
                name: "tmp".into(),
                init: Some(Box::new(ZigNode::int("3"))),
                ..ZigVarDecl::default()
            }),
            ZigNode::break_to("blk_1", Some(ZigNode::ident("tmp"))),
        ],
    );
    let out = render_unit(&[ZigNode::Discard(Box::new(block))]);
    assert!(out.contains("_ = blk_1: {"));
    assert!(out.contains("const tmp = 3;"));
    assert!(out.contains("break :blk_1 tmp;"));
}

#[test]
fn switch_prongs_render_with_else() {
    let node = ZigNode::Switch {
        cond: Box::new(ZigNode::ident("x")),
        prongs: thin_vec![
            SwitchProng {
                items: thin_vec![ZigNode::int("1")],
                body: ZigNode::break_to("case_1", None),
            },
            SwitchProng {
                items: thin_vec![],
                body: ZigNode::break_to("sw_2", None),
            },
        ],
    };
    let out = render_unit(&[node]);
    assert!(out.contains("switch (x) {"));
    assert!(out.contains("1 => break :case_1,"));
    assert!(out.contains("else => break :sw_2,"));
}

#[test]
fn rendering_is_deterministic() {
    let node = ZigNode::FnDecl(ZigFnDecl {
        is_pub: true,
        is_extern: true,
        is_export: false,
        is_inline: false,
        name: "f".into(),
        params: thin_vec![ZigParam {
            name: None,
            ty: ZigNode::CPointer {
                is_const: true,
                is_volatile: false,
                child: Box::new(ZigNode::ident("u8")),
            },
            is_noalias: false,
        }],
        is_var_args: true,
        return_ty: Box::new(ZigNode::ident("c_int")),
        explicit_callconv: false,
        body: None,
    });
    let nodes = [node];
    assert_eq!(render_unit(&nodes), render_unit(&nodes));
    assert!(render_unit(&nodes).contains("pub extern fn f([*c]const u8, ...) c_int;"));
}
