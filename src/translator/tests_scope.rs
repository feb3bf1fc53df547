use crate::c_ast::CAst;
use crate::c_ast::build::AstBuilder;
use crate::translator::scope::{ScopeId, ScopeKind, ScopeStack};
use crate::translator::Context;
use crate::zig_ast::ZigNode;

fn empty_ast() -> CAst {
    AstBuilder::new().finish()
}

#[test]
fn mangling_avoids_primitive_type_names() {
    let ast = empty_ast();
    let mut ctx = Context::new(&ast);
    let block = ctx.scopes.push_block(ScopeId::ROOT);
    assert_eq!(ctx.make_local_name(block, "u8"), "u8_1");
    assert_eq!(ctx.make_local_name(block, "usize"), "usize_2");
    assert_eq!(ctx.make_local_name(block, "x"), "x");
}

#[test]
fn mangling_counter_is_per_block() {
    let ast = empty_ast();
    let mut ctx = Context::new(&ast);
    let b1 = ctx.scopes.push_block(ScopeId::ROOT);
    let b2 = ctx.scopes.push_block(ScopeId::ROOT);
    // Two independent blocks that collide on the same base name both
    // mangle to the same suffix.
    assert_eq!(ctx.make_local_name(b1, "export"), "export_1");
    assert_eq!(ctx.make_local_name(b2, "export"), "export_1");
}

#[test]
fn mangling_sees_pending_global_names() {
    let mut b = AstBuilder::new();
    b.define_macro("pending_name", "pending_name 1");
    let ast = b.finish();
    let mut ctx = Context::new(&ast);
    ctx.prepass();
    let block = ctx.scopes.push_block(ScopeId::ROOT);
    assert_eq!(ctx.make_local_name(block, "pending_name"), "pending_name_1");
    // Root naming only checks what is bound right now.
    assert!(!ctx.contains_now("pending_name"));
    assert_eq!(ctx.make_root_name("pending_name"), "pending_name");
}

#[test]
fn shadowing_resolves_to_innermost_alias() {
    let ast = empty_ast();
    let mut ctx = Context::new(&ast);
    let outer = ctx.scopes.push_block(ScopeId::ROOT);
    let inner = ctx.scopes.push_block(outer);
    let outer_name = ctx.make_local_name(outer, "x");
    let inner_name = ctx.make_local_name(inner, "x");
    assert_eq!(outer_name, "x");
    assert_eq!(inner_name, "x_1");
    assert_eq!(ctx.scopes.get_alias(inner, "x"), "x_1");
    assert_eq!(ctx.scopes.get_alias(outer, "x"), "x");
    // Names never un-mangle.
    assert_eq!(ctx.scopes.get_alias(inner, "x"), "x_1");
}

#[test]
fn append_node_falls_back_to_root() {
    let mut scopes = ScopeStack::new();
    scopes.append_node(ScopeId::ROOT, ZigNode::Continue);
    assert_eq!(scopes.root_nodes_mut().len(), 1);

    let block = scopes.push_block(ScopeId::ROOT);
    let loop_scope = scopes.push_loop(block);
    scopes.append_node(loop_scope, ZigNode::Continue);
    assert_eq!(scopes.block(block).stmts.len(), 1);
}

#[test]
fn condition_scope_materializes_block_on_demand() {
    let mut scopes = ScopeStack::new();
    let cond = scopes.push_condition(ScopeId::ROOT);
    match &scopes.get(cond).kind {
        ScopeKind::Condition { block } => assert!(block.is_none()),
        _ => panic!("expected condition scope"),
    }
    let materialized = scopes.find_block_scope(cond).unwrap();
    match &scopes.get(cond).kind {
        ScopeKind::Condition { block } => assert_eq!(*block, Some(materialized)),
        _ => panic!("expected condition scope"),
    }
    // A second walk reuses the same block.
    assert_eq!(scopes.find_block_scope(cond), Some(materialized));
}

#[test]
fn breakable_scope_skips_blocks_and_conditions() {
    let mut scopes = ScopeStack::new();
    let loop_scope = scopes.push_loop(ScopeId::ROOT);
    let block = scopes.push_block(loop_scope);
    let cond = scopes.push_condition(block);
    assert_eq!(scopes.breakable_scope(cond), loop_scope);

    let switch_scope = scopes.push_switch(block);
    let inner = scopes.push_block(switch_scope);
    assert_eq!(scopes.breakable_scope(inner), switch_scope);
    // `continue` ignores the switch.
    assert_eq!(scopes.loop_scope(inner), loop_scope);
}
