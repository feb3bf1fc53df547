//! Macro translation.
//!
//! The semantic front-end has discarded macros by the time it produces its
//! AST, so `#define` records arrive as raw source text. A C tokenizer runs
//! over each body, a precedence-climbing parser turns the token stream into
//! Zig nodes, and a post-pass rewrites macros that alias function-pointer
//! globals into callable inline wrappers.

pub mod lexer;
pub mod parser;

use log::debug;
use thin_vec::ThinVec;

use crate::c_ast::{CTypeKind, MacroRecord};
use crate::error::TranslationError;
use crate::translator::{Context, ScopeId};
use crate::zig_ast::{ZigFnDecl, ZigNode, ZigParam, ZigVarDecl};

use lexer::{MacroToken, MacroTokenKind, tokenize};
use parser::MacroParser;

/// Translate every macro record; runs after all decls so mangling sees the
/// full decl-name set.
pub fn translate_macros(ctx: &mut Context) {
    let records: Vec<MacroRecord> = ctx.ast.macros.clone();
    // Object-like macros whose value is a bare identifier; candidates for
    // the function-alias rewrite.
    let mut alias_candidates: Vec<(String, String)> = Vec::new();

    for record in &records {
        // A macro that redefines an emitted decl name adds nothing.
        if ctx.scopes.root_symbols().contains(&record.name) {
            debug!("skipping macro {} shadowing a declaration", record.name);
            continue;
        }
        match translate_one_macro(ctx, record) {
            Ok(Some((zig_name, ZigNode::Identifier(target)))) => {
                alias_candidates.push((zig_name, target));
            }
            Ok(_) => {}
            Err(err) => {
                ctx.warn_at(
                    ScopeId::ROOT,
                    record.loc.as_ref(),
                    &format!("unable to translate macro {}: {}", record.name, err),
                );
            }
        }
    }

    rewrite_function_aliases(ctx, &alias_candidates);
}

/// Translate one record. Returns the emitted name and value for object-like
/// macros so the caller can consider the alias rewrite.
fn translate_one_macro(
    ctx: &mut Context,
    record: &MacroRecord,
) -> Result<Option<(String, ZigNode)>, TranslationError> {
    let tokens = tokenize(&record.source, record.loc.as_ref())?;
    let mut pos = 0;

    let Some(MacroToken {
        kind: MacroTokenKind::Identifier(name),
        ..
    }) = tokens.first()
    else {
        return Err(TranslationError::unsupported(
            "macro record does not start with its name",
            record.loc.clone(),
        ));
    };
    let name_end = tokens[0].end;
    pos += 1;

    // Function-like iff `(` is immediately adjacent to the name.
    let is_function_like = matches!(
        tokens.get(pos),
        Some(MacroToken {
            kind: MacroTokenKind::LParen,
            start,
            ..
        }) if *start == name_end
    );

    let mut params: Vec<String> = Vec::new();
    if is_function_like {
        pos += 1; // (
        loop {
            match tokens.get(pos).map(|t| &t.kind) {
                Some(MacroTokenKind::RParen) => {
                    pos += 1;
                    break;
                }
                Some(MacroTokenKind::Identifier(p)) => {
                    params.push(p.clone());
                    pos += 1;
                    if matches!(tokens.get(pos).map(|t| &t.kind), Some(MacroTokenKind::Comma)) {
                        pos += 1;
                    }
                }
                Some(MacroTokenKind::Ellipsis) => {
                    return Err(TranslationError::unsupported(
                        "variadic macro",
                        record.loc.clone(),
                    ));
                }
                _ => {
                    return Err(TranslationError::unsupported(
                        "malformed macro parameter list",
                        record.loc.clone(),
                    ));
                }
            }
        }
    }

    // `#define FOO` with no body translates to nothing.
    if matches!(tokens.get(pos).map(|t| &t.kind), None | Some(MacroTokenKind::Eof)) {
        return Ok(None);
    }

    let body_tokens = &tokens[pos..];
    let zig_name = ctx.make_root_name(name);

    let mut parser = MacroParser::new(ctx, &zig_name, body_tokens, &params, record.loc.as_ref());
    let body = parser.parse_expr()?;
    parser.expect_fully_consumed()?;

    if is_function_like {
        let fn_params: ThinVec<ZigParam> = params
            .iter()
            .map(|p| ZigParam {
                name: Some(p.clone()),
                ty: ZigNode::ident("anytype"),
                is_noalias: false,
            })
            .collect();
        let node = ZigNode::FnDecl(ZigFnDecl {
            is_pub: true,
            is_extern: false,
            is_export: false,
            is_inline: true,
            name: zig_name,
            params: fn_params,
            is_var_args: false,
            return_ty: Box::new(ZigNode::builtin("TypeOf", [body.clone()])),
            explicit_callconv: false,
            body: Some(Box::new(ZigNode::block([ZigNode::Return(Some(Box::new(
                body,
            )))]))),
        });
        ctx.scopes.root_nodes_mut().push(node);
        return Ok(None);
    }

    let node = ZigNode::VarDecl(ZigVarDecl {
        is_pub: true,
        is_const: true,
        name: zig_name.clone(),
        init: Some(Box::new(body.clone())),
        ..ZigVarDecl::default()
    });
    ctx.scopes.root_nodes_mut().push(node);
    Ok(Some((zig_name, body)))
}

/// `#define foo bar` where `bar` is a global of function-pointer type:
/// replace the alias with an inline wrapper that unwraps the pointer and
/// forwards all arguments, so `foo(x)` stays callable syntax.
fn rewrite_function_aliases(ctx: &mut Context, candidates: &[(String, String)]) {
    for (zig_name, target) in candidates {
        let Some(&decl) = ctx.global_name_decls.get(target) else {
            continue;
        };
        let Some(target_name) = ctx.decl_table.get(&decl).cloned() else {
            continue;
        };
        let var_ty = match &ctx.ast.decl(decl).kind {
            crate::c_ast::CDeclKind::Variable { typ, .. } => *typ,
            _ => continue,
        };
        let Some(fn_ty) = ctx.ast.function_pointee(var_ty.ctype) else {
            continue;
        };
        let CTypeKind::Function {
            ret,
            params,
            is_variadic,
            is_noreturn,
        } = ctx.ast.type_kind(fn_ty).clone()
        else {
            continue;
        };
        if is_variadic {
            continue;
        }

        let mut fn_params: ThinVec<ZigParam> = ThinVec::new();
        let mut args: ThinVec<ZigNode> = ThinVec::new();
        let mut ok = true;
        for (i, param) in params.iter().enumerate() {
            match ctx.trans_qual_type(ScopeId::ROOT, *param, None) {
                Ok(ty) => {
                    let arg = format!("arg_{}", i);
                    args.push(ZigNode::ident(arg.clone()));
                    fn_params.push(ZigParam {
                        name: Some(arg),
                        ty,
                        is_noalias: false,
                    });
                }
                Err(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if !ok {
            continue;
        }
        let Ok(ret_ty) = ctx.trans_return_type(ScopeId::ROOT, ret, is_noreturn, None) else {
            continue;
        };

        let call = ZigNode::Call {
            callee: Box::new(ZigNode::Unwrap(Box::new(ZigNode::ident(target_name)))),
            args,
        };
        let wrapper = ZigNode::FnDecl(ZigFnDecl {
            is_pub: true,
            is_extern: false,
            is_export: false,
            is_inline: true,
            name: zig_name.clone(),
            params: fn_params,
            is_var_args: false,
            return_ty: Box::new(ret_ty),
            explicit_callconv: false,
            body: Some(Box::new(ZigNode::block([ZigNode::Return(Some(Box::new(
                call,
            )))]))),
        });

        let slot = ctx
            .scopes
            .root_nodes_mut()
            .iter_mut()
            .find(|node| matches!(node, ZigNode::VarDecl(ZigVarDecl { name, .. }) if name == zig_name));
        if let Some(slot) = slot {
            *slot = wrapper;
        }
    }
}
