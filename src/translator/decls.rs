//! Declaration visiting.
//!
//! `ensure_decl` is the single entry: it answers from the decl table when
//! the decl was already translated, otherwise dispatches on the decl kind
//! and force-translates on the spot. Unsupported constructs are converted to
//! `@compileError` stubs right here, at the decl boundary, and translation
//! moves on.

use log::debug;
use thin_vec::ThinVec;

use crate::c_ast::{CDeclId, CDeclKind, CExprKind, CLiteral, CQualTypeId, CTypeKind, StorageClass};
use crate::error::TranslationError;
use crate::translator::types::builtin_typedef_target;
use crate::translator::{Context, ScopeId};
use crate::zig_ast::{
    ContainerKind, ZigFnDecl, ZigField, ZigNode, ZigParam, ZigVarDecl,
};

type TransResult<T = ()> = Result<T, TranslationError>;

impl Context<'_> {
    /// Translate one top-level declaration, recovering from failures.
    pub fn visit_top_decl(&mut self, decl: CDeclId) {
        let _ = self.ensure_decl(decl);
    }

    /// The emitted Zig name of a declaration, translating it first if
    /// needed. Errors have already produced a diagnostic stub when this
    /// returns `Err`.
    pub fn decl_zig_name(&mut self, decl: CDeclId) -> TransResult<String> {
        self.ensure_decl(decl)
    }

    fn ensure_decl(&mut self, decl: CDeclId) -> TransResult<String> {
        if let Some(name) = self.decl_table.get(&decl) {
            return Ok(name.clone());
        }
        if self.failed_decls.contains(&decl) {
            return Err(TranslationError::unsupported(
                "declaration previously failed to translate",
                None,
            ));
        }
        let kind = self.ast.decl(decl).kind.clone();
        let result = match kind {
            CDeclKind::Function { .. } => self.trans_function(decl),
            CDeclKind::Variable { .. } => self.trans_variable(decl),
            CDeclKind::Typedef { .. } => self.trans_typedef(decl),
            CDeclKind::Record { .. } => self.trans_record_decl(decl),
            CDeclKind::Enum { .. } => self.trans_enum_decl(decl),
            CDeclKind::EnumConstant { .. } => {
                let parent = self.enum_parent(decl).ok_or_else(|| {
                    TranslationError::unsupported("enum constant without an enum", None)
                })?;
                self.ensure_decl(parent)?;
                return self.decl_table.get(&decl).cloned().ok_or_else(|| {
                    TranslationError::unsupported("enum constant not registered", None)
                });
            }
            CDeclKind::Field { .. } => Err(TranslationError::unsupported(
                "field translated outside its record",
                None,
            )),
        };
        match result {
            Ok(name) => Ok(name),
            Err(err) => {
                self.failed_decls.insert(decl);
                // Reuse the name the decl already claimed; only mangle a
                // fresh one when translation failed before naming it.
                let name = match self.decl_table.get(&decl) {
                    Some(name) => name.clone(),
                    None => {
                        let c_name = self
                            .ast
                            .decl_name(decl)
                            .map(str::to_string)
                            .unwrap_or_else(|| self.fresh_name("anon"));
                        self.make_root_name(&c_name)
                    }
                };
                self.emit_failed_decl(&name, &err);
                Err(err)
            }
        }
    }

    fn trans_function(&mut self, decl: CDeclId) -> TransResult<String> {
        let CDeclKind::Function {
            name: c_name,
            typ,
            parameters,
            body,
            storage,
            is_inline,
            is_defn: _,
        } = self.ast.decl(decl).kind.clone()
        else {
            unreachable!()
        };
        let loc = self.ast.decl(decl).loc.clone();

        // Attributed/paren sugar around the prototype is transparent.
        let fn_ty = self.ast.resolve_type(typ);
        let CTypeKind::Function {
            ret,
            params: param_types,
            is_variadic,
            is_noreturn,
        } = self.ast.type_kind(fn_ty).clone()
        else {
            return Err(TranslationError::unsupported_type(
                "function decl without function type",
                loc,
            ));
        };

        let mut has_body = body.is_some();
        let is_static = matches!(storage, StorageClass::Static) || is_inline;

        // Zig cannot express a variadic function body.
        if is_variadic && has_body {
            self.warn_at(
                ScopeId::ROOT,
                loc.as_ref(),
                &format!(
                    "unable to translate variadic function {}, demoted to extern declaration",
                    c_name
                ),
            );
            has_body = false;
        }

        let fn_ctx = crate::translator::FnDeclContext {
            name: c_name.clone(),
            storage,
            has_body,
            is_pub: !is_static,
            is_export: has_body && !is_static,
        };

        let name = self.make_root_name(&fn_ctx.name);
        self.decl_table.insert(decl, name.clone());
        debug!("function {} -> {}", c_name, name);

        let fn_block = self.scopes.push_block(ScopeId::ROOT);
        let mut zig_params: ThinVec<ZigParam> = ThinVec::new();
        let mut prologue: Vec<ZigNode> = Vec::new();

        for (i, param_qt) in param_types.iter().enumerate() {
            let param_decl = parameters.get(i).copied();
            let c_param_name = param_decl
                .and_then(|p| self.ast.decl_name(p).map(str::to_string))
                .unwrap_or_default();
            let ty = self.trans_qual_type(fn_block, *param_qt, loc.as_ref())?;

            if !has_body {
                zig_params.push(ZigParam {
                    name: (!c_param_name.is_empty()).then_some(c_param_name),
                    ty,
                    is_noalias: false,
                });
                continue;
            }

            // C parameters are mutable; Zig parameters are not. Non-const
            // parameters get a shadow `arg_` name and a local `var`.
            if param_qt.is_const() || c_param_name.is_empty() {
                let local = if c_param_name.is_empty() {
                    self.make_local_name(fn_block, "arg")
                } else {
                    self.make_local_name(fn_block, &c_param_name)
                };
                if let Some(p) = param_decl {
                    self.decl_table.insert(p, local.clone());
                }
                zig_params.push(ZigParam {
                    name: Some(local),
                    ty,
                    is_noalias: false,
                });
            } else {
                let arg_name = self.make_local_name(fn_block, &format!("arg_{}", c_param_name));
                let local = self.make_local_name(fn_block, &c_param_name);
                if let Some(p) = param_decl {
                    self.decl_table.insert(p, local.clone());
                }
                prologue.push(ZigNode::VarDecl(ZigVarDecl {
                    name: local,
                    init: Some(Box::new(ZigNode::ident(arg_name.clone()))),
                    ..ZigVarDecl::default()
                }));
                zig_params.push(ZigParam {
                    name: Some(arg_name),
                    ty,
                    is_noalias: false,
                });
            }
        }

        let ret_node = self.trans_return_type(fn_block, ret, is_noreturn, loc.as_ref())?;

        let body_node = if has_body {
            let body_stmt = body.expect("has_body");
            let saved_ret = self.current_fn_ret;
            self.current_fn_ret = Some(ret);
            let result = (|| -> TransResult<Vec<ZigNode>> {
                for item in self.ast.compound_stmts(body_stmt) {
                    self.trans_stmt(fn_block, item)?;
                }
                Ok(std::mem::take(&mut self.scopes.block_mut(fn_block).stmts))
            })();
            self.current_fn_ret = saved_ret;
            let mut stmts = prologue;
            stmts.extend(result?);

            // Falling off the end of a value-returning function.
            let returns_value = !is_noreturn
                && !matches!(self.ast.resolved_kind(ret.ctype), CTypeKind::Void);
            let ends_with_return = matches!(stmts.last(), Some(ZigNode::Return(_)));
            if returns_value && !ends_with_return {
                let ret_ty = self.trans_return_type(fn_block, ret, false, loc.as_ref())?;
                stmts.push(ZigNode::Return(Some(Box::new(ZigNode::zeroes(ret_ty)))));
            }
            Some(Box::new(ZigNode::block(stmts)))
        } else {
            None
        };

        let fn_node = ZigNode::FnDecl(ZigFnDecl {
            is_pub: fn_ctx.is_pub,
            is_extern: !fn_ctx.has_body,
            is_export: fn_ctx.is_export,
            is_inline: false,
            name: name.clone(),
            params: zig_params,
            is_var_args: is_variadic && !fn_ctx.has_body,
            return_ty: Box::new(ret_node),
            explicit_callconv: is_static && fn_ctx.has_body,
            body: body_node,
        });
        self.scopes.root_nodes_mut().push(fn_node);
        Ok(name)
    }

    fn trans_variable(&mut self, decl: CDeclId) -> TransResult<String> {
        let CDeclKind::Variable {
            name: c_name,
            typ,
            initializer,
            storage,
            is_defn,
        } = self.ast.decl(decl).kind.clone()
        else {
            unreachable!()
        };
        let loc = self.ast.decl(decl).loc.clone();

        let name = self.make_root_name(&c_name);
        self.decl_table.insert(decl, name.clone());

        let is_extern = matches!(storage, StorageClass::Extern) && initializer.is_none();
        let is_static = matches!(storage, StorageClass::Static);

        let ty_node = self.var_type_node(ScopeId::ROOT, typ, initializer, loc.as_ref())?;
        let init_node = match initializer {
            Some(init) => Some(Box::new(self.var_init_node(ScopeId::ROOT, typ, init)?)),
            None if is_extern => None,
            None => {
                // Tentative definitions zero-initialize.
                let _ = is_defn;
                let zeroed = self.var_type_node(ScopeId::ROOT, typ, None, loc.as_ref())?;
                Some(Box::new(ZigNode::zeroes(zeroed)))
            }
        };

        let node = ZigNode::VarDecl(ZigVarDecl {
            is_pub: true,
            is_const: typ.is_const(),
            is_extern,
            is_export: !is_extern && !is_static,
            is_threadlocal: false,
            name: name.clone(),
            ty: Some(Box::new(ty_node)),
            init: init_node,
        });
        self.scopes.root_nodes_mut().push(node);
        Ok(name)
    }

    /// The declared type, with incomplete array lengths recovered from the
    /// initializer: string literals count their NUL, init lists count their
    /// elements.
    fn var_type_node(
        &mut self,
        scope: ScopeId,
        typ: CQualTypeId,
        initializer: Option<crate::c_ast::CExprId>,
        loc: Option<&crate::c_ast::SourceLoc>,
    ) -> TransResult<ZigNode> {
        if let CTypeKind::IncompleteArray(elem) = self.ast.resolved_kind(typ.ctype).clone()
            && let Some(init) = initializer
        {
            let len = match &self.ast.expr(init).kind {
                CExprKind::Literal(_, CLiteral::String(bytes, width)) => {
                    Some(bytes.len() as u64 / *width as u64 + 1)
                }
                CExprKind::InitList(_, items, _) => Some(items.len() as u64),
                _ => None,
            };
            if let Some(len) = len {
                let elem_node = self.trans_type(scope, elem, loc)?;
                return Ok(ZigNode::ArrayType {
                    len: Some(Box::new(ZigNode::int(len.to_string()))),
                    elem: Box::new(elem_node),
                });
            }
        }
        self.trans_qual_type(scope, typ, loc)
    }

    /// Initializer translation shared by globals and locals.
    fn var_init_node(
        &mut self,
        scope: ScopeId,
        typ: CQualTypeId,
        init: crate::c_ast::CExprId,
    ) -> TransResult<ZigNode> {
        // Character arrays initialized from a string literal.
        if let CTypeKind::ConstantArray(elem, len) = self.ast.resolved_kind(typ.ctype).clone()
            && let CExprKind::Literal(_, CLiteral::String(bytes, 1)) =
                &self.ast.expr(init).kind
        {
            let bytes = bytes.clone();
            let elem_node = self.trans_type(scope, elem, None)?;
            return Ok(self.array_from_string(elem_node, len, &bytes));
        }
        if let CTypeKind::IncompleteArray(elem) = self.ast.resolved_kind(typ.ctype).clone()
            && let CExprKind::Literal(_, CLiteral::String(bytes, 1)) =
                &self.ast.expr(init).kind
        {
            let bytes = bytes.clone();
            let elem_node = self.trans_type(scope, elem, None)?;
            let len = bytes.len() as u64 + 1;
            return Ok(self.array_from_string(elem_node, len, &bytes));
        }

        let mut node = self.trans_expr_coercing(scope, init)?;
        if !self.ast.is_bool(typ.ctype) {
            node = self.int_from_bool(node);
        }
        Ok(node)
    }

    fn trans_typedef(&mut self, decl: CDeclId) -> TransResult<String> {
        let CDeclKind::Typedef { name: c_name, typ } = self.ast.decl(decl).kind.clone() else {
            unreachable!()
        };
        let loc = self.ast.decl(decl).loc.clone();

        // Fixed-width names short-circuit to the Zig primitive and emit
        // nothing.
        if let Some(primitive) = builtin_typedef_target(&c_name) {
            self.decl_table.insert(decl, primitive.to_string());
            return Ok(primitive.to_string());
        }

        let name = self.make_root_name(&c_name);
        self.decl_table.insert(decl, name.clone());
        let ty_node = self.trans_qual_type(ScopeId::ROOT, typ, loc.as_ref())?;
        self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
            is_pub: true,
            is_const: true,
            name: name.clone(),
            init: Some(Box::new(ty_node)),
            ..ZigVarDecl::default()
        }));
        Ok(name)
    }

    pub fn trans_record_decl(&mut self, decl: CDeclId) -> TransResult<String> {
        let CDeclKind::Record {
            name: c_name,
            fields,
            is_union,
        } = self.ast.decl(decl).kind.clone()
        else {
            unreachable!()
        };
        let loc = self.ast.decl(decl).loc.clone();
        let keyword = if is_union { "union" } else { "struct" };

        let name = match &c_name {
            Some(tag) => {
                let name = self.make_root_name(&format!("{}_{}", keyword, tag));
                self.alias_list.push((tag.clone(), name.clone()));
                name
            }
            None => {
                let base = format!("{}_unnamed", keyword);
                let name = self.fresh_name(&base);
                self.scopes.bind_root(name.clone());
                name
            }
        };
        // Registered before the fields so self-referencing pointers resolve.
        self.decl_table.insert(decl, name.clone());

        let Some(field_ids) = fields else {
            // Forward declaration only: layout unknown.
            self.opaque_decls.insert(decl);
            self.emit_opaque(&name);
            return Ok(name);
        };

        let mut zig_fields: ThinVec<ZigField> = ThinVec::new();
        let mut demote_reason: Option<String> = None;
        for (i, field_id) in field_ids.iter().enumerate() {
            let CDeclKind::Field {
                name: field_name,
                typ,
                bitfield_width,
                alignment,
            } = self.ast.decl(*field_id).kind.clone()
            else {
                continue;
            };
            if bitfield_width.is_some() {
                demote_reason = Some("bit fields".to_string());
                break;
            }
            if matches!(
                self.ast.resolved_kind(typ.ctype),
                CTypeKind::IncompleteArray(_)
            ) {
                demote_reason = Some("flexible array member".to_string());
                break;
            }
            let emitted_name = match field_name {
                Some(n) => n,
                None => format!("unnamed_{}", i),
            };
            match self.trans_qual_type(ScopeId::ROOT, typ, loc.as_ref()) {
                Ok(ty) => {
                    self.decl_table.insert(*field_id, emitted_name.clone());
                    zig_fields.push(ZigField {
                        name: emitted_name,
                        ty: Some(ty),
                        align: alignment,
                    });
                }
                Err(err) => {
                    demote_reason = Some(format!("field {}: {}", emitted_name, err));
                    break;
                }
            }
        }

        if let Some(reason) = demote_reason {
            self.opaque_decls.insert(decl);
            let tag = c_name.as_deref().unwrap_or("(anonymous)");
            self.warn_at(
                ScopeId::ROOT,
                loc.as_ref(),
                &format!("{} {} demoted to opaque: {}", keyword, tag, reason),
            );
            self.emit_opaque(&name);
            return Ok(name);
        }

        let container = ZigNode::ContainerDecl {
            kind: if is_union {
                ContainerKind::Union
            } else {
                ContainerKind::Struct
            },
            is_extern: true,
            fields: zig_fields,
        };
        self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
            is_pub: true,
            is_const: true,
            name: name.clone(),
            init: Some(Box::new(container)),
            ..ZigVarDecl::default()
        }));
        Ok(name)
    }

    fn emit_opaque(&mut self, name: &str) {
        self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
            is_pub: true,
            is_const: true,
            name: name.to_string(),
            init: Some(Box::new(ZigNode::ContainerDecl {
                kind: ContainerKind::Opaque,
                is_extern: false,
                fields: ThinVec::new(),
            })),
            ..ZigVarDecl::default()
        }));
    }

    pub fn trans_enum_decl(&mut self, decl: CDeclId) -> TransResult<String> {
        let CDeclKind::Enum {
            name: c_name,
            enumerators,
            integral_type,
        } = self.ast.decl(decl).kind.clone()
        else {
            unreachable!()
        };
        let loc = self.ast.decl(decl).loc.clone();

        let name = match &c_name {
            Some(tag) => {
                let name = self.make_root_name(&format!("enum_{}", tag));
                self.alias_list.push((tag.clone(), name.clone()));
                name
            }
            None => {
                let name = self.fresh_name("enum_unnamed");
                self.scopes.bind_root(name.clone());
                name
            }
        };
        self.decl_table.insert(decl, name.clone());

        let tag_qt = integral_type.unwrap_or_else(|| CQualTypeId::new(self.int_type_id()));
        let tag_node = self.trans_qual_type(ScopeId::ROOT, tag_qt, loc.as_ref())?;

        let all_implicit = enumerators.iter().all(|&e| {
            matches!(
                self.ast.decl(e).kind,
                CDeclKind::EnumConstant {
                    is_explicit: false,
                    ..
                }
            )
        });

        if all_implicit && !enumerators.is_empty() {
            // Tag-only enum, plus a top-level alias per enumerator since C
            // enumerators are globally visible.
            let mut fields: ThinVec<ZigField> = ThinVec::new();
            let mut aliases: Vec<(CDeclId, String, String)> = Vec::new();
            for &variant in &enumerators {
                let CDeclKind::EnumConstant { name: vn, .. } = self.ast.decl(variant).kind.clone()
                else {
                    continue;
                };
                fields.push(ZigField {
                    name: vn.clone(),
                    ty: None,
                    align: None,
                });
                let top = self.make_root_name(&vn);
                self.decl_table.insert(variant, top.clone());
                aliases.push((variant, vn, top));
            }
            self.tagged_enums.insert(decl);
            self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
                is_pub: true,
                is_const: true,
                name: name.clone(),
                init: Some(Box::new(ZigNode::ContainerDecl {
                    kind: ContainerKind::Enum(Box::new(tag_node)),
                    is_extern: false,
                    fields,
                })),
                ..ZigVarDecl::default()
            }));
            for (_, vn, top) in aliases {
                self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
                    is_pub: true,
                    is_const: true,
                    name: top,
                    init: Some(Box::new(ZigNode::field(ZigNode::ident(name.clone()), vn))),
                    ..ZigVarDecl::default()
                }));
            }
            return Ok(name);
        }

        // At least one explicit value: individually typed constants plus the
        // tag type under the enum's name.
        for &variant in &enumerators {
            let CDeclKind::EnumConstant { name: vn, value, .. } =
                self.ast.decl(variant).kind.clone()
            else {
                continue;
            };
            let top = self.make_root_name(&vn);
            self.decl_table.insert(variant, top.clone());
            let value_node = if value < 0 {
                ZigNode::Negate(Box::new(ZigNode::int(value.unsigned_abs().to_string())))
            } else {
                ZigNode::int(value.to_string())
            };
            self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
                is_pub: true,
                is_const: true,
                name: top,
                ty: Some(Box::new(tag_node.clone())),
                init: Some(Box::new(value_node)),
                ..ZigVarDecl::default()
            }));
        }
        self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
            is_pub: true,
            is_const: true,
            name: name.clone(),
            init: Some(Box::new(tag_node)),
            ..ZigVarDecl::default()
        }));
        Ok(name)
    }

    /// Block-scope declarations.
    pub fn trans_local_decl(&mut self, scope: ScopeId, decl: CDeclId) -> TransResult {
        let kind = self.ast.decl(decl).kind.clone();
        let loc = self.ast.decl(decl).loc.clone();
        match kind {
            CDeclKind::Variable {
                name: c_name,
                typ,
                initializer,
                storage,
                ..
            } => {
                if matches!(storage, StorageClass::Static) {
                    return self.trans_static_local(scope, decl, &c_name, typ, initializer);
                }
                let block = self.scopes.find_block_scope(scope).ok_or_else(|| {
                    TranslationError::unsupported("local declaration outside block", loc.clone())
                })?;
                let name = self.make_local_name(block, &c_name);
                self.decl_table.insert(decl, name.clone());
                let ty_node = self.var_type_node(scope, typ, initializer, loc.as_ref())?;
                let init_node = match initializer {
                    Some(init) => self.var_init_node(scope, typ, init)?,
                    None => ZigNode::Undefined,
                };
                self.scopes.append_node(
                    scope,
                    ZigNode::VarDecl(ZigVarDecl {
                        is_const: typ.is_const(),
                        name,
                        ty: Some(Box::new(ty_node)),
                        init: Some(Box::new(init_node)),
                        ..ZigVarDecl::default()
                    }),
                );
                Ok(())
            }
            CDeclKind::Typedef { .. } | CDeclKind::Record { .. } | CDeclKind::Enum { .. } => {
                // Hoisted to the root with a mangled name.
                self.ensure_decl(decl)?;
                Ok(())
            }
            _ => Err(TranslationError::unsupported(
                "unexpected local declaration kind",
                loc,
            )),
        }
    }

    /// `static` locals hoist to a mangled top-level var; the block name
    /// aliases to it.
    fn trans_static_local(
        &mut self,
        scope: ScopeId,
        decl: CDeclId,
        c_name: &str,
        typ: CQualTypeId,
        initializer: Option<crate::c_ast::CExprId>,
    ) -> TransResult {
        let loc = self.ast.decl(decl).loc.clone();
        let hoisted = if self.contains(scope, c_name) {
            loop {
                self.mangle_count += 1;
                let candidate = format!("{}_{}", c_name, self.mangle_count);
                if !self.contains(scope, &candidate) {
                    break candidate;
                }
            }
        } else {
            c_name.to_string()
        };
        self.scopes.bind_root(hoisted.clone());
        if let Some(block) = self.scopes.find_block_scope(scope) {
            self.scopes
                .block_mut(block)
                .aliases
                .push((c_name.to_string(), hoisted.clone()));
        }
        self.decl_table.insert(decl, hoisted.clone());

        let ty_node = self.var_type_node(ScopeId::ROOT, typ, initializer, loc.as_ref())?;
        let init_node = match initializer {
            Some(init) => self.var_init_node(ScopeId::ROOT, typ, init)?,
            None => {
                let ty = self.var_type_node(ScopeId::ROOT, typ, None, loc.as_ref())?;
                ZigNode::zeroes(ty)
            }
        };
        self.scopes.root_nodes_mut().push(ZigNode::VarDecl(ZigVarDecl {
            is_const: typ.is_const(),
            name: hoisted,
            ty: Some(Box::new(ty_node)),
            init: Some(Box::new(init_node)),
            ..ZigVarDecl::default()
        }));
        Ok(())
    }

    /// The `int` type id, for defaulted enum tags.
    fn int_type_id(&self) -> crate::c_ast::CTypeId {
        for (i, ty) in self.ast.types.iter().enumerate() {
            if matches!(ty.kind, CTypeKind::Int) {
                return crate::c_ast::CTypeId::new(i as u32 + 1).unwrap();
            }
        }
        // A unit without `int` anywhere cannot reach here through an enum.
        panic!("ICE: translation unit has no int type");
    }

    /// Shared string-to-array fill.
    pub(crate) fn array_from_string(
        &mut self,
        elem_ty: ZigNode,
        len: u64,
        bytes: &[u8],
    ) -> ZigNode {
        let mut units: ThinVec<ZigNode> = bytes
            .iter()
            .take(len as usize)
            .map(|&b| ZigNode::CharLiteral(b as u32))
            .collect();
        while (units.len() as u64) < len {
            units.push(ZigNode::int("0"));
        }
        ZigNode::ArrayLit {
            ty: Box::new(ZigNode::ArrayType {
                len: Some(Box::new(ZigNode::int(len.to_string()))),
                elem: Box::new(elem_ty),
            }),
            items: units,
        }
    }
}
