//! Statement lowering.
//!
//! Statements append themselves to the innermost block of the active scope
//! chain. Loops push a loop scope for break/continue targeting; `switch`
//! lowers to a dispatch switch inside nested labeled segment blocks, which
//! preserves C fallthrough while keeping `break` a labeled break.

use log::debug;
use thin_vec::ThinVec;

use crate::c_ast::{CStmtId, CStmtKind};
use crate::error::TranslationError;
use crate::translator::{Context, ResultUsed, ScopeId};
use crate::zig_ast::{SwitchProng, ZigNode};

type TransResult<T = ()> = Result<T, TranslationError>;

impl Context<'_> {
    pub fn trans_stmt(&mut self, scope: ScopeId, stmt: CStmtId) -> TransResult {
        let node = self.ast.stmt(stmt).clone();
        let loc = node.loc.as_ref();
        match node.kind {
            CStmtKind::Compound(_) => {
                let block = self.trans_compound(scope, stmt, None)?;
                self.scopes.append_node(scope, block);
                Ok(())
            }
            CStmtKind::Expr(expr) => {
                let value = self.trans_expr(scope, expr, ResultUsed::Unused)?;
                let stmt_node = self.stmt_from_expr(value, self.expr_is_void(expr));
                self.scopes.append_node(scope, stmt_node);
                Ok(())
            }
            CStmtKind::Empty => Ok(()),
            CStmtKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                let cond_node = self.trans_condition(scope, cond)?;
                let then_node = self.trans_stmt_node(scope, then_stmt)?;
                let else_node = match else_stmt {
                    Some(els) => Some(Box::new(self.trans_stmt_node(scope, els)?)),
                    None => None,
                };
                self.scopes.append_node(
                    scope,
                    ZigNode::If {
                        cond: Box::new(cond_node),
                        then_body: Box::new(then_node),
                        else_body: else_node,
                    },
                );
                Ok(())
            }
            CStmtKind::While { cond, body } => {
                let loop_scope = self.scopes.push_loop(scope);
                let cond_node = self.trans_condition(loop_scope, cond)?;
                let body_node = self.trans_stmt_node(loop_scope, body)?;
                self.scopes.append_node(
                    scope,
                    ZigNode::While {
                        cond: Box::new(cond_node),
                        cont: None,
                        body: Box::new(body_node),
                    },
                );
                Ok(())
            }
            CStmtKind::DoWhile { body, cond } => self.trans_do_while(scope, body, cond),
            CStmtKind::For {
                init,
                cond,
                inc,
                body,
            } => self.trans_for(scope, init, cond, inc, body),
            CStmtKind::Switch { cond, body } => self.trans_switch(scope, cond, body),
            CStmtKind::Case(expr, sub) => self.trans_case(scope, Some(expr), sub),
            CStmtKind::Default(sub) => self.trans_case(scope, None, sub),
            CStmtKind::Break => self.trans_break(scope),
            CStmtKind::Continue => {
                let _ = self.scopes.loop_scope(scope);
                self.scopes.append_node(scope, ZigNode::Continue);
                Ok(())
            }
            CStmtKind::Return(value) => {
                let value_node = match value {
                    Some(expr) => {
                        let mut node = self.trans_expr_coercing(scope, expr)?;
                        let ret_is_bool = self
                            .current_fn_ret
                            .is_some_and(|qt| self.ast.is_bool(qt.ctype));
                        if !ret_is_bool {
                            node = self.int_from_bool(node);
                        }
                        Some(Box::new(node))
                    }
                    None => None,
                };
                self.scopes.append_node(scope, ZigNode::Return(value_node));
                Ok(())
            }
            CStmtKind::Decls(ref decls) => {
                for &decl in decls {
                    self.trans_local_decl(scope, decl)?;
                }
                Ok(())
            }
            CStmtKind::Label(ref name, _) => Err(TranslationError::unsupported(
                format!("label statement '{}'", name),
                loc.cloned(),
            )),
            CStmtKind::Goto(ref name) => Err(TranslationError::unsupported(
                format!("goto '{}'", name),
                loc.cloned(),
            )),
        }
    }

    /// Lower a compound statement into a (possibly labeled) block node.
    pub fn trans_compound(
        &mut self,
        scope: ScopeId,
        stmt: CStmtId,
        label: Option<String>,
    ) -> TransResult<ZigNode> {
        let block = self.scopes.push_block(scope);
        self.scopes.block_mut(block).label = label.clone();
        for item in self.ast.compound_stmts(stmt) {
            self.trans_stmt(block, item)?;
        }
        let stmts = std::mem::take(&mut self.scopes.block_mut(block).stmts);
        Ok(ZigNode::Block {
            label,
            stmts: stmts.into_iter().collect(),
        })
    }

    /// Lower a single statement into a standalone node without appending.
    fn trans_stmt_node(&mut self, scope: ScopeId, stmt: CStmtId) -> TransResult<ZigNode> {
        if matches!(self.ast.stmt(stmt).kind, CStmtKind::Compound(_)) {
            return self.trans_compound(scope, stmt, None);
        }
        let block = self.scopes.push_block(scope);
        self.trans_stmt(block, stmt)?;
        let mut stmts = std::mem::take(&mut self.scopes.block_mut(block).stmts);
        if stmts.len() == 1 {
            Ok(stmts.pop().unwrap())
        } else {
            Ok(ZigNode::block(stmts))
        }
    }

    /// `do { S } while (c);` -> `while (true) { S; if (!c) break; }`
    fn trans_do_while(
        &mut self,
        scope: ScopeId,
        body: CStmtId,
        cond: crate::c_ast::CExprId,
    ) -> TransResult {
        let loop_scope = self.scopes.push_loop(scope);
        let body_node = self.trans_stmt_node(loop_scope, body)?;
        let mut stmts: ThinVec<ZigNode> = match body_node {
            ZigNode::Block { label: None, stmts } => stmts,
            other => std::iter::once(other).collect(),
        };
        let cond_node = self.trans_condition(loop_scope, cond)?;
        stmts.push(ZigNode::If {
            cond: Box::new(ZigNode::Not(Box::new(cond_node))),
            then_body: Box::new(ZigNode::Break {
                label: None,
                value: None,
            }),
            else_body: None,
        });
        self.scopes.append_node(
            scope,
            ZigNode::While {
                cond: Box::new(ZigNode::BoolLiteral(true)),
                cont: None,
                body: Box::new(ZigNode::Block {
                    label: None,
                    stmts,
                }),
            },
        );
        Ok(())
    }

    /// `for (init; cond; inc)` -> optional outer block holding the init,
    /// then `while (cond) : (inc) body`; the condition defaults to true.
    fn trans_for(
        &mut self,
        scope: ScopeId,
        init: Option<CStmtId>,
        cond: Option<crate::c_ast::CExprId>,
        inc: Option<crate::c_ast::CExprId>,
        body: CStmtId,
    ) -> TransResult {
        let outer = match init {
            Some(_) => self.scopes.push_block(scope),
            None => scope,
        };
        if let Some(init) = init {
            self.trans_stmt(outer, init)?;
        }

        let loop_scope = self.scopes.push_loop(outer);
        let cond_node = match cond {
            Some(cond) => self.trans_condition(loop_scope, cond)?,
            None => ZigNode::BoolLiteral(true),
        };
        let cont_node = match inc {
            Some(inc) => {
                let node = self.trans_expr(loop_scope, inc, ResultUsed::Unused)?;
                Some(Box::new(self.stmt_from_expr(node, self.expr_is_void(inc))))
            }
            None => None,
        };
        let body_node = self.trans_stmt_node(loop_scope, body)?;
        let while_node = ZigNode::While {
            cond: Box::new(cond_node),
            cont: cont_node,
            body: Box::new(body_node),
        };

        if init.is_some() {
            let mut stmts = std::mem::take(&mut self.scopes.block_mut(outer).stmts);
            stmts.push(while_node);
            self.scopes.append_node(scope, ZigNode::block(stmts));
        } else {
            self.scopes.append_node(scope, while_node);
        }
        Ok(())
    }

    /// See the module docs for the lowered switch shape.
    fn trans_switch(
        &mut self,
        scope: ScopeId,
        cond: crate::c_ast::CExprId,
        body: CStmtId,
    ) -> TransResult {
        let cond_scope = self.scopes.push_condition(scope);
        let cond_value = self.trans_expr(cond_scope, cond, ResultUsed::Used)?;
        let cond_node = {
            // Reuse the comma-blockification path of condition scopes.
            let wrapped = self.wrap_condition_value(cond_scope, cond_value)?;
            wrapped
        };

        let switch_scope = self.scopes.push_switch(scope);
        let pending = self.scopes.push_block(switch_scope);
        self.scopes.switch_mut(switch_scope).pending = Some(pending);

        for item in self.ast.compound_stmts(body) {
            self.trans_stmt(switch_scope, item)?;
        }
        self.finalize_switch_segment(switch_scope);

        let state = {
            let s = self.scopes.switch_mut(switch_scope);
            (
                std::mem::take(&mut s.prongs),
                std::mem::take(&mut s.segments),
                s.switch_label.clone(),
                s.default_label.clone(),
            )
        };
        let (prong_specs, segments, mut switch_label, default_label) = state;

        // The else prong jumps to the default segment, or out of the whole
        // switch when there is none.
        let else_target = match &default_label {
            Some(label) => label.clone(),
            None => match &switch_label {
                Some(label) => label.clone(),
                None => {
                    let label = self.fresh_name("sw");
                    switch_label = Some(label.clone());
                    label
                }
            },
        };

        let mut prongs: ThinVec<SwitchProng> = prong_specs
            .into_iter()
            .map(|(items, label)| SwitchProng {
                items,
                body: ZigNode::break_to(label, None),
            })
            .collect();
        prongs.push(SwitchProng {
            items: ThinVec::new(),
            body: ZigNode::break_to(else_target, None),
        });

        let dispatch = ZigNode::Switch {
            cond: Box::new(cond_node),
            prongs,
        };

        // Wrap the dispatch in the segment blocks, innermost first.
        let mut stmts: Vec<ZigNode> = vec![dispatch];
        for (label, segment_stmts) in segments {
            let wrapped = ZigNode::Block {
                label: Some(label),
                stmts: stmts.into_iter().collect(),
            };
            stmts = vec![wrapped];
            stmts.extend(segment_stmts);
        }
        self.scopes.append_node(
            scope,
            ZigNode::Block {
                label: switch_label,
                stmts: stmts.into_iter().collect(),
            },
        );
        Ok(())
    }

    fn wrap_condition_value(&mut self, cond_scope: ScopeId, value: ZigNode) -> TransResult<ZigNode> {
        // Same mechanics as boolean conditions: a comma operator inside the
        // controlling expression materialized a block to hold its side.
        self.wrap_materialized_condition(cond_scope, value)
    }

    /// Close off the statements accumulated since the last case label.
    fn finalize_switch_segment(&mut self, switch_scope: ScopeId) {
        let pending = self.scopes.switch_mut(switch_scope).pending;
        let Some(pending) = pending else { return };
        let stmts = std::mem::take(&mut self.scopes.block_mut(pending).stmts);
        let current = self.scopes.switch_mut(switch_scope).current_label.take();
        match current {
            Some(label) => {
                self.scopes
                    .switch_mut(switch_scope)
                    .segments
                    .push((label, stmts));
            }
            None if !stmts.is_empty() => {
                // Statements before the first case are unreachable in C.
                debug!("dropping {} unreachable pre-case statements", stmts.len());
            }
            None => {}
        }
    }

    /// `case e:` / `default:` — finalize the previous segment, open a new
    /// one, record the dispatch prong, then lower the nested statement into
    /// the fresh segment.
    fn trans_case(
        &mut self,
        scope: ScopeId,
        case_expr: Option<crate::c_ast::CExprId>,
        sub: CStmtId,
    ) -> TransResult {
        let switch_scope = self.enclosing_switch(scope)?;
        self.finalize_switch_segment(switch_scope);

        match case_expr {
            Some(expr) => {
                let item = self.trans_expr(switch_scope, expr, ResultUsed::Used)?;
                let label = self.fresh_name("case");
                let s = self.scopes.switch_mut(switch_scope);
                s.prongs.push((std::iter::once(item).collect(), label.clone()));
                s.current_label = Some(label);
            }
            None => {
                let label = self.fresh_name("default");
                let s = self.scopes.switch_mut(switch_scope);
                s.default_label = Some(label.clone());
                s.current_label = Some(label);
            }
        }

        // Fresh pending block for the new segment.
        let pending = self.scopes.push_block(switch_scope);
        self.scopes.switch_mut(switch_scope).pending = Some(pending);

        self.trans_stmt(switch_scope, sub)
    }

    fn enclosing_switch(&self, scope: ScopeId) -> TransResult<ScopeId> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            match &self.scopes.get(id).kind {
                crate::translator::ScopeKind::Switch(_) => return Ok(id),
                crate::translator::ScopeKind::Root { .. } => break,
                _ => cur = self.scopes.get(id).parent,
            }
        }
        Err(TranslationError::unsupported(
            "case label outside of switch",
            None,
        ))
    }

    /// `break` targets the nearest loop directly, or the nearest switch via
    /// its lazily created label.
    fn trans_break(&mut self, scope: ScopeId) -> TransResult {
        let target = self.scopes.breakable_scope(scope);
        let is_loop = matches!(
            self.scopes.get(target).kind,
            crate::translator::ScopeKind::Loop
        );
        let node = if is_loop {
            ZigNode::Break {
                label: None,
                value: None,
            }
        } else {
            let existing = self.scopes.switch_mut(target).switch_label.clone();
            let label = match existing {
                Some(label) => label,
                None => {
                    let label = self.fresh_name("sw");
                    self.scopes.switch_mut(target).switch_label = Some(label.clone());
                    label
                }
            };
            ZigNode::break_to(label, None)
        };
        self.scopes.append_node(scope, node);
        Ok(())
    }

    /// GNU statement expression, common form: the last statement is an
    /// expression whose value the block yields.
    pub fn trans_stmt_expr(
        &mut self,
        scope: ScopeId,
        stmt: CStmtId,
        used: ResultUsed,
    ) -> TransResult<ZigNode> {
        let items = self.ast.compound_stmts(stmt);
        let block = self.scopes.push_block(scope);
        let label = self.fresh_name("blk");
        for (i, item) in items.iter().enumerate() {
            let is_last = i + 1 == items.len();
            if is_last
                && used == ResultUsed::Used
                && let CStmtKind::Expr(expr) = self.ast.stmt(*item).kind
            {
                let value = self.trans_expr(block, expr, ResultUsed::Used)?;
                let break_node = ZigNode::break_to(label.clone(), Some(value));
                self.scopes.block_mut(block).stmts.push(break_node);
                let stmts = std::mem::take(&mut self.scopes.block_mut(block).stmts);
                return Ok(ZigNode::labeled_block(label, stmts));
            }
            self.trans_stmt(block, *item)?;
        }
        let stmts = std::mem::take(&mut self.scopes.block_mut(block).stmts);
        if used == ResultUsed::Used {
            return Err(TranslationError::unsupported(
                "statement expression without a trailing expression",
                None,
            ));
        }
        Ok(ZigNode::block(stmts))
    }
}
