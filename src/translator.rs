//! The C-to-Zig translator.
//!
//! One [`Context`] carries the whole translation: the input AST, the scope
//! arena, the decl table, the opaque-demotion set, the global-name lookahead
//! set and the pending alias list. Every lowering function threads the
//! context and the active scope explicitly; there is no ambient state.

pub mod casts;
pub mod decls;
pub mod exprs;
pub mod literals;
pub mod names;
pub mod scope;
pub mod stmts;
#[cfg(test)]
mod tests_decls;
#[cfg(test)]
mod tests_exprs;
#[cfg(test)]
mod tests_scope;
#[cfg(test)]
mod tests_stmts;
#[cfg(test)]
mod tests_types;
pub mod types;

use hashbrown::{HashMap, HashSet};
use log::{debug, warn};
use symbol_table::GlobalSymbol as Symbol;

use crate::c_ast::{CAst, CDeclId, CDeclKind, SourceLoc};
use crate::error::TranslationError;
use crate::zig_ast::{self, ZigNode, ZigVarDecl};

pub use scope::{ScopeId, ScopeKind, ScopeStack};

/// Whether the value of an expression is consumed by the surrounding
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultUsed {
    Used,
    Unused,
}

/// Per-function state threaded through prototype translation.
#[derive(Debug, Clone)]
pub struct FnDeclContext {
    pub name: String,
    pub storage: crate::c_ast::StorageClass,
    pub has_body: bool,
    pub is_pub: bool,
    pub is_export: bool,
}

/// Process-wide translation state.
pub struct Context<'a> {
    pub ast: &'a CAst,
    pub scopes: ScopeStack,
    /// Canonical decl id -> emitted Zig name. Write-once.
    pub decl_table: HashMap<CDeclId, String>,
    /// Records/enums demoted to opaque.
    pub opaque_decls: HashSet<CDeclId>,
    /// Enums emitted as real Zig enums (implicit-valued ones).
    pub tagged_enums: HashSet<CDeclId>,
    /// Names of all decls and macros, populated before any translation.
    pub global_names: HashSet<Symbol>,
    /// Top-level C name -> decl, for the macro function-alias post-pass.
    pub global_name_decls: HashMap<String, CDeclId>,
    /// Typedef name -> decl, for syntactic type detection in macro bodies.
    pub global_type_names: HashMap<String, CDeclId>,
    /// Decls listed at the top level of the translation unit.
    pub top_decl_set: HashSet<CDeclId>,
    /// Enumerator -> owning enum decl.
    pub enum_parents: HashMap<CDeclId, CDeclId>,
    /// Decls whose translation already failed and produced a stub.
    pub failed_decls: HashSet<CDeclId>,
    /// Pending `(alias, name)` pairs flushed by the finalizer.
    pub alias_list: Vec<(String, String)>,
    /// Global mangle counter; block scopes carry their own.
    pub mangle_count: u32,
    /// Return type of the function whose body is being lowered.
    pub current_fn_ret: Option<crate::c_ast::CQualTypeId>,
}

impl<'a> Context<'a> {
    pub fn new(ast: &'a CAst) -> Self {
        Context {
            ast,
            scopes: ScopeStack::new(),
            decl_table: HashMap::new(),
            opaque_decls: HashSet::new(),
            tagged_enums: HashSet::new(),
            global_names: HashSet::new(),
            global_name_decls: HashMap::new(),
            global_type_names: HashMap::new(),
            top_decl_set: HashSet::new(),
            enum_parents: HashMap::new(),
            failed_decls: HashSet::new(),
            alias_list: Vec::new(),
            mangle_count: 0,
            current_fn_ret: None,
        }
    }

    /// First pass: collect every decl and macro name so early mangling
    /// decisions cannot steal a name a later decl needs.
    pub fn prepass(&mut self) {
        for &decl_id in &self.ast.top_decls {
            let decl = self.ast.decl(decl_id);
            if let Some(name) = decl.kind.name() {
                self.global_names.insert(Symbol::new(name));
                if matches!(
                    decl.kind,
                    CDeclKind::Function { .. } | CDeclKind::Variable { .. }
                ) {
                    self.global_name_decls.insert(name.to_string(), decl_id);
                }
                if matches!(decl.kind, CDeclKind::Typedef { .. }) {
                    self.global_type_names.insert(name.to_string(), decl_id);
                }
            }
            // Enumerators become top-level names too.
            if let CDeclKind::Enum { enumerators, .. } = &decl.kind {
                for &variant in enumerators {
                    if let Some(name) = self.ast.decl_name(variant) {
                        self.global_names.insert(Symbol::new(name));
                    }
                }
            }
        }
        for record in &self.ast.macros {
            self.global_names.insert(Symbol::new(&record.name));
        }
        self.top_decl_set = self.ast.top_decls.iter().copied().collect();
        for (i, decl) in self.ast.decls.iter().enumerate() {
            if let CDeclKind::Enum { enumerators, .. } = &decl.kind {
                let parent = CDeclId::new(i as u32 + 1).unwrap();
                for &variant in enumerators {
                    self.enum_parents.insert(variant, parent);
                }
            }
        }
        debug!("prepass: {} global names", self.global_names.len());
    }

    pub fn is_top_decl(&self, decl: CDeclId) -> bool {
        self.top_decl_set.contains(&decl)
    }

    pub fn enum_parent(&self, decl: CDeclId) -> Option<CDeclId> {
        self.enum_parents.get(&decl).copied()
    }

    /// Whether `name` is unusable in `scope`: bound somewhere up the chain,
    /// reserved in Zig, or claimed by a not-yet-translated decl or macro.
    pub fn contains(&self, scope: ScopeId, name: &str) -> bool {
        names::is_reserved(name)
            || self.scopes.is_bound(scope, name)
            || self.global_names.contains(&Symbol::new(name))
    }

    /// Whether `name` is taken *right now*: reserved, or already emitted at
    /// the root. No lookahead into pending decls or macros.
    pub fn contains_now(&self, name: &str) -> bool {
        names::is_reserved(name) || self.scopes.root_symbols().contains(name)
    }

    /// Pick the emitted name for a top-level decl.
    pub fn make_root_name(&mut self, desired: &str) -> String {
        if !self.contains_now(desired) {
            self.scopes.bind_root(desired);
            return desired.to_string();
        }
        loop {
            self.mangle_count += 1;
            let candidate = format!("{}_{}", desired, self.mangle_count);
            if !self.contains_now(&candidate) {
                warn!("mangling root name {} -> {}", desired, candidate);
                self.scopes.bind_root(candidate.clone());
                return candidate;
            }
        }
    }

    /// Pick and record the emitted name for a local binding in `block`.
    ///
    /// Mangled names are stable for the life of the translation; the pair
    /// is recorded in the block's alias table either way.
    pub fn make_local_name(&mut self, block: ScopeId, desired: &str) -> String {
        let name = if !self.contains(block, desired) {
            desired.to_string()
        } else {
            loop {
                let count = {
                    let b = self.scopes.block_mut(block);
                    b.mangle_count += 1;
                    b.mangle_count
                };
                let candidate = format!("{}_{}", desired, count);
                if !self.contains(block, &candidate) {
                    break candidate;
                }
            }
        };
        self.scopes
            .block_mut(block)
            .aliases
            .push((desired.to_string(), name.clone()));
        name
    }

    /// A fresh label or helper name, unique across the translation.
    pub fn fresh_name(&mut self, base: &str) -> String {
        self.mangle_count += 1;
        format!("{}_{}", base, self.mangle_count)
    }

    /// Emit a warning comment ahead of the current position.
    pub fn warn_at(&mut self, scope: ScopeId, loc: Option<&SourceLoc>, msg: &str) {
        let text = match loc {
            Some(loc) => format!("{}: warning: {}", loc, msg),
            None => format!("warning: {}", msg),
        };
        warn!("{}", text);
        self.scopes.append_node(scope, ZigNode::WarningComment(text));
    }

    /// Decl-boundary recovery: a warning comment plus
    /// `pub const <name> = @compileError("...");` at the root.
    ///
    /// `name` must already be final (bound, or safe to bind).
    pub fn emit_failed_decl(&mut self, name: &str, err: &TranslationError) {
        let msg = err.to_string();
        self.warn_at(ScopeId::ROOT, err.loc(), &format!("unable to translate {}: {}", name, msg));
        if !self.scopes.root_symbols().contains(name) {
            self.scopes.bind_root(name);
        }
        let stub = ZigNode::VarDecl(ZigVarDecl {
            is_pub: true,
            is_const: true,
            name: name.to_string(),
            init: Some(Box::new(ZigNode::builtin(
                "compileError",
                [ZigNode::StringLiteral(msg.into_bytes())],
            ))),
            ..ZigVarDecl::default()
        });
        self.scopes.root_nodes_mut().push(stub);
    }

    /// Assemble the final root node list: builtins preamble first, then the
    /// translated decls, then any pending aliases that are still free.
    pub fn finalize(&mut self) -> Vec<ZigNode> {
        let mut nodes = vec![ZigNode::Usingnamespace(Box::new(ZigNode::builtin(
            "import",
            [ZigNode::StringLiteral(b"builtins".to_vec())],
        )))];
        nodes.append(self.scopes.root_nodes_mut());
        let aliases = std::mem::take(&mut self.alias_list);
        for (alias, name) in aliases {
            if self.contains_now(&alias) {
                continue;
            }
            self.scopes.bind_root(alias.clone());
            nodes.push(ZigNode::VarDecl(ZigVarDecl {
                is_pub: true,
                is_const: true,
                name: alias,
                init: Some(Box::new(ZigNode::ident(name))),
                ..ZigVarDecl::default()
            }));
        }
        nodes
    }
}

/// The finished translation.
pub struct TranslationOutput {
    pub nodes: Vec<ZigNode>,
}

impl TranslationOutput {
    pub fn render(&self) -> String {
        zig_ast::render_unit(&self.nodes)
    }
}

/// Translate one unit: decls in front-end order, then macros, then the
/// finalizer.
pub fn translate(ast: &CAst) -> TranslationOutput {
    let mut ctx = Context::new(ast);
    ctx.prepass();
    for &decl_id in &ast.top_decls {
        ctx.visit_top_decl(decl_id);
    }
    crate::macros::translate_macros(&mut ctx);
    let nodes = ctx.finalize();
    TranslationOutput { nodes }
}
