//! Programmatic construction of a [`CAst`].
//!
//! Front-ends dump their AST through serde; the test-suite assembles small
//! translation units directly through this builder. Structural types are
//! canonicalized so repeated requests for `int` share one id.

use hashbrown::HashMap;

use crate::c_ast::*;

/// Builder with canonicalizing type interning.
#[derive(Debug, Default)]
pub struct AstBuilder {
    ast: CAst,
    type_cache: HashMap<CTypeKind, CTypeId>,
}

impl AstBuilder {
    pub fn new() -> Self {
        AstBuilder {
            ast: CAst {
                target: "x86_64-unknown-linux-gnu".to_string(),
                ..CAst::default()
            },
            type_cache: HashMap::new(),
        }
    }

    pub fn with_target(target: &str) -> Self {
        let mut b = Self::new();
        b.ast.target = target.to_string();
        b
    }

    pub fn ty(&mut self, kind: CTypeKind) -> CTypeId {
        if let Some(&id) = self.type_cache.get(&kind) {
            return id;
        }
        self.ast.types.push(CType::new(kind.clone()));
        let id = CTypeId::new(self.ast.types.len() as u32).unwrap();
        self.type_cache.insert(kind, id);
        id
    }

    pub fn qt(&mut self, kind: CTypeKind) -> CQualTypeId {
        CQualTypeId::new(self.ty(kind))
    }

    pub fn const_qt(&mut self, kind: CTypeKind) -> CQualTypeId {
        CQualTypeId::with_quals(self.ty(kind), Qualifiers::CONST)
    }

    pub fn int(&mut self) -> CQualTypeId {
        self.qt(CTypeKind::Int)
    }

    pub fn expr(&mut self, kind: CExprKind) -> CExprId {
        self.ast.exprs.push(CExpr { kind, loc: None });
        CExprId::new(self.ast.exprs.len() as u32).unwrap()
    }

    pub fn stmt(&mut self, kind: CStmtKind) -> CStmtId {
        self.ast.stmts.push(CStmt { kind, loc: None });
        CStmtId::new(self.ast.stmts.len() as u32).unwrap()
    }

    pub fn decl(&mut self, kind: CDeclKind) -> CDeclId {
        self.ast.decls.push(CDecl { kind, loc: None });
        CDeclId::new(self.ast.decls.len() as u32).unwrap()
    }

    pub fn top_decl(&mut self, kind: CDeclKind) -> CDeclId {
        let id = self.decl(kind);
        self.ast.top_decls.push(id);
        id
    }

    /// Re-list an already created decl at the top level.
    pub fn push_top(&mut self, id: CDeclId) {
        self.ast.top_decls.push(id);
    }

    pub fn define_macro(&mut self, name: &str, source: &str) {
        self.ast.macros.push(MacroRecord {
            name: name.to_string(),
            source: source.to_string(),
            loc: None,
        });
    }

    // Expression shorthands used all over the tests.

    pub fn int_lit(&mut self, value: u64) -> CExprId {
        let ty = self.int();
        self.expr(CExprKind::Literal(ty, CLiteral::Integer(value, IntBase::Dec)))
    }

    pub fn decl_ref(&mut self, ty: CQualTypeId, decl: CDeclId) -> CExprId {
        self.expr(CExprKind::DeclRef(ty, decl))
    }

    pub fn finish(self) -> CAst {
        self.ast
    }
}
