//! Deterministic Zig source rendering.
//!
//! Identical trees render to byte-identical text. Nested binary operands are
//! always parenthesized so no output depends on precedence reconstruction.

use crate::zig_ast::node::*;

const INDENT: &str = "    ";

/// Render a root node list to Zig source.
pub fn render_unit(nodes: &[ZigNode]) -> String {
    let mut r = Renderer::new();
    for node in nodes {
        r.stmt(node);
    }
    r.out
}

struct Renderer {
    out: String,
    indent: usize,
}

impl Renderer {
    fn new() -> Self {
        Renderer {
            out: String::new(),
            indent: 0,
        }
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    /// Render a node in statement position, indentation and newline included.
    fn stmt(&mut self, node: &ZigNode) {
        self.push_indent();
        self.stmt_here(node);
    }

    /// Render a node in statement position at the current output point.
    fn stmt_here(&mut self, node: &ZigNode) {
        match node {
            ZigNode::Block { .. } => {
                self.block(node);
                self.out.push('\n');
            }
            ZigNode::If {
                cond,
                then_body,
                else_body,
            } => {
                self.out.push_str("if (");
                self.expr(cond);
                self.out.push_str(") ");
                self.body(then_body);
                if let Some(els) = else_body {
                    self.out.push_str(" else ");
                    self.body(els);
                }
                self.out.push('\n');
            }
            ZigNode::While { cond, cont, body } => {
                self.out.push_str("while (");
                self.expr(cond);
                self.out.push(')');
                if let Some(cont) = cont {
                    self.out.push_str(" : (");
                    self.expr(cont);
                    self.out.push(')');
                }
                self.out.push(' ');
                self.body(body);
                self.out.push('\n');
            }
            ZigNode::Switch { .. } => {
                self.switch_expr(node);
                self.out.push('\n');
            }
            ZigNode::VarDecl(decl) => {
                self.var_decl(decl);
                self.out.push('\n');
            }
            ZigNode::FnDecl(decl) => {
                self.fn_decl(decl);
                self.out.push('\n');
            }
            ZigNode::Usingnamespace(expr) => {
                self.out.push_str("pub usingnamespace ");
                self.expr(expr);
                self.out.push_str(";\n");
            }
            ZigNode::WarningComment(text) => {
                self.out.push_str("// ");
                self.out.push_str(text);
                self.out.push('\n');
            }
            ZigNode::Break { .. } | ZigNode::Continue | ZigNode::Return(_) | ZigNode::Discard(_) => {
                self.expr(node);
                self.out.push_str(";\n");
            }
            other => {
                self.expr(other);
                self.out.push_str(";\n");
            }
        }
    }

    /// An if/while body: blocks multi-line, anything else inline.
    fn body(&mut self, node: &ZigNode) {
        match node {
            ZigNode::Block { .. } => self.block(node),
            ZigNode::Break { .. } | ZigNode::Continue | ZigNode::Return(_) | ZigNode::Discard(_) => {
                self.expr(node);
                self.out.push(';');
            }
            other => {
                self.expr(other);
                self.out.push(';');
            }
        }
    }

    fn block(&mut self, node: &ZigNode) {
        let ZigNode::Block { label, stmts } = node else {
            unreachable!("block() called on non-block");
        };
        if let Some(label) = label {
            self.out.push_str(label);
            self.out.push_str(": ");
        }
        if stmts.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{\n");
        self.indent += 1;
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.push_indent();
        self.out.push('}');
    }

    fn switch_expr(&mut self, node: &ZigNode) {
        let ZigNode::Switch { cond, prongs } = node else {
            unreachable!("switch_expr() called on non-switch");
        };
        self.out.push_str("switch (");
        self.expr(cond);
        self.out.push_str(") {\n");
        self.indent += 1;
        for prong in prongs {
            self.push_indent();
            if prong.items.is_empty() {
                self.out.push_str("else");
            } else {
                for (i, item) in prong.items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(item);
                }
            }
            self.out.push_str(" => ");
            match &prong.body {
                block @ ZigNode::Block { .. } => self.block(block),
                other => self.expr(other),
            }
            self.out.push_str(",\n");
        }
        self.indent -= 1;
        self.push_indent();
        self.out.push('}');
    }

    fn var_decl(&mut self, decl: &ZigVarDecl) {
        if decl.is_pub {
            self.out.push_str("pub ");
        }
        if decl.is_export {
            self.out.push_str("export ");
        } else if decl.is_extern {
            self.out.push_str("extern ");
        }
        if decl.is_threadlocal {
            self.out.push_str("threadlocal ");
        }
        self.out.push_str(if decl.is_const { "const " } else { "var " });
        self.out.push_str(&decl.name);
        if let Some(ty) = &decl.ty {
            self.out.push_str(": ");
            self.expr(ty);
        }
        if let Some(init) = &decl.init {
            self.out.push_str(" = ");
            self.expr(init);
        }
        self.out.push(';');
    }

    fn fn_decl(&mut self, decl: &ZigFnDecl) {
        if decl.is_pub {
            self.out.push_str("pub ");
        }
        if decl.is_export {
            self.out.push_str("export ");
        } else if decl.is_extern {
            self.out.push_str("extern ");
        }
        if decl.is_inline {
            self.out.push_str("inline ");
        }
        self.out.push_str("fn ");
        self.out.push_str(&decl.name);
        self.out.push('(');
        for (i, param) in decl.params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            if param.is_noalias {
                self.out.push_str("noalias ");
            }
            if let Some(name) = &param.name {
                self.out.push_str(name);
                self.out.push_str(": ");
            }
            self.expr(&param.ty);
        }
        if decl.is_var_args {
            if !decl.params.is_empty() {
                self.out.push_str(", ");
            }
            self.out.push_str("...");
        }
        self.out.push_str(") ");
        if decl.explicit_callconv {
            self.out.push_str("callconv(.C) ");
        }
        self.expr(&decl.return_ty);
        match &decl.body {
            Some(body) => {
                self.out.push(' ');
                self.block(body);
            }
            None => self.out.push(';'),
        }
    }

    /// Parenthesize operands whose rendering would be precedence-sensitive.
    fn operand(&mut self, node: &ZigNode) {
        if matches!(node, ZigNode::Bin { .. } | ZigNode::If { .. }) {
            self.out.push('(');
            self.expr(node);
            self.out.push(')');
        } else {
            self.expr(node);
        }
    }

    /// A postfix chain target; prefix operators need wrapping there too.
    fn postfix_target(&mut self, node: &ZigNode) {
        if matches!(
            node,
            ZigNode::Bin { .. }
                | ZigNode::If { .. }
                | ZigNode::Not(_)
                | ZigNode::Negate(_)
                | ZigNode::NegateWrap(_)
                | ZigNode::BitNot(_)
                | ZigNode::AddressOf(_)
                | ZigNode::OptionalType(_)
                | ZigNode::CPointer { .. }
                | ZigNode::SinglePointer { .. }
        ) {
            self.out.push('(');
            self.expr(node);
            self.out.push(')');
        } else {
            self.expr(node);
        }
    }

    fn expr(&mut self, node: &ZigNode) {
        match node {
            ZigNode::Identifier(name) => self.out.push_str(name),
            ZigNode::IntLiteral(text) | ZigNode::FloatLiteral(text) => self.out.push_str(text),
            ZigNode::CharLiteral(c) => self.char_literal(*c),
            ZigNode::StringLiteral(bytes) => self.string_literal(bytes),
            ZigNode::BoolLiteral(b) => self.out.push_str(if *b { "true" } else { "false" }),
            ZigNode::Null => self.out.push_str("null"),
            ZigNode::Undefined => self.out.push_str("undefined"),

            ZigNode::Bin { op, lhs, rhs } => {
                self.operand(lhs);
                self.out.push(' ');
                self.out.push_str(op.token());
                self.out.push(' ');
                self.operand(rhs);
            }
            ZigNode::Not(inner) => {
                self.out.push('!');
                self.operand(inner);
            }
            ZigNode::Negate(inner) => {
                self.out.push('-');
                self.operand(inner);
            }
            ZigNode::NegateWrap(inner) => {
                self.out.push_str("-%");
                self.operand(inner);
            }
            ZigNode::BitNot(inner) => {
                self.out.push('~');
                self.operand(inner);
            }
            ZigNode::AddressOf(inner) => {
                self.out.push('&');
                self.operand(inner);
            }
            ZigNode::Deref(inner) => {
                self.postfix_target(inner);
                self.out.push_str(".*");
            }
            ZigNode::Unwrap(inner) => {
                self.postfix_target(inner);
                self.out.push_str(".?");
            }
            ZigNode::Paren(inner) => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }
            ZigNode::Field { lhs, name } => {
                self.postfix_target(lhs);
                self.out.push('.');
                self.out.push_str(name);
            }
            ZigNode::Index { lhs, index } => {
                self.postfix_target(lhs);
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
            ZigNode::Call { callee, args } => {
                self.postfix_target(callee);
                self.args(args);
            }
            ZigNode::Builtin { name, args } => {
                self.out.push('@');
                self.out.push_str(name);
                self.args(args);
            }

            ZigNode::OptionalType(child) => {
                self.out.push('?');
                self.expr(child);
            }
            ZigNode::CPointer {
                is_const,
                is_volatile,
                child,
            } => {
                self.out.push_str("[*c]");
                self.pointer_quals(*is_const, *is_volatile);
                self.expr(child);
            }
            ZigNode::SinglePointer {
                is_const,
                is_volatile,
                child,
            } => {
                self.out.push('*');
                self.pointer_quals(*is_const, *is_volatile);
                self.expr(child);
            }
            ZigNode::ArrayType { len, elem } => {
                self.out.push('[');
                match len {
                    Some(len) => self.expr(len),
                    None => self.out.push('_'),
                }
                self.out.push(']');
                self.expr(elem);
            }
            ZigNode::FnProtoType {
                params,
                is_var_args,
                ret,
            } => {
                self.out.push_str("fn (");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(param);
                }
                if *is_var_args {
                    if !params.is_empty() {
                        self.out.push_str(", ");
                    }
                    self.out.push_str("...");
                }
                self.out.push_str(") callconv(.C) ");
                self.expr(ret);
            }
            ZigNode::ContainerDecl {
                kind,
                is_extern,
                fields,
            } => self.container(kind, *is_extern, fields),

            ZigNode::ArrayLit { ty, items } => {
                self.expr(ty);
                self.out.push('{');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(item);
                }
                self.out.push('}');
            }
            ZigNode::StructLit { ty, fields } => {
                self.expr(ty);
                self.out.push('{');
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.out.push_str(" .");
                    self.out.push_str(name);
                    self.out.push_str(" = ");
                    self.expr(value);
                }
                if !fields.is_empty() {
                    self.out.push(' ');
                }
                self.out.push('}');
            }

            ZigNode::Block { .. } => self.block(node),
            ZigNode::If {
                cond,
                then_body,
                else_body,
            } => {
                self.out.push_str("if (");
                self.expr(cond);
                self.out.push_str(") ");
                match then_body.as_ref() {
                    block @ ZigNode::Block { .. } => self.block(block),
                    other => self.expr(other),
                }
                if let Some(els) = else_body {
                    self.out.push_str(" else ");
                    match els.as_ref() {
                        block @ ZigNode::Block { .. } => self.block(block),
                        other => self.expr(other),
                    }
                }
            }
            ZigNode::While { cond, cont, body } => {
                self.out.push_str("while (");
                self.expr(cond);
                self.out.push(')');
                if let Some(cont) = cont {
                    self.out.push_str(" : (");
                    self.expr(cont);
                    self.out.push(')');
                }
                self.out.push(' ');
                match body.as_ref() {
                    block @ ZigNode::Block { .. } => self.block(block),
                    other => self.expr(other),
                }
            }
            ZigNode::Switch { .. } => self.switch_expr(node),
            ZigNode::Break { label, value } => {
                self.out.push_str("break");
                if let Some(label) = label {
                    self.out.push_str(" :");
                    self.out.push_str(label);
                }
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value);
                }
            }
            ZigNode::Continue => self.out.push_str("continue"),
            ZigNode::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value);
                }
            }
            ZigNode::Discard(inner) => {
                self.out.push_str("_ = ");
                self.expr(inner);
            }

            ZigNode::VarDecl(decl) => self.var_decl(decl),
            ZigNode::FnDecl(decl) => self.fn_decl(decl),
            ZigNode::Usingnamespace(inner) => {
                self.out.push_str("pub usingnamespace ");
                self.expr(inner);
            }
            ZigNode::WarningComment(text) => {
                self.out.push_str("// ");
                self.out.push_str(text);
            }
        }
    }

    fn args(&mut self, args: &[ZigNode]) {
        self.out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(arg);
        }
        self.out.push(')');
    }

    fn pointer_quals(&mut self, is_const: bool, is_volatile: bool) {
        if is_const {
            self.out.push_str("const ");
        }
        if is_volatile {
            self.out.push_str("volatile ");
        }
    }

    fn container(&mut self, kind: &ContainerKind, is_extern: bool, fields: &[ZigField]) {
        if is_extern {
            self.out.push_str("extern ");
        }
        match kind {
            ContainerKind::Struct => self.out.push_str("struct"),
            ContainerKind::Union => self.out.push_str("union"),
            ContainerKind::Enum(tag) => {
                self.out.push_str("enum(");
                self.expr(tag);
                self.out.push(')');
            }
            ContainerKind::Opaque => self.out.push_str("opaque"),
        }
        if fields.is_empty() {
            self.out.push_str(" {}");
            return;
        }
        self.out.push_str(" {\n");
        self.indent += 1;
        for field in fields {
            self.push_indent();
            self.out.push_str(&field.name);
            if let Some(ty) = &field.ty {
                self.out.push_str(": ");
                self.expr(ty);
            }
            if let Some(align) = field.align {
                self.out.push_str(&format!(" align({})", align));
            }
            self.out.push_str(",\n");
        }
        self.indent -= 1;
        self.push_indent();
        self.out.push('}');
    }

    fn char_literal(&mut self, c: u32) {
        self.out.push('\'');
        match c {
            0x27 => self.out.push_str("\\'"),
            0x5c => self.out.push_str("\\\\"),
            0x0a => self.out.push_str("\\n"),
            0x0d => self.out.push_str("\\r"),
            0x09 => self.out.push_str("\\t"),
            0x20..=0x7e => self.out.push(char::from_u32(c).unwrap()),
            0..=0xff => self.out.push_str(&format!("\\x{:02x}", c)),
            _ => self.out.push_str(&format!("\\u{{{:x}}}", c)),
        }
        self.out.push('\'');
    }

    fn string_literal(&mut self, bytes: &[u8]) {
        self.out.push('"');
        for &b in bytes {
            match b {
                b'"' => self.out.push_str("\\\""),
                b'\\' => self.out.push_str("\\\\"),
                b'\n' => self.out.push_str("\\n"),
                b'\r' => self.out.push_str("\\r"),
                b'\t' => self.out.push_str("\\t"),
                0x20..=0x7e => self.out.push(b as char),
                _ => self.out.push_str(&format!("\\x{:02x}", b)),
            }
        }
        self.out.push('"');
    }
}
