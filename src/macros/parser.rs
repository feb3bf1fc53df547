//! Precedence-climbing parser over macro tokens.
//!
//! One method per precedence level, following the C operator hierarchy.
//! Types only exist syntactically here, so casts are detected by lookahead:
//! a parenthesized type-name keyword run (or typedef name), optionally
//! starred, followed by the start of an expression. Bitwise and arithmetic
//! operands that are boolean results get `@boolToInt`; `&&`/`||`/`?:`
//! operands that are not get `!= 0`.

use crate::c_ast::SourceLoc;
use crate::error::TranslationError;
use crate::macros::lexer::{MacroToken, MacroTokenKind};
use crate::translator::literals::{
    normalize_float_text, normalize_int_text, parse_char_value, strip_float_suffix,
    strip_int_suffix, unescape_c_bytes,
};
use crate::translator::Context;
use crate::zig_ast::{ZigBinOp, ZigNode};

type ParseResult = Result<ZigNode, TranslationError>;

const TYPE_KEYWORDS: &[&str] = &[
    "void", "bool", "char", "short", "int", "long", "float", "double", "signed", "unsigned",
    "const", "volatile", "_Bool",
];

pub struct MacroParser<'a, 'ast> {
    ctx: &'a mut Context<'ast>,
    /// Emitted name of the macro being parsed.
    name: &'a str,
    tokens: &'a [MacroToken],
    pos: usize,
    params: &'a [String],
    loc: Option<&'a SourceLoc>,
}

impl<'a, 'ast> MacroParser<'a, 'ast> {
    pub fn new(
        ctx: &'a mut Context<'ast>,
        name: &'a str,
        tokens: &'a [MacroToken],
        params: &'a [String],
        loc: Option<&'a SourceLoc>,
    ) -> Self {
        MacroParser {
            ctx,
            name,
            tokens,
            pos: 0,
            params,
            loc,
        }
    }

    fn error(&self, reason: impl Into<String>) -> TranslationError {
        TranslationError::unsupported(
            format!("in macro {}: {}", self.name, reason.into()),
            self.loc.cloned(),
        )
    }

    fn peek(&self) -> &MacroTokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&MacroTokenKind::Eof)
    }

    fn peek_at(&self, n: usize) -> &MacroTokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&MacroTokenKind::Eof)
    }

    fn eat(&mut self, kind: &MacroTokenKind) -> bool {
        if self.peek() == kind {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &MacroTokenKind) -> Result<(), TranslationError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}, found {:?}", kind, self.peek())))
        }
    }

    pub fn expect_fully_consumed(&self) -> Result<(), TranslationError> {
        match self.peek() {
            MacroTokenKind::Eof => Ok(()),
            other => Err(self.error(format!("trailing tokens starting at {:?}", other))),
        }
    }

    /// `x != 0` unless the node already has boolean type.
    fn int_to_bool(&self, node: ZigNode) -> ZigNode {
        if node.is_bool_result() {
            node
        } else {
            ZigNode::bin(ZigBinOp::NotEq, node, ZigNode::int("0"))
        }
    }

    /// `@boolToInt(x)` for boolean results landing in integer context.
    fn bool_to_int(&self, node: ZigNode) -> ZigNode {
        if node.is_bool_result() {
            ZigNode::builtin("boolToInt", [node])
        } else {
            node
        }
    }

    /// Comma-separated conditional expressions; block-valued if several.
    pub fn parse_expr(&mut self) -> ParseResult {
        let first = self.parse_cond_expr()?;
        if !matches!(self.peek(), MacroTokenKind::Comma) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.eat(&MacroTokenKind::Comma) {
            parts.push(self.parse_cond_expr()?);
        }
        let label = self.ctx.fresh_name("blk");
        let last = parts.pop().unwrap();
        let mut stmts: Vec<ZigNode> = parts
            .into_iter()
            .map(|p| ZigNode::Discard(Box::new(p)))
            .collect();
        stmts.push(ZigNode::break_to(label.clone(), Some(last)));
        Ok(ZigNode::labeled_block(label, stmts))
    }

    fn parse_cond_expr(&mut self) -> ParseResult {
        let cond = self.parse_or()?;
        if !self.eat(&MacroTokenKind::Question) {
            return Ok(cond);
        }
        let cond = self.int_to_bool(cond);
        let then_expr = self.parse_expr()?;
        self.expect(&MacroTokenKind::Colon)?;
        let else_expr = self.parse_cond_expr()?;
        Ok(ZigNode::paren(ZigNode::If {
            cond: Box::new(cond),
            then_body: Box::new(then_expr),
            else_body: Some(Box::new(else_expr)),
        }))
    }

    fn parse_or(&mut self) -> ParseResult {
        let mut left = self.parse_and()?;
        while self.eat(&MacroTokenKind::PipePipe) {
            let right = self.parse_and()?;
            left = ZigNode::bin(
                ZigBinOp::BoolOr,
                self.int_to_bool(left),
                self.int_to_bool(right),
            );
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult {
        let mut left = self.parse_bit_or()?;
        while self.eat(&MacroTokenKind::AmpAmp) {
            let right = self.parse_bit_or()?;
            left = ZigNode::bin(
                ZigBinOp::BoolAnd,
                self.int_to_bool(left),
                self.int_to_bool(right),
            );
        }
        Ok(left)
    }

    fn parse_bit_or(&mut self) -> ParseResult {
        let mut left = self.parse_bit_xor()?;
        while self.eat(&MacroTokenKind::Pipe) {
            let right = self.parse_bit_xor()?;
            left = ZigNode::bin(
                ZigBinOp::BitOr,
                self.bool_to_int(left),
                self.bool_to_int(right),
            );
        }
        Ok(left)
    }

    fn parse_bit_xor(&mut self) -> ParseResult {
        let mut left = self.parse_bit_and()?;
        while self.eat(&MacroTokenKind::Caret) {
            let right = self.parse_bit_and()?;
            left = ZigNode::bin(
                ZigBinOp::BitXor,
                self.bool_to_int(left),
                self.bool_to_int(right),
            );
        }
        Ok(left)
    }

    fn parse_bit_and(&mut self) -> ParseResult {
        let mut left = self.parse_eq()?;
        while self.eat(&MacroTokenKind::Amp) {
            let right = self.parse_eq()?;
            left = ZigNode::bin(
                ZigBinOp::BitAnd,
                self.bool_to_int(left),
                self.bool_to_int(right),
            );
        }
        Ok(left)
    }

    fn parse_eq(&mut self) -> ParseResult {
        let mut left = self.parse_rel()?;
        loop {
            let op = match self.peek() {
                MacroTokenKind::EqEq => ZigBinOp::Eq,
                MacroTokenKind::BangEq => ZigBinOp::NotEq,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_rel()?;
            left = ZigNode::bin(op, left, right);
        }
        Ok(left)
    }

    fn parse_rel(&mut self) -> ParseResult {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.peek() {
                MacroTokenKind::Lt => ZigBinOp::Less,
                MacroTokenKind::Le => ZigBinOp::LessEq,
                MacroTokenKind::Gt => ZigBinOp::Greater,
                MacroTokenKind::Ge => ZigBinOp::GreaterEq,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_shift()?;
            left = ZigNode::bin(op, left, right);
        }
        Ok(left)
    }

    fn parse_shift(&mut self) -> ParseResult {
        let mut left = self.parse_add()?;
        loop {
            let op = match self.peek() {
                MacroTokenKind::Shl => ZigBinOp::Shl,
                MacroTokenKind::Shr => ZigBinOp::Shr,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_add()?;
            left = ZigNode::bin(op, self.bool_to_int(left), self.bool_to_int(right));
        }
        Ok(left)
    }

    fn parse_add(&mut self) -> ParseResult {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                MacroTokenKind::Plus => ZigBinOp::Add,
                MacroTokenKind::Minus => ZigBinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_mul()?;
            left = ZigNode::bin(op, self.bool_to_int(left), self.bool_to_int(right));
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> ParseResult {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek() {
                MacroTokenKind::Star => {
                    // `T *` closing a parenthesized type is a pointer type,
                    // not a multiplication: look ahead past the star run.
                    let mut stars = 0;
                    while matches!(self.peek_at(stars), MacroTokenKind::Star) {
                        stars += 1;
                    }
                    if matches!(self.peek_at(stars), MacroTokenKind::RParen) {
                        for _ in 0..stars {
                            left = ZigNode::CPointer {
                                is_const: false,
                                is_volatile: false,
                                child: Box::new(left),
                            };
                        }
                        self.pos += stars;
                        break;
                    }
                    self.pos += 1;
                    let right = self.parse_unary()?;
                    left = ZigNode::bin(
                        ZigBinOp::Mul,
                        self.bool_to_int(left),
                        self.bool_to_int(right),
                    );
                }
                MacroTokenKind::Slash => {
                    self.pos += 1;
                    let right = self.parse_unary()?;
                    left = ZigNode::bin(
                        ZigBinOp::Div,
                        self.bool_to_int(left),
                        self.bool_to_int(right),
                    );
                }
                MacroTokenKind::Percent => {
                    self.pos += 1;
                    let right = self.parse_unary()?;
                    left = ZigNode::bin(
                        ZigBinOp::Rem,
                        self.bool_to_int(left),
                        self.bool_to_int(right),
                    );
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult {
        match self.peek().clone() {
            MacroTokenKind::Bang => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(ZigNode::Not(Box::new(self.int_to_bool(operand))))
            }
            MacroTokenKind::Minus => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(ZigNode::Negate(Box::new(operand)))
            }
            MacroTokenKind::Plus => {
                self.pos += 1;
                self.parse_unary()
            }
            MacroTokenKind::Tilde => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(ZigNode::BitNot(Box::new(self.bool_to_int(operand))))
            }
            MacroTokenKind::Star => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(ZigNode::Deref(Box::new(operand)))
            }
            MacroTokenKind::Amp => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(ZigNode::AddressOf(Box::new(operand)))
            }
            MacroTokenKind::Identifier(name) if name == "sizeof" => {
                self.pos += 1;
                self.parse_size_alignof("sizeOf")
            }
            MacroTokenKind::Identifier(name)
                if name == "alignof" || name == "_Alignof" || name == "__alignof__" =>
            {
                self.pos += 1;
                self.parse_size_alignof("alignOf")
            }
            MacroTokenKind::LParen if self.cast_ahead() => {
                self.pos += 1; // (
                let ty = self.parse_type_name()?;
                self.expect(&MacroTokenKind::RParen)?;
                let operand = self.parse_unary()?;
                // Token-only context: route through the std cast helper.
                Ok(ZigNode::call(
                    ZigNode::std_path(&["meta", "cast"]),
                    [ty, operand],
                ))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_size_alignof(&mut self, builtin: &'static str) -> ParseResult {
        if matches!(self.peek(), MacroTokenKind::LParen) && self.type_starts_at(1) {
            self.pos += 1;
            let ty = self.parse_type_name()?;
            self.expect(&MacroTokenKind::RParen)?;
            return Ok(ZigNode::builtin(builtin, [ty]));
        }
        let operand = self.parse_unary()?;
        Ok(ZigNode::builtin(
            builtin,
            [ZigNode::builtin("TypeOf", [operand])],
        ))
    }

    /// `(` followed by a type name and, after the closing paren, the start
    /// of an expression.
    fn cast_ahead(&self) -> bool {
        if !self.type_starts_at(1) {
            return false;
        }
        // Find the matching rparen of the type (no nesting in type names).
        let mut i = self.pos + 1;
        while !matches!(self.peek_at(i - self.pos), MacroTokenKind::RParen | MacroTokenKind::Eof) {
            i += 1;
        }
        if !matches!(self.peek_at(i - self.pos), MacroTokenKind::RParen) {
            return false;
        }
        matches!(
            self.peek_at(i - self.pos + 1),
            MacroTokenKind::Identifier(_)
                | MacroTokenKind::IntLiteral(_)
                | MacroTokenKind::FloatLiteral(_)
                | MacroTokenKind::CharLiteral { .. }
                | MacroTokenKind::StringLiteral { .. }
                | MacroTokenKind::LParen
                | MacroTokenKind::Minus
                | MacroTokenKind::Plus
                | MacroTokenKind::Tilde
                | MacroTokenKind::Bang
                | MacroTokenKind::Star
                | MacroTokenKind::Amp
        )
    }

    fn type_starts_at(&self, n: usize) -> bool {
        match self.peek_at(n) {
            MacroTokenKind::Identifier(name) => {
                TYPE_KEYWORDS.contains(&name.as_str())
                    || self.ctx.global_type_names.contains_key(name)
            }
            _ => false,
        }
    }

    /// A type-name keyword run (plus typedef names), then pointer stars.
    fn parse_type_name(&mut self) -> ParseResult {
        let mut node = match self.peek().clone() {
            MacroTokenKind::Identifier(name) if TYPE_KEYWORDS.contains(&name.as_str()) => {
                self.parse_type_keyword_run()?
            }
            MacroTokenKind::Identifier(name)
                if self.ctx.global_type_names.contains_key(&name) =>
            {
                self.pos += 1;
                let decl = self.ctx.global_type_names[&name];
                ZigNode::ident(self.ctx.decl_zig_name(decl)?)
            }
            other => return Err(self.error(format!("expected type name, found {:?}", other))),
        };
        while self.eat(&MacroTokenKind::Star) {
            node = ZigNode::CPointer {
                is_const: false,
                is_volatile: false,
                child: Box::new(node),
            };
        }
        Ok(node)
    }

    fn parse_type_keyword_run(&mut self) -> ParseResult {
        let mut signed = false;
        let mut unsigned = false;
        let mut longs = 0;
        let mut base: Option<&'static str> = None;
        loop {
            let MacroTokenKind::Identifier(word) = self.peek() else {
                break;
            };
            match word.as_str() {
                "void" => base = Some("void"),
                "bool" | "_Bool" => base = Some("bool"),
                "char" => base = Some("char"),
                "short" => base = Some("short"),
                "int" => {
                    if base.is_none() {
                        base = Some("int");
                    }
                }
                "long" => longs += 1,
                "float" => base = Some("float"),
                "double" => base = Some("double"),
                "signed" => signed = true,
                "unsigned" => unsigned = true,
                "const" | "volatile" => {}
                _ => break,
            }
            self.pos += 1;
        }
        let name = match (base, longs, unsigned) {
            (Some("void"), _, _) => "c_void",
            (Some("bool"), _, _) => "bool",
            (Some("char"), _, _) => "u8",
            (Some("short"), _, true) => "c_ushort",
            (Some("short"), _, false) => "c_short",
            (Some("float"), _, _) => "f32",
            (Some("double"), 0, _) => "f64",
            (Some("double"), _, _) => "c_longdouble",
            (_, 0, true) => "c_uint",
            (_, 0, false) => "c_int",
            (_, 1, true) => "c_ulong",
            (_, 1, false) => "c_long",
            (_, _, true) => "c_ulonglong",
            (_, _, false) => "c_longlong",
        };
        let _ = signed;
        Ok(ZigNode::ident(name))
    }

    fn parse_postfix(&mut self) -> ParseResult {
        let mut node = self.parse_primary()?;
        loop {
            match self.peek() {
                MacroTokenKind::Dot => {
                    self.pos += 1;
                    let MacroTokenKind::Identifier(field) = self.peek().clone() else {
                        return Err(self.error("expected field name after '.'"));
                    };
                    self.pos += 1;
                    node = ZigNode::field(node, field);
                }
                MacroTokenKind::Arrow => {
                    self.pos += 1;
                    let MacroTokenKind::Identifier(field) = self.peek().clone() else {
                        return Err(self.error("expected field name after '->'"));
                    };
                    self.pos += 1;
                    node = ZigNode::field(ZigNode::Deref(Box::new(node)), field);
                }
                MacroTokenKind::LBracket => {
                    self.pos += 1;
                    let index = self.parse_expr()?;
                    self.expect(&MacroTokenKind::RBracket)?;
                    node = ZigNode::Index {
                        lhs: Box::new(node),
                        index: Box::new(index),
                    };
                }
                MacroTokenKind::LParen => {
                    self.pos += 1;
                    let mut args = Vec::new();
                    if !matches!(self.peek(), MacroTokenKind::RParen) {
                        loop {
                            args.push(self.parse_cond_expr()?);
                            if !self.eat(&MacroTokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(&MacroTokenKind::RParen)?;
                    node = ZigNode::call(node, args);
                }
                MacroTokenKind::LBrace => {
                    return Err(self.error("initializer list in macro body"));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> ParseResult {
        match self.peek().clone() {
            MacroTokenKind::IntLiteral(text) => {
                self.pos += 1;
                let (body, suffix) = strip_int_suffix(&text);
                let node = ZigNode::int(normalize_int_text(body));
                Ok(match suffix {
                    Some(suffix) => ZigNode::builtin(
                        "as",
                        [ZigNode::ident(suffix.type_name()), node],
                    ),
                    None => node,
                })
            }
            MacroTokenKind::FloatLiteral(text) => {
                self.pos += 1;
                let (body, suffix) = strip_float_suffix(&text);
                let node = ZigNode::FloatLiteral(normalize_float_text(body));
                Ok(match suffix {
                    Some(suffix) => ZigNode::builtin(
                        "as",
                        [ZigNode::ident(suffix.type_name()), node],
                    ),
                    None => node,
                })
            }
            MacroTokenKind::CharLiteral { body, .. } => {
                self.pos += 1;
                let value = parse_char_value(&body)
                    .ok_or_else(|| self.error("empty character literal"))?;
                Ok(ZigNode::CharLiteral(value))
            }
            MacroTokenKind::StringLiteral { body, .. } => {
                self.pos += 1;
                let mut node = ZigNode::StringLiteral(unescape_c_bytes(&body));
                // Adjacent string literals (or a trailing identifier, the
                // macro-concat idiom) fuse with `++`.
                loop {
                    match self.peek().clone() {
                        MacroTokenKind::StringLiteral { body, .. } => {
                            self.pos += 1;
                            node = ZigNode::bin(
                                ZigBinOp::ArrayCat,
                                node,
                                ZigNode::StringLiteral(unescape_c_bytes(&body)),
                            );
                        }
                        MacroTokenKind::Identifier(name) => {
                            self.pos += 1;
                            let resolved = self.resolve_identifier(&name)?;
                            node = ZigNode::bin(ZigBinOp::ArrayCat, node, resolved);
                        }
                        _ => break,
                    }
                }
                Ok(node)
            }
            MacroTokenKind::Identifier(name) => {
                if TYPE_KEYWORDS.contains(&name.as_str()) {
                    return self.parse_type_name();
                }
                self.pos += 1;
                self.resolve_identifier(&name)
            }
            MacroTokenKind::LParen => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect(&MacroTokenKind::RParen)?;
                Ok(ZigNode::paren(inner))
            }
            other => Err(self.error(format!("unexpected token {:?}", other))),
        }
    }

    /// Macro parameters stay as-is; global names map to their emitted Zig
    /// spelling.
    fn resolve_identifier(&mut self, name: &str) -> ParseResult {
        if self.params.iter().any(|p| p == name) {
            return Ok(ZigNode::ident(name));
        }
        if let Some(&decl) = self.ctx.global_name_decls.get(name) {
            if let Some(emitted) = self.ctx.decl_table.get(&decl) {
                return Ok(ZigNode::ident(emitted.clone()));
            }
        }
        if let Some(&decl) = self.ctx.global_type_names.get(name) {
            return Ok(ZigNode::ident(self.ctx.decl_zig_name(decl)?));
        }
        Ok(ZigNode::ident(name))
    }
}
