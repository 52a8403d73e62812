//! Component C, stage 2 — the recursive-descent parser.
//!
//! Grounded on `upstat-io-sigil-lang`'s `ori_parser`: no parser-combinator
//! or generator crate, just a `Vec<Token>` cursor with one-token lookahead
//! and a handful of `parse_*` functions mirroring the grammar in
//! SPEC_FULL.md §6 one production at a time. Keywords (`message`, `head`,
//! `tail`, `tag`, `tags`, `struct`, `group`, `enum`, `consts`, `namespace`,
//! `using`) are not reserved lexer tokens; they are ordinary `Name` tokens
//! the parser recognizes contextually, same split as the lexer/parser
//! boundary in the teacher's inspiration source.

use crate::ast::*;
use crate::diagnostic::{Diagnostic, Span};
use crate::lexer::{Lexer, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type PResult<T> = Result<T, Diagnostic>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse_str(src: &str) -> PResult<RawUnit> {
        let tokens = Lexer::new(src).tokenize()?;
        Parser::new(tokens).parse_unit()
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn span(&self) -> Span {
        self.peek().span
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn unexpected(&self, expected: Vec<&'static str>) -> Diagnostic {
        let span = self.span();
        match &self.peek().kind {
            TokenKind::Eof => Diagnostic::UnexpectedEof { span, expected },
            other => Diagnostic::UnexpectedToken {
                span,
                found: other.describe().to_string(),
                expected,
            },
        }
    }

    fn expect_kind(&mut self, expected: &'static str, pred: impl Fn(&TokenKind) -> bool) -> PResult<Token> {
        if pred(&self.peek().kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(vec![expected]))
        }
    }

    fn expect_name(&mut self, expected: &'static str) -> PResult<Spanned<String>> {
        let span = self.span();
        match &self.peek().kind {
            TokenKind::Name(n) => {
                let n = n.clone();
                self.advance();
                Ok(Spanned::new(n, span))
            }
            _ => Err(self.unexpected(vec![expected])),
        }
    }

    fn expect_keyword(&mut self, kw: &'static str) -> PResult<Span> {
        let span = self.span();
        match &self.peek().kind {
            TokenKind::Name(n) if n == kw => {
                self.advance();
                Ok(span)
            }
            _ => Err(self.unexpected(vec![kw])),
        }
    }

    fn at_keyword(&self, kw: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Name(n) if n == kw)
    }

    fn expect_str(&mut self, expected: &'static str) -> PResult<Spanned<String>> {
        let span = self.span();
        match &self.peek().kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                Ok(Spanned::new(s, span))
            }
            _ => Err(self.unexpected(vec![expected])),
        }
    }

    fn expect_uint(&mut self, expected: &'static str) -> PResult<Spanned<u32>> {
        let span = self.span();
        match &self.peek().kind {
            TokenKind::Int(v) => {
                let v = *v;
                self.advance();
                Ok(Spanned::new(v as u32, span))
            }
            _ => Err(self.unexpected(vec![expected])),
        }
    }

    fn expect_int(&mut self, expected: &'static str) -> PResult<Spanned<i64>> {
        let span = self.span();
        let negative = matches!(self.peek().kind, TokenKind::Minus);
        if negative {
            self.advance();
        }
        match &self.peek().kind {
            TokenKind::Int(v) => {
                let v = *v as i64;
                self.advance();
                Ok(Spanned::new(if negative { -v } else { v }, span))
            }
            _ => Err(self.unexpected(vec![expected])),
        }
    }

    fn expect_punct(&mut self, kind: TokenKind, desc: &'static str) -> PResult<Span> {
        let span = self.span();
        if std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind) {
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(vec![desc]))
        }
    }

    pub fn parse_unit(&mut self) -> PResult<RawUnit> {
        let mut decls = Vec::new();
        while !self.is_eof() {
            decls.push(self.parse_decl()?);
        }
        Ok(RawUnit { decls })
    }

    fn parse_decl(&mut self) -> PResult<RawDecl> {
        if self.at_keyword("message") {
            Ok(RawDecl::Message(self.parse_message()?))
        } else if self.at_keyword("struct") {
            Ok(RawDecl::Struct(self.parse_struct()?))
        } else if self.at_keyword("enum") {
            Ok(RawDecl::Enum(self.parse_enum(EnumMode::Enum)?))
        } else if self.at_keyword("consts") {
            Ok(RawDecl::Enum(self.parse_enum(EnumMode::Consts)?))
        } else if self.at_keyword("namespace") {
            Ok(RawDecl::Namespace(self.parse_namespace()?))
        } else if self.at_keyword("using") {
            Ok(RawDecl::Using(self.parse_using()?))
        } else if self.at_keyword("group") {
            Ok(RawDecl::Group(self.parse_group()?))
        } else {
            Err(Diagnostic::UnexpectedTopLevelItem { span: self.span() })
        }
    }

    fn parse_message(&mut self) -> PResult<RawMessage> {
        let start = self.expect_keyword("message")?;
        let name = self.expect_name("a message name")?;
        let id = self.expect_uint("a message id")?;
        self.expect_punct(TokenKind::LBrace, "'{'")?;

        let mut head = None;
        let mut tail = None;
        while !matches!(self.peek().kind, TokenKind::RBrace) {
            if self.at_keyword("head") {
                if head.is_some() {
                    return Err(self.unexpected(vec!["'tail' or '}'"]));
                }
                head = Some(self.parse_head()?);
            } else if self.at_keyword("tail") {
                if tail.is_some() {
                    return Err(self.unexpected(vec!["'}'"]));
                }
                tail = Some(self.parse_tail()?);
            } else {
                return Err(self.unexpected(vec!["'head' or 'tail'"]));
            }
        }
        self.expect_punct(TokenKind::RBrace, "'}'")?;

        Ok(RawMessage { name, id, head, tail, span: start })
    }

    fn parse_head(&mut self) -> PResult<RawHead> {
        let start = self.expect_keyword("head")?;
        self.expect_punct(TokenKind::LParen, "'('")?;
        let size = self.expect_uint("the head size")?;
        self.expect_punct(TokenKind::RParen, "')'")?;
        self.expect_punct(TokenKind::Colon, "':'")?;

        let mut members = Vec::new();
        while !self.at_keyword("head") && !self.at_keyword("tail") && !matches!(self.peek().kind, TokenKind::RBrace) {
            members.push(self.parse_member()?);
        }
        Ok(RawHead { size, members, span: start })
    }

    fn parse_tail(&mut self) -> PResult<RawTail> {
        let start = self.expect_keyword("tail")?;
        self.expect_punct(TokenKind::Colon, "':'")?;

        let mut members = Vec::new();
        while !self.at_keyword("head") && !self.at_keyword("tail") && !matches!(self.peek().kind, TokenKind::RBrace) {
            members.push(self.parse_member()?);
        }
        Ok(RawTail { members, span: start })
    }

    fn parse_struct(&mut self) -> PResult<RawStruct> {
        let start = self.expect_keyword("struct")?;
        let name = self.expect_name("a struct name")?;
        self.expect_punct(TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace) {
            members.push(self.parse_member()?);
        }
        self.expect_punct(TokenKind::RBrace, "'}'")?;
        Ok(RawStruct { name, members, span: start })
    }

    fn parse_group(&mut self) -> PResult<RawGroup> {
        let start = self.expect_keyword("group")?;
        self.expect_punct(TokenKind::LBrace, "'{'")?;
        let mut messages = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace) {
            if !self.at_keyword("message") {
                return Err(Diagnostic::NestedGroup { span: self.span() });
            }
            messages.push(self.parse_message()?);
        }
        self.expect_punct(TokenKind::RBrace, "'}'")?;
        Ok(RawGroup { messages, span: start })
    }

    fn parse_member(&mut self) -> PResult<RawMember> {
        if self.at_keyword("tags") {
            let start = self.expect_keyword("tags")?;
            self.expect_punct(TokenKind::LBrace, "'{'")?;
            let mut members = Vec::new();
            while !matches!(self.peek().kind, TokenKind::RBrace) {
                if self.at_keyword("tags") {
                    return Err(Diagnostic::NestedTagsBlock { span: self.span() });
                }
                members.push(self.parse_member()?);
            }
            self.expect_punct(TokenKind::RBrace, "'}'")?;
            return Ok(RawMember::Tags { members, span: start });
        }

        let member_start = self.span();
        let tag = if self.at_keyword("tag") {
            let start = self.expect_keyword("tag")?;
            self.expect_punct(TokenKind::LParen, "'('")?;
            let value = self.expect_uint("a tag value")?;
            self.expect_punct(TokenKind::RParen, "')'")?;
            Some(Spanned::new(value.value, start))
        } else {
            None
        };

        let type_name = self.parse_type_expr()?;
        let name = self.expect_name("a member name")?;
        self.expect_punct(TokenKind::Semi, "';'")?;
        Ok(RawMember::Field { tag, type_name, name, span: member_start })
    }

    fn parse_type_expr(&mut self) -> PResult<Spanned<String>> {
        let span = self.span();
        let base = self.expect_name("a type name")?;
        let mut text = base.value;
        while matches!(self.peek().kind, TokenKind::LBracket) {
            self.advance();
            text.push('[');
            if let TokenKind::Int(n) = &self.peek().kind {
                let n = *n;
                self.advance();
                text.push_str(&n.to_string());
            }
            self.expect_punct(TokenKind::RBracket, "']'")?;
            text.push(']');
        }
        Ok(Spanned::new(text, span))
    }

    fn parse_enum(&mut self, mode: EnumMode) -> PResult<RawEnum> {
        let start = if mode == EnumMode::Enum {
            self.expect_keyword("enum")?
        } else {
            self.expect_keyword("consts")?
        };
        let name = self.expect_name("an enum name")?;
        let underlying = if mode == EnumMode::Consts {
            self.parse_type_expr()?
        } else {
            Spanned::new("int32".to_string(), start)
        };
        self.expect_punct(TokenKind::LBrace, "'{'")?;

        let mut members = vec![self.parse_enum_member()?];
        while matches!(self.peek().kind, TokenKind::Comma) {
            self.advance();
            if matches!(self.peek().kind, TokenKind::RBrace) {
                break;
            }
            members.push(self.parse_enum_member()?);
        }
        self.expect_punct(TokenKind::RBrace, "'}'")?;

        Ok(RawEnum { name, mode, underlying, members, span: start })
    }

    fn parse_enum_member(&mut self) -> PResult<RawEnumMember> {
        let name = self.expect_name("an enum member name")?;
        let span = name.span;
        let value = if matches!(self.peek().kind, TokenKind::Equals) {
            self.advance();
            Some(self.expect_int("an integer value")?)
        } else {
            None
        };
        Ok(RawEnumMember { name, value, span })
    }

    fn parse_namespace(&mut self) -> PResult<Spanned<String>> {
        self.expect_keyword("namespace")?;
        let name = self.expect_str("a namespace string")?;
        self.expect_punct(TokenKind::Semi, "';'")?;
        Ok(name)
    }

    fn parse_using(&mut self) -> PResult<RawUsing> {
        let start = self.expect_keyword("using")?;
        let from = self.expect_str("a fully-qualified name")?;
        self.expect_punct(TokenKind::Equals, "'='")?;
        let to = self.expect_str("a fully-qualified name")?;
        self.expect_punct(TokenKind::Semi, "';'")?;
        Ok(RawUsing { from, to, span: start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_message() {
        let unit = Parser::parse_str("message Empty 1 { head(8): }").unwrap();
        assert_eq!(unit.decls.len(), 1);
        match &unit.decls[0] {
            RawDecl::Message(m) => {
                assert_eq!(m.name.value, "Empty");
                assert_eq!(m.id.value, 1);
                assert!(m.head.is_some());
                assert!(m.tail.is_none());
                assert_eq!(m.head.as_ref().unwrap().size.value, 8);
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn parses_head_and_tail_with_members_and_array_type() {
        let src = r#"
            message Ping 42 {
                head(16):
                    uint32 seq;
                    uint8[4] flags;
                tail:
                    tags {
                        tag(1) string note;
                    }
            }
        "#;
        let unit = Parser::parse_str(src).unwrap();
        let RawDecl::Message(m) = &unit.decls[0] else { panic!("expected message") };
        let head = m.head.as_ref().unwrap();
        assert_eq!(head.members.len(), 2);
        match &head.members[1] {
            RawMember::Field { type_name, name, .. } => {
                assert_eq!(type_name.value, "uint8[4]");
                assert_eq!(name.value, "flags");
            }
            _ => panic!("expected field"),
        }
        let tail = m.tail.as_ref().unwrap();
        assert_eq!(tail.members.len(), 1);
        match &tail.members[0] {
            RawMember::Tags { members, .. } => assert_eq!(members.len(), 1),
            _ => panic!("expected tags block"),
        }
    }

    #[test]
    fn parses_struct_enum_consts_namespace_using_group() {
        let src = r#"
            namespace "proto.v1";
            using "OldName" = "proto.v1.NewName";
            struct Point { int32 x; int32 y; }
            enum Color { Red, Green, Blue = 5 }
            consts Flags uint16 { A = 1, B = 2 }
            group {
                message Inner 1 { head(8): }
            }
        "#;
        let unit = Parser::parse_str(src).unwrap();
        assert_eq!(unit.decls.len(), 6);
        assert!(matches!(unit.decls[0], RawDecl::Namespace(_)));
        assert!(matches!(unit.decls[1], RawDecl::Using(_)));
        assert!(matches!(unit.decls[2], RawDecl::Struct(_)));
        match &unit.decls[3] {
            RawDecl::Enum(e) => {
                assert_eq!(e.mode, EnumMode::Enum);
                assert_eq!(e.members.len(), 3);
                assert_eq!(e.members[2].value.as_ref().unwrap().value, 5);
            }
            _ => panic!("expected enum"),
        }
        match &unit.decls[4] {
            RawDecl::Enum(e) => {
                assert_eq!(e.mode, EnumMode::Consts);
                assert_eq!(e.underlying.value, "uint16");
            }
            _ => panic!("expected consts"),
        }
        match &unit.decls[5] {
            RawDecl::Group(g) => assert_eq!(g.messages.len(), 1),
            _ => panic!("expected group"),
        }
    }

    #[test]
    fn negative_enum_values_parse() {
        let unit = Parser::parse_str("enum E { A = -1 }").unwrap();
        match &unit.decls[0] {
            RawDecl::Enum(e) => assert_eq!(e.members[0].value.as_ref().unwrap().value, -1),
            _ => panic!("expected enum"),
        }
    }

    #[test]
    fn nested_tags_block_is_rejected() {
        let src = "message M 1 { head(8): tags { tags { tag(1) uint8 a; } } }";
        let err = Parser::parse_str(src).unwrap_err();
        assert!(matches!(err, Diagnostic::NestedTagsBlock { .. }));
    }

    #[test]
    fn group_cannot_nest_another_group() {
        let src = "group { group { } }";
        let err = Parser::parse_str(src).unwrap_err();
        assert!(matches!(err, Diagnostic::NestedGroup { .. }));
    }

    #[test]
    fn missing_closing_brace_is_unexpected_eof() {
        let err = Parser::parse_str("message M 1 { head(8):").unwrap_err();
        assert!(matches!(err, Diagnostic::UnexpectedEof { .. }));
    }

    #[test]
    fn unknown_top_level_item_is_reported() {
        let err = Parser::parse_str("bogus thing").unwrap_err();
        assert!(matches!(err, Diagnostic::UnexpectedTopLevelItem { .. }));
    }
}
