//! # Lexer - Tokenizing Runbook Source
//!
//! This module provides the first stage of parsing: breaking script text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! **Every byte in the input appears in exactly one token**. Nothing is
//! skipped, not even comments, so the syntax tree can always reproduce the
//! document the user is editing:
//!
//! ```
//! use runbook_studio_syntax::lexer::lex;
//!
//! let input = "workflow Deploy { param([string]$Target) }\n";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Keywords
//!
//! PowerShell keywords are case-insensitive (`Param`, `PARAM` and `param` are
//! the same keyword). Logos matches them as plain identifiers and [`lex`]
//! promotes the handful the grammar cares about (`function`, `workflow`,
//! `filter`, `param`) to their keyword kinds afterwards.
//!
//! ## Public API
//!
//! - [`lex`] - Tokenize input, returning `Vec<Token>`
//! - [`lex_with_spans`] - Tokenize with byte offset spans
//! - [`Token`] - A token with its kind and text slice

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// This enum exists separately from [`SyntaxKind`] because Logos needs to
/// derive on it. Each variant maps to a corresponding `SyntaxKind` token.
///
/// [`SyntaxKind`]: crate::syntax_kind::SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF or CRLF)
    #[regex(r"\r?\n")]
    Newline,

    /// Line comment
    #[regex(r"#[^\r\n]*")]
    Comment,

    /// Block comment, `<# ... #>`
    #[regex(r"<#([^#]|#+[^#>])*#+>")]
    BlockComment,

    /// Words: commands (`Write-Output`), type names, keywords
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(-[A-Za-z0-9_]+)*")]
    Ident,

    /// Variables
    #[regex(r"\$[A-Za-z0-9_]+")]
    #[regex(r"\$\{[^}]*\}")]
    #[regex(r"\$[?^$]")]
    Variable,

    /// Expandable or verbatim string
    #[regex(r#""([^"`]|`[^\n]|`\n)*""#)]
    #[regex(r"'([^']|'')*'")]
    String,

    /// Numeric literal
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token("=")]
    Eq,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    #[token("|")]
    Pipe,

    #[token("-")]
    Dash,

    /// Remaining operator characters, including the backtick line continuation
    #[regex(r"[+*/!<>%&:?~^`\\]")]
    Operator,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::Comment => SyntaxKind::COMMENT,
            TokenKind::BlockComment => SyntaxKind::BLOCK_COMMENT,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::Variable => SyntaxKind::VARIABLE,
            TokenKind::String => SyntaxKind::STRING,
            TokenKind::Number => SyntaxKind::NUMBER,
            TokenKind::LParen => SyntaxKind::LPAREN,
            TokenKind::RParen => SyntaxKind::RPAREN,
            TokenKind::LBrace => SyntaxKind::LBRACE,
            TokenKind::RBrace => SyntaxKind::RBRACE,
            TokenKind::LBracket => SyntaxKind::LBRACKET,
            TokenKind::RBracket => SyntaxKind::RBRACKET,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::At => SyntaxKind::AT,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::Dash => SyntaxKind::DASH,
            TokenKind::Operator => SyntaxKind::OPERATOR,
        }
    }
}

/// Promote identifiers that spell one of the grammar's keywords.
fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    const KEYWORDS: [(&str, SyntaxKind); 4] = [
        ("function", SyntaxKind::FUNCTION_KW),
        ("workflow", SyntaxKind::WORKFLOW_KW),
        ("filter", SyntaxKind::FILTER_KW),
        ("param", SyntaxKind::PARAM_KW),
    ];

    KEYWORDS
        .iter()
        .find(|(keyword, _)| text.eq_ignore_ascii_case(keyword))
        .map(|(_, kind)| *kind)
}

fn classify(result: Result<TokenKind, ()>, text: &str) -> SyntaxKind {
    match result {
        Ok(TokenKind::Ident) => keyword_kind(text).unwrap_or(SyntaxKind::IDENT),
        Ok(token_kind) => token_kind.to_syntax_kind(),
        // Unterminated strings, lone `$` and non-ASCII symbols
        Err(()) => SyntaxKind::UNKNOWN,
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let kind = classify(result, text);
        tokens.push((Token { kind, text }, span));
    }

    tokens
}
