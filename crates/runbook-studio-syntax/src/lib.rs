//! # runbook-studio-syntax
//!
//! A lossless syntax tree for PowerShell-family runbook scripts using
//! [Rowan] + [Logos], following the [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## Why a Lossless CST?
//!
//! The editor reparses the script on every change and anchors diagnostics to
//! byte offsets in the text the user is looking at. A Concrete Syntax Tree
//! keeps **every byte** (whitespace, comments, broken fragments) so that
//! offsets in the tree are offsets in the document, and so that a half-typed
//! `param(` still produces a tree the parameter extractor can walk.
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! ```text
//! "param($x)" → [PARAM_KW, LPAREN, VARIABLE("$x"), RPAREN]
//! ```
//!
//! ### 2. Parser ([`parser`] module)
//!
//! The parser consumes tokens and emits **events** (Start, Token, Finish)
//! plus diagnostics. Only the structure needed to describe a runbook is
//! modelled in detail: function definitions, script blocks, `param(...)`
//! blocks, parameters and their attributes. Everything else is a generic
//! `STATEMENT`.
//!
//! ### 3. Sink ([`parser::sink`] module)
//!
//! The sink consumes events and builds an immutable, reference-counted
//! Rowan green tree. In the same pass it records each token's byte span and
//! gives every diagnostic its byte range.
//!
//! ### 4. Typed accessors ([`ast`] module)
//!
//! Typed views (`Script`, `FunctionDef`, `Parameter`, ...) over the untyped
//! tree for consumers that want to ask questions instead of walking nodes.
//!
//! ## Module Structure
//!
//! ```text
//! runbook-studio-syntax/
//! ├── lib.rs           # This file - public API and tree tests
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos-based tokenizer
//! ├── ast.rs           # Typed wrappers over syntax nodes
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system, public parse() function
//!     ├── event.rs     # Event enum (Start, Token, Finish, Error, Placeholder)
//!     ├── sink.rs      # Converts events to a Parse (tree, spans, diagnostics)
//!     └── grammar/
//!         ├── mod.rs   # Root script parsing
//!         ├── block.rs # Functions, script blocks, statements
//!         └── params.rs# param blocks, parameters, attributes
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use runbook_studio_syntax::{parse, SyntaxKind};
//!
//! let parse = parse("workflow Deploy {\n  param([string]$Target)\n}\n");
//! let tree = parse.syntax();
//!
//! // The tree preserves all text
//! assert_eq!(tree.text().to_string(), "workflow Deploy {\n  param([string]$Target)\n}\n");
//! assert!(parse.errors().is_empty());
//!
//! let function = tree.children().next().unwrap();
//! assert_eq!(function.kind(), SyntaxKind::FUNCTION_DEF);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use parser::{Parse, SyntaxError, TokenSpan, parse};
pub use syntax_kind::{RunbookLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
