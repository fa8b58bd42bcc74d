//! # Parser - Event-Based Tree Construction
//!
//! This module implements the core parsing logic, transforming a token stream
//! into a syntax tree using the **event-based** architecture from rust-analyzer.
//!
//! ## Why Event-Based Parsing?
//!
//! Runbooks are parsed while the user is typing them, so the parser sees
//! half-written functions, unclosed `param(` lists and stray brackets all the
//! time. Emitting a flat list of [`Event`]s instead of building the tree
//! directly keeps error recovery simple: a grammar rule can always finish the
//! node it started and move on. The [`Sink`] then builds the actual Rowan tree.
//!
//! ## The Marker System
//!
//! When you call `parser.start()`, you get a [`Marker`]. This marker **must**
//! be either:
//!
//! - Completed with `marker.complete(parser, KIND)` → emits Start+Finish
//! - Abandoned with `marker.abandon(parser)` → removes the placeholder
//!
//! If you drop a marker without doing either, **the program panics**.
//!
//! ```ignore
//! let m = parser.start();
//! parser.bump();
//! m.complete(parser, SyntaxKind::STATEMENT);
//! ```
//!
//! ## Forward Parent Links
//!
//! Attributes are parsed before the parser knows what they decorate:
//! `[CmdletBinding()]` may belong to a `param(...)` block or start a cast
//! expression. `CompletedMarker::precede()` wraps the already-parsed
//! attributes in whichever parent turns out to be right.
//!
//! ## Diagnostics
//!
//! Grammar rules never fail. They record an error event in front of the
//! offending token and keep going, so every input yields a tree. The [`Sink`]
//! gives each diagnostic its byte range while it lays out the tokens.
//!
//! ## Nesting
//!
//! Script blocks are the only rule that can recurse into itself. Past
//! [`MAX_BLOCK_DEPTH`] levels a block is reported once and its remaining
//! tokens are kept flat inside it, so pasted or generated text cannot exhaust
//! the stack.

pub mod event;
pub mod sink;

mod grammar;

use std::ops::Range;

use rowan::GreenNode;

use crate::lexer::{Token, lex};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// A diagnostic produced while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// Byte range in the source the diagnostic points at. Empty at end of input.
    pub range: Range<usize>,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.range.start, self.range.end)
    }
}

/// A lexed token with its position, detached from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpan {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
}

/// The result of parsing a script: tokens, tree and diagnostics.
///
/// Holds a green tree, so it is `Send + Sync` and can be produced on any
/// thread and inspected on another.
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    tokens: Vec<TokenSpan>,
    errors: Vec<SyntaxError>,
}

impl Parse {
    /// The root of the syntax tree.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn tokens(&self) -> &[TokenSpan] {
        &self.tokens
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Script blocks nested deeper than this are not parsed into structure.
pub const MAX_BLOCK_DEPTH: usize = 128;

/// The parser state machine.
///
/// Grammar functions receive `&mut Parser` and use its methods to:
///
/// - Inspect tokens: `current()`, `nth()`, `at()`, `at_end()`
/// - Consume tokens: `bump()`, `eat()`, `skip_trivia()`
/// - Build structure: `start()` → `Marker` → `complete()`/`abandon()`
/// - Report problems: `error()`
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    events: Vec<Event>,
    /// Script blocks currently open.
    block_depth: usize,
}

impl<'t, 'input> Parser<'t, 'input> {
    /// Create a new parser from a slice of tokens.
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            block_depth: 0,
        }
    }

    /// Run the grammar and hand the events to the [`Sink`].
    pub fn finish(mut self) -> Parse {
        grammar::root(&mut self);
        Sink::new(self.tokens, self.events).finish()
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    /// Current token kind, or EOF if past end.
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    /// Check if at end of input.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Check if current token is of given kind.
    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Check if current token is any of the given kinds.
    pub fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        if !self.at_end() {
            let kind = self.current();
            self.events.push(Event::Token { kind });
            self.pos += 1;
        }
    }

    /// Consume whitespace, newlines and comments into the current node.
    pub fn skip_trivia(&mut self) {
        while self.current().is_trivia() {
            self.bump();
        }
    }

    /// Consume horizontal whitespace and comments, stopping at a newline.
    pub fn skip_inline_trivia(&mut self) {
        while self.current().is_trivia() && !self.at(SyntaxKind::NEWLINE) {
            self.bump();
        }
    }

    /// Kind of the first non-trivia token at or after the cursor.
    pub fn peek_significant(&self) -> SyntaxKind {
        let mut n = 0;
        while self.nth(n).is_trivia() {
            n += 1;
        }
        self.nth(n)
    }

    /// Get the text of the current token.
    pub fn current_text(&self) -> &'input str {
        self.tokens.get(self.pos).map(|t| t.text).unwrap_or("")
    }

    /// Record a diagnostic at the current token.
    pub fn error(&mut self, message: impl Into<String>) {
        self.events.push(Event::Error {
            message: message.into(),
        });
    }

    /// Enter a script block. Returns false once [`MAX_BLOCK_DEPTH`] blocks
    /// are open, in which case nothing was entered.
    pub fn enter_block(&mut self) -> bool {
        if self.block_depth >= MAX_BLOCK_DEPTH {
            return false;
        }
        self.block_depth += 1;
        true
    }

    pub fn exit_block(&mut self) {
        self.block_depth = self.block_depth.saturating_sub(1);
    }

    /// Record a diagnostic and wrap the current token in an ERROR node.
    pub fn err_and_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        let m = self.start();
        self.bump();
        m.complete(self, SyntaxKind::ERROR);
    }
}

/// A marker for a node being constructed.
///
/// When you call `parser.start()`, a `Placeholder` event is pushed and you
/// get a `Marker` pointing to it. It must be completed or abandoned; dropping
/// it is a bug and panics.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Position in the events vector where our Placeholder lives
    pos: usize,
    /// Tracks whether complete() or abandon() was called
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::Start {
            kind,
            forward_parent: None,
        };
        p.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }

    /// Abandon this marker without creating a node.
    ///
    /// Only removes the placeholder if it's the last event; otherwise the
    /// placeholder stays and the Sink ignores it.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// A marker for a node that has been completed.
///
/// The only thing you can do with a `CompletedMarker` is call `precede()`
/// to wrap the completed node in a new parent.
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    /// Position of the Start event for this completed node
    pos: usize,
}

impl CompletedMarker {
    /// Create a new parent node that will contain this node and everything
    /// parsed after it until the returned marker is completed.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let new_pos = p.events.len();
        p.events.push(Event::Placeholder);

        if let Event::Start { forward_parent, .. } = &mut p.events[self.pos] {
            *forward_parent = Some(new_pos);
        }

        Marker {
            pos: new_pos,
            completed: false,
        }
    }
}

/// Parse script source into tokens, a syntax tree and diagnostics.
pub fn parse(source: &str) -> Parse {
    let tokens = lex(source);
    Parser::new(&tokens).finish()
}
