//! # Parser Events
//!
//! The grammar never touches Rowan or byte offsets. It records what it saw
//! as a flat list of events and the [`Sink`](super::sink::Sink) turns that
//! list into a tree, token spans and positioned diagnostics in one pass.
//!
//! ```text
//! Start(PARAMETER)
//!   Start(TYPE_CONSTRAINT)
//!     Token(LBRACKET)
//!     Token(IDENT)
//!     Error("missing closing `]`")   ← ranged at the next raw token
//!   Finish
//!   Token(VARIABLE)
//! Finish
//! ```
//!
//! Every `Token` event consumes exactly one lexer token, so the sink's token
//! cursor always equals the parser position at which an event was recorded.
//! That is what lets an `Error` carry no offsets of its own.

use crate::syntax_kind::SyntaxKind;

/// An event recorded by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Open a node. `forward_parent` points at a later `Start` that must
    /// wrap this one; see [`CompletedMarker::precede`](super::CompletedMarker::precede).
    Start {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },

    /// Consume the next lexer token.
    Token { kind: SyntaxKind },

    /// Close the innermost open node.
    Finish,

    /// A diagnostic about the next unconsumed token (empty range at the end
    /// of input).
    Error { message: String },

    /// Slot reserved by `Parser::start`. Completing the marker turns it into
    /// a `Start`; the sink skips slots that were abandoned.
    Placeholder,
}
