//! # Grammar Rules
//!
//! Each function takes a `&mut Parser` and uses its methods to:
//!
//! 1. Inspect the current token (`p.current()`, `p.at()`, `p.nth()`)
//! 2. Consume tokens (`p.bump()`, `p.eat()`, `p.skip_trivia()`)
//! 3. Build tree structure (`p.start()` → marker → `complete()`/`abandon()`)
//!
//! ## Module Structure
//!
//! - [`block`] - Function definitions, script blocks and generic statements
//! - [`params`] - `param(...)` blocks, parameters and attributes
//!
//! ## What Is Modelled
//!
//! Only the structure needed to find a runbook's parameters is parsed in
//! detail. Everything else is a `STATEMENT` holding its raw tokens, with
//! nested `{ ... }` parsed as script blocks so braces stay balanced.
//!
//! ## Error Recovery
//!
//! Grammar functions must be lenient - produce a tree even for invalid input.
//! When something unexpected happens they record an error, wrap the stray
//! token in an ERROR node or leave it for the enclosing rule, and continue.
//! Every rule must consume at least one token when called at a non-EOF
//! position, otherwise the loops in [`root`] and `block::script_block`
//! would never terminate.

mod block;
mod params;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root script.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    loop {
        p.skip_trivia();
        match p.current() {
            SyntaxKind::EOF => break,
            SyntaxKind::RBRACE | SyntaxKind::RPAREN | SyntaxKind::RBRACKET => {
                p.err_and_bump(format!("unexpected `{}`", p.current_text()));
            }
            _ => item(p),
        }
    }

    m.complete(p, SyntaxKind::ROOT);
}

/// Parse one statement-level item: a definition, a block or a statement.
fn item(p: &mut Parser<'_, '_>) {
    match p.current() {
        kind if kind.is_function_keyword() => block::function_def(p),
        SyntaxKind::LBRACE => block::script_block(p),
        SyntaxKind::PARAM_KW => params::param_block(p),
        SyntaxKind::LBRACKET => params::attributed(p),
        _ => block::statement(p),
    }
}
