//! Function definitions, script blocks and statements.

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

use super::{item, params};

/// Parse `function Name { ... }` (also `workflow` and `filter`).
pub(super) fn function_def(p: &mut Parser<'_, '_>) {
    let m = p.start();

    // function / workflow / filter
    p.bump();
    p.skip_inline_trivia();

    if at_name_part(p) {
        function_name(p);
    } else {
        p.error("expected function name");
    }

    p.skip_trivia();
    if p.at(SyntaxKind::LPAREN) {
        let params = p.start();
        params::parameter_list(p);
        params.complete(p, SyntaxKind::FUNCTION_PARAMS);
        p.skip_trivia();
    }

    if p.at(SyntaxKind::LBRACE) {
        script_block(p);
    } else {
        p.error("expected function body");
    }

    m.complete(p, SyntaxKind::FUNCTION_DEF);
}

fn at_name_part(p: &Parser<'_, '_>) -> bool {
    let kind = p.current();
    matches!(
        kind,
        SyntaxKind::IDENT | SyntaxKind::DASH | SyntaxKind::DOT | SyntaxKind::NUMBER
    ) || kind.is_function_keyword()
        || kind == SyntaxKind::PARAM_KW
        || (kind == SyntaxKind::OPERATOR && p.current_text() == ":")
}

/// Names like `Deploy-Site`, `Global:Invoke-Thing` or `Contoso.Sync`.
fn function_name(p: &mut Parser<'_, '_>) {
    let m = p.start();
    while at_name_part(p) {
        p.bump();
    }
    m.complete(p, SyntaxKind::FUNCTION_NAME);
}

/// Parse `{ ... }`.
pub(super) fn script_block(p: &mut Parser<'_, '_>) {
    let m = p.start();

    let entered = p.enter_block();
    if !entered {
        p.error("script blocks nested too deeply");
    }

    // {
    p.bump();

    if entered {
        block_items(p);
        p.exit_block();
    } else {
        block_tokens(p);
    }

    m.complete(p, SyntaxKind::SCRIPT_BLOCK);
}

fn block_items(p: &mut Parser<'_, '_>) {
    let mut seen_statement = false;
    loop {
        p.skip_trivia();
        match p.current() {
            SyntaxKind::RBRACE => {
                p.bump();
                break;
            }
            SyntaxKind::EOF => {
                p.error("missing closing `}`");
                break;
            }
            SyntaxKind::PARAM_KW if seen_statement => {
                p.error("param block must be the first statement in a script block");
                item(p);
            }
            _ => item(p),
        }
        seen_statement = true;
    }
}

/// Consume the rest of a block without structure, up to its closing `}`.
fn block_tokens(p: &mut Parser<'_, '_>) {
    let mut open = 0usize;
    loop {
        match p.current() {
            SyntaxKind::EOF => {
                p.error("missing closing `}`");
                break;
            }
            SyntaxKind::LBRACE => open += 1,
            SyntaxKind::RBRACE if open == 0 => {
                p.bump();
                break;
            }
            SyntaxKind::RBRACE => open -= 1,
            _ => {}
        }
        p.bump();
    }
}

/// Parse a statement the grammar does not model in detail.
pub(super) fn statement(p: &mut Parser<'_, '_>) {
    let m = p.start();
    statement_rest(p);
    m.complete(p, SyntaxKind::STATEMENT);
}

/// Consume statement tokens up to the end of the statement.
///
/// A statement ends at a newline or `;` outside of brackets, or at a `}` that
/// closes the enclosing block. A trailing `|` or backtick continues it onto
/// the next line.
pub(super) fn statement_rest(p: &mut Parser<'_, '_>) {
    let mut depth = 0usize;
    let mut continues = false;

    loop {
        match p.current() {
            SyntaxKind::EOF | SyntaxKind::RBRACE => break,
            SyntaxKind::NEWLINE if depth == 0 && !continues => break,
            SyntaxKind::SEMICOLON if depth == 0 => {
                p.bump();
                break;
            }
            SyntaxKind::LBRACE => {
                script_block(p);
                continues = false;
            }
            SyntaxKind::LPAREN | SyntaxKind::LBRACKET => {
                depth += 1;
                p.bump();
                continues = false;
            }
            SyntaxKind::RPAREN | SyntaxKind::RBRACKET => {
                if depth == 0 {
                    p.err_and_bump(format!("unbalanced `{}`", p.current_text()));
                } else {
                    depth -= 1;
                    p.bump();
                }
                continues = false;
            }
            SyntaxKind::OPERATOR if p.current_text() == "`" => {
                p.bump();
                continues = true;
            }
            SyntaxKind::PIPE => {
                p.bump();
                continues = true;
            }
            kind if kind.is_trivia() => p.bump(),
            _ => {
                p.bump();
                continues = false;
            }
        }
    }
}
