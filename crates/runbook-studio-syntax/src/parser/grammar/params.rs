//! `param(...)` blocks, parameters and attributes.
//!
//! ```text
//! PARAM_BLOCK
//!   ATTRIBUTE          [CmdletBinding()]
//!   PARAM_KW           param
//!   LPAREN
//!   PARAMETER
//!     ATTRIBUTE        [Parameter(Mandatory)]
//!     TYPE_CONSTRAINT  [string[]]
//!       TYPE_NAME
//!       ARRAY_RANK
//!     VARIABLE         $Names
//!     DEFAULT_VALUE    = @('a')
//!   COMMA
//!   ...
//!   RPAREN
//! ```

use crate::parser::{CompletedMarker, Marker, Parser};
use crate::syntax_kind::SyntaxKind;

use super::block;

/// Parse `param(...)`.
pub(super) fn param_block(p: &mut Parser<'_, '_>) {
    let m = p.start();
    param_block_rest(p, m);
}

fn param_block_rest(p: &mut Parser<'_, '_>, m: Marker) -> CompletedMarker {
    // param
    p.bump();
    p.skip_trivia();

    if p.at(SyntaxKind::LPAREN) {
        parameter_list(p);
    } else {
        p.error("expected `(` after `param`");
    }

    m.complete(p, SyntaxKind::PARAM_BLOCK)
}

/// Parse a statement starting with `[`.
///
/// This is either a run of attributes decorating a `param(...)` block, such
/// as `[CmdletBinding()]`, or a statement starting with a type literal, such
/// as `[int]$x = 5` or `[Math]::Round(1.5)`.
pub(super) fn attributed(p: &mut Parser<'_, '_>) {
    let first = attribute(p);

    while p.peek_significant() == SyntaxKind::LBRACKET {
        p.skip_trivia();
        attribute(p);
    }

    if p.peek_significant() == SyntaxKind::PARAM_KW {
        p.skip_trivia();
        let m = first.precede(p);
        param_block_rest(p, m);
    } else {
        let m = first.precede(p);
        block::statement_rest(p);
        m.complete(p, SyntaxKind::STATEMENT);
    }
}

/// Parse `( parameter, parameter, ... )`.
pub(super) fn parameter_list(p: &mut Parser<'_, '_>) {
    // (
    p.bump();

    loop {
        p.skip_trivia();
        match p.current() {
            SyntaxKind::RPAREN => {
                p.bump();
                break;
            }
            SyntaxKind::EOF | SyntaxKind::RBRACE => {
                p.error("missing closing `)` in parameter list");
                break;
            }
            SyntaxKind::COMMA => p.err_and_bump("expected parameter before `,`"),
            _ => {
                parameter(p);
                p.skip_trivia();
                match p.current() {
                    SyntaxKind::COMMA => p.bump(),
                    SyntaxKind::RPAREN | SyntaxKind::EOF | SyntaxKind::RBRACE => {}
                    _ => p.error("expected `,` or `)` after parameter"),
                }
            }
        }
    }
}

/// Parse `[Attr()] [type] $Name = default`.
fn parameter(p: &mut Parser<'_, '_>) {
    if !p.at_any(&[SyntaxKind::LBRACKET, SyntaxKind::VARIABLE]) {
        p.err_and_bump("expected parameter");
        return;
    }

    let m = p.start();

    while p.at(SyntaxKind::LBRACKET) {
        attribute(p);
        p.skip_trivia();
    }

    if p.eat(SyntaxKind::VARIABLE) {
        if p.peek_significant() == SyntaxKind::EQ {
            p.skip_trivia();
            default_value(p);
        }
    } else {
        p.error("expected parameter variable");
    }

    m.complete(p, SyntaxKind::PARAMETER);
}

/// Parse `= expression`, ending at a `,` or `)` outside of brackets or at the
/// end of the line.
fn default_value(p: &mut Parser<'_, '_>) {
    let m = p.start();

    // =
    p.bump();
    p.skip_inline_trivia();

    let mut depth = 0usize;
    let mut empty = true;
    loop {
        match p.current() {
            SyntaxKind::EOF => break,
            SyntaxKind::COMMA | SyntaxKind::RPAREN | SyntaxKind::RBRACE if depth == 0 => break,
            SyntaxKind::NEWLINE if depth == 0 => break,
            SyntaxKind::LPAREN | SyntaxKind::LBRACKET | SyntaxKind::LBRACE => {
                depth += 1;
                p.bump();
                empty = false;
            }
            SyntaxKind::RPAREN | SyntaxKind::RBRACKET | SyntaxKind::RBRACE => {
                depth = depth.saturating_sub(1);
                p.bump();
                empty = false;
            }
            kind if kind.is_trivia() => p.bump(),
            _ => {
                p.bump();
                empty = false;
            }
        }
    }

    if empty {
        p.error("expected default value");
    }

    m.complete(p, SyntaxKind::DEFAULT_VALUE);
}

fn at_type_name(p: &Parser<'_, '_>) -> bool {
    let kind = p.current();
    kind == SyntaxKind::IDENT || kind.is_function_keyword() || kind == SyntaxKind::PARAM_KW
}

/// Parse `[Name]`, `[Name[]]` or `[Name(args)]`.
///
/// Completes as `ATTRIBUTE` when there is an argument list, otherwise as a
/// `TYPE_CONSTRAINT`.
fn attribute(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = p.start();

    // [
    p.bump();
    p.skip_inline_trivia();

    if at_type_name(p) {
        type_name(p);
    } else {
        p.error("expected type name");
    }

    if p.at(SyntaxKind::LBRACKET) {
        array_rank(p);
    }

    let has_args = p.at(SyntaxKind::LPAREN);
    if has_args {
        attribute_args(p);
    }

    p.skip_inline_trivia();
    if !p.eat(SyntaxKind::RBRACKET) {
        p.error("missing closing `]`");
    }

    let kind = if has_args {
        SyntaxKind::ATTRIBUTE
    } else {
        SyntaxKind::TYPE_CONSTRAINT
    };
    m.complete(p, kind)
}

/// Parse `System.Collections.Generic.List[string]`.
fn type_name(p: &mut Parser<'_, '_>) {
    let m = p.start();

    p.bump();
    while p.at(SyntaxKind::DOT) && p.nth(1) == SyntaxKind::IDENT {
        p.bump();
        p.bump();
    }

    // Generic arguments; `[]` and `[,]` are array ranks
    if p.at(SyntaxKind::LBRACKET)
        && !matches!(p.nth(1), SyntaxKind::RBRACKET | SyntaxKind::COMMA)
    {
        generic_args(p);
    }

    m.complete(p, SyntaxKind::TYPE_NAME);
}

fn generic_args(p: &mut Parser<'_, '_>) {
    let mut depth = 0usize;
    loop {
        match p.current() {
            SyntaxKind::EOF | SyntaxKind::NEWLINE => {
                p.error("missing closing `]` in generic arguments");
                break;
            }
            SyntaxKind::LBRACKET => {
                depth += 1;
                p.bump();
            }
            SyntaxKind::RBRACKET => {
                depth -= 1;
                p.bump();
                if depth == 0 {
                    break;
                }
            }
            _ => p.bump(),
        }
    }
}

/// Parse `[]`, `[,]`, `[,,]`.
fn array_rank(p: &mut Parser<'_, '_>) {
    let m = p.start();

    // [
    p.bump();
    while p.eat(SyntaxKind::COMMA) {}
    if !p.eat(SyntaxKind::RBRACKET) {
        p.error("expected `]` to close array rank");
    }

    m.complete(p, SyntaxKind::ARRAY_RANK);
}

/// Parse `(Mandatory = $true, Position = 0)` with balanced brackets.
fn attribute_args(p: &mut Parser<'_, '_>) {
    let m = p.start();

    // (
    p.bump();

    let mut depth = 0usize;
    loop {
        match p.current() {
            SyntaxKind::RPAREN if depth == 0 => {
                p.bump();
                break;
            }
            SyntaxKind::EOF => {
                p.error("missing closing `)` in attribute arguments");
                break;
            }
            SyntaxKind::RBRACKET if depth == 0 => {
                p.error("missing closing `)` in attribute arguments");
                break;
            }
            SyntaxKind::LPAREN | SyntaxKind::LBRACKET | SyntaxKind::LBRACE => {
                depth += 1;
                p.bump();
            }
            SyntaxKind::RPAREN | SyntaxKind::RBRACKET | SyntaxKind::RBRACE => {
                depth = depth.saturating_sub(1);
                p.bump();
            }
            _ => p.bump(),
        }
    }

    m.complete(p, SyntaxKind::ATTRIBUTE_ARGS);
}

#[cfg(test)]
mod tests {
    use crate::parser::parse;
    use crate::syntax_kind::{SyntaxKind, SyntaxNode};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn child_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|n| n.kind()).collect()
    }

    fn find(node: &SyntaxNode, kind: SyntaxKind) -> Vec<SyntaxNode> {
        node.descendants().filter(|n| n.kind() == kind).collect()
    }

    #[test]
    fn param_block_with_typed_parameters() {
        let input = "param(\n  [Parameter(Mandatory=$true)]\n  [string]$Name,\n  [int]$Count = 3\n)\n";
        let parse = parse(input);
        assert!(!parse.has_errors(), "{:?}", parse.errors());

        let root = parse.syntax();
        assert_eq!(child_kinds(&root), vec![SyntaxKind::PARAM_BLOCK]);

        let params = find(&root, SyntaxKind::PARAMETER);
        assert_eq!(params.len(), 2);
        assert_eq!(
            child_kinds(&params[0]),
            vec![SyntaxKind::ATTRIBUTE, SyntaxKind::TYPE_CONSTRAINT]
        );
        assert_eq!(
            child_kinds(&params[1]),
            vec![SyntaxKind::TYPE_CONSTRAINT, SyntaxKind::DEFAULT_VALUE]
        );
        assert_eq!(
            find(&params[1], SyntaxKind::DEFAULT_VALUE)[0]
                .text()
                .to_string(),
            "= 3"
        );
    }

    #[test]
    fn cmdlet_binding_belongs_to_param_block() {
        let parse = parse("[CmdletBinding()]\nparam([string]$Name)\n");
        assert!(!parse.has_errors());

        let root = parse.syntax();
        assert_eq!(child_kinds(&root), vec![SyntaxKind::PARAM_BLOCK]);
        let block = root.first_child().unwrap();
        assert_eq!(
            child_kinds(&block),
            vec![SyntaxKind::ATTRIBUTE, SyntaxKind::PARAMETER]
        );
    }

    #[test]
    fn type_literal_starts_a_statement() {
        let parse = parse("[int]$x = 5\n[Math]::Round(1.5)\n");
        assert!(!parse.has_errors());
        assert_eq!(
            child_kinds(&parse.syntax()),
            vec![SyntaxKind::STATEMENT, SyntaxKind::STATEMENT]
        );
    }

    #[rstest]
    #[case("[string[]]$Names", "string", 1)]
    #[case("[int[,]]$Grid", "int", 1)]
    #[case("[System.IO.FileInfo]$File", "System.IO.FileInfo", 0)]
    #[case(
        "[System.Collections.Generic.List[string]]$Items",
        "System.Collections.Generic.List[string]",
        0
    )]
    #[case("[Dictionary[string,int][]]$Maps", "Dictionary[string,int]", 1)]
    fn type_constraints(#[case] param: &str, #[case] type_name: &str, #[case] ranks: usize) {
        let parse = parse(&format!("param({param})"));
        assert!(!parse.has_errors(), "{:?}", parse.errors());

        let root = parse.syntax();
        let names = find(&root, SyntaxKind::TYPE_NAME);
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].text().to_string(), type_name);
        assert_eq!(find(&root, SyntaxKind::ARRAY_RANK).len(), ranks);
    }

    #[test]
    fn default_value_with_nested_commas() {
        let parse = parse("param($Items = @('a', 'b'), $Other)");
        assert!(!parse.has_errors());

        let root = parse.syntax();
        assert_eq!(find(&root, SyntaxKind::PARAMETER).len(), 2);
        assert_eq!(
            find(&root, SyntaxKind::DEFAULT_VALUE)[0].text().to_string(),
            "= @('a', 'b')"
        );
    }

    #[test]
    fn attribute_arguments_with_script_block() {
        let parse = parse("param([ValidateScript({ $_ -gt 0 })][int]$N)");
        assert!(!parse.has_errors());
        let args = find(&parse.syntax(), SyntaxKind::ATTRIBUTE_ARGS);
        assert_eq!(args[0].text().to_string(), "({ $_ -gt 0 })");
    }

    #[test]
    fn function_parameter_list() {
        let parse = parse("function Add([int]$a, [int]$b) { $a + $b }\n");
        assert!(!parse.has_errors());
        let root = parse.syntax();
        assert_eq!(find(&root, SyntaxKind::FUNCTION_PARAMS).len(), 1);
        assert_eq!(find(&root, SyntaxKind::PARAMETER).len(), 2);
    }

    #[rstest]
    #[case("param([string]$Name", "missing closing `)` in parameter list")]
    #[case("param", "expected `(` after `param`")]
    #[case("param([string $Name)", "missing closing `]`")]
    #[case("param([]$Name)", "expected type name")]
    #[case("param($Name = )", "expected default value")]
    #[case("param(, $Name)", "expected parameter before `,`")]
    #[case("param([string])", "expected parameter variable")]
    fn malformed_param_blocks(#[case] input: &str, #[case] message: &str) {
        let parse = parse(input);
        assert_eq!(parse.syntax().text().to_string(), input);
        assert!(
            parse.errors().iter().any(|e| e.message == message),
            "expected {message:?} in {:?}",
            parse.errors()
        );
    }
}
