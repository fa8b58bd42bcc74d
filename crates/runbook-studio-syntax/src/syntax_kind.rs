//! SyntaxKind enum for all tokens and nodes in the runbook CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte in the source must appear as a token in the tree.

/// All syntax kinds for the runbook CST.
///
/// This enum represents both tokens (lexer output) and composite nodes (parser output).
/// The `repr(u16)` ensures efficient storage in rowan's green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (lexer output) ===
    /// Horizontal whitespace (spaces, tabs)
    WHITESPACE,
    /// Line ending
    NEWLINE,
    /// `# ...` up to the end of the line
    COMMENT,
    /// `<# ... #>`
    BLOCK_COMMENT,
    /// Bare word: command names, type names, attribute names
    IDENT,
    /// `$name`, `$scope:name` or `${any name}`
    VARIABLE,
    /// Single or double quoted string
    STRING,
    /// Integer or decimal literal
    NUMBER,
    /// `function` (case-insensitive)
    FUNCTION_KW,
    /// `workflow` (case-insensitive)
    WORKFLOW_KW,
    /// `filter` (case-insensitive)
    FILTER_KW,
    /// `param` (case-insensitive)
    PARAM_KW,
    /// `(`
    LPAREN,
    /// `)`
    RPAREN,
    /// `{`
    LBRACE,
    /// `}`
    RBRACE,
    /// `[`
    LBRACKET,
    /// `]`
    RBRACKET,
    /// `,`
    COMMA,
    /// `;`
    SEMICOLON,
    /// `=`
    EQ,
    /// `.`
    DOT,
    /// `@` (array and hashtable literals, splatting)
    AT,
    /// `|`
    PIPE,
    /// `-` (also the start of operators like `-eq`)
    DASH,
    /// Any other operator character
    OPERATOR,
    /// Bytes the lexer could not classify (unterminated strings, stray `$`)
    UNKNOWN,
    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root script node
    ROOT,
    /// `function`/`workflow`/`filter` definition
    FUNCTION_DEF,
    /// The name following the function keyword
    FUNCTION_NAME,
    /// Parenthesised parameters written directly after a function name
    FUNCTION_PARAMS,
    /// `{ ... }`
    SCRIPT_BLOCK,
    /// `param(...)`, including attributes written before the keyword
    PARAM_BLOCK,
    /// A single parameter inside a param block
    PARAMETER,
    /// `[Name(args)]`
    ATTRIBUTE,
    /// `[Name]` with no arguments
    TYPE_CONSTRAINT,
    /// Dotted type or attribute name
    TYPE_NAME,
    /// `[]` or `[,]` after a type name
    ARRAY_RANK,
    /// Parenthesised attribute arguments
    ATTRIBUTE_ARGS,
    /// `= value` after a parameter variable
    DEFAULT_VALUE,
    /// Any statement the grammar does not model further
    STATEMENT,

    /// Error recovery node
    ERROR,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace, newlines, comments).
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::NEWLINE | Self::COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Returns true for the keywords that introduce a function definition.
    pub fn is_function_keyword(self) -> bool {
        matches!(self, Self::FUNCTION_KW | Self::WORKFLOW_KW | Self::FILTER_KW)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunbookLang {}

impl rowan::Language for RunbookLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::ERROR as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<RunbookLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<RunbookLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<RunbookLang>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn token_kinds_are_tokens() {
        assert!(SyntaxKind::WHITESPACE.is_token());
        assert!(SyntaxKind::VARIABLE.is_token());
        assert!(SyntaxKind::EOF.is_token());
    }

    #[test]
    fn node_kinds_are_nodes() {
        assert!(SyntaxKind::ROOT.is_node());
        assert!(SyntaxKind::PARAM_BLOCK.is_node());
        assert!(SyntaxKind::ERROR.is_node());
    }

    #[test]
    fn trivia_detection() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::NEWLINE.is_trivia());
        assert!(SyntaxKind::BLOCK_COMMENT.is_trivia());
        assert!(!SyntaxKind::IDENT.is_trivia());
    }

    #[test]
    fn function_keywords() {
        assert!(SyntaxKind::WORKFLOW_KW.is_function_keyword());
        assert!(!SyntaxKind::PARAM_KW.is_function_keyword());
    }

    #[test]
    fn rowan_conversion_roundtrip() {
        let kind = SyntaxKind::PARAMETER;
        let raw: rowan::SyntaxKind = kind.into();
        let back = RunbookLang::kind_from_raw(raw);
        assert_eq!(kind, back);
    }
}
