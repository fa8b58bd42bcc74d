//! # Typed AST Accessors
//!
//! Thin typed views over the untyped [`SyntaxNode`] tree, in the style of
//! rust-analyzer's `ast` module. Each wrapper is a cheap handle around a node
//! of one kind; accessors walk its children on demand and return `None` where
//! error recovery left a piece out.
//!
//! ```
//! use runbook_studio_syntax::{parse, ast::Script};
//!
//! let parse = parse("workflow Deploy { param([string]$Target) }");
//! let script = Script::new(parse.syntax()).unwrap();
//! let entry = script.entry_point().unwrap();
//!
//! let params = entry.parameters();
//! assert_eq!(params[0].name().as_deref(), Some("Target"));
//! ```

use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// A typed view of a syntax node.
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;

    fn cast(node: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                Self::can_cast(node.kind()).then(|| Self(node))
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(
    /// The whole script.
    Script, ROOT
);
ast_node!(
    /// `function`, `workflow` or `filter` definition.
    FunctionDef, FUNCTION_DEF
);
ast_node!(ScriptBlock, SCRIPT_BLOCK);
ast_node!(ParamBlock, PARAM_BLOCK);
ast_node!(Parameter, PARAMETER);
ast_node!(
    /// `[Name(args)]` or a bare type constraint `[Name]`.
    Attribute, ATTRIBUTE | TYPE_CONSTRAINT
);
ast_node!(TypeName, TYPE_NAME);

fn child<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

fn children<N: AstNode>(parent: &SyntaxNode) -> impl Iterator<Item = N> {
    parent.children().filter_map(N::cast)
}

fn token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == kind)
}

/// Node text with trivia removed.
fn significant_text(node: &SyntaxNode) -> String {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
        .map(|token| token.text().to_string())
        .collect()
}

/// The name a variable token refers to: `$Name` → `Name`, `${a b}` → `a b`.
pub fn variable_name(text: &str) -> &str {
    let name = text.strip_prefix('$').unwrap_or(text);
    name.strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(name)
}

/// The construct whose parameters describe a runbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPoint {
    Function(FunctionDef),
    ScriptBlock(ScriptBlock),
}

impl EntryPoint {
    pub fn body(&self) -> Option<ScriptBlock> {
        match self {
            EntryPoint::Function(function) => function.body(),
            EntryPoint::ScriptBlock(block) => Some(block.clone()),
        }
    }

    /// Parameters from the body's `param(...)` block, or failing that from a
    /// parameter list written after the function name.
    pub fn parameters(&self) -> Vec<Parameter> {
        if let Some(block) = self.body().and_then(|body| body.param_block()) {
            return block.parameters().collect();
        }
        match self {
            EntryPoint::Function(function) => function.signature_parameters().collect(),
            EntryPoint::ScriptBlock(_) => Vec::new(),
        }
    }
}

impl Script {
    pub fn new(root: SyntaxNode) -> Option<Self> {
        Self::cast(root)
    }

    pub fn functions(&self) -> impl Iterator<Item = FunctionDef> {
        children(&self.0)
    }

    /// The first top-level function with a body, or the first top-level
    /// script block, whichever comes first.
    pub fn entry_point(&self) -> Option<EntryPoint> {
        self.0.children().find_map(|node| match node.kind() {
            SyntaxKind::FUNCTION_DEF => FunctionDef::cast(node)
                .filter(|function| function.body().is_some())
                .map(EntryPoint::Function),
            SyntaxKind::SCRIPT_BLOCK => ScriptBlock::cast(node).map(EntryPoint::ScriptBlock),
            _ => None,
        })
    }
}

impl FunctionDef {
    /// `function`, `workflow` or `filter`.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind().is_function_keyword())
    }

    pub fn name(&self) -> Option<String> {
        self.0
            .children()
            .find(|node| node.kind() == SyntaxKind::FUNCTION_NAME)
            .map(|node| node.text().to_string())
    }

    pub fn body(&self) -> Option<ScriptBlock> {
        child(&self.0)
    }

    /// Parameters of `function Name($a, $b) { ... }`.
    pub fn signature_parameters(&self) -> impl Iterator<Item = Parameter> {
        self.0
            .children()
            .find(|node| node.kind() == SyntaxKind::FUNCTION_PARAMS)
            .into_iter()
            .flat_map(|node| children::<Parameter>(&node).collect::<Vec<_>>())
    }
}

impl ScriptBlock {
    pub fn param_block(&self) -> Option<ParamBlock> {
        child(&self.0)
    }
}

impl ParamBlock {
    /// Attributes written before `param`, e.g. `[CmdletBinding()]`.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> {
        children(&self.0)
    }

    pub fn parameters(&self) -> impl Iterator<Item = Parameter> {
        children(&self.0)
    }
}

impl Parameter {
    /// Attributes and type constraints in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> {
        children(&self.0)
    }

    pub fn variable(&self) -> Option<SyntaxToken> {
        token(&self.0, SyntaxKind::VARIABLE)
    }

    /// Variable name without the `$` sigil.
    pub fn name(&self) -> Option<String> {
        self.variable()
            .map(|token| variable_name(token.text()).to_string())
    }

    /// Default value expression without the leading `=`.
    pub fn default_value(&self) -> Option<String> {
        let node = self
            .0
            .children()
            .find(|node| node.kind() == SyntaxKind::DEFAULT_VALUE)?;
        let text = node.text().to_string();
        Some(text.trim_start_matches('=').trim().to_string())
    }
}

impl Attribute {
    /// True for `[Name]` and `[Name[]]`, false for `[Name(...)]`.
    pub fn is_type_constraint(&self) -> bool {
        self.0.kind() == SyntaxKind::TYPE_CONSTRAINT
    }

    pub fn type_name(&self) -> Option<TypeName> {
        child(&self.0)
    }

    /// True when the type carries an array rank, as in `[string[]]`.
    pub fn is_array(&self) -> bool {
        self.0
            .children()
            .any(|node| node.kind() == SyntaxKind::ARRAY_RANK)
    }

    /// Argument list text including the parentheses.
    pub fn arguments(&self) -> Option<String> {
        self.0
            .children()
            .find(|node| node.kind() == SyntaxKind::ATTRIBUTE_ARGS)
            .map(|node| node.text().to_string())
    }
}

impl TypeName {
    /// The type name as written, without whitespace or comments.
    pub fn text(&self) -> String {
        significant_text(&self.0)
    }
}
