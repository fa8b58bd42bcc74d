//! Replays parser events against the lexer tokens.
//!
//! One pass produces everything a [`Parse`] holds: the green tree, the span
//! of every token and the byte range of every diagnostic. Offsets are only
//! ever computed here.

use std::ops::Range;

use rowan::GreenNodeBuilder;

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::parser::{Parse, SyntaxError, TokenSpan};
use crate::syntax_kind::SyntaxKind;

pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    tokens: &'t [Token<'input>],
    events: Vec<Event>,
    /// Index of the next unconsumed token.
    cursor: usize,
    /// Byte offset where that token starts.
    offset: usize,
    spans: Vec<TokenSpan>,
    errors: Vec<SyntaxError>,
}

impl<'t, 'input> Sink<'t, 'input> {
    pub fn new(tokens: &'t [Token<'input>], events: Vec<Event>) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens,
            events,
            cursor: 0,
            offset: 0,
            spans: Vec::with_capacity(tokens.len()),
            errors: Vec::new(),
        }
    }

    pub fn finish(mut self) -> Parse {
        for i in 0..self.events.len() {
            match std::mem::replace(&mut self.events[i], Event::Placeholder) {
                Event::Start {
                    kind,
                    forward_parent,
                } => self.open(kind, forward_parent),
                Event::Token { kind } => self.token(kind),
                Event::Finish => self.builder.finish_node(),
                Event::Error { message } => {
                    let range = self.next_token_range();
                    self.errors.push(SyntaxError { message, range });
                }
                Event::Placeholder => {}
            }
        }

        Parse {
            green: self.builder.finish(),
            tokens: self.spans,
            errors: self.errors,
        }
    }

    /// Open `kind` together with every node that was made to precede it.
    ///
    /// The chain is recorded innermost first and opened outermost first.
    /// Each linked `Start` is taken out of the event list so the main loop
    /// does not open it a second time.
    fn open(&mut self, kind: SyntaxKind, mut forward_parent: Option<usize>) {
        let mut chain = vec![kind];
        while let Some(index) = forward_parent {
            forward_parent = match std::mem::replace(&mut self.events[index], Event::Placeholder) {
                Event::Start {
                    kind,
                    forward_parent,
                } => {
                    chain.push(kind);
                    forward_parent
                }
                _ => None,
            };
        }

        for kind in chain.into_iter().rev() {
            self.builder.start_node(kind.into());
        }
    }

    fn token(&mut self, kind: SyntaxKind) {
        let Some(token) = self.tokens.get(self.cursor) else {
            return;
        };
        let range = self.next_token_range();
        self.builder.token(kind.into(), token.text);
        self.spans.push(TokenSpan {
            kind: token.kind,
            range: range.clone(),
        });
        self.cursor += 1;
        self.offset = range.end;
    }

    fn next_token_range(&self) -> Range<usize> {
        let len = self.tokens.get(self.cursor).map_or(0, |t| t.text.len());
        self.offset..self.offset + len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use pretty_assertions::assert_eq;

    fn start(kind: SyntaxKind) -> Event {
        Event::Start {
            kind,
            forward_parent: None,
        }
    }

    fn error(message: &str) -> Event {
        Event::Error {
            message: message.to_string(),
        }
    }

    #[test]
    fn sink_builds_tree_and_spans() {
        let tokens = lex("Get-Date -Format s");
        let events = std::iter::once(start(SyntaxKind::ROOT))
            .chain(std::iter::once(start(SyntaxKind::STATEMENT)))
            .chain(tokens.iter().map(|t| Event::Token { kind: t.kind }))
            .chain([Event::Finish, Event::Finish])
            .collect();

        let parse = Sink::new(&tokens, events).finish();

        assert_eq!(parse.syntax().kind(), SyntaxKind::ROOT);
        assert_eq!(parse.syntax().text().to_string(), "Get-Date -Format s");
        let ranges: Vec<_> = parse.tokens().iter().map(|t| t.range.clone()).collect();
        assert_eq!(ranges.first(), Some(&(0..8)));
        assert_eq!(ranges.last().map(|r| r.end), Some(18));
    }

    #[test]
    fn errors_point_at_the_next_token() {
        let tokens = lex("ab cd");
        let events = vec![
            start(SyntaxKind::ROOT),
            error("before"),
            Event::Token {
                kind: SyntaxKind::IDENT,
            },
            Event::Token {
                kind: SyntaxKind::WHITESPACE,
            },
            error("middle"),
            Event::Token {
                kind: SyntaxKind::IDENT,
            },
            error("after"),
            Event::Finish,
        ];

        let parse = Sink::new(&tokens, events).finish();

        let errors: Vec<_> = parse.errors().iter().map(ToString::to_string).collect();
        assert_eq!(errors, vec!["before at 0..2", "middle at 3..5", "after at 5..5"]);
    }

    #[test]
    fn forward_parents_open_outermost_first() {
        let tokens = lex("x");
        let events = vec![
            start(SyntaxKind::ROOT),
            Event::Start {
                kind: SyntaxKind::TYPE_CONSTRAINT,
                forward_parent: Some(4),
            },
            Event::Token {
                kind: SyntaxKind::IDENT,
            },
            Event::Finish,
            start(SyntaxKind::PARAMETER),
            Event::Finish,
            Event::Finish,
        ];

        let parse = Sink::new(&tokens, events).finish();

        let parameter = parse.syntax().first_child().unwrap();
        assert_eq!(parameter.kind(), SyntaxKind::PARAMETER);
        assert_eq!(
            parameter.first_child().map(|n| n.kind()),
            Some(SyntaxKind::TYPE_CONSTRAINT)
        );
    }
}
