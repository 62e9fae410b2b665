use super::AstNode;
use crate::lexer::Token;
use crate::span::{Position, Span};

/// One list item and the delimiter token that followed it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<T> {
    pub item: T,
    pub delimiter: Option<Token>,
}

/// A `,`/`;`-separated sequence that keeps every delimiter token.
///
/// Every pair except possibly the last carries a delimiter. A trailing delimiter (as in
/// `{1, 2,}`) is kept on the last pair. An empty list remembers where it would have started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Punctuated<T> {
    pairs: Vec<Pair<T>>,
    anchor: Position,
}

impl<T> Punctuated<T> {
    pub fn new(anchor: Position) -> Self {
        Self {
            pairs: Vec::new(),
            anchor,
        }
    }

    pub fn push(&mut self, item: T) {
        debug_assert!(
            self.pairs.last().is_none_or(|p| p.delimiter.is_some()),
            "pushed an item after an undelimited one"
        );
        self.pairs.push(Pair {
            item,
            delimiter: None,
        });
    }

    /// Attaches `delimiter` to the last item. Returns `false` if the list is empty.
    pub fn push_delimiter(&mut self, delimiter: Token) -> bool {
        match self.pairs.last_mut() {
            Some(pair) if pair.delimiter.is_none() => {
                pair.delimiter = Some(delimiter);
                true
            }
            _ => false,
        }
    }

    pub fn pairs(&self) -> &[Pair<T>] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pairs.iter().map(|p| &p.item)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.pairs.first().map(|p| &p.item)
    }

    pub fn last(&self) -> Option<&T> {
        self.pairs.last().map(|p| &p.item)
    }

    pub fn has_trailing_delimiter(&self) -> bool {
        self.pairs.last().is_some_and(|p| p.delimiter.is_some())
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }
}

impl<T: AstNode> Punctuated<T> {
    pub fn span(&self) -> Span {
        let (Some(first), Some(last)) = (self.pairs.first(), self.pairs.last()) else {
            return Span::empty(self.anchor);
        };
        let end = match &last.delimiter {
            Some(delimiter) => delimiter.span.end,
            None => last.item.span().end,
        };
        Span::new(first.item.span().start, end)
    }

    pub fn first_token(&self) -> Option<&Token> {
        self.pairs.first().and_then(|p| p.item.first_token())
    }
}

impl<'a, T> IntoIterator for &'a Punctuated<T> {
    type Item = &'a T;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, Pair<T>>, fn(&'a Pair<T>) -> &'a T>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter().map(pair_item as fn(&'a Pair<T>) -> &'a T)
    }
}

fn pair_item<T>(pair: &Pair<T>) -> &T {
    &pair.item
}
