//! Iterator interface for pull-style parsing.

use std::iter::FusedIterator;

use crate::{CodePointSource, Error, Event, Parser};

/// Iterator over the events of a document.
///
/// Created by [`Parser::events`]. Yields `Ok` events until the source is
/// exhausted, or a single `Err` if parsing fails.
#[derive(Debug)]
pub struct Events<'p, S> {
    parser: &'p mut Parser,
    source: S,
    finished: bool,
}

impl Parser {
    /// Iterate over the events read from `source`.
    pub fn events<S>(&mut self, source: S) -> Events<'_, S>
    where
        S: CodePointSource,
    {
        // A poisoned parser still reports its error once.
        Events {
            finished: false,
            parser: self,
            source,
        }
    }
}

impl<S> Events<'_, S> {
    /// Depth of the underlying parser.
    pub fn depth(&self) -> usize {
        self.parser.depth()
    }
}

impl<S> Iterator for Events<'_, S>
where
    S: CodePointSource,
{
    type Item = Result<Event, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.parser.next_event(&mut self.source) {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<S> FusedIterator for Events<'_, S> where S: CodePointSource {}
