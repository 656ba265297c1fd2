//! Callback interface for push-style parsing.

use crate::{CodePointSource, Event, Parser, Result};
#[allow(unused_imports)]
use crate::trace;

/// Receives events from [`Parser::parse_with`].
pub trait ParseCallback {
    /// Called once per event, in document order.
    ///
    /// Return `false` to stop parsing early.
    fn event(&mut self, event: Event) -> bool;
}

impl<F> ParseCallback for F
where
    F: FnMut(Event) -> bool,
{
    #[inline]
    fn event(&mut self, event: Event) -> bool {
        self(event)
    }
}

impl Parser {
    /// Parse events from `source` and hand each one to `callback`.
    ///
    /// Returns when the source is exhausted, the callback asks to stop, or an
    /// error occurs. A stopped parser can be resumed by calling this (or
    /// [`Parser::next_event`]) again with the same source.
    pub fn parse_with<S, C>(&mut self, mut source: S, callback: &mut C) -> Result<()>
    where
        S: CodePointSource,
        C: ParseCallback + ?Sized,
    {
        while let Some(event) = self.next_event(&mut source)? {
            if !callback.event(event) {
                trace!(position = self.position(), "callback stopped parsing");
                break;
            }
        }
        Ok(())
    }
}
