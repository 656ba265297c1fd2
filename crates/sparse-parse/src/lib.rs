//! Incremental event parser for sparse definitions.
//!
//! Sparse is a small attribute language resembling Quake 3 style shaders:
//!
//! ```text
//! textures/base/wall_arc_01 {
//!     { # unit
//!         map textures/base/wall_arc_01.tga
//!     }
//!     no-collision!
//!     depth lte
//!     grid 1 1 1 \
//!          1 1 1
//! }
//! ```
//!
//! Documents are read one code point at a time from a [`CodePointSource`]
//! and turned into a flat stream of [`Event`]s: fields, comments, and block
//! boundaries. Nothing is buffered beyond the token being read, so events can
//! be pulled lazily with [`Parser::next_event`] or [`Parser::events`], pushed
//! to a [`ParseCallback`] with [`Parser::parse_with`], or collected at once
//! with [`parse_str`].
//!
//! ```
//! use sparse_parse::{Event, ParseOptions, parse_str};
//!
//! let events = parse_str("stage {\n  blend add\n  depth-write!\n}", ParseOptions::default())?;
//! assert_eq!(
//!     events,
//!     vec![
//!         Event::node_enter("stage"),
//!         Event::field("blend", "add"),
//!         Event::flag("depth-write"),
//!         Event::NodeLeave(1),
//!     ]
//! );
//! # Ok::<(), sparse_parse::Error>(())
//! ```

mod tracing_macros;

pub mod escape;

mod source;
pub use source::{BYTE_REPLACEMENT_MASK, ByteSource, CharSource, CodePointSource};

mod event;
pub use event::{Event, EventKind};

mod options;
pub use options::ParseOptions;

mod error;
pub use error::{Error, Result};

mod parser;
pub use parser::{Parser, ParserState, parse, parse_str};

mod callback;
pub use callback::ParseCallback;

mod iter;
pub use iter::Events;
