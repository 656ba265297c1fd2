use std::io;
use std::str::Chars;

use super::*;
use crate::ByteSource;
use tracing::trace;

fn parse(source: &str) -> Vec<Event> {
    parse_with(source, ParseOptions::default())
}

fn parse_with(source: &str, options: ParseOptions) -> Vec<Event> {
    let events = parse_str(source, options).unwrap();
    trace!(?events, "parsed {source:?}");
    events
}

fn dump(events: &[Event]) -> String {
    events
        .iter()
        .map(|e| format!("{e:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fails every read after the first `fail_after`.
struct Flaky<'a> {
    chars: Chars<'a>,
    fail_after: usize,
    reads: usize,
}

impl<'a> Flaky<'a> {
    fn new(source: &'a str, fail_after: usize) -> Self {
        Self {
            chars: source.chars(),
            fail_after,
            reads: 0,
        }
    }
}

impl CodePointSource for Flaky<'_> {
    fn read_code_point(&mut self) -> io::Result<Option<char>> {
        self.reads += 1;
        if self.reads > self.fail_after {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"));
        }
        Ok(self.chars.next())
    }
}

#[test]
fn test_empty_document() {
    assert!(parse("").is_empty());
    assert!(parse(" \t\r\n\n").is_empty());

    let mut parser = Parser::default();
    let mut source = CharSource::from("");
    assert_eq!(parser.next_event(&mut source).unwrap(), None);
    assert_eq!(parser.next_event(&mut source).unwrap(), None);
    assert_eq!(parser.state(), ParserState::Eof);
}

#[test]
fn test_block_with_field() {
    assert_eq!(
        parse("a{\n  b c\n}"),
        vec![
            Event::node_enter("a"),
            Event::field("b", "c"),
            Event::NodeLeave(1),
        ]
    );
}

#[test]
fn test_flag() {
    assert_eq!(parse("x!"), vec![Event::flag("x")]);
    assert_eq!(parse("x;"), vec![Event::flag("x")]);
    assert_eq!(parse("x"), vec![Event::flag("x")]);
}

#[test]
fn test_unexpected_node_leave() {
    let mut parser = Parser::default();
    let mut source = CharSource::from("}");
    let err = parser.next_event(&mut source).unwrap_err();
    assert!(matches!(err, Error::UnexpectedNodeLeave { position: 1 }));
    assert_eq!(parser.state(), ParserState::Error);
    assert_eq!(parser.depth(), 0);

    let again = parser.next_event(&mut source).unwrap_err();
    assert!(matches!(again, Error::UnexpectedNodeLeave { position: 1 }));
}

#[test]
fn test_unexpected_node_leave_after_balanced_blocks() {
    let mut parser = Parser::default();
    let mut source = CharSource::from("a {\n}\n  }");
    assert_eq!(
        parser.next_event(&mut source).unwrap(),
        Some(Event::node_enter("a"))
    );
    assert_eq!(
        parser.next_event(&mut source).unwrap(),
        Some(Event::NodeLeave(1))
    );
    let err = parser.next_event(&mut source).unwrap_err();
    assert!(matches!(err, Error::UnexpectedNodeLeave { position: 9 }));
}

#[test]
fn test_line_continuation_compressed() {
    assert_eq!(parse("k v\\\n  w"), vec![Event::field("k", "v w")]);
    // Whitespace before the backslash is dropped, the next line's collapses.
    assert_eq!(parse("k v   \\\n\t\tw"), vec![Event::field("k", "v\tw")]);
    // Backslash CR LF continues too.
    assert_eq!(parse("k v\\\r\n  w"), vec![Event::field("k", "v w")]);
}

#[test]
fn test_line_continuation_verbatim() {
    let options = ParseOptions::new().compress_whitespace(false);
    assert_eq!(
        parse_with("k v \\\n  w", options),
        vec![Event::field("k", "v   w")]
    );
}

#[test]
fn test_line_continuation_in_key() {
    assert_eq!(parse("lo\\\nng value"), vec![Event::field("long", "value")]);
}

#[test]
fn test_compress_whitespace() {
    assert_eq!(
        parse("k a   b\t\tc \t d"),
        vec![Event::field("k", "a b\tc d")]
    );

    let options = ParseOptions::new().compress_whitespace(false);
    assert_eq!(
        parse_with("k a   b\t\tc", options),
        vec![Event::field("k", "a   b\t\tc")]
    );
}

#[test]
fn test_escaped_whitespace_is_never_compressed() {
    assert_eq!(parse("k a\\t\\tb"), vec![Event::field("k", "a\t\tb")]);
    // An escaped space still counts as the previous character.
    assert_eq!(parse("k a\\    b"), vec![Event::field("k", "a b")]);
}

#[test]
fn test_trim_trailing_whitespace() {
    assert_eq!(parse("k value \t \n"), vec![Event::field("k", "value")]);
    assert_eq!(parse("k value\\t"), vec![Event::field("k", "value")]);

    let options = ParseOptions::new().trim_trailing_whitespace(false);
    assert_eq!(
        parse_with("k value \t \n", options),
        vec![Event::field("k", "value ")]
    );

    let options = ParseOptions::verbatim();
    assert_eq!(
        parse_with("k value \t \n", options),
        vec![Event::field("k", "value \t ")]
    );
}

#[test]
fn test_comments_dropped_by_default() {
    assert_eq!(
        parse("# header\na b # trailing\n#\nc!"),
        vec![Event::field("a", "b"), Event::flag("c")]
    );
}

#[test]
fn test_comments_surfaced() {
    let options = ParseOptions::new().read_comments(true);
    assert_eq!(
        parse_with("# header\na b # trailing\n#\nc!", options),
        vec![
            Event::comment(" header"),
            Event::field("a", "b"),
            Event::comment(" trailing"),
            Event::comment(""),
            Event::flag("c"),
        ]
    );
}

#[test]
fn test_comment_line_endings() {
    let options = ParseOptions::new().read_comments(true);
    assert_eq!(
        parse_with("#crlf\r\ny!", options),
        vec![Event::comment("crlf"), Event::flag("y")]
    );
    assert_eq!(
        parse_with("a b #end", options),
        vec![Event::field("a", "b"), Event::comment("end")]
    );
}

#[test]
fn test_comment_after_key() {
    let options = ParseOptions::new().read_comments(true);
    assert_eq!(
        parse_with("key# note\nnext!", options),
        vec![
            Event::flag("key"),
            Event::comment(" note"),
            Event::flag("next"),
        ]
    );
    assert_eq!(
        parse_with("key #note", options),
        vec![Event::flag("key"), Event::comment("note")]
    );
}

#[test]
fn test_dropped_comments_do_not_return_empty_steps() {
    let mut parser = Parser::default();
    let mut source = CharSource::from("#a\n# b\n\n#c\nx!");
    assert_eq!(
        parser.next_event(&mut source).unwrap(),
        Some(Event::flag("x"))
    );
}

#[test]
fn test_key_escapes() {
    assert_eq!(parse("a\\ b c"), vec![Event::field("a b", "c")]);
    assert_eq!(parse("tab\\tkey!"), vec![Event::flag("tab\tkey")]);
    assert_eq!(parse("bang\\!!"), vec![Event::flag("bang!")]);
    assert_eq!(parse("semi\\;\\#x y"), vec![Event::field("semi;#x", "y")]);
}

#[test]
fn test_value_escapes() {
    assert_eq!(
        parse("k a\\;b\\#c\\0d"),
        vec![Event::field("k", "a;b#c\0d")]
    );
    assert_eq!(
        parse("k \\b\\f\\v\\r\\n"),
        vec![Event::field("k", "\u{8}\u{c}\u{b}")]
    );
    assert_eq!(parse("k \\q\\\\"), vec![Event::field("k", "q\\")]);
}

#[test]
fn test_dangling_backslash() {
    assert_eq!(parse("k v\\"), vec![Event::field("k", "v")]);
    assert!(parse("\\").is_empty());
}

#[test]
fn test_carriage_returns_ignored() {
    assert_eq!(
        parse("k a\rb\r\nnext!"),
        vec![Event::field("k", "ab"), Event::flag("next")]
    );
    assert_eq!(
        parse_with("k a\\rb", ParseOptions::verbatim()),
        vec![Event::field("k", "a\rb")]
    );
}

#[test]
fn test_empty_values() {
    assert_eq!(parse("k ;"), vec![Event::flag("k")]);
    assert_eq!(parse("k   "), vec![Event::flag("k")]);
    assert_eq!(parse(";"), vec![Event::flag("")]);
}

#[test]
fn test_value_may_follow_line_break() {
    assert_eq!(
        parse("key\n\n  value\nother!"),
        vec![Event::field("key", "value"), Event::flag("other")]
    );
}

#[test]
fn test_field_separators() {
    assert_eq!(
        parse("a 1; b 2;c!d 4\ne 5"),
        vec![
            Event::field("a", "1"),
            Event::field("b", "2"),
            Event::flag("c"),
            Event::field("d", "4"),
            Event::field("e", "5"),
        ]
    );
}

#[test]
fn test_values_keep_braces() {
    assert_eq!(parse("k a{b}c"), vec![Event::field("k", "a{b}c")]);
}

#[test]
fn test_brace_after_bare_key_is_a_value() {
    // A key followed by a line break still expects a value, and `}` is not
    // a value delimiter, so the block stays open.
    let mut parser = Parser::default();
    let mut source = CharSource::from("a {\n b\n}");
    let mut events = Vec::new();
    while let Some(event) = parser.next_event(&mut source).unwrap() {
        events.push(event);
    }
    assert_eq!(
        events,
        vec![Event::node_enter("a"), Event::field("b", "}")]
    );
    assert_eq!(parser.depth(), 1);

    assert_eq!(
        parse("a {\n b!\n}"),
        vec![Event::node_enter("a"), Event::flag("b"), Event::NodeLeave(1)]
    );
}

#[test]
fn test_nested_anonymous_blocks() {
    let mut parser = Parser::default();
    let mut source = CharSource::from("{{}}");
    let mut seen = Vec::new();
    while let Some(event) = parser.next_event(&mut source).unwrap() {
        seen.push((event, parser.depth()));
    }
    assert_eq!(
        seen,
        vec![
            (Event::node_enter(""), 1),
            (Event::node_enter(""), 2),
            (Event::NodeLeave(2), 1),
            (Event::NodeLeave(1), 0),
        ]
    );
}

#[test]
fn test_block_label_forms() {
    assert_eq!(
        parse("a{b!\n}"),
        vec![Event::node_enter("a"), Event::flag("b"), Event::NodeLeave(1)]
    );
    assert_eq!(
        parse("a\n{\n}"),
        vec![Event::node_enter("a"), Event::NodeLeave(1)]
    );
    assert_eq!(
        parse("esc\\ aped {}"),
        vec![Event::node_enter("esc aped"), Event::NodeLeave(1)]
    );
}

#[test]
fn test_shader_document() {
    let source = r"textures/base/wall_arc_01 {
    { # unit
        map textures/base/wall_arc_01.tga
    }
    {
        map textures/base/wall_arc_01.glow.tga
        blend add
    }

    no-collision!
    depth lte
    alpha always
    grid 1  1  1 \
         1  1  1
}
";
    let events = parse_with(source, ParseOptions::new().read_comments(true));
    insta::assert_snapshot!(dump(&events), @r#"
    NodeEnter("textures/base/wall_arc_01")
    NodeEnter("")
    Comment(" unit")
    Field { key: "map", value: "textures/base/wall_arc_01.tga" }
    NodeLeave(2)
    NodeEnter("")
    Field { key: "map", value: "textures/base/wall_arc_01.glow.tga" }
    Field { key: "blend", value: "add" }
    NodeLeave(2)
    Field { key: "no-collision", value: "" }
    Field { key: "depth", value: "lte" }
    Field { key: "alpha", value: "always" }
    Field { key: "grid", value: "1 1 1 1 1 1" }
    NodeLeave(1)
    "#);
}

#[test]
fn test_rendered_events() {
    let events = parse_with(
        "stage {\n  map a b.tga\n  odd\\ key x\\;y\n  flag!\n}\n",
        ParseOptions::default(),
    );
    let rendered: Vec<String> = events.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    stage{
    map a b.tga
    odd\ key x\;y
    flag!
    }
    ");
}

#[test]
fn test_state_inspection() {
    let mut parser = Parser::default();
    assert_eq!(parser.state(), ParserState::ReadKey);
    assert!(!parser.is_done());

    let mut source = CharSource::from("a b\nc!");
    parser.next_event(&mut source).unwrap();
    assert_eq!(parser.state(), ParserState::ReadKey);
    assert_eq!(parser.position(), 4);

    parser.next_event(&mut source).unwrap();
    assert_eq!(parser.next_event(&mut source).unwrap(), None);
    assert_eq!(parser.state(), ParserState::Eof);
    assert!(parser.is_done());
}

#[test]
fn test_trailing_comment_enters_comment_state() {
    let mut parser = Parser::new(ParseOptions::new().read_comments(true));
    let mut source = CharSource::from("a b # c\n");
    assert_eq!(
        parser.next_event(&mut source).unwrap(),
        Some(Event::field("a", "b"))
    );
    assert_eq!(parser.state(), ParserState::ReadComment);
    assert_eq!(
        parser.next_event(&mut source).unwrap(),
        Some(Event::comment(" c"))
    );
}

#[test]
fn test_source_error_poisons() {
    let mut parser = Parser::default();
    let mut source = Flaky::new("a b\nc d", 5);
    assert_eq!(
        parser.next_event(&mut source).unwrap(),
        Some(Event::field("a", "b"))
    );

    let err = parser.next_event(&mut source).unwrap_err();
    assert_eq!(
        err.io_error().map(io::Error::kind),
        Some(io::ErrorKind::ConnectionReset)
    );
    assert_eq!(source.reads, 6);
    assert_eq!(parser.state(), ParserState::Error);

    // Poisoned: the error repeats without touching the source.
    let again = parser.next_event(&mut source).unwrap_err();
    assert_eq!(again.to_string(), err.to_string());
    assert_eq!(source.reads, 6);
}

#[test]
fn test_source_error_inside_comment() {
    let mut parser = Parser::new(ParseOptions::new().read_comments(true));
    let mut source = Flaky::new("#abc\nx!", 2);
    assert!(parser.next_event(&mut source).is_err());
    assert_eq!(parser.state(), ParserState::Error);
    assert!(parser.is_done());
}

#[test]
fn test_restart_recovers() {
    let mut parser = Parser::default();
    let mut source = CharSource::from("}");
    assert!(parser.next_event(&mut source).is_err());

    parser.restart();
    assert_eq!(parser.state(), ParserState::ReadKey);
    assert_eq!(parser.position(), 0);
    let mut source = CharSource::from("{ # x\n");
    assert_eq!(
        parser.next_event(&mut source).unwrap(),
        Some(Event::node_enter(""))
    );
    assert_eq!(parser.depth(), 1);

    parser.reset(ParseOptions::new().read_comments(true));
    assert_eq!(parser.depth(), 0);
    assert!(parser.options().read_comments);
    let mut source = CharSource::from("# x\n");
    assert_eq!(
        parser.next_event(&mut source).unwrap(),
        Some(Event::comment(" x"))
    );
}

#[test]
fn test_byte_source_document() {
    // Only bytes without bit 3 set survive the 8-bit fallback unchanged.
    let events = super::parse(ByteSource::new(&b"a!e h"[..]), ParseOptions::default()).unwrap();
    assert_eq!(
        events,
        vec![Event::flag("a"), Event::field("e", "\u{fffd}")]
    );
}

#[test]
fn test_bulk_parse_reports_errors() {
    let err = parse_str("a {\n}\n}", ParseOptions::default()).unwrap_err();
    assert!(err.is_syntax());
}
