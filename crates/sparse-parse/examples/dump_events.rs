use std::io::Read;

use sparse_parse::{CharSource, ParseOptions, Parser};

fn main() {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source).unwrap();

    let mut parser = Parser::new(ParseOptions::default().read_comments(true));
    println!("=== Events ===");
    for event in parser.events(CharSource::from(source.as_str())) {
        match event {
            Ok(event) => println!("{event:?}"),
            Err(err) => {
                println!("error: {err}");
                break;
            }
        }
    }
    println!("\n=== Final state ===");
    println!("{:?} at depth {}", parser.state(), parser.depth());
}
