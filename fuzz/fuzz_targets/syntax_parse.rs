#![no_main]

use alfix_syntax::{LineIndex, SyntaxTree};
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 8192;

fn decode_source(bytes: &[u8]) -> String {
    let capped = &bytes[..bytes.len().min(MAX_SOURCE_BYTES)];
    String::from_utf8_lossy(capped).into_owned()
}

fuzz_target!(|data: &[u8]| {
    let source = decode_source(data);
    let tree = SyntaxTree::parse(source.as_str());

    assert_eq!(tree.root().text(), source);

    for node in tree.root().descendants() {
        let mut previous_end = None;
        for child in node.children() {
            assert_eq!(child.parent(), Some(node));
            assert!(node.full_range().contains_range(child.text_range()));
            if let Some(end) = previous_end {
                assert!(child.text_range().start() >= end);
            }
            previous_end = Some(child.text_range().end());
        }
    }

    let index = LineIndex::new(&source);
    for error in tree.errors() {
        let position = index.line_col(&source, error.range.start());
        assert!((position.line as usize) < index.line_count());
    }
});
