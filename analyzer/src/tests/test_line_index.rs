use crate::lexer::lex;
use crate::line_index::{LineCol, LineIndex, Utf16LineCol};

#[test]
fn test_line_col() {
    let index = LineIndex::from_source("ab\ncd\n");
    assert_eq!(index.line_breaks(), &[2, 5]);
    assert_eq!(index.line_count(), 3);

    assert_eq!(index.line_col(0), Some(LineCol { line: 0, col: 0 }));
    assert_eq!(index.line_col(2), Some(LineCol { line: 0, col: 2 }));
    assert_eq!(index.line_col(3), Some(LineCol { line: 1, col: 0 }));
    assert_eq!(index.line_col(6), Some(LineCol { line: 2, col: 0 }));
    assert_eq!(index.line_col(7), None);

    assert_eq!(index.offset(LineCol { line: 1, col: 1 }), Some(4));
    assert_eq!(index.offset(LineCol { line: 0, col: 5 }), None);
    assert_eq!(index.offset(LineCol { line: 3, col: 0 }), None);
    assert_eq!(index.line_end(2), Some(6));
}

#[test]
fn test_lexer_records_every_line_break() {
    let source = "--[[ a\nb ]] x = [[\n]] -- c\r\ny";
    assert_eq!(lex(source).line_index, LineIndex::from_source(source));
    assert_eq!(lex(source).line_index.line_count(), 4);
}

#[test]
fn test_utf16_columns() {
    let source = "a = 'é😀'\nb";
    let index = LineIndex::from_source(source);
    let at = |line, character| Utf16LineCol { line, character };

    assert_eq!(index.from_position(source, 5), Some(at(0, 5)));
    assert_eq!(index.from_position(source, 7), Some(at(0, 6)));
    assert_eq!(index.from_position(source, 11), Some(at(0, 8)));
    // Inside the emoji: rounds down to its start.
    assert_eq!(index.from_position(source, 9), Some(at(0, 6)));
    assert_eq!(index.from_position(source, 13), Some(at(1, 0)));

    assert_eq!(index.to_position(source, at(0, 6)), Some(7));
    assert_eq!(index.to_position(source, at(0, 8)), Some(11));
    assert_eq!(index.to_position(source, at(0, 100)), Some(12));
    assert_eq!(index.to_position(source, at(1, 0)), Some(13));
    assert_eq!(index.to_position(source, at(2, 0)), None);
}

#[test]
fn test_utf16_round_trip_on_char_boundaries() {
    let source = "-- Ünïcødé\nlocal s = '日本語' -- 🎉\n";
    let index = LineIndex::from_source(source);
    for (pos, _) in source.char_indices() {
        let pos = pos as u32;
        let at = index.from_position(source, pos).unwrap();
        assert_eq!(index.to_position(source, at), Some(pos), "{at:?}");
    }
}
