//! Code size measurement.
//!
//! Size is the number of symbols that are neither whitespace nor part of a
//! comment. Inside string, rune and raw string literals every symbol
//! counts, whitespace included.

use std::iter::Peekable;
use std::str::Chars;

/// Size of Go-like source text.
pub fn code_size(source: &str) -> usize {
    let mut size = 0;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                skip_line(&mut chars);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                skip_block(&mut chars);
            }
            '"' | '\'' => {
                size += 1 + literal(&mut chars, c, true);
            }
            '`' => {
                size += 1 + literal(&mut chars, c, false);
            }
            c if c.is_whitespace() => {}
            _ => size += 1,
        }
    }
    size
}

fn skip_line(chars: &mut Peekable<Chars<'_>>) {
    for c in chars.by_ref() {
        if c == '\n' {
            break;
        }
    }
}

fn skip_block(chars: &mut Peekable<Chars<'_>>) {
    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'/') {
            chars.next();
            break;
        }
    }
}

/// Consume a literal up to and including its closing quote, returning the
/// number of symbols consumed.
fn literal(chars: &mut Peekable<Chars<'_>>, quote: char, escapes: bool) -> usize {
    let mut size = 0;
    while let Some(c) = chars.next() {
        size += 1;
        if c == quote {
            break;
        }
        if escapes && c == '\\' && chars.next().is_some() {
            size += 1;
        }
        // An interpreted literal cannot span lines; stop at a stray newline.
        if escapes && c == '\n' {
            size -= 1;
            break;
        }
    }
    size
}

/// Size of a source file on disk.
pub async fn code_size_of(path: &std::path::Path) -> std::io::Result<usize> {
    let source = tokio::fs::read_to_string(path).await?;
    Ok(code_size(&source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_is_not_counted() {
        assert_eq!(code_size("a b\n\tc  "), 3);
    }

    #[test]
    fn test_comments_are_excluded() {
        let src = "x := 1 // trailing comment\n/* block\n comment */y";
        // x := 1 y
        assert_eq!(code_size(src), 5);
    }

    #[test]
    fn test_string_literal_whitespace_counts() {
        // The literal "a b" is five symbols including quotes and the space.
        assert_eq!(code_size(r#"s = "a b""#), 7);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_code() {
        assert_eq!(code_size(r#""// not a comment""#), 18);
    }

    #[test]
    fn test_escaped_quote_does_not_end_literal() {
        // "a\"b" is six symbols.
        assert_eq!(code_size(r#""a\"b""#), 6);
    }

    #[test]
    fn test_rune_and_raw_literals() {
        assert_eq!(code_size("' '"), 3);
        assert_eq!(code_size("`a\n b`"), 6);
    }

    #[test]
    fn test_division_is_code() {
        assert_eq!(code_size("a / b"), 3);
    }

    #[test]
    fn test_realistic_function() {
        let src = "package leap\n\n// IsLeapYear reports leap years.\nfunc IsLeapYear(y int) bool {\n\treturn y%4 == 0 && (y%100 != 0 || y%400 == 0)\n}\n";
        let expected = "packageleapfuncIsLeapYear(yint)bool{returny%4==0&&(y%100!=0||y%400==0)}"
            .chars()
            .count();
        assert_eq!(code_size(src), expected);
    }

    #[tokio::test]
    async fn test_code_size_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.go");
        std::fs::write(&path, "package a // c").unwrap();
        assert_eq!(code_size_of(&path).await.unwrap(), 8);
    }
}
