//! Legacy direct-grammar level format
//!
//! Line-oriented sections, `;`-prefixed comments, blank lines as section
//! separators:
//!
//! ```text
//! ; comment
//! Size 5
//!
//! Tools 2
//! - 3
//! 0 -1
//!
//! Preset
//! i...o
//! .....
//! .....
//! .....
//! .....
//! ```
//!
//! The `Preset` section holds exactly N verbatim rows, bottom row first
//! (rows are not comment-stripped: a row of empty cells may be all spaces).
//! Structural violations fail with a line-numbered [`LevelError::Parse`]
//! wrapping the underlying cause. Legacy levels carry no IO generator;
//! callers attach one to the built definition if the level needs input.

use crate::sim::cell::Cell;

use super::{LevelBuilder, LevelDefinition, LevelError};

fn fail(line: usize, message: impl Into<String>) -> LevelError {
    LevelError::Parse {
        line,
        message: message.into(),
    }
}

/// Parse a legacy text level.
pub fn parse(text: &str) -> Result<LevelDefinition, LevelError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut builder = LevelBuilder::new();
    let mut size: Option<i32> = None;

    let mut i = 0;
    while i < lines.len() {
        let line_no = i + 1;
        let line = lines[i].trim_end();
        if line.is_empty() || line.starts_with(';') {
            i += 1;
            continue;
        }

        let mut words = line.split_whitespace();
        match words.next() {
            Some("Size") => {
                if size.is_some() {
                    return Err(fail(line_no, "duplicate Size section"));
                }
                let n: i32 = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .ok_or_else(|| fail(line_no, "Size requires an integer argument"))?;
                builder
                    .set_size(n)
                    .map_err(|e| fail(line_no, e.to_string()))?;
                size = Some(n);
                i += 1;
            }
            Some("Tools") => {
                let count: usize = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .filter(|&k| k <= 9)
                    .ok_or_else(|| fail(line_no, "Tools requires a count in [0, 9]"))?;
                i += 1;
                for _ in 0..count {
                    let tool_line_no = i + 1;
                    let tool_line = lines
                        .get(i)
                        .copied()
                        .ok_or_else(|| fail(tool_line_no, "missing tool line"))?;
                    let mut parts = tool_line.split_whitespace();
                    let glyph = parts
                        .next()
                        .and_then(|w| {
                            let mut chars = w.chars();
                            chars.next().filter(|_| chars.next().is_none())
                        })
                        .ok_or_else(|| {
                            fail(tool_line_no, "tool line must start with a single cell character")
                        })?;
                    let amount: i32 = parts
                        .next()
                        .and_then(|w| w.parse().ok())
                        .ok_or_else(|| fail(tool_line_no, "tool line requires an integer count"))?;
                    builder
                        .add_tool(glyph, Some(amount))
                        .map_err(|e| fail(tool_line_no, e.to_string()))?;
                    i += 1;
                }
            }
            Some("Preset") => {
                let n = size.ok_or_else(|| fail(line_no, "Preset section before Size"))? as usize;
                i += 1;
                let first_row = i;
                if lines.len() < first_row + n {
                    return Err(fail(lines.len(), format!("Preset requires {n} rows")));
                }
                for row in 0..n {
                    for ch in lines[first_row + row].chars().take(n) {
                        Cell::from_char(ch)
                            .map_err(|e| fail(first_row + row + 1, e.to_string()))?;
                    }
                }
                let block = lines[first_row..first_row + n].join("\n");
                builder
                    .set_preset(&block)
                    .map_err(|e| fail(line_no, e.to_string()))?;
                i += n;
            }
            Some(other) => {
                return Err(fail(line_no, format!("unknown section {other:?}")));
            }
            None => unreachable!("blank lines are skipped above"),
        }
    }

    if size.is_none() {
        return Err(fail(lines.len().max(1), "missing Size section"));
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cell::{CellType, GridVec};

    const MOCKUP: &str = include_str!("../../levels/mockup.txt");

    #[test]
    fn test_parse_mockup_level() {
        let level = parse(MOCKUP).unwrap();
        assert_eq!(level.size, 9);
        assert_eq!(level.tools.len(), 5);
        assert!(level.tools.iter().all(|t| t.count == 99));
        assert_eq!(level.tools[0].template.kind, CellType::Mirror);
        assert_eq!(level.tools[4].template.kind, CellType::Tarpit);

        let cell_at = |x, y| {
            level
                .preset
                .iter()
                .find(|(pos, _)| *pos == GridVec::new(x, y))
                .map(|(_, cell)| *cell)
        };
        assert_eq!(cell_at(-4, 3).unwrap().kind, CellType::Input);
        assert_eq!(cell_at(0, 3).unwrap().kind, CellType::Wall);
        assert_eq!(cell_at(3, -4).unwrap().kind, CellType::Output);
        assert_eq!(level.preset.len(), 3);
    }

    #[test]
    fn test_unknown_section_reports_line() {
        let text = "Size 3\n\nBogus\n";
        match parse(text) {
            Err(LevelError::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("Bogus"));
            }
            Err(other) => panic!("expected Parse error, got {other:?}"),
            Ok(_) => panic!("expected Parse error"),
        }
    }

    #[test]
    fn test_bad_cell_char_reports_line() {
        let text = "Size 2\n\nPreset\n..\n.q\n";
        match parse(text) {
            Err(LevelError::Parse { line, message }) => {
                assert_eq!(line, 5);
                assert!(message.contains("'q'"));
            }
            Err(other) => panic!("expected Parse error, got {other:?}"),
            Ok(_) => panic!("expected Parse error"),
        }
    }

    #[test]
    fn test_preset_before_size_fails() {
        assert!(matches!(
            parse("Preset\n..\n..\n"),
            Err(LevelError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_short_preset_fails() {
        assert!(matches!(
            parse("Size 3\n\nPreset\n...\n...\n"),
            Err(LevelError::Parse { .. })
        ));
    }

    #[test]
    fn test_tools_count_out_of_range() {
        assert!(matches!(
            parse("Size 3\n\nTools 10\n"),
            Err(LevelError::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn test_malformed_tool_line() {
        let text = "Size 3\n\nTools 1\nmirror 3\n";
        match parse(text) {
            Err(LevelError::Parse { line: 4, .. }) => {}
            Err(other) => panic!("expected Parse error at line 4, got {other:?}"),
            Ok(_) => panic!("expected Parse error at line 4"),
        }
    }

    #[test]
    fn test_missing_size_fails() {
        assert!(matches!(
            parse("; just a comment\n"),
            Err(LevelError::Parse { .. })
        ));
    }

    #[test]
    fn test_comments_and_blanks_between_sections() {
        let text = "; header\nSize 2\n\n; tools next\nTools 1\n- -1\n\nPreset\nio\n..\n";
        let level = parse(text).unwrap();
        assert_eq!(level.size, 2);
        assert_eq!(level.tools.len(), 1);
        assert_eq!(level.tools[0].count, -1);
        assert_eq!(level.preset.len(), 2);
    }
}
