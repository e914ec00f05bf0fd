//! Post-processing: deterministic layout cleanup of converted Markdown.
//!
//! The converter maps tags to Markdown faithfully but its layout follows the
//! HTML's: CRLF line endings from the renderer survive, groff's spacing turns
//! into long runs of blank lines, and `<h1>`/`<h2>` come out as setext
//! headings (`NAME` over `----------`). Downstream readers that build a table
//! of contents by matching `^#{1,6} ` never see those headings.
//!
//! Every rule here is a pure `&str → String` pass that changes layout only,
//! never content, so the whole pass is idempotent and the same HTML always
//! yields byte-identical Markdown.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so every later rule can split on `\n`.
//! Setext conversion runs before heading spacing so converted headings get
//! their blank line too. Blank-line collapsing runs after the rules that
//! insert blank lines.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules to converter output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Trim trailing whitespace per line, keeping two-space hard breaks
/// 3. Convert setext headings to ATX (`# Title`, `## Title`)
/// 4. Ensure heading lines have a blank line before them
/// 5. Collapse 3+ consecutive blank lines down to 2
/// 6. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 7. Ensure the text ends with exactly one newline
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = setext_to_atx(&s);
    let s = normalise_heading_spacing(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Trim trailing whitespace per line ────────────────────────────────

/// A line ending in two or more spaces is a Markdown hard break (what `<br>`
/// converts to); those keep exactly two spaces.
fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| {
            let trimmed = line.trim_end();
            if !trimmed.is_empty() && line[trimmed.len()..].starts_with("  ") {
                format!("{trimmed}  ")
            } else {
                trimmed.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 3: Setext headings → ATX ────────────────────────────────────────────

static RE_SETEXT_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}=+\s*$").unwrap());
static RE_SETEXT_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}-{2,}\s*$").unwrap());
static RE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}(```|~~~)").unwrap());

fn setext_to_atx(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut result: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_fence = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if RE_FENCE.is_match(line) {
            in_fence = !in_fence;
        } else if !in_fence && can_be_setext_text(line) {
            let level = match lines.get(i + 1) {
                Some(next) if RE_SETEXT_H1.is_match(next) => Some(1),
                Some(next) if RE_SETEXT_H2.is_match(next) => Some(2),
                _ => None,
            };
            if let Some(level) = level {
                result.push(format!("{} {}", "#".repeat(level), line.trim()));
                i += 2;
                continue;
            }
        }

        result.push(line.to_string());
        i += 1;
    }

    result.join("\n")
}

/// Lines that cannot carry a setext underline: blanks, indented code,
/// block constructs, and underline lines themselves.
fn can_be_setext_text(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !line.starts_with("    ")
        && !line.starts_with('\t')
        && !trimmed.starts_with('#')
        && !trimmed.starts_with('>')
        && !trimmed.starts_with('|')
        && !trimmed.starts_with("- ")
        && !trimmed.starts_with("* ")
        && !trimmed.starts_with("+ ")
        && !RE_SETEXT_H1.is_match(line)
        && !RE_SETEXT_H2.is_match(line)
}

// ── Rule 4: Normalise heading spacing ────────────────────────────────────────

static RE_ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6} ").unwrap());

fn normalise_heading_spacing(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 64);
    let mut in_fence = false;
    for (i, line) in input.lines().enumerate() {
        if RE_FENCE.is_match(line) {
            in_fence = !in_fence;
        }
        if !in_fence && i > 0 && RE_ATX_HEADING.is_match(line) {
            let trimmed = result.trim_end_matches('\n');
            result.truncate(trimmed.len());
            result.push_str("\n\n");
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}

// ── Rule 5: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 6: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 7: Ensure file ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(trim_trailing_whitespace("  hello \t\nworld "), "  hello\nworld");
    }

    #[test]
    fn test_hard_break_kept() {
        assert_eq!(trim_trailing_whitespace("line one    \nline two"), "line one  \nline two");
        assert_eq!(trim_trailing_whitespace("   \nx"), "\nx");
    }

    #[test]
    fn test_setext_h1() {
        assert_eq!(setext_to_atx("LS\n=========="), "# LS");
    }

    #[test]
    fn test_setext_h2() {
        assert_eq!(
            setext_to_atx("NAME\n----------\nls - list directory contents"),
            "## NAME\nls - list directory contents"
        );
    }

    #[test]
    fn test_thematic_break_untouched() {
        let input = "para\n\n---\n\nmore";
        assert_eq!(setext_to_atx(input), input);
    }

    #[test]
    fn test_setext_inside_fence_untouched() {
        let input = "```\nNAME\n----\n```";
        assert_eq!(setext_to_atx(input), input);
    }

    #[test]
    fn test_list_item_not_heading() {
        let input = "- item\n---";
        assert_eq!(setext_to_atx(input), input);
    }

    #[test]
    fn test_heading_spacing() {
        let result = normalise_heading_spacing("some text\n# Heading\nmore text");
        assert!(result.contains("\n\n# Heading\n"));
    }

    #[test]
    fn test_heading_spacing_ignores_fenced_comments() {
        let input = "```sh\n# comment\n```\n";
        assert_eq!(normalise_heading_spacing(input), input);
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_ensure_final_newline() {
        assert_eq!(ensure_final_newline("hello"), "hello\n");
        assert_eq!(ensure_final_newline("hello\n\n\n"), "hello\n");
        assert_eq!(ensure_final_newline(""), "\n");
    }

    #[test]
    fn test_clean_markdown_man_page_shape() {
        let input = "LS\r\n==========\r\n\r\n\r\n\r\n\r\nNAME\r\n----------\r\nls - list   \r\n";
        let result = clean_markdown(input);
        assert_eq!(result, "# LS\n\n## NAME\nls - list\n");
        assert!(result.lines().any(|l| l.starts_with('#') && l.contains("LS")));
    }

    #[test]
    fn test_clean_markdown_is_idempotent() {
        let input = "Title\n=====\ntext  \nmore\n\n\n\n\n## Sub\n```\nA\n---\n```\n";
        let once = clean_markdown(input);
        assert_eq!(clean_markdown(&once), once);
    }
}
