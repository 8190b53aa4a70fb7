//! Line scanning and nested block boundaries.
//!
//! A block is the run of lines that belongs to one field's nested value. It is
//! delimited purely by indentation: the block introduced by a line at depth `d`
//! holds every following line indented deeper than `d`, up to (not including)
//! the first non-blank line at depth `d` or shallower. Blank lines never end a
//! block, but trailing blank lines are left outside it.

use tracing::trace;

/// One document line with its indentation split off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the document.
    pub number: usize,
    /// Count of leading space or tab characters.
    pub indent: usize,
    /// The line with its indentation removed.
    pub text: &'a str,
}

impl<'a> Line<'a> {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Splits a document into lines, measuring each line's indentation.
///
/// # Examples
///
/// ```rust
/// use serde_mdcodec::block::split_lines;
///
/// let lines = split_lines("- **A**:\r\n  - **B**: 1\n");
/// assert_eq!(lines.len(), 2);
/// assert_eq!((lines[1].number, lines[1].indent, lines[1].text), (2, 2, "- **B**: 1"));
/// ```
#[must_use]
pub fn split_lines(input: &str) -> Vec<Line<'_>> {
    input
        .lines()
        .enumerate()
        .map(|(index, raw)| {
            let text = raw.trim_start_matches(|c: char| c == ' ' || c == '\t');
            Line {
                number: index + 1,
                indent: raw.len() - text.len(),
                text,
            }
        })
        .collect()
}

/// Separates the block introduced by a line at `depth` from the lines after it.
///
/// `lines` starts right after the introducing line. Returns `(block, rest)`.
///
/// # Examples
///
/// ```rust
/// use serde_mdcodec::block::{extract_block, split_lines};
///
/// let lines = split_lines("  - **Street**: Elm\n\n  - **City**: Oslo\n- **Age**: 3\n");
/// let (block, rest) = extract_block(&lines, 0);
/// assert_eq!(block.len(), 3);
/// assert_eq!(rest[0].text, "- **Age**: 3");
/// ```
#[must_use]
pub fn extract_block<'l, 'a>(lines: &'l [Line<'a>], depth: usize) -> (&'l [Line<'a>], &'l [Line<'a>]) {
    let mut end = 0;
    for (index, line) in lines.iter().enumerate() {
        if line.is_blank() {
            continue;
        }
        if line.indent <= depth {
            break;
        }
        end = index + 1;
    }

    trace!(depth, block_lines = end, "extracted block");
    lines.split_at(end)
}

/// One entry of a list block: its leading line and the block nested under it.
#[derive(Clone, Copy, Debug)]
pub struct Element<'l, 'a> {
    pub head: &'l Line<'a>,
    pub body: &'l [Line<'a>],
}

/// Partitions a list block into consecutive elements.
///
/// Every non-blank line that is not inside a previous element's body starts a
/// new element; its body is bounded by the same rule as any other block.
///
/// # Examples
///
/// ```rust
/// use serde_mdcodec::block::{split_elements, split_lines};
///
/// let lines = split_lines("- **Pet**:\n  - **Name**: Rex\n- **Pet**:\n  - **Name**: Tom\n");
/// let elements = split_elements(&lines);
/// assert_eq!(elements.len(), 2);
/// assert_eq!(elements[1].body[0].text, "- **Name**: Tom");
/// ```
#[must_use]
pub fn split_elements<'l, 'a>(block: &'l [Line<'a>]) -> Vec<Element<'l, 'a>> {
    let mut elements = Vec::new();
    let mut rest = block;

    while let Some((head, after)) = rest.split_first() {
        if head.is_blank() {
            rest = after;
            continue;
        }
        let (body, remaining) = extract_block(after, head.indent);
        elements.push(Element { head, body });
        rest = remaining;
    }

    trace!(elements = elements.len(), "partitioned list block");
    elements
}
