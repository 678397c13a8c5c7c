//! Source-line windows around a matched entry.

use yamler_core::ContextLine;

use crate::locator::split_lines;

/// Return the lines of `text` within `window` lines of `line_number`.
///
/// `line_number` is 0-based; the returned [`ContextLine`]s carry 1-based
/// display numbers and exactly one of them is the target. A `line_number`
/// past the end of the text is clamped to the last line.
///
/// # Examples
///
/// ```
/// use yamler_flatten::context_lines;
///
/// let text = "a: 1\nb: 2\nc: 3\n";
/// let lines = context_lines(text, 1, 1);
/// assert_eq!(lines.len(), 3);
/// assert_eq!(lines[1].line_number, 2);
/// assert!(lines[1].is_target);
/// ```
pub fn context_lines(text: &str, line_number: usize, window: usize) -> Vec<ContextLine> {
    let lines = split_lines(text);
    let last = lines.len().saturating_sub(1);
    let target = line_number.min(last);
    let start = target.saturating_sub(window);
    let end = target.saturating_add(window).min(last);

    lines[start..=end]
        .iter()
        .enumerate()
        .map(|(offset, content)| {
            let index = start + offset;
            ContextLine {
                line_number: index + 1,
                content: (*content).to_string(),
                is_target: index == target,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_lines() -> String {
        (1..=10)
            .map(|i| format!("key{i}: {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn window_in_the_middle() {
        let lines = context_lines(&ten_lines(), 5, 4);
        let numbers: Vec<usize> = lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, (2..=10).collect::<Vec<_>>());

        let targets: Vec<&ContextLine> = lines.iter().filter(|l| l.is_target).collect();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].line_number, 6);
        assert_eq!(targets[0].content, "key6: 6");
    }

    #[test]
    fn window_clamps_at_start() {
        let lines = context_lines(&ten_lines(), 1, 4);
        assert_eq!(lines.first().unwrap().line_number, 1);
        assert_eq!(lines.last().unwrap().line_number, 6);
        assert!(lines[1].is_target);
    }

    #[test]
    fn window_clamps_at_end() {
        let lines = context_lines(&ten_lines(), 9, 4);
        assert_eq!(lines.first().unwrap().line_number, 6);
        assert_eq!(lines.last().unwrap().line_number, 10);
        assert!(lines.last().unwrap().is_target);
    }

    #[test]
    fn out_of_bounds_target_is_clamped_to_last_line() {
        let lines = context_lines(&ten_lines(), 42, 2);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.last().unwrap().line_number, 10);
        assert!(lines.last().unwrap().is_target);
    }

    #[test]
    fn zero_window_returns_only_the_target() {
        let lines = context_lines(&ten_lines(), 3, 0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_target);
        assert_eq!(lines[0].line_number, 4);
    }

    #[test]
    fn trailing_newline_counts_as_a_line() {
        let lines = context_lines("a: 1\n", 0, 4);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].content, "");
    }

    #[test]
    fn empty_text_yields_one_empty_target_line() {
        let lines = context_lines("", 0, 4);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_target);
        assert_eq!(lines[0].line_number, 1);
    }
}
