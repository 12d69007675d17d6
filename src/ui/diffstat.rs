//! Diffstat histogram and bounded diff body
//!
//! The histogram follows the familiar `git diff --stat` layout:
//!
//! ```text
//!  src/main.rs | 12 ++++++++----
//!  README.md   |  1 +
//! ```
//!
//! Only the marker run is scaled; names and totals are never truncated.

use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use super::Styles;
use crate::git::{CommitDiff, FileDiff, patch_text};
use crate::syntax::{Renderer, render_or_plain};

/// Soft limit on the width of a histogram line, excluding the total
pub const LINE_LENGTH: usize = 72;
/// Padding, separator and newline around name and total
const LAYOUT_OVERHEAD: usize = 6;
/// Smallest marker budget when names are very long
const MIN_HEIGHT: usize = 8;

/// Change counts for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub name: String,
    pub additions: usize,
    pub deletions: usize,
}

impl FileStat {
    pub fn total(&self) -> usize {
        self.additions + self.deletions
    }
}

impl From<&FileDiff> for FileStat {
    fn from(diff: &FileDiff) -> Self {
        Self {
            name: diff.path.clone(),
            additions: diff.added,
            deletions: diff.removed,
        }
    }
}

/// Columns available to the marker run
pub fn height_budget(longest_name: usize) -> usize {
    LINE_LENGTH
        .saturating_sub(longest_name + LAYOUT_OVERHEAD)
        .max(MIN_HEIGHT)
}

/// Divisor applied to change counts; 1 when the largest change fits
pub fn scale_factor(longest_total: usize, height: usize) -> f64 {
    if longest_total > height {
        longest_total as f64 / height as f64
    } else {
        1.0
    }
}

fn run_length(count: usize, scale: f64) -> usize {
    (count as f64 / scale).floor() as usize
}

/// One `(prefix, additions, deletions)` triple per file, prefix being the
/// padded name and total
fn rows(stats: &[FileStat]) -> Vec<(String, usize, usize)> {
    let longest_name = stats.iter().map(|s| s.name.width()).max().unwrap_or(0);
    let longest_total = stats.iter().map(FileStat::total).max().unwrap_or(0);
    let total_width = longest_total.to_string().len();
    let scale = scale_factor(longest_total, height_budget(longest_name));

    stats
        .iter()
        .map(|s| {
            let pad = " ".repeat(longest_name - s.name.width());
            let prefix = format!(" {}{} | {:>width$} ", s.name, pad, s.total(), width = total_width);
            (prefix, run_length(s.additions, scale), run_length(s.deletions, scale))
        })
        .collect()
}

/// Plain histogram text, one line per file
#[cfg(test)]
pub fn histogram(stats: &[FileStat]) -> Vec<String> {
    rows(stats)
        .into_iter()
        .map(|(prefix, adds, dels)| format!("{}{}{}", prefix, "+".repeat(adds), "-".repeat(dels)))
        .collect()
}

/// Histogram with colored markers
pub fn histogram_lines(stats: &[FileStat], styles: &Styles) -> Vec<Line<'static>> {
    rows(stats)
        .into_iter()
        .map(|(prefix, adds, dels)| {
            Line::from(vec![
                Span::raw(prefix),
                Span::styled("+".repeat(adds), styles.stats_added),
                Span::styled("-".repeat(dels), styles.stats_removed),
            ])
        })
        .collect()
}

/// Histogram plus, when within bounds, the highlighted diff body
#[derive(Debug, Clone, Default)]
pub struct RenderedDiff {
    pub histogram: Vec<Line<'static>>,
    pub body: Option<Vec<Line<'static>>>,
    /// Why the body was left out
    pub omitted: Option<String>,
}

/// Render the stat histogram and, unless it was left out, the diff body
pub fn render_diff(diff: &CommitDiff, renderer: &dyn Renderer, width: u16, styles: &Styles) -> RenderedDiff {
    let stats: Vec<FileStat> = diff.files.iter().map(FileStat::from).collect();
    let histogram = histogram_lines(&stats, styles);

    if let Some(reason) = &diff.omitted {
        tracing::info!(reason = %reason, "diff body omitted");
        return RenderedDiff {
            histogram,
            body: None,
            omitted: Some(reason.clone()),
        };
    }

    let patch = patch_text(&diff.files);
    RenderedDiff {
        histogram,
        body: Some(render_or_plain(renderer, &patch, "diff", width)),
        omitted: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::DiffStatus;
    use crate::syntax::Highlighter;
    use pretty_assertions::assert_eq;

    fn stat(name: &str, additions: usize, deletions: usize) -> FileStat {
        FileStat {
            name: name.to_string(),
            additions,
            deletions,
        }
    }

    fn file(path: &str, added: usize, removed: usize) -> FileDiff {
        FileDiff {
            added,
            removed,
            ..FileDiff::new(path, DiffStatus::Modified)
        }
    }

    #[test]
    fn test_histogram_layout() {
        let lines = histogram(&[stat("src/main.rs", 8, 4), stat("README.md", 1, 0)]);
        assert_eq!(
            lines,
            vec![
                " src/main.rs | 12 ++++++++----".to_string(),
                " README.md   |  1 +".to_string(),
            ]
        );
    }

    #[test]
    fn test_unscaled_runs_equal_counts() {
        let height = height_budget("a.txt".len());
        assert_eq!(height, 61);
        assert_eq!(scale_factor(61, height), 1.0);

        let lines = histogram(&[stat("a.txt", 40, 21)]);
        assert_eq!(lines[0].matches('+').count(), 40);
        assert_eq!(lines[0].matches('-').count(), 21);
    }

    #[test]
    fn test_large_changes_are_scaled() {
        // height 61, longest 610 -> scale 10
        let lines = histogram(&[stat("a.txt", 500, 110), stat("b.txt", 19, 0)]);
        assert_eq!(lines[0].matches('+').count(), 50);
        assert_eq!(lines[0].matches('-').count(), 11);
        assert_eq!(lines[1].matches('+').count(), 1);
        assert!(lines[0].starts_with(" a.txt | 610 "));
        assert!(lines[1].starts_with(" b.txt |  19 "));
    }

    #[test]
    fn test_long_names_keep_a_minimum_budget() {
        let name = "x".repeat(100);
        assert_eq!(height_budget(name.len()), MIN_HEIGHT);
        let lines = histogram(&[stat(&name, 16, 0)]);
        assert!(lines[0].contains(&name));
        assert_eq!(lines[0].matches('+').count(), 8);
    }

    #[test]
    fn test_empty_histogram() {
        assert!(histogram(&[]).is_empty());
    }

    #[test]
    fn test_omitted_body_keeps_histogram() {
        let diff = CommitDiff {
            files: (0..3).map(|i| file(&format!("f{i}"), 1, 0)).collect(),
            omitted: Some("3 changed files exceed the limit of 2".to_string()),
        };
        let rendered = render_diff(&diff, &Highlighter::new(), 80, &Styles::new());
        assert_eq!(rendered.histogram.len(), 3);
        assert!(rendered.body.is_none());
        assert!(rendered.omitted.unwrap().contains("3 changed files"));
    }

    #[test]
    fn test_within_bounds_has_body() {
        let diff = CommitDiff {
            files: vec![file("a", 0, 0)],
            omitted: None,
        };
        let rendered = render_diff(&diff, &Highlighter::new(), 80, &Styles::new());
        assert_eq!(rendered.body.map(|b| b.len()), Some(1));
        assert!(rendered.omitted.is_none());
    }
}
