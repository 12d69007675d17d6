//! Syntax highlighting module
//!
//! Renders text to styled lines using syntect. The language is picked by
//! syntax name or token ("diff", "markdown", "rs"), falling back to plain
//! text. Markdown is word-wrapped to the width budget first.

use std::path::Path;

use ratatui::style::{Color, Modifier, Style as RatatuiStyle};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};

const THEME: &str = "base16-ocean.dark";
const TAB: &str = "    ";

/// Turns text into styled terminal lines
pub trait Renderer: Send + Sync {
    /// Render `text` for `language` within `width` columns.
    ///
    /// An empty language renders plain text.
    fn render(&self, text: &str, language: &str, width: u16) -> Result<Vec<Line<'static>>>;
}

/// Render, falling back to the raw text when the renderer fails
pub fn render_or_plain(renderer: &dyn Renderer, text: &str, language: &str, width: u16) -> Vec<Line<'static>> {
    match renderer.render(text, language, width) {
        Ok(lines) => lines,
        Err(err) => {
            tracing::warn!(language, error = %err, "rendering plain text instead");
            plain_lines(text)
        }
    }
}

/// Unstyled lines, tabs expanded
pub fn plain_lines(text: &str) -> Vec<Line<'static>> {
    text.lines().map(|l| Line::raw(l.replace('\t', TAB))).collect()
}

/// Syntax highlighter backed by syntect's default sets
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Highlighter {
    /// Create a new highlighter
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Language name for a file path, if any syntax claims it
    pub fn match_by_name(&self, path: &str) -> Option<String> {
        let path = Path::new(path);

        // Try by extension first
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if let Some(syntax) = self.syntax_set.find_syntax_by_extension(ext) {
                return Some(syntax.name.clone());
            }
        }

        // Then by whole file name (Makefile, Dockerfile)
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| self.syntax_set.find_syntax_by_extension(name))
            .map(|syntax| syntax.name.clone())
    }

    fn find_syntax(&self, language: &str) -> &SyntaxReference {
        if language.is_empty() {
            return self.syntax_set.find_syntax_plain_text();
        }
        self.syntax_set
            .find_syntax_by_name(language)
            .or_else(|| self.syntax_set.find_syntax_by_token(language))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn theme(&self) -> Result<&Theme> {
        self.theme_set
            .themes
            .get(THEME)
            .ok_or_else(|| Error::RenderDegraded(format!("missing theme {THEME}")))
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Highlighter {
    fn render(&self, text: &str, language: &str, width: u16) -> Result<Vec<Line<'static>>> {
        let syntax = self.find_syntax(language);
        let mut highlighter = HighlightLines::new(syntax, self.theme()?);

        let source = if syntax.name == "Markdown" {
            wrap_markdown(text, width as usize).join("\n")
        } else {
            text.to_string()
        };

        let mut lines = Vec::new();
        for line in LinesWithEndings::from(&source) {
            let ranges = highlighter
                .highlight_line(line, &self.syntax_set)
                .map_err(|err| Error::RenderDegraded(err.to_string()))?;
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']).replace('\t', TAB);
                    Span::styled(text, syntect_style_to_ratatui(style))
                })
                .filter(|span| !span.content.is_empty())
                .collect();
            lines.push(Line::from(spans));
        }
        Ok(lines)
    }
}

/// Convert a syntect Style to a ratatui Style
fn syntect_style_to_ratatui(style: Style) -> RatatuiStyle {
    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);

    let mut ratatui_style = RatatuiStyle::default().fg(fg);

    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }

    ratatui_style
}

fn is_fence(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("```") || line.starts_with("~~~")
}

/// Word wrap for markdown prose. Fenced code blocks pass through untouched.
fn wrap_markdown(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut fenced = false;
    for line in text.lines() {
        if is_fence(line) {
            fenced = !fenced;
            out.push(line.to_string());
        } else if fenced {
            out.push(line.to_string());
        } else {
            out.extend(wrap_words(line, width));
        }
    }
    out
}

/// Greedy word wrap by display width.
///
/// Words wider than `width` get a line of their own. Leading indentation of
/// each source line is kept.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.lines().map(str::to_string).collect();
    }

    let mut out = Vec::new();
    for source in text.lines() {
        let indent_len = source.len() - source.trim_start().len();
        let indent = &source[..indent_len];
        let mut current = indent.to_string();
        let mut has_word = false;

        for word in source.split_whitespace() {
            let needed = if has_word { word.width() + 1 } else { word.width() };
            if has_word && current.width() + needed > width {
                out.push(std::mem::replace(&mut current, indent.to_string()));
                has_word = false;
            }
            if has_word {
                current.push(' ');
            }
            current.push_str(word);
            has_word = true;
        }
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    struct Failing;

    impl Renderer for Failing {
        fn render(&self, _: &str, _: &str, _: u16) -> Result<Vec<Line<'static>>> {
            Err(Error::RenderDegraded("boom".to_string()))
        }
    }

    #[test]
    fn test_match_by_name() {
        let highlighter = Highlighter::new();
        assert_eq!(highlighter.match_by_name("src/main.rs").as_deref(), Some("Rust"));
        assert_eq!(highlighter.match_by_name("Makefile").as_deref(), Some("Makefile"));
        assert_eq!(highlighter.match_by_name("data.unknownext"), None);
    }

    #[test]
    fn test_render_keeps_text() {
        let highlighter = Highlighter::new();
        let lines = highlighter.render("fn main() {\n\tx();\n}\n", "Rust", 80).unwrap();
        let texts: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(texts, vec!["fn main() {", "    x();", "}"]);
    }

    #[test]
    fn test_diff_language_styles_markers() {
        let highlighter = Highlighter::new();
        let lines = highlighter.render("+added\n-removed\n", "diff", 80).unwrap();
        assert_eq!(lines.len(), 2);
        let added = lines[0].spans[0].style.fg;
        let removed = lines[1].spans[0].style.fg;
        assert!(added.is_some());
        assert_ne!(added, removed);
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let highlighter = Highlighter::new();
        let lines = highlighter.render("a\nb", "no-such-language", 80).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(text_of(&lines[1]), "b");
    }

    #[test]
    fn test_markdown_is_wrapped() {
        let highlighter = Highlighter::new();
        let lines = highlighter.render("one two three four", "markdown", 9).unwrap();
        let texts: Vec<String> = lines.iter().map(text_of).collect();
        assert_eq!(texts, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_failed_render_falls_back_to_plain() {
        let lines = render_or_plain(&Failing, "raw\ttext\nmore", "diff", 80);
        assert_eq!(lines.len(), 2);
        assert_eq!(text_of(&lines[0]), "raw    text");
    }

    #[test]
    fn test_markdown_fences_keep_spacing() {
        let text = "```\nlet  x  =  1;   // aligned\n```\nsome words here";
        assert_eq!(
            wrap_markdown(text, 10),
            vec!["```", "let  x  =  1;   // aligned", "```", "some words", "here"]
        );

        let highlighter = Highlighter::new();
        let lines = highlighter.render("~~~\na    b\n~~~", "markdown", 4).unwrap();
        assert_eq!(text_of(&lines[1]), "a    b");
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(wrap_words("  a bb ccc", 6), vec!["  a bb", "  ccc"]);
        assert_eq!(wrap_words("averyverylongword x", 4), vec!["averyverylongword", "x"]);
        assert_eq!(wrap_words("a\n\nb", 10), vec!["a", "", "b"]);
    }
}
