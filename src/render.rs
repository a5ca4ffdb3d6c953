use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local, Utc};
use colored::Colorize;

use crate::{
    report::{Block, PullEntry, RepositoryBlock},
    types::Severity,
};

const DATE_FORMAT: &str = "%d.%m.%Y";
const INDENT: &str = "  ";

/// Named output styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Repository header: blue, bold.
    Title,
    /// Pull request headline: green, bold.
    Subtitle,
    Info,
    Warning,
    /// Notices and old pull requests: white on red, bold.
    Error,
}

impl From<Severity> for Style {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Style::Info,
            Severity::Warning => Style::Warning,
            Severity::Error => Style::Error,
        }
    }
}

/// Applies [`Style`]s to text, or leaves it untouched when colors are off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn colored() -> Self {
        Self { color: true }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn is_colored(&self) -> bool {
        self.color
    }

    pub fn paint(&self, style: Style, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = match style {
            Style::Title => text.blue().bold(),
            Style::Subtitle => text.green().bold(),
            Style::Info => text.green(),
            Style::Warning => text.yellow(),
            Style::Error => text.white().on_red().bold(),
        };
        styled.to_string()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::colored()
    }
}

/// Writes report blocks line by line to `writer`.
pub struct Renderer<W: Write> {
    writer: W,
    palette: Palette,
    offset: Option<FixedOffset>,
}

impl<W: Write> Renderer<W> {
    /// Dates are shown in the local time zone.
    pub fn new(writer: W, palette: Palette) -> Self {
        Self {
            writer,
            palette,
            offset: None,
        }
    }

    /// Shows dates at a fixed UTC offset instead of the local time zone.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn format_date(&self, timestamp: DateTime<Utc>) -> String {
        let formatted = match self.offset {
            Some(offset) => timestamp.with_timezone(&offset).format(DATE_FORMAT),
            None => timestamp.with_timezone(&Local).format(DATE_FORMAT),
        };
        formatted.to_string()
    }

    pub fn render(&mut self, blocks: &[Block]) -> Result<()> {
        for block in blocks {
            self.render_block(block)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn render_block(&mut self, block: &Block) -> Result<()> {
        match block {
            Block::Notice(text) => self.render_notice(text),
            Block::Repository(repo) => self.render_repository(repo),
        }
    }

    pub fn render_notice(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", self.palette.paint(Style::Error, text))?;
        Ok(())
    }

    fn render_repository(&mut self, repo: &RepositoryBlock) -> Result<()> {
        let count = repo.pulls.len();
        let fork_marker = if repo.fork { " (forked)" } else { "" };

        writeln!(
            self.writer,
            "{}{fork_marker} - {count} open PR",
            self.palette.paint(Style::Title, &repo.name)
        )?;
        writeln!(self.writer)?;

        for entry in &repo.pulls {
            self.render_pull(entry)?;
        }

        writeln!(self.writer)?;
        Ok(())
    }

    fn render_pull(&mut self, entry: &PullEntry) -> Result<()> {
        let pull = &entry.pull;
        let headline = format!("#{} {}", pull.number, pull.title);
        let dates = format!(
            "Created: {}  Updated: {}",
            self.format_date(pull.created_at),
            self.format_date(pull.updated_at)
        );

        writeln!(
            self.writer,
            "{INDENT}{} ({})",
            self.palette.paint(Style::Subtitle, &headline),
            pull.author_login
        )?;
        writeln!(
            self.writer,
            "{INDENT}{}",
            self.palette.paint(entry.severity.into(), &dates)
        )?;
        writeln!(self.writer, "{INDENT}{}", pull.url)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::PullRequest;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn entry(number: u64, title: &str, severity: Severity) -> PullEntry {
        PullEntry {
            pull: PullRequest {
                number,
                title: title.to_string(),
                author_login: "alice".to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
                updated_at: Utc.with_ymd_and_hms(2024, 2, 17, 23, 30, 0).unwrap(),
                url: format!("https://github.com/acme/widgets/pull/{number}"),
            },
            severity,
        }
    }

    fn render_plain(blocks: &[Block]) -> String {
        let mut renderer = Renderer::new(Vec::new(), Palette::plain()).with_offset(utc());
        renderer.render(blocks).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_render_repository_block() {
        let output = render_plain(&[Block::Repository(RepositoryBlock {
            name: "widgets".to_string(),
            fork: false,
            pulls: vec![entry(7, "Fix bug", Severity::Info)],
        })]);

        let expected = "\
widgets - 1 open PR

  #7 Fix bug (alice)
  Created: 05.01.2024  Updated: 17.02.2024
  https://github.com/acme/widgets/pull/7


";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_render_count_and_fork_marker() {
        let output = render_plain(&[Block::Repository(RepositoryBlock {
            name: "mirror".to_string(),
            fork: true,
            pulls: vec![
                entry(1, "One", Severity::Info),
                entry(2, "Two", Severity::Error),
            ],
        })]);

        assert!(output.starts_with("mirror (forked) - 2 open PR\n\n"));
        assert!(output.contains("  #1 One (alice)\n"));
        assert!(output.contains("  #2 Two (alice)\n"));
    }

    #[test]
    fn test_render_notice() {
        let output = render_plain(&[Block::Notice("User 'ghost' not found".to_string())]);
        assert_eq!(output, "User 'ghost' not found\n");
    }

    #[test]
    fn test_dates_follow_offset() {
        let renderer = Renderer::new(Vec::new(), Palette::plain())
            .with_offset(FixedOffset::east_opt(2 * 3600).unwrap());
        let late = Utc.with_ymd_and_hms(2024, 2, 17, 23, 30, 0).unwrap();
        assert_eq!(renderer.format_date(late), "18.02.2024");
    }

    #[test]
    fn test_plain_palette_leaves_text_alone() {
        let palette = Palette::plain();
        for style in [
            Style::Title,
            Style::Subtitle,
            Style::Info,
            Style::Warning,
            Style::Error,
        ] {
            assert_eq!(palette.paint(style, "text"), "text");
        }
    }

    #[test]
    fn test_colored_palette_emits_escape_codes() {
        colored::control::set_override(true);
        let palette = Palette::colored();

        let title = palette.paint(Style::Title, "widgets");
        assert!(title.contains("widgets"));
        assert!(title.starts_with("\x1b["));
        assert!(title.ends_with("\x1b[0m"));
        assert_ne!(
            palette.paint(Style::Warning, "x"),
            palette.paint(Style::Error, "x")
        );
    }

    #[test]
    fn test_severity_maps_to_style() {
        assert_eq!(Style::from(Severity::Info), Style::Info);
        assert_eq!(Style::from(Severity::Warning), Style::Warning);
        assert_eq!(Style::from(Severity::Error), Style::Error);
    }
}
