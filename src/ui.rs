#![forbid(unsafe_code)]

use ftui::Frame;
use ftui::core::geometry::Rect;
use ftui::render::cell::PackedRgba;
use ftui::style::Style;
use ftui::text as ftext;
use ftui::text::{Span, WrapMode};
use ftui::widgets::Widget;
use ftui::widgets::block::Block;
use ftui::widgets::paragraph::Paragraph;

use crate::model::{Mode, VisualRange};
use crate::pane::Pane;
use crate::search::SearchPane;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub screen_bg: PackedRgba,
    pub text_fg: PackedRgba,
    pub title_fg: PackedRgba,
    pub selection_fg: PackedRgba,
    pub selection_bg: PackedRgba,
    pub result_fg: PackedRgba,
    pub result_bg: PackedRgba,
    pub result_selection_fg: PackedRgba,
    pub result_selection_bg: PackedRgba,
    pub badge_fg: PackedRgba,
    pub normal_bg: PackedRgba,
    pub search_bg: PackedRgba,
    pub insert_bg: PackedRgba,
    pub visual_bg: PackedRgba,
}

impl Theme {
    pub fn classic() -> Self {
        // VGA-ish palette on a plain black screen.
        Self {
            screen_bg: PackedRgba::rgb(0, 0, 0),
            text_fg: PackedRgba::rgb(255, 255, 255),
            title_fg: PackedRgba::rgb(255, 255, 255),
            selection_fg: PackedRgba::rgb(255, 255, 255),
            selection_bg: PackedRgba::rgb(0, 0, 170),
            result_fg: PackedRgba::rgb(0, 0, 0),
            result_bg: PackedRgba::rgb(170, 170, 170),
            result_selection_fg: PackedRgba::rgb(255, 255, 255),
            result_selection_bg: PackedRgba::rgb(170, 0, 170),
            badge_fg: PackedRgba::rgb(0, 0, 0),
            normal_bg: PackedRgba::rgb(0, 0, 170),
            search_bg: PackedRgba::rgb(170, 0, 170),
            insert_bg: PackedRgba::rgb(0, 170, 0),
            visual_bg: PackedRgba::rgb(170, 170, 0),
        }
    }
}

pub fn render_background(frame: &mut Frame, theme: Theme) {
    let full = Rect::new(0, 0, frame.width(), frame.height());
    let background = Block::new().style(Style::new().fg(theme.text_fg).bg(theme.screen_bg));
    background.render(full, frame);
}

/// Draw one pane: title row, then the viewport slice of its listing.
/// `overlay_rows` shortens the visible window while the search overlay
/// covers the pane's bottom rows.
pub fn render_pane(
    frame: &mut Frame,
    pane: &Pane,
    is_active: bool,
    visual: Option<&VisualRange>,
    overlay_rows: usize,
    theme: Theme,
) {
    let mut title_style = Style::new().fg(theme.title_fg).bg(theme.screen_bg);
    if is_active {
        title_style = title_style.bold();
    }
    let title = Paragraph::new(ftext::Text::from(format!("Current Directory: {}", pane.cwd)))
        .style(title_style)
        .wrap(WrapMode::None);
    title.render(Rect::new(pane.x, pane.y, pane.width, 1), frame);

    let mut end = pane.num_lines.min(pane.view_end);
    if overlay_rows > 0 {
        end = end.min(pane.view_start + pane.view_height().saturating_sub(overlay_rows));
    }

    let mut rows = Vec::new();
    for index in pane.view_start..end {
        let line = &pane.lines()[index];
        let highlighted = match visual {
            Some(range) => range.contains(index),
            None => index == pane.current_line,
        };
        let style = if highlighted {
            Style::new().fg(theme.selection_fg).bg(theme.selection_bg)
        } else {
            Style::new().fg(theme.text_fg).bg(theme.screen_bg)
        };
        let mut name = line.text.to_string();
        if line.is_dir {
            name.push('/');
        }
        rows.push(ftext::Line::from_spans(vec![Span::styled(name, style)]));
    }

    let listing = Paragraph::new(ftext::Text::from_lines(rows)).wrap(WrapMode::None);
    listing.render(
        Rect::new(pane.x, pane.y + 1, pane.width, pane.view_height() as u16),
        frame,
    );
}

/// Search overlay anchored to the origin pane's bottom edge. Matched
/// positions from the mask render bold; the selected result row inverts.
pub fn render_search(frame: &mut Frame, search: &SearchPane, origin: &Pane, theme: Theme) {
    if search.height == 0 {
        return;
    }
    let mut rows = Vec::new();
    let end = search.hits.len().min(search.view_end);
    for index in search.view_start..end {
        let hit = &search.hits[index];
        let entry = &origin.lines()[hit.line];
        let (fg, bg) = if index == search.current_line {
            (theme.result_selection_fg, theme.result_selection_bg)
        } else {
            (theme.result_fg, theme.result_bg)
        };
        let base = Style::new().fg(fg).bg(bg);

        let mut spans = Vec::new();
        for (pos, &byte) in entry.text.as_bytes().iter().enumerate() {
            let style = if pos < 64 && (hit.mask >> pos) & 1 == 1 { base.bold() } else { base };
            spans.push(Span::styled((byte as char).to_string(), style));
        }
        let mut used = entry.text.len();
        if entry.is_dir {
            spans.push(Span::styled("/".to_string(), base));
            used += 1;
        }
        if used < search.width as usize {
            spans.push(Span::styled(" ".repeat(search.width as usize - used), base));
        }
        rows.push(ftext::Line::from_spans(spans));
    }

    let overlay = Paragraph::new(ftext::Text::from_lines(rows)).wrap(WrapMode::None);
    overlay.render(Rect::new(search.x, search.y, search.width, search.height), frame);
}

pub fn render_separator(frame: &mut Frame, x: u16, height: u16, theme: Theme) {
    let style = Style::new().fg(theme.text_fg).bg(theme.screen_bg);
    let rows: Vec<ftext::Line> = (0..height)
        .map(|_| ftext::Line::from_spans(vec![Span::styled("|".to_string(), style)]))
        .collect();
    let separator = Paragraph::new(ftext::Text::from_lines(rows)).wrap(WrapMode::None);
    separator.render(Rect::new(x, 0, 1, height), frame);
}

/// Bottom input line: colored mode badge, then the query, pending filename
/// or transient status message.
pub fn render_input_line(
    frame: &mut Frame,
    x: u16,
    y: u16,
    width: u16,
    mode: Mode,
    content: &str,
    theme: Theme,
) {
    let (label, badge_bg) = match mode {
        Mode::Normal => ("NORMAL", theme.normal_bg),
        Mode::Search => ("SEARCH", theme.search_bg),
        Mode::Insert => ("INSERT", theme.insert_bg),
        Mode::Visual => ("VISUAL", theme.visual_bg),
    };
    let spans = vec![
        Span::styled(label.to_string(), Style::new().fg(theme.badge_fg).bg(badge_bg)),
        Span::styled(" ".to_string(), Style::new().fg(theme.text_fg).bg(theme.screen_bg)),
        Span::styled(content.to_string(), Style::new().fg(theme.text_fg).bg(theme.screen_bg)),
    ];
    let line = Paragraph::new(ftext::Text::from_lines(vec![ftext::Line::from_spans(spans)]))
        .wrap(WrapMode::None);
    line.render(Rect::new(x, y, width, 1), frame);
}
