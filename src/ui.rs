use crate::app::{App, TIMELINE_ROWS};
use crate::braille::{glyph_for, BrailleCanvas};
use crate::colour::STROKE;
use crate::map::{draw_markers, draw_outlines};
use crate::years::{last_index, CATALOG};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

const BORDERS_CREDIT: &str = "Borders: historical-basemaps";

/// Point features, like the default map pin
const MARKER: Color = Color::Rgb(0x38, 0x8f, 0xd8);

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(TIMELINE_ROWS)])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_timeline(frame, app, chunks[1]);

    if app.show_landing {
        render_landing(frame, area);
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let year = app.slider.year();
    let mut title = vec![Span::styled(
        format!(" Historical Borders · {} ", year),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if app.loader.is_loading() {
        title.push(Span::styled(
            " Loading… ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    let attribution = format!(" {} · {} ", app.base_map.source.attribution(), BORDERS_CREDIT);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Line::from(title))
        .title_bottom(Line::from(Span::styled(attribution, Style::default().fg(Color::DarkGray))).right_aligned());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let mut coast = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    app.base_map.render(&mut coast, &viewport);

    let mut outlines = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    let mut markers = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    if let Some(layer) = app.loader.layer() {
        draw_outlines(&mut outlines, layer, &viewport);
        draw_markers(&mut markers, layer, &viewport);
    }

    let hover = app.mouse_pos.zip(app.hovered_label()).map(|((col, row), label)| {
        (col.saturating_sub(inner.x), row.saturating_sub(inner.y), label.to_string())
    });

    frame.render_widget(
        MapWidget {
            app,
            coast,
            outlines,
            markers,
            hover,
        },
        inner,
    );
}

/// Map cells: region fills as background, coastlines, borders and point
/// markers as Braille
struct MapWidget<'a> {
    app: &'a App,
    coast: BrailleCanvas,
    outlines: BrailleCanvas,
    markers: BrailleCanvas,
    /// Cursor cell (relative to the map) and the label under it
    hover: Option<(u16, u16, String)>,
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = (area.width as usize).min(self.coast.width());
        let rows = (area.height as usize).min(self.coast.height());

        for row in 0..rows {
            for col in 0..cols {
                let cell = &mut buf[(area.x + col as u16, area.y + row as u16)];
                if let Some(bg) = self.app.fills.get(col, row) {
                    cell.set_bg(bg);
                }

                let coast = self.coast.bits(col, row);
                let border = self.outlines.bits(col, row);
                let marker = self.markers.bits(col, row);
                let (bits, fg) = match (coast, border, marker) {
                    (0, 0, 0) => continue,
                    (_, _, m) if m != 0 => (m, MARKER),
                    (c, 0, _) => (c, Color::Cyan),
                    (c, b, _) => (c | b, STROKE),
                };
                if let Some(ch) = glyph_for(bits) {
                    cell.set_char(ch).set_fg(fg);
                }
            }
        }

        // Sticky label next to the cursor
        if let Some((cx, cy, label)) = self.hover {
            let y = area.y + cy;
            if y >= area.y + area.height {
                return;
            }
            let style = Style::default().fg(Color::White).bg(Color::Black);
            let start = area.x + cx + 2;
            for (i, ch) in label.chars().take(32).enumerate() {
                let x = start + i as u16;
                if x >= area.x + area.width {
                    break;
                }
                buf[(x, y)].set_char(ch).set_style(style);
            }
            let cursor_x = area.x + cx;
            if cursor_x < area.x + area.width {
                buf[(cursor_x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

/// One notch per catalog year; the current one carries the knob
fn notch(index: usize, current: usize, step: u16) -> Span<'static> {
    let (fill, style) = if index <= current {
        ('━', Style::default().fg(if index == current { Color::Yellow } else { Color::Cyan }))
    } else {
        ('─', Style::default().fg(Color::DarkGray))
    };
    let text: String = (0..step)
        .map(|k| if index == current && k == step / 2 { '●' } else { fill })
        .collect();
    Span::styled(text, style)
}

/// Track (play button, year label, one notch per catalog year) and status line
fn render_timeline(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.slider.index();
    let track = app.track();
    let button_style = if app.playback.is_running() {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    };

    let label = Line::from(vec![
        Span::styled(format!(" {:<8}", app.playback.label()), button_style),
        Span::styled(format!(" {:>8} ", app.slider.year()), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    ]);
    let mut notches: Vec<Span> = (0..=last_index()).map(|i| notch(i, current, track.step)).collect();
    let endpoints = format!("  {} … {}", CATALOG[0], CATALOG[last_index()]);
    if track.end() as usize + endpoints.chars().count() <= area.width as usize {
        notches.push(Span::styled(endpoints, Style::default().fg(Color::DarkGray)));
    }

    // Same columns App::click maps back to indices
    let row = Rect { height: 1.min(area.height), ..area };
    let label_area = Rect { width: track.offset.min(row.width), ..row };
    let track_area = Rect {
        x: row.x + label_area.width,
        width: row.width - label_area.width,
        ..row
    };
    frame.render_widget(Paragraph::new(label), label_area);
    frame.render_widget(Paragraph::new(Line::from(notches)), track_area);

    let mut status = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(layer) = app.loader.layer() {
        status.push(Span::styled(
            format!(" | {} regions", layer.regions.len()),
            Style::default().fg(Color::Magenta),
        ));
    }
    if let Some(name) = app.hovered_region().and_then(|r| r.name.as_deref()) {
        status.push(Span::styled(format!(" | {}", name), Style::default().fg(Color::White)));
    }
    status.push(Span::styled(
        " | space:play [ ]:year hjkl:pan +/-:zoom b:base r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    if area.height > 1 {
        let status_area = Rect {
            y: area.y + 1,
            height: area.height - 1,
            ..area
        };
        frame.render_widget(Paragraph::new(Line::from(status)), status_area);
    }
}

/// Centered welcome card shown once at startup
fn render_landing(frame: &mut Frame, area: Rect) {
    let [popup] = Layout::horizontal([Constraint::Length(60)]).flex(Flex::Center).areas(area);
    let [popup] = Layout::vertical([Constraint::Length(11)]).flex(Flex::Center).areas(popup);

    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let text = vec![
        Line::from(Span::styled("Borders Through Time", heading)).centered(),
        Line::from(""),
        Line::from(format!(
            "Walk through {} snapshots of the world's borders, from {} to {}.",
            CATALOG.len(),
            CATALOG[0],
            CATALOG[last_index()]
        )),
        Line::from("Each colour is one realm; hover a region to see its name."),
        Line::from(""),
        Line::from("space play/pause   [ ] previous/next year   click the timeline"),
        Line::from(""),
        Line::from(Span::styled("Press Enter to explore", Style::default().fg(Color::Yellow))).centered(),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borders::{CannedSource, FetchWorker};
    use crate::config::Config;
    use crate::data::builtin_base_map;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;

    fn app(width: u16, height: u16) -> App {
        let config = Config {
            no_landing: true,
            ..Config::default()
        };
        let fetcher = FetchWorker::new(Arc::new(CannedSource::default()));
        App::new(width as usize, height as usize, &config, builtin_base_map(), fetcher)
    }

    fn draw(app: &App, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
    }

    fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_knob_visible_at_80_columns() {
        let app = app(80, 24);
        let terminal = draw(&app, 80, 24);
        let track_row = 24 - TIMELINE_ROWS;

        let knob = app.track().column_of_index(app.slider.index());
        assert_eq!(terminal.backend().buffer()[(knob, track_row)].symbol(), "●");
        let text = row_text(&terminal, track_row);
        assert!(text.contains("1400 AD"), "track row: {text:?}");
        assert_eq!(text.matches('●').count(), 1);
    }

    #[test]
    fn test_knob_drawn_where_clicks_land() {
        for width in [50u16, 80, 120] {
            let mut app = app(width, 24);
            for index in [0, 13, last_index()] {
                app.slider.set(index);
                let terminal = draw(&app, width, 24);
                let col = app.track().column_of_index(index);
                let cell = &terminal.backend().buffer()[(col, 24 - TIMELINE_ROWS)];
                assert_eq!(cell.symbol(), "●", "index {index} at width {width}");
            }
        }
    }

    #[test]
    fn test_title_shows_loading() {
        let mut app = app(80, 24);
        app.start();
        let terminal = draw(&app, 80, 24);
        let title = row_text(&terminal, 0);
        assert!(title.contains("1400 AD"));
        assert!(title.contains("Loading"));
    }
}
