use anyhow::Result;
use borders_map::app::App;
use borders_map::borders::{FetchWorker, HttpSource};
use borders_map::config::Config;
use borders_map::map::BaseMap;
use borders_map::{data, logging, ui};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use log::info;
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(&config.log_file)?;
    info!("starting with {:?}", config);

    let source = HttpSource::new()?;
    let base_map = data::load_base_map(config.coastlines.as_deref());

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &config, base_map, FetchWorker::new(Arc::new(source)));

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for panning, zooming, hovering and the timeline
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the hover label
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

/// Keys while the welcome card is up
fn handle_landing_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => app.dismiss_landing(),
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        _ => {}
    }
}

fn handle_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Timeline
        KeyCode::Char('[') | KeyCode::Char(',') => app.step_year(-1),
        KeyCode::Char(']') | KeyCode::Char('.') => app.step_year(1),
        KeyCode::Home => app.first_year(),
        KeyCode::End => app.last_year(),
        KeyCode::Char(' ') => app.toggle_playback(Instant::now()),

        KeyCode::Char('b') | KeyCode::Char('B') => app.base_map.toggle(),
        KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: &Config, base_map: BaseMap, fetcher: FetchWorker) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, config, base_map, fetcher);
    app.start();

    loop {
        app.refresh_fills();
        terminal.draw(|frame| ui::render(frame, &app))?;

        // ~60fps input polling; the playback timer is checked every pass
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.show_landing {
                        handle_landing_key(&mut app, key.code);
                    } else {
                        handle_key(&mut app, key.code);
                    }
                }
                Event::Mouse(mouse) if !app.show_landing => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
