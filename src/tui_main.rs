use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc};

use yap_scorer::{
    config::Settings,
    scoring::ScoreCalculator,
    tui::{
        app::{InputMode, Screen},
        ui, App, Event as TuiEvent, EventHandler,
    },
};

pub async fn run_tui(settings: &Settings, calculator: Arc<ScoreCalculator>) -> Result<()> {
    // Disable logging to prevent screen corruption
    disable_logging_output();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings, calculator);
    let events = EventHandler::new(250);

    terminal.clear()?;

    // The input loop blocks on terminal events; move it off the async scheduler.
    let res = tokio::task::block_in_place(|| run_app(&mut terminal, &mut app, events));

    // Always restore terminal state, even if there was an error
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Application error: {}", err);
        Err(err)
    } else {
        Ok(())
    }
}

fn disable_logging_output() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let null_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::sink)
        .with_filter(tracing_subscriber::filter::LevelFilter::OFF);

    let _ = tracing_subscriber::registry()
        .with(null_layer)
        .try_init();
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: EventHandler,
) -> Result<()> {
    loop {
        if app.should_quit {
            return Ok(());
        }

        // A result may land after the FDV moved.
        app.revalue();
        terminal.draw(|f| ui::draw(f, &*app))?;

        match events.next()? {
            TuiEvent::Key(key) => handle_key(app, key),
            TuiEvent::Resize(_, _) | TuiEvent::Tick => {}
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        InputMode::EditingHandle => match key.code {
            KeyCode::Esc => app.input_mode = InputMode::Normal,
            KeyCode::Enter => app.submit_handle(),
            KeyCode::Char(c) => app.handle_input.push(c),
            KeyCode::Backspace => {
                app.handle_input.pop();
            }
            KeyCode::Tab => app.next_project(),
            _ => {}
        },
        InputMode::EditingFren => match key.code {
            KeyCode::Esc => {
                app.fren_input.clear();
                app.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => app.submit_fren(),
            KeyCode::Char(c) => app.fren_input.push(c),
            KeyCode::Backspace => {
                app.fren_input.pop();
            }
            _ => {}
        },
        InputMode::Normal => match app.current_screen {
            Screen::Main => match key.code {
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('e') | KeyCode::Char('a') => {
                    app.input_mode = InputMode::EditingHandle;
                    app.error_message = None;
                }
                KeyCode::Tab | KeyCode::Down => app.next_project(),
                KeyCode::BackTab | KeyCode::Up => app.previous_project(),
                KeyCode::Enter => app.submit_handle(),
                _ => {}
            },
            Screen::Results => match key.code {
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('b') | KeyCode::Esc => app.back_to_main(),
                KeyCode::Char('r') => app.submit_handle(),
                KeyCode::Char('c') => {
                    app.fren_input.clear();
                    app.input_mode = InputMode::EditingFren;
                }
                KeyCode::Left => app.nudge_fdv(-1.0),
                KeyCode::Right => app.nudge_fdv(1.0),
                KeyCode::PageDown => app.nudge_fdv(-100.0),
                KeyCode::PageUp => app.nudge_fdv(100.0),
                _ => {}
            },
        },
    }
}
