use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::info;

use daybook_core::{AppConfig, JsonFileStore};
use daybook_tui::{
    app::App,
    controller::ViewEvent,
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event},
    preload::{spawn_load, DiskImageLoader, ImageLoader, LoadOutcome},
    widgets::{CalendarWidget, EntryViewWidget, StatusBarWidget, CALENDAR_WIDTH},
};

pub async fn run(config: Arc<AppConfig>, manifest: Option<PathBuf>) -> Result<()> {
    let (diary, images_dir) = super::load_diary(&config, manifest.as_deref())?;
    info!(
        "Loaded {} entries in {} months",
        diary.len(),
        diary.sections().len()
    );

    let loader: Arc<dyn ImageLoader> = Arc::new(DiskImageLoader::new(images_dir)?);
    let store = Box::new(JsonFileStore::new(config.preferences_path()));
    let mut app = App::new(Arc::new(diary), &config, store);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("Daybook"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, loader, &config);

    // Abandon in-flight loads before the runtime shuts down
    app.controller.unmount();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    loader: Arc<dyn ImageLoader>,
    config: &AppConfig,
) -> Result<()> {
    let event_handler = EventHandler::new(config.ui.tick_rate_ms);

    // Create channel for async image loading results
    let (img_tx, mut img_rx) = mpsc::unbounded_channel::<LoadOutcome>();

    // Status bar takes the last row
    let size = terminal.size()?;
    app.mount(size.height.saturating_sub(1), Instant::now());

    loop {
        let now = Instant::now();

        // Process any completed image loads (non-blocking)
        while let Ok(outcome) = img_rx.try_recv() {
            app.controller.handle(ViewEvent::ImageLoaded(outcome), now);
        }

        // Fire autoplay and settle timers
        app.tick(now);

        // Start whatever the preload queue allows
        for request in app.controller.drain_load_requests(now) {
            spawn_load(loader.clone(), request, img_tx.clone());
        }

        // Draw UI
        terminal.draw(|frame| {
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(frame.area());

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(CALENDAR_WIDTH), Constraint::Min(1)])
                .split(main_layout[0]);

            app.set_calendar_height(columns[0].height, now);

            CalendarWidget::render(frame, columns[0], app);
            EntryViewWidget::render(frame, columns[1], app);
            StatusBarWidget::render(frame, main_layout[1], app);
        })?;

        // Handle events
        if let Some(event) = event_handler.next()? {
            let now = Instant::now();
            match event {
                AppEvent::Key(key) => app.apply(handle_key_event(key), now),
                AppEvent::Mouse(mouse) => app.apply(handle_mouse_event(mouse), now),
                // Resizes are picked up by the next draw
                AppEvent::Resize(_, _) | AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
