use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    style::Style,
    Terminal,
};
use tokio::sync::watch;
use tracing::{info, warn};

use morph_core::animation::owner_queue;
use morph_core::connection::HttpProbe;
use morph_core::{AppConfig, ConnectionMonitor};
use morph_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::{handle_key_event, Action},
    widgets::{PanelWidget, StatusBarWidget},
};

pub async fn run(config: AppConfig) -> Result<()> {
    // This thread owns every panel size; animation timers post writes here
    let (dispatcher, mut queue) = owner_queue();

    // Connectivity indicator for the status bar
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut connection_rx = match HttpProbe::from_config(&config.connection) {
        Ok(probe) => {
            let monitor = Arc::new(ConnectionMonitor::new(
                Arc::new(probe),
                Duration::from_secs(config.connection.check_interval_secs),
            ));
            let rx = monitor.subscribe();
            tokio::spawn(monitor.run(shutdown_rx));
            Some(rx)
        }
        Err(e) => {
            warn!(error = %e, "connection probe disabled");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("morph"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, Arc::new(dispatcher));
    let event_handler = EventHandler::new(config.ui.tick_rate_ms, config.animation.interval_ms);

    info!("demo started");

    // Main loop
    let result: Result<()> = loop {
        // Apply size changes posted by the animation timers
        queue.drain();

        if let Some(rx) = connection_rx.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                app.connection = *rx.borrow_and_update();
            }
        }

        // Draw UI
        if let Err(e) = terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: content + status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(area);

            frame.render_widget(
                Block::default().style(Style::default().bg(app.theme.bg0)),
                main_layout[0],
            );

            // Panels stacked top to bottom; each may grow into its own row
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Ratio(1, app.panels.len() as u32);
                    app.panels.len()
                ])
                .split(main_layout[0]);

            for (index, panel) in app.panels.iter().enumerate() {
                PanelWidget::render(frame, rows[index], panel, index == app.focused, &app.theme);
            }
            StatusBarWidget::render(frame, main_layout[1], &app);
        }) {
            break Err(e.into());
        }

        let event = match event_handler.next(app.is_animating()) {
            Ok(event) => event,
            Err(e) => break Err(e),
        };

        if let Some(AppEvent::Key(key)) = event {
            handle_action(&mut app, handle_key_event(key));
        }

        if app.should_quit {
            break Ok(());
        }
    };

    app.shutdown();
    let _ = shutdown_tx.send(true);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("demo stopped");
    result
}

fn handle_action(app: &mut App, action: Action) {
    if action != Action::None {
        app.clear_status();
    }

    match action {
        Action::Quit => app.should_quit = true,
        Action::FocusNext => app.focus_next(),
        Action::FocusPrev => app.focus_prev(),
        Action::Toggle => {
            if let Err(e) = app.toggle_focused() {
                warn!(error = %e, "toggle failed");
                app.status_message = Some(format!("Error: {}", e));
            }
        }
        Action::TogglePause => app.toggle_pause(),
        Action::Stop => app.stop_focused(),
        Action::ToggleLazy => app.toggle_lazy(),
        Action::ToggleIgnoreWidth => app.toggle_ignore_width(),
        Action::ToggleIgnoreHeight => app.toggle_ignore_height(),
        Action::SpeedUp => app.speed_up(),
        Action::SlowDown => app.slow_down(),
        Action::None => {}
    }
}
