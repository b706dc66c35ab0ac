use std::sync::{Arc, Mutex};

use morph_core::animation::{AnimationHandler, AnimationState, Dispatcher, Size, SizeCell};
use morph_core::{AnimationOptions, AppConfig, ConnectionState};

use crate::theme::Theme;

/// Divisor bounds reachable from the keyboard
const MIN_SPEED_DIVISOR: f64 = 1.5;
const MAX_SPEED_DIVISOR: f64 = 24.0;

/// A resizable box on screen
///
/// The size lives in a [`SizeCell`] owned by the UI thread; animations
/// only ever write it through the app's dispatcher.
pub struct Panel {
    pub title: String,
    pub cell: Arc<SizeCell>,
    pub expanded: bool,
    /// Last percentage reported by the running animation
    pub progress: Arc<Mutex<f64>>,
    pub animation: Option<AnimationHandler>,
}

impl Panel {
    fn new(title: impl Into<String>, size: Size) -> Self {
        Self {
            title: title.into(),
            cell: SizeCell::new(size),
            expanded: false,
            progress: Arc::new(Mutex::new(100.0)),
            animation: None,
        }
    }

    pub fn size(&self) -> Size {
        self.cell.get()
    }

    pub fn progress(&self) -> f64 {
        *self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// State of the current animation; `None` when idle
    pub fn animation_state(&self) -> Option<AnimationState> {
        self.animation
            .as_ref()
            .map(AnimationHandler::state)
            .filter(|s| *s != AnimationState::Disposed)
    }

    pub fn is_animating(&self) -> bool {
        self.animation_state().is_some()
    }
}

/// Application state
pub struct App {
    pub panels: Vec<Panel>,
    pub focused: usize,
    pub options: AnimationOptions,
    pub collapsed: Size,
    pub expanded: Size,
    pub connection: ConnectionState,
    pub status_message: Option<String>,
    pub should_quit: bool,
    pub theme: Theme,
    dispatcher: Arc<dyn Dispatcher>,
}

impl App {
    pub fn new(config: &AppConfig, dispatcher: Arc<dyn Dispatcher>) -> Self {
        let ui = &config.ui;
        let collapsed = Size::new(ui.collapsed_width, ui.collapsed_height);
        let expanded = Size::new(ui.expanded_width, ui.expanded_height);

        let panels = ["Notes", "Preview", "Inspector"]
            .into_iter()
            .map(|title| Panel::new(title, collapsed))
            .collect();

        Self {
            panels,
            focused: 0,
            options: config.animation,
            collapsed,
            expanded,
            connection: ConnectionState::default(),
            status_message: None,
            should_quit: false,
            theme: Theme::default(),
            dispatcher,
        }
    }

    pub fn focused_panel(&self) -> &Panel {
        &self.panels[self.focused]
    }

    pub fn is_animating(&self) -> bool {
        self.panels.iter().any(Panel::is_animating)
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.panels.len();
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + self.panels.len() - 1) % self.panels.len();
    }

    /// Expand or collapse the focused panel
    ///
    /// A panel that is already moving is retargeted so it turns around
    /// from where it is instead of jumping.
    pub fn toggle_focused(&mut self) -> morph_core::Result<()> {
        let (collapsed, expanded, options) = (self.collapsed, self.expanded, self.options);
        let dispatcher = Arc::clone(&self.dispatcher);
        let panel = &mut self.panels[self.focused];

        panel.expanded = !panel.expanded;
        let destination = if panel.expanded { expanded } else { collapsed };

        if let Some(handler) = panel.animation.as_ref().filter(|h| !h.is_disposed()) {
            handler.retarget(destination)?;
            handler.resume();
            self.status_message = Some(format!("{} → {}", panel.title, destination));
            return Ok(());
        }

        let handler = AnimationHandler::new(panel.cell.clone(), destination, dispatcher)?
            .with_options(options)?;

        let progress = Arc::clone(&panel.progress);
        handler.on_progress(move |value| {
            *progress.lock().unwrap_or_else(|e| e.into_inner()) = value;
        });

        let title = panel.title.clone();
        handler.start_with(move || tracing::debug!(panel = %title, "panel settled"))?;

        tracing::info!(panel = %panel.title, to = %destination, "animating panel");
        self.status_message = Some(format!("{} → {}", panel.title, destination));
        panel.animation = Some(handler);
        Ok(())
    }

    pub fn toggle_pause(&mut self) {
        let panel = &self.panels[self.focused];
        match panel.animation_state() {
            Some(AnimationState::Running) => {
                if let Some(handler) = &panel.animation {
                    handler.pause();
                }
                self.status_message = Some(format!("{} paused", panel.title));
            }
            Some(AnimationState::Paused) => {
                if let Some(handler) = &panel.animation {
                    handler.resume();
                }
                self.status_message = Some(format!("{} resumed", panel.title));
            }
            _ => {}
        }
    }

    /// Freeze the focused panel at its current size
    pub fn stop_focused(&mut self) {
        let panel = &mut self.panels[self.focused];
        if let Some(handler) = panel.animation.take() {
            handler.stop();
            // Whatever size it stopped at decides the next toggle direction
            let size = panel.cell.get();
            panel.expanded = size.width >= self.expanded.width && size.height >= self.expanded.height;
            self.status_message = Some(format!("{} stopped at {}", panel.title, size));
        }
    }

    /// Option changes apply to animations started afterwards
    pub fn toggle_lazy(&mut self) {
        self.options.lazy = !self.options.lazy;
        self.status_message = Some(format!("lazy: {}", on_off(self.options.lazy)));
    }

    pub fn toggle_ignore_width(&mut self) {
        self.options.ignore_width = !self.options.ignore_width;
        self.status_message = Some(format!("ignore width: {}", on_off(self.options.ignore_width)));
    }

    pub fn toggle_ignore_height(&mut self) {
        self.options.ignore_height = !self.options.ignore_height;
        self.status_message = Some(format!("ignore height: {}", on_off(self.options.ignore_height)));
    }

    pub fn speed_up(&mut self) {
        self.options.speed_divisor = (self.options.speed_divisor - 1.0).max(MIN_SPEED_DIVISOR);
        self.status_message = Some(format!("speed divisor: {:.1}", self.options.speed_divisor));
    }

    pub fn slow_down(&mut self) {
        self.options.speed_divisor = (self.options.speed_divisor + 1.0).min(MAX_SPEED_DIVISOR);
        self.status_message = Some(format!("speed divisor: {:.1}", self.options.speed_divisor));
    }

    /// Stop every animation; called before the terminal is restored
    pub fn shutdown(&mut self) {
        for panel in &mut self.panels {
            if let Some(handler) = panel.animation.take() {
                handler.stop();
            }
        }
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::animation::InlineDispatcher;
    use std::time::Duration;
    use tokio::time::sleep;

    fn test_app() -> App {
        App::new(&AppConfig::default(), Arc::new(InlineDispatcher))
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_expands_panel() {
        let mut app = test_app();
        app.toggle_focused().unwrap();
        assert!(app.focused_panel().is_animating());

        sleep(Duration::from_secs(2)).await;

        let panel = app.focused_panel();
        assert_eq!(panel.size(), app.expanded);
        assert!(!panel.is_animating());
        assert_eq!(panel.progress(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_mid_flight_reverses() {
        let mut app = test_app();
        app.toggle_focused().unwrap();
        sleep(Duration::from_millis(40)).await;

        let first = app.focused_panel().animation.as_ref().unwrap().id();
        app.toggle_focused().unwrap();
        // same handler, new destination
        assert_eq!(app.focused_panel().animation.as_ref().unwrap().id(), first);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(app.focused_panel().size(), app.collapsed);
        assert!(!app.focused_panel().expanded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_size() {
        let mut app = test_app();
        app.toggle_focused().unwrap();
        sleep(Duration::from_millis(40)).await;

        app.stop_focused();
        let frozen = app.focused_panel().size();
        assert_ne!(frozen, app.collapsed);
        assert_ne!(frozen, app.expanded);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(app.focused_panel().size(), frozen);
        assert!(!app.focused_panel().expanded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_toggle() {
        let mut app = test_app();
        app.toggle_focused().unwrap();
        app.toggle_pause();
        assert_eq!(app.focused_panel().animation_state(), Some(AnimationState::Paused));

        let size = app.focused_panel().size();
        sleep(Duration::from_millis(500)).await;
        assert_eq!(app.focused_panel().size(), size);

        app.toggle_pause();
        assert_eq!(app.focused_panel().animation_state(), Some(AnimationState::Running));
    }

    #[test]
    fn test_focus_wraps() {
        let mut app = test_app();
        app.focus_prev();
        assert_eq!(app.focused, app.panels.len() - 1);
        app.focus_next();
        assert_eq!(app.focused, 0);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut app = test_app();
        for _ in 0..50 {
            app.speed_up();
        }
        assert_eq!(app.options.speed_divisor, MIN_SPEED_DIVISOR);
        for _ in 0..50 {
            app.slow_down();
        }
        assert_eq!(app.options.speed_divisor, MAX_SPEED_DIVISOR);
    }
}
