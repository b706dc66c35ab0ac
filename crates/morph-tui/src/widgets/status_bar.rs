use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let options = &app.options;

        let status_text = if let Some(msg) = &app.status_message {
            format!(" {}", msg)
        } else {
            let mut flags = Vec::new();
            if options.lazy {
                flags.push("lazy");
            }
            if options.ignore_width {
                flags.push("fixed-w");
            }
            if options.ignore_height {
                flags.push("fixed-h");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" | {}", flags.join(" "))
            };
            format!(
                " {} | {} | ÷{:.1} @ {}ms{}",
                app.focused_panel().title,
                app.focused_panel().size(),
                options.speed_divisor,
                options.interval_ms,
                flags
            )
        };

        let connection_color = if app.connection.is_connected() {
            theme.success
        } else {
            theme.error
        };
        let connection_text = format!(" ● {} ", app.connection);

        let help_hint = " q:quit tab:focus space:toggle p:pause s:stop z:lazy +/-:speed ";
        let used = status_text.chars().count() + connection_text.chars().count() + help_hint.len();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(connection_text, Style::default().fg(connection_color).bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
