use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use morph_core::animation::{AnimationState, Size};

use crate::app::Panel;
use crate::theme::Theme;

pub struct PanelWidget;

impl PanelWidget {
    /// Draw `panel` anchored at the top-left of `area`, clipped to it
    pub fn render(frame: &mut Frame, area: Rect, panel: &Panel, focused: bool, theme: &Theme) {
        let size = panel.size();
        let rect = clip(size, area);
        if rect.width < 2 || rect.height < 2 {
            return;
        }

        let (state_label, state_color) = match panel.animation_state() {
            Some(AnimationState::Running) => ("running", theme.running),
            Some(AnimationState::Paused) => ("paused", theme.paused),
            _ => ("idle", theme.grey0),
        };

        let border_color = if focused { theme.accent } else { theme.grey0 };
        let title_style = if focused {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.grey2)
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", panel.title), title_style))
            .title_bottom(Line::from(Span::styled(
                format!(" {} ", state_label),
                Style::default().fg(state_color),
            )))
            .title_alignment(Alignment::Left)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.bg0));

        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let info = Paragraph::new(Line::from(vec![
            Span::styled(size.to_string(), Style::default().fg(theme.fg0)),
            Span::styled(
                if panel.expanded { "  ▼" } else { "  ▲" },
                Style::default().fg(theme.grey2),
            ),
        ]));
        frame.render_widget(info, Rect { height: 1, ..inner });

        if inner.height >= 2 && panel.is_animating() {
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(state_color).bg(theme.bg2))
                .ratio((panel.progress() / 100.0).clamp(0.0, 1.0));
            frame.render_widget(
                gauge,
                Rect {
                    y: inner.y + 1,
                    height: 1,
                    ..inner
                },
            );
        }
    }
}

/// Rectangle of `size` cells at the top-left of `area`
fn clip(size: Size, area: Rect) -> Rect {
    let width = size.width.clamp(0, area.width as i32) as u16;
    let height = size.height.clamp(0, area.height as i32) as u16;
    Rect {
        x: area.x,
        y: area.y,
        width,
        height,
    }
}
