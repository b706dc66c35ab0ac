mod panel;
mod status_bar;

pub use panel::PanelWidget;
pub use status_bar::StatusBarWidget;
