use super::widget::WidgetId;
use thiserror::Error;

/// Errors surfaced by the menu engine
#[derive(Error, Debug)]
pub enum MenuError {
    /// The exit path ran (fade + process-control hook). Every blocking loop
    /// propagates this so scoped guards can unwind the widget tree.
    #[error("menu shut down by exit request")]
    Shutdown,

    #[error("no root window")]
    NoRootWindow,

    #[error("widget {0} not found")]
    WidgetNotFound(WidgetId),

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

pub type MenuResult<T> = std::result::Result<T, MenuError>;

impl MenuError {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, MenuError::Shutdown)
    }
}
