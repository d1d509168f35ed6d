use tinct_model::Entity;

/// Read-only view of the host application the engine themes.
///
/// Called from the reactor's poll ticks and the precache task, so
/// implementations must be cheap and must not block on the UI thread.
pub trait ThemeHost: Send + Sync + 'static {
    /// User setting; when off the engine leaves the theme alone.
    fn theming_enabled(&self) -> bool;
    /// Window focused and not minimized.
    fn is_active(&self) -> bool;
    /// The entity currently selected in the host's list, if any.
    fn selected(&self) -> Option<Entity>;
    /// Every entity the precache task may visit. Returns owned data so the
    /// host can release its own locks immediately.
    fn entities(&self) -> Vec<Entity>;
}
