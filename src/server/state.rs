use crate::assessment::Assessor;

/// Shared, read-only per-process state. Nothing here changes after startup.
pub struct AppState {
    pub assessor: Assessor,
}
