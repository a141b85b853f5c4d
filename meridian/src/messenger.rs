/// Explicit notification channel from the engine back to the application.
///
/// A messenger is handed to the renderer by the caller. The renderer calls
/// [`Messenger::request_redraw`] every time a new tile has been painted onto the surface, so that
/// an interactive application can present the partially rendered frame.
pub trait Messenger: Send + Sync {
    /// Notifies the application that the surface has changed.
    fn request_redraw(&self);
}

