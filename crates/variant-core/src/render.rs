//! The host's page rendering pipeline.

use crate::error::RenderError;
use crate::resource::Resource;

/// Renders a resource under its currently active template.
pub trait PageRenderer<R: Resource + ?Sized> {
    /// Produce the full output for `resource`.
    fn render(&self, resource: &R) -> Result<String, RenderError>;
}

impl<R, F> PageRenderer<R> for F
where
    R: Resource + ?Sized,
    F: Fn(&R) -> Result<String, RenderError>,
{
    fn render(&self, resource: &R) -> Result<String, RenderError> {
        self(resource)
    }
}
