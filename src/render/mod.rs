//! Rendering of text blobs into image files.
//!
//! Turning a blob into a picture is delegated to a [`Renderer`]. The crate
//! ships [`CanvasRenderer`] (feature `png`), which draws words in a built-in
//! bitmap font; anything else (a real word
//! cloud library, a test double) plugs in through the trait or [`from_fn`].

#[cfg(feature = "png")]
mod canvas;
#[cfg(feature = "png")]
mod font;

#[cfg(feature = "png")]
pub use canvas::{CanvasConfig, CanvasRenderer, Placement};

use std::path::Path;

/// Error type renderers report; converted to
/// [`Error::RenderFailure`](crate::Error::RenderFailure) by the pipeline.
pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for rendering collaborators.
///
/// Implementors write one image for one blob. The blob may be empty.
pub trait Renderer {
    /// Render `blob` to `path`.
    fn render(&self, blob: &str, path: &Path) -> Result<(), RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render(&self, blob: &str, path: &Path) -> Result<(), RenderError> {
        (**self).render(blob, path)
    }
}

/// A function-based renderer.
#[derive(Clone)]
pub struct FnRenderer<F> {
    f: F,
}

impl<F> FnRenderer<F> {
    /// Create a renderer from a function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Renderer for FnRenderer<F>
where
    F: Fn(&str, &Path) -> Result<(), RenderError>,
{
    fn render(&self, blob: &str, path: &Path) -> Result<(), RenderError> {
        (self.f)(blob, path)
    }
}

/// Create a renderer from a closure.
pub fn from_fn<F>(f: F) -> FnRenderer<F>
where
    F: Fn(&str, &Path) -> Result<(), RenderError>,
{
    FnRenderer::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_fn_renderer() {
        let seen = RefCell::new(Vec::new());
        let renderer = from_fn(|blob: &str, path: &Path| {
            seen.borrow_mut().push((blob.to_string(), path.to_path_buf()));
            Ok(())
        });

        renderer.render("a a b", Path::new("cloud0.png")).unwrap();
        (&renderer).render("", Path::new("cloud1.png")).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "a a b");
        assert_eq!(seen[1].1, Path::new("cloud1.png"));
    }

    #[test]
    fn test_fn_renderer_error() {
        let renderer = from_fn(|_: &str, _: &Path| Err("nope".into()));
        let err = renderer.render("x", Path::new("x.png")).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
