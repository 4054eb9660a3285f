//! Per-call paint context and scoped drawing state.

use std::ops::{Deref, DerefMut};

use koala_common::Rect;

use crate::canvas::Canvas;
use crate::error::{PaintError, PaintResult};

fn is_valid_scale(scale_factor: f32) -> bool {
    scale_factor.is_finite() && scale_factor > 0.0
}

/// Everything one top-level paint call needs besides the tree.
///
/// The configuration (viewport, scale, debug flag) is fixed when the context
/// is built; only the canvas is written through it.
pub struct PaintContext<'c> {
    canvas: &'c mut dyn Canvas,
    viewport: Rect,
    scale_factor: f32,
    debug_overlay: bool,
}

impl<'c> PaintContext<'c> {
    /// A context painting into `canvas`, with scale 1 and no overlay.
    pub fn new(canvas: &'c mut dyn Canvas, viewport: Rect) -> Self {
        Self {
            canvas,
            viewport,
            scale_factor: 1.0,
            debug_overlay: false,
        }
    }

    /// Builder: set the device scale factor.
    ///
    /// Values that are not finite and positive are ignored with a warning;
    /// use [`PaintContext::try_with_scale_factor`] to reject them instead.
    #[must_use]
    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        if is_valid_scale(scale_factor) {
            self.scale_factor = scale_factor;
        } else {
            log::warn!("ignoring invalid scale factor {scale_factor}");
        }
        self
    }

    /// Builder: set the device scale factor, rejecting invalid values.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::InvalidContext`] when `scale_factor` is not
    /// finite and positive.
    pub fn try_with_scale_factor(mut self, scale_factor: f32) -> PaintResult<Self> {
        if !is_valid_scale(scale_factor) {
            return Err(PaintError::InvalidContext);
        }
        self.scale_factor = scale_factor;
        Ok(self)
    }

    /// Builder: enable or disable the debug overlay.
    #[must_use]
    pub const fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }

    /// The target canvas.
    pub fn canvas(&mut self) -> &mut (dyn Canvas + 'c) {
        &mut *self.canvas
    }

    /// Visible area in root coordinates.
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Device pixels per CSS pixel.
    #[must_use]
    pub const fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Whether the debug overlay is drawn.
    #[must_use]
    pub const fn debug_overlay(&self) -> bool {
        self.debug_overlay
    }

    /// Check the configuration before a paint call.
    ///
    /// # Errors
    ///
    /// Returns [`PaintError::InvalidContext`] if the viewport is not finite.
    pub fn validate(&self) -> PaintResult<()> {
        if self.viewport.is_finite() {
            Ok(())
        } else {
            Err(PaintError::InvalidContext)
        }
    }

    /// Save the canvas state and return a guard that restores it on drop.
    pub fn scoped(&mut self) -> ScopedState<'_, 'c> {
        self.canvas.save();
        ScopedState { ctx: self }
    }
}

/// Canvas state saved for the lifetime of the guard.
///
/// Restores on every exit path, including early `?` returns and unwinding.
/// Dereferences to the [`PaintContext`], so nested scopes work naturally.
pub struct ScopedState<'s, 'c> {
    ctx: &'s mut PaintContext<'c>,
}

impl<'c> Deref for ScopedState<'_, 'c> {
    type Target = PaintContext<'c>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for ScopedState<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for ScopedState<'_, '_> {
    fn drop(&mut self) {
        self.ctx.canvas.restore();
    }
}
