//! The graphics backend seam.
//!
//! The core never talks to a GPU API directly. Everything it needs from the
//! platform's graphics context goes through [`Backend`]: claiming and releasing
//! the context, whole-buffer uploads, attribute binding, one draw call, the
//! pointer cursor and the display mode. [`HeadlessBackend`] records those calls instead of executing
//! them, which is how tests and headless apps run.

use crate::arena::Attribute;
use crate::error::{Error, Result};
use crate::geometry::Size;

// ---------------------------------------------------------------------------
// CursorKind
// ---------------------------------------------------------------------------

/// Pointer cursor shapes a widget can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorKind {
    #[default]
    Arrow,
    IBeam,
    Hand,
    Crosshair,
    ResizeHorizontal,
    ResizeVertical,
    Wait,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Operations the core requires from a graphics context.
///
/// Only one caller holds the context at a time: `make_current` claims it and
/// `release` hands it back.
pub trait Backend {
    /// Claim the graphics context for the calling loop.
    fn make_current(&mut self) -> Result<()>;

    /// Release the context claimed by `make_current`.
    fn release(&mut self);

    /// Replace the whole device copy of one vertex attribute.
    fn upload_attribute(&mut self, attribute: Attribute, bytes: &[u8]) -> Result<()>;

    /// Point the draw pipeline at one vertex attribute.
    fn bind_attribute(&mut self, attribute: Attribute, components: usize);

    /// Replace the whole atlas texture.
    fn upload_texture(&mut self, width: u32, height: u32, components: usize, bytes: &[u8])
        -> Result<()>;

    /// Issue one draw call over `vertices` vertices.
    fn draw(&mut self, vertices: usize) -> Result<()>;

    /// Change the pointer cursor shape.
    fn set_cursor(&mut self, cursor: CursorKind);

    /// Query the current display mode's resolution.
    fn display_size(&mut self) -> Result<Size>;
}

// ---------------------------------------------------------------------------
// HeadlessBackend
// ---------------------------------------------------------------------------

/// One recorded [`Backend`] call. Byte payloads are recorded by length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    MakeCurrent,
    Release,
    UploadAttribute { attribute: Attribute, bytes: usize },
    BindAttribute { attribute: Attribute, components: usize },
    UploadTexture { width: u32, height: u32, components: usize, bytes: usize },
    Draw { vertices: usize },
    SetCursor(CursorKind),
}

/// A [`Backend`] that records calls and can be told to fail.
///
/// Display-mode queries are answered from a configurable size and are not
/// recorded as calls.
#[derive(Debug)]
pub struct HeadlessBackend {
    calls: Vec<BackendCall>,
    display: Option<Size>,
    fail_context: bool,
    fail_uploads: bool,
    current: bool,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            display: Some(Size::new(1920, 1080)),
            fail_context: false,
            fail_uploads: false,
            current: false,
        }
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `display` from display-mode queries, or fail them with `None`
    /// (builder).
    pub fn with_display(mut self, display: Option<Size>) -> Self {
        self.display = display;
        self
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of draw calls received.
    pub fn draw_count(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, BackendCall::Draw { .. })).count()
    }

    /// The most recent cursor change, if any.
    pub fn last_cursor(&self) -> Option<CursorKind> {
        self.calls.iter().rev().find_map(|c| match c {
            BackendCall::SetCursor(kind) => Some(*kind),
            _ => None,
        })
    }

    /// Make `make_current` fail until turned off again.
    pub fn fail_context(&mut self, fail: bool) {
        self.fail_context = fail;
    }

    /// Make attribute and texture uploads fail until turned off again.
    pub fn fail_uploads(&mut self, fail: bool) {
        self.fail_uploads = fail;
    }

    /// Whether the context is currently claimed.
    pub fn is_current(&self) -> bool {
        self.current
    }
}

impl Backend for HeadlessBackend {
    fn make_current(&mut self) -> Result<()> {
        if self.fail_context {
            return Err(Error::ContextUnavailable("headless context disabled".into()));
        }
        self.current = true;
        self.calls.push(BackendCall::MakeCurrent);
        Ok(())
    }

    fn release(&mut self) {
        self.current = false;
        self.calls.push(BackendCall::Release);
    }

    fn upload_attribute(&mut self, attribute: Attribute, bytes: &[u8]) -> Result<()> {
        if self.fail_uploads {
            return Err(Error::Upload {
                target: format!("{} buffer", attribute.name()),
                reason: "headless uploads disabled".into(),
            });
        }
        self.calls.push(BackendCall::UploadAttribute { attribute, bytes: bytes.len() });
        Ok(())
    }

    fn bind_attribute(&mut self, attribute: Attribute, components: usize) {
        self.calls.push(BackendCall::BindAttribute { attribute, components });
    }

    fn upload_texture(
        &mut self,
        width: u32,
        height: u32,
        components: usize,
        bytes: &[u8],
    ) -> Result<()> {
        if self.fail_uploads {
            return Err(Error::Upload {
                target: "atlas texture".into(),
                reason: "headless uploads disabled".into(),
            });
        }
        self.calls.push(BackendCall::UploadTexture { width, height, components, bytes: bytes.len() });
        Ok(())
    }

    fn draw(&mut self, vertices: usize) -> Result<()> {
        self.calls.push(BackendCall::Draw { vertices });
        Ok(())
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.calls.push(BackendCall::SetCursor(cursor));
    }

    fn display_size(&mut self) -> Result<Size> {
        self.display
            .ok_or_else(|| Error::DisplayMode("headless backend has no display attached".into()))
    }
}
