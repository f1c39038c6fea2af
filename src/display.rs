// On-screen display of rendered frames.
// Optional: the render loop works the same with no display attached.

use crate::error::{Error, Result};
use crate::types::Frame;
use minifb::{Key, Window, WindowOptions};

/// Somewhere to show a rendered frame.
pub trait Display {
    fn show(&mut self, frame: &Frame) -> Result<()>;
}

pub struct Drawer {
    window: Window, // the on-screen window you see
    width: usize,
    height: usize,
}

impl Drawer {
    /// Create a window sized to the frames.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window, width, height })
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }
}

impl Display for Drawer {
    /// Push the pixels to the window. This also pumps window events, which
    /// keeps the window responsive.
    fn show(&mut self, frame: &Frame) -> Result<()> {
        if !self.is_open() {
            return Err(Error::WindowClosed);
        }
        let (w, h) = (frame.width() as usize, frame.height() as usize);
        if (w, h) != (self.width, self.height) {
            return Err(Error::WindowUpdate(format!(
                "frame is {w}x{h}, window is {}x{}",
                self.width, self.height
            )));
        }
        self.window
            .update_with_buffer(&frame.to_0rgb(), w, h)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }
}
