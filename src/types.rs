// Core types shared by the frame source, the renderer and the display.

use crate::error::{Error, Result};
use image::{Rgba, RgbaImage};

/// Integer pixel coordinate. May lie outside the frame; drawing clips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Overlay colour. Frames keep the producer's B,G,R,A byte order, so the
/// fields are listed in that order too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Color {
    pub const fn bgr(b: u8, g: u8, r: u8) -> Self {
        Self { b, g, r }
    }

    #[inline]
    fn to_pixel(self) -> Rgba<u8> {
        Rgba([self.b, self.g, self.r, 0xFF])
    }

    #[inline]
    fn from_pixel(px: &Rgba<u8>) -> Self {
        Self { b: px[0], g: px[1], r: px[2] }
    }

    /// Packed as 0x00RRGGBB, the layout minifb wants.
    #[inline]
    pub fn to_0rgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// One video frame: width x height pixels, 4 bytes each, row-major.
///
/// The bytes are stored in an [`RgbaImage`] but carry the producer's B,G,R,A
/// order; only [`Color`] and [`Frame::to_0rgb`] interpret the channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    /// All-zero frame.
    pub fn blank(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::new(width, height) }
    }

    /// Take ownership of a raw BGRA buffer of exactly width * height * 4 bytes.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len();
        RgbaImage::from_raw(width, height, bytes)
            .filter(|_| len == frame_len(width, height))
            .map(|image| Self { image })
            .ok_or(Error::FrameSize { width, height, len })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Colour at (x,y), or None outside the frame.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 {
            return None;
        }
        self.image
            .get_pixel_checked(x as u32, y as u32)
            .map(Color::from_pixel)
    }

    /// Set the pixel at (x,y) if it is inside the frame; otherwise do nothing.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(px) = self.image.get_pixel_mut_checked(x as u32, y as u32) {
            *px = color.to_pixel();
        }
    }

    /// Repack into 0x00RRGGBB words for the window.
    pub fn to_0rgb(&self) -> Vec<u32> {
        self.image
            .pixels()
            .map(|px| Color::from_pixel(px).to_0rgb())
            .collect()
    }
}

/// Byte length of one width x height frame.
pub fn frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}
