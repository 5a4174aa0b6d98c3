use crate::error::{Error, Result};
use image::GrayImage;
use std::fmt;
use std::slice::ChunksExact;

/// A horizontal run of identical palette indices inside one row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Run {
    pub value: u8,
    pub length: u16,
}

impl Run {
    pub fn new(value: u8, length: u16) -> Run {
        Run { value, length }
    }

    #[inline(always)]
    pub fn is_transparent(&self) -> bool {
        self.value == 0
    }
}

/// Palette-indexed image, stored row-major. Index 0 is transparent.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Bitmap> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(Error::InvalidDimensions { width, height })?;
        if pixels.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Bitmap {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: usize, height: usize, value: u8) -> Result<Bitmap> {
        let len = width
            .checked_mul(height)
            .ok_or(Error::InvalidDimensions { width, height })?;
        Bitmap::new(width, height, vec![value; len])
    }

    /// Builds a bitmap out of decoded rows, rejecting ragged input.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Bitmap> {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        let mut pixels = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if line.len() != width {
                return Err(Error::RaggedRow {
                    row,
                    expected: width,
                    actual: line.len(),
                });
            }
            pixels.extend_from_slice(line);
        }
        Bitmap::new(width, rows.len(), pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width {
            return None;
        }
        let index = y.checked_mul(self.width)?.checked_add(x)?;
        self.pixels.get(index).copied()
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        let start = y.checked_mul(self.width)?;
        let end = start.checked_add(self.width)?;
        self.pixels.get(start..end)
    }

    pub fn rows(&self) -> ChunksExact<'_, u8> {
        self.pixels.chunks_exact(self.width)
    }

    /// Copies the indices into a grayscale image, one luma sample per pixel.
    pub fn to_gray_image(&self) -> Result<GrayImage> {
        let invalid = Error::InvalidDimensions {
            width: self.width,
            height: self.height,
        };
        let (Ok(w), Ok(h)) = (u32::try_from(self.width), u32::try_from(self.height)) else {
            return Err(invalid);
        };
        GrayImage::from_raw(w, h, self.pixels.clone()).ok_or(invalid)
    }
}

impl TryFrom<&GrayImage> for Bitmap {
    type Error = Error;

    fn try_from(image: &GrayImage) -> Result<Bitmap> {
        let (width, height) = image.dimensions();
        Bitmap::new(width as usize, height as usize, image.as_raw().clone())
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Bitmap");
        dbg.field("width", &self.width).field("height", &self.height);
        if self.pixels.len() <= 64 {
            dbg.field("pixels", &hex::encode(&self.pixels));
        }
        dbg.finish()
    }
}
