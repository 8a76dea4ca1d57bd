//! CPU-side image data and texture wrap modes
//!
//! An [`Image`] holds RGBA pixel data waiting to be turned into a backend
//! texture. Images are shared by reference; the recorder keys its texture
//! cache on image identity, not pixel contents.

/// How a texture is applied to a primitive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// The texture is stretched over the primitive
    #[default]
    Clamp,
    /// The texture is repeated over the primitive
    Repeat,
}

/// RGBA8 image data
#[derive(Clone, Debug)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Create an image from RGBA pixel data.
    ///
    /// `pixels` is truncated or zero-padded to `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, mut pixels: Vec<u8>) -> Self {
        let len = width as usize * height as usize * 4;
        pixels.resize(len, 0);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a single-color image, useful as a stand-in texture
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let len = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(len * 4);
        for _ in 0..len {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_pads_short_data() {
        let img = Image::from_rgba(2, 2, vec![1, 2, 3, 4]);
        assert_eq!(img.pixels().len(), 16);
        assert_eq!(&img.pixels()[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_solid() {
        let img = Image::solid(2, 1, [9, 8, 7, 6]);
        assert_eq!(img.pixels(), &[9, 8, 7, 6, 9, 8, 7, 6]);
    }
}
