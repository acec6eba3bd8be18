//! Texture Formats
//!
//! Block layout data for the formats an atlas channel can carry. Sizes are
//! needed for VRAM budgeting; formats whose blocks cannot be addressed for
//! partial updates (crunched and PVRTC families) report no layout and are
//! rejected at configuration time.

use serde::{Deserialize, Serialize};

/// Pixel formats recognized by the atlas configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    R8,
    Rg8,
    Rgb8,
    Rgba8,
    Bgra8,
    R16,
    R16F,
    Rg16F,
    Rgba16F,
    R32F,
    Rg32F,
    Rgba32F,
    Rgb9E5,
    Bc1,
    Bc3,
    Bc4,
    Bc5,
    Bc6h,
    Bc7,
    Etc2Rgb8,
    Etc2Rgba1,
    Etc2Rgba8,
    EacR11,
    EacRg11,
    Astc4x4,
    Astc5x5,
    Astc6x6,
    Astc8x8,
    Astc10x10,
    Astc12x12,
    Bc1Crunched,
    Bc3Crunched,
    Pvrtc2Bpp,
    Pvrtc4Bpp,
}

/// Storage layout of one compression block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Block edge in pixels (1 for uncompressed formats)
    pub block_pixels: u32,
    /// Bytes per block
    pub block_bytes: u32,
}

impl FormatInfo {
    const fn new(block_pixels: u32, block_bytes: u32) -> Self {
        Self {
            block_pixels,
            block_bytes,
        }
    }

    /// Bytes needed for a `width` x `height` image in this format
    pub fn bytes_for(&self, width: u32, height: u32) -> u64 {
        let blocks_x = width.div_ceil(self.block_pixels) as u64;
        let blocks_y = height.div_ceil(self.block_pixels) as u64;
        blocks_x * blocks_y * u64::from(self.block_bytes)
    }
}

impl TextureFormat {
    /// Block layout, or `None` if the format cannot back an atlas
    pub fn info(self) -> Option<FormatInfo> {
        use TextureFormat::*;
        match self {
            R8 => Some(FormatInfo::new(1, 1)),
            Rg8 | R16 | R16F => Some(FormatInfo::new(1, 2)),
            Rgb8 => Some(FormatInfo::new(1, 3)),
            Rgba8 | Bgra8 | Rg16F | R32F | Rgb9E5 => Some(FormatInfo::new(1, 4)),
            Rgba16F | Rg32F => Some(FormatInfo::new(1, 8)),
            Rgba32F => Some(FormatInfo::new(1, 16)),
            Bc1 | Bc4 | Etc2Rgb8 | EacR11 => Some(FormatInfo::new(4, 8)),
            Etc2Rgba1 => Some(FormatInfo::new(4, 10)),
            Bc3 | Bc5 | Bc6h | Bc7 | Etc2Rgba8 | EacRg11 | Astc4x4 => {
                Some(FormatInfo::new(4, 16))
            }
            Astc5x5 => Some(FormatInfo::new(5, 16)),
            Astc6x6 => Some(FormatInfo::new(6, 16)),
            Astc8x8 => Some(FormatInfo::new(8, 16)),
            Astc10x10 => Some(FormatInfo::new(10, 16)),
            Astc12x12 => Some(FormatInfo::new(12, 16)),
            Bc1Crunched | Bc3Crunched | Pvrtc2Bpp | Pvrtc4Bpp => None,
        }
    }

    /// Whether the format can back an atlas channel
    pub fn atlas_capable(self) -> bool {
        self.info().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_sizes() {
        assert_eq!(TextureFormat::Rgba8.info(), Some(FormatInfo::new(1, 4)));
        assert_eq!(TextureFormat::Bc1.info(), Some(FormatInfo::new(4, 8)));
        assert_eq!(TextureFormat::Bc7.info(), Some(FormatInfo::new(4, 16)));
        assert_eq!(TextureFormat::Astc12x12.info(), Some(FormatInfo::new(12, 16)));
    }

    #[test]
    fn test_unaddressable_formats_rejected() {
        assert!(!TextureFormat::Bc1Crunched.atlas_capable());
        assert!(!TextureFormat::Pvrtc4Bpp.atlas_capable());
        assert!(TextureFormat::Etc2Rgba8.atlas_capable());
    }

    #[test]
    fn test_bytes_for_rounds_up_to_blocks() {
        let bc1 = TextureFormat::Bc1.info().unwrap();
        // 4x4 blocks: a 6x6 image still needs 2x2 blocks.
        assert_eq!(bc1.bytes_for(6, 6), 4 * 8);
        assert_eq!(bc1.bytes_for(128, 128), 32 * 32 * 8);
        let rgba = TextureFormat::Rgba8.info().unwrap();
        assert_eq!(rgba.bytes_for(128, 128), 128 * 128 * 4);
    }
}
