//! Atlas Channels
//!
//! Configuration of the physical atlas: which material texture slots feed
//! which atlas surface, in which format, plus the sizing math that follows
//! from it (page counts for the arranger, VRAM budgeting for tooling).

use serde::{Deserialize, Serialize};

use crate::AtlasError;
use crate::format::TextureFormat;

/// One atlas surface and the material texture slots that feed it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Material texture slot names probed in order; the first present wins
    pub texture_names: Vec<String>,
    /// Storage format of this channel's atlas surface
    pub format: TextureFormat,
}

impl Channel {
    /// Create a channel fed by one texture slot
    pub fn new(texture_name: impl Into<String>, format: TextureFormat) -> Self {
        Self {
            texture_names: vec![texture_name.into()],
            format,
        }
    }

    /// Check that a source texture can stream into this channel.
    ///
    /// The source must be in the channel's format, have a power-of-two width
    /// of at least one thumb, and carry enough of a mip chain to reach thumb
    /// resolution.
    pub fn check_texture(
        &self,
        thumb_size: u32,
        format: TextureFormat,
        width: u32,
        mip_count: u32,
    ) -> Result<(), AtlasError> {
        if format != self.format {
            return Err(AtlasError::SourceTexture(format!(
                "texture is {format:?}, channel requires {:?}",
                self.format
            )));
        }
        if !width.is_power_of_two() || width < thumb_size {
            return Err(AtlasError::SourceTexture(format!(
                "width {width} is not a power of two of at least {thumb_size}"
            )));
        }
        let needed_mips = (width / thumb_size).ilog2();
        if mip_count < needed_mips {
            return Err(AtlasError::SourceTexture(format!(
                "texture has {mip_count} mips, needs {needed_mips} to reach thumb resolution"
            )));
        }
        Ok(())
    }
}

/// Full atlas configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasSettings {
    /// Atlas edge length in texels; a power of two
    pub atlas_size: u32,
    /// Edge length of the smallest cell ("thumb") in texels; a power of two
    pub thumb_size: u32,
    /// Channels sharing the same placement decisions
    pub channels: Vec<Channel>,
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            atlas_size: 16384,
            thumb_size: 128,
            channels: vec![
                Channel::new("base_color", TextureFormat::Bc7),
                Channel::new("normal", TextureFormat::Bc5),
                Channel::new("metallic_roughness", TextureFormat::Bc4),
            ],
        }
    }
}

impl AtlasSettings {
    /// Atlas edge length in pages (thumb-size cells)
    pub fn page_count(&self) -> u32 {
        self.atlas_size / self.thumb_size
    }

    /// Quadtree depth implied by the page count
    pub fn depth(&self) -> u32 {
        self.page_count().ilog2()
    }

    /// Reject configurations the allocator cannot represent
    pub fn validate(&self) -> Result<(), AtlasError> {
        if !self.atlas_size.is_power_of_two() {
            return Err(AtlasError::InvalidConfig(format!(
                "atlas size {} is not a power of two",
                self.atlas_size
            )));
        }
        if !self.thumb_size.is_power_of_two() {
            return Err(AtlasError::InvalidConfig(format!(
                "thumb size {} is not a power of two",
                self.thumb_size
            )));
        }
        if self.thumb_size > self.atlas_size {
            return Err(AtlasError::InvalidConfig(format!(
                "thumb size {} exceeds atlas size {}",
                self.thumb_size, self.atlas_size
            )));
        }
        if self.channels.is_empty() {
            return Err(AtlasError::InvalidConfig(
                "at least one channel is required".into(),
            ));
        }
        for channel in &self.channels {
            if !channel.format.atlas_capable() {
                return Err(AtlasError::UnsupportedFormat(channel.format));
            }
        }
        Ok(())
    }

    /// Rough VRAM footprint in bytes for `material_count` virtualized
    /// materials: per channel, the atlas surface plus one thumb per material,
    /// times 4/3 for the mip chains.
    pub fn estimate_vram(&self, material_count: u32) -> u64 {
        self.channels
            .iter()
            .filter_map(|channel| channel.format.info())
            .map(|info| {
                let atlas = f64::from(self.atlas_size) * f64::from(self.atlas_size);
                let thumbs = f64::from(material_count)
                    * f64::from(self.thumb_size)
                    * f64::from(self.thumb_size);
                let block_area = f64::from(info.block_pixels) * f64::from(info.block_pixels);
                let bytes = (4.0 / 3.0) * (atlas + thumbs) * f64::from(info.block_bytes)
                    / block_area;
                bytes as u64
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        let settings = AtlasSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.page_count(), 128);
        assert_eq!(settings.depth(), 7);
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        let settings = AtlasSettings {
            atlas_size: 10000,
            ..AtlasSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(AtlasError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_crunched_channel_rejected() {
        let settings = AtlasSettings {
            channels: vec![Channel::new("base_color", TextureFormat::Bc1Crunched)],
            ..AtlasSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(AtlasError::UnsupportedFormat(TextureFormat::Bc1Crunched))
        ));
    }

    #[test]
    fn test_check_texture_mip_chain() {
        let channel = Channel::new("base_color", TextureFormat::Bc7);
        // 2048 wide with 128 thumbs needs log2(16) = 4 mips.
        assert!(channel.check_texture(128, TextureFormat::Bc7, 2048, 4).is_ok());
        assert!(channel.check_texture(128, TextureFormat::Bc7, 2048, 3).is_err());
        assert!(channel.check_texture(128, TextureFormat::Bc1, 2048, 4).is_err());
        assert!(channel.check_texture(128, TextureFormat::Bc7, 1000, 8).is_err());
    }

    #[test]
    fn test_vram_estimate_scales_with_materials() {
        let settings = AtlasSettings {
            atlas_size: 1024,
            thumb_size: 128,
            channels: vec![Channel::new("base_color", TextureFormat::Rgba8)],
        };
        let base = settings.estimate_vram(0);
        // Atlas alone: 4/3 * 1024^2 * 4 bytes.
        assert_eq!(base, (4.0f64 / 3.0 * 1024.0 * 1024.0 * 4.0) as u64);
        assert!(settings.estimate_vram(100) > base);
    }

    #[test]
    fn test_settings_round_trip_json() {
        let settings = AtlasSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: AtlasSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.atlas_size, settings.atlas_size);
        assert_eq!(back.channels.len(), settings.channels.len());
    }
}
