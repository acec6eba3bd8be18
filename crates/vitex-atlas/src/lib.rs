//! # Vitex Atlas
//!
//! Allocation and LOD arbitration for a single shared virtual-texture atlas.
//!
//! Many logical textures share one fixed-capacity atlas at resolutions picked
//! by on-screen importance, under a hard budget of one texture upload per
//! tick. The crate provides:
//! - **Slot tree**: quadtree placement authority over the atlas surface
//! - **Arranger**: priority-ranked, hysteresis-damped resize decisions
//! - **Priority / output contracts**: the two seams to the host renderer
//! - **Channels & formats**: atlas surface configuration and VRAM budgeting
//!
//! Everything runs synchronously on the caller's thread, one tick per frame;
//! the arranger is the sole mutator of atlas state.

pub mod arranger;
pub mod channel;
pub mod format;
pub mod output;
pub mod priority;
pub mod registry;
pub mod slot_tree;

pub use arranger::{Arranger, ArrangerConfig, CommittedCopy, TickReport};
pub use channel::{AtlasSettings, Channel};
pub use format::{FormatInfo, TextureFormat};
pub use output::{OutputEvent, RecordingOutput, TextureOutput};
pub use priority::{FramePriorities, PriorityList, PrioritySource};
pub use registry::{TextureId, TextureRegistry};
pub use slot_tree::SlotTree;

use thiserror::Error;

/// Atlas configuration and validation errors
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("invalid atlas configuration: {0}")]
    InvalidConfig(String),

    #[error("format {0:?} cannot back an atlas surface")]
    UnsupportedFormat(TextureFormat),

    #[error("source texture rejected: {0}")]
    SourceTexture(String),
}

/// Result type for atlas operations
pub type AtlasResult<T> = Result<T, AtlasError>;
