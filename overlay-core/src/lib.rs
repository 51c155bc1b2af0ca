//! # Overlay Core
//!
//! Document engine for animated graphic overlays.
//! Compiles to WASM for the browser editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                overlay-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Element Model   │  Document Store          │
//! │  - Elements      │  - Selection, tool, zoom │
//! │  - Patches       │  - Structural edits      │
//! │  - Documents     │  - Undo history          │
//! ├─────────────────────────────────────────────┤
//! │  Timeline        │  Export                  │
//! │  - Enter/exit    │  - Artifact programs     │
//! │  - Preview clock │  - Standalone HTML       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The UI mutates an [`EditorStore`]; structural edits checkpoint a bounded
//! [`History`]. The [`animation`] module turns per-element animation configs
//! into tween intents, played either by the in-crate [`PreviewPlayer`] or by
//! the runtime embedded in an exported [`Artifact`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod animation;
pub mod document;
pub mod element;
pub mod error;
pub mod export;
pub mod gesture;
pub mod history;
pub mod keymap;
pub mod preview;
pub mod store;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use animation::{
    AnimationIntent, Easing, ExitMotion, Phase, PropertySet, TweenExecutor, VisualState,
};
pub use document::{CanvasConfig, GraphicDocument};
pub use element::{
    AnimationConfig, AnimationType, Element, ElementId, ElementKind, ElementPatch, ElementType,
    FontStyle, TextAlign, Transform,
};
pub use error::{OverlayError, OverlayResult};
pub use export::{Artifact, ArtifactElement, ArtifactExporter, ExportConfig, PhaseProgram};
pub use gesture::GestureOutcome;
pub use history::History;
pub use keymap::{EditorCommand, Key, KeyChord, KeyContext};
pub use preview::PreviewPlayer;
pub use store::{EditorConfig, EditorMode, EditorStore, StoreChange, Tool};

/// Overlay core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
