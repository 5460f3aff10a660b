//! Style System - composition, publication and animations.
//!
//! - [`StyleMap`] - named definitions, `process_style` composition,
//!   `add_to_style` stacking, published rule text
//! - [`KeyframeRegistry`] - `@keyframes` rules
//! - [`to_kebab_case`] - property-name conversion shared by both
//!
//! Rule text is plain CSS without whitespace:
//!
//! ```text
//! .box{color:red;}.box:hover{color:blue;}
//! @keyframes fadeIn{0%{opacity:0;}100%{opacity:1;}}
//! ```

mod case;
mod keyframes;
mod map;

pub use case::to_kebab_case;
pub use keyframes::{FrameProps, Frames, KeyframeRegistry, Keyframes};
pub use map::{StyleMap, render_rule};
