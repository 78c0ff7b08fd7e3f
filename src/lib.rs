//! hlbuffer - incremental syntax highlighting and folding for text buffers
//!
//! A [`Buffer`] re-highlights only the lines an edit can affect, keeps a
//! watermark below which highlighting is known to be current, and finds
//! folding regions from the fold markers highlighting leaves behind.

pub mod buffer;
pub mod config;
pub mod error;
pub mod folding;
pub mod line;
pub mod syntax;
pub mod text_buffer;

pub use buffer::{Buffer, BufferEvent};
pub use config::Config;
pub use error::{Error, Result};
pub use folding::{FoldRange, Position};
pub use line::{Attribute, FoldMarker, Line};
pub use syntax::{ContextRegistry, FoldingStrategy, Highlighter, LanguageDefinition, SyntaxManager};
pub use text_buffer::TextBuffer;
