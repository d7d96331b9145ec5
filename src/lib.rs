//! # Memoria
//!
//! The layout engine of a memorial page constructor.
//!
//! A page is a stack of content blocks (text, photos, videos, social links,
//! a profile card, a family tree) laid out on a 12-column grid that grows
//! downward. Users add, drag, resize, pin and delete blocks; the engine's
//! job is to keep the page tidy through all of it: **no two blocks may
//! overlap once an operation completes**, no block may hang off the right
//! edge, and pinned blocks never move.
//!
//! ## Architecture
//!
//! ```text
//!   [config] / [store]   TOML settings, persisted pages
//!           ↓
//!   [session]            one page being edited: modes, settings
//!           ↓            snapshots, save/load
//!   [layout]             pure passes: placement, resolve, compact,
//!           ↓            resize
//!   [model]              blocks, sizes, the template catalog
//! ```
//!
//! Everything under [`layout`] is a pure function over a block slice. The
//! [`session::Session`] is the single writer that applies those passes to
//! a page.

pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{ConfigError, MemoriaError, SessionError, StoreError};
pub use model::{Block, BlockId, BlockType, Page, PageData, Position, Size};
pub use session::{DragOutcome, Mode, Session};
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Parse a page blob that did not come through a [`KeyValueStore`], such
/// as an export fed back in. The same grid checks as [`store::load_page`]
/// apply.
pub fn page_from_json(json: &str) -> Result<PageData, StoreError> {
    store::parse_page("<input>", json)
}
