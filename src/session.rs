//! # Constructor Session
//!
//! A [`Session`] owns one page while it is being edited. It is the only
//! writer of the block collection: each operation reads the current blocks,
//! runs the layout passes, and swaps in the result before returning.
//!
//! The session has two modes. In **edit** mode everything below works; in
//! **preview** mode the layout is frozen and every editing call returns
//! [`SessionError::PreviewMode`].
//!
//! Opening a block's settings takes a snapshot of the whole collection.
//! Cancelling restores that snapshot, except for a block that was just
//! created: cancelling its settings removes it instead.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SessionError;
use crate::layout::{
    self, compact_after_deletion, find_available_position, overlaps, resolve_conflicts, row_ceiling,
    Resolution, ResizeOutcome,
};
use crate::model::catalog::{alignment_for, default_content, size_class_for};
use crate::model::{
    Alignment, Block, BlockContent, BlockId, BlockStyle, BlockType, Page, PageData, Position,
    ProfileInfo, CELL_SIZE, GRID_COLUMNS,
};
use crate::store::{self, KeyValueStore};

/// Background colors offered by the palette.
pub const PREDEFINED_COLORS: [(&str, &str); 8] = [
    ("White", "#FFFFFF"),
    ("Gray", "#EEEEEE"),
    ("Beige", "#F5F5DC"),
    ("Navy", "#1A3C6E"),
    ("Brown", "#8B4513"),
    ("Red", "#FF4B4B"),
    ("Sky blue", "#87CEFA"),
    ("Black", "#333333"),
];

const PLACEHOLDER_TEXT: &str = "Text block without content";
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200?text=Placeholder+Image";
const PLACEHOLDER_NAME: &str = "First and Last Name";
const PLACEHOLDER_DESCRIPTION: &str = "Profile description";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Edit,
    Preview,
}

/// Result of dropping a dragged block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Pinned blocks ignore drags.
    Pinned,
    /// The snapped position equals the current one.
    Unchanged,
    /// The block moved; `resolution` says whether it had to be relocated.
    Moved { resolution: Resolution },
}

#[derive(Debug, Clone)]
struct SettingsState {
    block_id: BlockId,
    snapshot: Vec<Block>,
    is_new_block: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    page: Page,
    user_id: Option<String>,
    mode: Mode,
    settings: Option<SettingsState>,
    active_block: Option<BlockId>,
    max_iterations: usize,
    cell_size: u32,
}

/// `#RGB` or `#RRGGBB`, case-insensitive.
pub fn is_valid_hex(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

impl Session {
    pub fn new(user_id: Option<String>) -> Self {
        Session::with_page(Page::default(), user_id)
    }

    pub fn with_page(page: Page, user_id: Option<String>) -> Self {
        Session {
            page,
            user_id,
            mode: Mode::Edit,
            settings: None,
            active_block: None,
            max_iterations: layout::MAX_RESOLVE_ITERATIONS,
            cell_size: CELL_SIZE,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size.max(1);
        self
    }

    /// Open the user's stored page, or an empty one if nothing is stored.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, user_id: Option<String>) -> Result<Self, SessionError> {
        let page = store::load_page(store, user_id.as_deref())?
            .map(PageData::into_page)
            .unwrap_or_default();
        Ok(Session::with_page(page, user_id))
    }

    /// [`Session::load`] with the user and tuning taken from `config`.
    pub fn open<S: KeyValueStore + ?Sized>(store: &S, config: &Config) -> Result<Self, SessionError> {
        Ok(Session::load(store, config.user_id.clone())?
            .with_max_iterations(config.max_resolve_iterations)
            .with_cell_size(config.cell_size))
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn blocks(&self) -> &[Block] {
        &self.page.blocks
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.page.blocks.iter().find(|b| &b.id == id)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn active_block(&self) -> Option<&BlockId> {
        self.active_block.as_ref()
    }

    /// Block whose settings are open, if any.
    pub fn settings_block(&self) -> Option<&BlockId> {
        self.settings.as_ref().map(|s| &s.block_id)
    }

    pub fn is_new_block(&self) -> bool {
        self.settings.as_ref().is_some_and(|s| s.is_new_block)
    }

    fn ensure_editing(&self) -> Result<(), SessionError> {
        match self.mode {
            Mode::Edit => Ok(()),
            Mode::Preview => Err(SessionError::PreviewMode),
        }
    }

    fn index_of(&self, id: &BlockId) -> Result<usize, SessionError> {
        self.page
            .blocks
            .iter()
            .position(|b| &b.id == id)
            .ok_or_else(|| SessionError::UnknownBlock(id.clone()))
    }

    // ── Modes and selection ────────────────────────────────────

    /// Flip between edit and preview. Entering preview keeps any open
    /// settings' changes and closes the panel.
    pub fn toggle_preview(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Edit => {
                self.settings = None;
                Mode::Preview
            }
            Mode::Preview => Mode::Edit,
        };
        debug!(mode = ?self.mode, "toggled mode");
        self.mode
    }

    /// Highlight a block without opening its settings.
    pub fn select_block(&mut self, id: &BlockId) -> Result<(), SessionError> {
        self.index_of(id)?;
        self.active_block = Some(id.clone());
        Ok(())
    }

    // ── Block lifecycle ────────────────────────────────────────

    /// Create a block of the given type and template, place it, and open
    /// its settings.
    pub fn add_block(&mut self, kind: BlockType, template: &str) -> Result<BlockId, SessionError> {
        self.ensure_editing()?;

        let size = size_class_for(kind, template).size();
        let alignment = alignment_for(kind, template);
        let position = find_available_position(size, alignment, &self.page.blocks);

        let mut id = BlockId::generate();
        while self.block(&id).is_some() {
            id = BlockId::generate();
        }

        let block = Block {
            id: id.clone(),
            kind,
            template: template.to_string(),
            content: default_content(kind, template),
            position,
            size,
            style: BlockStyle::default(),
            is_fixed: false,
        };
        info!(block = %id, %kind, template, ?position, "adding block");

        let snapshot = self.page.blocks.clone();
        let mut blocks = snapshot.clone();
        blocks.push(block);
        let resolved = resolve_conflicts(&blocks, &id, self.max_iterations);
        if !resolved.resolution.is_settled() {
            warn!(block = %id, resolution = ?resolved.resolution, "new block still overlaps");
        }
        self.page.blocks = resolved.blocks;

        self.settings = Some(SettingsState {
            block_id: id.clone(),
            snapshot,
            is_new_block: true,
        });
        self.active_block = Some(id.clone());
        Ok(id)
    }

    /// Remove a block and compact the column it leaves behind.
    pub fn delete_block(&mut self, id: &BlockId) -> Result<(), SessionError> {
        self.ensure_editing()?;
        let deleted = self.page.blocks[self.index_of(id)?].clone();

        self.page.blocks = compact_after_deletion(&self.page.blocks, &deleted);
        info!(block = %id, "deleted block");

        if self.settings_block() == Some(id) {
            self.settings = None;
        }
        if self.active_block.as_ref() == Some(id) {
            self.active_block = None;
        }
        Ok(())
    }

    /// A drag began. The settings panel closes.
    pub fn drag_start(&mut self) -> Result<(), SessionError> {
        self.ensure_editing()?;
        self.settings = None;
        Ok(())
    }

    /// Drop a dragged block at a grid cell.
    ///
    /// The column is clamped into the grid; full-width blocks go to column
    /// 0, and centre- or right-aligned blocks snap back to their alignment
    /// column. The row is capped so the block's bottom edge stays within
    /// [`row_ceiling`] of the other blocks. If the block then overlaps
    /// anything (or is full-width), it goes through collision resolution.
    pub fn drag_stop(&mut self, id: &BlockId, row: u32, column: u32) -> Result<DragOutcome, SessionError> {
        self.ensure_editing()?;
        let idx = self.index_of(id)?;
        self.active_block = Some(id.clone());

        let block = &self.page.blocks[idx];
        if block.is_fixed {
            debug!(block = %id, "pinned block ignores drag");
            return Ok(DragOutcome::Pinned);
        }

        let width = block.size.width;
        let full_width = block.is_full_width();
        let column = if full_width {
            0
        } else {
            match block.alignment() {
                alignment @ (Alignment::Center | Alignment::Right) => alignment.column_for(width),
                Alignment::Left | Alignment::Full => column.min(GRID_COLUMNS.saturating_sub(width)),
            }
        };
        let others = self.page.blocks.iter().enumerate().filter(|&(i, _)| i != idx);
        let ceiling = row_ceiling(others.map(|(_, b)| b));
        let row = row.min(ceiling.saturating_sub(block.size.height));

        let target = Position::new(row, column);
        if block.position == target {
            return Ok(DragOutcome::Unchanged);
        }

        let mut blocks = self.page.blocks.clone();
        blocks[idx].position = target;
        let has_overlaps = blocks
            .iter()
            .enumerate()
            .any(|(i, other)| i != idx && overlaps(&blocks[idx], other));
        debug!(block = %id, ?target, has_overlaps, "drag stop");

        let resolution = if has_overlaps || full_width {
            let resolved = resolve_conflicts(&blocks, id, self.max_iterations);
            blocks = resolved.blocks;
            resolved.resolution
        } else {
            Resolution::Clear
        };
        self.page.blocks = blocks;
        Ok(DragOutcome::Moved { resolution })
    }

    /// [`Session::drag_stop`] from a pixel offset on the canvas.
    pub fn drag_stop_pixels(&mut self, id: &BlockId, x: f64, y: f64) -> Result<DragOutcome, SessionError> {
        let cell = f64::from(self.cell_size);
        let row = (y / cell).round().max(0.0) as u32;
        let column = (x / cell).round().max(0.0) as u32;
        self.drag_stop(id, row, column)
    }

    /// Grow or shrink a block by whole cells, pushing neighbours aside.
    pub fn resize_block(
        &mut self,
        id: &BlockId,
        delta_width: i32,
        delta_height: i32,
    ) -> Result<ResizeOutcome, SessionError> {
        self.ensure_editing()?;
        self.index_of(id)?;
        let result = layout::resize(&self.page.blocks, id, delta_width, delta_height, self.max_iterations);
        self.page.blocks = result.blocks;
        Ok(result.outcome)
    }

    /// Pin or unpin a block. Returns the new pinned state.
    pub fn toggle_fixed(&mut self, id: &BlockId) -> Result<bool, SessionError> {
        self.ensure_editing()?;
        let idx = self.index_of(id)?;
        let block = &mut self.page.blocks[idx];
        block.is_fixed = !block.is_fixed;
        debug!(block = %id, pinned = block.is_fixed, "toggled pin");
        Ok(block.is_fixed)
    }

    pub fn update_content(&mut self, id: &BlockId, content: BlockContent) -> Result<(), SessionError> {
        self.ensure_editing()?;
        let idx = self.index_of(id)?;
        self.page.blocks[idx].content = content;
        Ok(())
    }

    pub fn update_style(&mut self, id: &BlockId, style: BlockStyle) -> Result<(), SessionError> {
        self.ensure_editing()?;
        let idx = self.index_of(id)?;
        self.page.blocks[idx].style = style;
        Ok(())
    }

    // ── Settings panel ─────────────────────────────────────────

    /// Open a block's settings, snapshotting the whole collection.
    pub fn open_settings(&mut self, id: &BlockId) -> Result<(), SessionError> {
        self.ensure_editing()?;
        self.index_of(id)?;
        self.settings = Some(SettingsState {
            block_id: id.clone(),
            snapshot: self.page.blocks.clone(),
            is_new_block: false,
        });
        self.active_block = Some(id.clone());
        Ok(())
    }

    /// Keep the edits made while settings were open.
    pub fn apply_settings(&mut self) -> Result<(), SessionError> {
        self.settings.take().ok_or(SessionError::NoSettingsOpen)?;
        Ok(())
    }

    /// Throw away the edits made while settings were open.
    pub fn cancel_settings(&mut self) -> Result<(), SessionError> {
        let settings = self.settings.take().ok_or(SessionError::NoSettingsOpen)?;
        if settings.is_new_block {
            debug!(block = %settings.block_id, "cancel: removing new block");
            self.page.blocks.retain(|b| b.id != settings.block_id);
            if self.active_block.as_ref() == Some(&settings.block_id) {
                self.active_block = None;
            }
        } else {
            debug!(block = %settings.block_id, "cancel: restoring snapshot");
            self.page.blocks = settings.snapshot;
        }
        Ok(())
    }

    /// Close the panel without touching the blocks.
    pub fn close_settings(&mut self) {
        self.settings = None;
    }

    // ── Page settings ──────────────────────────────────────────

    pub fn set_background_color(&mut self, color: &str) -> Result<(), SessionError> {
        self.ensure_editing()?;
        if !is_valid_hex(color) {
            return Err(SessionError::InvalidColor(color.to_string()));
        }
        self.page.background_color = color.to_string();
        Ok(())
    }

    pub fn set_show_on_map(&mut self, show: bool) -> Result<(), SessionError> {
        self.ensure_editing()?;
        self.page.show_on_map = show;
        Ok(())
    }

    // ── Persistence ────────────────────────────────────────────

    /// Blocks in reading order with any leftover overlaps resolved.
    ///
    /// Each block overlapping one earlier in the order is relocated. When
    /// that block is pinned, the earlier movable blocks it covers are
    /// relocated instead.
    pub fn finalized_blocks(&self) -> Vec<Block> {
        let mut blocks = self.page.blocks.clone();
        blocks.sort_by_key(|b| (b.position.row, b.position.column));

        for i in 0..blocks.len() {
            let current = &blocks[i];
            let movers: Vec<BlockId> = if current.is_fixed {
                blocks[..i]
                    .iter()
                    .filter(|earlier| !earlier.is_fixed && overlaps(current, earlier))
                    .map(|earlier| earlier.id.clone())
                    .collect()
            } else if blocks[..i].iter().any(|earlier| overlaps(current, earlier)) {
                vec![current.id.clone()]
            } else {
                Vec::new()
            };

            for id in movers {
                debug!(block = %id, "overlap found before save; resolving");
                let resolved = resolve_conflicts(&blocks, &id, self.max_iterations);
                if !resolved.resolution.is_settled() {
                    warn!(block = %id, resolution = ?resolved.resolution, "saving page with an overlap");
                }
                blocks = resolved.blocks;
            }
        }

        blocks.sort_by_key(|b| (b.position.row, b.position.column));
        blocks
    }

    /// Finalize the layout, fill empty blocks with placeholder content, and
    /// write the page. The session keeps its blocks if the write fails.
    pub fn save<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<PageData, SessionError> {
        let blocks: Vec<Block> = self.finalized_blocks().into_iter().map(with_placeholders).collect();
        let page = Page {
            blocks,
            ..self.page.clone()
        };
        let data = store::save_page(store, self.user_id.as_deref(), &page)?;
        self.page = page;
        Ok(data)
    }
}

/// Fill the content a block would otherwise render empty.
fn with_placeholders(mut block: Block) -> Block {
    match block.kind {
        BlockType::Text if block.content.text.as_deref().map_or(true, str::is_empty) => {
            block.content.text = Some(PLACEHOLDER_TEXT.to_string());
        }
        BlockType::Photo if block.content.images.as_ref().map_or(true, Vec::is_empty) => {
            block.content.images = Some(vec![PLACEHOLDER_IMAGE.to_string()]);
        }
        BlockType::Profile => {
            let info = block.content.profile_info.get_or_insert_with(ProfileInfo::default);
            if info.full_name.as_deref().map_or(true, str::is_empty) {
                info.full_name = Some(PLACEHOLDER_NAME.to_string());
            }
            if info.description.as_deref().map_or(true, str::is_empty) {
                info.description = Some(PLACEHOLDER_DESCRIPTION.to_string());
            }
        }
        _ => {}
    }
    block
}
