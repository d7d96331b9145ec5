//! # Page Model
//!
//! The in-memory and persisted representation of a constructor page. A page
//! is a flat list of blocks on a 12-column grid plus a couple of page-wide
//! settings. The JSON shape produced by serde here is the exact shape written
//! to storage, so field names are camelCase.
//!
//! Layout only ever reads `position`, `size`, `kind`, `template` and
//! `is_fixed`. Everything under `style` and `content` belongs to the block
//! editors and is carried through untouched.

pub mod catalog;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use catalog::{Alignment, SizeClass};

/// Number of grid columns. Rows are unbounded.
pub const GRID_COLUMNS: u32 = 12;

/// Pixel size of one grid cell. Only used to convert drag offsets.
pub const CELL_SIZE: u32 = 80;

/// Deepest row a block may reach. Stored pages past it are rejected.
pub const MAX_GRID_ROWS: u32 = 100_000;

/// Template that forces a block to full width.
pub const SEMICIRCLE_TEMPLATE: &str = "semicircle";

/// Template that keeps width and height equal on resize.
pub const CIRCLE_TEMPLATE: &str = "circle";

/// Stable, never-reused block identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh id for a newly created block.
    pub fn generate() -> Self {
        BlockId(format!("block-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        BlockId(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        BlockId(s)
    }
}

/// What a block displays. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Text,
    Photo,
    Video,
    Social,
    Profile,
    FamilyTree,
}

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        BlockType::Text,
        BlockType::Photo,
        BlockType::Video,
        BlockType::Social,
        BlockType::Profile,
        BlockType::FamilyTree,
    ];

    /// The wire name, as used in the persisted JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Photo => "photo",
            BlockType::Video => "video",
            BlockType::Social => "social",
            BlockType::Profile => "profile",
            BlockType::FamilyTree => "familyTree",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s) || (s == "family-tree" && *t == BlockType::FamilyTree))
            .ok_or_else(|| format!("unknown block type '{s}'"))
    }
}

/// Top-left grid cell of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub column: u32,
}

impl Position {
    pub fn new(row: u32, column: u32) -> Self {
        Position { row, column }
    }
}

/// Block extent in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }
}

/// Shadow strength behind a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowIntensity {
    None,
    #[default]
    Light,
    Medium,
    Strong,
}

/// Presentational attributes. Never read by layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStyle {
    pub background_color: String,
    pub color: String,
    pub border_color: String,
    pub border_radius: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_intensity: Option<ShadowIntensity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            background_color: "#ffffff".to_string(),
            color: "#000000".to_string(),
            border_color: "#e0e0e0".to_string(),
            border_radius: "8px".to_string(),
            border_width: Some("1px".to_string()),
            shadow_intensity: Some(ShadowIntensity::Light),
            opacity: Some(1.0),
        }
    }
}

/// Social networks a link block may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialNetwork {
    #[serde(rename = "vk")]
    Vk,
    #[serde(rename = "telegram")]
    Telegram,
    #[serde(rename = "ok")]
    Odnoklassniki,
}

/// One social network link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    #[serde(rename = "type")]
    pub network: SocialNetwork,
    pub url: String,
}

/// Biographical fields shown by profile blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub religion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

/// A photo or video attached to a media block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

/// Type-specific payload of a block. Every field is optional; which ones
/// are meaningful depends on the block type.
///
/// `family_members` and `pending_connections` are owned by the family-tree
/// editor and kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_items: Option<Vec<MediaItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_type: Option<SocialNetwork>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_networks: Option<Vec<SocialLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_info: Option<ProfileInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_members: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_connections: Option<Vec<Value>>,
}

/// A positioned, sized, typed content unit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub template: String,
    #[serde(default)]
    pub content: BlockContent,
    pub position: Position,
    pub size: Size,
    #[serde(default)]
    pub style: BlockStyle,
    #[serde(default)]
    pub is_fixed: bool,
}

impl Block {
    /// A block with default style and empty content. Mostly useful for
    /// tests and for callers that do their own placement.
    pub fn new(
        id: impl Into<BlockId>,
        kind: BlockType,
        template: impl Into<String>,
        position: Position,
        size: Size,
    ) -> Self {
        Block {
            id: id.into(),
            kind,
            template: template.into(),
            content: BlockContent::default(),
            position,
            size,
            style: BlockStyle::default(),
            is_fixed: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.is_fixed = true;
        self
    }

    /// Full-width blocks always sit at column 0.
    pub fn is_full_width(&self) -> bool {
        self.size.width >= GRID_COLUMNS
            || self.kind == BlockType::FamilyTree
            || self.template == SEMICIRCLE_TEMPLATE
    }

    pub fn is_circular(&self) -> bool {
        self.template == CIRCLE_TEMPLATE
    }

    /// First row below the block.
    pub fn bottom(&self) -> u32 {
        self.position.row.saturating_add(self.size.height)
    }

    /// First column right of the block.
    pub fn right(&self) -> u32 {
        self.position.column.saturating_add(self.size.width)
    }

    pub fn alignment(&self) -> Alignment {
        catalog::alignment_for(self.kind, &self.template)
    }
}

/// Page-wide settings plus the block collection. This is what one
/// constructor session edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_true")]
    pub show_on_map: bool,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            blocks: vec![],
            background_color: default_background(),
            show_on_map: true,
        }
    }
}

fn default_background() -> String {
    "#ffffff".to_string()
}

fn default_true() -> bool {
    true
}

/// The blob written to storage on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_true")]
    pub show_on_map: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl PageData {
    pub fn from_page(page: &Page, user_id: Option<&str>) -> Self {
        PageData {
            blocks: page.blocks.clone(),
            background_color: page.background_color.clone(),
            show_on_map: page.show_on_map,
            timestamp: Utc::now(),
            user_id: user_id.map(str::to_string),
        }
    }

    pub fn into_page(self) -> Page {
        Page {
            blocks: self.blocks,
            background_color: self.background_color,
            show_on_map: self.show_on_map,
        }
    }
}
