//! Block catalog: which size and which horizontal alignment a freshly
//! created block gets, keyed by its `(type, template)` pair.

use serde::{Deserialize, Serialize};

use super::{
    BlockContent, BlockType, ProfileInfo, Size, SocialLink, SocialNetwork, GRID_COLUMNS,
    SEMICIRCLE_TEMPLATE,
};

/// Templates offered by the block picker, per type.
pub fn templates(kind: BlockType) -> &'static [&'static str] {
    match kind {
        BlockType::Text => &["rounded-square", "circle", "rounded-rectangle", "semicircle"],
        BlockType::Photo => &["gallery", "banner", "rounded-square", "circle"],
        BlockType::Video => &["gallery", "rounded-square"],
        BlockType::Social => &["circle", "bar", "separate"],
        BlockType::Profile => &["full-width", "square", "form"],
        BlockType::FamilyTree => &["standard"],
    }
}

/// Default size class of a new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Square,
    Medium,
    ThinFull,
    WideFull,
    Tall,
    Banner,
    Gallery,
}

impl SizeClass {
    pub fn size(&self) -> Size {
        match self {
            SizeClass::Square => Size::new(3, 3),
            SizeClass::Medium => Size::new(4, 4),
            SizeClass::ThinFull => Size::new(GRID_COLUMNS, 2),
            SizeClass::WideFull => Size::new(GRID_COLUMNS, 4),
            SizeClass::Tall => Size::new(3, 5),
            SizeClass::Banner => Size::new(GRID_COLUMNS, 6),
            SizeClass::Gallery => Size::new(GRID_COLUMNS, 8),
        }
    }
}

/// Horizontal placement preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Full,
}

impl Alignment {
    /// Column a block of `width` starts at under this alignment.
    pub fn column_for(&self, width: u32) -> u32 {
        if *self == Alignment::Full || width >= GRID_COLUMNS {
            return 0;
        }
        match self {
            Alignment::Center => (GRID_COLUMNS - width) / 2,
            Alignment::Right => GRID_COLUMNS - width,
            Alignment::Left | Alignment::Full => 0,
        }
    }
}

pub fn size_class_for(kind: BlockType, template: &str) -> SizeClass {
    match (kind, template) {
        (BlockType::FamilyTree, _) => SizeClass::WideFull,

        (BlockType::Text, "circle" | "rounded-square") => SizeClass::Square,
        (BlockType::Text, "semicircle") => SizeClass::ThinFull,

        (BlockType::Photo, "gallery") => SizeClass::Gallery,
        (BlockType::Photo, "banner") => SizeClass::Banner,
        (BlockType::Photo, "rounded-square" | "circle") => SizeClass::Square,

        (BlockType::Video, "gallery") => SizeClass::Gallery,
        (BlockType::Video, "rounded-square") => SizeClass::Square,

        (BlockType::Social, "circle") => SizeClass::Square,
        (BlockType::Social, "bar") => SizeClass::ThinFull,

        (BlockType::Profile, "full-width") => SizeClass::WideFull,
        (BlockType::Profile, "square") => SizeClass::Square,

        _ => SizeClass::Medium,
    }
}

pub fn alignment_for(kind: BlockType, template: &str) -> Alignment {
    if kind == BlockType::FamilyTree || template == SEMICIRCLE_TEMPLATE {
        return Alignment::Full;
    }
    match (kind, template) {
        (BlockType::Profile, _) | (BlockType::Photo, "single") => Alignment::Center,
        (BlockType::Video, _) => Alignment::Right,
        (BlockType::Social, _) => Alignment::Left,
        (BlockType::Text, "circle") => Alignment::Left,
        (BlockType::Text, "square") => Alignment::Right,
        (BlockType::Text, _) => Alignment::Center,
        _ => Alignment::Left,
    }
}

/// Placeholder content a block starts with.
pub fn default_content(kind: BlockType, template: &str) -> BlockContent {
    let mut content = BlockContent::default();
    match kind {
        BlockType::Text => match template {
            "rounded-rectangle" | "rounded-square" => {
                content.title = Some("Heading".to_string());
                content.text = Some("Block text. Click to edit.".to_string());
            }
            "circle" => content.text = Some("Text block. Click to edit.".to_string()),
            "semicircle" => content.text = Some("Text in a semicircle".to_string()),
            _ => {}
        },
        BlockType::Profile => {
            content.profile_info = Some(ProfileInfo {
                full_name: Some("First Middle Last".to_string()),
                birth_date: Some("01.01.1970".to_string()),
                death_date: Some("01.01.2023".to_string()),
                description: Some("A short description of a life".to_string()),
                ..ProfileInfo::default()
            });
        }
        BlockType::FamilyTree => {
            content.family_members = Some(vec![]);
            content.pending_connections = Some(vec![]);
        }
        BlockType::Social => {
            if template == "circle" {
                content.social_type = Some(SocialNetwork::Vk);
                content.social_url = Some(String::new());
            } else {
                content.social_networks = Some(
                    [SocialNetwork::Vk, SocialNetwork::Telegram, SocialNetwork::Odnoklassniki]
                        .into_iter()
                        .map(|network| SocialLink {
                            network,
                            url: String::new(),
                        })
                        .collect(),
                );
            }
        }
        BlockType::Photo | BlockType::Video => {}
    }
    content
}
