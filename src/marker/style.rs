//! Visual descriptors for cluster and point markers.

use serde::{Deserialize, Serialize};
use vacancy_types::ShopCategory;

/// z-index of every cluster marker and of the selected point.
pub const FOREGROUND_Z_INDEX: i32 = 1000;

/// z-index of an ordinary point marker.
pub const POINT_Z_INDEX: i32 = 100;

/// Size/color class of a cluster marker, by member count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterTier {
    /// Fewer than 10 members
    Small,
    /// 10 to 99 members
    Medium,
    /// 100 or more members
    Large,
}

impl ClusterTier {
    pub fn for_count(point_count: usize) -> Self {
        match point_count {
            0..=9 => ClusterTier::Small,
            10..=99 => ClusterTier::Medium,
            _ => ClusterTier::Large,
        }
    }

    /// Diameter of the round cluster badge in pixels.
    pub fn size_px(&self) -> u32 {
        match self {
            ClusterTier::Small => 40,
            ClusterTier::Medium => 50,
            ClusterTier::Large => 60,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ClusterTier::Small => "#4285F4",
            ClusterTier::Medium => "#FF6B35",
            ClusterTier::Large => "#E53E3E",
        }
    }

    /// Label font size; the smallest badge gets the smaller font.
    pub fn font_px(&self) -> u32 {
        match self {
            ClusterTier::Small => 12,
            _ => 14,
        }
    }

    /// Anchor at the badge center.
    pub fn anchor(&self) -> (u32, u32) {
        let half = self.size_px() / 2;
        (half, half)
    }
}

/// How strongly a point marker is emphasised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    #[default]
    Normal,
    Hovered,
    Selected,
}

impl Emphasis {
    pub fn z_index(&self) -> i32 {
        match self {
            Emphasis::Selected => FOREGROUND_Z_INDEX,
            _ => POINT_Z_INDEX,
        }
    }
}

/// Image, size and anchor of a point marker, in renderer pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconDescriptor {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Pixel of the image placed on the shop's coordinates
    pub anchor: (u32, u32),
}

impl IconDescriptor {
    /// Pin icon for `category` at the given emphasis.
    pub fn point(category: ShopCategory, emphasis: Emphasis) -> Self {
        let (width, height, anchor) = match emphasis {
            Emphasis::Normal => (40, 50, (20, 50)),
            Emphasis::Hovered => (45, 56, (22, 56)),
            Emphasis::Selected => (50, 62, (25, 62)),
        };
        Self {
            url: icon_url(category),
            width,
            height,
            anchor,
        }
    }
}

/// Image path of the pin for `category`.
pub fn icon_url(category: ShopCategory) -> String {
    format!("/markers/{}.svg", category.as_str())
}
