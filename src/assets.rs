//! Court backgrounds and raster marker images, keyed by sport.

use crate::document::SportType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSet {
    pub player: &'static str,
    pub ball: &'static str,
}

const FOOTBALL_MARKERS: MarkerSet = MarkerSet {
    player: "/coach-diagram/markers/football-player_v2.webp",
    ball: "/coach-diagram/markers/football-ball_v2.webp",
};

/// Court image for a sport. `Custom` diagrams have no background.
pub fn background_url(sport: SportType) -> Option<&'static str> {
    match sport {
        SportType::Football => Some("/court/fotball_v2.webp"),
        SportType::Handball => Some("/court/handball_v2.webp"),
        SportType::Basketball => Some("/court/basket_v2.webp"),
        SportType::Hockey => Some("/court/hockey_v2.webp"),
        SportType::Innebandy => Some("/court/innebandy_v2.webp"),
        SportType::Custom => None,
    }
}

/// Player and ball images for a sport. `Custom` uses the football set.
pub fn marker_set(sport: SportType) -> MarkerSet {
    match sport {
        SportType::Basketball => MarkerSet {
            player: "/coach-diagram/markers/basketball-player_v2.webp",
            ball: "/coach-diagram/markers/basketball-ball_v2.webp",
        },
        SportType::Handball => MarkerSet {
            player: "/coach-diagram/markers/football-player_v2.webp",
            ball: "/coach-diagram/markers/handball-ball_v2.webp",
        },
        SportType::Hockey => MarkerSet {
            player: "/coach-diagram/markers/hockeyjersey-player_v2.webp",
            ball: "/coach-diagram/markers/hockeypuck-ball_v2.webp",
        },
        SportType::Innebandy => MarkerSet {
            player: "/coach-diagram/markers/football-player_v2.webp",
            ball: "/coach-diagram/markers/innebandyball-ball_v2.webp",
        },
        SportType::Football | SportType::Custom => FOOTBALL_MARKERS,
    }
}

/// Marker set for an arbitrary sport name; unknown names get the football set.
pub fn marker_set_for_name(name: &str) -> MarkerSet {
    SportType::from_str(name)
        .map(marker_set)
        .unwrap_or(FOOTBALL_MARKERS)
}

/// Prefixes site-relative paths with `base_url`. Absolute and data URLs pass through.
pub fn resolve_href(base_url: Option<&str>, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:") {
        return path.to_string();
    }
    match base_url {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
        None => path.to_string(),
    }
}
