// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Catalog
//!
//! Static lookup tables used by plan enrichment. Each table is an ordered
//! slice: the first entry whose keyword matches wins, so entry order is part
//! of the behaviour and must not be sorted or deduplicated.

/// A curated demonstration video for exercises whose name contains `keyword`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoEntry {
    pub keyword: &'static str,
    pub video_id: &'static str,
}

/// Affiliate link for equipment mentioned in an exercise name or description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentEntry {
    pub keyword: &'static str,
    pub name: &'static str,
    pub url: &'static str,
}

// Specific names ahead of the generic words they contain ("wall squat" before "squat").
pub const VIDEO_LIBRARY: &[VideoEntry] = &[
    VideoEntry { keyword: "quad set", video_id: "Cg5Qp9mEd0o" },
    VideoEntry { keyword: "straight leg raise", video_id: "Lm2GzNHhx_0" },
    VideoEntry { keyword: "heel slide", video_id: "0Fz1s2lHn4c" },
    VideoEntry { keyword: "wall squat", video_id: "y-wV4Venusw" },
    VideoEntry { keyword: "mini squat", video_id: "Y2KZsTo7BzU" },
    VideoEntry { keyword: "step up", video_id: "dQqApCGd5Ss" },
    VideoEntry { keyword: "hamstring curl", video_id: "1Tq3QdYUuHs" },
    VideoEntry { keyword: "hamstring stretch", video_id: "T_l0AyZywjU" },
    VideoEntry { keyword: "calf raise", video_id: "gwLzBJYoWlI" },
    VideoEntry { keyword: "ankle pump", video_id: "5Fk4IlSl6yU" },
    VideoEntry { keyword: "ankle circle", video_id: "K7UmIvPz0CQ" },
    VideoEntry { keyword: "glute bridge", video_id: "wPM8icPu6H8" },
    VideoEntry { keyword: "bridge", video_id: "8bbE64NuDTU" },
    VideoEntry { keyword: "clamshell", video_id: "m_Ct-S5kIZc" },
    VideoEntry { keyword: "cat cow", video_id: "kqnua4rHVVA" },
    VideoEntry { keyword: "cat-cow", video_id: "kqnua4rHVVA" },
    VideoEntry { keyword: "bird dog", video_id: "wiFNA3sqjCA" },
    VideoEntry { keyword: "child's pose", video_id: "2MJGg-dUKh0" },
    VideoEntry { keyword: "pelvic tilt", video_id: "mPtVOWyEbuE" },
    VideoEntry { keyword: "knee to chest", video_id: "Kk0dhu6ymTI" },
    VideoEntry { keyword: "chin tuck", video_id: "wQylqaCl8Zo" },
    VideoEntry { keyword: "neck rotation", video_id: "X3-gKPNyrTA" },
    VideoEntry { keyword: "pendulum", video_id: "tRzsKWCOhTw" },
    VideoEntry { keyword: "wall slide", video_id: "YhJ6Fj_M9Zs" },
    VideoEntry { keyword: "external rotation", video_id: "VMTYtqDmrdM" },
    VideoEntry { keyword: "scapular squeeze", video_id: "bWyXUgq-lbo" },
    VideoEntry { keyword: "wrist flexor stretch", video_id: "Ih-1WTX8dnk" },
    VideoEntry { keyword: "plank", video_id: "pSHjTRCQxIw" },
];

pub const EQUIPMENT_LINKS: &[EquipmentEntry] = &[
    EquipmentEntry {
        keyword: "resistance band",
        name: "Resistance Band Set",
        url: "https://www.amazon.in/s?k=resistance+band+set&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "theraband",
        name: "Resistance Band Set",
        url: "https://www.amazon.in/s?k=resistance+band+set&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "foam roller",
        name: "Foam Roller",
        url: "https://www.amazon.in/s?k=foam+roller&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "exercise ball",
        name: "Exercise Ball",
        url: "https://www.amazon.in/s?k=exercise+ball&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "swiss ball",
        name: "Exercise Ball",
        url: "https://www.amazon.in/s?k=exercise+ball&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "stability ball",
        name: "Exercise Ball",
        url: "https://www.amazon.in/s?k=exercise+ball&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "yoga mat",
        name: "Yoga Mat",
        url: "https://www.amazon.in/s?k=yoga+mat&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "ankle weight",
        name: "Ankle Weights",
        url: "https://www.amazon.in/s?k=ankle+weights&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "dumbbell",
        name: "Dumbbells",
        url: "https://www.amazon.in/s?k=dumbbells&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "towel",
        name: "Exercise Towel",
        url: "https://www.amazon.in/s?k=gym+towel&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "step",
        name: "Aerobic Step Platform",
        url: "https://www.amazon.in/s?k=aerobic+step+platform&tag=physioplan-21",
    },
    EquipmentEntry {
        keyword: "chair",
        name: "Sturdy Folding Chair",
        url: "https://www.amazon.in/s?k=folding+chair&tag=physioplan-21",
    },
];

/// Fallback thumbnails for exercises without a curated video
pub const STOCK_THUMBNAILS: &[&str] = &[
    "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=480&h=270&fit=crop",
    "https://images.unsplash.com/photo-1544367567-0f2fcb009e0b?w=480&h=270&fit=crop",
    "https://images.unsplash.com/photo-1518611012118-696072aa579a?w=480&h=270&fit=crop",
    "https://images.unsplash.com/photo-1599901860904-17e6ed7083a0?w=480&h=270&fit=crop",
    "https://images.unsplash.com/photo-1576678927484-cc907957088c?w=480&h=270&fit=crop",
    "https://images.unsplash.com/photo-1552196563-55cd4e45efb3?w=480&h=270&fit=crop",
];

/// First curated video whose keyword occurs in `exercise_name`
pub fn find_video(exercise_name: &str) -> Option<&'static VideoEntry> {
    let name = exercise_name.to_lowercase();
    VIDEO_LIBRARY.iter().find(|entry| name.contains(entry.keyword))
}

/// First equipment entry whose keyword occurs in `text`
pub fn find_equipment(text: &str) -> Option<&'static EquipmentEntry> {
    let text = text.to_lowercase();
    EQUIPMENT_LINKS.iter().find(|entry| text.contains(entry.keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_lowercase() {
        for entry in VIDEO_LIBRARY {
            assert_eq!(entry.keyword, entry.keyword.to_lowercase());
        }
        for entry in EQUIPMENT_LINKS {
            assert_eq!(entry.keyword, entry.keyword.to_lowercase());
        }
    }

    #[test]
    fn test_specific_keyword_wins() {
        assert_eq!(find_video("Glute Bridge").unwrap().keyword, "glute bridge");
        assert_eq!(find_video("Single-leg bridge").unwrap().keyword, "bridge");
        assert_eq!(find_video("Quad Set").unwrap().video_id, "Cg5Qp9mEd0o");
        assert!(find_video("Tai chi walking").is_none());
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // Both "resistance band" and "step" occur; the earlier entry wins.
        let entry = find_equipment("Step up holding a resistance band").unwrap();
        assert_eq!(entry.name, "Resistance Band Set");
        assert!(find_equipment("Deep breathing").is_none());
    }
}
