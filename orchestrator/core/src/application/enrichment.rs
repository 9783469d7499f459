// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Plan enrichment
//!
//! Adds video, thumbnail and equipment links to each exercise. Every derived
//! field is recomputed from the exercise name and description alone, so
//! enriching an already enriched plan changes nothing. Model-authored fields
//! and exercise order are never touched.

use crate::domain::catalog::{self, STOCK_THUMBNAILS};
use crate::domain::plan::{Exercise, Plan};
use sha2::{Digest, Sha256};
use url::Url;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const SEARCH_URL: &str = "https://www.youtube.com/results";
const SEARCH_SUFFIX: &str = "physiotherapy exercise";

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanEnricher;

impl PlanEnricher {
    pub fn new() -> Self {
        Self
    }

    pub fn enrich(&self, mut plan: Plan) -> Plan {
        for exercise in &mut plan.exercise_plan.selected_exercises {
            link_equipment(exercise);
            resolve_video(exercise);
        }
        plan
    }
}

fn link_equipment(exercise: &mut Exercise) {
    let text = format!("{} {}", exercise.name, exercise.description);
    match catalog::find_equipment(&text) {
        Some(entry) => {
            exercise.equipment_name = Some(entry.name.to_string());
            exercise.equipment_url = Some(entry.url.to_string());
        }
        None => {
            exercise.equipment_name = None;
            exercise.equipment_url = None;
        }
    }
}

fn resolve_video(exercise: &mut Exercise) {
    match catalog::find_video(&exercise.name) {
        Some(entry) => {
            exercise.video_url = Some(watch_url(entry.video_id));
            exercise.thumbnail_url = Some(video_thumbnail(entry.video_id));
        }
        None => {
            exercise.video_url = Some(search_url(&exercise.name));
            exercise.thumbnail_url = Some(stock_thumbnail(&exercise.name).to_string());
        }
    }
}

fn watch_url(video_id: &str) -> String {
    format!("{}?v={}", WATCH_URL, video_id)
}

fn video_thumbnail(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id)
}

/// YouTube search link for exercises without a curated video
pub fn search_url(exercise_name: &str) -> String {
    let query = format!("{} {}", exercise_name.trim(), SEARCH_SUFFIX);
    match Url::parse_with_params(SEARCH_URL, &[("search_query", query.as_str())]) {
        Ok(url) => url.into(),
        Err(_) => SEARCH_URL.to_string(),
    }
}

/// Stock thumbnail chosen by a stable hash of the exercise name.
///
/// Case and surrounding whitespace do not affect the choice.
pub fn stock_thumbnail(exercise_name: &str) -> &'static str {
    let digest = Sha256::digest(exercise_name.trim().to_lowercase().as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let index = u64::from_be_bytes(prefix) % STOCK_THUMBNAILS.len() as u64;
    STOCK_THUMBNAILS[index as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{
        Analysis, Consultation, DietRecommendations, ExercisePlan, RecoveryTimeline,
    };

    fn exercise(name: &str, description: &str) -> Exercise {
        let mut exercise = Exercise::new(name);
        exercise.sets = "3".to_string();
        exercise.reps = "10".to_string();
        exercise.difficulty = "beginner".to_string();
        exercise.description = description.to_string();
        exercise
    }

    fn plan(exercises: Vec<Exercise>) -> Plan {
        Plan {
            analysis: Analysis::default(),
            exercise_plan: ExercisePlan {
                selected_exercises: exercises,
            },
            diet_recommendations: DietRecommendations::default(),
            consultation: Consultation::default(),
            recovery_timeline: RecoveryTimeline::default(),
        }
    }

    #[test]
    fn test_curated_video() {
        let enriched = PlanEnricher::new().enrich(plan(vec![exercise("Quad Sets", "")]));
        let first = &enriched.exercise_plan.selected_exercises[0];
        assert_eq!(
            first.video_url.as_deref(),
            Some("https://www.youtube.com/watch?v=Cg5Qp9mEd0o")
        );
        assert_eq!(
            first.thumbnail_url.as_deref(),
            Some("https://img.youtube.com/vi/Cg5Qp9mEd0o/hqdefault.jpg")
        );
    }

    #[test]
    fn test_search_fallback() {
        let enriched =
            PlanEnricher::new().enrich(plan(vec![exercise("Tai Chi Weight Shift", "")]));
        let first = &enriched.exercise_plan.selected_exercises[0];
        assert_eq!(
            first.video_url.as_deref(),
            Some("https://www.youtube.com/results?search_query=Tai+Chi+Weight+Shift+physiotherapy+exercise")
        );
        assert_eq!(
            first.thumbnail_url.as_deref(),
            Some(stock_thumbnail("Tai Chi Weight Shift"))
        );
    }

    #[test]
    fn test_search_query_is_escaped() {
        let url = search_url("Child's pose & breathing");
        assert!(url.starts_with("https://www.youtube.com/results?search_query="));
        assert!(url.contains("%26"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn test_stock_thumbnail_is_stable() {
        let first = stock_thumbnail("Seated March");
        for _ in 0..10 {
            assert_eq!(stock_thumbnail("Seated March"), first);
        }
        assert_eq!(stock_thumbnail("  seated march "), first);
        assert!(STOCK_THUMBNAILS.contains(&first));
    }

    #[test]
    fn test_equipment_from_name_or_description() {
        let enriched = PlanEnricher::new().enrich(plan(vec![
            exercise("Band Pull Apart", "Hold a resistance band at chest height"),
            exercise("Foam Roller Release", ""),
            exercise("Deep Breathing", "Relax"),
        ]));
        let exercises = &enriched.exercise_plan.selected_exercises;
        assert_eq!(exercises[0].equipment_name.as_deref(), Some("Resistance Band Set"));
        assert_eq!(exercises[1].equipment_name.as_deref(), Some("Foam Roller"));
        assert!(exercises[1].equipment_url.is_some());
        assert!(exercises[2].equipment_name.is_none());
        assert!(exercises[2].equipment_url.is_none());
    }

    #[test]
    fn test_enrichment_is_idempotent_and_preserves_content() {
        let original = plan(vec![
            exercise("Glute Bridge", "Lie on a yoga mat"),
            exercise("Wall Squat", "Back against the wall"),
            exercise("Seated Knee Extension", "Sit on a chair"),
        ]);
        let enricher = PlanEnricher::new();
        let once = enricher.enrich(original.clone());
        let twice = enricher.enrich(once.clone());
        assert_eq!(once, twice);

        for (before, after) in original
            .exercise_plan
            .selected_exercises
            .iter()
            .zip(&once.exercise_plan.selected_exercises)
        {
            assert_eq!(before.name, after.name);
            assert_eq!(before.sets, after.sets);
            assert_eq!(before.reps, after.reps);
            assert_eq!(before.difficulty, after.difficulty);
            assert_eq!(before.description, after.description);
            assert!(after.video_url.is_some());
            assert!(after.thumbnail_url.is_some());
        }
    }
}
