//! # Random outfit assembly
//!
//! Items are grouped by category and one item is drawn from each group.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ss_core::models::{Item, NewOutfit};
use ss_core::traits::RandomSource;
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const RANDOM_OUTFIT_DESCRIPTION: &str = "AI-generated random outfit";

/// Deterministic source for tests and reproducible demos.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len)
    }
}

/// Thread-local entropy. The production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Groups items by category id; items without one share the
/// `uncategorized` group. Group order is stable (sorted by key).
pub fn group_by_category(items: Vec<Item>) -> BTreeMap<String, Vec<Item>> {
    let mut groups: BTreeMap<String, Vec<Item>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category_key().to_string()).or_default().push(item);
    }
    groups
}

/// Draws one item id per non-empty group.
pub fn pick_one_per_group(groups: &BTreeMap<String, Vec<Item>>, random: &dyn RandomSource) -> Vec<String> {
    groups
        .values()
        .filter(|group| !group.is_empty())
        .map(|group| group[random.index(group.len())].id.clone())
        .collect()
}

pub fn outfit_name(date: NaiveDate) -> String {
    format!("Random Outfit {}/{}/{}", date.month(), date.day(), date.year())
}

pub fn random_outfit(items: Vec<Item>, random: &dyn RandomSource, today: NaiveDate) -> NewOutfit {
    let groups = group_by_category(items);
    NewOutfit {
        name: outfit_name(today),
        description: Some(RANDOM_OUTFIT_DESCRIPTION.to_string()),
        items: pick_one_per_group(&groups, random),
        is_starred: false,
        ..Default::default()
    }
}
