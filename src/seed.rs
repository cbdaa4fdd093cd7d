//! Deterministic demo data.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use crate::records::{Difficulty, PracticeRecord};

const TAG_POOL: &[&str] = &[
    "Array", "Hashmap", "Two Pointers", "Sliding Window", "Binary Search", "DFS",
    "BFS", "Stack", "Queue", "Linked List", "Graph", "Greedy", "Sorting", "DP",
];

const TITLES: &[&str] = &[
    "Two Sum", "Longest Substring Without Repeating Characters", "Merge Intervals",
    "Best Time to Buy and Sell Stock", "Valid Parentheses", "Group Anagrams",
    "Climbing Stairs", "Longest Palindromic Substring", "Container With Most Water",
    "Binary Tree Inorder Traversal", "Course Schedule", "Word Ladder",
    "Median of Two Sorted Arrays", "Subsets", "Kth Largest Element",
    "LRU Cache", "Find Minimum in Rotated Sorted Array", "Trapping Rain Water",
    "Reverse Linked List", "Maximum Subarray",
];

const DIFFICULTIES: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

/// Records solved within the 30 days before `today`. At most one per title,
/// so `count` is capped at the title pool size. Same seed, same records.
pub fn generate_records(owner: &str, count: usize, seed: u64, today: NaiveDate) -> Vec<PracticeRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut titles: Vec<&str> = TITLES.to_vec();
    titles.shuffle(&mut rng);

    titles
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, title)| {
            let tag_count = rng.gen_range(2..=4);
            let tags: Vec<String> = TAG_POOL
                .choose_multiple(&mut rng, tag_count)
                .map(|t| t.to_string())
                .collect();
            let difficulty = DIFFICULTIES[rng.gen_range(0..DIFFICULTIES.len())];
            let days_ago = rng.gen_range(0..=30);

            let mut record = PracticeRecord::new(format!("{}-{:03}", owner, i), owner.to_string(), title.to_string())
                .with_difficulty(difficulty)
                .with_tags(tags)
                .solved_on(today - Duration::days(days_ago))
                .flagged_for_retry(rng.gen_bool(0.5));
            record.time_taken_min = Some(rng.gen_range(10..=60));
            record.url = Some(format!(
                "https://leetcode.com/problems/{}/",
                title.to_lowercase().replace(' ', "-")
            ));
            record
        })
        .collect()
}
