use std::collections::{HashMap, HashSet};
use serde::{Serialize, Deserialize};
use crate::records::PracticeRecord;

/// Tags seen on fewer records are too noisy to call a weakness.
pub const MIN_TAG_RECORDS: usize = 3;
pub const RETRY_RATE_THRESHOLD: f64 = 0.30;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WeaknessEntry {
    pub tag: String,
    /// Percent of the tag's records flagged for retry, rounded.
    pub retry_rate: u32,
    pub total_problems: usize,
    pub retry_count: usize,
}

#[derive(Default)]
struct TagTally {
    total: usize,
    retries: usize,
}

/// Tags whose retry rate is above the threshold, worst first.
pub fn detect_weaknesses(records: &[PracticeRecord]) -> Vec<WeaknessEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, TagTally> = HashMap::new();

    for record in records {
        // A tag repeated on one record still counts that record once.
        let mut seen: HashSet<&str> = HashSet::new();
        for tag in record.tags.iter().filter(|t| seen.insert(t.as_str())) {
            let tally = tallies.entry(tag.as_str()).or_insert_with(|| {
                order.push(tag.as_str());
                TagTally::default()
            });
            tally.total += 1;
            if record.retry_later {
                tally.retries += 1;
            }
        }
    }

    let mut weaknesses: Vec<WeaknessEntry> = order
        .into_iter()
        .filter_map(|tag| {
            let tally = tallies.get(tag)?;
            if tally.total < MIN_TAG_RECORDS {
                return None;
            }
            let rate = tally.retries as f64 / tally.total as f64;
            let percent = (rate * 100.0).round() as u32;
            // Rates just above the threshold can round down to 30.
            if rate <= RETRY_RATE_THRESHOLD || percent <= 30 {
                return None;
            }
            Some(WeaknessEntry {
                tag: tag.to_string(),
                retry_rate: percent,
                total_problems: tally.total,
                retry_count: tally.retries,
            })
        })
        .collect();

    weaknesses.sort_by(|a, b| b.retry_rate.cmp(&a.retry_rate));
    weaknesses
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tagged(id: usize, tags: &[&str], retry: bool) -> PracticeRecord {
        PracticeRecord::new(id.to_string(), "u".to_string(), format!("P{}", id))
            .with_tags(tags.iter().copied())
            .flagged_for_retry(retry)
    }

    #[test]
    fn test_requires_three_records() {
        let records = vec![
            tagged(1, &["DP"], true),
            tagged(2, &["DP"], true),
        ];
        assert!(detect_weaknesses(&records).is_empty());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // 3 of 10 is exactly 30%: not a weakness.
        let records: Vec<_> = (0..10).map(|i| tagged(i, &["Graph"], i < 3)).collect();
        assert!(detect_weaknesses(&records).is_empty());

        let records: Vec<_> = (0..10).map(|i| tagged(i, &["Graph"], i < 4)).collect();
        let weak = detect_weaknesses(&records);
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].retry_rate, 40);
        assert_eq!(weak[0].retry_count, 4);
        assert_eq!(weak[0].total_problems, 10);
    }

    #[test]
    fn test_sorted_worst_first_with_multi_membership() {
        let records = vec![
            tagged(1, &["DP", "Array"], true),
            tagged(2, &["DP", "Array"], false),
            tagged(3, &["DP", "Array"], true),
            tagged(4, &["Array"], false),
            tagged(5, &["Greedy"], true),
            tagged(6, &["Greedy"], true),
            tagged(7, &["Greedy"], true),
        ];
        let weak = detect_weaknesses(&records);
        let tags: Vec<&str> = weak.iter().map(|w| w.tag.as_str()).collect();
        assert_eq!(tags, vec!["Greedy", "DP", "Array"]);
        assert_eq!(weak[0].retry_rate, 100);
        assert_eq!(weak[1].retry_rate, 67);
        assert_eq!(weak[2].retry_rate, 50);
    }

    #[test]
    fn test_rounding_edge_excluded() {
        // 10 of 33 is 30.3%, which rounds to 30.
        let records: Vec<_> = (0..33).map(|i| tagged(i, &["Heap"], i < 10)).collect();
        assert!(detect_weaknesses(&records).is_empty());
    }

    #[test]
    fn test_repeated_tag_counts_record_once() {
        let records = vec![tagged(1, &["DP", "DP", "DP"], true)];
        assert!(detect_weaknesses(&records).is_empty());

        let records = vec![
            tagged(1, &["DP", "DP"], true),
            tagged(2, &["DP"], true),
            tagged(3, &["DP", "Array", "DP"], false),
        ];
        let weak = detect_weaknesses(&records);
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].total_problems, 3);
        assert_eq!(weak[0].retry_count, 2);
    }

    proptest! {
        #[test]
        fn prop_never_emits_small_or_low_rate_tags(
            flags in proptest::collection::vec(
                (proptest::collection::vec(0usize..4, 0..4), any::<bool>()),
                0..60,
            )
        ) {
            let pool = ["DP", "Graph", "Array", "Stack"];
            let records: Vec<_> = flags
                .iter()
                .enumerate()
                .map(|(i, (tags, retry))| {
                    let names: Vec<&str> = tags.iter().map(|t| pool[*t]).collect();
                    tagged(i, &names, *retry)
                })
                .collect();
            for entry in detect_weaknesses(&records) {
                let carriers = records.iter().filter(|r| r.tags.contains(&entry.tag)).count();
                prop_assert_eq!(entry.total_problems, carriers);
                prop_assert!(entry.total_problems >= MIN_TAG_RECORDS);
                prop_assert!(entry.retry_rate > 30);
            }
        }
    }
}
