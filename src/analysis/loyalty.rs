//! Genre loyalty: share of a user's plays that land in their top genre.

use super::desc_f64;
use super::favorite_genre::{genre_counts, top_genre};
use crate::enrich::EnrichedEvent;
use crate::report::ReportRow;
use crate::table::format_float;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltyScore {
    pub user_id: i64,
    pub loyalty_score: f64,
}

impl ReportRow for LoyaltyScore {
    const COLUMNS: &'static [&'static str] = &["user_id", "loyalty_score"];

    fn fields(&self) -> Vec<String> {
        vec![self.user_id.to_string(), format_float(self.loyalty_score)]
    }
}

/// Users whose loyalty is strictly above `threshold`, highest first, ties by
/// ascending user id. Scores lie in (0, 1].
pub fn loyalty_scores(enriched: &[EnrichedEvent], threshold: f64) -> Vec<LoyaltyScore> {
    let mut rows: Vec<LoyaltyScore> = genre_counts(enriched)
        .into_iter()
        .filter_map(|(user_id, counts)| {
            let total: u64 = counts.values().sum();
            let (_, max) = top_genre(&counts)?;
            #[allow(clippy::cast_precision_loss)]
            let loyalty_score = max as f64 / total as f64;
            Some(LoyaltyScore {
                user_id,
                loyalty_score,
            })
        })
        .filter(|row| row.loyalty_score > threshold)
        .collect();

    rows.sort_by(|a, b| desc_f64(a.loyalty_score, b.loyalty_score).then(a.user_id.cmp(&b.user_id)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::enrich::fixtures::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_genre_user_scores_one() {
        let events = vec![
            event(1, 1, "2025-03-24 10:00:00", 60),
            event(1, 2, "2025-03-24 10:00:00", 60),
        ];
        let rows = loyalty_scores(&enrich(&events, &small_catalog()), 0.6);
        assert_eq!(rows.len(), 1);
        assert_relative_eq!(rows[0].loyalty_score, 1.0);
    }

    #[test]
    fn test_threshold_is_exclusive_and_ordering() {
        let events = vec![
            // user 3: Pop 2 / 3 = 0.666..
            event(3, 1, "2025-03-24 10:00:00", 60),
            event(3, 2, "2025-03-24 10:00:00", 60),
            event(3, 3, "2025-03-24 10:00:00", 60),
            // user 2: Pop 1 / 2 = 0.5
            event(2, 1, "2025-03-24 10:00:00", 60),
            event(2, 3, "2025-03-24 10:00:00", 60),
            // users 9 and 4: Rock only
            event(9, 3, "2025-03-24 10:00:00", 60),
            event(4, 3, "2025-03-24 10:00:00", 60),
        ];
        let enriched = enrich(&events, &small_catalog());
        let rows = loyalty_scores(&enriched, 0.6);

        let users: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
        assert_eq!(users, vec![4, 9, 3]);
        assert_relative_eq!(rows[2].loyalty_score, 2.0 / 3.0);
        for row in &rows {
            assert!(row.loyalty_score > 0.6 && row.loyalty_score <= 1.0);
        }

        // A threshold of exactly 1.0 admits nobody.
        assert!(loyalty_scores(&enriched, 1.0).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(loyalty_scores(&[], 0.6).is_empty());
    }
}
