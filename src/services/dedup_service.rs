//! Near-duplicate headline detection.
//!
//! Similarity scores are on a 0-100 scale. `ratio` is the normalized Indel
//! similarity (insertions and deletions only) and `token_set_ratio` compares
//! the sets of words in two headlines, so reordered or padded headlines for
//! the same deal still score high.

use std::collections::BTreeSet;

use crate::domain::Deal;

/// Rank given to sources missing from the preference list
const UNRANKED: usize = 999;

pub struct DedupService {
    threshold: f64,
    preferred_sources: Vec<String>,
}

impl DedupService {
    pub fn new(threshold: f64, preferred_sources: Vec<String>) -> Self {
        Self {
            threshold,
            preferred_sources,
        }
    }

    fn source_rank(&self, source: &str) -> usize {
        self.preferred_sources
            .iter()
            .position(|s| s == source)
            .unwrap_or(UNRANKED)
    }

    /// Keep one deal per cluster of similar headlines.
    ///
    /// Deals are visited best source first (stable, so equal ranks keep their
    /// input order) and a deal is dropped when its title scores at or above
    /// the threshold against any title already kept or any `history` title.
    pub fn deduplicate(&self, deals: Vec<Deal>, history: &[String]) -> Vec<Deal> {
        if deals.is_empty() {
            return deals;
        }

        let total = deals.len();
        let mut ranked = deals;
        ranked.sort_by_key(|d| self.source_rank(&d.source));

        let mut seen_titles: Vec<String> = history.to_vec();
        let mut unique = Vec::new();

        for deal in ranked {
            let duplicate_of = seen_titles
                .iter()
                .find(|seen| token_set_ratio(&deal.title, seen) >= self.threshold);

            match duplicate_of {
                Some(seen) => {
                    tracing::debug!(title = %deal.title, matched = %seen, "Dropping near-duplicate");
                }
                None => {
                    seen_titles.push(deal.title.clone());
                    unique.push(deal);
                }
            }
        }

        tracing::info!("Deduplicated from {} -> {} deals.", total, unique.len());
        unique
    }
}

/// Lower-case and turn everything but letters and digits into token breaks
fn tokenize(s: &str) -> BTreeSet<String> {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn indel_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    a.len() + b.len() - 2 * lcs_len(&a, &b)
}

fn normalized_similarity(distance: usize, total_len: usize) -> f64 {
    if total_len == 0 {
        return 100.0;
    }
    100.0 * (1.0 - distance as f64 / total_len as f64)
}

/// Normalized Indel similarity of two strings
pub fn ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    normalized_similarity(indel_distance(a, b), total)
}

/// Compare the word sets of two strings.
///
/// Scores 100 when one side's words are a subset of the other's, 0 when
/// either side has no words, and otherwise the best `ratio` between the
/// shared words and each side's full word list.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).map(String::as_str).collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).map(String::as_str).collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).map(String::as_str).collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    // BTreeSet iteration is already sorted
    let sect = intersection.join(" ");
    let diff_ab = diff_ab.join(" ");
    let diff_ba = diff_ba.join(" ");

    let sect_len = sect.chars().count();
    let ab_len = diff_ab.chars().count();
    let ba_len = diff_ba.chars().count();
    let separator = usize::from(sect_len != 0);

    let sect_ab_len = sect_len + separator + ab_len;
    let sect_ba_len = sect_len + separator + ba_len;

    // The shared prefix contributes no edits, so comparing the differences
    // alone gives the distance between "sect diff_ab" and "sect diff_ba"
    let full = normalized_similarity(indel_distance(&diff_ab, &diff_ba), sect_ab_len + sect_ba_len);

    if sect_len == 0 {
        return full;
    }

    let sect_ab = normalized_similarity(separator + ab_len, sect_len + sect_ab_len);
    let sect_ba = normalized_similarity(separator + ba_len, sect_len + sect_ba_len);

    full.max(sect_ab).max(sect_ba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawEntry;
    use chrono::{TimeZone, Utc};

    fn deal(title: &str, source: &str, sector: &str) -> Deal {
        let published = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        Deal::from_entry(
            RawEntry::new(title.to_string(), format!("https://n.example/{}", title.len()))
                .with_source(Some(source.to_string())),
            published,
            sector,
            None,
        )
    }

    fn service() -> DedupService {
        DedupService::new(
            85.0,
            crate::config::DEFAULT_PREFERRED_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    #[test]
    fn test_ratio_basics() {
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", "abc"), 100.0);
        assert_eq!(ratio("abc", ""), 0.0);
        // lcs("abcd", "abed") = 3, indel = 2, total = 8
        assert!((ratio("abcd", "abed") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_token_set_ratio_subset_is_perfect() {
        assert_eq!(
            token_set_ratio("Acme acquires Widget", "Acme acquires Widget in $2B deal"),
            100.0
        );
    }

    #[test]
    fn test_token_set_ratio_ignores_case_order_and_punctuation() {
        assert_eq!(
            token_set_ratio("Widget, acquired by ACME!", "acme acquired widget by"),
            100.0
        );
    }

    #[test]
    fn test_token_set_ratio_empty_is_zero() {
        assert_eq!(token_set_ratio("", "anything"), 0.0);
        assert_eq!(token_set_ratio("!!!", "anything"), 0.0);
    }

    #[test]
    fn test_token_set_ratio_disjoint() {
        // no shared words: plain ratio of the sorted word lists
        let score = token_set_ratio("abc", "xyz");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_token_set_ratio_partial_overlap() {
        // sect = "acme buys", diff_ab = "widget", diff_ba = "gadget"
        // sect_ab_len = sect_ba_len = 16; lcs("widget", "gadget") = 4, indel = 4
        // full = 100 * (1 - 4/32) = 87.5
        // sect vs sect+ab: dist 7 over 9 + 16 = 25 -> 72
        let score = token_set_ratio("Acme buys Widget", "Acme buys Gadget");
        assert!((score - 87.5).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_dedup_prefers_ranked_source() {
        let deals = vec![
            deal("Acme to buy Widget Co for $2 billion", "Some Blog", "Technology"),
            deal("Acme to buy Widget Co for $2 billion - Reuters", "Reuters", "Technology"),
        ];

        let unique = service().deduplicate(deals, &[]);

        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].source, "Reuters");
    }

    #[test]
    fn test_dedup_orders_by_rank_and_keeps_ties_stable() {
        let deals = vec![
            deal("Orbit Health merges with Polaris Labs", "Local Paper", "Healthcare"),
            deal("Cloudco completes purchase of DataCorp", "CNBC", "Technology"),
            deal("Grocer chain sells bakery unit to rival", "Another Paper", "Consumer & Retail"),
            deal("Staffing group snaps up payroll startup", "Bloomberg", "Business Services"),
        ];

        let unique = service().deduplicate(deals, &[]);
        let sources: Vec<&str> = unique.iter().map(|d| d.source.as_str()).collect();

        assert_eq!(sources, vec!["Bloomberg", "CNBC", "Local Paper", "Another Paper"]);
    }

    #[test]
    fn test_dedup_against_history() {
        let deals = vec![
            deal("Cloudco buys DataCorp", "Reuters", "Technology"),
            deal("Grocer chain sells bakery unit", "Reuters", "Consumer & Retail"),
        ];
        let history = vec!["Cloudco buys DataCorp - CNBC".to_string()];

        let unique = service().deduplicate(deals, &history);

        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].title, "Grocer chain sells bakery unit");
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        // 87.5 exactly at the threshold counts as a duplicate
        let service = DedupService::new(87.5, Vec::new());
        let deals = vec![
            deal("Acme buys Widget", "A", "Technology"),
            deal("Acme buys Gadget", "B", "Technology"),
        ];

        assert_eq!(service.deduplicate(deals.clone(), &[]).len(), 1);

        let stricter = DedupService::new(90.0, Vec::new());
        assert_eq!(stricter.deduplicate(deals, &[]).len(), 2);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(service().deduplicate(Vec::new(), &[]).is_empty());
    }
}
