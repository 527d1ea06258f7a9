//! Merging of per-tier result lists.

use ahash::AHashSet;

use crate::search::result::{ResultTier, SearchResult};

/// Combines the result lists of several tiers into one ranking.
///
/// Raw scores are not comparable across tiers, so each tier's scores are
/// first divided by that tier's best score and multiplied by the tier
/// weight. Duplicates are then dropped in tier priority order, so the
/// highest-priority copy of an article survives together with its score
/// and highlighting.
#[derive(Debug, Default)]
pub struct ResultMerger {
    tiers: Vec<(ResultTier, Vec<SearchResult>)>,
    /// Keys of everything added so far, in insertion order.
    seen: SeenKeys,
}

impl ResultMerger {
    /// Create an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the results of one tier.
    ///
    /// Returns how many of them duplicate nothing added before, which is
    /// what the cascade counts towards its hit thresholds.
    pub fn add_tier(&mut self, tier: ResultTier, results: Vec<SearchResult>) -> usize {
        let fresh = results.iter().filter(|r| self.seen.insert(r)).count();
        self.tiers.push((tier, results));
        fresh
    }

    /// Number of results added so far, duplicates included.
    pub fn len(&self) -> usize {
        self.tiers.iter().map(|(_, results)| results.len()).sum()
    }

    /// Whether no result was added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize, deduplicate and sort. The result is not truncated.
    pub fn merge(mut self) -> Vec<SearchResult> {
        // Stable sort keeps insertion order among tiers of equal priority.
        self.tiers.sort_by_key(|(tier, _)| priority(*tier));

        let mut seen = SeenKeys::default();
        let mut merged = Vec::with_capacity(self.len());

        for (tier, mut results) in self.tiers {
            normalize(tier, &mut results);
            for result in results {
                if !seen.insert(&result) {
                    log::trace!("dropping duplicate {} from {tier} tier", result.id);
                    continue;
                }
                merged.push(result);
            }
        }

        merged.sort_by(|a, b| b.score.total_cmp(&a.score));
        merged
    }
}

/// Identity keys of the results kept so far.
///
/// Two results are the same article when they share an id or a source URL.
/// Titles only identify results without an id of their own, such as
/// keyword records keyed by their link, since distinct articles often share
/// a headline.
#[derive(Debug, Default)]
struct SeenKeys {
    ids: AHashSet<String>,
    urls: AHashSet<String>,
    titles: AHashSet<String>,
}

impl SeenKeys {
    /// Record `result`; `false` when it duplicates a recorded one.
    fn insert(&mut self, result: &SearchResult) -> bool {
        let url = result.article.source_url.trim();
        let title = result.article.title.trim();
        let own_id = result.article.id().is_some_and(|id| id != url);

        let duplicate = self.ids.contains(&result.id)
            || (!url.is_empty() && self.urls.contains(url))
            || (!own_id && !title.is_empty() && self.titles.contains(title));
        if duplicate {
            return false;
        }

        self.ids.insert(result.id.clone());
        if !url.is_empty() {
            self.urls.insert(url.to_string());
        }
        if !title.is_empty() {
            self.titles.insert(title.to_string());
        }
        true
    }
}

fn priority(tier: ResultTier) -> usize {
    ResultTier::ALL
        .iter()
        .position(|t| *t == tier)
        .unwrap_or(ResultTier::ALL.len())
}

/// Scale a tier's scores into `[0, weight]`.
fn normalize(tier: ResultTier, results: &mut [SearchResult]) {
    let max = results.iter().map(|r| r.score).fold(0.0_f64, f64::max);
    let weight = tier.weight();
    for result in results.iter_mut() {
        result.score = if max > 0.0 {
            result.score / max * weight
        } else {
            0.0
        };
        result.tier = tier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::article::Article;

    fn result(id: &str, title: &str, url: &str, score: f64, tier: ResultTier) -> SearchResult {
        let article = Article::new(id, title).with_source_url(url);
        SearchResult::new(article, score, tier)
    }

    #[test]
    fn test_primary_copy_wins() {
        let mut merger = ResultMerger::new();
        merger.add_tier(
            ResultTier::Secondary,
            vec![result("a", "A", "", 3.0, ResultTier::Secondary)],
        );
        merger.add_tier(
            ResultTier::Primary,
            vec![
                result("a", "A", "", 12.0, ResultTier::Primary)
                    .with_highlights(Some("<mark>A</mark>".to_string()), None),
                result("b", "B", "", 6.0, ResultTier::Primary),
            ],
        );

        let merged = merger.merge();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "a");
        assert_eq!(merged[0].tier, ResultTier::Primary);
        assert_eq!(merged[0].score, 1.0);
        assert_eq!(merged[0].highlighted_title.as_deref(), Some("<mark>A</mark>"));
        assert_eq!(merged[1].score, 0.5);
    }

    #[test]
    fn test_dedup_by_url_then_title() {
        let mut merger = ResultMerger::new();
        merger.add_tier(
            ResultTier::Primary,
            vec![result("a", "Same title", "https://x/1", 1.0, ResultTier::Primary)],
        );
        // link-keyed record without an id of its own
        let link_keyed = Article {
            title: "Same title".to_string(),
            source_url: "https://x/2".to_string(),
            ..Default::default()
        };
        merger.add_tier(
            ResultTier::Secondary,
            vec![
                result("https://x/1", "Other title", "https://x/1", 1.0, ResultTier::Secondary),
                SearchResult::new(link_keyed, 1.0, ResultTier::Secondary),
                result("d", "Fresh", "https://x/3", 1.0, ResultTier::Secondary),
            ],
        );
        let ids: Vec<String> = merger.merge().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn test_shared_headline_keeps_distinct_articles() {
        let mut merger = ResultMerger::new();
        merger.add_tier(
            ResultTier::Primary,
            vec![
                result("m-1", "Market update", "https://x/m/1", 2.0, ResultTier::Primary),
                result("m-2", "Market update", "https://x/m/2", 1.0, ResultTier::Primary),
            ],
        );
        merger.add_tier(
            ResultTier::Local,
            vec![result("m-3", "Market update", "", 1.0, ResultTier::Local)],
        );
        let ids: Vec<String> = merger.merge().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["m-1", "m-3", "m-2"]);
    }

    #[test]
    fn test_add_tier_counts_unseen_results() {
        let mut merger = ResultMerger::new();
        let primary = vec![
            result("a", "A", "https://x/a", 2.0, ResultTier::Primary),
            result("b", "B", "https://x/b", 1.0, ResultTier::Primary),
        ];
        assert_eq!(merger.add_tier(ResultTier::Primary, primary), 2);

        let secondary = vec![
            result("a", "A", "https://x/a", 1.0, ResultTier::Secondary),
            result("https://x/b", "B", "https://x/b", 1.0, ResultTier::Secondary),
            result("c", "C", "https://x/c", 1.0, ResultTier::Secondary),
        ];
        assert_eq!(merger.add_tier(ResultTier::Secondary, secondary), 1);
        assert_eq!(merger.len(), 5);
        assert_eq!(merger.merge().len(), 3);
    }

    #[test]
    fn test_tier_weights_order_top_scores() {
        let mut merger = ResultMerger::new();
        merger.add_tier(ResultTier::Local, vec![result("l", "L", "", 9.0, ResultTier::Local)]);
        merger.add_tier(
            ResultTier::Secondary,
            vec![result("s", "S", "", 0.1, ResultTier::Secondary)],
        );
        let merged = merger.merge();
        assert_eq!(merged[0].id, "s");
        assert!((merged[0].score - 0.8).abs() < 1e-9);
        assert!((merged[1].score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_zero_scores() {
        let mut merger = ResultMerger::new();
        merger.add_tier(ResultTier::Primary, vec![result("a", "A", "", 0.0, ResultTier::Primary)]);
        assert_eq!(merger.merge()[0].score, 0.0);
    }
}
