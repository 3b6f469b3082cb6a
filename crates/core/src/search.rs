use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::hierarchy::{Hierarchy, HierarchyNode};

pub fn fuzzy_score(needle: &str, hay: &str) -> Option<i64> {
    let m = SkimMatcherV2::default();
    m.fuzzy_match(hay, needle)
}

impl Hierarchy {
    /// Leaves whose name or category matches `needle`, best match first.
    pub fn search(&self, needle: &str) -> Vec<&HierarchyNode> {
        if needle.trim().is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<(i64, &HierarchyNode)> = self
            .leaves()
            .filter_map(|n| {
                let by_name = fuzzy_score(needle, &n.name);
                let by_category = n.category.as_deref().and_then(|c| fuzzy_score(needle, c));
                by_name.max(by_category).map(|s| (s, n))
            })
            .collect();
        hits.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.node.cmp(&b.1.node)));
        hits.into_iter().map(|(_, n)| n).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DatasetNode;

    #[test]
    fn finds_leaves_by_name_or_category() {
        let data = DatasetNode::group(
            "r",
            vec![DatasetNode::group(
                "NES",
                vec![
                    DatasetNode::record("Super Mario Bros.", "Platform", 40.0),
                    DatasetNode::record("Duck Hunt", "Shooter", 10.0),
                ],
            )],
        );
        let tree = Hierarchy::build(&data).unwrap();
        let hits = tree.search("mario");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Super Mario Bros.");
        assert_eq!(tree.search("shoot")[0].name, "Duck Hunt");
        assert!(tree.search("  ").is_empty());
        assert!(fuzzy_score("dkhnt", "Duck Hunt").is_some());
        assert_eq!(fuzzy_score("zzz", "Duck Hunt"), None);
    }

    #[test]
    fn ranking_follows_fuzzy_score() {
        let data = DatasetNode::group(
            "r",
            vec![DatasetNode::group(
                "GB",
                vec![
                    DatasetNode::record("Pokemon Red", "Role-Playing", 31.37),
                    DatasetNode::record("Pokemon Gold", "Role-Playing", 23.1),
                    DatasetNode::record("Tetris", "Puzzle", 30.26),
                ],
            )],
        );
        let tree = Hierarchy::build(&data).unwrap();
        let hits = tree.search("pkmn gold");
        assert_eq!(hits[0].name, "Pokemon Gold");
        let best = |n: &HierarchyNode| {
            fuzzy_score("pkmn gold", &n.name).max(n.category.as_deref().and_then(|c| fuzzy_score("pkmn gold", c)))
        };
        let scores: Vec<_> = hits.iter().map(|&n| best(n)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(hits.iter().all(|n| n.name != "Tetris"));
    }
}
