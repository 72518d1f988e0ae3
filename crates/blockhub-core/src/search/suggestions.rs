//! Query suggestions: title completions, spelling corrections and popular searches
//!
//! Word lists are configuration data (`SuggestionConfig`) with built-in
//! defaults; the algorithms below never hardcode a term.

use super::Module;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Shortest query (trimmed, in characters) that produces suggestions
pub const MIN_SUGGEST_LENGTH: usize = 2;

/// Titles requested from each module for completions
pub const COMPLETION_FETCH_LIMIT: usize = 10;

const MAX_COMPLETIONS: usize = 5;
const MAX_CORRECTIONS: usize = 2;
const MAX_POPULAR: usize = 3;

/// Queries at most this long skip the edit-distance scan
const MIN_FUZZY_QUERY_LENGTH: usize = 3;

/// Suggestion bundle for one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub completions: Vec<String>,
    pub corrections: Vec<String>,
    pub popular: Vec<String>,
    /// Milliseconds spent serving the request
    pub search_time: u64,
}

/// Canned popular searches, one list per module plus a general list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularSearches {
    pub general: Vec<String>,
    pub forum: Vec<String>,
    pub blog: Vec<String>,
    pub wiki: Vec<String>,
}

impl PopularSearches {
    /// List for a module, or the general list when none is given
    pub fn for_module(&self, module: Option<Module>) -> &[String] {
        match module {
            None => &self.general,
            Some(Module::Forum) => &self.forum,
            Some(Module::Blog) => &self.blog,
            Some(Module::Wiki) => &self.wiki,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for PopularSearches {
    fn default() -> Self {
        Self {
            general: strings(&[
                "minecraft server setup",
                "redstone tutorial",
                "survival tips",
                "best mods",
                "building ideas",
            ]),
            forum: strings(&[
                "server help",
                "bug report",
                "mod compatibility",
                "looking for builders",
                "lag issues",
            ]),
            blog: strings(&[
                "update news",
                "patch notes",
                "community spotlight",
                "event announcement",
            ]),
            wiki: strings(&[
                "redstone basics",
                "crafting recipes",
                "enchanting guide",
                "nether portal",
                "mob farm",
            ]),
        }
    }
}

/// Word lists driving corrections and popular searches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Known misspelling -> correct spelling
    pub misspellings: BTreeMap<String, String>,
    /// Domain vocabulary for the edit-distance check, in priority order
    pub common_words: Vec<String>,
    pub popular: PopularSearches,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        let misspellings = [
            ("mincraft", "minecraft"),
            ("minecarft", "minecraft"),
            ("minecaft", "minecraft"),
            ("redstine", "redstone"),
            ("redston", "redstone"),
            ("netherit", "netherite"),
            ("diamon", "diamond"),
            ("enchantmen", "enchantment"),
            ("creper", "creeper"),
            ("villiger", "villager"),
            ("survivle", "survival"),
        ]
        .into_iter()
        .map(|(wrong, right)| (wrong.to_string(), right.to_string()))
        .collect();

        Self {
            misspellings,
            common_words: strings(&[
                "minecraft",
                "redstone",
                "netherite",
                "diamond",
                "enchantment",
                "creeper",
                "villager",
                "survival",
                "creative",
                "server",
                "build",
                "farm",
                "mining",
                "crafting",
                "nether",
                "portal",
                "potion",
                "biome",
                "plugin",
            ]),
            popular: PopularSearches::default(),
        }
    }
}

/// Whether `a` and `b` are within `max` single-character edits
///
/// Length difference is a lower bound on edit distance, so the DP is skipped
/// when it already exceeds `max`; a row whose minimum exceeds `max` also stops early.
pub fn levenshtein_within(a: &str, b: &str, max: usize) -> bool {
    let a_len = a.chars().count();
    let b_len = b.chars().count();

    if a_len.abs_diff(b_len) > max {
        return false;
    }

    let mut dp: Vec<usize> = (0..=b_len).collect();
    for (i, ac) in a.chars().enumerate() {
        let mut prev = dp[0];
        dp[0] = i + 1;
        let mut min_row = dp[0];

        for (j, bc) in b.chars().enumerate() {
            let temp = dp[j + 1];
            let cost = usize::from(ac != bc);
            dp[j + 1] = (dp[j + 1] + 1).min(dp[j] + 1).min(prev + cost);
            prev = temp;
            min_row = min_row.min(dp[j + 1]);
        }

        if min_row > max {
            return false;
        }
    }

    dp[b_len] <= max
}

/// Spelling corrections for a query
///
/// Misspelled words are replaced through the table and joined back into one
/// suggestion. Without a table hit, a longer query is matched against the
/// common words at edit distance 1.
pub fn suggest_corrections(query: &str, config: &SuggestionConfig) -> Vec<String> {
    let lowered = query.trim().to_lowercase();
    let mut corrections = Vec::new();

    let mut any_hit = false;
    let corrected: Vec<&str> = lowered
        .split_whitespace()
        .map(|word| match config.misspellings.get(word) {
            Some(fix) => {
                any_hit = true;
                fix.as_str()
            }
            None => word,
        })
        .collect();

    if any_hit {
        corrections.push(corrected.join(" "));
    } else if lowered.chars().count() > MIN_FUZZY_QUERY_LENGTH {
        if let Some(word) = config.common_words.iter().find(|word| {
            let word = word.to_lowercase();
            word != lowered && levenshtein_within(&lowered, &word, 1)
        }) {
            corrections.push(word.clone());
        }
    }

    corrections.truncate(MAX_CORRECTIONS);
    corrections
}

/// Canned searches containing the query, from the module's list
pub fn popular_searches(
    query: &str,
    module: Option<Module>,
    config: &SuggestionConfig,
) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    config
        .popular
        .for_module(module)
        .iter()
        .filter(|entry| entry.to_lowercase().contains(&needle))
        .take(MAX_POPULAR)
        .cloned()
        .collect()
}

/// Rank candidate titles as completions for a query
///
/// Keeps titles containing the query (case-insensitive), ordered exact match
/// first, then prefix, then leftmost position, then shortest. Duplicates that
/// differ only by case are dropped, keeping the best-ranked spelling.
pub fn rank_completions(query: &str, titles: &[String]) -> Vec<String> {
    let needle = query.trim().to_lowercase();

    let mut candidates: Vec<(bool, bool, usize, usize, &String)> = titles
        .iter()
        .filter_map(|title| {
            let lowered = title.to_lowercase();
            let position = lowered.find(&needle)?;
            Some((
                lowered != needle,
                position != 0,
                lowered[..position].chars().count(),
                title.chars().count(),
                title,
            ))
        })
        .collect();
    candidates.sort_by(|a, b| (a.0, a.1, a.2, a.3).cmp(&(b.0, b.1, b.2, b.3)));

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|(.., title)| seen.insert(title.to_lowercase()))
        .take(MAX_COMPLETIONS)
        .map(|(.., title)| title.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(values: &[&str]) -> Vec<String> {
        strings(values)
    }

    #[test]
    fn test_levenshtein_within() {
        assert!(levenshtein_within("redstone", "redstone", 0));
        assert!(levenshtein_within("farn", "farm", 1));
        assert!(levenshtein_within("serer", "server", 1));
        assert!(levenshtein_within("servers", "server", 1));
        assert!(!levenshtein_within("srvr", "server", 1));
        assert!(!levenshtein_within("abcd", "wxyz", 1));
        assert!(levenshtein_within("über", "uber", 1));
    }

    #[test]
    fn test_table_correction_joins_words() {
        let config = SuggestionConfig::default();
        assert_eq!(suggest_corrections("mincraft", &config), vec!["minecraft"]);
        assert_eq!(
            suggest_corrections("Redstine farm", &config),
            vec!["redstone farm"]
        );
    }

    #[test]
    fn test_edit_distance_correction() {
        let config = SuggestionConfig::default();
        assert_eq!(suggest_corrections("portl", &config), vec!["portal"]);
        assert_eq!(suggest_corrections("biomes", &config), vec!["biome"]);
    }

    #[test]
    fn test_edit_distance_needs_longer_query() {
        let config = SuggestionConfig::default();
        // "fam" is one edit from "farm" but too short to try
        assert!(suggest_corrections("fam", &config).is_empty());
    }

    #[test]
    fn test_exact_common_word_is_not_its_own_correction() {
        let config = SuggestionConfig::default();
        assert!(!suggest_corrections("redstone", &config).contains(&"redstone".to_string()));
    }

    #[test]
    fn test_custom_word_lists() {
        let config = SuggestionConfig {
            misspellings: [("teh".to_string(), "the".to_string())].into_iter().collect(),
            common_words: vec!["blockhub".to_string()],
            popular: PopularSearches::default(),
        };
        assert_eq!(suggest_corrections("teh end", &config), vec!["the end"]);
        assert_eq!(suggest_corrections("blokhub", &config), vec!["blockhub"]);
        assert!(suggest_corrections("mincraft", &config).is_empty());
    }

    #[test]
    fn test_popular_per_module() {
        let config = SuggestionConfig::default();
        assert_eq!(
            popular_searches("redstone", None, &config),
            vec!["redstone tutorial"]
        );
        assert_eq!(
            popular_searches("RED", Some(Module::Wiki), &config),
            vec!["redstone basics"]
        );
        assert!(popular_searches("redstone", Some(Module::Blog), &config).is_empty());
        assert_eq!(popular_searches("e", Some(Module::Forum), &config).len(), 3);
    }

    #[test]
    fn test_rank_completions_order() {
        let candidates = titles(&[
            "Advanced farm layouts",
            "Farm",
            "Farming 101",
            "My farm",
            "Farm animals and you",
            "Unrelated",
        ]);
        assert_eq!(
            rank_completions("farm", &candidates),
            vec![
                "Farm",
                "Farming 101",
                "Farm animals and you",
                "My farm",
                "Advanced farm layouts"
            ]
        );
    }

    #[test]
    fn test_rank_completions_dedup_and_cap() {
        let candidates = titles(&[
            "Redstone clock",
            "REDSTONE CLOCK",
            "redstone a",
            "redstone b",
            "redstone c",
            "redstone d",
            "redstone e",
        ]);
        let ranked = rank_completions("redstone", &candidates);
        assert_eq!(ranked.len(), 5);
        let lowered: HashSet<_> = ranked.iter().map(|t| t.to_lowercase()).collect();
        assert_eq!(lowered.len(), 5);
    }

    #[test]
    fn test_config_from_partial_yaml_keeps_defaults() {
        let config: SuggestionConfig = serde_yaml::from_str("common_words: [alpha]").unwrap();
        assert_eq!(config.common_words, vec!["alpha"]);
        assert_eq!(config.misspellings.get("mincraft").unwrap(), "minecraft");
        assert!(!config.popular.general.is_empty());
    }
}
