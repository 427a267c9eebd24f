//! # Source Weights
//!
//! Maps a collector source key (e.g. `"caixin"`, `"people"`) to an integer
//! priority tier. Media outlets rank above local-government portals.
//!
//! - Loaded as the `[source_weights]` table of the selection config.
//! - Lookup is exact on the stable source key; unknown sources get `default_weight`.
//! - Aliases map alternative keys (renamed collectors, mirrors) to a canonical key.

use serde::Deserialize;
use std::collections::HashMap;

/// Source → weight table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    /// Weight for sources missing from `weights`.
    pub default_weight: i32,
    /// Explicit weights for canonical source keys.
    pub weights: HashMap<String, i32>,
    /// Aliases mapping non-canonical keys → canonical keys.
    pub aliases: HashMap<String, String>,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl SourceWeights {
    /// Weight for a source key.
    ///
    /// Steps:
    /// 1. Alias lookup → canonical → weight.
    /// 2. Exact weight match.
    /// 3. Default weight.
    pub fn weight_for(&self, source: &str) -> i32 {
        if let Some(canon) = self.aliases.get(source) {
            if let Some(&w) = self.weights.get(canon) {
                return w;
            }
        }

        if let Some(&w) = self.weights.get(source) {
            return w;
        }

        self.default_weight
    }

    /// Built-in tiers for the collected outlets.
    pub fn default_seed() -> Self {
        let mut weights = HashMap::new();
        for (k, v) in [
            ("36kr", 10),
            ("caixin", 10),
            ("people", 9),
            ("ce", 9),
            ("stcn", 9),
            ("xinhua", 8),
            ("huxiu", 8),
            ("beijing_gov", 3),
            ("shanghai_gov", 3),
            ("shenzhen_gov", 3),
        ] {
            weights.insert(k.to_string(), v);
        }

        Self {
            default_weight: 5,
            weights,
            aliases: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SourceWeights {
        SourceWeights::default_seed()
    }

    #[test]
    fn exact_match() {
        let c = cfg();
        assert_eq!(c.weight_for("caixin"), 10);
        assert_eq!(c.weight_for("xinhua"), 8);
        assert_eq!(c.weight_for("shanghai_gov"), 3);
    }

    #[test]
    fn default_weight_used() {
        let c = cfg();
        assert_eq!(c.weight_for("TotallyUnknown"), 5);
        assert_eq!(c.weight_for(""), 5);
    }

    #[test]
    fn no_substring_or_case_folding() {
        let c = cfg();
        // `xinhua_finance` is its own collector, not `xinhua`.
        assert_eq!(c.weight_for("xinhua_finance"), 5);
        assert_eq!(c.weight_for("Caixin"), 5);
    }

    #[test]
    fn alias_resolves_to_canonical() {
        let mut c = cfg();
        c.aliases.insert("caixin_global".into(), "caixin".into());
        assert_eq!(c.weight_for("caixin_global"), 10);

        // Dangling alias falls through to default.
        c.aliases.insert("ghost".into(), "nowhere".into());
        assert_eq!(c.weight_for("ghost"), 5);
    }
}
