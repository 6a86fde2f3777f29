//! Named merge strategies and the process-wide strategy registry.

pub(crate) mod one_sided;
pub(crate) mod simple_two_way;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use gitcore_odb::ObjectStore;

use crate::merger::Merger;
use crate::MergeError;

/// How a strategy's merger computes its result.
///
/// The variant set is closed: strategies differ by configuration, not by
/// open-ended behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergerKind {
    /// Pick the tree of the tip at the given index, ignoring all others.
    OneSided(usize),
    /// In-core three-way tree merge of exactly two tips.
    SimpleTwoWay,
}

/// A named merge strategy.
///
/// Strategies are cheap handles; [`new_merger`](MergeStrategy::new_merger)
/// creates the stateful worker for one merge invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStrategy {
    name: &'static str,
    kind: MergerKind,
}

/// Registry of strategies addressable by name, seeded with the built-ins.
static REGISTRY: OnceLock<RwLock<HashMap<String, MergeStrategy>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, MergeStrategy>> {
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        for strategy in [
            MergeStrategy::OURS,
            MergeStrategy::THEIRS,
            MergeStrategy::SIMPLE_TWO_WAY_IN_CORE,
        ] {
            map.insert(strategy.name.to_string(), strategy);
        }
        RwLock::new(map)
    })
}

impl MergeStrategy {
    /// Resolve by taking our tree, discarding everything the other tips did.
    pub const OURS: MergeStrategy = MergeStrategy::one_sided("ours", 0);

    /// Resolve by taking the first other tip's tree, discarding our changes.
    pub const THEIRS: MergeStrategy = MergeStrategy::one_sided("theirs", 1);

    /// Three-way in-core tree merge of two tips over their common ancestor.
    pub const SIMPLE_TWO_WAY_IN_CORE: MergeStrategy = MergeStrategy {
        name: "simple-two-way-in-core",
        kind: MergerKind::SimpleTwoWay,
    };

    /// A strategy taking the tree of the tip at `index` verbatim, under the
    /// given name.
    pub const fn one_sided(name: &'static str, index: usize) -> MergeStrategy {
        MergeStrategy {
            name,
            kind: MergerKind::OneSided(index),
        }
    }

    /// This strategy's behavior under a different name, for registering an
    /// alias.
    pub const fn renamed(&self, name: &'static str) -> MergeStrategy {
        MergeStrategy {
            name,
            kind: self.kind,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a registered strategy by name.
    pub fn get(name: &str) -> Option<MergeStrategy> {
        registry()
            .read()
            .expect("lock poisoned")
            .get(name)
            .copied()
    }

    /// Look up a registered strategy by name, failing with
    /// [`MergeError::UnknownStrategy`] when none matches.
    pub fn lookup(name: &str) -> Result<MergeStrategy, MergeError> {
        Self::get(name).ok_or_else(|| MergeError::UnknownStrategy(name.to_string()))
    }

    /// Register a strategy under its name.
    ///
    /// Fails with [`MergeError::DuplicateStrategy`] if the name is taken,
    /// including by a built-in.
    pub fn register(strategy: MergeStrategy) -> Result<(), MergeError> {
        let mut map = registry().write().expect("lock poisoned");
        if map.contains_key(strategy.name) {
            return Err(MergeError::DuplicateStrategy(strategy.name.to_string()));
        }
        map.insert(strategy.name.to_string(), strategy);
        Ok(())
    }

    /// All registered strategies, sorted by name.
    pub fn all() -> Vec<MergeStrategy> {
        let map = registry().read().expect("lock poisoned");
        let mut strategies: Vec<MergeStrategy> = map.values().copied().collect();
        strategies.sort_by_key(|s| s.name);
        strategies
    }

    /// Create a merger executing this strategy against the given store.
    pub fn new_merger(&self, odb: Arc<dyn ObjectStore>) -> Merger {
        Merger::new(odb, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        assert_eq!(MergeStrategy::get("ours"), Some(MergeStrategy::OURS));
        assert_eq!(MergeStrategy::get("theirs"), Some(MergeStrategy::THEIRS));
        assert_eq!(
            MergeStrategy::get("simple-two-way-in-core"),
            Some(MergeStrategy::SIMPLE_TWO_WAY_IN_CORE)
        );
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(MergeStrategy::get("recursive"), None);
        assert!(matches!(
            MergeStrategy::lookup("recursive"),
            Err(MergeError::UnknownStrategy(name)) if name == "recursive"
        ));
    }

    #[test]
    fn custom_strategies_can_be_registered() {
        let alias = MergeStrategy::SIMPLE_TWO_WAY_IN_CORE.renamed("resolve");
        MergeStrategy::register(alias).unwrap();
        assert_eq!(MergeStrategy::get("resolve"), Some(alias));

        let third = MergeStrategy::one_sided("take-third", 2);
        MergeStrategy::register(third).unwrap();
        assert_eq!(MergeStrategy::lookup("take-third").unwrap(), third);
        assert_eq!(third.name(), "take-third");
    }

    #[test]
    fn reregistering_a_builtin_fails() {
        let err = MergeStrategy::register(MergeStrategy::OURS).unwrap_err();
        assert!(matches!(err, MergeError::DuplicateStrategy(name) if name == "ours"));
    }

    #[test]
    fn all_is_sorted_by_name() {
        let names: Vec<_> = MergeStrategy::all()
            .iter()
            .map(|s| s.name())
            .collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"ours"));
    }
}
