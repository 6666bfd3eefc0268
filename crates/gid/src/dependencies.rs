// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Dependency ordering for named assets.
//!
//! [`insert`] is the placement used by the asset registries: a key goes
//! right after the last of its dependencies already in the list, or at the
//! front when none are present. It is a single greedy pass, not a sort.
//! Dependencies registered after their dependents are not moved, so the
//! resulting order can violate transitive constraints, and cycles are not
//! detected.
//!
//! [`topological_order`] is the stricter alternative: a full sort over the
//! declared dependencies that reports cycles.

use crate::error::{GidError, Result};
use std::collections::{HashMap, HashSet};

/// Inserts `key` immediately after the last-positioned of its dependencies.
///
/// Dependencies missing from `ordered` are ignored. With no dependency
/// present, `key` is inserted at the front. The caller is responsible for
/// removing a previous occurrence of `key` (see [`reinsert`]).
pub fn insert<S: AsRef<str>>(ordered: &mut Vec<String>, key: &str, dependencies: &[S]) {
    let last = dependencies
        .iter()
        .filter_map(|dep| ordered.iter().position(|k| k == dep.as_ref()))
        .max();

    match last {
        Some(index) => ordered.insert(index + 1, key.to_string()),
        None => ordered.insert(0, key.to_string()),
    }
}

/// Removes any previous occurrence of `key`, then [`insert`]s it.
pub fn reinsert<S: AsRef<str>>(ordered: &mut Vec<String>, key: &str, dependencies: &[S]) {
    if let Some(index) = ordered.iter().position(|k| k == key) {
        ordered.remove(index);
    }
    insert(ordered, key, dependencies);
}

/// Sorts `keys` so every key comes after all of its declared dependencies.
///
/// Ties keep the order of `keys`. Dependencies that are not in `keys` are
/// ignored.
///
/// # Errors
///
/// Returns [`GidError::DependencyCycle`] when the dependencies form a cycle.
pub fn topological_order(
    keys: &[String],
    deps: &HashMap<String, Vec<String>>,
) -> Result<Vec<String>> {
    let known: HashSet<&str> = keys.iter().map(String::as_str).collect();

    // Count how many known dependencies each key waits for
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for key in keys {
        let waits_for: HashSet<&str> = deps
            .get(key)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(|dep| known.contains(dep) && *dep != key.as_str())
            .collect();
        in_degree.insert(key.as_str(), waits_for.len());
        for dep in waits_for {
            dependents.entry(dep).or_default().push(key.as_str());
        }
    }

    let mut sorted = Vec::with_capacity(keys.len());
    let mut visited: HashSet<&str> = HashSet::new();

    // Repeatedly take the first ready key in input order
    while sorted.len() < keys.len() {
        let ready = keys
            .iter()
            .map(String::as_str)
            .find(|key| !visited.contains(key) && in_degree.get(key) == Some(&0));

        let Some(key) = ready else {
            let stuck: Vec<&str> = keys
                .iter()
                .map(String::as_str)
                .filter(|key| !visited.contains(key))
                .collect();
            return Err(GidError::DependencyCycle(stuck.join(", ")));
        };

        visited.insert(key);
        sorted.push(key.to_string());

        if let Some(waiting) = dependents.get(key) {
            for dependent in waiting {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                }
            }
        }
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_insert_after_dependency() {
        let mut ordered = list(&["A", "B"]);
        insert(&mut ordered, "C", &["B"]);
        assert_eq!(ordered, list(&["A", "B", "C"]));

        insert(&mut ordered, "D", &["missing"]);
        assert_eq!(ordered, list(&["D", "A", "B", "C"]));
    }

    #[test]
    fn test_insert_without_dependencies_goes_first() {
        let mut ordered = list(&["A"]);
        insert::<&str>(&mut ordered, "B", &[]);
        assert_eq!(ordered, list(&["B", "A"]));
    }

    #[test]
    fn test_insert_uses_last_dependency() {
        let mut ordered = list(&["A", "B", "C"]);
        insert(&mut ordered, "X", &["C", "A"]);
        assert_eq!(ordered, list(&["A", "B", "C", "X"]));

        insert(&mut ordered, "Y", &["A"]);
        assert_eq!(ordered, list(&["A", "Y", "B", "C", "X"]));
    }

    #[test]
    fn test_reinsert_moves_without_duplicating() {
        let mut ordered = list(&["jquery", "jquery-plugin", "app"]);
        reinsert(&mut ordered, "jquery-plugin", &["app"]);
        assert_eq!(ordered, list(&["jquery", "app", "jquery-plugin"]));

        reinsert::<&str>(&mut ordered, "jquery-plugin", &[]);
        assert_eq!(ordered, list(&["jquery-plugin", "jquery", "app"]));
    }

    #[test]
    fn test_greedy_order_is_not_transitive() {
        // "app" needs "lib", but "lib" arrives later and lands after "core"
        let mut ordered = list(&["core"]);
        insert(&mut ordered, "app", &["lib"]);
        insert(&mut ordered, "lib", &["core"]);
        assert_eq!(ordered, list(&["app", "core", "lib"]));
    }

    #[test]
    fn test_topological_order() {
        let keys = list(&["app", "plugin", "lib"]);
        let mut deps = HashMap::new();
        deps.insert("app".to_string(), list(&["plugin", "lib"]));
        deps.insert("plugin".to_string(), list(&["lib"]));

        let sorted = topological_order(&keys, &deps).unwrap();
        assert_eq!(sorted, list(&["lib", "plugin", "app"]));
    }

    #[test]
    fn test_topological_order_keeps_ties_stable() {
        let keys = list(&["b", "a", "c"]);
        let deps = HashMap::new();
        assert_eq!(topological_order(&keys, &deps).unwrap(), keys);
    }

    #[test]
    fn test_topological_order_cycle() {
        let keys = list(&["A", "B", "C"]);
        let mut deps = HashMap::new();
        deps.insert("A".to_string(), list(&["B"]));
        deps.insert("B".to_string(), list(&["C"]));
        deps.insert("C".to_string(), list(&["A"]));

        let result = topological_order(&keys, &deps);
        assert!(matches!(result, Err(GidError::DependencyCycle(_))));
    }
}
