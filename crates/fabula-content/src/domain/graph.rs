//! Prerequisite graph ordering.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use fabula_core::id::StoryId;

/// Orders stories so that every story comes after its prerequisites
/// (Kahn's algorithm). Prerequisites that are not keys of `graph` are
/// ignored.
///
/// # Errors
///
/// Returns the ids that could not be ordered, sorted, when the graph has a
/// cycle. The list contains every story on a cycle and every story that
/// depends on one.
pub fn topological_order(
    graph: &BTreeMap<StoryId, BTreeSet<StoryId>>,
) -> Result<Vec<StoryId>, Vec<StoryId>> {
    let mut pending: BTreeMap<&StoryId, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&StoryId, Vec<&StoryId>> = BTreeMap::new();

    for (story, prerequisites) in graph {
        let known = prerequisites.iter().filter(|p| graph.contains_key(*p));
        let mut count = 0;
        for prerequisite in known {
            dependents.entry(prerequisite).or_default().push(story);
            count += 1;
        }
        pending.insert(story, count);
    }

    let mut ready: VecDeque<&StoryId> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(story, _)| *story)
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(story) = ready.pop_front() {
        order.push(story.clone());
        for dependent in dependents.get(story).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push_back(*dependent);
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        Err(pending
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(story, _)| story.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> BTreeMap<StoryId, BTreeSet<StoryId>> {
        edges
            .iter()
            .map(|(story, prerequisites)| {
                (
                    StoryId::new(*story),
                    prerequisites.iter().map(|p| StoryId::new(*p)).collect(),
                )
            })
            .collect()
    }

    fn ids(names: &[&str]) -> Vec<StoryId> {
        names.iter().map(|n| StoryId::new(*n)).collect()
    }

    #[test]
    fn test_orders_prerequisites_first() {
        let g = graph(&[("market", &["greetings"]), ("greetings", &[]), ("travel", &["market"])]);

        let order = topological_order(&g).unwrap();

        assert_eq!(order, ids(&["greetings", "market", "travel"]));
    }

    #[test]
    fn test_ignores_prerequisites_outside_the_graph() {
        let g = graph(&[("market", &["retired"])]);

        assert_eq!(topological_order(&g).unwrap(), ids(&["market"]));
    }

    #[test]
    fn test_reports_cycle_and_its_dependents() {
        let g = graph(&[
            ("a", &["b"]),
            ("b", &["a"]),
            ("c", &["a"]),
            ("root", &[]),
        ]);

        let stuck = topological_order(&g).unwrap_err();

        assert_eq!(stuck, ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_self_prerequisite_is_a_cycle() {
        let g = graph(&[("a", &["a"])]);

        assert_eq!(topological_order(&g).unwrap_err(), ids(&["a"]));
    }

    #[test]
    fn test_empty_graph_orders_nothing() {
        assert!(topological_order(&BTreeMap::new()).unwrap().is_empty());
    }
}
