//! Task dependency graph ordering.
//!
//! Depth-first topological sort with three-color marking. Deterministic for a
//! fixed task sequence: tasks are visited in declaration order and appended in
//! post-order, so every task lands after all of its dependencies.

use std::collections::HashMap;

use super::project::Task;

/// A dependency cycle was found.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Circular dependency detected involving task {task_id}")]
pub struct CycleError {
    /// The task at which the cycle was detected
    pub task_id: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Produce a topological ordering of `tasks`.
///
/// Dependency ids that name no task in the set are ignored here (they still
/// gate executability later). Duplicate ids resolve to the first occurrence.
pub fn topological_order(tasks: &[Task]) -> Result<Vec<&Task>, CycleError> {
    let mut by_id: HashMap<&str, &Task> = HashMap::new();
    for task in tasks {
        by_id.entry(task.id.as_str()).or_insert(task);
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut sorted = Vec::with_capacity(tasks.len());

    for task in tasks {
        // Skip duplicate entries; the first occurrence was already visited.
        if std::ptr::eq(by_id[task.id.as_str()], task) {
            visit(task, &by_id, &mut marks, &mut sorted)?;
        }
    }

    Ok(sorted)
}

fn visit<'a>(
    task: &'a Task,
    by_id: &HashMap<&str, &'a Task>,
    marks: &mut HashMap<&'a str, Mark>,
    sorted: &mut Vec<&'a Task>,
) -> Result<(), CycleError> {
    match marks.get(task.id.as_str()).copied().unwrap_or(Mark::Unvisited) {
        Mark::Done => return Ok(()),
        Mark::InProgress => return Err(CycleError { task_id: task.id.clone() }),
        Mark::Unvisited => {}
    }

    marks.insert(task.id.as_str(), Mark::InProgress);

    for dep_id in &task.dependencies {
        if let Some(dep) = by_id.get(dep_id.as_str()) {
            visit(dep, by_id, marks, sorted)?;
        }
    }

    marks.insert(task.id.as_str(), Mark::Done);
    sorted.push(task);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityKey;

    fn task(id: &str, deps: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            capability: CapabilityKey::ProjectManager,
            dependencies: deps.iter().map(|d| (*d).to_string()).collect(),
            estimated_hours: 1.0,
        }
    }

    fn ids(ordered: &[&Task]) -> Vec<String> {
        ordered.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_chain_orders_dependencies_first() {
        let tasks = vec![task("t3", &["t1", "t2"]), task("t2", &["t1"]), task("t1", &[])];
        let ordered = topological_order(&tasks).unwrap();
        assert_eq!(ids(&ordered), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_declared_order_scenario() {
        let tasks = vec![task("t1", &[]), task("t2", &["t1"]), task("t3", &["t1", "t2"])];
        let ordered = topological_order(&tasks).unwrap();
        assert_eq!(ids(&ordered), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_every_task_after_its_dependencies() {
        let tasks = vec![
            task("a", &["c"]),
            task("b", &[]),
            task("c", &["b"]),
            task("d", &["a", "b"]),
        ];
        let ordered = topological_order(&tasks).unwrap();
        let position: std::collections::HashMap<_, _> =
            ordered.iter().enumerate().map(|(i, t)| (t.id.as_str(), i)).collect();

        for t in &tasks {
            for dep in &t.dependencies {
                assert!(position[dep.as_str()] < position[t.id.as_str()]);
            }
        }
    }

    #[test]
    fn test_cycle_is_detected_with_task_id() {
        let tasks = vec![task("t1", &["t2"]), task("t2", &["t1"])];
        let err = topological_order(&tasks).unwrap_err();
        assert!(err.task_id == "t1" || err.task_id == "t2");
        assert!(err.to_string().contains("Circular dependency"));
    }

    #[test]
    fn test_self_cycle_is_detected() {
        let tasks = vec![task("t1", &["t1"])];
        let err = topological_order(&tasks).unwrap_err();
        assert_eq!(err.task_id, "t1");
    }

    #[test]
    fn test_missing_dependency_ids_are_ignored() {
        let tasks = vec![task("t1", &["ghost"]), task("t2", &["t1"])];
        let ordered = topological_order(&tasks).unwrap();
        assert_eq!(ids(&ordered), vec!["t1", "t2"]);
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let tasks = vec![task("x", &[]), task("y", &[]), task("z", &[])];
        let first = ids(&topological_order(&tasks).unwrap());
        for _ in 0..10 {
            assert_eq!(ids(&topological_order(&tasks).unwrap()), first);
        }
        assert_eq!(first, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_duplicate_ids_first_occurrence_wins() {
        let tasks = vec![task("t1", &[]), task("t1", &["t1"]), task("t2", &["t1"])];
        let ordered = topological_order(&tasks).unwrap();
        assert_eq!(ids(&ordered), vec!["t1", "t2"]);
    }
}
