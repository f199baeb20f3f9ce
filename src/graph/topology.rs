use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Error type for topology operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError<K: Debug + Clone> {
    /// Cycle detected in the graph
    CycleDetected { path: Vec<K> },
}

impl<K: Debug + Clone> std::fmt::Display for TopologyError<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::CycleDetected { path } => {
                write!(f, "Cycle detected: ")?;
                for (i, node) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "{:?}", node)?;
                }
                Ok(())
            }
        }
    }
}

impl<K: Debug + Clone> std::error::Error for TopologyError<K> {}

/// Dependency order of everything reachable from `root`.
///
/// # Arguments
/// * `root` - The node whose inputs are walked
/// * `get_dependencies` - Returns the nodes feeding a node, in input order
///
/// # Returns
/// A post-order depth-first walk: every node appears after all of its dependencies,
/// `root` appears last, and nodes that `root` does not depend on are absent.
pub fn dependency_order<K>(
    root: K,
    get_dependencies: impl Fn(&K) -> Vec<K>,
) -> Result<Vec<K>, TopologyError<K>>
where
    K: Hash + Eq + Clone + Debug,
{
    let mut sorted = Vec::new();
    let mut visited = HashSet::new();
    let mut recursion_stack = HashSet::new();
    let mut path = Vec::new();

    // Each frame is a node on the current path, its dependencies and the next one to visit.
    let mut frames: Vec<(K, Vec<K>, usize)> = Vec::new();

    recursion_stack.insert(root.clone());
    path.push(root.clone());
    let dependencies = get_dependencies(&root);
    frames.push((root, dependencies, 0));

    while let Some((node, dependencies, next)) = frames.last_mut() {
        let Some(dependency) = dependencies.get(*next).cloned() else {
            path.pop();
            recursion_stack.remove(&*node);
            visited.insert(node.clone());
            sorted.push(node.clone());
            frames.pop();
            continue;
        };
        *next += 1;

        if recursion_stack.contains(&dependency) {
            let start = path.iter().position(|n| *n == dependency).unwrap_or(0);
            return Err(TopologyError::CycleDetected {
                path: path[start..].to_vec(),
            });
        }

        if visited.contains(&dependency) {
            continue;
        }

        recursion_stack.insert(dependency.clone());
        path.push(dependency.clone());
        let dependencies = get_dependencies(&dependency);
        frames.push((dependency, dependencies, 0));
    }

    Ok(sorted)
}
