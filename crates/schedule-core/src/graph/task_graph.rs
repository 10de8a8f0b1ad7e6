use super::GraphError;
use crate::task::{Dependency, Relation, Task, TaskId, WorkType};
use crate::task_validation;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashMap};

/// Edge payload: the relation and lag from predecessor to successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub relation: Relation,
    pub lag: i64,
}

/// Immutable, validated precedence graph.
///
/// Tasks live in a flat arena; node `i` of the petgraph graph is `tasks[i]`,
/// so every link is an index pair rather than a reference.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    graph: DiGraph<usize, Link>,
    tasks: Vec<Task>,
    id_to_index: HashMap<TaskId, NodeIndex>,
    order: Vec<NodeIndex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl TaskGraph {
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, GraphError> {
        Self::build(tasks, Vec::<Dependency>::new())
    }

    /// Validate `tasks` plus the extra `edges` and freeze them into a graph
    /// with a deterministic topological order.
    pub fn build<E>(tasks: Vec<Task>, edges: E) -> Result<Self, GraphError>
    where
        E: IntoIterator<Item = Dependency>,
    {
        task_validation::validate_task_collection(&tasks)?;

        let mut graph: DiGraph<usize, Link> = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::with_capacity(tasks.len());

        for (idx, task) in tasks.iter().enumerate() {
            let node_ix = graph.add_node(idx);
            id_to_index.insert(task.id.clone(), node_ix);
        }

        // Edges: pred -> task
        for task in &tasks {
            let v = id_to_index[&task.id];
            for pred in &task.predecessors {
                let u = id_to_index.get(&pred.id).copied().ok_or_else(|| {
                    GraphError::UnknownPredecessor {
                        task_id: task.id.clone(),
                        predecessor_id: pred.id.clone(),
                    }
                })?;
                graph.add_edge(
                    u,
                    v,
                    Link {
                        relation: pred.relation,
                        lag: pred.lag,
                    },
                );
            }
        }

        for dep in edges {
            let v = id_to_index
                .get(&dep.to)
                .copied()
                .ok_or_else(|| GraphError::UnknownTask {
                    task_id: dep.to.clone(),
                })?;
            let u = id_to_index.get(&dep.from).copied().ok_or_else(|| {
                GraphError::UnknownPredecessor {
                    task_id: dep.to.clone(),
                    predecessor_id: dep.from.clone(),
                }
            })?;
            graph.add_edge(
                u,
                v,
                Link {
                    relation: dep.relation,
                    lag: dep.lag,
                },
            );
        }

        if let Some(path) = Self::find_cycle(&graph, &tasks) {
            tracing::warn!(cycle = ?path, "rejecting task graph with dependency cycle");
            return Err(GraphError::Cycle { path });
        }

        let order = Self::topological_order_by_id(&graph, &tasks);
        tracing::debug!(
            tasks = tasks.len(),
            links = graph.edge_count(),
            "task graph built"
        );

        Ok(Self {
            graph,
            tasks,
            id_to_index,
            order,
        })
    }

    /// Neighbours of `node` in the given direction, ordered by task id.
    fn sorted_neighbors(
        graph: &DiGraph<usize, Link>,
        tasks: &[Task],
        node: NodeIndex,
        direction: Direction,
    ) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = graph.neighbors_directed(node, direction).collect();
        neighbors.sort_by(|a, b| tasks[a.index()].id.cmp(&tasks[b.index()].id));
        neighbors.dedup();
        neighbors
    }

    /// Depth-first search with an explicit recursion stack. Returns the cycle
    /// as a closed id path, e.g. `[A, B, A]`.
    fn find_cycle(graph: &DiGraph<usize, Link>, tasks: &[Task]) -> Option<Vec<TaskId>> {
        let mut marks = vec![Mark::Unvisited; tasks.len()];
        let mut roots: Vec<NodeIndex> = graph.node_indices().collect();
        roots.sort_by(|a, b| tasks[a.index()].id.cmp(&tasks[b.index()].id));

        for root in roots {
            if marks[root.index()] != Mark::Unvisited {
                continue;
            }
            // (node, successors, next successor position)
            let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> = Vec::new();
            marks[root.index()] = Mark::OnStack;
            stack.push((
                root,
                Self::sorted_neighbors(graph, tasks, root, Direction::Outgoing),
                0,
            ));

            while let Some((node, successors, pos)) = stack.last_mut() {
                let Some(&next) = successors.get(*pos) else {
                    marks[node.index()] = Mark::Done;
                    stack.pop();
                    continue;
                };
                *pos += 1;

                match marks[next.index()] {
                    Mark::Done => {}
                    Mark::OnStack => {
                        let start = stack
                            .iter()
                            .position(|(n, _, _)| *n == next)
                            .unwrap_or(0);
                        let mut path: Vec<TaskId> = stack[start..]
                            .iter()
                            .map(|(n, _, _)| tasks[n.index()].id.clone())
                            .collect();
                        path.push(tasks[next.index()].id.clone());
                        return Some(path);
                    }
                    Mark::Unvisited => {
                        marks[next.index()] = Mark::OnStack;
                        let succ = Self::sorted_neighbors(graph, tasks, next, Direction::Outgoing);
                        stack.push((next, succ, 0));
                    }
                }
            }
        }
        None
    }

    /// Kahn's algorithm with the ready set ordered by task id.
    fn topological_order_by_id(graph: &DiGraph<usize, Link>, tasks: &[Task]) -> Vec<NodeIndex> {
        let mut in_degree: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.edges_directed(n, Direction::Incoming).count())
            .collect();

        let mut ready: BTreeSet<(&str, NodeIndex)> = graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .map(|n| (tasks[n.index()].id.as_str(), n))
            .collect();

        let mut order = Vec::with_capacity(tasks.len());
        while let Some((_, node)) = ready.pop_first() {
            order.push(node);
            for edge in graph.edges_directed(node, Direction::Outgoing) {
                let succ = edge.target();
                in_degree[succ.index()] -= 1;
                if in_degree[succ.index()] == 0 {
                    ready.insert((tasks[succ.index()].id.as_str(), succ));
                }
            }
        }
        order
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in input order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.index_of(id).map(|idx| &self.tasks[idx])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).map(|n| n.index())
    }

    /// Arena indices in topological order (ties broken by id ascending).
    pub fn topological_indices(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.order.iter().map(|n| n.index())
    }

    pub fn topological_order(&self) -> Vec<&Task> {
        self.topological_indices().map(|idx| &self.tasks[idx]).collect()
    }

    /// `(predecessor index, link)` pairs for the task at `idx`.
    pub fn incoming(&self, idx: usize) -> impl Iterator<Item = (usize, Link)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(idx), Direction::Incoming)
            .map(|edge| (edge.source().index(), *edge.weight()))
    }

    /// `(successor index, link)` pairs for the task at `idx`.
    pub fn outgoing(&self, idx: usize) -> impl Iterator<Item = (usize, Link)> + '_ {
        self.graph
            .edges_directed(NodeIndex::new(idx), Direction::Outgoing)
            .map(|edge| (edge.target().index(), *edge.weight()))
    }

    pub fn is_source(&self, idx: usize) -> bool {
        self.incoming(idx).next().is_none()
    }

    pub fn is_sink(&self, idx: usize) -> bool {
        self.outgoing(idx).next().is_none()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Distinct work types present in the graph.
    pub fn work_types(&self) -> BTreeSet<WorkType> {
        self.tasks.iter().map(|t| t.work_type).collect()
    }
}
