// ABOUTME: PipelineDefinition and its builder - agents plus task nodes, validated
// ABOUTME: once (ids, references, acyclicity) and immutable afterwards.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::TaskNode;
use super::graph;
use crate::agent::AgentProfile;
use crate::error::PipelineError;

#[derive(Debug)]
struct Inner {
    agents: Vec<AgentProfile>,
    agent_index: HashMap<String, usize>,
    nodes: Vec<TaskNode>,
    order: Vec<usize>,
}

/// A validated pipeline: every node names a declared agent, every
/// dependency names a declared node, and the dependencies form a DAG.
///
/// Cloning is cheap; clones share the same definition.
#[derive(Debug, Clone)]
pub struct PipelineDefinition {
    inner: Arc<Inner>,
}

impl PipelineDefinition {
    /// Start building a definition.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Agents in declaration order.
    pub fn agents(&self) -> &[AgentProfile] {
        &self.inner.agents
    }

    /// Look up an agent by id.
    pub fn agent(&self, id: &str) -> Option<&AgentProfile> {
        self.inner
            .agent_index
            .get(id)
            .map(|&i| &self.inner.agents[i])
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[TaskNode] {
        &self.inner.nodes
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&TaskNode> {
        self.inner.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes in execution order: dependencies first, otherwise declaration order.
    pub fn execution_order(&self) -> impl Iterator<Item = &TaskNode> {
        self.inner.order.iter().map(|&i| &self.inner.nodes[i])
    }

    /// The node whose result is the run's output.
    pub fn final_node(&self) -> Option<&TaskNode> {
        self.inner.order.last().map(|&i| &self.inner.nodes[i])
    }

    /// Distinct agents referenced by at least one node, in execution order.
    pub fn referenced_agents(&self) -> Vec<&AgentProfile> {
        let mut seen = HashSet::new();
        self.execution_order()
            .filter(|n| seen.insert(n.agent_ref.as_str()))
            .filter_map(|n| self.agent(&n.agent_ref))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.nodes.is_empty()
    }
}

/// Collects agents and nodes, then validates them into a definition.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    agents: Vec<AgentProfile>,
    nodes: Vec<TaskNode>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent.
    pub fn agent(mut self, agent: AgentProfile) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add several agents.
    pub fn agents(mut self, agents: impl IntoIterator<Item = AgentProfile>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Add a task node.
    pub fn node(mut self, node: TaskNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add several task nodes.
    pub fn nodes(mut self, nodes: impl IntoIterator<Item = TaskNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Validate and freeze the definition.
    pub fn build(self) -> Result<PipelineDefinition, PipelineError> {
        if self.nodes.is_empty() {
            return Err(PipelineError::Empty);
        }

        let mut agent_index = HashMap::new();
        for (i, agent) in self.agents.iter().enumerate() {
            if agent_index.insert(agent.id.clone(), i).is_some() {
                return Err(PipelineError::DuplicateAgent(agent.id.clone()));
            }
        }

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(PipelineError::DuplicateNode(node.id.clone()));
            }
        }

        for node in &self.nodes {
            if !agent_index.contains_key(&node.agent_ref) {
                return Err(PipelineError::UnknownAgent {
                    node: node.id.clone(),
                    agent: node.agent_ref.clone(),
                });
            }
            if let Some(dep) = node
                .depends_on
                .iter()
                .find(|d| !node_ids.contains(d.as_str()))
            {
                return Err(PipelineError::UnknownDependency {
                    node: node.id.clone(),
                    dependency: dep.clone(),
                });
            }
            let mut seen = HashSet::new();
            if let Some(dep) = node.depends_on.iter().find(|d| !seen.insert(d.as_str())) {
                return Err(PipelineError::DuplicateDependency {
                    node: node.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }

        let order = graph::topological_order(&self.nodes)
            .map_err(|cycle| PipelineError::Cyclic { cycle })?;

        Ok(PipelineDefinition {
            inner: Arc::new(Inner {
                agents: self.agents,
                agent_index,
                nodes: self.nodes,
                order,
            }),
        })
    }
}
