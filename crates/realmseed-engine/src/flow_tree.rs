//! Execution-tree reconstruction and structural comparison.
//!
//! The server delivers a flow's executions as a flat list annotated with a
//! `level` (depth) and an `authenticationFlow` (is-subflow) marker. The
//! parser here rebuilds the tree with a single forward-only cursor: a node
//! at level L adopts subsequent entries at level L+1 as children, and a
//! sibling run ends when a lower level appears. A level increase greater
//! than +1 between consecutive entries cannot come from a well-formed
//! flow and is treated as remote-state corruption.

use realmseed_model::rep::AuthenticationExecutionInfoRepresentation;
use realmseed_model::spec::{ExecutionSpec, FlowSpec, RealmSpec};
use realmseed_model::SpecError;

use crate::error::{EngineError, EngineResult};

/// A node of the live execution tree.
#[derive(Debug, Clone)]
pub struct ExecutionNode {
    pub info: AuthenticationExecutionInfoRepresentation,
    pub children: Vec<ExecutionNode>,
}

impl ExecutionNode {
    /// Whether this node is a nested subflow.
    #[must_use]
    pub fn is_subflow(&self) -> bool {
        self.info.authentication_flow
    }
}

/// Forward-only peek/advance cursor over the flat execution list.
struct Cursor<'a> {
    items: &'a [AuthenticationExecutionInfoRepresentation],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a AuthenticationExecutionInfoRepresentation> {
        self.items.get(self.pos)
    }

    fn advance(&mut self) -> &'a AuthenticationExecutionInfoRepresentation {
        let item = &self.items[self.pos];
        self.pos += 1;
        item
    }
}

/// Rebuild the execution tree of `flow_alias` from the server's flat list.
pub fn parse_execution_tree(
    flow_alias: &str,
    flat: &[AuthenticationExecutionInfoRepresentation],
) -> EngineResult<Vec<ExecutionNode>> {
    let mut cursor = Cursor {
        items: flat,
        pos: 0,
    };
    let roots = parse_siblings(flow_alias, &mut cursor, 0)?;
    debug_assert!(cursor.peek().is_none());
    Ok(roots)
}

fn parse_siblings(
    flow_alias: &str,
    cursor: &mut Cursor<'_>,
    level: i32,
) -> EngineResult<Vec<ExecutionNode>> {
    let mut nodes = Vec::new();
    while let Some(next) = cursor.peek() {
        if next.level < level {
            break;
        }
        if next.level > level {
            return Err(EngineError::RemoteShape {
                entity: "authentication flow",
                name: flow_alias.to_string(),
                detail: format!(
                    "execution at level {} where level {} was expected (corrupt flat list)",
                    next.level, level
                ),
            });
        }
        let info = cursor.advance().clone();
        let children = parse_siblings(flow_alias, cursor, level + 1)?;
        nodes.push(ExecutionNode { info, children });
    }
    Ok(nodes)
}

/// A node of the desired execution tree, resolved from the spec's
/// by-reference subflow aliases.
#[derive(Debug, Clone)]
pub struct DesiredNode {
    pub spec: ExecutionSpec,
    /// Alias and description of the referenced subflow, for subflow nodes.
    pub subflow: Option<FlowRef>,
    pub children: Vec<DesiredNode>,
}

/// The subflow a desired node references.
#[derive(Debug, Clone)]
pub struct FlowRef {
    pub alias: String,
    pub description: Option<String>,
    pub provider_id: String,
}

impl DesiredNode {
    #[must_use]
    pub fn is_subflow(&self) -> bool {
        self.subflow.is_some()
    }
}

/// Resolve a flow spec into its desired execution tree.
///
/// Fails fast on a dangling subflow alias or a reference cycle; both are
/// configuration defects, not remote problems.
pub fn build_desired_tree(spec: &RealmSpec, flow: &FlowSpec) -> EngineResult<Vec<DesiredNode>> {
    let mut visiting = vec![flow.alias.as_str()];
    build_children(spec, flow, &mut visiting)
}

fn build_children<'a>(
    spec: &'a RealmSpec,
    flow: &'a FlowSpec,
    visiting: &mut Vec<&'a str>,
) -> EngineResult<Vec<DesiredNode>> {
    let mut nodes = Vec::new();
    for execution in &flow.executions {
        match &execution.flow_alias {
            Some(alias) => {
                let target = spec.flow_by_alias(alias).ok_or_else(|| {
                    EngineError::Spec(SpecError::UnresolvedReference {
                        entity: "flow",
                        reference: alias.clone(),
                        referrer: format!("execution of flow {}", flow.alias),
                    })
                })?;
                if visiting.contains(&alias.as_str()) {
                    return Err(EngineError::ConfigIntegrity {
                        entity: "authentication flow",
                        name: alias.clone(),
                        detail: "subflow reference cycle".to_string(),
                    });
                }
                visiting.push(alias.as_str());
                let children = build_children(spec, target, visiting)?;
                visiting.pop();
                nodes.push(DesiredNode {
                    spec: execution.clone(),
                    subflow: Some(FlowRef {
                        alias: target.alias.clone(),
                        description: target.description.clone(),
                        provider_id: target.provider_id.clone(),
                    }),
                    children,
                });
            }
            None => nodes.push(DesiredNode {
                spec: execution.clone(),
                subflow: None,
                children: Vec::new(),
            }),
        }
    }
    Ok(nodes)
}

/// Structural equality: same child count at every level and matching
/// is-subflow flags position by position. Field differences (requirement,
/// description, config) are deliberately not structure.
#[must_use]
pub fn same_structure(desired: &[DesiredNode], live: &[ExecutionNode]) -> bool {
    desired.len() == live.len()
        && desired.iter().zip(live).all(|(d, l)| {
            d.is_subflow() == l.is_subflow() && same_structure(&d.children, &l.children)
        })
}

/// Flatten the live tree children-before-parents, later siblings first —
/// the only safe deletion order, since the server refuses to delete a
/// non-empty subflow.
#[must_use]
pub fn deletion_order(nodes: &[ExecutionNode]) -> Vec<&ExecutionNode> {
    let mut out = Vec::new();
    for node in nodes.iter().rev() {
        collect_bottom_up(node, &mut out);
    }
    out
}

fn collect_bottom_up<'a>(node: &'a ExecutionNode, out: &mut Vec<&'a ExecutionNode>) {
    for child in node.children.iter().rev() {
        collect_bottom_up(child, out);
    }
    out.push(node);
}
