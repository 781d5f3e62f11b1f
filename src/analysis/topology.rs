//! Structural checks over the parent/derived relationships of a schema.
use crate::store::{FieldDefinition, FormSchema};
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaIssue {
    #[error("Field id '{0}' is used more than once")]
    DuplicateId(String),
    #[error("Derived field '{field}' references unknown parent '{parent}'")]
    UnknownParent { field: String, parent: String },
    #[error("Derived field '{field}' uses derived field '{parent}' as a parent")]
    DerivedParent { field: String, parent: String },
    #[error("Derived field '{0}' lists itself as a parent")]
    SelfReference(String),
    #[error("Derived fields form a cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
    #[error("Derived field '{0}' has no formula")]
    MissingFormula(String),
    #[error("Field '{0}' needs at least one option")]
    MissingOptions(String),
}

/// Builds the data-flow graph: an edge `parent -> derived` for every parent
/// reference that names a field of the schema.
fn dependency_graph(schema: &FormSchema) -> DiGraphMap<&str, ()> {
    let mut graph = DiGraphMap::new();
    for field in &schema.fields {
        graph.add_node(field.id.as_str());
    }
    for field in schema.derived_fields() {
        for parent in &field.parent_field_ids {
            if let Some(p) = schema.field(parent) {
                graph.add_edge(p.id.as_str(), field.id.as_str(), ());
            }
        }
    }
    graph
}

/// Reports every structural problem in `schema`.
///
/// A schema that passes satisfies the invariant the recompute pass relies on:
/// derived fields only read existing, non-derived fields.
pub fn check_schema(schema: &FormSchema) -> Result<(), Vec<SchemaIssue>> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.id.as_str()) {
            issues.push(SchemaIssue::DuplicateId(field.id.clone()));
        }
        let has_options = field.options.as_ref().is_some_and(|o| !o.is_empty());
        if field.field_type.has_options() && !has_options {
            issues.push(SchemaIssue::MissingOptions(field.id.clone()));
        }
    }

    for field in schema.derived_fields() {
        if field.formula.as_deref().map_or(true, |f| f.trim().is_empty()) {
            issues.push(SchemaIssue::MissingFormula(field.id.clone()));
        }
        for parent in &field.parent_field_ids {
            if parent == &field.id {
                issues.push(SchemaIssue::SelfReference(field.id.clone()));
                continue;
            }
            match schema.field(parent) {
                None => issues.push(SchemaIssue::UnknownParent {
                    field: field.id.clone(),
                    parent: parent.clone(),
                }),
                Some(p) if p.is_derived => issues.push(SchemaIssue::DerivedParent {
                    field: field.id.clone(),
                    parent: parent.clone(),
                }),
                Some(_) => {}
            }
        }
    }

    // Self references are already reported above; only multi-field cycles here.
    let graph = dependency_graph(schema);
    for component in tarjan_scc(&graph) {
        if component.len() > 1 {
            let mut ids: Vec<String> = component.iter().map(|id| id.to_string()).collect();
            ids.sort();
            issues.push(SchemaIssue::Cycle(ids));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// All derived fields whose value depends, directly or transitively, on `field_id`.
pub fn dependents_of(schema: &FormSchema, field_id: &str) -> HashSet<String> {
    let graph = dependency_graph(schema);
    let mut visited = HashSet::new();
    let Some(start) = schema.field(field_id) else {
        return visited;
    };
    let mut queue = VecDeque::from([start.id.as_str()]);

    while let Some(node) = queue.pop_front() {
        for child in graph.neighbors(node) {
            if visited.insert(child.to_string()) {
                queue.push_back(child);
            }
        }
    }
    visited.remove(field_id);
    visited
}

/// Fields that may be offered as parents of `field_id`: every non-derived field but itself.
pub fn candidate_parents<'s>(schema: &'s FormSchema, field_id: &str) -> Vec<&'s FieldDefinition> {
    schema
        .fields
        .iter()
        .filter(|f| !f.is_derived && f.id != field_id)
        .collect()
}
