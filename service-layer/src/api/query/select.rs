//! Projection AST for `$select`

use serde::{Deserialize, Serialize};

use super::filters::FilterValue;
use crate::api::metadata::{EntitySchema, capitalize};

/// What a query projects out of the source entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// A single member: `x => x.Field`
    Member(String),
    /// A tuple of expressions: `x => (x.A, x.B)`
    Tuple(Vec<ProjectionExpr>),
    /// Named assignments: `x => Dto { code: x.ItemCode, .. }`
    Init(Vec<(String, ProjectionExpr)>),
}

/// One element inside a tuple or initializer projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectionExpr {
    Member(String),
    /// Type conversion wrapper around another expression
    Convert(Box<ProjectionExpr>),
    /// Function call whose arguments may reference members
    Call {
        function: String,
        args: Vec<ProjectionExpr>,
    },
    Literal(FilterValue),
}

impl Projection {
    pub fn member(name: impl Into<String>) -> Self {
        Projection::Member(name.into())
    }

    /// Tuple of plain members
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Tuple(names.into_iter().map(ProjectionExpr::member).collect())
    }

    /// Initializer from `(target, expression)` pairs
    pub fn init<I, S>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (S, ProjectionExpr)>,
        S: Into<String>,
    {
        Projection::Init(
            assignments
                .into_iter()
                .map(|(target, expr)| (target.into(), expr))
                .collect(),
        )
    }

    /// Fields to request for this projection against `schema`.
    ///
    /// A single member is taken as is. Tuple and initializer members are
    /// unwrapped recursively and kept only when the source schema has them.
    pub fn select_fields(&self, schema: &EntitySchema) -> Vec<String> {
        match self {
            Projection::Member(name) => vec![capitalize(name)],
            Projection::Tuple(items) => resolve_members(items.iter(), schema),
            Projection::Init(assignments) => {
                resolve_members(assignments.iter().map(|(_, expr)| expr), schema)
            }
        }
    }
}

impl ProjectionExpr {
    pub fn member(name: impl Into<String>) -> Self {
        ProjectionExpr::Member(name.into())
    }

    pub fn convert(inner: ProjectionExpr) -> Self {
        ProjectionExpr::Convert(Box::new(inner))
    }

    pub fn call(function: impl Into<String>, args: Vec<ProjectionExpr>) -> Self {
        ProjectionExpr::Call {
            function: function.into(),
            args,
        }
    }

    pub fn literal(value: impl Into<FilterValue>) -> Self {
        ProjectionExpr::Literal(value.into())
    }

    fn collect_members<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            ProjectionExpr::Member(name) => names.push(name),
            ProjectionExpr::Convert(inner) => inner.collect_members(names),
            ProjectionExpr::Call { args, .. } => {
                for arg in args {
                    arg.collect_members(names);
                }
            }
            ProjectionExpr::Literal(_) => {}
        }
    }
}

fn resolve_members<'a>(
    exprs: impl Iterator<Item = &'a ProjectionExpr>,
    schema: &EntitySchema,
) -> Vec<String> {
    let mut members = Vec::new();
    for expr in exprs {
        expr.collect_members(&mut members);
    }

    let mut fields: Vec<String> = Vec::new();
    for member in members {
        if let Some(name) = schema.resolve(member) {
            if !fields.contains(&name) {
                fields.push(name);
            }
        }
    }
    fields
}
