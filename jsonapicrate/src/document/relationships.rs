//! The `relationships` and `included` accumulator.
//!
//! A name related once holds a single member. Relating it again turns the
//! member into a list; structurally equal entries are dropped, and a list left
//! with one entry collapses back to that entry. `included` is deduplicated the
//! same way and keeps first-seen order.

use serde_json::{Map, Value};

use super::serializer::{Assembler, ResourceSerializer};
use super::{Document, push_unique};

/// How a related resource appears under `relationships`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelateView {
    /// The full resource object
    Embedded,
    /// Only `{type, id}`, the resource itself goes to `included`
    Identifier,
}

#[derive(Debug, Clone)]
enum Member {
    One(Value),
    Many(Vec<Value>),
}

impl Member {
    fn push(self, value: Value) -> Self {
        let mut values = match self {
            Self::One(existing) => vec![existing],
            Self::Many(values) => values,
        };
        push_unique(&mut values, value);
        if values.len() == 1 {
            Self::One(values.swap_remove(0))
        } else {
            Self::Many(values)
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::One(value) => value,
            Self::Many(values) => Value::Array(values),
        }
    }
}

/// Collects one resource's relationships during an assembly pass.
///
/// Every operation is gated on the resolved include paths: a name that was not
/// requested is skipped silently.
pub struct RelationshipsBuilder<'a> {
    assembler: &'a Assembler<'a>,
    path: String,
    depth: usize,
    members: Vec<(String, Member)>,
    included: Vec<Value>,
}

impl<'a> RelationshipsBuilder<'a> {
    /// `path` is the include path of the resource being built, empty at the
    /// top level.
    #[must_use]
    pub fn new(assembler: &'a Assembler<'a>, path: &str, depth: usize) -> Self {
        Self {
            assembler,
            path: path.to_string(),
            depth,
            members: Vec::new(),
            included: Vec::new(),
        }
    }

    fn path_for(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }

    /// Whether `name` lies on a requested include path. `comments.author`
    /// also permits `comments`.
    #[must_use]
    pub fn is_related(&self, name: &str) -> bool {
        let path = self.path_for(name);
        self.assembler.options().includes.iter().any(|requested| {
            requested == &path
                || requested
                    .strip_prefix(path.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Merges `value` into `relationships[name]`.
    pub fn relate(&mut self, name: &str, value: Value) -> &mut Self {
        if !self.is_related(name) {
            return self;
        }
        match self.members.iter().position(|(existing, _)| existing == name) {
            Some(index) => {
                let member = &mut self.members[index].1;
                *member = std::mem::replace(member, Member::Many(Vec::new())).push(value);
            }
            None => self.members.push((name.to_string(), Member::One(value))),
        }
        self
    }

    /// Adds the primary data of `nested`, and whatever it already included,
    /// to `included`. With a `view`, also relates `nested` in that form.
    pub fn include(&mut self, name: &str, nested: &Document, view: Option<RelateView>) -> &mut Self {
        if !self.is_related(name) {
            return self;
        }
        for resource in nested.data.resources() {
            push_unique(&mut self.included, resource.to_value());
        }
        self.bubble(nested);
        if let Some(view) = view {
            self.relate(name, nested.as_relationship(view));
        }
        self
    }

    /// Serializes `resource` one level deeper and relates it.
    pub fn relate_resource<S>(&mut self, name: &str, resource: &S, view: RelateView) -> &mut Self
    where
        S: ResourceSerializer + ?Sized,
    {
        if let Some(nested) = self.nested(name, resource) {
            self.bubble(&nested);
            self.relate(name, nested.as_relationship(view));
        }
        self
    }

    /// Serializes `resource` one level deeper and includes it.
    pub fn include_resource<S>(&mut self, name: &str, resource: &S, view: Option<RelateView>) -> &mut Self
    where
        S: ResourceSerializer + ?Sized,
    {
        if let Some(nested) = self.nested(name, resource) {
            self.include(name, &nested, view);
        }
        self
    }

    /// [`Self::include_resource`] for each element of a to-many relationship.
    pub fn include_resources<S>(&mut self, name: &str, resources: &[S], view: Option<RelateView>) -> &mut Self
    where
        S: ResourceSerializer,
    {
        for resource in resources {
            self.include_resource(name, resource, view);
        }
        self
    }

    fn nested<S>(&self, name: &str, resource: &S) -> Option<Document>
    where
        S: ResourceSerializer + ?Sized,
    {
        if !self.is_related(name) {
            return None;
        }
        let path = self.path_for(name);
        let depth = self.depth + 1;
        if depth > self.assembler.options().max_depth {
            tracing::warn!(path = %path, depth, "relationship nesting too deep, skipping");
            return None;
        }
        Some(self.assembler.build(resource, &path, depth))
    }

    fn bubble(&mut self, nested: &Document) {
        for value in &nested.included {
            push_unique(&mut self.included, value.clone());
        }
    }

    /// `(relationships, included)`.
    pub(crate) fn finish(self) -> (Map<String, Value>, Vec<Value>) {
        let relationships = self
            .members
            .into_iter()
            .map(|(name, member)| (name, member.into_value()))
            .collect();
        (relationships, self.included)
    }
}
