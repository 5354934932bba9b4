//! Resource schema types

use super::action::{ActionKind, ActionType};
use crate::materialize::Materializer;

/// Which category a declared field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    /// Usable as a lookup identity
    Fetch,
    /// Filled by the server only; local writes are ignored
    Static,
    /// Settable by the caller and sent on create/update
    Dynamic,
}

/// Static descriptor for one resource type
///
/// Every resource the crate knows about is a `static ResourceSchema`; the
/// generic engine in [`crate::resource`] derives all behavior from it.
/// Empty strings in `update_field`, `delete_field` and `action_field` mean
/// the operation is unsupported.
#[derive(Debug)]
pub struct ResourceSchema {
    /// Name used when this resource is referenced elsewhere (e.g. tagging)
    pub kind: &'static str,
    /// Endpoint path, may contain positional `{}` placeholders
    pub endpoint: &'static str,
    /// Key of a single object in a response body
    pub single_key: &'static str,
    /// Key of a page of objects in a response body
    pub plural_key: &'static str,
    /// Fields usable as lookup identity, in preference order
    pub fetch_fields: &'static [&'static str],
    /// Server-controlled fields
    pub static_fields: &'static [&'static str],
    /// Caller-settable fields
    pub dynamic_fields: &'static [&'static str],
    /// Action types invocable on an instance
    pub actions: &'static [ActionType],
    /// Field used to build the per-instance URL
    pub id_field: &'static str,
    /// Field substituted into delete URLs
    pub delete_field: &'static str,
    /// Field substituted into update URLs
    pub update_field: &'static str,
    /// Field substituted into action URLs
    pub action_field: &'static str,
    /// Body fields that fill endpoint placeholders, left to right, when the
    /// resource is embedded in another resource's body
    pub parent_fields: &'static [&'static str],
    /// Explicit per-field materializers, on top of the naming conventions
    pub materializers: &'static [(&'static str, Materializer)],
}

impl ResourceSchema {
    /// Base for struct-update syntax in schema tables
    pub const EMPTY: ResourceSchema = ResourceSchema {
        kind: "",
        endpoint: "",
        single_key: "",
        plural_key: "",
        fetch_fields: &[],
        static_fields: &[],
        dynamic_fields: &[],
        actions: &[],
        id_field: "id",
        delete_field: "",
        update_field: "",
        action_field: "",
        parent_fields: &[],
        materializers: &[],
    };

    /// Category of a declared field; fetch wins when a name is listed twice
    pub fn category(&self, field: &str) -> Option<FieldCategory> {
        if self.fetch_fields.contains(&field) {
            Some(FieldCategory::Fetch)
        } else if self.static_fields.contains(&field) {
            Some(FieldCategory::Static)
        } else if self.dynamic_fields.contains(&field) {
            Some(FieldCategory::Dynamic)
        } else {
            None
        }
    }

    /// Whether the field is declared in any category
    pub fn declares(&self, field: &str) -> bool {
        self.category(field).is_some()
    }

    /// Whether the field is a lookup identity
    pub fn is_fetch(&self, field: &str) -> bool {
        self.fetch_fields.contains(&field)
    }

    /// Every declared field, fetch then static then dynamic, without repeats
    pub fn fields(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for field in self
            .fetch_fields
            .iter()
            .chain(self.static_fields)
            .chain(self.dynamic_fields)
        {
            if !out.contains(field) {
                out.push(field);
            }
        }
        out
    }

    /// Whether single objects can be looked up by identity
    pub fn is_fetchable(&self) -> bool {
        !self.fetch_fields.is_empty()
    }

    /// Whether the instance exposes an action sub-collection
    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Whether the action's type is declared
    pub fn supports_action(&self, action: &ActionKind) -> bool {
        self.actions.contains(&action.action_type())
    }

    /// Explicit materializer registered for a field
    pub fn registered(&self, field: &str) -> Option<Materializer> {
        self.materializers
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, m)| *m)
    }
}

impl PartialEq for ResourceSchema {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.endpoint == other.endpoint
    }
}

impl Eq for ResourceSchema {}
