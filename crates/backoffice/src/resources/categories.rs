use api_types::{RecordId, category::Category};

use super::reference_id;
use crate::{
    resource::{BranchMatch, Endpoints, Resource},
    schema::{FieldDescriptor, FieldKind, ReferenceKind, Schema},
};

pub static SCHEMA: Schema = Schema {
    title: "Expense category",
    fields: &[
        FieldDescriptor::required("name", "Name", FieldKind::Text),
        FieldDescriptor::required(
            "branch_id",
            "Branch",
            FieldKind::Reference(ReferenceKind::Branch),
        ),
    ],
};

impl Resource for Category {
    const ENDPOINTS: Endpoints = Endpoints {
        list: "categories",
        get: None,
        create: "categories",
        update: "categories/{id}",
        delete: "categories/{id}",
    };
    const BRANCH_MATCH: BranchMatch = BranchMatch::ById;

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn branch_id(&self) -> Option<RecordId> {
        self.branch_id.or(self.branch.as_ref().map(|b| b.id))
    }

    fn branch_name(&self) -> Option<&str> {
        self.branch.as_ref().map(|b| b.display_name.as_str())
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.clone()),
            "branch_id" => reference_id(self.branch_id, self.branch.as_ref()),
            _ => None,
        }
    }
}
