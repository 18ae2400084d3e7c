use api_types::{RecordId, batch::Batch};

use super::{date_part, reference_id};
use crate::{
    resource::{BranchMatch, Endpoints, Resource},
    schema::{FieldDescriptor, FieldKind, ReferenceKind, Schema},
};

pub static SCHEMA: Schema = Schema {
    title: "Batch",
    fields: &[
        FieldDescriptor::required("name", "Name", FieldKind::Text),
        FieldDescriptor::required("start_date", "Start date", FieldKind::Date),
        FieldDescriptor::required("end_date", "End date", FieldKind::Date),
        FieldDescriptor::required("start_time", "Start time", FieldKind::Time),
        FieldDescriptor::required("end_time", "End time", FieldKind::Time),
        FieldDescriptor::required("student_limit", "Student limit", FieldKind::Integer)
            .positive(),
        FieldDescriptor::required(
            "course_id",
            "Course",
            FieldKind::Reference(ReferenceKind::Course),
        ),
        FieldDescriptor::required(
            "branch_id",
            "Branch",
            FieldKind::Reference(ReferenceKind::Branch),
        ),
    ],
};

impl Resource for Batch {
    const ENDPOINTS: Endpoints = Endpoints {
        list: "batches/show",
        get: Some("batches/show/{id}"),
        create: "batches/create",
        update: "batches/update/{id}",
        delete: "batches/destroy/{id}",
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
            "start_date" => Some(date_part(&self.start_date)),
            "end_date" => Some(date_part(&self.end_date)),
            "start_time" => Some(self.start_time.clone()),
            "end_time" => Some(self.end_time.clone()),
            "student_limit" => self.student_limit.map(|limit| limit.to_string()),
            "course_id" => reference_id(self.course_id, self.course.as_ref()),
            "branch_id" => reference_id(self.branch_id, self.branch.as_ref()),
            _ => None,
        }
    }
}
