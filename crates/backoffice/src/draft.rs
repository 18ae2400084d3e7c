//! Editable, unsaved copy of one record backing a create or edit form.

use serde_json::{Map, Value};

use api_types::RecordId;

use crate::{
    error::ControllerError,
    resource::Resource,
    schema::{FieldCheck, FieldDescriptor, FieldKind, Schema},
};

/// JSON object sent as a create/update body.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    schema: &'static Schema,
    record_id: Option<RecordId>,
    /// One value per schema field, in schema order.
    values: Vec<String>,
    original: Option<Vec<String>>,
}

impl Draft {
    pub fn empty(schema: &'static Schema) -> Self {
        Self {
            schema,
            record_id: None,
            values: vec![String::new(); schema.fields.len()],
            original: None,
        }
    }

    pub fn from_record<R: Resource>(record: &R) -> Self {
        let schema = R::schema();
        let values: Vec<String> = schema
            .fields
            .iter()
            .map(|field| record.field_value(field.name).unwrap_or_default())
            .collect();
        Self {
            schema,
            record_id: Some(record.id()),
            original: Some(values.clone()),
            values,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Id of the record this draft edits, `None` for a new record.
    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.values[idx].as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &str)> {
        self.schema
            .fields
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), ControllerError> {
        let idx = self
            .position(name)
            .ok_or_else(|| ControllerError::UnknownField(name.to_string()))?;
        self.values[idx] = value.into();
        Ok(())
    }

    /// Every required field is filled and numeric fields parse within bounds.
    pub fn is_complete(&self) -> bool {
        self.fields()
            .all(|(field, value)| field.check(value) == FieldCheck::Ok)
    }

    /// Labels of the fields keeping the draft incomplete.
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        self.fields()
            .filter(|(field, value)| field.check(value) != FieldCheck::Ok)
            .map(|(field, _)| field.label)
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        match &self.original {
            Some(original) => original
                .iter()
                .zip(&self.values)
                .any(|(before, now)| before.trim() != now.trim()),
            None => self.values.iter().any(|v| !v.trim().is_empty()),
        }
    }

    /// Full field set; blank optional fields are left out.
    pub fn payload(&self) -> Fields {
        self.fields()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(field, value)| (field.name.to_string(), to_json(field, value)))
            .collect()
    }

    /// Fields that differ from the record the draft was copied from. A new
    /// record has no baseline, so this is the full payload.
    pub fn changes(&self) -> Fields {
        let Some(original) = &self.original else {
            return self.payload();
        };
        self.fields()
            .zip(original)
            .filter(|((_, now), before)| now.trim() != before.trim())
            .map(|((field, now), _)| (field.name.to_string(), to_json(field, now)))
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.schema.fields.iter().position(|field| field.name == name)
    }
}

fn to_json(field: &FieldDescriptor, raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    match field.kind {
        FieldKind::Integer | FieldKind::Reference(_) => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(raw)),
        // Exact decimal string, never a float.
        FieldKind::Number => field
            .kind
            .parse_number(raw)
            .map(|amount| Value::from(amount.to_string()))
            .unwrap_or_else(|| Value::from(raw)),
        FieldKind::Enum(options) => options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(raw))
            .map_or_else(|| Value::from(raw), |option| Value::from(*option)),
        FieldKind::Text | FieldKind::Date | FieldKind::Time => Value::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use api_types::{batch::Batch, reference::Reference};
    use serde_json::json;

    use super::*;
    use crate::resources::batches;

    fn batch() -> Batch {
        Batch {
            id: 11,
            name: "Evening".to_string(),
            start_date: "2025-01-06".to_string(),
            end_date: "2025-03-28".to_string(),
            start_time: "18:00".to_string(),
            end_time: "20:00".to_string(),
            student_limit: Some(20),
            course_id: None,
            branch_id: Some(5),
            course: Some(Reference::new(2, "Rust 101")),
            branch: None,
        }
    }

    fn filled() -> Draft {
        let mut draft = Draft::empty(&batches::SCHEMA);
        for (name, value) in [
            ("name", "Morning"),
            ("start_date", "2025-01-06"),
            ("end_date", "2025-03-28"),
            ("start_time", "09:00"),
            ("end_time", "11:00"),
            ("student_limit", "25"),
            ("course_id", "2"),
            ("branch_id", "5"),
        ] {
            draft.set_field(name, value).unwrap();
        }
        draft
    }

    #[test]
    fn empty_draft_is_incomplete() {
        let draft = Draft::empty(&batches::SCHEMA);
        assert!(!draft.is_complete());
        assert_eq!(draft.invalid_fields().len(), batches::SCHEMA.fields.len());
        assert!(!draft.is_dirty());
    }

    #[test]
    fn filled_draft_is_complete() {
        assert!(filled().is_complete());
    }

    #[test]
    fn zero_student_limit_is_incomplete() {
        let mut draft = filled();
        draft.set_field("student_limit", "0").unwrap();
        assert!(!draft.is_complete());
        assert_eq!(draft.invalid_fields(), vec!["Student limit"]);
    }

    #[test]
    fn unparseable_limit_is_incomplete() {
        let mut draft = filled();
        draft.set_field("student_limit", "many").unwrap();
        assert!(!draft.is_complete());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut draft = filled();
        let err = draft.set_field("colour", "red").unwrap_err();
        assert_eq!(err, ControllerError::UnknownField("colour".to_string()));
    }

    #[test]
    fn from_record_copies_fields_and_id() {
        let draft = Draft::from_record(&batch());
        assert_eq!(draft.record_id(), Some(11));
        assert_eq!(draft.value("name"), Some("Evening"));
        assert_eq!(draft.value("student_limit"), Some("20"));
        assert_eq!(draft.value("course_id"), Some("2"));
        assert_eq!(draft.value("branch_id"), Some("5"));
        assert!(!draft.is_dirty());
    }

    #[test]
    fn payload_types_values_by_field_kind() {
        let payload = Value::Object(filled().payload());
        assert_eq!(
            payload,
            json!({
                "name": "Morning",
                "start_date": "2025-01-06",
                "end_date": "2025-03-28",
                "start_time": "09:00",
                "end_time": "11:00",
                "student_limit": 25,
                "course_id": 2,
                "branch_id": 5
            })
        );
    }

    #[test]
    fn changes_only_carry_edited_fields() {
        let mut draft = Draft::from_record(&batch());
        draft.set_field("name", "Late evening").unwrap();
        draft.set_field("end_time", " 20:00 ").unwrap();
        assert!(draft.is_dirty());
        assert_eq!(
            Value::Object(draft.changes()),
            json!({"name": "Late evening"})
        );
    }
}
