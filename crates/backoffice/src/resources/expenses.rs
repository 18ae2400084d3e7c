use api_types::{
    RecordId,
    expense::{Expense, PaymentMode},
};

use super::{date_part, reference_id};
use crate::{
    resource::{BranchMatch, Endpoints, Resource},
    schema::{FieldDescriptor, FieldKind, ReferenceKind, Schema},
};

/// Labels of [`api_types::expense::PaymentMode`], in form order.
pub const PAYMENT_MODES: &[&str] = &["Cash", "UPI", "Bank Transfer", "Card", "Cheque"];

pub static SCHEMA: Schema = Schema {
    title: "Expense",
    fields: &[
        FieldDescriptor::required(
            "category_id",
            "Category",
            FieldKind::Reference(ReferenceKind::Category),
        ),
        FieldDescriptor::required(
            "branch_id",
            "Branch",
            FieldKind::Reference(ReferenceKind::Branch),
        ),
        FieldDescriptor::required("payment_to", "Payment to", FieldKind::Text),
        FieldDescriptor::required("amount", "Amount", FieldKind::Number),
        FieldDescriptor::required(
            "payment_mode",
            "Payment mode",
            FieldKind::Enum(PAYMENT_MODES),
        ),
        FieldDescriptor::required("expense_date", "Date", FieldKind::Date),
        FieldDescriptor::optional("description", "Description", FieldKind::Text),
    ],
};

impl Resource for Expense {
    const ENDPOINTS: Endpoints = Endpoints {
        list: "expenses",
        get: None,
        create: "expenses",
        update: "expenses/{id}",
        delete: "expenses/{id}",
    };
    // The expense view filters on the branch name, with "all" as a wildcard.
    const BRANCH_MATCH: BranchMatch = BranchMatch::ByName;

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn name(&self) -> &str {
        &self.payment_to
    }

    fn branch_id(&self) -> Option<RecordId> {
        self.branch_id.or(self.branch.as_ref().map(|b| b.id))
    }

    fn branch_name(&self) -> Option<&str> {
        self.branch.as_ref().map(|b| b.display_name.as_str())
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "category_id" => reference_id(self.category_id, self.category.as_ref()),
            "branch_id" => reference_id(self.branch_id, self.branch.as_ref()),
            "payment_to" => Some(self.payment_to.clone()),
            "amount" => Some(self.amount.to_string()),
            "payment_mode" => Some(
                PaymentMode::parse(&self.payment_mode)
                    .map_or_else(|| self.payment_mode.clone(), |mode| mode.as_str().to_string()),
            ),
            "expense_date" => Some(date_part(&self.expense_date)),
            "description" => self.description.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use super::*;
    use crate::draft::Draft;

    #[test]
    fn payment_modes_match_wire_enum() {
        let labels: Vec<_> = PaymentMode::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(labels, PAYMENT_MODES);
    }

    #[test]
    fn description_is_optional() {
        let mut draft = Draft::empty(&SCHEMA);
        for (name, value) in [
            ("category_id", "3"),
            ("branch_id", "5"),
            ("payment_to", "Landlord"),
            ("amount", "1500.50"),
            ("payment_mode", "Bank Transfer"),
            ("expense_date", "2025-02-01"),
        ] {
            draft.set_field(name, value).unwrap();
        }
        assert!(draft.is_complete());
        assert_eq!(
            Value::Object(draft.payload()),
            json!({
                "category_id": 3,
                "branch_id": 5,
                "payment_to": "Landlord",
                "amount": "1500.50",
                "payment_mode": "Bank Transfer",
                "expense_date": "2025-02-01"
            })
        );
    }

    #[test]
    fn large_amount_keeps_every_digit() {
        let mut draft = Draft::empty(&SCHEMA);
        draft.set_field("amount", "12345678901234567.89").unwrap();
        assert_eq!(draft.payload()["amount"], json!("12345678901234567.89"));
    }

    #[test]
    fn lowercase_payment_mode_is_sent_as_its_label() {
        let mut draft = Draft::empty(&SCHEMA);
        draft.set_field("payment_mode", "upi").unwrap();
        assert_eq!(draft.payload()["payment_mode"], json!("UPI"));
    }

    #[test]
    fn stored_payment_mode_opens_as_its_label() {
        let expense = Expense {
            id: 4,
            category_id: Some(3),
            branch_id: Some(5),
            category: None,
            branch: None,
            payment_to: "Landlord".to_string(),
            amount: Decimal::new(150050, 2),
            payment_mode: "bank transfer".to_string(),
            expense_date: "2025-02-01T00:00:00.000000Z".to_string(),
            description: None,
        };
        let draft = Draft::from_record(&expense);
        assert_eq!(draft.value("payment_mode"), Some("Bank Transfer"));
        assert_eq!(draft.value("amount"), Some("1500.50"));
    }

    #[test]
    fn non_numeric_amount_is_incomplete() {
        let mut draft = Draft::empty(&SCHEMA);
        draft.set_field("amount", "fifteen").unwrap();
        assert!(draft.invalid_fields().contains(&"Amount"));
    }
}
