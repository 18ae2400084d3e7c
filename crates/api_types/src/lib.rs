//! Wire types for the training-center back office API.
//!
//! The backend is not consistent about number encoding (ids and limits may
//! arrive as strings) nor about the key holding the display name of embedded
//! objects, so the records here deserialize leniently and expose one shape.

use serde::{Deserialize, Serialize};

/// Server-assigned record identifier.
pub type RecordId = i64;

pub mod lenient {
    //! Deserializers for numbers that may be sent as JSON strings.
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Int(i64),
        Float(f64),
        Str(String),
    }

    fn to_i64<E: Error>(value: NumOrStr) -> Result<Option<i64>, E> {
        match value {
            NumOrStr::Int(v) => Ok(Some(v)),
            NumOrStr::Float(v) if v.fract() == 0.0 => Ok(Some(v as i64)),
            NumOrStr::Float(v) => Err(E::custom(format!("expected integer, got {v}"))),
            NumOrStr::Str(s) if s.trim().is_empty() => Ok(None),
            NumOrStr::Str(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("expected integer, got \"{s}\""))),
        }
    }

    pub fn i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        to_i64(NumOrStr::deserialize(deserializer)?)?
            .ok_or_else(|| D::Error::custom("expected integer, got empty string"))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<NumOrStr>::deserialize(deserializer)? {
            Some(value) => to_i64(value),
            None => Ok(None),
        }
    }
}

pub mod reference {
    use super::*;

    /// Embedded display object for a foreign key (course, branch, category).
    ///
    /// The server names the display key after the entity (`branch_name`,
    /// `course_name`, ...), so all known spellings collapse into
    /// `display_name`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(from = "RawReference")]
    pub struct Reference {
        pub id: RecordId,
        pub display_name: String,
    }

    impl Reference {
        pub fn new(id: RecordId, display_name: impl Into<String>) -> Self {
            Self {
                id,
                display_name: display_name.into(),
            }
        }
    }

    #[derive(Deserialize)]
    struct RawReference {
        #[serde(deserialize_with = "lenient::i64")]
        id: RecordId,
        display_name: Option<String>,
        name: Option<String>,
        branch_name: Option<String>,
        course_name: Option<String>,
        category_name: Option<String>,
        title: Option<String>,
    }

    impl From<RawReference> for Reference {
        fn from(raw: RawReference) -> Self {
            let display_name = raw
                .display_name
                .or(raw.name)
                .or(raw.branch_name)
                .or(raw.course_name)
                .or(raw.category_name)
                .or(raw.title)
                .unwrap_or_else(|| format!("#{}", raw.id));
            Self {
                id: raw.id,
                display_name,
            }
        }
    }
}

pub mod batch {
    use super::{reference::Reference, *};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Batch {
        #[serde(deserialize_with = "lenient::i64")]
        pub id: RecordId,
        #[serde(default)]
        pub name: String,
        #[serde(default)]
        pub start_date: String,
        #[serde(default)]
        pub end_date: String,
        #[serde(default)]
        pub start_time: String,
        #[serde(default)]
        pub end_time: String,
        #[serde(default, deserialize_with = "lenient::opt_i64")]
        pub student_limit: Option<i64>,
        #[serde(default, deserialize_with = "lenient::opt_i64")]
        pub course_id: Option<RecordId>,
        #[serde(default, deserialize_with = "lenient::opt_i64")]
        pub branch_id: Option<RecordId>,
        #[serde(default)]
        pub course: Option<Reference>,
        #[serde(default)]
        pub branch: Option<Reference>,
    }
}

pub mod category {
    use super::{reference::Reference, *};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Category {
        #[serde(deserialize_with = "lenient::i64")]
        pub id: RecordId,
        #[serde(default)]
        pub name: String,
        #[serde(default, deserialize_with = "lenient::opt_i64")]
        pub branch_id: Option<RecordId>,
        #[serde(default)]
        pub branch: Option<Reference>,
    }
}

pub mod expense {
    use rust_decimal::Decimal;

    use super::{reference::Reference, *};

    /// Accepted payment modes, in the order the form offers them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum PaymentMode {
        Cash,
        #[serde(rename = "UPI")]
        Upi,
        #[serde(rename = "Bank Transfer")]
        BankTransfer,
        Card,
        Cheque,
    }

    impl PaymentMode {
        pub const ALL: [PaymentMode; 5] = [
            Self::Cash,
            Self::Upi,
            Self::BankTransfer,
            Self::Card,
            Self::Cheque,
        ];

        /// Returns the label the server stores.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Cash => "Cash",
                Self::Upi => "UPI",
                Self::BankTransfer => "Bank Transfer",
                Self::Card => "Card",
                Self::Cheque => "Cheque",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            Self::ALL
                .into_iter()
                .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        #[serde(deserialize_with = "lenient::i64")]
        pub id: RecordId,
        #[serde(default, deserialize_with = "lenient::opt_i64")]
        pub category_id: Option<RecordId>,
        #[serde(default, deserialize_with = "lenient::opt_i64")]
        pub branch_id: Option<RecordId>,
        #[serde(default)]
        pub category: Option<Reference>,
        #[serde(default)]
        pub branch: Option<Reference>,
        #[serde(default)]
        pub payment_to: String,
        /// Decimal strings ("1500.00") and plain numbers are both accepted.
        #[serde(default)]
        pub amount: Decimal,
        /// Kept verbatim; see [`PaymentMode::parse`].
        #[serde(default)]
        pub payment_mode: String,
        #[serde(default)]
        pub expense_date: String,
        #[serde(default)]
        pub description: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::{batch::Batch, expense::Expense, expense::PaymentMode, reference::Reference};

    #[test]
    fn reference_picks_entity_specific_name() {
        let branch: Reference =
            serde_json::from_str(r#"{"id": 5, "branch_name": "Downtown"}"#).unwrap();
        assert_eq!(branch, Reference::new(5, "Downtown"));

        let course: Reference =
            serde_json::from_str(r#"{"id": "7", "course_name": "Rust 101"}"#).unwrap();
        assert_eq!(course, Reference::new(7, "Rust 101"));
    }

    #[test]
    fn reference_without_name_falls_back_to_id() {
        let reference: Reference = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(reference.display_name, "#9");
    }

    #[test]
    fn batch_accepts_stringly_numbers() {
        let batch: Batch = serde_json::from_str(
            r#"{
                "id": "3",
                "name": "Morning",
                "start_date": "2025-01-06",
                "end_date": "2025-03-28",
                "start_time": "09:00",
                "end_time": "11:00",
                "student_limit": "25",
                "course_id": 2,
                "branch_id": "",
                "branch": {"id": 5, "branch_name": "Downtown"}
            }"#,
        )
        .unwrap();
        assert_eq!(batch.id, 3);
        assert_eq!(batch.student_limit, Some(25));
        assert_eq!(batch.branch_id, None);
        assert_eq!(batch.branch.map(|b| b.display_name).as_deref(), Some("Downtown"));
    }

    #[test]
    fn expense_amount_from_string_or_number() {
        let from_str: Expense =
            serde_json::from_str(r#"{"id": 1, "amount": "1500.50", "payment_mode": "UPI"}"#)
                .unwrap();
        let from_num: Expense =
            serde_json::from_str(r#"{"id": 2, "amount": 1500.5, "payment_mode": "Cash"}"#)
                .unwrap();
        assert_eq!(from_str.amount, from_num.amount);
        assert_eq!(PaymentMode::parse(&from_str.payment_mode), Some(PaymentMode::Upi));
    }

    #[test]
    fn payment_mode_labels_round_trip_through_parse() {
        for mode in PaymentMode::ALL {
            assert_eq!(PaymentMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(PaymentMode::parse("bank transfer"), Some(PaymentMode::BankTransfer));
        assert_eq!(PaymentMode::parse("Crypto"), None);
    }
}
