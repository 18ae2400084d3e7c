//! Field-level contract of one resource kind.

use rust_decimal::Decimal;

/// Entity kinds that other records point at by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Branch,
    Course,
    Category,
}

impl ReferenceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Branch => "Branch",
            Self::Course => "Course",
            Self::Category => "Category",
        }
    }

    /// Endpoint listing the selectable records of this kind.
    pub fn list_path(self) -> &'static str {
        match self {
            Self::Branch => "branches",
            Self::Course => "courses/index",
            Self::Category => "categories",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Date,
    Time,
    Enum(&'static [&'static str]),
    Reference(ReferenceKind),
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }

    /// Exact value of a numeric input; integers reject fractions.
    pub fn parse_number(self, raw: &str) -> Option<Decimal> {
        match self {
            Self::Integer => raw.trim().parse::<i64>().ok().map(Decimal::from),
            Self::Number => raw.trim().parse::<Decimal>().ok(),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldCheck {
    Ok,
    Missing,
    NotANumber,
    NotPositive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Wire name, used as the payload key.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Numeric value must be strictly greater than zero.
    pub positive: bool,
}

impl FieldDescriptor {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            positive: false,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            positive: false,
        }
    }

    pub const fn positive(mut self) -> Self {
        self.positive = true;
        self
    }

    pub fn check(&self, value: &str) -> FieldCheck {
        let value = value.trim();
        if value.is_empty() {
            return if self.required {
                FieldCheck::Missing
            } else {
                FieldCheck::Ok
            };
        }

        if !self.kind.is_numeric() {
            return FieldCheck::Ok;
        }
        match self.kind.parse_number(value) {
            None => FieldCheck::NotANumber,
            Some(v) if self.positive && v <= Decimal::ZERO => FieldCheck::NotPositive,
            Some(_) => FieldCheck::Ok,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub title: &'static str,
    pub fields: &'static [FieldDescriptor],
}

impl Schema {
    /// Reference kinds the form needs options for, in field order.
    pub fn references(&self) -> Vec<ReferenceKind> {
        self.fields
            .iter()
            .filter_map(|field| match field.kind {
                FieldKind::Reference(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }
}
