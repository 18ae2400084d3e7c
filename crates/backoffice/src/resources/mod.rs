//! The three managed record kinds.

pub mod batches;
pub mod categories;
pub mod expenses;

use api_types::reference::Reference;

/// Date part of a date or datetime string (`2025-01-06T00:00:00Z`).
fn date_part(value: &str) -> String {
    value
        .split(['T', ' '])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Id of a reference, preferring the flat foreign key column.
fn reference_id(flat: Option<i64>, embedded: Option<&Reference>) -> Option<String> {
    flat.or(embedded.map(|r| r.id)).map(|id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_part_strips_time() {
        assert_eq!(date_part("2025-01-06T00:00:00.000000Z"), "2025-01-06");
        assert_eq!(date_part("2025-01-06 10:00:00"), "2025-01-06");
        assert_eq!(date_part("2025-01-06"), "2025-01-06");
    }

    #[test]
    fn flat_foreign_key_wins() {
        let embedded = Reference::new(3, "Other");
        assert_eq!(reference_id(Some(4), Some(&embedded)).as_deref(), Some("4"));
        assert_eq!(reference_id(None, Some(&embedded)).as_deref(), Some("3"));
        assert_eq!(reference_id(None, None), None);
    }
}
