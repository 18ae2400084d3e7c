use ratatui::layout::Constraint;

use api_types::{batch::Batch, category::Category, expense::Expense, reference::Reference};
use backoffice::Resource;

/// Table layout of a resource list.
pub trait TableRow: Resource {
    const HEADERS: &'static [&'static str];
    const WIDTHS: &'static [Constraint];

    fn cells(&self) -> Vec<String>;
}

fn display(reference: Option<&Reference>) -> String {
    reference
        .map(|r| r.display_name.clone())
        .unwrap_or_else(|| "-".to_string())
}

impl TableRow for Batch {
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Course", "Branch", "Dates", "Time", "Limit"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Length(6),
        Constraint::Min(12),
        Constraint::Min(12),
        Constraint::Min(10),
        Constraint::Length(23),
        Constraint::Length(13),
        Constraint::Length(6),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            display(self.course.as_ref()),
            display(self.branch.as_ref()),
            format!("{} → {}", self.start_date, self.end_date),
            format!("{}-{}", short_time(&self.start_time), short_time(&self.end_time)),
            self.student_limit
                .map(|limit| limit.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableRow for Category {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Branch"];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Min(12),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            display(self.branch.as_ref()),
        ]
    }
}

impl TableRow for Expense {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Date", "Paid to", "Category", "Branch", "Mode", "Amount",
    ];
    const WIDTHS: &'static [Constraint] = &[
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Min(14),
        Constraint::Min(10),
        Constraint::Min(10),
        Constraint::Length(13),
        Constraint::Length(12),
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.field_value("expense_date").unwrap_or_default(),
            self.payment_to.clone(),
            display(self.category.as_ref()),
            display(self.branch.as_ref()),
            self.payment_mode.clone(),
            format!("{:.2}", self.amount),
        ]
    }
}

/// "09:00:00" -> "09:00".
fn short_time(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}
