use std::fmt::Debug;

use serde::de::DeserializeOwned;

use api_types::RecordId;

use crate::schema::Schema;

/// REST paths of one resource kind, relative to the API base URL.
///
/// `{id}` is substituted with the record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub list: &'static str,
    /// `None` when the API has no single-record read; the gateway then looks
    /// the record up in a fresh list.
    pub get: Option<&'static str>,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
}

impl Endpoints {
    pub fn with_id(template: &str, id: RecordId) -> String {
        template.replace("{id}", &id.to_string())
    }
}

/// How the branch filter of a view compares records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchMatch {
    ById,
    ByName,
}

/// A record kind the list controller can manage.
pub trait Resource: Clone + Debug + PartialEq + DeserializeOwned + Send + Sync + 'static {
    const ENDPOINTS: Endpoints;
    const BRANCH_MATCH: BranchMatch;

    fn schema() -> &'static Schema;

    fn id(&self) -> RecordId;

    /// Text matched by the search box.
    fn name(&self) -> &str;

    fn branch_id(&self) -> Option<RecordId>;

    fn branch_name(&self) -> Option<&str>;

    /// String form of one schema field, as a form would show it.
    fn field_value(&self, field: &str) -> Option<String>;
}
