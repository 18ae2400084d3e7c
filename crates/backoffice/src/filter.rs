//! Client-side filter predicates. Filtering never touches the network.

use std::sync::Arc;

use api_types::{RecordId, reference::Reference};

use crate::resource::{BranchMatch, Resource};

pub type Predicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Branch-name value that matches every record.
pub const ALL_BRANCHES: &str = "all";

pub fn match_all<R: 'static>() -> Predicate<R> {
    Arc::new(|_: &R| true)
}

pub fn branch_id_is<R: Resource>(branch_id: RecordId) -> Predicate<R> {
    Arc::new(move |record: &R| record.branch_id() == Some(branch_id))
}

/// Exact branch-name equality; [`ALL_BRANCHES`] matches everything.
pub fn branch_name_is<R: Resource>(name: &str) -> Predicate<R> {
    if name.eq_ignore_ascii_case(ALL_BRANCHES) {
        return match_all();
    }
    let name = name.to_string();
    Arc::new(move |record: &R| record.branch_name() == Some(name.as_str()))
}

/// Case-insensitive substring match on the record name.
pub fn name_contains<R: Resource>(term: &str) -> Predicate<R> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return match_all();
    }
    Arc::new(move |record: &R| record.name().to_lowercase().contains(&needle))
}

pub fn all_of<R: 'static>(predicates: Vec<Predicate<R>>) -> Predicate<R> {
    Arc::new(move |record: &R| predicates.iter().all(|p| p(record)))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BranchFilter {
    #[default]
    All,
    Id(RecordId),
    Name(String),
}

impl BranchFilter {
    /// Filter selecting `branch`, compared the way `R` compares branches.
    pub fn for_resource<R: Resource>(branch: Option<&Reference>) -> Self {
        match (branch, R::BRANCH_MATCH) {
            (None, _) => Self::All,
            (Some(branch), BranchMatch::ById) => Self::Id(branch.id),
            (Some(branch), BranchMatch::ByName) => Self::by_name(&branch.display_name),
        }
    }

    pub fn by_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case(ALL_BRANCHES) {
            Self::All
        } else {
            Self::Name(name.to_string())
        }
    }

    fn predicate<R: Resource>(&self) -> Predicate<R> {
        match self {
            Self::All => match_all(),
            Self::Id(id) => branch_id_is(*id),
            Self::Name(name) => branch_name_is(name),
        }
    }
}

/// Filter controls of one list view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub branch: BranchFilter,
    pub search: String,
}

impl ViewFilter {
    pub fn is_empty(&self) -> bool {
        self.branch == BranchFilter::All && self.search.trim().is_empty()
    }

    pub fn predicate<R: Resource>(&self) -> Predicate<R> {
        if self.is_empty() {
            return match_all();
        }
        all_of(vec![
            self.branch.predicate::<R>(),
            name_contains::<R>(&self.search),
        ])
    }
}
