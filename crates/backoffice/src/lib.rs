//! Back office core.
//!
//! One generic list controller drives every managed record kind: it fetches
//! the collection, filters it locally, edits a draft copy of one record and
//! reconciles the collection with the server's answer without refetching.

pub mod controller;
pub mod draft;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod session;
pub mod store;

pub use api_types::{
    RecordId, batch::Batch, category::Category, expense::Expense, reference::Reference,
};
pub use controller::{Command, Intent, Mode, Notice, NoticeLevel, Outcome, ResourceController};
pub use draft::{Draft, Fields};
pub use error::{ControllerError, GatewayError};
pub use filter::{BranchFilter, ViewFilter};
pub use gateway::{ApiClient, Gateway, HttpGateway};
pub use resource::Resource;
pub use schema::{FieldDescriptor, FieldKind, ReferenceKind, Schema};
pub use session::{ChainedTokens, SessionFile, StaticToken, TokenSource};
pub use store::FilteredListStore;
