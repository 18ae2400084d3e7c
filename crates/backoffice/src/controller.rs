//! Resource List Controller.
//!
//! The controller is a synchronous state machine. Operations that need the
//! server apply their immediate transition and hand back a [`Command`]; the
//! caller runs it against a [`Gateway`] whenever it likes and feeds the
//! [`Outcome`] to [`ResourceController::resolve`]. Outcomes may come back in
//! any order and interleaved with user input. List and get results carry a
//! ticket and are dropped when a newer request superseded them. Create and
//! update acknowledgements always reconcile the collection, but only close
//! the form whose submission they answer.
//!
//! Failed mutations never touch the authoritative collection.

use std::collections::HashMap;

use api_types::{RecordId, reference::Reference};

use crate::{
    draft::{Draft, Fields},
    error::{ControllerError, GatewayError},
    filter::{BranchFilter, ViewFilter},
    gateway::Gateway,
    resource::Resource,
    schema::ReferenceKind,
    store::FilteredListStore,
};

pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode<R> {
    Loading,
    Ready,
    Viewing(R),
    Editing { draft: Draft, submitting: bool },
    Creating { draft: Draft, submitting: bool },
    ConfirmDelete { id: RecordId, deleting: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    View,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A pending remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List { ticket: Ticket },
    References { kind: ReferenceKind },
    Get { ticket: Ticket, id: RecordId, intent: Intent },
    Create { ticket: Ticket, fields: Fields },
    Update { ticket: Ticket, id: RecordId, fields: Fields },
    Delete { id: RecordId },
}

/// Result of a [`Command`], ready for [`ResourceController::resolve`].
#[derive(Debug, Clone)]
pub enum Outcome<R> {
    Listed {
        ticket: Ticket,
        result: Result<Vec<R>, GatewayError>,
    },
    References {
        kind: ReferenceKind,
        result: Result<Vec<Reference>, GatewayError>,
    },
    Fetched {
        ticket: Ticket,
        id: RecordId,
        intent: Intent,
        result: Result<R, GatewayError>,
    },
    Created {
        ticket: Ticket,
        result: Result<R, GatewayError>,
    },
    Updated {
        ticket: Ticket,
        id: RecordId,
        result: Result<R, GatewayError>,
    },
    Deleted {
        id: RecordId,
        result: Result<(), GatewayError>,
    },
}

impl Command {
    pub async fn run<R: Resource, G: Gateway<R>>(self, gateway: &G) -> Outcome<R> {
        match self {
            Self::List { ticket } => Outcome::Listed {
                ticket,
                result: gateway.list().await,
            },
            Self::References { kind } => Outcome::References {
                kind,
                result: gateway.references(kind).await,
            },
            Self::Get { ticket, id, intent } => Outcome::Fetched {
                ticket,
                id,
                intent,
                result: gateway.get(id).await,
            },
            Self::Create { ticket, fields } => Outcome::Created {
                ticket,
                result: gateway.create(fields).await,
            },
            Self::Update { ticket, id, fields } => Outcome::Updated {
                ticket,
                id,
                result: gateway.update(id, fields).await,
            },
            Self::Delete { id } => Outcome::Deleted {
                id,
                result: gateway.delete(id).await,
            },
        }
    }
}

#[derive(Debug)]
pub struct ResourceController<R: Resource> {
    mode: Mode<R>,
    store: FilteredListStore<R>,
    filter: ViewFilter,
    options: HashMap<ReferenceKind, Vec<Reference>>,
    notice: Option<Notice>,
    last_ticket: Ticket,
    list_ticket: Option<Ticket>,
    selection_ticket: Option<Ticket>,
    submit_ticket: Option<Ticket>,
}

impl<R: Resource> Default for ResourceController<R> {
    fn default() -> Self {
        Self {
            mode: Mode::Ready,
            store: FilteredListStore::default(),
            filter: ViewFilter::default(),
            options: HashMap::new(),
            notice: None,
            last_ticket: 0,
            list_ticket: None,
            selection_ticket: None,
            submit_ticket: None,
        }
    }
}

impl<R: Resource> ResourceController<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode<R> {
        &self.mode
    }

    pub fn store(&self) -> &FilteredListStore<R> {
        &self.store
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn options(&self, kind: ReferenceKind) -> &[Reference] {
        self.options.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Draft behind the open form, if any.
    pub fn draft(&self) -> Option<&Draft> {
        match &self.mode {
            Mode::Editing { draft, .. } | Mode::Creating { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// A get for a selection is in flight.
    pub fn is_selecting(&self) -> bool {
        self.selection_ticket.is_some()
    }

    /// Reference lists this view needs: every reference field of the form,
    /// plus branches for the filter.
    pub fn reference_kinds() -> Vec<ReferenceKind> {
        let mut kinds = R::schema().references();
        if !kinds.contains(&ReferenceKind::Branch) {
            kinds.push(ReferenceKind::Branch);
        }
        kinds
    }

    /// Enters `Loading` and returns the primary list plus the reference
    /// lists, to be run concurrently.
    pub fn mount(&mut self) -> Vec<Command> {
        let mut commands = vec![self.start_list()];
        commands.extend(
            Self::reference_kinds()
                .into_iter()
                .map(|kind| Command::References { kind }),
        );
        commands
    }

    /// Re-fetches the primary list. A pending list result is superseded.
    pub fn refresh(&mut self) -> Command {
        self.start_list()
    }

    fn start_list(&mut self) -> Command {
        let ticket = self.next_ticket();
        self.list_ticket = Some(ticket);
        if self.mode == Mode::Ready {
            self.mode = Mode::Loading;
        }
        Command::List { ticket }
    }

    fn next_ticket(&mut self) -> Ticket {
        self.last_ticket += 1;
        self.last_ticket
    }

    pub fn select_for_view(&mut self, id: RecordId) -> Result<Command, ControllerError> {
        self.select(id, Intent::View)
    }

    pub fn select_for_edit(&mut self, id: RecordId) -> Result<Command, ControllerError> {
        self.select(id, Intent::Edit)
    }

    fn select(&mut self, id: RecordId, intent: Intent) -> Result<Command, ControllerError> {
        if !matches!(self.mode, Mode::Ready | Mode::Loading) {
            return Err(ControllerError::Busy);
        }
        if self.store.get(id).is_none() {
            return Err(ControllerError::UnknownRecord(id));
        }
        let ticket = self.next_ticket();
        self.selection_ticket = Some(ticket);
        Ok(Command::Get { ticket, id, intent })
    }

    /// Opens an empty draft for a new record.
    pub fn start_create(&mut self) -> Result<(), ControllerError> {
        if !matches!(self.mode, Mode::Ready | Mode::Loading) {
            return Err(ControllerError::Busy);
        }
        self.selection_ticket = None;
        self.mode = Mode::Creating {
            draft: Draft::empty(R::schema()),
            submitting: false,
        };
        Ok(())
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), ControllerError> {
        match &mut self.mode {
            Mode::Editing {
                draft,
                submitting: false,
            }
            | Mode::Creating {
                draft,
                submitting: false,
            } => draft.set_field(name, value),
            Mode::Editing { .. } | Mode::Creating { .. } => Err(ControllerError::Busy),
            _ => Err(ControllerError::NothingSelected),
        }
    }

    /// Submits whichever form is open.
    pub fn submit(&mut self) -> Result<Option<Command>, ControllerError> {
        match self.mode {
            Mode::Creating { .. } => self.submit_create().map(Some),
            Mode::Editing { .. } => self.submit_edit(),
            _ => Err(ControllerError::NothingSelected),
        }
    }

    /// Sends the changed fields of the edit draft. An unchanged draft closes
    /// without a call and yields `None`.
    pub fn submit_edit(&mut self) -> Result<Option<Command>, ControllerError> {
        let Mode::Editing { draft, submitting } = &mut self.mode else {
            return Err(ControllerError::NothingSelected);
        };
        if *submitting {
            return Err(ControllerError::Busy);
        }
        let id = draft.record_id().ok_or(ControllerError::NothingSelected)?;
        if !draft.is_complete() {
            let err = ControllerError::Incomplete(draft.invalid_fields());
            self.notice = Some(Notice::error(capitalize(&err.to_string())));
            return Err(err);
        }
        if !draft.is_dirty() {
            self.mode = Mode::Ready;
            self.notice = Some(Notice::info("No changes."));
            return Ok(None);
        }
        *submitting = true;
        self.last_ticket += 1;
        self.submit_ticket = Some(self.last_ticket);
        Ok(Some(Command::Update {
            ticket: self.last_ticket,
            id,
            fields: draft.changes(),
        }))
    }

    pub fn submit_create(&mut self) -> Result<Command, ControllerError> {
        let Mode::Creating { draft, submitting } = &mut self.mode else {
            return Err(ControllerError::NothingSelected);
        };
        if *submitting {
            return Err(ControllerError::Busy);
        }
        if !draft.is_complete() {
            let err = ControllerError::Incomplete(draft.invalid_fields());
            self.notice = Some(Notice::error(capitalize(&err.to_string())));
            return Err(err);
        }
        *submitting = true;
        self.last_ticket += 1;
        self.submit_ticket = Some(self.last_ticket);
        Ok(Command::Create {
            ticket: self.last_ticket,
            fields: draft.payload(),
        })
    }

    /// Opens the confirmation gate; nothing is sent until
    /// [`confirm_delete`](Self::confirm_delete).
    pub fn request_delete(&mut self, id: RecordId) -> Result<(), ControllerError> {
        if !matches!(self.mode, Mode::Ready | Mode::Loading) {
            return Err(ControllerError::Busy);
        }
        if self.store.get(id).is_none() {
            return Err(ControllerError::UnknownRecord(id));
        }
        self.selection_ticket = None;
        self.mode = Mode::ConfirmDelete {
            id,
            deleting: false,
        };
        Ok(())
    }

    pub fn confirm_delete(&mut self) -> Result<Command, ControllerError> {
        match &mut self.mode {
            Mode::ConfirmDelete { id, deleting } if !*deleting => {
                *deleting = true;
                Ok(Command::Delete { id: *id })
            }
            Mode::ConfirmDelete { .. } => Err(ControllerError::Busy),
            _ => Err(ControllerError::NothingSelected),
        }
    }

    /// Closes the open view, form or confirmation, discarding any draft.
    /// A submission still in flight is applied to the collection when it
    /// lands but no longer owns the form.
    pub fn cancel(&mut self) {
        self.selection_ticket = None;
        self.submit_ticket = None;
        if !matches!(self.mode, Mode::Loading) {
            self.mode = Mode::Ready;
        }
    }

    pub fn on_branch_filter_change(&mut self, branch: Option<&Reference>) {
        self.filter.branch = BranchFilter::for_resource::<R>(branch);
        self.store.set_predicate(self.filter.predicate());
    }

    pub fn on_search_term_change(&mut self, term: &str) {
        self.filter.search = term.to_string();
        self.store.set_predicate(self.filter.predicate());
    }

    /// Runs `command` and applies its outcome. Handy when no other work
    /// needs to interleave.
    pub async fn dispatch<G: Gateway<R>>(&mut self, gateway: &G, command: Command) {
        let outcome = command.run(gateway).await;
        self.resolve(outcome);
    }

    pub fn resolve(&mut self, outcome: Outcome<R>) {
        match outcome {
            Outcome::Listed { ticket, result } => self.resolve_list(ticket, result),
            Outcome::References { kind, result } => self.resolve_references(kind, result),
            Outcome::Fetched {
                ticket,
                id,
                intent,
                result,
            } => self.resolve_fetch(ticket, id, intent, result),
            Outcome::Created { ticket, result } => self.resolve_create(ticket, result),
            Outcome::Updated { ticket, id, result } => self.resolve_update(ticket, id, result),
            Outcome::Deleted { id, result } => self.resolve_delete(id, result),
        }
    }

    fn resolve_list(&mut self, ticket: Ticket, result: Result<Vec<R>, GatewayError>) {
        if self.list_ticket != Some(ticket) {
            tracing::debug!("dropping superseded list result {ticket}");
            return;
        }
        self.list_ticket = None;
        match result {
            Ok(records) => {
                tracing::debug!("{} list: {} records", R::schema().title, records.len());
                self.store.set_collection(records);
            }
            Err(err) => {
                tracing::warn!("{} list failed: {err}", R::schema().title);
                self.store.set_collection(Vec::new());
                self.notice = Some(Notice::error(err.user_message()));
            }
        }
        if self.mode == Mode::Loading {
            self.mode = Mode::Ready;
        }
    }

    fn resolve_references(
        &mut self,
        kind: ReferenceKind,
        result: Result<Vec<Reference>, GatewayError>,
    ) {
        match result {
            Ok(options) => {
                self.options.insert(kind, options);
            }
            Err(err) => {
                tracing::warn!("{} options failed: {err}", kind.label());
                if self.notice.is_none() {
                    self.notice = Some(Notice::error(format!(
                        "Could not load {} options: {}",
                        kind.label().to_lowercase(),
                        err.user_message()
                    )));
                }
            }
        }
    }

    fn resolve_fetch(
        &mut self,
        ticket: Ticket,
        id: RecordId,
        intent: Intent,
        result: Result<R, GatewayError>,
    ) {
        if self.selection_ticket != Some(ticket) {
            tracing::debug!("dropping superseded fetch of {id}");
            return;
        }
        self.selection_ticket = None;
        match result {
            Ok(record) => {
                self.store.apply_update(id, record.clone());
                self.mode = match intent {
                    Intent::View => Mode::Viewing(record),
                    Intent::Edit => Mode::Editing {
                        draft: Draft::from_record(&record),
                        submitting: false,
                    },
                };
            }
            Err(GatewayError::NotFound) => {
                self.store.apply_delete(id);
                self.notice = Some(Notice::error(GatewayError::NotFound.user_message()));
            }
            Err(err) => {
                self.notice = Some(Notice::error(err.user_message()));
            }
        }
    }

    /// Takes the submission ticket if `ticket` is the one the open form is
    /// waiting on.
    fn claim_submission(&mut self, ticket: Ticket) -> bool {
        if self.submit_ticket == Some(ticket) {
            self.submit_ticket = None;
            true
        } else {
            tracing::debug!("submission {ticket} no longer owns the form");
            false
        }
    }

    fn resolve_create(&mut self, ticket: Ticket, result: Result<R, GatewayError>) {
        let owns_form = self.claim_submission(ticket);
        match result {
            Ok(record) => {
                self.store.apply_insert(record);
                if owns_form {
                    self.mode = Mode::Ready;
                }
                self.notice = Some(Notice::success(format!("{} created.", R::schema().title)));
            }
            Err(err) => {
                if owns_form && let Mode::Creating { submitting, .. } = &mut self.mode {
                    *submitting = false;
                }
                self.notice = Some(Notice::error(err.user_message()));
            }
        }
    }

    fn resolve_update(&mut self, ticket: Ticket, id: RecordId, result: Result<R, GatewayError>) {
        let owns_form = self.claim_submission(ticket);
        match result {
            Ok(record) => {
                self.store.apply_update(id, record);
                if owns_form {
                    self.mode = Mode::Ready;
                }
                self.notice = Some(Notice::success(format!("{} saved.", R::schema().title)));
            }
            Err(GatewayError::NotFound) => {
                self.store.apply_delete(id);
                if owns_form {
                    self.mode = Mode::Ready;
                }
                self.notice = Some(Notice::error(GatewayError::NotFound.user_message()));
            }
            Err(err) => {
                if owns_form && let Mode::Editing { submitting, .. } = &mut self.mode {
                    *submitting = false;
                }
                self.notice = Some(Notice::error(err.user_message()));
            }
        }
    }

    fn resolve_delete(&mut self, id: RecordId, result: Result<(), GatewayError>) {
        match result {
            Ok(()) => {
                self.store.apply_delete(id);
                self.notice = Some(Notice::success(format!("{} deleted.", R::schema().title)));
            }
            Err(GatewayError::NotFound) => {
                self.store.apply_delete(id);
                self.notice = Some(Notice::info("Already deleted."));
            }
            Err(err) => {
                self.notice = Some(Notice::error(err.user_message()));
            }
        }
        if matches!(self.mode, Mode::ConfirmDelete { id: pending, .. } if pending == id) {
            self.mode = Mode::Ready;
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
