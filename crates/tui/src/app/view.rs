use tokio::sync::mpsc::UnboundedSender;

use backoffice::{
    Command, ControllerError, FieldKind, HttpGateway, Mode, Notice, Outcome, RecordId,
    ReferenceKind, Resource, ResourceController,
};

use crate::ui::keymap::AppAction;

use super::Completion;

/// What the keyboard currently drives in a resource tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    List,
    Search,
    Detail,
    Form,
    Confirm,
}

#[derive(Debug, PartialEq, Eq)]
pub enum KeyResult {
    Handled,
    /// Left for the app: tab switching and quitting.
    Unhandled(AppAction),
}

/// One tab: a list controller, its gateway and the cursor/focus state the
/// controller does not track.
pub struct ResourceView<R: Resource> {
    pub controller: ResourceController<R>,
    gateway: HttpGateway<R>,
    wrap: fn(Outcome<R>) -> Completion,
    pub cursor: usize,
    /// Focused field of the open form.
    pub focus: usize,
    /// Search text being typed, `None` when the search box is closed.
    pub search_input: Option<String>,
    branch_choice: usize,
    mounted: bool,
}

impl<R: Resource> ResourceView<R> {
    pub fn new(gateway: HttpGateway<R>, wrap: fn(Outcome<R>) -> Completion) -> Self {
        Self {
            controller: ResourceController::new(),
            gateway,
            wrap,
            cursor: 0,
            focus: 0,
            search_input: None,
            branch_choice: 0,
            mounted: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.search_input.is_some() {
            return Phase::Search;
        }
        match self.controller.mode() {
            Mode::Loading | Mode::Ready => Phase::List,
            Mode::Viewing(_) => Phase::Detail,
            Mode::Editing { .. } | Mode::Creating { .. } => Phase::Form,
            Mode::ConfirmDelete { .. } => Phase::Confirm,
        }
    }

    /// First visit loads the list and the option lists.
    pub fn mount(&mut self, tx: &UnboundedSender<Completion>) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        for command in self.controller.mount() {
            self.spawn(command, tx);
        }
    }

    pub fn refresh(&mut self, tx: &UnboundedSender<Completion>) {
        let command = self.controller.refresh();
        self.spawn(command, tx);
    }

    fn spawn(&self, command: Command, tx: &UnboundedSender<Completion>) {
        let gateway = self.gateway.clone();
        let wrap = self.wrap;
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = command.run::<R, _>(&gateway).await;
            if tx.send(wrap(outcome)).is_err() {
                tracing::debug!("event loop closed, dropping {} outcome", R::schema().title);
            }
        });
    }

    pub fn resolve(&mut self, outcome: Outcome<R>) {
        self.controller.resolve(outcome);
        self.clamp_cursor();
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        let notice = self.controller.notice().cloned();
        self.controller.clear_notice();
        notice
    }

    pub fn selected(&self) -> Option<&R> {
        self.controller.store().view_get(self.cursor)
    }

    /// Branch the filter currently selects, `None` for all branches.
    pub fn branch_label(&self) -> Option<&str> {
        let branches = self.controller.options(ReferenceKind::Branch);
        self.branch_choice
            .checked_sub(1)
            .and_then(|idx| branches.get(idx))
            .map(|branch| branch.display_name.as_str())
    }

    fn selected_id(&self) -> Result<RecordId, ControllerError> {
        self.selected()
            .map(Resource::id)
            .ok_or(ControllerError::NothingSelected)
    }

    fn clamp_cursor(&mut self) {
        let len = self.controller.store().view_len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn handle_key(
        &mut self,
        action: AppAction,
        tx: &UnboundedSender<Completion>,
    ) -> Result<KeyResult, ControllerError> {
        match self.phase() {
            Phase::Search => self.search_key(action),
            Phase::List => self.list_key(action, tx),
            Phase::Detail => self.detail_key(action, tx),
            Phase::Form => self.form_key(action, tx),
            Phase::Confirm => self.confirm_key(action, tx),
        }
    }

    fn search_key(&mut self, action: AppAction) -> Result<KeyResult, ControllerError> {
        let Some(input) = self.search_input.as_mut() else {
            return Ok(KeyResult::Handled);
        };
        match action {
            AppAction::Input(ch) => input.push(ch),
            AppAction::Backspace => {
                input.pop();
            }
            AppAction::Submit => {
                self.search_input = None;
                return Ok(KeyResult::Handled);
            }
            AppAction::Cancel => input.clear(),
            _ => return Ok(KeyResult::Handled),
        }
        let term = input.clone();
        if action == AppAction::Cancel {
            self.search_input = None;
        }
        self.controller.on_search_term_change(&term);
        self.cursor = 0;
        Ok(KeyResult::Handled)
    }

    fn list_key(
        &mut self,
        action: AppAction,
        tx: &UnboundedSender<Completion>,
    ) -> Result<KeyResult, ControllerError> {
        match action {
            AppAction::Up | AppAction::Input('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            AppAction::Down | AppAction::Input('j') => {
                self.cursor += 1;
                self.clamp_cursor();
            }
            AppAction::Submit => {
                let command = self.controller.select_for_view(self.selected_id()?)?;
                self.spawn(command, tx);
            }
            AppAction::Input('e') => {
                let command = self.controller.select_for_edit(self.selected_id()?)?;
                self.spawn(command, tx);
            }
            AppAction::Input('c') => {
                self.controller.start_create()?;
                self.focus = 0;
            }
            AppAction::Input('d') => {
                self.controller.request_delete(self.selected_id()?)?;
            }
            AppAction::Input('r') => self.refresh(tx),
            AppAction::Input('/') => {
                self.search_input = Some(self.controller.filter().search.clone());
            }
            AppAction::Input('b') => self.cycle_branch(),
            other => return Ok(KeyResult::Unhandled(other)),
        }
        Ok(KeyResult::Handled)
    }

    fn cycle_branch(&mut self) {
        let count = self.controller.options(ReferenceKind::Branch).len();
        self.branch_choice = (self.branch_choice + 1) % (count + 1);
        let branch = self
            .branch_choice
            .checked_sub(1)
            .and_then(|idx| self.controller.options(ReferenceKind::Branch).get(idx))
            .cloned();
        self.controller.on_branch_filter_change(branch.as_ref());
        self.cursor = 0;
    }

    fn detail_key(
        &mut self,
        action: AppAction,
        tx: &UnboundedSender<Completion>,
    ) -> Result<KeyResult, ControllerError> {
        match action {
            AppAction::Cancel | AppAction::Submit | AppAction::Input('b') => {
                self.controller.cancel();
            }
            AppAction::Input('e') => {
                let Mode::Viewing(record) = self.controller.mode() else {
                    return Ok(KeyResult::Handled);
                };
                let id = record.id();
                self.controller.cancel();
                let command = self.controller.select_for_edit(id)?;
                self.spawn(command, tx);
            }
            other => return Ok(KeyResult::Unhandled(other)),
        }
        Ok(KeyResult::Handled)
    }

    fn form_key(
        &mut self,
        action: AppAction,
        tx: &UnboundedSender<Completion>,
    ) -> Result<KeyResult, ControllerError> {
        let field_count = self
            .controller
            .draft()
            .map_or(0, |draft| draft.schema().fields.len());
        match action {
            AppAction::Cancel => self.controller.cancel(),
            AppAction::NextField | AppAction::Down => {
                self.focus = (self.focus + 1) % field_count.max(1);
            }
            AppAction::PrevField | AppAction::Up => {
                self.focus = (self.focus + field_count.max(1) - 1) % field_count.max(1);
            }
            AppAction::Left => self.cycle_option(-1)?,
            AppAction::Right => self.cycle_option(1)?,
            AppAction::Input(ch) => self.edit_focused(|value| value.push(ch))?,
            AppAction::Backspace => self.edit_focused(|value| {
                value.pop();
            })?,
            AppAction::Submit => {
                if let Some(command) = self.controller.submit()? {
                    self.spawn(command, tx);
                }
            }
            _ => {}
        }
        Ok(KeyResult::Handled)
    }

    /// Applies `edit` to the focused field when it is free text.
    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) -> Result<(), ControllerError> {
        let Some(draft) = self.controller.draft() else {
            return Err(ControllerError::NothingSelected);
        };
        let Some((field, current)) = draft.fields().nth(self.focus) else {
            return Ok(());
        };
        if matches!(field.kind, FieldKind::Enum(_) | FieldKind::Reference(_)) {
            return Ok(());
        }
        let mut value = current.to_string();
        edit(&mut value);
        self.controller.set_field(field.name, value)
    }

    /// Steps an enum or reference field through its options.
    fn cycle_option(&mut self, step: isize) -> Result<(), ControllerError> {
        let Some(draft) = self.controller.draft() else {
            return Err(ControllerError::NothingSelected);
        };
        let Some((field, current)) = draft.fields().nth(self.focus) else {
            return Ok(());
        };
        let choices: Vec<String> = match field.kind {
            FieldKind::Enum(values) => values.iter().map(|value| value.to_string()).collect(),
            FieldKind::Reference(kind) => self
                .controller
                .options(kind)
                .iter()
                .map(|option| option.id.to_string())
                .collect(),
            _ => return Ok(()),
        };
        if choices.is_empty() {
            return Ok(());
        }
        let len = choices.len() as isize;
        let next = match choices.iter().position(|choice| choice == current) {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None if step > 0 => 0,
            None => len - 1,
        };
        let name = field.name;
        let value = choices[next as usize].clone();
        self.controller.set_field(name, value)
    }

    fn confirm_key(
        &mut self,
        action: AppAction,
        tx: &UnboundedSender<Completion>,
    ) -> Result<KeyResult, ControllerError> {
        match action {
            AppAction::Input('y') | AppAction::Input('Y') => {
                let command = self.controller.confirm_delete()?;
                self.spawn(command, tx);
            }
            AppAction::Input('n') | AppAction::Input('N') | AppAction::Cancel => {
                if matches!(
                    self.controller.mode(),
                    Mode::ConfirmDelete {
                        deleting: false,
                        ..
                    }
                ) {
                    self.controller.cancel();
                }
            }
            _ => {}
        }
        Ok(KeyResult::Handled)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::sync::mpsc;

    use backoffice::{ApiClient, Category, Expense, Reference, StaticToken};

    use super::*;

    fn gateway<R: Resource>() -> HttpGateway<R> {
        let client = ApiClient::new(
            "http://127.0.0.1:9/api",
            Duration::from_secs(1),
            Arc::new(StaticToken(None)),
        )
        .unwrap();
        HttpGateway::new(client)
    }

    fn category(id: RecordId, name: &str, branch_id: RecordId) -> Category {
        Category {
            id,
            name: name.to_string(),
            branch_id: Some(branch_id),
            branch: None,
        }
    }

    fn seeded() -> ResourceView<Category> {
        let mut view = ResourceView::new(gateway(), Completion::Categories);
        let Command::List { ticket } = view.controller.refresh() else {
            panic!("refresh must list");
        };
        view.resolve(Outcome::Listed {
            ticket,
            result: Ok(vec![
                category(1, "Rent", 5),
                category(2, "Snacks", 6),
                category(3, "Stationery", 5),
            ]),
        });
        view.resolve(Outcome::References {
            kind: ReferenceKind::Branch,
            result: Ok(vec![
                Reference::new(5, "Downtown"),
                Reference::new(6, "Uptown"),
            ]),
        });
        view
    }

    fn press(view: &mut ResourceView<Category>, keys: &[AppAction]) {
        let (tx, _rx) = mpsc::unbounded_channel();
        for key in keys {
            view.handle_key(*key, &tx).unwrap();
        }
    }

    fn visible(view: &ResourceView<Category>) -> Vec<&str> {
        view.controller
            .store()
            .view()
            .map(|c| c.name.as_str())
            .collect()
    }

    #[test]
    fn search_filters_while_typing_and_escape_clears() {
        let mut view = seeded();
        press(&mut view, &[AppAction::Input('/')]);
        assert_eq!(view.phase(), Phase::Search);

        press(&mut view, &[AppAction::Input('S'), AppAction::Input('n')]);
        assert_eq!(visible(&view), vec!["Snacks"]);

        press(&mut view, &[AppAction::Cancel]);
        assert_eq!(view.phase(), Phase::List);
        assert_eq!(visible(&view).len(), 3);
    }

    #[test]
    fn enter_keeps_the_search_term() {
        let mut view = seeded();
        press(
            &mut view,
            &[AppAction::Input('/'), AppAction::Input('r'), AppAction::Submit],
        );
        assert_eq!(view.phase(), Phase::List);
        assert_eq!(view.controller.filter().search, "r");
        assert_eq!(visible(&view), vec!["Rent", "Stationery"]);
    }

    #[test]
    fn branch_cycle_wraps_back_to_all() {
        let mut view = seeded();
        press(&mut view, &[AppAction::Input('b')]);
        assert_eq!(view.branch_label(), Some("Downtown"));
        assert_eq!(visible(&view), vec!["Rent", "Stationery"]);

        press(&mut view, &[AppAction::Input('b')]);
        assert_eq!(view.branch_label(), Some("Uptown"));
        assert_eq!(visible(&view), vec!["Snacks"]);

        press(&mut view, &[AppAction::Input('b')]);
        assert_eq!(view.branch_label(), None);
        assert_eq!(visible(&view).len(), 3);
    }

    #[test]
    fn cursor_stays_inside_the_view() {
        let mut view = seeded();
        press(&mut view, &[AppAction::Down, AppAction::Down, AppAction::Down]);
        assert_eq!(view.cursor, 2);
        press(&mut view, &[AppAction::Input('k')]);
        assert_eq!(view.cursor, 1);
    }

    #[test]
    fn tab_and_quit_keys_are_left_to_the_app() {
        let mut view = seeded();
        let (tx, _rx) = mpsc::unbounded_channel();
        assert_eq!(
            view.handle_key(AppAction::Input('q'), &tx),
            Ok(KeyResult::Unhandled(AppAction::Input('q')))
        );
        assert_eq!(
            view.handle_key(AppAction::Input('2'), &tx),
            Ok(KeyResult::Unhandled(AppAction::Input('2')))
        );
    }

    #[test]
    fn declining_delete_returns_to_the_list() {
        let mut view = seeded();
        press(&mut view, &[AppAction::Input('d')]);
        assert_eq!(view.phase(), Phase::Confirm);
        press(&mut view, &[AppAction::Input('n')]);
        assert_eq!(view.phase(), Phase::List);
        assert_eq!(visible(&view).len(), 3);
    }

    #[test]
    fn typing_in_a_form_does_not_leak_list_keys() {
        let mut view = seeded();
        press(&mut view, &[AppAction::Input('c')]);
        assert_eq!(view.phase(), Phase::Form);

        // 'd' and 'q' are text here, not delete or quit.
        press(
            &mut view,
            &[AppAction::Input('d'), AppAction::Input('q'), AppAction::Backspace],
        );
        let draft = view.controller.draft().unwrap();
        assert_eq!(draft.value("name"), Some("d"));
    }

    #[test]
    fn reference_fields_cycle_options_and_ignore_typing() {
        let mut view: ResourceView<Expense> = ResourceView::new(gateway(), Completion::Expenses);
        view.resolve(Outcome::References {
            kind: ReferenceKind::Category,
            result: Ok(vec![Reference::new(1, "Rent"), Reference::new(2, "Snacks")]),
        });
        let (tx, _rx) = mpsc::unbounded_channel();
        for key in [AppAction::Input('c'), AppAction::Input('x'), AppAction::Right, AppAction::Right] {
            view.handle_key(key, &tx).unwrap();
        }
        assert_eq!(view.controller.draft().unwrap().value("category_id"), Some("2"));

        view.handle_key(AppAction::Right, &tx).unwrap();
        assert_eq!(view.controller.draft().unwrap().value("category_id"), Some("1"));

        view.handle_key(AppAction::Left, &tx).unwrap();
        assert_eq!(view.controller.draft().unwrap().value("category_id"), Some("2"));
    }

    #[test]
    fn enum_field_starts_from_the_end_when_stepping_back() {
        let mut view: ResourceView<Expense> = ResourceView::new(gateway(), Completion::Expenses);
        let (tx, _rx) = mpsc::unbounded_channel();
        view.handle_key(AppAction::Input('c'), &tx).unwrap();
        // category, branch, payment_to, amount, payment_mode
        for _ in 0..4 {
            view.handle_key(AppAction::NextField, &tx).unwrap();
        }
        view.handle_key(AppAction::Left, &tx).unwrap();
        assert_eq!(
            view.controller.draft().unwrap().value("payment_mode"),
            Some("Cheque")
        );
    }

    #[test]
    fn incomplete_submit_is_rejected_without_a_call() {
        let mut view = seeded();
        let (tx, mut rx) = mpsc::unbounded_channel();
        view.handle_key(AppAction::Input('c'), &tx).unwrap();
        let err = view.handle_key(AppAction::Submit, &tx).unwrap_err();
        assert!(matches!(err, ControllerError::Incomplete(_)));
        assert_eq!(view.phase(), Phase::Form);
        assert!(rx.try_recv().is_err());
    }
}
