//! Client-side synchronization of the todo list with the gateway.
//!
//! # Design
//! `TodoState` is an explicitly owned container and `reduce` is a pure
//! `(state, action) -> state` function over it. `TodoSession` is the only
//! place that performs I/O: it builds a request, hands it to the host's
//! `Transport`, parses the response and dispatches exactly one action.
//!
//! Local state only changes on a server response. There is no optimistic
//! insert, update or removal, and no retry: a failure becomes a single
//! user-facing message in `last_error`.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::TodoClient;
use crate::edit::EditState;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// The client's view of the todo list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Records in list order (newest `created_at` first).
    pub todos: Vec<Todo>,
    pub last_error: Option<String>,
    /// True between the start and the outcome of a full load.
    pub loading: bool,
}

impl TodoState {
    pub fn get(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadStarted,
    /// Replace the whole list with a List result.
    Loaded(Vec<Todo>),
    /// Prepend a record returned by Create.
    Added(Todo),
    /// Swap in a record returned by Update, keeping its position.
    Updated(Todo),
    /// Drop the record after a successful Delete.
    Removed(Uuid),
    Failed(String),
    ClearError,
}

pub fn reduce(mut state: TodoState, action: Action) -> TodoState {
    match action {
        Action::LoadStarted => state.loading = true,
        Action::Loaded(todos) => {
            let mut unique: Vec<Todo> = Vec::with_capacity(todos.len());
            for todo in todos {
                if !unique.iter().any(|t| t.id == todo.id) {
                    unique.push(todo);
                }
            }
            state.todos = unique;
            state.loading = false;
        }
        Action::Added(todo) => {
            state.todos.retain(|t| t.id != todo.id);
            state.todos.insert(0, todo);
        }
        Action::Updated(todo) => {
            // A record removed while its update was in flight stays removed.
            if let Some(slot) = state.todos.iter_mut().find(|t| t.id == todo.id) {
                *slot = todo;
            }
        }
        Action::Removed(id) => state.todos.retain(|t| t.id != id),
        Action::Failed(message) => {
            state.last_error = Some(message);
            state.loading = false;
        }
        Action::ClearError => state.last_error = None,
    }
    state
}

/// Executes an `HttpRequest` on behalf of the core.
pub trait Transport {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<F> Transport for F
where
    F: FnMut(HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Load,
    Add,
    Update,
    Remove,
}

impl Operation {
    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Load => "Failed to fetch todos",
            Operation::Add => "Failed to add todo",
            Operation::Update => "Failed to update todo",
            Operation::Remove => "Failed to delete todo",
        }
    }
}

/// The message shown to the user for a failed operation.
fn failure_message(op: Operation, err: &ApiError) -> String {
    match err {
        ApiError::InvalidInput(message) if !message.is_empty() => message.clone(),
        ApiError::NotFound => "Todo not found".to_string(),
        _ => op.fallback_message().to_string(),
    }
}

/// Owns the client, the host transport and the local state.
pub struct TodoSession<T: Transport> {
    client: TodoClient,
    transport: T,
    state: TodoState,
}

impl<T: Transport> TodoSession<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self {
            client,
            transport,
            state: TodoState::default(),
        }
    }

    pub fn state(&self) -> &TodoState {
        &self.state
    }

    pub fn todos(&self) -> &[Todo] {
        &self.state.todos
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    fn fail(&mut self, op: Operation, err: ApiError) -> ApiError {
        warn!(?op, error = %err, "todo request failed");
        self.dispatch(Action::Failed(failure_message(op, &err)));
        err
    }

    fn round_trip<R>(
        &mut self,
        op: Operation,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&TodoClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let outcome = request.and_then(|request| {
            debug!(?op, method = request.method.as_str(), path = %request.path, "sending todo request");
            self.transport.execute(request)
        });
        match outcome.and_then(|response| parse(&self.client, response)) {
            Ok(value) => Ok(value),
            Err(err) => Err(self.fail(op, err)),
        }
    }

    /// Fetch the full list and replace local state with it. On failure the
    /// previous list is kept.
    pub fn load(&mut self) -> Result<(), ApiError> {
        self.dispatch(Action::LoadStarted);
        let request = Ok(self.client.build_list_todos());
        let todos = self.round_trip(Operation::Load, request, TodoClient::parse_list_todos)?;
        self.dispatch(Action::Loaded(todos));
        Ok(())
    }

    pub fn add(&mut self, title: &str, description: Option<&str>) -> Result<Todo, ApiError> {
        let input = CreateTodo {
            title: title.to_string(),
            description: description.map(str::to_string),
        };
        let request = self.client.build_create_todo(&input);
        let todo = self.round_trip(Operation::Add, request, TodoClient::parse_create_todo)?;
        self.dispatch(Action::Added(todo.clone()));
        Ok(todo)
    }

    pub fn apply_update(&mut self, update: UpdateTodo) -> Result<Todo, ApiError> {
        let request = self.client.build_update_todo(&update);
        let todo = self.round_trip(Operation::Update, request, TodoClient::parse_update_todo)?;
        self.dispatch(Action::Updated(todo.clone()));
        Ok(todo)
    }

    pub fn toggle_complete(&mut self, todo: &Todo) -> Result<Todo, ApiError> {
        self.apply_update(UpdateTodo::new(todo.id).completed(!todo.completed))
    }

    pub fn remove(&mut self, id: Uuid) -> Result<(), ApiError> {
        let request = self.client.build_delete_todo(id);
        self.round_trip(Operation::Remove, request, TodoClient::parse_delete_todo)?;
        self.dispatch(Action::Removed(id));
        Ok(())
    }

    pub fn clear_error(&mut self) {
        self.dispatch(Action::ClearError);
    }

    /// Save a row's draft. `edit` returns to `NotEditing` only when the
    /// update succeeds; on any failure the draft is left for a retry.
    pub fn save_edit(&mut self, id: Uuid, edit: &mut EditState) -> Result<(), ApiError> {
        let EditState::Editing(draft) = edit else {
            return Ok(());
        };
        let update = match draft.to_update(id) {
            Ok(update) => update,
            Err(err) => {
                self.dispatch(Action::Failed(err.to_string()));
                return Err(err);
            }
        };
        self.apply_update(update)?;
        edit.cancel();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use std::collections::VecDeque;

    fn todo(n: u128, title: &str) -> Todo {
        let at = "2024-05-01T10:00:00Z".parse().unwrap();
        Todo {
            id: Uuid::from_u128(n),
            title: title.to_string(),
            description: None,
            completed: false,
            created_at: at,
            updated_at: at,
        }
    }

    fn json(todo: &Todo) -> String {
        serde_json::to_string(todo).unwrap()
    }

    /// Replays canned responses and records every request it was given.
    #[derive(Default)]
    struct Scripted {
        responses: VecDeque<Result<HttpResponse, ApiError>>,
        requests: Vec<HttpRequest>,
    }

    impl Scripted {
        fn reply(mut self, status: u16, body: impl Into<String>) -> Self {
            self.responses.push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn fail(mut self, message: &str) -> Self {
            self.responses.push_back(Err(ApiError::Transport(message.to_string())));
            self
        }
    }

    impl Transport for Scripted {
        fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.push(request);
            self.responses.pop_front().expect("no scripted response left")
        }
    }

    fn session(transport: Scripted) -> TodoSession<Scripted> {
        TodoSession::new(TodoClient::new("http://localhost:3000"), transport)
    }

    #[test]
    fn reduce_loaded_replaces_list_and_drops_duplicate_ids() {
        let state = TodoState {
            todos: vec![todo(9, "stale")],
            last_error: None,
            loading: true,
        };
        let state = reduce(
            state,
            Action::Loaded(vec![todo(2, "b"), todo(1, "a"), todo(2, "dup")]),
        );
        let titles: Vec<&str> = state.todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a"]);
        assert!(!state.loading);
    }

    #[test]
    fn reduce_added_prepends_once() {
        let state = reduce(TodoState::default(), Action::Loaded(vec![todo(1, "a")]));
        let state = reduce(state, Action::Added(todo(2, "b")));
        let state = reduce(state, Action::Added(todo(2, "b again")));
        let titles: Vec<&str> = state.todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b again", "a"]);
    }

    #[test]
    fn reduce_updated_keeps_position() {
        let state = reduce(
            TodoState::default(),
            Action::Loaded(vec![todo(3, "c"), todo(2, "b"), todo(1, "a")]),
        );
        let mut changed = todo(2, "b");
        changed.completed = true;
        let state = reduce(state, Action::Updated(changed.clone()));
        assert_eq!(state.todos[1], changed);
        assert_eq!(state.todos.len(), 3);
    }

    #[test]
    fn reduce_updated_ignores_unknown_id() {
        let state = reduce(TodoState::default(), Action::Loaded(vec![todo(1, "a")]));
        let state = reduce(state, Action::Updated(todo(7, "ghost")));
        assert_eq!(state.todos, vec![todo(1, "a")]);
    }

    #[test]
    fn reduce_failed_and_clear_error_leave_list_alone() {
        let state = reduce(TodoState::default(), Action::Loaded(vec![todo(1, "a")]));
        let state = reduce(state, Action::Failed("Failed to add todo".to_string()));
        assert_eq!(state.last_error.as_deref(), Some("Failed to add todo"));
        assert_eq!(state.todos.len(), 1);
        let state = reduce(state, Action::ClearError);
        assert_eq!(state.last_error, None);
        assert_eq!(state.todos.len(), 1);
    }

    #[test]
    fn load_replaces_list_in_server_order() {
        let body = format!("[{},{}]", json(&todo(2, "new")), json(&todo(1, "old")));
        let mut s = session(Scripted::default().reply(200, body));
        s.load().unwrap();
        assert_eq!(s.todos()[0].title, "new");
        assert_eq!(s.todos()[1].title, "old");
        assert!(!s.state().loading);
    }

    #[test]
    fn failed_load_keeps_previous_list() {
        let body = format!("[{}]", json(&todo(1, "kept")));
        let mut s = session(
            Scripted::default()
                .reply(200, body)
                .reply(500, r#"{"error":"Failed to fetch todos"}"#),
        );
        s.load().unwrap();
        assert!(s.load().is_err());
        assert_eq!(s.todos().len(), 1);
        assert_eq!(s.last_error(), Some("Failed to fetch todos"));
        assert!(!s.state().loading);
    }

    #[test]
    fn add_prepends_server_record() {
        let mut s = session(
            Scripted::default()
                .reply(200, format!("[{}]", json(&todo(1, "old"))))
                .reply(201, json(&todo(2, "Buy milk"))),
        );
        s.load().unwrap();
        s.add("Buy milk", Some("2%")).unwrap();
        assert_eq!(s.todos()[0].id, Uuid::from_u128(2));

        let sent = &s.transport_mut().requests[1];
        assert_eq!(sent.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["description"], "2%");
    }

    #[test]
    fn rejected_add_surfaces_server_message_without_insert() {
        let mut s = session(Scripted::default().reply(400, r#"{"error":"Title is required"}"#));
        assert!(matches!(s.add("   ", None), Err(ApiError::InvalidInput(_))));
        assert!(s.todos().is_empty());
        assert_eq!(s.last_error(), Some("Title is required"));
    }

    #[test]
    fn transport_failure_uses_operation_message() {
        let mut s = session(Scripted::default().fail("connection reset"));
        assert!(s.remove(Uuid::from_u128(1)).is_err());
        assert_eq!(s.last_error(), Some("Failed to delete todo"));
    }

    #[test]
    fn toggle_sends_inverted_flag_and_swaps_record() {
        let original = todo(1, "a");
        let mut done = original.clone();
        done.completed = true;
        let mut s = session(
            Scripted::default()
                .reply(200, format!("[{}]", json(&original)))
                .reply(200, json(&done)),
        );
        s.load().unwrap();
        s.toggle_complete(&original).unwrap();
        assert!(s.todos()[0].completed);

        let sent = &s.transport_mut().requests[1];
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["completed"], true);
        assert!(body.get("title").is_none());
    }

    #[test]
    fn update_not_found_leaves_list_unchanged() {
        let original = todo(1, "a");
        let mut s = session(
            Scripted::default()
                .reply(200, format!("[{}]", json(&original)))
                .reply(404, r#"{"error":"Todo not found"}"#),
        );
        s.load().unwrap();
        let err = s.apply_update(UpdateTodo::new(original.id).title("x")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(s.todos(), &[original]);
        assert_eq!(s.last_error(), Some("Todo not found"));
    }

    #[test]
    fn remove_drops_record_and_clear_error_resets() {
        let mut s = session(
            Scripted::default()
                .reply(200, format!("[{},{}]", json(&todo(2, "b")), json(&todo(1, "a"))))
                .reply(500, r#"{"error":"Failed to delete todo"}"#)
                .reply(200, r#"{"success":true}"#),
        );
        s.load().unwrap();
        assert!(s.remove(Uuid::from_u128(2)).is_err());
        assert_eq!(s.todos().len(), 2);
        s.clear_error();
        assert_eq!(s.last_error(), None);

        s.remove(Uuid::from_u128(2)).unwrap();
        assert_eq!(s.todos(), &[todo(1, "a")]);
    }

    #[test]
    fn closure_transport_is_accepted() {
        let mut calls = 0;
        let transport = |_: HttpRequest| {
            calls += 1;
            Ok::<_, ApiError>(HttpResponse::new(200, "[]"))
        };
        let mut s = TodoSession::new(TodoClient::new("http://localhost:3000"), transport);
        s.load().unwrap();
        drop(s);
        assert_eq!(calls, 1);
    }
}
