//! In-memory stand-in for the Assistants API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assistant_relay::AppState;
use assistant_relay::config::AssistantEntry;
use assistant_relay::openai::{
    Assistant, AssistantsApi, MessageRole, PollPolicy, Result, Run, RunStatus, Thread,
    ThreadMessage, UpstreamError,
};
use assistant_relay::session::AssistantDirectory;
use serde_json::json;

pub const BANK_TEST_ID: &str = "asst_bank";

/// Which fake operation should fail, and with what status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    RetrieveAssistant(u16),
    CreateThread(u16),
    CreateMessage(u16),
    CreateRun(u16),
    ListMessages(u16),
}

#[derive(Debug, Default)]
struct FakeState {
    assistants: HashMap<String, Option<String>>,
    threads: HashMap<String, Vec<ThreadMessage>>,
    runs: HashMap<String, FakeRun>,
    next_id: u32,
    clock: i64,
    calls: Vec<&'static str>,
    fail: Option<FailOn>,
    thread_without_id: bool,
    runs_never_finish: bool,
}

#[derive(Debug)]
struct FakeRun {
    thread_id: String,
    status: RunStatus,
    polls_left: u32,
}

/// Fake upstream: threads live in memory, every completed run appends an
/// assistant reply echoing the latest user message.
#[derive(Debug, Default)]
pub struct FakeAssistants {
    state: Mutex<FakeState>,
}

impl FakeAssistants {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.add_assistant(BANK_TEST_ID, Some("BankTest"));
        fake
    }

    pub fn add_assistant(&self, id: &str, name: Option<&str>) {
        self.state
            .lock()
            .unwrap()
            .assistants
            .insert(id.to_string(), name.map(ToString::to_string));
    }

    pub fn fail_on(&self, fail: FailOn) {
        self.state.lock().unwrap().fail = Some(fail);
    }

    pub fn return_thread_without_id(&self) {
        self.state.lock().unwrap().thread_without_id = true;
    }

    pub fn never_finish_runs(&self) {
        self.state.lock().unwrap().runs_never_finish = true;
    }

    /// Messages of a thread in creation order.
    pub fn thread_messages(&self, thread_id: &str) -> Vec<ThreadMessage> {
        self.state
            .lock()
            .unwrap()
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }
}

impl FakeState {
    fn record(&mut self, op: &'static str) {
        self.calls.push(op);
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn check_failure(&self, matches: impl Fn(FailOn) -> Option<u16>) -> Result<()> {
        match self.fail.and_then(matches) {
            Some(status) => Err(UpstreamError::Api {
                status,
                message: "injected failure".into(),
            }),
            None => Ok(()),
        }
    }

    fn thread_mut(&mut self, thread_id: &str) -> Result<&mut Vec<ThreadMessage>> {
        self.threads
            .get_mut(thread_id)
            .ok_or_else(|| UpstreamError::Api {
                status: 404,
                message: format!("No thread found with id '{thread_id}'."),
            })
    }

    fn append_reply(&mut self, thread_id: &str) -> Result<()> {
        let created_at = self.tick();
        let id = self.next_id("msg");
        let thread = self.thread_mut(thread_id)?;
        let last_user = thread
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .and_then(|m| m.content[0]["text"]["value"].as_str())
            .unwrap_or_default()
            .to_string();
        thread.push(ThreadMessage {
            id,
            role: MessageRole::Assistant,
            content: json!([
                {"type": "text", "text": {"value": "Echo:", "annotations": []}},
                {"type": "image_file", "image_file": {"file_id": "file_1"}},
                {"type": "text", "text": {"value": last_user, "annotations": []}}
            ]),
            created_at,
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssistantsApi for FakeAssistants {
    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        let mut state = self.state.lock().unwrap();
        state.record("retrieve_assistant");
        state.check_failure(|f| match f {
            FailOn::RetrieveAssistant(s) => Some(s),
            _ => None,
        })?;
        match state.assistants.get(assistant_id) {
            Some(name) => Ok(Assistant {
                id: assistant_id.to_string(),
                name: name.clone(),
            }),
            None => Err(UpstreamError::Api {
                status: 404,
                message: format!("No assistant found with id '{assistant_id}'."),
            }),
        }
    }

    async fn create_thread(&self) -> Result<Thread> {
        let mut state = self.state.lock().unwrap();
        state.record("create_thread");
        state.check_failure(|f| match f {
            FailOn::CreateThread(s) => Some(s),
            _ => None,
        })?;
        if state.thread_without_id {
            return Ok(Thread { id: None });
        }
        let id = state.next_id("thread");
        state.threads.insert(id.clone(), Vec::new());
        Ok(Thread { id: Some(id) })
    }

    async fn create_message(&self, thread_id: &str, content: &str) -> Result<ThreadMessage> {
        let mut state = self.state.lock().unwrap();
        state.record("create_message");
        state.check_failure(|f| match f {
            FailOn::CreateMessage(s) => Some(s),
            _ => None,
        })?;
        let created_at = state.tick();
        let id = state.next_id("msg");
        let message = ThreadMessage {
            id,
            role: MessageRole::User,
            content: json!([{"type": "text", "text": {"value": content, "annotations": []}}]),
            created_at,
        };
        state.thread_mut(thread_id)?.push(message.clone());
        Ok(message)
    }

    async fn create_run(&self, thread_id: &str, _assistant_id: &str) -> Result<Run> {
        let mut state = self.state.lock().unwrap();
        state.record("create_run");
        state.check_failure(|f| match f {
            FailOn::CreateRun(s) => Some(s),
            _ => None,
        })?;
        state.thread_mut(thread_id)?;
        let id = state.next_id("run");
        state.runs.insert(
            id.clone(),
            FakeRun {
                thread_id: thread_id.to_string(),
                status: RunStatus::Queued,
                polls_left: 2,
            },
        );
        Ok(Run {
            id,
            status: RunStatus::Queued,
            last_error: None,
        })
    }

    async fn retrieve_run(&self, _thread_id: &str, run_id: &str) -> Result<Run> {
        let mut state = self.state.lock().unwrap();
        state.record("retrieve_run");
        let never_finish = state.runs_never_finish;
        let Some(run) = state.runs.get_mut(run_id) else {
            return Err(UpstreamError::Api {
                status: 404,
                message: format!("No run found with id '{run_id}'."),
            });
        };

        let mut finished_on = None;
        if !never_finish && !run.status.is_terminal() {
            run.polls_left = run.polls_left.saturating_sub(1);
            if run.polls_left == 0 {
                run.status = RunStatus::Completed;
                finished_on = Some(run.thread_id.clone());
            } else {
                run.status = RunStatus::InProgress;
            }
        } else if never_finish {
            run.status = RunStatus::InProgress;
        }
        let status = run.status;

        if let Some(thread_id) = finished_on {
            state.append_reply(&thread_id)?;
        }
        Ok(Run {
            id: run_id.to_string(),
            status,
            last_error: None,
        })
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let mut state = self.state.lock().unwrap();
        state.record("list_messages");
        state.check_failure(|f| match f {
            FailOn::ListMessages(s) => Some(s),
            _ => None,
        })?;
        let mut messages = state.thread_mut(thread_id)?.clone();
        messages.reverse();
        Ok(messages)
    }
}

pub fn fast_poll() -> PollPolicy {
    PollPolicy {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
        timeout: Duration::from_secs(5),
    }
}

pub fn directory() -> AssistantDirectory {
    AssistantDirectory::new([AssistantEntry {
        name: "BankTest".into(),
        id: BANK_TEST_ID.into(),
    }])
}

pub fn app_state(fake: &Arc<FakeAssistants>, poll: PollPolicy) -> AppState {
    let api: Arc<dyn AssistantsApi> = Arc::clone(fake) as Arc<dyn AssistantsApi>;
    AppState::new(api, directory(), poll)
}
