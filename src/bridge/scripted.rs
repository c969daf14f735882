// In-memory bridge for store tests: answers from per-command queues and
// records every call.

use crate::bridge::{BridgeError, Command, CommandBridge};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Reply = Result<Value, BridgeError>;

#[derive(Default)]
pub(crate) struct ScriptedBridge {
    replies: Mutex<HashMap<Command, VecDeque<Reply>>>,
    calls: Mutex<Vec<(Command, Value)>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedBridge {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the next reply for `command`; unscripted calls answer `null`
    pub(crate) fn respond(&self, command: Command, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(command)
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn fail(&self, command: Command, message: Option<&str>) {
        self.respond(
            command,
            Err(BridgeError::backend(command.name(), message.map(str::to_string))),
        );
    }

    /// Make every following call wait on the returned gate before replying
    pub(crate) fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub(crate) fn calls(&self) -> Vec<(Command, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, command: Command) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == command)
            .count()
    }
}

#[async_trait]
impl CommandBridge for ScriptedBridge {
    async fn invoke(&self, command: Command, args: Value) -> Result<Value, BridgeError> {
        self.calls.lock().unwrap().push((command, args));

        // Replies are bound in call order, even when released out of order
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&command)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Ok(Value::Null));

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        reply
    }
}
