//! Test doubles for the infrastructure ports.

use std::io;
use std::sync::{Arc, Mutex};

use targetsync::domain::ports::{
    OperationEvent, OperationEventSink, ToolInvocation, ToolOutput, ToolRunner,
};

/// Tool runner that echoes stdin and records every invocation.
///
/// Inputs starting with `!` fail with `bad input` on stderr.
#[derive(Default)]
pub struct EchoRunner {
    pub calls: Mutex<Vec<ToolInvocation>>,
}

impl EchoRunner {
    pub fn programs(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.program.clone())
            .collect()
    }
}

impl ToolRunner for EchoRunner {
    fn run(&self, invocation: &ToolInvocation) -> io::Result<ToolOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        let ok = !invocation.stdin.starts_with(b"!");
        Ok(ToolOutput {
            success: ok,
            stdout: invocation.stdin.clone(),
            stderr: if ok { String::new() } else { "bad input".into() },
        })
    }
}

/// Event sink keeping every event in order
#[derive(Default, Clone)]
pub struct RecordingEvents {
    pub events: Arc<Mutex<Vec<OperationEvent>>>,
}

impl RecordingEvents {
    pub fn snapshot(&self) -> Vec<OperationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl OperationEventSink for RecordingEvents {
    fn on_event(&self, event: OperationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
