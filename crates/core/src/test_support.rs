use std::collections::VecDeque;
use std::sync::Arc;

use droid_protocol::Reply;
use droid_runtime::{BoxFuture, Error, Method, Result, Transport};
use parking_lot::Mutex;
use serde_json::Value;

/// Transport that answers with canned bodies in order and records every call.
pub(crate) struct ScriptedTransport {
	replies: Mutex<VecDeque<Value>>,
	calls: Mutex<Vec<(Method, String, Option<Value>)>>,
}

impl ScriptedTransport {
	pub(crate) fn new(replies: Vec<Value>) -> Arc<Self> {
		Arc::new(Self {
			replies: Mutex::new(replies.into()),
			calls: Mutex::new(Vec::new()),
		})
	}

	pub(crate) fn calls(&self) -> Vec<(Method, String, Option<Value>)> {
		self.calls.lock().clone()
	}
}

impl Transport for ScriptedTransport {
	fn execute(&self, method: Method, path: String, body: Option<Value>) -> BoxFuture<'_, Result<Reply>> {
		self.calls.lock().push((method, path.clone(), body));
		let next = self.replies.lock().pop_front();
		Box::pin(async move {
			next.map(Reply::decode)
				.ok_or_else(|| Error::ProtocolError(format!("script exhausted at {method} {path}")))
		})
	}

	fn endpoint(&self) -> &str {
		"scripted://"
	}
}
