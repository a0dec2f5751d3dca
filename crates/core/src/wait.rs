//! Explicit waits: poll a condition until it holds or a deadline passes.
//!
//! Waits never retry a failed action; they only poll again. A check that
//! reports "not found" (or a stale reference) counts as "not yet"; any other
//! error aborts the wait immediately.

use std::future::Future;
use std::time::Duration;

use droid_protocol::Locator;
use droid_runtime::{Error, Result};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::element::Element;
use crate::session::Session;

/// A bounded polling wait bound to a session.
#[derive(Debug, Clone, Copy)]
pub struct Wait<'s> {
	session: &'s Session,
	timeout: Duration,
	interval: Duration,
}

impl<'s> Wait<'s> {
	pub(crate) fn new(session: &'s Session, timeout: Duration, interval: Duration) -> Self {
		Self {
			session,
			timeout,
			interval,
		}
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Polls `check` until it yields `Some`.
	///
	/// The check runs at least once, even with a zero timeout.
	///
	/// # Errors
	///
	/// Returns [`Error::Timeout`] naming `condition` when the deadline passes.
	pub async fn until<T, F, Fut>(&self, condition: &str, mut check: F) -> Result<T>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<Option<T>>>,
	{
		let started = Instant::now();
		// `None` when the timeout is too large to represent: wait indefinitely.
		let deadline = started.checked_add(self.timeout);
		let mut attempts = 0u32;

		loop {
			attempts += 1;
			match check().await {
				Ok(Some(value)) => {
					debug!(target = "droid", condition, attempts, waited_ms = started.elapsed().as_millis() as u64, "condition met");
					return Ok(value);
				}
				Ok(None) => {}
				Err(err) if err.is_not_found() => trace!(target = "droid", condition, "not yet present"),
				Err(err) => return Err(err),
			}

			let pause = match deadline {
				Some(deadline) => {
					let now = Instant::now();
					if now >= deadline {
						return Err(Error::Timeout {
							condition: condition.to_string(),
							timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
						});
					}
					self.interval.min(deadline - now)
				}
				None => self.interval,
			};
			tokio::time::sleep(pause).await;
		}
	}

	/// Waits until an element matching `locator` exists and is displayed.
	pub async fn until_visible(&self, locator: &Locator) -> Result<Element> {
		let condition = format!("visibility of {locator}");
		let session = self.session;
		self.until(&condition, move || async move {
			let element = session.find_element(locator).await?;
			Ok(element.is_displayed().await?.then_some(element))
		})
		.await
	}

	/// Waits until an element matching `locator` exists, displayed or not.
	pub async fn until_present(&self, locator: &Locator) -> Result<Element> {
		let condition = format!("presence of {locator}");
		let session = self.session;
		self.until(&condition, move || async move { session.find_element(locator).await.map(Some) })
			.await
	}
}
