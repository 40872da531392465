//! Thread-safe in-memory [`AppEventSink`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Slug,
	events::{AppEventId, AppEventSink, EventError, EventFuture, LogLevel},
};

type EventMap = Arc<RwLock<Vec<RecordedEvent>>>;

/// One audit event captured by [`MemoryEventSink`].
#[derive(Clone, Debug)]
pub struct RecordedEvent {
	/// Identifier assigned to or requested for the event.
	pub id: AppEventId,
	/// Slug the event is keyed by, when one was available.
	pub slug: Option<Slug>,
	/// Activity type the event was created with.
	pub activity_type: String,
	/// Appended log lines in arrival order.
	pub logs: Vec<(LogLevel, String)>,
	/// Redacted identity summary, once stored.
	pub summary: Option<JsonValue>,
	/// Whether the event was marked failed.
	pub failed: bool,
}

/// Thread-safe sink that keeps audit events in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryEventSink(EventMap);
impl MemoryEventSink {
	/// Snapshot of every recorded event.
	pub fn events(&self) -> Vec<RecordedEvent> {
		self.0.read().clone()
	}

	/// Returns the recorded event with the provided identifier, if any.
	pub fn find(&self, id: &AppEventId) -> Option<RecordedEvent> {
		self.0.read().iter().find(|event| &event.id == id).cloned()
	}

	fn create_or_find_now(
		map: EventMap,
		slug: Option<Slug>,
		activity_type: String,
		preferred_id: Option<String>,
	) -> AppEventId {
		let mut guard = map.write();

		if let Some(preferred) = preferred_id.as_deref() {
			if let Some(existing) =
				guard.iter().find(|event| event.id.as_ref() == preferred)
			{
				return existing.id.clone();
			}
		}
		if let Some(slug) = slug.as_ref() {
			if let Some(existing) =
				guard.iter().find(|event| event.slug.as_ref() == Some(slug))
			{
				return existing.id.clone();
			}
		}

		let id = match preferred_id {
			Some(preferred) => AppEventId::new(preferred),
			// The counter alone could collide with a previously supplied
			// preferred identifier, so skip past any taken value.
			None => {
				let mut n = guard.len() + 1;

				while guard.iter().any(|event| event.id.as_ref() == format!("evt-{n}")) {
					n += 1;
				}

				AppEventId::new(format!("evt-{n}"))
			},
		};

		guard.push(RecordedEvent {
			id: id.clone(),
			slug,
			activity_type,
			logs: Vec::new(),
			summary: None,
			failed: false,
		});

		id
	}

	fn with_event<T>(
		map: &EventMap,
		id: &AppEventId,
		apply: impl FnOnce(&mut RecordedEvent) -> T,
	) -> Result<T, EventError> {
		let mut guard = map.write();

		guard
			.iter_mut()
			.find(|event| &event.id == id)
			.map(apply)
			.ok_or_else(|| EventError::Backend { message: format!("unknown event `{id}`") })
	}
}
impl AppEventSink for MemoryEventSink {
	fn create_or_find<'a>(
		&'a self,
		slug: Option<&'a Slug>,
		activity_type: &'a str,
		preferred_id: Option<&'a str>,
	) -> EventFuture<'a, AppEventId> {
		let map = self.0.clone();
		let slug = slug.cloned();
		let activity_type = activity_type.to_owned();
		let preferred_id = preferred_id.map(str::to_owned);

		Box::pin(async move { Ok(Self::create_or_find_now(map, slug, activity_type, preferred_id)) })
	}

	fn log<'a>(
		&'a self,
		event: &'a AppEventId,
		level: LogLevel,
		text: String,
	) -> EventFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::with_event(&map, event, |e| e.logs.push((level, text))) })
	}

	fn update_summary<'a>(
		&'a self,
		event: &'a AppEventId,
		summary: JsonValue,
	) -> EventFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::with_event(&map, event, |e| e.summary = Some(summary)) })
	}

	fn mark_failed<'a>(&'a self, event: &'a AppEventId) -> EventFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::with_event(&map, event, |e| e.failed = true) })
	}
}
