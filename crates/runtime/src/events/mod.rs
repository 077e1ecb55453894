//! Topic-based event bus for runtime events.
//!
//! World events are stamped with their tick and published to the topic
//! matching their kind. Consumers subscribe only to the topics they need.

mod bus;

pub use bus::{Event, EventBus, Topic};
