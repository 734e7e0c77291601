//! Double-buffered event bus. Events emitted during a tick accumulate in the
//! current buffer; external collaborators drain it after the phase
//! completes, then the engine swaps to a fresh buffer for the next tick so a
//! slow consumer never observes a partially-built tick's events.

use skirmish_types::Event;

#[derive(Debug, Default)]
pub struct EventBus {
    current: Vec<Event>,
    previous: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: Event) {
        self.current.push(event);
    }

    /// The buffer external collaborators should read from right now.
    pub fn current(&self) -> &[Event] {
        &self.current
    }

    /// Swap in a fresh current buffer, retaining the old one as `previous`
    /// (so a consumer that hasn't drained yet can still see it) and
    /// returning what was just swapped out.
    pub fn swap(&mut self) -> Vec<Event> {
        std::mem::swap(&mut self.current, &mut self.previous);
        let drained = std::mem::take(&mut self.previous);
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_appends_to_current() {
        let mut bus = EventBus::new();
        bus.emit(Event::MobDied { agent_id: skirmish_types::AgentId::new(0, 0) });
        assert_eq!(bus.current().len(), 1);
    }

    #[test]
    fn swap_returns_prior_buffer_and_clears_current() {
        let mut bus = EventBus::new();
        bus.emit(Event::MobDied { agent_id: skirmish_types::AgentId::new(0, 0) });
        let drained = bus.swap();
        assert_eq!(drained.len(), 1);
        assert!(bus.current().is_empty());
    }
}
