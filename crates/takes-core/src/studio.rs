//! Shared context for every controller operation.

use std::time::Duration;

use crate::selection::{MemorySelectionRegistry, SelectionRegistry};
use crate::take::{ContentStore, MemoryTakeStore, Scope, TakeId, TakeStore};
use crate::transport::{AudioEngine, AudioTransport, Finished};

/// Something that wants to hear about ended transport operations
pub trait TransportListener {
    fn on_transport_event(&mut self, studio: &mut Studio, finished: &Finished);
}

/// Take store, selection registry and the single audio transport.
///
/// Controllers never own any of these; each operation borrows the studio, so
/// several controllers can share one transport without globals.
pub struct Studio {
    pub takes: Box<dyn TakeStore>,
    pub selection: Box<dyn SelectionRegistry>,
    pub transport: AudioTransport,
}

impl Studio {
    pub fn new(
        takes: impl TakeStore + 'static,
        selection: impl SelectionRegistry + 'static,
        transport: AudioTransport,
    ) -> Self {
        Self {
            takes: Box::new(takes),
            selection: Box::new(selection),
            transport,
        }
    }

    /// Studio with in-memory storage
    pub fn in_memory(engine: impl AudioEngine + 'static) -> Self {
        Self::new(
            MemoryTakeStore::new(),
            MemorySelectionRegistry::new(),
            AudioTransport::new(engine),
        )
    }

    /// The selected take of `scope`, if it still exists
    pub fn selected_take(&self, scope: &Scope) -> Option<TakeId> {
        self.selection
            .get(scope)
            .map(|name| scope.take(name))
            .filter(|id| self.takes.exists(id))
    }

    /// Deliver every ended operation to `listeners`; returns how many were delivered
    pub fn pump(&mut self, listeners: &mut [&mut dyn TransportListener]) -> usize {
        let mut delivered = 0;
        while let Some(finished) = self.transport.poll() {
            self.dispatch(listeners, &finished);
            delivered += 1;
        }
        delivered
    }

    /// Wait up to `timeout` for something to end, then deliver everything pending
    pub fn pump_timeout(
        &mut self,
        timeout: Duration,
        listeners: &mut [&mut dyn TransportListener],
    ) -> usize {
        match self.transport.poll_timeout(timeout) {
            Some(finished) => {
                self.dispatch(listeners, &finished);
                1 + self.pump(listeners)
            }
            None => 0,
        }
    }

    fn dispatch(&mut self, listeners: &mut [&mut dyn TransportListener], finished: &Finished) {
        for listener in listeners.iter_mut() {
            listener.on_transport_event(self, finished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;
    use crate::transport::{Clock, EndReason, SimulatedEngine};

    #[derive(Default)]
    struct Log(Vec<EndReason>);

    impl TransportListener for Log {
        fn on_transport_event(&mut self, _studio: &mut Studio, finished: &Finished) {
            self.0.push(finished.reason.clone());
        }
    }

    #[test]
    fn test_selected_take_requires_existing_take() {
        let mut studio = Studio::in_memory(SimulatedEngine::new(Clock::Manual));
        let scope = Scope::new("s", 1, Category::Draft);
        studio.selection.set(&scope, Some("v1")).unwrap();
        assert_eq!(studio.selected_take(&scope), None);

        studio.takes.commit(&scope.take("v1"), b"x").unwrap();
        assert_eq!(studio.selected_take(&scope), Some(scope.take("v1")));
    }

    #[test]
    fn test_pump_reaches_every_listener() {
        let mut studio = Studio::in_memory(SimulatedEngine::new(Clock::Manual));
        studio.transport.start_recording().unwrap();
        studio.transport.start_recording().unwrap();
        studio.transport.release();

        let mut a = Log::default();
        let mut b = Log::default();
        assert_eq!(studio.pump(&mut [&mut a, &mut b]), 2);
        assert_eq!(a.0, [EndReason::Preempted, EndReason::Released]);
        assert_eq!(a.0, b.0);
        assert_eq!(studio.pump(&mut [&mut a]), 0);
    }
}
