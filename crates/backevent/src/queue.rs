use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::event::*;

/// A component that consumes events and may answer with new ones, e.g. a
/// strategy turning market updates into signals or a broker turning orders
/// into fills. Unhandled kinds are ignored.
pub trait EventHandler {
    fn on_market(&mut self, _: &MarketEvent) -> Vec<Event> {
        vec![]
    }
    fn on_signal(&mut self, _: &SignalEvent) -> Vec<Event> {
        vec![]
    }
    fn on_order(&mut self, _: &OrderEvent) -> Vec<Event> {
        vec![]
    }
    fn on_fill(&mut self, _: &FillEvent) -> Vec<Event> {
        vec![]
    }
}

pub type SharedEventQueue = Arc<Mutex<EventQueue>>;

/// FIFO of pending events plus observers that see every dispatched event.
#[derive(Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
    event_hooks: Vec<Box<dyn Fn(&Event) + Send>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedEventQueue {
        Arc::new(Mutex::new(self))
    }

    pub fn add_event_hook<F: Fn(&Event) + 'static + Send>(&mut self, f: F) {
        self.event_hooks.push(Box::new(f));
    }

    fn call_event_hook(&self, event: &Event) {
        for f in &self.event_hooks {
            f(event)
        }
    }

    pub fn push(&mut self, event: impl Into<Event>) {
        self.events.push_back(event.into());
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Routes one event to `handler` and enqueues whatever it answers with.
    pub fn dispatch<H: EventHandler + ?Sized>(&mut self, event: &Event, handler: &mut H) {
        log::trace!("dispatch {}: {}", event.kind(), event);
        let produced = match event {
            Event::Market(e) => handler.on_market(e),
            Event::Signal(e) => handler.on_signal(e),
            Event::Order(e) => handler.on_order(e),
            Event::Fill(e) => handler.on_fill(e),
        };
        self.call_event_hook(event);
        self.events.extend(produced);
    }

    /// Dispatches until the queue is empty, including events produced along
    /// the way. Returns how many events were dispatched.
    pub fn drain_into<H: EventHandler + ?Sized>(&mut self, handler: &mut H) -> usize {
        let mut n = 0;
        while let Some(evt) = self.pop() {
            self.dispatch(&evt, handler);
            n += 1;
        }
        n
    }
}
