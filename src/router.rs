//! Event router
//!
//! Fans every decoded envelope out to a fixed, ordered handler registry.
//! The wire format has no reliable discriminator field, so the router does
//! not filter: every registration sees every envelope and cheaply no-ops
//! when the payload is not for it. That constant fan-out cost buys
//! resilience to an undocumented, evolving feed.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{error, trace};

use crate::parser::Envelope;
use crate::FeedContext;

/// Boxed handler invoked with the shared context and the decoded envelope
pub type HandlerFn = Box<dyn Fn(&FeedContext, &Envelope) + Send + Sync>;

/// One entry of the handler registry.
///
/// Immutable after router construction; the registration order is the
/// invocation order for every dispatched envelope.
pub struct HandlerRegistration {
    kind: &'static str,
    may_use_cache: bool,
    handler: HandlerFn,
}

impl HandlerRegistration {
    /// Register a handler guarded by the envelope's `name` tag.
    ///
    /// The handler still receives every envelope; the guard is the no-op
    /// check, done here so table entries stay one field-copy closure.
    pub fn on<F>(kind: &'static str, may_use_cache: bool, handler: F) -> Self
    where
        F: Fn(&FeedContext, &Envelope) + Send + Sync + 'static,
    {
        Self {
            kind,
            may_use_cache,
            handler: Box::new(move |ctx, envelope| {
                if envelope.is(kind) {
                    handler(ctx, envelope);
                }
            }),
        }
    }

    /// Register a handler that probes the payload itself.
    ///
    /// For event kinds that arrive untagged or under several tags; the
    /// handler checks for the keys it cares about and no-ops otherwise.
    pub fn probe<F>(kind: &'static str, may_use_cache: bool, handler: F) -> Self
    where
        F: Fn(&FeedContext, &Envelope) + Send + Sync + 'static,
    {
        Self {
            kind,
            may_use_cache,
            handler: Box::new(handler),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn may_use_cache(&self) -> bool {
        self.may_use_cache
    }
}

/// Ordered handler registry with isolated dispatch
pub struct EventRouter {
    registrations: Vec<HandlerRegistration>,
}

impl EventRouter {
    /// Create a router from a fixed registration sequence
    pub fn new(registrations: Vec<HandlerRegistration>) -> Self {
        Self { registrations }
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Number of registrations that mutate one of the bounded caches
    pub fn cache_backed_count(&self) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.may_use_cache)
            .count()
    }

    /// Decode one raw frame and run it through the whole registry.
    ///
    /// Malformed JSON is dropped silently. A panicking handler is caught
    /// and logged, and dispatch continues with the next registration; no
    /// panic escapes to the receive loop.
    pub fn dispatch(&self, ctx: &FeedContext, raw: &str) {
        let Some(envelope) = Envelope::parse(raw) else {
            trace!(len = raw.len(), "Dropping malformed frame");
            return;
        };

        for registration in &self.registrations {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                (registration.handler)(ctx, &envelope);
            }));
            if outcome.is_err() {
                error!(
                    kind = registration.kind,
                    event = envelope.name.as_deref().unwrap_or(""),
                    "Handler panicked, continuing dispatch"
                );
            }
        }
    }
}
