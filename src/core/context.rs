//! Request-scoped context carrier
//!
//! A [`Context`] is an immutable chain of slots. Attaching a logger or a
//! value returns a new context that shares its parent; the parent never
//! sees the addition. Lookups walk from the newest slot to the oldest.

use super::logger::Logger;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Context key of the request identifier
pub const KEY_REQUEST_ID: &str = "requestID";

/// Context key of the authenticated user name
pub const KEY_USERNAME: &str = "username";

enum Slot {
    Logger(Logger),
    Value {
        key: &'static str,
        value: Arc<dyn Any + Send + Sync>,
    },
}

struct Node {
    slot: Slot,
    parent: Option<Arc<Node>>,
}

#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// Empty context
    pub fn background() -> Self {
        Self::default()
    }

    fn push(&self, slot: Slot) -> Context {
        Context {
            head: Some(Arc::new(Node {
                slot,
                parent: self.head.clone(),
            })),
        }
    }

    pub(crate) fn with_logger(&self, logger: Logger) -> Context {
        self.push(Slot::Logger(logger))
    }

    /// New context with `value` stored under `key`, shadowing older entries
    #[must_use]
    pub fn with_value<T: Any + Send + Sync>(&self, key: &'static str, value: T) -> Context {
        self.push(Slot::Value {
            key,
            value: Arc::new(value),
        })
    }

    /// Most recent value stored under `key`, if it has type `T`
    pub fn value<T: Any>(&self, key: &str) -> Option<&T> {
        self.slots().find_map(|slot| match slot {
            Slot::Value { key: k, value } if *k == key => Some(value.downcast_ref::<T>()),
            _ => None,
        })?
    }

    /// Most recent value under `key` as text; accepts `String` or `&'static str`
    pub fn string_value(&self, key: &str) -> Option<&str> {
        self.slots().find_map(|slot| match slot {
            Slot::Value { key: k, value } if *k == key => Some(
                value
                    .downcast_ref::<String>()
                    .map(String::as_str)
                    .or_else(|| value.downcast_ref::<&'static str>().copied()),
            ),
            _ => None,
        })?
    }

    /// Most recently attached logger
    pub fn logger(&self) -> Option<&Logger> {
        self.slots().find_map(|slot| match slot {
            Slot::Logger(logger) => Some(logger),
            Slot::Value { .. } => None,
        })
    }

    fn slots(&self) -> impl Iterator<Item = &Slot> {
        std::iter::successors(self.head.as_deref(), |node| node.parent.as_deref())
            .map(|node| &node.slot)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for slot in self.slots() {
            match slot {
                Slot::Logger(logger) => list.entry(&format_args!("logger({:?})", logger.name())),
                Slot::Value { key, .. } => list.entry(key),
            };
        }
        list.finish()
    }
}
