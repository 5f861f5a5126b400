//! Map type backing host listener tables; `std-hash` swaps `hashbrown` for
//! the standard library map.

#[cfg(feature = "std-hash")]
use std::collections::HashMap;

#[cfg(not(feature = "std-hash"))]
use hashbrown::HashMap;

use crate::element::Listener;

/// Listeners registered on one host node, keyed by event type.
pub(crate) type ListenerTable = HashMap<String, Vec<Listener>>;
