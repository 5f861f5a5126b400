//! Translates fiber properties into host operations.

use crate::element::{Attributes, ElementType, Listener, PropValue, Props};
use crate::error::FiberError;
use crate::host::Host;

/// Property-name prefix marking an event listener (`onClick` -> `click`).
pub const EVENT_PREFIX: &str = "on";

fn event_listener<'a>(name: &str, value: &'a PropValue) -> Option<&'a Listener> {
    if name.starts_with(EVENT_PREFIX) {
        value.as_listener()
    } else {
        None
    }
}

fn is_plain(name: &str, value: &PropValue) -> bool {
    event_listener(name, value).is_none()
}

pub fn event_type(name: &str) -> String {
    name[EVENT_PREFIX.len()..].to_lowercase()
}

/// Creates the host node for a host or text fiber and applies all of its
/// properties and listeners.
pub fn create_host_node<H: Host>(
    host: &mut H,
    ty: &ElementType,
    props: &Props,
) -> Result<H::Node, FiberError> {
    let node = match ty {
        ElementType::Host(tag) => host.create_element(tag)?,
        ElementType::Text => host.create_text()?,
        ElementType::Component(component) => {
            return Err(FiberError::UnsupportedElementType {
                tag: component.name().to_owned(),
            })
        }
    };
    update_host_properties(host, &node, &Attributes::new(), &props.attributes)?;
    Ok(node)
}

/// Applies the minimal difference between `prev` and `next` to `node`.
pub fn update_host_properties<H: Host>(
    host: &mut H,
    node: &H::Node,
    prev: &Attributes,
    next: &Attributes,
) -> Result<(), FiberError> {
    for (name, value) in prev.iter() {
        if let Some(listener) = event_listener(name, value) {
            if next.get(name) != Some(value) {
                host.remove_listener(node, &event_type(name), listener)?;
            }
        }
    }

    for (name, value) in prev.iter() {
        if !is_plain(name, value) {
            continue;
        }
        let still_plain = matches!(next.get(name), Some(next_value) if is_plain(name, next_value));
        if !still_plain {
            host.remove_property(node, name)?;
        }
    }

    for (name, value) in next.iter() {
        if is_plain(name, value) && prev.get(name) != Some(value) {
            host.set_property(node, name, value)?;
        }
    }

    for (name, value) in next.iter() {
        if let Some(listener) = event_listener(name, value) {
            if prev.get(name) != Some(value) {
                host.add_listener(node, &event_type(name), listener)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
