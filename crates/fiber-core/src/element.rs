//! Immutable element descriptions and the builder functions producing them.
//!
//! Elements are created fresh on every render and are consumed by the
//! reconciler into fibers. Props are shared behind an `Rc` so moving an
//! element into a fiber never deep-copies its subtree.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::FiberError;

/// Property carrying the text of a text element.
pub const NODE_VALUE: &str = "nodeValue";

/// Render function of a function component.
pub type RenderFn = fn(&Props) -> Result<Element, FiberError>;

/// A named function component.
///
/// Two components are the same type when they share the same render
/// function; the name is only used for diagnostics.
#[derive(Clone, Copy)]
pub struct Component {
    name: &'static str,
    render: RenderFn,
}

impl Component {
    pub const fn new(name: &'static str, render: RenderFn) -> Self {
        Self { name, render }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn render(&self, props: &Props) -> Result<Element, FiberError> {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.render as usize == other.render as usize
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Component").field(&self.name).finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    Host(String),
    Component(Component),
    Text,
}

impl ElementType {
    /// Short label used in logs and tree dumps.
    pub fn label(&self) -> &str {
        match self {
            ElementType::Host(tag) => tag,
            ElementType::Component(component) => component.name(),
            ElementType::Text => "#text",
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Host(tag.to_owned())
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::Host(tag)
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        ElementType::Component(component)
    }
}

/// Event callback attached through an `on*` property.
///
/// Listeners compare by identity: re-creating a closure on every render
/// counts as a change and causes the host listener to be swapped.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn()>);

impl Listener {
    pub fn new(callback: impl Fn() + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Listener(Listener),
}

impl PropValue {
    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            PropValue::Listener(listener) => Some(listener),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(text) => f.write_str(text),
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Listener(_) => f.write_str("<listener>"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Listener> for PropValue {
    fn from(listener: Listener) -> Self {
        PropValue::Listener(listener)
    }
}

/// Insertion-ordered element properties, excluding children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes(IndexMap<String, PropValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    pub attributes: Attributes,
    /// Ordered children; `None` marks a conditionally omitted slot.
    pub children: Vec<Option<Element>>,
}

impl Props {
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attributes.get(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    ty: ElementType,
    props: Rc<Props>,
}

impl Element {
    pub fn element_type(&self) -> &ElementType {
        &self.ty
    }

    pub fn props(&self) -> &Rc<Props> {
        &self.props
    }
}

/// A child value accepted by [`create_element`].
///
/// Anything that is not an element is normalized into a text element; an
/// empty child keeps its position as a `None` slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Child {
    Element(Element),
    Text(String),
    Empty,
}

impl Child {
    fn into_slot(self) -> Option<Element> {
        match self {
            Child::Element(element) => Some(element),
            Child::Text(text) => Some(create_text_element(text)),
            Child::Empty => None,
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<Option<Element>> for Child {
    fn from(element: Option<Element>) -> Self {
        element.map_or(Child::Empty, Child::Element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_owned())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

macro_rules! child_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Text(value.to_string())
                }
            }
        )*
    };
}

child_from_display!(i32, i64, u32, u64, usize, f64, bool);

pub fn create_element(
    ty: impl Into<ElementType>,
    attributes: Attributes,
    children: Vec<Child>,
) -> Element {
    Element {
        ty: ty.into(),
        props: Rc::new(Props {
            attributes,
            children: children.into_iter().map(Child::into_slot).collect(),
        }),
    }
}

pub fn create_text_element(text: impl Into<String>) -> Element {
    Element {
        ty: ElementType::Text,
        props: Rc::new(Props {
            attributes: Attributes::new().with(NODE_VALUE, text.into()),
            children: Vec::new(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/element_tests.rs"]
mod tests;
