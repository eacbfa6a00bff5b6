use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::component::{Component, ComponentType, RenderFragment};
use super::events::EventArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventHandlerId(pub(crate) u64);

impl EventHandlerId {
    /// Wraps a raw id, typically one read back from a `blazor:on*` attribute.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventHandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventHandlerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

type HandlerFn = dyn Fn(&mut dyn Component, &dyn Any) -> anyhow::Result<()> + Send + Sync;

/// A typed event handler bound to the component that rendered it.
#[derive(Clone)]
pub struct EventCallback {
    handler: Arc<HandlerFn>,
    args_type: &'static str,
}

impl EventCallback {
    pub fn new<C, A>(handler: impl Fn(&mut C, &A) -> anyhow::Result<()> + Send + Sync + 'static) -> Self
    where
        C: Component,
        A: EventArgs,
    {
        Self {
            handler: Arc::new(move |component: &mut dyn Component, args: &dyn Any| {
                let component: &mut dyn Any = component;
                let component = component.downcast_mut::<C>().ok_or_else(|| {
                    anyhow::anyhow!(
                        "event handler is bound to {} but was invoked on another component type",
                        std::any::type_name::<C>()
                    )
                })?;
                let args = args.downcast_ref::<A>().ok_or_else(|| {
                    anyhow::anyhow!(
                        "event handler expects {} arguments",
                        std::any::type_name::<A>()
                    )
                })?;
                handler(component, args)
            }),
            args_type: std::any::type_name::<A>(),
        }
    }

    pub fn args_type(&self) -> &'static str {
        self.args_type
    }

    pub(crate) fn invoke(&self, component: &mut dyn Component, args: &dyn Any) -> anyhow::Result<()> {
        (self.handler)(component, args)
    }
}

impl fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCallback")
            .field("args_type", &self.args_type)
            .finish()
    }
}

/// An event handler attribute. The id is assigned by the renderer when the
/// owning component's frames are committed.
#[derive(Debug, Clone)]
pub struct EventHandlerBinding {
    pub(crate) id: Option<EventHandlerId>,
    pub(crate) callback: EventCallback,
}

impl EventHandlerBinding {
    pub fn id(&self) -> Option<EventHandlerId> {
        self.id
    }
}

#[derive(Clone)]
pub enum AttributeValue {
    Text(String),
    Bool(bool),
    Object(Arc<dyn Any + Send + Sync>),
    EventHandler(EventHandlerBinding),
}

impl AttributeValue {
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Self::Object(Arc::new(value))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Text(text) => (text as &dyn Any).downcast_ref::<T>(),
            Self::Bool(value) => (value as &dyn Any).downcast_ref::<T>(),
            Self::Object(object) => object.downcast_ref::<T>(),
            Self::EventHandler(_) => None,
        }
    }

    /// String form used when an object value lands on an element.
    pub(crate) fn display_value(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Bool(value) => Some(value.to_string()),
            Self::Object(object) => {
                if let Some(value) = object.downcast_ref::<i32>() {
                    Some(value.to_string())
                } else if let Some(value) = object.downcast_ref::<i64>() {
                    Some(value.to_string())
                } else if let Some(value) = object.downcast_ref::<u32>() {
                    Some(value.to_string())
                } else if let Some(value) = object.downcast_ref::<u64>() {
                    Some(value.to_string())
                } else if let Some(value) = object.downcast_ref::<usize>() {
                    Some(value.to_string())
                } else if let Some(value) = object.downcast_ref::<f64>() {
                    Some(value.to_string())
                } else {
                    object.downcast_ref::<String>().cloned()
                }
            }
            Self::EventHandler(_) => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left == right,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Object(left), Self::Object(right)) => {
                std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
            }
            (Self::EventHandler(left), Self::EventHandler(right)) => left.id == right.id,
            _ => false,
        }
    }
}

impl fmt::Debug for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
            Self::EventHandler(binding) => f.debug_tuple("EventHandler").field(&binding.id).finish(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::object(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::object(value)
    }
}

impl From<usize> for AttributeValue {
    fn from(value: usize) -> Self {
        Self::object(value)
    }
}

impl From<RenderFragment> for AttributeValue {
    fn from(value: RenderFragment) -> Self {
        Self::object(value)
    }
}

/// The concrete component a component frame was bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedComponent {
    pub id: ComponentId,
    pub instance_type: TypeId,
    pub instance_type_name: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderTreeFrame {
    Element {
        name: String,
        subtree_length: usize,
    },
    Attribute {
        name: String,
        value: AttributeValue,
    },
    Text(String),
    Markup(String),
    Component {
        component_type: ComponentType,
        subtree_length: usize,
        resolved: Option<ResolvedComponent>,
    },
}

impl RenderTreeFrame {
    /// Number of frames this frame spans, itself included.
    pub fn subtree_length(&self) -> usize {
        match self {
            Self::Element { subtree_length, .. } | Self::Component { subtree_length, .. } => {
                *subtree_length
            }
            _ => 1,
        }
    }

    pub fn component_id(&self) -> Option<ComponentId> {
        match self {
            Self::Component {
                resolved: Some(resolved),
                ..
            } => Some(resolved.id),
            _ => None,
        }
    }
}

/// Ids of the components referenced directly by `frames`, in frame order.
pub fn child_component_ids(frames: &[RenderTreeFrame]) -> impl Iterator<Item = ComponentId> + '_ {
    frames.iter().filter_map(RenderTreeFrame::component_id)
}

/// Collects the frames of one render.
#[derive(Debug, Default)]
pub struct RenderTreeBuilder {
    frames: Vec<RenderTreeFrame>,
    open: Vec<usize>,
    attributes_allowed: bool,
    error: Option<String>,
}

impl RenderTreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn open_element(&mut self, name: &str) {
        self.open.push(self.frames.len());
        self.frames.push(RenderTreeFrame::Element {
            name: name.to_string(),
            subtree_length: 0,
        });
        self.attributes_allowed = true;
    }

    pub fn close_element(&mut self) {
        self.close(false);
    }

    pub fn open_component<T: Component + Default>(&mut self) {
        self.open_component_type(ComponentType::of::<T>());
    }

    pub fn open_component_type(&mut self, component_type: ComponentType) {
        self.open.push(self.frames.len());
        self.frames.push(RenderTreeFrame::Component {
            component_type,
            subtree_length: 0,
            resolved: None,
        });
        self.attributes_allowed = true;
    }

    pub fn close_component(&mut self) {
        self.close(true);
    }

    pub fn add_attribute(&mut self, name: &str, value: impl Into<AttributeValue>) {
        if !self.attributes_allowed {
            self.fail(format!(
                "attribute '{name}' must directly follow an element, a component or another attribute"
            ));
            return;
        }
        self.frames.push(RenderTreeFrame::Attribute {
            name: name.to_string(),
            value: value.into(),
        });
    }

    /// Adds an `on*` attribute whose handler mutates the rendering component.
    pub fn add_event_handler<C, A>(
        &mut self,
        name: &str,
        handler: impl Fn(&mut C, &A) -> anyhow::Result<()> + Send + Sync + 'static,
    ) where
        C: Component,
        A: EventArgs,
    {
        let binding = EventHandlerBinding {
            id: None,
            callback: EventCallback::new(handler),
        };
        self.add_attribute(name, AttributeValue::EventHandler(binding));
    }

    pub fn add_content(&mut self, text: impl Into<String>) {
        self.attributes_allowed = false;
        self.frames.push(RenderTreeFrame::Text(text.into()));
    }

    pub fn add_markup_content(&mut self, markup: impl Into<String>) {
        self.attributes_allowed = false;
        self.frames.push(RenderTreeFrame::Markup(markup.into()));
    }

    /// Renders `fragment` inline at the current position.
    pub fn add_fragment(&mut self, fragment: &RenderFragment) {
        self.attributes_allowed = false;
        fragment.render(self);
    }

    fn close(&mut self, component: bool) {
        self.attributes_allowed = false;
        let Some(start) = self.open.pop() else {
            self.fail("close without a matching open".to_string());
            return;
        };
        let length = self.frames.len() - start;
        let mismatch = match &mut self.frames[start] {
            RenderTreeFrame::Component { subtree_length, .. } if component => {
                *subtree_length = length;
                None
            }
            RenderTreeFrame::Element { subtree_length, .. } if !component => {
                *subtree_length = length;
                None
            }
            RenderTreeFrame::Element { name, .. } => {
                Some(format!("element <{name}> was closed as a component"))
            }
            _ => Some("component was closed as an element".to_string()),
        };
        if let Some(message) = mismatch {
            self.fail(message);
        }
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    pub(crate) fn finish(self) -> std::result::Result<Vec<RenderTreeFrame>, String> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.open.is_empty() {
            return Err(format!("{} frame(s) were left open", self.open.len()));
        }
        Ok(self.frames)
    }
}

/// Indexes of the attribute frames directly following `frames[owner]`.
pub(crate) fn attribute_range(frames: &[RenderTreeFrame], owner: usize) -> std::ops::Range<usize> {
    let start = owner + 1;
    let mut end = start;
    while end < frames.len() && matches!(frames[end], RenderTreeFrame::Attribute { .. }) {
        end += 1;
    }
    start..end
}

/// Copies `frames` with the `value` attribute next to `handler_id` replaced,
/// or `None` when the handler does not sit on an element with a value.
pub(crate) fn with_bound_value(
    frames: &[RenderTreeFrame],
    handler_id: EventHandlerId,
    value: &str,
) -> Option<Vec<RenderTreeFrame>> {
    let handler_index = frames.iter().position(|frame| {
        matches!(
            frame,
            RenderTreeFrame::Attribute {
                value: AttributeValue::EventHandler(binding),
                ..
            } if binding.id == Some(handler_id)
        )
    })?;
    let mut owner = handler_index;
    while owner > 0 && matches!(frames[owner], RenderTreeFrame::Attribute { .. }) {
        owner -= 1;
    }
    if !matches!(frames[owner], RenderTreeFrame::Element { .. }) {
        return None;
    }
    let value_index = attribute_range(frames, owner).find(|index| {
        matches!(&frames[*index], RenderTreeFrame::Attribute { name, .. } if name == "value")
    })?;
    let mut updated = frames.to_vec();
    updated[value_index] = RenderTreeFrame::Attribute {
        name: "value".to_string(),
        value: AttributeValue::Text(value.to_string()),
    };
    Some(updated)
}
