//! Elements found in rendered markup, with helpers to raise their events.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::dom::{NodeId, NodeList, NodeRef};
use crate::framework::{
    ChangeEventArgs, EmptyEventArgs, EventArgs, EventFieldInfo, EventHandlerId, FocusEventArgs,
    KeyboardEventArgs, MouseEventArgs,
};
use crate::markup::EVENT_HANDLER_ATTRIBUTE_PREFIX;
use crate::renderer::TestRenderer;
use crate::{Error, Result};

const NON_BUBBLING_EVENTS: &[&str] = &[
    "onabort",
    "onblur",
    "onerror",
    "onfocus",
    "onload",
    "onloadend",
    "onloadstart",
    "onmouseenter",
    "onmouseleave",
    "onprogress",
    "onscroll",
    "ontoggle",
];

/// One element of a rendered fragment's markup, as it was when found.
///
/// The element does not follow later renders. Find it again after a render
/// to see new markup or handler ids.
#[derive(Clone)]
pub struct RenderedElement {
    nodes: Arc<NodeList>,
    node: NodeId,
    renderer: Weak<TestRenderer>,
}

impl RenderedElement {
    pub(crate) fn new(nodes: Arc<NodeList>, node: NodeId, renderer: Weak<TestRenderer>) -> Self {
        Self {
            nodes,
            node,
            renderer,
        }
    }

    pub fn node(&self) -> NodeRef<'_> {
        self.nodes.node(self.node)
    }

    pub fn tag_name(&self) -> &str {
        self.node().tag_name().unwrap_or_default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.node().attribute(name)
    }

    pub fn has_class(&self, class_name: &str) -> bool {
        self.node().has_class(class_name)
    }

    pub fn text_content(&self) -> String {
        self.node().text_content()
    }

    pub fn outer_html(&self) -> String {
        self.node().outer_html()
    }

    pub fn inner_html(&self) -> String {
        self.node().inner_html()
    }

    pub fn click(&self) -> Result<()> {
        self.trigger(
            "onclick",
            MouseEventArgs {
                detail: 1,
                ..MouseEventArgs::default()
            },
        )
    }

    pub fn double_click(&self) -> Result<()> {
        self.trigger(
            "ondblclick",
            MouseEventArgs {
                detail: 2,
                ..MouseEventArgs::default()
            },
        )
    }

    /// Raises `onchange` as if the user committed `value`.
    pub fn change(&self, value: impl Into<String>) -> Result<()> {
        self.trigger_with_value("onchange", value.into())
    }

    /// Raises `oninput` as if the user typed `value`.
    pub fn input(&self, value: impl Into<String>) -> Result<()> {
        self.trigger_with_value("oninput", value.into())
    }

    pub fn key_down(&self, args: KeyboardEventArgs) -> Result<()> {
        self.trigger("onkeydown", args)
    }

    pub fn focus(&self) -> Result<()> {
        self.trigger(
            "onfocus",
            FocusEventArgs {
                event_type: "focus".to_string(),
            },
        )
    }

    pub fn blur(&self) -> Result<()> {
        self.trigger(
            "onblur",
            FocusEventArgs {
                event_type: "blur".to_string(),
            },
        )
    }

    pub fn submit(&self) -> Result<()> {
        self.trigger("onsubmit", EmptyEventArgs)
    }

    /// Raises `event` (with or without its `on` prefix) on this element.
    /// Bubbling events also reach handlers on ancestors until one of them
    /// stops propagation.
    pub fn trigger<A: EventArgs + Clone>(&self, event: &str, args: A) -> Result<()> {
        let renderer = self.renderer()?;
        let event = event_attribute_name(event);
        for handler_id in self.handler_ids(&event)? {
            renderer.dispatch_event(handler_id, None, args.clone())?;
        }
        Ok(())
    }

    fn trigger_with_value(&self, event: &str, value: String) -> Result<()> {
        let renderer = self.renderer()?;
        for handler_id in self.handler_ids(event)? {
            let field_info = renderer
                .base()
                .event_handler_owner(handler_id)
                .map(|component_id| EventFieldInfo {
                    component_id,
                    field_value: value.clone(),
                });
            renderer.dispatch_event(handler_id, field_info, ChangeEventArgs::new(value.clone()))?;
        }
        Ok(())
    }

    fn renderer(&self) -> Result<Arc<TestRenderer>> {
        self.renderer.upgrade().ok_or(Error::DispatcherStopped)
    }

    fn handler_ids(&self, event: &str) -> Result<Vec<EventHandlerId>> {
        let handlers = handler_ids(self.node(), event)?;
        if handlers.is_empty() {
            return Err(Error::MissingEventHandler {
                event_name: event.to_string(),
                element: self.tag_name().to_string(),
            });
        }
        Ok(handlers)
    }
}

fn event_attribute_name(event: &str) -> String {
    let event = event.to_ascii_lowercase();
    if event.starts_with("on") {
        event
    } else {
        format!("on{event}")
    }
}

/// Handler ids `event` reaches from `node`, innermost first.
fn handler_ids(node: NodeRef<'_>, event: &str) -> Result<Vec<EventHandlerId>> {
    let attribute = format!("{EVENT_HANDLER_ATTRIBUTE_PREFIX}{event}");
    let stop_propagation = format!("{attribute}:stoppropagation");
    let bubbles = !NON_BUBBLING_EVENTS.contains(&event);

    let mut handlers = Vec::new();
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        if let Some(raw) = current.attribute(&attribute) {
            let handler_id = raw.parse::<EventHandlerId>().map_err(|_| {
                Error::InvalidRenderTree(format!("'{raw}' is not an event handler id"))
            })?;
            handlers.push(handler_id);
        }
        if !bubbles || current.has_attribute(&stop_propagation) {
            break;
        }
        cursor = current.parent();
    }
    Ok(handlers)
}

impl fmt::Debug for RenderedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderedElement")
            .field(&self.outer_html())
            .finish()
    }
}
