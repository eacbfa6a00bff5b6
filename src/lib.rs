//! Deterministic test-double renderer for component based UIs.
//!
//! Components are rendered in isolation on a dedicated dispatcher thread.
//! Every completed render batch is fanned out to the [`RenderedFragment`]
//! handles the test holds, so markup, render counts and disposal state can be
//! queried from the test thread at any time.
//!
//! ```no_run
//! use component_tester::{ComponentParameterCollection, Result, TestContext};
//! # use component_tester::framework::{Component, RenderTreeBuilder};
//! # #[derive(Default)]
//! # struct Greeting;
//! # impl Component for Greeting {
//! #     fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
//! #         builder.open_element("h1");
//! #         builder.add_content("Hello");
//! #         builder.close_element();
//! #     }
//! # }
//!
//! fn greeting_renders() -> Result<()> {
//!     let ctx = TestContext::new()?;
//!     let cut = ctx.render::<Greeting>(ComponentParameterCollection::new())?;
//!     assert_eq!(cut.markup()?, "<h1>Hello</h1>");
//!     Ok(())
//! }
//! ```

use std::time::Duration;

pub mod activator;
pub mod context;
pub mod dispatcher;
pub mod dom;
pub mod element;
pub mod frame_dictionary;
pub mod framework;
pub mod markup;
pub mod parameters;
pub mod render_event;
pub mod rendered;
pub mod renderer;
mod waiting;

pub use activator::{ComponentFactory, ComponentFactoryCollection, TestComponentActivator};
pub use context::{RootRenderTree, TestContext, TestContextOptions};
pub use dispatcher::Dispatcher;
pub use dom::{NodeList, NodeRef};
pub use element::RenderedElement;
pub use frame_dictionary::RenderTreeFrameDictionary;
pub use framework::{ComponentId, EventHandlerId};
pub use parameters::ComponentParameterCollection;
pub use render_event::{RenderEvent, RenderStatus};
pub use rendered::{RenderedComponent, RenderedFragment};
pub use renderer::TestRenderer;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("no element matched the selector '{0}'")]
    ElementNotFound(String),
    #[error("a component of type {0} was not found in the render tree")]
    ComponentNotFound(&'static str),
    #[error(
        "the component with id {0} has been disposed; its markup and render state are no longer available"
    )]
    ComponentDisposed(ComponentId),
    #[error("no component with id {0} is attached to the renderer")]
    UnknownComponent(ComponentId),
    #[error("component {component_id} is a {actual}, not a {expected}")]
    ComponentTypeMismatch {
        component_id: ComponentId,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("there is no event handler associated with this event, event handler id: '{0}'")]
    EventHandlerNotFound(EventHandlerId),
    #[error(
        "the event handler with id '{handler_id}' could not be found when dispatching {event_args_type}. \
         This usually means the element the handler was attached to has been re-rendered or removed \
         since it was queried, which gives its handlers new ids. Query the element again before \
         triggering the event, or find and trigger it inside a single `TestRenderer::invoke` call so \
         no render can happen in between"
    )]
    UnknownEventHandler {
        handler_id: EventHandlerId,
        event_args_type: &'static str,
    },
    #[error("the element <{element}> has no handler for the '{event_name}' event")]
    MissingEventHandler { event_name: String, element: String },
    #[error(
        "no renderer info has been configured, but a component asked for it. \
         Configure one before rendering, for example: \
         `ctx.set_renderer_info(RendererInfo::new(\"Server\", true))`"
    )]
    MissingRendererInfo,
    #[error("parameter '{name}' is missing or is not a {expected}")]
    ParameterType { name: String, expected: &'static str },
    #[error("invalid render tree: {0}")]
    InvalidRenderTree(String),
    #[error(transparent)]
    Unhandled(anyhow::Error),
    #[error("{} unhandled exceptions were raised while rendering: {}", .0.len(), join_errors(.0))]
    Aggregate(Vec<anyhow::Error>),
    #[error("timed out after {timeout:?} waiting for {condition}")]
    WaitTimeout {
        timeout: Duration,
        condition: String,
    },
    #[error("failed to start the renderer dispatcher")]
    DispatcherStart(#[source] std::io::Error),
    #[error("the renderer dispatcher has stopped")]
    DispatcherStopped,
}

impl Error {
    /// Returns the original error when this wraps a single exception raised
    /// by component code.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Self::Unhandled(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

fn join_errors(errors: &[anyhow::Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
