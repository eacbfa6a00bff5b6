//! The component model the harness renders.
//!
//! This is the small rendering substrate the [`crate::TestRenderer`] sits on:
//! components build [`RenderTreeFrame`]s, the [`BaseRenderer`] reconciles
//! child components, assigns event handler ids and reports each completed
//! cycle to its [`RenderHost`] as a [`RenderBatch`]. It deliberately knows
//! nothing about rendered-fragment handles or markup.

mod activator;
mod component;
mod events;
mod frame;
mod renderer;

pub use activator::{ComponentActivator, DefaultComponentActivator};
pub use component::{
    CHILD_CONTENT, Component, ComponentContext, ComponentType, ParameterView, RenderFragment,
    RendererInfo,
};
pub use events::{
    ChangeEventArgs, EmptyEventArgs, EventArgs, EventFieldInfo, FocusEventArgs,
    KeyboardEventArgs, MouseEventArgs,
};
pub use frame::{
    AttributeValue, ComponentId, EventCallback, EventHandlerBinding, EventHandlerId,
    RenderTreeBuilder, RenderTreeFrame, ResolvedComponent, child_component_ids,
};
pub(crate) use frame::attribute_range;
pub use renderer::{BaseRenderer, RenderBatch, RenderHost, RenderTreeDiff};
