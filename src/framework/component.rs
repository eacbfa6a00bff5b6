use std::any::{Any, TypeId};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};

use super::frame::{AttributeValue, ComponentId, RenderTreeBuilder};
use super::renderer::{Continuation, RenderHost};
use crate::{Error, Result};

/// Name of the parameter carrying a component's child content fragment.
pub const CHILD_CONTENT: &str = "ChildContent";

/// A unit of UI that renders itself into frames.
///
/// All lifecycle methods run on the renderer's dispatcher thread. They get
/// no access to the renderer itself; asynchronous work goes through
/// [`ComponentContext::spawn`].
pub trait Component: Any + Send {
    fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
        let _ = parameters;
        Ok(())
    }

    /// Runs once, after the first parameter set.
    fn on_initialized(&mut self, context: &mut ComponentContext<'_>) -> anyhow::Result<()> {
        let _ = context;
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder);

    /// Runs when the component leaves the render tree, before its children
    /// are disposed.
    fn dispose(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

fn construct_default<T: Component + Default>() -> Box<dyn Component> {
    Box::new(T::default())
}

/// Describes a component type that can be requested in a render tree.
#[derive(Clone, Copy)]
pub struct ComponentType {
    type_id: TypeId,
    name: &'static str,
    construct: fn() -> Box<dyn Component>,
}

impl ComponentType {
    pub fn of<T: Component + Default>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            construct: construct_default::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn construct(&self) -> Box<dyn Component> {
        (self.construct)()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A reusable piece of render output.
#[derive(Clone)]
pub struct RenderFragment(Arc<dyn Fn(&mut RenderTreeBuilder) + Send + Sync>);

impl RenderFragment {
    pub fn new(render: impl Fn(&mut RenderTreeBuilder) + Send + Sync + 'static) -> Self {
        Self(Arc::new(render))
    }

    pub fn empty() -> Self {
        Self::new(|_| {})
    }

    pub fn markup(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        Self::new(move |builder| builder.add_markup_content(markup.clone()))
    }

    pub fn render(&self, builder: &mut RenderTreeBuilder) {
        (self.0)(builder)
    }
}

impl fmt::Debug for RenderFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderFragment(..)")
    }
}

/// Parameters passed to [`Component::set_parameters`]. Names compare ASCII
/// case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ParameterView {
    entries: Vec<(String, AttributeValue)>,
}

impl ParameterView {
    pub(crate) fn from_entries(entries: Vec<(String, AttributeValue)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn get<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.value(name)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Like [`Self::get`] but fails when the parameter is absent or of
    /// another type.
    pub fn require<T: Any + Clone>(&self, name: &str) -> Result<T> {
        self.get::<T>(name).ok_or_else(|| Error::ParameterType {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(AttributeValue::as_text)
    }

    pub fn child_content(&self) -> Option<RenderFragment> {
        self.get::<RenderFragment>(CHILD_CONTENT)
    }
}

/// Information about the environment a component is rendered in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererInfo {
    pub name: String,
    pub is_interactive: bool,
}

impl RendererInfo {
    pub fn new(name: impl Into<String>, is_interactive: bool) -> Self {
        Self {
            name: name.into(),
            is_interactive,
        }
    }
}

/// Services available to a component while it initializes.
pub struct ComponentContext<'a> {
    pub(crate) component_id: ComponentId,
    pub(crate) spawner: &'a tokio::runtime::Handle,
    pub(crate) host: &'a Weak<dyn RenderHost>,
    pub(crate) renderer_info: Option<RendererInfo>,
}

impl ComponentContext<'_> {
    pub fn component_id(&self) -> ComponentId {
        self.component_id
    }

    pub fn renderer_info(&self) -> Result<RendererInfo> {
        self.renderer_info.clone().ok_or(Error::MissingRendererInfo)
    }

    /// Runs `future` on the dispatcher. When it completes, `apply` receives
    /// the output together with the component and the component renders
    /// again. Nothing happens if the component was disposed in between.
    pub fn spawn<C, F>(
        &mut self,
        future: F,
        apply: impl FnOnce(&mut C, F::Output) -> anyhow::Result<()> + Send + 'static,
    ) where
        C: Component,
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let host = self.host.clone();
        let component_id = self.component_id;
        tracing::trace!(component_id = %component_id, "component.spawn");
        self.spawner.spawn(async move {
            let output = future.await;
            let Some(host) = host.upgrade() else {
                return;
            };
            let continuation: Continuation = Box::new(move |component: &mut dyn Component| {
                let component: &mut dyn Any = component;
                let component = component.downcast_mut::<C>().ok_or_else(|| {
                    anyhow::anyhow!(
                        "continuation expects a {} component",
                        std::any::type_name::<C>()
                    )
                })?;
                apply(component, output)
            });
            host.renderer().resume_component(component_id, continuation);
        });
    }
}
