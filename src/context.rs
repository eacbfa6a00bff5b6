//! The entry point tests use: a renderer plus its configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::activator::{ComponentFactoryCollection, TestComponentActivator};
use crate::framework::{
    Component, ComponentType, ParameterView, RenderFragment, RenderTreeBuilder, RendererInfo,
};
use crate::parameters::ComponentParameterCollection;
use crate::rendered::{RenderedComponent, RenderedFragment};
use crate::renderer::TestRenderer;
use crate::Result;

const WAIT_TIMEOUT_ENV: &str = "COMPONENT_TESTER_WAIT_TIMEOUT_MS";
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_DISPATCHER_THREAD_NAME: &str = "component-tester-dispatcher";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestContextOptions {
    /// How long `wait_for_*` helpers wait when no timeout is given.
    pub default_wait_timeout: Duration,
    pub dispatcher_thread_name: String,
}

impl Default for TestContextOptions {
    fn default() -> Self {
        Self {
            default_wait_timeout: DEFAULT_WAIT_TIMEOUT,
            dispatcher_thread_name: DEFAULT_DISPATCHER_THREAD_NAME.to_string(),
        }
    }
}

impl TestContextOptions {
    /// Defaults, with the wait timeout taken from
    /// `COMPONENT_TESTER_WAIT_TIMEOUT_MS` when it holds a number of
    /// milliseconds.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(raw) = std::env::var(WAIT_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(millis) => options.default_wait_timeout = Duration::from_millis(millis),
                Err(_) => tracing::warn!(
                    value = %raw,
                    variable = WAIT_TIMEOUT_ENV,
                    "context.invalid_wait_timeout"
                ),
            }
        }
        options
    }
}

/// Holds the content rendered through [`TestContext::render_fragment`] so
/// its markup can be told apart from the root render tree's wrappers.
#[derive(Default)]
pub(crate) struct FragmentContainer {
    content: Option<RenderFragment>,
}

impl Component for FragmentContainer {
    fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
        self.content = parameters.child_content();
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        if let Some(content) = &self.content {
            builder.add_fragment(content);
        }
    }
}

/// Components every render is wrapped in, e.g. providers of cascading
/// state. The first added wrapper is the outermost; each one must render
/// its child content.
#[derive(Debug, Clone, Default)]
pub struct RootRenderTree {
    wrappers: Vec<(ComponentType, ComponentParameterCollection)>,
}

impl RootRenderTree {
    pub fn add<T: Component + Default>(&mut self) -> &mut Self {
        self.add_with::<T>(ComponentParameterCollection::new())
    }

    pub fn add_with<T: Component + Default>(
        &mut self,
        parameters: ComponentParameterCollection,
    ) -> &mut Self {
        self.wrappers.push((ComponentType::of::<T>(), parameters));
        self
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Nests `content` inside every registered wrapper.
    pub fn wrap(&self, content: RenderFragment) -> RenderFragment {
        self.wrappers
            .iter()
            .rev()
            .fold(content, |inner, (component_type, parameters)| {
                parameters
                    .clone()
                    .add_child_content(inner)
                    .to_fragment_of(*component_type)
            })
    }
}

/// Renders components for one test. Every component still mounted is
/// disposed when the context drops.
pub struct TestContext {
    renderer: Arc<TestRenderer>,
    factories: ComponentFactoryCollection,
    render_tree: RootRenderTree,
    options: TestContextOptions,
}

impl TestContext {
    pub fn new() -> Result<Self> {
        Self::with_options(TestContextOptions::from_env())
    }

    pub fn with_options(options: TestContextOptions) -> Result<Self> {
        let factories = ComponentFactoryCollection::new();
        let activator = Arc::new(TestComponentActivator::new(factories.clone()));
        let renderer = TestRenderer::new(activator, &options)?;
        tracing::debug!(
            thread = %options.dispatcher_thread_name,
            wait_timeout_ms = options.default_wait_timeout.as_millis() as u64,
            "context.created"
        );
        Ok(Self {
            renderer,
            factories,
            render_tree: RootRenderTree::default(),
            options,
        })
    }

    pub fn options(&self) -> &TestContextOptions {
        &self.options
    }

    pub fn renderer(&self) -> &Arc<TestRenderer> {
        &self.renderer
    }

    /// Factories consulted whenever a component is instantiated.
    pub fn component_factories(&self) -> &ComponentFactoryCollection {
        &self.factories
    }

    pub fn render_tree(&mut self) -> &mut RootRenderTree {
        &mut self.render_tree
    }

    pub fn set_renderer_info(&self, info: Option<RendererInfo>) {
        self.renderer.set_renderer_info(info);
    }

    /// Renders `T` with `parameters` inside the root render tree.
    pub fn render<T: Component + Default>(
        &self,
        parameters: ComponentParameterCollection,
    ) -> Result<RenderedComponent<T>> {
        let fragment = self.render_tree.wrap(parameters.to_fragment::<T>());
        self.renderer.render_component::<T>(fragment)
    }

    /// Renders arbitrary content inside the root render tree. The handle
    /// covers the content only, not the wrappers around it.
    pub fn render_fragment(&self, content: RenderFragment) -> Result<RenderedFragment> {
        let container = ComponentParameterCollection::new()
            .add_child_content(content)
            .to_fragment::<FragmentContainer>();
        let rendered = self
            .renderer
            .render_component::<FragmentContainer>(self.render_tree.wrap(container))?;
        Ok(RenderedFragment::clone(&rendered))
    }

    /// Disposes every component rendered so far, parents before children.
    pub fn dispose_components(&self) -> Result<()> {
        self.renderer.dispose_components()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Err(error) = self.renderer.dispose_components() {
            tracing::warn!(error = %error, "context.dispose_failed");
        }
    }
}

impl std::fmt::Debug for TestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestContext")
            .field("renderer", &self.renderer)
            .field("render_tree", &self.render_tree)
            .field("factories", &self.factories)
            .finish()
    }
}
