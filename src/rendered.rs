//! Handles to rendered output that stay in step with the render tree.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use parking_lot::{Condvar, Mutex};

use crate::dom::NodeList;
use crate::element::RenderedElement;
use crate::framework::{Component, ComponentId, RenderHost};
use crate::markup;
use crate::parameters::ComponentParameterCollection;
use crate::render_event::RenderEvent;
use crate::renderer::TestRenderer;
use crate::{Error, Result};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// The component type a handle binds itself to on its first render.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExpectedComponent {
    type_id: TypeId,
    name: &'static str,
}

impl ExpectedComponent {
    pub(crate) fn of<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

/// Shared state behind [`RenderedFragment`] clones. The renderer writes it
/// from the dispatcher; tests read it from any thread.
pub(crate) struct FragmentState {
    component_id: AtomicU32,
    renderer: Weak<TestRenderer>,
    expected: Option<ExpectedComponent>,
    resolved: AtomicBool,
    markup: ArcSwap<String>,
    nodes: Mutex<Option<(Arc<String>, Arc<NodeList>)>>,
    render_count: AtomicUsize,
    disposed: AtomicBool,
    markup_updated: Mutex<Vec<Listener>>,
    after_render: Mutex<Vec<Listener>>,
    renders: Mutex<u64>,
    rendered: Condvar,
}

impl FragmentState {
    pub(crate) fn new(
        component_id: ComponentId,
        renderer: Weak<TestRenderer>,
        expected: Option<ExpectedComponent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            component_id: AtomicU32::new(component_id.get()),
            renderer,
            resolved: AtomicBool::new(expected.is_none()),
            expected,
            markup: ArcSwap::from_pointee(String::new()),
            nodes: Mutex::new(None),
            render_count: AtomicUsize::new(0),
            disposed: AtomicBool::new(false),
            markup_updated: Mutex::new(Vec::new()),
            after_render: Mutex::new(Vec::new()),
            renders: Mutex::new(0),
            rendered: Condvar::new(),
        })
    }

    /// State for a component located by a search. It has rendered already,
    /// so it starts with one render and its current markup.
    pub(crate) fn found(
        component_id: ComponentId,
        renderer: Weak<TestRenderer>,
        expected: ExpectedComponent,
        markup: String,
    ) -> Arc<Self> {
        let state = Self::new(component_id, renderer, Some(expected));
        state.resolved.store(true, Ordering::Release);
        state.render_count.store(1, Ordering::Release);
        state.markup.store(Arc::new(markup));
        state
    }

    pub(crate) fn component_id(&self) -> ComponentId {
        ComponentId(self.component_id.load(Ordering::Acquire))
    }

    pub(crate) fn assign_id(&self, component_id: ComponentId) {
        self.component_id
            .store(component_id.get(), Ordering::Release);
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_live(&self) -> Result<ComponentId> {
        let component_id = self.component_id();
        if self.is_disposed() {
            return Err(Error::ComponentDisposed(component_id));
        }
        Ok(component_id)
    }

    pub(crate) fn renderer(&self) -> Result<Arc<TestRenderer>> {
        self.renderer.upgrade().ok_or(Error::DispatcherStopped)
    }

    /// Number of render notifications seen so far, disposal included.
    pub(crate) fn render_generation(&self) -> u64 {
        *self.renders.lock()
    }

    /// Blocks until the generation moves past `seen` or `timeout` elapses.
    /// Returns the latest generation.
    pub(crate) fn wait_for_render(&self, seen: u64, timeout: std::time::Duration) -> u64 {
        let mut renders = self.renders.lock();
        if *renders == seen {
            let _ = self.rendered.wait_for(&mut renders, timeout);
        }
        *renders
    }

    /// Applies one render cycle to this handle.
    pub(crate) fn on_render(&self, event: &RenderEvent<'_>) {
        if self.is_disposed() {
            return;
        }

        let mut component_id = self.component_id();
        let mut status = event.render_status(component_id);

        if status.disposed {
            self.dispose();
            tracing::trace!(component_id = %component_id, "fragment.disposed");
            self.signal();
            return;
        }

        if status.rendered && !self.is_resolved() {
            let Some(resolved_id) = self.resolve(event, component_id) else {
                return;
            };
            component_id = resolved_id;
            status = event.load_changes(component_id);
        }

        if status.rendered {
            self.render_count.fetch_add(1, Ordering::AcqRel);
        }

        if status.changed {
            match markup::render_markup(component_id, event.frames()) {
                Ok(markup) => {
                    self.markup.store(Arc::new(markup));
                    tracing::trace!(component_id = %component_id, "fragment.markup_updated");
                    notify(&self.markup_updated);
                }
                Err(error) => {
                    if let Ok(renderer) = self.renderer() {
                        renderer.handle_exception(anyhow::Error::new(error));
                    }
                }
            }
        }

        if status.rendered {
            notify(&self.after_render);
        }

        self.signal();
    }

    /// Binds an unresolved handle to the first expected component below
    /// `root`.
    fn resolve(&self, event: &RenderEvent<'_>, root: ComponentId) -> Option<ComponentId> {
        let expected = self.expected?;
        let found = *event
            .frames()
            .find_components(root, expected.type_id, 1)
            .first()?;
        if let Ok(renderer) = self.renderer() {
            renderer.rebind_fragment(root, found);
        } else {
            self.assign_id(found);
        }
        self.resolved.store(true, Ordering::Release);
        tracing::trace!(
            root = %root,
            component_id = %found,
            component = expected.name,
            "fragment.resolved"
        );
        Some(found)
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        self.markup.store(Arc::new(String::new()));
        *self.nodes.lock() = None;
        self.markup_updated.lock().clear();
        self.after_render.lock().clear();
    }

    fn signal(&self) {
        *self.renders.lock() += 1;
        self.rendered.notify_all();
    }
}

fn notify(listeners: &Mutex<Vec<Listener>>) {
    let listeners = listeners.lock().clone();
    for listener in listeners {
        listener();
    }
}

/// Rendered output of a fragment. Clones share one underlying state.
#[derive(Clone)]
pub struct RenderedFragment {
    state: Arc<FragmentState>,
}

impl RenderedFragment {
    pub(crate) fn new(state: Arc<FragmentState>) -> Self {
        Self { state }
    }

    pub(crate) fn state(&self) -> &FragmentState {
        &self.state
    }

    pub fn component_id(&self) -> ComponentId {
        self.state.component_id()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.is_disposed()
    }

    /// The markup produced by the latest render.
    pub fn markup(&self) -> Result<String> {
        self.state.ensure_live()?;
        Ok(String::clone(&self.state.markup.load()))
    }

    pub fn render_count(&self) -> Result<usize> {
        self.state.ensure_live()?;
        Ok(self.state.render_count.load(Ordering::Acquire))
    }

    /// The latest markup as a node list, parsed once per markup update.
    pub fn nodes(&self) -> Result<Arc<NodeList>> {
        self.state.ensure_live()?;
        let markup = self.state.markup.load_full();
        let mut cached = self.state.nodes.lock();
        if let Some((source, nodes)) = cached.as_ref() {
            if Arc::ptr_eq(source, &markup) {
                return Ok(Arc::clone(nodes));
            }
        }
        let nodes = Arc::new(NodeList::parse(&markup)?);
        *cached = Some((markup, Arc::clone(&nodes)));
        Ok(nodes)
    }

    /// First element matching `selector`.
    pub fn find(&self, selector: &str) -> Result<RenderedElement> {
        let nodes = self.nodes()?;
        let node = nodes
            .query_selector(selector)?
            .map(|node| node.id())
            .ok_or_else(|| Error::ElementNotFound(selector.to_string()))?;
        Ok(RenderedElement::new(
            nodes,
            node,
            self.state.renderer.clone(),
        ))
    }

    /// Every element matching `selector`, in document order.
    pub fn find_all(&self, selector: &str) -> Result<Vec<RenderedElement>> {
        let nodes = self.nodes()?;
        let ids = nodes
            .query_selector_all(selector)?
            .iter()
            .map(|node| node.id())
            .collect::<Vec<_>>();
        Ok(ids
            .into_iter()
            .map(|node| RenderedElement::new(Arc::clone(&nodes), node, self.state.renderer.clone()))
            .collect())
    }

    /// Calls `listener` on the dispatcher every time the markup changes.
    pub fn on_markup_updated(&self, listener: impl Fn() + Send + Sync + 'static) -> Result<()> {
        let mut listeners = self.state.markup_updated.lock();
        self.state.ensure_live()?;
        listeners.push(Arc::new(listener));
        Ok(())
    }

    /// Calls `listener` on the dispatcher after every render of the
    /// subtree, whether or not the markup changed.
    pub fn on_after_render(&self, listener: impl Fn() + Send + Sync + 'static) -> Result<()> {
        let mut listeners = self.state.after_render.lock();
        self.state.ensure_live()?;
        listeners.push(Arc::new(listener));
        Ok(())
    }

    pub fn find_component<U: Component>(&self) -> Result<RenderedComponent<U>> {
        self.state.renderer()?.find_component::<U>(self)
    }

    pub fn find_components<U: Component>(&self) -> Result<Vec<RenderedComponent<U>>> {
        self.state.renderer()?.find_components::<U>(self)
    }
}

impl fmt::Debug for RenderedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedFragment")
            .field("component_id", &self.component_id())
            .field("disposed", &self.is_disposed())
            .field("render_count", &self.state.render_count.load(Ordering::Acquire))
            .finish()
    }
}

/// A rendered fragment bound to a component of type `T`.
pub struct RenderedComponent<T> {
    fragment: RenderedFragment,
    _component: PhantomData<fn() -> T>,
}

impl<T: Component> RenderedComponent<T> {
    pub(crate) fn new(state: Arc<FragmentState>) -> Self {
        Self {
            fragment: RenderedFragment::new(state),
            _component: PhantomData,
        }
    }

    /// Reads the live component instance.
    pub fn instance<R>(&self, read: impl FnOnce(&T) -> R) -> Result<R> {
        let component_id = self.state.ensure_live()?;
        self.state
            .renderer()?
            .with_component(component_id, read)
    }

    /// Replaces the component's parameters and renders it again.
    pub fn set_parameters_and_render(&self, parameters: ComponentParameterCollection) -> Result<()> {
        let component_id = self.state.ensure_live()?;
        self.state
            .renderer()?
            .set_parameters_and_render(component_id, parameters.to_parameter_view())
    }
}

impl<T> Clone for RenderedComponent<T> {
    fn clone(&self) -> Self {
        Self {
            fragment: self.fragment.clone(),
            _component: PhantomData,
        }
    }
}

impl<T> Deref for RenderedComponent<T> {
    type Target = RenderedFragment;

    fn deref(&self) -> &Self::Target {
        &self.fragment
    }
}

impl<T> fmt::Debug for RenderedComponent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedComponent")
            .field("component", &std::any::type_name::<T>())
            .field("fragment", &self.fragment)
            .finish()
    }
}
