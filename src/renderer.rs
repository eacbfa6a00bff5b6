//! The test renderer: a render host over the base renderer that keeps every
//! rendered fragment in step with the render tree.

use std::any::TypeId;
use std::sync::{Arc, Weak};
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::{Mutex, ReentrantMutex};

use crate::context::TestContextOptions;
use crate::dispatcher::Dispatcher;
use crate::frame_dictionary::RenderTreeFrameDictionary;
use crate::framework::{
    BaseRenderer, Component, ComponentActivator, ComponentId, EventArgs, EventFieldInfo,
    EventHandlerId, ParameterView, RenderBatch, RenderFragment, RenderHost, RenderTreeBuilder,
    RendererInfo,
};
use crate::markup;
use crate::render_event::RenderEvent;
use crate::rendered::{ExpectedComponent, FragmentState, RenderedComponent, RenderedFragment};
use crate::{Error, Result};

/// Mounts the content handed to [`TestRenderer::render_fragment`].
pub(crate) struct RootComponent {
    content: RenderFragment,
}

impl Component for RootComponent {
    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.add_fragment(&self.content);
    }
}

#[derive(Default)]
struct FragmentTables {
    fragments: IndexMap<ComponentId, Arc<FragmentState>>,
    roots: Vec<ComponentId>,
}

pub struct TestRenderer {
    base: BaseRenderer,
    dispatcher: Dispatcher,
    render_tree_update_lock: ReentrantMutex<()>,
    tables: Mutex<FragmentTables>,
    unhandled: Mutex<Vec<anyhow::Error>>,
    wait_timeout: Duration,
    self_ref: Weak<TestRenderer>,
}

impl TestRenderer {
    pub fn new(
        activator: Arc<dyn ComponentActivator>,
        options: &TestContextOptions,
    ) -> Result<Arc<Self>> {
        let dispatcher = Dispatcher::new(&options.dispatcher_thread_name)?;
        let spawner = dispatcher.runtime_handle().clone();
        Ok(Arc::new_cyclic(|self_ref: &Weak<TestRenderer>| {
            let host: Weak<dyn RenderHost> = self_ref.clone();
            Self {
                base: BaseRenderer::new(host, activator, spawner),
                dispatcher,
                render_tree_update_lock: ReentrantMutex::new(()),
                tables: Mutex::new(FragmentTables::default()),
                unhandled: Mutex::new(Vec::new()),
                wait_timeout: options.default_wait_timeout,
                self_ref: self_ref.clone(),
            }
        }))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub(crate) fn base(&self) -> &BaseRenderer {
        &self.base
    }

    /// Timeout the `wait_for_*` helpers use by default.
    pub fn default_wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    pub fn set_renderer_info(&self, info: Option<RendererInfo>) {
        self.base.set_renderer_info(info);
    }

    /// Renders `fragment` under a fresh root component and returns a handle
    /// to its output once the first render completed.
    pub fn render_fragment(&self, fragment: RenderFragment) -> Result<RenderedFragment> {
        let state = self.invoke_locked(move |renderer| renderer.mount(fragment, None))?;
        Ok(RenderedFragment::new(state))
    }

    /// Renders `fragment` and binds the handle to the first `T` it produced,
    /// wherever it sits below the root.
    pub fn render_component<T: Component>(
        &self,
        fragment: RenderFragment,
    ) -> Result<RenderedComponent<T>> {
        let state = self.invoke_locked(move |renderer| {
            let state = renderer.mount(fragment, Some(ExpectedComponent::of::<T>()))?;
            if state.is_resolved() {
                return Ok(state);
            }
            let root = state.component_id();
            {
                let mut tables = renderer.tables.lock();
                tables.fragments.shift_remove(&root);
                tables.roots.retain(|component_id| *component_id != root);
            }
            renderer.base.remove_root_component(root)?;
            Err(Error::ComponentNotFound(std::any::type_name::<T>()))
        })?;
        Ok(RenderedComponent::new(state))
    }

    fn mount(
        &self,
        content: RenderFragment,
        expected: Option<ExpectedComponent>,
    ) -> Result<Arc<FragmentState>> {
        let component_id = self
            .base
            .assign_root_component_id(Box::new(RootComponent { content }));
        let state = FragmentState::new(component_id, self.self_ref.clone(), expected);
        {
            let mut tables = self.tables.lock();
            tables.roots.push(component_id);
            tables.fragments.insert(component_id, Arc::clone(&state));
        }
        self.base
            .render_root_component(component_id, ParameterView::default())?;
        Ok(state)
    }

    pub fn find_component<T: Component>(
        &self,
        parent: &RenderedFragment,
    ) -> Result<RenderedComponent<T>> {
        self.find_component_states::<T>(parent.state(), 1)?
            .into_iter()
            .next()
            .map(RenderedComponent::new)
            .ok_or(Error::ComponentNotFound(std::any::type_name::<T>()))
    }

    pub fn find_components<T: Component>(
        &self,
        parent: &RenderedFragment,
    ) -> Result<Vec<RenderedComponent<T>>> {
        Ok(self
            .find_component_states::<T>(parent.state(), usize::MAX)?
            .into_iter()
            .map(RenderedComponent::new)
            .collect())
    }

    /// Depth-first pre-order search below `parent`. Handles already in the
    /// table are returned as is so repeated finds share one handle.
    pub(crate) fn find_component_states<T: Component>(
        &self,
        parent: &FragmentState,
        limit: usize,
    ) -> Result<Vec<Arc<FragmentState>>> {
        let _guard = self.render_tree_update_lock.lock();
        let parent_id = parent.ensure_live()?;
        let frames = RenderTreeFrameDictionary::new(&self.base);
        let found = frames.find_components(parent_id, TypeId::of::<T>(), limit);
        tracing::trace!(
            parent = %parent_id,
            component = std::any::type_name::<T>(),
            matches = found.len(),
            "renderer.find_components"
        );

        let mut states = Vec::with_capacity(found.len());
        for component_id in found {
            let existing = self.tables.lock().fragments.get(&component_id).cloned();
            let state = match existing {
                Some(state) => state,
                None => {
                    let markup = markup::render_markup(component_id, &frames)?;
                    let state = FragmentState::found(
                        component_id,
                        self.self_ref.clone(),
                        ExpectedComponent::of::<T>(),
                        markup,
                    );
                    self.tables
                        .lock()
                        .fragments
                        .insert(component_id, Arc::clone(&state));
                    state
                }
            };
            states.push(state);
        }
        Ok(states)
    }

    /// Reads the live `T` instance behind `component_id`.
    pub(crate) fn with_component<T: Component, R>(
        &self,
        component_id: ComponentId,
        read: impl FnOnce(&T) -> R,
    ) -> Result<R> {
        let _guard = self.render_tree_update_lock.lock();
        self.base.with_component(component_id, read)
    }

    /// Raises an event on the handler with `handler_id`.
    pub fn dispatch_event<A: EventArgs>(
        &self,
        handler_id: EventHandlerId,
        field_info: Option<EventFieldInfo>,
        args: A,
    ) -> Result<()> {
        self.invoke_locked(move |renderer| {
            renderer
                .base
                .dispatch_event(handler_id, field_info, &args)
                .map_err(|error| match error {
                    Error::EventHandlerNotFound(handler_id) => Error::UnknownEventHandler {
                        handler_id,
                        event_args_type: std::any::type_name::<A>(),
                    },
                    other => other,
                })
        })
    }

    /// Pushes a new parameter set straight to a rendered component.
    pub fn set_parameters_and_render(
        &self,
        component_id: ComponentId,
        parameters: ParameterView,
    ) -> Result<()> {
        self.invoke_locked(move |renderer| {
            renderer
                .base
                .set_component_parameters(component_id, parameters)
        })
    }

    /// Disposes every root rendered so far, in the order they were rendered.
    pub fn dispose_components(&self) -> Result<()> {
        self.invoke_locked(|renderer| {
            let roots = std::mem::take(&mut renderer.tables.lock().roots);
            tracing::debug!(roots = roots.len(), "renderer.dispose_components");
            for root in roots {
                renderer.base.remove_root_component(root)?;
            }
            Ok(())
        })
    }

    /// Runs `work` on the dispatcher while holding the render tree lock, so
    /// a query followed by an event trigger sees one consistent tree.
    pub fn invoke<R>(&self, work: impl FnOnce() -> R + Send + 'static) -> Result<R>
    where
        R: Send + 'static,
    {
        self.invoke_locked(move |_| Ok(work()))
    }

    fn invoke_locked<R>(
        &self,
        work: impl FnOnce(&TestRenderer) -> Result<R> + Send + 'static,
    ) -> Result<R>
    where
        R: Send + 'static,
    {
        let renderer = self.self_ref.upgrade().ok_or(Error::DispatcherStopped)?;
        let outcome = self.dispatcher.invoke(move || {
            let _guard = renderer.render_tree_update_lock.lock();
            work(&renderer)
        })?;
        self.rethrow_unhandled()?;
        outcome
    }

    /// Surfaces exceptions captured since the last call. A single exception
    /// keeps its original type; several are reported together.
    pub(crate) fn rethrow_unhandled(&self) -> Result<()> {
        let mut captured = std::mem::take(&mut *self.unhandled.lock());
        match captured.len() {
            0 => Ok(()),
            1 => Err(Error::Unhandled(captured.remove(0))),
            _ => Err(Error::Aggregate(captured)),
        }
    }

    /// Moves a fragment to a new component id. The table is only ever
    /// re-keyed through here.
    pub(crate) fn rebind_fragment(&self, from: ComponentId, to: ComponentId) {
        let mut tables = self.tables.lock();
        let Some(state) = tables.fragments.shift_remove(&from) else {
            return;
        };
        state.assign_id(to);
        tables.fragments.insert(to, state);
        tracing::trace!(from = %from, to = %to, "renderer.rebind_fragment");
    }

    pub(crate) fn fragment_count(&self) -> usize {
        self.tables.lock().fragments.len()
    }
}

impl RenderHost for TestRenderer {
    fn renderer(&self) -> &BaseRenderer {
        &self.base
    }

    fn process_pending_render(&self) {
        let _guard = self.render_tree_update_lock.lock();
        self.base.process_render_queue();
    }

    fn update_display(&self, batch: &RenderBatch) {
        let event = RenderEvent::new(&self.base, batch);
        tracing::trace!(
            updated = batch.updated_components.len(),
            disposed = batch.disposed_component_ids.len(),
            "renderer.update_display"
        );

        for component_id in &batch.disposed_component_ids {
            let removed = self.tables.lock().fragments.shift_remove(component_id);
            if let Some(state) = removed {
                state.on_render(&event);
            }
        }

        let snapshot = self
            .tables
            .lock()
            .fragments
            .iter()
            .map(|(component_id, state)| (*component_id, Arc::clone(state)))
            .collect::<Vec<_>>();
        for (component_id, state) in snapshot {
            if state.is_disposed() || event.render_status(component_id).updates_applied {
                continue;
            }
            event.load_changes(component_id);
            state.on_render(&event);
            event.mark_updates_applied(state.component_id());
        }
    }

    fn handle_exception(&self, error: anyhow::Error) {
        tracing::debug!(error = %error, "renderer.unhandled_exception");
        self.unhandled.lock().push(error);
    }
}

impl std::fmt::Debug for TestRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRenderer")
            .field("dispatcher", &self.dispatcher)
            .field("fragments", &self.fragment_count())
            .finish()
    }
}
