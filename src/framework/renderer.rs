use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use super::activator::ComponentActivator;
use super::component::{Component, ComponentContext, ComponentType, ParameterView, RendererInfo};
use super::events::{EventArgs, EventFieldInfo};
use super::frame::{
    AttributeValue, ComponentId, EventCallback, EventHandlerId, RenderTreeBuilder,
    RenderTreeFrame, ResolvedComponent, attribute_range, child_component_ids, with_bound_value,
};
use crate::{Error, Result};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

pub(crate) type Continuation =
    Box<dyn FnOnce(&mut dyn Component) -> anyhow::Result<()> + Send>;

/// Receives the output of a [`BaseRenderer`].
pub trait RenderHost: Send + Sync {
    fn renderer(&self) -> &BaseRenderer;

    /// Drains the render queue. Hosts override this to wrap rendering in
    /// their own locking.
    fn process_pending_render(&self) {
        self.renderer().process_render_queue();
    }

    /// Called once per completed render cycle.
    fn update_display(&self, batch: &RenderBatch);

    fn handle_exception(&self, error: anyhow::Error);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTreeDiff {
    pub component_id: ComponentId,
    pub has_edits: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RenderBatch {
    pub updated_components: Vec<RenderTreeDiff>,
    pub disposed_component_ids: Vec<ComponentId>,
}

impl RenderBatch {
    pub fn is_empty(&self) -> bool {
        self.updated_components.is_empty() && self.disposed_component_ids.is_empty()
    }
}

struct ComponentState {
    parent: Option<ComponentId>,
    instance: Box<dyn Component>,
    instance_type: TypeId,
    instance_type_name: &'static str,
    current_frames: Arc<[RenderTreeFrame]>,
    initialized: bool,
}

impl ComponentState {
    fn resolved(&self, id: ComponentId) -> ResolvedComponent {
        ResolvedComponent {
            id,
            instance_type: self.instance_type,
            instance_type_name: self.instance_type_name,
        }
    }
}

#[derive(Clone)]
struct EventHandlerEntry {
    receiver: ComponentId,
    callback: EventCallback,
}

#[derive(Default)]
struct RendererState {
    components: HashMap<ComponentId, ComponentState>,
    event_handlers: HashMap<EventHandlerId, EventHandlerEntry>,
    render_queue: VecDeque<ComponentId>,
    pending_batch: RenderBatch,
    next_component_id: u32,
    next_event_handler_id: u64,
}

impl RendererState {
    fn attach(&mut self, instance: Box<dyn Component>, parent: Option<ComponentId>) -> ComponentId {
        let id = ComponentId(self.next_component_id);
        self.next_component_id += 1;
        let instance_type = {
            let any: &dyn Any = &*instance;
            any.type_id()
        };
        let instance_type_name = instance.type_name();
        self.components.insert(
            id,
            ComponentState {
                parent,
                instance,
                instance_type,
                instance_type_name,
                current_frames: Arc::from(Vec::new()),
                initialized: false,
            },
        );
        id
    }

    fn enqueue(&mut self, component_id: ComponentId) {
        if !self.render_queue.contains(&component_id) {
            self.render_queue.push_back(component_id);
        }
    }

    fn next_event_handler_id(&mut self) -> EventHandlerId {
        self.next_event_handler_id += 1;
        EventHandlerId(self.next_event_handler_id)
    }

    /// Gives every handler attribute in `frames` an id. A handler keeps the
    /// id of the handler with the same name at the same frame index in the
    /// previous render.
    fn assign_event_handlers(
        &mut self,
        owner: ComponentId,
        old_frames: &[RenderTreeFrame],
        frames: &mut [RenderTreeFrame],
    ) {
        let mut retained = HashSet::new();
        for (index, frame) in frames.iter_mut().enumerate() {
            let RenderTreeFrame::Attribute {
                name,
                value: AttributeValue::EventHandler(binding),
            } = frame
            else {
                continue;
            };
            let reused = match old_frames.get(index) {
                Some(RenderTreeFrame::Attribute {
                    name: old_name,
                    value: AttributeValue::EventHandler(old),
                }) if *old_name == *name => old.id,
                _ => None,
            };
            let id = reused.unwrap_or_else(|| self.next_event_handler_id());
            binding.id = Some(id);
            retained.insert(id);
            self.event_handlers.insert(
                id,
                EventHandlerEntry {
                    receiver: owner,
                    callback: binding.callback.clone(),
                },
            );
        }

        for frame in old_frames {
            if let RenderTreeFrame::Attribute {
                value: AttributeValue::EventHandler(old),
                ..
            } = frame
            {
                if let Some(id) = old.id {
                    if !retained.contains(&id) {
                        self.event_handlers.remove(&id);
                    }
                }
            }
        }
    }
}

/// Owns the component tree and turns render requests into render batches.
///
/// All mutating operations are expected to run on one thread at a time; the
/// internal lock only guards the pending-render state and is never held
/// while the host is called.
pub struct BaseRenderer {
    state: Mutex<RendererState>,
    activator: Arc<dyn ComponentActivator>,
    host: Weak<dyn RenderHost>,
    spawner: tokio::runtime::Handle,
    renderer_info: RwLock<Option<RendererInfo>>,
}

impl BaseRenderer {
    pub fn new(
        host: Weak<dyn RenderHost>,
        activator: Arc<dyn ComponentActivator>,
        spawner: tokio::runtime::Handle,
    ) -> Self {
        Self {
            state: Mutex::new(RendererState::default()),
            activator,
            host,
            spawner,
            renderer_info: RwLock::new(None),
        }
    }

    fn host(&self) -> Result<Arc<dyn RenderHost>> {
        self.host.upgrade().ok_or(Error::DispatcherStopped)
    }

    pub fn set_renderer_info(&self, info: Option<RendererInfo>) {
        *self.renderer_info.write() = info;
    }

    pub fn renderer_info(&self) -> Option<RendererInfo> {
        self.renderer_info.read().clone()
    }

    pub fn component_count(&self) -> usize {
        self.state.lock().components.len()
    }

    pub fn assign_root_component_id(&self, component: Box<dyn Component>) -> ComponentId {
        let component_id = self.state.lock().attach(component, None);
        tracing::trace!(component_id = %component_id, "renderer.assign_root");
        component_id
    }

    pub fn render_root_component(
        &self,
        component_id: ComponentId,
        parameters: ParameterView,
    ) -> Result<()> {
        self.update_parameters(component_id, parameters)
    }

    /// Pushes a new parameter set to an attached component and renders it.
    pub fn set_component_parameters(
        &self,
        component_id: ComponentId,
        parameters: ParameterView,
    ) -> Result<()> {
        self.update_parameters(component_id, parameters)
    }

    fn update_parameters(&self, component_id: ComponentId, parameters: ParameterView) -> Result<()> {
        let errors = {
            let mut state = self.state.lock();
            if !state.components.contains_key(&component_id) {
                return Err(Error::UnknownComponent(component_id));
            }
            let mut errors = Vec::new();
            self.apply_parameters(&mut state, component_id, &parameters, &mut errors);
            errors
        };
        let host = self.host()?;
        for error in errors {
            host.handle_exception(error);
        }
        host.process_pending_render();
        Ok(())
    }

    /// Disposes a root component and its subtree, parent before children.
    /// Removing an id that is no longer attached is a no-op.
    pub fn remove_root_component(&self, component_id: ComponentId) -> Result<()> {
        let errors = {
            let mut state = self.state.lock();
            match state.components.get(&component_id) {
                None => return Ok(()),
                Some(component) if component.parent.is_some() => {
                    return Err(Error::InvalidRenderTree(format!(
                        "component {component_id} is not a root component"
                    )));
                }
                Some(_) => {}
            }
            let mut errors = Vec::new();
            self.dispose_component(&mut state, component_id, &mut errors);
            errors
        };
        let host = self.host()?;
        for error in errors {
            host.handle_exception(error);
        }
        host.process_pending_render();
        Ok(())
    }

    pub fn current_render_tree_frames(&self, component_id: ComponentId) -> Option<Arc<[RenderTreeFrame]>> {
        self.state
            .lock()
            .components
            .get(&component_id)
            .map(|component| Arc::clone(&component.current_frames))
    }

    /// The component whose frames declared `handler_id`.
    pub fn event_handler_owner(&self, handler_id: EventHandlerId) -> Option<ComponentId> {
        self.state
            .lock()
            .event_handlers
            .get(&handler_id)
            .map(|entry| entry.receiver)
    }

    /// Runs `read` against a live component instance. `read` must not call
    /// back into the renderer.
    pub fn with_component<C: Component, R>(
        &self,
        component_id: ComponentId,
        read: impl FnOnce(&C) -> R,
    ) -> Result<R> {
        let state = self.state.lock();
        let component = state
            .components
            .get(&component_id)
            .ok_or(Error::UnknownComponent(component_id))?;
        let any: &dyn Any = &*component.instance;
        let instance = any
            .downcast_ref::<C>()
            .ok_or(Error::ComponentTypeMismatch {
                component_id,
                expected: std::any::type_name::<C>(),
                actual: component.instance_type_name,
            })?;
        Ok(read(instance))
    }

    pub fn dispatch_event(
        &self,
        handler_id: EventHandlerId,
        field_info: Option<EventFieldInfo>,
        args: &dyn EventArgs,
    ) -> Result<()> {
        let outcome = {
            let mut state = self.state.lock();
            let entry = state
                .event_handlers
                .get(&handler_id)
                .cloned()
                .ok_or(Error::EventHandlerNotFound(handler_id))?;
            if let Some(field) = field_info {
                if let Some(component) = state.components.get_mut(&field.component_id) {
                    if let Some(updated) =
                        with_bound_value(&component.current_frames, handler_id, &field.field_value)
                    {
                        component.current_frames = updated.into();
                    }
                }
            }
            let component = state
                .components
                .get_mut(&entry.receiver)
                .ok_or(Error::UnknownComponent(entry.receiver))?;
            let args: &dyn Any = args;
            let outcome = entry.callback.invoke(component.instance.as_mut(), args);
            if outcome.is_ok() {
                state.enqueue(entry.receiver);
            }
            outcome
        };
        tracing::trace!(handler_id = %handler_id, ok = outcome.is_ok(), "renderer.dispatch_event");
        let host = self.host()?;
        if let Err(error) = outcome {
            host.handle_exception(error);
        }
        host.process_pending_render();
        Ok(())
    }

    /// Applies the result of asynchronous component work and renders the
    /// component again.
    pub(crate) fn resume_component(&self, component_id: ComponentId, continuation: Continuation) {
        let outcome = {
            let mut state = self.state.lock();
            let Some(component) = state.components.get_mut(&component_id) else {
                tracing::trace!(component_id = %component_id, "renderer.resume_disposed");
                return;
            };
            let outcome = continuation(component.instance.as_mut());
            if outcome.is_ok() {
                state.enqueue(component_id);
            }
            outcome
        };
        let Ok(host) = self.host() else {
            return;
        };
        if let Err(error) = outcome {
            host.handle_exception(error);
        }
        host.process_pending_render();
    }

    /// Renders everything queued and hands each completed batch to the host
    /// until no further work is queued.
    pub fn process_render_queue(&self) {
        let Ok(host) = self.host() else {
            return;
        };
        loop {
            let (batch, errors) = {
                let mut state = self.state.lock();
                let mut errors = Vec::new();
                while let Some(component_id) = state.render_queue.pop_front() {
                    self.render_component(&mut state, component_id, &mut errors);
                }
                (std::mem::take(&mut state.pending_batch), errors)
            };
            for error in errors {
                host.handle_exception(error);
            }
            if batch.is_empty() {
                break;
            }
            tracing::trace!(
                updated = batch.updated_components.len(),
                disposed = batch.disposed_component_ids.len(),
                "renderer.batch"
            );
            host.update_display(&batch);
        }
    }

    fn apply_parameters(
        &self,
        state: &mut RendererState,
        component_id: ComponentId,
        parameters: &ParameterView,
        errors: &mut Vec<anyhow::Error>,
    ) {
        let renderer_info = self.renderer_info();
        let Some(component) = state.components.get_mut(&component_id) else {
            return;
        };
        if let Err(error) = component.instance.set_parameters(parameters) {
            errors.push(error);
            return;
        }
        if !component.initialized {
            component.initialized = true;
            let mut context = ComponentContext {
                component_id,
                spawner: &self.spawner,
                host: &self.host,
                renderer_info,
            };
            if let Err(error) = component.instance.on_initialized(&mut context) {
                errors.push(error);
                return;
            }
        }
        state.enqueue(component_id);
    }

    fn render_component(
        &self,
        state: &mut RendererState,
        component_id: ComponentId,
        errors: &mut Vec<anyhow::Error>,
    ) {
        let Some(component) = state.components.get(&component_id) else {
            return;
        };
        let mut builder = RenderTreeBuilder::new();
        component.instance.build_render_tree(&mut builder);
        let old_frames = Arc::clone(&component.current_frames);
        let mut frames = match builder.finish() {
            Ok(frames) => frames,
            Err(message) => {
                errors.push(anyhow::Error::new(Error::InvalidRenderTree(format!(
                    "{}: {message}",
                    component.instance_type_name
                ))));
                return;
            }
        };

        state.assign_event_handlers(component_id, &old_frames, &mut frames);
        self.reconcile_children(state, component_id, &old_frames, &mut frames, errors);

        let has_edits = old_frames[..] != frames[..];
        if let Some(component) = state.components.get_mut(&component_id) {
            component.current_frames = frames.into();
        }
        state
            .pending_batch
            .updated_components
            .push(RenderTreeDiff {
                component_id,
                has_edits,
            });
    }

    /// Binds the component frames of a new render to child instances. The
    /// n-th frame of a given type reuses the n-th child of that type from the
    /// previous render; children left over are disposed.
    fn reconcile_children(
        &self,
        state: &mut RendererState,
        parent: ComponentId,
        old_frames: &[RenderTreeFrame],
        frames: &mut [RenderTreeFrame],
        errors: &mut Vec<anyhow::Error>,
    ) {
        let mut previous: HashMap<TypeId, VecDeque<ComponentId>> = HashMap::new();
        for frame in old_frames {
            if let RenderTreeFrame::Component {
                component_type,
                resolved: Some(resolved),
                ..
            } = frame
            {
                previous
                    .entry(component_type.type_id())
                    .or_default()
                    .push_back(resolved.id);
            }
        }

        for index in 0..frames.len() {
            let RenderTreeFrame::Component { component_type, .. } = &frames[index] else {
                continue;
            };
            let component_type = *component_type;
            let parameters = component_parameters(frames, index);
            let reused = previous
                .get_mut(&component_type.type_id())
                .and_then(VecDeque::pop_front);
            let resolved = match reused {
                Some(child_id) => {
                    self.apply_parameters(state, child_id, &parameters, errors);
                    state
                        .components
                        .get(&child_id)
                        .map(|child| child.resolved(child_id))
                }
                None => self.instantiate_child(state, parent, &component_type, &parameters, errors),
            };
            if let RenderTreeFrame::Component { resolved: slot, .. } = &mut frames[index] {
                *slot = resolved;
            }
        }

        let leftover = previous.into_values().flatten().collect::<HashSet<_>>();
        for child_id in child_component_ids(old_frames) {
            if leftover.contains(&child_id) {
                self.dispose_component(state, child_id, errors);
            }
        }
    }

    fn instantiate_child(
        &self,
        state: &mut RendererState,
        parent: ComponentId,
        component_type: &ComponentType,
        parameters: &ParameterView,
        errors: &mut Vec<anyhow::Error>,
    ) -> Option<ResolvedComponent> {
        let instance = match self.activator.create_instance(component_type) {
            Ok(instance) => instance,
            Err(error) => {
                errors.push(error);
                return None;
            }
        };
        let component_id = state.attach(instance, Some(parent));
        let resolved = state
            .components
            .get(&component_id)
            .map(|child| child.resolved(component_id));
        tracing::trace!(
            component_id = %component_id,
            parent = %parent,
            requested = component_type.name(),
            "renderer.attach_child"
        );
        self.apply_parameters(state, component_id, parameters, errors);
        resolved
    }

    fn dispose_component(
        &self,
        state: &mut RendererState,
        component_id: ComponentId,
        errors: &mut Vec<anyhow::Error>,
    ) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            let Some(mut component) = state.components.remove(&component_id) else {
                return;
            };
            tracing::trace!(
                component_id = %component_id,
                component = component.instance_type_name,
                "renderer.dispose_component"
            );
            if let Err(error) = component.instance.dispose() {
                errors.push(error);
            }
            state.render_queue.retain(|queued| *queued != component_id);
            state
                .event_handlers
                .retain(|_, entry| entry.receiver != component_id);
            state
                .pending_batch
                .disposed_component_ids
                .push(component_id);
            for child_id in child_component_ids(&component.current_frames) {
                self.dispose_component(state, child_id, errors);
            }
        });
    }
}

fn component_parameters(frames: &[RenderTreeFrame], component_index: usize) -> ParameterView {
    let entries = attribute_range(frames, component_index)
        .filter_map(|index| match &frames[index] {
            RenderTreeFrame::Attribute { name, value } => Some((name.clone(), value.clone())),
            _ => None,
        })
        .collect();
    ParameterView::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{ChangeEventArgs, DefaultComponentActivator, MouseEventArgs};

    #[derive(Default)]
    struct Label {
        text: String,
    }

    impl Component for Label {
        fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
            self.text = parameters.text("Text").unwrap_or_default().to_string();
            Ok(())
        }

        fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
            builder.open_element("span");
            builder.add_content(self.text.clone());
            builder.close_element();
        }
    }

    #[derive(Default)]
    struct Panel {
        labels: Vec<String>,
        clicks: usize,
    }

    impl Component for Panel {
        fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
            if let Some(labels) = parameters.get::<Vec<String>>("Labels") {
                self.labels = labels;
            }
            Ok(())
        }

        fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
            builder.open_element("div");
            builder.add_event_handler("onclick", |panel: &mut Panel, _: &MouseEventArgs| {
                panel.clicks += 1;
                Ok(())
            });
            for label in &self.labels {
                builder.open_component::<Label>();
                builder.add_attribute("Text", label.clone());
                builder.close_component();
            }
            builder.close_element();
        }
    }

    struct RecordingHost {
        base: BaseRenderer,
        batches: Mutex<Vec<RenderBatch>>,
        errors: Mutex<Vec<String>>,
    }

    impl RenderHost for RecordingHost {
        fn renderer(&self) -> &BaseRenderer {
            &self.base
        }

        fn update_display(&self, batch: &RenderBatch) {
            self.batches.lock().push(batch.clone());
        }

        fn handle_exception(&self, error: anyhow::Error) {
            self.errors.lock().push(error.to_string());
        }
    }

    fn host(runtime: &tokio::runtime::Runtime) -> Arc<RecordingHost> {
        Arc::new_cyclic(|weak: &Weak<RecordingHost>| {
            let host: Weak<dyn RenderHost> = weak.clone();
            RecordingHost {
                base: BaseRenderer::new(
                    host,
                    Arc::new(DefaultComponentActivator),
                    runtime.handle().clone(),
                ),
                batches: Mutex::new(Vec::new()),
                errors: Mutex::new(Vec::new()),
            }
        })
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
    }

    fn labels(values: &[&str]) -> ParameterView {
        let labels = values.iter().map(|value| value.to_string()).collect::<Vec<_>>();
        ParameterView::from_entries(vec![("Labels".to_string(), AttributeValue::object(labels))])
    }

    #[test]
    fn root_render_produces_one_batch_with_children() -> Result<()> {
        let runtime = runtime();
        let host = host(&runtime);
        let root = host.base.assign_root_component_id(Box::new(Panel::default()));
        host.base.render_root_component(root, labels(&["a", "b"]))?;

        let batches = host.batches.lock();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].updated_components.len(), 3);
        assert!(batches[0].updated_components.iter().all(|diff| diff.has_edits));
        assert_eq!(host.base.component_count(), 3);
        Ok(())
    }

    #[test]
    fn rerender_reuses_children_by_type_position_and_disposes_leftovers() -> Result<()> {
        let runtime = runtime();
        let host = host(&runtime);
        let root = host.base.assign_root_component_id(Box::new(Panel::default()));
        host.base.render_root_component(root, labels(&["a", "b"]))?;
        let first_children = host
            .base
            .current_render_tree_frames(root)
            .map(|frames| child_component_ids(&frames).collect::<Vec<_>>())
            .unwrap_or_default();

        host.base.set_component_parameters(root, labels(&["a"]))?;
        let second_children = host
            .base
            .current_render_tree_frames(root)
            .map(|frames| child_component_ids(&frames).collect::<Vec<_>>())
            .unwrap_or_default();

        assert_eq!(second_children, vec![first_children[0]]);
        let batches = host.batches.lock();
        let last = batches.last().expect("second batch");
        assert_eq!(last.disposed_component_ids, vec![first_children[1]]);
        let unchanged_label = last
            .updated_components
            .iter()
            .find(|diff| diff.component_id == first_children[0])
            .expect("label rendered again");
        assert!(!unchanged_label.has_edits);
        Ok(())
    }

    #[test]
    fn handler_ids_survive_rerenders_and_drive_renders() -> Result<()> {
        let runtime = runtime();
        let host = host(&runtime);
        let root = host.base.assign_root_component_id(Box::new(Panel::default()));
        host.base.render_root_component(root, labels(&[]))?;

        let handler_id = |host: &RecordingHost| {
            host.base.current_render_tree_frames(root).and_then(|frames| {
                frames.iter().find_map(|frame| match frame {
                    RenderTreeFrame::Attribute {
                        value: AttributeValue::EventHandler(binding),
                        ..
                    } => binding.id(),
                    _ => None,
                })
            })
        };
        let before = handler_id(&host).expect("handler id assigned");
        host.base
            .dispatch_event(before, None, &MouseEventArgs::default())?;
        assert_eq!(handler_id(&host), Some(before));
        assert_eq!(host.base.with_component(root, |panel: &Panel| panel.clicks)?, 1);
        Ok(())
    }

    #[test]
    fn unknown_handler_and_wrong_args_are_reported() -> Result<()> {
        let runtime = runtime();
        let host = host(&runtime);
        let root = host.base.assign_root_component_id(Box::new(Panel::default()));
        host.base.render_root_component(root, labels(&[]))?;

        let missing = host
            .base
            .dispatch_event(EventHandlerId::new(999), None, &MouseEventArgs::default());
        assert!(matches!(missing, Err(Error::EventHandlerNotFound(id)) if id.get() == 999));

        let handler = host
            .base
            .current_render_tree_frames(root)
            .and_then(|frames| {
                frames.iter().find_map(|frame| match frame {
                    RenderTreeFrame::Attribute {
                        value: AttributeValue::EventHandler(binding),
                        ..
                    } => binding.id(),
                    _ => None,
                })
            })
            .expect("handler id");
        host.base
            .dispatch_event(handler, None, &ChangeEventArgs::new("x"))?;
        let errors = host.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("MouseEventArgs"), "unexpected: {}", errors[0]);
        Ok(())
    }

    #[test]
    fn removing_a_child_as_root_is_rejected() -> Result<()> {
        let runtime = runtime();
        let host = host(&runtime);
        let root = host.base.assign_root_component_id(Box::new(Panel::default()));
        host.base.render_root_component(root, labels(&["a"]))?;
        let child = host
            .base
            .current_render_tree_frames(root)
            .and_then(|frames| child_component_ids(&frames).next())
            .expect("child");

        assert!(matches!(
            host.base.remove_root_component(child),
            Err(Error::InvalidRenderTree(_))
        ));
        host.base.remove_root_component(root)?;
        host.base.remove_root_component(root)?;
        assert_eq!(host.base.component_count(), 0);
        Ok(())
    }
}
