use std::collections::HashMap;

use parking_lot::RwLock;

use crate::frame_dictionary::RenderTreeFrameDictionary;
use crate::framework::{BaseRenderer, ComponentId, RenderBatch, child_component_ids};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// What happened to one component during a render cycle. A component the
/// cycle never touched reports all flags as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStatus {
    pub rendered: bool,
    pub changed: bool,
    pub disposed: bool,
    pub(crate) updates_applied: bool,
    pub(crate) frames_loaded: bool,
}

/// One render cycle as seen by rendered fragments.
pub struct RenderEvent<'r> {
    frames: RenderTreeFrameDictionary<'r>,
    statuses: RwLock<HashMap<ComponentId, RenderStatus>>,
}

impl<'r> RenderEvent<'r> {
    pub(crate) fn new(renderer: &'r BaseRenderer, batch: &RenderBatch) -> Self {
        let mut statuses = HashMap::<ComponentId, RenderStatus>::new();
        for diff in &batch.updated_components {
            let status = statuses.entry(diff.component_id).or_default();
            status.rendered = true;
            status.changed |= diff.has_edits;
        }
        for component_id in &batch.disposed_component_ids {
            statuses.entry(*component_id).or_default().disposed = true;
        }
        Self {
            frames: RenderTreeFrameDictionary::new(renderer),
            statuses: RwLock::new(statuses),
        }
    }

    pub fn frames(&self) -> &RenderTreeFrameDictionary<'r> {
        &self.frames
    }

    pub fn render_status(&self, component_id: ComponentId) -> RenderStatus {
        self.statuses
            .read()
            .get(&component_id)
            .copied()
            .unwrap_or_default()
    }

    /// Loads the frames of `component_id` and all its descendants, folding
    /// descendant activity into its status: a rendered descendant makes it
    /// rendered, a changed or disposed descendant makes it changed.
    pub(crate) fn load_changes(&self, component_id: ComponentId) -> RenderStatus {
        let mut status = self.render_status(component_id);
        if status.frames_loaded || status.disposed {
            return status;
        }
        let Some(frames) = self.frames.get(component_id) else {
            return status;
        };
        for child_id in child_component_ids(&frames) {
            let child = self.render_status(child_id);
            let child = if child.disposed {
                tracing::trace!(
                    parent = %component_id,
                    child = %child_id,
                    "render_event.disposed_child"
                );
                child
            } else if child.frames_loaded {
                child
            } else {
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || self.load_changes(child_id))
            };
            status.rendered |= child.rendered;
            status.changed |= child.changed || child.disposed;
        }
        status.frames_loaded = true;
        self.statuses.write().insert(component_id, status);
        status
    }

    pub(crate) fn mark_updates_applied(&self, component_id: ComponentId) {
        self.statuses
            .write()
            .entry(component_id)
            .or_default()
            .updates_applied = true;
    }
}

impl std::fmt::Debug for RenderEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEvent")
            .field("statuses", &*self.statuses.read())
            .field("frames", &self.frames)
            .finish()
    }
}
