use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::framework::{BaseRenderer, ComponentId, RenderTreeFrame};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Component frames loaded on demand from the base renderer.
///
/// A dictionary borrows the renderer for as long as it lives and is only
/// meaningful for the render cycle (or the single search) that created it.
pub struct RenderTreeFrameDictionary<'r> {
    renderer: &'r BaseRenderer,
    frames: RwLock<HashMap<ComponentId, Arc<[RenderTreeFrame]>>>,
}

impl<'r> RenderTreeFrameDictionary<'r> {
    pub(crate) fn new(renderer: &'r BaseRenderer) -> Self {
        Self {
            renderer,
            frames: RwLock::new(HashMap::new()),
        }
    }

    /// Frames of `component_id`, loaded from the renderer the first time they
    /// are asked for. `None` when the component is no longer attached.
    pub fn get(&self, component_id: ComponentId) -> Option<Arc<[RenderTreeFrame]>> {
        if let Some(frames) = self.frames.read().get(&component_id) {
            return Some(Arc::clone(frames));
        }
        let frames = self.renderer.current_render_tree_frames(component_id)?;
        tracing::trace!(component_id = %component_id, frames = frames.len(), "frames.load");
        Some(Arc::clone(
            self.frames
                .write()
                .entry(component_id)
                .or_insert(frames),
        ))
    }

    /// Components below `parent` whose instance type is `instance_type`, in
    /// depth-first pre-order, stopping after `limit` matches.
    pub(crate) fn find_components(
        &self,
        parent: ComponentId,
        instance_type: TypeId,
        limit: usize,
    ) -> Vec<ComponentId> {
        let mut found = Vec::new();
        if limit > 0 {
            self.collect(parent, instance_type, limit, &mut found);
        }
        found
    }

    fn collect(
        &self,
        component_id: ComponentId,
        instance_type: TypeId,
        limit: usize,
        found: &mut Vec<ComponentId>,
    ) {
        let Some(frames) = self.get(component_id) else {
            return;
        };
        for frame in frames.iter() {
            let RenderTreeFrame::Component {
                resolved: Some(child),
                ..
            } = frame
            else {
                continue;
            };
            if child.instance_type == instance_type {
                found.push(child.id);
                if found.len() >= limit {
                    return;
                }
            }
            stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
                self.collect(child.id, instance_type, limit, found)
            });
            if found.len() >= limit {
                return;
            }
        }
    }
}

impl std::fmt::Debug for RenderTreeFrameDictionary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTreeFrameDictionary")
            .field("loaded", &self.frames.read().len())
            .finish()
    }
}
