use super::component::{Component, ComponentType};

/// Creates component instances for component frames.
pub trait ComponentActivator: Send + Sync {
    fn create_instance(&self, component_type: &ComponentType) -> anyhow::Result<Box<dyn Component>>;
}

/// Instantiates the requested type through its `Default` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComponentActivator;

impl ComponentActivator for DefaultComponentActivator {
    fn create_instance(&self, component_type: &ComponentType) -> anyhow::Result<Box<dyn Component>> {
        Ok(component_type.construct())
    }
}
