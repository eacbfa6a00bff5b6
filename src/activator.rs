//! Component factories that let a test swap components for doubles.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::context::FragmentContainer;
use crate::framework::{Component, ComponentActivator, ComponentType, DefaultComponentActivator};
use crate::renderer::RootComponent;

/// Creates instances for the component types it accepts.
pub trait ComponentFactory: Send + Sync {
    fn can_create(&self, component_type: &ComponentType) -> bool;

    fn create(&self, component_type: &ComponentType) -> anyhow::Result<Box<dyn Component>>;
}

/// Renders `Replacement` wherever `Requested` is asked for.
struct ReplacementFactory<Requested, Replacement> {
    _types: PhantomData<fn() -> (Requested, Replacement)>,
}

impl<Requested, Replacement> ComponentFactory for ReplacementFactory<Requested, Replacement>
where
    Requested: Component,
    Replacement: Component + Default,
{
    fn can_create(&self, component_type: &ComponentType) -> bool {
        component_type.is::<Requested>()
    }

    fn create(&self, _component_type: &ComponentType) -> anyhow::Result<Box<dyn Component>> {
        Ok(Box::new(Replacement::default()))
    }
}

struct FnFactory<T, F> {
    create: F,
    _component: PhantomData<fn() -> T>,
}

impl<T, F> ComponentFactory for FnFactory<T, F>
where
    T: Component,
    F: Fn() -> T + Send + Sync,
{
    fn can_create(&self, component_type: &ComponentType) -> bool {
        component_type.is::<T>()
    }

    fn create(&self, _component_type: &ComponentType) -> anyhow::Result<Box<dyn Component>> {
        Ok(Box::new((self.create)()))
    }
}

/// Ordered factory registrations, shared by every clone. The most recently
/// added factory that accepts a type wins.
#[derive(Clone, Default)]
pub struct ComponentFactoryCollection {
    factories: Arc<RwLock<Vec<Arc<dyn ComponentFactory>>>>,
}

impl ComponentFactoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, factory: impl ComponentFactory + 'static) -> &Self {
        self.factories.write().push(Arc::new(factory));
        self
    }

    /// Replaces every `Requested` component with a default `Replacement`.
    pub fn add_replacement<Requested, Replacement>(&self) -> &Self
    where
        Requested: Component,
        Replacement: Component + Default,
    {
        self.add(ReplacementFactory::<Requested, Replacement> {
            _types: PhantomData,
        })
    }

    /// Builds every `T` through `create` instead of `T::default()`.
    pub fn add_fn<T: Component>(&self, create: impl Fn() -> T + Send + Sync + 'static) -> &Self {
        self.add(FnFactory {
            create,
            _component: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }

    fn find(&self, component_type: &ComponentType) -> Option<Arc<dyn ComponentFactory>> {
        self.factories
            .read()
            .iter()
            .rev()
            .find(|factory| factory.can_create(component_type))
            .cloned()
    }
}

impl fmt::Debug for ComponentFactoryCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactoryCollection")
            .field("factories", &self.len())
            .finish()
    }
}

/// The activator the test renderer uses: registered factories first, then
/// `Default`. The harness' own root and container components are never
/// handed to a factory.
#[derive(Debug, Clone)]
pub struct TestComponentActivator {
    factories: ComponentFactoryCollection,
    exempt: [TypeId; 2],
}

impl TestComponentActivator {
    pub fn new(factories: ComponentFactoryCollection) -> Self {
        Self {
            factories,
            exempt: [TypeId::of::<RootComponent>(), TypeId::of::<FragmentContainer>()],
        }
    }
}

impl ComponentActivator for TestComponentActivator {
    fn create_instance(&self, component_type: &ComponentType) -> anyhow::Result<Box<dyn Component>> {
        if !self.exempt.contains(&component_type.type_id()) {
            if let Some(factory) = self.factories.find(component_type) {
                let instance = factory.create(component_type)?;
                tracing::trace!(
                    requested = component_type.name(),
                    created = instance.type_name(),
                    "activator.factory"
                );
                return Ok(instance);
            }
        }
        DefaultComponentActivator.create_instance(component_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::RenderTreeBuilder;

    #[derive(Default)]
    struct Foo;

    impl Component for Foo {
        fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
            builder.add_content("foo");
        }
    }

    #[derive(Default)]
    struct Bar;

    impl Component for Bar {
        fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
            builder.add_content("bar");
        }
    }

    #[derive(Default)]
    struct Baz(u32);

    impl Component for Baz {
        fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
            builder.add_content(self.0.to_string());
        }
    }

    fn created_type(activator: &TestComponentActivator, component_type: ComponentType) -> &'static str {
        activator
            .create_instance(&component_type)
            .map(|instance| instance.type_name())
            .unwrap_or("error")
    }

    #[test]
    fn falls_back_to_default_construction() {
        let activator = TestComponentActivator::new(ComponentFactoryCollection::new());
        assert_eq!(
            created_type(&activator, ComponentType::of::<Foo>()),
            std::any::type_name::<Foo>()
        );
    }

    #[test]
    fn most_recent_factory_wins() {
        let factories = ComponentFactoryCollection::new();
        factories
            .add_replacement::<Foo, Bar>()
            .add_replacement::<Foo, Baz>();
        let activator = TestComponentActivator::new(factories.clone());
        assert_eq!(factories.len(), 2);
        assert_eq!(
            created_type(&activator, ComponentType::of::<Foo>()),
            std::any::type_name::<Baz>()
        );
        assert_eq!(
            created_type(&activator, ComponentType::of::<Bar>()),
            std::any::type_name::<Bar>()
        );
    }

    #[test]
    fn container_components_are_never_replaced() {
        let factories = ComponentFactoryCollection::new();
        factories.add_replacement::<FragmentContainer, Bar>();
        let activator = TestComponentActivator::new(factories);
        assert_eq!(
            created_type(&activator, ComponentType::of::<FragmentContainer>()),
            std::any::type_name::<FragmentContainer>()
        );
    }

    #[test]
    fn closure_factories_configure_instances() -> anyhow::Result<()> {
        let factories = ComponentFactoryCollection::new();
        factories.add_fn(|| Baz(7));
        let activator = TestComponentActivator::new(factories);
        let instance = activator.create_instance(&ComponentType::of::<Baz>())?;
        let instance: &dyn std::any::Any = &*instance;
        assert_eq!(instance.downcast_ref::<Baz>().map(|baz| baz.0), Some(7));
        Ok(())
    }
}
