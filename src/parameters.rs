use crate::framework::{
    AttributeValue, CHILD_CONTENT, Component, ComponentType, ParameterView, RenderFragment,
};

/// Parameters for a component rendered by a test.
///
/// ```
/// use component_tester::ComponentParameterCollection;
/// use component_tester::framework::RenderFragment;
///
/// let parameters = ComponentParameterCollection::new()
///     .add("Title", "Hello")
///     .add("Count", 3)
///     .add_child_content(RenderFragment::markup("<p>body</p>"));
/// assert_eq!(parameters.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ComponentParameterCollection {
    parameters: Vec<(String, AttributeValue)>,
}

impl ComponentParameterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter. A later parameter with the same name wins.
    pub fn add(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn add_child_content(self, content: RenderFragment) -> Self {
        self.add(CHILD_CONTENT, content)
    }

    pub fn add_child_markup(self, markup: impl Into<String>) -> Self {
        self.add_child_content(RenderFragment::markup(markup))
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.parameters
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn to_parameter_view(&self) -> ParameterView {
        ParameterView::from_entries(self.parameters.clone())
    }

    /// A fragment that renders `T` with these parameters.
    pub fn to_fragment<T: Component + Default>(&self) -> RenderFragment {
        self.to_fragment_of(ComponentType::of::<T>())
    }

    pub fn to_fragment_of(&self, component_type: ComponentType) -> RenderFragment {
        let parameters = self.parameters.clone();
        RenderFragment::new(move |builder| {
            builder.open_component_type(component_type);
            for (name, value) in &parameters {
                builder.add_attribute(name, value.clone());
            }
            builder.close_component();
        })
    }
}

impl<N, V> FromIterator<(N, V)> for ComponentParameterCollection
where
    N: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |parameters, (name, value)| parameters.add(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{RenderTreeBuilder, RenderTreeFrame};

    #[derive(Default)]
    struct Greeting;

    impl Component for Greeting {
        fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
            builder.add_content("hi");
        }
    }

    #[test]
    fn later_parameters_win_in_the_view() {
        let view = ComponentParameterCollection::new()
            .add("Name", "first")
            .add("name", "second")
            .to_parameter_view();
        assert_eq!(view.text("NAME"), Some("second"));
    }

    #[test]
    fn fragment_opens_the_component_with_its_parameters() {
        let fragment = [("Title", "x")]
            .into_iter()
            .collect::<ComponentParameterCollection>()
            .to_fragment::<Greeting>();
        let mut builder = RenderTreeBuilder::new();
        fragment.render(&mut builder);
        let frames = builder.finish().expect("balanced frames");
        assert_eq!(frames.len(), 2);
        assert!(matches!(
            &frames[0],
            RenderTreeFrame::Component { component_type, subtree_length: 2, .. }
                if component_type.is::<Greeting>()
        ));
        assert!(matches!(
            &frames[1],
            RenderTreeFrame::Attribute { name, .. } if name == "Title"
        ));
    }
}
