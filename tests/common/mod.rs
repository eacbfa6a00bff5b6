#![allow(dead_code)]

use std::sync::Arc;

use component_tester::framework::{
    AttributeValue, Component, ComponentContext, MouseEventArgs, ParameterView, RenderFragment,
    RenderTreeBuilder,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct Counter {
    pub count: i32,
}

impl Component for Counter {
    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("p");
        builder.add_content(format!("Current count: {}", self.count));
        builder.close_element();
        builder.open_element("button");
        builder.add_event_handler("onclick", |counter: &mut Counter, _: &MouseEventArgs| {
            counter.count += 1;
            Ok(())
        });
        builder.add_content("Click me");
        builder.close_element();
    }
}

#[derive(Default)]
pub struct HelloWorld;

impl Component for HelloWorld {
    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("h1");
        builder.add_content("Hello world from Blazor");
        builder.close_element();
    }
}

/// Renders its child content inside a `div.wrapper`.
#[derive(Default)]
pub struct Wrapper {
    content: Option<RenderFragment>,
}

impl Component for Wrapper {
    fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
        self.content = parameters.child_content();
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("div");
        builder.add_attribute("class", "wrapper");
        if let Some(content) = &self.content {
            builder.add_fragment(content);
        }
        builder.close_element();
    }
}

#[derive(Default)]
pub struct Label {
    pub text: String,
}

impl Component for Label {
    fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
        self.text = parameters.text("Text").unwrap_or_default().to_string();
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("span");
        builder.add_content(self.text.as_str());
        builder.close_element();
    }
}

/// Renders one [`Label`] per entry of the `Items` parameter, grouped in
/// nested sections to give the tree some depth.
#[derive(Default)]
pub struct LabelList {
    items: Vec<String>,
}

impl Component for LabelList {
    fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
        self.items = parameters.get::<Vec<String>>("Items").unwrap_or_default();
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("section");
        for (index, item) in self.items.iter().enumerate() {
            if index % 2 == 1 {
                builder.open_component::<Wrapper>();
                let item = item.clone();
                builder.add_attribute(
                    "ChildContent",
                    RenderFragment::new(move |builder| {
                        builder.open_component::<Label>();
                        builder.add_attribute("Text", item.as_str());
                        builder.close_component();
                    }),
                );
                builder.close_component();
            } else {
                builder.open_component::<Label>();
                builder.add_attribute("Text", item.as_str());
                builder.close_component();
            }
        }
        builder.close_element();
    }
}

pub fn child<T: Component + Default>() -> RenderFragment {
    RenderFragment::new(|builder| {
        builder.open_component::<T>();
        builder.close_component();
    })
}

/// A value a component receives later, through a channel the test holds
/// the sending half of.
#[derive(Clone)]
pub struct DataSource(Arc<Mutex<Option<oneshot::Receiver<String>>>>);

impl DataSource {
    pub fn new() -> (oneshot::Sender<String>, Self) {
        let (sender, receiver) = oneshot::channel();
        (sender, Self(Arc::new(Mutex::new(Some(receiver)))))
    }
}

#[derive(Default)]
pub struct AsyncData {
    source: Option<DataSource>,
    data: Option<String>,
}

impl Component for AsyncData {
    fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
        self.source = parameters.get::<DataSource>("Source");
        Ok(())
    }

    fn on_initialized(&mut self, context: &mut ComponentContext<'_>) -> anyhow::Result<()> {
        let Some(receiver) = self.source.as_ref().and_then(|source| source.0.lock().take()) else {
            return Ok(());
        };
        context.spawn(
            async move { receiver.await.ok() },
            |component: &mut AsyncData, data: Option<String>| {
                component.data = data;
                Ok(())
            },
        );
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("p");
        match &self.data {
            Some(data) => builder.add_content(data.as_str()),
            None => builder.add_content("Loading..."),
        }
        builder.close_element();
    }
}

#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn push(&self, entry: &'static str) {
        self.0.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.0.lock().clone()
    }
}

#[derive(Default)]
pub struct DisposableParent {
    log: CallLog,
}

impl Component for DisposableParent {
    fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
        self.log = parameters.get::<CallLog>("Log").unwrap_or_default();
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("div");
        builder.open_component::<DisposableChild>();
        builder.add_attribute("Log", AttributeValue::object(self.log.clone()));
        builder.close_component();
        builder.close_element();
    }

    fn dispose(&mut self) -> anyhow::Result<()> {
        self.log.push("parent");
        Ok(())
    }
}

#[derive(Default)]
pub struct DisposableChild {
    log: CallLog,
}

impl Component for DisposableChild {
    fn set_parameters(&mut self, parameters: &ParameterView) -> anyhow::Result<()> {
        self.log = parameters.get::<CallLog>("Log").unwrap_or_default();
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.add_content("child");
    }

    fn dispose(&mut self) -> anyhow::Result<()> {
        self.log.push("child");
        Ok(())
    }
}

#[derive(Default)]
pub struct Foo;

impl Component for Foo {
    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.add_content("foo");
    }
}

#[derive(Default)]
pub struct Bar;

impl Component for Bar {
    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.add_content("bar");
    }
}

#[derive(Debug)]
pub struct Boom(pub &'static str);

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom: {}", self.0)
    }
}

impl std::error::Error for Boom {}

/// Fails its click handler with a [`Boom`].
#[derive(Default)]
pub struct Exploding;

impl Component for Exploding {
    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("button");
        builder.add_event_handler("onclick", |_: &mut Exploding, _: &MouseEventArgs| {
            Err(Boom("click").into())
        });
        builder.add_content("explode");
        builder.close_element();
    }
}

/// Fails while receiving its parameters.
#[derive(Default)]
pub struct FaultyParameters;

impl Component for FaultyParameters {
    fn set_parameters(&mut self, _parameters: &ParameterView) -> anyhow::Result<()> {
        Err(Boom("parameters").into())
    }

    fn build_render_tree(&self, _builder: &mut RenderTreeBuilder) {}
}

/// Shows the name of the render mode it runs in.
#[derive(Default)]
pub struct RenderModeBadge {
    mode: String,
}

impl Component for RenderModeBadge {
    fn on_initialized(&mut self, context: &mut ComponentContext<'_>) -> anyhow::Result<()> {
        self.mode = context.renderer_info()?.name;
        Ok(())
    }

    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("em");
        builder.add_content(self.mode.as_str());
        builder.close_element();
    }
}

/// An input that mirrors what was typed into it.
#[derive(Default)]
pub struct Echo {
    pub value: String,
}

impl Component for Echo {
    fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
        builder.open_element("input");
        builder.add_attribute("value", self.value.as_str());
        builder.add_event_handler(
            "oninput",
            |echo: &mut Echo, args: &component_tester::framework::ChangeEventArgs| {
                echo.value = args.value.clone();
                Ok(())
            },
        );
        builder.close_element();
        builder.open_element("output");
        builder.add_content(self.value.as_str());
        builder.close_element();
    }
}
