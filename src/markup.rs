//! Serializes component frames to HTML.
//!
//! Event handlers are written as `blazor:{event}="{handler id}"` attributes
//! so a test can find them in the markup and trigger them by id.

use std::sync::Arc;

use crate::dom::{escape_html_attr, escape_html_text, is_void_tag};
use crate::frame_dictionary::RenderTreeFrameDictionary;
use crate::framework::{AttributeValue, ComponentId, RenderTreeFrame, attribute_range};
use crate::{Error, Result};

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Prefix of the attribute carrying an event handler id.
pub const EVENT_HANDLER_ATTRIBUTE_PREFIX: &str = "blazor:";

/// Markup of `component_id` with every child component rendered in place.
pub fn render_markup(
    component_id: ComponentId,
    frames: &RenderTreeFrameDictionary<'_>,
) -> Result<String> {
    let mut out = String::new();
    write_component(&mut out, component_id, &|id| frames.get(id))?;
    Ok(out)
}

fn write_component(
    out: &mut String,
    component_id: ComponentId,
    lookup: &dyn Fn(ComponentId) -> Option<Arc<[RenderTreeFrame]>>,
) -> Result<()> {
    let frames = lookup(component_id).ok_or(Error::UnknownComponent(component_id))?;
    write_frames(out, &frames, 0, frames.len(), lookup)
}

fn write_frames(
    out: &mut String,
    frames: &[RenderTreeFrame],
    start: usize,
    end: usize,
    lookup: &dyn Fn(ComponentId) -> Option<Arc<[RenderTreeFrame]>>,
) -> Result<()> {
    let mut index = start;
    while index < end {
        let frame = &frames[index];
        match frame {
            RenderTreeFrame::Element {
                name,
                subtree_length,
            } => {
                let attributes = attribute_range(frames, index);
                let subtree_end = index + subtree_length;
                out.push('<');
                out.push_str(name);
                for attribute in &frames[attributes.clone()] {
                    if let RenderTreeFrame::Attribute { name, value } = attribute {
                        write_attribute(out, name, value);
                    }
                }
                out.push('>');
                let has_children = attributes.end < subtree_end;
                if !(is_void_tag(&name.to_ascii_lowercase()) && !has_children) {
                    write_frames(out, frames, attributes.end, subtree_end, lookup)?;
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
                index = subtree_end;
            }
            RenderTreeFrame::Text(text) => {
                out.push_str(&escape_html_text(text));
                index += 1;
            }
            RenderTreeFrame::Markup(markup) => {
                out.push_str(markup);
                index += 1;
            }
            RenderTreeFrame::Component {
                resolved,
                subtree_length,
                component_type,
            } => {
                let child = resolved.ok_or_else(|| {
                    Error::InvalidRenderTree(format!(
                        "component frame for {} was never attached",
                        component_type.name()
                    ))
                })?;
                stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
                    write_component(out, child.id, lookup)
                })?;
                index += subtree_length;
            }
            RenderTreeFrame::Attribute { .. } => {
                index += 1;
            }
        }
    }
    Ok(())
}

fn write_attribute(out: &mut String, name: &str, value: &AttributeValue) {
    match value {
        AttributeValue::EventHandler(binding) => {
            let Some(handler_id) = binding.id() else {
                return;
            };
            out.push(' ');
            out.push_str(EVENT_HANDLER_ATTRIBUTE_PREFIX);
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&handler_id.to_string());
            out.push('"');
        }
        AttributeValue::Bool(true) => {
            out.push(' ');
            out.push_str(name);
        }
        AttributeValue::Bool(false) => {}
        other => {
            let Some(text) = other.display_value() else {
                return;
            };
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_html_attr(&text));
            out.push('"');
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;
    use std::collections::HashMap;

    use super::*;
    use crate::framework::{
        Component, ComponentType, EventCallback, EventHandlerBinding, EventHandlerId,
        MouseEventArgs, RenderTreeBuilder, ResolvedComponent,
    };

    #[derive(Default)]
    struct Leaf;

    impl Component for Leaf {
        fn build_render_tree(&self, builder: &mut RenderTreeBuilder) {
            builder.add_content("leaf");
        }
    }

    fn build(render: impl FnOnce(&mut RenderTreeBuilder)) -> Arc<[RenderTreeFrame]> {
        let mut builder = RenderTreeBuilder::new();
        render(&mut builder);
        builder.finish().expect("frames").into()
    }

    fn render(
        root: ComponentId,
        tree: &HashMap<ComponentId, Arc<[RenderTreeFrame]>>,
    ) -> Result<String> {
        let mut out = String::new();
        write_component(&mut out, root, &|id| tree.get(&id).cloned())?;
        Ok(out)
    }

    #[test]
    fn elements_text_and_attribute_kinds() -> Result<()> {
        let frames = build(|builder| {
            builder.open_element("input");
            builder.add_attribute("type", "checkbox");
            builder.add_attribute("checked", true);
            builder.add_attribute("disabled", false);
            builder.add_attribute("tabindex", 3);
            builder.close_element();
            builder.open_element("p");
            builder.add_content("a < b & \"c\"");
            builder.close_element();
            builder.add_markup_content("<hr>");
        });
        let tree = HashMap::from([(ComponentId(0), frames)]);
        assert_eq!(
            render(ComponentId(0), &tree)?,
            "<input type=\"checkbox\" checked tabindex=\"3\"><p>a &lt; b &amp; \"c\"</p><hr>"
        );
        Ok(())
    }

    #[test]
    fn event_handlers_render_with_their_ids() -> Result<()> {
        let mut frames = build(|builder| {
            builder.open_element("button");
            builder.add_attribute("onclick", AttributeValue::Bool(true));
            builder.add_content("go");
            builder.close_element();
        })
        .to_vec();
        frames[1] = RenderTreeFrame::Attribute {
            name: "onclick".to_string(),
            value: AttributeValue::EventHandler(EventHandlerBinding {
                id: Some(EventHandlerId::new(7)),
                callback: EventCallback::new(|_: &mut Leaf, _: &MouseEventArgs| Ok(())),
            }),
        };
        let tree = HashMap::from([(ComponentId(0), Arc::from(frames))]);
        assert_eq!(
            render(ComponentId(0), &tree)?,
            "<button blazor:onclick=\"7\">go</button>"
        );
        Ok(())
    }

    #[test]
    fn child_components_render_in_place() -> Result<()> {
        let child = ResolvedComponent {
            id: ComponentId(1),
            instance_type: TypeId::of::<Leaf>(),
            instance_type_name: std::any::type_name::<Leaf>(),
        };
        let parent = Arc::from(vec![
            RenderTreeFrame::Element {
                name: "div".to_string(),
                subtree_length: 2,
            },
            RenderTreeFrame::Component {
                component_type: ComponentType::of::<Leaf>(),
                subtree_length: 1,
                resolved: Some(child),
            },
        ]);
        let tree = HashMap::from([
            (ComponentId(0), parent),
            (ComponentId(1), build(|builder| Leaf.build_render_tree(builder))),
        ]);
        assert_eq!(render(ComponentId(0), &tree)?, "<div>leaf</div>");

        let orphaned = HashMap::from([(ComponentId(0), tree[&ComponentId(0)].clone())]);
        assert!(matches!(
            render(ComponentId(0), &orphaned),
            Err(Error::UnknownComponent(id)) if id == ComponentId(1)
        ));
        Ok(())
    }
}
