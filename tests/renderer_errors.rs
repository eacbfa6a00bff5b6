mod common;

use component_tester::framework::{
    AttributeValue, EventHandlerId, MouseEventArgs, RenderFragment, RendererInfo,
};
use component_tester::{ComponentParameterCollection, Error, Result, TestContext};

use common::{Boom, Counter, Exploding, FaultyParameters, HelloWorld, RenderModeBadge};

#[test]
fn unknown_handler_error_names_the_id_and_argument_type() -> Result<()> {
    let ctx = TestContext::new()?;
    let _cut = ctx.render::<Counter>(ComponentParameterCollection::new())?;

    let error = ctx
        .renderer()
        .dispatch_event(EventHandlerId::new(9_999), None, MouseEventArgs::default())
        .unwrap_err();

    assert!(matches!(
        &error,
        Error::UnknownEventHandler { handler_id, .. } if handler_id.get() == 9_999
    ));
    let message = error.to_string();
    assert!(message.contains("9999"), "{message}");
    assert!(message.contains("MouseEventArgs"), "{message}");
    Ok(())
}

#[test]
fn stale_handler_ids_still_dispatch_while_the_element_is_unchanged() -> Result<()> {
    let ctx = TestContext::new()?;
    let cut = ctx.render::<Counter>(ComponentParameterCollection::new())?;
    let button = cut.find("button")?;
    button.click()?;
    button.click()?;
    assert_eq!(cut.find("p")?.text_content(), "Current count: 2");
    Ok(())
}

#[test]
fn element_without_handler_reports_the_event() -> Result<()> {
    let ctx = TestContext::new()?;
    let cut = ctx.render::<Counter>(ComponentParameterCollection::new())?;
    let error = cut.find("p")?.click().unwrap_err();
    assert!(matches!(
        &error,
        Error::MissingEventHandler { event_name, element } if event_name == "onclick" && element == "p"
    ));
    Ok(())
}

#[test]
fn handler_failure_is_rethrown_with_its_original_type() -> Result<()> {
    let ctx = TestContext::new()?;
    let cut = ctx.render::<Exploding>(ComponentParameterCollection::new())?;

    let error = cut.find("button")?.click().unwrap_err();

    let boom = error.downcast_ref::<Boom>();
    assert!(boom.is_some_and(|boom| boom.0 == "click"), "{error:?}");
    assert_eq!(error.to_string(), "boom: click");
    Ok(())
}

#[test]
fn captured_exceptions_are_reported_once() -> Result<()> {
    let ctx = TestContext::new()?;
    let cut = ctx.render::<Exploding>(ComponentParameterCollection::new())?;
    assert!(cut.find("button")?.click().is_err());

    let hello = ctx.render::<HelloWorld>(ComponentParameterCollection::new())?;
    assert_eq!(hello.markup()?, "<h1>Hello world from Blazor</h1>");
    Ok(())
}

#[test]
fn several_failures_are_aggregated() -> Result<()> {
    let ctx = TestContext::new()?;
    let error = ctx
        .render_fragment(RenderFragment::new(|builder| {
            builder.open_component::<FaultyParameters>();
            builder.close_component();
            builder.open_component::<FaultyParameters>();
            builder.close_component();
        }))
        .unwrap_err();

    let Error::Aggregate(errors) = &error else {
        panic!("expected an aggregate error, got {error:?}");
    };
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|inner| inner.downcast_ref::<Boom>().is_some()));
    assert!(error.to_string().starts_with("2 unhandled exceptions"));
    Ok(())
}

#[test]
fn failing_first_render_surfaces_from_render() -> Result<()> {
    let ctx = TestContext::new()?;
    let error = ctx
        .render::<FaultyParameters>(ComponentParameterCollection::new())
        .unwrap_err();
    assert!(error.downcast_ref::<Boom>().is_some(), "{error:?}");
    Ok(())
}

#[test]
fn renderer_info_is_required_when_asked_for() -> Result<()> {
    let ctx = TestContext::new()?;
    let error = ctx
        .render::<RenderModeBadge>(ComponentParameterCollection::new())
        .unwrap_err();

    assert!(
        matches!(error.downcast_ref::<Error>(), Some(Error::MissingRendererInfo)),
        "{error:?}"
    );
    assert!(error.to_string().contains("set_renderer_info"));
    Ok(())
}

#[test]
fn configured_renderer_info_reaches_components() -> Result<()> {
    let ctx = TestContext::new()?;
    ctx.set_renderer_info(Some(RendererInfo::new("Server", true)));
    let cut = ctx.render::<RenderModeBadge>(ComponentParameterCollection::new())?;
    assert_eq!(cut.markup()?, "<em>Server</em>");
    Ok(())
}

#[test]
fn wrong_parameter_type_is_ignored_by_lenient_components() -> Result<()> {
    let ctx = TestContext::new()?;
    let cut = ctx.render::<common::Label>(
        ComponentParameterCollection::new().add("Text", AttributeValue::object(7u8)),
    )?;
    assert_eq!(cut.markup()?, "<span></span>");
    Ok(())
}

#[test]
fn invalid_selectors_are_rejected() -> Result<()> {
    let ctx = TestContext::new()?;
    let cut = ctx.render::<HelloWorld>(ComponentParameterCollection::new())?;
    assert!(matches!(
        cut.find("h1[").unwrap_err(),
        Error::UnsupportedSelector(_)
    ));
    Ok(())
}
