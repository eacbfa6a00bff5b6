mod common;

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

use component_tester::framework::AttributeValue;
use component_tester::{ComponentParameterCollection, TestContext};

use common::{Counter, Label, LabelList};

const RENDER_PROPTEST_REGRESSION_FILE: &str = "tests/proptest-regressions/render_property_test.txt";
const DEFAULT_RENDER_PROPTEST_CASES: u32 = 32;

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn render_proptest_cases() -> u32 {
    std::env::var("COMPONENT_TESTER_RENDER_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or_else(|| {
            env_proptest_cases(
                "COMPONENT_TESTER_PROPTEST_CASES",
                DEFAULT_RENDER_PROPTEST_CASES,
            )
        })
}

fn label_strategy() -> BoxedStrategy<String> {
    "[a-z][a-z0-9]{0,7}".boxed()
}

fn fail(error: impl std::fmt::Debug) -> TestCaseError {
    TestCaseError::fail(format!("{error:?}"))
}

fn assert_find_order_is_stable(labels: &[String]) -> TestCaseResult {
    let ctx = TestContext::new().map_err(fail)?;
    let cut = ctx
        .render::<LabelList>(
            ComponentParameterCollection::new()
                .add("Items", AttributeValue::object(labels.to_vec())),
        )
        .map_err(fail)?;

    let first = cut.find_components::<Label>().map_err(fail)?;
    let second = cut.find_components::<Label>().map_err(fail)?;
    prop_assert_eq!(first.len(), labels.len());

    for ((found, again), label) in first.iter().zip(&second).zip(labels) {
        prop_assert_eq!(found.component_id(), again.component_id());
        prop_assert_eq!(found.markup().map_err(fail)?, format!("<span>{label}</span>"));
    }

    let spans = cut
        .find_all("span")
        .map_err(fail)?
        .iter()
        .map(|span| span.text_content())
        .collect::<Vec<_>>();
    prop_assert_eq!(spans, labels.to_vec());
    Ok(())
}

fn assert_latest_parameters_win(texts: &[String]) -> TestCaseResult {
    let ctx = TestContext::new().map_err(fail)?;
    let cut = ctx
        .render::<Label>(ComponentParameterCollection::new().add("Text", "initial"))
        .map_err(fail)?;

    for (step, text) in texts.iter().enumerate() {
        cut.set_parameters_and_render(ComponentParameterCollection::new().add("Text", text.as_str()))
            .map_err(fail)?;
        prop_assert_eq!(cut.markup().map_err(fail)?, format!("<span>{text}</span>"));
        prop_assert_eq!(cut.render_count().map_err(fail)?, step + 2);
    }
    Ok(())
}

fn assert_click_count_matches_markup(clicks: usize) -> TestCaseResult {
    let ctx = TestContext::new().map_err(fail)?;
    let cut = ctx
        .render::<Counter>(ComponentParameterCollection::new())
        .map_err(fail)?;
    for _ in 0..clicks {
        cut.find("button").and_then(|button| button.click()).map_err(fail)?;
    }
    prop_assert_eq!(
        cut.find("p").map_err(fail)?.text_content(),
        format!("Current count: {clicks}")
    );
    prop_assert_eq!(cut.render_count().map_err(fail)?, clicks + 1);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: render_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(RENDER_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn nested_components_are_found_in_render_order(labels in vec(label_strategy(), 0..8)) {
        assert_find_order_is_stable(&labels)?;
    }

    #[test]
    fn latest_parameters_determine_the_markup(texts in vec(label_strategy(), 1..6)) {
        assert_latest_parameters_win(&texts)?;
    }

    #[test]
    fn every_click_renders_once(clicks in 0usize..12) {
        assert_click_count_matches_markup(clicks)?;
    }
}
