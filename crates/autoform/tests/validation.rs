/// Tests for the sequential validation chain
mod common;

use autoform::{
    CancellationToken, DynamicFormItem, FormConfig, FormManager, PassValidator, ProviderPool, ValidationOutcome,
};
use common::{
    with_text, Blank, DeferredValidator, EmailValidator, LogCapture, Profile, Recording, Screen, StalledValidator,
    SwitchLayout, TextLayout,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn blank_form(pool: &ProviderPool) -> FormManager<Blank> {
    FormManager::build_with(pool, FormConfig::default()).unwrap()
}

#[tokio::test]
async fn test_valid_profile_passes() {
    let mut form = FormManager::<Profile>::build_with(&ProviderPool::new(), FormConfig::default()).unwrap();
    form.init_data(&Profile::sample());

    let outcome = form.validate().await;
    assert_eq!(outcome, ValidationOutcome::Passed);
    assert!(outcome.is_passed());
}

#[tokio::test]
async fn test_chain_stops_at_first_failure() {
    let pool = ProviderPool::new();
    let mut form = blank_form(&pool);

    let (a, a_calls) = Recording::new(true);
    let (b, b_calls) = Recording::new(false);
    let (c, c_calls) = Recording::new(true);

    for (key, order, validator) in [("c", 3.0, c), ("a", 1.0, a), ("b", 2.0, b)] {
        form.append(
            DynamicFormItem::new(key)
                .order(order)
                .layout(pool.layout::<TextLayout>())
                .validator(validator),
        )
        .unwrap();
    }

    let outcome = form.validate().await;

    assert_eq!(outcome.failed_key(), Some("b"));
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert_eq!(c_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_item_without_layout_always_fails() {
    let pool = ProviderPool::new();
    let mut form = blank_form(&pool);

    let (validator, calls) = Recording::new(true);
    form.append(DynamicFormItem::new("orphan").validator(validator))
        .unwrap();
    form.init_data_map(&[("orphan".to_string(), json!("has a value"))].into_iter().collect());

    let outcome = form.validate().await;

    assert_eq!(outcome, ValidationOutcome::Failed { key: "orphan".into() });
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_required_failure_shows_inline_error() {
    let mut form = FormManager::<Profile>::build_with(&ProviderPool::new(), FormConfig::default()).unwrap();
    form.init_data(&Profile::sample());
    form.init_data_map(&[("name".to_string(), json!("  "))].into_iter().collect());

    let views = form.get_all_form_views(&Screen);
    let outcome = form.validate().await;

    assert_eq!(outcome.failed_key(), Some("name"));
    with_text(&views[1], |text| assert_eq!(text.error.as_deref(), Some("This field is required")));
    with_text(&views[2], |text| assert_eq!(text.error, None));
}

#[tokio::test]
async fn test_fix_and_retry() {
    let mut form = FormManager::<Profile>::build_with(&ProviderPool::new(), FormConfig::default()).unwrap();
    let views = form.get_all_form_views(&Screen);

    with_text(&views[0], |text| text.type_text("not-an-email"));
    let outcome = form.validate().await;
    assert_eq!(outcome.failed_key(), Some("mail"));
    with_text(&views[0], |text| assert_eq!(text.error.as_deref(), Some("Invalid email")));

    with_text(&views[0], |text| text.type_text("ada@example.com"));
    with_text(&views[1], |text| text.type_text("Ada"));
    with_text(&views[2], |text| text.type_text("A"));

    assert!(form.validate().await.is_passed());
    assert_eq!(form.get_data().email, "ada@example.com");
    with_text(&views[0], |text| assert_eq!(text.error, None));
}

#[tokio::test]
async fn test_required_error_cleared_once_filled() {
    let mut form = FormManager::<Profile>::build_with(&ProviderPool::new(), FormConfig::default()).unwrap();
    form.init_data(&Profile::sample());
    form.init_data_map(&[("nickname".to_string(), json!(""))].into_iter().collect());
    let views = form.get_all_form_views(&Screen);

    assert_eq!(form.validate().await.failed_key(), Some("nickname"));
    with_text(&views[2], |text| assert_eq!(text.error.as_deref(), Some("This field is required")));

    with_text(&views[2], |text| text.type_text("Ada"));
    assert!(form.validate().await.is_passed());
    with_text(&views[2], |text| assert_eq!(text.error, None));
}

#[tokio::test]
async fn test_layout_mismatch_is_logged_and_still_fails() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let pool = ProviderPool::new();
    let mut form = blank_form(&pool);
    form.append(
        DynamicFormItem::new("mail")
            .layout(pool.layout::<SwitchLayout>())
            .validator(pool.validator::<EmailValidator>()),
    )
    .unwrap();
    form.get_all_form_views(&Screen);

    let outcome = form.validate().await;
    assert_eq!(outcome.failed_key(), Some("mail"));

    let output = logs.contents();
    let line = output
        .lines()
        .find(|line| line.contains("Validator type does not match"))
        .expect("mismatch was not logged");
    assert!(line.contains("ERROR"));
    assert!(line.contains("EmailValidator"));
    assert!(line.contains("SwitchLayout"));
    assert!(line.contains("expected layout provider"));
}

#[tokio::test]
async fn test_matching_layout_logs_no_mismatch() {
    let logs = LogCapture::default();
    let _guard = logs.install();

    let pool = ProviderPool::new();
    let mut form = blank_form(&pool);
    form.append(
        DynamicFormItem::new("mail")
            .layout(pool.layout::<TextLayout>())
            .validator(pool.validator::<EmailValidator>()),
    )
    .unwrap();
    let views = form.get_all_form_views(&Screen);

    assert_eq!(form.validate().await.failed_key(), Some("mail"));
    with_text(&views[0], |text| assert_eq!(text.error.as_deref(), Some("Invalid email")));
    assert!(!logs.contents().contains("Validator type does not match"));
}

#[tokio::test]
async fn test_deferred_validator_completes_chain() {
    let pool = ProviderPool::new();
    let mut form = blank_form(&pool);

    let (after, after_calls) = Recording::new(true);
    form.append(
        DynamicFormItem::new("slow")
            .order(1.0)
            .layout(pool.layout::<TextLayout>())
            .validator(pool.validator::<DeferredValidator>()),
    )
    .unwrap()
    .append(
        DynamicFormItem::new("after")
            .order(2.0)
            .layout(pool.layout::<TextLayout>())
            .validator(after),
    )
    .unwrap();

    assert_eq!(form.validate().await.failed_key(), Some("slow"));
    assert_eq!(after_calls.load(Ordering::SeqCst), 0);

    form.init_data_map(&[("slow".to_string(), json!(1))].into_iter().collect());
    assert!(form.validate().await.is_passed());
    assert_eq!(after_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let pool = ProviderPool::new();
    let mut form = blank_form(&pool);
    let (validator, calls) = Recording::new(true);
    form.append(
        DynamicFormItem::new("a")
            .layout(pool.layout::<TextLayout>())
            .validator(validator),
    )
    .unwrap();

    let token = CancellationToken::new();
    token.cancel();

    assert_eq!(form.validate_until_cancelled(&token).await, ValidationOutcome::Cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancel_abandons_stalled_validator() {
    let pool = ProviderPool::new();
    let mut form = blank_form(&pool);

    let (after, after_calls) = Recording::new(true);
    form.append(
        DynamicFormItem::new("stalled")
            .order(1.0)
            .layout(pool.layout::<TextLayout>())
            .validator(pool.validator::<StalledValidator>()),
    )
    .unwrap()
    .append(
        DynamicFormItem::new("after")
            .order(2.0)
            .layout(pool.layout::<TextLayout>())
            .validator(after),
    )
    .unwrap();

    let token = CancellationToken::new();
    let (outcome, ()) = tokio::join!(form.validate_until_cancelled(&token), async {
        tokio::task::yield_now().await;
        token.cancel();
    });

    assert_eq!(outcome, ValidationOutcome::Cancelled);
    assert_eq!(after_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_uncancelled_token_behaves_like_validate() {
    let pool = ProviderPool::new();
    let mut form = blank_form(&pool);
    form.append(
        DynamicFormItem::new("free")
            .layout(pool.layout::<TextLayout>())
            .validator(Arc::new(PassValidator)),
    )
    .unwrap();

    let token = CancellationToken::new();
    assert!(form.validate_until_cancelled(&token).await.is_passed());
}

#[tokio::test]
async fn test_empty_form_passes() {
    let form = blank_form(&ProviderPool::new());
    assert!(form.validate().await.is_passed());
}
