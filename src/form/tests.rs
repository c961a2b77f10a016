use super::*;
use futures::executor::block_on;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::field::{CheckboxField, FieldConfig, FieldStatus, TextField};
use crate::pipeline::{EmailPipeline, NumberPipeline, TextPipeline};

type Sent = Arc<Mutex<Vec<SubmitPayload>>>;

fn recording_handler(sent: &Sent) -> HandlerTransport {
    let sent = sent.clone();
    HandlerTransport::new(move |payload: &SubmitPayload| {
        sent.lock().expect("sent lock").push(payload.clone());
        Ok(serde_json::json!({ "ok": true }))
    })
}

fn email_field(form: &FormController, required: bool) -> TextField<EmailPipeline> {
    let field = TextField::new(
        FieldConfig::named("email").required(required),
        EmailPipeline::new(),
        form.link(),
    )
    .expect("field config");
    field.mount().expect("mount");
    field
}

fn amount_field(form: &FormController) -> TextField<NumberPipeline> {
    let field = TextField::new(
        FieldConfig::named("amount").default_value("10"),
        NumberPipeline::dollar(),
        form.link(),
    )
    .expect("field config");
    field.mount().expect("mount");
    field
}

/// Never resolves, so only a timeout can end the submit.
struct Stalled;

impl Transport for Stalled {
    fn dispatch<'a>(&'a self, _payload: &'a SubmitPayload) -> BoxedDispatchFuture<'a> {
        Box::pin(futures::future::pending::<Result<TransportResponse, TransportError>>())
    }
}

#[test]
fn invalid_field_blocks_dispatch_and_keeps_form_ready() {
    let sent = Sent::default();
    let form = FormController::builder(FormOptions::default())
        .handler(recording_handler(&sent))
        .build();
    let email = email_field(&form, true);
    let amount = amount_field(&form);

    let outcome = block_on(form.submit()).expect("submit");
    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert!(sent.lock().expect("sent lock").is_empty());
    assert_eq!(form.state().expect("state"), FormState::Ready);

    assert_eq!(email.status().expect("status"), FieldStatus::InvalidShown);
    assert_eq!(amount.status().expect("status"), FieldStatus::Valid);
    assert_eq!(form.snapshot().expect("snapshot").submit_count, 1);
}

fn required_note(form: &FormController, name: &str) -> TextField<TextPipeline> {
    let field = TextField::new(
        FieldConfig::named(name).required(true),
        TextPipeline::new(),
        form.link(),
    )
    .expect("field config");
    field.mount().expect("mount");
    field
}

#[test]
fn submit_validates_fields_after_the_first_failure() {
    let sent = Sent::default();
    let form = FormController::builder(FormOptions::default())
        .handler(recording_handler(&sent))
        .build();
    // Registry order is by name, so `a` fails before `b` and `c` are reached.
    let a = required_note(&form, "a");
    let b = required_note(&form, "b");
    let c = required_note(&form, "c");
    c.on_change("filled").expect("change");

    assert_eq!(block_on(form.submit()).expect("submit"), SubmitOutcome::Invalid);
    assert!(sent.lock().expect("sent lock").is_empty());
    assert_eq!(a.status().expect("status"), FieldStatus::InvalidShown);
    assert_eq!(b.status().expect("status"), FieldStatus::InvalidShown);
    assert_eq!(c.status().expect("status"), FieldStatus::Valid);

    assert!(!form.validate_all().expect("validate all"));
    assert_eq!(b.status().expect("status"), FieldStatus::InvalidShown);
}

#[test]
fn valid_submit_sends_parsed_values() {
    let sent = Sent::default();
    let successes = Arc::new(AtomicUsize::new(0));
    let counter = successes.clone();
    let form = FormController::builder(FormOptions::default())
        .handler(recording_handler(&sent))
        .on_success(move |response| {
            assert_eq!(response.body["ok"], true);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    let email = email_field(&form, true);
    amount_field(&form);

    email.on_change("Ada@Example.com").expect("change");
    let outcome = block_on(form.submit()).expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Submitted(ref response) if response.status == 200));
    assert_eq!(form.state().expect("state"), FormState::Submitted);
    assert_eq!(successes.load(Ordering::SeqCst), 1);

    let sent = sent.lock().expect("sent lock");
    let body = sent[0].to_json();
    assert_eq!(body["email"]["full"], "ada@example.com");
    assert_eq!(body["amount"], "10");
    assert!(body.get(CAPTCHA_TOKEN_KEY).is_none());
}

#[test]
fn clear_on_submit_resets_fields_but_reports_submitted() {
    let form = FormController::builder(FormOptions::default().clear_on_submit(true))
        .handler(HandlerTransport::new(|_: &SubmitPayload| Ok(serde_json::Value::Null)))
        .build();
    let email = email_field(&form, false);
    email.on_change("ada@example.com").expect("change");
    email.on_blur().expect("blur");
    assert!(matches!(
        form.value("email").expect("entry"),
        FormValue::Email(_)
    ));

    block_on(form.submit()).expect("submit");
    assert_eq!(form.state().expect("state"), FormState::Submitted);
    assert_eq!(email.value().expect("value"), "");
    assert_eq!(email.status().expect("status"), FieldStatus::Pristine);
    assert_eq!(form.value("email").expect("entry"), FormValue::text(""));
}

#[test]
fn failed_transport_sets_error_and_keeps_values() {
    let failures = Arc::new(AtomicUsize::new(0));
    let counter = failures.clone();
    let form = FormController::builder(FormOptions::default().clear_on_submit(true))
        .handler(HandlerTransport::new(|_: &SubmitPayload| {
            Err("mailbox full".to_string())
        }))
        .on_error(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    let email = email_field(&form, true);
    email.on_change("ada@example.com").expect("change");

    let outcome = block_on(form.submit()).expect("submit");
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(TransportError::Handler("mailbox full".into()))
    );
    assert_eq!(form.state().expect("state"), FormState::Error);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(email.value().expect("value"), "ada@example.com");
}

#[test]
fn interacting_after_submit_returns_to_ready() {
    let form = FormController::builder(FormOptions::default())
        .handler(HandlerTransport::new(|_: &SubmitPayload| Ok(serde_json::Value::Null)))
        .build();
    let email = email_field(&form, true);
    email.on_change("ada@example.com").expect("change");
    block_on(form.submit()).expect("submit");
    assert_eq!(form.state().expect("state"), FormState::Submitted);

    email.on_change("grace@example.com").expect("change");
    assert_eq!(form.state().expect("state"), FormState::Submitted);
    assert!(email.on_blur().expect("blur"));
    assert_eq!(form.state().expect("state"), FormState::Ready);
}

#[test]
fn resubmitting_from_error_is_allowed() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let form = FormController::builder(FormOptions::default())
        .handler(HandlerTransport::new(move |_: &SubmitPayload| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("try again".to_string())
            } else {
                Ok(serde_json::Value::Null)
            }
        }))
        .build();
    let note = TextField::new(FieldConfig::named("note"), TextPipeline::new(), form.link())
        .expect("field config");
    note.mount().expect("mount");

    assert!(matches!(
        block_on(form.submit()).expect("first submit"),
        SubmitOutcome::Failed(_)
    ));
    assert!(matches!(
        block_on(form.submit()).expect("second submit"),
        SubmitOutcome::Submitted(_)
    ));
    assert_eq!(form.snapshot().expect("snapshot").submit_count, 2);
}

#[test]
fn captcha_defers_dispatch_until_a_token_arrives() {
    let sent = Sent::default();
    let challenges = Arc::new(AtomicUsize::new(0));
    let counter = challenges.clone();
    let form = FormController::builder(FormOptions::default())
        .handler(recording_handler(&sent))
        .captcha(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();
    let email = email_field(&form, true);
    email.on_change("ada@example.com").expect("change");

    assert_eq!(
        block_on(form.submit_with_token("early")),
        Err(FormError::NoPendingSubmit)
    );

    let outcome = block_on(form.submit()).expect("submit");
    assert_eq!(outcome, SubmitOutcome::AwaitingCaptcha);
    assert_eq!(challenges.load(Ordering::SeqCst), 1);
    let snapshot = form.snapshot().expect("snapshot");
    assert_eq!(snapshot.state, FormState::Submitting);
    assert!(snapshot.awaiting_captcha);
    assert!(sent.lock().expect("sent lock").is_empty());

    assert_eq!(block_on(form.submit()), Err(FormError::AlreadySubmitting));

    let outcome = block_on(form.submit_with_token("token-123")).expect("submit with token");
    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    let sent = sent.lock().expect("sent lock");
    assert_eq!(sent[0].captcha_token.as_deref(), Some("token-123"));
    assert_eq!(sent[0].to_json()[CAPTCHA_TOKEN_KEY], "token-123");
}

#[test]
fn missing_transport_is_reported_not_sent() {
    let form = FormController::new(FormOptions::default());
    amount_field(&form);

    let outcome = block_on(form.submit()).expect("submit");
    assert_eq!(outcome, SubmitOutcome::NotDispatched);
    assert_eq!(form.state().expect("state"), FormState::Ready);
}

#[test]
fn http_target_takes_precedence_over_handler() {
    let via_http = Sent::default();
    let via_handler = Sent::default();
    let form = FormController::builder(FormOptions::default())
        .handler(recording_handler(&via_handler))
        .http(recording_handler(&via_http))
        .build();
    amount_field(&form);

    block_on(form.submit()).expect("submit");
    assert_eq!(via_http.lock().expect("lock").len(), 1);
    assert!(via_handler.lock().expect("lock").is_empty());
}

#[test]
fn slow_transport_times_out_into_error() {
    let form = FormController::builder(FormOptions::default().submit_timeout_ms(20))
        .handler(Stalled)
        .build();
    amount_field(&form);

    let outcome = block_on(form.submit()).expect("submit");
    assert_eq!(outcome, SubmitOutcome::Failed(TransportError::Timeout(20)));
    assert_eq!(form.state().expect("state"), FormState::Error);
}

#[test]
fn completion_outside_a_submit_is_rejected() {
    let form = FormController::new(FormOptions::default());
    assert_eq!(
        form.on_success(TransportResponse::ok()),
        Err(FormError::InvalidStateTransition {
            from: FormState::Ready,
            to: FormState::Submitted,
        })
    );
    assert_eq!(
        form.on_error(TransportError::Request("offline".into())),
        Err(FormError::InvalidStateTransition {
            from: FormState::Ready,
            to: FormState::Error,
        })
    );
}

#[test]
fn polymorphic_values_share_one_registry() {
    let form = FormController::new(FormOptions::default());
    amount_field(&form);
    let terms = CheckboxField::new(FieldConfig::named("terms"), form.link()).expect("field config");
    terms.mount().expect("mount");
    terms.toggle().expect("toggle");

    let data = form.data().expect("data");
    assert_eq!(data.get("amount"), Some(&FormValue::text("10")));
    assert_eq!(data.get("terms"), Some(&FormValue::Bool(true)));
    assert_eq!(
        form.field_names().expect("names"),
        vec!["amount".to_string(), "terms".to_string()]
    );
    assert_eq!(
        form.value("missing"),
        Err(FormError::UnknownField("missing".into()))
    );
}

#[test]
fn collected_data_converts_into_typed_structs() {
    #[derive(Debug, FromFormData)]
    struct Order {
        amount: f64,
        #[form(rename = "terms")]
        accepted: bool,
        note: Option<String>,
    }

    let form = FormController::new(FormOptions::default());
    amount_field(&form);
    let terms = CheckboxField::new(
        FieldConfig::named("terms").default_value("true"),
        form.link(),
    )
    .expect("field config");
    terms.mount().expect("mount");

    let order = Order::from_form_data(&form.data().expect("data")).expect("order");
    assert_eq!(order.amount, 10.0);
    assert!(order.accepted);
    assert_eq!(order.note, None);
}

#[test]
fn options_deserialize_from_camel_case() {
    let options: FormOptions =
        serde_json::from_str(r#"{"clearOnSubmit":true,"submitTimeoutMs":5000}"#)
            .expect("options json");
    assert_eq!(
        options,
        FormOptions::default()
            .clear_on_submit(true)
            .submit_timeout_ms(5_000)
    );
}

#[test]
fn state_transitions_follow_the_submit_cycle() {
    let mut runtime = controller::FormRuntime {
        state: FormState::Ready,
        submit_count: 0,
        awaiting_captcha: false,
    };
    assert!(controller::transition_form_state(&mut runtime, FormState::Submitting).is_ok());
    assert!(controller::transition_form_state(&mut runtime, FormState::Submitted).is_ok());
    assert_eq!(
        controller::transition_form_state(&mut runtime, FormState::Error),
        Err(FormError::InvalidStateTransition {
            from: FormState::Submitted,
            to: FormState::Error,
        })
    );
    assert!(controller::transition_form_state(&mut runtime, FormState::Ready).is_ok());
    assert!(controller::transition_form_state(&mut runtime, FormState::Submitted).is_err());
}
