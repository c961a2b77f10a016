use std::collections::BTreeSet;

use super::*;
use crate::form::{FileMeta, FormController, FormLink, FormOptions, FormValue};
use crate::pipeline::{
    EmailPipeline, NamePipeline, NumberPipeline, Pipeline, TextPipeline, ValidationRule,
};

fn form() -> FormController {
    FormController::new(FormOptions::default())
}

fn email_field(form: &FormController, config: FieldConfig) -> TextField<EmailPipeline> {
    let field = TextField::new(config, EmailPipeline::new(), form.link()).expect("field config");
    field.mount().expect("mount");
    field
}

#[test]
fn required_empty_reports_required_message_before_rules() {
    let form = form();
    let field = email_field(
        &form,
        FieldConfig::named("email")
            .required(true)
            .required_message("Email is required"),
    );

    assert!(!field.validate(None).expect("validate"));
    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, FieldStatus::InvalidShown);
    assert_eq!(snapshot.error.as_deref(), Some("Email is required"));

    assert!(!field.validate(Some("   ".into())).expect("validate"));
    assert_eq!(
        field.snapshot().expect("snapshot").error.as_deref(),
        Some("Email is required")
    );
}

#[test]
fn optional_empty_passes_without_running_rules() {
    let form = form();
    let field = email_field(&form, FieldConfig::named("email"));

    assert!(field.validate(None).expect("validate"));
    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, FieldStatus::Valid);
    assert_eq!(snapshot.error, None);
    assert_eq!(form.value("email").expect("entry"), FormValue::text(""));
}

#[test]
fn rule_without_message_uses_the_invalid_message() {
    let form = form();
    let pipeline = TextPipeline::new().rule(ValidationRule::new(|value: &str| {
        value.starts_with('#')
    }));
    let field = TextField::new(
        FieldConfig::named("color").invalid_message("Use a hex color"),
        pipeline,
        form.link(),
    )
    .expect("field config");

    field.on_change("red").expect("change");
    assert!(!field.on_blur().expect("blur"));
    assert_eq!(
        field.snapshot().expect("snapshot").error.as_deref(),
        Some("Use a hex color")
    );
}

#[test]
fn clear_twice_matches_clearing_once() {
    let form = form();
    let field = email_field(&form, FieldConfig::named("email").default_value("a@b.co"));
    let fresh = field.snapshot().expect("snapshot");

    field.on_change("nope").expect("change");
    field.on_blur().expect("blur");
    field.clear().expect("clear");
    let once = field.snapshot().expect("snapshot");
    field.clear().expect("clear");
    let twice = field.snapshot().expect("snapshot");

    assert_eq!(once, fresh);
    assert_eq!(twice, once);
    assert_eq!(
        form.value("email").expect("entry"),
        EmailPipeline::new().parse("a@b.co")
    );
}

#[test]
fn keystrokes_only_validate_once_the_field_is_invalid() {
    let form = form();
    let field = email_field(&form, FieldConfig::named("email"));

    field.on_change("ada@").expect("change");
    assert_eq!(field.status().expect("status"), FieldStatus::Pristine);

    assert!(!field.on_blur().expect("blur"));
    assert_eq!(field.status().expect("status"), FieldStatus::InvalidShown);

    field.on_change("ada@example").expect("change");
    assert_eq!(field.status().expect("status"), FieldStatus::InvalidShown);

    field.on_focus().expect("focus");
    assert_eq!(field.status().expect("status"), FieldStatus::InvalidHidden);
    assert_eq!(field.snapshot().expect("snapshot").error, None);

    field.on_change("ada@example.com").expect("change");
    assert_eq!(field.status().expect("status"), FieldStatus::Valid);
    assert_eq!(
        form.value("email").expect("entry"),
        EmailPipeline::new().parse("ada@example.com")
    );

    field.on_change("not an email").expect("change");
    assert_eq!(field.status().expect("status"), FieldStatus::Valid);
}

#[test]
fn mount_registers_the_parsed_initial_value_once() {
    let form = form();
    let field = TextField::new(
        FieldConfig::named("amount").default_value("1,500"),
        NumberPipeline::new(),
        form.link(),
    )
    .expect("field config");
    assert!(form.field_names().expect("names").is_empty());

    field.mount().expect("mount");
    field.mount().expect("second mount");
    assert_eq!(form.field_names().expect("names"), vec!["amount".to_string()]);
    assert_eq!(form.value("amount").expect("entry"), FormValue::text("1500"));
}

#[test]
fn failed_validation_keeps_the_last_good_value_in_the_form() {
    let form = form();
    let field = email_field(&form, FieldConfig::named("email"));

    field.on_change("ada@example.com").expect("change");
    assert!(field.on_blur().expect("blur"));
    field.on_change("broken@").expect("change");
    assert!(!field.on_blur().expect("blur"));

    assert_eq!(field.value().expect("value"), "broken@");
    assert_eq!(
        form.value("email").expect("entry"),
        EmailPipeline::new().parse("ada@example.com")
    );
}

#[test]
fn blur_formats_and_reveals_the_success_message() {
    let form = form();
    let field = email_field(
        &form,
        FieldConfig::named("email")
            .default_value("ada@example.com")
            .success_message("Looks good"),
    );
    assert_eq!(field.snapshot().expect("snapshot").success, None);

    field.on_change(" Ada@Example.COM").expect("change");
    assert_eq!(field.value().expect("value"), "Ada@Example.COM");
    assert!(field.on_blur().expect("blur"));

    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.value, "ada@example.com");
    assert_eq!(snapshot.status, FieldStatus::ValidShown);
    assert_eq!(snapshot.success.as_deref(), Some("Looks good"));

    // Submit-time validation keeps a success message already on screen.
    assert!(field.validate(None).expect("validate"));
    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, FieldStatus::ValidShown);
    assert_eq!(snapshot.success.as_deref(), Some("Looks good"));

    field.clear().expect("clear");
    assert!(field.validate(None).expect("validate"));
    let snapshot = field.snapshot().expect("snapshot");
    assert_eq!(snapshot.status, FieldStatus::Valid);
    assert_eq!(snapshot.success, None);
}

#[test]
fn name_fields_register_raw_text_when_unparseable() {
    let form = form();
    let field = TextField::new(FieldConfig::named("name"), NamePipeline::new(), form.link())
        .expect("field config");
    field.mount().expect("mount");

    field.on_change("Dr.").expect("change");
    assert!(field.on_blur().expect("blur"));
    assert_eq!(form.value("name").expect("entry"), FormValue::text("Dr."));

    field.on_change("hello@gmail.com").expect("change");
    assert!(!field.on_blur().expect("blur"));
    assert_eq!(
        field.snapshot().expect("snapshot").error.as_deref(),
        Some("Please enter a name, not an email address")
    );
}

#[test]
fn identity_comes_from_the_label_when_unnamed() {
    let form = form();
    let field = TextField::new(
        FieldConfig::default().label("Company Website"),
        TextPipeline::new(),
        form.link(),
    )
    .expect("field config");
    assert_eq!(field.name(), "company-website");

    let missing = TextField::new(FieldConfig::default(), TextPipeline::new(), form.link());
    assert!(matches!(missing, Err(ConfigError::MissingIdentity)));
}

#[test]
fn unmounted_fields_validate_without_registering() {
    let form = form();
    let field = TextField::new(FieldConfig::named("note"), TextPipeline::new(), form.link())
        .expect("field config");

    field.on_change("hi").expect("change");
    assert!(field.on_blur().expect("blur"));
    assert_eq!(field.status().expect("status"), FieldStatus::ValidShown);
    assert!(form.field_names().expect("names").is_empty());

    field.mount().expect("mount");
    assert_eq!(form.value("note").expect("entry"), FormValue::text("hi"));
}

#[test]
fn detached_fields_still_validate() {
    let field = TextField::new(
        FieldConfig::named("note").required(true),
        TextPipeline::new(),
        FormLink::detached(),
    )
    .expect("field config");
    field.mount().expect("mount");
    field.on_change("hi").expect("change");
    assert!(field.on_blur().expect("blur"));
}

#[test]
fn required_checkbox_must_be_checked() {
    let form = form();
    let field = CheckboxField::new(
        FieldConfig::named("terms")
            .required(true)
            .required_message("Please accept the terms"),
        form.link(),
    )
    .expect("field config");
    field.mount().expect("mount");
    assert_eq!(form.value("terms").expect("entry"), FormValue::Bool(false));

    assert!(!form.validate_all().expect("validate"));
    assert_eq!(
        field.snapshot().expect("snapshot").error.as_deref(),
        Some("Please accept the terms")
    );

    assert!(field.toggle().expect("toggle"));
    assert_eq!(form.value("terms").expect("entry"), FormValue::Bool(true));
    assert!(!field.set_checked(false).expect("uncheck"));
}

#[test]
fn checkbox_default_reads_truthy_strings() {
    let field = CheckboxField::new(
        FieldConfig::named("news").default_value("on"),
        FormLink::detached(),
    )
    .expect("field config");
    assert!(field.value().expect("value"));
}

#[test]
fn ratings_snap_and_clamp() {
    let form = form();
    let field = RatingField::new(
        FieldConfig::named("stars").required(true),
        RatingKind::new(5).half_steps(true),
        form.link(),
    )
    .expect("field config");
    field.mount().expect("mount");

    assert!(field.set_rating(3.3).expect("rate"));
    assert_eq!(field.value().expect("value"), 3.5);
    assert!(field.set_rating(9.0).expect("rate"));
    assert_eq!(form.value("stars").expect("entry"), FormValue::Number(5.0));
    assert!(!field.set_rating(-1.0).expect("rate"));
    assert_eq!(form.value("stars").expect("entry"), FormValue::Number(5.0));

    let whole = RatingKind::new(10);
    assert_eq!(whole.snap(7.5), 8.0);
    assert_eq!(whole.snap(f64::NAN), 0.0);
}

#[test]
fn zero_star_ratings_are_a_config_error() {
    let result = RatingField::new(
        FieldConfig::named("stars"),
        RatingKind::new(0),
        FormLink::detached(),
    );
    assert!(matches!(result, Err(ConfigError::InvalidBound { .. })));
}

#[test]
fn tags_are_normalized_and_capped() {
    let form = form();
    let field = TagField::new(
        FieldConfig::named("topics").default_value("Rust, ,  Async  IO"),
        TagKind::new().lowercase(true).max_tags(3),
        form.link(),
    )
    .expect("field config");
    field.mount().expect("mount");

    let expected: BTreeSet<String> = ["rust", "async io"].into_iter().map(String::from).collect();
    assert_eq!(form.value("topics").expect("entry"), FormValue::Tags(expected));

    assert!(!field.add_tag("RUST").expect("duplicate"));
    assert!(!field.add_tag("   ").expect("blank"));
    assert!(field.add_tag("WASM").expect("add"));
    assert!(!field.add_tag("gpu").expect("full"));
    assert_eq!(field.value().expect("value").len(), 3);

    assert!(field.remove_tag("Rust").expect("remove"));
    assert!(!field.remove_tag("rust").expect("already gone"));
    assert!(field.add_tag("gpu").expect("room again"));
}

#[test]
fn files_check_type_size_and_count() {
    let form = form();
    let field = FileField::new(
        FieldConfig::named("resume").required(true),
        FileKind::new()
            .accept([".pdf", "image/*"])
            .max_size(1 << 20)
            .max_files(2),
        form.link(),
    )
    .expect("field config");
    field.mount().expect("mount");

    assert!(field
        .add_file(FileMeta::new("cv.PDF", 2_048, "application/pdf"))
        .expect("add"));
    assert!(!field
        .add_file(FileMeta::new("notes.txt", 10, "text/plain"))
        .expect("add"));
    assert_eq!(
        field.snapshot().expect("snapshot").error.as_deref(),
        Some("This file type is not allowed")
    );
    assert!(field.remove_file("notes.txt").expect("remove"));
    assert_eq!(field.status().expect("status"), FieldStatus::ValidShown);

    assert!(!field
        .add_file(FileMeta::new("scan.png", 2 << 20, "image/png"))
        .expect("add"));
    assert_eq!(
        field.snapshot().expect("snapshot").error.as_deref(),
        Some("Files must be 1 MB or smaller")
    );

    let FormValue::Files(files) = form.value("resume").expect("entry") else {
        panic!("expected files");
    };
    assert_eq!(files.len(), 1);
    assert!(field.kind().accepts(&files[0]));
}

#[test]
fn upload_progress_is_capped_and_cleared() {
    let field = FileField::new(
        FieldConfig::named("avatar"),
        FileKind::new(),
        FormLink::detached(),
    )
    .expect("field config");

    field.set_progress(Some(140)).expect("progress");
    assert_eq!(field.snapshot().expect("snapshot").progress, Some(100));
    field.clear().expect("clear");
    assert_eq!(field.snapshot().expect("snapshot").progress, None);
}

#[test]
fn status_views_follow_the_reveal_rules() {
    assert!(FieldStatus::Pristine.is_valid());
    assert!(FieldStatus::InvalidHidden.is_invalid());
    assert!(!FieldStatus::InvalidHidden.shows_error());
    assert!(FieldStatus::InvalidShown.shows_error());
    assert!(FieldStatus::ValidShown.shows_success());
    assert_eq!(FieldStatus::Valid.on_focus(), FieldStatus::Valid);
    assert_eq!(
        Trigger::Change.settle(FieldStatus::InvalidHidden, false),
        FieldStatus::InvalidHidden
    );
    assert_eq!(
        Trigger::Form.settle(FieldStatus::ValidShown, true),
        FieldStatus::ValidShown
    );
    assert_eq!(
        Trigger::Form.settle(FieldStatus::InvalidHidden, true),
        FieldStatus::Valid
    );
    assert_eq!(
        Trigger::Form.settle(FieldStatus::ValidShown, false),
        FieldStatus::InvalidShown
    );
}
