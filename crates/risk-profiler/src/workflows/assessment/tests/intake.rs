use super::common::*;

use crate::workflows::assessment::answers::AnswerValue;
use crate::workflows::assessment::engine::RiskAssessmentEngine;
use crate::workflows::assessment::intake::{
    validate_discovery, DiscoveryForm, FormEvent, FormSession, FormState, IntakeError,
    PersonalInfo,
};
use crate::workflows::assessment::schema::{Question, SchemaVersion};

fn answering_session() -> FormSession {
    FormSession::new(SchemaVersion::V1)
        .apply(FormEvent::SubmitIdentity(personal_info()))
        .expect("identity accepted")
}

fn answer_all(mut session: FormSession) -> FormSession {
    let answers = strongest_answers();
    for (index, question) in SchemaVersion::V1.questions().iter().enumerate() {
        let value = answers.get(*question).cloned().expect("fixture answers all");
        session = session
            .apply(FormEvent::Select(value))
            .expect("selection accepted");
        if index + 1 < SchemaVersion::V1.questions().len() {
            session = session.apply(FormEvent::Next).expect("advances");
        }
    }
    session
}

#[test]
fn identity_is_trimmed_and_required() {
    let session = FormSession::new(SchemaVersion::V1);
    let blank = PersonalInfo {
        phone: "   ".to_string(),
        ..personal_info()
    };

    let err = session
        .apply(FormEvent::SubmitIdentity(blank))
        .expect_err("blank phone rejected");
    assert_eq!(err, IntakeError::MissingIdentity("phone"));
    assert_eq!(session.state(), &FormState::CollectingIdentity);

    let padded = PersonalInfo {
        name: "  Asha Menon ".to_string(),
        ..personal_info()
    };
    let next = session
        .apply(FormEvent::SubmitIdentity(padded))
        .expect("identity accepted");
    assert_eq!(next.identity().map(|info| info.name.as_str()), Some("Asha Menon"));
    assert_eq!(next.current_question(), Some(Question::IncomeStability));
}

#[test]
fn next_requires_a_selection() {
    let session = answering_session();

    let err = session.apply(FormEvent::Next).expect_err("unanswered");
    assert_eq!(err, IntakeError::Unanswered(Question::IncomeStability));

    let blank = session
        .apply(FormEvent::Select(AnswerValue::from("  ")))
        .expect("selection stored");
    assert!(blank.apply(FormEvent::Next).is_err());
}

#[test]
fn previous_stops_at_first_question_and_keeps_answers() {
    let session = answering_session()
        .apply(FormEvent::Select("large_mnc".into()))
        .and_then(|session| session.apply(FormEvent::Next))
        .expect("advances");
    assert_eq!(session.current_question(), Some(Question::SavingsRate));

    let back = session
        .apply(FormEvent::Previous)
        .and_then(|session| session.apply(FormEvent::Previous))
        .expect("navigates back");
    assert_eq!(back.current_question(), Some(Question::IncomeStability));
    assert_eq!(
        back.answers().selected(Question::IncomeStability).as_deref(),
        Some("large_mnc")
    );
}

#[test]
fn progress_tracks_the_current_question() {
    let session = answering_session();
    let progress = session.progress_percent().expect("answering");
    assert!((progress - 100.0 / 12.0).abs() < 1e-9);

    let finished = answer_all(answering_session());
    assert_eq!(finished.progress_percent(), Some(100.0));
}

#[test]
fn submit_only_from_last_question() {
    let session = answering_session()
        .apply(FormEvent::Select("large_mnc".into()))
        .expect("selected");

    let err = session.apply(FormEvent::Submit).expect_err("not at the end");
    assert!(matches!(err, IntakeError::InvalidTransition { .. }));
}

#[test]
fn full_walkthrough_reaches_result() {
    let session = answer_all(answering_session());
    assert_eq!(session.current_question(), Some(Question::PortfolioMonitoring));

    let submitting = session.apply(FormEvent::Submit).expect("complete form");
    let (identity, answers) = submitting.submission().expect("ready to score");
    assert_eq!(identity.email, "asha@example.com");
    assert_eq!(answers.len(), 12);

    let result = RiskAssessmentEngine::new(SchemaVersion::V1).calculate(answers);
    let shown = submitting
        .apply(FormEvent::Complete(result.clone()))
        .expect("result shown");
    assert_eq!(shown.state(), &FormState::ShowingResult(Box::new(result)));
    assert!(shown.apply(FormEvent::Previous).is_err());
}

#[test]
fn prefilled_session_still_collects_identity() {
    let session = FormSession::prefilled(SchemaVersion::V2, &discovery_form());

    assert_eq!(session.state(), &FormState::CollectingIdentity);
    assert_eq!(
        session.identity().map(|info| info.name.as_str()),
        Some("Asha R. Menon")
    );
    assert!(session.apply(FormEvent::Next).is_err());
}

#[test]
fn discovery_requires_positive_age() {
    let mut form = discovery_form();
    form.age = Some(0);
    assert_eq!(
        validate_discovery(&form),
        Err(IntakeError::MissingDiscoveryField("age"))
    );

    form.age = Some(41);
    form.service = String::new();
    assert_eq!(
        validate_discovery(&form),
        Err(IntakeError::MissingDiscoveryField("service"))
    );
}

#[test]
fn form_encoded_flags_and_ages_are_accepted_as_text() {
    let info: PersonalInfo = serde_json::from_value(serde_json::json!({
        "name": "Asha Menon",
        "phone": 9845012345u64,
        "email": "asha@example.com",
        "sendCopy": " TRUE "
    }))
    .expect("string flag parses");
    assert!(info.send_copy);
    assert_eq!(info.phone, "9845012345");

    let unticked: PersonalInfo =
        serde_json::from_value(serde_json::json!({ "sendCopy": "on" })).expect("parses");
    assert!(!unticked.send_copy);

    let form: DiscoveryForm = serde_json::from_value(serde_json::json!({
        "name": "Asha",
        "age": "34",
        "phone": "9845012345",
        "email": "asha@example.com",
        "service": "Retirement planning"
    }))
    .expect("string age parses");
    assert_eq!(form.age, Some(34));

    let unreadable: DiscoveryForm = serde_json::from_value(serde_json::json!({
        "name": "Asha",
        "age": "thirty",
        "phone": "9845012345",
        "email": "asha@example.com",
        "service": "Retirement planning"
    }))
    .expect("parses");
    assert_eq!(unreadable.age, None);
    assert_eq!(
        validate_discovery(&unreadable),
        Err(IntakeError::MissingDiscoveryField("age"))
    );
}
