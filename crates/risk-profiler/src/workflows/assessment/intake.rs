//! Form controller for the multi-step questionnaire.
//!
//! Navigation state lives in [`FormSession`] and only changes through [`FormSession::apply`],
//! which returns the next session and leaves the current one untouched on error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::answers::{AnswerSet, AnswerValue};
use super::engine::AssessmentResult;
use super::schema::{Question, SchemaVersion};

/// Contact details captured on the first step of the assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub phone: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub send_copy: bool,
}

/// Upstream discovery form, recorded before the assessment is taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryForm {
    #[serde(deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_age")]
    pub age: Option<u16>,
    #[serde(deserialize_with = "deserialize_text")]
    pub phone: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub service: String,
}

// Browser forms post every field as text, so the typed fields also accept their string form.

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    })
}

/// `true` or any casing of the string "true"; everything else reads as unticked.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Whole numbers or numeric strings; anything else is treated as not provided.
fn deserialize_age<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|age| age.fract() == 0.0 && *age >= 0.0)
                    .map(|age| age as u64)
            })
            .and_then(|age| u16::try_from(age).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Input-shape problems detected before the engine runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("missing personal information: {0}")]
    MissingIdentity(&'static str),
    #[error("missing required field: {0}")]
    MissingDiscoveryField(&'static str),
    #[error("please select an option for {0} before proceeding")]
    Unanswered(Question),
    #[error("please answer all questions before submitting (missing: {})", join_keys(.0))]
    MissingAnswers(Vec<Question>),
    #[error("cannot handle {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

fn join_keys(questions: &[Question]) -> String {
    questions
        .iter()
        .map(|question| question.key())
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_personal_info(info: &PersonalInfo) -> Result<(), IntakeError> {
    if is_blank(&info.name) {
        return Err(IntakeError::MissingIdentity("name"));
    }
    if is_blank(&info.phone) {
        return Err(IntakeError::MissingIdentity("phone"));
    }
    if is_blank(&info.email) {
        return Err(IntakeError::MissingIdentity("email"));
    }
    Ok(())
}

pub fn validate_discovery(form: &DiscoveryForm) -> Result<(), IntakeError> {
    if is_blank(&form.name) {
        return Err(IntakeError::MissingDiscoveryField("name"));
    }
    if form.age.map_or(true, |age| age == 0) {
        return Err(IntakeError::MissingDiscoveryField("age"));
    }
    if is_blank(&form.phone) {
        return Err(IntakeError::MissingDiscoveryField("phone"));
    }
    if is_blank(&form.email) {
        return Err(IntakeError::MissingDiscoveryField("email"));
    }
    if is_blank(&form.service) {
        return Err(IntakeError::MissingDiscoveryField("service"));
    }
    Ok(())
}

/// Presence check only; values the tables do not recognise are left to the engine.
pub fn validate_answers(schema: SchemaVersion, answers: &AnswerSet) -> Result<(), IntakeError> {
    let missing = answers.missing(schema);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IntakeError::MissingAnswers(missing))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    CollectingIdentity,
    AnsweringQuestion { index: usize },
    Submitting,
    ShowingResult(Box<AssessmentResult>),
}

impl FormState {
    fn label(&self) -> &'static str {
        match self {
            FormState::CollectingIdentity => "collecting identity",
            FormState::AnsweringQuestion { .. } => "answering questions",
            FormState::Submitting => "submitting",
            FormState::ShowingResult(_) => "showing the result",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    SubmitIdentity(PersonalInfo),
    Select(AnswerValue),
    Next,
    Previous,
    Submit,
    Complete(AssessmentResult),
}

impl FormEvent {
    fn label(&self) -> &'static str {
        match self {
            FormEvent::SubmitIdentity(_) => "identity submission",
            FormEvent::Select(_) => "answer selection",
            FormEvent::Next => "next",
            FormEvent::Previous => "previous",
            FormEvent::Submit => "submit",
            FormEvent::Complete(_) => "result",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSession {
    schema: SchemaVersion,
    state: FormState,
    identity: Option<PersonalInfo>,
    answers: AnswerSet,
}

impl FormSession {
    pub fn new(schema: SchemaVersion) -> Self {
        Self {
            schema,
            state: FormState::CollectingIdentity,
            identity: None,
            answers: AnswerSet::new(),
        }
    }

    /// Seeds the identity draft from discovery data; the visitor still confirms it.
    pub fn prefilled(schema: SchemaVersion, discovery: &DiscoveryForm) -> Self {
        let mut session = Self::new(schema);
        session.identity = Some(PersonalInfo {
            name: discovery.name.clone(),
            phone: discovery.phone.clone(),
            email: discovery.email.clone(),
            send_copy: false,
        });
        session
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn identity(&self) -> Option<&PersonalInfo> {
        self.identity.as_ref()
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn current_question(&self) -> Option<Question> {
        match self.state {
            FormState::AnsweringQuestion { index } => self.schema.questions().get(index).copied(),
            _ => None,
        }
    }

    pub fn progress_percent(&self) -> Option<f64> {
        match self.state {
            FormState::AnsweringQuestion { index } => {
                let total = self.schema.questions().len() as f64;
                Some((index as f64 + 1.0) / total * 100.0)
            }
            _ => None,
        }
    }

    /// Identity and answers ready for the engine, once the form reached `Submitting`.
    pub fn submission(&self) -> Option<(&PersonalInfo, &AnswerSet)> {
        match (&self.state, &self.identity) {
            (FormState::Submitting, Some(identity)) => Some((identity, &self.answers)),
            _ => None,
        }
    }

    pub fn apply(&self, event: FormEvent) -> Result<FormSession, IntakeError> {
        let mut next = self.clone();
        let last_index = self.schema.questions().len().saturating_sub(1);

        match (&self.state, event) {
            (FormState::CollectingIdentity, FormEvent::SubmitIdentity(info)) => {
                let info = PersonalInfo {
                    name: info.name.trim().to_string(),
                    phone: info.phone.trim().to_string(),
                    email: info.email.trim().to_string(),
                    send_copy: info.send_copy,
                };
                validate_personal_info(&info)?;
                next.identity = Some(info);
                next.state = FormState::AnsweringQuestion { index: 0 };
            }
            (FormState::AnsweringQuestion { .. }, FormEvent::Select(value)) => {
                if let Some(question) = self.current_question() {
                    next.answers.insert(question, value);
                }
            }
            (FormState::AnsweringQuestion { index }, FormEvent::Next) => {
                let question = self.schema.questions()[*index];
                if self.answers.selected(question).is_none() {
                    return Err(IntakeError::Unanswered(question));
                }
                if *index < last_index {
                    next.state = FormState::AnsweringQuestion { index: index + 1 };
                }
            }
            (FormState::AnsweringQuestion { index }, FormEvent::Previous) => {
                next.state = FormState::AnsweringQuestion {
                    index: index.saturating_sub(1),
                };
            }
            (FormState::AnsweringQuestion { index }, FormEvent::Submit) if *index == last_index => {
                validate_answers(self.schema, &self.answers)?;
                next.state = FormState::Submitting;
            }
            (FormState::Submitting, FormEvent::Complete(result)) => {
                next.state = FormState::ShowingResult(Box::new(result));
            }
            (state, event) => {
                return Err(IntakeError::InvalidTransition {
                    state: state.label(),
                    event: event.label(),
                });
            }
        }

        Ok(next)
    }
}
