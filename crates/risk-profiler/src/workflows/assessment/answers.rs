use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::schema::{Question, SchemaVersion};

/// Raw form value for a single question.
///
/// Checkbox groups arrive as arrays; the engine scores the first selected entry. Any other
/// JSON shape is kept verbatim in `Other` so a stray value never rejects the submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
    Unanswered,
    Other(Value),
}

impl AnswerValue {
    /// The option key the engine consumes, if any non-blank value was submitted.
    ///
    /// Numbers and booleans become keys the way a JavaScript property lookup coerces them
    /// (`0` reads as `"0"`); objects yield nothing and therefore score 0.
    pub fn selected(&self) -> Option<Cow<'_, str>> {
        match self {
            AnswerValue::Single(value) => Some(Cow::Borrowed(value.as_str())),
            AnswerValue::Multiple(values) => {
                values.first().map(|value| Cow::Borrowed(value.as_str()))
            }
            AnswerValue::Unanswered => None,
            AnswerValue::Other(value) => coerce_key(value),
        }
        .filter(|value| !value.trim().is_empty())
    }
}

fn coerce_key(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Bool(flag) => Some(Cow::Borrowed(if *flag { "true" } else { "false" })),
        Value::Number(number) => Some(Cow::Owned(number_key(number))),
        Value::Array(items) => items.first().and_then(coerce_key),
        Value::Null | Value::Object(_) => None,
    }
}

/// Whole floats print without a fraction, matching `String(2.0) === "2"`.
fn number_key(number: &Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            format!("{}", float as i64)
        }
        _ => number.to_string(),
    }
}

impl From<Value> for AnswerValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => AnswerValue::Single(text),
            Value::Null => AnswerValue::Unanswered,
            other => AnswerValue::Other(other),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Single(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Single(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(values: Vec<String>) -> Self {
        AnswerValue::Multiple(values)
    }
}

/// Questionnaire answers keyed by form field name.
///
/// Unknown keys are carried through untouched so the raw payload can be persisted as
/// submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, AnswerValue>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: Question, value: impl Into<AnswerValue>) {
        self.0.insert(question.key().to_string(), value.into());
    }

    pub fn with(mut self, question: Question, value: impl Into<AnswerValue>) -> Self {
        self.insert(question, value);
        self
    }

    pub fn get(&self, question: Question) -> Option<&AnswerValue> {
        self.0.get(question.key())
    }

    pub fn selected(&self, question: Question) -> Option<Cow<'_, str>> {
        self.get(question).and_then(AnswerValue::selected)
    }

    /// Questions of `schema` without a usable value, in form order.
    pub fn missing(&self, schema: SchemaVersion) -> Vec<Question> {
        schema
            .questions()
            .iter()
            .copied()
            .filter(|question| self.selected(*question).is_none())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<V: Into<AnswerValue>> FromIterator<(Question, V)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (Question, V)>>(iter: I) -> Self {
        let mut answers = AnswerSet::new();
        for (question, value) in iter {
            answers.insert(question, value);
        }
        answers
    }
}
