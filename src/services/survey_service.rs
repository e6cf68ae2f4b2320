use std::collections::HashMap;

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

use crate::database::surveys_repo;
use crate::error::AppError;
use crate::models::{SurveyQuestion, SurveyRow};

pub fn parse_questions(row: &SurveyRow) -> Vec<SurveyQuestion> {
    match serde_json::from_str(&row.questions) {
        Ok(questions) => questions,
        Err(e) => {
            warn!("Unparseable survey questions for {}: {}", row.id, e);
            Vec::new()
        }
    }
}

/// Stores a survey response after checking the answers blob against the
/// question definitions.
pub async fn submit_response(
    pool: &SqlitePool,
    survey_id: &str,
    answers: &serde_json::Map<String, Value>,
) -> Result<(), AppError> {
    let Some(survey) = surveys_repo::load_survey(pool, survey_id).await? else {
        return Err(AppError::NotFound);
    };
    if survey.open == 0 {
        return Err(AppError::Conflict("survey is closed".to_string()));
    }
    let questions = parse_questions(&survey);
    validate_answers(&questions, answers)?;

    let answers_json = Value::Object(answers.clone()).to_string();
    surveys_repo::insert_response(pool, &Uuid::new_v4().to_string(), survey_id, &answers_json)
        .await?;
    Ok(())
}

fn validate_answers(
    questions: &[SurveyQuestion],
    answers: &serde_json::Map<String, Value>,
) -> Result<(), AppError> {
    if answers.is_empty() {
        return Err(AppError::validation("no answers supplied"));
    }
    for (key, value) in answers {
        let Some(question) = questions.iter().find(|q| q.id == *key) else {
            return Err(AppError::validation(format!("unknown question: {}", key)));
        };
        match question.kind.as_str() {
            "single_choice" => {
                let Some(choice) = value.as_str() else {
                    return Err(AppError::validation(format!(
                        "answer to '{}' must be a string",
                        question.prompt
                    )));
                };
                if !question.options.iter().any(|o| o == choice) {
                    return Err(AppError::validation(format!(
                        "'{}' is not an option for '{}'",
                        choice, question.prompt
                    )));
                }
            }
            "multi_choice" => {
                let Some(choices) = value.as_array() else {
                    return Err(AppError::validation(format!(
                        "answer to '{}' must be a list",
                        question.prompt
                    )));
                };
                for choice in choices {
                    let valid = choice
                        .as_str()
                        .map(|c| question.options.iter().any(|o| o == c))
                        .unwrap_or(false);
                    if !valid {
                        return Err(AppError::validation(format!(
                            "invalid option for '{}'",
                            question.prompt
                        )));
                    }
                }
            }
            _ => {
                if !value.is_string() {
                    return Err(AppError::validation(format!(
                        "answer to '{}' must be a string",
                        question.prompt
                    )));
                }
            }
        }
    }
    Ok(())
}

pub struct OptionCountView {
    pub label: String,
    pub count: i64,
}

pub struct QuestionAnalyticsView {
    pub prompt: String,
    pub kind: String,
    pub answered: i64,
    pub option_counts: Vec<OptionCountView>,
    pub text_answers: Vec<String>,
}

pub struct SurveyAnalyticsView {
    pub survey_id: String,
    pub title: String,
    pub open: bool,
    pub response_count: i64,
    pub questions: Vec<QuestionAnalyticsView>,
}

/// Per-question aggregation over all stored responses: option tallies for
/// choice questions, the raw answer list for freeform text.
pub async fn build_survey_analytics(
    pool: &SqlitePool,
    survey_id: &str,
) -> sqlx::Result<Option<SurveyAnalyticsView>> {
    let Some(survey) = surveys_repo::load_survey(pool, survey_id).await? else {
        return Ok(None);
    };
    let questions = parse_questions(&survey);
    let responses = surveys_repo::list_responses(pool, survey_id).await?;

    let answer_blobs: Vec<serde_json::Map<String, Value>> = responses
        .iter()
        .filter_map(|r| serde_json::from_str(&r.answers).ok())
        .collect();

    let question_views = aggregate_questions(&questions, &answer_blobs);

    Ok(Some(SurveyAnalyticsView {
        survey_id: survey.id,
        title: survey.title,
        open: survey.open == 1,
        response_count: responses.len() as i64,
        questions: question_views,
    }))
}

fn aggregate_questions(
    questions: &[SurveyQuestion],
    responses: &[serde_json::Map<String, Value>],
) -> Vec<QuestionAnalyticsView> {
    questions
        .iter()
        .map(|question| {
            let mut counts: HashMap<&str, i64> = HashMap::new();
            let mut text_answers = Vec::new();
            let mut answered = 0;

            for blob in responses {
                let Some(value) = blob.get(&question.id) else {
                    continue;
                };
                answered += 1;
                match question.kind.as_str() {
                    "single_choice" => {
                        if let Some(choice) = value.as_str() {
                            if let Some(option) =
                                question.options.iter().find(|o| o.as_str() == choice)
                            {
                                *counts.entry(option.as_str()).or_default() += 1;
                            }
                        }
                    }
                    "multi_choice" => {
                        let choices = value.as_array().cloned().unwrap_or_default();
                        for choice in choices.iter().filter_map(|c| c.as_str()) {
                            if let Some(option) =
                                question.options.iter().find(|o| o.as_str() == choice)
                            {
                                *counts.entry(option.as_str()).or_default() += 1;
                            }
                        }
                    }
                    _ => {
                        if let Some(text) = value.as_str() {
                            if !text.trim().is_empty() {
                                text_answers.push(text.to_string());
                            }
                        }
                    }
                }
            }

            // Options keep their authored order, zero counts included.
            let option_counts = question
                .options
                .iter()
                .map(|o| OptionCountView {
                    label: o.clone(),
                    count: counts.get(o.as_str()).copied().unwrap_or(0),
                })
                .collect();

            QuestionAnalyticsView {
                prompt: question.prompt.clone(),
                kind: question.kind.clone(),
                answered,
                option_counts,
                text_answers,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<SurveyQuestion> {
        serde_json::from_str(
            r#"[
                {"id":"q1","prompt":"How was it?","kind":"single_choice","options":["Good","Bad"]},
                {"id":"q2","prompt":"Which sessions?","kind":"multi_choice","options":["Art","Sport"]},
                {"id":"q3","prompt":"Anything else?","kind":"text"}
            ]"#,
        )
        .unwrap()
    }

    fn blob(raw: &str) -> serde_json::Map<String, Value> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn answers_must_match_known_questions_and_options() {
        let qs = questions();
        assert!(validate_answers(&qs, &blob(r#"{"q1":"Good"}"#)).is_ok());
        assert!(validate_answers(&qs, &blob(r#"{"q1":"Meh"}"#)).is_err());
        assert!(validate_answers(&qs, &blob(r#"{"q9":"Good"}"#)).is_err());
        assert!(validate_answers(&qs, &blob(r#"{"q2":["Art","Sport"]}"#)).is_ok());
        assert!(validate_answers(&qs, &blob(r#"{"q2":["Maths"]}"#)).is_err());
        assert!(validate_answers(&qs, &blob(r#"{"q3":42}"#)).is_err());
        assert!(validate_answers(&qs, &blob(r#"{}"#)).is_err());
    }

    #[test]
    fn aggregation_tallies_options_in_authored_order() {
        let qs = questions();
        let responses = vec![
            blob(r#"{"q1":"Good","q2":["Art"],"q3":"Lovely day"}"#),
            blob(r#"{"q1":"Good","q2":["Art","Sport"]}"#),
            blob(r#"{"q1":"Bad","q3":"  "}"#),
        ];
        let views = aggregate_questions(&qs, &responses);

        assert_eq!(views[0].answered, 3);
        assert_eq!(views[0].option_counts[0].label, "Good");
        assert_eq!(views[0].option_counts[0].count, 2);
        assert_eq!(views[0].option_counts[1].count, 1);

        assert_eq!(views[1].answered, 2);
        assert_eq!(views[1].option_counts[0].count, 2); // Art
        assert_eq!(views[1].option_counts[1].count, 1); // Sport

        // Whitespace-only text answers are dropped.
        assert_eq!(views[2].text_answers, vec!["Lovely day"]);
    }
}
