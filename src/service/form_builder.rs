use chrono::Utc;
use uuid::Uuid;

use crate::{
    domain::{Form, MoveDirection, Question, QuestionEdit, QuestionType},
    error::{AppError, Result},
};

/// Draft form being edited by an admin. Nothing here talks to the backend;
/// published forms only land in a local `FormLibrary`.
#[derive(Debug, Clone)]
pub struct FormBuilder {
    title: String,
    description: String,
    questions: Vec<Question>,
}

impl FormBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            questions: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Appends an untitled question and returns its id.
    pub fn add_question(&mut self, question_type: QuestionType) -> Uuid {
        let id = Uuid::new_v4();
        self.questions.push(Question {
            id,
            title: String::new(),
            question_type,
            options: initial_options(question_type),
            required: false,
        });
        id
    }

    pub fn update_question(&mut self, id: Uuid, edit: QuestionEdit) -> Result<()> {
        let question = self.question_mut(id)?;

        if let Some(title) = edit.title {
            question.title = title;
        }
        if let Some(required) = edit.required {
            question.required = required;
        }
        if let Some(question_type) = edit.question_type {
            if !question_type.has_options() {
                question.options.clear();
            } else if question.options.is_empty() {
                question.options = initial_options(question_type);
            }
            question.question_type = question_type;
        }

        Ok(())
    }

    pub fn remove_question(&mut self, id: Uuid) -> Result<()> {
        let index = self.index_of(id)?;
        self.questions.remove(index);
        Ok(())
    }

    /// Moving past either end is a no-op.
    pub fn move_question(&mut self, id: Uuid, direction: MoveDirection) -> Result<()> {
        let index = self.index_of(id)?;
        match direction {
            MoveDirection::Up if index > 0 => self.questions.swap(index, index - 1),
            MoveDirection::Down if index + 1 < self.questions.len() => {
                self.questions.swap(index, index + 1)
            }
            _ => {}
        }
        Ok(())
    }

    pub fn add_option(&mut self, id: Uuid, option: impl Into<String>) -> Result<()> {
        let question = self.choice_question_mut(id)?;
        question.options.push(option.into());
        Ok(())
    }

    pub fn update_option(&mut self, id: Uuid, index: usize, option: impl Into<String>) -> Result<()> {
        let question = self.choice_question_mut(id)?;
        let slot = question
            .options
            .get_mut(index)
            .ok_or_else(|| AppError::InvalidInput(format!("No option at position {}", index)))?;
        *slot = option.into();
        Ok(())
    }

    pub fn remove_option(&mut self, id: Uuid, index: usize) -> Result<()> {
        let question = self.choice_question_mut(id)?;
        if index >= question.options.len() {
            return Err(AppError::InvalidInput(format!("No option at position {}", index)));
        }
        question.options.remove(index);
        Ok(())
    }

    /// Checks the draft is complete and freezes it into a `Form`.
    pub fn publish(&self) -> Result<Form> {
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidInput("Form title is required".to_string()));
        }
        if self.questions.is_empty() {
            return Err(AppError::InvalidInput("Add at least one question".to_string()));
        }

        for (position, question) in self.questions.iter().enumerate() {
            if question.title.trim().is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "Question {} needs a title",
                    position + 1
                )));
            }
            if question.question_type.has_options()
                && !question.options.iter().any(|o| !o.trim().is_empty())
            {
                return Err(AppError::InvalidInput(format!(
                    "Question {} needs at least one option",
                    position + 1
                )));
            }
        }

        let questions = self
            .questions
            .iter()
            .cloned()
            .map(|mut q| {
                q.options.retain(|o| !o.trim().is_empty());
                q
            })
            .collect();

        Ok(Form {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            questions,
            published_at: Some(Utc::now()),
        })
    }

    fn index_of(&self, id: Uuid) -> Result<usize> {
        self.questions
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| AppError::InvalidInput("Question not found".to_string()))
    }

    fn question_mut(&mut self, id: Uuid) -> Result<&mut Question> {
        self.questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| AppError::InvalidInput("Question not found".to_string()))
    }

    fn choice_question_mut(&mut self, id: Uuid) -> Result<&mut Question> {
        let question = self.question_mut(id)?;
        if !question.question_type.has_options() {
            return Err(AppError::InvalidInput(format!(
                "{} questions do not take options",
                question.question_type.as_str()
            )));
        }
        Ok(question)
    }
}

fn initial_options(question_type: QuestionType) -> Vec<String> {
    if question_type.has_options() {
        vec![String::new()]
    } else {
        Vec::new()
    }
}

/// Forms published during this session, newest first.
#[derive(Debug, Default)]
pub struct FormLibrary {
    forms: Vec<Form>,
}

impl FormLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, builder: &FormBuilder) -> Result<Form> {
        let form = builder.publish()?;
        tracing::info!("Published form {} ({} questions)", form.title, form.questions.len());
        self.forms.insert(0, form.clone());
        Ok(form)
    }

    pub fn forms(&self) -> &[Form] {
        &self.forms
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.forms.len();
        self.forms.retain(|f| f.id != id);
        self.forms.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(builder: &mut FormBuilder, question_type: QuestionType, title: &str) -> Uuid {
        let id = builder.add_question(question_type);
        builder
            .update_question(id, QuestionEdit { title: Some(title.to_string()), ..Default::default() })
            .unwrap();
        id
    }

    #[test]
    fn test_choice_questions_start_with_one_option() {
        let mut builder = FormBuilder::new("Check-in");
        let text = builder.add_question(QuestionType::ShortText);
        let choice = builder.add_question(QuestionType::MultipleChoice);

        assert!(builder.questions()[0].options.is_empty());
        assert_eq!(builder.questions()[1].options, vec![String::new()]);
        assert!(builder.add_option(text, "nope").is_err());
        assert!(builder.add_option(choice, "Yes").is_ok());
    }

    #[test]
    fn test_switching_to_text_clears_options() {
        let mut builder = FormBuilder::new("Check-in");
        let id = builder.add_question(QuestionType::Checkbox);
        builder.update_option(id, 0, "Sleep").unwrap();
        builder.add_option(id, "Exercise").unwrap();

        builder
            .update_question(id, QuestionEdit { question_type: Some(QuestionType::LongText), ..Default::default() })
            .unwrap();
        assert!(builder.questions()[0].options.is_empty());
    }

    #[test]
    fn test_move_question() {
        let mut builder = FormBuilder::new("Order");
        let first = titled(&mut builder, QuestionType::ShortText, "First");
        let second = titled(&mut builder, QuestionType::ShortText, "Second");

        builder.move_question(second, MoveDirection::Up).unwrap();
        assert_eq!(builder.questions()[0].id, second);

        // Already at the top.
        builder.move_question(second, MoveDirection::Up).unwrap();
        assert_eq!(builder.questions()[0].id, second);

        builder.move_question(first, MoveDirection::Down).unwrap();
        assert_eq!(builder.questions()[1].id, first);
    }

    #[test]
    fn test_publish_validation() {
        let mut builder = FormBuilder::new("  ");
        assert!(builder.publish().is_err());

        builder.set_title("Wellbeing survey");
        assert!(builder.publish().is_err());

        let id = titled(&mut builder, QuestionType::MultipleChoice, "How are you?");
        let err = builder.publish().unwrap_err();
        assert!(err.to_string().contains("option"));

        builder.update_option(id, 0, "Good").unwrap();
        builder.add_option(id, "").unwrap();
        let form = builder.publish().unwrap();
        assert_eq!(form.questions[0].options, vec!["Good".to_string()]);
        assert!(form.published_at.is_some());
    }

    #[test]
    fn test_library_keeps_newest_first() {
        let mut library = FormLibrary::new();
        let mut builder = FormBuilder::new("One");
        titled(&mut builder, QuestionType::ShortText, "Q");
        let first = library.publish(&builder).unwrap();

        builder.set_title("Two");
        let second = library.publish(&builder).unwrap();

        assert_eq!(library.forms()[0].id, second.id);
        assert!(library.remove(first.id));
        assert_eq!(library.forms().len(), 1);
    }

    #[test]
    fn test_remove_unknown_question() {
        let mut builder = FormBuilder::new("Form");
        assert!(builder.remove_question(Uuid::new_v4()).is_err());
    }
}
