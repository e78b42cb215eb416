use askama::Template;

use crate::{domain::Form, error::Result};

struct QuestionRow {
    title: String,
    kind: &'static str,
    required: bool,
    options: Vec<String>,
}

#[derive(Template)]
#[template(path = "forms/preview.txt")]
struct FormPreviewTemplate {
    title: String,
    description: String,
    questions: Vec<QuestionRow>,
}

pub fn render_form(form: &Form) -> Result<String> {
    let template = FormPreviewTemplate {
        title: form.title.clone(),
        description: form.description.clone(),
        questions: form
            .questions
            .iter()
            .map(|q| QuestionRow {
                title: q.title.clone(),
                kind: q.question_type.as_str(),
                required: q.required,
                options: q.options.clone(),
            })
            .collect(),
    };
    Ok(template.render()?)
}
