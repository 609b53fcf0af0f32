//! Standalone HTML page for a rendered quiz.
//!
//! The template is registered under a `.html` name so tera autoescapes every
//! interpolated value; question text comes from a model and must not be able
//! to inject markup.

use crate::error::QuizError;
use crate::render::QuizView;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "quiz.html";

const QUIZ_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<style>
  body { font-family: Helvetica, Arial, sans-serif; background: #f1f5f9; color: #1f2937; margin: 0; padding: 32px; }
  main { max-width: 896px; margin: 0 auto; background: #fff; border-radius: 16px; padding: 40px; }
  h1 { text-align: center; margin-top: 0; }
  section { background: #f8fafc; border: 1px solid #e2e8f0; border-radius: 12px; margin-bottom: 40px; }
  section > h2 { background: #f1f5f9; margin: 0; padding: 16px; border-bottom: 1px solid #e2e8f0; font-size: 1.4em; }
  .items { padding: 20px; }
  .mcq { background: #fff; border: 1px solid #e2e8f0; border-radius: 12px; padding: 20px; margin-bottom: 20px; }
  .num { color: #4f46e5; font-weight: 700; margin-right: 6px; }
  .question { font-weight: 600; font-size: 1.1em; margin: 0 0 14px; }
  .options { display: grid; grid-template-columns: 1fr 1fr; gap: 10px; }
  .option { background: #f8fafc; border: 1px solid #e2e8f0; border-radius: 8px; padding: 10px; font-size: 0.9em; }
  .letter { font-family: monospace; font-weight: 700; color: #4f46e5; margin-right: 10px; }
  .answer { margin-top: 14px; background: #f0fdf4; border: 1px solid #bbf7d0; border-radius: 8px; padding: 10px; color: #166534; font-size: 0.9em; }
  .tf { display: flex; justify-content: space-between; align-items: flex-start; padding: 14px 0; border-bottom: 1px solid #e2e8f0; }
  .tf:last-child { border-bottom: none; }
  .badge { font-weight: 700; font-size: 0.85em; padding: 4px 12px; border-radius: 999px; white-space: nowrap; }
  .badge.true { background: #dcfce7; color: #166534; border: 1px solid #bbf7d0; }
  .badge.false { background: #fee2e2; color: #991b1b; border: 1px solid #fecaca; }
</style>
</head>
<body>
<main>
<h1>{{ title }}</h1>
{% for section in sections %}
<section>
  <h2>{{ section.title }}</h2>
  <div class="items">
  {% if section.kind == "multiple_choice" %}
    {% for item in section.items %}
    <div class="mcq">
      <p class="question"><span class="num">{{ item.number }}.</span> {{ item.question }}</p>
      <div class="options">
        {% for option in item.options %}
        <div class="option"><span class="letter">{{ option.letter }}</span>{{ option.text }}</div>
        {% endfor %}
      </div>
      <div class="answer"><strong>Correct Answer:</strong> {{ item.answer }}</div>
    </div>
    {% endfor %}
  {% else %}
    {% for item in section.items %}
    <div class="tf">
      <p class="question"><span class="num">{{ item.number }}.</span> {{ item.question }}</p>
      <span class="badge {% if item.answer %}true{% else %}false{% endif %}">{{ item.badge }}</span>
    </div>
    {% endfor %}
  {% endif %}
  </div>
</section>
{% endfor %}
</main>
</body>
</html>
"#;

/// Render `view` as a complete HTML document titled `title`.
pub fn render_html(view: &QuizView, title: &str) -> Result<String, QuizError> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, QUIZ_TEMPLATE)
        .map_err(|e| QuizError::Internal(format!("HTML template parse error: {e}")))?;

    let mut context = Context::from_serialize(view)
        .map_err(|e| QuizError::Internal(format!("HTML template context: {e}")))?;
    context.insert("title", title);

    tera.render(TEMPLATE_NAME, &context)
        .map_err(|e| QuizError::Internal(format!("HTML template rendering failed: {e}")))
}
