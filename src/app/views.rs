//! Server-rendered HTML for the login prompt and the wizard page.

use std::fmt::Write as _;

use base64::Engine as _;
use serde::Serialize;

use crate::app::session::{CONTENT_TYPES, Flash, Progress, WizardSession};
use crate::document::PDF_FILE_NAME;
use crate::workflow::{Action, Stage};

const STYLE: &str = "body{font-family:sans-serif;max-width:860px;margin:2rem auto;padding:0 1rem}\
section{border:1px solid #ccc;border-radius:6px;padding:1rem;margin:1rem 0}\
pre{background:#f6f6f6;padding:.5rem;overflow:auto;max-height:20rem}\
.error{color:#b00020}.notice{color:#1b5e20}\
iframe{width:100%;height:32rem;border:1px solid #ccc}";

pub fn login_page(error: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("<h1>PDF Wizard</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    body.push_str(
        "<form method=\"post\" action=\"/login\">\n\
<label>Password <input type=\"password\" name=\"password\" autofocus></label>\n\
<button type=\"submit\">Enter</button>\n\
</form>\n",
    );
    page("PDF Wizard: login", &body)
}

pub fn wizard_page(wizard: &WizardSession, progress: &Progress) -> String {
    let workflow = &wizard.workflow;
    let stage = workflow.stage();
    let mut body = String::new();

    let _ = writeln!(body, "<h1>PDF Wizard</h1>\n<p>Stage: {}</p>", escape(stage.name()));
    match &wizard.flash {
        Some(Flash::Notice(notice)) => {
            let _ = writeln!(body, "<p class=\"notice\">{}</p>", escape(notice));
        }
        Some(Flash::Error(error)) => {
            let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(error));
        }
        None => {}
    }

    // Topic
    body.push_str("<section>\n<h2>1. Topic</h2>\n<form method=\"post\" action=\"/teasers\">\n");
    let _ = writeln!(
        body,
        "<label>Author <input name=\"author\" value=\"{}\"></label>",
        escape(&wizard.form.author)
    );
    body.push_str("<label>Type <select name=\"content_type\">");
    for content_type in CONTENT_TYPES {
        let selected = if content_type == wizard.form.content_type {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            body,
            "<option{selected}>{}</option>",
            escape(content_type)
        );
    }
    body.push_str("</select></label>\n");
    let _ = writeln!(
        body,
        "<label>Topic <input name=\"topic\" value=\"{}\"></label>",
        escape(&wizard.form.topic)
    );
    body.push_str(&button(stage, Action::RequestTeasers, "Generate teasers"));
    body.push_str("</form>\n</section>\n");

    // Teasers
    body.push_str("<section>\n<h2>2. Teaser</h2>\n");
    if workflow.teasers().is_empty() {
        body.push_str("<p>No teasers yet.</p>\n");
    } else {
        body.push_str("<form method=\"post\" action=\"/teasers/select\">\n<select name=\"teaser\">");
        for (index, teaser) in workflow.teasers().iter().enumerate() {
            let selected = if workflow.selected_index() == Some(index) {
                " selected"
            } else {
                ""
            };
            let _ = write!(
                body,
                "<option value=\"{index}\"{selected}>{} - {}</option>",
                escape(&teaser.title),
                escape(&teaser.subtext)
            );
        }
        body.push_str("</select>\n");
        body.push_str(&button(stage, Action::SelectTeaser, "Select teaser"));
        body.push_str("</form>\n");
    }
    if let Some(teaser) = workflow.selected_teaser() {
        body.push_str(&json_block(teaser));
    }
    body.push_str("</section>\n");

    // Outline
    body.push_str("<section>\n<h2>3. Outline</h2>\n<form method=\"post\" action=\"/outline\">\n");
    body.push_str(&button(stage, Action::RequestOutline, "Generate outline"));
    body.push_str("</form>\n");
    if let Some(outline) = workflow.outline() {
        body.push_str(&json_block(outline));
    }
    body.push_str("</section>\n");

    // Content
    body.push_str("<section>\n<h2>4. Content</h2>\n<form method=\"post\" action=\"/content\">\n");
    body.push_str(&button(stage, Action::GenerateContent, "Generate content"));
    body.push_str("</form>\n");
    if progress.total > 0 {
        body.push_str(&progress_block(progress));
    }
    if let Some(document) = workflow.document() {
        body.push_str(&json_block(document));
    }
    body.push_str("</section>\n");

    // PDF
    body.push_str("<section>\n<h2>5. PDF</h2>\n<form method=\"post\" action=\"/pdf\">\n");
    body.push_str(&button(stage, Action::BuildPdf, "Build PDF"));
    body.push_str("</form>\n");
    if let Some(pdf) = workflow.pdf() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(pdf);
        let _ = writeln!(
            body,
            "<iframe src=\"data:application/pdf;base64,{encoded}\"></iframe>\n\
<p><a href=\"/download\" download=\"{PDF_FILE_NAME}\">Download {PDF_FILE_NAME}</a></p>"
        );
    }
    body.push_str("</section>\n");
    body.push_str(LOGOUT_FORM);

    page("PDF Wizard", &body)
}

/// Shown while a content run holds the session's wizard. Reloads itself.
pub fn busy_page(progress: &Progress) -> String {
    let mut body = String::new();
    body.push_str("<h1>PDF Wizard</h1>\n<p>Content generation is running.</p>\n");
    body.push_str(&progress_block(progress));
    body.push_str(LOGOUT_FORM);
    page_with_head("PDF Wizard: generating", BUSY_REFRESH, &body)
}

const BUSY_REFRESH: &str = "<meta http-equiv=\"refresh\" content=\"2\">";

const LOGOUT_FORM: &str = "<form method=\"post\" action=\"/logout\">\
<button type=\"submit\">Log out</button></form>\n";

fn progress_block(progress: &Progress) -> String {
    let mut block = format!(
        "<p><progress value=\"{}\" max=\"{}\"></progress> {}%</p>\n",
        progress.completed, progress.total, progress.percent
    );
    if let Some(current) = &progress.current {
        let _ = writeln!(block, "<p>Working on {}</p>", escape(current));
    }
    block
}

fn button(stage: Stage, action: Action, label: &str) -> String {
    let disabled = if stage < action.transition().requires {
        " disabled"
    } else {
        ""
    };
    format!("<button type=\"submit\"{disabled}>{}</button>\n", escape(label))
}

fn json_block(value: &impl Serialize) -> String {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|err| format!("<{err}>"));
    format!("<pre>{}</pre>\n", escape(&json))
}

fn page(title: &str, body: &str) -> String {
    page_with_head(title, "", body)
}

fn page_with_head(title: &str, head: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\">{head}<title>{}</title>\
<style>{STYLE}</style></head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
