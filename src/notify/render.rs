//! Summary email content: HTML body plus a plain-text alternative.

use std::fmt::Write;

use crate::models::enums::RangeStatus;
use crate::models::ClassifiedTest;

pub const REPORT_SUBJECT: &str = "🩺 Your DiagNexus Medical Report";

const NO_CRITICAL_MESSAGE: &str = "No critical test results.";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEmail {
    pub subject: String,
    pub html: String,
    pub plain: String,
}

/// Render the patient summary. The critical section always comes first (or
/// a placeholder when there is none); the normal section only when non-empty.
pub fn render_report_email(critical: &[ClassifiedTest], normal: &[ClassifiedTest]) -> ReportEmail {
    ReportEmail {
        subject: REPORT_SUBJECT.to_string(),
        html: render_html(critical, normal),
        plain: render_plain(critical, normal),
    }
}

fn render_html(critical: &[ClassifiedTest], normal: &[ClassifiedTest]) -> String {
    let mut html = String::new();
    html.push_str("<p>Hello,</p>\n");
    html.push_str("<p>Your medical report is now available. Below is a summary:</p>\n");

    if critical.is_empty() {
        let _ = writeln!(html, "<p>{NO_CRITICAL_MESSAGE}</p>");
    } else {
        html.push_str("<h3 style=\"color:red;\">🔴 Critical Tests</h3>\n");
        push_table(&mut html, critical, "#f8d7da");
    }

    if !normal.is_empty() {
        html.push_str("<h3 style=\"color:green;\">✅ Normal Tests</h3>\n");
        push_table(&mut html, normal, "#d4edda");
    }

    html.push_str("<p>For a full report, please log in to your DiagNexus account.</p>\n");
    html.push_str("<p>Regards,<br/>DiagNexus Team</p>\n");
    html
}

fn push_table(html: &mut String, tests: &[ClassifiedTest], header_color: &str) {
    html.push_str(
        "<table border=\"1\" cellpadding=\"5\" cellspacing=\"0\" style=\"border-collapse: collapse; width: 100%;\">\n",
    );
    let _ = writeln!(
        html,
        "<thead><tr style=\"background-color:{header_color};\"><th>Test</th><th>Value</th><th>Reference Range</th><th>Status</th></tr></thead>"
    );
    html.push_str("<tbody>\n");
    for test in tests {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&test.test_type),
            escape_html(&test.display_value()),
            escape_html(&test.display_range()),
            status_chip(test.status),
        );
    }
    html.push_str("</tbody>\n</table>\n");
}

fn status_chip(status: RangeStatus) -> String {
    let (color, background) = match status {
        RangeStatus::Normal => ("#155724", "#d4edda"),
        RangeStatus::Abnormal => ("#721c24", "#f8d7da"),
    };
    format!(
        "<span style=\"display:inline-block;padding:2px 8px;color:{color};background-color:{background};border-radius:12px;font-weight:bold;font-size:0.8em;\">{}</span>",
        status.label()
    )
}

fn render_plain(critical: &[ClassifiedTest], normal: &[ClassifiedTest]) -> String {
    let mut text = String::new();
    text.push_str("Hello,\n\nYour medical report is now available. Below is a summary:\n\n");

    if critical.is_empty() {
        let _ = writeln!(text, "{NO_CRITICAL_MESSAGE}\n");
    } else {
        text.push_str("Critical Tests\n");
        push_lines(&mut text, critical);
    }

    if !normal.is_empty() {
        text.push_str("Normal Tests\n");
        push_lines(&mut text, normal);
    }

    text.push_str("For a full report, please log in to your DiagNexus account.\n\nRegards,\nDiagNexus Team\n");
    text
}

fn push_lines(text: &mut String, tests: &[ClassifiedTest]) {
    for test in tests {
        let _ = writeln!(
            text,
            "- {}: {} (range {}) [{}]",
            test.test_type,
            test.display_value(),
            test.display_range(),
            test.status.label()
        );
    }
    text.push('\n');
}

/// Escape text taken from the report before embedding it in HTML.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
