/// Build the structuring prompt for one report.
///
/// The model is asked for a bare JSON array; observations without reference
/// limits are to be omitted, and the classifier drops them again regardless.
pub fn build_structuring_prompt(raw_text: &str) -> String {
    format!(
        r#"
You are a medical report parser.

From the PDF text below, extract all test results as an array of JSON objects with the following fields:
- test_type (string)
- value (number or string)
- maxlimit (number)
- minlimit (number)
- unit (string or null)
- timestamp (string in original format or ISO)

Instructions:
- The text may contain many test results; extract ALL of them.
- If a field is missing for a test, set its value to null.
- Return ONLY the raw JSON array (no Markdown, no comments, no explanation).
- Do NOT wrap the response in ```json or any code block.
- If test does not have a maxlimit, minlimit skip it.
Example format:
[
  {{
    "test_type": "HAEMOGLOBIN (Hb)",
    "value": 14.9,
    "minlimit": 13.0,
    "maxlimit": 17.0,
    "unit": "gm/dL",
    "timestamp": "10/Apr/2025 05:30PM"
  }}
]

PDF Text:
{raw_text}
"#
    )
}
