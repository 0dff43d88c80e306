//! Instruction template sent to the model.

/// Fixed preamble: the exact JSON shape and the output rules.
const FORM_INSTRUCTIONS: &str = r#"You are a form schema generator.

STRICT OUTPUT FORMAT (MANDATORY):
Return a JSON OBJECT with EXACTLY this structure:

{
  "title": "string",
  "fields": [
    {
      "label": "string",
      "name": "string",
      "type": "text | number | email | textarea",
      "required": boolean,
      "meta": ["string"]
    }
  ]
}

RULES:
- Do NOT return an array at top level
- Do NOT return markdown
- Do NOT return explanations
- JSON only"#;

/// Marker that precedes the caller's text.
pub const USER_REQUEST_MARKER: &str = "USER REQUEST:";

/// Wrap a caller's request in the form-generation instructions.
///
/// The request is appended verbatim after [`USER_REQUEST_MARKER`]. Any text is
/// accepted, including the empty string.
pub fn build_form_prompt(user_prompt: &str) -> String {
    let mut prompt = String::with_capacity(
        FORM_INSTRUCTIONS.len() + USER_REQUEST_MARKER.len() + user_prompt.len() + 4,
    );
    prompt.push_str(FORM_INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(USER_REQUEST_MARKER);
    prompt.push('\n');
    prompt.push_str(user_prompt);
    prompt.push('\n');
    prompt
}
