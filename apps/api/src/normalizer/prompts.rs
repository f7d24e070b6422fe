// AI normalizer prompt templates.

pub const NORMALIZE_SYSTEM: &str = "\
You are a librarian for a shared collection of AI prompts. \
You receive text that someone copied from a web page, a chat or a document, \
and you turn it into a clean catalog entry. \
You MUST respond with a single valid JSON object only.";

/// Placeholders: `{language}`, `{categories}`, `{raw_text}`.
pub const NORMALIZE_PROMPT: &str = r#"Analyze the pasted text below and produce a catalog entry for the prompt it contains.

PASTED TEXT:
{raw_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "title": "string",
  "category": "string",
  "description": "string",
  "tags": ["string"],
  "text": "string"
}

RULES:
1. "title": if the prompt already has a name that reads like a proper noun or a named method
   (e.g. "The Blindspot Cartographer"), keep it in its original language. Otherwise write a short
   title in {language}.
2. "category": exactly one of: {categories}. Use "Other" if nothing fits.
3. "description": 1-2 sentences in {language} saying what the prompt does.
4. "tags": 3-5 short lowercase keywords in {language}.
5. "text": ONLY the substantive prompt body, copied verbatim. Drop everything around it: page
   navigation, headers and footers, author credits, likes/shares, usage examples and commentary.
   Structural cues mark the body: role/context/instruction sections (e.g. "Role:", "Context:",
   "Instructions:", "<role>"), or an opening such as "You are a...". If no body can be isolated,
   return the pasted text unchanged.
6. Return ONLY the JSON object, nothing else, no code fences."#;
