// Summary generator prompt templates.

pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Extract and return ONLY a valid JSON object (no markdown, no code blocks, no extra text) with the following information from this resume:

Resume text:
{resume_text}

Return a JSON object with this exact structure:
{
  "name": "Full name of the person",
  "currentRole": "Their current job title or target role",
  "experienceYears": <number of years of professional experience>,
  "skills": ["skill1", "skill2", "skill3", ...],
  "education": [
    {
      "degree": "Degree name",
      "institution": "School/University name",
      "graduationYear": <year as number>
    }
  ],
  "summary": "A 2-3 sentence professional summary"
}

Important:
- Return ONLY the JSON object, no other text
- Use realistic estimates if exact information isn't available
- If a field cannot be determined, use reasonable defaults (e.g., empty arrays, "Not specified", 0)
- Ensure experienceYears and graduationYear are whole numbers, not strings
- List skills from most to least relevant"#;
