pub const SYSTEM_PROMPT: &str = "You are an academic assistant that reads course syllabi and \
extracts the topics a student needs to study. Always respond with a single valid JSON object.";

/// Builds the user message asking for `{"topics": [{"title", "keywords"}]}`.
pub fn build_user_prompt(syllabus: &str) -> String {
    format!(
        r#"Extract the study topics from the syllabus below.

Return a JSON object with exactly this shape:
{{"topics": [{{"title": "Topic title", "keywords": ["keyword", "keyword"]}}]}}

Rules:
- Return between 5 and 15 topics.
- Order topics from introductory to advanced, following the course progression.
- Use short, specific titles (at most 8 words).
- Give each topic 2 to 6 keywords naming the concepts it covers.
- Skip administrative sections such as grading, attendance, office hours, policies and contact details.
- Do not invent topics that are not supported by the syllabus.

Syllabus:
"""
{syllabus}
""""#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_syllabus_and_shape() {
        let prompt = build_user_prompt("Week 1: Graph theory");
        assert!(prompt.contains("Week 1: Graph theory"));
        assert!(prompt.contains(r#"{"topics": [{"title""#));
        assert!(prompt.contains("between 5 and 15 topics"));
    }
}
