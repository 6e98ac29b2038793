//! Instruction text appended to generation prompts.

pub const CAREER_GENERATOR: &str = "\
You are an experienced career strategist. Using the profile above, propose 4 \
distinct and realistic career paths. Every path is a JSON object with these fields:
1. id (string)
2. title (string)
3. reason (string): why the path suits this person, citing their strengths and interests
4. confidence (number): a score between 0 and 1
5. lifestyle (string): what an ordinary working day looks like
6. timeline (array): twenty years of milestones starting from where they are now
7. outlook (object): \"entrySalary\", \"midSalary\", \"seniorSalary\", \"demand\" (string), \
\"stability\" (0-100) and \"growth\" (0-100)
8. resources (array): three learning resources to start with

Reply with a bare JSON array of these objects. Do not nest it under a key such as \"careerPaths\".";

pub const LIFE_STORY: &str = "\
You are a warm, grounded storyteller. Using the profile and the chosen career, \
write a three-chapter glimpse of this person's life ten years from now.
Each chapter has:
1. a title
2. narrative text that is vivid, sensory and believable
3. a visual description an illustrator could draw from

Reply with a JSON array of objects keyed \"title\", \"text\" and \"imagePrompt\".
Keep the tone calm, hopeful and wise.";

/// Style prefix for scene sketches. The scene description follows it.
pub const IMAGE_STYLE: &str = "A high-contrast black and white charcoal storyboard sketch \
on plain white paper. Very clean background. Expressive pencil strokes, hand-drawn look, \
graphite texture. The scene depicts: ";

pub const ANSWER_SUGGESTIONS: &str = "\
You are a friendly onboarding guide. The user is unsure how to answer the question above.
Considering the question and any earlier answers, offer 4 varied, realistic and \
considered example answers they could pick or adapt.
Reply with a JSON array of exactly 4 strings.";

pub const ACADEMIC_ANALYZER: &str = "\
You are a senior academic advisor. Review the attached curriculum or academic record \
against the user's profile and the career they are aiming for.
Provide:
1. the courses they should master, each with the reason it matters for their long-term career
2. three recommended master's programs, each with leading universities that offer it
3. an assessment of their GPA or academic progress and what it means for their prospects

Reply as JSON: { \"keyCourses\": [{ \"name\": \"\", \"why\": \"\", \"relevance\": 0-100 }], \
\"masterPrograms\": [{ \"program\": \"\", \"universities\": [\"\"], \"description\": \"\" }], \
\"gpaInsight\": \"\" }";
