//! Built-in prompt templates.
//!
//! Each constant documents the variables it expects. Rendering fails if one
//! is missing.

/// Summarize one chunk of a book.
///
/// Variables: `text`, `target_length`.
pub const SUMMARIZE_CHUNK: &str = r"
Summarize the following text. Keep the key information and core arguments while making the summary clear and coherent.
When the text starts a new chapter, break the structure and add a new chapter heading. The summary should be close to {{ target_length }} characters long.

Text:
{{ text }}

Requirements: every point of the summary needs a heading, and its content should be detailed rather than sketchy.
Preserve the professionalism and accuracy of the original.
";

/// Merge several summaries into one.
///
/// Variables: `summaries`, `target_length`.
pub const COMBINE_SUMMARIES: &str = r"
Merge the following summaries into a single coherent summary. The result should be close to {{ target_length }} characters long.

Summaries:
{{ summaries }}

Requirements:
1. Keep the content coherent and logically ordered
2. Remove repeated information
3. Keep every key argument
4. Adjust the length so the result is close to {{ target_length }} characters
5. Preserve professionalism and accuracy
";

/// Extract the major topics of a text; the model chooses how many.
///
/// Variables: `text_content`.
pub const EXTRACT_CORE_TOPICS: &str = r#"
You are a professional content analyst. Extract the MOST IMPORTANT core insights from the text and turn them into key topics that will later be used to write podcast dialogue scripts.

Text Content:
{{ text_content }}

Requirements:
1. Extract only the MAJOR core topics
2. Focus on high-level, broad themes rather than specific details
3. Combine related ideas into single comprehensive topics
4. Be selective: typically 3-7 topics in total
5. Shorter or simpler books may need fewer topics
6. Each topic needs a concise title and a detailed explanation
7. Topics should connect logically and flow into one another

Output must be valid JSON with this structure:
{"core_topics": [{"topic": "Topic Title", "explanation": "Detailed Explanation", "transition": "Transition to the next topic", "logical_structure": "Logical structure of this topic in the podcast"}]}

Return only the JSON content, no additional text.
"#;

/// Generate topics for a themed episode of a given length.
///
/// Variables: `podcast_theme`, `book_summary`, `duration_minutes`.
pub const GENERATE_CORE_TOPICS: &str = r#"
You are a professional podcast content strategist. Generate core topics for a two-person dialogue podcast based on the following inputs.

Podcast Theme:
{{ podcast_theme }}

Book Summary:
{{ book_summary }}

Expected Duration: {{ duration_minutes }} minutes

Instructions:
1. Generate exactly {% if duration_minutes < 5 %}3{% else %}5{% endif %} topics.
2. Topics should progress logically from basics to practical applications to broader perspectives.
3. Ensure topics are interconnected and flow naturally.
4. Each topic must include a title, a detailed explanation, and an estimated length such as "4 minutes".

Output must be valid JSON with this structure:
{"core_topics": [{"topic": "Topic Title", "explanation": "Detailed Explanation (about N minutes)"}]}

Response must be valid JSON only, no additional text.
Focus on engaging, discussion-worthy topics that match the theme and the book content.
"#;

/// Script for a single selected topic, using host names as speaker labels.
///
/// Variables: `book_summary`, `selected_topic`, `hosts`, `speaker_a`,
/// `speaker_b`, `duration_minutes`, `word_count`.
pub const TOPIC_SCRIPT: &str = r"
You are a professional podcast script writer. Based on the following book summary, selected topic, character profiles, and conversation duration, create a natural, engaging, and informative two-person dialogue podcast script.

Book Summary:
{{ book_summary }}

Selected Topic:
{{ selected_topic }}

Character Profiles:
{{ hosts }}

Conversation Duration: {{ duration_minutes }} minutes (approximately {{ word_count }} words)

Write the script in exactly this format:
****** opening ******
{{ speaker_a }}: (opening remarks)
{{ speaker_b }}: (response)
...
****** content ******
{{ speaker_a }}: (discussing the topic)
{{ speaker_b }}: (responding and deepening the discussion)
...
****** closing ******
{{ speaker_a }}: (summarizing the discussion)
{{ speaker_b }}: (closing remarks)

Requirements:
1. The dialogue flows naturally, like real people talking
2. Include opening remarks, a content section, and closing remarks
3. The characters stay true to their personalities
4. Avoid lengthy monologues and keep it interactive
5. Total length fits a {{ duration_minutes }} minute podcast
6. Plain text only, no markdown
7. Start directly with the dialogue, with no introduction or explanation
";

/// Full emotion-tagged transcript covering every topic.
///
/// Variables: `book_summary`, `core_topics`, `hosts`, `duration_minutes`,
/// `word_count`, `emotions`.
pub const EMOTION_TRANSCRIPT: &str = r"
You are a professional podcast script writer. Based on the following book summary, core topics, and character profiles, create a natural, engaging, and informative two-person dialogue podcast script that reflects each character's personality and stays focused on the book.

Book Summary:
{{ book_summary }}

Core Topics:
{{ core_topics }}

Character Profiles:
{{ hosts }}

Conversation Duration: {{ duration_minutes }} minutes (approximately {{ word_count }} words)

Write the script in exactly this format. Use the letters A and B as speaker tags, never the names:
****** opening ******
A [emotion]: (opening remarks)
B [emotion]: (response)
...
****** content ******
A [emotion]: (discussing the first topic)
B [emotion]: (responding and deepening the discussion)
...
****** content ******
(continue with the next topic)
...
****** closing ******
A [emotion]: (summarizing the discussion)
B [emotion]: (closing remarks)

Requirements:
1. The dialogue flows naturally, like real people talking
2. Put one emotion word in square brackets after every speaker tag, preferably one of: {{ emotions }}
3. Include opening remarks, one content section per topic, and closing remarks
4. Cover every core topic
5. Avoid lengthy monologues and keep it interactive
6. Length and depth fit a {{ duration_minutes }} minute podcast
7. Plain text only, no markdown
";
