/// Prompt construction for live assistant engines
///
/// Scripted engines ignore prompts; a live engine sends these verbatim. The
/// response schemas here must stay in sync with the wire types in
/// [`crate::types`] and the fallback behavior in [`crate::parse`].
use crate::config::AssistantConfig;
use crate::types::MapSnapshot;
use chrono::NaiveDate;

const BRAIN_RESPONSE_SCHEMA: &str = r#"Respond with a single JSON object:
{
  "reply": "<conversational answer shown to the user>",
  "suggestedChanges": {
    "nodesToAdd": [{"id": "<kebab-case id>", "label": "...", "kind": "concept|task|person|event|resource", "description": "...", "icon": "...", "date": "YYYY-MM-DD", "reminderDate": "YYYY-MM-DDTHH:MM", "isCompleted": false, "priority": "high|medium|low"}],
    "nodesToUpdate": [{"id": "<existing node id>", "label": "...", "date": "YYYY-MM-DD or null to clear"}],
    "edgesToAdd": [{"id": "<edge id>", "source": "<node id>", "target": "<node id>", "label": "..."}],
    "explanation": "<one sentence describing the batch>"
  }
}
Omit "suggestedChanges" entirely when the input needs no map changes."#;

const BRAIN_RULES: &str = r#"Rules:
- Reference existing nodes only by their exact id from the map.
- Give every new node a short, unique, kebab-case id.
- Every new node must arrive with at least one edge in "edgesToAdd" linking it to an existing node.
- Never re-add an id that is already in the map; use "nodesToUpdate" for changes to existing nodes."#;

const EXTRACTION_INSTRUCTIONS: &str = r#"Scan the mind map for actionable items: nodes of kind "task", plus any node carrying a date, reminder, or completion state. Return the complete current task list as a JSON array; the list replaces the previous one entirely.
[{"id": "...", "title": "...", "dueDate": "YYYY-MM-DD", "reminderDate": "YYYY-MM-DDTHH:MM", "urgency": "high|medium|low", "completed": false, "nodeId": "<originating node id>"}]
Omit fields you cannot infer. "nodeId" is required and must be an id present in the map. Output only the JSON array."#;

/// Build the prompt for one chat turn
///
/// `today` anchors relative due-date inference ("next Friday"); live engines
/// pass `Local::now().date_naive()`. The snapshot is truncated to the
/// configured node budget before serialization.
pub fn build_brain_prompt(
    input: &str,
    map: &MapSnapshot,
    config: &AssistantConfig,
    today: NaiveDate,
) -> String {
    let snapshot = map.truncated(config.max_map_nodes);
    let map_json = serde_json::to_string(&snapshot).unwrap_or_default();

    format!(
        "You are the assistant behind a personal mind-map notebook. You answer \
         the user and, when their input describes something worth capturing, \
         propose changes to the map.\n\nToday's date: {today}\n\nCurrent map:\n\
         {map_json}\n\n{BRAIN_RESPONSE_SCHEMA}\n\n{BRAIN_RULES}\n\nUser input:\n{input}"
    )
}

/// Build the prompt for one task-extraction call
pub fn build_extraction_prompt(
    map: &MapSnapshot,
    config: &AssistantConfig,
    today: NaiveDate,
) -> String {
    let snapshot = map.truncated(config.max_map_nodes);
    let map_json = serde_json::to_string(&snapshot).unwrap_or_default();

    format!(
        "Today's date: {today}\n\nCurrent map:\n{map_json}\n\n{EXTRACTION_INSTRUCTIONS}"
    )
}
