#![allow(dead_code)]

// All completion prompt constants for the Matching module.
// Templates use {placeholder} tokens replaced before sending.

/// System prompt for community generation — enforces JSON-only output.
pub const GENERATION_SYSTEM: &str =
    "You are a community builder designing local interest groups for a social \
    discovery app. \
    You MUST respond with valid JSON only — a JSON array of community objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Community generation prompt template.
/// Replace: {count}, {location}, {interest_summary}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"Design {count} community proposals for people near {location}.

POPULATION INTEREST SUMMARY (most common first):
{interest_summary}

Return a JSON ARRAY with this EXACT schema (no extra fields):
[
  {
    "name": "Sunrise Trail Crew",
    "description": "Weekend hiking and trail-running meetups exploring nearby parks and ridgelines",
    "category": "outdoors",
    "estimated_members": 24,
    "suggested_location": "{location}",
    "reasoning": "Hiking and running rank highly in the population's interests"
  }
]

Rules:
1. Exactly {count} communities, each with a distinct category
2. Descriptions must mention the concrete activities and interests the community is built around
3. `estimated_members` is a plausible starting size between 10 and 60
4. `suggested_location` is "{location}" for every community
5. `reasoning` explains which population interests the community serves
6. Names must be inviting and specific — never generic like "Fun Group""#;

/// System prompt for recommendation scoring — enforces JSON-only output.
pub const SCORING_SYSTEM: &str =
    "You are a matchmaker connecting a person to local interest communities. \
    You MUST respond with valid JSON only — a JSON array of recommendation objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Recommendation scoring prompt template.
/// Replace: {interests_json}, {communities_json}, {min_match}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Score how well each community matches this person's interests.

PERSON'S INTERESTS:
{interests_json}

COMMUNITIES (score each against the interests):
{communities_json}

Return a JSON ARRAY with this EXACT schema (no extra fields):
[
  {
    "community_id": "the-exact-id-uuid-from-the-community-list",
    "match_score": 82,
    "reasoning": "Shares your interest in hiking and photography",
    "personalized_description": "A weekend hiking crew where your trail photography would fit right in",
    "suggested_role": "member",
    "connection_type": "shared interests",
    "growth_potential": "growing"
  }
]

HARD RULES:
1. EVERY object MUST have `community_id` matching one of the id values above — no exceptions
2. `match_score` is an integer from 0 to 100
3. OMIT any community scoring below {min_match} — do not return it with a low score
4. `reasoning` names the person's specific interests the community serves
5. `suggested_role` is "member" or "organizer"; pick "organizer" only for exceptionally strong matches
6. `connection_type` and `growth_potential` are short lowercase labels"#;
