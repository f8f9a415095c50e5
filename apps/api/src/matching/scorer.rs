//! Recommendation Scoring — ranks existing communities for one user by
//! interest affinity.
//!
//! Default: `LexicalMatchScorer` (pure-Rust, deterministic, fully testable).
//! `GenerativeMatchScorer` consults the completion provider for richer
//! reasoning and labels, degrading to the lexical output on any failure.
//! Scoring never fails and mutates no shared state; identical inputs yield
//! identical output.
//!
//! Calibration: raw overlap percentages act only as the 50% pass/fail gate.
//! Every surfaced score is floored at 75 and capped at 100, so the scores the
//! UI shows cluster high. Deliberate product behavior (see DESIGN.md).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::completion::{complete_json, CompletionError, TextCompletionProvider};
use crate::matching::interests::{community_tokens, matching_interests};
use crate::matching::prompts::{SCORING_PROMPT_TEMPLATE, SCORING_SYSTEM};
use crate::models::community::Community;
use crate::models::user::User;

/// Raw-overlap gate: a community must match at least this percentage of the
/// user's interests to be recommended at all.
pub const MIN_MATCH_PERCENT: u32 = 50;

/// Floor applied to every surfaced score.
pub const SCORE_FLOOR: u32 = 75;

/// Score assigned when either side has nothing to compare — the user has no
/// interests or the community text yields no tokens. An automatic pass:
/// recommendations must never starve.
pub const DEFAULT_SCORE: u32 = 75;

const MAX_SCORE: u32 = 100;
const MAX_REASONING_TERMS: usize = 3;

/// Ephemeral result of scoring one (user, community) pair. Request-scoped,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub community_id: Uuid,
    pub community_name: String,
    /// Always within [0, 100]; surfaced values sit in [75, 100].
    pub match_score: u32,
    pub reasoning: String,
    pub personalized_description: String,
    pub suggested_role: String,
    pub connection_type: String,
    pub growth_potential: String,
}

/// The scorer seam. Implement this to swap backends without touching the
/// endpoint or handler code. Carried in `AppState` as `Arc<dyn MatchScorer>`.
///
/// Infallible by contract: implementations recover every internal failure and
/// return a (possibly empty) recommendation list.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, user: &User, communities: &[Community]) -> Vec<Recommendation>;
}

// ────────────────────────────────────────────────────────────────────────────
// LexicalMatchScorer — deterministic default
// ────────────────────────────────────────────────────────────────────────────

/// Pure lexical-overlap scorer. Fast, deterministic, no completion calls.
pub struct LexicalMatchScorer;

#[async_trait]
impl MatchScorer for LexicalMatchScorer {
    async fn score(&self, user: &User, communities: &[Community]) -> Vec<Recommendation> {
        score_lexical(user, communities)
    }
}

/// Core lexical algorithm:
/// 1. Tokenize the community's description + category
/// 2. Raw overlap = matched interests / total interests, as a percentage
/// 3. Empty interests or empty tokens → automatic pass at the default score
/// 4. Gate at 50% raw overlap; surfaced scores floored at 75, capped at 100
/// 5. Reasoning lists the first three overlapping terms
pub(crate) fn score_lexical(user: &User, communities: &[Community]) -> Vec<Recommendation> {
    let interests = user.interest_pool();
    communities
        .iter()
        .filter_map(|community| score_one(&interests, community))
        .collect()
}

fn score_one(interests: &[String], community: &Community) -> Option<Recommendation> {
    let tokens = community_tokens(&community.description, &community.category);

    if interests.is_empty() || tokens.is_empty() {
        return Some(default_pass(community));
    }

    let matched = matching_interests(interests, &tokens);
    let raw_percent = matched.len() as f64 / interests.len() as f64 * 100.0;

    if raw_percent < MIN_MATCH_PERCENT as f64 {
        return None;
    }

    let match_score = (raw_percent.round() as u32).clamp(SCORE_FLOOR, MAX_SCORE);
    let terms = matched
        .iter()
        .take(MAX_REASONING_TERMS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    Some(Recommendation {
        community_id: community.id,
        community_name: community.name.clone(),
        match_score,
        reasoning: format!("Shares your interest in {terms}"),
        personalized_description: format!(
            "{} — a natural fit for your interest in {terms}",
            community.description
        ),
        suggested_role: suggested_role(matched.len()),
        connection_type: connection_type(matched.len()),
        growth_potential: growth_potential(community.member_count),
    })
}

/// Automatic pass when there is nothing to compare.
fn default_pass(community: &Community) -> Recommendation {
    Recommendation {
        community_id: community.id,
        community_name: community.name.clone(),
        match_score: DEFAULT_SCORE,
        reasoning: "A welcoming community worth exploring while your interests fill in"
            .to_string(),
        personalized_description: community.description.clone(),
        suggested_role: "member".to_string(),
        connection_type: connection_type(0),
        growth_potential: growth_potential(community.member_count),
    }
}

fn suggested_role(matched: usize) -> String {
    if matched >= 3 { "organizer" } else { "member" }.to_string()
}

fn connection_type(matched: usize) -> String {
    match matched {
        0 => "new horizons",
        1 => "common ground",
        _ => "shared interests",
    }
    .to_string()
}

fn growth_potential(member_count: i32) -> String {
    if member_count < 25 {
        "emerging"
    } else if member_count < 100 {
        "growing"
    } else {
        "established"
    }
    .to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// GenerativeMatchScorer — provider-backed, lexical degradation
// ────────────────────────────────────────────────────────────────────────────

/// Scorer that asks the completion provider for reasoning and labels. The
/// reply is re-validated against the same contract the lexical path enforces:
/// unknown community ids are discarded, scores are gated at 50 and clamped
/// into [75, 100], blank labels are backfilled deterministically. Any
/// provider failure degrades to `score_lexical` for the same inputs.
pub struct GenerativeMatchScorer {
    provider: Arc<dyn TextCompletionProvider>,
}

/// One entry of the provider's scoring reply.
#[derive(Debug, Deserialize)]
struct ScoredReply {
    community_id: Uuid,
    match_score: u32,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    personalized_description: String,
    #[serde(default)]
    suggested_role: String,
    #[serde(default)]
    connection_type: String,
    #[serde(default)]
    growth_potential: String,
}

impl GenerativeMatchScorer {
    pub fn new(provider: Arc<dyn TextCompletionProvider>) -> Self {
        Self { provider }
    }

    async fn score_via_provider(
        &self,
        interests: &[String],
        communities: &[Community],
    ) -> Result<Vec<Recommendation>, CompletionError> {
        let prompt = build_scoring_prompt(interests, communities)?;
        let replies: Vec<ScoredReply> =
            complete_json(self.provider.as_ref(), &prompt, SCORING_SYSTEM).await?;

        let by_id: HashMap<Uuid, &Community> =
            communities.iter().map(|c| (c.id, c)).collect();

        let recommendations = replies
            .into_iter()
            .filter_map(|reply| {
                let community = by_id.get(&reply.community_id)?;
                if reply.match_score < MIN_MATCH_PERCENT {
                    return None;
                }

                // Deterministic values fill anything the provider left blank
                let matched = matching_interests(
                    interests,
                    &community_tokens(&community.description, &community.category),
                );

                Some(Recommendation {
                    community_id: community.id,
                    community_name: community.name.clone(),
                    match_score: reply.match_score.clamp(SCORE_FLOOR, MAX_SCORE),
                    reasoning: non_blank(reply.reasoning, || {
                        format!("Aligned with the {} scene you follow", community.category)
                    }),
                    personalized_description: non_blank(reply.personalized_description, || {
                        community.description.clone()
                    }),
                    suggested_role: non_blank(reply.suggested_role, || {
                        suggested_role(matched.len())
                    }),
                    connection_type: non_blank(reply.connection_type, || {
                        connection_type(matched.len())
                    }),
                    growth_potential: non_blank(reply.growth_potential, || {
                        growth_potential(community.member_count)
                    }),
                })
            })
            .collect();

        Ok(recommendations)
    }
}

#[async_trait]
impl MatchScorer for GenerativeMatchScorer {
    async fn score(&self, user: &User, communities: &[Community]) -> Vec<Recommendation> {
        if communities.is_empty() {
            return Vec::new();
        }

        let interests = user.interest_pool();

        // An interest-less user gets the automatic-pass path; nothing for the
        // provider to reason about.
        if interests.is_empty() || !self.provider.is_available() {
            return score_lexical(user, communities);
        }

        match self.score_via_provider(&interests, communities).await {
            Ok(recommendations) => recommendations,
            Err(e) => {
                warn!(
                    "Scoring via {} failed: {e} — using lexical overlap",
                    self.provider.name()
                );
                score_lexical(user, communities)
            }
        }
    }
}

fn non_blank(value: String, fallback: impl FnOnce() -> String) -> String {
    if value.trim().is_empty() {
        fallback()
    } else {
        value
    }
}

/// Builds the scoring prompt from the interest pool and the community list.
fn build_scoring_prompt(
    interests: &[String],
    communities: &[Community],
) -> Result<String, CompletionError> {
    let interests_json = serde_json::to_string(interests)?;

    let communities_json = serde_json::to_string_pretty(
        &communities
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "description": c.description,
                    "category": c.category,
                    "member_count": c.member_count,
                })
            })
            .collect::<Vec<_>>(),
    )?;

    Ok(SCORING_PROMPT_TEMPLATE
        .replace("{interests_json}", &interests_json)
        .replace("{communities_json}", &communities_json)
        .replace("{min_match}", &MIN_MATCH_PERCENT.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_user(interests: Vec<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            external_id: "firebase|u1".to_string(),
            display_name: "Test".to_string(),
            interests: interests.into_iter().map(str::to_string).collect(),
            latitude: None,
            longitude: None,
            quiz_answers: None,
            created_at: Utc::now(),
        }
    }

    fn make_community(name: &str, description: &str, category: &str, members: i32) -> Community {
        Community {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            member_count: members,
            location: Some("Austin, TX".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_community_list_yields_no_recommendations() {
        let user = make_user(vec!["fitness", "cooking"]);
        assert!(score_lexical(&user, &[]).is_empty());
    }

    #[test]
    fn test_user_without_interests_passes_every_community_at_default_score() {
        let user = make_user(vec![]);
        let communities = vec![
            make_community("Tech Meetup", "Technology meetup for coders", "tech", 40),
            make_community("Book Club", "Monthly fiction reading circle", "literature", 12),
        ];
        let recommendations = score_lexical(&user, &communities);
        assert_eq!(recommendations.len(), 2);
        for rec in &recommendations {
            assert_eq!(rec.match_score, DEFAULT_SCORE);
            assert_eq!(rec.connection_type, "new horizons");
        }
    }

    #[test]
    fn test_full_overlap_passes_gate_with_high_score() {
        let user = make_user(vec!["fitness", "cooking"]);
        let community =
            make_community("Wellness Circle", "A fitness and cooking focused group", "wellness", 28);
        let recommendations = score_lexical(&user, &[community]);
        assert_eq!(recommendations.len(), 1);
        assert!(recommendations[0].match_score >= SCORE_FLOOR);
        assert_eq!(recommendations[0].match_score, 100);
    }

    #[test]
    fn test_zero_overlap_community_is_excluded() {
        let user = make_user(vec!["opera"]);
        let community = make_community("Tech Meetup", "Technology meetup for coders", "tech", 40);
        assert!(score_lexical(&user, &[community]).is_empty());
    }

    #[test]
    fn test_half_overlap_passes_and_surfaces_as_floor() {
        // 1 of 2 interests matched: raw 50% passes the gate, surfaces at 75
        let user = make_user(vec!["fitness", "opera"]);
        let community = make_community("Gym Rats", "A fitness focused group", "wellness", 28);
        let recommendations = score_lexical(&user, &[community]);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].match_score, SCORE_FLOOR);
    }

    #[test]
    fn test_below_gate_overlap_is_excluded() {
        // 1 of 3 interests matched: raw 33% fails the 50% gate
        let user = make_user(vec!["fitness", "opera", "sailing"]);
        let community = make_community("Gym Rats", "A fitness focused group", "wellness", 28);
        assert!(score_lexical(&user, &[community]).is_empty());
    }

    #[test]
    fn test_tokenless_community_passes_at_default_score() {
        // Description and category tokens are all length ≤ 3
        let user = make_user(vec!["fitness"]);
        let community = make_community("???", "a b c d", "art", 5);
        let recommendations = score_lexical(&user, &[community]);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].match_score, DEFAULT_SCORE);
    }

    #[test]
    fn test_reasoning_lists_first_three_overlapping_terms() {
        let user = make_user(vec!["hiking", "camping", "climbing", "photography"]);
        let community = make_community(
            "Outdoor Crew",
            "hiking camping climbing photography adventures",
            "outdoors",
            30,
        );
        let recommendations = score_lexical(&user, &[community]);
        let reasoning = &recommendations[0].reasoning;
        assert!(reasoning.contains("hiking"));
        assert!(reasoning.contains("camping"));
        assert!(reasoning.contains("climbing"));
        assert!(!reasoning.contains("photography"));
    }

    #[test]
    fn test_score_never_exceeds_100() {
        let user = make_user(vec!["chess"]);
        let community = make_community("Chess Club", "chess chess chess", "games", 15);
        let recommendations = score_lexical(&user, &[community]);
        assert!(recommendations[0].match_score <= 100);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let user = make_user(vec!["fitness", "cooking"]);
        let communities = vec![
            make_community("Wellness Circle", "A fitness and cooking focused group", "wellness", 28),
            make_community("Tech Meetup", "Technology meetup for coders", "tech", 40),
        ];
        let first = score_lexical(&user, &communities);
        let second = score_lexical(&user, &communities);
        assert_eq!(first, second);
    }

    #[test]
    fn test_suggested_role_organizer_at_three_matches() {
        let user = make_user(vec!["hiking", "camping", "climbing"]);
        let community =
            make_community("Outdoor Crew", "hiking camping climbing adventures", "outdoors", 30);
        let recommendations = score_lexical(&user, &[community]);
        assert_eq!(recommendations[0].suggested_role, "organizer");
    }

    #[test]
    fn test_growth_potential_label_tracks_member_count() {
        assert_eq!(growth_potential(10), "emerging");
        assert_eq!(growth_potential(50), "growing");
        assert_eq!(growth_potential(250), "established");
    }

    mod generative {
        use super::*;
        use crate::completion::NullProvider;
        use async_trait::async_trait;

        struct StaticProvider(Option<String>);

        #[async_trait]
        impl TextCompletionProvider for StaticProvider {
            fn name(&self) -> &'static str {
                "static"
            }

            fn is_available(&self) -> bool {
                true
            }

            async fn complete(
                &self,
                _prompt: &str,
                _system: &str,
            ) -> Result<String, CompletionError> {
                self.0.clone().ok_or(CompletionError::EmptyContent)
            }
        }

        fn reply_entry(community_id: Uuid, match_score: u32) -> String {
            format!(
                r#"{{"community_id": "{community_id}", "match_score": {match_score},
                    "reasoning": "Shares your love of trails",
                    "personalized_description": "Weekend hikes with your kind of crew",
                    "suggested_role": "member",
                    "connection_type": "shared interests",
                    "growth_potential": "growing"}}"#
            )
        }

        #[tokio::test]
        async fn test_provider_failure_degrades_to_lexical_output() {
            let user = make_user(vec!["fitness", "cooking"]);
            let communities = vec![make_community(
                "Wellness Circle",
                "A fitness and cooking focused group",
                "wellness",
                28,
            )];
            let scorer = GenerativeMatchScorer::new(Arc::new(StaticProvider(None)));
            assert_eq!(
                scorer.score(&user, &communities).await,
                score_lexical(&user, &communities)
            );
        }

        #[tokio::test]
        async fn test_unavailable_provider_uses_lexical_path() {
            let user = make_user(vec!["fitness"]);
            let communities = vec![make_community(
                "Gym Rats",
                "A fitness focused group",
                "wellness",
                28,
            )];
            let scorer = GenerativeMatchScorer::new(Arc::new(NullProvider));
            assert_eq!(
                scorer.score(&user, &communities).await,
                score_lexical(&user, &communities)
            );
        }

        #[tokio::test]
        async fn test_valid_reply_is_used_and_floored() {
            let community =
                make_community("Trail Crew", "hiking trails and summits", "outdoors", 30);
            let reply = format!("[{}]", reply_entry(community.id, 60));
            let scorer = GenerativeMatchScorer::new(Arc::new(StaticProvider(Some(reply))));
            let user = make_user(vec!["hiking"]);
            let recommendations = scorer.score(&user, &[community]).await;
            assert_eq!(recommendations.len(), 1);
            // 60 passes the gate but surfaces at the floor
            assert_eq!(recommendations[0].match_score, SCORE_FLOOR);
            assert_eq!(recommendations[0].reasoning, "Shares your love of trails");
        }

        #[tokio::test]
        async fn test_reply_below_gate_is_dropped() {
            let community =
                make_community("Tech Meetup", "Technology meetup for coders", "tech", 40);
            let reply = format!("[{}]", reply_entry(community.id, 20));
            let scorer = GenerativeMatchScorer::new(Arc::new(StaticProvider(Some(reply))));
            let user = make_user(vec!["opera"]);
            assert!(scorer.score(&user, &[community]).await.is_empty());
        }

        #[tokio::test]
        async fn test_reply_with_unknown_community_id_is_discarded() {
            let community =
                make_community("Trail Crew", "hiking trails and summits", "outdoors", 30);
            let reply = format!("[{}]", reply_entry(Uuid::new_v4(), 90));
            let scorer = GenerativeMatchScorer::new(Arc::new(StaticProvider(Some(reply))));
            let user = make_user(vec!["hiking"]);
            assert!(scorer.score(&user, &[community]).await.is_empty());
        }

        #[tokio::test]
        async fn test_reply_score_clamped_to_100() {
            let community =
                make_community("Trail Crew", "hiking trails and summits", "outdoors", 30);
            let reply = format!("[{}]", reply_entry(community.id, 150));
            let scorer = GenerativeMatchScorer::new(Arc::new(StaticProvider(Some(reply))));
            let user = make_user(vec!["hiking"]);
            let recommendations = scorer.score(&user, &[community]).await;
            assert_eq!(recommendations[0].match_score, 100);
        }

        #[tokio::test]
        async fn test_blank_labels_are_backfilled() {
            let community =
                make_community("Trail Crew", "hiking trails and summits", "outdoors", 30);
            let reply = format!(
                r#"[{{"community_id": "{}", "match_score": 90}}]"#,
                community.id
            );
            let scorer = GenerativeMatchScorer::new(Arc::new(StaticProvider(Some(reply))));
            let user = make_user(vec!["hiking"]);
            let recommendations = scorer.score(&user, &[community]).await;
            assert_eq!(recommendations.len(), 1);
            let rec = &recommendations[0];
            assert!(!rec.reasoning.is_empty());
            assert!(!rec.personalized_description.is_empty());
            assert_eq!(rec.suggested_role, "member");
            assert_eq!(rec.connection_type, "common ground");
            assert_eq!(rec.growth_potential, "growing");
        }

        #[tokio::test]
        async fn test_interestless_user_bypasses_provider() {
            // Provider would return garbage; the interest-less path never calls it
            let community =
                make_community("Tech Meetup", "Technology meetup for coders", "tech", 40);
            let scorer = GenerativeMatchScorer::new(Arc::new(StaticProvider(Some(
                "not json".to_string(),
            ))));
            let user = make_user(vec![]);
            let recommendations = scorer.score(&user, &[community]).await;
            assert_eq!(recommendations.len(), 1);
            assert_eq!(recommendations[0].match_score, DEFAULT_SCORE);
        }

        #[tokio::test]
        async fn test_empty_community_list_short_circuits() {
            let scorer = GenerativeMatchScorer::new(Arc::new(StaticProvider(Some(
                "not json".to_string(),
            ))));
            let user = make_user(vec!["hiking"]);
            assert!(scorer.score(&user, &[]).await.is_empty());
        }
    }
}
