//! Community Generation — produces candidate community proposals for a
//! catalog refresh cycle.
//!
//! The generative path tailors proposals to the population's interest
//! distribution and location. Every failure mode — no provider configured,
//! transport error, timeout, malformed or empty reply — lands on the curated
//! catalog, so the caller always receives a non-empty list. The UI must never
//! show zero communities.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::completion::{complete_json, CompletionError, TextCompletionProvider};
use crate::matching::interests::interest_distribution;
use crate::matching::prompts::{GENERATION_PROMPT_TEMPLATE, GENERATION_SYSTEM};
use crate::models::user::User;

/// Size of the generated catalog. The curated fallback always returns exactly
/// this many; the generative path is capped at it.
pub const PROPOSAL_COUNT: usize = 5;

/// Location label used when the caller has no coordinate for the population.
pub const VIRTUAL_LOCATION: &str = "Virtual";

/// Interest summary entries passed to the generation prompt. Caps prompt
/// growth for large populations.
const MAX_SUMMARY_INTERESTS: usize = 20;

/// An ephemeral, not-yet-persisted community proposal. Consumed once by the
/// caller and discarded; persistence is the caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityProposal {
    pub name: String,
    pub description: String,
    pub category: String,
    pub estimated_members: u32,
    pub suggested_location: String,
    pub reasoning: String,
}

/// Generates a bounded catalog of community proposals for a population.
///
/// Never fails and never returns an empty list: any provider problem is
/// recovered locally by substituting the curated catalog.
pub async fn generate_communities(
    provider: &dyn TextCompletionProvider,
    users: &[User],
    location: Option<&str>,
) -> Vec<CommunityProposal> {
    let location_label = location.unwrap_or(VIRTUAL_LOCATION);

    if provider.is_available() {
        match generate_via_provider(provider, users, location_label).await {
            Ok(proposals) if !proposals.is_empty() => {
                info!(
                    "Generated {} community proposals via {} for {}",
                    proposals.len(),
                    provider.name(),
                    location_label
                );
                return proposals;
            }
            Ok(_) => {
                warn!("Provider returned no usable proposals — using curated catalog");
            }
            Err(e) => {
                warn!(
                    "Community generation via {} failed: {e} — using curated catalog",
                    provider.name()
                );
            }
        }
    }

    fallback_catalog(location_label)
}

/// Runs the generative path and sanitizes the reply: entries with blank
/// names or descriptions are dropped, the list is capped at
/// `PROPOSAL_COUNT`, and missing locations are backfilled.
async fn generate_via_provider(
    provider: &dyn TextCompletionProvider,
    users: &[User],
    location_label: &str,
) -> Result<Vec<CommunityProposal>, CompletionError> {
    let prompt = build_generation_prompt(users, location_label);

    let proposals: Vec<CommunityProposal> =
        complete_json(provider, &prompt, GENERATION_SYSTEM).await?;

    let sanitized: Vec<CommunityProposal> = proposals
        .into_iter()
        .filter(|p| !p.name.trim().is_empty() && !p.description.trim().is_empty())
        .take(PROPOSAL_COUNT)
        .map(|mut p| {
            if p.suggested_location.trim().is_empty() {
                p.suggested_location = location_label.to_string();
            }
            p
        })
        .collect();

    Ok(sanitized)
}

/// Builds the generation prompt from the population interest summary.
fn build_generation_prompt(users: &[User], location_label: &str) -> String {
    let distribution = interest_distribution(users);

    let interest_summary = if distribution.is_empty() {
        "(no recorded interests yet — propose broadly appealing communities)".to_string()
    } else {
        distribution
            .iter()
            .take(MAX_SUMMARY_INTERESTS)
            .map(|entry| format!("- {} ({} members)", entry.interest, entry.count))
            .collect::<Vec<_>>()
            .join("\n")
    };

    GENERATION_PROMPT_TEMPLATE
        .replace("{count}", &PROPOSAL_COUNT.to_string())
        .replace("{location}", location_label)
        .replace("{interest_summary}", &interest_summary)
}

/// The curated catalog: five general-interest communities, one per category,
/// tagged with the caller's location label.
pub fn fallback_catalog(location_label: &str) -> Vec<CommunityProposal> {
    let catalog = [
        (
            "Trailblazers Outdoor Club",
            "Hiking, camping, climbing, and weekend adventures exploring nearby trails and parks",
            "outdoors",
            32,
            "Broad-appeal outdoor group covering hiking, nature, and adventure interests",
        ),
        (
            "Creative Arts Collective",
            "Painting, photography, music, writing, and crafts — share projects and learn together",
            "arts",
            24,
            "Covers the most common creative interests in one welcoming group",
        ),
        (
            "Wellness & Fitness Circle",
            "Yoga, fitness, meditation, running, and healthy cooking for balanced everyday living",
            "wellness",
            28,
            "Health and wellness interests consistently rank near the top of new populations",
        ),
        (
            "Tech & Makers Meetup",
            "Coding, gaming, robotics, and technology talks for builders and the tech-curious",
            "technology",
            35,
            "Technology interests cluster strongly and benefit from a dedicated space",
        ),
        (
            "Neighborhood Volunteers Hub",
            "Volunteering, local events, and civic projects that give back to the neighborhood",
            "community",
            20,
            "Civic engagement gives newcomers an immediate way to meet people",
        ),
    ];

    catalog
        .into_iter()
        .map(
            |(name, description, category, estimated_members, reasoning)| CommunityProposal {
                name: name.to_string(),
                description: description.to_string(),
                category: category.to_string(),
                estimated_members,
                suggested_location: location_label.to_string(),
                reasoning: reasoning.to_string(),
            },
        )
        .collect()
}
