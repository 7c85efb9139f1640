//! Perception assembly and rendering.
//!
//! Each awake agent receives a [`PerceptionSnapshot`] built from committed
//! world state: the cell it stands on, other entities within the
//! perception radius, its own stats, the time of day and the weather. A
//! [`PerceptionFormatter`] renders the snapshot to text for the brain.

use std::fmt::Write as _;

use soul_types::{Language, PerceptionSnapshot, VisibleEntity, translate, translate_with};
use soul_world::SpatialMap;

use crate::clock::Clock;

/// Build the snapshot for `agent_id`.
///
/// Returns `None` if `agent_id` is not an agent on `map`. The agent itself
/// is left out of its own nearby list.
pub fn assemble_snapshot(
    map: &SpatialMap,
    clock: &Clock,
    agent_id: &str,
    weather: &str,
    radius: u32,
) -> Option<PerceptionSnapshot> {
    let entity = map.entity(agent_id)?;
    let agent = entity.as_agent()?;

    let nearby = map
        .nearby_entities(entity.x, entity.y, radius)
        .into_iter()
        .filter(|other| other.id != agent_id)
        .map(|other| VisibleEntity {
            id: other.id.clone(),
            tag: other.kind.tag(),
            x: other.x,
            y: other.y,
        })
        .collect();

    Some(PerceptionSnapshot {
        agent_id: agent_id.to_owned(),
        time: clock.now(),
        time_of_day: clock.time_of_day(),
        time_description: clock.describe(),
        weather: weather.to_owned(),
        location: map.get_location(entity.x, entity.y),
        nearby,
        stats: agent.stats,
    })
}

/// Renders a snapshot to natural-language text.
pub trait PerceptionFormatter: Send + Sync {
    /// Render `snapshot`.
    fn format(&self, snapshot: &PerceptionSnapshot) -> String;
}

/// Second-person narrative, one line per aspect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeFormatter {
    language: Language,
}

impl NarrativeFormatter {
    /// Create a formatter writing in `language`.
    pub const fn new(language: Language) -> Self {
        Self { language }
    }
}

impl PerceptionFormatter for NarrativeFormatter {
    fn format(&self, snapshot: &PerceptionSnapshot) -> String {
        let lang = self.language;
        let mut lines = Vec::with_capacity(4);

        lines.push(translate_with(
            lang,
            "perception.time",
            &[
                ("time", &snapshot.time_description),
                ("weather", &snapshot.weather),
            ],
        ));

        let cell = &snapshot.location;
        let mut location = translate_with(
            lang,
            "perception.location",
            &[
                ("x", &cell.x.to_string()),
                ("y", &cell.y.to_string()),
                ("terrain", cell.terrain.as_str()),
            ],
        );
        if let Some(description) = &cell.description {
            let _ = write!(location, " ({description})");
        }
        lines.push(location);

        let stats = &snapshot.stats;
        lines.push(translate_with(
            lang,
            "perception.stats",
            &[
                ("health", &format!("{:.1}", stats.health)),
                ("energy", &format!("{:.1}", stats.energy)),
                ("sanity", &format!("{:.1}", stats.sanity)),
                ("wealth", &format!("{:.1}", stats.wealth)),
            ],
        ));

        if snapshot.nearby.is_empty() {
            lines.push(translate(lang, "perception.alone").to_owned());
        } else {
            let entities = snapshot
                .nearby
                .iter()
                .map(|other| {
                    translate_with(
                        lang,
                        "perception.entity",
                        &[
                            ("kind", other.tag.as_str()),
                            ("id", &other.id),
                            ("x", &other.x.to_string()),
                            ("y", &other.y.to_string()),
                        ],
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(translate_with(
                lang,
                "perception.nearby",
                &[("entities", &entities)],
            ));
        }

        lines.join("\n")
    }
}
