use std::fmt::Write;

use serde::Serialize;

use crate::graph::{EdgeDirection, GraphModel};
use crate::model::{FloorId, LandmarkId, PathId, PathRecord};
use crate::path::Hop;
use crate::preference::PreferenceProfile;
use crate::routing::RouteAlgorithm;

/// Turn and heading words swapped when generating reverse instructions.
///
/// Only words with no common non-directional reading belong here.
const OPPOSITES: &[(&str, &str)] = &[
    ("east", "west"),
    ("north", "south"),
    ("northeast", "southwest"),
    ("northwest", "southeast"),
    ("left", "right"),
    ("upstairs", "downstairs"),
    ("ascend", "descend"),
];

/// Single walking instruction within a route.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    pub index: usize,
    pub from: LandmarkId,
    pub to: LandmarkId,
    pub path: PathId,
    pub direction: EdgeDirection,
    pub instruction: String,
    pub distance: f64,
    pub estimated_time: f64,
    pub cumulative_distance: f64,
    pub cumulative_time: f64,
    pub from_floor: FloorId,
    pub to_floor: FloorId,
}

impl RouteStep {
    /// Whether this step moves between floors.
    pub fn changes_floor(&self) -> bool {
        self.from_floor != self.to_floor
    }
}

/// Outcome of a route computation.
///
/// When no eligible route exists `reachable` is `false`, `steps` is empty and
/// `preferences` echoes the profile so callers can suggest relaxing it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub reachable: bool,
    pub steps: Vec<RouteStep>,
    pub total_distance: f64,
    pub total_estimated_time: f64,
    pub preferences: PreferenceProfile,
    pub algorithm: RouteAlgorithm,
}

impl RouteResult {
    pub fn unreachable(preferences: PreferenceProfile, algorithm: RouteAlgorithm) -> Self {
        Self {
            reachable: false,
            steps: Vec::new(),
            total_distance: 0.0,
            total_estimated_time: 0.0,
            preferences,
            algorithm,
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Render the route as a numbered list of instructions.
    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();

        if !self.reachable {
            let _ = writeln!(
                buffer,
                "No route found{}.",
                describe_constraints(&self.preferences)
            );
            if self.preferences.is_restrictive() {
                let _ = writeln!(buffer, "Try relaxing the accessibility preferences.");
            }
            return buffer;
        }

        let _ = writeln!(
            buffer,
            "Route: {} steps, {:.1} m, {:.0} s (algorithm: {}, optimizing {})",
            self.step_count(),
            self.total_distance,
            self.total_estimated_time,
            self.algorithm,
            self.preferences.objective()
        );
        for step in &self.steps {
            let floor_note = if step.changes_floor() {
                format!(" [floor {} -> {}]", step.from_floor, step.to_floor)
            } else {
                String::new()
            };
            let _ = writeln!(
                buffer,
                "{:>3}. {} ({:.1} m, {:.0} s){}",
                step.index + 1,
                step.instruction,
                step.distance,
                step.estimated_time,
                floor_note
            );
        }
        buffer
    }
}

fn describe_constraints(preferences: &PreferenceProfile) -> String {
    let mut applied = Vec::new();
    if preferences.avoid_stairs {
        applied.push("avoiding stairs");
    }
    if preferences.wheelchair_accessible {
        applied.push("wheelchair accessible only");
    }
    if applied.is_empty() {
        String::new()
    } else {
        format!(" ({})", applied.join(", "))
    }
}

/// Turn the hops returned by a search into an ordered list of steps.
///
/// Steps are emitted one per hop in traversal order and never merged.
pub fn compose_route(
    graph: &GraphModel,
    hops: &[Hop],
    preferences: PreferenceProfile,
    algorithm: RouteAlgorithm,
) -> RouteResult {
    let mut cumulative_distance = 0.0;
    let mut cumulative_time = 0.0;

    let steps = hops
        .iter()
        .enumerate()
        .map(|(index, hop)| {
            let path = graph.path(&hop.edge);
            let (from, to) = match hop.edge.direction {
                EdgeDirection::Forward => (path.from, path.to),
                EdgeDirection::Reverse => (path.to, path.from),
            };
            cumulative_distance += path.distance;
            cumulative_time += path.estimated_time;

            RouteStep {
                index,
                from,
                to,
                path: path.id,
                direction: hop.edge.direction,
                instruction: instruction_for(path, hop.edge.direction),
                distance: path.distance,
                estimated_time: path.estimated_time,
                cumulative_distance,
                cumulative_time,
                from_floor: graph.floor_of(hop.from).unwrap_or_default(),
                to_floor: graph.floor_of(hop.edge.target).unwrap_or_default(),
            }
        })
        .collect::<Vec<_>>();

    RouteResult {
        reachable: true,
        total_distance: cumulative_distance,
        total_estimated_time: cumulative_time,
        steps,
        preferences,
        algorithm,
    }
}

/// Instruction text for walking `path` in `direction`.
pub fn instruction_for(path: &PathRecord, direction: EdgeDirection) -> String {
    match direction {
        EdgeDirection::Forward => path.instructions.clone(),
        EdgeDirection::Reverse => path
            .reverse_instructions
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| reverse_instruction(&path.instructions)),
    }
}

/// Generate reverse-direction text from a forward instruction.
///
/// A single turn or heading word is swapped for its opposite, keeping its
/// casing. Text with no such word, or with more than one, is prefixed with
/// `Retrace: ` instead.
pub fn reverse_instruction(forward: &str) -> String {
    let mut output = String::with_capacity(forward.len());
    let mut word = String::new();
    let mut swapped = 0usize;

    for ch in forward.chars() {
        if ch.is_alphabetic() {
            word.push(ch);
        } else {
            swapped += usize::from(flush_word(&mut output, &mut word));
            output.push(ch);
        }
    }
    swapped += usize::from(flush_word(&mut output, &mut word));

    if swapped == 1 {
        output
    } else {
        format!("Retrace: {forward}")
    }
}

fn flush_word(output: &mut String, word: &mut String) -> bool {
    if word.is_empty() {
        return false;
    }

    let swapped = match opposite_of(&word.to_lowercase()) {
        Some(replacement) => {
            output.push_str(&match_case(word, replacement));
            true
        }
        None => {
            output.push_str(word);
            false
        }
    };
    word.clear();
    swapped
}

fn opposite_of(word: &str) -> Option<&'static str> {
    OPPOSITES.iter().find_map(|&(a, b)| {
        if a == word {
            Some(b)
        } else if b == word {
            Some(a)
        } else {
            None
        }
    })
}

fn match_case(original: &str, replacement: &str) -> String {
    let mut chars = original.chars();
    let first_upper = chars.next().is_some_and(char::is_uppercase);
    let all_upper = original.chars().count() > 1 && original.chars().all(char::is_uppercase);

    if all_upper {
        replacement.to_uppercase()
    } else if first_upper {
        let mut replaced = replacement.chars();
        match replaced.next() {
            Some(head) => head.to_uppercase().chain(replaced).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_swaps_directional_words() {
        assert_eq!(reverse_instruction("Walk east 10m"), "Walk west 10m");
        assert_eq!(
            reverse_instruction("Turn left at the exit"),
            "Turn right at the exit"
        );
    }

    #[test]
    fn reverse_retraces_multi_turn_text() {
        assert_eq!(
            reverse_instruction("Turn left, then turn right into the lab"),
            "Retrace: Turn left, then turn right into the lab"
        );
        assert_eq!(
            reverse_instruction("Walk north, then turn east at the fountain"),
            "Retrace: Walk north, then turn east at the fountain"
        );
    }

    #[test]
    fn reverse_leaves_non_directional_words_alone() {
        assert_eq!(
            reverse_instruction("Pick up your badge at the desk"),
            "Retrace: Pick up your badge at the desk"
        );
        assert_eq!(
            reverse_instruction("Leave through the exit"),
            "Retrace: Leave through the exit"
        );
        assert_eq!(
            reverse_instruction("Go up the stairs and turn left"),
            "Retrace: Go up the stairs and turn left"
        );
    }

    #[test]
    fn reverse_preserves_case() {
        assert_eq!(reverse_instruction("North corridor"), "South corridor");
        assert_eq!(reverse_instruction("Go UPSTAIRS"), "Go DOWNSTAIRS");
    }

    #[test]
    fn reverse_without_direction_words_falls_back_to_retrace() {
        assert_eq!(
            reverse_instruction("Follow the blue line"),
            "Retrace: Follow the blue line"
        );
    }

    #[test]
    fn reverse_does_not_touch_partial_words() {
        assert_eq!(
            reverse_instruction("Pass the eastern lobby"),
            "Retrace: Pass the eastern lobby"
        );
    }

    #[test]
    fn unreachable_render_suggests_relaxing() {
        let result = RouteResult::unreachable(PreferenceProfile::wheelchair(), RouteAlgorithm::Dijkstra);
        let text = result.render_plain();
        assert!(text.contains("No route found"));
        assert!(text.contains("avoiding stairs"));
        assert!(text.contains("Try relaxing"));
    }

    #[test]
    fn unreachable_result_serializes_with_camel_case() {
        let result = RouteResult::unreachable(PreferenceProfile::default(), RouteAlgorithm::AStar);
        let json = serde_json::to_value(&result).expect("serializes");
        assert_eq!(json["reachable"], false);
        assert_eq!(json["totalDistance"], 0.0);
        assert_eq!(json["totalEstimatedTime"], 0.0);
        assert_eq!(json["preferences"]["shortestDistance"], true);
        assert_eq!(json["algorithm"], "a-star");
    }
}
