use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// Distance at which a hint for the nearest target appears.
pub const HINT_RADIUS_METERS: f64 = 50.0;

/// Distance within which an explicit collect action succeeds.
pub const COLLECT_RADIUS_METERS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityConfig {
    pub hint_radius_meters: f64,
    pub collect_radius_meters: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            hint_radius_meters: HINT_RADIUS_METERS,
            collect_radius_meters: COLLECT_RADIUS_METERS,
        }
    }
}

/// A placed item. `collected` only ever flips false -> true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    pub reward: u32,
    #[serde(default)]
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearestTarget {
    pub id: String,
    pub name: String,
    pub distance_meters: f64,
    /// Within the hint radius.
    pub nearby: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximityReport {
    pub nearest: Option<NearestTarget>,
}

impl ProximityReport {
    pub fn hint_text(&self) -> Option<String> {
        self.nearest.as_ref().filter(|target| target.nearby).map(|target| {
            format!(
                "{} is {:.0}m away",
                target.name,
                target.distance_meters.max(0.0)
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    Collected { reward: u32 },
    OutOfRange,
    AlreadyCollected,
    UnknownTarget,
}

/// Nearest-target evaluation, explicit collection, and the one-time
/// completion edge.
#[derive(Debug, Default)]
pub struct ProximityTracker {
    config: ProximityConfig,
    completion_fired: bool,
}

impl ProximityTracker {
    pub fn new(config: ProximityConfig) -> Self {
        Self {
            config,
            completion_fired: false,
        }
    }

    /// Finds the nearest uncollected target. An empty or fully collected
    /// set yields a report with no nearest target.
    pub fn evaluate(&self, avatar: GeoPoint, targets: &[Collectible]) -> ProximityReport {
        let mut best: Option<(&Collectible, f64)> = None;
        for target in targets.iter().filter(|target| !target.collected) {
            let distance = avatar.distance_meters(target.location);
            if best.map_or(true, |(_, current)| distance < current) {
                best = Some((target, distance));
            }
        }

        ProximityReport {
            nearest: best.map(|(target, distance_meters)| NearestTarget {
                id: target.id.clone(),
                name: target.name.clone(),
                distance_meters,
                nearby: distance_meters <= self.config.hint_radius_meters,
            }),
        }
    }

    /// Attempts to collect a specific target. Succeeds only inside the
    /// collect radius; a collected flag never clears.
    pub fn try_collect(
        &mut self,
        avatar: GeoPoint,
        target_id: &str,
        targets: &mut [Collectible],
    ) -> CollectOutcome {
        let Some(target) = targets.iter_mut().find(|target| target.id == target_id) else {
            return CollectOutcome::UnknownTarget;
        };
        if target.collected {
            return CollectOutcome::AlreadyCollected;
        }
        if avatar.distance_meters(target.location) > self.config.collect_radius_meters {
            return CollectOutcome::OutOfRange;
        }

        target.collected = true;
        CollectOutcome::Collected {
            reward: target.reward,
        }
    }

    /// True exactly once, on the evaluation where the last target turns
    /// out collected. Later calls return false.
    pub fn take_completion_edge(&mut self, targets: &[Collectible]) -> bool {
        if self.completion_fired {
            return false;
        }
        if !targets.is_empty() && targets.iter().all(|target| target.collected) {
            self.completion_fired = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avatar() -> GeoPoint {
        GeoPoint::new(-76.589503, 40.149641)
    }

    // Offsets latitude by roughly the requested number of meters.
    fn point_meters_north(from: GeoPoint, meters: f64) -> GeoPoint {
        GeoPoint::new(from.lon, from.lat + meters / 111_195.0)
    }

    fn collectible(id: &str, location: GeoPoint, reward: u32) -> Collectible {
        Collectible {
            id: id.to_string(),
            name: format!("{id} item"),
            location,
            reward,
            collected: false,
        }
    }

    #[test]
    fn nearest_within_hint_radius_is_flagged_nearby() {
        let tracker = ProximityTracker::default();
        let targets = vec![
            collectible("near", point_meters_north(avatar(), 30.0), 10),
            collectible("far", point_meters_north(avatar(), 80.0), 5),
        ];

        let report = tracker.evaluate(avatar(), &targets);
        let nearest = report.nearest.clone().expect("nearest target");
        assert_eq!(nearest.id, "near");
        assert!((nearest.distance_meters - 30.0).abs() < 0.5);
        assert!(nearest.nearby);
        assert!(report.hint_text().expect("hint").contains("near item"));
    }

    #[test]
    fn nearest_beyond_hint_radius_reports_without_hint() {
        let tracker = ProximityTracker::default();
        let targets = vec![collectible("far", point_meters_north(avatar(), 80.0), 5)];

        let report = tracker.evaluate(avatar(), &targets);
        let nearest = report.nearest.clone().expect("nearest target");
        assert!(!nearest.nearby);
        assert!(report.hint_text().is_none());
    }

    #[test]
    fn collected_targets_drop_out_of_evaluation() {
        let tracker = ProximityTracker::default();
        let mut targets = vec![
            collectible("near", point_meters_north(avatar(), 30.0), 10),
            collectible("far", point_meters_north(avatar(), 80.0), 5),
        ];
        targets[0].collected = true;

        let report = tracker.evaluate(avatar(), &targets);
        assert_eq!(report.nearest.expect("nearest").id, "far");
    }

    #[test]
    fn empty_and_exhausted_sets_are_tolerated() {
        let tracker = ProximityTracker::default();
        assert!(tracker.evaluate(avatar(), &[]).nearest.is_none());

        let mut targets = vec![collectible("only", avatar(), 10)];
        targets[0].collected = true;
        assert!(tracker.evaluate(avatar(), &targets).nearest.is_none());
    }

    #[test]
    fn collect_succeeds_only_inside_collect_radius() {
        let mut tracker = ProximityTracker::default();
        let mut targets = vec![
            collectible("close", point_meters_north(avatar(), 5.0), 10),
            collectible("hinted", point_meters_north(avatar(), 30.0), 5),
        ];

        assert_eq!(
            tracker.try_collect(avatar(), "hinted", &mut targets),
            CollectOutcome::OutOfRange
        );
        assert!(!targets[1].collected);

        assert_eq!(
            tracker.try_collect(avatar(), "close", &mut targets),
            CollectOutcome::Collected { reward: 10 }
        );
        assert!(targets[0].collected);
    }

    #[test]
    fn collection_is_one_way() {
        let mut tracker = ProximityTracker::default();
        let mut targets = vec![collectible("only", avatar(), 10)];

        assert_eq!(
            tracker.try_collect(avatar(), "only", &mut targets),
            CollectOutcome::Collected { reward: 10 }
        );
        assert_eq!(
            tracker.try_collect(avatar(), "only", &mut targets),
            CollectOutcome::AlreadyCollected
        );
        assert!(targets[0].collected);
    }

    #[test]
    fn unknown_target_id_is_reported() {
        let mut tracker = ProximityTracker::default();
        let mut targets = vec![collectible("only", avatar(), 10)];
        assert_eq!(
            tracker.try_collect(avatar(), "missing", &mut targets),
            CollectOutcome::UnknownTarget
        );
    }

    #[test]
    fn completion_edge_fires_exactly_once() {
        let mut tracker = ProximityTracker::default();
        let mut targets = vec![
            collectible("a", avatar(), 10),
            collectible("b", avatar(), 5),
        ];

        assert!(!tracker.take_completion_edge(&targets));

        tracker.try_collect(avatar(), "a", &mut targets);
        assert!(!tracker.take_completion_edge(&targets));

        tracker.try_collect(avatar(), "b", &mut targets);
        assert!(tracker.take_completion_edge(&targets));
        assert!(!tracker.take_completion_edge(&targets));
    }

    #[test]
    fn completion_edge_never_fires_for_empty_set() {
        let mut tracker = ProximityTracker::default();
        assert!(!tracker.take_completion_edge(&[]));
    }
}
