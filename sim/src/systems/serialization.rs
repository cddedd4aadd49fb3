//! Serialization utilities for simulation state.

use crate::systems::population::HuntRecord;
use crate::world::Snapshot;

/// Serialize a snapshot to JSON bytes.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(snapshot)
}

/// Serialize a snapshot to a JSON string.
pub fn snapshot_to_json_string(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Deserialize a snapshot from JSON bytes.
pub fn snapshot_from_json(data: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Deserialize a snapshot from a JSON string.
pub fn snapshot_from_json_string(data: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(data)
}

/// Serialize the hunt log for the score screen.
pub fn hunt_log_to_json(log: &[HuntRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BehaviorState;
    use crate::species::Species;
    use crate::world::AnimalSnapshot;

    #[test]
    fn test_snapshot_survives_json() {
        let snapshot = Snapshot {
            tick: 42,
            time: 0.7,
            score: 200,
            kills: 1,
            animals: vec![AnimalSnapshot {
                id: 3,
                species: Species::Bear,
                x: 10.0,
                y: 0.1,
                z: 20.0,
                heading: 1.0,
                health: 0.0,
                health_max: 300.0,
                behavior: BehaviorState::Flee,
                is_dead: true,
                is_wounded: false,
                scale: 1.0,
            }],
            ..Default::default()
        };

        let bytes = snapshot_to_json(&snapshot).unwrap();
        let restored = snapshot_from_json(&bytes).unwrap();

        assert_eq!(restored.tick, 42);
        assert_eq!(restored.score, 200);
        assert_eq!(restored.animals[0].species, Species::Bear);
        assert_eq!(restored.animals[0].behavior, BehaviorState::Flee);
    }

    #[test]
    fn test_snapshot_json_string_matches_host_output() {
        let snapshot = Snapshot {
            tick: 7,
            live_count: 19,
            ammo: 4,
            ..Default::default()
        };

        let text = snapshot_to_json_string(&snapshot).unwrap();
        assert_eq!(text, snapshot.to_json().unwrap());

        let restored = snapshot_from_json_string(&text).unwrap();
        assert_eq!(restored.tick, 7);
        assert_eq!(restored.live_count, 19);
        assert_eq!(restored.ammo, 4);
        assert!(snapshot_from_json_string("{not json").is_err());
    }

    #[test]
    fn test_hunt_log_json() {
        let log = [HuntRecord {
            id: 5,
            species: Species::Rabbit,
            timestamp_ms: 12_000,
            distance: 31.5,
            score: 20,
        }];
        let json = hunt_log_to_json(&log).unwrap();
        assert!(json.contains("\"species\":\"rabbit\""));
        assert!(json.contains("\"timestamp_ms\":12000"));
    }
}
