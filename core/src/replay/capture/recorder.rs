//! Frame recorder
//!
//! Builds one [`Recording`] per participant per round from observed state.

use glam::Vec2;
use hashbrown::HashMap;

use super::prediction;
use crate::catalog::WEAPON_NONE;
use crate::event::{ParticipantId, PlayerState, Team};
use crate::replay::types::{Buttons, Frame, FrameFields, Recording, RecordingHeader};

/// A participant's in-progress recording for the current round.
#[derive(Debug, Clone)]
pub struct Track {
    pub team: Team,
    pub recording: Recording,
    last_weapon: i32,
    last_z: f32,
}

impl Track {
    fn new(player: &PlayerState, timestamp: i32) -> Self {
        Self {
            team: player.team,
            recording: Recording::new(header_for(player, timestamp)),
            last_weapon: WEAPON_NONE,
            last_z: player.position.z as f32,
        }
    }
}

/// A finished track handed over for encoding.
#[derive(Debug, Clone)]
pub struct CapturedTrack {
    pub id: ParticipantId,
    pub team: Team,
    pub recording: Recording,
}

fn header_for(player: &PlayerState, timestamp: i32) -> RecordingHeader {
    RecordingHeader {
        timestamp,
        name: player.name.clone(),
        position: player.position.as_vec3(),
        angles: Vec2::new(player.pitch() as f32, player.yaw() as f32),
    }
}

/// Per-round frame capture for every participant.
#[derive(Debug)]
pub struct FrameRecorder {
    tracks: HashMap<ParticipantId, Track>,
    keyframe_interval: usize,
    timestamp: i32,
}

impl FrameRecorder {
    /// `keyframe_interval` is the frame spacing of periodic keyframes.
    pub fn new(keyframe_interval: usize) -> Self {
        Self {
            tracks: HashMap::new(),
            keyframe_interval: keyframe_interval.max(1),
            timestamp: 0,
        }
    }

    pub fn set_keyframe_interval(&mut self, keyframe_interval: usize) {
        self.keyframe_interval = keyframe_interval.max(1);
    }

    pub fn keyframe_interval(&self) -> usize {
        self.keyframe_interval
    }

    /// Drop every track and stamp new headers with `timestamp`.
    pub fn begin_round(&mut self, timestamp: i32) {
        self.tracks.clear();
        self.timestamp = timestamp;
    }

    /// Discard everything captured so far.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Restart a participant's recording from their current state.
    pub fn reinit(&mut self, player: &PlayerState) {
        tracing::debug!(
            player = %player.name,
            team = player.team.label(),
            x = player.position.x,
            y = player.position.y,
            z = player.position.z,
            "recording initialized"
        );
        self.tracks
            .insert(player.id, Track::new(player, self.timestamp));
    }

    /// Append one frame for a living participant.
    pub fn capture(
        &mut self,
        player: &PlayerState,
        buttons: Buttons,
        tick_rate: f64,
        full_snapshot: bool,
    ) {
        if !player.alive {
            return;
        }

        let timestamp = self.timestamp;
        let keyframe_interval = self.keyframe_interval;
        let track = self
            .tracks
            .entry(player.id)
            .or_insert_with(|| Track::new(player, timestamp));
        track.team = player.team;

        let frames = &track.recording.frames;
        let origin = player.position.as_vec3();
        let mut frame = Frame {
            buttons,
            actual_velocity: player.velocity.as_vec3(),
            predicted_angles: Vec2::new(player.pitch() as f32, player.yaw() as f32),
            origin,
            ..Frame::default()
        };

        let weapon = player
            .active_weapon
            .map(|w| w.weapon_code())
            .unwrap_or(WEAPON_NONE);
        if frames.is_empty() || weapon != track.last_weapon {
            frame.weapon = weapon;
            track.last_weapon = weapon;
        }

        if full_snapshot || frames.len().is_multiple_of(keyframe_interval) {
            frame.fields = FrameFields::ORIGIN | FrameFields::VELOCITY;
            frame.at_origin = origin;
            frame.at_velocity = frame.actual_velocity;
        }

        frame.actual_velocity.z = (origin.z - track.last_z) * tick_rate as f32;
        track.last_z = origin.z;

        if let Some(previous) = track.recording.frames.last_mut() {
            prediction::apply_to_previous(previous, &frame);
        }
        track.recording.frames.push(frame);
    }

    pub fn track(&self, id: ParticipantId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Hand every track over for encoding, ordered by participant name.
    pub fn take_recordings(&mut self) -> Vec<CapturedTrack> {
        let mut captured: Vec<CapturedTrack> = self
            .tracks
            .drain()
            .map(|(id, track)| CapturedTrack {
                id,
                team: track.team,
                recording: track.recording,
            })
            .collect();
        captured.sort_by(|a, b| a.recording.header.name.cmp(&b.recording.header.name));
        captured
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Equipment;
    use glam::{DVec2, DVec3, Vec3};

    fn player(id: ParticipantId) -> PlayerState {
        let mut p: PlayerState =
            serde_json::from_value(serde_json::json!({ "id": id, "name": format!("p{id}") }))
                .unwrap();
        p.team = Team::Terrorists;
        p
    }

    #[test]
    fn test_weapon_delta_coding() {
        let mut recorder = FrameRecorder::new(256);
        let mut p = player(1);
        let sequence = [
            Equipment::Ak47,
            Equipment::Ak47,
            Equipment::Deagle,
            Equipment::Deagle,
            Equipment::Ak47,
        ];
        for weapon in sequence {
            p.active_weapon = Some(weapon);
            recorder.capture(&p, Buttons::empty(), 128.0, false);
        }

        let codes: Vec<i32> = recorder
            .track(1)
            .unwrap()
            .recording
            .frames
            .iter()
            .map(|f| f.weapon)
            .collect();
        let ak = Equipment::Ak47.weapon_code();
        let deagle = Equipment::Deagle.weapon_code();
        assert_eq!(codes, vec![ak, WEAPON_NONE, deagle, WEAPON_NONE, ak]);
    }

    #[test]
    fn test_periodic_keyframes() {
        let mut recorder = FrameRecorder::new(256);
        let p = player(1);
        for _ in 0..600 {
            recorder.capture(&p, Buttons::empty(), 128.0, false);
        }

        let keyframes: Vec<usize> = recorder
            .track(1)
            .unwrap()
            .recording
            .frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.fields != FrameFields::empty())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(keyframes, vec![0, 256, 512]);
    }

    #[test]
    fn test_full_snapshot_forces_keyframe() {
        let mut recorder = FrameRecorder::new(256);
        let mut p = player(1);
        p.position = DVec3::new(1.0, 2.0, 3.0);
        p.velocity = DVec3::new(4.0, 5.0, 6.0);
        for _ in 0..3 {
            recorder.capture(&p, Buttons::empty(), 128.0, true);
        }
        let frames = &recorder.track(1).unwrap().recording.frames;
        assert!(frames.iter().all(|f| f.is_keyframe()));
        assert_eq!(frames[1].at_origin, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(frames[1].at_velocity, Vec3::new(4.0, 5.0, 6.0));
        assert!(!frames[1].fields.contains(FrameFields::ANGLES));
    }

    #[test]
    fn test_z_velocity_from_position_delta() {
        let mut recorder = FrameRecorder::new(256);
        let mut p = player(1);
        p.position = DVec3::new(0.0, 0.0, 10.0);
        recorder.reinit(&p);

        p.position.z = 10.5;
        p.velocity = DVec3::new(0.0, 0.0, 999.0);
        recorder.capture(&p, Buttons::empty(), 128.0, false);
        p.position.z = 10.25;
        recorder.capture(&p, Buttons::empty(), 128.0, false);

        let frames = &recorder.track(1).unwrap().recording.frames;
        assert_eq!(frames[0].actual_velocity.z, 64.0);
        assert_eq!(frames[1].actual_velocity.z, -32.0);
    }

    #[test]
    fn test_dead_participants_are_skipped() {
        let mut recorder = FrameRecorder::new(256);
        let mut p = player(1);
        p.alive = false;
        recorder.capture(&p, Buttons::ATTACK, 128.0, false);
        assert!(recorder.track(1).is_none());
    }

    #[test]
    fn test_reinit_resets_frames_and_header() {
        let mut recorder = FrameRecorder::new(256);
        recorder.begin_round(1234);
        let mut p = player(1);
        p.active_weapon = Some(Equipment::Awp);
        recorder.capture(&p, Buttons::empty(), 128.0, false);
        recorder.capture(&p, Buttons::empty(), 128.0, false);

        p.position = DVec3::new(5.0, 6.0, 7.0);
        p.view = DVec2::new(-3.0, 120.0);
        recorder.reinit(&p);
        let track = recorder.track(1).unwrap();
        assert!(track.recording.frames.is_empty());
        assert_eq!(track.recording.header.timestamp, 1234);
        assert_eq!(track.recording.header.position, Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(track.recording.header.angles, Vec2::new(-3.0, 120.0));

        // Weapon is emitted again on the first frame after reinit.
        recorder.capture(&p, Buttons::empty(), 128.0, false);
        let frame = recorder.track(1).unwrap().recording.frames[0];
        assert_eq!(frame.weapon, Equipment::Awp.weapon_code());
    }

    #[test]
    fn test_take_recordings_drains_sorted() {
        let mut recorder = FrameRecorder::new(256);
        for id in [3, 1, 2] {
            recorder.capture(&player(id), Buttons::empty(), 128.0, false);
        }
        let names: Vec<String> = recorder
            .take_recordings()
            .into_iter()
            .map(|t| t.recording.header.name)
            .collect();
        assert_eq!(names, vec!["p1", "p2", "p3"]);
        assert!(recorder.is_empty());
    }
}
