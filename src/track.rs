//! The static perimeter track.
//!
//! A closed clockwise loop of 26 fields: runs of 7, 4, 7 and 4 resource
//! fields interleaved with the four corners. The layout is identical for
//! every game and must match what renderers draw, so it is built once and
//! shared.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::resources::Resource;

/// Number of fields in the loop.
pub const TRACK_LEN: usize = 26;

/// Resource-field run lengths between successive corners, in track order.
const RUN_LENGTHS: [usize; 4] = [7, 4, 7, 4];

/// Corner reached after each run, in track order.
const RUN_CORNERS: [CornerId; 4] = [CornerId::Tr, CornerId::Br, CornerId::Bl, CornerId::Tl];

/// The four corner fields of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerId {
    #[serde(rename = "TL")]
    Tl,
    #[serde(rename = "TR")]
    Tr,
    #[serde(rename = "BR")]
    Br,
    #[serde(rename = "BL")]
    Bl,
}

impl CornerId {
    /// Assignment order for joining players: first player gets TL, and so on.
    pub const POOL: [CornerId; 4] = [CornerId::Tl, CornerId::Tr, CornerId::Br, CornerId::Bl];

    pub const fn label(self) -> &'static str {
        match self {
            CornerId::Tl => "TL",
            CornerId::Tr => "TR",
            CornerId::Br => "BR",
            CornerId::Bl => "BL",
        }
    }

    /// The field index this corner occupies on the track.
    pub fn track_index(self) -> usize {
        track()
            .iter()
            .position(|f| matches!(f.kind, FieldKind::Corner(c) if c == self))
            .unwrap_or(0)
    }
}

impl std::fmt::Display for CornerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Token colors handed out in seat order, matching the corner pool.
pub const COLOR_POOL: [&str; 4] = ["#ef4444", "#22c55e", "#38bdf8", "#facc15"];

/// What a token finds when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Resource(Resource),
    Corner(CornerId),
}

/// One field of the perimeter loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackField {
    pub index: usize,
    pub kind: FieldKind,
}

/// The shared track singleton.
pub fn track() -> &'static [TrackField; TRACK_LEN] {
    static TRACK: OnceLock<[TrackField; TRACK_LEN]> = OnceLock::new();
    TRACK.get_or_init(build_track)
}

fn build_track() -> [TrackField; TRACK_LEN] {
    let mut fields = Vec::with_capacity(TRACK_LEN);
    let mut resource_slot = 0;
    for (run, corner) in RUN_LENGTHS.iter().zip(RUN_CORNERS) {
        for _ in 0..*run {
            let resource = Resource::ALL[resource_slot % Resource::ALL.len()];
            resource_slot += 1;
            fields.push(FieldKind::Resource(resource));
        }
        fields.push(FieldKind::Corner(corner));
    }
    let mut track = [TrackField {
        index: 0,
        kind: FieldKind::Corner(CornerId::Tl),
    }; TRACK_LEN];
    for (index, kind) in fields.into_iter().enumerate() {
        track[index] = TrackField { index, kind };
    }
    track
}
