use nalgebra::Vector3;

use hgcore::constants::TIME_UNASSIGNED;
use hgcore::data::track::{Track, TrackSelection, TrackTime};
use hgcore::data::trackster::Trackster;
use hgcore::geometry::disk::DetectorGeometry;
use hglink::{Event, LinkingConfig, LinkingEngine, StraightLinePropagator};

fn main() {
    // a small synthetic event: one endcap track with a matching trackster
    let engine = LinkingEngine::new(
        &DetectorGeometry::default(),
        LinkingConfig::default(),
        TrackSelection::default(),
    )
    .unwrap();

    let track = Track::new(Vector3::new(2.0, 0.0, 7.2), 1, true, 0);
    let mut id_probabilities = [0.0_f32; 8];
    id_probabilities[0] = 0.95;
    let trackster = Trackster::new(
        Vector3::new(88.0, 0.0, 330.0),
        Vector3::new(0.26, 0.0, 0.97),
        7.0,
        7.0,
        id_probabilities,
        TIME_UNASSIGNED,
        0.0,
    );

    let event = Event {
        tracks: vec![track],
        track_times: vec![TrackTime::new(0.0, 0.02, 0.9)],
        muons: Vec::new(),
        tracksters: vec![trackster],
    };

    for candidate in engine.link(&event, &StraightLinePropagator) {
        println!("{}", candidate);
    }
}
