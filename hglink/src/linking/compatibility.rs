use log::debug;

use hgcore::data::track::{Track, TrackTime};
use hgcore::data::trackster::Trackster;

use crate::linking::config::LinkingConfig;

/// Tests a (track, trackster) pair for energy and time consistency.
///
/// Energy: the candidate's accumulated raw energy plus this trackster must
/// stay below the track momentum plus a tolerance of 20% of the trackster
/// energy, capped at 10 GeV. Time: the trackster time must lie within
/// `max_delta_t` combined sigmas of the track time; a trackster without an
/// assigned time, or a track time below the quality threshold, passes
/// unconditionally.
pub fn time_and_energy_compatible(
    total_raw_energy: f64,
    track: &Track,
    track_time: &TrackTime,
    trackster: &Trackster,
    config: &LinkingConfig,
) -> bool {
    let threshold = (0.2 * trackster.raw_energy).min(10.0);
    let energy_compatible = total_raw_energy + trackster.raw_energy < track.p() + threshold;

    let time_compatible = if !trackster.has_time()
        || track_time.quality < config.track_time_quality_threshold
    {
        true
    } else {
        (trackster.time - track_time.time).abs()
            < config.max_delta_t
                * (trackster.time_error.powi(2) + track_time.error.powi(2)).sqrt()
    };

    if !energy_compatible {
        debug!(
            "energy incompatible: track p {} trackster energy {}",
            track.p(),
            trackster.raw_energy
        );
    }
    if !time_compatible {
        debug!(
            "time incompatible: track time {} +/- {} trackster time {} +/- {}",
            track_time.time, track_time.error, trackster.time, trackster.time_error
        );
    }
    energy_compatible && time_compatible
}
