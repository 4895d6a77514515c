// hglink/src/linking/engine.rs

use std::collections::VecDeque;
use log::{debug, log_enabled, trace, Level};
use nalgebra::Vector3;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use hgcore::constants::{MASS_PION, MASS_PION2, PDG_ELECTRON, PDG_K_ZERO_LONG, PDG_PHOTON, PDG_PION_CHARGED};
use hgcore::data::candidate::{Candidate, FourMomentum};
use hgcore::data::track::{muon_assoc_to_track, Muon, Track, TrackSelection, TrackTime};
use hgcore::data::trackster::Trackster;
use hgcore::geometry::disk::{DetectorGeometry, GeometryError, ReferenceSurfaces};
use hgcore::geometry::tile::EtaPhiTile;
use hgcore::geometry::vector::EtaPhi;

use crate::linking::compatibility::time_and_energy_compatible;
use crate::linking::config::LinkingConfig;
use crate::linking::propagator::{propagate_trackster, TrackPropagator};
use crate::linking::window::find_tracksters_in_window;

/// One sensor-readout event's worth of reconstructed inputs.
///
/// `track_times` is indexed by track position and must have the same length
/// as `tracks`; the candidate indices in the output refer into `tracks` and
/// `tracksters`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Event {
    pub tracks: Vec<Track>,
    pub track_times: Vec<TrackTime>,
    pub muons: Vec<Muon>,
    pub tracksters: Vec<Trackster>,
}

/// The candidate assembly engine.
///
/// Holds the configuration and the once-built reference surfaces; carries no
/// per-event state, so one engine can serve many events (see
/// [`link_events`](LinkingEngine::link_events)).
#[derive(Clone, Debug)]
pub struct LinkingEngine {
    config: LinkingConfig,
    selection: TrackSelection,
    surfaces: ReferenceSurfaces,
}

impl LinkingEngine {
    /// Builds the reference surfaces and returns a ready engine.
    ///
    /// Fails when the detector constants do not describe valid disks; the
    /// algorithm cannot run without its reference surfaces.
    pub fn new(
        geometry: &DetectorGeometry,
        config: LinkingConfig,
        selection: TrackSelection,
    ) -> Result<Self, GeometryError> {
        let surfaces = ReferenceSurfaces::build(geometry)?;
        Ok(LinkingEngine { config, selection, surfaces })
    }

    pub fn config(&self) -> &LinkingConfig {
        &self.config
    }

    /// Links one event's tracks and tracksters into candidates.
    ///
    /// Output order: neutral candidates, then charged track+trackster
    /// candidates, then pure-track charged-hadron fallbacks. Every trackster
    /// index appears in exactly one returned candidate.
    pub fn link<P: TrackPropagator>(&self, event: &Event, propagator: &P) -> Vec<Candidate> {
        let tracks = &event.tracks;
        let tracksters = &event.tracksters;

        debug!("------- geometric linking: {} tracks, {} tracksters -------", tracks.len(), tracksters.len());

        // ---- 1) filter and propagate tracks ---------------------------------
        // seed lists pair the propagated point with the owning track's index
        let mut track_front_seeds: Vec<(Vector3<f64>, usize)> = Vec::with_capacity(tracks.len());
        let mut track_interface_seeds: Vec<(Vector3<f64>, usize)> = Vec::with_capacity(tracks.len());
        let mut candidate_track_ids: Vec<usize> = Vec::with_capacity(tracks.len());

        for (i, track) in tracks.iter().enumerate() {
            if !self.selection.passes(track) || muon_assoc_to_track(i, &event.muons).is_some() {
                continue;
            }
            // every surviving track can still seed a candidate
            candidate_track_ids.push(i);

            // low-momentum tracks are kept as fallbacks only
            if track.pion_energy() < self.config.track_min_energy {
                continue;
            }

            let side = (track.eta() > 0.0) as usize;
            if let Some(point) = propagator.propagate(track, &self.surfaces.front_disks[side]) {
                track_front_seeds.push((point, i));
            }
            if let Some(point) = propagator.propagate(track, &self.surfaces.interface_disks[side]) {
                track_interface_seeds.push((point, i));
            }
        }

        // ---- 2) classify and propagate tracksters ---------------------------
        let z_front = self.surfaces.front_disks[1].z;
        let z_interface = self.surfaces.interface_disks[1].z;

        let mut front_tiles = [EtaPhiTile::new(), EtaPhiTile::new()];
        let mut interface_tiles = [EtaPhiTile::new(), EtaPhiTile::new()];
        let mut hadronic_interface_tiles = [EtaPhiTile::new(), EtaPhiTile::new()];

        let mut em_interface_seeds: Vec<(Vector3<f64>, usize)> = Vec::with_capacity(tracksters.len());
        let mut had_interface_seeds: Vec<(Vector3<f64>, usize)> = Vec::with_capacity(tracksters.len());

        for (i, trackster) in tracksters.iter().enumerate() {
            propagate_trackster(trackster, i, z_front, &mut front_tiles);
            let point = propagate_trackster(trackster, i, z_interface, &mut interface_tiles);

            if self.config.is_hadronic(trackster) {
                let side = (trackster.barycenter.z > 0.0) as usize;
                hadronic_interface_tiles[side].fill(point.eta(), point.phi(), i);
                had_interface_seeds.push((point, i));
            } else {
                em_interface_seeds.push((point, i));
            }
        }

        // ---- 3) the four link-finding passes --------------------------------
        let mut ts_near_track = vec![Vec::new(); tracks.len()];
        find_tracksters_in_window(
            &track_front_seeds,
            &front_tiles,
            self.config.delta_tk_ts_layer1,
            tracksters.len(),
            &mut ts_near_track,
            false,
        );

        let mut ts_near_track_at_interface = vec![Vec::new(); tracks.len()];
        find_tracksters_in_window(
            &track_interface_seeds,
            &interface_tiles,
            self.config.delta_tk_ts_interface,
            tracksters.len(),
            &mut ts_near_track_at_interface,
            false,
        );

        let mut had_near_em = vec![Vec::new(); tracksters.len()];
        find_tracksters_in_window(
            &em_interface_seeds,
            &hadronic_interface_tiles,
            self.config.delta_ts_em_had,
            tracksters.len(),
            &mut had_near_em,
            true,
        );

        let mut had_near_had = vec![Vec::new(); tracksters.len()];
        find_tracksters_in_window(
            &had_interface_seeds,
            &hadronic_interface_tiles,
            self.config.delta_ts_had_had,
            tracksters.len(),
            &mut had_near_had,
            true,
        );

        dump_links_found(&ts_near_track, "track -> tracksters at the front layer");
        dump_links_found(&ts_near_track_at_interface, "track -> tracksters at the interface");
        dump_links_found(&had_near_em, "EM -> hadronic tracksters at the interface");
        dump_links_found(&had_near_had, "hadronic -> hadronic tracksters at the interface");

        // ---- 4) charged candidates: per-track bounded-depth traversal -------
        let mut charged_candidates: Vec<Candidate> = Vec::new();
        let mut charged_hadrons_from_track: Vec<Candidate> = Vec::new();
        let mut charged_mask = vec![false; tracksters.len()];

        for &i in &candidate_track_ids {
            let track = &tracks[i];

            if ts_near_track[i].is_empty() && ts_near_track_at_interface[i].is_empty() {
                // nothing linked to this track, make a charged hadron
                charged_hadrons_from_track.push(charged_hadron_from_track(track, i));
                continue;
            }

            let track_time = event.track_times[i];
            let mut candidate = Candidate::new();
            let mut total_raw_energy = 0.0;

            // worklist over the two trackster adjacency lists, seeded from
            // both track adjacency lists; neighbors are expanded regardless
            // of the node's own compatibility verdict
            let mut visited = vec![false; tracksters.len()];
            let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
            for &ts in ts_near_track[i].iter().chain(ts_near_track_at_interface[i].iter()) {
                if !visited[ts] {
                    visited[ts] = true;
                    queue.push_back((ts, 1));
                }
            }

            while let Some((ts, depth)) = queue.pop_front() {
                if !charged_mask[ts]
                    && time_and_energy_compatible(total_raw_energy, track, &track_time, &tracksters[ts], &self.config)
                {
                    charged_mask[ts] = true;
                    candidate.add_trackster(ts);
                    total_raw_energy += tracksters[ts].raw_energy;
                }
                if depth >= self.config.max_hops {
                    continue;
                }
                for &next in had_near_em[ts].iter().chain(had_near_had[ts].iter()) {
                    if !visited[next] {
                        visited[next] = true;
                        queue.push_back((next, depth + 1));
                    }
                }
            }

            if candidate.has_tracksters() {
                candidate.track = Some(i);
                charged_candidates.push(candidate);
            } else {
                // all nearby tracksters were masked or incompatible
                charged_hadrons_from_track.push(charged_hadron_from_track(track, i));
            }
        }

        // ---- 5) neutral grouping --------------------------------------------
        // every unconsumed trackster lands in exactly one neutral candidate;
        // groups absorb still-unconsumed neighbors transitively through the
        // same masked adjacency lists
        let mut neutral_candidates: Vec<Candidate> = Vec::new();
        let mut neutral_mask = vec![false; tracksters.len()];

        for i in 0..tracksters.len() {
            if charged_mask[i] || neutral_mask[i] {
                continue;
            }
            let mut candidate = Candidate::new();
            neutral_mask[i] = true;
            candidate.add_trackster(i);

            let mut queue: VecDeque<usize> = VecDeque::from([i]);
            while let Some(ts) = queue.pop_front() {
                for &next in had_near_em[ts].iter().chain(had_near_had[ts].iter()) {
                    if charged_mask[next] || neutral_mask[next] {
                        continue;
                    }
                    neutral_mask[next] = true;
                    candidate.add_trackster(next);
                    queue.push_back(next);
                }
            }
            neutral_candidates.push(candidate);
        }

        // ---- 6) finalize kinematics -----------------------------------------
        for candidate in charged_candidates.iter_mut() {
            self.finalize_charged(candidate, tracks, tracksters);
        }
        for candidate in neutral_candidates.iter_mut() {
            self.finalize_neutral(candidate, tracksters);
        }

        // ---- 7) output ------------------------------------------------------
        let mut result =
            Vec::with_capacity(neutral_candidates.len() + charged_candidates.len() + charged_hadrons_from_track.len());
        result.extend(neutral_candidates);
        result.extend(charged_candidates);
        result.extend(charged_hadrons_from_track);
        result
    }

    /// Links independent events in parallel, sharing the immutable engine.
    pub fn link_events<P: TrackPropagator + Sync>(&self, events: &[Event], propagator: &P) -> Vec<Vec<Candidate>> {
        events.par_iter().map(|event| self.link(event, propagator)).collect()
    }

    fn finalize_charged(&self, candidate: &mut Candidate, tracks: &[Track], tracksters: &[Trackster]) {
        let Some(track_id) = candidate.track else {
            return;
        };
        let track = &tracks[track_id];

        // hadron-like if at least one owned trackster is not EM
        let mut is_hadronic = false;
        let mut raw_energy = 0.0;
        for &ts in &candidate.tracksters {
            if self.config.is_hadronic(&tracksters[ts]) {
                is_hadronic = true;
            }
            raw_energy += tracksters[ts].raw_energy;
        }

        let pdg = if is_hadronic { PDG_PION_CHARGED } else { PDG_ELECTRON };
        candidate.charge = track.charge;
        candidate.pdg_id = pdg * track.charge;
        candidate.raw_energy = raw_energy;
        candidate.p4 = FourMomentum::from_direction(&track.momentum, raw_energy, raw_energy);
    }

    fn finalize_neutral(&self, candidate: &mut Candidate, tracksters: &[Trackster]) {
        let mut is_hadronic = false;
        let mut raw_energy = 0.0;
        let mut weighted_barycenter = Vector3::zeros();
        for &ts in &candidate.tracksters {
            let trackster = &tracksters[ts];
            if self.config.is_hadronic(trackster) {
                is_hadronic = true;
            }
            raw_energy += trackster.raw_energy;
            weighted_barycenter += trackster.barycenter * trackster.raw_energy;
        }

        // a group without energy has no weighted barycenter, use the plain mean
        let combined_barycenter = if raw_energy > 0.0 {
            weighted_barycenter / raw_energy
        } else {
            candidate.tracksters.iter().map(|&ts| tracksters[ts].barycenter).sum::<Vector3<f64>>()
                / candidate.tracksters.len() as f64
        };

        let pdg = if is_hadronic { PDG_K_ZERO_LONG } else { PDG_PHOTON };
        let magnitude = if is_hadronic {
            (raw_energy * raw_energy - MASS_PION2).max(0.0).sqrt()
        } else {
            raw_energy
        };

        candidate.charge = 0;
        candidate.pdg_id = pdg;
        candidate.raw_energy = raw_energy;
        candidate.p4 = FourMomentum::from_direction(&combined_barycenter, magnitude, raw_energy);
    }
}

/// Standalone charged-hadron candidate built from the track alone, under the
/// pion mass hypothesis. Owns no tracksters.
fn charged_hadron_from_track(track: &Track, track_id: usize) -> Candidate {
    Candidate {
        charge: track.charge,
        pdg_id: PDG_PION_CHARGED * track.charge,
        raw_energy: track.pion_energy(),
        p4: FourMomentum::from_pt_eta_phi_m(track.pt(), track.eta(), track.phi(), MASS_PION),
        track: Some(track_id),
        tracksters: Vec::new(),
    }
}

fn dump_links_found(result_collection: &[Vec<usize>], label: &str) {
    if !log_enabled!(Level::Trace) {
        return;
    }
    trace!("all links found - {}", label);
    for (seed, links) in result_collection.iter().enumerate() {
        if !links.is_empty() {
            trace!("seed {} - tracksters: {:?}", seed, links);
        }
    }
}
