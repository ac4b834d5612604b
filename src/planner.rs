//! Mission planner
//!
//! Drives a [`CaptureSession`] against a [`MissionBackend`]: applies operator
//! events, runs the effects they request, and feeds backend completions back
//! into the session.

use crate::backend::{MissionBackend, MissionRequest};
use crate::error::{Error, Result};
use crate::export::{export_itm_path, FlightParameters};
use crate::geometry::MissionPath;
use crate::overlay::{render_backend_payload, render_markers_and_zones, RasterImage, ZoneStyle};
use crate::projection::ProjectedPoint;
use crate::session::{CaptureSession, Effect, Event, MissionDraft, MissionOutcome, Stage};

/// Satellite and streets renderings of the same survey area
#[derive(Debug, Clone)]
pub struct SurveyImagery {
    pub satellite: RasterImage,
    pub streets: RasterImage,
}

impl SurveyImagery {
    pub fn new(satellite: RasterImage, streets: RasterImage) -> Result<Self> {
        if satellite.dimensions() != streets.dimensions() {
            let (s, t) = (satellite.dimensions(), streets.dimensions());
            return Err(Error::InvalidParameter(format!(
                "satellite image is {}x{} but streets image is {}x{}",
                s.width, s.height, t.width, t.height
            )));
        }
        Ok(Self { satellite, streets })
    }
}

pub struct MissionPlanner<B> {
    backend: B,
    session: CaptureSession,
    imagery: Option<SurveyImagery>,
}

impl<B: MissionBackend> MissionPlanner<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            session: CaptureSession::new(),
            imagery: None,
        }
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Attaches imagery for the confirmed area and moves on to takeoff selection
    pub fn load_imagery(&mut self, imagery: SurveyImagery) -> Result<&CaptureSession> {
        let dims = imagery.satellite.dimensions();
        self.dispatch(Event::ImageReady(dims))?;
        self.imagery = Some(imagery);
        Ok(&self.session)
    }

    /// Applies one event and runs whatever it asks for.
    ///
    /// A failed submission is still recorded in the session (back to Ready
    /// with `last_error` set) before the error is returned.
    pub fn dispatch(&mut self, event: Event) -> Result<&CaptureSession> {
        let resetting = matches!(event, Event::Reset);
        let transition = self.session.apply(event)?;
        self.session = transition.session;
        if resetting {
            self.imagery = None;
        }

        for effect in transition.effects {
            match effect {
                Effect::SubmitMission(draft) => self.submit(draft)?,
                Effect::ReportError(message) => {
                    tracing::warn!(error = %message, "mission submission failed")
                }
            }
        }
        Ok(&self.session)
    }

    fn submit(&mut self, draft: MissionDraft) -> Result<()> {
        match self.build_request(&draft).and_then(|r| self.backend.create_mission(&r)) {
            Ok(outcome) => {
                tracing::info!(image = %outcome.image_url, "mission planned");
                self.session = self.session.apply(Event::SubmissionSucceeded(outcome))?.session;
                Ok(())
            }
            Err(e) => {
                let transition = self.session.apply(Event::SubmissionFailed(e.to_string()))?;
                self.session = transition.session;
                for effect in transition.effects {
                    if let Effect::ReportError(message) = effect {
                        tracing::warn!(error = %message, "mission submission failed");
                    }
                }
                Err(e)
            }
        }
    }

    fn build_request(&self, draft: &MissionDraft) -> Result<MissionRequest> {
        let imagery = self.imagery.as_ref().ok_or(Error::InvalidState {
            stage: self.session.stage(),
            action: "submit",
        })?;

        let streets_png = render_backend_payload(
            &imagery.streets,
            draft.takeoff,
            draft.landing,
            draft.no_fly_zones.as_slice(),
            &draft.area,
        )?;

        Ok(MissionRequest {
            satellite_png: imagery.satellite.encode_png()?,
            streets_png,
            area: draft.area,
        })
    }

    /// Operator preview on the satellite image: markers (approved or pending)
    /// and filled zones
    pub fn preview(&self) -> Result<Vec<u8>> {
        let imagery = self.imagery.as_ref().ok_or(Error::InvalidState {
            stage: self.session.stage(),
            action: "preview",
        })?;

        let s = &self.session;
        let pending_takeoff = s.candidate().filter(|_| s.stage() == Stage::SelectingTakeoff);
        let pending_landing = s.candidate().filter(|_| s.stage() == Stage::SelectingLanding);

        render_markers_and_zones(
            &imagery.satellite,
            s.takeoff().or(pending_takeoff),
            s.landing().or(pending_landing),
            s.no_fly_zones().as_slice(),
            s.area(),
            ZoneStyle::Filled,
        )
    }

    fn outcome(&self, action: &'static str) -> Result<&MissionOutcome> {
        self.session.outcome().ok_or(Error::InvalidState {
            stage: self.session.stage(),
            action,
        })
    }

    /// Backend result image with markers and numbered zone outlines
    pub fn annotate_result(&self) -> Result<Vec<u8>> {
        let outcome = self.outcome("annotate result")?;
        let image = self.backend.fetch_image(&outcome.image_url)?;

        render_markers_and_zones(
            &image,
            self.session.takeoff(),
            self.session.landing(),
            self.session.no_fly_zones().as_slice(),
            self.session.area(),
            ZoneStyle::Outlined,
        )
    }

    /// Planned path on the projected grid
    pub fn planned_path(&self) -> Result<MissionPath<ProjectedPoint>> {
        let outcome = self.outcome("fetch path")?;
        self.backend.fetch_path(&outcome.path_file_url)
    }

    /// Litchi CSV for the planned path
    pub fn export(&self, params: &FlightParameters) -> Result<String> {
        let path = self.planned_path()?;
        let csv = export_itm_path(&path, params)?;
        tracing::info!(
            waypoints = path.len(),
            speed = params.speed_mps(),
            altitude = params.altitude_m(),
            "mission exported"
        );
        Ok(csv)
    }
}
