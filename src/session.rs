//! Mission capture state machine
//!
//! A [`CaptureSession`] is a plain value. [`CaptureSession::apply`] takes an
//! operator [`Event`] and returns the next session together with the side
//! effects the caller must run; it never performs I/O itself. An event that
//! the current stage does not accept fails with `InvalidState` and the
//! original session stays as it was.
//!
//! ```text
//! Idle -> AreaPending -> AreaConfirmed -> SelectingTakeoff -> SelectingLanding
//!      -> Ready <-> DrawingNoFlyZone
//!      Ready -> Submitting -> Completed   (failure: Submitting -> Ready)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, NoFlyZoneSet, Polygon};
use crate::projection::{pixel_to_projected, PixelPoint, ProjectedPoint};
use crate::types::Dimensions;

/// Where the operator is in the capture sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Idle,
    AreaPending,
    AreaConfirmed,
    SelectingTakeoff,
    SelectingLanding,
    Ready,
    DrawingNoFlyZone,
    Submitting,
    Completed,
}

impl Stage {
    /// Whether geometry may still change in this stage
    pub fn is_interactive(&self) -> bool {
        !matches!(self, Stage::Submitting | Stage::Completed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::AreaPending => "area pending",
            Stage::AreaConfirmed => "area confirmed",
            Stage::SelectingTakeoff => "selecting takeoff",
            Stage::SelectingLanding => "selecting landing",
            Stage::Ready => "ready",
            Stage::DrawingNoFlyZone => "drawing no-fly zone",
            Stage::Submitting => "submitting",
            Stage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// What the backend handed back for a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionOutcome {
    /// Annotated result image
    pub image_url: String,
    /// JSON resource holding the projected path
    pub path_file_url: String,
}

/// Snapshot of everything a submission needs
#[derive(Debug, Clone, PartialEq)]
pub struct MissionDraft {
    pub area: BoundingBox,
    pub image_size: Dimensions,
    pub takeoff: PixelPoint,
    pub landing: PixelPoint,
    pub no_fly_zones: NoFlyZoneSet,
}

/// Operator actions and backend completions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A rectangle was drawn (or redrawn) on the map
    DrawArea(BoundingBox),
    ConfirmArea,
    /// Imagery for the confirmed area has been fetched
    ImageReady(Dimensions),
    /// Single click on the image
    Click(PixelPoint),
    /// Accept the clicked takeoff or landing point
    Approve,
    StartNoFlyZone,
    /// Double-click: close the polygon being drawn
    FinishNoFlyZone,
    CancelNoFlyZone,
    RemoveNoFlyZone(usize),
    Submit,
    SubmissionSucceeded(MissionOutcome),
    SubmissionFailed(String),
    Reset,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::DrawArea(_) => "draw area",
            Event::ConfirmArea => "confirm area",
            Event::ImageReady(_) => "image ready",
            Event::Click(_) => "click",
            Event::Approve => "approve",
            Event::StartNoFlyZone => "start no-fly zone",
            Event::FinishNoFlyZone => "finish no-fly zone",
            Event::CancelNoFlyZone => "cancel no-fly zone",
            Event::RemoveNoFlyZone(_) => "remove no-fly zone",
            Event::Submit => "submit",
            Event::SubmissionSucceeded(_) => "submission succeeded",
            Event::SubmissionFailed(_) => "submission failed",
            Event::Reset => "reset",
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the mission to the backend; answer with `SubmissionSucceeded` or
    /// `SubmissionFailed`
    SubmitMission(MissionDraft),
    /// Tell the operator something went wrong
    ReportError(String),
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: CaptureSession,
    pub effects: Vec<Effect>,
}

/// The operator's in-progress mission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureSession {
    stage: Stage,
    area: Option<BoundingBox>,
    image_size: Option<Dimensions>,
    takeoff: Option<PixelPoint>,
    landing: Option<PixelPoint>,
    candidate: Option<PixelPoint>,
    no_fly_zones: NoFlyZoneSet,
    draft: Vec<ProjectedPoint>,
    outcome: Option<MissionOutcome>,
    last_error: Option<String>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn area(&self) -> Option<&BoundingBox> {
        self.area.as_ref()
    }

    pub fn image_size(&self) -> Option<Dimensions> {
        self.image_size
    }

    /// Approved takeoff point
    pub fn takeoff(&self) -> Option<PixelPoint> {
        self.takeoff
    }

    /// Approved landing point
    pub fn landing(&self) -> Option<PixelPoint> {
        self.landing
    }

    /// Clicked but not yet approved point
    pub fn candidate(&self) -> Option<PixelPoint> {
        self.candidate
    }

    pub fn no_fly_zones(&self) -> &NoFlyZoneSet {
        &self.no_fly_zones
    }

    /// Vertices of the polygon being drawn
    pub fn draft(&self) -> &[ProjectedPoint] {
        &self.draft
    }

    pub fn outcome(&self) -> Option<&MissionOutcome> {
        self.outcome.as_ref()
    }

    /// Last failure surfaced to the operator
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Applies one event
    pub fn apply(&self, event: Event) -> Result<Transition> {
        let action = event.name();
        let mut next = self.clone();
        let mut effects = Vec::new();

        match (self.stage, event) {
            (_, Event::Reset) => next = CaptureSession::new(),

            (Stage::Idle | Stage::AreaPending, Event::DrawArea(bbox)) => {
                next.area = Some(bbox);
                next.stage = Stage::AreaPending;
            }

            (Stage::AreaPending, Event::ConfirmArea) => {
                let area = self.area.ok_or_else(|| self.reject(action))?;
                if !area.has_extent() {
                    return Err(Error::InvalidCoordinate(
                        "survey area has zero width or height".to_string(),
                    ));
                }
                next.stage = Stage::AreaConfirmed;
            }

            (Stage::AreaConfirmed, Event::ImageReady(dims)) => {
                if dims.is_empty() {
                    return Err(Error::InvalidCoordinate(format!(
                        "survey image is {}x{}",
                        dims.width, dims.height
                    )));
                }
                next.image_size = Some(dims);
                next.stage = Stage::SelectingTakeoff;
            }

            (Stage::SelectingTakeoff | Stage::SelectingLanding, Event::Click(point)) => {
                self.check_on_image(point)?;
                next.candidate = Some(point);
            }

            (Stage::SelectingTakeoff, Event::Approve) => {
                next.takeoff = Some(self.candidate.ok_or_else(|| self.reject(action))?);
                next.candidate = None;
                next.stage = Stage::SelectingLanding;
            }

            (Stage::SelectingLanding, Event::Approve) => {
                next.landing = Some(self.candidate.ok_or_else(|| self.reject(action))?);
                next.candidate = None;
                next.stage = Stage::Ready;
            }

            (Stage::Ready, Event::StartNoFlyZone) => {
                next.draft.clear();
                next.stage = Stage::DrawingNoFlyZone;
            }

            (Stage::DrawingNoFlyZone, Event::Click(point)) => {
                self.check_on_image(point)?;
                let (area, dims) = self.raster_frame(action)?;
                next.draft.push(pixel_to_projected(point, &area, dims)?);
            }

            (Stage::DrawingNoFlyZone, Event::FinishNoFlyZone) => {
                let polygon = Polygon::new(std::mem::take(&mut next.draft));
                match next.no_fly_zones.commit(polygon) {
                    Ok(index) => tracing::debug!(index, "no-fly zone committed"),
                    Err(e) => tracing::debug!("discarding no-fly zone draft: {}", e),
                }
                next.stage = Stage::Ready;
            }

            (Stage::DrawingNoFlyZone, Event::CancelNoFlyZone) => {
                next.draft.clear();
                next.stage = Stage::Ready;
            }

            (Stage::Ready, Event::RemoveNoFlyZone(index)) => {
                if next.no_fly_zones.remove(index).is_none() {
                    return Err(self.reject(action));
                }
            }

            (Stage::Ready, Event::Submit) => {
                let draft = self.mission_draft().ok_or_else(|| self.reject(action))?;
                next.last_error = None;
                next.stage = Stage::Submitting;
                effects.push(Effect::SubmitMission(draft));
            }

            (Stage::Submitting, Event::SubmissionSucceeded(outcome)) => {
                next.outcome = Some(outcome);
                next.stage = Stage::Completed;
            }

            (Stage::Submitting, Event::SubmissionFailed(message)) => {
                next.last_error = Some(message.clone());
                next.stage = Stage::Ready;
                effects.push(Effect::ReportError(message));
            }

            _ => return Err(self.reject(action)),
        }

        tracing::trace!(from = %self.stage, to = %next.stage, action, "capture transition");
        Ok(Transition {
            session: next,
            effects,
        })
    }

    fn mission_draft(&self) -> Option<MissionDraft> {
        Some(MissionDraft {
            area: self.area?,
            image_size: self.image_size?,
            takeoff: self.takeoff?,
            landing: self.landing?,
            no_fly_zones: self.no_fly_zones.clone(),
        })
    }

    fn raster_frame(&self, action: &'static str) -> Result<(BoundingBox, Dimensions)> {
        match (self.area, self.image_size) {
            (Some(area), Some(dims)) => Ok((area, dims)),
            _ => Err(self.reject(action)),
        }
    }

    fn check_on_image(&self, point: PixelPoint) -> Result<()> {
        let inside = self
            .image_size
            .map(|dims| dims.contains(point.x, point.y))
            .unwrap_or(false);
        if inside {
            Ok(())
        } else {
            Err(Error::InvalidCoordinate(format!(
                "click ({}, {}) is outside the survey image",
                point.x, point.y
            )))
        }
    }

    fn reject(&self, action: &'static str) -> Error {
        Error::InvalidState {
            stage: self.stage,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(session: &CaptureSession, event: Event) -> CaptureSession {
        session.apply(event).unwrap().session
    }

    fn ready_session() -> CaptureSession {
        let mut s = CaptureSession::new();
        for event in [
            Event::DrawArea(BoundingBox::from_corners(0.0, 0.0, 1000.0, 1000.0)),
            Event::ConfirmArea,
            Event::ImageReady(Dimensions::new(500, 500)),
            Event::Click(PixelPoint::new(10.0, 10.0)),
            Event::Approve,
            Event::Click(PixelPoint::new(490.0, 490.0)),
            Event::Approve,
        ] {
            s = step(&s, event);
        }
        assert_eq!(s.stage(), Stage::Ready);
        s
    }

    fn draw_zone(session: &CaptureSession, clicks: &[(f64, f64)]) -> CaptureSession {
        let mut s = step(session, Event::StartNoFlyZone);
        for &(x, y) in clicks {
            s = step(&s, Event::Click(PixelPoint::new(x, y)));
        }
        step(&s, Event::FinishNoFlyZone)
    }

    #[test]
    fn test_idle_only_accepts_draw_area() {
        let idle = CaptureSession::new();
        for event in [
            Event::ConfirmArea,
            Event::ImageReady(Dimensions::new(10, 10)),
            Event::Click(PixelPoint::new(1.0, 1.0)),
            Event::Approve,
            Event::StartNoFlyZone,
            Event::Submit,
            Event::SubmissionFailed("x".to_string()),
        ] {
            assert!(matches!(
                idle.apply(event),
                Err(Error::InvalidState { stage: Stage::Idle, .. })
            ));
        }

        let next = step(&idle, Event::DrawArea(BoundingBox::from_corners(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(next.stage(), Stage::AreaPending);
    }

    #[test]
    fn test_redraw_replaces_area() {
        let unit = BoundingBox::from_corners(0.0, 0.0, 1.0, 1.0);
        let s = step(&CaptureSession::new(), Event::DrawArea(unit));
        let replacement = BoundingBox::from_corners(5.0, 5.0, 9.0, 9.0);
        let s = step(&s, Event::DrawArea(replacement));
        assert_eq!(s.stage(), Stage::AreaPending);
        assert_eq!(s.area(), Some(&replacement));
    }

    #[test]
    fn test_confirm_requires_extent() {
        let flat = BoundingBox::from_corners(3.0, 0.0, 3.0, 10.0);
        let s = step(&CaptureSession::new(), Event::DrawArea(flat));
        assert!(matches!(s.apply(Event::ConfirmArea), Err(Error::InvalidCoordinate(_))));
        assert_eq!(s.stage(), Stage::AreaPending);
    }

    #[test]
    fn test_click_needs_approval() {
        let mut s = CaptureSession::new();
        for event in [
            Event::DrawArea(BoundingBox::from_corners(0.0, 0.0, 100.0, 100.0)),
            Event::ConfirmArea,
            Event::ImageReady(Dimensions::new(100, 100)),
        ] {
            s = step(&s, event);
        }
        assert!(s.apply(Event::Approve).is_err());

        s = step(&s, Event::Click(PixelPoint::new(5.0, 5.0)));
        s = step(&s, Event::Click(PixelPoint::new(7.0, 8.0)));
        assert_eq!(s.stage(), Stage::SelectingTakeoff);
        assert_eq!(s.takeoff(), None);

        s = step(&s, Event::Approve);
        assert_eq!(s.takeoff(), Some(PixelPoint::new(7.0, 8.0)));
        assert_eq!(s.candidate(), None);
        assert_eq!(s.stage(), Stage::SelectingLanding);

        assert!(matches!(
            s.apply(Event::Click(PixelPoint::new(150.0, 5.0))),
            Err(Error::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_no_fly_zone_committed_in_projected_space() {
        let s = draw_zone(&ready_session(), &[(50.0, 450.0), (450.0, 450.0), (450.0, 50.0)]);
        assert_eq!(s.stage(), Stage::Ready);
        assert_eq!(s.no_fly_zones().len(), 1);
        assert_eq!(
            s.no_fly_zones().get(0).unwrap().vertices(),
            &[
                ProjectedPoint::new(100.0, 100.0),
                ProjectedPoint::new(900.0, 100.0),
                ProjectedPoint::new(900.0, 900.0),
            ]
        );
        assert!(s.draft().is_empty());
    }

    #[test]
    fn test_two_point_zone_discarded() {
        let s = draw_zone(&ready_session(), &[(50.0, 450.0), (450.0, 450.0)]);
        assert_eq!(s.stage(), Stage::Ready);
        assert!(s.no_fly_zones().is_empty());
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut s = step(&ready_session(), Event::StartNoFlyZone);
        for (x, y) in [(1.0, 1.0), (2.0, 1.0), (2.0, 2.0)] {
            s = step(&s, Event::Click(PixelPoint::new(x, y)));
        }
        assert_eq!(s.draft().len(), 3);
        s = step(&s, Event::CancelNoFlyZone);
        assert_eq!(s.stage(), Stage::Ready);
        assert!(s.no_fly_zones().is_empty());
        assert!(s.draft().is_empty());
    }

    #[test]
    fn test_remove_zone_by_index() {
        let mut s = ready_session();
        s = draw_zone(&s, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        s = draw_zone(&s, &[(100.0, 100.0), (110.0, 100.0), (110.0, 110.0)]);
        assert_eq!(s.no_fly_zones().len(), 2);

        s = step(&s, Event::RemoveNoFlyZone(0));
        assert_eq!(s.no_fly_zones().len(), 1);
        let first = s.no_fly_zones().get(0).unwrap();
        assert_eq!(first.vertices()[0], ProjectedPoint::new(200.0, 800.0));

        assert!(matches!(s.apply(Event::RemoveNoFlyZone(3)), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn test_zone_edits_blocked_while_drawing() {
        let s = step(&ready_session(), Event::StartNoFlyZone);
        assert!(s.apply(Event::Submit).is_err());
        assert!(s.apply(Event::RemoveNoFlyZone(0)).is_err());
    }

    #[test]
    fn test_submit_emits_effect_and_locks() {
        let ready = ready_session();
        let transition = ready.apply(Event::Submit).unwrap();
        assert_eq!(transition.session.stage(), Stage::Submitting);
        assert!(!transition.session.stage().is_interactive());
        match &transition.effects[..] {
            [Effect::SubmitMission(draft)] => {
                assert_eq!(draft.takeoff, PixelPoint::new(10.0, 10.0));
                assert_eq!(draft.landing, PixelPoint::new(490.0, 490.0));
                assert_eq!(draft.image_size, Dimensions::new(500, 500));
            }
            other => panic!("unexpected effects {:?}", other),
        }

        let submitting = transition.session;
        for event in [
            Event::Submit,
            Event::StartNoFlyZone,
            Event::RemoveNoFlyZone(0),
            Event::Click(PixelPoint::new(1.0, 1.0)),
        ] {
            assert!(matches!(
                submitting.apply(event),
                Err(Error::InvalidState { stage: Stage::Submitting, .. })
            ));
        }
    }

    #[test]
    fn test_submit_unreachable_before_endpoints() {
        let area = BoundingBox::from_corners(0.0, 0.0, 10.0, 10.0);
        let mut s = step(&CaptureSession::new(), Event::DrawArea(area));
        assert!(s.apply(Event::Submit).is_err());
        s = step(&s, Event::ConfirmArea);
        s = step(&s, Event::ImageReady(Dimensions::new(10, 10)));
        assert!(s.apply(Event::Submit).is_err());
        s = step(&s, Event::Click(PixelPoint::new(1.0, 1.0)));
        s = step(&s, Event::Approve);
        assert!(s.apply(Event::Submit).is_err());
    }

    #[test]
    fn test_failure_rolls_back_to_ready() {
        let ready = draw_zone(&ready_session(), &[(50.0, 450.0), (450.0, 450.0), (450.0, 50.0)]);
        let submitting = step(&ready, Event::Submit);

        let transition = submitting
            .apply(Event::SubmissionFailed("backend unreachable".to_string()))
            .unwrap();
        let after = transition.session;

        assert_eq!(after.stage(), Stage::Ready);
        assert_eq!(after.takeoff(), ready.takeoff());
        assert_eq!(after.landing(), ready.landing());
        assert_eq!(after.no_fly_zones(), ready.no_fly_zones());
        assert_eq!(after.last_error(), Some("backend unreachable"));
        assert_eq!(
            transition.effects,
            vec![Effect::ReportError("backend unreachable".to_string())]
        );

        // resubmitting is allowed and clears the error
        let again = step(&after, Event::Submit);
        assert_eq!(again.stage(), Stage::Submitting);
        assert_eq!(again.last_error(), None);
    }

    #[test]
    fn test_success_completes() {
        let submitting = step(&ready_session(), Event::Submit);
        let outcome = MissionOutcome {
            image_url: "http://backend/static/outputs/mission_satellite.png".to_string(),
            path_file_url: "http://backend/static/outputs/auto_route_coordinates.txt".to_string(),
        };
        let done = step(&submitting, Event::SubmissionSucceeded(outcome.clone()));
        assert_eq!(done.stage(), Stage::Completed);
        assert_eq!(done.outcome(), Some(&outcome));
    }

    #[test]
    fn test_reset_from_anywhere() {
        let submitting = step(&ready_session(), Event::Submit);
        let reset = step(&submitting, Event::Reset);
        assert_eq!(reset, CaptureSession::new());

        let reset = step(&ready_session(), Event::Reset);
        assert_eq!(reset.stage(), Stage::Idle);
        assert!(reset.takeoff().is_none());
    }

    #[test]
    fn test_approved_points_are_immutable() {
        let ready = ready_session();
        assert!(ready.apply(Event::Click(PixelPoint::new(3.0, 3.0))).is_err());
        assert!(ready.apply(Event::Approve).is_err());
    }
}
