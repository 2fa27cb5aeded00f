//! Read-only view of a web for renderers and reports.

use glam::DVec2;
use serde::Serialize;

use crate::fitness::Fitness;
use crate::geometry::PolarPoint;
use crate::mutation::MutationKind;
use crate::web::Web;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapshotPoint {
    pub polar: PolarPoint,
    pub cartesian: DVec2,
}

impl From<&PolarPoint> for SnapshotPoint {
    fn from(p: &PolarPoint) -> Self {
        Self {
            polar: *p,
            cartesian: p.to_cartesian(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapshotFly {
    pub center: DVec2,
    pub size: f64,
    pub caught: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WebSnapshot {
    pub generation: u64,
    pub efficiency: f64,
    pub fitness: Fitness,
    pub trapping_net_length: f64,
    pub last_mutation: Option<MutationKind>,
    pub skeleton: Vec<SnapshotPoint>,
    pub rings: Vec<Vec<SnapshotPoint>>,
    pub flies: Vec<SnapshotFly>,
}

impl WebSnapshot {
    pub fn capture(web: &Web) -> Self {
        Self {
            generation: web.generation(),
            efficiency: web.efficiency(),
            fitness: web.fitness(),
            trapping_net_length: web.trapping_net_length(),
            last_mutation: web.last_mutation(),
            skeleton: web.skeleton().points().iter().map(SnapshotPoint::from).collect(),
            rings: web
                .trapping_net()
                .circles()
                .iter()
                .map(|c| c.points().iter().map(SnapshotPoint::from).collect())
                .collect(),
            flies: web
                .flies()
                .iter()
                .zip(web.caught_flags())
                .map(|(fly, &caught)| SnapshotFly {
                    center: fly.body.center(),
                    size: fly.body.size,
                    caught,
                })
                .collect(),
        }
    }
}
