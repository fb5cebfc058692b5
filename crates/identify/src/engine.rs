use std::sync::Arc;

use foundation::math::Vec2;
use layers::{LayerDescriptor, LayerId, LayerRegistry, eligible_layers};
use runtime::{BusyGuard, BusyIndicator, NoopBusy, QueryGate};
use scene::LocalScene;
use scene::picking::{PickOptions, pick_features};
use streaming::{Dispatcher, QueryPoint, QueryTransport, build_queries};
use tracing::{debug, info};

use crate::aggregate::{FeatureGroupResult, aggregate};
use crate::attribution::{AttributedBatch, attribute_batch};
use crate::config::IdentifyConfig;
use crate::error::IdentifyError;

/// A point indicated on the map, with the view it was indicated in.
#[derive(Debug, Clone, PartialEq)]
pub struct PointEvent {
    pub coordinate: Vec2,
    /// Map units per pixel.
    pub resolution: f64,
    pub zoom: f64,
    pub crs: String,
}

impl PointEvent {
    pub fn new(coordinate: Vec2, resolution: f64, zoom: f64, crs: impl Into<String>) -> Self {
        Self {
            coordinate,
            resolution,
            zoom,
            crs: crs.into(),
        }
    }

    pub fn validate(&self) -> Result<(), IdentifyError> {
        if !self.coordinate.is_finite() {
            return Err(IdentifyError::NonFiniteCoordinate {
                x: self.coordinate.x,
                y: self.coordinate.y,
            });
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(IdentifyError::InvalidResolution(self.resolution));
        }
        if !self.zoom.is_finite() {
            return Err(IdentifyError::InvalidZoom(self.zoom));
        }
        Ok(())
    }

    pub fn query_point(&self) -> QueryPoint {
        QueryPoint::new(self.coordinate, self.resolution, self.crs.clone())
    }
}

/// Counts for one delivered run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentifySummary {
    pub requests: usize,
    pub failures: usize,
    pub groups: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifyStatus {
    /// The gate was closed; nothing was sent and the continuation did not run.
    Declined,
    Delivered(IdentifySummary),
}

/// Runs point queries across remote layers and local vector data.
///
/// The engine keeps no per-run state; overlapping runs are independent.
#[derive(Debug, Clone)]
pub struct IdentifyEngine {
    dispatcher: Dispatcher,
    gate: QueryGate,
    config: IdentifyConfig,
}

impl IdentifyEngine {
    pub fn new(
        transport: Arc<dyn QueryTransport>,
        gate: QueryGate,
        config: IdentifyConfig,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::from_config(transport, &config.query),
            gate,
            config,
        }
    }

    pub fn gate(&self) -> &QueryGate {
        &self.gate
    }

    pub fn config(&self) -> &IdentifyConfig {
        &self.config
    }

    /// Runs one point query and hands the ordered groups to `continuation`.
    ///
    /// The continuation runs exactly once per delivered run, possibly with an
    /// empty list. The busy indicator is shown after the gate check and hidden
    /// once the continuation returns.
    pub async fn identify<F>(
        &self,
        registry: &dyn LayerRegistry,
        scene: &LocalScene,
        event: &PointEvent,
        busy: &dyn BusyIndicator,
        continuation: F,
    ) -> Result<IdentifyStatus, IdentifyError>
    where
        F: FnOnce(Vec<FeatureGroupResult>),
    {
        event.validate()?;
        if !self.gate.is_open() {
            debug!(tokens = ?self.gate.tokens(), "query gate closed, declining point query");
            return Ok(IdentifyStatus::Declined);
        }

        let _busy = BusyGuard::show(busy);

        let snapshot = registry.snapshot();
        let eligible = eligible_layers(&snapshot, event.zoom);
        let requests = build_queries(eligible, &event.query_point(), &self.config.query);
        let request_count = requests.len();

        let local = pick_features(
            scene,
            event.coordinate,
            event.resolution,
            PickOptions {
                tolerance_px: self.config.hit_tolerance_px,
            },
        );

        let outcomes = self.dispatcher.dispatch(requests).await;

        let mut failures = 0;
        let mut remote: Vec<(LayerId, AttributedBatch)> = Vec::new();
        for outcome in outcomes {
            let payload = match outcome.result {
                Ok(payload) => payload,
                Err(_) => {
                    failures += 1;
                    continue;
                }
            };
            let Some(layer) = find_layer(&snapshot, &outcome.request.layer_id) else {
                continue;
            };
            let features = formats::parse_response(&payload.content_type, &payload.body);
            debug!(layer = %layer.id, features = features.len(), "feature-info response decoded");
            let batches = attribute_batch(
                layer,
                features,
                self.config.attribution,
                &self.config.unnamed_caption,
            );
            remote.extend(batches.into_iter().map(|b| (layer.id.clone(), b)));
        }

        let groups = aggregate(remote, local, &self.config);
        let summary = IdentifySummary {
            requests: request_count,
            failures,
            groups: groups.len(),
        };
        info!(
            requests = summary.requests,
            failures = summary.failures,
            groups = summary.groups,
            "point query delivered"
        );

        continuation(groups);
        Ok(IdentifyStatus::Delivered(summary))
    }

    /// Like [`identify`](Self::identify), returning the groups instead.
    ///
    /// `Ok(None)` means the gate declined the run.
    pub async fn identify_collect(
        &self,
        registry: &dyn LayerRegistry,
        scene: &LocalScene,
        event: &PointEvent,
    ) -> Result<Option<Vec<FeatureGroupResult>>, IdentifyError> {
        let mut delivered = None;
        let status = self
            .identify(registry, scene, event, &NoopBusy, |groups| delivered = Some(groups))
            .await?;
        Ok(match status {
            IdentifyStatus::Declined => None,
            IdentifyStatus::Delivered(_) => delivered,
        })
    }
}

fn find_layer<'a>(snapshot: &'a [LayerDescriptor], id: &LayerId) -> Option<&'a LayerDescriptor> {
    snapshot.iter().find(|l| &l.id == id)
}
