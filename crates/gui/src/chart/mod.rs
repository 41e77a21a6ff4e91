//! Chart pipelines: load a dataset off the frame thread, build a
//! [`VisualGroup`] from it, and attach the result to a scene host.

pub mod bar;
pub mod color;
pub mod group;
pub mod label;
pub mod line;
pub mod source;

pub use bar::{build_bar_group, BarLayout};
pub use group::{
    Geometry, GroupMeshes, LabelMesh, Material, Part, PartRole, Placement, Shading, VisualGroup,
};
pub use label::LabelTexture;
pub use line::{build_line_group, LineLayout};
pub use source::DataSource;

use shared::{DataError, TabularRecord};
use tokio::sync::mpsc;

use crate::diagnostics::Diagnostics;
use crate::host::{NodeId, SceneHost};

/// Which chart a pipeline builds, with its layout constants
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bar(BarLayout),
    Line(LineLayout),
}

impl ChartSpec {
    pub fn bar() -> Self {
        Self::Bar(BarLayout::default())
    }

    pub fn line() -> Self {
        Self::Line(LineLayout::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bar(_) => "bar",
            Self::Line(_) => "line",
        }
    }

    fn complete_message(&self) -> &'static str {
        match self {
            Self::Bar(_) => "Bar graph initialization complete.",
            Self::Line(_) => "3D Line Graph initialization complete.",
        }
    }

    pub fn build(&self, records: &[TabularRecord]) -> VisualGroup {
        match self {
            Self::Bar(layout) => build_bar_group(records, layout),
            Self::Line(layout) => build_line_group(records, layout),
        }
    }
}

struct BuildOutcome {
    generation: u64,
    result: Result<(usize, VisualGroup), DataError>,
}

/// Owns one chart in the scene. Builds run on a tokio runtime; their
/// results are applied by [`ChartPipeline::poll`] on the frame thread, and
/// only when they belong to the current mount.
pub struct ChartPipeline {
    spec: ChartSpec,
    source: DataSource,
    placement: Placement,
    diagnostics: Diagnostics,
    generation: u64,
    mounted: bool,
    pending: usize,
    node: Option<NodeId>,
    tx: mpsc::UnboundedSender<BuildOutcome>,
    rx: mpsc::UnboundedReceiver<BuildOutcome>,
}

impl ChartPipeline {
    pub fn new(
        spec: ChartSpec,
        source: DataSource,
        placement: Placement,
        diagnostics: Diagnostics,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            spec,
            source,
            placement,
            diagnostics,
            generation: 0,
            mounted: false,
            pending: 0,
            node: None,
            tx,
            rx,
        }
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Takes effect on the next mount
    pub fn set_source(&mut self, source: DataSource) {
        self.source = source;
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Start a build. A group that is already attached is released first.
    pub fn mount(&mut self, host: &mut dyn SceneHost, rt: &tokio::runtime::Handle) {
        if self.mounted {
            self.unmount(host);
        }
        self.generation += 1;
        self.mounted = true;
        self.pending += 1;

        let generation = self.generation;
        let spec = self.spec.clone();
        let source = self.source.clone();
        let tx = self.tx.clone();
        tracing::debug!(chart = spec.name(), generation, source = %source.describe(), "mounting chart");

        rt.spawn(async move {
            let result = match source.load().await {
                Ok(records) => {
                    let rows = records.len();
                    build_off_thread(move || spec.build(&records))
                        .await
                        .map(|group| (rows, group))
                }
                Err(e) => Err(e),
            };
            // receiver gone means the pipeline was dropped
            let _ = tx.send(BuildOutcome { generation, result });
        });
    }

    /// Apply finished builds. Returns true when a group was attached.
    pub fn poll(&mut self, host: &mut dyn SceneHost) -> bool {
        let mut attached = false;
        while let Ok(outcome) = self.rx.try_recv() {
            attached |= self.apply(outcome, host);
        }
        attached
    }

    /// Wait until every started build has been applied or discarded
    pub async fn settle(&mut self, host: &mut dyn SceneHost) {
        while self.pending > 0 {
            match self.rx.recv().await {
                Some(outcome) => {
                    self.apply(outcome, host);
                }
                None => break,
            }
        }
    }

    /// Detach and release the current group. Returns the number of released
    /// resources; repeated calls release nothing.
    pub fn unmount(&mut self, host: &mut dyn SceneHost) -> usize {
        if !self.mounted && self.node.is_none() {
            return 0;
        }
        self.generation += 1;
        self.mounted = false;

        let released = self
            .node
            .take()
            .and_then(|id| host.detach(id))
            .map_or(0, |mut group| group.dispose());
        tracing::debug!(chart = self.spec.name(), released, "chart unmounted");
        released
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Builds started but not yet applied
    pub fn pending(&self) -> usize {
        self.pending
    }

    fn apply(&mut self, outcome: BuildOutcome, host: &mut dyn SceneHost) -> bool {
        self.pending = self.pending.saturating_sub(1);
        let name = self.spec.name();

        if !self.mounted || outcome.generation != self.generation {
            tracing::debug!(chart = name, generation = outcome.generation, "discarding stale build");
            if let Ok((_, mut group)) = outcome.result {
                group.dispose();
            }
            return false;
        }

        match outcome.result {
            Ok((rows, mut group)) => {
                self.diagnostics
                    .report(format!("Parsed {rows} rows of stock data for {name} graph."));
                group.place(&self.placement);
                if let Some(mut old) = self.node.take().and_then(|id| host.detach(id)) {
                    old.dispose();
                }
                self.node = Some(host.attach(group));
                self.diagnostics.report(self.spec.complete_message());
                true
            }
            Err(e) => {
                self.diagnostics
                    .report_error(format!("Error during {name} graph initialization: {e}"));
                false
            }
        }
    }
}

/// Run a build on the blocking pool. A panicking build comes back as
/// `DataError::Build` so the mount still gets an outcome.
async fn build_off_thread<F>(build: F) -> Result<VisualGroup, DataError>
where
    F: FnOnce() -> VisualGroup + Send + 'static,
{
    tokio::task::spawn_blocking(build)
        .await
        .map_err(|e| DataError::Build(e.to_string()))
}
