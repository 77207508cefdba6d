//! Sensors and their run order
//!
//! A [`Sensor`] publishes measures for a project. Sensors declare which
//! [`Capability`] they provide and which they need, and [`Schedule`] turns
//! those declarations into a dependency graph:
//!
//! - an edge runs from every provider of a capability to every sensor that
//!   depends on it
//! - strongly connected components larger than one sensor are cycles and are
//!   rejected (Tarjan's algorithm, via petgraph)
//! - otherwise sensors run in topological order; among sensors that are ready
//!   at the same time, the one registered first runs first
//!
//! A dependency that no registered sensor provides is satisfied vacuously.

use crate::config::Config;
use crate::discovery::{find_source_files, Language, SourceFile};
use crate::measures::MeasureSink;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Coverage,
    BaseMetrics,
    TestResults,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Coverage => "coverage",
            Self::BaseMetrics => "base-metrics",
            Self::TestResults => "test-results",
        };
        f.write_str(name)
    }
}

/// Everything a sensor may look at during one analysis run
pub struct ProjectContext {
    pub base_dir: PathBuf,
    pub files: Vec<SourceFile>,
    pub config: Config,
}

impl ProjectContext {
    pub fn new(base_dir: impl Into<PathBuf>, files: Vec<SourceFile>, config: Config) -> Self {
        Self { base_dir: base_dir.into(), files, config }
    }

    /// Enumerate the project's source files under `base_dir`.
    pub fn discover(base_dir: &Path, config: Config) -> Self {
        let files = find_source_files(base_dir, &config.test_dirs);
        Self::new(base_dir, files, config)
    }

    pub fn eligible_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| f.is_eligible())
    }

    pub fn has_language(&self, language: Language) -> bool {
        self.files.iter().any(|f| f.language == language)
    }
}

pub trait Sensor {
    fn name(&self) -> &str;

    fn provides(&self) -> &[Capability] {
        &[]
    }

    fn depends_on(&self) -> &[Capability] {
        &[]
    }

    fn should_execute(&self, _ctx: &ProjectContext) -> bool {
        true
    }

    fn analyse(&self, ctx: &ProjectContext, sink: &mut dyn MeasureSink);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("sensor dependency cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

#[derive(Default)]
pub struct Schedule {
    sensors: Vec<Box<dyn Sensor>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sensor: Box<dyn Sensor>) -> &mut Self {
        self.sensors.push(sensor);
        self
    }

    fn build_graph(&self) -> DiGraph<usize, ()> {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.sensors.len()).map(|i| graph.add_node(i)).collect();
        for (p, provider) in self.sensors.iter().enumerate() {
            for (d, dependent) in self.sensors.iter().enumerate() {
                if p != d
                    && dependent.depends_on().iter().any(|c| provider.provides().contains(c))
                {
                    graph.add_edge(nodes[p], nodes[d], ());
                }
            }
        }
        graph
    }

    /// Sensors in the order they must run.
    pub fn ordered(&self) -> Result<Vec<&dyn Sensor>, ScheduleError> {
        let graph = self.build_graph();

        if let Some(cycle) = tarjan_scc(&graph).into_iter().find(|scc| scc.len() > 1) {
            let mut members: Vec<usize> = cycle.iter().map(|&n| graph[n]).collect();
            members.sort_unstable();
            let names = members.iter().map(|&i| self.sensors[i].name().to_string()).collect();
            return Err(ScheduleError::Cycle(names));
        }

        let mut pending: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BTreeSet<usize> = (0..pending.len()).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(self.sensors.len());
        while let Some(i) = ready.pop_first() {
            order.push(self.sensors[i].as_ref());
            for next in graph.neighbors_directed(NodeIndex::new(i), Direction::Outgoing) {
                let j = graph[next];
                pending[j] -= 1;
                if pending[j] == 0 {
                    ready.insert(j);
                }
            }
        }
        Ok(order)
    }

    /// Run every sensor that wants to execute, in dependency order. Returns the
    /// names of the sensors that ran.
    pub fn run(
        &self,
        ctx: &ProjectContext,
        sink: &mut dyn MeasureSink,
    ) -> Result<Vec<String>, ScheduleError> {
        let mut executed = Vec::new();
        for sensor in self.ordered()? {
            if !sensor.should_execute(ctx) {
                tracing::info!("Sensor {} skipped", sensor.name());
                continue;
            }
            tracing::info!("Sensor {} started", sensor.name());
            sensor.analyse(ctx, sink);
            executed.push(sensor.name().to_string());
        }
        Ok(executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::FileType;
    use crate::measures::{Measure, MeasureStore, MetricKey, Scope};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Probe {
        name: &'static str,
        provides: Vec<Capability>,
        depends_on: Vec<Capability>,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Sensor for Probe {
        fn name(&self) -> &str {
            self.name
        }
        fn provides(&self) -> &[Capability] {
            &self.provides
        }
        fn depends_on(&self) -> &[Capability] {
            &self.depends_on
        }
        fn analyse(&self, _ctx: &ProjectContext, _sink: &mut dyn MeasureSink) {
            self.log.borrow_mut().push(self.name);
        }
    }

    fn probe(
        name: &'static str,
        provides: &[Capability],
        depends_on: &[Capability],
        log: &Rc<RefCell<Vec<&'static str>>>,
    ) -> Box<dyn Sensor> {
        Box::new(Probe { name, provides: provides.to_vec(), depends_on: depends_on.to_vec(), log: Rc::clone(log) })
    }

    fn empty_ctx() -> ProjectContext {
        ProjectContext::new(".", Vec::new(), Config::default())
    }

    #[test]
    fn test_dependents_run_after_providers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut schedule = Schedule::new();
        schedule
            .register(probe("reports", &[Capability::TestResults], &[Capability::Coverage], &log))
            .register(probe("metrics", &[Capability::BaseMetrics], &[], &log))
            .register(probe("coverage", &[Capability::Coverage], &[], &log));
        let ran = schedule.run(&empty_ctx(), &mut MeasureStore::new()).unwrap();
        assert_eq!(*log.borrow(), vec!["metrics", "coverage", "reports"]);
        assert_eq!(ran, vec!["metrics", "coverage", "reports"]);
    }

    #[test]
    fn test_registration_order_kept_for_independent_sensors() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut schedule = Schedule::new();
        schedule.register(probe("b", &[], &[], &log)).register(probe("a", &[], &[], &log));
        let names: Vec<&str> = schedule.ordered().unwrap().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_provider_is_vacuous() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut schedule = Schedule::new();
        schedule.register(probe("reports", &[Capability::TestResults], &[Capability::Coverage], &log));
        assert_eq!(schedule.ordered().unwrap().len(), 1);
    }

    #[test]
    fn test_cycle_rejected() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut schedule = Schedule::new();
        schedule
            .register(probe("x", &[Capability::Coverage], &[Capability::TestResults], &log))
            .register(probe("y", &[Capability::TestResults], &[Capability::Coverage], &log));
        let err = schedule.run(&empty_ctx(), &mut MeasureStore::new()).unwrap_err();
        assert_eq!(err, ScheduleError::Cycle(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(err.to_string(), "sensor dependency cycle: x -> y");
        assert!(log.borrow().is_empty());
    }

    struct OnlyWithScala;

    impl Sensor for OnlyWithScala {
        fn name(&self) -> &str {
            "only-with-scala"
        }
        fn should_execute(&self, ctx: &ProjectContext) -> bool {
            ctx.has_language(Language::Scala)
        }
        fn analyse(&self, _ctx: &ProjectContext, sink: &mut dyn MeasureSink) {
            let _ = sink.save(Measure::count(Scope::Project, MetricKey::FileCount, 1));
        }
    }

    #[test]
    fn test_should_execute_guard() {
        let mut schedule = Schedule::new();
        schedule.register(Box::new(OnlyWithScala));
        let mut store = MeasureStore::new();
        assert!(schedule.run(&empty_ctx(), &mut store).unwrap().is_empty());
        assert!(store.is_empty());

        let files = vec![SourceFile::new("src/test/A.scala", Language::Scala, FileType::Test)];
        let ctx = ProjectContext::new(".", files, Config::default());
        assert_eq!(ctx.eligible_files().count(), 0);
        assert_eq!(schedule.run(&ctx, &mut store).unwrap(), vec!["only-with-scala"]);
        assert_eq!(store.len(), 1);
    }
}
