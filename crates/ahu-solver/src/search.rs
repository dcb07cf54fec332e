//! Free-parameter search.
//!
//! When the supply flow or the by-pass fraction is not given, it is chosen
//! so that one output of the network (a supply temperature, an indoor
//! humidity) meets a setpoint. Every trial runs the full saturation iterator
//! on a private copy of the operating parameters.
//!
//! The root finder scans outward from the initial guess, alternating sides,
//! and bisects the first sign change it meets. The initial guess therefore
//! selects the branch when the residual has several roots. Without a sign
//! change it falls back to a golden-section minimisation of `r²`.

use std::fmt;

use ahu_core::{Deadline, NodeId};
use ahu_elements::{Gain, OperatingParameters};
use ahu_psychro::relative_humidity;
use tracing::{debug, trace, warn};

use crate::error::{SolverError, SolverResult};
use crate::saturation::{SaturationConfig, iterate};
use crate::solution::NetworkSolution;
use crate::topology::Topology;

/// Operating parameter chosen by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeParameter {
    /// Supply dry-air mass flow `m`, kg/s.
    SupplyFlow,
    /// Coil by-pass fraction `β`.
    Bypass,
}

impl FreeParameter {
    pub fn default_bounds(self) -> (f64, f64) {
        match self {
            FreeParameter::SupplyFlow => (0.0, 100.0),
            FreeParameter::Bypass => (0.0, 1.0),
        }
    }

    /// Largest accepted cost `0.5·r²`.
    pub fn default_threshold(self) -> f64 {
        match self {
            FreeParameter::SupplyFlow => 1e-4,
            FreeParameter::Bypass => 1e-5,
        }
    }

    pub fn get(self, params: &OperatingParameters) -> f64 {
        match self {
            FreeParameter::SupplyFlow => params.supply_flow,
            FreeParameter::Bypass => params.bypass,
        }
    }

    pub fn set(self, params: &mut OperatingParameters, value: f64) {
        match self {
            FreeParameter::SupplyFlow => params.supply_flow = value,
            FreeParameter::Bypass => params.bypass = value,
        }
    }
}

impl fmt::Display for FreeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreeParameter::SupplyFlow => write!(f, "supply flow"),
            FreeParameter::Bypass => write!(f, "by-pass fraction"),
        }
    }
}

/// Network output the search drives to a setpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// Node temperature, °C.
    Temperature { node: NodeId, setpoint: f64 },
    /// Node humidity ratio, kg/kg.
    HumidityRatio { node: NodeId, setpoint: f64 },
    /// Node relative humidity, 0..1.
    RelativeHumidity { node: NodeId, setpoint: f64 },
}

impl Target {
    pub fn node(&self) -> NodeId {
        match *self {
            Target::Temperature { node, .. }
            | Target::HumidityRatio { node, .. }
            | Target::RelativeHumidity { node, .. } => node,
        }
    }

    pub fn setpoint(&self) -> f64 {
        match *self {
            Target::Temperature { setpoint, .. }
            | Target::HumidityRatio { setpoint, .. }
            | Target::RelativeHumidity { setpoint, .. } => setpoint,
        }
    }

    pub fn is_humidity(&self) -> bool {
        !matches!(self, Target::Temperature { .. })
    }

    /// Read the targeted value out of a solution.
    pub fn observe(&self, solution: &NetworkSolution, altitude: f64) -> SolverResult<f64> {
        let node = self.node();
        let missing = || SolverError::ProblemSetup {
            what: format!("target node {node} has no value"),
        };
        match self {
            Target::Temperature { .. } => solution.temperature(node).ok_or_else(missing),
            Target::HumidityRatio { .. } => solution.humidity_ratio(node).ok_or_else(missing),
            Target::RelativeHumidity { .. } => {
                let t = solution.temperature(node).ok_or_else(missing)?;
                let w = solution.humidity_ratio(node).ok_or_else(missing)?;
                Ok(relative_humidity(t, w, altitude)?)
            }
        }
    }

    /// Whether searching on this target replaces the indoor humidity
    /// controller of `topology`.
    pub fn releases_humidity_control(&self, topology: &Topology) -> bool {
        self.is_humidity() && topology.indoor() == Some(self.node())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Overrides [`FreeParameter::default_bounds`].
    pub bounds: Option<(f64, f64)>,
    /// Start of the scan; defaults to the parameter's current value.
    pub initial_guess: Option<f64>,
    /// Scan steps across the whole bounds.
    pub scan_steps: usize,
    pub max_bisections: usize,
    pub golden_iterations: usize,
    /// Overrides [`FreeParameter::default_threshold`].
    pub cost_threshold: Option<f64>,
    /// Wall-clock budget of the whole search, seconds.
    pub time_budget: Option<f64>,
    pub saturation: SaturationConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            bounds: None,
            initial_guess: None,
            scan_steps: 100,
            max_bisections: 80,
            golden_iterations: 80,
            cost_threshold: None,
            time_budget: None,
            saturation: SaturationConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_initial_guess(mut self, guess: f64) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    pub fn with_bounds(mut self, lo: f64, hi: f64) -> Self {
        self.bounds = Some((lo, hi));
        self
    }
}

/// Accepted result of a search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub parameter: FreeParameter,
    pub value: f64,
    /// `0.5·r²` at `value`.
    pub cost: f64,
    pub evaluations: usize,
    pub solution: NetworkSolution,
    /// Parameters of the accepted trial.
    pub params: OperatingParameters,
}

/// How the root finder settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMethod {
    Exact,
    Bisection,
    GoldenSection,
}

/// Best point seen by [`find_root`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEstimate {
    pub x: f64,
    /// `f(x)`; infinite when every evaluation failed.
    pub residual: f64,
    pub evaluations: usize,
    pub method: RootMethod,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootOptions {
    pub scan_steps: usize,
    pub max_bisections: usize,
    pub golden_iterations: usize,
}

impl From<&SearchConfig> for RootOptions {
    fn from(c: &SearchConfig) -> Self {
        Self {
            scan_steps: c.scan_steps.max(1),
            max_bisections: c.max_bisections,
            golden_iterations: c.golden_iterations,
        }
    }
}

struct Tracker<F> {
    f: F,
    best: Option<(f64, f64)>,
    evaluations: usize,
}

impl<F> Tracker<F>
where
    F: FnMut(f64) -> SolverResult<Option<f64>>,
{
    fn eval(&mut self, x: f64) -> SolverResult<Option<f64>> {
        self.evaluations += 1;
        let r = (self.f)(x)?.filter(|r| r.is_finite());
        if let Some(r) = r {
            if self.best.is_none_or(|(_, rb)| r.abs() < rb.abs()) {
                self.best = Some((x, r));
            }
        }
        Ok(r)
    }

    fn estimate(&self, fallback: f64, method: RootMethod) -> RootEstimate {
        let (x, residual) = self.best.unwrap_or((fallback, f64::INFINITY));
        RootEstimate {
            x,
            residual,
            evaluations: self.evaluations,
            method,
        }
    }
}

/// Find a root of the scalar function `f` in `[lo, hi]`, starting at `x0`.
///
/// `f` returns `Ok(None)` for a failed evaluation (treated as infinitely
/// bad, never a bracket end) and `Err` to abort the search. The returned
/// estimate is the best point seen, whatever the method.
pub fn find_root<F>(
    f: F,
    lo: f64,
    hi: f64,
    x0: f64,
    options: &RootOptions,
) -> SolverResult<RootEstimate>
where
    F: FnMut(f64) -> SolverResult<Option<f64>>,
{
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(SolverError::ProblemSetup {
            what: format!("invalid bounds [{lo}, {hi}]"),
        });
    }
    let x0 = if x0.is_finite() { x0.clamp(lo, hi) } else { lo };
    let mut t = Tracker {
        f,
        best: None,
        evaluations: 0,
    };

    let r0 = t.eval(x0)?;
    if r0 == Some(0.0) {
        return Ok(t.estimate(x0, RootMethod::Exact));
    }

    if let Some(((a, ra), (b, rb))) = scan(&mut t, (lo, hi), x0, r0, options.scan_steps)? {
        debug!(a, b, "bracket found");
        bisect(&mut t, (a, ra), (b, rb), options.max_bisections)?;
        return Ok(t.estimate(x0, RootMethod::Bisection));
    }

    debug!(lo, hi, "no sign change, golden-section fallback");
    golden_section(&mut t, (lo, hi), options.golden_iterations)?;
    Ok(t.estimate(x0, RootMethod::GoldenSection))
}

type Bracket = ((f64, f64), (f64, f64));

struct Side {
    direction: f64,
    x: f64,
    residual: Option<f64>,
    open: bool,
}

/// Step away from `x0` on both sides, right then left, and return the first
/// pair of neighbours with opposite signs.
fn scan<F>(
    t: &mut Tracker<F>,
    (lo, hi): (f64, f64),
    x0: f64,
    r0: Option<f64>,
    steps: usize,
) -> SolverResult<Option<Bracket>>
where
    F: FnMut(f64) -> SolverResult<Option<f64>>,
{
    let h = (hi - lo) / steps as f64;
    let mut sides = [
        Side {
            direction: 1.0,
            x: x0,
            residual: r0,
            open: x0 < hi,
        },
        Side {
            direction: -1.0,
            x: x0,
            residual: r0,
            open: x0 > lo,
        },
    ];

    for k in 1..=steps {
        if sides.iter().all(|s| !s.open) {
            break;
        }
        for side in sides.iter_mut().filter(|s| s.open) {
            let x = (x0 + side.direction * k as f64 * h).clamp(lo, hi);
            let r = t.eval(x)?;
            trace!(x, ?r, "scan");
            if let (Some(ra), Some(rb)) = (side.residual, r) {
                if ra * rb <= 0.0 {
                    return Ok(Some(((side.x, ra), (x, rb))));
                }
            }
            side.x = x;
            side.residual = r;
            side.open = x > lo && x < hi;
        }
    }
    Ok(None)
}

fn bisect<F>(
    t: &mut Tracker<F>,
    (mut a, mut ra): (f64, f64),
    (mut b, rb): (f64, f64),
    max_iterations: usize,
) -> SolverResult<()>
where
    F: FnMut(f64) -> SolverResult<Option<f64>>,
{
    if ra == 0.0 || rb == 0.0 {
        return Ok(());
    }
    for _ in 0..max_iterations {
        let m = 0.5 * (a + b);
        if m == a || m == b {
            break;
        }
        match t.eval(m)? {
            None => {
                warn!(m, "failed evaluation inside a bracket");
                break;
            }
            Some(rm) if rm == 0.0 => break,
            Some(rm) if ra * rm < 0.0 => b = m,
            Some(rm) => {
                a = m;
                ra = rm;
            }
        }
    }
    Ok(())
}

/// Minimise `r²` over `[lo, hi]`; failed evaluations cost infinity.
fn golden_section<F>(
    t: &mut Tracker<F>,
    (lo, hi): (f64, f64),
    max_iterations: usize,
) -> SolverResult<()>
where
    F: FnMut(f64) -> SolverResult<Option<f64>>,
{
    let g = (5f64.sqrt() - 1.0) / 2.0;
    let cost = |r: Option<f64>| r.map_or(f64::INFINITY, |r| r * r);
    let (mut a, mut b) = (lo, hi);
    let mut c = b - g * (b - a);
    let mut d = a + g * (b - a);
    let mut fc = cost(t.eval(c)?);
    let mut fd = cost(t.eval(d)?);

    for _ in 0..max_iterations {
        if b - a <= 1e-12 * (1.0 + a.abs().max(b.abs())) {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - g * (b - a);
            fc = cost(t.eval(c)?);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + g * (b - a);
            fd = cost(t.eval(d)?);
        }
    }
    Ok(())
}

struct Trial {
    value: f64,
    residual: f64,
    solution: NetworkSolution,
    params: OperatingParameters,
}

/// Choose `parameter` within its bounds so that `target` meets its setpoint.
///
/// The caller's parameters are never modified: each trial solves a copy with
/// the trial value substituted. When the target is the humidity of the
/// topology's indoor node, the indoor humidity controller is switched off in
/// every trial, the search taking over its role.
///
/// Succeeds when the best cost `0.5·r²` is within the threshold; otherwise
/// fails with [`SolverError::NoFeasibleParameter`] carrying the best trial.
pub fn find_parameter(
    topology: &Topology,
    params: &OperatingParameters,
    parameter: FreeParameter,
    target: Target,
    config: &SearchConfig,
) -> SolverResult<SearchOutcome> {
    params.validate()?;
    let (lo, hi) = config.bounds.unwrap_or(parameter.default_bounds());
    let threshold = config
        .cost_threshold
        .unwrap_or(parameter.default_threshold());
    let x0 = config.initial_guess.unwrap_or(parameter.get(params));
    let deadline = Deadline::from_secs(config.time_budget);

    let mut base = params.clone();
    if target.releases_humidity_control(topology) {
        base.gains.humidity = Gain::Off;
    }
    let setpoint = target.setpoint();
    debug!(%parameter, lo, hi, x0, setpoint, "parameter search");

    let mut best: Option<Trial> = None;
    let evaluate = |x: f64| -> SolverResult<Option<f64>> {
        let best_solution =
            |best: &Option<Trial>| best.as_ref().map(|b| Box::new(b.solution.clone()));
        if deadline.is_expired() {
            return Err(SolverError::DeadlineExceeded {
                what: "parameter search",
                best: best_solution(&best),
            });
        }
        let mut trial = base.clone();
        parameter.set(&mut trial, x);
        let solution = match iterate(topology, &trial, &config.saturation, &deadline) {
            Ok(solution) => solution,
            Err(SolverError::DeadlineExceeded { best: inner, .. }) => {
                return Err(SolverError::DeadlineExceeded {
                    what: "parameter search",
                    best: best_solution(&best).or(inner),
                });
            }
            Err(e) => {
                trace!(x, error = %e, "trial failed");
                return Ok(None);
            }
        };
        let residual = match target.observe(&solution, trial.altitude) {
            Ok(observed) => observed - setpoint,
            Err(e) => {
                trace!(x, error = %e, "target not observable");
                return Ok(None);
            }
        };
        trace!(x, residual, "trial");
        if residual.is_finite() && best.as_ref().is_none_or(|b| residual.abs() < b.residual.abs()) {
            best = Some(Trial {
                value: x,
                residual,
                solution,
                params: trial,
            });
        }
        Ok(Some(residual))
    };

    let estimate = find_root(evaluate, lo, hi, x0, &RootOptions::from(config))?;

    let Some(best) = best else {
        warn!(%parameter, "every trial failed");
        return Err(SolverError::NoFeasibleParameter {
            parameter,
            best_value: estimate.x,
            best_cost: f64::INFINITY,
            best: None,
        });
    };
    let cost = 0.5 * best.residual * best.residual;
    debug!(
        %parameter,
        value = best.value,
        cost,
        evaluations = estimate.evaluations,
        method = ?estimate.method,
        "parameter search finished"
    );
    if cost <= threshold {
        Ok(SearchOutcome {
            parameter,
            value: best.value,
            cost,
            evaluations: estimate.evaluations,
            solution: best.solution,
            params: best.params,
        })
    } else {
        warn!(%parameter, value = best.value, cost, threshold, "no feasible parameter");
        Err(SolverError::NoFeasibleParameter {
            parameter,
            best_value: best.value,
            best_cost: cost,
            best: Some(Box::new(best.solution)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RootOptions {
        RootOptions {
            scan_steps: 100,
            max_bisections: 80,
            golden_iterations: 80,
        }
    }

    fn two_roots(x: f64) -> SolverResult<Option<f64>> {
        Ok(Some((x - 0.1) * (x - 0.74)))
    }

    #[test]
    fn initial_guess_selects_nearest_root() {
        let low = find_root(two_roots, 0.0, 1.0, 0.2, &options()).unwrap();
        assert_eq!(low.method, RootMethod::Bisection);
        assert!((low.x - 0.1).abs() < 1e-9);

        let high = find_root(two_roots, 0.0, 1.0, 0.6, &options()).unwrap();
        assert!((high.x - 0.74).abs() < 1e-9);
    }

    #[test]
    fn exact_guess_stops_immediately() {
        let est = find_root(|x: f64| Ok(Some(x - 0.5)), 0.0, 1.0, 0.5, &options()).unwrap();
        assert_eq!(est.method, RootMethod::Exact);
        assert_eq!(est.evaluations, 1);
    }

    #[test]
    fn guess_outside_bounds_is_clamped() {
        let est = find_root(|x: f64| Ok(Some(x - 3.0)), 0.0, 10.0, 50.0, &options()).unwrap();
        assert!((est.x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn golden_section_without_sign_change() {
        let est = find_root(
            |x: f64| Ok(Some((x - 0.3) * (x - 0.3) + 1.0)),
            0.0,
            1.0,
            0.9,
            &options(),
        )
        .unwrap();
        assert_eq!(est.method, RootMethod::GoldenSection);
        assert!((est.x - 0.3).abs() < 1e-4);
        assert!((est.residual - 1.0).abs() < 1e-8);
    }

    #[test]
    fn failed_evaluations_never_bracket() {
        // Root at 0.1 hidden behind a failing region.
        let f = |x: f64| {
            if x < 0.3 {
                Ok(None)
            } else {
                Ok(Some(x - 0.1))
            }
        };
        let est = find_root(f, 0.0, 1.0, 0.5, &options()).unwrap();
        assert_eq!(est.method, RootMethod::GoldenSection);
        assert!(est.x >= 0.3);
        assert!(est.residual.is_finite());
    }

    #[test]
    fn errors_abort_the_search() {
        let f = |_x: f64| -> SolverResult<Option<f64>> {
            Err(SolverError::DeadlineExceeded {
                what: "test",
                best: None,
            })
        };
        assert!(matches!(
            find_root(f, 0.0, 1.0, 0.5, &options()),
            Err(SolverError::DeadlineExceeded { .. })
        ));
    }

    #[test]
    fn invalid_bounds() {
        assert!(find_root(two_roots, 1.0, 0.0, 0.5, &options()).is_err());
    }

    #[test]
    fn parameter_accessors() {
        use ahu_elements::{AirCondition, Envelope};
        let mut p = OperatingParameters::new(
            1.0,
            AirCondition::new(0.0, 0.5),
            AirCondition::new(20.0, 0.5),
            Envelope {
                ua: 0.0,
                infiltration: 0.0,
                sensible_load: 0.0,
                latent_load: 0.0,
            },
        );
        FreeParameter::Bypass.set(&mut p, 0.25);
        FreeParameter::SupplyFlow.set(&mut p, 3.0);
        assert_eq!(FreeParameter::Bypass.get(&p), 0.25);
        assert_eq!(p.supply_flow, 3.0);
        assert_eq!(FreeParameter::Bypass.default_bounds(), (0.0, 1.0));
        assert_eq!(FreeParameter::SupplyFlow.default_threshold(), 1e-4);
        assert_eq!(FreeParameter::SupplyFlow.to_string(), "supply flow");
    }
}
