//! The active configuration of a chart set.
//!
//! A configuration is a tree that mirrors the currently active path through
//! the chart hierarchy: every region holds exactly one active state, and an
//! active state that owns regions holds one child per region, in
//! declaration order. Nodes store arena indices only.
//!
//! Paths address the tree by identifiers. At each region set a segment names
//! a parallel region key first, otherwise a state of one of the regions:
//! `["DASHBOARD", "issues", "ERROR"]`.

use crate::chart::{Chart, RegionDef};
use crate::core::{ChartId, StateId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Region id used for the implicit top-level region.
pub const ROOT_REGION: &str = "root";

/// One region of the configuration tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ActiveRegion {
    pub(crate) chart: ChartId,
    pub(crate) state: StateId,
    /// Stamp shared by every node activated by the same transition
    pub(crate) entered: u64,
    pub(crate) children: Vec<ActiveRegion>,
}

/// Position of a region: its index among the root regions, then the index
/// among the children of each active state on the way down.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RegionAddr(pub(crate) Vec<usize>);

/// One activation of a state at a region address.
///
/// Two activations of the same state at the same address differ by their
/// stamp, so a state that was left and re-entered is never mistaken for
/// the original.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Activation {
    pub(crate) addr: RegionAddr,
    pub(crate) state: StateId,
    pub(crate) entered: u64,
}

impl ActiveRegion {
    /// Activate `chart` at its initial state, recursively.
    pub(crate) fn activate<S>(chart: &Chart<S>, chart_id: ChartId, entered: u64) -> Self {
        Self::enter(chart, chart_id, chart.chart(chart_id).initial, entered)
    }

    /// Activate `state` of `chart_id`, then the initial state of every
    /// region it owns.
    pub(crate) fn enter<S>(chart: &Chart<S>, chart_id: ChartId, state: StateId, entered: u64) -> Self {
        let children = chart
            .state(state)
            .regions
            .iter()
            .map(|region| Self::activate(chart, region.chart, entered))
            .collect();
        Self {
            chart: chart_id,
            state,
            entered,
            children,
        }
    }

    fn activation(&self, addr: &[usize]) -> Activation {
        Activation {
            addr: RegionAddr(addr.to_vec()),
            state: self.state,
            entered: self.entered,
        }
    }

    /// Activations of this subtree, outermost first. `addr` is the address
    /// of this region.
    pub(crate) fn entry_order(&self, addr: &mut Vec<usize>, out: &mut Vec<Activation>) {
        out.push(self.activation(addr));
        for (i, child) in self.children.iter().enumerate() {
            addr.push(i);
            child.entry_order(addr, out);
            addr.pop();
        }
    }

    /// Activations of this subtree, innermost first.
    pub(crate) fn exit_order(&self, addr: &mut Vec<usize>, out: &mut Vec<Activation>) {
        for (i, child) in self.children.iter().enumerate() {
            addr.push(i);
            child.exit_order(addr, out);
            addr.pop();
        }
        out.push(self.activation(addr));
    }
}

/// Description of one region owned by an active state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Parallel region key, `None` for an implicit region
    pub key: Option<String>,
    /// Identifier of the region's active state
    pub active: String,
}

/// Per leaf region, the chain of active identifiers from the root.
///
/// Region ids are the dotted parallel keys along the way, or
/// [`ROOT_REGION`] when there are none.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, Vec<String>>);

impl Snapshot {
    pub fn get(&self, region: &str) -> Option<&[String]> {
        self.0.get(region).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (region, chain)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{region}: {}", chain.join(" > "))?;
        }
        Ok(())
    }
}

/// A position reached while walking a path.
#[derive(Clone, Copy)]
pub(crate) enum Cursor<'a> {
    /// A region set: the children of an active state, or the root.
    Set {
        regions: &'a [ActiveRegion],
        defs: &'a [RegionDef],
    },
    /// A single region selected by its parallel key.
    One(&'a ActiveRegion),
}

impl<'a> Cursor<'a> {
    /// Step into `segment`. `None` means the segment is not active.
    pub(crate) fn step<S>(self, chart: &'a Chart<S>, segment: &str) -> Option<Cursor<'a>> {
        match self {
            Cursor::Set { regions, defs } => {
                let keyed = defs
                    .iter()
                    .position(|def| def.key.as_deref() == Some(segment));
                if let Some(index) = keyed {
                    return regions.get(index).map(Cursor::One);
                }
                regions
                    .iter()
                    .find(|region| chart.state(region.state).id == segment)
                    .map(|region| Cursor::inside(chart, region))
            }
            Cursor::One(region) => {
                (chart.state(region.state).id == segment).then(|| Cursor::inside(chart, region))
            }
        }
    }

    fn inside<S>(chart: &'a Chart<S>, region: &'a ActiveRegion) -> Cursor<'a> {
        Cursor::Set {
            regions: &region.children,
            defs: &chart.state(region.state).regions,
        }
    }

    fn regions<S>(self, chart: &'a Chart<S>) -> Vec<RegionInfo> {
        let describe = |key: Option<&String>, region: &ActiveRegion| RegionInfo {
            key: key.cloned(),
            active: chart.state(region.state).id.clone(),
        };
        match self {
            Cursor::Set { regions, defs } => regions
                .iter()
                .zip(defs)
                .map(|(region, def)| describe(def.key.as_ref(), region))
                .collect(),
            Cursor::One(region) => vec![describe(None, region)],
        }
    }
}

/// The active configuration of a chart set.
///
/// The default value is the empty configuration of a stopped interpreter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configuration {
    regions: Vec<ActiveRegion>,
}

impl Configuration {
    /// Activate the initial state of every root region and, recursively,
    /// of every region those states own. Hooks are not run here.
    pub fn initialize<S>(chart: &Chart<S>) -> Self {
        let regions = chart
            .root
            .iter()
            .map(|region| ActiveRegion::activate(chart, region.chart, 0))
            .collect();
        Self { regions }
    }

    /// Whether the identifiers along `path` are all active.
    ///
    /// The empty path addresses the root and is always active.
    pub fn is_active<S>(&self, chart: &Chart<S>, path: &[&str]) -> bool {
        self.resolve(chart, path).is_some()
    }

    /// Regions owned by whatever `path` addresses, or `None` when the path
    /// is not active. A leaf state owns no regions.
    pub fn regions_of<S>(&self, chart: &Chart<S>, path: &[&str]) -> Option<Vec<RegionInfo>> {
        self.resolve(chart, path).map(|cursor| cursor.regions(chart))
    }

    /// Per leaf region, the chain of active identifiers from the root.
    pub fn snapshot<S>(&self, chart: &Chart<S>) -> Snapshot {
        let mut out = BTreeMap::new();
        collect(chart, &self.regions, &chart.root, None, &[], &mut out);
        Snapshot(out)
    }

    /// Every active state, outermost first, regions in declaration order.
    pub fn active_states(&self) -> Vec<StateId> {
        self.entry_order()
            .into_iter()
            .map(|activation| activation.state)
            .collect()
    }

    pub(crate) fn root<'a, S>(&'a self, chart: &'a Chart<S>) -> Cursor<'a> {
        Cursor::Set {
            regions: &self.regions,
            defs: &chart.root,
        }
    }

    fn resolve<'a, S>(&'a self, chart: &'a Chart<S>, path: &[&str]) -> Option<Cursor<'a>> {
        path.iter()
            .try_fold(self.root(chart), |cursor, segment| cursor.step(chart, segment))
    }

    /// Every region with its address, outermost first.
    pub(crate) fn walk(&self) -> Vec<(RegionAddr, &ActiveRegion)> {
        fn visit<'a>(
            region: &'a ActiveRegion,
            addr: &mut Vec<usize>,
            out: &mut Vec<(RegionAddr, &'a ActiveRegion)>,
        ) {
            out.push((RegionAddr(addr.clone()), region));
            for (i, child) in region.children.iter().enumerate() {
                addr.push(i);
                visit(child, addr, out);
                addr.pop();
            }
        }

        let mut out = Vec::new();
        for (i, region) in self.regions.iter().enumerate() {
            visit(region, &mut vec![i], &mut out);
        }
        out
    }

    pub(crate) fn region(&self, addr: &RegionAddr) -> Option<&ActiveRegion> {
        let (first, rest) = addr.0.split_first()?;
        rest.iter()
            .try_fold(self.regions.get(*first)?, |region, i| region.children.get(*i))
    }

    /// Whether `activation` is still in place: its region holds the same
    /// state from the same activation.
    pub(crate) fn holds(&self, activation: &Activation) -> bool {
        self.region(&activation.addr).is_some_and(|region| {
            region.state == activation.state && region.entered == activation.entered
        })
    }

    /// Swap the region at `addr` for a freshly entered subtree.
    pub(crate) fn replace(&mut self, addr: &RegionAddr, next: ActiveRegion) -> bool {
        let Some((first, rest)) = addr.0.split_first() else {
            return false;
        };
        let mut slot = match self.regions.get_mut(*first) {
            Some(slot) => slot,
            None => return false,
        };
        for i in rest {
            slot = match slot.children.get_mut(*i) {
                Some(child) => child,
                None => return false,
            };
        }
        *slot = next;
        true
    }

    /// Snapshot id of the region at `addr`.
    pub(crate) fn region_id<S>(&self, chart: &Chart<S>, addr: &RegionAddr) -> String {
        let mut keys: Vec<&str> = Vec::new();
        let mut defs: &[RegionDef] = &chart.root;
        let mut regions: &[ActiveRegion] = &self.regions;
        for i in &addr.0 {
            let (Some(def), Some(region)) = (defs.get(*i), regions.get(*i)) else {
                break;
            };
            if let Some(key) = &def.key {
                keys.push(key);
            }
            defs = &chart.state(region.state).regions;
            regions = &region.children;
        }
        if keys.is_empty() {
            ROOT_REGION.to_string()
        } else {
            keys.join(".")
        }
    }

    /// Every activation, outermost first.
    pub(crate) fn entry_order(&self) -> Vec<Activation> {
        let mut out = Vec::new();
        for (i, region) in self.regions.iter().enumerate() {
            region.entry_order(&mut vec![i], &mut out);
        }
        out
    }

    /// Every activation, innermost first.
    pub(crate) fn exit_order(&self) -> Vec<Activation> {
        let mut out = Vec::new();
        for (i, region) in self.regions.iter().enumerate() {
            region.exit_order(&mut vec![i], &mut out);
        }
        out
    }

    /// Activations of the subtree at `addr`, outermost first.
    pub(crate) fn entries_at(&self, addr: &RegionAddr) -> Vec<Activation> {
        let mut out = Vec::new();
        if let Some(region) = self.region(addr) {
            region.entry_order(&mut addr.0.clone(), &mut out);
        }
        out
    }

    /// Activations of the subtree at `addr`, innermost first.
    pub(crate) fn exits_at(&self, addr: &RegionAddr) -> Vec<Activation> {
        let mut out = Vec::new();
        if let Some(region) = self.region(addr) {
            region.exit_order(&mut addr.0.clone(), &mut out);
        }
        out
    }
}

fn collect<S>(
    chart: &Chart<S>,
    regions: &[ActiveRegion],
    defs: &[RegionDef],
    prefix: Option<&str>,
    chain: &[String],
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (region, def) in regions.iter().zip(defs) {
        let id = match (&def.key, prefix) {
            (Some(key), Some(prefix)) => Some(format!("{prefix}.{key}")),
            (Some(key), None) => Some(key.clone()),
            (None, prefix) => prefix.map(str::to_string),
        };
        let mut chain = chain.to_vec();
        chain.push(chart.state(region.state).id.clone());

        if region.children.is_empty() {
            out.insert(id.unwrap_or_else(|| ROOT_REGION.to_string()), chain);
        } else {
            let defs = &chart.state(region.state).regions;
            collect(chart, &region.children, defs, id.as_deref(), &chain, out);
        }
    }
}
