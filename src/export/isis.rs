// TopoCfg: Router configuration synthesis written in Rust
// Copyright (C) 2022-2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! ISIS configuration pass. The [`IsisTopology`] registers, for every node, the interfaces that
//! participate in the ISIS process together with their metric per address family. All interfaces
//! refer to the interfaces allocated in the [`Topology`]; this module never modifies the topology.

use std::{collections::HashMap, net::Ipv4Addr};

use itertools::Itertools;

use crate::{
    config::{GeneratorConfig, IsisConfig},
    topology::{Interface, Topology},
    types::{AddressFamily, ConfigGenError, InterfaceKind, IsLevel, NodeId},
    writer::ConfigWriter,
};

use super::CfgGen;

/// Metric of an interface for each address family.
pub type AfMetrics = Vec<(AddressFamily, u32)>;

/// Compute the ISIS network entity title of a node from its identity address. Each octet is
/// zero-padded to three digits, and the digits are regrouped in blocks of three between the AFI
/// plus area and the selector.
///
/// ```
/// # use topocfg::config::IsisConfig;
/// # use topocfg::export::isis::net_id;
/// let config = IsisConfig::default();
/// assert_eq!(net_id("1.1.1.1".parse().unwrap(), &config), "49.0001.001.001.001.001.00");
/// assert_eq!(net_id("10.0.255.3".parse().unwrap(), &config), "49.0001.010.000.255.003.00");
/// ```
pub fn net_id(identity: Ipv4Addr, config: &IsisConfig) -> String {
    let digits: String = identity.octets().iter().map(|o| format!("{o:03}")).collect();
    let groups = digits
        .chars()
        .chunks(3)
        .into_iter()
        .map(|c| c.collect::<String>())
        .collect::<Vec<_>>();
    let id = [config.afi.clone(), config.area.clone()]
        .into_iter()
        .chain(groups)
        .chain(std::iter::once(config.selector.clone()))
        .join(".");
    id
}

/// An interface registered for ISIS, referring to the interface index on the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsisInterface {
    iface: usize,
    metrics: AfMetrics,
}

impl IsisInterface {
    /// Create a new ISIS interface for the interface at index `iface`.
    pub fn new(iface: usize, metrics: AfMetrics) -> Self {
        Self { iface, metrics }
    }

    /// Index of the interface on its node.
    pub fn iface(&self) -> usize {
        self.iface
    }

    /// Metric per address family.
    pub fn metrics(&self) -> &[(AddressFamily, u32)] {
        &self.metrics
    }
}

/// The ISIS process of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsisNode {
    node: NodeId,
    net_id: Option<String>,
    interfaces: Vec<IsisInterface>,
}

impl IsisNode {
    /// The node in the topology.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Network entity title, or `None` if the node has no identity address.
    pub fn net_id(&self) -> Option<&str> {
        self.net_id.as_deref()
    }

    /// All interfaces registered for this ISIS process, in registration order.
    pub fn interfaces(&self) -> &[IsisInterface] {
        &self.interfaces
    }
}

/// ISIS configuration of all nodes in a topology.
#[derive(Debug, Clone)]
pub struct IsisTopology {
    process: String,
    is_level: IsLevel,
    address_families: Vec<AddressFamily>,
    nodes: HashMap<NodeId, IsisNode>,
}

impl IsisTopology {
    /// Create an ISIS process called `process` on every node of the topology. No interface is
    /// registered yet.
    pub fn new(topo: &Topology, process: impl Into<String>, config: &GeneratorConfig) -> Self {
        let nodes = topo
            .nodes()
            .map(|(id, node)| {
                (
                    id,
                    IsisNode {
                        node: id,
                        net_id: node.identity().map(|ip| net_id(ip, &config.isis)),
                        interfaces: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            process: process.into(),
            is_level: config.isis.is_level,
            address_families: config.isis.address_families.clone(),
            nodes,
        }
    }

    /// Name of the ISIS process.
    pub fn process(&self) -> &str {
        &self.process
    }

    /// Get the ISIS process of a node.
    pub fn node(&self, node: NodeId) -> Result<&IsisNode, ConfigGenError> {
        self.nodes.get(&node).ok_or(ConfigGenError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut IsisNode, ConfigGenError> {
        self.nodes
            .get_mut(&node)
            .ok_or(ConfigGenError::UnknownNode(node))
    }

    /// Register the identity interface (`Loopback 0`) of a node. It is rendered as passive.
    pub fn up_identifier_link(
        &mut self,
        node: NodeId,
        metrics: AfMetrics,
    ) -> Result<(), ConfigGenError> {
        let isis_node = self.node_mut(node)?;
        if isis_node.net_id.is_none() {
            return Err(ConfigGenError::MissingIdentity(node));
        }
        // the identity is always the first interface
        isis_node.interfaces.push(IsisInterface::new(0, metrics));
        Ok(())
    }

    /// Register the interface on node `i` that faces node `j`.
    pub fn add_link(
        &mut self,
        topo: &Topology,
        i: NodeId,
        j: NodeId,
        metrics: AfMetrics,
    ) -> Result<(), ConfigGenError> {
        let iface = topo.local_interface_index(i, j)?;
        self.node_mut(i)?
            .interfaces
            .push(IsisInterface::new(iface, metrics));
        Ok(())
    }

    /// Register an arbitrary interface of a node. Management interfaces are accepted, but never
    /// rendered.
    pub fn add_interface(
        &mut self,
        topo: &Topology,
        node: NodeId,
        iface: usize,
        metrics: AfMetrics,
    ) -> Result<(), ConfigGenError> {
        let kind = topo
            .node(node)?
            .interface(iface)
            .ok_or(ConfigGenError::UnknownInterface(node, iface))?
            .kind();
        if kind == InterfaceKind::Management {
            log::warn!("Management interface {iface} of {node:?} will not be part of ISIS");
        }
        self.node_mut(node)?
            .interfaces
            .push(IsisInterface::new(iface, metrics));
        Ok(())
    }

    /// Register all identity interfaces first, then all links in the given order.
    pub fn generate(
        &mut self,
        topo: &Topology,
        link_metrics: impl IntoIterator<Item = ((NodeId, NodeId), AfMetrics)>,
        identifier_metrics: impl IntoIterator<Item = (NodeId, AfMetrics)>,
    ) -> Result<(), ConfigGenError> {
        for (node, metrics) in identifier_metrics {
            self.up_identifier_link(node, metrics)?;
        }
        for ((i, j), metrics) in link_metrics {
            self.add_link(topo, i, j, metrics)?;
        }
        Ok(())
    }
}

/// Call `f` for both directions of every link in the topology, and collect the metrics for
/// [`IsisTopology::generate`].
pub fn build_link_metrics<F>(topo: &Topology, mut f: F) -> Vec<((NodeId, NodeId), AfMetrics)>
where
    F: FnMut(NodeId, NodeId) -> AfMetrics,
{
    topo.links()
        .flat_map(|link| {
            let [(a, _), (b, _)] = link.endpoints();
            [(a, b), (b, a)]
        })
        .map(|(a, b)| ((a, b), f(a, b)))
        .collect()
}

/// Call `f` for every node that has an identity address, and collect the metrics for
/// [`IsisTopology::generate`].
pub fn build_identifier_metrics<F>(topo: &Topology, mut f: F) -> Vec<(NodeId, AfMetrics)>
where
    F: FnMut(NodeId) -> AfMetrics,
{
    topo.nodes()
        .filter(|(_, node)| node.identity().is_some())
        .map(|(id, _)| (id, f(id)))
        .collect()
}

/// Render the ISIS block of a single interface at the current depth of the writer. Loopbacks
/// are passive, data interfaces are point-to-point, and management interfaces are skipped.
///
/// ```
/// # use topocfg::export::isis::isis_interface_config;
/// # use topocfg::topology::Interface;
/// # use topocfg::types::{AddressFamily, InterfaceKind};
/// # use topocfg::writer::ConfigWriter;
/// let iface = Interface::new(InterfaceKind::Data, 2, "192.168.1.0/24".parse().unwrap());
/// let mut w = ConfigWriter::new();
/// isis_interface_config(&iface, &[(AddressFamily::Ipv4Unicast, 10)], &mut w);
/// assert_eq!(
///     w.to_string(),
///     "\
/// interface GigabitEthernet 0/0/0/2
///  point-to-point
///  address-family ipv4 unicast
///   metric 10
///  !
/// !"
/// );
/// ```
pub fn isis_interface_config(
    iface: &Interface,
    metrics: &[(AddressFamily, u32)],
    writer: &mut ConfigWriter,
) {
    let mode = match iface.kind() {
        InterfaceKind::Loopback => "passive",
        InterfaceKind::Data => "point-to-point",
        InterfaceKind::Management => return,
    };
    writer
        .add(format!("interface {}", iface.name()))
        .indent()
        .add(mode);
    for (af, metric) in metrics {
        writer
            .add(format!("address-family {af}"))
            .indent()
            .add(format!("metric {metric}"))
            .unindent();
    }
    writer.unindent();
}

impl CfgGen for IsisTopology {
    fn generate_config(
        &self,
        topo: &Topology,
        node: NodeId,
        writer: &mut ConfigWriter,
    ) -> Result<(), ConfigGenError> {
        let isis_node = self.node(node)?;
        let net_id = isis_node
            .net_id()
            .ok_or(ConfigGenError::MissingIdentity(node))?;
        let topo_node = topo.node(node)?;

        writer
            .line_return()
            .add(format!("router isis {}", self.process))
            .indent()
            .add(format!("is-type {}", self.is_level))
            .add(format!("net {net_id}"));
        for af in self.address_families.iter() {
            writer
                .add(format!("address-family {af}"))
                .indent()
                .add("metric-style wide")
                .unindent();
        }
        for isis_iface in isis_node.interfaces() {
            let iface = topo_node
                .interface(isis_iface.iface())
                .ok_or(ConfigGenError::UnknownInterface(node, isis_iface.iface()))?;
            isis_interface_config(iface, isis_iface.metrics(), writer);
        }
        writer.unindent();
        log::trace!(
            "rendered ISIS process {} of {}",
            self.process,
            topo_node.hostname()
        );
        Ok(())
    }
}
