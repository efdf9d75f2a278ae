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

//! BGP configuration pass.
//!
//! Nodes join BGP with [`BgpTopology::add_node`]. Prefixes advertised by a node are materialized as
//! additional loopback interfaces on the [`Topology`] while the BGP topology is built, such that
//! the base interface pass also renders them. Sessions are configured explicitly, either towards
//! another BGP node of the topology ([`BgpTopology::add_neighbor`]) or towards an arbitrary
//! address ([`BgpTopology::add_external_neighbor`]). All sessions use the identity interface as
//! update source.
//!
//! Every process renders one `address-family` block per [`AddressFamily`] variant, even if it
//! advertises no network in that family.

use std::{collections::HashMap, net::Ipv4Addr};

use ipnet::Ipv4Net;

use crate::{
    topology::{Topology, BGP_REACHABLE},
    types::{AddressFamily, AsId, ConfigGenError, NodeId},
    writer::ConfigWriter,
};

use super::CfgGen;

/// A BGP session as seen from the local node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpNeighbor {
    address: Ipv4Addr,
    asn: AsId,
    update_source: String,
    address_families: Vec<AddressFamily>,
}

impl BgpNeighbor {
    /// Address of the remote peer.
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// AS number of the remote peer.
    pub fn asn(&self) -> AsId {
        self.asn
    }

    /// Name of the local interface used as source of the session.
    pub fn update_source(&self) -> &str {
        &self.update_source
    }

    /// Address families activated on this session.
    pub fn address_families(&self) -> &[AddressFamily] {
        &self.address_families
    }

    fn write_config(&self, writer: &mut ConfigWriter) {
        writer
            .add(format!("neighbor {}", self.address))
            .indent()
            .add(format!("remote-as {}", self.asn.0))
            .add(format!("update-source {}", self.update_source));
        for af in self.address_families.iter() {
            writer.add(format!("address-family {af}")).indent().unindent();
        }
        writer.unindent();
    }
}

/// The BGP process of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpNode {
    asn: AsId,
    prefixes: Vec<(Ipv4Net, Vec<AddressFamily>)>,
    neighbors: Vec<BgpNeighbor>,
}

impl BgpNode {
    /// AS number of the node.
    pub fn asn(&self) -> AsId {
        self.asn
    }

    /// Advertised networks together with the address families in which they are advertised.
    pub fn prefixes(&self) -> &[(Ipv4Net, Vec<AddressFamily>)] {
        &self.prefixes
    }

    /// All configured sessions.
    pub fn neighbors(&self) -> &[BgpNeighbor] {
        &self.neighbors
    }

    /// Advertised networks of a single address family, in registration order.
    fn networks(&self, af: AddressFamily) -> impl Iterator<Item = Ipv4Net> + '_ {
        self.prefixes
            .iter()
            .filter(move |(_, afs)| afs.contains(&af))
            .map(|(net, _)| *net)
    }
}

/// BGP configuration of a topology.
///
/// ```
/// # use topocfg::config::GeneratorConfig;
/// # use topocfg::export::{bgp::BgpTopology, CfgGen};
/// # use topocfg::topology::Topology;
/// # use topocfg::types::{AddressFamily, ConfigGenError};
/// # use topocfg::writer::ConfigWriter;
/// # fn main() -> Result<(), ConfigGenError> {
/// let config = GeneratorConfig::default();
/// let mut topo = Topology::new(&config)?;
/// let r1 = topo.add_node("r1", Some("1.1.1.1".parse().unwrap()), None)?;
/// let r2 = topo.add_node("r2", Some("2.2.2.2".parse().unwrap()), None)?;
/// topo.add_link(r1, r2)?;
///
/// let mut bgp = BgpTopology::new();
/// bgp.add_node(r1, 10);
/// bgp.add_node(r2, 20);
/// bgp.add_neighbor(&topo, r1, r2, vec![AddressFamily::Ipv4Unicast])?;
///
/// let mut w = ConfigWriter::new();
/// bgp.generate_config(&topo, r1, &mut w)?;
/// assert_eq!(
///     w.build()?,
///     "\
/// router bgp 10
///  bgp router-id 1.1.1.1
///  address-family ipv4 unicast
///  !
///  address-family ipv6 unicast
///  !
///  neighbor 2.2.2.2
///   remote-as 20
///   update-source Loopback 0
///   address-family ipv4 unicast
///   !
///  !
/// !"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BgpTopology {
    nodes: HashMap<NodeId, BgpNode>,
}

impl BgpTopology {
    /// Create an empty BGP topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a BGP process on `node`. If the node already runs BGP, only its AS number is
    /// updated.
    pub fn add_node(&mut self, node: NodeId, asn: impl Into<AsId>) {
        let asn = asn.into();
        self.nodes
            .entry(node)
            .and_modify(|n| n.asn = asn)
            .or_insert_with(|| BgpNode {
                asn,
                prefixes: Vec::new(),
                neighbors: Vec::new(),
            });
    }

    /// Get the BGP process of a node.
    pub fn node(&self, node: NodeId) -> Result<&BgpNode, ConfigGenError> {
        self.nodes
            .get(&node)
            .ok_or(ConfigGenError::BgpNotEnabled(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut BgpNode, ConfigGenError> {
        self.nodes
            .get_mut(&node)
            .ok_or(ConfigGenError::BgpNotEnabled(node))
    }

    /// Advertise `network` from `node` in the given address families. A loopback interface with
    /// address `interface_address` (described as `BGP Reachable`) is added to the node in the
    /// topology.
    pub fn add_prefix(
        &mut self,
        topo: &mut Topology,
        node: NodeId,
        interface_address: Ipv4Net,
        network: Ipv4Net,
        address_families: Vec<AddressFamily>,
    ) -> Result<(), ConfigGenError> {
        let bgp_node = self.node_mut(node)?;
        topo.add_loopback(node, interface_address, Some(BGP_REACHABLE.to_string()))?;
        bgp_node.prefixes.push((network, address_families));
        log::debug!("{node:?} advertises {network} in BGP");
        Ok(())
    }

    /// Configure a session from `node` to `neighbor`. The remote address is the identity of
    /// `neighbor`, and the remote AS is the AS number of its BGP process.
    pub fn add_neighbor(
        &mut self,
        topo: &Topology,
        node: NodeId,
        neighbor: NodeId,
        address_families: Vec<AddressFamily>,
    ) -> Result<(), ConfigGenError> {
        let asn = self.node(neighbor)?.asn;
        let address = topo
            .node(neighbor)?
            .identity()
            .ok_or(ConfigGenError::MissingIdentity(neighbor))?;
        self.add_external_neighbor(topo, node, address, asn, address_families)
    }

    /// Configure a session from `node` to an arbitrary peer address.
    pub fn add_external_neighbor(
        &mut self,
        topo: &Topology,
        node: NodeId,
        address: Ipv4Addr,
        asn: impl Into<AsId>,
        address_families: Vec<AddressFamily>,
    ) -> Result<(), ConfigGenError> {
        let update_source = topo.identity_interface(node)?.name().to_string();
        let neighbor = BgpNeighbor {
            address,
            asn: asn.into(),
            update_source,
            address_families,
        };
        self.node_mut(node)?.neighbors.push(neighbor);
        Ok(())
    }
}

impl CfgGen for BgpTopology {
    fn generate_config(
        &self,
        topo: &Topology,
        node: NodeId,
        writer: &mut ConfigWriter,
    ) -> Result<(), ConfigGenError> {
        writer.line_return();
        let Some(bgp_node) = self.nodes.get(&node) else {
            return Ok(());
        };
        let identity = topo
            .node(node)?
            .identity()
            .ok_or(ConfigGenError::MissingIdentity(node))?;

        writer
            .add(format!("router bgp {}", bgp_node.asn.0))
            .indent()
            .add(format!("bgp router-id {identity}"));
        for af in AddressFamily::ALL {
            writer.add(format!("address-family {af}")).indent();
            writer.add_all(bgp_node.networks(af).map(|net| format!("network {net}")));
            writer.unindent();
        }
        for neighbor in bgp_node.neighbors.iter() {
            neighbor.write_config(writer);
        }
        writer.unindent();
        Ok(())
    }
}
