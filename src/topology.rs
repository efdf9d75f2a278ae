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

//! Module containing the point-to-point topology. The [`Topology`] owns all nodes, their
//! interfaces, and the links between them. Interfaces are allocated eagerly while the topology is
//! built, such that protocol generators only need to read the graph afterwards.

use std::{
    collections::{hash_map::Entry, HashMap},
    fs,
    net::Ipv4Addr,
    path::Path,
};

use ipnet::Ipv4Net;
use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};

use crate::{
    allocator::AddressAllocator,
    config::GeneratorConfig,
    types::{ConfigGenError, IndexType, InterfaceKind, NodeId},
};

/// Description of loopback interfaces that hold prefixes advertised in BGP.
pub const BGP_REACHABLE: &str = "BGP Reachable";

/// A single interface of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interface {
    kind: InterfaceKind,
    name: String,
    network: Ipv4Net,
    description: Option<String>,
    cdp: bool,
}

impl Interface {
    /// Create the `idx`-th interface of the given kind. CDP is disabled and no description is set.
    ///
    /// ```
    /// # use topocfg::topology::Interface;
    /// # use topocfg::types::InterfaceKind;
    /// let iface = Interface::new(InterfaceKind::Data, 2, "172.50.0.1/24".parse().unwrap())
    ///     .with_cdp(true);
    /// assert_eq!(iface.name(), "GigabitEthernet 0/0/0/2");
    /// assert_eq!(iface.address().to_string(), "172.50.0.1");
    /// assert!(iface.cdp());
    /// ```
    pub fn new(kind: InterfaceKind, idx: usize, network: Ipv4Net) -> Self {
        Self {
            kind,
            name: kind.iface_name(idx),
            network,
            description: None,
            cdp: false,
        }
    }

    /// Set the description of the interface.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Enable or disable CDP on the interface. Only relevant for data interfaces.
    pub fn with_cdp(mut self, cdp: bool) -> Self {
        self.cdp = cdp;
        self
    }

    /// Kind of the interface.
    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    /// Name of the interface, like `Loopback 0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interface address, including the prefix length. Bare addresses have prefix length 32.
    pub fn network(&self) -> Ipv4Net {
        self.network
    }

    /// Interface address without the prefix length.
    pub fn address(&self) -> Ipv4Addr {
        self.network.addr()
    }

    /// Optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether CDP is enabled on this interface.
    pub fn cdp(&self) -> bool {
        self.cdp
    }
}

/// A router in the topology, together with its ordered list of interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    hostname: String,
    identity: Option<Ipv4Addr>,
    mgmt: Option<Ipv4Net>,
    cdp: bool,
    interfaces: Vec<Interface>,
    next_loopback: usize,
    next_data: usize,
    next_mgmt: usize,
}

impl Node {
    /// Create a new node. The identity (if present) becomes `Loopback 0` at interface index 0, and
    /// the management address (if present) is added right after.
    pub fn new(
        hostname: impl Into<String>,
        identity: Option<Ipv4Addr>,
        mgmt: Option<Ipv4Net>,
        cdp: bool,
    ) -> Self {
        let mut node = Self {
            hostname: hostname.into(),
            identity,
            mgmt,
            cdp,
            interfaces: Vec::new(),
            next_loopback: 0,
            next_data: 0,
            next_mgmt: 0,
        };
        if let Some(identity) = identity {
            node.add_interface(InterfaceKind::Loopback, identity.into(), None, false);
        }
        if let Some(mgmt) = mgmt {
            node.add_interface(InterfaceKind::Management, mgmt, None, false);
        }
        node
    }

    /// Hostname of the node.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Identity address, used as router-id.
    pub fn identity(&self) -> Option<Ipv4Addr> {
        self.identity
    }

    /// Management address.
    pub fn mgmt(&self) -> Option<Ipv4Net> {
        self.mgmt
    }

    /// Whether CDP is enabled globally on the node.
    pub fn cdp(&self) -> bool {
        self.cdp
    }

    /// All interfaces in allocation order.
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// Get the interface at the given index.
    pub fn interface(&self, idx: usize) -> Option<&Interface> {
        self.interfaces.get(idx)
    }

    /// The interface holding the identity address. This is always the first interface of a node
    /// that was created with an identity, and `None` otherwise.
    pub fn identity_interface(&self) -> Option<&Interface> {
        self.identity.and_then(|_| self.interfaces.first())
    }

    /// Append a new interface of the given kind and return its index. The name is drawn from the
    /// counter of that kind.
    fn add_interface(
        &mut self,
        kind: InterfaceKind,
        network: Ipv4Net,
        description: Option<String>,
        cdp: bool,
    ) -> usize {
        let counter = match kind {
            InterfaceKind::Loopback => &mut self.next_loopback,
            InterfaceKind::Data => &mut self.next_data,
            InterfaceKind::Management => &mut self.next_mgmt,
        };
        let mut iface = Interface::new(kind, *counter, network).with_cdp(cdp);
        *counter += 1;
        iface.description = description;
        self.interfaces.push(iface);
        self.interfaces.len() - 1
    }
}

/// A point-to-point link. Each endpoint is stored as the node and the index of the data interface
/// on that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    network: Ipv4Net,
    endpoints: [(NodeId, usize); 2],
}

impl Link {
    /// Subnet allocated for this link.
    pub fn network(&self) -> Ipv4Net {
        self.network
    }

    /// Both endpoints, in the order in which the link was added.
    pub fn endpoints(&self) -> [(NodeId, usize); 2] {
        self.endpoints
    }
}

/// The point-to-point topology.
///
/// ```
/// # use topocfg::config::GeneratorConfig;
/// # use topocfg::topology::Topology;
/// # use topocfg::types::ConfigGenError;
/// # fn main() -> Result<(), ConfigGenError> {
/// let mut topo = Topology::new(&GeneratorConfig::default())?;
/// let r1 = topo.add_node("r1", Some("1.1.1.1".parse().unwrap()), None)?;
/// let r2 = topo.add_node("r2", Some("2.2.2.2".parse().unwrap()), None)?;
/// topo.add_link(r1, r2)?;
///
/// assert_eq!(topo.local_interface(r1, r2)?.network().to_string(), "172.50.0.1/24");
/// assert_eq!(topo.local_interface(r2, r1)?.network().to_string(), "172.50.0.2/24");
/// // r1 reaches r2 through the address on the far end of the link
/// assert_eq!(topo.transmit_interface(r1, r2)?.network().to_string(), "172.50.0.2/24");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Topology {
    graph: UnGraph<Node, Link, IndexType>,
    allocator: AddressAllocator,
    /// Index of the interface on the first node that faces the second node.
    mapping: HashMap<(NodeId, NodeId), usize>,
    names: HashMap<String, NodeId>,
    cdp: bool,
}

impl Topology {
    /// Create an empty topology. Returns an error if the link network and prefix length of the
    /// config cannot be used to allocate point-to-point subnets.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigGenError> {
        let prefix_len = config.topology.data_link_prefix_len;
        if prefix_len > 30 && prefix_len <= 32 {
            return Err(ConfigGenError::LinkPrefixTooLong(prefix_len));
        }
        Ok(Self {
            graph: UnGraph::default(),
            allocator: AddressAllocator::new(config.topology.data_link_network, prefix_len)?,
            mapping: HashMap::new(),
            names: HashMap::new(),
            cdp: config.cdp,
        })
    }

    /// Build the topology from a description. All nodes are added first, then all links in the
    /// given order. The first error aborts the construction.
    pub fn from_description(
        config: &GeneratorConfig,
        description: &TopologyDescription,
    ) -> Result<Self, ConfigGenError> {
        let mut topo = Self::new(config)?;
        let ids = description
            .nodes
            .iter()
            .map(|n| topo.add_node(n.hostname.as_str(), n.identity, n.mgmt))
            .collect::<Result<Vec<_>, _>>()?;
        let lookup = |i: usize| {
            ids.get(i)
                .copied()
                .ok_or(ConfigGenError::UnknownNode(NodeId::new(i)))
        };
        for &(i, j) in description.links.iter() {
            topo.add_link(lookup(i)?, lookup(j)?)?;
        }
        Ok(topo)
    }

    /// Add a new node and return its id. Hostnames must be unique.
    pub fn add_node(
        &mut self,
        hostname: impl Into<String>,
        identity: Option<Ipv4Addr>,
        mgmt: Option<Ipv4Net>,
    ) -> Result<NodeId, ConfigGenError> {
        let hostname = hostname.into();
        match self.names.entry(hostname) {
            Entry::Occupied(e) => Err(ConfigGenError::DuplicateHostname(e.key().clone())),
            Entry::Vacant(e) => {
                let node = Node::new(e.key().as_str(), identity, mgmt, self.cdp);
                let id = self.graph.add_node(node);
                log::debug!("Added node {} as {:?}", e.key(), id);
                e.insert(id);
                Ok(id)
            }
        }
    }

    /// Connect two nodes with a point-to-point link. The next subnet is drawn from the allocator;
    /// the first usable address goes to `i`, and the second one to `j`. Each node gets a new data
    /// interface.
    pub fn add_link(&mut self, i: NodeId, j: NodeId) -> Result<(), ConfigGenError> {
        if i == j {
            return Err(ConfigGenError::SelfLoop(i));
        }
        self.node(i)?;
        self.node(j)?;
        if self.mapping.contains_key(&(i, j)) {
            return Err(ConfigGenError::LinkExists(i, j));
        }

        let net = self.allocator.next()?;
        let mut hosts = net.hosts();
        let mut endpoint = || -> Result<Ipv4Net, ConfigGenError> {
            let addr = hosts.next().ok_or(ConfigGenError::NotEnoughAddresses(net))?;
            Ok(Ipv4Net::new(addr, net.prefix_len())?)
        };
        let (addr_i, addr_j) = (endpoint()?, endpoint()?);

        let cdp = self.cdp;
        let idx_i = self.graph[i].add_interface(InterfaceKind::Data, addr_i, None, cdp);
        let idx_j = self.graph[j].add_interface(InterfaceKind::Data, addr_j, None, cdp);
        self.mapping.insert((i, j), idx_i);
        self.mapping.insert((j, i), idx_j);
        self.graph.add_edge(
            i,
            j,
            Link {
                network: net,
                endpoints: [(i, idx_i), (j, idx_j)],
            },
        );
        log::debug!(
            "Added link {} <-> {} using {}",
            self.graph[i].hostname(),
            self.graph[j].hostname(),
            net
        );
        Ok(())
    }

    /// Append a loopback interface to a node and return its index.
    pub fn add_loopback(
        &mut self,
        node: NodeId,
        network: Ipv4Net,
        description: Option<String>,
    ) -> Result<usize, ConfigGenError> {
        let node = self
            .graph
            .node_weight_mut(node)
            .ok_or(ConfigGenError::UnknownNode(node))?;
        Ok(node.add_interface(InterfaceKind::Loopback, network, description, false))
    }

    /// Get the interface that node `i` dials to reach node `j`, which is the endpoint of the link
    /// on node `j`. Returns `ConfigGenError::RouterNotConnectedTo` if the two nodes are not
    /// connected.
    pub fn transmit_interface(&self, i: NodeId, j: NodeId) -> Result<&Interface, ConfigGenError> {
        self.local_interface(j, i).map_err(|_| ConfigGenError::RouterNotConnectedTo(i, j))
    }

    /// Get the interface on node `i` that faces node `j`.
    pub fn local_interface(&self, i: NodeId, j: NodeId) -> Result<&Interface, ConfigGenError> {
        let idx = self.local_interface_index(i, j)?;
        self.node(i)?
            .interface(idx)
            .ok_or(ConfigGenError::UnknownInterface(i, idx))
    }

    /// Get the index of the interface on node `i` that faces node `j`.
    pub fn local_interface_index(&self, i: NodeId, j: NodeId) -> Result<usize, ConfigGenError> {
        self.mapping
            .get(&(i, j))
            .copied()
            .ok_or(ConfigGenError::RouterNotConnectedTo(i, j))
    }

    /// Get the identity interface (`Loopback 0`) of a node.
    pub fn identity_interface(&self, node: NodeId) -> Result<&Interface, ConfigGenError> {
        self.node(node)?
            .identity_interface()
            .ok_or(ConfigGenError::MissingIdentity(node))
    }

    /// Get the subnet of the link between `i` and `j`.
    pub fn link_network(&self, i: NodeId, j: NodeId) -> Result<Ipv4Net, ConfigGenError> {
        self.graph
            .find_edge(i, j)
            .and_then(|e| self.graph.edge_weight(e))
            .map(|l| l.network)
            .ok_or(ConfigGenError::RouterNotConnectedTo(i, j))
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> Result<&Node, ConfigGenError> {
        self.graph
            .node_weight(id)
            .ok_or(ConfigGenError::UnknownNode(id))
    }

    /// Get the id of the node with the given hostname.
    pub fn node_id(&self, hostname: impl AsRef<str>) -> Result<NodeId, ConfigGenError> {
        self.names
            .get(hostname.as_ref())
            .copied()
            .ok_or_else(|| ConfigGenError::UnknownHostname(hostname.as_ref().to_string()))
    }

    /// Iterate over all node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.graph
            .node_indices()
            .map(move |id| (id, &self.graph[id]))
    }

    /// Iterate over all links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.graph.raw_edges().iter().map(|e| &e.weight)
    }

    /// Neighbors of a node.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.neighbors(node)
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of links.
    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether CDP is enabled.
    pub fn cdp(&self) -> bool {
        self.cdp
    }

    /// Allocator used for link subnets.
    pub fn allocator(&self) -> &AddressAllocator {
        &self.allocator
    }
}

/// Serializable description of a topology, used by [`Topology::from_description`].
///
/// ```
/// # use topocfg::topology::TopologyDescription;
/// let desc: TopologyDescription = serde_json::from_str(r#"{
///     "nodes": [
///         {"hostname": "xr1", "identity": "1.1.1.1", "mgmt": "192.168.0.120/24"},
///         {"hostname": "xr2", "identity": "2.2.2.2"}
///     ],
///     "links": [[0, 1]]
/// }"#).unwrap();
/// assert_eq!(desc.nodes.len(), 2);
/// assert_eq!(desc.nodes[1].mgmt, None);
/// assert_eq!(desc.links, vec![(0, 1)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDescription {
    /// All nodes. Links refer to them by their position in this list.
    pub nodes: Vec<NodeDescription>,
    /// Links as pairs of node positions.
    #[serde(default)]
    pub links: Vec<(usize, usize)>,
}

/// A single node of a [`TopologyDescription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Unique hostname.
    pub hostname: String,
    /// Identity address.
    #[serde(default)]
    pub identity: Option<Ipv4Addr>,
    /// Management interface address.
    #[serde(default)]
    pub mgmt: Option<Ipv4Net>,
}

impl TopologyDescription {
    /// Read the description from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigGenError> {
        let path = path.as_ref();
        log::debug!("Reading topology description from {}", path.display());
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}
