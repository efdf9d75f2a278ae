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

//! Module containing all type definitions

use std::fmt::Display;

use ipnet::Ipv4Net;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) type IndexType = u32;
/// Node Identification (and index into the topology graph)
pub type NodeId = NodeIndex<IndexType>;

/// AS Number
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AsId(pub u32);

impl Display for AsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AS{}", self.0)
    }
}

impl From<u32> for AsId {
    fn from(x: u32) -> Self {
        Self(x)
    }
}

impl From<u16> for AsId {
    fn from(x: u16) -> Self {
        Self(x as u32)
    }
}

impl From<usize> for AsId {
    fn from(x: usize) -> Self {
        Self(x as u32)
    }
}

impl From<i32> for AsId {
    fn from(x: i32) -> Self {
        Self(x as u32)
    }
}

/// Routed protocol class for which separate advertisement and metric blocks are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressFamily {
    /// IPv4 Unicast
    #[serde(rename = "ipv4 unicast")]
    Ipv4Unicast,
    /// IPv6 Unicast
    #[serde(rename = "ipv6 unicast")]
    Ipv6Unicast,
}

impl AddressFamily {
    /// All address families known to the generators, in rendering order.
    pub const ALL: [AddressFamily; 2] = [AddressFamily::Ipv4Unicast, AddressFamily::Ipv6Unicast];

    /// Text used in the `address-family` command.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4Unicast => "ipv4 unicast",
            AddressFamily::Ipv6Unicast => "ipv6 unicast",
        }
    }
}

impl Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISIS circuit level of a router process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IsLevel {
    /// Level 1 only
    #[serde(rename = "level-1")]
    Level1,
    /// Level 1 and Level 2
    #[serde(rename = "level-1-2")]
    Level12,
    /// Level 2 only
    #[default]
    #[serde(rename = "level-2-only")]
    Level2Only,
}

impl IsLevel {
    /// Text used in the `is-type` command.
    pub const fn as_str(&self) -> &'static str {
        match self {
            IsLevel::Level1 => "level-1",
            IsLevel::Level12 => "level-1-2",
            IsLevel::Level2Only => "level-2-only",
        }
    }
}

impl Display for IsLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of an interface on a node. Each kind has its own naming scheme and its own allocation
/// counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceKind {
    /// Loopback interface (the identity, or a prefix originated by the node)
    Loopback,
    /// Point-to-point data link
    Data,
    /// Out-of-band management interface
    Management,
}

impl InterfaceKind {
    /// Get the interface name of the `idx`-th interface of that kind.
    ///
    /// ```
    /// # use topocfg::types::InterfaceKind;
    /// assert_eq!(InterfaceKind::Loopback.iface_name(0), "Loopback 0");
    /// assert_eq!(InterfaceKind::Data.iface_name(3), "GigabitEthernet 0/0/0/3");
    /// assert_eq!(InterfaceKind::Management.iface_name(0), "MgmtEth 0/RP0/CPU0/0");
    /// ```
    pub fn iface_name(&self, idx: usize) -> String {
        match self {
            InterfaceKind::Loopback => format!("Loopback {idx}"),
            InterfaceKind::Data => format!("GigabitEthernet 0/0/0/{idx}"),
            InterfaceKind::Management => format!("MgmtEth 0/RP0/CPU0/{idx}"),
        }
    }
}

impl Display for InterfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceKind::Loopback => f.write_str("loopback"),
            InterfaceKind::Data => f.write_str("data"),
            InterfaceKind::Management => f.write_str("management"),
        }
    }
}

/// Error thrown while building the topology or generating the configuration.
#[derive(Debug, Error)]
pub enum ConfigGenError {
    /// The netmask is invalid.
    #[error("Invalid Netmask: {0}")]
    InvalidNetmask(#[from] ipnet::PrefixLenError),
    /// The link prefix length leaves less than two usable addresses.
    #[error("Link prefix length /{0} does not leave room for two endpoints!")]
    LinkPrefixTooLong(u8),
    /// The address block cannot supply another subnet.
    #[error("IP address could not be assigned! {0} ran out of addresses.")]
    NotEnoughAddresses(Ipv4Net),
    /// The node does not exist in the topology.
    #[error("Node {0:?} was not found in the topology!")]
    UnknownNode(NodeId),
    /// The node has no interface with this index.
    #[error("Node {0:?} has no interface with index {1}!")]
    UnknownInterface(NodeId, usize),
    /// No node with this hostname exists.
    #[error("Hostname {0} was not found in the topology!")]
    UnknownHostname(String),
    /// Two nodes share the same hostname.
    #[error("Hostname {0} is used more than once!")]
    DuplicateHostname(String),
    /// A link must connect two distinct nodes.
    #[error("Cannot connect node {0:?} with itself!")]
    SelfLoop(NodeId),
    /// The two nodes are already connected.
    #[error("Nodes {0:?} and {1:?} are already connected!")]
    LinkExists(NodeId, NodeId),
    /// The two nodes are not connected.
    #[error("Node {0:?} and {1:?} are not connected!")]
    RouterNotConnectedTo(NodeId, NodeId),
    /// Serialization was called while a block was still open.
    #[error("Configuration still has {0} open block(s)!")]
    UnbalancedBlock(usize),
    /// The node was built without an identity address.
    #[error("Node {0:?} has no identity address!")]
    MissingIdentity(NodeId),
    /// The node has no BGP process.
    #[error("Node {0:?} has no BGP process!")]
    BgpNotEnabled(NodeId),
    /// Error while reading or writing files.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    /// Error while parsing a configuration or topology file.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}
