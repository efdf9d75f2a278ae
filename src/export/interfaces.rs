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

//! Base configuration pass: hostname and interface addressing.

use crate::{
    topology::{Interface, Topology},
    types::{ConfigGenError, InterfaceKind, NodeId},
    writer::ConfigWriter,
};

use super::CfgGen;

/// Configuration pass that renders the hostname, the global CDP setting, and one `interface`
/// block per interface of the node, in allocation order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceCfgGen;

impl CfgGen for InterfaceCfgGen {
    fn generate_config(
        &self,
        topo: &Topology,
        node: NodeId,
        writer: &mut ConfigWriter,
    ) -> Result<(), ConfigGenError> {
        let node = topo.node(node)?;
        writer.line_return();
        writer.add(format!("hostname {}", node.hostname()));
        if node.cdp() {
            writer.add("cdp");
        }
        for iface in node.interfaces() {
            interface_config(iface, writer);
        }
        log::trace!("rendered {} interfaces of {}", node.interfaces().len(), node.hostname());
        Ok(())
    }
}

/// Render the block of a single interface at the current depth of the writer.
///
/// ```
/// # use topocfg::export::interface_config;
/// # use topocfg::topology::Interface;
/// # use topocfg::types::InterfaceKind;
/// # use topocfg::writer::ConfigWriter;
/// let iface = Interface::new(InterfaceKind::Loopback, 0, "192.168.1.1/24".parse().unwrap());
/// let mut w = ConfigWriter::new();
/// interface_config(&iface, &mut w);
/// assert_eq!(
///     w.to_string(),
///     "interface Loopback 0\n no shutdown\n ipv4 address 192.168.1.1/24\n!"
/// );
/// ```
pub fn interface_config(iface: &Interface, writer: &mut ConfigWriter) {
    writer
        .add(format!("interface {}", iface.name()))
        .indent()
        .add("no shutdown")
        .add_all(iface.description().map(|d| format!("description {d}")));
    if iface.kind() == InterfaceKind::Data && iface.cdp() {
        writer.add("cdp");
    }
    writer
        .add(format!("ipv4 address {}", iface.network()))
        .unindent();
}
