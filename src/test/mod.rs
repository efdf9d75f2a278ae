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

use std::net::Ipv4Addr;

use crate::{
    config::GeneratorConfig,
    topology::{Topology, TopologyDescription},
    types::NodeId,
};

mod test_export;

/// Build a ring of `n` nodes called `xr1` to `xr<n>`, with identity `i.i.i.i` and a management
/// address in `192.168.0.0/24`. Node `i` is connected to node `i + 1`, and the last node to the
/// first one.
pub(self) fn ring(config: &GeneratorConfig, n: usize) -> (Topology, Vec<NodeId>) {
    let mut topo = Topology::new(config).unwrap();
    let ids: Vec<NodeId> = (1..=n)
        .map(|i| {
            let x = i as u8;
            topo.add_node(
                format!("xr{i}"),
                Some(Ipv4Addr::new(x, x, x, x)),
                Some(format!("192.168.0.{}/24", 119 + i).parse().unwrap()),
            )
            .unwrap()
        })
        .collect();
    for i in 0..n {
        topo.add_link(ids[i], ids[(i + 1) % n]).unwrap();
    }
    (topo, ids)
}

pub(self) fn ring_description() -> TopologyDescription {
    serde_json::from_str(
        r#"{
            "nodes": [
                {"hostname": "xr1", "identity": "1.1.1.1", "mgmt": "192.168.0.120/24"},
                {"hostname": "xr2", "identity": "2.2.2.2", "mgmt": "192.168.0.121/24"},
                {"hostname": "xr3", "identity": "3.3.3.3", "mgmt": "192.168.0.122/24"},
                {"hostname": "xr4", "identity": "4.4.4.4", "mgmt": "192.168.0.123/24"}
            ],
            "links": [[0, 1], [1, 2], [2, 3], [3, 0]]
        }"#,
    )
    .unwrap()
}
