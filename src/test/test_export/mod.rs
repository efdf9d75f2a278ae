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

use std::collections::HashSet;

use maplit::{btreemap, hashmap};
use pretty_assertions::{assert_eq, assert_str_eq};

use super::ring;
use crate::{
    config::GeneratorConfig,
    export::{
        bgp::BgpTopology,
        generate_all, generate_node,
        isis::{self, IsisTopology},
        write_configs, CfgGen, InterfaceCfgGen,
    },
    topology::Topology,
    types::{
        AddressFamily::{Ipv4Unicast, Ipv6Unicast},
        ConfigGenError, NodeId,
    },
    writer::WriteMode,
};

/// Ring of four nodes with ISIS on all links. `xr1` and `xr3` run BGP in AS 65001 and peer with
/// each other, and `xr1` advertises `100.0.0.0/24`.
fn ring_with_protocols(
    config: &GeneratorConfig,
) -> (Topology, Vec<NodeId>, IsisTopology, BgpTopology) {
    let (mut topo, ids) = ring(config, 4);

    let mut bgp = BgpTopology::new();
    bgp.add_node(ids[0], 65001);
    bgp.add_node(ids[2], 65001);
    bgp.add_prefix(
        &mut topo,
        ids[0],
        "100.0.0.1/24".parse().unwrap(),
        "100.0.0.0/24".parse().unwrap(),
        vec![Ipv4Unicast],
    )
    .unwrap();
    bgp.add_neighbor(&topo, ids[0], ids[2], vec![Ipv4Unicast]).unwrap();
    bgp.add_neighbor(&topo, ids[2], ids[0], vec![Ipv4Unicast]).unwrap();

    let mut igp = IsisTopology::new(&topo, "core", config);
    igp.generate(
        &topo,
        btreemap! {
            (ids[0], ids[1]) => vec![(Ipv4Unicast, 10)],
            (ids[1], ids[2]) => vec![(Ipv4Unicast, 10)],
            (ids[2], ids[3]) => vec![(Ipv4Unicast, 10)],
            (ids[3], ids[0]) => vec![(Ipv4Unicast, 10)],
            (ids[1], ids[0]) => vec![(Ipv4Unicast, 10)],
            (ids[2], ids[1]) => vec![(Ipv4Unicast, 10)],
            (ids[3], ids[2]) => vec![(Ipv4Unicast, 10)],
            (ids[0], ids[3]) => vec![(Ipv4Unicast, 10)],
        },
        hashmap! {
            ids[0] => vec![(Ipv4Unicast, 1)],
            ids[1] => vec![(Ipv4Unicast, 1)],
            ids[2] => vec![(Ipv4Unicast, 1)],
            ids[3] => vec![(Ipv4Unicast, 1)],
        },
    )
    .unwrap();

    (topo, ids, igp, bgp)
}

#[test_log::test]
fn ring_configuration_files() {
    let config = GeneratorConfig::default();
    let (topo, _, igp, bgp) = ring_with_protocols(&config);
    let dir = tempfile::tempdir().unwrap();
    let files = write_configs(
        &topo,
        &config,
        &[&InterfaceCfgGen, &igp, &bgp],
        dir.path(),
        WriteMode::Overwrite,
    )
    .unwrap();
    assert_eq!(files.len(), 4);

    let read = |host: &str| {
        std::fs::read_to_string(dir.path().join(format!("{host}.conf"))).unwrap()
    };
    assert_str_eq!(read("xr1"), include_str!("ring/xr1.conf"));
    assert_str_eq!(read("xr3"), include_str!("ring/xr3.conf"));
}

#[test]
fn ring_isis_interfaces_and_net_ids() {
    let config = GeneratorConfig::default();
    let (topo, ids) = ring(&config, 4);
    let mut igp = IsisTopology::new(&topo, "core", &config);
    igp.generate(
        &topo,
        isis::build_link_metrics(&topo, |_, _| vec![(Ipv4Unicast, 10)]),
        isis::build_identifier_metrics(&topo, |_| vec![(Ipv4Unicast, 1)]),
    )
    .unwrap();

    let configs = generate_all(&topo, &config, &[&igp]).unwrap();
    assert_eq!(configs.len(), 4);
    for text in configs.values() {
        let blocks = text.lines().filter(|l| l.starts_with(" interface ")).count();
        assert_eq!(blocks, 3);
        // management interfaces never appear in ISIS
        assert!(!text.contains("MgmtEth"));
    }

    let net_ids: HashSet<_> = ids
        .iter()
        .map(|id| igp.node(*id).unwrap().net_id().unwrap().to_string())
        .collect();
    assert_eq!(net_ids.len(), 4);
    assert!(net_ids.contains("49.0001.001.001.001.001.00"));
}

#[test]
fn isis_link_uses_local_interface() {
    let config = GeneratorConfig::default();
    let (topo, ids) = ring(&config, 4);
    let mut igp = IsisTopology::new(&topo, "core", &config);
    igp.add_link(&topo, ids[0], ids[1], vec![(Ipv4Unicast, 10)]).unwrap();
    let registered = igp.node(ids[0]).unwrap().interfaces()[0].iface();
    assert_eq!(registered, topo.local_interface_index(ids[0], ids[1]).unwrap());

    let own = topo.local_interface(ids[0], ids[1]).unwrap();
    let remote = topo.transmit_interface(ids[0], ids[1]).unwrap();
    assert_eq!(topo.node(ids[0]).unwrap().interface(registered), Some(own));
    assert_ne!(own.address(), remote.address());
    assert!(topo.link_network(ids[0], ids[1]).unwrap().contains(&remote.address()));
}

#[test]
fn append_passes() {
    let config = GeneratorConfig::default();
    let (topo, _, igp, bgp) = ring_with_protocols(&config);
    let dir = tempfile::tempdir().unwrap();
    write_configs(
        &topo,
        &config,
        &[&InterfaceCfgGen],
        dir.path(),
        WriteMode::Overwrite,
    )
    .unwrap();
    write_configs(&topo, &config, &[&igp], dir.path(), WriteMode::Append).unwrap();
    write_configs(&topo, &config, &[&bgp], dir.path(), WriteMode::Append).unwrap();

    let text = std::fs::read_to_string(dir.path().join("xr1.conf")).unwrap();
    assert_str_eq!(text, include_str!("ring/xr1.conf"));

    // overwriting replaces everything
    write_configs(&topo, &config, &[&bgp], dir.path(), WriteMode::Overwrite).unwrap();
    let text = std::fs::read_to_string(dir.path().join("xr1.conf")).unwrap();
    assert!(text.starts_with("router bgp 65001\n"));
    // nodes without BGP get an empty file
    let text = std::fs::read_to_string(dir.path().join("xr2.conf")).unwrap();
    assert_str_eq!(text, "");
}

#[test]
fn isis_and_bgp_families_are_independent() {
    let config = GeneratorConfig::default();
    let (topo, ids, igp, bgp) = ring_with_protocols(&config);
    let isis_text = generate_node(&topo, &config, &[&igp], ids[0]).unwrap();
    assert!(!isis_text.contains("ipv6 unicast"));
    let bgp_text = generate_node(&topo, &config, &[&bgp], ids[0]).unwrap();
    assert!(bgp_text.contains(" address-family ipv6 unicast\n !\n"));

    let mut config = GeneratorConfig::default();
    config.isis.address_families = vec![Ipv6Unicast];
    let (topo, ids, igp, _) = ring_with_protocols(&config);
    let isis_text = generate_node(&topo, &config, &[&igp], ids[0]).unwrap();
    assert!(isis_text.contains(" address-family ipv6 unicast\n  metric-style wide\n !\n"));
    assert!(!isis_text.contains(" address-family ipv4 unicast\n  metric-style wide"));
}

#[test]
fn parallel_matches_sequential() {
    let config = GeneratorConfig::default();
    let (topo, ids, igp, bgp) = ring_with_protocols(&config);
    let passes: [&dyn CfgGen; 3] = [&InterfaceCfgGen, &igp, &bgp];
    let configs = generate_all(&topo, &config, &passes).unwrap();
    for id in ids {
        let hostname = topo.node(id).unwrap().hostname();
        assert_str_eq!(
            configs[hostname],
            generate_node(&topo, &config, &passes, id).unwrap()
        );
    }
}

#[test_log::test]
fn failure_writes_nothing() {
    let config = GeneratorConfig::default();
    let (mut topo, ids) = ring(&config, 3);
    let anonymous = topo.add_node("anonymous", None, None).unwrap();
    topo.add_link(ids[0], anonymous).unwrap();

    let mut igp = IsisTopology::new(&topo, "core", &config);
    igp.generate(
        &topo,
        isis::build_link_metrics(&topo, |_, _| vec![(Ipv4Unicast, 10)]),
        isis::build_identifier_metrics(&topo, |_| vec![(Ipv4Unicast, 1)]),
    )
    .unwrap();
    assert!(matches!(
        igp.up_identifier_link(anonymous, vec![]),
        Err(ConfigGenError::MissingIdentity(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("configs");
    let result = write_configs(
        &topo,
        &config,
        &[&InterfaceCfgGen, &igp],
        &out,
        WriteMode::Overwrite,
    );
    assert!(matches!(result, Err(ConfigGenError::MissingIdentity(n)) if n == anonymous));
    assert!(!out.exists());

    // without ISIS, the node without identity is fine
    let files =
        write_configs(&topo, &config, &[&InterfaceCfgGen], &out, WriteMode::Overwrite).unwrap();
    assert_eq!(files.len(), 4);
}

#[test]
fn isis_link_without_connection() {
    let config = GeneratorConfig::default();
    let (topo, ids) = ring(&config, 4);
    let mut igp = IsisTopology::new(&topo, "core", &config);
    assert!(matches!(
        igp.add_link(&topo, ids[0], ids[2], vec![(Ipv4Unicast, 10)]),
        Err(ConfigGenError::RouterNotConnectedTo(a, b)) if a == ids[0] && b == ids[2]
    ));
    assert!(igp.node(ids[0]).unwrap().interfaces().is_empty());
}

#[test]
fn isis_unknown_interface_index() {
    let config = GeneratorConfig::default();
    let (topo, ids) = ring(&config, 3);
    let mut igp = IsisTopology::new(&topo, "core", &config);
    let num_ifaces = topo.node(ids[1]).unwrap().interfaces().len();
    assert!(matches!(
        igp.add_interface(&topo, ids[1], num_ifaces, vec![(Ipv4Unicast, 1)]),
        Err(ConfigGenError::UnknownInterface(n, i)) if n == ids[1] && i == num_ifaces
    ));
    // the node itself exists, so this is not reported as an unknown node
    assert!(!matches!(
        igp.add_interface(&topo, ids[1], num_ifaces, vec![]),
        Err(ConfigGenError::UnknownNode(_))
    ));
    assert!(igp.node(ids[1]).unwrap().interfaces().is_empty());
}

#[test]
fn isis_management_interface() {
    let config = GeneratorConfig::default();
    let (topo, ids) = ring(&config, 3);
    let mut igp = IsisTopology::new(&topo, "core", &config);
    igp.up_identifier_link(ids[0], vec![(Ipv4Unicast, 1)]).unwrap();
    // interface 1 is the management interface
    igp.add_interface(&topo, ids[0], 1, vec![(Ipv4Unicast, 1)]).unwrap();
    assert!(matches!(
        igp.add_interface(&topo, ids[0], 42, vec![]),
        Err(ConfigGenError::UnknownInterface(n, 42)) if n == ids[0]
    ));
    let text = generate_node(&topo, &config, &[&igp], ids[0]).unwrap();
    assert_str_eq!(
        text,
        "\
router isis core
 is-type level-2-only
 net 49.0001.001.001.001.001.00
 address-family ipv4 unicast
  metric-style wide
 !
 interface Loopback 0
  passive
  address-family ipv4 unicast
   metric 1
  !
 !
!"
    );
}
