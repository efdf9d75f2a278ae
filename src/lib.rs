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

#![deny(missing_docs, missing_debug_implementations)]

//! # TopoCfg
//!
//! This is a library for synthesizing vendor-style router configuration for a network of routers
//! connected by point-to-point links.
//!
//! ## Main Concepts
//!
//! The [`topology::Topology`] is the main datastructure. It stores all nodes and links on a graph
//! (see [Petgraph](https://docs.rs/petgraph/latest/petgraph/index.html)). Adding a link draws the
//! next subnet from the [`allocator::AddressAllocator`] and creates one data interface on each
//! endpoint. Once the topology is built, it is only read by the configuration passes in
//! [`export`]:
//!
//! - [`export::InterfaceCfgGen`] renders the hostname and all interfaces,
//! - [`export::IsisTopology`] renders one ISIS process per node,
//! - [`export::BgpTopology`] renders one BGP process per node that runs BGP.
//!
//! All passes render into a [`writer::ConfigWriter`], which tracks the nesting depth and closes
//! each block with `!`. All settings are collected in a [`config::GeneratorConfig`], which is
//! passed by reference and never modified.
//!
//! ## Example usage
//!
//! The following example builds a ring of four routers, enables ISIS on all links, and writes
//! one configuration file per router.
//!
//! ```
//! use topocfg::prelude::*;
//! use topocfg::export::isis;
//!
//! fn main() -> Result<(), ConfigGenError> {
//!     let config = GeneratorConfig::default();
//!     let description: TopologyDescription = serde_json::from_str(r#"{
//!         "nodes": [
//!             {"hostname": "xr1", "identity": "1.1.1.1", "mgmt": "192.168.0.120/24"},
//!             {"hostname": "xr2", "identity": "2.2.2.2", "mgmt": "192.168.0.121/24"},
//!             {"hostname": "xr3", "identity": "3.3.3.3", "mgmt": "192.168.0.122/24"},
//!             {"hostname": "xr4", "identity": "4.4.4.4", "mgmt": "192.168.0.123/24"}
//!         ],
//!         "links": [[0, 1], [1, 2], [2, 3], [3, 0]]
//!     }"#)?;
//!     let topo = Topology::from_description(&config, &description)?;
//!
//!     let mut igp = IsisTopology::new(&topo, "core", &config);
//!     igp.generate(
//!         &topo,
//!         isis::build_link_metrics(&topo, |_, _| vec![(AddressFamily::Ipv4Unicast, 10)]),
//!         isis::build_identifier_metrics(&topo, |_| vec![(AddressFamily::Ipv4Unicast, 1)]),
//!     )?;
//!
//!     let dir = std::env::temp_dir().join("topocfg-ring");
//!     let passes: [&dyn CfgGen; 2] = [&InterfaceCfgGen, &igp];
//!     let files = write_configs(&topo, &config, &passes, &dir, WriteMode::Overwrite)?;
//!     assert_eq!(files.len(), 4);
//!     # std::fs::remove_dir_all(&dir)?;
//!     Ok(())
//! }
//! ```

pub mod allocator;
pub mod config;
pub mod export;
pub mod prelude;
pub mod topology;
pub mod types;
pub mod writer;

#[cfg(test)]
mod test;
