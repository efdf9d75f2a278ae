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

//! This module contains the configuration generators. Each generator implements [`CfgGen`] and
//! renders one pass (base interfaces, ISIS, or BGP) of the configuration of a single node.
//! [`generate_all`] runs a list of passes for every node of a [`Topology`], and
//! [`write_configs`] stores the result as one file per hostname.
//!
//! ```
//! # use topocfg::config::GeneratorConfig;
//! # use topocfg::export::{generate_all, isis::{self, IsisTopology}, InterfaceCfgGen};
//! # use topocfg::topology::Topology;
//! # use topocfg::types::{AddressFamily, ConfigGenError};
//! # fn main() -> Result<(), ConfigGenError> {
//! let config = GeneratorConfig::default();
//! let mut topo = Topology::new(&config)?;
//! let r1 = topo.add_node("r1", Some("1.1.1.1".parse().unwrap()), None)?;
//! let r2 = topo.add_node("r2", Some("2.2.2.2".parse().unwrap()), None)?;
//! topo.add_link(r1, r2)?;
//!
//! let mut igp = IsisTopology::new(&topo, "core", &config);
//! igp.generate(
//!     &topo,
//!     isis::build_link_metrics(&topo, |_, _| vec![(AddressFamily::Ipv4Unicast, 10)]),
//!     isis::build_identifier_metrics(&topo, |_| vec![(AddressFamily::Ipv4Unicast, 1)]),
//! )?;
//!
//! let configs = generate_all(&topo, &config, &[&InterfaceCfgGen, &igp])?;
//! assert!(configs["r1"].starts_with("hostname r1\n"));
//! assert!(configs["r2"].contains("router isis core"));
//! # Ok(())
//! # }
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    config::GeneratorConfig,
    topology::Topology,
    types::{ConfigGenError, NodeId},
    writer::{write_file, ConfigWriter, WriteMode, CONFIG_EXTENSION},
};

pub mod bgp;
mod interfaces;
pub mod isis;

pub use bgp::BgpTopology;
pub use interfaces::{interface_config, InterfaceCfgGen};
pub use isis::IsisTopology;

/// A configuration pass that renders one part of the configuration of a node.
pub trait CfgGen: Sync {
    /// Render the configuration of `node` into `writer`. Implementations start with
    /// `writer.line_return()` and leave the writer at depth 0.
    fn generate_config(
        &self,
        topo: &Topology,
        node: NodeId,
        writer: &mut ConfigWriter,
    ) -> Result<(), ConfigGenError>;
}

/// Run all `passes` in order for a single node, and return the configuration text.
pub fn generate_node(
    topo: &Topology,
    config: &GeneratorConfig,
    passes: &[&dyn CfgGen],
    node: NodeId,
) -> Result<String, ConfigGenError> {
    let mut writer = ConfigWriter::from_config(config);
    for pass in passes {
        pass.generate_config(topo, node, &mut writer)?;
    }
    writer.build()
}

/// Run all `passes` for every node of the topology, and return the configuration text of each
/// node, indexed by its hostname. Nodes are processed in parallel. The first error aborts the
/// whole run.
pub fn generate_all(
    topo: &Topology,
    config: &GeneratorConfig,
    passes: &[&dyn CfgGen],
) -> Result<BTreeMap<String, String>, ConfigGenError> {
    let nodes: Vec<NodeId> = topo.node_ids().collect();
    nodes
        .into_par_iter()
        .map(|node| -> Result<(String, String), ConfigGenError> {
            let hostname = topo.node(node)?.hostname().to_string();
            let text = generate_node(topo, config, passes, node)?;
            log::trace!("Generated {} lines for {}", text.lines().count(), hostname);
            Ok((hostname, text))
        })
        .collect()
}

/// Generate the configuration of all nodes and write it to `<dir>/<hostname>.conf`. The
/// directory is created if it does not exist. Nothing is written if the generation fails for any
/// node. Returns the paths of all written files.
pub fn write_configs(
    topo: &Topology,
    config: &GeneratorConfig,
    passes: &[&dyn CfgGen],
    dir: impl AsRef<Path>,
    mode: WriteMode,
) -> Result<Vec<PathBuf>, ConfigGenError> {
    let dir = dir.as_ref();
    let configs = generate_all(topo, config, passes)?;
    fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(configs.len());
    for (hostname, mut text) in configs {
        if !text.is_empty() {
            text.push('\n');
        }
        let path = dir.join(format!("{hostname}.{CONFIG_EXTENSION}"));
        write_file(&path, &text, mode)?;
        paths.push(path);
    }
    log::info!("Wrote {} configuration files to {}", paths.len(), dir.display());
    Ok(paths)
}
