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

//! Generator settings. The [`GeneratorConfig`] is read once (either constructed in code or parsed
//! from a JSON file) and then passed by reference to every constructor that needs it. Nothing in
//! this crate mutates it after construction.
//!
//! The following are the default values:
//!
//! - `cdp`: `true`
//! - `indent`: `" "`
//! - `topology.data-link-network`: `172.50.0.0/16`
//! - `topology.data-link-prefix-len`: `24`
//! - `isis.afi`: `"49"`
//! - `isis.area`: `"0001"`
//! - `isis.selector`: `"00"`
//! - `isis.is-level`: `level-2-only`
//! - `isis.address-families`: `["ipv4 unicast"]`
//!
//! BGP does not take a family list from here: every BGP process renders one `address-family`
//! block per [`AddressFamily`] variant.

use std::{fs, path::Path};

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::types::{AddressFamily, ConfigGenError, IsLevel};

/// Settings for the whole generation run.
///
/// ```
/// # use topocfg::config::GeneratorConfig;
/// # use topocfg::types::IsLevel;
/// let config: GeneratorConfig = serde_json::from_str(r#"{
///     "cdp": false,
///     "topology": { "data-link-prefix-len": 30 },
///     "isis": { "is-level": "level-1-2" }
/// }"#).unwrap();
/// assert!(!config.cdp);
/// assert_eq!(config.topology.data_link_prefix_len, 30);
/// assert_eq!(
///     config.topology.data_link_network,
///     "172.50.0.0/16".parse::<ipnet::Ipv4Net>().unwrap()
/// );
/// assert_eq!(config.isis.is_level, IsLevel::Level12);
/// assert_eq!(config.isis.afi, "49");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    /// Enable CDP globally and on all data links.
    pub cdp: bool,
    /// Text prepended once per nesting level.
    pub indent: String,
    /// Address allocation for point-to-point links.
    pub topology: TopologyConfig,
    /// ISIS identifiers.
    pub isis: IsisConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cdp: true,
            indent: String::from(" "),
            topology: Default::default(),
            isis: Default::default(),
        }
    }
}

impl GeneratorConfig {
    /// Read the configuration from a JSON file. Missing keys take their default value.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigGenError> {
        let path = path.as_ref();
        log::debug!("Reading generator config from {}", path.display());
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

/// Address allocation for point-to-point links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TopologyConfig {
    /// Block from which all link networks are drawn. The default is `172.50.0.0/16`.
    pub data_link_network: Ipv4Net,
    /// Prefix length of each link network. The default is `24`. The first link gets
    /// `172.50.0.0/24`, with one endpoint using `172.50.0.1/24`, and the other `172.50.0.2/24`.
    pub data_link_prefix_len: u8,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            data_link_network: "172.50.0.0/16".parse().unwrap(),
            data_link_prefix_len: 24,
        }
    }
}

/// Fixed parts of the ISIS network entity title, and the IS level of all processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IsisConfig {
    /// Authority and format identifier. The default is `"49"` (private addressing).
    pub afi: String,
    /// Area number. The default is `"0001"`.
    pub area: String,
    /// NSAP selector. The default is `"00"`.
    pub selector: String,
    /// IS level of every ISIS process. The default is `level-2-only`.
    pub is_level: IsLevel,
    /// Address families that get a `metric-style wide` block in every ISIS process. The default
    /// is `["ipv4 unicast"]`.
    pub address_families: Vec<AddressFamily>,
}

impl Default for IsisConfig {
    fn default() -> Self {
        Self {
            afi: String::from("49"),
            area: String::from("0001"),
            selector: String::from("00"),
            is_level: IsLevel::default(),
            address_families: vec![AddressFamily::Ipv4Unicast],
        }
    }
}
