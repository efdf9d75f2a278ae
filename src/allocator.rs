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

//! This module contains the subnet allocator used for point-to-point links.

use ipnet::{Ipv4Net, Ipv4Subnets};

use crate::types::ConfigGenError;

/// Allocator that hands out the subnets of a base network in ascending order. Each subnet has the
/// same prefix length, and no subnet is returned twice during the lifetime of the allocator.
///
/// ```
/// # use topocfg::allocator::AddressAllocator;
/// # use topocfg::types::ConfigGenError;
/// use ipnet::Ipv4Net;
///
/// let base: Ipv4Net = "10.0.0.0/29".parse().unwrap();
/// let mut alloc = AddressAllocator::new(base, 30).unwrap();
/// assert_eq!(alloc.next().unwrap(), "10.0.0.0/30".parse::<Ipv4Net>().unwrap());
/// assert_eq!(alloc.next().unwrap(), "10.0.0.4/30".parse::<Ipv4Net>().unwrap());
/// assert!(matches!(alloc.next(), Err(ConfigGenError::NotEnoughAddresses(_))));
/// ```
#[derive(Debug, Clone)]
pub struct AddressAllocator {
    /// The block from which all subnets are drawn
    base: Ipv4Net,
    /// prefix length of every allocated subnet
    prefix_len: u8,
    /// Iterator over all subnets of `base` that were not yet allocated
    subnets: Ipv4Subnets,
    /// The most recently allocated subnet
    last: Option<Ipv4Net>,
    /// Number of allocated subnets
    allocated: usize,
}

impl AddressAllocator {
    /// Create a new allocator. This function fails if `prefix_len` is smaller than the prefix
    /// length of `base`, or larger than 32.
    pub fn new(base: Ipv4Net, prefix_len: u8) -> Result<Self, ConfigGenError> {
        let base = base.trunc();
        Ok(Self {
            base,
            prefix_len,
            subnets: base.subnets(prefix_len)?,
            last: None,
            allocated: 0,
        })
    }

    /// Draw the next unused subnet. Returns `ConfigGenError::NotEnoughAddresses` once the base
    /// network is exhausted, and keeps doing so on every subsequent call.
    pub fn next(&mut self) -> Result<Ipv4Net, ConfigGenError> {
        if self.remaining() == 0 {
            return Err(ConfigGenError::NotEnoughAddresses(self.base));
        }
        let net = self
            .subnets
            .next()
            // the cursor must strictly increase.
            .filter(|net| self.last.map(|last| last < *net).unwrap_or(true))
            .ok_or(ConfigGenError::NotEnoughAddresses(self.base))?;
        self.last = Some(net);
        self.allocated += 1;
        log::debug!("allocated subnet {} from {}", net, self.base);
        Ok(net)
    }

    /// The block from which all subnets are drawn.
    pub fn base(&self) -> Ipv4Net {
        self.base
    }

    /// The prefix length of every allocated subnet.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Number of subnets that were already allocated.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Total number of subnets the base block can supply.
    pub fn capacity(&self) -> u64 {
        1u64 << (self.prefix_len - self.base.prefix_len())
    }

    /// Number of subnets that can still be allocated.
    pub fn remaining(&self) -> u64 {
        self.capacity() - self.allocated as u64
    }
}
