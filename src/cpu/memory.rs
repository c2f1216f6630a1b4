//! Addressable memory built as a recursive decode tree of registers.
//!
//! Every tier follows one pattern. It consumes the highest-order bits of
//! its address slice to pick one of its children, gates `load` so only that
//! child can be written, hands the remaining lower-order bits to every
//! child unchanged, and reduces the children's outputs through a tree of
//! 16-wide multiplexers keyed by the same bits.
//!
//! ```text
//! Ram8    = 8 x Register   3-bit address
//! Ram64   = 8 x Ram8       6-bit address
//! Ram512  = 8 x Ram64      9-bit address
//! Ram4K   = 8 x Ram512    12-bit address
//! Ram16K  = 4 x Ram4K     14-bit address
//! Ram32K  = 8 x Ram4K     15-bit address (32768 words)
//! ```

use std::fmt;
use crate::cpu::Register;
use crate::logic::bit::and_;
use crate::logic::ops::{decode_one_hot, mux_tree};
use crate::logic::{Bit, BusError, Word16};

/// The read/write contract shared by every memory tier.
pub trait MemoryTier {
    /// Number of address bits this tier consumes, its own and its children's.
    const ADDRESS_WIDTH: usize;

    /// A tier with every word zeroed.
    fn empty() -> Self;

    /// Tick the tier with an address slice of exactly `ADDRESS_WIDTH` bits.
    ///
    /// Returns the addressed word after the tick. Callers inside the tree
    /// always pass a correctly sized slice; use [`MemoryTier::update`] at
    /// an outer boundary.
    fn clock(&mut self, input: &Word16, address: &[Bit], load: Bit) -> Word16;

    /// Read the addressed word without ticking.
    fn probe_unchecked(&self, address: &[Bit]) -> Word16;

    /// Number of words this tier stores.
    fn capacity() -> usize {
        1 << Self::ADDRESS_WIDTH
    }

    /// Tick the tier after checking the address width.
    fn update(&mut self, input: &Word16, address: &[Bit], load: Bit) -> Result<Word16, BusError> {
        check_width(address, Self::ADDRESS_WIDTH)?;
        Ok(self.clock(input, address, load))
    }

    /// Read without ticking, after checking the address width.
    fn probe(&self, address: &[Bit]) -> Result<Word16, BusError> {
        check_width(address, Self::ADDRESS_WIDTH)?;
        Ok(self.probe_unchecked(address))
    }
}

fn check_width(address: &[Bit], expected: usize) -> Result<(), BusError> {
    if address.len() != expected {
        return Err(BusError::InvalidWidth { expected, got: address.len() });
    }
    Ok(())
}

/// A single register is the zero-width leaf of every tree.
impl MemoryTier for Register {
    const ADDRESS_WIDTH: usize = 0;

    fn empty() -> Self {
        Register::new()
    }

    fn clock(&mut self, input: &Word16, _address: &[Bit], load: Bit) -> Word16 {
        self.update(input, load)
    }

    fn probe_unchecked(&self, _address: &[Bit]) -> Word16 {
        Register::probe(self)
    }
}

/// A tier with `2^SELECT` children of tier `T`.
#[derive(Clone)]
pub struct RamNode<T, const SELECT: usize> {
    children: Vec<T>,
}

impl<T: MemoryTier, const SELECT: usize> RamNode<T, SELECT> {
    pub fn new() -> Self {
        Self {
            children: (0..1usize << SELECT).map(|_| T::empty()).collect(),
        }
    }

    /// Number of direct children.
    pub fn fan_out(&self) -> usize {
        self.children.len()
    }
}

impl<T: MemoryTier, const SELECT: usize> MemoryTier for RamNode<T, SELECT> {
    const ADDRESS_WIDTH: usize = SELECT + T::ADDRESS_WIDTH;

    fn empty() -> Self {
        Self::new()
    }

    fn clock(&mut self, input: &Word16, address: &[Bit], load: Bit) -> Word16 {
        let (select, rest) = address.split_at(SELECT);
        let enables = decode_one_hot(select);

        let outputs: Vec<Word16> = self
            .children
            .iter_mut()
            .zip(enables)
            .map(|(child, enable)| child.clock(input, rest, and_(enable, load)))
            .collect();

        mux_tree(&outputs, select)
    }

    fn probe_unchecked(&self, address: &[Bit]) -> Word16 {
        let (select, rest) = address.split_at(SELECT);
        let outputs: Vec<Word16> = self
            .children
            .iter()
            .map(|child| child.probe_unchecked(rest))
            .collect();

        mux_tree(&outputs, select)
    }
}

impl<T: MemoryTier, const SELECT: usize> Default for RamNode<T, SELECT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: MemoryTier, const SELECT: usize> fmt::Debug for RamNode<T, SELECT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RamNode")
            .field("fan_out", &self.children.len())
            .field("address_width", &Self::ADDRESS_WIDTH)
            .field("capacity", &Self::capacity())
            .finish()
    }
}

pub type Ram8 = RamNode<Register, 3>;
pub type Ram64 = RamNode<Ram8, 3>;
pub type Ram512 = RamNode<Ram64, 3>;
pub type Ram4K = RamNode<Ram512, 3>;
/// The 4-way top tier.
pub type Ram16K = RamNode<Ram4K, 2>;
pub type Ram32K = RamNode<Ram4K, 3>;

/// The address slice for word `index` in a tier `width` bits wide (MSB first).
///
/// `index` is truncated to its low `width` bits.
pub fn address_bits(index: usize, width: usize) -> Vec<Bit> {
    (0..width)
        .map(|j| Bit::from((index >> (width - 1 - j)) & 1 == 1))
        .collect()
}

/// Like [`address_bits`], but rejects an `index` that does not fit in
/// `width` bits instead of truncating it.
pub fn checked_address_bits(index: usize, width: usize) -> Result<Vec<Bit>, BusError> {
    let capacity = 1usize << width;
    if index >= capacity {
        return Err(BusError::AddressOutOfRange { index, capacity });
    }
    Ok(address_bits(index, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use Bit::{I, O};
    use proptest::prelude::*;

    fn write<M: MemoryTier>(mem: &mut M, index: usize, value: u16) -> Word16 {
        let address = address_bits(index, M::ADDRESS_WIDTH);
        mem.update(&Word16::from_u16(value), &address, I).unwrap()
    }

    fn read<M: MemoryTier>(mem: &mut M, index: usize) -> u16 {
        let address = address_bits(index, M::ADDRESS_WIDTH);
        mem.update(&Word16::ONES, &address, O).unwrap().to_u16()
    }

    #[test]
    fn test_tier_widths() {
        assert_eq!(Ram8::ADDRESS_WIDTH, 3);
        assert_eq!(Ram64::ADDRESS_WIDTH, 6);
        assert_eq!(Ram512::ADDRESS_WIDTH, 9);
        assert_eq!(Ram4K::ADDRESS_WIDTH, 12);
        assert_eq!(Ram16K::ADDRESS_WIDTH, 14);
        assert_eq!(Ram32K::ADDRESS_WIDTH, 15);
        assert_eq!(Ram32K::capacity(), 32768);
        assert_eq!(Ram16K::new().fan_out(), 4);
    }

    #[test]
    fn test_ram8_initialization() {
        let mut ram = Ram8::new();
        for index in 0..8 {
            assert_eq!(read(&mut ram, index), 0);
        }
    }

    #[test]
    fn test_ram8_store_and_read() {
        let mut ram = Ram8::new();
        assert_eq!(write(&mut ram, 3, 1234).to_u16(), 1234);
        assert_eq!(read(&mut ram, 3), 1234);
    }

    #[test]
    fn test_ram8_different_addresses() {
        let mut ram = Ram8::new();
        for index in 0..8 {
            write(&mut ram, index, 100 + index as u16);
        }
        for index in 0..8 {
            assert_eq!(read(&mut ram, index), 100 + index as u16);
        }
    }

    #[test]
    fn test_read_does_not_mutate() {
        let mut ram = Ram64::new();
        write(&mut ram, 9, 77);
        // load low with a different input must not store it
        let address = address_bits(9, 6);
        ram.update(&Word16::from_u16(5), &address, O).unwrap();
        assert_eq!(read(&mut ram, 9), 77);
    }

    #[test]
    fn test_write_isolation_across_tier_boundaries() {
        let mut ram = Ram64::new();
        write(&mut ram, 0, 11);
        write(&mut ram, 7, 22);
        write(&mut ram, 8, 33);

        assert_eq!(read(&mut ram, 0), 11);
        assert_eq!(read(&mut ram, 7), 22);
        assert_eq!(read(&mut ram, 8), 33);
        assert_eq!(read(&mut ram, 1), 0);
        assert_eq!(read(&mut ram, 15), 0);
    }

    #[test]
    fn test_ram4k_address_decoding() {
        let mut ram = Ram4K::new();
        let indices = [0, 7, 8, 63, 64, 511, 512, 4095];
        for (n, &index) in indices.iter().enumerate() {
            write(&mut ram, index, n as u16 + 1);
        }
        for (n, &index) in indices.iter().enumerate() {
            assert_eq!(read(&mut ram, index), n as u16 + 1, "address {}", index);
        }
    }

    #[test]
    fn test_ram16k_top_tier() {
        let mut ram = Ram16K::new();
        write(&mut ram, 4095, 1);
        write(&mut ram, 4096, 2);
        write(&mut ram, 16383, 3);
        assert_eq!(read(&mut ram, 4095), 1);
        assert_eq!(read(&mut ram, 4096), 2);
        assert_eq!(read(&mut ram, 16383), 3);
        assert_eq!(read(&mut ram, 8192), 0);
    }

    #[test]
    fn test_ram32k_upper_half() {
        let mut ram = Ram32K::new();
        write(&mut ram, 16384, 0xaaaa);
        write(&mut ram, 32767, 0x5555);
        assert_eq!(read(&mut ram, 16384), 0xaaaa);
        assert_eq!(read(&mut ram, 32767), 0x5555);
        assert_eq!(read(&mut ram, 0), 0);
    }

    #[test]
    fn test_probe_matches_read() {
        let mut ram = Ram512::new();
        write(&mut ram, 300, 9);
        let address = address_bits(300, 9);
        assert_eq!(ram.probe(&address).unwrap().to_u16(), 9);
    }

    #[test]
    fn test_checked_address_rejects_overflow() {
        assert_eq!(checked_address_bits(7, 3).unwrap(), address_bits(7, 3));
        assert_eq!(
            checked_address_bits(8, 3),
            Err(BusError::AddressOutOfRange { index: 8, capacity: 8 })
        );
    }

    #[test]
    fn test_invalid_address_width() {
        let mut ram = Ram8::new();
        let result = ram.update(&Word16::ONE, &[I, O], I);
        assert_eq!(result, Err(BusError::InvalidWidth { expected: 3, got: 2 }));

        let result = ram.probe(&[I, O, O, O]);
        assert_eq!(result, Err(BusError::InvalidWidth { expected: 3, got: 4 }));
    }

    proptest! {
        #[test]
        fn prop_write_isolation(x in 0usize..64, y in 0usize..64, vx: u16, vy: u16) {
            prop_assume!(x != y);
            let mut ram = Ram64::new();
            write(&mut ram, x, vx);
            write(&mut ram, y, vy);
            prop_assert_eq!(read(&mut ram, x), vx);
            prop_assert_eq!(read(&mut ram, y), vy);
        }
    }
}
