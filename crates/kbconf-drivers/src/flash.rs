//! Flash sector geometry.
//!
//! Sectors are indexed `0..N-1` in ascending address order. Reservations
//! at the end of the flash are rounded up to whole sectors so a storage
//! region never shares a sector with firmware code.

use crate::error::{DriverError, Result};

/// Layout of the flash sectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectorLayout {
    /// Sectors with individual sizes, in address order.
    NonUniform {
        /// Size of each sector in bytes.
        sizes: Vec<u64>,
    },
    /// Sectors that all share the same size.
    Uniform {
        /// Common sector size in bytes.
        size: u64,
        /// Number of sectors.
        count: u64,
    },
}

/// Flash geometry of a microcontroller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashGeometry {
    /// Sector layout.
    pub sectors: SectorLayout,
    /// Value of an erased flash word.
    pub empty_value: u32,
}

impl FlashGeometry {
    /// Number of flash sectors.
    pub fn sector_count(&self) -> u64 {
        match &self.sectors {
            SectorLayout::NonUniform { sizes } => sizes.len() as u64,
            SectorLayout::Uniform { count, .. } => *count,
        }
    }

    /// Total flash size in bytes.
    pub fn total_size(&self) -> u64 {
        match &self.sectors {
            SectorLayout::NonUniform { sizes } => sizes.iter().sum(),
            SectorLayout::Uniform { size, count } => size * count,
        }
    }

    /// Size of sector `index` in bytes.
    pub fn sector_size(&self, index: u64) -> Result<u64> {
        let count = self.sector_count();
        if index >= count {
            return Err(DriverError::IndexOutOfRange { index, len: count });
        }
        match &self.sectors {
            SectorLayout::NonUniform { sizes } => Ok(sizes[index as usize]),
            SectorLayout::Uniform { size, .. } => Ok(*size),
        }
    }

    /// Round `required` bytes up to whole sectors counted back from the end
    /// of the flash.
    ///
    /// The result is the size of the shortest run of trailing sectors that
    /// holds at least `required` bytes. A request of zero still reserves the
    /// last sector.
    pub fn round_up_to_sectors(&self, required: u64) -> Result<u64> {
        let available = self.total_size();
        if required > available {
            return Err(DriverError::CapacityExceeded {
                required,
                available,
            });
        }

        let mut total = 0;
        for index in (0..self.sector_count()).rev() {
            total += self.sector_size(index)?;
            if total >= required {
                return Ok(total);
            }
        }
        Ok(total)
    }

    /// Start address (as an offset from the flash base) of a region of
    /// `required` bytes placed at the end of the flash.
    pub fn reserve_from_end(&self, required: u64) -> Result<u64> {
        Ok(self.total_size() - self.round_up_to_sectors(required)?)
    }
}
