//! Memory-region classification of concrete addresses.
//!
//! The interpreter needs to know what a concrete address points into before
//! it decides how to model a load or store: a read from `.rodata` can be
//! resolved from the binary image, a write below the stack floor is a heap or
//! global write, and so on. This module answers those questions against a
//! [`BinaryLayout`].
//!
//! Two entry points are provided:
//!
//! - Methods on a [`BinaryLayout`] value, for callers that own their layout
//! - Free functions ([`addr_in_rodata`], ...) over the process-wide layout
//!   installed once by the binary loader with [`install_layout`]
//!
//! # Usage
//!
//! ```rust,no_run
//! use concolic_sym::memory::{self, BinaryLayout, MemoryRegion};
//!
//! memory::install_layout(
//!     BinaryLayout::new()
//!         .with_rodata(0x2000..0x3000)
//!         .with_data(0x4000..0x5000)
//!         .with_text(0x1000..0x2000)
//!         .with_header_end(0x40),
//! )?;
//!
//! assert!(memory::addr_in_text(0x1000));
//! assert_eq!(MemoryRegion::classify(0x4800), Some(MemoryRegion::Data));
//! # Ok::<(), concolic_sym::Error>(())
//! ```

mod layout;

pub use layout::{
    addr_in_data, addr_in_header, addr_in_heap, addr_in_rodata, addr_in_stack, addr_in_text,
    install_layout, installed_layout, BinaryLayout,
};

use strum::{Display, EnumIter};

/// A region of the analyzed process's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum MemoryRegion {
    /// Read-only data section.
    #[strum(serialize = "rodata")]
    ReadOnlyData,
    /// Data section.
    #[strum(serialize = "data")]
    Data,
    /// Text (code) section.
    #[strum(serialize = "text")]
    Text,
    /// Binary header.
    #[strum(serialize = "header")]
    Header,
    /// Heap.
    #[strum(serialize = "heap")]
    Heap,
    /// Stack.
    #[strum(serialize = "stack")]
    Stack,
}

impl MemoryRegion {
    /// Classifies `address` against the installed layout.
    ///
    /// # Panics
    ///
    /// Panics if no layout has been installed.
    #[must_use]
    pub fn classify(address: u64) -> Option<Self> {
        layout::classify_installed(address)
    }

    /// Checks if `address` lies in this region of `layout`.
    #[must_use]
    pub fn contains(self, layout: &BinaryLayout, address: u64) -> bool {
        match self {
            Self::ReadOnlyData => layout.in_rodata(address),
            Self::Data => layout.in_data(address),
            Self::Text => layout.in_text(address),
            Self::Header => layout.in_header(address),
            Self::Heap => layout.in_heap(address),
            Self::Stack => layout.in_stack(address),
        }
    }
}
