//! Binary layout descriptor and the process-wide installed layout.

use std::{ops::Range, sync::OnceLock};

use log::debug;

use crate::{
    config::{EngineConfig, MAX_HEAP_ADDR, MIN_HEAP_ADDR, MIN_STACK_FRAME_POINTER},
    memory::MemoryRegion,
    Error, Result,
};

static LAYOUT: OnceLock<BinaryLayout> = OnceLock::new();

/// Address ranges of the loaded binary and its process.
///
/// Section ranges are half-open (`end` excluded). The binary header occupies
/// every address below `header_end`. Sections default to empty ranges, so a
/// layout built for a binary without, say, a `.rodata` section never
/// classifies anything as read-only data.
///
/// # Examples
///
/// ```rust
/// use concolic_sym::memory::{BinaryLayout, MemoryRegion};
///
/// let layout = BinaryLayout::new()
///     .with_rodata(0x2000..0x3000)
///     .with_text(0x1000..0x2000)
///     .with_header_end(0x40);
///
/// assert!(layout.in_text(0x1fff));
/// assert!(!layout.in_text(0x2000));
/// assert_eq!(layout.classify(0x2000), Some(MemoryRegion::ReadOnlyData));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLayout {
    /// Read-only data section.
    pub rodata: Range<u64>,
    /// Data section.
    pub data: Range<u64>,
    /// Text (code) section.
    pub text: Range<u64>,
    /// Exclusive upper bound of the binary header.
    pub header_end: u64,
    /// Heap range.
    pub heap: Range<u64>,
    /// Lowest stack address.
    pub stack_floor: u64,
}

impl Default for BinaryLayout {
    fn default() -> Self {
        Self {
            rodata: 0..0,
            data: 0..0,
            text: 0..0,
            header_end: 0,
            heap: MIN_HEAP_ADDR..MAX_HEAP_ADDR,
            stack_floor: MIN_STACK_FRAME_POINTER,
        }
    }
}

impl BinaryLayout {
    /// Creates a layout with empty sections and the default 64-bit heap and
    /// stack bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a layout with empty sections and the heap and stack bounds of
    /// `config`.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            heap: config.heap.clone(),
            stack_floor: config.stack_floor,
            ..Self::default()
        }
    }

    /// Sets the read-only data section.
    #[must_use]
    pub fn with_rodata(mut self, range: Range<u64>) -> Self {
        self.rodata = range;
        self
    }

    /// Sets the data section.
    #[must_use]
    pub fn with_data(mut self, range: Range<u64>) -> Self {
        self.data = range;
        self
    }

    /// Sets the text section.
    #[must_use]
    pub fn with_text(mut self, range: Range<u64>) -> Self {
        self.text = range;
        self
    }

    /// Sets the exclusive upper bound of the binary header.
    #[must_use]
    pub fn with_header_end(mut self, end: u64) -> Self {
        self.header_end = end;
        self
    }

    /// Sets the heap range.
    #[must_use]
    pub fn with_heap(mut self, range: Range<u64>) -> Self {
        self.heap = range;
        self
    }

    /// Sets the stack floor.
    #[must_use]
    pub fn with_stack_floor(mut self, floor: u64) -> Self {
        self.stack_floor = floor;
        self
    }

    /// Checks the layout for inverted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] naming the first inverted range.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("rodata", &self.rodata),
            ("data", &self.data),
            ("text", &self.text),
            ("heap", &self.heap),
        ];
        for (name, range) in ranges {
            if range.start > range.end {
                return Err(Error::InvalidLayout(format!(
                    "{name} range {:#x}..{:#x} is inverted",
                    range.start, range.end
                )));
            }
        }
        Ok(())
    }

    /// Checks if `address` lies in the read-only data section.
    #[must_use]
    pub fn in_rodata(&self, address: u64) -> bool {
        self.rodata.contains(&address)
    }

    /// Checks if `address` lies in the data section.
    #[must_use]
    pub fn in_data(&self, address: u64) -> bool {
        self.data.contains(&address)
    }

    /// Checks if `address` lies in the text section.
    #[must_use]
    pub fn in_text(&self, address: u64) -> bool {
        self.text.contains(&address)
    }

    /// Checks if `address` lies in the binary header.
    #[must_use]
    pub fn in_header(&self, address: u64) -> bool {
        address < self.header_end
    }

    /// Checks if `address` lies in the heap.
    #[must_use]
    pub fn in_heap(&self, address: u64) -> bool {
        self.heap.contains(&address)
    }

    /// Checks if `address` lies in the stack.
    #[must_use]
    pub fn in_stack(&self, address: u64) -> bool {
        address >= self.stack_floor
    }

    /// Returns the first region containing `address`.
    ///
    /// Regions are tested in the order rodata, data, text, header, heap,
    /// stack.
    #[must_use]
    pub fn classify(&self, address: u64) -> Option<MemoryRegion> {
        if self.in_rodata(address) {
            Some(MemoryRegion::ReadOnlyData)
        } else if self.in_data(address) {
            Some(MemoryRegion::Data)
        } else if self.in_text(address) {
            Some(MemoryRegion::Text)
        } else if self.in_header(address) {
            Some(MemoryRegion::Header)
        } else if self.in_heap(address) {
            Some(MemoryRegion::Heap)
        } else if self.in_stack(address) {
            Some(MemoryRegion::Stack)
        } else {
            None
        }
    }
}

/// Installs the process-wide binary layout.
///
/// Must be called once, by the binary loader, before any of the free
/// classification functions.
///
/// # Errors
///
/// Returns [`Error::InvalidLayout`] if the layout does not validate, or
/// [`Error::LayoutAlreadyInstalled`] on a second call.
pub fn install_layout(layout: BinaryLayout) -> Result<()> {
    layout.validate()?;
    debug!(
        "installing binary layout: rodata {:#x?}, data {:#x?}, text {:#x?}, header < {:#x}",
        layout.rodata, layout.data, layout.text, layout.header_end
    );
    LAYOUT
        .set(layout)
        .map_err(|_| Error::LayoutAlreadyInstalled)
}

/// Returns the installed layout, if any.
#[must_use]
pub fn installed_layout() -> Option<&'static BinaryLayout> {
    LAYOUT.get()
}

fn layout() -> &'static BinaryLayout {
    match LAYOUT.get() {
        Some(layout) => layout,
        None => panic!("binary layout queried before install_layout"),
    }
}

/// Checks `address` against the installed read-only data section.
///
/// # Panics
///
/// Panics if no layout has been installed.
#[must_use]
pub fn addr_in_rodata(address: u64) -> bool {
    layout().in_rodata(address)
}

/// Checks `address` against the installed data section.
///
/// # Panics
///
/// Panics if no layout has been installed.
#[must_use]
pub fn addr_in_data(address: u64) -> bool {
    layout().in_data(address)
}

/// Checks `address` against the installed text section.
///
/// # Panics
///
/// Panics if no layout has been installed.
#[must_use]
pub fn addr_in_text(address: u64) -> bool {
    layout().in_text(address)
}

/// Checks `address` against the installed binary header bound.
///
/// # Panics
///
/// Panics if no layout has been installed.
#[must_use]
pub fn addr_in_header(address: u64) -> bool {
    layout().in_header(address)
}

/// Checks `address` against the installed heap bounds.
///
/// # Panics
///
/// Panics if no layout has been installed.
#[must_use]
pub fn addr_in_heap(address: u64) -> bool {
    layout().in_heap(address)
}

/// Checks `address` against the installed stack floor.
///
/// # Panics
///
/// Panics if no layout has been installed.
#[must_use]
pub fn addr_in_stack(address: u64) -> bool {
    layout().in_stack(address)
}

pub(crate) fn classify_installed(address: u64) -> Option<MemoryRegion> {
    layout().classify(address)
}
