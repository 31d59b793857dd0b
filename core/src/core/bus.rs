/// Read-only, byte-addressable view of an emulated address space.
///
/// Observers such as the score watch only ever read; they get this
/// capability instead of the CPU's full bus so they cannot disturb emulation.
pub trait MemoryRead {
    fn read_byte(&self, addr: u16) -> u8;
}

/// A flat slice is an address space starting at 0; addresses past the end
/// read as an open bus (0xFF).
impl MemoryRead for [u8] {
    fn read_byte(&self, addr: u16) -> u8 {
        self.get(addr as usize).copied().unwrap_or(0xFF)
    }
}

impl<T: MemoryRead + ?Sized> MemoryRead for &T {
    fn read_byte(&self, addr: u16) -> u8 {
        (**self).read_byte(addr)
    }
}

impl MemoryRead for Vec<u8> {
    fn read_byte(&self, addr: u16) -> u8 {
        self.as_slice().read_byte(addr)
    }
}
