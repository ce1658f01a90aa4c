/// Memory and I/O as seen from the Z80.
///
/// Every access the CPU performs goes through this trait. The contention
/// hooks receive the nominal length of an access in T-states and return the
/// length actually taken; the defaults add no wait states.
pub trait Bus {
    fn read_byte(&mut self, addr: u16) -> u8;
    fn write_byte(&mut self, addr: u16, value: u8);
    fn read_port(&mut self, port: u16) -> u8;
    fn write_port(&mut self, port: u16, value: u8);

    /// M1 opcode read.
    ///
    /// `refresh` is the I/R pair the CPU drives onto the address bus during
    /// the refresh half of the same machine cycle. Machines that decode video
    /// from instruction fetches override this; everything else reads memory.
    fn opcode_fetch(&mut self, addr: u16, _refresh: u16) -> u8 {
        self.read_byte(addr)
    }

    fn contend_mem(&mut self, _addr: u16, ticks: u32) -> u32 {
        ticks
    }

    fn contend_io(&mut self, _port: u16, ticks: u32) -> u32 {
        ticks
    }
}
