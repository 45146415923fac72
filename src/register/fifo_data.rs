use crate::bus::MAX_REG_BYTES;
use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker type for the FIFO_DATA (0x14) register.
///
/// Reading FIFO_DATA repeatedly pops bytes off the FIFO, so `LEN` bytes are burst read in one
/// transaction. `LEN` can be at most [`MAX_REG_BYTES`]. Use
/// [`Bmp384::fifo_data`](crate::Bmp384::fifo_data) for larger reads.
pub struct FifoData<const LEN: usize>;
impl<const LEN: usize> Reg for FifoData<LEN> { const ADDR: u8 = 0x14; }

impl<const LEN: usize> Readable for FifoData<LEN> {
    type Out = [u8; LEN];
    const N: usize = {
        assert!(LEN <= MAX_REG_BYTES);
        LEN
    };

    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        let mut out = [0u8; LEN];
        out.copy_from_slice(&b[..LEN]);
        Ok(out)
    }
}
