use crate::register::{InvalidRegisterField, Readable, Reg};

/// Marker type for the NVM_PAR_T1..NVM_PAR_P11 (0x31-0x45) calibration block.
///
/// - **Length:** 21 bytes
/// - **Access:** Read-only
pub struct Calibration;
impl Reg for Calibration { const ADDR: u8 = 0x31; }

/// Raw trimming coefficients as stored in the device NVM.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationNvm {
    pub nvm_par_t1: u16,
    pub nvm_par_t2: u16,
    pub nvm_par_t3: i8,
    pub nvm_par_p1: i16,
    pub nvm_par_p2: i16,
    pub nvm_par_p3: i8,
    pub nvm_par_p4: i8,
    pub nvm_par_p5: u16,
    pub nvm_par_p6: u16,
    pub nvm_par_p7: i8,
    pub nvm_par_p8: i8,
    pub nvm_par_p9: i16,
    pub nvm_par_p10: i8,
    pub nvm_par_p11: i8,
}

impl Readable for Calibration {
    type Out = CalibrationNvm;

    const N: usize = 21;
    fn decode(b: &[u8]) -> Result<Self::Out, InvalidRegisterField> {
        Ok(CalibrationNvm {
            nvm_par_t1: u16::from_le_bytes([b[0], b[1]]),
            nvm_par_t2: u16::from_le_bytes([b[2], b[3]]),
            nvm_par_t3: b[4] as i8,
            nvm_par_p1: i16::from_le_bytes([b[5], b[6]]),
            nvm_par_p2: i16::from_le_bytes([b[7], b[8]]),
            nvm_par_p3: b[9] as i8,
            nvm_par_p4: b[10] as i8,
            nvm_par_p5: u16::from_le_bytes([b[11], b[12]]),
            nvm_par_p6: u16::from_le_bytes([b[13], b[14]]),
            nvm_par_p7: b[15] as i8,
            nvm_par_p8: b[16] as i8,
            nvm_par_p9: i16::from_le_bytes([b[17], b[18]]),
            nvm_par_p10: b[19] as i8,
            nvm_par_p11: b[20] as i8,
        })
    }
}
