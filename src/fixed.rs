use ufmt::{Formatter, uDisplay, uWrite};

/// Fixed point value with 3 decimal digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fixed3(u32);

impl Fixed3 {
    /// Construct new value from scaled integer.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The scaled integer.
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        self.0
    }
}

impl uDisplay for Fixed3 {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let fract = self.0 % 1000;
        let integer = self.0 / 1000;

        integer.fmt(f)?;
        f.write_char('.')?;

        if fract < 100 {
            f.write_char('0')?;
        }
        if fract < 10 {
            f.write_char('0')?;
        }
        fract.fmt(f)
    }
}
