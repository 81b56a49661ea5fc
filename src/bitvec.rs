/// Growable sequence of bits packed MSB-first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitVec {

    raw_data: Vec<u8>,
    /// How many low bits of the last byte are unused.
    last_byte_padding: u8

}

impl BitVec {

    pub const fn new() -> Self {
        Self {
            raw_data: Vec::new(),
            last_byte_padding: 0
        }
    }


    pub fn len_bits(&self) -> usize {
        self.raw_data.len() * 8 - self.last_byte_padding as usize
    }


    pub fn push(&mut self, bit: bool) {

        match self.raw_data.last_mut() {

            Some(last_byte) if self.last_byte_padding != 0 => {
                *last_byte |= (bit as u8) << (self.last_byte_padding - 1);
                self.last_byte_padding -= 1;
            },

            _ => {
                self.raw_data.push((bit as u8) << 7);
                self.last_byte_padding = 7;
            }
        }
    }


    pub fn extend_from_bits(&mut self, bits: &BitView) {

        if self.last_byte_padding == 0 {
            // Byte aligned: whole bytes can be copied.
            self.raw_data.extend_from_slice(bits.raw_data);
            self.last_byte_padding = bits.last_byte_padding;
        } else {
            for bit in bits.iter_bits() {
                self.push(bit);
            }
        }
    }


    pub fn as_bit_view(&self) -> BitView<'_> {
        BitView {
            raw_data: &self.raw_data,
            last_byte_padding: self.last_byte_padding
        }
    }


    /// Appends the padding byte followed by the packed bits to `out`.
    pub fn write_padded(&self, out: &mut Vec<u8>) {
        out.reserve(1 + self.raw_data.len());
        out.push(self.last_byte_padding);
        out.extend_from_slice(&self.raw_data);
    }

}


impl FromIterator<bool> for BitVec {

    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut res = Self::new();
        for bit in iter {
            res.push(bit);
        }
        res
    }

}


/// Borrowed view over packed bits, either from a [`BitVec`] or a serialized stream.
#[derive(Debug, Clone, Copy)]
pub struct BitView<'a> {

    raw_data: &'a [u8],
    last_byte_padding: u8

}

impl<'a> BitView<'a> {

    /// Reads a view written by [`BitVec::write_padded`].
    /// Returns `None` when the padding byte is missing or inconsistent.
    pub fn from_padded_stream(input: &'a [u8]) -> Option<Self> {

        let (&last_byte_padding, raw_data) = input.split_first()?;

        if last_byte_padding > 7 || (raw_data.is_empty() && last_byte_padding != 0) {
            return None;
        }

        Some(Self {
            raw_data,
            last_byte_padding
        })
    }


    pub fn len_bits(&self) -> usize {
        self.raw_data.len() * 8 - self.last_byte_padding as usize
    }


    pub fn iter_bits(&self) -> BitIterator<'a> {
        BitIterator {
            bits: *self,
            i: 0
        }
    }

}


pub struct BitIterator<'a> {

    bits: BitView<'a>,
    i: usize

}

impl Iterator for BitIterator<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {

        if self.i >= self.bits.len_bits() {
            return None;
        }

        let byte = self.bits.raw_data[self.i / 8];
        let bit_in_byte = (self.i % 8) as u8;

        self.i += 1;

        Some(byte & (1_u8 << (7 - bit_in_byte)) != 0)
    }


    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bits.len_bits() - self.i;
        (remaining, Some(remaining))
    }
}


#[cfg(test)]
mod tests {

    use super::*;


    #[test]
    fn check_push_and_iter() {

        let expected = [true, true, false, true, false, true, false, true, true, true];

        let v: BitVec = expected.iter().copied().collect();

        assert_eq!(v.len_bits(), expected.len());
        assert_eq!(v.as_bit_view().iter_bits().collect::<Vec<_>>(), expected);
    }


    #[test]
    fn check_extend_unaligned() {

        let a = [true, false, false, true, false];
        let b = [true, false, false, false, false, true];

        let mut va: BitVec = a.iter().copied().collect();
        let vb: BitVec = b.iter().copied().collect();

        va.extend_from_bits(&vb.as_bit_view());

        let joined: Vec<bool> = a.iter().chain(b.iter()).copied().collect();
        assert_eq!(va.as_bit_view().iter_bits().collect::<Vec<_>>(), joined);
    }


    #[test]
    fn check_extend_aligned() {

        let mut va: BitVec = [true; 8].into_iter().collect();
        let vb: BitVec = [false, true, true].into_iter().collect();

        va.extend_from_bits(&vb.as_bit_view());

        assert_eq!(va.len_bits(), 11);
        assert_eq!(
            va.as_bit_view().iter_bits().skip(8).collect::<Vec<_>>(),
            [false, true, true]
        );
    }


    #[test]
    fn check_padded_stream() {

        let bools = [true, false, false, true, false, true, false, false, false, false, true];
        let v: BitVec = bools.iter().copied().collect();

        let mut stream = Vec::new();
        v.write_padded(&mut stream);

        // padding byte + two data bytes
        assert_eq!(stream.len(), 3);
        assert_eq!(stream[0], 5);

        let view = BitView::from_padded_stream(&stream).unwrap();
        assert_eq!(view.iter_bits().collect::<Vec<_>>(), bools);
    }


    #[test]
    fn rejects_bad_padding() {
        assert!(BitView::from_padded_stream(&[]).is_none());
        assert!(BitView::from_padded_stream(&[8, 0xff]).is_none());
        assert!(BitView::from_padded_stream(&[3]).is_none());
        assert_eq!(BitView::from_padded_stream(&[0]).unwrap().len_bits(), 0);
    }

}
