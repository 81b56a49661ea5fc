//! Frequency-tree entropy coder.
//!
//! Byte values are inserted into a binary tree in ascending order of frequency.
//! Each insertion descends towards the lighter subtree, so frequent bytes end up
//! near the root and get short codes. The tree is rebuilt on decode from the
//! frequency table stored in the stream header:
//!
//! ```text
//! u64 LE  symbol count
//! u16 LE  alphabet size
//! [u8 byte, u32 LE frequency] * alphabet size
//! u8      padding of the last payload byte
//! ...     payload bits, MSB first
//! ```

use thiserror::Error;

use crate::bitvec::{BitVec, BitView};


const ALPHABET: usize = 256;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {

    #[error("byte {byte:#04x} occurs more than u32::MAX times")]
    FrequencyOverflow { byte: u8 },

}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {

    #[error("stream ends before the data it announces")]
    Truncated,
    #[error("frequency table is inconsistent")]
    InvalidHeader,
    #[error("payload does not match the frequency table")]
    InvalidEncoding,

}


#[derive(Debug)]
enum Node {

    Parent { count: u64, left: Box<Node>, right: Box<Node> },
    Leaf { count: u64, value: u8 },

}

impl Node {

    const fn count(&self) -> u64 {
        match self {
            Node::Parent { count, .. } |
            Node::Leaf { count, .. }
                => *count
        }
    }


    fn insert(&mut self, freq: u64, insert_value: u8) {

        match self {

            Node::Parent { count, left, right } => {

                if right.count() > left.count() {
                    left.insert(freq, insert_value);
                } else {
                    right.insert(freq, insert_value);
                }

                *count += freq;
            },

            Node::Leaf { count, value } => {

                let (old_count, old_value) = (*count, *value);

                *self = Node::Parent {
                    count: old_count + freq,
                    left: Box::new(Node::Leaf { count: old_count, value: old_value }),
                    right: Box::new(Node::Leaf { count: freq, value: insert_value })
                };
            },
        }
    }


    fn assign_codes(&self, prefix: &mut Vec<bool>, table: &mut [Option<BitVec>]) {

        match self {

            Node::Parent { left, right, .. } => {
                prefix.push(false);
                left.assign_codes(prefix, table);
                prefix.pop();

                prefix.push(true);
                right.assign_codes(prefix, table);
                prefix.pop();
            },

            Node::Leaf { value, .. } => {
                table[*value as usize] = Some(prefix.iter().copied().collect());
            },
        }
    }

}


#[derive(Debug)]
pub struct FrequencyTree {

    root: Node,
    /// Sorted by ascending (frequency, byte), the order the tree was built in.
    frequencies: Vec<(u8, u32)>

}

impl FrequencyTree {

    /// Builds the tree for a frequency table. Returns `None` for an empty table.
    pub fn from_frequencies(frequencies: &[(u8, u32)]) -> Option<Self> {

        let mut frequencies = frequencies.to_vec();
        frequencies.sort_by_key(|&(value, freq)| (freq, value));

        let (&(first_value, first_freq), rest) = frequencies.split_first()?;

        let mut root = Node::Leaf { count: first_freq as u64, value: first_value };
        for &(value, freq) in rest {
            root.insert(freq as u64, value);
        }

        Some(Self { root, frequencies })
    }


    pub fn from_data(data: &[u8]) -> Result<Option<Self>, EncodeError> {
        Ok(Self::from_frequencies(&byte_frequencies(data)?))
    }


    /// Code for every byte value present in the tree, indexed by byte.
    /// A lone symbol is coded as a single `0` so every symbol costs at least one bit.
    pub(crate) fn code_table(&self) -> Vec<Option<BitVec>> {
        let mut table = vec![None; ALPHABET];
        match self.root {
            Node::Leaf { value, .. } => table[value as usize] = Some([false].into_iter().collect()),
            Node::Parent { .. } => self.root.assign_codes(&mut Vec::new(), &mut table),
        }
        table
    }


    pub fn symbol_count(&self) -> u64 {
        self.root.count()
    }


    fn decode(&self, bits: BitView, symbol_count: u64) -> Result<Vec<u8>, DecodeError> {

        // Every symbol takes at least one bit, so the payload bounds the output.
        if symbol_count > bits.len_bits() as u64 {
            return Err(DecodeError::Truncated);
        }

        let capacity = symbol_count as usize;
        let mut decoded = Vec::with_capacity(capacity);

        let mut bits = bits.iter_bits();
        let mut node = &self.root;

        while decoded.len() < capacity {

            let bit = bits.next().ok_or(DecodeError::Truncated)?;

            match node {
                Node::Parent { left, right, .. } => {
                    let next_node = if bit { right } else { left };
                    match next_node.as_ref() {
                        Node::Parent { .. } => node = next_node,
                        Node::Leaf { value, .. } => {
                            decoded.push(*value);
                            node = &self.root;
                        },
                    }
                },
                Node::Leaf { value, .. } => {
                    if bit {
                        return Err(DecodeError::InvalidEncoding);
                    }
                    decoded.push(*value);
                },
            }
        }

        if bits.next().is_some() {
            return Err(DecodeError::InvalidEncoding);
        }

        Ok(decoded)
    }

}


fn byte_frequencies(data: &[u8]) -> Result<Vec<(u8, u32)>, EncodeError> {

    let mut counts = [0_u64; ALPHABET];
    for &byte in data {
        counts[byte as usize] += 1;
    }

    counts.iter()
        .enumerate()
        .filter(|&(_, &count)| count != 0)
        .map(|(byte, &count)| {
            let byte = byte as u8;
            u32::try_from(count)
                .map(|count| (byte, count))
                .map_err(|_| EncodeError::FrequencyOverflow { byte })
        })
        .collect()
}


pub fn compress(data: &[u8]) -> Result<Vec<u8>, EncodeError> {

    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u64).to_le_bytes());

    let Some(tree) = FrequencyTree::from_data(data)? else {
        out.extend_from_slice(&0_u16.to_le_bytes());
        BitVec::new().write_padded(&mut out);
        return Ok(out);
    };

    out.extend_from_slice(&(tree.frequencies.len() as u16).to_le_bytes());
    for &(value, freq) in &tree.frequencies {
        out.push(value);
        out.extend_from_slice(&freq.to_le_bytes());
    }

    let table = tree.code_table();
    let mut payload = BitVec::new();
    for &byte in data {
        if let Some(code) = &table[byte as usize] {
            payload.extend_from_bits(&code.as_bit_view());
        }
    }

    payload.write_padded(&mut out);
    Ok(out)
}


pub fn decompress(mut input: &[u8]) -> Result<Vec<u8>, DecodeError> {

    let symbol_count = u64::from_le_bytes(take(&mut input)?);
    let alphabet_size = u16::from_le_bytes(take(&mut input)?) as usize;

    if alphabet_size > ALPHABET {
        return Err(DecodeError::InvalidHeader);
    }

    let mut seen = [false; ALPHABET];
    let mut frequencies = Vec::with_capacity(alphabet_size);
    let mut total = 0_u64;

    for _ in 0..alphabet_size {
        let [value] = take::<1>(&mut input)?;
        let freq = u32::from_le_bytes(take(&mut input)?);
        if freq == 0 || seen[value as usize] {
            return Err(DecodeError::InvalidHeader);
        }
        seen[value as usize] = true;
        total += freq as u64;
        frequencies.push((value, freq));
    }

    if total != symbol_count {
        return Err(DecodeError::InvalidHeader);
    }

    let bits = BitView::from_padded_stream(input).ok_or(DecodeError::Truncated)?;

    match FrequencyTree::from_frequencies(&frequencies) {
        Some(tree) => tree.decode(bits, symbol_count),
        None if bits.len_bits() == 0 => Ok(Vec::new()),
        None => Err(DecodeError::InvalidEncoding),
    }
}


fn take<const N: usize>(input: &mut &[u8]) -> Result<[u8; N], DecodeError> {

    if input.len() < N {
        return Err(DecodeError::Truncated);
    }

    let (head, rest) = input.split_at(N);
    *input = rest;

    head.try_into().map_err(|_| DecodeError::Truncated)
}
