//-
// Copyright (c) 2026, the Mergebox authors
//
// This file is part of Mergebox.
//
// Mergebox is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mergebox is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along
// with Mergebox. If not, see <http://www.gnu.org/licenses/>.

//! Textual encoding of raw entry identifiers.
//!
//! Stores hand back their content-root identifier either as text or as a raw
//! byte sequence. Folder resolution wants the textual form, so byte-valued
//! identifiers are encoded as upper-case hexadecimal. The encoding must be
//! deterministic so the same identifier always resolves to the same folder.

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encode `bytes` as an upper-case hexadecimal string.
pub fn encode_upper(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(2 * bytes.len());
    for &b in bytes {
        s.push(HEX_DIGITS[(b >> 4) as usize] as char);
        s.push(HEX_DIGITS[(b & 0xF) as usize] as char);
    }
    s
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encode_upper() {
        assert_eq!("", encode_upper(b""));
        assert_eq!("00", encode_upper(&[0]));
        assert_eq!("0AFF10", encode_upper(&[0x0A, 0xFF, 0x10]));
        assert_eq!("DEADBEEF", encode_upper(&[0xDE, 0xAD, 0xBE, 0xEF]));
    }
}
