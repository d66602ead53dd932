/*
 * Created on Mon Feb 12 2024
 *
 * This file is a part of Skyresp
 * Skyresp is a free and open-source RESP (REdis Serialization Protocol)
 * value engine written by Sayan Nandan ("the Author") with the vision to
 * provide a compact, zero-copy representation for protocol values without
 * compromising on performance or correctness.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! A read cursor over a discontiguous byte sequence. Network receive paths
//! rarely hand the decoder one neat slice; the cursor walks an ordered list
//! of borrowed segments as if they were contiguous, without requiring a
//! frame to sit inside any single segment.
//!
//! The cursor is `Copy`: callers snapshot it before a speculative read and
//! simply drop the copy if the read turns out to be incomplete, so a partial
//! frame never moves the committed position.

use super::inline::{Inline, INLINE_SIZE};

/// A line payload extracted from the cursor, borrowing the source segments
#[derive(Debug, PartialEq)]
pub enum LinePayload<'a> {
    /// the payload sat inside one segment
    Contig(&'a [u8]),
    /// the payload crossed one or more segment boundaries
    Split(Box<[&'a [u8]]>),
}

impl<'a> LinePayload<'a> {
    pub fn len(&self) -> usize {
        match self {
            Self::Contig(one) => one.len(),
            Self::Split(pieces) => pieces.iter().map(|piece| piece.len()).sum(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// View the payload as a list of non-empty pieces
    pub fn pieces(&self) -> &[&'a [u8]] {
        match self {
            Self::Contig(one) => core::slice::from_ref(one),
            Self::Split(pieces) => pieces,
        }
    }
}

/// Outcome of scanning ahead for the next CRLF
#[derive(Debug, PartialEq)]
pub enum LineScan {
    /// a full line is buffered; the field is the payload length up to (not
    /// including) the CR
    Found(usize),
    /// one of the terminator bytes has not been buffered yet
    NeedMore,
    /// the CR was followed by this byte instead of an LF
    BadSeparator(u8),
}

#[derive(Debug, Clone, Copy)]
/// A scanner over an ordered list of borrowed byte segments
///
/// Invariant: outside of method bodies, `(seg, off)` either points at a
/// readable byte or sits one past the final segment (`exhausted`). Empty
/// segments are skipped eagerly, so no read ever yields a zero-length piece
pub struct RopeCursor<'s, 'a> {
    segs: &'s [&'a [u8]],
    seg: usize,
    off: usize,
    pos: usize,
}

impl<'s, 'a> RopeCursor<'s, 'a> {
    pub fn new(segs: &'s [&'a [u8]]) -> Self {
        let mut slf = Self {
            segs,
            seg: 0,
            off: 0,
            pos: 0,
        };
        slf.normalize();
        slf
    }
    fn normalize(&mut self) {
        while self.seg < self.segs.len() && self.off == self.segs[self.seg].len() {
            self.seg += 1;
            self.off = 0;
        }
    }
    /// Absolute position from the start of the sequence; equals the number
    /// of bytes consumed so far
    pub const fn position(&self) -> usize {
        self.pos
    }
    pub fn buffer_len(&self) -> usize {
        self.segs.iter().map(|seg| seg.len()).sum()
    }
    pub fn remaining(&self) -> usize {
        if self.exhausted() {
            0
        } else {
            (self.segs[self.seg].len() - self.off)
                + self.segs[self.seg + 1..]
                    .iter()
                    .map(|seg| seg.len())
                    .sum::<usize>()
        }
    }
    pub fn has_left(&self, sizeof: usize) -> bool {
        self.remaining() >= sizeof
    }
    pub fn exhausted(&self) -> bool {
        self.seg == self.segs.len()
    }
    pub fn peek_byte(&self) -> Option<u8> {
        if self.exhausted() {
            None
        } else {
            Some(self.segs[self.seg][self.off])
        }
    }
    pub fn try_next_byte(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.skip(1);
        Some(byte)
    }
    /// Move the cursor ahead by `by` bytes. Walking past the end of the
    /// sequence is a caller bug
    pub fn skip(&mut self, mut by: usize) {
        while by != 0 {
            assert!(!self.exhausted(), "cursor skipped past end of input");
            let take = by.min(self.segs[self.seg].len() - self.off);
            self.off += take;
            self.pos += take;
            by -= take;
            self.normalize();
        }
    }
    /// Fast path: borrow the next `sizeof` bytes if they sit inside the
    /// current segment, consuming them
    pub fn read_contiguous(&mut self, sizeof: usize) -> Option<&'a [u8]> {
        if sizeof == 0 {
            return Some(&[]);
        }
        if !self.exhausted() && self.segs[self.seg].len() - self.off >= sizeof {
            let chunk = &self.segs[self.seg][self.off..self.off + sizeof];
            self.skip(sizeof);
            Some(chunk)
        } else {
            None
        }
    }
    /// Copy the next `sizeof` bytes, which may cross segments, into `out`.
    /// The caller must have verified availability via [`Self::has_left`]
    pub fn copy_into(&mut self, mut sizeof: usize, out: &mut Vec<u8>) {
        while sizeof != 0 {
            assert!(!self.exhausted(), "cursor copied past end of input");
            let take = sizeof.min(self.segs[self.seg].len() - self.off);
            out.extend_from_slice(&self.segs[self.seg][self.off..self.off + take]);
            self.off += take;
            self.pos += take;
            sizeof -= take;
            self.normalize();
        }
    }
    /// Pack the next `sizeof <= INLINE_SIZE` bytes into an [`Inline`]
    /// carrier without touching the heap
    pub fn copy_inline(&mut self, sizeof: usize) -> Inline {
        debug_assert!(sizeof <= INLINE_SIZE);
        let mut inline = Inline::empty();
        let mut left = sizeof;
        while left != 0 {
            assert!(!self.exhausted(), "cursor copied past end of input");
            let take = left.min(self.segs[self.seg].len() - self.off);
            inline.extend_from_slice(&self.segs[self.seg][self.off..self.off + take]);
            self.off += take;
            self.pos += take;
            left -= take;
            self.normalize();
        }
        inline
    }
    /// Look ahead for the next CRLF without consuming anything
    pub fn scan_line(&self) -> LineScan {
        let mut probe = *self;
        let mut len = 0usize;
        loop {
            match probe.try_next_byte() {
                Some(b'\r') => {
                    return match probe.peek_byte() {
                        Some(b'\n') => LineScan::Found(len),
                        Some(other) => LineScan::BadSeparator(other),
                        None => LineScan::NeedMore,
                    }
                }
                Some(_) => len += 1,
                None => return LineScan::NeedMore,
            }
        }
    }
    /// Borrow `len` payload bytes as pieces and consume them along with the
    /// trailing CRLF. Call only after [`Self::scan_line`] returned
    /// [`LineScan::Found`] with this `len`
    pub fn take_line(&mut self, len: usize) -> LinePayload<'a> {
        let payload = match self.read_contiguous(len) {
            Some(one) => LinePayload::Contig(one),
            None => {
                let mut pieces = Vec::new();
                let mut left = len;
                while left != 0 {
                    let take = left.min(self.segs[self.seg].len() - self.off);
                    pieces.push(&self.segs[self.seg][self.off..self.off + take]);
                    self.off += take;
                    self.pos += take;
                    left -= take;
                    self.normalize();
                }
                LinePayload::Split(pieces.into_boxed_slice())
            }
        };
        self.skip(2);
        payload
    }
}
