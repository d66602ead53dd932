/*
 * Created on Wed Feb 21 2024
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

use {
    super::MAX_DEPTH,
    crate::{
        error::{RespError, RespResult},
        mem::{LinePayload, LineScan, RopeCursor, INLINE_SIZE},
        tag::{Tag, TagFamily},
        value::RespValue,
    },
    bytes::Bytes,
    log::trace,
};

/// Length lines longer than this are malformed (a 64-bit decimal with its
/// sign needs at most 20 bytes)
const MAX_LENGTH_LINE: usize = 20;
/// An aggregate count is not trusted for pre-allocation beyond this many
/// child slots; the vector grows normally past it
const CHILD_PREALLOC_CAP: usize = 4096;

/// # The frame decoder
///
/// Decodes exactly one frame per call from an ordered list of borrowed byte
/// segments. The produced value borrows the segment data (not the segment
/// list), so the list itself may be rebuilt between calls while the payload
/// buffers stay put. Values that must outlive the buffers go through
/// [`RespValue::preserve`].
///
/// An incomplete frame is a status, not an error: [`Parser::try_parse`]
/// returns `Ok(None)` and reports nothing consumed, so the caller simply
/// retries after buffering more bytes. Every `Err` is fatal for the frame
pub struct Parser<'s, 'a> {
    cursor: RopeCursor<'s, 'a>,
    depth: usize,
}

/// Decode one frame from a single contiguous buffer
pub fn try_parse_contiguous(buf: &[u8]) -> RespResult<Option<(RespValue<'_>, usize)>> {
    Parser::try_parse(core::slice::from_ref(&buf))
}

impl<'s, 'a> Parser<'s, 'a> {
    /// Attempt to decode one complete frame from `segs`, returning the
    /// value and the number of bytes it occupied. `Ok(None)` means the
    /// buffered data ends mid-frame
    pub fn try_parse(segs: &'s [&'a [u8]]) -> RespResult<Option<(RespValue<'a>, usize)>> {
        let mut slf = Self {
            cursor: RopeCursor::new(segs),
            depth: 0,
        };
        Ok(slf.next_value()?.map(|value| (value, slf.cursor.position())))
    }
    fn next_value(&mut self) -> RespResult<Option<RespValue<'a>>> {
        let prefix = match self.cursor.try_next_byte() {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let tag = match Tag::from_symbol(prefix) {
            Some(tag) => tag,
            None => {
                trace!("rejecting frame: unknown type symbol {:?}", prefix as char);
                return Err(RespError::RespTypeNotImplemented(prefix));
            }
        };
        match tag.family() {
            TagFamily::Line => self.next_line_frame(tag),
            TagFamily::Blob => self.next_blob_frame(tag),
            TagFamily::Aggregate(multiplier) => self.next_aggregate_frame(tag, multiplier),
            TagFamily::Sentinel => Err(RespError::RespTypeNotImplemented(prefix)),
        }
    }
    /// Read one CRLF-terminated line, borrowing its payload
    fn read_line(&mut self) -> RespResult<Option<LinePayload<'a>>> {
        match self.cursor.scan_line() {
            LineScan::Found(len) => Ok(Some(self.cursor.take_line(len))),
            LineScan::NeedMore => Ok(None),
            LineScan::BadSeparator(byte) => Err(RespError::ExpectedNewLine(byte)),
        }
    }
    /// Read a line and parse it as a signed decimal. `-1` is the null
    /// sentinel; no other negative value is legal
    fn read_length(&mut self) -> RespResult<Option<i64>> {
        let line = match self.read_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        if line.is_empty() || line.len() > MAX_LENGTH_LINE {
            return Err(RespError::Format);
        }
        let mut negative = false;
        let mut digits = 0usize;
        let mut magnitude = 0i64;
        for (idx, byte) in line
            .pieces()
            .iter()
            .flat_map(|piece| piece.iter().copied())
            .enumerate()
        {
            if idx == 0 && byte == b'-' {
                negative = true;
                continue;
            }
            if !byte.is_ascii_digit() {
                return Err(RespError::Format);
            }
            magnitude = magnitude
                .checked_mul(10)
                .and_then(|m| m.checked_add((byte & 0x0f) as i64))
                .ok_or(RespError::Format)?;
            digits += 1;
        }
        if digits == 0 {
            return Err(RespError::Format);
        }
        let len = if negative { -magnitude } else { magnitude };
        if len < -1 {
            return Err(RespError::Format);
        }
        Ok(Some(len))
    }
    /// Consume the two terminator bytes after a blob payload. `Ok(false)`
    /// when they have not been buffered yet
    fn expect_crlf(&mut self) -> RespResult<bool> {
        if !self.cursor.has_left(2) {
            return Ok(false);
        }
        for expected in [b'\r', b'\n'] {
            match self.cursor.try_next_byte() {
                Some(byte) if byte == expected => {}
                Some(byte) => return Err(RespError::ExpectedNewLine(byte)),
                None => return Ok(false),
            }
        }
        Ok(true)
    }
    fn next_line_frame(&mut self, tag: Tag) -> RespResult<Option<RespValue<'a>>> {
        match self.read_line()? {
            Some(line) => RespValue::of_line(tag, line).map(Some),
            None => Ok(None),
        }
    }
    fn next_blob_frame(&mut self, tag: Tag) -> RespResult<Option<RespValue<'a>>> {
        let len = match self.read_length()? {
            Some(len) => len,
            None => return Ok(None),
        };
        if len == -1 {
            // the null form is length-only: no payload, no trailing CRLF
            return Ok(Some(RespValue::typed_null(tag)));
        }
        let len = len as usize;
        if len == 0 {
            return Ok(match self.expect_crlf()? {
                true => Some(RespValue::of_empty(tag)),
                false => None,
            });
        }
        if !self.cursor.has_left(len + 2) {
            return Ok(None);
        }
        let value = if len <= INLINE_SIZE {
            RespValue::of_inline(tag, self.cursor.copy_inline(len))
        } else {
            let mut buf = Vec::with_capacity(len);
            self.cursor.copy_into(len, &mut buf);
            RespValue::of_owned(tag, Bytes::from(buf))?
        };
        Ok(match self.expect_crlf()? {
            true => Some(value),
            false => None,
        })
    }
    fn next_aggregate_frame(
        &mut self,
        tag: Tag,
        multiplier: usize,
    ) -> RespResult<Option<RespValue<'a>>> {
        let len = match self.read_length()? {
            Some(len) => len,
            None => return Ok(None),
        };
        if len == -1 {
            return Ok(Some(RespValue::typed_null(tag)));
        }
        if len == 0 {
            return Ok(Some(RespValue::of_empty(tag)));
        }
        if self.depth == MAX_DEPTH {
            trace!("rejecting frame: aggregates nested beyond {MAX_DEPTH} levels");
            return Err(RespError::Invalid("aggregate nesting too deep"));
        }
        let total = (len as usize)
            .checked_mul(multiplier)
            .ok_or(RespError::Format)?;
        self.depth += 1;
        let assembled = self.collect_children(tag, total);
        self.depth -= 1;
        assembled
    }
    fn collect_children(&mut self, tag: Tag, total: usize) -> RespResult<Option<RespValue<'a>>> {
        if total == 1 {
            let child = match self.next_value()? {
                Some(child) => child,
                None => return Ok(None),
            };
            return Ok(Some(if child.can_wrap() {
                child.wrap(tag)
            } else {
                RespValue::aggregate(tag, vec![child])?
            }));
        }
        let mut children = Vec::with_capacity(total.min(CHILD_PREALLOC_CAP));
        for _ in 0..total {
            match self.next_value()? {
                Some(child) => children.push(child),
                None => return Ok(None),
            }
        }
        RespValue::aggregate(tag, children).map(Some)
    }
}
