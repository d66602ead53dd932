/*
 * Created on Mon Feb 19 2024
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

//! # The wire layer
//!
//! [`Parser`] decodes one frame at a time from a list of borrowed byte
//! segments, so a receive path never needs to linearize its buffers first.
//! [`Writer`] encodes a value tree into any [`bytes::BufMut`] sink, mapping
//! RESP3-only types down to their RESP2 relatives when the peer asked for
//! the older dialect.
//!
//! Frames are `\r\n` terminated; integers are ASCII decimal; blob lengths
//! count payload bytes. The two dialects differ in their null forms
//! (`_\r\n` against `<tag>-1\r\n`) and in the set of framable tags

mod parser;
mod writer;


pub use {
    parser::{try_parse_contiguous, Parser},
    writer::Writer,
};

/// Aggregates nested deeper than this are rejected by both the parser and
/// the writer
pub const MAX_DEPTH: usize = 32;
