/*
 * Created on Mon Feb 05 2024
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

//! # Skyresp
//!
//! A RESP (REdis Serialization Protocol) value engine covering both the
//! RESP2 and RESP3 wire dialects:
//!
//! - [`RespValue`]: an immutable, compact value model. Payloads up to
//!   [`INLINE_SIZE`] bytes (and all scalars) are packed into the value with
//!   no allocation; larger payloads are either borrowed from the parse
//!   buffer or held through shared owners. A one-element aggregate whose
//!   child fits inline collapses into its parent ("unit aggregate wrap")
//!   and is reconstructed transparently on access.
//! - [`Parser`]: a streaming decoder that works over a list of byte
//!   segments (no need to linearize receive buffers) and reports partial
//!   frames as a status rather than an error.
//! - [`Writer`]: a streaming encoder over any [`bytes::BufMut`] sink that
//!   maps RESP3-only types to their RESP2 relatives when targeting an
//!   older peer.
//!
//! Parsing borrows; call [`RespValue::preserve`] to detach a value from
//! its source buffer before the buffer is reused.
//!
//! This crate is the protocol core only: transports, connection lifecycles
//! and command dispatch live elsewhere

// modules
pub mod error;
pub mod mem;
pub mod protocol;
pub mod tag;
pub mod value;
// endof modules

pub use {
    error::{RespError, RespResult},
    mem::{Lease, INLINE_SIZE},
    protocol::{try_parse_contiguous, Parser, Writer, MAX_DEPTH},
    tag::{RespVersion, Tag, TagFamily},
    value::{RespValue, Storage, SubItems},
};
