/*
 * Created on Tue Feb 06 2024
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

/// A generic result alias over [`RespError`]
pub type RespResult<T> = Result<T, RespError>;

#[derive(Debug, PartialEq, Eq, Clone)]
/// # Engine errors
///
/// Errors surfaced by the value factories, the parser and the writer. An
/// incomplete read is **not** an error: the parser reports it as a status
/// (see [`crate::protocol::Parser::try_parse`]). Every error here is fatal
/// for the current frame; the caller should discard the partial state and
/// either close the transport or resync by discarding data
pub enum RespError {
    /// A negative length or a similar precondition violation (for example an
    /// aggregate child count that is not a multiple of the tag's arity)
    ArgumentOutOfRange,
    /// A wrong tag was handed to a typed factory (for example an aggregate
    /// tag passed to a scalar constructor)
    Argument,
    /// Numeric parsing failure: a malformed or oversized length line, or a
    /// length that overflows
    Format,
    /// The operation cannot make progress; carries a short static reason
    Invalid(&'static str),
    /// Framing violation: a CR was not followed by an LF. Carries the byte
    /// that was actually found
    ExpectedNewLine(u8),
    /// The stream carried a type prefix outside the known set
    RespTypeNotImplemented(u8),
    /// The storage variant is unreachable for the attempted operation. This
    /// is a programming error that is surfaced rather than swallowed
    StorageKindNotImplemented(&'static str),
    /// A buffer-owner shape the factories cannot classify (for example a
    /// piece list carrying zero-length segments)
    UnknownSequenceVariety,
    /// An error value (SimpleError/BlobError) surfaced to the caller, with
    /// its rendered message
    Resp(String),
}
